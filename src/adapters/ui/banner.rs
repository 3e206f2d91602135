//! Start-up banner: figlet title over a rule carrying the version.

use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{self, Write, stdout};

const TITLE: &str = "TRAINING";
const SUBTITLE: &str = "Sessions, eligibility and registrations";

/// Figlet art for the title, or the plain title when the font cannot render it.
fn title_art() -> String {
    FIGfont::standard()
        .ok()
        .and_then(|font| font.convert(TITLE).map(|figure| figure.to_string()))
        .unwrap_or_else(|| TITLE.to_string())
}

/// Non-blank art lines with trailing padding removed.
fn art_lines(art: &str) -> Vec<&str> {
    art.lines()
        .map(str::trim_end)
        .filter(|l| !l.is_empty())
        .collect()
}

/// `── label ─────` stretched to `width` columns, never shorter than the label.
fn rule(label: &str, width: usize) -> String {
    let head = format!("── {} ", label);
    let used = head.chars().count();
    format!("{}{}", head, "─".repeat(width.saturating_sub(used)))
}

fn write_welcome(out: &mut impl Write) -> io::Result<()> {
    let art = title_art();
    let lines = art_lines(&art);
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    queue!(out, SetForegroundColor(Color::Cyan))?;
    for line in &lines {
        queue!(out, Print(line), Print("\r\n"))?;
    }
    let version = format!("scheduler v{}", env!("CARGO_PKG_VERSION"));
    queue!(
        out,
        SetForegroundColor(Color::DarkGrey),
        Print(rule(&version, width)),
        Print("\r\n"),
        ResetColor,
        Print(SUBTITLE),
        Print("\r\n\r\n"),
    )?;
    out.flush()
}

/// Prints the welcome banner. Output errors are ignored.
pub fn print_welcome() {
    let _ = write_welcome(&mut stdout());
}
