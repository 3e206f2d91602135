//! Spinners shown while a backend call is in flight.

use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(90);

/// A running spinner with `message`. Finish it with `finish_and_clear`.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
    bar.set_message(message.into());
    bar.enable_steady_tick(TICK);
    bar
}

/// Await `fut` behind a spinner; the spinner is cleared whatever the outcome.
pub async fn with_spinner<F: Future>(message: impl Into<String>, fut: F) -> F::Output {
    let bar = spinner(message);
    let out = fut.await;
    bar.finish_and_clear();
    out
}
