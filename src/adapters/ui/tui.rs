//! Implements InputPort. Inquire-based interactive console.
//!
//! Every action reports its own failure and returns to the main menu.

use super::progress::with_spinner;
use crate::adapters::spreadsheet::WorkbookSource;
use crate::domain::{
    DomainError, EmployeeCandidate, EmployeeHours, Enrollment, ErrorKind, ProgressBand,
    RegistrationRecord, TARGET_HOURS, TrainingPriority, TrainingSession,
};
use crate::ports::{InputPort, TrainingBackend};
use crate::usecases::{
    BatchImportPipeline, Catalog, CatalogRecord, DashboardSnapshot, EligibilityResolver,
    FilterState, ImportReport, Proximity, RegistrantCatalog, RegistrantSortKey,
    RegistrationTransaction, SessionCatalog, SessionSortKey, SortDirection,
    TrainingHoursDashboard,
};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use crossterm::style::Stylize;
use inquire::ui::{Color, RenderConfig, Styled};
use inquire::{Confirm, DateSelect, InquireError, MultiSelect, Select, Text};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

const PAGE_SIZE: usize = 12;
const BAR_WIDTH: usize = 30;

/// Prompt styling shared by every inquire prompt.
pub fn apply_theme() {
    let config = RenderConfig::default_colored()
        .with_prompt_prefix(Styled::new("?").with_fg(Color::LightCyan))
        .with_highlighted_option_prefix(Styled::new(">").with_fg(Color::DarkYellow));
    inquire::set_global_render_config(config);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    BrowseSessions,
    RegisterEmployees,
    ImportSessions,
    BrowseRegistrants,
    ImportStatuses,
    Dashboard,
    Exit,
}

impl MenuAction {
    const ALL: [MenuAction; 7] = [
        MenuAction::BrowseSessions,
        MenuAction::RegisterEmployees,
        MenuAction::ImportSessions,
        MenuAction::BrowseRegistrants,
        MenuAction::ImportStatuses,
        MenuAction::Dashboard,
        MenuAction::Exit,
    ];
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MenuAction::BrowseSessions => "Browse upcoming sessions",
            MenuAction::RegisterEmployees => "Register employees for a session",
            MenuAction::ImportSessions => "Import sessions from a workbook",
            MenuAction::BrowseRegistrants => "Browse registrants",
            MenuAction::ImportStatuses => "Update registrant statuses from a workbook",
            MenuAction::Dashboard => "Training hours dashboard",
            MenuAction::Exit => "Exit",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BrowseAction {
    Search,
    DateRange,
    Sort,
    ClearFilters,
    Refresh,
    Back,
}

impl BrowseAction {
    const ALL: [BrowseAction; 6] = [
        BrowseAction::Search,
        BrowseAction::DateRange,
        BrowseAction::Sort,
        BrowseAction::ClearFilters,
        BrowseAction::Refresh,
        BrowseAction::Back,
    ];
}

impl fmt::Display for BrowseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BrowseAction::Search => "Search",
            BrowseAction::DateRange => "Filter by date range",
            BrowseAction::Sort => "Sort",
            BrowseAction::ClearFilters => "Clear filters",
            BrowseAction::Refresh => "Refresh from backend",
            BrowseAction::Back => "Back",
        })
    }
}

/// Prompt option carrying a value behind its display label.
struct Labeled<T> {
    label: String,
    value: T,
}

impl<T> fmt::Display for Labeled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Collections owned by the console for the lifetime of the program.
struct ConsoleState {
    sessions: SessionCatalog,
    registrants: RegistrantCatalog,
}

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    backend: Arc<dyn TrainingBackend>,
    resolver: Arc<EligibilityResolver>,
    pipeline: Arc<BatchImportPipeline>,
    dashboard: Arc<TrainingHoursDashboard>,
    state: Mutex<ConsoleState>,
}

impl TuiInputPort {
    pub fn new(
        backend: Arc<dyn TrainingBackend>,
        resolver: Arc<EligibilityResolver>,
        pipeline: Arc<BatchImportPipeline>,
        dashboard: Arc<TrainingHoursDashboard>,
    ) -> Self {
        Self {
            backend,
            resolver,
            pipeline,
            dashboard,
            state: Mutex::new(ConsoleState {
                sessions: SessionCatalog::sessions(),
                registrants: RegistrantCatalog::registrants(),
            }),
        }
    }

    async fn refresh_sessions(&self, state: &mut ConsoleState) -> Result<(), DomainError> {
        with_spinner(
            "Loading sessions...",
            state.sessions.refresh(self.backend.as_ref(), Utc::now()),
        )
        .await
        .map(|_| ())
    }

    async fn refresh_registrants(&self, state: &mut ConsoleState) -> Result<(), DomainError> {
        with_spinner(
            "Loading registrants...",
            state.registrants.refresh(self.backend.as_ref()),
        )
        .await
        .map(|_| ())
    }

    async fn browse_sessions(&self, state: &mut ConsoleState) -> Result<(), DomainError> {
        if state.sessions.is_stale() || state.sessions.source().is_empty() {
            self.refresh_sessions(state).await?;
        }
        loop {
            print_sessions(&state.sessions, Utc::now().date_naive());
            match prompt_browse_action("Sessions")? {
                BrowseAction::Back => return Ok(()),
                BrowseAction::Refresh => {
                    if let Err(e) = self.refresh_sessions(state).await {
                        report_error(&e);
                    }
                }
                action => edit_view(&mut state.sessions, action, &SessionSortKey::ALL)?,
            }
        }
    }

    async fn browse_registrants(&self, state: &mut ConsoleState) -> Result<(), DomainError> {
        if state.registrants.is_stale() || state.registrants.source().is_empty() {
            self.refresh_registrants(state).await?;
        }
        loop {
            print_registrants(&state.registrants);
            match prompt_browse_action("Registrants")? {
                BrowseAction::Back => return Ok(()),
                BrowseAction::Refresh => {
                    if let Err(e) = self.refresh_registrants(state).await {
                        report_error(&e);
                    }
                }
                action => edit_view(&mut state.registrants, action, &RegistrantSortKey::ALL)?,
            }
        }
    }

    async fn register_employees(&self, state: &mut ConsoleState) -> Result<(), DomainError> {
        if state.sessions.is_stale() || state.sessions.source().is_empty() {
            self.refresh_sessions(state).await?;
        }
        let today = Utc::now().date_naive();
        let options: Vec<Labeled<TrainingSession>> = state
            .sessions
            .visible()
            .into_iter()
            .filter(|s| s.enrollment == Enrollment::Open)
            .map(|s| Labeled {
                label: session_line(s, today),
                value: s.clone(),
            })
            .collect();
        if options.is_empty() {
            return Err(DomainError::EmptySelection(
                "No open upcoming session matches the current filters".to_string(),
            ));
        }

        let Some(choice) = Select::new("Session to register for:", options)
            .with_page_size(PAGE_SIZE)
            .prompt_skippable()
            .map_err(ui_err)?
        else {
            return Ok(());
        };
        let session = choice.value;
        println!(
            "Requirement: {}",
            session.requirement.as_str().dark_yellow()
        );

        let mut pool = with_spinner(
            "Finding eligible employees...",
            self.resolver
                .candidate_pool(&session.topic, &session.requirement),
        )
        .await?;
        if pool.is_empty() {
            println!("No eligible employees left for {}.", session.topic);
            return Ok(());
        }
        if pool.all().len() > PAGE_SIZE {
            let term = Text::new("Narrow candidates (name, department or NIP, empty for all):")
                .prompt_skippable()
                .map_err(ui_err)?;
            if let Some(term) = term {
                pool.set_search(&term);
            }
        }

        let candidates: Vec<Labeled<i64>> = pool
            .visible()
            .into_iter()
            .map(|c| Labeled {
                label: candidate_line(c),
                value: c.id,
            })
            .collect();
        if candidates.is_empty() {
            return Err(DomainError::EmptySelection(format!(
                "No candidate matches \"{}\"",
                pool.search()
            )));
        }

        let message = format!("Employees to register for {}:", session.topic);
        let Some(picked) = MultiSelect::new(&message, candidates)
            .with_page_size(PAGE_SIZE)
            .prompt_skippable()
            .map_err(ui_err)?
        else {
            return Ok(());
        };

        let mut tx = RegistrationTransaction::new(Some(session.id));
        tx.selection_mut().set(picked.into_iter().map(|o| o.value));
        loop {
            let submit = tx.submit_and_invalidate(
                self.backend.as_ref(),
                &mut state.sessions,
                &mut state.registrants,
            );
            match with_spinner("Registering...", submit).await {
                Ok(outcome) => {
                    let text = outcome.message.unwrap_or_else(|| {
                        format!("{} employee(s) registered", outcome.registered)
                    });
                    println!("{}", text.green());
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::Transport => {
                    report_error(&e);
                    let retry = Confirm::new(&format!(
                        "Retry with the same {} employee(s)?",
                        tx.selection().len()
                    ))
                    .with_default(true)
                    .prompt()
                    .map_err(ui_err)?;
                    if !retry {
                        return Ok(());
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn import_sessions(&self, state: &mut ConsoleState) -> Result<(), DomainError> {
        let Some(path) = prompt_path("Session workbook (.xlsx, .xls, .ods or .csv):")? else {
            return Ok(());
        };
        let source = WorkbookSource::from_path(&path).await?;
        let report = with_spinner(
            format!("Importing {}...", source.name),
            self.pipeline
                .import_sessions(&source, &mut state.sessions, Utc::now()),
        )
        .await?;
        print_report(&report, "session(s) imported");
        Ok(())
    }

    async fn import_statuses(&self, state: &mut ConsoleState) -> Result<(), DomainError> {
        let Some(path) = prompt_path("Status workbook with nama, nip, topic[, status]:")? else {
            return Ok(());
        };
        let source = WorkbookSource::from_path(&path).await?;
        let report = with_spinner(
            format!("Updating statuses from {}...", source.name),
            self.pipeline
                .update_statuses(&source, &mut state.registrants),
        )
        .await?;
        print_report(&report, "status update(s) applied");
        Ok(())
    }

    async fn show_dashboard(&self) -> Result<(), DomainError> {
        let snapshot = with_spinner("Loading training hours...", self.dashboard.load()).await?;
        print_dashboard(&snapshot);
        Ok(())
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        loop {
            let action = match Select::new("What would you like to do?", MenuAction::ALL.to_vec())
                .prompt_skippable()
            {
                Ok(Some(action)) => action,
                Ok(None) | Err(InquireError::OperationInterrupted) => MenuAction::Exit,
                Err(e) => return Err(ui_err(e)),
            };

            let result = match action {
                MenuAction::BrowseSessions => self.browse_sessions(&mut state).await,
                MenuAction::RegisterEmployees => self.register_employees(&mut state).await,
                MenuAction::ImportSessions => self.import_sessions(&mut state).await,
                MenuAction::BrowseRegistrants => self.browse_registrants(&mut state).await,
                MenuAction::ImportStatuses => self.import_statuses(&mut state).await,
                MenuAction::Dashboard => self.show_dashboard().await,
                MenuAction::Exit => {
                    info!("console closed");
                    return Ok(());
                }
            };
            if let Err(e) = result {
                report_error(&e);
            }
        }
    }
}

fn ui_err(e: InquireError) -> DomainError {
    DomainError::Ui(e.to_string())
}

/// Print a failure with a prefix matching its kind.
fn report_error(e: &DomainError) {
    let prefix = match e.kind() {
        ErrorKind::StructuralFile => "File rejected",
        ErrorKind::RowValidation => "Import rejected",
        ErrorKind::Transport => "Backend error",
        ErrorKind::EmptySelection => "Nothing to do",
        ErrorKind::Local => "Error",
    };
    let line = format!("{}: {}", prefix, e);
    match e.kind() {
        ErrorKind::EmptySelection => println!("{}", line.yellow()),
        _ => println!("{}", line.red()),
    }
}

fn print_report(report: &ImportReport, what: &str) {
    let text = report
        .message
        .clone()
        .unwrap_or_else(|| format!("{} {}", report.rows, what));
    println!("{}", text.green());
    if !report.catalog_refreshed {
        println!(
            "{}",
            "The list could not be reloaded; refresh it from the browse menu.".yellow()
        );
    }
}

fn prompt_browse_action(title: &str) -> Result<BrowseAction, DomainError> {
    Ok(Select::new(title, BrowseAction::ALL.to_vec())
        .prompt_skippable()
        .map_err(ui_err)?
        .unwrap_or(BrowseAction::Back))
}

/// Apply a search, date or sort change to a catalog view.
fn edit_view<R>(
    catalog: &mut Catalog<R>,
    action: BrowseAction,
    keys: &[R::SortKey],
) -> Result<(), DomainError>
where
    R: CatalogRecord,
    R::SortKey: fmt::Display,
{
    match action {
        BrowseAction::Search => {
            let term = Text::new("Search (empty to clear):")
                .with_initial_value(&catalog.filter().search)
                .prompt_skippable()
                .map_err(ui_err)?;
            if let Some(term) = term {
                catalog.set_search(term.trim());
            }
        }
        BrowseAction::DateRange => {
            let (start, end) = prompt_date_range(catalog.filter())?;
            catalog.set_date_bounds(start, end);
        }
        BrowseAction::Sort => {
            let key = Select::new("Sort by (same column again reverses):", keys.to_vec())
                .prompt_skippable()
                .map_err(ui_err)?;
            if let Some(key) = key {
                catalog.sort_by(key);
            }
        }
        BrowseAction::ClearFilters => {
            catalog.apply_filters("", None, None);
        }
        BrowseAction::Refresh | BrowseAction::Back => {}
    }
    Ok(())
}

fn prompt_date_range(
    current: &FilterState,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>), DomainError> {
    let start = prompt_day("From (Esc for no lower bound):", current.start_bound)?;
    let end = prompt_day(
        "Until (Esc for no upper bound):",
        current.end_bound.or(start),
    )?;
    Ok((start, end))
}

fn prompt_day(
    message: &str,
    starting: Option<NaiveDate>,
) -> Result<Option<NaiveDate>, DomainError> {
    let mut prompt = DateSelect::new(message);
    if let Some(day) = starting {
        prompt = prompt.with_starting_date(day);
    }
    prompt.prompt_skippable().map_err(ui_err)
}

fn prompt_path(message: &str) -> Result<Option<PathBuf>, DomainError> {
    let input = Text::new(message).prompt_skippable().map_err(ui_err)?;
    Ok(input.as_deref().and_then(clean_path).map(PathBuf::from))
}

/// Trim whitespace and the quotes terminals add around dropped files.
fn clean_path(input: &str) -> Option<&str> {
    let trimmed = input.trim().trim_matches(|c| c == '"' || c == '\'').trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// One-line summary of what a catalog view currently shows.
fn describe_view<R>(catalog: &Catalog<R>) -> String
where
    R: CatalogRecord,
    R::SortKey: fmt::Display,
{
    let mut parts = vec![format!(
        "{} of {} {}s",
        catalog.visible_len(),
        catalog.source().len(),
        catalog.name()
    )];
    let filter = catalog.filter();
    if !filter.search.is_empty() {
        parts.push(format!("search \"{}\"", filter.search));
    }
    if let Some(day) = filter.start_bound {
        parts.push(format!("from {}", day));
    }
    if let Some(day) = filter.end_bound {
        parts.push(format!("until {}", day));
    }
    if let Some(sort) = catalog.sort_state() {
        let arrow = match sort.direction {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        };
        parts.push(format!("sorted by {} {}", sort.key, arrow));
    }
    if catalog.is_stale() {
        parts.push("outdated".to_string());
    }
    parts.join(" | ")
}

fn session_line(s: &TrainingSession, today: NaiveDate) -> String {
    format!(
        "{} | {} - {} | {}h | {} | {} [{}]",
        s.topic,
        s.start.format("%d %b %Y"),
        s.end.format("%d %b %Y"),
        s.duration_hours,
        s.venue,
        s.requirement,
        Proximity::of(s, today).label()
    )
}

fn candidate_line(c: &EmployeeCandidate) -> String {
    format!(
        "{} ({}) | {} | {} | grade {}",
        c.name, c.nip, c.department, c.position, c.grade
    )
}

fn registrant_line(r: &RegistrationRecord) -> String {
    format!(
        "{} ({}) | {} | {} | {} - {} | {}",
        r.name,
        r.nip,
        r.department,
        r.topic,
        r.start.format("%d %b %Y"),
        r.end.format("%d %b %Y"),
        r.status
    )
}

fn print_sessions(catalog: &SessionCatalog, today: NaiveDate) {
    println!();
    println!("{}", describe_view(catalog).cyan());
    for s in catalog.visible() {
        let line = session_line(s, today);
        match s.enrollment {
            Enrollment::Open => println!("  {}", line),
            Enrollment::Closed => println!("  {} {}", line.dark_grey(), "(closed)".dark_grey()),
        }
    }
    println!();
}

fn print_registrants(catalog: &RegistrantCatalog) {
    println!();
    println!("{}", describe_view(catalog).cyan());
    for r in catalog.visible() {
        println!("  {}", registrant_line(r));
    }
    println!();
}

/// `width` columns of `#`, proportional to `value / max`.
fn hours_bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || !value.is_finite() || value <= 0.0 {
        return String::new();
    }
    let filled = ((value / max).min(1.0) * width as f64).round() as usize;
    "#".repeat(filled)
}

fn employee_hours_line(e: &EmployeeHours) -> String {
    let hours = e.hours.map_or_else(|| "?".to_string(), |h| h.to_string());
    format!(
        "{} ({}) | {} | {} | {}/{} h",
        e.name, e.nip, e.department, e.position, hours, TARGET_HOURS
    )
}

fn print_dashboard(snapshot: &DashboardSnapshot) {
    println!();
    match snapshot.division {
        Some(d) => {
            let line = format!(
                "Division: {:.1} of {} h ({}%) {}",
                d.hours,
                TARGET_HOURS,
                d.rounded_percent(),
                hours_bar(d.hours, TARGET_HOURS, BAR_WIDTH)
            );
            match d.band {
                ProgressBand::Red => println!("{}", line.red()),
                ProgressBand::Yellow => println!("{}", line.yellow()),
                ProgressBand::Green => println!("{}", line.green()),
            }
        }
        None => println!("{}", "Division: no figure from the backend".dark_grey()),
    }

    let counts = snapshot.priority_counts();
    println!(
        "{}",
        format!(
            "Employees: {} high | {} medium | {} low | {} unclassified",
            counts.high, counts.medium, counts.low, counts.unclassified
        )
        .cyan()
    );
    for e in &snapshot.employees {
        let line = employee_hours_line(e);
        match e.priority() {
            Some(TrainingPriority::High) => println!("  {} {}", line, "High".red()),
            Some(TrainingPriority::Medium) => println!("  {} {}", line, "Medium".yellow()),
            Some(TrainingPriority::Low) => println!("  {} {}", line, "Low".green()),
            None => println!("  {}", line),
        }
    }

    println!("{}", "Hours per employee by department:".cyan());
    let max = snapshot.max_department_hours();
    for d in &snapshot.departments {
        println!(
            "  {:<20} {:>6.1} {}",
            d.department,
            d.hours_per_employee,
            hours_bar(d.hours_per_employee, max, BAR_WIDTH)
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session() -> TrainingSession {
        TrainingSession {
            id: 7,
            topic: "Fire Safety".into(),
            start: Utc.with_ymd_and_hms(2025, 6, 16, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 6, 17, 0, 0, 0).unwrap(),
            duration_hours: 8.0,
            venue: "Jakarta".into(),
            requirement: "Worker - Staff".into(),
            enrollment: Enrollment::Open,
        }
    }

    #[test]
    fn test_clean_path_strips_quotes() {
        assert_eq!(clean_path("  '/tmp/jadwal.xlsx' "), Some("/tmp/jadwal.xlsx"));
        assert_eq!(clean_path("\"C:\\data\\status.csv\""), Some("C:\\data\\status.csv"));
        assert_eq!(clean_path("   "), None);
    }

    #[test]
    fn test_session_line() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 16).unwrap();
        let line = session_line(&session(), today);
        assert_eq!(
            line,
            "Fire Safety | 16 Jun 2025 - 17 Jun 2025 | 8h | Jakarta | Worker - Staff [today]"
        );
    }

    #[test]
    fn test_describe_view() {
        let mut catalog = SessionCatalog::sessions();
        let ticket = catalog.begin_refresh().unwrap();
        assert!(catalog.complete_refresh(ticket, vec![session()]));
        catalog.set_search("fire");
        catalog.sort_by(SessionSortKey::Venue);
        assert_eq!(
            describe_view(&catalog),
            "1 of 1 sessions | search \"fire\" | sorted by Venue asc"
        );
    }

    #[test]
    fn test_hours_bar_scales_and_caps() {
        assert_eq!(hours_bar(7.0, 14.0, 10), "#####");
        assert_eq!(hours_bar(28.0, 14.0, 10), "##########");
        assert_eq!(hours_bar(0.0, 14.0, 10), "");
        assert_eq!(hours_bar(3.0, 0.0, 10), "");
    }

    #[test]
    fn test_employee_hours_line() {
        let mut e = EmployeeHours {
            name: "Budi".into(),
            nip: "00123".into(),
            department: "Production".into(),
            position: "worker".into(),
            hours: Some(12.0),
        };
        assert_eq!(employee_hours_line(&e), "Budi (00123) | Production | worker | 12/14 h");
        e.hours = None;
        assert!(employee_hours_line(&e).ends_with("| ?/14 h"));
    }
}
