use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind}, execute, terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen}};
use ratatui::{backend::CrosstermBackend, Terminal, widgets::{Block, Borders, List, ListItem, Paragraph, ListState}, layout::{Layout, Constraint, Direction}, style::{Style, Modifier, Color}};
use serde_json::json;

use duties::{application::duty_service::{DutyService, DutyServiceImpl}, config::Config, domain::{duty::Duty, error::AppError, repository::DutyRepository}, infrastructure::sqlite_repo::SqliteDutyRepository};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    let repo = SqliteDutyRepository::connect(&config.database_url, config.max_connections).await?;
    repo.init().await?;
    let service = DutyServiceImpl::new(repo);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, service, &config.database_url).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode { View, Create, Rename }

#[derive(Clone, Copy, PartialEq, Eq)]
enum Filter { All, Pending, Completed }

impl Filter {
    fn next(self) -> Self {
        match self { Filter::All => Filter::Pending, Filter::Pending => Filter::Completed, Filter::Completed => Filter::All }
    }

    fn label(self) -> &'static str {
        match self { Filter::All => "All", Filter::Pending => "Pending", Filter::Completed => "Completed" }
    }

    fn includes(self, duty: &Duty) -> bool {
        match self { Filter::All => true, Filter::Pending => !duty.is_completed, Filter::Completed => duty.is_completed }
    }
}

struct App<S: DutyService> {
    service: S,
    items: Vec<Duty>,
    selected: usize,
    last_tick: Instant,
    mode: Mode,
    list_state: ListState,
    filter: Filter,
    filtered_indices: Vec<usize>,
    draft: String,
    last_error: Option<AppError>,
}

impl<S: DutyService> App<S> {
    async fn load(&mut self) {
        match self.service.list().await {
            Ok(duties) => self.items = duties,
            Err(err) => self.last_error = Some(err),
        }
        self.recompute_filtered();
    }

    fn recompute_filtered(&mut self) {
        self.filtered_indices = self.items.iter().enumerate().filter(|(_, d)| self.filter.includes(d)).map(|(i, _)| i).collect();
        let len = self.filtered_indices.len();
        if len == 0 { self.selected = 0; self.list_state.select(None); }
        else { if self.selected >= len { self.selected = len - 1; } self.list_state.select(Some(self.selected)); }
    }

    fn current(&self) -> Option<&Duty> {
        self.filtered_indices.get(self.selected).and_then(|&idx| self.items.get(idx))
    }

    fn record<T>(&mut self, outcome: Result<T, AppError>) {
        self.last_error = outcome.err();
    }

    fn reset_draft(&mut self) {
        self.mode = Mode::View;
        self.draft.clear();
    }
}

async fn run_app<S: DutyService>(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, service: S, database_url: &str) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut app = App { service, items: vec![], selected: 0, last_tick: Instant::now(), mode: Mode::View, list_state: ListState::default(), filter: Filter::All, filtered_indices: Vec::new(), draft: String::new(), last_error: None };
    app.load().await;

    loop {
        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(1),
                    Constraint::Length(3),
                ])
                .split(f.size());

            let header = Paragraph::new("Duties (Enter: toggle, n: new, e: rename, d: delete, f: filter, q: quit)")
                .block(Block::default().borders(Borders::ALL).title("duties"));
            f.render_widget(header, chunks[0]);

            let middle = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(chunks[1]);

            let list_items: Vec<ListItem> = app.filtered_indices.iter().filter_map(|&idx| app.items.get(idx)).map(|d| {
                let mark = if d.is_completed { "[x]" } else { "[ ]" };
                ListItem::new(format!("{} {}", mark, d.name))
            }).collect();
            let list = List::new(list_items)
                .block(Block::default().borders(Borders::ALL).title(format!("duties [{}]", app.filter.label())))
                .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::REVERSED))
                .highlight_symbol(">> ");
            f.render_stateful_widget(list, middle[0], &mut app.list_state);

            let detail = app.current().map(|d| format!(
                "Name:\n{}\n\nCompleted: {}\n\nCreated: {}\nUpdated: {}\n\nID: {}",
                d.name,
                if d.is_completed { "yes" } else { "no" },
                d.created_at.format("%Y-%m-%d %H:%M:%S"),
                d.updated_at.format("%Y-%m-%d %H:%M:%S"),
                d.id,
            )).unwrap_or_default();
            let details = Paragraph::new(detail)
                .block(Block::default().borders(Borders::ALL).title("details"));
            f.render_widget(details, middle[1]);

            let footer_text = match (app.mode, &app.last_error) {
                (Mode::View, Some(err)) => format!("{}: {}", err.code.as_str(), err.message),
                (Mode::View, None) => format!("DATABASE_URL={}  |  {} duties", database_url, app.items.len()),
                (Mode::Create, _) => format!("New duty: {}_  |  (Enter to save, Esc to cancel)", app.draft),
                (Mode::Rename, _) => format!("Rename: {}_  |  (Enter to save, Esc to cancel)", app.draft),
            };
            let footer = Paragraph::new(footer_text)
                .block(Block::default().borders(Borders::ALL).title(match app.mode { Mode::View => "info", Mode::Create => "create", Mode::Rename => "rename" }));
            f.render_widget(footer, chunks[2]);
        })?;

        let timeout = tick_rate.saturating_sub(app.last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Only presses; repeats and releases would duplicate input.
                if key.kind != KeyEventKind::Press { continue; }
                match app.mode {
                    Mode::View => match key.code {
                        KeyCode::Char('q') => break,
                        KeyCode::Up => { if app.selected > 0 { app.selected -= 1; } }
                        KeyCode::Down => { if app.selected + 1 < app.filtered_indices.len() { app.selected += 1; } }
                        KeyCode::Enter => {
                            if let Some((id, done)) = app.current().map(|d| (d.id.to_string(), d.is_completed)) {
                                let outcome = app.service.update(&id, &json!({ "is_completed": !done })).await;
                                app.record(outcome);
                                app.load().await;
                            }
                        }
                        KeyCode::Char('n') => {
                            app.mode = Mode::Create;
                            app.draft.clear();
                        }
                        KeyCode::Char('e') => {
                            if let Some(name) = app.current().map(|d| d.name.clone()) {
                                app.mode = Mode::Rename;
                                app.draft = name;
                            }
                        }
                        KeyCode::Char('d') => {
                            if let Some(id) = app.current().map(|d| d.id.to_string()) {
                                let outcome = app.service.delete(&id).await;
                                app.record(outcome);
                                if app.selected > 0 { app.selected -= 1; }
                                app.load().await;
                            }
                        }
                        KeyCode::Char('f') => {
                            app.filter = app.filter.next();
                            app.recompute_filtered();
                        }
                        _ => {}
                    },
                    Mode::Create | Mode::Rename => match key.code {
                        KeyCode::Esc => app.reset_draft(),
                        KeyCode::Enter => {
                            let body = json!({ "name": app.draft });
                            let outcome = match app.mode {
                                Mode::Create => app.service.create(&body).await,
                                _ => match app.current().map(|d| d.id.to_string()) {
                                    Some(id) => app.service.update(&id, &body).await,
                                    None => Err(AppError::not_found("(none selected)")),
                                },
                            };
                            app.record(outcome);
                            app.reset_draft();
                            app.load().await;
                        }
                        KeyCode::Backspace => { app.draft.pop(); }
                        KeyCode::Char(c) => app.draft.push(c),
                        _ => {}
                    },
                }
            }
        }
        if app.last_tick.elapsed() >= tick_rate {
            app.last_tick = Instant::now();
        }
    }
    Ok(())
}
