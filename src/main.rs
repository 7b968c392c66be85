use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{
    Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph, Row as TableRow, Table as TableWidget,
};

use aram_board::config::{self, DataConfig, ITEM_SUMMARY_FILE, SPELL_SUMMARY_FILE};
use aram_board::export;
use aram_board::logging;
use aram_board::state::AppState;
use aram_board::view::{
    DashboardView, FOOTER_CAPTION, PhasePoint, SummaryPanel, SummarySection, Tile,
};

const STAT_TILES_PER_ROW: usize = 5;

struct App {
    state: AppState,
    should_quit: bool,
    export_dir: PathBuf,
    view: Result<Option<DashboardView>, String>,
}

impl App {
    fn new(state: AppState, export_dir: PathBuf) -> Self {
        let mut app = Self {
            state,
            should_quit: false,
            export_dir,
            view: Ok(None),
        };
        app.refresh_view();
        app
    }

    // Every interaction rebuilds the view from the cached tables.
    fn refresh_view(&mut self) {
        self.state.clamp_selection();
        self.view = self.state.dashboard().map_err(|err| err.to_string());
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.search_active {
            self.on_search_key(key);
        } else {
            self.on_nav_key(key);
        }
        self.refresh_view();
    }

    fn on_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => self.state.search_active = false,
            KeyCode::Backspace => self.state.pop_search_char(),
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.state.clear_search()
            }
            KeyCode::Char(ch) => self.state.push_search_char(ch),
            KeyCode::Down => self.state.select_next(),
            KeyCode::Up => self.state.select_prev(),
            _ => {}
        }
    }

    fn on_nav_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('/') => self.state.search_active = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('x') | KeyCode::Char('X') => self.export_current(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => {
                if self.state.help_overlay {
                    self.state.help_overlay = false;
                } else if !self.state.search.is_empty() {
                    self.state.clear_search();
                }
            }
            _ => {}
        }
    }

    fn export_current(&mut self) {
        let view = match &self.view {
            Ok(Some(view)) => view.clone(),
            Ok(None) => {
                self.state.push_log("[INFO] No champion selected for export");
                return;
            }
            Err(err) => {
                let msg = format!("[WARN] Export unavailable: {err}");
                self.state.push_log(msg);
                return;
            }
        };
        match export::export_dashboard(&self.export_dir, &view) {
            Ok(report) => {
                self.state.push_log(format!(
                    "[INFO] Exported {} ({} spell rows, {} item rows)",
                    report.path.display(),
                    report.spell_rows,
                    report.item_rows
                ));
                self.state.export.finish_ok(report.path);
            }
            Err(err) => {
                self.state.push_log(format!("[WARN] Export failed: {err:#}"));
                self.state.export.finish_err(format!("{err:#}"));
            }
        }
    }
}

fn main() -> Result<()> {
    config::load_dotenv();
    let config = DataConfig::from_env();
    logging::init_file_logging(config.log_file.as_deref())?;

    let mut state = AppState::load(&config)
        .context("cannot render the dashboard without champion data")?;
    announce_load(&mut state, &config);
    let mut app = App::new(state, config.export_dir.clone());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn announce_load(state: &mut AppState, config: &DataConfig) {
    let msg = format!(
        "[INFO] Loaded {} ({} champions) from {}",
        state.datasets.source_name,
        state.datasets.master.names().len(),
        config.data_dir.display()
    );
    state.push_log(msg);
    if state.datasets.spell_summary.is_none() {
        state.push_log(format!("[INFO] {SPELL_SUMMARY_FILE} not available"));
    }
    if state.datasets.item_summary.is_none() {
        state.push_log(format!("[INFO] {ITEM_SUMMARY_FILE} not available"));
    }
    let warnings = state.cache.warnings().to_vec();
    for warning in warnings {
        state.push_log(format!("[WARN] {warning}"));
    }
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        app.state.maybe_clear_export(Instant::now());

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(40)])
        .split(chunks[1]);

    render_sidebar(frame, body[0], &app.state);
    match &app.view {
        Ok(Some(view)) => render_dashboard(frame, body[1], view),
        Ok(None) => {
            let text = if app.state.search.is_empty() {
                "No champions in the dataset".to_string()
            } else {
                format!("No champion matches \"{}\"", app.state.search)
            };
            let empty = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
            frame.render_widget(empty, body[1]);
        }
        Err(err) => {
            let failed = Paragraph::new(format!("Cannot build the dashboard: {err}"))
                .style(Style::default().fg(Color::Red));
            frame.render_widget(failed, body[1]);
        }
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state))
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        let area = frame.size();
        render_help_overlay(frame, area);
    }
}

fn header_text(app: &App) -> String {
    let title = match &app.view {
        Ok(Some(view)) => view.title.clone(),
        _ => "ARAM | champion dashboard".to_string(),
    };
    let datasets = &app.state.datasets;
    let loaded = datasets
        .loaded_at
        .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    let line1 = format!(" {title}");
    let line2 = format!(
        " Data source: {} | loaded {} | {} champions",
        datasets.source_name,
        loaded,
        datasets.master.names().len()
    );
    format!("{line1}\n{line2}")
}

fn footer_text(state: &AppState) -> String {
    if state.search_active {
        return "Type to filter | Backspace Delete | Ctrl-u Clear | Enter/Esc Done | ↑/↓ Move"
            .to_string();
    }
    match state.export.status_line() {
        Some(status) => status,
        None => format!(
            "j/k/↑/↓ Move | / Search | x Export | ? Help | q Quit | {FOOTER_CAPTION}"
        ),
    }
}

fn render_sidebar(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let search_style = if state.search_active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let cursor = if state.search_active { "_" } else { "" };
    let search = Paragraph::new(format!("{}{cursor}", state.search))
        .style(search_style)
        .block(Block::default().title("Search").borders(Borders::ALL));
    frame.render_widget(search, sections[0]);

    let block = Block::default().title("Champions").borders(Borders::ALL);
    let inner = block.inner(sections[1]);
    frame.render_widget(block, sections[1]);
    if inner.height == 0 {
        return;
    }

    let names = state.filtered_names();
    if names.is_empty() {
        let empty = Paragraph::new("No matches").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let visible = inner.height as usize;
    let (start, end) = visible_range(state.selected, names.len(), visible);
    let lines: Vec<Line> = (start..end)
        .map(|idx| {
            if idx == state.selected {
                Line::styled(
                    format!("> {}", names[idx]),
                    Style::default().fg(Color::White).bg(Color::DarkGray),
                )
            } else {
                Line::raw(format!("  {}", names[idx]))
            }
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_dashboard(frame: &mut Frame, area: Rect, view: &DashboardView) {
    let stat_rows = view.profile.base_stats.len().div_ceil(STAT_TILES_PER_ROW).max(1) as u16;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(1),
            Constraint::Length(9),
            Constraint::Length(stat_rows + 2),
            Constraint::Min(6),
        ])
        .split(area);

    render_kpis(frame, rows[0], &view.profile.kpis);

    let shift = match &view.profile.meta_shift {
        Some(delta) => Paragraph::new(format!(" Recent meta shift (recent vs past): {delta}"))
            .style(Style::default().fg(Color::Cyan)),
        None => Paragraph::new(""),
    };
    frame.render_widget(shift, rows[1]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[2]);
    let build = Paragraph::new(build_text(view))
        .block(Block::default().title("Runes / Spells / Items").borders(Borders::ALL));
    frame.render_widget(build, middle[0]);
    render_phase(frame, middle[1], view.profile.phase.as_deref());

    let stats = Paragraph::new(base_stats_text(&view.profile.base_stats))
        .block(Block::default().title("Base stats").borders(Borders::ALL));
    frame.render_widget(stats, rows[3]);

    let tables = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[4]);
    render_summary(frame, tables[0], &view.spells);
    render_summary(frame, tables[1], &view.items);
}

fn render_kpis(frame: &mut Frame, area: Rect, kpis: &[Tile]) {
    if kpis.is_empty() {
        return;
    }
    let constraints = vec![Constraint::Ratio(1, kpis.len() as u32); kpis.len()];
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);
    for (tile, col) in kpis.iter().zip(cols.iter()) {
        let value = Paragraph::new(tile.value.clone())
            .style(Style::default().add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .block(Block::default().title(tile.label).borders(Borders::ALL));
        frame.render_widget(value, *col);
    }
}

fn build_text(view: &DashboardView) -> String {
    let mut lines: Vec<String> = view
        .profile
        .build
        .iter()
        .map(|tile| format!("{}: {}", tile.label, tile.value))
        .collect();
    if !view.profile.pairings.is_empty() {
        lines.push(String::new());
    }
    for line in &view.profile.pairings {
        lines.push(format!("{}: {} ({})", line.label, line.champion, line.winrate));
    }
    lines.join("\n")
}

fn render_phase(frame: &mut Frame, area: Rect, phase: Option<&[PhasePoint]>) {
    let block = Block::default().title("DPM by phase").borders(Borders::ALL);
    let Some(points) = phase else {
        let empty = Paragraph::new("No phase DPM data (optional)")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    };

    let bars: Vec<Bar> = points
        .iter()
        .map(|point| {
            let text = point
                .value
                .map(|v| format!("{v:.0}"))
                .unwrap_or_else(|| "—".to_string());
            Bar::default()
                .label(Line::from(point.label))
                .value(point.value.unwrap_or(0.0).max(0.0).round() as u64)
                .text_value(text)
                .style(Style::default().fg(Color::Cyan))
        })
        .collect();

    let inner_width = area.width.saturating_sub(2);
    let gap = 2u16;
    let count = bars.len().max(1) as u16;
    let bar_width = (inner_width.saturating_sub(gap * (count - 1)) / count).clamp(1, 18);

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(gap);
    frame.render_widget(chart, area);
}

fn base_stats_text(stats: &[Tile]) -> String {
    if stats.is_empty() {
        return "No base stats in this dataset".to_string();
    }
    stats
        .chunks(STAT_TILES_PER_ROW)
        .map(|row| {
            row.iter()
                .map(|tile| format!("{:<14}{:>9}", tile.label, tile.value))
                .collect::<Vec<_>>()
                .join("  ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_summary(frame: &mut Frame, area: Rect, panel: &SummaryPanel) {
    let block = Block::default().title(panel.title).borders(Borders::ALL);
    let table = match &panel.section {
        SummarySection::Ready(table) => table,
        SummarySection::Unavailable { caption } => {
            let empty = Paragraph::new(caption.clone())
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }
    };

    let header = TableRow::new(table.columns.clone())
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<TableRow> = table
        .rows
        .iter()
        .map(|row| TableRow::new(row.clone()))
        .collect();
    let widths: Vec<Constraint> = table
        .columns
        .iter()
        .enumerate()
        .map(|(idx, _)| {
            if idx == 0 {
                Constraint::Min(16)
            } else {
                Constraint::Length(9)
            }
        })
        .collect();
    let widget = TableWidget::new(rows, widths).header(header).block(block);
    frame.render_widget(widget, area);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(2)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "ARAM Board - Help",
        "",
        "Champions:",
        "  j/k or ↑/↓   Move selection",
        "  /            Search by name",
        "  Esc          Clear search / close help",
        "",
        "Search mode:",
        "  type         Filter (case-insensitive)",
        "  Backspace    Delete a character",
        "  Ctrl-u       Clear the search",
        "  Enter / Esc  Leave search mode",
        "",
        "  x            Export dashboard to .xlsx",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
