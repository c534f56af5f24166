mod charts;
mod export;
mod help;
mod state;

use crate::cli::{build_config, Cli};
use crate::engine::HttpTrendsApi;
use crate::model::{CrawlEvent, Role, Tone, TrendsReport};
use crate::orchestrator::{self, UiCommand};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Terminal,
};
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::info;

use export::{export_and_show_path, export_report_csv, export_report_json};
use state::{tone_color, UiState};

pub async fn run(args: Cli) -> Result<()> {
    // Unbounded channels avoid backpressure between the controller and the render loop.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<CrawlEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    let cfg = build_config(&args);
    let api = HttpTrendsApi::new(&cfg)?;
    info!(base_url = %cfg.base_url, "dashboard starting");

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let ui_args = args.clone();
    let ui_handle = std::thread::spawn(move || run_threaded(ui_args, event_rx, cmd_tx));

    let res =
        orchestrator::run_controller(api, cfg, args.load_on_launch, event_tx, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread.
pub fn run_threaded(
    args: Cli,
    mut event_rx: UnboundedReceiver<CrawlEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    // UiState is owned by the UI thread only; no cross-thread mutation.
    let mut state = UiState::with_roles(&args.roles);
    let countdown_secs = build_config(&args).countdown_secs();

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    let res = loop {
        // Drain events without blocking to keep the UI responsive.
        while let Ok(ev) = event_rx.try_recv() {
            if let Some((role, report)) = state.apply_event(ev) {
                handle_results(&args, &mut state, &role, &report);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            terminal
                .draw(|f| draw(f.area(), f, &state, countdown_secs))
                .ok();
            last_tick = Instant::now();
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                match (k.modifiers, k.code) {
                    (_, KeyCode::Char('q')) | (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                        let _ = cmd_tx.send(UiCommand::Quit);
                        break Ok(());
                    }
                    (_, KeyCode::Enter) => {
                        if state.tab == 0 {
                            let _ = cmd_tx
                                .send(UiCommand::StartCrawl(state.selected_role().to_string()));
                        }
                    }
                    (_, KeyCode::Char('a')) => {
                        let _ = cmd_tx.send(UiCommand::ShowAllRoles);
                    }
                    (_, KeyCode::Char('e')) => {
                        export_and_show_path(&mut state, export_report_json);
                    }
                    (_, KeyCode::Char('c')) => {
                        export_and_show_path(&mut state, export_report_csv);
                    }
                    (_, KeyCode::Tab) => {
                        state.tab = (state.tab + 1) % 2;
                    }
                    (_, KeyCode::Char('?')) => {
                        state.tab = 1;
                    }
                    (_, KeyCode::Up) | (_, KeyCode::Char('k')) => {
                        if state.tab == 0 {
                            state.select_prev();
                        }
                    }
                    (_, KeyCode::Down) | (_, KeyCode::Char('j')) => {
                        if state.tab == 0 {
                            state.select_next();
                        }
                    }
                    _ => {}
                }
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

/// Run configured exports for a freshly loaded report and surface their outcome.
fn handle_results(args: &Cli, state: &mut UiState, role: &Role, report: &TrendsReport) {
    let processed = orchestrator::process_report(args, role, report);
    if !processed.export_messages.is_empty() {
        state.info = processed.export_messages.join("; ");
    }
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState, countdown_secs: u64) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let tabs = Tabs::new(vec![Line::from("Dashboard"), Line::from("Help")])
        .select(state.tab)
        .block(Block::default().borders(Borders::ALL).title("job-trends"))
        .highlight_style(Style::default().fg(Color::Yellow));
    f.render_widget(tabs, chunks[0]);

    match state.tab {
        0 => draw_dashboard(chunks[1], f, state),
        _ => help::draw_help(chunks[1], f, countdown_secs),
    }
}

fn draw_dashboard(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3), // Role selector + action
                Constraint::Length(5), // Status, countdown, info
                Constraint::Min(0),    // Charts
            ]
            .as_ref(),
        )
        .split(area);

    let selector = Paragraph::new(Line::from(vec![
        Span::styled("Role: ", Style::default().fg(Color::Gray)),
        Span::raw("◀ "),
        Span::styled(
            state.selected_label().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" ▶   "),
        Span::styled("[Enter] ", Style::default().fg(Color::Magenta)),
        Span::styled(state.action_label(), Style::default().fg(tone_color(Tone::Normal))),
    ]))
    .block(Block::default().borders(Borders::ALL).title("Analyze"));
    f.render_widget(selector, main[0]);

    let mut lines = vec![Line::from(Span::styled(
        state.status.clone(),
        Style::default().fg(state.status_color()),
    ))];
    if !state.countdown.is_empty() {
        lines.push(Line::from(state.countdown.clone()));
    }
    if !state.info.is_empty() {
        lines.push(Line::from(Span::styled(
            state.info.clone(),
            Style::default().fg(Color::Gray),
        )));
    }
    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Status")),
        main[1],
    );

    if state.results_visible {
        charts::draw_chart_grid(f, main[2], state);
    } else {
        let placeholder = if state.session.is_active() {
            "Waiting for results..."
        } else {
            "No results to show. Select a role and press Enter."
        };
        f.render_widget(
            Paragraph::new(placeholder)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Gray))
                .block(Block::default().borders(Borders::ALL).title("Trends")),
            main[2],
        );
    }
}
