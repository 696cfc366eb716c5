use std::collections::HashMap;
use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Circle, Line as CanvasLine, Points};
use ratatui::widgets::{
    Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap,
};

use player_report::aggregate::{self, PlayerSummary};
use player_report::config::ReportConfig;
use player_report::logging;
use player_report::model::{LineupPlayer, LineupTeam, MatchData};
use player_report::pitch::{self, PITCH_LENGTH, PITCH_WIDTH};
use player_report::provider;
use player_report::report::{
    PlayerReport, format_average_length, format_match_date, format_optional, format_xg,
    pass_outcome_label,
};
use player_report::state::{self, AppState, LoadStatus, ProviderCommand, Screen, apply_delta};

const PASS_COLOR: Color = Color::Rgb(0xff, 0x00, 0x00);
const GOAL_COLOR: Color = Color::Rgb(0x1b, 0x68, 0x06);
const HEIGHT_COLORS: [Color; 3] = [Color::Blue, Color::Green, Color::Red];

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: mpsc::Sender<ProviderCommand>,
}

impl App {
    fn new(config: ReportConfig, cmd_tx: mpsc::Sender<ProviderCommand>) -> Self {
        Self {
            state: AppState::new(config),
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.help_overlay {
            match key.code {
                KeyCode::Char('?') | KeyCode::Esc => self.state.help_overlay = false,
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            }
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Char(c @ '1'..='5') => {
                if let Some(screen) = Screen::from_digit(c) {
                    self.state.screen = screen;
                }
            }
            KeyCode::Tab => self.state.cycle_screen(),
            KeyCode::BackTab => self.state.cycle_screen_back(),
            KeyCode::Char('p') => self.state.cycle_player_next(),
            KeyCode::Char('P') => self.state.cycle_player_prev(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.request_reload(),
            KeyCode::Char('j') | KeyCode::Down => {
                let total = self
                    .state
                    .report()
                    .map(|r| r.pass_rows.len())
                    .unwrap_or(0);
                self.state.scroll_pass_table_down(total);
            }
            KeyCode::Char('k') | KeyCode::Up => self.state.scroll_pass_table_up(),
            KeyCode::Char('?') => self.state.help_overlay = true,
            _ => {}
        }
    }

    fn request_load(&mut self) {
        if let Some(cmd) = self.state.request_load() {
            self.send(cmd, "[INFO] Match request sent");
        }
    }

    fn request_reload(&mut self) {
        if let Some(cmd) = self.state.request_reload() {
            self.send(cmd, "[INFO] Reload request sent");
        }
    }

    fn send(&mut self, cmd: ProviderCommand, announce: &str) {
        if self.cmd_tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Loader unavailable");
            self.state.status = LoadStatus::Idle;
        } else {
            self.state.push_log(announce);
        }
    }
}

fn main() -> io::Result<()> {
    let config = ReportConfig::from_env();
    let _log_guard = match logging::setup_logging(config.log_dir.as_deref(), false) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("warning: {err}");
            None
        }
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let _provider = provider::spawn_provider(config.source.clone(), tx, cmd_rx);

    let mut app = App::new(config, cmd_tx);
    app.request_load();
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

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
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let data = app.state.current_match();
    let header = Paragraph::new(header_text(&app.state, data.as_deref()))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match (app.state.report(), data) {
        (Some(report), Some(data)) => match app.state.screen {
            Screen::Overview => render_overview(frame, chunks[1], &report, &app.state),
            Screen::PassMap => render_pass_map(frame, chunks[1], &report),
            Screen::ShotMap => render_shot_map(frame, chunks[1], &report),
            Screen::Compare => render_compare(frame, chunks[1], &report),
            Screen::Lineups => render_lineups(frame, chunks[1], &data),
        },
        _ => render_status(frame, chunks[1], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text()).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState, data: Option<&MatchData>) -> String {
    let tabs = Screen::ALL
        .iter()
        .enumerate()
        .map(|(i, s)| {
            if *s == state.screen {
                format!("[{} {}]", i + 1, s.label())
            } else {
                format!(" {} {} ", i + 1, s.label())
            }
        })
        .collect::<Vec<_>>()
        .join("");
    let line1 = format!("PLAYER REPORT | {} | {tabs}", state.config.player);

    let line2 = match data.and_then(|d| d.info.as_ref()) {
        Some(info) => {
            let score = match (info.home_score, info.away_score) {
                (Some(h), Some(a)) => format!("{h}-{a}"),
                _ => "vs".to_string(),
            };
            let stage = info.stage.as_deref().unwrap_or("-");
            format!(
                "{} {score} {} | {} {} | {stage} | {}",
                info.home_team,
                info.away_team,
                info.competition_name,
                info.season_name,
                format_match_date(&info.match_date, info.kick_off.as_deref())
            )
        }
        None => format!("Match {}", state.config.match_id),
    };
    format!("{line1}\n{line2}")
}

fn footer_text() -> &'static str {
    "1-5/Tab Screen | p/P Player | j/k Scroll | r Reload | ? Help | q Quit"
}

fn render_status(frame: &mut Frame, area: Rect, state: &AppState) {
    let (text, style) = match &state.status {
        LoadStatus::Idle => (
            "No match loaded. Press r to load.".to_string(),
            Style::default().fg(Color::DarkGray),
        ),
        LoadStatus::Loading { match_id } => (
            format!(
                "Loading match {match_id} from {} ...",
                state.config.source.describe()
            ),
            Style::default().fg(Color::Yellow),
        ),
        LoadStatus::Ready => (
            "No data for this match".to_string(),
            Style::default().fg(Color::DarkGray),
        ),
        LoadStatus::Failed { match_id, error } => (
            format!("Match {match_id} could not be loaded:\n{error}\n\nPress r to retry."),
            Style::default().fg(Color::Red),
        ),
    };
    let paragraph = Paragraph::new(text)
        .style(style)
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Status").borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn render_overview(frame: &mut Frame, area: Rect, report: &PlayerReport, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    render_metrics(frame, rows[0], report);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(38)])
        .split(rows[1]);

    render_pass_table(frame, cols[0], report, state.pass_table_scroll);
    render_height_chart(frame, cols[1], report);
}

fn render_metrics(frame: &mut Frame, area: Rect, report: &PlayerReport) {
    let summary = &report.summary;
    let tiles = [
        ("Total Passes", summary.passes.to_string()),
        (
            "Avg Pass Length",
            if report.has_passes() {
                format_average_length(summary.average_pass_length)
            } else {
                "N/A".to_string()
            },
        ),
        ("Total Shots", summary.shots.to_string()),
        ("Goals", summary.goals.to_string()),
        ("Total xG", format_xg(summary.total_xg)),
    ];
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, tiles.len() as u32); 5])
        .split(area);
    for (i, (title, value)) in tiles.into_iter().enumerate() {
        let tile = Paragraph::new(value)
            .style(Style::default().add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(tile, cols[i]);
    }
}

fn render_pass_table(frame: &mut Frame, area: Rect, report: &PlayerReport, scroll: usize) {
    let title = format!(
        "{} Passes ({} of {})",
        report.player,
        report.pass_rows.len(),
        report.total_pass_rows
    );
    let block = Block::default().title(title).borders(Borders::ALL);
    if report.pass_rows.is_empty() {
        let empty = Paragraph::new("No passes recorded")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let rows = report.pass_rows.iter().skip(scroll).map(|row| {
        let outcome = pass_outcome_label(row.outcome.as_deref());
        let outcome_style = if row.completed {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Red)
        };
        Row::new(vec![
            Cell::from(row.minute.to_string()),
            Cell::from(row.second.to_string()),
            Cell::from(format_optional(row.recipient.as_deref())),
            Cell::from(
                row.length
                    .map(|l| format!("{l:.1}"))
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::from(format_optional(row.height.as_deref())),
            Cell::from(outcome.to_string()).style(outcome_style),
        ])
    });
    let widths = [
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Min(16),
        Constraint::Length(7),
        Constraint::Length(12),
        Constraint::Length(12),
    ];
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["Min", "Sec", "Recipient", "Length", "Height", "Outcome"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(block);
    frame.render_widget(table, area);
}

fn render_height_chart(frame: &mut Frame, area: Rect, report: &PlayerReport) {
    let block = Block::default()
        .title("Pass Height Distribution")
        .borders(Borders::ALL);
    if report.height_distribution.is_empty() {
        let empty = Paragraph::new("No pass height data")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let bars: Vec<Bar> = report
        .height_distribution
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let color = HEIGHT_COLORS[i % HEIGHT_COLORS.len()];
            Bar::default()
                .value(entry.count as u64)
                .label(Line::from(short_height_label(&entry.category)))
                .style(Style::default().fg(color))
        })
        .collect();
    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(8)
        .bar_gap(2);
    frame.render_widget(chart, area);
}

fn short_height_label(category: &str) -> String {
    category.trim_end_matches(" Pass").to_string()
}

fn pitch_canvas<'a, F>(title: String, painter: F) -> Canvas<'a, F>
where
    F: Fn(&mut ratatui::widgets::canvas::Context),
{
    Canvas::default()
        .block(Block::default().title(title).borders(Borders::ALL))
        .marker(Marker::Braille)
        .x_bounds([-2.0, PITCH_LENGTH + 2.0])
        .y_bounds([0.0, PITCH_WIDTH])
        .paint(painter)
}

fn draw_pitch(ctx: &mut ratatui::widgets::canvas::Context) {
    for seg in pitch::pitch_markings() {
        ctx.draw(&CanvasLine {
            x1: seg.x1,
            y1: seg.y1,
            x2: seg.x2,
            y2: seg.y2,
            color: Color::Gray,
        });
    }
    let (cx, cy) = pitch::canvas_point(player_report::model::Location::new(
        PITCH_LENGTH / 2.0,
        PITCH_WIDTH / 2.0,
    ));
    ctx.draw(&Circle {
        x: cx,
        y: cy,
        radius: pitch::CENTRE_CIRCLE_RADIUS,
        color: Color::Gray,
    });
    ctx.draw(&Points {
        coords: &pitch::pitch_spots(),
        color: Color::Gray,
    });
}

fn render_pass_map(frame: &mut Frame, area: Rect, report: &PlayerReport) {
    let title = if report.pass_vectors.is_empty() {
        format!("{}'s Passes - no passes recorded", report.player)
    } else {
        format!(
            "{}'s Passes in the Match (green complete, red incomplete)",
            report.player
        )
    };
    let vectors = &report.pass_vectors;
    let canvas = pitch_canvas(title, |ctx| {
        draw_pitch(ctx);
        ctx.layer();
        for pass in vectors {
            let color = if pass.completed {
                Color::Green
            } else {
                Color::Red
            };
            for seg in pitch::arrow_segments(pass) {
                ctx.draw(&CanvasLine {
                    x1: seg.x1,
                    y1: seg.y1,
                    x2: seg.x2,
                    y2: seg.y2,
                    color,
                });
            }
        }
    });
    frame.render_widget(canvas, area);
}

fn render_shot_map(frame: &mut Frame, area: Rect, report: &PlayerReport) {
    let title = if report.shot_markers.is_empty() {
        format!("{} Shots - no shots recorded", report.player)
    } else {
        format!(
            "{} Shots with xG (circle size = xG, total {})",
            report.player,
            format_xg(report.summary.total_xg)
        )
    };
    let markers = &report.shot_markers;
    let canvas = pitch_canvas(title, |ctx| {
        draw_pitch(ctx);
        ctx.layer();
        for shot in markers {
            let (x, y) = pitch::canvas_point(shot.location);
            let color = if shot.is_goal { Color::Green } else { Color::Red };
            ctx.draw(&Circle {
                x,
                y,
                radius: pitch::shot_radius(shot.xg),
                color,
            });
            let (lx, ly) = pitch::shot_label_position(shot);
            ctx.print(
                lx,
                ly,
                Span::styled(format_xg(shot.xg), Style::default().fg(Color::White)),
            );
        }
    });
    frame.render_widget(canvas, area);
}

fn render_compare(frame: &mut Frame, area: Rect, report: &PlayerReport) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(report.comparison.len() as u16 + 3),
            Constraint::Min(6),
        ])
        .split(area);

    let table_rows = report.comparison.iter().map(|row| {
        let style = if row.player == report.player {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        comparison_row(row).style(style)
    });
    let widths = [
        Constraint::Min(24),
        Constraint::Length(7),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(9),
    ];
    let table = Table::new(table_rows, widths)
        .header(
            Row::new(vec!["Player", "Passes", "Goals", "Shots", "xG", "Avg Len"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(
            Block::default()
                .title("Player Comparison")
                .borders(Borders::ALL),
        );
    frame.render_widget(table, rows[0]);

    let mut chart = BarChart::default()
        .block(
            Block::default()
                .title("Passes (red) and Goals (green)")
                .borders(Borders::ALL),
        )
        .bar_width(5)
        .bar_gap(1)
        .group_gap(4);
    for row in &report.comparison {
        let bars = [
            Bar::default()
                .value(row.passes as u64)
                .style(Style::default().fg(PASS_COLOR)),
            Bar::default()
                .value(row.goals as u64)
                .style(Style::default().fg(GOAL_COLOR)),
        ];
        chart = chart.data(
            BarGroup::default()
                .label(Line::from(surname(&row.player)))
                .bars(&bars),
        );
    }
    frame.render_widget(chart, rows[1]);
}

fn comparison_row(row: &PlayerSummary) -> Row<'static> {
    Row::new(vec![
        row.player.clone(),
        row.passes.to_string(),
        row.goals.to_string(),
        row.shots.to_string(),
        format_xg(row.total_xg),
        format_average_length(row.average_pass_length),
    ])
}

fn surname(name: &str) -> String {
    name.split_whitespace()
        .nth(1)
        .unwrap_or(name)
        .to_string()
}

fn render_lineups(frame: &mut Frame, area: Rect, data: &MatchData) {
    if data.lineups.is_empty() {
        let empty = Paragraph::new("No lineups available")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().title("Lineups").borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    }

    let summaries: HashMap<String, PlayerSummary> = aggregate::summaries_by_player(&data.events)
        .into_iter()
        .map(|s| (s.player.clone(), s))
        .collect();

    let constraints = vec![Constraint::Ratio(1, data.lineups.len() as u32); data.lineups.len()];
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);
    for (team, col) in data.lineups.iter().zip(cols.iter()) {
        render_lineup_team(frame, *col, team, &summaries);
    }
}

fn render_lineup_team(
    frame: &mut Frame,
    area: Rect,
    team: &LineupTeam,
    summaries: &HashMap<String, PlayerSummary>,
) {
    let header_style = Style::default().add_modifier(Modifier::BOLD);
    let mut rows = vec![Row::new(vec!["Starters".to_string()]).style(header_style)];
    rows.extend(team.starters().map(|p| lineup_row(p, summaries)));
    rows.push(Row::new(vec!["Bench".to_string()]).style(header_style));
    rows.extend(team.bench().map(|p| lineup_row(p, summaries)));

    let widths = [
        Constraint::Length(3),
        Constraint::Min(18),
        Constraint::Length(22),
        Constraint::Length(4),
        Constraint::Length(4),
    ];
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["#", "Player", "Position", "Pas", "Sh"]).style(header_style),
        )
        .block(Block::default().title(team.team_name.clone()).borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn lineup_row(player: &LineupPlayer, summaries: &HashMap<String, PlayerSummary>) -> Row<'static> {
    let number = player
        .jersey_number
        .map(|n| n.to_string())
        .unwrap_or_else(|| "--".to_string());
    let (passes, shots) = summaries
        .get(&player.name)
        .map(|s| (s.passes.to_string(), s.shots.to_string()))
        .unwrap_or_else(|| ("0".to_string(), "0".to_string()));
    Row::new(vec![
        number,
        player.nickname.clone().unwrap_or_else(|| player.name.clone()),
        format_optional(player.position.as_deref()),
        passes,
        shots,
    ])
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Player Report - Help",
        "",
        "Screens:",
        "  1            Overview (metrics, passes, heights)",
        "  2            Pass map",
        "  3            Shot map",
        "  4            Player comparison",
        "  5            Lineups",
        "  Tab / S-Tab  Next / previous screen",
        "",
        "Report:",
        "  p / P        Next / previous player",
        "  j/k or ↑/↓   Scroll pass table",
        "  r            Clear cached match and reload",
        "",
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
