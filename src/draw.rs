use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::standings::TeamDirectory;
use crate::state::app_state::FeedTone;
use crate::ui::layout::LayoutAreas;
use log::error;
use playoff_engine::{
    Conference, ConferencePlayInBracket, PlayInGameType, PlayoffController, PlayoffPhase, PlayoffSeries,
    SeriesRound, TeamNames,
};

static TABS: &[&str; 2] = &["Bracket", "Feed"];

/// Narrower than this and the bracket shows one conference at a time.
const SIDE_BY_SIDE_WIDTH: u16 = 130;

pub fn draw<B>(terminal: &mut Terminal<B>, app: &App)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let drawn = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
            draw_status(f, layout.status, app);
        }

        match app.state.active_tab {
            MenuItem::Bracket => draw_bracket(f, layout.main, app),
            MenuItem::Feed => draw_feed(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }
    });
    if let Err(err) = drawn {
        error!("draw failed: {err}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Bracket => 0,
        MenuItem::Feed => 1,
        MenuItem::Help => 0,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let autoplay = if app.state.autoplay { " | autoplay" } else { "" };
    let summary = format!("{}{autoplay} | Help: ? ", app.season.phase().label());
    let help = Paragraph::new(summary)
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let (text, style) = if let Some(err) = app.state.last_error.as_deref() {
        (err.to_string(), Style::default().fg(Color::Red))
    } else if let Some(status) = app.state.status.as_deref() {
        (status.to_string(), Style::default().fg(Color::Gray))
    } else {
        (
            "n=next game  r=finish round  a=autoplay  s=save  o=load  x=restart  Tab=conference  q=quit".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    };
    f.render_widget(Paragraph::new(text).style(style), area);
}

// ---------------------------------------------------------------------------
// Bracket
// ---------------------------------------------------------------------------

fn draw_bracket(f: &mut Frame, area: Rect, app: &App) {
    let controller = app.season.controller();
    let teams = app.season.directory();

    let title = format!(" {} NBA Playoffs ", app.season.season());
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [header, content] = Layout::vertical([Constraint::Length(2), Constraint::Fill(1)]).areas(inner);
    f.render_widget(Paragraph::new(header_lines(controller, teams)), header);

    if content.width >= SIDE_BY_SIDE_WIDTH {
        let [east, finals, west] = Layout::horizontal([
            Constraint::Percentage(40),
            Constraint::Percentage(20),
            Constraint::Percentage(40),
        ])
        .areas(content);
        draw_conference(f, east, app, Conference::Eastern);
        draw_finals(f, finals, controller, teams);
        draw_conference(f, west, app, Conference::Western);
    } else {
        let [selected, finals] =
            Layout::horizontal([Constraint::Percentage(70), Constraint::Percentage(30)]).areas(content);
        draw_conference(f, selected, app, app.state.selected_conference);
        draw_finals(f, finals, controller, teams);
    }
}

fn header_lines(controller: &PlayoffController, teams: &TeamDirectory) -> Vec<Line<'static>> {
    let phase = controller.phase();
    let mut lines = vec![Line::from(vec![
        Span::styled("Phase: ", Style::default().fg(Color::Gray)),
        Span::styled(phase.label().to_string(), Style::default().add_modifier(Modifier::BOLD)),
    ])];

    let next = match controller.next_game() {
        Some(game) => {
            let marker = if game.elimination { "  (elimination game)" } else { "" };
            format!(
                "Next: {}  {} at {}{marker}",
                game.label,
                teams.abbrev(&game.away_team_id),
                teams.abbrev(&game.home_team_id)
            )
        }
        None if phase == PlayoffPhase::Complete => controller
            .bracket()
            .and_then(|b| b.champion_team_id())
            .map(|id| format!("Champion: {}", teams.display_name(id)))
            .unwrap_or_default(),
        None => "No games scheduled".to_string(),
    };
    lines.push(Line::from(Span::styled(next, Style::default().fg(Color::Gray))));
    lines
}

fn draw_conference(f: &mut Frame, area: Rect, app: &App, conference: Conference) {
    let selected = app.state.selected_conference == conference;
    let color = if selected { Color::Yellow } else { Color::White };
    let title = format!(" {} ", conference.label());
    let block = default_border(color).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let controller = app.season.controller();
    let teams = app.season.directory();
    let Some(bracket) = controller.bracket() else {
        f.render_widget(
            Paragraph::new("No tournament loaded")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    };

    let mut lines = Vec::new();
    if let Some(play_in) = bracket.play_in() {
        lines.push(section("Play-In Tournament"));
        lines.extend(play_in_lines(play_in.conference(conference), teams));
        lines.push(Line::from(""));
    }

    let conference_bracket = bracket.conference(conference);
    for round in [SeriesRound::FirstRound, SeriesRound::ConferenceSemis, SeriesRound::ConferenceFinals] {
        lines.push(section(round.label()));
        let series = conference_bracket.round_series(round);
        if series.is_empty() {
            lines.push(Line::from(Span::styled("  TBD", Style::default().fg(Color::DarkGray))));
        }
        lines.extend(series.iter().map(|s| series_line(s, teams)));
    }

    if let Some(champion) = conference_bracket.champion_team_id() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Champion: {}", teams.display_name(champion)),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
    }

    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_finals(f: &mut Frame, area: Rect, controller: &PlayoffController, teams: &TeamDirectory) {
    let block = default_border(Color::White).title(" Finals ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(bracket) = controller.bracket() else {
        return;
    };

    let mut lines = Vec::new();
    match bracket.finals() {
        Some(series) => {
            lines.push(series_line(series, teams));
            for game in series.completed_games() {
                if let Some(result) = game.result() {
                    lines.push(Line::from(Span::styled(
                        format!(
                            "  G{} {} {}-{} {}",
                            game.game_number(),
                            teams.abbrev(game.home_team_id()),
                            result.home_score,
                            result.away_score,
                            teams.abbrev(game.away_team_id())
                        ),
                        Style::default().fg(Color::Gray),
                    )));
                }
            }
        }
        None => lines.push(Line::from(Span::styled("TBD", Style::default().fg(Color::DarkGray)))),
    }

    if let Some(champion) = bracket.champion_team_id() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("{} win the title", teams.display_name(champion)),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
    }

    f.render_widget(Paragraph::new(lines), inner);
}

fn section(label: &str) -> Line<'static> {
    Line::from(Span::styled(
        label.to_string(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))
}

fn play_in_lines(play_in: &ConferencePlayInBracket, teams: &TeamDirectory) -> Vec<Line<'static>> {
    let game_types = [PlayInGameType::SevenVsEight, PlayInGameType::NineVsTen, PlayInGameType::EightSeedDecider];
    game_types
        .into_iter()
        .map(|game_type| {
            let Some(game) = play_in.game(game_type) else {
                return Line::from(Span::styled(
                    format!("  {:<14} TBD", game_type.label()),
                    Style::default().fg(Color::DarkGray),
                ));
            };
            let matchup = format!(
                "  {:<14} ({}) {} vs ({}) {}",
                game_type.label(),
                game.higher_seed(),
                teams.abbrev(game.higher_seed_team_id()),
                game.lower_seed(),
                teams.abbrev(game.lower_seed_team_id())
            );
            match (game.result(), game.winner_team_id()) {
                (Some(result), Some(winner)) => Line::from(vec![
                    Span::styled(matchup, Style::default().fg(Color::Gray)),
                    Span::raw(format!(
                        "  {} {}-{}",
                        teams.abbrev(winner),
                        result.home_score.max(result.away_score),
                        result.home_score.min(result.away_score)
                    )),
                ]),
                _ => Line::from(matchup),
            }
        })
        .collect()
}

fn series_line(series: &PlayoffSeries, teams: &TeamDirectory) -> Line<'static> {
    let short = |id: &str| teams.abbrev(id);
    let style = if series.is_complete() {
        Style::default().fg(Color::Gray)
    } else if !series.teams_facing_elimination().is_empty() {
        Style::default().fg(Color::LightRed)
    } else {
        Style::default().fg(Color::White)
    };
    Line::from(vec![
        Span::styled(
            format!(
                "  ({}) {:<4} vs ({}) {:<4} ",
                series.higher_seed(),
                teams.abbrev(series.higher_seed_team_id()),
                series.lower_seed(),
                teams.abbrev(series.lower_seed_team_id())
            ),
            style,
        ),
        Span::styled(series.status_string(&short), style),
    ])
}

// ---------------------------------------------------------------------------
// Feed, help, logs
// ---------------------------------------------------------------------------

fn draw_feed(f: &mut Frame, area: Rect, app: &App) {
    let title = match app.state.feed.last_headline() {
        Some(headline) => format!(" Feed | {headline} "),
        None => " Feed ".to_string(),
    };
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.state.feed.entries.is_empty() {
        f.render_widget(
            Paragraph::new("Nothing has happened yet. Press n to play a game.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let lines: Vec<Line> = app
        .state
        .feed
        .entries
        .iter()
        .rev()
        .take(inner.height as usize)
        .map(|entry| {
            let mut style = match entry.tone {
                FeedTone::Headline => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                FeedTone::Milestone => Style::default().fg(Color::Cyan),
                FeedTone::Game => Style::default().fg(Color::White),
            };
            if !entry.is_new {
                style = style.add_modifier(Modifier::DIM);
            }
            let clipped: String = entry.text.chars().take(inner.width as usize).collect();
            Line::from(Span::styled(clipped, style))
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::DarkGray).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let keys = [
        ("n", "play the next game"),
        ("r", "finish the current round"),
        ("a", "toggle autoplay"),
        ("s", "save the tournament"),
        ("o", "load the saved tournament"),
        ("x", "restart the season"),
        ("Tab", "switch conference"),
        ("1 / 2", "bracket / feed"),
        ("f", "full screen"),
        ("\"", "show logs"),
        ("Esc", "close help"),
        ("q", "quit"),
    ];
    let lines: Vec<Line> = keys
        .iter()
        .map(|(key, action)| {
            Line::from(vec![
                Span::styled(format!("{key:>7}  "), Style::default().fg(Color::Yellow)),
                Span::raw(*action),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray));
    f.render_widget(logs, area);
}
