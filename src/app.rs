use crate::season::Season;
use crate::standings::{StandingsFile, TeamDirectory};
use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, FeedTone};
use crate::state::observer::ChannelObserver;
use log::error;
use playoff_engine::{Conference, PlayInGameType, PlayoffEvent, PlayoffPhase, TeamNames};
use std::path::PathBuf;
use tokio::sync::mpsc;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Bracket,
    Feed,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
    pub season: Season,
}

impl App {
    /// Loads standings, wires engine events into `events` and opens the
    /// tournament.
    pub fn new(settings: AppSettings, events: mpsc::UnboundedSender<PlayoffEvent>) -> anyhow::Result<Self> {
        let standings = StandingsFile::load(settings.standings_path.as_deref())?;
        let mut season = Season::new(standings, settings.seed, settings.play_in_enabled);
        season.subscribe(ChannelObserver::new(events));
        season.start()?;

        Ok(Self { settings, state: AppState::new(), season })
    }

    // -----------------------------------------------------------------------
    // Tournament actions
    // -----------------------------------------------------------------------

    pub fn play_next(&mut self) {
        match self.season.play_next() {
            Ok(Some(played)) => {
                let teams = self.season.directory();
                let (game, result) = (&played.game, played.result);
                self.state.last_error = None;
                self.state.status = Some(format!(
                    "{}: {} {} - {} {}",
                    game.label,
                    teams.abbrev(&game.home_team_id),
                    result.home_score,
                    result.away_score,
                    teams.abbrev(&game.away_team_id)
                ));
            }
            Ok(None) => {
                self.state.autoplay = false;
                self.state.status = Some("No games left. Press x to restart.".into());
            }
            Err(err) => self.on_error(err),
        }
    }

    pub fn finish_round(&mut self) {
        match self.season.finish_round() {
            Ok(0) => self.state.status = Some("No games left. Press x to restart.".into()),
            Ok(played) => self.state.status = Some(format!("Played {played} games")),
            Err(err) => self.on_error(err),
        }
    }

    pub fn toggle_autoplay(&mut self) {
        self.state.autoplay = !self.state.autoplay && self.season.controller().is_active();
    }

    pub fn on_autoplay_tick(&mut self) -> bool {
        if !self.state.autoplay {
            return false;
        }
        self.play_next();
        true
    }

    pub fn restart(&mut self) {
        self.state.autoplay = false;
        self.state.feed.clear();
        match self.season.start() {
            Ok(()) => self.state.status = Some(format!("Restarted the {} playoffs", self.season.season())),
            Err(err) => self.on_error(err),
        }
    }

    pub fn save_snapshot(&mut self) {
        let path = self.snapshot_path();
        match self.season.save(&path) {
            Ok(()) => self.state.status = Some(format!("Saved to {}", path.display())),
            Err(err) => self.on_error(err),
        }
    }

    pub fn load_snapshot(&mut self) {
        let path = self.snapshot_path();
        match self.season.load(&path) {
            Ok(()) => {
                self.state.autoplay = false;
                self.state.last_error = None;
                self.state.status = Some(format!("Loaded {}", path.display()));
                let phase = self.season.phase().label();
                self.state.feed.push(FeedTone::Headline, format!("Resumed in the {phase}"));
            }
            Err(err) => self.on_error(err),
        }
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.settings
            .save_path
            .clone()
            .unwrap_or_else(|| snapshot_path(self.season.season(), |key| std::env::var(key).ok()))
    }

    pub fn on_playoff_event(&mut self, event: PlayoffEvent) {
        let (tone, text) = describe_event(&event, self.season.directory(), self.season.season());
        self.state.feed.push(tone, text);
        if matches!(event, PlayoffEvent::ChampionCrowned { .. }) {
            self.state.autoplay = false;
        }
    }

    pub fn on_error(&mut self, err: anyhow::Error) {
        error!("{err:#}");
        self.state.autoplay = false;
        self.state.last_error = Some(format!("{err:#}"));
    }

    // -----------------------------------------------------------------------
    // View management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        if self.state.active_tab == MenuItem::Feed {
            self.state.feed.mark_seen();
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn cycle_conference(&mut self) {
        self.state.selected_conference = self.state.selected_conference.other();
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }
}

/// Default snapshot location, next to the other per-user config.
fn snapshot_path(season: u16, lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    let file = format!("playoffs_{season}.json");
    if let Some(config_dir) = lookup("XDG_CONFIG_HOME")
        && !config_dir.trim().is_empty()
    {
        return PathBuf::from(config_dir).join("playoff-tui").join(file);
    }
    if let Some(home) = lookup("HOME")
        && !home.trim().is_empty()
    {
        return PathBuf::from(home).join(".config").join("playoff-tui").join(file);
    }
    PathBuf::from(file)
}

/// One feed line per engine event.
pub fn describe_event(event: &PlayoffEvent, teams: &TeamDirectory, season: u16) -> (FeedTone, String) {
    let name = |id: &str| teams.display_name(id);
    match event {
        PlayoffEvent::PhaseChanged { to: PlayoffPhase::Complete, .. } => {
            (FeedTone::Headline, format!("The {season} playoffs are over"))
        }
        PlayoffEvent::PhaseChanged { to, .. } => (FeedTone::Headline, format!("{} begins", to.label())),
        PlayoffEvent::PlayInGameCompleted { conference, game_type, winner, loser, .. } => {
            // The 7v8 loser still has the 8th Seed Game.
            let verb = if *game_type == PlayInGameType::SevenVsEight { "beat" } else { "eliminate" };
            (
                FeedTone::Game,
                format!(
                    "{} Play-In {}: {} {verb} {}",
                    conference.label(),
                    game_type.label(),
                    name(winner),
                    name(loser)
                ),
            )
        }
        PlayoffEvent::PlayInCompleted { conference, seven_seed, eight_seed } => (
            FeedTone::Milestone,
            format!(
                "{}: {} take the 7 seed, {} the 8 seed",
                conference.label(),
                name(seven_seed),
                name(eight_seed)
            ),
        ),
        PlayoffEvent::PlayoffGameCompleted { series_id, game } => {
            let Some(result) = game.result() else {
                return (FeedTone::Game, format!("{series_id} game {} final", game.game_number()));
            };
            let overtime = match result.overtime_periods {
                0 => String::new(),
                1 => " (OT)".to_string(),
                n => format!(" ({n}OT)"),
            };
            (
                FeedTone::Game,
                format!(
                    "{series_id} G{}: {} {} - {} {}{overtime}",
                    game.game_number(),
                    teams.abbrev(game.home_team_id()),
                    result.home_score,
                    result.away_score,
                    teams.abbrev(game.away_team_id()),
                ),
            )
        }
        PlayoffEvent::SeriesCompleted { round, winner, loser, games_played, .. } => (
            FeedTone::Milestone,
            format!(
                "{}: {} beat {} in {games_played} games",
                round.label(),
                name(winner),
                name(loser)
            ),
        ),
        PlayoffEvent::ConferenceChampionCrowned { conference, team_id } => (
            FeedTone::Headline,
            format!("{} win the {} Conference", name(team_id), conference_name(*conference)),
        ),
        PlayoffEvent::FinalsStarted { higher_seed, lower_seed, .. } => (
            FeedTone::Headline,
            format!("Finals: {} host {}", name(higher_seed), name(lower_seed)),
        ),
        PlayoffEvent::ChampionCrowned { champion, runner_up } => (
            FeedTone::Headline,
            format!("{} are the {season} champions, beating {}", name(champion), name(runner_up)),
        ),
    }
}

fn conference_name(conference: Conference) -> &'static str {
    match conference {
        Conference::Eastern => "Eastern",
        Conference::Western => "Western",
    }
}
