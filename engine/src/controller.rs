use crate::bracket::PlayoffBracket;
use crate::conference::{PLAYOFF_SEEDS, RoundAdvance};
use crate::error::{PlayoffError, PlayoffResult};
use crate::events::{PlayoffEvent, PlayoffObserver};
use crate::game::{GameResult, PlayInGame, PlayInGameType};
use crate::schedule::{GameRef, ScheduledGame};
use crate::series::PlayoffSeries;
use crate::snapshot::{PlayoffSaveData, SAVE_VERSION, SnapshotError};
use crate::{Conference, PlayoffPhase, SeriesRound, StandingsEntry, TeamNames};
use chrono::NaiveDate;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoffConfig {
    /// Seeds 7-10 play for the last two berths. When off, seeds 7 and 8
    /// enter the first round directly.
    pub play_in_enabled: bool,
}

impl Default for PlayoffConfig {
    fn default() -> Self {
        Self { play_in_enabled: true }
    }
}

/// Owns the active bracket and runs every state change through a cascade:
/// record, completion checks, champion detection, round advance. Events
/// are buffered while the cascade runs and delivered once it has settled.
pub struct PlayoffController {
    config: PlayoffConfig,
    bracket: Option<PlayoffBracket>,
    observers: Vec<Box<dyn PlayoffObserver>>,
}

impl Default for PlayoffController {
    fn default() -> Self {
        Self::new(PlayoffConfig::default())
    }
}

impl std::fmt::Debug for PlayoffController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayoffController")
            .field("config", &self.config)
            .field("phase", &self.phase())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl PlayoffController {
    pub fn new(config: PlayoffConfig) -> Self {
        Self { config, bracket: None, observers: Vec::new() }
    }

    pub fn config(&self) -> PlayoffConfig {
        self.config
    }

    pub fn subscribe(&mut self, observer: impl PlayoffObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn bracket(&self) -> Option<&PlayoffBracket> {
        self.bracket.as_ref()
    }

    pub fn phase(&self) -> PlayoffPhase {
        self.bracket.as_ref().map(|b| b.phase()).unwrap_or_default()
    }

    pub fn season(&self) -> Option<u16> {
        self.bracket.as_ref().map(|b| b.season())
    }

    /// A tournament exists and has not finished.
    pub fn is_active(&self) -> bool {
        self.bracket.as_ref().is_some_and(|b| !b.is_complete())
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Replace any current bracket with a fresh one for `season`.
    pub fn initialize_playoffs(
        &mut self,
        season: u16,
        eastern: &[StandingsEntry],
        western: &[StandingsEntry],
    ) -> PlayoffResult<()> {
        let mut bracket = PlayoffBracket::new(season, eastern, western, self.config.play_in_enabled)
            .inspect_err(|err| error!("{season} playoffs not initialized: {err}"))?;

        let mut events = Vec::new();
        if self.config.play_in_enabled {
            set_phase(&mut bracket, PlayoffPhase::PlayIn, &mut events);
        } else {
            for conference in Conference::ALL {
                bracket.conference_mut(conference).seed_first_round()?;
            }
            set_phase(&mut bracket, PlayoffPhase::FirstRound, &mut events);
        }
        info!("{season} playoffs initialized in {}", bracket.phase().label());
        self.bracket = Some(bracket);
        self.dispatch(events);
        Ok(())
    }

    /// Drop the play-in and seed the first round straight from standings
    /// seeds 7 and 8. Only valid before any play-in game is played.
    pub fn skip_play_in(&mut self) -> PlayoffResult<()> {
        let bracket = self.open_bracket_mut("skip the play-in")?;
        let phase = bracket.phase();
        let Some(play_in) = bracket.play_in() else {
            return Err(reject(PlayoffError::InvalidPhase { phase: phase.label(), action: "skip the play-in" }));
        };
        if phase != PlayoffPhase::PlayIn || play_in.has_started() {
            return Err(reject(PlayoffError::InvalidPhase {
                phase: phase.label(),
                action: "skip a play-in that is under way",
            }));
        }

        let mut direct = Vec::new();
        for conference in Conference::ALL {
            for seed in [7, PLAYOFF_SEEDS] {
                let Some(entry) = bracket.standings(conference).iter().find(|e| e.seed == seed) else {
                    return Err(reject(PlayoffError::NotFound(format!(
                        "{} seed {seed}",
                        conference.label()
                    ))));
                };
                direct.push((conference, entry.clone()));
            }
        }
        for (conference, entry) in direct {
            bracket.conference_mut(conference).set_seed(entry);
        }
        for conference in Conference::ALL {
            bracket.conference_mut(conference).seed_first_round()?;
        }
        bracket.play_in = None;

        let mut events = Vec::new();
        set_phase(bracket, PlayoffPhase::FirstRound, &mut events);
        info!("play-in skipped");
        self.dispatch(events);
        Ok(())
    }

    /// Record a play-in result. Home is the higher seed.
    pub fn record_play_in_result(
        &mut self,
        conference: Conference,
        game_type: PlayInGameType,
        result: GameResult,
    ) -> PlayoffResult<()> {
        let bracket = self.open_bracket_mut("record a play-in game")?;
        let phase = bracket.phase();
        let Some(play_in) = bracket.play_in.as_mut().filter(|_| phase == PlayoffPhase::PlayIn) else {
            return Err(reject(PlayoffError::InvalidPhase { phase: phase.label(), action: "record a play-in game" }));
        };

        let mut events = Vec::new();
        let conference_play_in = play_in.conference_mut(conference);
        let game = conference_play_in.record_game_result(game_type, result).map_err(reject)?;
        let (Some(winner), Some(loser)) = (game.winner_team_id(), game.loser_team_id()) else {
            return Err(PlayoffError::NotFound(format!("{} result", game.id())));
        };
        events.push(PlayoffEvent::PlayInGameCompleted {
            conference,
            game_type,
            game_id: game.id().to_string(),
            winner: winner.to_string(),
            loser: loser.to_string(),
        });

        if conference_play_in.can_create_eight_seed_game() {
            conference_play_in.create_eight_seed_game()?;
        }

        let resolved = match (
            conference_play_in.seven_seed_team_id(),
            conference_play_in.eight_seed_team_id(),
        ) {
            (Some(seven), Some(eight)) => Some((seven.to_string(), eight.to_string())),
            _ => None,
        };
        let play_in_complete = play_in.is_complete();

        if let Some((seven, eight)) = resolved {
            for (team_id, seed) in [(&seven, 7), (&eight, PLAYOFF_SEEDS)] {
                if let Some(entry) = bracket.standing(team_id).cloned() {
                    bracket
                        .conference_mut(conference)
                        .set_seed(StandingsEntry { seed, ..entry });
                }
            }
            info!("{} play-in complete: {seven} and {eight} advance", conference.label());
            events.push(PlayoffEvent::PlayInCompleted {
                conference,
                seven_seed: seven,
                eight_seed: eight,
            });
        }

        if play_in_complete {
            for c in Conference::ALL {
                bracket.conference_mut(c).seed_first_round()?;
            }
            set_phase(bracket, PlayoffPhase::FirstRound, &mut events);
        }

        self.dispatch(events);
        Ok(())
    }

    /// Record a series game. Scores are home/away for that game number.
    pub fn record_playoff_game_result(
        &mut self,
        series_id: &str,
        game_number: u8,
        result: GameResult,
    ) -> PlayoffResult<()> {
        let bracket = self.open_bracket_mut("record a playoff game")?;
        let phase = bracket.phase();
        if phase.series_round().is_none() {
            return Err(reject(PlayoffError::InvalidPhase { phase: phase.label(), action: "record a playoff game" }));
        }
        let Some(series) = bracket.series_mut(series_id) else {
            return Err(reject(PlayoffError::NotFound(format!("series {series_id}"))));
        };

        let game = series.record_game_result(game_number, result).map_err(reject)?.clone();
        let mut events = vec![PlayoffEvent::PlayoffGameCompleted {
            series_id: series_id.to_string(),
            game,
        }];

        let outcome = series
            .winner_team_id()
            .zip(series.loser_team_id())
            .map(|(w, l)| (w.to_string(), l.to_string()));
        if let Some((winner, loser)) = outcome {
            let round = series.round();
            let conference = series.conference();
            info!("{series_id} won by {winner} over {loser}");
            events.push(PlayoffEvent::SeriesCompleted {
                series_id: series_id.to_string(),
                round,
                winner: winner.clone(),
                loser: loser.clone(),
                games_played: series.completed_game_count(),
            });
            after_series_complete(bracket, round, conference, (winner, loser), &mut events);
        }

        self.dispatch(events);
        Ok(())
    }

    /// Route a result by reference.
    pub fn record_result(&mut self, game_ref: &GameRef, result: GameResult) -> PlayoffResult<()> {
        match game_ref {
            GameRef::PlayIn { conference, game_type } => {
                self.record_play_in_result(*conference, *game_type, result)
            }
            GameRef::Series { series_id, game_number } => {
                self.record_playoff_game_result(series_id, *game_number, result)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn is_team_alive(&self, team_id: &str) -> bool {
        let Some(bracket) = &self.bracket else {
            return false;
        };
        if bracket.standing(team_id).is_none() {
            warn!("is_team_alive: unknown team {team_id}");
            return false;
        }
        bracket.is_team_alive(team_id)
    }

    /// One-line description of where a team stands.
    pub fn team_status(&self, team_id: &str, names: &impl TeamNames) -> Option<String> {
        let bracket = self.bracket.as_ref()?;
        let Some(entry) = bracket.standing(team_id) else {
            warn!("team_status: unknown team {team_id}");
            return None;
        };
        let name = names.display_name(team_id);

        if bracket.champion_team_id() == Some(team_id) {
            return Some(format!("{name} won the championship"));
        }
        if let Some(series) = bracket.series_for_team(team_id) {
            let round = series.round().label();
            let status = series.status_string(names);
            return Some(if series.loser_team_id() == Some(team_id) {
                format!("Eliminated in the {round}: {status}")
            } else if series.is_complete() {
                format!("Advanced from the {round}: {status}")
            } else {
                format!("{round}: {status}")
            });
        }
        if let Some(play_in) = bracket.play_in()
            && let Some(conference) = bracket.conference_of(team_id)
        {
            let conference_play_in = play_in.conference(conference);
            if conference_play_in.is_eliminated(team_id) {
                return Some("Eliminated in the Play-In Tournament".into());
            }
            if conference_play_in.involves(team_id) {
                if let Some(game) = conference_play_in.next_game_for(team_id) {
                    return Some(format!("Play-In: {} next", game.game_type().label()));
                }
                if conference_play_in.seven_seed_team_id() == Some(team_id) {
                    return Some("Clinched the 7 seed in the Play-In".into());
                }
                if conference_play_in.eight_seed_team_id() == Some(team_id) {
                    return Some("Clinched the 8 seed in the Play-In".into());
                }
                return Some("Play-In: waiting for the 8th Seed Game".into());
            }
        }
        if entry.seed > PLAYOFF_SEEDS {
            return Some("Did not qualify".into());
        }
        Some(format!("Seed {}: waiting for the First Round", entry.seed))
    }

    pub fn series_for_team(&self, team_id: &str) -> Option<&PlayoffSeries> {
        let bracket = self.bracket.as_ref()?;
        if bracket.standing(team_id).is_none() {
            warn!("series_for_team: unknown team {team_id}");
            return None;
        }
        bracket.series_for_team(team_id)
    }

    pub fn series(&self, series_id: &str) -> Option<&PlayoffSeries> {
        self.bracket.as_ref()?.series(series_id)
    }

    pub fn play_in_game(&self, conference: Conference, game_type: PlayInGameType) -> Option<&PlayInGame> {
        self.bracket.as_ref()?.play_in()?.conference(conference).game(game_type)
    }

    /// Series in progress, in bracket order.
    pub fn active_series(&self) -> Vec<&PlayoffSeries> {
        self.bracket.as_ref().map(|b| b.active_series()).unwrap_or_default()
    }

    /// The game to play next. Play-in games go by type so both conferences
    /// move together; series go to whichever has played the fewest games.
    pub fn next_game(&self) -> Option<ScheduledGame> {
        let bracket = self.bracket.as_ref()?;
        match bracket.phase() {
            PlayoffPhase::PlayIn => {
                let play_in = bracket.play_in()?;
                play_in
                    .brackets()
                    .into_iter()
                    .flat_map(|b| b.pending_games())
                    .min_by_key(|g| g.game_type())
                    .map(|g| ScheduledGame::from_play_in(g, None))
            }
            phase if phase.series_round().is_some() => bracket
                .active_series()
                .into_iter()
                .min_by_key(|s| s.completed_game_count())
                .and_then(|s| ScheduledGame::from_series(s, None)),
            _ => None,
        }
    }

    /// Every game that can be played now, dated `date`. Read-only.
    pub fn schedule_current_round_games(&self, date: NaiveDate) -> Vec<ScheduledGame> {
        let Some(bracket) = &self.bracket else {
            return Vec::new();
        };
        match bracket.phase() {
            PlayoffPhase::PlayIn => bracket
                .play_in()
                .map(|p| {
                    p.brackets()
                        .into_iter()
                        .flat_map(|b| b.pending_games())
                        .map(|g| ScheduledGame::from_play_in(g, Some(date)))
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default(),
            _ => bracket
                .active_series()
                .into_iter()
                .filter_map(|s| ScheduledGame::from_series(s, Some(date)))
                .collect(),
        }
    }

    // -----------------------------------------------------------------------
    // Snapshot
    // -----------------------------------------------------------------------

    pub fn create_save_data(&self) -> PlayoffSaveData {
        PlayoffSaveData {
            version: SAVE_VERSION,
            season: self.season().unwrap_or_default(),
            is_active: self.is_active(),
            play_in_enabled: self.config.play_in_enabled,
            bracket: self.bracket.clone(),
        }
    }

    /// Replace the current state with a snapshot. Nothing changes if the
    /// snapshot fails validation. No events are emitted.
    pub fn restore_from_save(&mut self, data: PlayoffSaveData) -> Result<(), SnapshotError> {
        data.validate().inspect_err(|err| warn!("snapshot rejected: {err}"))?;
        self.config.play_in_enabled = data.play_in_enabled;
        self.bracket = data.bracket;
        info!("restored {} playoffs in {}", data.season, self.phase().label());
        Ok(())
    }

    // -----------------------------------------------------------------------

    fn open_bracket_mut(&mut self, action: &'static str) -> PlayoffResult<&mut PlayoffBracket> {
        match self.bracket.as_mut() {
            Some(bracket) if !bracket.is_complete() => Ok(bracket),
            Some(bracket) => Err(reject(PlayoffError::InvalidPhase { phase: bracket.phase().label(), action })),
            None => Err(reject(PlayoffError::InvalidPhase { phase: PlayoffPhase::NotStarted.label(), action })),
        }
    }

    fn dispatch(&mut self, events: Vec<PlayoffEvent>) {
        for event in &events {
            for observer in &mut self.observers {
                observer.on_event(event);
            }
        }
    }
}

/// Log a rejected mutation and hand the error back.
fn reject(err: PlayoffError) -> PlayoffError {
    if err.is_duplicate() {
        debug!("ignored duplicate: {err}");
    } else {
        warn!("rejected: {err}");
    }
    err
}

fn set_phase(bracket: &mut PlayoffBracket, to: PlayoffPhase, events: &mut Vec<PlayoffEvent>) {
    let from = bracket.phase;
    if from == to {
        return;
    }
    bracket.phase = to;
    info!("phase {} -> {}", from.label(), to.label());
    events.push(PlayoffEvent::PhaseChanged { from, to });
}

fn after_series_complete(
    bracket: &mut PlayoffBracket,
    round: SeriesRound,
    conference: Option<Conference>,
    (winner, loser): (String, String),
    events: &mut Vec<PlayoffEvent>,
) {
    match round {
        SeriesRound::FirstRound | SeriesRound::ConferenceSemis => {
            if !bracket.round_complete(round) {
                return;
            }
            for c in Conference::ALL {
                if let RoundAdvance::Advanced(next) = bracket.conference_mut(c).try_advance_round() {
                    debug!("{} bracket built the {}", c.label(), next.label());
                }
            }
            if let Some(next) = round.next() {
                set_phase(bracket, PlayoffPhase::from_round(next), events);
            }
        }
        SeriesRound::ConferenceFinals => {
            if let Some(c) = conference
                && let RoundAdvance::ChampionDecided(team_id) = bracket.conference_mut(c).try_advance_round()
            {
                events.push(PlayoffEvent::ConferenceChampionCrowned { conference: c, team_id });
            }
            start_finals(bracket, events);
        }
        SeriesRound::Finals => {
            bracket.champion_team_id = Some(winner.clone());
            bracket.finals_runner_up_team_id = Some(loser.clone());
            info!("{} champion: {winner}", bracket.season());
            events.push(PlayoffEvent::ChampionCrowned { champion: winner, runner_up: loser });
            set_phase(bracket, PlayoffPhase::Complete, events);
        }
    }
}

/// Build the Finals once both conference champions are known. Home court
/// goes to the better regular-season record.
fn start_finals(bracket: &mut PlayoffBracket, events: &mut Vec<PlayoffEvent>) {
    if bracket.finals.is_some() {
        return;
    }
    let (Some(east), Some(west)) = (
        bracket.eastern.champion_team_id().and_then(|id| bracket.eastern.entry(id)),
        bracket.western.champion_team_id().and_then(|id| bracket.western.entry(id)),
    ) else {
        return;
    };
    let (higher, lower) = if west.has_better_record_than(east) { (west, east) } else { (east, west) };
    let finals = PlayoffSeries::new(
        format!("{}-F", bracket.season),
        None,
        SeriesRound::Finals,
        (&higher.team_id, higher.seed),
        (&lower.team_id, lower.seed),
    );
    let event = PlayoffEvent::FinalsStarted {
        series_id: finals.id().to_string(),
        higher_seed: higher.team_id.clone(),
        lower_seed: lower.team_id.clone(),
    };
    bracket.finals = Some(finals);
    set_phase(bracket, PlayoffPhase::Finals, events);
    events.push(event);
}
