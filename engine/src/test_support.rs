//! Shared fixtures: 2024-25 regular-season standings and helpers that feed
//! results into a controller.

use crate::controller::{PlayoffConfig, PlayoffController};
use crate::game::GameResult;
use crate::schedule::ScheduledGame;
use crate::{SeriesRound, StandingsEntry, TeamId};
use chrono::NaiveDate;
use std::collections::HashMap;

const EAST: [(&str, &str, u16, u16); 10] = [
    ("CLE", "Cavaliers", 64, 18),
    ("BOS", "Celtics", 61, 21),
    ("NYK", "Knicks", 51, 31),
    ("IND", "Pacers", 50, 32),
    ("MIL", "Bucks", 48, 34),
    ("DET", "Pistons", 44, 38),
    ("ORL", "Magic", 41, 41),
    ("ATL", "Hawks", 40, 42),
    ("CHI", "Bulls", 39, 43),
    ("MIA", "Heat", 37, 45),
];

const WEST: [(&str, &str, u16, u16); 10] = [
    ("OKC", "Thunder", 68, 14),
    ("HOU", "Rockets", 52, 30),
    ("LAL", "Lakers", 50, 32),
    ("DEN", "Nuggets", 50, 32),
    ("LAC", "Clippers", 50, 32),
    ("MIN", "Timberwolves", 49, 33),
    ("GSW", "Warriors", 48, 34),
    ("MEM", "Grizzlies", 48, 34),
    ("SAC", "Kings", 40, 42),
    ("DAL", "Mavericks", 39, 43),
];

fn standings(rows: &[(&str, &str, u16, u16)]) -> Vec<StandingsEntry> {
    rows.iter()
        .enumerate()
        .map(|(i, (id, _, w, l))| StandingsEntry::new(*id, i as u8 + 1, *w, *l))
        .collect()
}

pub fn east_standings() -> Vec<StandingsEntry> {
    standings(&EAST)
}

pub fn west_standings() -> Vec<StandingsEntry> {
    standings(&WEST)
}

pub fn names() -> HashMap<TeamId, String> {
    EAST.iter()
        .chain(WEST.iter())
        .map(|(id, name, _, _)| (id.to_string(), name.to_string()))
        .collect()
}

pub fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).unwrap()
}

pub fn home_win() -> GameResult {
    GameResult::new(112, 104)
}

pub fn away_win() -> GameResult {
    GameResult::new(98, 107)
}

/// A controller initialized with the 2025 standings.
pub fn started(config: PlayoffConfig) -> PlayoffController {
    let mut c = PlayoffController::new(config);
    c.initialize_playoffs(2025, &east_standings(), &west_standings()).unwrap();
    c
}

/// Play whatever `next_game` offers, home team winning.
pub fn play_next_home_win(c: &mut PlayoffController) -> Option<ScheduledGame> {
    let next = c.next_game()?;
    c.record_result(&next.game_ref, home_win()).unwrap();
    Some(next)
}

/// Home team wins everything until the tournament ends. Returns games played.
pub fn play_to_completion(c: &mut PlayoffController) -> usize {
    let mut played = 0;
    while play_next_home_win(c).is_some() {
        played += 1;
        assert!(played < 200, "tournament did not finish");
    }
    played
}

/// `team_id` wins every remaining game of the series.
pub fn win_series(c: &mut PlayoffController, series_id: &str, team_id: &str) {
    loop {
        let series = c.series(series_id).unwrap();
        if series.is_complete() {
            return;
        }
        let next = ScheduledGame::from_series(series, None).unwrap();
        let result = if next.home_team_id == team_id { home_win() } else { away_win() };
        c.record_result(&next.game_ref, result).unwrap();
    }
}

/// Higher seeds win every open series of `round`.
pub fn finish_round(c: &mut PlayoffController, round: SeriesRound) {
    let open: Vec<(String, String)> = c
        .active_series()
        .into_iter()
        .filter(|s| s.round() == round)
        .map(|s| (s.id().to_string(), s.higher_seed_team_id().to_string()))
        .collect();
    for (series_id, team_id) in open {
        win_series(c, &series_id, &team_id);
    }
}
