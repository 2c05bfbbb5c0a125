use crate::error::{PlayoffError, PlayoffResult};
use crate::game::{GameResult, PlayoffGame};
use crate::{Conference, SeriesRound, TeamId, TeamNames};
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

pub const WINS_TO_CLINCH: u8 = 4;
pub const MAX_GAMES: u8 = 7;

/// Best-of-seven series between two seeded teams.
///
/// Win counters are only ever touched by `record_game_result`, one
/// increment per completed game, so `higher_seed_wins + lower_seed_wins`
/// always equals the number of completed games.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayoffSeries {
    id: String,
    /// `None` for the Finals, which span both conferences.
    conference: Option<Conference>,
    round: SeriesRound,
    higher_seed_team_id: TeamId,
    lower_seed_team_id: TeamId,
    higher_seed: u8,
    lower_seed: u8,
    games: Vec<PlayoffGame>,
    higher_seed_wins: u8,
    lower_seed_wins: u8,
}

impl PlayoffSeries {
    /// `higher` holds home court. Each side is `(team_id, seed)`.
    pub fn new(
        id: impl Into<String>,
        conference: Option<Conference>,
        round: SeriesRound,
        higher: (&str, u8),
        lower: (&str, u8),
    ) -> Self {
        Self {
            id: id.into(),
            conference,
            round,
            higher_seed_team_id: higher.0.to_string(),
            lower_seed_team_id: lower.0.to_string(),
            higher_seed: higher.1,
            lower_seed: lower.1,
            games: Vec::new(),
            higher_seed_wins: 0,
            lower_seed_wins: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn conference(&self) -> Option<Conference> {
        self.conference
    }

    pub fn round(&self) -> SeriesRound {
        self.round
    }

    pub fn higher_seed_team_id(&self) -> &str {
        &self.higher_seed_team_id
    }

    pub fn lower_seed_team_id(&self) -> &str {
        &self.lower_seed_team_id
    }

    pub fn higher_seed(&self) -> u8 {
        self.higher_seed
    }

    pub fn lower_seed(&self) -> u8 {
        self.lower_seed
    }

    pub fn higher_seed_wins(&self) -> u8 {
        self.higher_seed_wins
    }

    pub fn lower_seed_wins(&self) -> u8 {
        self.lower_seed_wins
    }

    /// Every game created so far, including a scheduled but unplayed one.
    pub fn games(&self) -> &[PlayoffGame] {
        &self.games
    }

    pub fn completed_games(&self) -> impl Iterator<Item = &PlayoffGame> {
        self.games.iter().filter(|g| g.is_complete())
    }

    pub fn completed_game_count(&self) -> u8 {
        self.completed_games().count() as u8
    }

    pub fn next_game_number(&self) -> u8 {
        self.completed_game_count() + 1
    }

    pub fn is_complete(&self) -> bool {
        self.higher_seed_wins >= WINS_TO_CLINCH || self.lower_seed_wins >= WINS_TO_CLINCH
    }

    pub fn winner_team_id(&self) -> Option<&str> {
        if self.higher_seed_wins >= WINS_TO_CLINCH {
            Some(&self.higher_seed_team_id)
        } else if self.lower_seed_wins >= WINS_TO_CLINCH {
            Some(&self.lower_seed_team_id)
        } else {
            None
        }
    }

    pub fn loser_team_id(&self) -> Option<&str> {
        let winner = self.winner_team_id()?;
        self.opponent_of(winner)
    }

    pub fn involves(&self, team_id: &str) -> bool {
        self.higher_seed_team_id == team_id || self.lower_seed_team_id == team_id
    }

    pub fn opponent_of(&self, team_id: &str) -> Option<&str> {
        if self.higher_seed_team_id == team_id {
            Some(&self.lower_seed_team_id)
        } else if self.lower_seed_team_id == team_id {
            Some(&self.higher_seed_team_id)
        } else {
            None
        }
    }

    pub fn wins_for(&self, team_id: &str) -> Option<u8> {
        if self.higher_seed_team_id == team_id {
            Some(self.higher_seed_wins)
        } else if self.lower_seed_team_id == team_id {
            Some(self.lower_seed_wins)
        } else {
            None
        }
    }

    pub fn seed_of(&self, team_id: &str) -> Option<u8> {
        if self.higher_seed_team_id == team_id {
            Some(self.higher_seed)
        } else if self.lower_seed_team_id == team_id {
            Some(self.lower_seed)
        } else {
            None
        }
    }

    /// True before a winner-take-all game: the trailing side already has 3
    /// wins, so whoever loses the next game is out.
    pub fn is_elimination_game(&self) -> bool {
        !self.is_complete() && self.higher_seed_wins.min(self.lower_seed_wins) == WINS_TO_CLINCH - 1
    }

    /// Teams that are one loss from elimination in the next game.
    pub fn teams_facing_elimination(&self) -> Vec<&str> {
        if self.is_complete() {
            return Vec::new();
        }
        let mut teams = Vec::new();
        if self.lower_seed_wins == WINS_TO_CLINCH - 1 {
            teams.push(self.higher_seed_team_id.as_str());
        }
        if self.higher_seed_wins == WINS_TO_CLINCH - 1 {
            teams.push(self.lower_seed_team_id.as_str());
        }
        teams
    }

    /// The created game that is waiting for a result, if any.
    pub fn pending_game(&self) -> Option<&PlayoffGame> {
        self.games.iter().find(|g| !g.is_complete())
    }

    /// The next game as it would be created, without attaching it.
    pub fn next_game_preview(&self, date: Option<NaiveDate>) -> Option<PlayoffGame> {
        if self.is_complete() {
            return None;
        }
        if let Some(pending) = self.pending_game() {
            let mut game = pending.clone();
            game.set_date(date);
            return Some(game);
        }
        Some(self.build_game(self.next_game_number(), date))
    }

    /// Attach the next game to the series. Calling this again before the
    /// game is played returns the same pending game.
    pub fn create_next_game(&mut self, date: Option<NaiveDate>) -> PlayoffResult<&PlayoffGame> {
        if self.is_complete() {
            return Err(PlayoffError::SeriesComplete { series_id: self.id.clone() });
        }
        let idx = match self.games.iter().position(|g| !g.is_complete()) {
            Some(idx) => {
                self.games[idx].set_date(date);
                idx
            }
            None => {
                let game = self.build_game(self.next_game_number(), date);
                self.games.push(game);
                self.games.len() - 1
            }
        };
        Ok(&self.games[idx])
    }

    /// Record the final score of `game_number`. Scores are home/away for
    /// that game, where the host follows the 2-2-1-1-1 format.
    pub fn record_game_result(
        &mut self,
        game_number: u8,
        result: GameResult,
    ) -> PlayoffResult<&PlayoffGame> {
        if self.is_complete() {
            return Err(PlayoffError::SeriesComplete { series_id: self.id.clone() });
        }
        let expected = self.next_game_number();
        if game_number == 0 || game_number > MAX_GAMES {
            return Err(PlayoffError::Sequence { expected, got: game_number });
        }
        if game_number < expected {
            return Err(PlayoffError::AlreadyRecorded {
                game_id: format!("{}-G{game_number}", self.id),
            });
        }
        if game_number != expected {
            return Err(PlayoffError::Sequence { expected, got: game_number });
        }
        result.validate()?;

        let idx = match self.games.iter().position(|g| g.game_number() == game_number) {
            Some(idx) => idx,
            None => {
                let game = self.build_game(game_number, None);
                self.games.push(game);
                self.games.len() - 1
            }
        };
        self.games[idx].record(result)?;

        match self.games[idx].higher_seed_won() {
            Some(true) => self.higher_seed_wins += 1,
            Some(false) => self.lower_seed_wins += 1,
            None => {}
        }
        debug!(
            "series {} game {game_number}: {}-{}",
            self.id, self.higher_seed_wins, self.lower_seed_wins
        );
        Ok(&self.games[idx])
    }

    /// Human-readable series state, e.g. "Celtics lead 3-1".
    pub fn status_string(&self, names: &impl TeamNames) -> String {
        let (hw, lw) = (self.higher_seed_wins, self.lower_seed_wins);
        if let Some(winner) = self.winner_team_id() {
            let (w, l) = (hw.max(lw), hw.min(lw));
            return format!("{} win {w}-{l}", names.display_name(winner));
        }
        if hw == lw {
            format!("Series tied {hw}-{lw}")
        } else if hw > lw {
            format!("{} lead {hw}-{lw}", names.display_name(&self.higher_seed_team_id))
        } else {
            format!("{} lead {lw}-{hw}", names.display_name(&self.lower_seed_team_id))
        }
    }

    /// Recount wins from the stored games and check the series shape.
    pub(crate) fn check_integrity(&self) -> Result<(), String> {
        let mut higher = 0u8;
        let mut lower = 0u8;
        for (i, game) in self.games.iter().enumerate() {
            if usize::from(game.game_number()) != i + 1 {
                return Err(format!("series {} has game {} out of order", self.id, game.game_number()));
            }
            match game.higher_seed_won() {
                Some(true) => higher += 1,
                Some(false) => lower += 1,
                None if i + 1 != self.games.len() => {
                    return Err(format!("series {} has an unplayed game before the last", self.id));
                }
                None => {}
            }
        }
        if self.games.len() > usize::from(MAX_GAMES) {
            return Err(format!("series {} has more than {MAX_GAMES} games", self.id));
        }
        if higher != self.higher_seed_wins || lower != self.lower_seed_wins {
            return Err(format!("series {} win counts do not match its games", self.id));
        }
        if higher > WINS_TO_CLINCH || lower > WINS_TO_CLINCH || (higher == WINS_TO_CLINCH && lower == WINS_TO_CLINCH) {
            return Err(format!("series {} has an impossible score", self.id));
        }
        Ok(())
    }

    fn build_game(&self, game_number: u8, date: Option<NaiveDate>) -> PlayoffGame {
        PlayoffGame::new(
            &self.id,
            self.round,
            game_number,
            &self.higher_seed_team_id,
            &self.lower_seed_team_id,
            date,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RawIds;
    use std::collections::HashMap;

    fn series() -> PlayoffSeries {
        PlayoffSeries::new(
            "2025-E-R1-1",
            Some(Conference::Eastern),
            SeriesRound::FirstRound,
            ("CLE", 1),
            ("MIA", 8),
        )
    }

    /// Record a game won by the higher (`true`) or lower seed, whatever the venue.
    fn play(s: &mut PlayoffSeries, higher_wins: bool) {
        let n = s.next_game_number();
        let higher_home = crate::game::higher_seed_hosts(n);
        let result = if higher_wins == higher_home {
            GameResult::new(110, 100)
        } else {
            GameResult::new(100, 110)
        };
        s.record_game_result(n, result).unwrap();
    }

    fn assert_win_counts(s: &PlayoffSeries) {
        assert_eq!(
            s.higher_seed_wins() + s.lower_seed_wins(),
            s.completed_game_count()
        );
        assert!(s.higher_seed_wins() <= WINS_TO_CLINCH && s.lower_seed_wins() <= WINS_TO_CLINCH);
    }

    #[test]
    fn sweep_never_flags_an_elimination_game() {
        let mut s = series();
        for _ in 0..4 {
            assert!(!s.is_elimination_game());
            play(&mut s, true);
            assert_win_counts(&s);
        }
        assert!(s.is_complete());
        assert!(!s.is_elimination_game());
        assert_eq!(s.completed_game_count(), 4);
        assert_eq!(s.winner_team_id(), Some("CLE"));
        assert_eq!(s.loser_team_id(), Some("MIA"));
    }

    #[test]
    fn game_seven_is_an_elimination_game() {
        let mut s = series();
        for higher in [true, false, true, false, true, false] {
            play(&mut s, higher);
            assert_win_counts(&s);
        }
        assert_eq!((s.higher_seed_wins(), s.lower_seed_wins()), (3, 3));
        assert!(s.is_elimination_game());
        assert_eq!(s.teams_facing_elimination(), vec!["CLE", "MIA"]);
        assert_eq!(s.next_game_number(), 7);

        // A one-point game 7 still ends it.
        s.record_game_result(7, GameResult::new(99, 100)).unwrap();
        assert!(s.is_complete());
        assert_eq!(s.winner_team_id(), Some("MIA"));
        assert!(!s.is_elimination_game());
    }

    #[test]
    fn facing_elimination_tracks_the_trailing_team() {
        let mut s = series();
        for higher in [true, true, true] {
            play(&mut s, higher);
        }
        assert!(!s.is_elimination_game());
        assert_eq!(s.teams_facing_elimination(), vec!["MIA"]);
    }

    #[test]
    fn out_of_order_results_are_rejected_without_state_change() {
        let mut s = series();
        let err = s.record_game_result(2, GameResult::new(100, 90)).unwrap_err();
        assert_eq!(err, PlayoffError::Sequence { expected: 1, got: 2 });
        assert_eq!(s.completed_game_count(), 0);
        assert!(s.games().is_empty());

        let err = s.record_game_result(0, GameResult::new(100, 90)).unwrap_err();
        assert!(matches!(err, PlayoffError::Sequence { .. }));
    }

    #[test]
    fn duplicate_delivery_is_ignored() {
        let mut s = series();
        s.record_game_result(1, GameResult::new(100, 90)).unwrap();
        let before = s.clone();
        let err = s.record_game_result(1, GameResult::new(100, 90)).unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(s, before);
    }

    #[test]
    fn finished_series_rejects_more_games() {
        let mut s = series();
        for _ in 0..4 {
            play(&mut s, false);
        }
        let before = s.clone();
        let err = s.record_game_result(5, GameResult::new(120, 80)).unwrap_err();
        assert!(matches!(err, PlayoffError::SeriesComplete { .. }));
        assert_eq!(s, before);
        assert!(s.create_next_game(None).is_err());
        assert!(s.next_game_preview(None).is_none());
    }

    #[test]
    fn tie_score_leaves_series_untouched() {
        let mut s = series();
        let err = s.record_game_result(1, GameResult::new(90, 90)).unwrap_err();
        assert_eq!(err, PlayoffError::TiedScore { score: 90 });
        assert!(s.games().is_empty());
    }

    #[test]
    fn create_next_game_assigns_hosts_and_is_idempotent() {
        let mut s = series();
        let date = NaiveDate::from_ymd_opt(2025, 4, 19);
        let game = s.create_next_game(date).unwrap();
        assert_eq!(game.game_number(), 1);
        assert_eq!(game.home_team_id(), "CLE");
        assert_eq!(game.date(), date);
        assert_eq!(s.create_next_game(None).unwrap().game_number(), 1);
        assert_eq!(s.games().len(), 1);

        s.record_game_result(1, GameResult::new(121, 100)).unwrap();
        play(&mut s, true);
        let game3 = s.create_next_game(None).unwrap();
        assert_eq!(game3.game_number(), 3);
        assert_eq!(game3.home_team_id(), "MIA");
        assert_eq!(game3.away_team_id(), "CLE");
    }

    #[test]
    fn status_strings() {
        let mut names = HashMap::new();
        names.insert("CLE".to_string(), "Cavaliers".to_string());
        names.insert("MIA".to_string(), "Heat".to_string());

        let mut s = series();
        assert_eq!(s.status_string(&names), "Series tied 0-0");
        play(&mut s, true);
        play(&mut s, true);
        play(&mut s, false);
        play(&mut s, true);
        assert_eq!(s.status_string(&names), "Cavaliers lead 3-1");
        play(&mut s, false);
        play(&mut s, false);
        assert_eq!(s.status_string(&names), "Series tied 3-3");
        play(&mut s, false);
        assert_eq!(s.status_string(&names), "Heat win 4-3");
        assert_eq!(s.status_string(&RawIds), "MIA win 4-3");
    }

    #[test]
    fn integrity_check_catches_tampered_counts() {
        let mut s = series();
        play(&mut s, true);
        assert!(s.check_integrity().is_ok());
        s.lower_seed_wins = 2;
        assert!(s.check_integrity().is_err());
    }
}
