use crate::error::{PlayoffError, PlayoffResult};
use crate::{Conference, SeriesRound, TeamId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Final score of one game as reported by the game simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub home_score: u16,
    pub away_score: u16,
    /// Number of overtime periods played, 0 for regulation.
    #[serde(default)]
    pub overtime_periods: u8,
}

impl GameResult {
    pub fn new(home_score: u16, away_score: u16) -> Self {
        Self { home_score, away_score, overtime_periods: 0 }
    }

    pub fn with_overtime(mut self, periods: u8) -> Self {
        self.overtime_periods = periods;
        self
    }

    pub fn validate(&self) -> PlayoffResult<()> {
        if self.home_score == self.away_score {
            return Err(PlayoffError::TiedScore { score: self.home_score });
        }
        Ok(())
    }

    pub fn home_won(&self) -> bool {
        self.home_score > self.away_score
    }

    pub fn is_overtime(&self) -> bool {
        self.overtime_periods > 0
    }
}

// ---------------------------------------------------------------------------
// Series game
// ---------------------------------------------------------------------------

/// One game of a best-of-seven series. The winner is always derived from
/// the stored score, so it cannot drift from the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayoffGame {
    id: String,
    round: SeriesRound,
    game_number: u8,
    higher_seed_team_id: TeamId,
    lower_seed_team_id: TeamId,
    higher_seed_home: bool,
    date: Option<NaiveDate>,
    result: Option<GameResult>,
}

impl PlayoffGame {
    pub(crate) fn new(
        series_id: &str,
        round: SeriesRound,
        game_number: u8,
        higher_seed_team_id: &str,
        lower_seed_team_id: &str,
        date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: format!("{series_id}-G{game_number}"),
            round,
            game_number,
            higher_seed_team_id: higher_seed_team_id.to_string(),
            lower_seed_team_id: lower_seed_team_id.to_string(),
            higher_seed_home: higher_seed_hosts(game_number),
            date,
            result: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn round(&self) -> SeriesRound {
        self.round
    }

    pub fn game_number(&self) -> u8 {
        self.game_number
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn higher_seed_team_id(&self) -> &str {
        &self.higher_seed_team_id
    }

    pub fn lower_seed_team_id(&self) -> &str {
        &self.lower_seed_team_id
    }

    pub fn home_team_id(&self) -> &str {
        if self.higher_seed_home { &self.higher_seed_team_id } else { &self.lower_seed_team_id }
    }

    pub fn away_team_id(&self) -> &str {
        if self.higher_seed_home { &self.lower_seed_team_id } else { &self.higher_seed_team_id }
    }

    pub fn is_higher_seed_home(&self) -> bool {
        self.higher_seed_home
    }

    pub fn result(&self) -> Option<&GameResult> {
        self.result.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.result.is_some()
    }

    pub fn is_overtime(&self) -> bool {
        self.result.map(|r| r.is_overtime()).unwrap_or(false)
    }

    pub fn winner_team_id(&self) -> Option<&str> {
        let result = self.result.as_ref()?;
        Some(if result.home_won() { self.home_team_id() } else { self.away_team_id() })
    }

    pub fn loser_team_id(&self) -> Option<&str> {
        let result = self.result.as_ref()?;
        Some(if result.home_won() { self.away_team_id() } else { self.home_team_id() })
    }

    /// `Some(true)` when the higher seed won the recorded game.
    pub fn higher_seed_won(&self) -> Option<bool> {
        let result = self.result.as_ref()?;
        Some(result.home_won() == self.higher_seed_home)
    }

    pub(crate) fn set_date(&mut self, date: Option<NaiveDate>) {
        if !self.is_complete() && date.is_some() {
            self.date = date;
        }
    }

    pub(crate) fn record(&mut self, result: GameResult) -> PlayoffResult<()> {
        if self.is_complete() {
            return Err(PlayoffError::AlreadyRecorded { game_id: self.id.clone() });
        }
        result.validate()?;
        self.result = Some(result);
        Ok(())
    }
}

/// 2-2-1-1-1: the higher seed hosts games 1, 2, 5 and 7.
pub fn higher_seed_hosts(game_number: u8) -> bool {
    matches!(game_number, 1 | 2 | 5 | 7)
}

// ---------------------------------------------------------------------------
// Play-in game
// ---------------------------------------------------------------------------

/// Ordered the way the games are played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlayInGameType {
    SevenVsEight,
    NineVsTen,
    EightSeedDecider,
}

impl PlayInGameType {
    pub fn label(&self) -> &'static str {
        match self {
            PlayInGameType::SevenVsEight => "7 vs 8",
            PlayInGameType::NineVsTen => "9 vs 10",
            PlayInGameType::EightSeedDecider => "8th Seed Game",
        }
    }

    fn code(&self) -> &'static str {
        match self {
            PlayInGameType::SevenVsEight => "7v8",
            PlayInGameType::NineVsTen => "9v10",
            PlayInGameType::EightSeedDecider => "8SD",
        }
    }
}

/// A single play-in game. The higher seed always hosts, so the recorded
/// `GameResult` reads home = higher seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayInGame {
    id: String,
    conference: Conference,
    game_type: PlayInGameType,
    higher_seed_team_id: TeamId,
    lower_seed_team_id: TeamId,
    higher_seed: u8,
    lower_seed: u8,
    result: Option<GameResult>,
    winner_team_id: Option<TeamId>,
    loser_team_id: Option<TeamId>,
}

impl PlayInGame {
    pub(crate) fn new(
        season: u16,
        conference: Conference,
        game_type: PlayInGameType,
        higher: (&str, u8),
        lower: (&str, u8),
    ) -> Self {
        Self {
            id: format!("{season}-{}-PI-{}", conference.code(), game_type.code()),
            conference,
            game_type,
            higher_seed_team_id: higher.0.to_string(),
            lower_seed_team_id: lower.0.to_string(),
            higher_seed: higher.1,
            lower_seed: lower.1,
            result: None,
            winner_team_id: None,
            loser_team_id: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn conference(&self) -> Conference {
        self.conference
    }

    pub fn game_type(&self) -> PlayInGameType {
        self.game_type
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

    pub fn result(&self) -> Option<&GameResult> {
        self.result.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.winner_team_id.is_some()
    }

    pub fn winner_team_id(&self) -> Option<&str> {
        self.winner_team_id.as_deref()
    }

    pub fn loser_team_id(&self) -> Option<&str> {
        self.loser_team_id.as_deref()
    }

    pub fn involves(&self, team_id: &str) -> bool {
        self.higher_seed_team_id == team_id || self.lower_seed_team_id == team_id
    }

    /// Seed carried by a participant into this game.
    pub fn seed_of(&self, team_id: &str) -> Option<u8> {
        if self.higher_seed_team_id == team_id {
            Some(self.higher_seed)
        } else if self.lower_seed_team_id == team_id {
            Some(self.lower_seed)
        } else {
            None
        }
    }

    pub(crate) fn record(&mut self, result: GameResult) -> PlayoffResult<()> {
        if self.is_complete() {
            return Err(PlayoffError::GameComplete { game_id: self.id.clone() });
        }
        result.validate()?;
        let (winner, loser) = if result.home_won() {
            (&self.higher_seed_team_id, &self.lower_seed_team_id)
        } else {
            (&self.lower_seed_team_id, &self.higher_seed_team_id)
        };
        self.winner_team_id = Some(winner.clone());
        self.loser_team_id = Some(loser.clone());
        self.result = Some(result);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hosting_follows_two_two_one_one_one() {
        let hosts: Vec<bool> = (1..=7).map(higher_seed_hosts).collect();
        assert_eq!(hosts, vec![true, true, false, false, true, false, true]);
    }

    #[test]
    fn playoff_game_winner_is_derived_from_score() {
        let mut game = PlayoffGame::new("2025-E-R1-1", SeriesRound::FirstRound, 3, "BOS", "MIA", None);
        assert_eq!(game.home_team_id(), "MIA");
        assert_eq!(game.winner_team_id(), None);

        game.record(GameResult::new(104, 99)).unwrap();
        assert_eq!(game.winner_team_id(), Some("MIA"));
        assert_eq!(game.loser_team_id(), Some("BOS"));
        assert_eq!(game.higher_seed_won(), Some(false));
        assert_eq!(game.id(), "2025-E-R1-1-G3");
    }

    #[test]
    fn recorded_game_is_immutable() {
        let mut game = PlayoffGame::new("s", SeriesRound::Finals, 1, "BOS", "OKC", None);
        game.record(GameResult::new(100, 90)).unwrap();
        let err = game.record(GameResult::new(80, 120)).unwrap_err();
        assert!(matches!(err, PlayoffError::AlreadyRecorded { .. }));
        assert_eq!(game.result().unwrap().home_score, 100);
    }

    #[test]
    fn ties_are_rejected() {
        let mut game = PlayoffGame::new("s", SeriesRound::Finals, 1, "BOS", "OKC", None);
        assert_eq!(
            game.record(GameResult::new(101, 101)),
            Err(PlayoffError::TiedScore { score: 101 })
        );
        assert!(!game.is_complete());
    }

    #[test]
    fn play_in_winner_set_once() {
        let mut game = PlayInGame::new(
            2025,
            Conference::Western,
            PlayInGameType::NineVsTen,
            ("SAC", 9),
            ("DAL", 10),
        );
        assert_eq!(game.id(), "2025-W-PI-9v10");
        game.record(GameResult::new(106, 120).with_overtime(1)).unwrap();
        assert_eq!(game.winner_team_id(), Some("DAL"));
        assert_eq!(game.loser_team_id(), Some("SAC"));
        assert!(game.result().unwrap().is_overtime());

        let err = game.record(GameResult::new(130, 90)).unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(game.winner_team_id(), Some("DAL"));
    }
}
