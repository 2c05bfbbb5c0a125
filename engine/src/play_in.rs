use crate::error::{PlayoffError, PlayoffResult};
use crate::game::{GameResult, PlayInGame, PlayInGameType};
use crate::{Conference, TeamId};
use log::debug;
use serde::{Deserialize, Serialize};

/// Play-in for one conference: seeds 7-10 compete for the last two berths.
///
/// 7v8 and 9v10 are independent. The 8th-seed decider (loser of 7v8 vs
/// winner of 9v10) only exists once both are done, and it is never created
/// implicitly: callers check `can_create_eight_seed_game` and then call
/// `create_eight_seed_game`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConferencePlayInBracket {
    season: u16,
    conference: Conference,
    seed7_team_id: TeamId,
    seed8_team_id: TeamId,
    seed9_team_id: TeamId,
    seed10_team_id: TeamId,
    seven_vs_eight: PlayInGame,
    nine_vs_ten: PlayInGame,
    eight_seed_game: Option<PlayInGame>,
}

impl ConferencePlayInBracket {
    /// `seeds` are the team ids ranked 7, 8, 9 and 10.
    pub fn new(season: u16, conference: Conference, seeds: [&str; 4]) -> Self {
        let [s7, s8, s9, s10] = seeds;
        Self {
            season,
            conference,
            seed7_team_id: s7.to_string(),
            seed8_team_id: s8.to_string(),
            seed9_team_id: s9.to_string(),
            seed10_team_id: s10.to_string(),
            seven_vs_eight: PlayInGame::new(
                season,
                conference,
                PlayInGameType::SevenVsEight,
                (s7, 7),
                (s8, 8),
            ),
            nine_vs_ten: PlayInGame::new(
                season,
                conference,
                PlayInGameType::NineVsTen,
                (s9, 9),
                (s10, 10),
            ),
            eight_seed_game: None,
        }
    }

    pub fn conference(&self) -> Conference {
        self.conference
    }

    pub fn seed_team_ids(&self) -> [&str; 4] {
        [
            self.seed7_team_id.as_str(),
            self.seed8_team_id.as_str(),
            self.seed9_team_id.as_str(),
            self.seed10_team_id.as_str(),
        ]
    }

    pub fn seven_vs_eight(&self) -> &PlayInGame {
        &self.seven_vs_eight
    }

    pub fn nine_vs_ten(&self) -> &PlayInGame {
        &self.nine_vs_ten
    }

    pub fn eight_seed_game(&self) -> Option<&PlayInGame> {
        self.eight_seed_game.as_ref()
    }

    pub fn game(&self, game_type: PlayInGameType) -> Option<&PlayInGame> {
        match game_type {
            PlayInGameType::SevenVsEight => Some(&self.seven_vs_eight),
            PlayInGameType::NineVsTen => Some(&self.nine_vs_ten),
            PlayInGameType::EightSeedDecider => self.eight_seed_game.as_ref(),
        }
    }

    fn game_mut(&mut self, game_type: PlayInGameType) -> Option<&mut PlayInGame> {
        match game_type {
            PlayInGameType::SevenVsEight => Some(&mut self.seven_vs_eight),
            PlayInGameType::NineVsTen => Some(&mut self.nine_vs_ten),
            PlayInGameType::EightSeedDecider => self.eight_seed_game.as_mut(),
        }
    }

    /// Created games in play order.
    pub fn games(&self) -> impl Iterator<Item = &PlayInGame> {
        [&self.seven_vs_eight, &self.nine_vs_ten]
            .into_iter()
            .chain(self.eight_seed_game.as_ref())
    }

    pub fn pending_games(&self) -> impl Iterator<Item = &PlayInGame> {
        self.games().filter(|g| !g.is_complete())
    }

    pub fn has_started(&self) -> bool {
        self.games().any(|g| g.is_complete())
    }

    pub fn can_create_eight_seed_game(&self) -> bool {
        self.eight_seed_game.is_none()
            && self.seven_vs_eight.is_complete()
            && self.nine_vs_ten.is_complete()
    }

    /// Build the decider. Returns the existing game if it was already built.
    pub fn create_eight_seed_game(&mut self) -> PlayoffResult<&PlayInGame> {
        if self.eight_seed_game.is_none() {
            let (Some(loser78), Some(winner910)) = (
                self.seven_vs_eight.loser_team_id(),
                self.nine_vs_ten.winner_team_id(),
            ) else {
                return Err(PlayoffError::Prerequisite(format!(
                    "{} 8th seed game needs both 7v8 and 9v10 results",
                    self.conference.label()
                )));
            };
            let loser78_seed = self.seven_vs_eight.seed_of(loser78).unwrap_or(8);
            let winner910_seed = self.nine_vs_ten.seed_of(winner910).unwrap_or(9);
            let game = PlayInGame::new(
                self.season,
                self.conference,
                PlayInGameType::EightSeedDecider,
                (loser78, loser78_seed),
                (winner910, winner910_seed),
            );
            debug!(
                "{} 8th seed game: {} vs {}",
                self.conference.label(),
                game.higher_seed_team_id(),
                game.lower_seed_team_id()
            );
            self.eight_seed_game = Some(game);
        }
        self.eight_seed_game
            .as_ref()
            .ok_or_else(|| PlayoffError::NotFound("8th seed game".into()))
    }

    /// Record a play-in result. The higher seed hosts, so `result.home_score`
    /// is the higher seed's score.
    pub fn record_game_result(
        &mut self,
        game_type: PlayInGameType,
        result: GameResult,
    ) -> PlayoffResult<&PlayInGame> {
        let conference = self.conference;
        let game = self.game_mut(game_type).ok_or_else(|| {
            PlayoffError::Prerequisite(format!(
                "{} 8th seed game has not been created",
                conference.label()
            ))
        })?;
        game.record(result)?;
        Ok(&*game)
    }

    /// Winner of 7v8.
    pub fn seven_seed_team_id(&self) -> Option<&str> {
        self.seven_vs_eight.winner_team_id()
    }

    /// Winner of the 8th seed decider.
    pub fn eight_seed_team_id(&self) -> Option<&str> {
        self.eight_seed_game.as_ref().and_then(|g| g.winner_team_id())
    }

    pub fn is_complete(&self) -> bool {
        self.seven_seed_team_id().is_some() && self.eight_seed_team_id().is_some()
    }

    /// Teams whose season ended in the play-in.
    pub fn eliminated_team_ids(&self) -> Vec<&str> {
        self.nine_vs_ten
            .loser_team_id()
            .into_iter()
            .chain(self.eight_seed_game.as_ref().and_then(|g| g.loser_team_id()))
            .collect()
    }

    pub fn is_eliminated(&self, team_id: &str) -> bool {
        self.eliminated_team_ids().contains(&team_id)
    }

    pub fn involves(&self, team_id: &str) -> bool {
        self.seed_team_ids().contains(&team_id)
    }

    /// The play-in game this team plays next, if it still has one.
    pub fn next_game_for(&self, team_id: &str) -> Option<&PlayInGame> {
        self.pending_games().find(|g| g.involves(team_id))
    }

    pub(crate) fn check_integrity(&self) -> Result<(), String> {
        let Some(decider) = &self.eight_seed_game else {
            return Ok(());
        };
        let expected = (
            self.seven_vs_eight.loser_team_id(),
            self.nine_vs_ten.winner_team_id(),
        );
        if expected != (Some(decider.higher_seed_team_id()), Some(decider.lower_seed_team_id())) {
            return Err(format!(
                "{} 8th seed game participants do not match the feeder games",
                self.conference.label()
            ));
        }
        Ok(())
    }
}

/// Both conferences' play-in brackets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayInTournament {
    pub eastern: ConferencePlayInBracket,
    pub western: ConferencePlayInBracket,
}

impl PlayInTournament {
    pub fn conference(&self, conference: Conference) -> &ConferencePlayInBracket {
        match conference {
            Conference::Eastern => &self.eastern,
            Conference::Western => &self.western,
        }
    }

    pub fn conference_mut(&mut self, conference: Conference) -> &mut ConferencePlayInBracket {
        match conference {
            Conference::Eastern => &mut self.eastern,
            Conference::Western => &mut self.western,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.eastern.is_complete() && self.western.is_complete()
    }

    pub fn has_started(&self) -> bool {
        self.eastern.has_started() || self.western.has_started()
    }

    pub fn is_eliminated(&self, team_id: &str) -> bool {
        self.eastern.is_eliminated(team_id) || self.western.is_eliminated(team_id)
    }

    pub fn brackets(&self) -> [&ConferencePlayInBracket; 2] {
        [&self.eastern, &self.western]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bracket() -> ConferencePlayInBracket {
        ConferencePlayInBracket::new(2025, Conference::Eastern, ["ORL", "ATL", "CHI", "MIA"])
    }

    #[test]
    fn decider_requires_both_feeders() {
        let mut b = bracket();
        assert!(!b.can_create_eight_seed_game());
        let err = b.create_eight_seed_game().unwrap_err();
        assert!(matches!(err, PlayoffError::Prerequisite(_)));

        b.record_game_result(PlayInGameType::SevenVsEight, GameResult::new(120, 95)).unwrap();
        assert!(!b.can_create_eight_seed_game());
        assert!(b.create_eight_seed_game().is_err());
        assert!(b.eight_seed_game().is_none());

        let err = b
            .record_game_result(PlayInGameType::EightSeedDecider, GameResult::new(100, 90))
            .unwrap_err();
        assert!(matches!(err, PlayoffError::Prerequisite(_)));
    }

    #[test]
    fn decider_pairs_seven_eight_loser_with_nine_ten_winner() {
        let mut b = bracket();
        // 8 seed wins 7v8, 10 seed wins 9v10.
        b.record_game_result(PlayInGameType::SevenVsEight, GameResult::new(95, 101)).unwrap();
        b.record_game_result(PlayInGameType::NineVsTen, GameResult::new(99, 109)).unwrap();
        assert!(b.can_create_eight_seed_game());

        let decider = b.create_eight_seed_game().unwrap();
        assert_eq!(decider.higher_seed_team_id(), "ORL");
        assert_eq!(decider.lower_seed_team_id(), "MIA");
        assert_eq!(decider.higher_seed(), 7);
        assert_eq!(decider.lower_seed(), 10);
        assert!(!b.can_create_eight_seed_game());

        // Creating twice returns the same game.
        let again = b.create_eight_seed_game().unwrap().id().to_string();
        assert_eq!(again, "2025-E-PI-8SD");

        assert!(!b.is_complete());
        assert_eq!(b.seven_seed_team_id(), Some("ATL"));
        assert_eq!(b.eliminated_team_ids(), vec!["CHI"]);

        b.record_game_result(PlayInGameType::EightSeedDecider, GameResult::new(104, 112)).unwrap();
        assert!(b.is_complete());
        assert_eq!(b.eight_seed_team_id(), Some("MIA"));
        assert_eq!(b.eliminated_team_ids(), vec!["CHI", "ORL"]);
        assert!(b.is_eliminated("ORL"));
        assert!(!b.is_eliminated("ATL"));
        assert!(b.check_integrity().is_ok());
    }

    #[test]
    fn pending_games_follow_progress() {
        let mut b = bracket();
        assert_eq!(b.pending_games().count(), 2);
        assert_eq!(b.next_game_for("CHI").map(|g| g.game_type()), Some(PlayInGameType::NineVsTen));
        b.record_game_result(PlayInGameType::NineVsTen, GameResult::new(110, 100)).unwrap();
        assert!(b.next_game_for("MIA").is_none());
        assert!(b.has_started());
        assert_eq!(b.pending_games().count(), 1);
    }
}
