use crate::game::{PlayInGame, PlayInGameType};
use crate::series::PlayoffSeries;
use crate::{Conference, TeamId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Address of a game that can receive a result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameRef {
    PlayIn {
        conference: Conference,
        game_type: PlayInGameType,
    },
    Series {
        series_id: String,
        game_number: u8,
    },
}

impl fmt::Display for GameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameRef::PlayIn { conference, game_type } => {
                write!(f, "{} play-in {}", conference.label(), game_type.label())
            }
            GameRef::Series { series_id, game_number } => write!(f, "{series_id} game {game_number}"),
        }
    }
}

/// Read-only preview of an upcoming game, for calendars and UIs.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledGame {
    pub game_ref: GameRef,
    pub game_id: String,
    pub label: String,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub date: Option<NaiveDate>,
    /// Whoever loses this game is out.
    pub elimination: bool,
}

impl ScheduledGame {
    pub(crate) fn from_play_in(game: &PlayInGame, date: Option<NaiveDate>) -> Self {
        // The 7v8 loser gets a second chance.
        let elimination = game.game_type() != PlayInGameType::SevenVsEight;
        Self {
            game_ref: GameRef::PlayIn {
                conference: game.conference(),
                game_type: game.game_type(),
            },
            game_id: game.id().to_string(),
            label: format!("{} Play-In {}", game.conference().label(), game.game_type().label()),
            home_team_id: game.higher_seed_team_id().to_string(),
            away_team_id: game.lower_seed_team_id().to_string(),
            date,
            elimination,
        }
    }

    pub(crate) fn from_series(series: &PlayoffSeries, date: Option<NaiveDate>) -> Option<Self> {
        let game = series.next_game_preview(date)?;
        let label = match series.conference() {
            Some(conference) => format!(
                "{} {} Game {}",
                conference.label(),
                series.round().label(),
                game.game_number()
            ),
            None => format!("{} Game {}", series.round().label(), game.game_number()),
        };
        Some(Self {
            game_ref: GameRef::Series {
                series_id: series.id().to_string(),
                game_number: game.game_number(),
            },
            game_id: game.id().to_string(),
            label,
            home_team_id: game.home_team_id().to_string(),
            away_team_id: game.away_team_id().to_string(),
            date: game.date(),
            elimination: !series.teams_facing_elimination().is_empty(),
        })
    }

    pub fn is_play_in(&self) -> bool {
        matches!(self.game_ref, GameRef::PlayIn { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameResult;
    use crate::SeriesRound;

    #[test]
    fn series_preview_follows_home_court() {
        let mut series = PlayoffSeries::new(
            "2025-F",
            None,
            SeriesRound::Finals,
            ("OKC", 1),
            ("IND", 4),
        );
        series.record_game_result(1, GameResult::new(100, 111)).unwrap();
        series.record_game_result(2, GameResult::new(123, 107)).unwrap();

        let date = NaiveDate::from_ymd_opt(2025, 6, 11);
        let next = ScheduledGame::from_series(&series, date).unwrap();
        assert_eq!(next.label, "Finals Game 3");
        assert_eq!(next.home_team_id, "IND");
        assert_eq!(next.date, date);
        assert!(!next.elimination);
        assert_eq!(
            next.game_ref,
            GameRef::Series { series_id: "2025-F".into(), game_number: 3 }
        );
        assert_eq!(next.game_ref.to_string(), "2025-F game 3");
        // Previewing does not attach a game.
        assert_eq!(series.games().len(), 2);
    }

    #[test]
    fn play_in_preview_marks_elimination_games() {
        let game = PlayInGame::new(
            2025,
            Conference::Eastern,
            PlayInGameType::NineVsTen,
            ("CHI", 9),
            ("MIA", 10),
        );
        let scheduled = ScheduledGame::from_play_in(&game, None);
        assert!(scheduled.is_play_in());
        assert!(scheduled.elimination);
        assert_eq!(scheduled.home_team_id, "CHI");
        assert_eq!(scheduled.label, "East Play-In 9 vs 10");
        assert_eq!(scheduled.date, None);

        let date = NaiveDate::from_ymd_opt(2025, 4, 16);
        assert_eq!(ScheduledGame::from_play_in(&game, date).date, date);
    }
}
