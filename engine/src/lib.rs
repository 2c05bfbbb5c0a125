pub mod bracket;
pub mod conference;
pub mod controller;
pub mod error;
pub mod events;
pub mod game;
pub mod play_in;
pub mod schedule;
pub mod series;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod test_support;

pub use bracket::PlayoffBracket;
pub use conference::{ConferenceBracket, RoundAdvance};
pub use controller::{PlayoffConfig, PlayoffController};
pub use error::{PlayoffError, PlayoffResult};
pub use events::{EventRecorder, PlayoffEvent, PlayoffObserver};
pub use game::{GameResult, PlayInGame, PlayInGameType, PlayoffGame};
pub use play_in::{ConferencePlayInBracket, PlayInTournament};
pub use schedule::{GameRef, ScheduledGame};
pub use series::PlayoffSeries;
pub use snapshot::{PlayoffSaveData, SnapshotError};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Team identifiers are opaque strings supplied by the standings source.
pub type TeamId = String;

// ---------------------------------------------------------------------------
// Standings input
// ---------------------------------------------------------------------------

/// One team's regular-season standing within its conference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsEntry {
    pub team_id: TeamId,
    pub seed: u8,
    pub wins: u16,
    pub losses: u16,
}

impl StandingsEntry {
    pub fn new(team_id: impl Into<TeamId>, seed: u8, wins: u16, losses: u16) -> Self {
        Self { team_id: team_id.into(), seed, wins, losses }
    }

    pub fn win_pct(&self) -> f64 {
        let games = u32::from(self.wins) + u32::from(self.losses);
        if games == 0 {
            return 0.0;
        }
        f64::from(self.wins) / f64::from(games)
    }

    /// Record-only comparison used for Finals home court, where seeds come
    /// from different conferences and are not comparable.
    pub fn has_better_record_than(&self, other: &StandingsEntry) -> bool {
        let (a, b) = (self.win_pct(), other.win_pct());
        if (a - b).abs() > f64::EPSILON {
            return a > b;
        }
        if self.wins != other.wins {
            return self.wins > other.wins;
        }
        self.seed < other.seed
    }
}

// ---------------------------------------------------------------------------
// Conference / round / phase enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Conference {
    Eastern,
    Western,
}

impl Conference {
    pub const ALL: [Conference; 2] = [Conference::Eastern, Conference::Western];

    pub fn label(&self) -> &'static str {
        match self {
            Conference::Eastern => "East",
            Conference::Western => "West",
        }
    }

    /// Single-letter code used in generated ids.
    pub fn code(&self) -> &'static str {
        match self {
            Conference::Eastern => "E",
            Conference::Western => "W",
        }
    }

    pub fn other(self) -> Self {
        match self {
            Conference::Eastern => Conference::Western,
            Conference::Western => Conference::Eastern,
        }
    }
}

/// Best-of-seven rounds, ordered from earliest to latest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SeriesRound {
    FirstRound,
    ConferenceSemis,
    ConferenceFinals,
    Finals,
}

impl SeriesRound {
    pub fn label(&self) -> &'static str {
        match self {
            SeriesRound::FirstRound => "First Round",
            SeriesRound::ConferenceSemis => "Conference Semifinals",
            SeriesRound::ConferenceFinals => "Conference Finals",
            SeriesRound::Finals => "Finals",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            SeriesRound::FirstRound => "R1",
            SeriesRound::ConferenceSemis => "R2",
            SeriesRound::ConferenceFinals => "CF",
            SeriesRound::Finals => "F",
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            SeriesRound::FirstRound => Some(SeriesRound::ConferenceSemis),
            SeriesRound::ConferenceSemis => Some(SeriesRound::ConferenceFinals),
            SeriesRound::ConferenceFinals => Some(SeriesRound::Finals),
            SeriesRound::Finals => None,
        }
    }

    /// Index into a conference bracket's round list. Finals are not part of
    /// a conference bracket.
    pub fn conference_index(&self) -> Option<usize> {
        match self {
            SeriesRound::FirstRound => Some(0),
            SeriesRound::ConferenceSemis => Some(1),
            SeriesRound::ConferenceFinals => Some(2),
            SeriesRound::Finals => None,
        }
    }
}

/// Overall tournament phase. Ordered; transitions only move forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlayoffPhase {
    #[default]
    NotStarted,
    PlayIn,
    FirstRound,
    ConferenceSemis,
    ConferenceFinals,
    Finals,
    Complete,
}

impl PlayoffPhase {
    pub fn label(&self) -> &'static str {
        match self {
            PlayoffPhase::NotStarted => "Not Started",
            PlayoffPhase::PlayIn => "Play-In Tournament",
            PlayoffPhase::FirstRound => "First Round",
            PlayoffPhase::ConferenceSemis => "Conference Semifinals",
            PlayoffPhase::ConferenceFinals => "Conference Finals",
            PlayoffPhase::Finals => "Finals",
            PlayoffPhase::Complete => "Complete",
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            PlayoffPhase::NotStarted => Some(PlayoffPhase::PlayIn),
            PlayoffPhase::PlayIn => Some(PlayoffPhase::FirstRound),
            PlayoffPhase::FirstRound => Some(PlayoffPhase::ConferenceSemis),
            PlayoffPhase::ConferenceSemis => Some(PlayoffPhase::ConferenceFinals),
            PlayoffPhase::ConferenceFinals => Some(PlayoffPhase::Finals),
            PlayoffPhase::Finals => Some(PlayoffPhase::Complete),
            PlayoffPhase::Complete => None,
        }
    }

    /// The series round played during this phase, if any.
    pub fn series_round(&self) -> Option<SeriesRound> {
        match self {
            PlayoffPhase::FirstRound => Some(SeriesRound::FirstRound),
            PlayoffPhase::ConferenceSemis => Some(SeriesRound::ConferenceSemis),
            PlayoffPhase::ConferenceFinals => Some(SeriesRound::ConferenceFinals),
            PlayoffPhase::Finals => Some(SeriesRound::Finals),
            _ => None,
        }
    }

    pub fn from_round(round: SeriesRound) -> Self {
        match round {
            SeriesRound::FirstRound => PlayoffPhase::FirstRound,
            SeriesRound::ConferenceSemis => PlayoffPhase::ConferenceSemis,
            SeriesRound::ConferenceFinals => PlayoffPhase::ConferenceFinals,
            SeriesRound::Finals => PlayoffPhase::Finals,
        }
    }
}

// ---------------------------------------------------------------------------
// Display-name resolution
// ---------------------------------------------------------------------------

/// Resolves a team id to a display name. Status strings go through this so
/// the engine never stores presentation data.
pub trait TeamNames {
    fn display_name(&self, team_id: &str) -> String;
}

impl<F> TeamNames for F
where
    F: Fn(&str) -> String,
{
    fn display_name(&self, team_id: &str) -> String {
        self(team_id)
    }
}

impl TeamNames for HashMap<TeamId, String> {
    fn display_name(&self, team_id: &str) -> String {
        self.get(team_id).cloned().unwrap_or_else(|| team_id.to_string())
    }
}

/// Falls back to the raw team id.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawIds;

impl TeamNames for RawIds {
    fn display_name(&self, team_id: &str) -> String {
        team_id.to_string()
    }
}
