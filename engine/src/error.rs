use std::fmt;

pub type PlayoffResult<T> = Result<T, PlayoffError>;

/// Everything the engine can reject. All variants except `Initialization`
/// leave the bracket untouched and are safe to log and ignore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayoffError {
    /// A result arrived out of game-number order.
    Sequence { expected: u8, got: u8 },
    /// The game was already recorded; the delivery is a duplicate.
    AlreadyRecorded { game_id: String },
    /// The series already has a winner.
    SeriesComplete { series_id: String },
    /// The play-in game already has a winner.
    GameComplete { game_id: String },
    /// Basketball games cannot end tied.
    TiedScore { score: u16 },
    /// The operation is not valid in the current tournament phase.
    InvalidPhase { phase: &'static str, action: &'static str },
    /// An earlier stage has not finished yet.
    Prerequisite(String),
    /// Unknown team, series or game reference.
    NotFound(String),
    /// Malformed standings passed to `initialize_playoffs`.
    Initialization(String),
}

impl fmt::Display for PlayoffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayoffError::Sequence { expected, got } => {
                write!(f, "Sequence error: expected game {expected}, got game {got}")
            }
            PlayoffError::AlreadyRecorded { game_id } => {
                write!(f, "Sequence error: game {game_id} is already recorded")
            }
            PlayoffError::SeriesComplete { series_id } => {
                write!(f, "Invalid state: series {series_id} is already complete")
            }
            PlayoffError::GameComplete { game_id } => {
                write!(f, "Invalid state: game {game_id} is already complete")
            }
            PlayoffError::TiedScore { score } => write!(f, "Invalid score: tied at {score}"),
            PlayoffError::InvalidPhase { phase, action } => {
                write!(f, "Invalid state: cannot {action} during {phase}")
            }
            PlayoffError::Prerequisite(msg) => write!(f, "Prerequisite not met: {msg}"),
            PlayoffError::NotFound(msg) => write!(f, "Not found: {msg}"),
            PlayoffError::Initialization(msg) => write!(f, "Initialization error: {msg}"),
        }
    }
}

impl std::error::Error for PlayoffError {}

impl PlayoffError {
    /// Only malformed initialization input is a caller contract violation.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, PlayoffError::Initialization(_))
    }

    /// True for re-delivered results that were already applied.
    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            PlayoffError::AlreadyRecorded { .. }
                | PlayoffError::SeriesComplete { .. }
                | PlayoffError::GameComplete { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_initialization_is_fatal() {
        assert!(!PlayoffError::Initialization("x".into()).is_recoverable());
        assert!(PlayoffError::Sequence { expected: 2, got: 3 }.is_recoverable());
        assert!(PlayoffError::NotFound("BOS".into()).is_recoverable());
    }

    #[test]
    fn display_names_the_taxonomy() {
        let err = PlayoffError::Sequence { expected: 2, got: 4 };
        assert_eq!(err.to_string(), "Sequence error: expected game 2, got game 4");
        let err = PlayoffError::Prerequisite("play-in unfinished".into());
        assert!(err.to_string().starts_with("Prerequisite not met"));
    }
}
