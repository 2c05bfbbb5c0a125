use crate::game::{PlayInGameType, PlayoffGame};
use crate::{Conference, PlayoffPhase, SeriesRound, TeamId};
use std::sync::{Arc, Mutex};

/// Lifecycle notifications. Each carries enough ids for a listener to look
/// the entity up again through the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayoffEvent {
    PhaseChanged {
        from: PlayoffPhase,
        to: PlayoffPhase,
    },
    PlayInGameCompleted {
        conference: Conference,
        game_type: PlayInGameType,
        game_id: String,
        winner: TeamId,
        loser: TeamId,
    },
    PlayInCompleted {
        conference: Conference,
        seven_seed: TeamId,
        eight_seed: TeamId,
    },
    PlayoffGameCompleted {
        series_id: String,
        game: PlayoffGame,
    },
    SeriesCompleted {
        series_id: String,
        round: SeriesRound,
        winner: TeamId,
        loser: TeamId,
        games_played: u8,
    },
    ConferenceChampionCrowned {
        conference: Conference,
        team_id: TeamId,
    },
    FinalsStarted {
        series_id: String,
        higher_seed: TeamId,
        lower_seed: TeamId,
    },
    ChampionCrowned {
        champion: TeamId,
        runner_up: TeamId,
    },
}

impl PlayoffEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            PlayoffEvent::PhaseChanged { .. } => "phase",
            PlayoffEvent::PlayInGameCompleted { .. } => "play-in game",
            PlayoffEvent::PlayInCompleted { .. } => "play-in",
            PlayoffEvent::PlayoffGameCompleted { .. } => "game",
            PlayoffEvent::SeriesCompleted { .. } => "series",
            PlayoffEvent::ConferenceChampionCrowned { .. } => "conference",
            PlayoffEvent::FinalsStarted { .. } => "finals",
            PlayoffEvent::ChampionCrowned { .. } => "champion",
        }
    }
}

/// Receives events synchronously, in emission order, after each cascade
/// has settled.
pub trait PlayoffObserver: Send {
    fn on_event(&mut self, event: &PlayoffEvent);
}

impl<F> PlayoffObserver for F
where
    F: FnMut(&PlayoffEvent) + Send,
{
    fn on_event(&mut self, event: &PlayoffEvent) {
        self(event)
    }
}

/// Observer that keeps every event it sees. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<PlayoffEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PlayoffEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn take(&self) -> Vec<PlayoffEvent> {
        match self.events.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn phases(&self) -> Vec<PlayoffPhase> {
        self.events()
            .iter()
            .filter_map(|e| match e {
                PlayoffEvent::PhaseChanged { to, .. } => Some(*to),
                _ => None,
            })
            .collect()
    }
}

impl PlayoffObserver for EventRecorder {
    fn on_event(&mut self, event: &PlayoffEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}
