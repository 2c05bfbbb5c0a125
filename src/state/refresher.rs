use crate::state::messages::UiEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

/// Drives autoplay. The app ignores ticks while autoplay is off.
pub struct AutoplayTicker {
    ui_events: mpsc::Sender<UiEvent>,
    period: Duration,
}

impl AutoplayTicker {
    pub fn new(ui_events: mpsc::Sender<UiEvent>, period: Duration) -> Self {
        Self { ui_events, period }
    }

    pub async fn run(self) {
        let mut ticks = interval(self.period);
        // Skip the immediate first tick so a game isn't played on startup.
        ticks.tick().await;

        loop {
            ticks.tick().await;
            if self.ui_events.send(UiEvent::AutoplayTick).await.is_err() {
                break;
            }
        }
    }
}
