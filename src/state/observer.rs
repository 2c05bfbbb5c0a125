use playoff_engine::{PlayoffEvent, PlayoffObserver};
use tokio::sync::mpsc;

/// Forwards engine events to the UI loop. Unbounded because the engine
/// delivers events synchronously while the app lock is held.
pub struct ChannelObserver {
    events: mpsc::UnboundedSender<PlayoffEvent>,
}

impl ChannelObserver {
    pub fn new(events: mpsc::UnboundedSender<PlayoffEvent>) -> Self {
        Self { events }
    }
}

impl PlayoffObserver for ChannelObserver {
    fn on_event(&mut self, event: &PlayoffEvent) {
        // The receiver only goes away during shutdown.
        let _ = self.events.send(event.clone());
    }
}
