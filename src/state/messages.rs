use crossterm::event::KeyEvent;

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    /// Fired on every autoplay interval, whether or not autoplay is on.
    AutoplayTick,
}
