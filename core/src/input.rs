/// One discrete, already-debounced player input.
///
/// Sources deliver simultaneous presses within a polling tick in this
/// declaration order (the hardware scan order): directions first, then
/// activate, then the mode toggle. The derived `Ord` encodes that
/// priority.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Action {
    MoveUp,
    MoveRight,
    MoveDown,
    MoveLeft,
    Activate,
    ToggleMode,
}

/// Debounced input feed. `None` ends the current polling tick; the
/// source restarts on the next tick.
pub trait InputSource {
    fn next_action(&mut self) -> Option<Action>;
}
