use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Input action that can be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    TogglePopover,
    ClosePopover,
    /// Grow or shrink the popover contents
    ToggleDetails,
    WheelPrev,
    WheelNext,
    /// Move keyboard focus to the other wheel
    SwitchWheel,
    /// Glide the wheels back to the start date
    WheelReset,
    MoveAnchor(i16, i16),
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        // Quit
        (KeyCode::Char('q'), KeyModifiers::NONE) => Action::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,

        // Popover
        (KeyCode::Enter, _) | (KeyCode::Char(' '), _) | (KeyCode::Char('o'), KeyModifiers::NONE) => {
            Action::TogglePopover
        }
        (KeyCode::Esc, _) => Action::ClosePopover,
        (KeyCode::Char('d'), KeyModifiers::NONE) => Action::ToggleDetails,

        // Wheel
        (KeyCode::Char('h'), KeyModifiers::NONE) | (KeyCode::Left, KeyModifiers::NONE) => Action::WheelPrev,
        (KeyCode::Char('l'), KeyModifiers::NONE) | (KeyCode::Right, KeyModifiers::NONE) => Action::WheelNext,
        (KeyCode::Tab, _) | (KeyCode::BackTab, _) => Action::SwitchWheel,
        (KeyCode::Char('0'), _) => Action::WheelReset,

        // Anchor movement
        (KeyCode::Char('H'), _) | (KeyCode::Left, KeyModifiers::SHIFT) => Action::MoveAnchor(-2, 0),
        (KeyCode::Char('L'), _) | (KeyCode::Right, KeyModifiers::SHIFT) => Action::MoveAnchor(2, 0),
        (KeyCode::Char('K'), _) | (KeyCode::Up, _) => Action::MoveAnchor(0, -1),
        (KeyCode::Char('J'), _) | (KeyCode::Down, _) => Action::MoveAnchor(0, 1),

        _ => Action::None,
    }
}
