//! Platform-specific configuration

use crossterm::event::{KeyEvent, KeyModifiers};

/// Platform-appropriate modifier for command shortcuts
/// - macOS: SUPER (Cmd key)
/// - Linux/Windows: CONTROL (Ctrl key)
#[cfg(target_os = "macos")]
pub const COMMAND_MODIFIER: KeyModifiers = KeyModifiers::SUPER;

#[cfg(not(target_os = "macos"))]
pub const COMMAND_MODIFIER: KeyModifiers = KeyModifiers::CONTROL;

/// Ctrl works on every platform; Cmd is accepted on macOS when the
/// terminal forwards it
pub fn is_command(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) || key.modifiers.contains(COMMAND_MODIFIER)
}

/// Shortcut display for help text
pub const SUBMIT_SHORTCUT: &str = "Ctrl+S";
pub const VOICE_SHORTCUT: &str = "Ctrl+R";
pub const NEXT_SHORTCUT: &str = "Ctrl+N";
pub const PREV_SHORTCUT: &str = "Ctrl+P";
pub const AUTOFILL_SHORTCUT: &str = "Ctrl+U";
pub const GUEST_SHORTCUT: &str = "Ctrl+G";

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyCode;

    #[test]
    fn test_ctrl_is_always_a_command() {
        let key = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert!(is_command(&key));
    }

    #[test]
    fn test_plain_key_is_not_a_command() {
        let key = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE);
        assert!(!is_command(&key));
        let shifted = KeyEvent::new(KeyCode::Char('S'), KeyModifiers::SHIFT);
        assert!(!is_command(&shifted));
    }
}
