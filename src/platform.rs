//! Platform-specific key bindings

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Platform-appropriate modifier for the copy shortcut
/// - macOS: SUPER (Cmd key)
/// - Linux/Windows: CONTROL (Ctrl key)
#[cfg(target_os = "macos")]
pub const COPY_MODIFIER: KeyModifiers = KeyModifiers::SUPER;

#[cfg(not(target_os = "macos"))]
pub const COPY_MODIFIER: KeyModifiers = KeyModifiers::CONTROL;

/// Generate shortcut display
/// Ctrl+S works on all platforms, Cmd+S is accepted where the terminal forwards it
pub const GENERATE_SHORTCUT: &str = "^S";

/// Ctrl+S, or Cmd+S on macOS
pub fn is_generate_key(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('s') | KeyCode::Char('S'))
        && (key.modifiers.contains(KeyModifiers::CONTROL)
            || key.modifiers.contains(KeyModifiers::SUPER))
}

/// Copy shortcut on the review view: `y`, or Cmd+C on macOS
///
/// Ctrl+C is never a copy key since it quits.
pub fn is_copy_key(key: &KeyEvent) -> bool {
    if key.code == KeyCode::Char('y') && key.modifiers.is_empty() {
        return true;
    }
    key.code == KeyCode::Char('c')
        && key.modifiers == COPY_MODIFIER
        && !COPY_MODIFIER.contains(KeyModifiers::CONTROL)
}
