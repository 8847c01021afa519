//! Terminal-agnostic keyboard input.

/// Keyboard input abstraction.
///
/// Decouples the presenter from terminal libraries (crossterm, termion, etc.)
/// so the same key handling runs under simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character.
    Char(char),
    /// Enter/Return key.
    Enter,
    /// Backspace key (delete last character of the focused field).
    Backspace,
    /// Tab key (focus next).
    Tab,
    /// Shift+Tab (focus previous).
    BackTab,
    /// Escape key (quit).
    Esc,
    /// Up arrow key.
    Up,
    /// Down arrow key.
    Down,
}
