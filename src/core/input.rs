//! Key events, the input source seam and the edit line.

use std::collections::VecDeque;

use bevy::input::keyboard::KeyCode;
use bevy::prelude::*;

use super::text::{push_bounded, set_bounded};

/// Longest command line the console accepts, in bytes.
pub const MAX_LINE_LENGTH: usize = 254;

/// Modifier keys held during a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Self = Self(0);
    pub const SHIFT: Self = Self(1 << 0);
    pub const CONTROL: Self = Self(1 << 1);
    pub const ALT: Self = Self(1 << 2);

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Modifiers {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// A key was pressed.
    Down(KeyCode),
    /// A key was released.
    Up(KeyCode),
    /// A printable character was typed.
    Char(char),
}

/// One queued keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub kind: KeyKind,
    pub modifiers: Modifiers,
    /// Generated by key repeat rather than a fresh press.
    pub repeating: bool,
}

impl KeyEvent {
    pub fn down(key: KeyCode) -> Self {
        Self { kind: KeyKind::Down(key), modifiers: Modifiers::NONE, repeating: false }
    }

    pub fn up(key: KeyCode) -> Self {
        Self { kind: KeyKind::Up(key), modifiers: Modifiers::NONE, repeating: false }
    }

    pub fn char(c: char) -> Self {
        Self { kind: KeyKind::Char(c), modifiers: Modifiers::NONE, repeating: false }
    }

    /// Same event with `modifiers` held.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Same event flagged as a key repeat.
    pub fn repeated(mut self) -> Self {
        self.repeating = true;
        self
    }
}

/// Where the console reads keys and clipboard text from.
pub trait InputSource {
    /// Next pending key while the console owns the keyboard.
    fn next_console_key(&mut self) -> Option<KeyEvent>;

    /// Remove and return the first pending key matching `wanted`, leaving the
    /// rest for the game.
    fn take_ambient_key(&mut self, wanted: &dyn Fn(&KeyEvent) -> bool) -> Option<KeyEvent>;

    /// Current clipboard text.
    fn clipboard_text(&mut self) -> Option<String>;
}

/// Keyboard events collected for the console this frame.
#[derive(Resource, Debug, Default)]
pub struct KeyQueue {
    events: VecDeque<KeyEvent>,
    /// Clipboard contents to paste instead of the system clipboard.
    pub clipboard_override: Option<String>,
}

impl KeyQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: KeyEvent) {
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl InputSource for KeyQueue {
    fn next_console_key(&mut self) -> Option<KeyEvent> {
        self.events.pop_front()
    }

    fn take_ambient_key(&mut self, wanted: &dyn Fn(&KeyEvent) -> bool) -> Option<KeyEvent> {
        let index = self.events.iter().position(wanted)?;
        self.events.remove(index)
    }

    fn clipboard_text(&mut self) -> Option<String> {
        if let Some(text) = &self.clipboard_override {
            return Some(text.clone());
        }
        system_clipboard_text()
    }
}

#[cfg(feature = "clipboard")]
fn system_clipboard_text() -> Option<String> {
    match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.get_text()) {
        Ok(text) => Some(text),
        Err(e) => {
            debug!("Clipboard unavailable: {}", e);
            None
        }
    }
}

#[cfg(not(feature = "clipboard"))]
fn system_clipboard_text() -> Option<String> {
    None
}

/// The text being edited at the prompt.
#[derive(Debug, Clone, Default)]
pub struct LineBuffer {
    text: String,
    cursor: usize,
    selection_anchor: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Edit cursor, as a byte offset.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Selected byte range; empty when nothing is selected.
    pub fn selection(&self) -> std::ops::Range<usize> {
        self.selection_anchor.min(self.cursor)..self.selection_anchor.max(self.cursor)
    }

    /// Move the edit cursor, clamped to the text and collapsing the selection.
    pub fn set_cursor(&mut self, position: usize) {
        let mut position = position.min(self.text.len());
        while !self.text.is_char_boundary(position) {
            position -= 1;
        }
        self.cursor = position;
        self.selection_anchor = position;
    }

    /// Put the cursor at the end and drop the selection.
    pub fn reset_selection(&mut self) {
        self.set_cursor(self.text.len());
    }

    /// Append a character if it fits.
    pub fn push_char(&mut self, c: char) -> bool {
        let mut buf = [0u8; 4];
        let appended = push_bounded(&mut self.text, c.encode_utf8(&mut buf), MAX_LINE_LENGTH) > 0;
        self.reset_selection();
        appended
    }

    /// Append as much of `text` as fits.
    pub fn push_str(&mut self, text: &str) {
        push_bounded(&mut self.text, text, MAX_LINE_LENGTH);
        self.reset_selection();
    }

    /// Remove the last character.
    pub fn pop_char(&mut self) -> Option<char> {
        let c = self.text.pop();
        self.reset_selection();
        c
    }

    /// Replace the contents.
    pub fn set(&mut self, text: &str) {
        set_bounded(&mut self.text, text, MAX_LINE_LENGTH);
        self.reset_selection();
    }

    /// Cut the text at byte `len`, keeping the cursor inside it.
    pub fn truncate(&mut self, len: usize) {
        if len < self.text.len() && self.text.is_char_boundary(len) {
            self.text.truncate(len);
        }
        self.set_cursor(self.cursor);
    }

    /// Empty the buffer.
    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
        self.selection_anchor = 0;
    }

    /// The word being typed: everything after the last space, `(` or `"`.
    pub fn current_token(&self) -> &str {
        match self.text.rfind([' ', '(', '"']) {
            Some(index) => &self.text[index + 1..],
            None => &self.text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_buffer_is_bounded() {
        let mut line = LineBuffer::new();
        line.set(&"a".repeat(MAX_LINE_LENGTH - 1));
        assert!(line.push_char('b'));
        assert!(!line.push_char('c'));
        assert_eq!(line.len(), MAX_LINE_LENGTH);
        assert_eq!(line.cursor(), MAX_LINE_LENGTH);

        line.push_str("more");
        assert_eq!(line.len(), MAX_LINE_LENGTH);
    }

    #[test]
    fn test_cursor_and_selection() {
        let mut line = LineBuffer::new();
        line.set("héllo");
        assert_eq!(line.cursor(), line.len());
        assert!(line.selection().is_empty());

        // inside 'é' backs off to the boundary
        line.set_cursor(2);
        assert_eq!(line.cursor(), 1);

        line.set_cursor(100);
        assert_eq!(line.cursor(), line.len());

        line.truncate(1);
        assert_eq!(line.text(), "h");
        assert_eq!(line.cursor(), 1);

        assert_eq!(line.pop_char(), Some('h'));
        assert_eq!(line.pop_char(), None);
        assert_eq!(line.cursor(), 0);
    }

    #[test]
    fn test_current_token() {
        let mut line = LineBuffer::new();
        line.set("print(\"debug_dr");
        assert_eq!(line.current_token(), "debug_dr");

        line.set("set fps");
        assert_eq!(line.current_token(), "fps");

        line.set("plain");
        assert_eq!(line.current_token(), "plain");

        line.set("trailing ");
        assert_eq!(line.current_token(), "");
    }

    #[test]
    fn test_key_queue_order() {
        let mut queue = KeyQueue::new();
        queue.push(KeyEvent::char('a'));
        queue.push(KeyEvent::up(KeyCode::Enter));

        assert_eq!(queue.next_console_key(), Some(KeyEvent::char('a')));
        assert_eq!(queue.next_console_key(), Some(KeyEvent::up(KeyCode::Enter)));
        assert_eq!(queue.next_console_key(), None);
    }

    #[test]
    fn test_take_ambient_key_leaves_others() {
        let mut queue = KeyQueue::new();
        queue.push(KeyEvent::down(KeyCode::KeyW));
        queue.push(KeyEvent::down(KeyCode::Backquote));
        queue.push(KeyEvent::down(KeyCode::KeyS));

        let taken = queue.take_ambient_key(&|event| event.kind == KeyKind::Down(KeyCode::Backquote));
        assert_eq!(taken, Some(KeyEvent::down(KeyCode::Backquote)));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.take_ambient_key(&|_| false), None);
    }

    #[test]
    fn test_clipboard_override() {
        let mut queue = KeyQueue::new();
        queue.clipboard_override = Some("pasted".into());
        assert_eq!(queue.clipboard_text().as_deref(), Some("pasted"));
    }

    #[test]
    fn test_modifiers() {
        let mut modifiers = Modifiers::NONE;
        assert!(modifiers.is_empty());
        modifiers |= Modifiers::CONTROL;
        assert!(modifiers.contains(Modifiers::CONTROL));
        assert!(!modifiers.contains(Modifiers::CONTROL | Modifiers::SHIFT));
    }
}
