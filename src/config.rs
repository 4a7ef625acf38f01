//! Console configuration.

use bevy::color::Srgba;
use bevy::input::keyboard::KeyCode;
use bevy::prelude::*;

/// Default prompt drawn before the edit line.
pub const DEFAULT_PROMPT: &str = "donkey( ";

/// Default color of the edit line.
pub const DEFAULT_INPUT_COLOR: Srgba = Srgba::new(1.0, 1.0, 0.3, 1.0);

/// Console configuration.
///
/// Passed to [`ConsolePlugin`](crate::ConsolePlugin) and also inserted as a
/// resource so backends can read it.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ConsoleConfig {
    /// Keys that open and close the console.
    pub toggle_keys: Vec<KeyCode>,
    /// Text drawn before the edit line.
    pub prompt: String,
    /// Color of the prompt and edit line.
    pub input_color: Srgba,
    /// Draw status lines at all.
    pub status_render: bool,
    /// Send every printed line to the `debug_display` log target as well.
    pub mirror_to_debug_display: bool,
    /// Symbols completion never lists, matched case-insensitively.
    pub hidden_symbols: Vec<String>,
    /// Font size of the status line overlay and console window.
    pub font_size: f32,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            toggle_keys: vec![KeyCode::Backquote, KeyCode::F1],
            prompt: DEFAULT_PROMPT.to_string(),
            input_color: DEFAULT_INPUT_COLOR,
            status_render: true,
            mirror_to_debug_display: false,
            hidden_symbols: Vec::new(),
            font_size: 14.0,
        }
    }
}

impl ConsoleConfig {
    /// Whether `key` opens or closes the console.
    pub fn is_toggle_key(&self, key: KeyCode) -> bool {
        self.toggle_keys.contains(&key)
    }
}
