//! Status line rendering.
//!
//! Consecutive lines that share a style are coalesced into a single
//! multi-line draw call through a one-slot [`StringCache`].

use bevy::color::{Alpha, Srgba};

use super::status_line::{StatusLine, StatusLineFlags, StatusLineRegistry};

/// Separator between coalesced lines.
pub const LINE_BREAK: &str = "\n";

/// Drawn in place of a blinking line's text during the "off" phase. Keeps
/// the line's slot in a coalesced block so the lines below do not jump.
pub const BLINK_PLACEHOLDER: &str = " ";

/// Full blink cycle in milliseconds.
pub const BLINK_PERIOD_MS: u64 = 500;

/// Portion of the cycle during which the placeholder is shown.
pub const BLINK_OFF_MS: u64 = 250;

/// Horizontal alignment of a draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justification {
    Left,
    Right,
}

/// One draw call handed to a [`TextRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub struct TextDraw {
    pub justification: Justification,
    /// Foreground color, alpha included.
    pub color: Srgba,
    /// Drop shadow color, alpha included.
    pub shadow: Srgba,
    /// Possibly multi-line text, lines joined by [`LINE_BREAK`].
    pub text: String,
}

/// Backend that puts text on screen.
pub trait TextRenderer {
    fn draw_text(&mut self, draw: TextDraw);
}

impl TextRenderer for Vec<TextDraw> {
    fn draw_text(&mut self, draw: TextDraw) {
        self.push(draw);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Style {
    justification: Justification,
    /// Color channels only; the line alpha below replaces the color's own.
    rgb: [f32; 3],
    alpha: f32,
}

/// Single-slot batch of same-style text.
#[derive(Debug, Default)]
pub struct StringCache {
    text: String,
    style: Option<Style>,
}

impl StringCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing is batched.
    pub fn is_empty(&self) -> bool {
        self.style.is_none()
    }

    /// Append `text` if the cache is empty or holds the same style.
    ///
    /// Returns `false` when the styles differ; the caller flushes and retries.
    pub fn try_add(
        &mut self,
        text: &str,
        justification: Justification,
        color: Srgba,
        alpha: f32,
    ) -> bool {
        let style = Style {
            justification,
            rgb: [color.red, color.green, color.blue],
            alpha,
        };
        match self.style {
            None => {
                self.style = Some(style);
                self.text.clear();
                self.text.push_str(text);
                true
            }
            Some(current) if current == style => {
                self.text.push_str(LINE_BREAK);
                self.text.push_str(text);
                true
            }
            Some(_) => false,
        }
    }

    /// Emit the batch as one draw call and empty the cache.
    ///
    /// The foreground is drawn at half the line alpha over a black shadow at
    /// full line alpha.
    pub fn flush(&mut self, renderer: &mut dyn TextRenderer) {
        let Some(style) = self.style.take() else {
            return;
        };

        let [red, green, blue] = style.rgb;
        renderer.draw_text(TextDraw {
            justification: style.justification,
            color: Srgba::new(red, green, blue, style.alpha * 0.5),
            shadow: Srgba::BLACK.with_alpha(style.alpha),
            text: std::mem::take(&mut self.text),
        });
    }
}

fn justification_of(line: &StatusLine) -> Justification {
    if line.flags.contains(StatusLineFlags::LEFT_JUSTIFY) {
        Justification::Left
    } else {
        Justification::Right
    }
}

/// Walk the registry head to tail and draw every visible line.
///
/// `draw_once` lines are cleared as soon as they are batched. Returns the
/// number of draw calls issued.
pub fn draw_status_lines(
    registry: &mut StatusLineRegistry,
    now_ms: u64,
    renderer: &mut dyn TextRenderer,
) -> usize {
    let blink_off = now_ms % BLINK_PERIOD_MS < BLINK_OFF_MS;
    let mut cache = StringCache::new();
    let mut draws = 0;
    let mut cursor = registry.head();

    while let Some(id) = cursor {
        let Some(line) = registry.get(id) else {
            break;
        };
        cursor = line.next();

        if !line.is_visible() {
            continue;
        }

        let text = if blink_off && line.flags.contains(StatusLineFlags::BLINK) {
            BLINK_PLACEHOLDER
        } else {
            line.text()
        };
        let justification = justification_of(line);
        let (color, alpha) = (line.color, line.alpha);

        if !cache.try_add(text, justification, color, alpha) {
            cache.flush(renderer);
            draws += 1;
            cache.try_add(text, justification, color, alpha);
        }

        if line.flags.contains(StatusLineFlags::DRAW_ONCE) {
            if let Some(line) = registry.get_mut(id) {
                line.clear_text();
            }
        }
    }

    if !cache.is_empty() {
        cache.flush(renderer);
        draws += 1;
    }

    draws
}
