//! Auto-expiring status messages.
//!
//! A fixed pool of slots, each backed by a status line. Messages are keyed by
//! a tag (usually the format string of the call site): posting with a tag that
//! is already showing refreshes that slot in place, otherwise the first empty
//! slot is claimed. When the pool is full the message is dropped.

use super::status_line::{StatusLineFlags, StatusLineId, StatusLineRegistry};
use super::text::truncate_at_boundary;

/// Number of slots in the pool.
pub const STATUS_STRING_SLOTS: usize = 20;

/// Age in milliseconds after which a message starts fading.
pub const FADE_START_MS: u64 = 5_000;

/// Age in milliseconds after which a message is cleared.
pub const EXPIRE_MS: u64 = 10_000;

/// Byte capacity of a formatted message before it is split into lines.
pub const MESSAGE_CAPACITY: usize = 1024;

/// Identifier given to the pool's status lines.
pub const STATUS_STRINGS_IDENTIFIER: &str = "status_strings";

#[derive(Debug)]
struct Slot {
    tag: String,
    line: StatusLineId,
    created_ms: u64,
}

/// Fixed pool of tagged status messages.
#[derive(Debug, Default)]
pub struct StatusStrings {
    slots: Vec<Slot>,
}

/// Opacity of a message of the given age.
///
/// `None` once the message has expired.
pub fn fade_alpha(age_ms: u64) -> Option<f32> {
    if age_ms > EXPIRE_MS {
        None
    } else if age_ms > FADE_START_MS {
        let fade = (age_ms - FADE_START_MS) as f32 / (EXPIRE_MS - FADE_START_MS) as f32;
        Some(1.0 - fade)
    } else {
        Some(1.0)
    }
}

impl StatusStrings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the pool's lines are registered.
    pub fn is_initialized(&self) -> bool {
        !self.slots.is_empty()
    }

    /// Register the pool's lines, left-justified. Does nothing when already
    /// initialized.
    pub fn initialize(&mut self, registry: &mut StatusLineRegistry) {
        if self.is_initialized() {
            return;
        }

        let ids = registry.initialize(
            STATUS_STRING_SLOTS,
            None,
            Some(STATUS_STRINGS_IDENTIFIER),
        );
        registry.set_flags(&ids, StatusLineFlags::LEFT_JUSTIFY, true);

        self.slots = ids
            .into_iter()
            .map(|line| Slot {
                tag: String::new(),
                line,
                created_ms: 0,
            })
            .collect();
    }

    /// Unlink and release the pool's lines. Does nothing when not initialized.
    pub fn dispose(&mut self, registry: &mut StatusLineRegistry) {
        if !self.is_initialized() {
            return;
        }

        let ids: Vec<_> = self.slots.drain(..).map(|slot| slot.line).collect();
        registry.dispose(&ids);
        registry.release(&ids);
    }

    fn showing(&self, registry: &StatusLineRegistry, index: usize) -> bool {
        registry
            .get(self.slots[index].line)
            .is_some_and(|line| !line.text().is_empty())
    }

    /// Post `message` under `tag`.
    ///
    /// Returns `false` when every slot is taken by another tag.
    pub fn post(
        &mut self,
        registry: &mut StatusLineRegistry,
        tag: &str,
        message: &str,
        now_ms: u64,
    ) -> bool {
        let index = (0..self.slots.len())
            .find(|&i| self.slots[i].tag == tag && self.showing(registry, i))
            .or_else(|| (0..self.slots.len()).find(|&i| !self.showing(registry, i)));

        let Some(index) = index else {
            return false;
        };

        let slot = &mut self.slots[index];
        let Some(line) = registry.get_mut(slot.line) else {
            return false;
        };

        line.set_text(message);
        line.alpha = 1.0;
        slot.created_ms = now_ms;
        if slot.tag != tag {
            slot.tag.clear();
            slot.tag.push_str(tag);
        }
        true
    }

    /// Post each non-empty line of `text` in its own slot, tagged with `tag`
    /// followed by the line's index.
    pub fn post_lines(
        &mut self,
        registry: &mut StatusLineRegistry,
        tag: &str,
        text: &str,
        now_ms: u64,
    ) {
        let text = truncate_at_boundary(text, MESSAGE_CAPACITY);
        for (index, line) in text.split(['\r', '\n']).filter(|l| !l.is_empty()).enumerate() {
            self.post(registry, &format!("{tag}{index}"), line, now_ms);
        }
    }

    /// Clear the message showing under `tag`, if any.
    pub fn clear_tag(&mut self, registry: &mut StatusLineRegistry, tag: &str) {
        for slot in self.slots.iter().filter(|slot| slot.tag == tag) {
            if let Some(line) = registry.get_mut(slot.line) {
                line.clear_text();
            }
        }
    }

    /// Apply the age-based fade to every showing message.
    pub fn update_fades(&mut self, registry: &mut StatusLineRegistry, now_ms: u64) {
        for slot in &self.slots {
            let Some(line) = registry.get_mut(slot.line) else {
                continue;
            };
            if line.text().is_empty() {
                continue;
            }

            match fade_alpha(now_ms.saturating_sub(slot.created_ms)) {
                Some(alpha) => line.alpha = alpha,
                None => line.clear_text(),
            }
        }
    }

    /// Number of slots currently showing a message.
    pub fn occupied(&self, registry: &StatusLineRegistry) -> usize {
        (0..self.slots.len())
            .filter(|&i| self.showing(registry, i))
            .count()
    }

    /// Text showing under `tag`, if any.
    pub fn text_for<'a>(&self, registry: &'a StatusLineRegistry, tag: &str) -> Option<&'a str> {
        self.slots
            .iter()
            .filter(|slot| slot.tag == tag)
            .filter_map(|slot| registry.get(slot.line))
            .map(|line| line.text())
            .find(|text| !text.is_empty())
    }
}
