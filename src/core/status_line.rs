//! Status line registry.
//!
//! Status lines are small on-screen text records that any part of the game can
//! own. The registry keeps them in a doubly-linked list threaded through the
//! records themselves: it stores only the head and tail handles, and each
//! record stores the handles of its neighbors. Records live in a
//! [`generational_arena::Arena`], so a stale [`StatusLineId`] never aliases a
//! reused slot.

use std::cell::Cell;
use std::rc::Rc;

use bevy::color::Srgba;
use bevy::prelude::*;
use generational_arena::{Arena, Index};

use super::text::set_bounded;

/// Byte capacity of a status line's text.
pub const STATUS_TEXT_CAPACITY: usize = 255;

/// Handle to a status line record in a [`StatusLineRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusLineId(Index);

/// Display flags of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusLineFlags(u8);

impl StatusLineFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);

    /// Draw left-justified instead of right-justified.
    pub const LEFT_JUSTIFY: Self = Self(1 << 0);

    /// Alternate between the text and a placeholder glyph.
    pub const BLINK: Self = Self(1 << 1);

    /// Clear the text right after it has been drawn once.
    pub const DRAW_ONCE: Self = Self(1 << 2);

    /// Keep the line registered but never draw it.
    pub const INHIBIT_DRAWING: Self = Self(1 << 3);

    /// Check if a flag is set.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Set or clear the given flags.
    #[inline]
    pub fn set(&mut self, flags: Self, enabled: bool) {
        if enabled {
            self.0 |= flags.0;
        } else {
            self.0 &= !flags.0;
        }
    }
}

impl std::ops::BitOr for StatusLineFlags {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// Shared "enabled" switch owned by whoever registered a group of lines.
///
/// The owner keeps one clone and toggles it; the lines hold the others.
/// [`StatusLineRegistry::enable`] and [`StatusLineRegistry::disable`] flip it
/// by identifier.
#[derive(Debug, Clone, Default)]
pub struct VisibilityFlag(Rc<Cell<bool>>);

impl VisibilityFlag {
    /// Create a new flag with the given initial value.
    pub fn new(enabled: bool) -> Self {
        Self(Rc::new(Cell::new(enabled)))
    }

    /// Current value.
    #[inline]
    pub fn get(&self) -> bool {
        self.0.get()
    }

    /// Overwrite the value.
    #[inline]
    pub fn set(&self, enabled: bool) {
        self.0.set(enabled);
    }
}

/// One on-screen text slot.
#[derive(Debug, Clone)]
pub struct StatusLine {
    text: String,
    /// Text color.
    pub color: Srgba,
    /// Opacity in `0.0..=1.0`.
    pub alpha: f32,
    /// Display flags.
    pub flags: StatusLineFlags,
    owner: Option<VisibilityFlag>,
    identifier: Option<Box<str>>,
    prev: Option<StatusLineId>,
    next: Option<StatusLineId>,
}

impl Default for StatusLine {
    fn default() -> Self {
        Self {
            text: String::new(),
            color: Srgba::WHITE,
            alpha: 1.0,
            flags: StatusLineFlags::NONE,
            owner: None,
            identifier: None,
            prev: None,
            next: None,
        }
    }
}

impl StatusLine {
    /// Create an empty white line, optionally gated by an owner flag and
    /// grouped under an identifier.
    pub fn new(owner: Option<VisibilityFlag>, identifier: Option<&str>) -> Self {
        Self {
            owner,
            identifier: identifier.map(Into::into),
            ..Default::default()
        }
    }

    /// The current text. Empty means the line is unused.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text, truncated to [`STATUS_TEXT_CAPACITY`].
    pub fn set_text(&mut self, text: &str) {
        set_bounded(&mut self.text, text, STATUS_TEXT_CAPACITY);
    }

    /// Clear the text.
    #[inline]
    pub fn clear_text(&mut self) {
        self.text.clear();
    }

    /// The group identifier, if any.
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Whether the renderer should draw this line.
    pub fn is_visible(&self) -> bool {
        self.owner.as_ref().is_none_or(VisibilityFlag::get)
            && !self.text.is_empty()
            && !self.flags.contains(StatusLineFlags::INHIBIT_DRAWING)
    }

    /// Handle of the next line in the registry.
    #[inline]
    pub fn next(&self) -> Option<StatusLineId> {
        self.next
    }

    /// Handle of the previous line in the registry.
    #[inline]
    pub fn prev(&self) -> Option<StatusLineId> {
        self.prev
    }
}

/// Registry of status lines, drawn head to tail every frame.
#[derive(Debug)]
pub struct StatusLineRegistry {
    lines: Arena<StatusLine>,
    head: Option<StatusLineId>,
    tail: Option<StatusLineId>,
    len: usize,
}

impl Default for StatusLineRegistry {
    fn default() -> Self {
        Self {
            lines: Arena::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }
}

impl StatusLineRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of linked lines.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no lines are linked.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// First linked line.
    #[inline]
    pub fn head(&self) -> Option<StatusLineId> {
        self.head
    }

    /// Last linked line.
    #[inline]
    pub fn tail(&self) -> Option<StatusLineId> {
        self.tail
    }

    /// Store a record without linking it.
    pub fn allocate(&mut self, mut line: StatusLine) -> StatusLineId {
        line.prev = None;
        line.next = None;
        StatusLineId(self.lines.insert(line))
    }

    /// Drop the storage of unlinked records so their slots can be reused.
    pub fn release(&mut self, ids: &[StatusLineId]) {
        for &id in ids {
            if self.is_linked(id) {
                debug_assert!(false, "releasing a linked status line");
                error!("Status lines: refusing to release a linked line");
                continue;
            }
            self.lines.remove(id.0);
        }
    }

    /// Get a line.
    pub fn get(&self, id: StatusLineId) -> Option<&StatusLine> {
        self.lines.get(id.0)
    }

    /// Get a line mutably.
    pub fn get_mut(&mut self, id: StatusLineId) -> Option<&mut StatusLine> {
        self.lines.get_mut(id.0)
    }

    fn set_prev(&mut self, id: StatusLineId, prev: Option<StatusLineId>) {
        if let Some(line) = self.get_mut(id) {
            line.prev = prev;
        }
    }

    fn set_next(&mut self, id: StatusLineId, next: Option<StatusLineId>) {
        if let Some(line) = self.get_mut(id) {
            line.next = next;
        }
    }

    /// Whether the line is currently part of the list.
    pub fn is_linked(&self, id: StatusLineId) -> bool {
        match self.get(id) {
            Some(line) => line.prev.is_some() || line.next.is_some() || self.head == Some(id),
            None => false,
        }
    }

    /// Link an unlinked line at the tail.
    pub fn add(&mut self, id: StatusLineId) {
        if self.get(id).is_none() {
            debug_assert!(false, "adding an unknown status line");
            error!("Status lines: add called with a stale handle");
            return;
        }
        if self.is_linked(id) {
            debug_assert!(false, "status line added twice");
            error!("Status lines: line is already linked");
            return;
        }

        let prev = self.tail;
        if let Some(line) = self.get_mut(id) {
            line.prev = prev;
            line.next = None;
        }
        match prev {
            Some(tail) => self.set_next(tail, Some(id)),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.len += 1;
    }

    /// Unlink a linked line in O(1) and null its links.
    pub fn remove(&mut self, id: StatusLineId) {
        if !self.is_linked(id) {
            debug_assert!(false, "removing a status line that is not linked");
            error!("Status lines: line is not linked");
            return;
        }

        let Some((prev, next)) = self.get(id).map(|line| (line.prev, line.next)) else {
            return;
        };

        match prev {
            Some(prev) => self.set_next(prev, next),
            None => self.head = next,
        }
        match next {
            Some(next) => self.set_prev(next, prev),
            None => self.tail = prev,
        }

        if let Some(line) = self.get_mut(id) {
            line.prev = None;
            line.next = None;
        }
        self.len -= 1;
    }

    /// Allocate `count` blank lines, gate them on `owner`, group them under
    /// `identifier` and link them at the tail.
    pub fn initialize(
        &mut self,
        count: usize,
        owner: Option<VisibilityFlag>,
        identifier: Option<&str>,
    ) -> Vec<StatusLineId> {
        (0..count)
            .map(|_| {
                let id = self.allocate(StatusLine::new(owner.clone(), identifier));
                self.add(id);
                id
            })
            .collect()
    }

    /// Unlink every line in `ids`. Storage stays with the caller's handles;
    /// use [`release`](Self::release) to give it back.
    pub fn dispose(&mut self, ids: &[StatusLineId]) {
        for &id in ids {
            self.remove(id);
        }
    }

    /// Turn on every owner flag whose line identifier contains `identifier`
    /// (case-insensitive).
    pub fn enable(&self, identifier: &str) {
        self.toggle_owners(identifier, true);
    }

    /// Turn off every owner flag whose line identifier contains `identifier`
    /// (case-insensitive).
    pub fn disable(&self, identifier: &str) {
        self.toggle_owners(identifier, false);
    }

    fn toggle_owners(&self, identifier: &str, enabled: bool) {
        let needle = identifier.to_lowercase();
        for (_, line) in self.iter() {
            let (Some(owner), Some(line_identifier)) = (&line.owner, &line.identifier) else {
                continue;
            };
            if owner.get() != enabled && line_identifier.to_lowercase().contains(&needle) {
                owner.set(enabled);
            }
        }
    }

    /// Set or clear `flags` on every line in `ids`.
    pub fn set_flags(&mut self, ids: &[StatusLineId], flags: StatusLineFlags, enabled: bool) {
        for &id in ids {
            if let Some(line) = self.get_mut(id) {
                line.flags.set(flags, enabled);
            }
        }
    }

    /// Clear the text of every line in `ids`.
    pub fn clear_text(&mut self, ids: &[StatusLineId]) {
        for &id in ids {
            if let Some(line) = self.get_mut(id) {
                line.clear_text();
            }
        }
    }

    /// Log the text of every visible line.
    pub fn dump(&self) {
        for (_, line) in self.iter().filter(|(_, line)| line.is_visible()) {
            info!("status_lines: {}", line.text());
        }
    }

    /// Iterate head to tail.
    pub fn iter(&self) -> impl Iterator<Item = (StatusLineId, &StatusLine)> {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let id = cursor?;
            let line = self.get(id)?;
            cursor = line.next;
            Some((id, line))
        })
    }

    /// Iterate tail to head.
    pub fn iter_rev(&self) -> impl Iterator<Item = (StatusLineId, &StatusLine)> {
        let mut cursor = self.tail;
        std::iter::from_fn(move || {
            let id = cursor?;
            let line = self.get(id)?;
            cursor = line.prev;
            Some((id, line))
        })
    }
}
