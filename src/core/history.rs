//! Fixed-size ring of submitted commands.

/// Number of commands remembered.
pub const HISTORY_CAPACITY: usize = 16;

/// Command history ring with a browsing cursor.
///
/// Browsing index 0 is the newest entry; larger indices are older. The ring
/// slot for index `i` is `(newest - i + capacity) % capacity`.
#[derive(Debug, Clone)]
pub struct CommandHistory {
    entries: [String; HISTORY_CAPACITY],
    newest: Option<usize>,
    count: usize,
    selected: Option<usize>,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self {
            entries: std::array::from_fn(|_| String::new()),
            newest: None,
            count: 0,
            selected: None,
        }
    }
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored commands, at most [`HISTORY_CAPACITY`].
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Current browsing index, `None` when not browsing.
    #[inline]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Store a command as the newest entry and stop browsing.
    pub fn push(&mut self, command: &str) {
        let slot = self.newest.map_or(0, |newest| (newest + 1) % HISTORY_CAPACITY);
        self.entries[slot].clear();
        self.entries[slot].push_str(command);
        self.newest = Some(slot);
        self.count = (self.count + 1).min(HISTORY_CAPACITY);
        self.selected = None;
    }

    /// Stop browsing.
    #[inline]
    pub fn reset_browsing(&mut self) {
        self.selected = None;
    }

    /// Entry at browsing index `index` (0 = newest).
    pub fn get(&self, index: usize) -> Option<&str> {
        let newest = self.newest?;
        if index >= self.count {
            return None;
        }
        let slot = (newest + HISTORY_CAPACITY - index) % HISTORY_CAPACITY;
        Some(&self.entries[slot])
    }

    /// Step the browsing cursor one entry older (`true`) or newer (`false`)
    /// and return the selected entry.
    ///
    /// The cursor is clamped to the stored range; stepping newer while not
    /// browsing lands on the newest entry. Returns `None` when empty.
    pub fn browse(&mut self, older: bool) -> Option<&str> {
        if self.count == 0 {
            return None;
        }

        let current = self.selected.map_or(-1, |index| index as isize);
        let step = if older { 1 } else { -1 };
        let index = (current + step).clamp(0, self.count as isize - 1) as usize;

        self.selected = Some(index);
        self.get(index)
    }

    /// Iterate newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        (0..self.count).filter_map(|index| self.get(index))
    }
}
