//! Console output: the scrollback and the print entry points.

use std::collections::VecDeque;
use std::fmt::{self, Write as _};
use std::thread::{self, ThreadId};

use bevy::color::Srgba;
use bevy::prelude::*;

use super::events::{ConsoleOutputEvent, ConsoleOutputLevel};
use super::text::truncate_at_boundary;

/// Longest printed line in bytes; longer output is truncated.
pub const MAX_OUTPUT_LENGTH: usize = 254;

/// Lines kept in the scrollback.
pub const SCROLLBACK_CAPACITY: usize = 512;

/// Log target used when mirroring output to the debug display.
pub const DEBUG_DISPLAY_TARGET: &str = "debug_display";

/// Color of [`ConsoleOutput::warning`] lines.
pub const WARNING_COLOR: Srgba = Srgba::new(1.0, 0.0, 0.0, 1.0);

/// One line of console output.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputLine {
    pub text: String,
    pub color: Srgba,
    pub level: ConsoleOutputLevel,
}

/// Thread the console was created on. Output from any other thread is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MainThread(ThreadId);

impl MainThread {
    /// The calling thread.
    pub fn current() -> Self {
        Self(thread::current().id())
    }

    /// Whether the caller is running on this thread.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.0
    }
}

/// Scrollback plus the lines not yet forwarded as events.
#[derive(Debug)]
pub struct ConsoleOutput {
    main_thread: MainThread,
    lines: VecDeque<OutputLine>,
    pending: Vec<OutputLine>,
    /// Also send every printed line to the debug display log target.
    pub mirror_to_debug_display: bool,
}

impl Default for ConsoleOutput {
    fn default() -> Self {
        Self::new(MainThread::current())
    }
}

impl ConsoleOutput {
    pub fn new(main_thread: MainThread) -> Self {
        Self {
            main_thread,
            lines: VecDeque::new(),
            pending: Vec::new(),
            mirror_to_debug_display: false,
        }
    }

    /// Print a white line.
    pub fn printf(&mut self, args: fmt::Arguments<'_>) {
        self.print(ConsoleOutputLevel::Info, Srgba::WHITE, args);
    }

    /// Print a line in `color`.
    pub fn printf_color(&mut self, color: Srgba, args: fmt::Arguments<'_>) {
        self.print(ConsoleOutputLevel::Info, color, args);
    }

    /// Print a red line.
    pub fn warning(&mut self, args: fmt::Arguments<'_>) {
        self.print(ConsoleOutputLevel::Warn, WARNING_COLOR, args);
    }

    /// Print a line at an explicit level.
    pub fn print(&mut self, level: ConsoleOutputLevel, color: Srgba, args: fmt::Arguments<'_>) {
        if !self.main_thread.is_current() {
            return;
        }

        let mut text = String::new();
        if text.write_fmt(args).is_err() {
            return;
        }
        let len = truncate_at_boundary(&text, MAX_OUTPUT_LENGTH).len();
        text.truncate(len);

        if self.mirror_to_debug_display {
            info!(target: "debug_display", "{}", text);
        }

        let line = OutputLine { text, color, level };
        self.pending.push(line.clone());
        if self.lines.len() == SCROLLBACK_CAPACITY {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    /// Empty the scrollback.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Scrollback, oldest first.
    pub fn lines(&self) -> impl ExactSizeIterator<Item = &OutputLine> {
        self.lines.iter()
    }

    /// Take the lines printed since the last call.
    pub fn drain_pending(&mut self) -> impl Iterator<Item = OutputLine> + '_ {
        self.pending.drain(..)
    }
}

impl From<OutputLine> for ConsoleOutputEvent {
    fn from(line: OutputLine) -> Self {
        ConsoleOutputEvent::new(line.level, line.text).with_color(line.color)
    }
}

/// Print a formatted line to the console.
///
/// ```ignore
/// console_printf!(console, "{} entities", count);
/// ```
#[macro_export]
macro_rules! console_printf {
    ($console:expr, $($arg:tt)*) => {
        $console.printf(::std::format_args!($($arg)*))
    };
}

/// Print a formatted line to the console in a given color.
#[macro_export]
macro_rules! console_printf_color {
    ($console:expr, $color:expr, $($arg:tt)*) => {
        $console.printf_color($color, ::std::format_args!($($arg)*))
    };
}

/// Print a formatted warning to the console.
#[macro_export]
macro_rules! console_warning {
    ($console:expr, $($arg:tt)*) => {
        $console.warning(::std::format_args!($($arg)*))
    };
}

/// Post a formatted status message, keyed by its format string.
///
/// Posting again from the same call site updates the same slot.
///
/// ```ignore
/// status_printf!(console, "fps {:.0}", fps);
/// ```
#[macro_export]
macro_rules! status_printf {
    ($console:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        $console.status_printf($fmt, ::std::format_args!($fmt $(, $arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_levels_and_colors() {
        let mut output = ConsoleOutput::default();
        console_printf!(output, "hello {}", 1);
        console_warning!(output, "careful");
        console_printf_color!(output, Srgba::new(0.0, 1.0, 0.0, 1.0), "green");

        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].text, "hello 1");
        assert_eq!(lines[0].color, Srgba::WHITE);
        assert_eq!(lines[1].level, ConsoleOutputLevel::Warn);
        assert_eq!(lines[1].color, WARNING_COLOR);
        assert_eq!(lines[2].color.green, 1.0);
    }

    #[test]
    fn test_output_is_truncated() {
        let mut output = ConsoleOutput::default();
        console_printf!(output, "{}", "x".repeat(400));
        assert_eq!(output.lines().next().unwrap().text.len(), MAX_OUTPUT_LENGTH);
    }

    #[test]
    fn test_off_thread_output_is_dropped() {
        let mut output = ConsoleOutput::default();
        std::thread::scope(|scope| {
            scope.spawn(|| {
                console_printf!(output, "from a worker");
                console_warning!(output, "from a worker");
            });
        });
        assert_eq!(output.lines().len(), 0);
        assert_eq!(output.drain_pending().count(), 0);
    }

    #[test]
    fn test_scrollback_is_bounded() {
        let mut output = ConsoleOutput::default();
        for i in 0..SCROLLBACK_CAPACITY + 3 {
            console_printf!(output, "{}", i);
        }
        assert_eq!(output.lines().len(), SCROLLBACK_CAPACITY);
        assert_eq!(output.lines().next().unwrap().text, "3");
    }

    #[test]
    fn test_clear_keeps_pending() {
        let mut output = ConsoleOutput::default();
        console_printf!(output, "a");
        output.clear();
        assert_eq!(output.lines().len(), 0);

        let pending: Vec<_> = output.drain_pending().collect();
        assert_eq!(pending.len(), 1);
        assert_eq!(output.drain_pending().count(), 0);
    }

    #[test]
    fn test_line_into_event() {
        let event: ConsoleOutputEvent = OutputLine {
            text: "boom".into(),
            color: WARNING_COLOR,
            level: ConsoleOutputLevel::Warn,
        }
        .into();
        assert_eq!(event.level, ConsoleOutputLevel::Warn);
        assert_eq!(event.message, "boom");
        assert_eq!(event.color, Some(WARNING_COLOR));
    }
}
