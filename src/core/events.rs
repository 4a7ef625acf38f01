//! Console messages for communication between layers.
//!
//! Messages are the primary mechanism for:
//! - Backends -> Console: command input
//! - Console -> Backends: output lines, open/close notifications

use bevy::color::Srgba;
use bevy::prelude::*;

/// Message sent when a command should be run through the console.
///
/// # Examples
///
/// ```ignore
/// fn submit_command(mut events: MessageWriter<ConsoleInputEvent>) {
///     events.write(ConsoleInputEvent::new("echo hello"));
/// }
/// ```
#[derive(Message, Debug, Clone)]
pub struct ConsoleInputEvent {
    /// The raw command line.
    pub command: String,
    /// Typed by a user (echoed and added to history) rather than scripted.
    pub interactive: bool,
}

impl ConsoleInputEvent {
    /// Create an interactive input event.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            interactive: true,
        }
    }

    /// Create a non-interactive input event, as a batch script line would be.
    pub fn scripted(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            interactive: false,
        }
    }
}

/// Message sent for every line printed to the console.
#[derive(Message, Debug, Clone)]
pub struct ConsoleOutputEvent {
    /// The message text.
    pub message: String,
    /// The log level/type.
    pub level: ConsoleOutputLevel,
    /// Explicit color, if the line was printed with one.
    pub color: Option<Srgba>,
}

/// Log level for console output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleOutputLevel {
    /// Debug information (gray).
    Debug,
    /// General information (white).
    #[default]
    Info,
    /// Warning (red in the console).
    Warn,
    /// Error (red).
    Error,
    /// Command echo (shows the command that was executed).
    Command,
}

impl ConsoleOutputEvent {
    /// Create a new output event.
    pub fn new(level: ConsoleOutputLevel, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level,
            color: None,
        }
    }

    /// Attach an explicit color.
    pub fn with_color(mut self, color: Srgba) -> Self {
        self.color = Some(color);
        self
    }

    /// Create an info message.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(ConsoleOutputLevel::Info, message)
    }

    /// Create a warning message.
    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(ConsoleOutputLevel::Warn, message)
    }

    /// Create a command echo message.
    pub fn command(message: impl Into<String>) -> Self {
        Self::new(ConsoleOutputLevel::Command, message)
    }
}

/// Message sent when the console is opened or closed.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleToggleEvent {
    /// Whether the console is now open.
    pub open: bool,
}

impl ConsoleToggleEvent {
    /// Create an event for opening the console.
    pub fn opened() -> Self {
        Self { open: true }
    }

    /// Create an event for closing the console.
    pub fn closed() -> Self {
        Self { open: false }
    }
}

/// Message requesting the console to clear its scrollback.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct ConsoleClearEvent;

/// Plugin that registers all console messages.
pub struct ConsoleEventsPlugin;

impl Plugin for ConsoleEventsPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<ConsoleInputEvent>()
            .add_message::<ConsoleOutputEvent>()
            .add_message::<ConsoleToggleEvent>()
            .add_message::<ConsoleClearEvent>();
    }
}
