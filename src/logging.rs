//! Custom [LogPlugin](bevy::log::LogPlugin) functionality.
//!
//! Captured log events are printed to the console scrollback.

use bevy::color::Srgba;
use bevy::log::{BoxedLayer, Level};
use bevy::prelude::*;
use std::sync::mpsc;
use tracing::Subscriber;
use tracing_subscriber::Layer;
use tracing_subscriber::field::Visit;

use crate::core::{Console, ConsoleOutputLevel, DEBUG_DISPLAY_TARGET, WARNING_COLOR};

const WARN_COLOR: Srgba = Srgba::new(1.0, 0.8, 0.2, 1.0);
const DEBUG_COLOR: Srgba = Srgba::new(0.6, 0.6, 0.6, 1.0);

/// A function that routes log events into the developer console via
/// [`LogPlugin::custom_layer`](bevy::log::LogPlugin::custom_layer).
pub fn custom_log_layer(app: &mut App) -> Option<BoxedLayer> {
    Some(Box::new(create_custom_log_layer(app)))
}

fn create_custom_log_layer(app: &mut App) -> LogCaptureLayer {
    let (sender, receiver) = mpsc::channel();
    app.add_message::<LogMessage>();
    app.insert_non_send_resource(CapturedLogEvents(receiver));
    app.add_systems(PostUpdate, transfer_log_events);

    LogCaptureLayer { sender }
}

/// A [`tracing`] log message event.
#[derive(Message, Debug, Clone)]
pub struct LogMessage {
    /// The message contents.
    pub message: String,

    /// The part of the system the event occurred in.
    pub target: &'static str,

    /// The level of verbosity of the event.
    pub level: Level,
}

impl LogMessage {
    /// Console level and color a message is printed with.
    pub fn style(&self) -> (ConsoleOutputLevel, Srgba) {
        match self.level {
            Level::ERROR => (ConsoleOutputLevel::Error, WARNING_COLOR),
            Level::WARN => (ConsoleOutputLevel::Warn, WARN_COLOR),
            Level::INFO => (ConsoleOutputLevel::Info, Srgba::WHITE),
            Level::DEBUG | Level::TRACE => (ConsoleOutputLevel::Debug, DEBUG_COLOR),
        }
    }
}

/// Transfers captured messages to the console and to [`MessageWriter<LogMessage>`](LogMessage).
fn transfer_log_events(
    receiver: NonSend<CapturedLogEvents>,
    console: Option<NonSendMut<Console>>,
    mut log_events: MessageWriter<LogMessage>,
) {
    let mut console = console;
    for msg in receiver.0.try_iter() {
        if let Some(console) = console.as_mut() {
            let (level, color) = msg.style();
            console
                .output_mut()
                .print(level, color, format_args!("{}", msg.message));
        }
        log_events.write(msg);
    }
}

/// This struct temporarily stores [`LogMessage`]s before they are
/// transferred by [`transfer_log_events`].
struct CapturedLogEvents(mpsc::Receiver<LogMessage>);

/// A [`Layer`] that captures log events and saves them to [`CapturedLogEvents`].
///
/// Events on the debug display target are skipped; they already come from
/// the console.
struct LogCaptureLayer {
    sender: mpsc::Sender<LogMessage>,
}

impl<S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>> Layer<S>
    for LogCaptureLayer
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let metadata = event.metadata();
        if metadata.target() == DEBUG_DISPLAY_TARGET {
            return;
        }

        let mut message = None;
        event.record(&mut LogEventVisitor(&mut message));
        if let Some(message) = message {
            let _ = self.sender.send(LogMessage {
                message,
                target: metadata.target(),
                level: *metadata.level(),
            });
        }
    }
}

/// A [`Visit`]or that records log messages that are transferred to [`LogCaptureLayer`].
struct LogEventVisitor<'a>(&'a mut Option<String>);

impl Visit for LogEventVisitor<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        // Only log out messages
        if field.name() == "message" {
            *self.0 = Some(format!("{value:?}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(level: Level) -> LogMessage {
        LogMessage {
            message: "hello".into(),
            target: "game",
            level,
        }
    }

    #[test]
    fn test_style_by_level() {
        assert_eq!(message(Level::ERROR).style(), (ConsoleOutputLevel::Error, WARNING_COLOR));
        assert_eq!(message(Level::INFO).style().1, Srgba::WHITE);
        assert_eq!(message(Level::TRACE).style().0, ConsoleOutputLevel::Debug);
    }
}
