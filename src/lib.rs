//! An in-game developer console for Bevy.
//!
//! bevy_console_overlay provides:
//!
//! - **Console**: a drop-down command line with history and tab completion
//! - **Status lines**: an on-screen text overlay other systems register lines with
//! - **Status strings**: fading, tag-keyed messages posted with [`status_printf!`]
//! - **CommandTable**: a default command host with commands and string globals
//!
//! # Features
//!
//! - `egui` (default): status line overlay, console window and log capture
//! - `terminal`: stdin/stdout backend for headless runs
//! - `persist`: RON configuration file and init scripts
//! - `clipboard`: system clipboard paste with control+V
//! - `full`: Enable egui + persist + clipboard
//!
//! # Quick Start
//!
//! ```ignore
//! use bevy::prelude::*;
//! use bevy_console_overlay::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(ConsolePlugin::default())
//!         .add_systems(Startup, setup_console)
//!         .add_systems(Update, show_fps)
//!         .run();
//! }
//!
//! fn setup_console(mut console: NonSendMut<Console>) {
//!     if let Some(table) = console.host_mut::<CommandTable>() {
//!         table.register_global("fov", "Field of view", "70");
//!         table.register_command("noclip", "Toggle noclip", |_, output| {
//!             console_printf!(output, "noclip toggled");
//!             true
//!         });
//!     }
//! }
//!
//! fn show_fps(mut console: NonSendMut<Console>, time: Res<Time>) {
//!     status_printf!(console, "fps {:.0}", 1.0 / time.delta_secs());
//! }
//! ```

use bevy::input::ButtonState;
use bevy::input::keyboard::KeyboardInput;
use bevy::prelude::*;

// Core module (always available, zero optional deps)
pub mod core;

pub mod config;

// UI modules (feature-gated)
#[cfg(feature = "egui")]
pub mod logging;
#[cfg(feature = "egui")]
pub mod ui;

// Terminal backend (feature-gated)
#[cfg(feature = "terminal")]
pub mod terminal;

// Persistence module (feature-gated)
#[cfg(feature = "persist")]
pub mod persist;

// Re-export core types at crate root for convenience
pub use crate::core::{
    CommandArgs, CommandEvaluator, CommandHandler, CommandHistory, CommandTable, Completion,
    CompletionOutcome, Console, ConsoleClearEvent, ConsoleEventsPlugin, ConsoleHost,
    ConsoleInputEvent, ConsoleOutput, ConsoleOutputEvent, ConsoleOutputLevel, ConsoleToggleEvent,
    InputSource, Justification, KeyEvent, KeyKind, KeyQueue, Modifiers, StatusLine,
    StatusLineFlags, StatusLineId, StatusLineRegistry, StatusStrings, SymbolNamespace, TextDraw,
    TextRenderer, TokenizeError, tokenize,
};

pub use config::ConsoleConfig;

#[cfg(feature = "persist")]
pub use persist::{ApplicationKind, ConfigError, ConfigPath, ConsoleConfigFile};

#[cfg(feature = "terminal")]
pub use terminal::{TerminalConfig, TerminalPlugin};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::ConsoleConfig;
    pub use crate::core::{
        CommandArgs, CommandTable, Console, ConsoleInputEvent, ConsoleOutputEvent,
        ConsoleOutputLevel, ConsoleToggleEvent, StatusLineFlags, StatusLineId,
        StatusLineRegistry, TextDraw,
    };
    pub use crate::{ConsolePlugin, StatusDraws};
    pub use crate::{console_printf, console_printf_color, console_warning, status_printf};
}

/// Main console plugin.
///
/// # Configuration
///
/// ```ignore
/// ConsolePlugin {
///     config: ConsoleConfig {
///         prompt: "> ".into(),
///         ..default()
///     },
/// }
/// ```
#[derive(Default)]
pub struct ConsolePlugin {
    pub config: ConsoleConfig,
}

impl Plugin for ConsolePlugin {
    fn build(&self, app: &mut App) {
        // The console holds the command host, which need not be Send, and
        // gates output on the thread it was created on.
        app.insert_non_send_resource(Console::new(
            self.config.clone(),
            CommandTable::with_builtins(),
        ))
        .insert_resource(self.config.clone())
        .init_resource::<KeyQueue>()
        .init_resource::<StatusDraws>()
        .add_plugins(crate::core::ConsoleEventsPlugin);

        // 1. collect_keyboard_input: Queue this frame's keys for the console
        // 2. handle_console_input: Run commands sent by backends
        // 3. update_console: Open/close, line editing, submission
        // 4. handle_clear: Empty the scrollback on request
        // 5. draw_status: Fade status strings and batch the visible lines
        // 6. send_console_output: Forward new lines as messages
        app.add_systems(
            Update,
            (
                collect_keyboard_input,
                handle_console_input,
                update_console,
                handle_clear,
                draw_status,
                send_console_output,
            )
                .chain(),
        );

        // Persistence (feature-gated)
        #[cfg(feature = "persist")]
        {
            app.init_resource::<persist::ConfigPath>()
                .init_resource::<persist::ApplicationKind>()
                .add_systems(
                    Startup,
                    (persist::load_config_on_startup, persist::execute_init_file).chain(),
                );
        }

        // egui UI (feature-gated)
        #[cfg(feature = "egui")]
        {
            use bevy_egui::EguiPrimaryContextPass;

            app.add_systems(
                EguiPrimaryContextPass,
                (
                    ui::paint_status_lines,
                    ui::render_console_system.run_if(console_is_active),
                ),
            );
        }

        // Terminal backend (feature-gated)
        #[cfg(feature = "terminal")]
        {
            app.add_plugins(terminal::TerminalPlugin::default());
        }
    }
}

/// Run condition: the console is open.
pub fn console_is_active(console: NonSend<Console>) -> bool {
    console.is_active()
}

/// Status line draws batched this frame, for a backend to paint.
#[derive(Resource, Debug, Default, Deref, DerefMut)]
pub struct StatusDraws(pub Vec<TextDraw>);

impl TextRenderer for StatusDraws {
    fn draw_text(&mut self, draw: TextDraw) {
        self.0.push(draw);
    }
}

fn held_modifiers(keys: &ButtonInput<KeyCode>) -> Modifiers {
    let mut modifiers = Modifiers::NONE;
    if keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]) {
        modifiers |= Modifiers::SHIFT;
    }
    if keys.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]) {
        modifiers |= Modifiers::CONTROL;
    }
    if keys.any_pressed([KeyCode::AltLeft, KeyCode::AltRight]) {
        modifiers |= Modifiers::ALT;
    }
    modifiers
}

/// System that turns keyboard messages into console key events.
///
/// Every press and release is queued; the text of a press is queued as
/// characters unless it came from a toggle key or with control held.
fn collect_keyboard_input(
    keyboard: Option<MessageReader<KeyboardInput>>,
    keys: Option<Res<ButtonInput<KeyCode>>>,
    config: Res<ConsoleConfig>,
    mut queue: ResMut<KeyQueue>,
) {
    let Some(mut keyboard) = keyboard else { return };
    let modifiers = keys.map_or(Modifiers::NONE, |keys| held_modifiers(&keys));

    for event in keyboard.read() {
        let kind = match event.state {
            ButtonState::Pressed => KeyKind::Down(event.key_code),
            ButtonState::Released => KeyKind::Up(event.key_code),
        };
        queue.push(KeyEvent {
            kind,
            modifiers,
            repeating: event.repeat,
        });

        if event.state != ButtonState::Pressed
            || config.is_toggle_key(event.key_code)
            || modifiers.contains(Modifiers::CONTROL)
        {
            continue;
        }
        let Some(text) = &event.text else { continue };
        for c in text.chars().filter(|c| !c.is_control()) {
            queue.push(KeyEvent::char(c).with_modifiers(modifiers));
        }
    }
}

/// System that runs commands sent as [`ConsoleInputEvent`]s.
fn handle_console_input(
    mut input_events: MessageReader<ConsoleInputEvent>,
    mut console: NonSendMut<Console>,
) {
    for event in input_events.read() {
        console.process_command(&event.command, event.interactive);
    }
}

/// System that advances the console one frame.
fn update_console(
    mut console: NonSendMut<Console>,
    mut queue: ResMut<KeyQueue>,
    time: Res<Time>,
    mut toggle_events: MessageWriter<ConsoleToggleEvent>,
) {
    let was_active = console.is_active();
    let now_ms = time.elapsed().as_millis() as u64;
    console.update(time.delta_secs(), now_ms, &mut *queue);

    let active = console.is_active();
    if active != was_active {
        toggle_events.write(if active {
            ConsoleToggleEvent::opened()
        } else {
            ConsoleToggleEvent::closed()
        });
    }

    // Keys the closed console did not take belong to the game.
    if !active {
        queue.clear();
    }
}

fn handle_clear(
    mut clear_events: MessageReader<ConsoleClearEvent>,
    mut console: NonSendMut<Console>,
) {
    for _ in clear_events.read() {
        console.clear();
    }
}

/// System that batches the visible status lines into [`StatusDraws`].
fn draw_status(mut console: NonSendMut<Console>, mut draws: ResMut<StatusDraws>) {
    draws.clear();
    console.draw_status(&mut *draws);
}

/// System that forwards newly printed lines as [`ConsoleOutputEvent`]s.
fn send_console_output(
    mut console: NonSendMut<Console>,
    mut output_events: MessageWriter<ConsoleOutputEvent>,
) {
    for line in console.output_mut().drain_pending() {
        output_events.write(line.into());
    }
}

// Integration tests run without egui feature since MinimalPlugins doesn't provide
// the render context the egui systems require.
// Run with: cargo test --no-default-features
#[cfg(all(test, not(feature = "egui")))]
mod tests {
    use super::*;

    /// Test resource collecting the messages the console sends.
    #[derive(Resource, Default)]
    struct Received {
        output: Vec<ConsoleOutputEvent>,
        toggles: Vec<ConsoleToggleEvent>,
    }

    fn collect_messages(
        mut output: MessageReader<ConsoleOutputEvent>,
        mut toggles: MessageReader<ConsoleToggleEvent>,
        mut received: ResMut<Received>,
    ) {
        received.output.extend(output.read().cloned());
        received.toggles.extend(toggles.read().cloned());
    }

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(ConsolePlugin::default());
        app.init_resource::<Received>();
        app.add_systems(PostUpdate, collect_messages);
        app.update();
        app
    }

    fn push_key(app: &mut App, event: KeyEvent) {
        app.world_mut().resource_mut::<KeyQueue>().push(event);
    }

    #[test]
    fn test_plugin_starts_closed() {
        let app = app();
        let console = app.world().non_send_resource::<Console>();
        assert!(!console.is_active());
        assert_eq!(console.status_lines().len(), 20);
        assert!(app.world().contains_resource::<ConsoleConfig>());
    }

    #[test]
    fn test_input_event_runs_command() {
        let mut app = app();
        app.world_mut().write_message(ConsoleInputEvent::new("echo hello world"));
        app.update();

        let console = app.world().non_send_resource::<Console>();
        assert_eq!(console.history().get(0), Some("echo hello world"));

        let received = app.world().resource::<Received>();
        let messages: Vec<_> = received.output.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["donkey( echo hello world", "hello world"]);
        assert_eq!(received.output[0].level, ConsoleOutputLevel::Command);
    }

    #[test]
    fn test_scripted_input_is_not_echoed() {
        let mut app = app();
        app.world_mut().write_message(ConsoleInputEvent::scripted("bogus"));
        app.update();

        let received = app.world().resource::<Received>();
        assert_eq!(received.output.len(), 1);
        assert_eq!(received.output[0].level, ConsoleOutputLevel::Warn);
        assert_eq!(received.output[0].message, "Unknown command or variable: bogus");
    }

    #[test]
    fn test_toggle_key_sends_toggle_event() {
        let mut app = app();
        push_key(&mut app, KeyEvent::down(KeyCode::Backquote));
        app.update();

        assert!(app.world().non_send_resource::<Console>().is_active());
        assert_eq!(app.world().resource::<Received>().toggles.len(), 1);
        assert!(app.world().resource::<Received>().toggles[0].open);

        push_key(&mut app, KeyEvent::down(KeyCode::Backquote));
        app.update();

        assert!(!app.world().non_send_resource::<Console>().is_active());
        let toggles = &app.world().resource::<Received>().toggles;
        assert_eq!(toggles.len(), 2);
        assert!(!toggles[1].open);
    }

    #[test]
    fn test_closed_console_drops_game_keys() {
        let mut app = app();
        push_key(&mut app, KeyEvent::char('w'));
        app.update();

        assert!(app.world().resource::<KeyQueue>().is_empty());
        assert!(app.world().non_send_resource::<Console>().line().is_empty());
    }

    #[test]
    fn test_typed_line_is_submitted() {
        let mut app = app();
        app.world_mut().non_send_resource_mut::<Console>().open(false);

        for c in "echo hi".chars() {
            push_key(&mut app, KeyEvent::char(c));
        }
        push_key(&mut app, KeyEvent::up(KeyCode::Enter));
        // one key per frame, then the submission
        for _ in 0..8 {
            app.update();
        }

        let console = app.world().non_send_resource::<Console>();
        assert!(console.line().is_empty());
        assert_eq!(console.history().get(0), Some("echo hi"));
    }

    #[test]
    fn test_clear_event_empties_scrollback() {
        let mut app = app();
        app.world_mut().write_message(ConsoleInputEvent::new("echo one"));
        app.update();
        assert_eq!(app.world().non_send_resource::<Console>().output().lines().len(), 2);

        app.world_mut().write_message(ConsoleClearEvent);
        app.update();
        assert_eq!(app.world().non_send_resource::<Console>().output().lines().len(), 0);
    }

    #[test]
    fn test_status_lines_are_batched_each_frame() {
        let mut app = app();
        {
            let mut console = app.world_mut().non_send_resource_mut::<Console>();
            status_printf!(console, "entities {}", 42);
        }
        app.update();

        let draws = app.world().resource::<StatusDraws>();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].text, "entities 42");
        assert_eq!(draws[0].justification, Justification::Left);

        // draws from the previous frame do not pile up
        app.update();
        assert_eq!(app.world().resource::<StatusDraws>().len(), 1);
    }

    #[test]
    fn test_custom_host_command() {
        let mut app = app();
        app.world_mut()
            .non_send_resource_mut::<Console>()
            .host_mut::<CommandTable>()
            .unwrap()
            .register_command("ping", "Reply with pong", |_, output| {
                console_printf!(output, "pong");
                true
            });

        app.world_mut().write_message(ConsoleInputEvent::scripted("ping"));
        app.update();

        let received = app.world().resource::<Received>();
        assert_eq!(received.output.len(), 1);
        assert_eq!(received.output[0].message, "pong");
    }
}
