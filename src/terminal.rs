//! Terminal backend for headless runs.
//!
//! Lines read from stdin are submitted as interactive commands and every
//! console output line is written to stdout.

use std::io::{self, BufRead, Write};
use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use bevy::color::Srgba;
use bevy::prelude::*;

use crate::core::{ConsoleInputEvent, ConsoleOutputEvent, ConsoleOutputLevel};

/// Plugin that adds terminal (stdin/stdout) console support.
#[derive(Default)]
pub struct TerminalPlugin {
    pub config: TerminalConfig,
}

impl Plugin for TerminalPlugin {
    fn build(&self, app: &mut App) {
        let (sender, receiver) = mpsc::channel();
        spawn_stdin_reader(sender);

        app.insert_resource(StdinReceiver(Mutex::new(receiver)))
            .insert_resource(self.config.clone())
            .add_systems(Update, (read_stdin, write_stdout));
    }
}

/// Configuration for terminal behavior.
#[derive(Resource, Debug, Clone, Default)]
pub struct TerminalConfig {
    /// Whether to use colored output (ANSI escape codes).
    /// Off by default; some terminals mangle the escapes.
    pub colored: bool,
}

#[derive(Resource)]
struct StdinReceiver(Mutex<Receiver<String>>);

fn spawn_stdin_reader(sender: Sender<String>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines().map_while(Result::ok) {
            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            if sender.send(text.to_string()).is_err() {
                break;
            }
        }
    });
}

fn read_stdin(receiver: Res<StdinReceiver>, mut events: MessageWriter<ConsoleInputEvent>) {
    let Ok(rx) = receiver.0.lock() else {
        return;
    };
    while let Ok(line) = rx.try_recv() {
        events.write(ConsoleInputEvent::new(line));
    }
}

fn write_stdout(mut events: MessageReader<ConsoleOutputEvent>, config: Res<TerminalConfig>) {
    let mut stdout = io::stdout().lock();
    for event in events.read() {
        let _ = if config.colored {
            writeln!(stdout, "{}", colored_line(event))
        } else {
            writeln!(stdout, "{}", event.message)
        };
    }
    let _ = stdout.flush();
}

/// Wrap a line in ANSI escapes: its own color as 24-bit, else one per level.
fn colored_line(event: &ConsoleOutputEvent) -> String {
    let escape = match event.color {
        Some(color) if color != Srgba::WHITE => {
            let [r, g, b] = [color.red, color.green, color.blue]
                .map(|channel| (channel.clamp(0.0, 1.0) * 255.0).round() as u8);
            format!("\x1b[38;2;{r};{g};{b}m")
        }
        _ => match event.level {
            ConsoleOutputLevel::Debug => "\x1b[90m",
            ConsoleOutputLevel::Info => "\x1b[0m",
            ConsoleOutputLevel::Warn => "\x1b[33m",
            ConsoleOutputLevel::Error => "\x1b[31m",
            ConsoleOutputLevel::Command => "\x1b[36m",
        }
        .to_string(),
    };
    format!("{}{}\x1b[0m", escape, event.message)
}
