//! The console context.
//!
//! [`Console`] owns every piece of console state: the edit line, history,
//! completion, output, the status line registry and the status string pool.
//! It is driven once per frame through [`Console::update`] with the elapsed
//! time, a millisecond clock and an [`InputSource`].

use std::fmt::{self, Write as _};
use std::io::{self, BufRead};

use bevy::color::Srgba;
use bevy::input::keyboard::KeyCode;
use bevy::prelude::*;

use crate::config::ConsoleConfig;

use super::completion::{Completion, CompletionOutcome};
use super::events::ConsoleOutputLevel;
use super::exclusions::HiddenSymbols;
use super::history::CommandHistory;
use super::host::ConsoleHost;
use super::input::{InputSource, KeyEvent, KeyKind, LineBuffer, Modifiers};
use super::output::{ConsoleOutput, MainThread};
use super::status_line::StatusLineRegistry;
use super::status_strings::{MESSAGE_CAPACITY, StatusStrings};
use super::string_cache::{TextRenderer, draw_status_lines};
use super::text::truncate_at_boundary;

/// Commands this long or longer are rejected.
pub const MAX_COMMAND_LENGTH: usize = 255;

/// Seconds after closing during which the toggle key does not reopen.
pub const REOPEN_DELAY_SECONDS: f32 = 0.1;

/// Longest script line read at once; longer lines are split.
pub const SCRIPT_LINE_CAPACITY: usize = 199;

/// Source tag passed to the evaluator.
pub const COMMAND_SOURCE: &str = "console_command";

/// The developer console.
pub struct Console {
    config: ConsoleConfig,
    hidden: HiddenSymbols,
    main_thread: MainThread,
    active: bool,
    overlay_active: bool,
    open_timeout: f32,
    now_ms: u64,
    line: LineBuffer,
    history: CommandHistory,
    completion: Completion,
    status_lines: StatusLineRegistry,
    status_strings: StatusStrings,
    output: ConsoleOutput,
    host: Box<dyn ConsoleHost>,
    disposed: bool,
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console")
            .field("active", &self.active)
            .field("overlay_active", &self.overlay_active)
            .field("line", &self.line.text())
            .field("history", &self.history.len())
            .field("status_lines", &self.status_lines.len())
            .finish_non_exhaustive()
    }
}

impl Console {
    /// Create an initialized, closed console on the calling thread.
    pub fn new(config: ConsoleConfig, host: impl ConsoleHost) -> Self {
        let main_thread = MainThread::current();
        let mut output = ConsoleOutput::new(main_thread);
        output.mirror_to_debug_display = config.mirror_to_debug_display;

        let mut console = Self {
            hidden: HiddenSymbols::new(&config.hidden_symbols),
            config,
            main_thread,
            active: false,
            overlay_active: false,
            open_timeout: 0.0,
            now_ms: 0,
            line: LineBuffer::new(),
            history: CommandHistory::new(),
            completion: Completion::new(),
            status_lines: StatusLineRegistry::new(),
            status_strings: StatusStrings::new(),
            output,
            host: Box::new(host),
            disposed: true,
        };
        console.initialize();
        console
    }

    /// Register the status string lines. Does nothing when already initialized.
    pub fn initialize(&mut self) {
        if !self.disposed {
            return;
        }
        self.status_strings.initialize(&mut self.status_lines);
        self.disposed = false;
    }

    /// Close the console and unlink the status string lines. Does nothing
    /// when already disposed.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.close();
        self.status_strings.dispose(&mut self.status_lines);
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    /// Replace the configuration, hidden symbols and mirroring included.
    pub fn set_config(&mut self, config: ConsoleConfig) {
        self.hidden = HiddenSymbols::new(&config.hidden_symbols);
        self.output.mirror_to_debug_display = config.mirror_to_debug_display;
        self.config = config;
        self.completion.reset();
    }

    /// Open the console, or the debug overlay when `as_overlay` is set.
    ///
    /// Does nothing while either is already open.
    pub fn open(&mut self, as_overlay: bool) {
        if self.active || self.overlay_active {
            return;
        }

        if as_overlay {
            self.overlay_active = true;
        } else {
            self.line.clear();
            self.completion.reset();
            self.active = true;
        }
    }

    /// Close the console, or the debug overlay if the console is not open.
    pub fn close(&mut self) {
        if self.active {
            self.line.clear();
            self.open_timeout = REOPEN_DELAY_SECONDS;
            self.active = false;
        } else {
            self.overlay_active = false;
        }
    }

    /// Whether the console is open.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the debug overlay is open.
    #[inline]
    pub fn is_overlay_active(&self) -> bool {
        self.overlay_active
    }

    /// Whether the console is open with nothing typed.
    pub fn is_empty(&self) -> bool {
        self.active && self.line.is_empty()
    }

    /// Whether the console or the debug overlay owns the keyboard.
    pub fn has_focus(&self) -> bool {
        self.active || self.overlay_active
    }

    /// Remaining reopen suppression in seconds.
    pub fn open_timeout(&self) -> f32 {
        self.open_timeout
    }

    /// Clock value of the last update, in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Advance one frame.
    pub fn update(&mut self, elapsed_seconds: f32, now_ms: u64, input: &mut dyn InputSource) {
        self.now_ms = now_ms;

        if self.active {
            while let Some(key) = input.next_console_key() {
                if self.handle_key(key, input) {
                    break;
                }
            }
        } else if !self.has_focus() && self.open_timeout <= 0.0 {
            let config = &self.config;
            let wanted = |event: &KeyEvent| {
                !event.repeating
                    && event.modifiers.is_empty()
                    && matches!(event.kind, KeyKind::Down(key) if config.is_toggle_key(key))
            };
            if input.take_ambient_key(&wanted).is_some() {
                self.open(false);
            }
        }

        self.open_timeout = (self.open_timeout - elapsed_seconds).max(0.0);
    }

    /// Handle one key while open. Returns `true` when the rest of the
    /// frame's keys should wait.
    fn handle_key(&mut self, key: KeyEvent, input: &mut dyn InputSource) -> bool {
        match key.kind {
            KeyKind::Down(code) if self.config.is_toggle_key(code) => {
                self.close();
                true
            }
            KeyKind::Down(KeyCode::Tab) => false,
            KeyKind::Up(KeyCode::Tab) => {
                self.complete();
                false
            }
            KeyKind::Up(KeyCode::KeyV) if key.modifiers.contains(Modifiers::CONTROL) => {
                if let Some(text) = input.clipboard_text() {
                    self.line.push_str(&text);
                }
                self.completion.reset();
                true
            }
            KeyKind::Up(KeyCode::Enter | KeyCode::NumpadEnter) => {
                self.completion.reset();
                if !self.line.is_empty() {
                    let command = self.line.text().to_owned();
                    self.process_command(&command, true);
                    self.line.clear();
                }
                self.line.reset_selection();
                true
            }
            KeyKind::Up(code @ (KeyCode::ArrowUp | KeyCode::ArrowDown)) => {
                self.completion.reset();
                if let Some(entry) = self.history.browse(code == KeyCode::ArrowUp) {
                    self.line.set(entry);
                }
                true
            }
            KeyKind::Char(c) => {
                self.completion.reset();
                self.line.push_char(c);
                true
            }
            KeyKind::Down(KeyCode::Backspace) => {
                self.completion.reset();
                self.line.pop_char();
                false
            }
            _ => {
                self.completion.reset();
                false
            }
        }
    }

    /// Run one completion request on the edit line, printing any listing.
    pub fn complete(&mut self) {
        if self.line.is_empty() {
            return;
        }

        let outcome = self.completion.complete(&mut self.line, &*self.host, &self.hidden);
        if let CompletionOutcome::Presented(lines) = outcome {
            for line in lines {
                self.output.printf(format_args!("{}", line));
            }
        }
    }

    /// Submit a command line.
    ///
    /// Lines of [`MAX_COMMAND_LENGTH`] bytes or more, empty lines and
    /// `;` comments fail without side effects. Anything else is added to the
    /// history and evaluated.
    pub fn process_command(&mut self, command: &str, interactive: bool) -> bool {
        if command.len() >= MAX_COMMAND_LENGTH || command.is_empty() || command.starts_with(';') {
            return false;
        }

        self.history.push(command);

        if interactive {
            let color = self.config.input_color;
            self.output.print(
                ConsoleOutputLevel::Command,
                color,
                format_args!("{}{}", self.config.prompt, command),
            );
        }

        debug!("Console command: {}", command);
        self.host.evaluate(COMMAND_SOURCE, command, interactive, &mut self.output)
    }

    /// Run every line of a script as a non-interactive command.
    ///
    /// Lines are cut at the first CR or LF; lines longer than
    /// [`SCRIPT_LINE_CAPACITY`] bytes are run in pieces. Returns the number of
    /// commands that succeeded.
    pub fn execute_script(&mut self, mut reader: impl BufRead) -> io::Result<usize> {
        let mut succeeded = 0;
        let mut raw = Vec::new();

        loop {
            raw.clear();
            if reader.read_until(b'\n', &mut raw)? == 0 {
                break;
            }

            let text = String::from_utf8_lossy(&raw);
            let mut rest: &str = &text;
            while !rest.is_empty() {
                let chunk = truncate_at_boundary(rest, SCRIPT_LINE_CAPACITY);
                let chunk = if chunk.is_empty() {
                    // a single character wider than the capacity
                    &rest[..rest.chars().next().map_or(0, char::len_utf8)]
                } else {
                    chunk
                };
                rest = &rest[chunk.len()..];

                let command = chunk.split(['\r', '\n']).next().unwrap_or_default();
                if self.process_command(command, false) {
                    succeeded += 1;
                }
            }
        }

        Ok(succeeded)
    }

    /// Print a white line.
    pub fn printf(&mut self, args: fmt::Arguments<'_>) {
        self.output.printf(args);
    }

    /// Print a line in `color`.
    pub fn printf_color(&mut self, color: Srgba, args: fmt::Arguments<'_>) {
        self.output.printf_color(color, args);
    }

    /// Print a red line.
    pub fn warning(&mut self, args: fmt::Arguments<'_>) {
        self.output.warning(args);
    }

    /// Empty the scrollback.
    pub fn clear(&mut self) {
        self.output.clear();
    }

    /// Post a status message keyed by `tag`.
    pub fn status_printf(&mut self, tag: &str, args: fmt::Arguments<'_>) {
        if !self.main_thread.is_current() {
            return;
        }

        let mut message = String::new();
        if message.write_fmt(args).is_err() {
            return;
        }
        let len = truncate_at_boundary(&message, MESSAGE_CAPACITY).len();
        message.truncate(len);

        self.status_strings
            .post(&mut self.status_lines, tag, &message, self.now_ms);
    }

    /// Post each line of `text` as its own status message, tagged `tag0`,
    /// `tag1` and so on.
    pub fn status_strings(&mut self, tag: &str, text: &str) {
        if !self.main_thread.is_current() {
            return;
        }
        self.status_strings
            .post_lines(&mut self.status_lines, tag, text, self.now_ms);
    }

    /// Remove the status message posted under `tag`.
    pub fn clear_status(&mut self, tag: &str) {
        self.status_strings.clear_tag(&mut self.status_lines, tag);
    }

    /// Status text showing under `tag`.
    pub fn status_text(&self, tag: &str) -> Option<&str> {
        self.status_strings.text_for(&self.status_lines, tag)
    }

    /// Fade status strings and draw every visible status line.
    ///
    /// Returns the number of draw calls issued; zero when status rendering
    /// is switched off.
    pub fn draw_status(&mut self, renderer: &mut dyn TextRenderer) -> usize {
        if !self.config.status_render {
            return 0;
        }
        self.status_strings
            .update_fades(&mut self.status_lines, self.now_ms);
        draw_status_lines(&mut self.status_lines, self.now_ms, renderer)
    }

    /// Switch status rendering on or off.
    pub fn set_status_render(&mut self, enabled: bool) {
        self.config.status_render = enabled;
    }

    pub fn status_lines(&self) -> &StatusLineRegistry {
        &self.status_lines
    }

    /// Registry for lines owned by other systems.
    pub fn status_lines_mut(&mut self) -> &mut StatusLineRegistry {
        &mut self.status_lines
    }

    pub fn line(&self) -> &LineBuffer {
        &self.line
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn completion(&self) -> &Completion {
        &self.completion
    }

    pub fn output(&self) -> &ConsoleOutput {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut ConsoleOutput {
        &mut self.output
    }

    /// The command host, if it is a `T`.
    pub fn host<T: ConsoleHost>(&self) -> Option<&T> {
        (*self.host).as_any().downcast_ref()
    }

    /// The command host, mutably, if it is a `T`.
    pub fn host_mut<T: ConsoleHost>(&mut self) -> Option<&mut T> {
        (*self.host).as_any_mut().downcast_mut()
    }

    /// Replace the command host.
    pub fn set_host(&mut self, host: impl ConsoleHost) {
        self.host = Box::new(host);
        self.completion.reset();
    }
}
