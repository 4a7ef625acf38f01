//! Core console types with zero optional dependencies.
//!
//! This module provides the fundamental building blocks:
//! - [`Console`] - The console context driven once per frame
//! - [`StatusLineRegistry`] - On-screen status lines, drawn every frame
//! - [`StatusStrings`] - Fading status messages keyed by tag
//! - [`Completion`] - Tab completion over a [`SymbolNamespace`]
//! - [`CommandTable`] - A default command host
//! - Messages for communication between layers

mod command_table;
mod completion;
mod console;
mod events;
mod exclusions;
mod history;
mod host;
mod input;
mod output;
mod status_line;
mod status_strings;
mod string_cache;
mod text;
mod tokenizer;
mod trie;

pub use command_table::{CommandArgs, CommandHandler, CommandTable};
pub use completion::{
    ANCHOR, COLUMN_WIDTH, COLUMNS, Completion, CompletionOutcome, CompletionRequest,
    LIST_THRESHOLD, MAX_FILTERS, MAX_MATCHES, columnize,
};
pub use console::{
    COMMAND_SOURCE, Console, MAX_COMMAND_LENGTH, REOPEN_DELAY_SECONDS, SCRIPT_LINE_CAPACITY,
};
pub use events::{
    ConsoleClearEvent, ConsoleEventsPlugin, ConsoleInputEvent, ConsoleOutputEvent,
    ConsoleOutputLevel, ConsoleToggleEvent,
};
pub use exclusions::HiddenSymbols;
pub use history::{CommandHistory, HISTORY_CAPACITY};
pub use host::{CommandEvaluator, ConsoleHost, SymbolNamespace};
pub use input::{InputSource, KeyEvent, KeyKind, KeyQueue, LineBuffer, MAX_LINE_LENGTH, Modifiers};
pub use output::{
    ConsoleOutput, DEBUG_DISPLAY_TARGET, MAX_OUTPUT_LENGTH, MainThread, OutputLine,
    SCROLLBACK_CAPACITY, WARNING_COLOR,
};
pub use status_line::{
    STATUS_TEXT_CAPACITY, StatusLine, StatusLineFlags, StatusLineId, StatusLineRegistry,
    VisibilityFlag,
};
pub use status_strings::{
    EXPIRE_MS, FADE_START_MS, MESSAGE_CAPACITY, STATUS_STRING_SLOTS, StatusStrings, fade_alpha,
};
pub use string_cache::{
    BLINK_PLACEHOLDER, Justification, LINE_BREAK, StringCache, TextDraw, TextRenderer,
    draw_status_lines,
};
pub use tokenizer::{TokenizeError, tokenize};
pub use trie::Trie;
