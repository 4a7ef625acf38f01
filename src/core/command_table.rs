//! Built-in command host.
//!
//! [`CommandTable`] is a small command engine for games that do not bring
//! their own: named commands with Rust handlers plus string globals, stored in
//! a sorted [`Trie`] that doubles as the completion namespace.

use std::fmt;

use bevy::prelude::*;

use super::host::{CommandEvaluator, SymbolNamespace};
use super::output::ConsoleOutput;
use super::tokenizer::tokenize;
use super::trie::Trie;

/// Arguments passed to a command handler.
#[derive(Debug, Clone)]
pub struct CommandArgs<'a> {
    raw: &'a str,
    args: Vec<&'a str>,
}

impl<'a> CommandArgs<'a> {
    pub fn new(raw: &'a str, args: Vec<&'a str>) -> Self {
        Self { raw, args }
    }

    /// The full command line.
    #[inline]
    pub fn raw(&self) -> &str {
        self.raw
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Argument by index, the command name excluded.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.args.get(index).copied()
    }

    /// Parse an argument.
    pub fn parse<T: std::str::FromStr>(&self, index: usize) -> Option<T> {
        self.get(index).and_then(|s| s.parse().ok())
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.args.iter().copied()
    }

    pub fn join(&self, separator: &str) -> String {
        self.args.join(separator)
    }
}

/// Command handler. Returns whether the command succeeded.
pub type CommandHandler = Box<dyn FnMut(&CommandArgs, &mut ConsoleOutput) -> bool>;

enum SymbolKind {
    Help,
    Command(CommandHandler),
    Global(String),
}

struct Symbol {
    name: Box<str>,
    description: &'static str,
    kind: SymbolKind,
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            SymbolKind::Help => "help",
            SymbolKind::Command(_) => "command",
            SymbolKind::Global(_) => "global",
        };
        f.debug_struct("Symbol")
            .field("name", &self.name)
            .field("kind", &kind)
            .finish()
    }
}

/// Commands and globals, looked up case-insensitively.
#[derive(Debug, Default)]
pub struct CommandTable {
    symbols: Trie<Symbol>,
}

impl CommandTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table with `help`, `echo` and `clear` registered.
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        table.insert("help", "List commands, or describe one", SymbolKind::Help);
        table.register_command("echo", "Print the arguments", |args, output| {
            output.printf(format_args!("{}", args.join(" ")));
            true
        });
        table.register_command("clear", "Clear the console output", |_, output| {
            output.clear();
            true
        });
        table
    }

    fn insert(&mut self, name: &str, description: &'static str, kind: SymbolKind) {
        let key = name.to_lowercase();
        let symbol = Symbol {
            name: name.into(),
            description,
            kind,
        };
        if self.symbols.insert(&key, symbol).is_some() {
            warn!("Console symbol '{}' registered twice, replacing", name);
        }
    }

    /// Register a command.
    pub fn register_command<F>(&mut self, name: &str, description: &'static str, handler: F)
    where
        F: FnMut(&CommandArgs, &mut ConsoleOutput) -> bool + 'static,
    {
        self.insert(name, description, SymbolKind::Command(Box::new(handler)));
    }

    /// Register a string global with an initial value.
    pub fn register_global(&mut self, name: &str, description: &'static str, value: impl Into<String>) {
        self.insert(name, description, SymbolKind::Global(value.into()));
    }

    /// Remove a command or global. Returns whether it existed.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.symbols.remove(&name.to_lowercase()).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Value of a global.
    pub fn global(&self, name: &str) -> Option<&str> {
        match &self.symbols.get(&name.to_lowercase())?.kind {
            SymbolKind::Global(value) => Some(value),
            _ => None,
        }
    }

    /// Overwrite a global. Returns `false` if no such global exists.
    pub fn set_global(&mut self, name: &str, value: &str) -> bool {
        match self.symbols.get_mut(&name.to_lowercase()).map(|s| &mut s.kind) {
            Some(SymbolKind::Global(current)) => {
                current.clear();
                current.push_str(value);
                true
            }
            _ => false,
        }
    }

    /// Every global as `(name, value)`, sorted by name.
    pub fn globals(&self) -> impl Iterator<Item = (&str, &str)> {
        self.symbols.iter().filter_map(|(_, symbol)| match &symbol.kind {
            SymbolKind::Global(value) => Some((&*symbol.name, value.as_str())),
            _ => None,
        })
    }

    fn help(&self, args: &CommandArgs, output: &mut ConsoleOutput) -> bool {
        let Some(name) = args.get(0) else {
            for symbol in self.symbols.iter().map(|(_, s)| s) {
                output.printf(format_args!("{}", symbol.name));
            }
            return true;
        };

        let key = name.to_lowercase();
        match self.symbols.get(&key) {
            Some(symbol) => {
                output.printf(format_args!("{} - {}", symbol.name, symbol.description));
                true
            }
            None => {
                let mut found = false;
                for (_, symbol) in self.symbols.prefix_iter(&key) {
                    output.printf(format_args!("{} - {}", symbol.name, symbol.description));
                    found = true;
                }
                if !found {
                    output.warning(format_args!("No help for '{}'", name));
                }
                found
            }
        }
    }
}

impl SymbolNamespace for CommandTable {
    fn enumerate(&self, pattern: &str, limit: usize) -> Vec<String> {
        let pattern = pattern.to_lowercase();
        self.symbols
            .iter()
            .filter(|(key, _)| key.contains(&pattern))
            .take(limit)
            .map(|(_, symbol)| symbol.name.to_string())
            .collect()
    }
}

impl CommandEvaluator for CommandTable {
    fn evaluate(
        &mut self,
        source: &str,
        command: &str,
        _interactive: bool,
        output: &mut ConsoleOutput,
    ) -> bool {
        let tokens = match tokenize(command) {
            Ok(tokens) => tokens,
            Err(e) => {
                output.warning(format_args!("{}: {}", source, e));
                return false;
            }
        };

        let name = tokens[0];
        let args = CommandArgs::new(command, tokens[1..].to_vec());
        let key = name.to_lowercase();

        if matches!(self.symbols.get(&key), Some(Symbol { kind: SymbolKind::Help, .. })) {
            return self.help(&args, output);
        }

        let Some(symbol) = self.symbols.get_mut(&key) else {
            output.warning(format_args!("Unknown command or variable: {}", name));
            return false;
        };

        match &mut symbol.kind {
            SymbolKind::Help => false,
            SymbolKind::Command(handler) => handler(&args, output),
            SymbolKind::Global(value) => {
                match args.get(0) {
                    Some(new_value) => {
                        value.clear();
                        value.push_str(new_value);
                    }
                    None => output.printf(format_args!("{}", value)),
                }
                true
            }
        }
    }
}
