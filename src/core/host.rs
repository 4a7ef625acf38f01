//! The seam between the console and the command engine behind it.

use std::any::Any;

use super::output::ConsoleOutput;

/// Source of symbol names for completion.
pub trait SymbolNamespace {
    /// Up to `limit` symbol names matching `pattern`.
    ///
    /// How a name matches is up to the namespace; the completion engine
    /// filters the results further.
    fn enumerate(&self, pattern: &str, limit: usize) -> Vec<String>;
}

/// Runs command lines.
pub trait CommandEvaluator {
    /// Evaluate `command`. `source` names where the text came from and
    /// `interactive` is set when a user typed it.
    ///
    /// Returns whether the command ran successfully.
    fn evaluate(
        &mut self,
        source: &str,
        command: &str,
        interactive: bool,
        output: &mut ConsoleOutput,
    ) -> bool;
}

/// A full command engine: namespace plus evaluator.
///
/// Implemented for every `'static` type that provides both halves, so a host
/// can be recovered from the console with [`Console::host`](super::Console::host).
pub trait ConsoleHost: SymbolNamespace + CommandEvaluator + Any {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: SymbolNamespace + CommandEvaluator + Any> ConsoleHost for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl SymbolNamespace for [&str] {
    fn enumerate(&self, _pattern: &str, limit: usize) -> Vec<String> {
        self.iter().take(limit).map(|name| name.to_string()).collect()
    }
}

impl<const N: usize> SymbolNamespace for [&str; N] {
    fn enumerate(&self, pattern: &str, limit: usize) -> Vec<String> {
        self.as_slice().enumerate(pattern, limit)
    }
}
