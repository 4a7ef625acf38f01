//! Tab completion.
//!
//! Completion input has the form `[^]token[ -filter]*`:
//!
//! - a leading `^` keeps only symbols that start with the token,
//! - the token is the run of word characters (`[A-Za-z0-9_]`) after any
//!   leading spaces,
//! - every ` -word` is a filter; symbols containing a filter are dropped.
//!
//! The first completion request prints the filtered match list. Repeated
//! requests step through the matches in place, one per request, and after
//! the last one restore the remembered token.

use super::exclusions::HiddenSymbols;
use super::host::SymbolNamespace;
use super::input::LineBuffer;

/// Marks a line-start match.
pub const ANCHOR: char = '^';

/// Maximum number of ` -filter` phrases.
pub const MAX_FILTERS: usize = 16;

/// Maximum number of symbols requested from the namespace.
pub const MAX_MATCHES: usize = 256;

/// Above this many matches the listing is printed in columns.
pub const LIST_THRESHOLD: usize = 12;

/// Columns per row in a columnized listing.
pub const COLUMNS: usize = 3;

/// Width of one column.
pub const COLUMN_WIDTH: usize = 42;

/// Replaces the tail of a name too long for its column.
pub const TRUNCATION_MARKER: char = '~';

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn word_len(text: &str) -> usize {
    text.find(|c: char| !is_word_char(c)).unwrap_or(text.len())
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len()
        && text.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

fn contains_ignore_case(text: &str, needle: &str) -> bool {
    text.to_lowercase().contains(&needle.to_lowercase())
}

/// A parsed completion input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest<'a> {
    /// Input started with [`ANCHOR`].
    pub anchored: bool,
    /// Input with the anchor removed.
    pub text: &'a str,
    /// Byte offset of the token in `text`.
    pub token_start: usize,
    /// The word being completed. May be empty.
    pub token: &'a str,
    /// Filter words, at most [`MAX_FILTERS`].
    pub filters: Vec<&'a str>,
}

impl<'a> CompletionRequest<'a> {
    pub fn parse(input: &'a str) -> Self {
        let (anchored, text) = match input.strip_prefix(ANCHOR) {
            Some(rest) => (true, rest),
            None => (false, input),
        };

        let token_start = text.len() - text.trim_start_matches(' ').len();
        let token_len = word_len(&text[token_start..]);
        let token = &text[token_start..token_start + token_len];

        let mut filters = Vec::new();
        let mut scan = text;
        while let Some(hit) = scan.find(" -") {
            let rest = &scan[hit + 2..];
            let len = word_len(rest);
            if len > 0 && filters.len() < MAX_FILTERS {
                filters.push(&rest[..len]);
            }
            scan = &rest[len..];
        }

        Self {
            anchored,
            text,
            token_start,
            token,
            filters,
        }
    }

    /// Whether a listing should include `symbol`.
    fn keeps(&self, symbol: &str, token: &str, hidden: &HiddenSymbols) -> bool {
        !symbol.is_empty()
            && !hidden.contains(symbol)
            && (!self.anchored || starts_with_ignore_case(symbol, token))
            && !self.filters.iter().any(|f| contains_ignore_case(symbol, f))
    }
}

/// What a completion request did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The namespace had nothing for the token.
    NoMatches,
    /// The match list was built; the lines are to be printed, header first.
    Presented(Vec<String>),
    /// Stepping wrapped around; the remembered token was restored.
    Reset,
    /// The token was replaced with the next match.
    Stepped,
}

/// Lay out `names` in rows of [`COLUMNS`] fixed-width cells.
pub fn columnize<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut rows = Vec::new();
    let mut row = String::new();
    let mut in_row = 0;

    for name in names {
        if name.chars().count() > COLUMN_WIDTH - 1 {
            row.extend(name.chars().take(COLUMN_WIDTH - 1));
            row.push(TRUNCATION_MARKER);
            row.push(' ');
        } else {
            row.push_str(&format!("{:<width$} ", name, width = COLUMN_WIDTH));
        }

        in_row += 1;
        if in_row % COLUMNS == 0 {
            rows.push(std::mem::take(&mut row));
        }
    }

    if !row.is_empty() {
        rows.push(row);
    }
    rows
}

/// Completion state kept between completion requests.
#[derive(Debug, Clone, Default)]
pub struct Completion {
    token: Option<String>,
    cursor: Option<usize>,
}

impl Completion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a completion is in progress.
    pub fn is_active(&self) -> bool {
        self.token.is_some()
    }

    /// The token remembered by the first request.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Index of the next match to step to.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Forget the remembered token; the next request presents a new list.
    pub fn reset(&mut self) {
        self.token = None;
        self.cursor = None;
    }

    /// Run one completion request against `line`.
    pub fn complete<N: SymbolNamespace + ?Sized>(
        &mut self,
        line: &mut LineBuffer,
        namespace: &N,
        hidden: &HiddenSymbols,
    ) -> CompletionOutcome {
        let original = line.text().to_owned();
        let request = CompletionRequest::parse(&original);
        line.set(request.text);

        let present = self.token.is_none();
        if present {
            self.cursor = None;
        }
        let token = self
            .token
            .get_or_insert_with(|| request.token.to_owned())
            .clone();

        let matches = namespace.enumerate(&token, MAX_MATCHES);
        if matches.is_empty() {
            return CompletionOutcome::NoMatches;
        }

        let token_start = request.token_start;
        let cursor = self.cursor.unwrap_or(0);

        if present {
            let shown: Vec<&str> = matches
                .iter()
                .map(String::as_str)
                .filter(|symbol| request.keeps(symbol, &token, hidden))
                .collect();

            let mut lines = Vec::with_capacity(shown.len() + 1);
            lines.push(format!("({} matches) '{}':", shown.len(), original));
            if shown.len() > LIST_THRESHOLD {
                lines.extend(columnize(shown));
            } else {
                lines.extend(shown.into_iter().map(str::to_owned));
            }

            self.cursor = Some(0);
            Self::replace_token(line, token_start, &token);
            CompletionOutcome::Presented(lines)
        } else if cursor >= matches.len() {
            self.cursor = Some(0);
            Self::replace_token(line, token_start, &token);
            CompletionOutcome::Reset
        } else {
            Self::replace_token(line, token_start, &matches[cursor]);
            self.cursor = Some(cursor + 1);
            CompletionOutcome::Stepped
        }
    }

    /// Overwrite everything from `start` with `text` and put the edit cursor
    /// after it.
    fn replace_token(line: &mut LineBuffer, start: usize, text: &str) {
        line.truncate(start);
        line.push_str(text);
        line.set_cursor(start + text.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(text: &str) -> LineBuffer {
        let mut line = LineBuffer::new();
        line.set(text);
        line
    }

    #[test]
    fn test_parse_plain() {
        let request = CompletionRequest::parse("debug_");
        assert!(!request.anchored);
        assert_eq!(request.token, "debug_");
        assert_eq!(request.token_start, 0);
        assert!(request.filters.is_empty());
    }

    #[test]
    fn test_parse_anchor_and_filters() {
        let request = CompletionRequest::parse("^deb -bar -baz_2");
        assert!(request.anchored);
        assert_eq!(request.text, "deb -bar -baz_2");
        assert_eq!(request.token, "deb");
        assert_eq!(request.filters, vec!["bar", "baz_2"]);
    }

    #[test]
    fn test_parse_leading_spaces_and_empty_token() {
        let request = CompletionRequest::parse("   obj");
        assert_eq!(request.token_start, 3);
        assert_eq!(request.token, "obj");

        let request = CompletionRequest::parse(" -x");
        assert_eq!(request.token, "");
        assert_eq!(request.filters, vec!["x"]);
    }

    #[test]
    fn test_parse_filter_limit() {
        let input: String = (0..20).map(|i| format!(" -f{i}")).collect();
        let request = CompletionRequest::parse(&input);
        assert_eq!(request.filters.len(), MAX_FILTERS);
        assert_eq!(request.filters[0], "f0");
    }

    #[test]
    fn test_present_hides_unknown_symbols() {
        let namespace = ["debug_foo", "debug_bar", "UNKNOWN1"];
        let hidden = HiddenSymbols::new(["UNKNOWN1"]);
        let mut completion = Completion::new();
        let mut line = buffer("debug_");

        let outcome = completion.complete(&mut line, &namespace, &hidden);
        assert_eq!(
            outcome,
            CompletionOutcome::Presented(vec![
                "(2 matches) 'debug_':".to_string(),
                "debug_foo".to_string(),
                "debug_bar".to_string(),
            ])
        );
        assert_eq!(line.text(), "debug_");
        assert_eq!(line.cursor(), 6);
        assert_eq!(completion.cursor(), Some(0));
    }

    #[test]
    fn test_anchor_and_filter_drop_symbols() {
        let namespace = ["debug_foo", "debug_bar", "no_debug"];
        let mut completion = Completion::new();
        let mut line = buffer("^deb -bar");

        let outcome = completion.complete(&mut line, &namespace, &HiddenSymbols::default());
        assert_eq!(
            outcome,
            CompletionOutcome::Presented(vec![
                "(1 matches) '^deb -bar':".to_string(),
                "debug_foo".to_string(),
            ])
        );
        assert_eq!(completion.token(), Some("deb"));
        // filters are dropped from the line along with the anchor
        assert_eq!(line.text(), "deb");
    }

    #[test]
    fn test_filters_ignore_case() {
        let namespace = ["Debug_BAR", "debug_foo"];
        let mut completion = Completion::new();
        let mut line = buffer("debug -bar");

        let outcome = completion.complete(&mut line, &namespace, &HiddenSymbols::default());
        let CompletionOutcome::Presented(lines) = outcome else {
            panic!("expected a listing");
        };
        assert_eq!(lines[1..], ["debug_foo".to_string()]);
    }

    #[test]
    fn test_stepping_wraps_to_token() {
        let namespace = ["debug_foo", "debug_bar"];
        let hidden = HiddenSymbols::default();
        let mut completion = Completion::new();
        let mut line = buffer("debug_");

        assert!(matches!(
            completion.complete(&mut line, &namespace, &hidden),
            CompletionOutcome::Presented(_)
        ));

        assert_eq!(completion.complete(&mut line, &namespace, &hidden), CompletionOutcome::Stepped);
        assert_eq!(line.text(), "debug_foo");
        assert_eq!(line.cursor(), 9);

        assert_eq!(completion.complete(&mut line, &namespace, &hidden), CompletionOutcome::Stepped);
        assert_eq!(line.text(), "debug_bar");

        assert_eq!(completion.complete(&mut line, &namespace, &hidden), CompletionOutcome::Reset);
        assert_eq!(line.text(), "debug_");
        assert_eq!(completion.cursor(), Some(0));

        assert_eq!(completion.complete(&mut line, &namespace, &hidden), CompletionOutcome::Stepped);
        assert_eq!(line.text(), "debug_foo");
    }

    #[test]
    fn test_step_keeps_leading_spaces() {
        let namespace = ["object_create"];
        let hidden = HiddenSymbols::default();
        let mut completion = Completion::new();
        let mut line = buffer("  obj");

        completion.complete(&mut line, &namespace, &hidden);
        completion.complete(&mut line, &namespace, &hidden);
        assert_eq!(line.text(), "  object_create");
        assert_eq!(line.cursor(), 15);
    }

    #[test]
    fn test_no_matches_leaves_state() {
        let namespace: [&str; 0] = [];
        let mut completion = Completion::new();
        let mut line = buffer("^zzz");

        assert_eq!(
            completion.complete(&mut line, &namespace, &HiddenSymbols::default()),
            CompletionOutcome::NoMatches
        );
        assert_eq!(line.text(), "zzz");
        assert!(completion.is_active());
    }

    #[test]
    fn test_reset_presents_again() {
        let namespace = ["a1", "a2"];
        let hidden = HiddenSymbols::default();
        let mut completion = Completion::new();
        let mut line = buffer("a");

        completion.complete(&mut line, &namespace, &hidden);
        completion.complete(&mut line, &namespace, &hidden);
        completion.reset();
        assert!(!completion.is_active());

        assert!(matches!(
            completion.complete(&mut line, &namespace, &hidden),
            CompletionOutcome::Presented(_)
        ));
        assert_eq!(completion.token(), Some("a1"));
    }

    #[test]
    fn test_columnized_listing() {
        let names: Vec<String> = (0..14).map(|i| format!("symbol_{i:02}")).collect();
        let namespace: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut completion = Completion::new();
        let mut line = buffer("symbol");

        let CompletionOutcome::Presented(lines) =
            completion.complete(&mut line, namespace.as_slice(), &HiddenSymbols::default())
        else {
            panic!("expected a listing");
        };

        assert_eq!(lines[0], "(14 matches) 'symbol':");
        // 14 entries: four full rows of three and a partial row of two
        assert_eq!(lines.len(), 1 + 5);
        assert_eq!(lines[1].len(), COLUMNS * (COLUMN_WIDTH + 1));
        assert!(lines[1].starts_with("symbol_00 "));
        assert_eq!(lines[5].len(), 2 * (COLUMN_WIDTH + 1));
    }

    #[test]
    fn test_columnize_truncates_long_names() {
        let long = "x".repeat(COLUMN_WIDTH + 5);
        let rows = columnize([long.as_str()]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], format!("{}~ ", "x".repeat(COLUMN_WIDTH - 1)));

        let exact = "y".repeat(COLUMN_WIDTH - 1);
        assert_eq!(columnize([exact.as_str()])[0], format!("{exact}  "));
    }
}
