//! Command line tokenizer.
//!
//! Splits a line into whitespace-separated tokens. Double-quoted tokens keep
//! their whitespace. A line wrapped in one pair of parentheses, as in
//! `(echo hello)`, is tokenized as its contents.

/// Tokenize error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    /// Nothing but whitespace.
    EmptyInput,
    /// A `"` was never closed.
    UnterminatedString { position: usize },
    /// A leading `(` was never closed.
    UnbalancedParenthesis,
}

impl std::fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenizeError::EmptyInput => write!(f, "empty input"),
            TokenizeError::UnterminatedString { position } => {
                write!(f, "unterminated string at position {}", position)
            }
            TokenizeError::UnbalancedParenthesis => write!(f, "missing closing parenthesis"),
        }
    }
}

impl std::error::Error for TokenizeError {}

fn strip_parentheses(input: &str) -> Result<&str, TokenizeError> {
    match input.strip_prefix('(') {
        Some(inner) => inner
            .trim_end()
            .strip_suffix(')')
            .ok_or(TokenizeError::UnbalancedParenthesis),
        None => Ok(input),
    }
}

/// Tokenize a command line.
///
/// The first token is the command name. Returns
/// [`TokenizeError::EmptyInput`] when there are no tokens.
///
/// # Examples
///
/// ```
/// use bevy_console_overlay::core::tokenize;
///
/// assert_eq!(tokenize("echo hello").unwrap(), vec!["echo", "hello"]);
/// assert_eq!(tokenize(r#"(print "a b")"#).unwrap(), vec!["print", "a b"]);
/// ```
pub fn tokenize(input: &str) -> Result<Vec<&str>, TokenizeError> {
    let body = strip_parentheses(input.trim())?;
    let offset = body.as_ptr() as usize - input.as_ptr() as usize;

    let mut tokens = Vec::new();
    let mut chars = body.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c.is_whitespace() {
            continue;
        }

        if c == '"' {
            let content_start = start + 1;
            let end = loop {
                match chars.next() {
                    Some((i, '"')) => break i,
                    Some(_) => {}
                    None => {
                        return Err(TokenizeError::UnterminatedString {
                            position: offset + start,
                        });
                    }
                }
            };
            tokens.push(&body[content_start..end]);
            continue;
        }

        let mut end = start + c.len_utf8();
        while let Some(&(i, next)) = chars.peek() {
            if next.is_whitespace() || next == '"' {
                break;
            }
            end = i + next.len_utf8();
            chars.next();
        }
        tokens.push(&body[start..end]);
    }

    if tokens.is_empty() {
        return Err(TokenizeError::EmptyInput);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_simple() {
        assert_eq!(tokenize("echo hello world").unwrap(), vec!["echo", "hello", "world"]);
    }

    #[test]
    fn test_tokenize_quotes() {
        assert_eq!(
            tokenize(r#"say "hello world" twice"#).unwrap(),
            vec!["say", "hello world", "twice"]
        );
        assert_eq!(tokenize(r#"say """#).unwrap(), vec!["say", ""]);
    }

    #[test]
    fn test_tokenize_parentheses() {
        assert_eq!(tokenize("(echo hi)").unwrap(), vec!["echo", "hi"]);
        assert_eq!(tokenize("  ( echo hi )  ").unwrap(), vec!["echo", "hi"]);
        assert_eq!(tokenize("(echo hi"), Err(TokenizeError::UnbalancedParenthesis));
    }

    #[test]
    fn test_tokenize_empty() {
        assert_eq!(tokenize(""), Err(TokenizeError::EmptyInput));
        assert_eq!(tokenize("   "), Err(TokenizeError::EmptyInput));
        assert_eq!(tokenize("()"), Err(TokenizeError::EmptyInput));
    }

    #[test]
    fn test_tokenize_unterminated_string() {
        assert_eq!(
            tokenize(r#"echo "hello"#),
            Err(TokenizeError::UnterminatedString { position: 5 })
        );
    }

    #[test]
    fn test_tokenize_extra_whitespace() {
        assert_eq!(tokenize("  echo \t hello  ").unwrap(), vec!["echo", "hello"]);
    }
}
