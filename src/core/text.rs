//! Fixed-capacity string helpers.
//!
//! Every text buffer in the console has a hard byte capacity. Writes past it
//! are truncated on a UTF-8 boundary, never reported as errors.

/// Longest prefix of `text` that fits in `max_bytes` without splitting a character.
pub fn truncate_at_boundary(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }

    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Append as much of `text` as fits so that `buffer` stays within `capacity` bytes.
///
/// Returns the number of bytes appended.
pub fn push_bounded(buffer: &mut String, text: &str, capacity: usize) -> usize {
    let room = capacity.saturating_sub(buffer.len());
    let fitted = truncate_at_boundary(text, room);
    buffer.push_str(fitted);
    fitted.len()
}

/// Replace the contents of `buffer` with `text`, truncated to `capacity` bytes.
pub fn set_bounded(buffer: &mut String, text: &str, capacity: usize) {
    buffer.clear();
    push_bounded(buffer, text, capacity);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate_at_boundary("hello", 3), "hel");
        assert_eq!(truncate_at_boundary("hello", 10), "hello");
        assert_eq!(truncate_at_boundary("hello", 0), "");
    }

    #[test]
    fn test_truncate_multibyte() {
        // 'é' is two bytes; cutting in the middle backs off to the boundary
        assert_eq!(truncate_at_boundary("aé", 2), "a");
        assert_eq!(truncate_at_boundary("aé", 3), "aé");
    }

    #[test]
    fn test_push_bounded() {
        let mut buffer = String::from("abc");
        assert_eq!(push_bounded(&mut buffer, "defgh", 5), 2);
        assert_eq!(buffer, "abcde");
        assert_eq!(push_bounded(&mut buffer, "x", 5), 0);
        assert_eq!(buffer, "abcde");
    }

    #[test]
    fn test_set_bounded() {
        let mut buffer = String::from("old contents");
        set_bounded(&mut buffer, "new", 2);
        assert_eq!(buffer, "ne");
    }
}
