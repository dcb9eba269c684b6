//! Path escaping for request paths and CSV argument lists
//!
//! Path segments are separated by `/`. A literal `/`, `,` or escape character
//! inside a segment is written with the escape character in front of it. The
//! agent uses `!` for paths; `\` is the legacy escape and the one used for
//! comma separated values.

pub const PATH_ESCAPE: char = '!';
pub const CSV_ESCAPE: char = '\\';
pub const PATH_DELIMITER: char = '/';
pub const CSV_DELIMITER: char = ',';

/// Segment value standing for "any"
pub const WILDCARD: &str = "*";

/// Split `input` at unescaped `delimiter`s and unescape the segments.
///
/// An escape followed by another escape, the delimiter, `/` or `,` yields that
/// character. An escape before any other character is kept together with the
/// character, and a dangling escape at the end of the input stays literal.
pub fn split(input: &str, escape: char, delimiter: char) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == escape {
            match chars.peek().copied() {
                Some(next)
                    if next == escape
                        || next == delimiter
                        || next == PATH_DELIMITER
                        || next == CSV_DELIMITER =>
                {
                    current.push(next);
                    chars.next();
                }
                _ => current.push(c),
            }
        } else if c == delimiter {
            segments.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    segments.push(current);
    segments
}

/// Parse a `/` separated request path into its unescaped segments.
///
/// A leading `/` and a single trailing delimiter are ignored; `""` and `"/"`
/// are the empty path.
pub fn parse_path(path: &str) -> Vec<String> {
    let path = path.strip_prefix(PATH_DELIMITER).unwrap_or(path);
    if path.is_empty() {
        return Vec::new();
    }
    let mut segments = split(path, PATH_ESCAPE, PATH_DELIMITER);
    if segments.len() > 1 && segments.last().is_some_and(String::is_empty) {
        segments.pop();
    }
    segments
}

/// Escape one segment so it survives [`parse_path`] unchanged.
pub fn escape_path_segment(segment: &str) -> String {
    let mut escaped = String::with_capacity(segment.len());
    for c in segment.chars() {
        if c == PATH_ESCAPE || c == PATH_DELIMITER {
            escaped.push(PATH_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// Inverse of [`parse_path`] for non-empty segments
pub fn combine_to_path<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|s| escape_path_segment(s.as_ref()))
        .collect::<Vec<_>>()
        .join("/")
}

/// Split a comma separated value list using `\` as escape
pub fn split_csv(input: &str) -> Vec<String> {
    split(input, CSV_ESCAPE, CSV_DELIMITER)
}

/// Whether a path segment stands for "any value"
pub fn is_wildcard(segment: &str) -> bool {
    segment == WILDCARD
}
