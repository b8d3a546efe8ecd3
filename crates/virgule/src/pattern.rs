//! Route pattern compilation
//!
//! Turns pattern strings like `/users/:id`, `/files/*path`, or
//! `/report(/full)` into typed segments plus a validating regex.
//! All functions are **pure**: same input → same output, no side effects.
//!
//! The segment list drives trie construction; the regex is a secondary
//! full-path validator used for diagnostics only. The trie walk is
//! authoritative for matching and parameter extraction, and the two agree
//! for well-formed patterns.

use regex::Regex;
use thiserror::Error;

/// One matchable unit of a route pattern
///
/// Produced by [`split`] scanning the pattern left to right.
///
/// # Examples
///
/// ```
/// use virgule::pattern::{split, Segment};
///
/// let segments = split("/users/:id").unwrap();
/// assert_eq!(segments[0], Segment::Literal("users".to_string()));
/// assert_eq!(segments[1], Segment::Param("id".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Static text segment: `users`
    Literal(String),
    /// Named single-segment parameter: `:id`
    Param(String),
    /// Greedy remainder-of-path capture: `*path`
    Splat(String),
    /// Optional trailing group: `(/full)` — inner segments may be absent
    OptionalGroup(Vec<Segment>),
}

/// Errors raised while scanning a route pattern
///
/// These never surface to request handling; registration logs and skips
/// patterns that fail to compile.
#[derive(Debug, Error)]
pub enum PatternError {
    /// An opening `(` with no matching `)`
    #[error("unclosed optional group in pattern `{0}`")]
    UnclosedGroup(String),
    /// A `:` or `*` marker not followed by a parameter name
    #[error("`{marker}` without a name in pattern `{pattern}`")]
    MissingName { pattern: String, marker: char },
    /// The generated validator failed to compile (should not happen for
    /// patterns that pass scanning)
    #[error("invalid validator for pattern `{pattern}`: {source}")]
    Validator {
        pattern: String,
        source: regex::Error,
    },
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Splits a route pattern into an ordered list of segments
///
/// Scans for four alternatives, in priority order: an optional group
/// `(...)`, a named parameter `:name`, a splat `*name`, or a plain literal
/// run. Each match consumes exactly one token; literal runs are broken on
/// `/` into individual segments and empty segments are dropped.
///
/// # Examples
///
/// ```
/// use virgule::pattern::{split, Segment};
///
/// let segments = split("/files/*path").unwrap();
/// assert_eq!(segments, vec![
///     Segment::Literal("files".to_string()),
///     Segment::Splat("path".to_string()),
/// ]);
///
/// // A marker with no name is a configuration error
/// assert!(split("/users/:").is_err());
/// ```
pub fn split(pattern: &str) -> Result<Vec<Segment>, PatternError> {
    let mut segments = Vec::new();
    let mut rest = pattern;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('(') {
            let close = after
                .find(')')
                .ok_or_else(|| PatternError::UnclosedGroup(pattern.to_string()))?;
            let inner = split(&after[..close])?;
            segments.push(Segment::OptionalGroup(inner));
            rest = &after[close + 1..];
        } else if let Some(after) = rest.strip_prefix(':') {
            let (name, remainder) = take_name(after);
            if name.is_empty() {
                return Err(PatternError::MissingName {
                    pattern: pattern.to_string(),
                    marker: ':',
                });
            }
            segments.push(Segment::Param(name.to_string()));
            rest = remainder;
        } else if let Some(after) = rest.strip_prefix('*') {
            let (name, remainder) = take_name(after);
            if name.is_empty() {
                return Err(PatternError::MissingName {
                    pattern: pattern.to_string(),
                    marker: '*',
                });
            }
            segments.push(Segment::Splat(name.to_string()));
            rest = remainder;
        } else {
            // Literal run: everything up to the next token marker
            let end = rest
                .find(|c| matches!(c, '(' | ':' | '*'))
                .unwrap_or(rest.len());
            for piece in rest[..end].split('/').filter(|s| !s.is_empty()) {
                segments.push(Segment::Literal(piece.to_string()));
            }
            rest = &rest[end..];
        }
    }

    Ok(segments)
}

fn take_name(input: &str) -> (&str, &str) {
    let end = input.find(|c| !is_name_char(c)).unwrap_or(input.len());
    (&input[..end], &input[end..])
}

/// Compiles a route pattern into a full-path validating regex
///
/// Named parameters become a single-segment capture, splats a greedy
/// multi-segment capture, and optional trailing groups a non-capturing
/// optional group. The result is anchored at the start and tolerant of a
/// trailing query suffix.
///
/// This validator is advisory: dispatch uses it only to flag disagreement
/// with the trie walk.
///
/// # Examples
///
/// ```
/// use virgule::pattern::compile;
///
/// let validator = compile("/users/:id").unwrap();
/// assert!(validator.is_match("/users/42"));
/// assert!(validator.is_match("/users/42?tab=posts"));
/// assert!(!validator.is_match("/users/42/extra"));
/// ```
pub fn compile(pattern: &str) -> Result<Regex, PatternError> {
    let segments = split(pattern)?;
    let mut source = String::from("^");
    render(&segments, &mut source);
    source.push_str(r"/?(?:\?.*)?$");

    Regex::new(&source).map_err(|source| PatternError::Validator {
        pattern: pattern.to_string(),
        source,
    })
}

fn render(segments: &[Segment], out: &mut String) {
    for segment in segments {
        match segment {
            Segment::Literal(text) => {
                out.push('/');
                out.push_str(&regex::escape(text));
            }
            Segment::Param(_) => out.push_str("/([^/]+)"),
            Segment::Splat(_) => out.push_str("/(.+)"),
            Segment::OptionalGroup(inner) => {
                out.push_str("(?:");
                render(inner, out);
                out.push_str(")?");
            }
        }
    }
}
