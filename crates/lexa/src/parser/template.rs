//! Template string tokenizer using winnow.
//!
//! Scans a template in a single left-to-right pass. Handles:
//! - Literal text runs
//! - Placeholders: `{name}` (surrounding whitespace allowed)
//! - Escape sequences: `{{` and `}}`
//! - Braces that do not form a placeholder, which pass through unchanged
//!
//! A `{` with no `}` anywhere after it is the only syntax error.

use winnow::combinator::{alt, delimited, repeat};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{one_of, take_while};

use super::ast::{Segment, Template};
use super::error::TemplateError;

/// Parse a template string into literal and placeholder segments.
///
/// # Example
///
/// ```
/// use lexa::parser::{Segment, parse_template};
///
/// let t = parse_template("Hello, {name}!").unwrap();
/// assert_eq!(t.segments, vec![
///     Segment::Literal("Hello, ".into()),
///     Segment::Placeholder("name".into()),
///     Segment::Literal("!".into()),
/// ]);
/// ```
pub fn parse_template(input: &str) -> Result<Template, TemplateError> {
    let total = input.len();
    let last_close = input.rfind('}');
    let mut remaining = input;

    let segments: Result<Vec<Segment>, _> = repeat(0.., |i: &mut &str| {
        segment(i, total, last_close)
    })
    .parse_next(&mut remaining);

    match segments {
        Ok(segments) if remaining.is_empty() => Ok(Template {
            segments: merge_literals(segments),
        }),
        _ => Err(TemplateError {
            offset: total - remaining.len(),
        }),
    }
}

/// Merge adjacent Literal segments into single segments.
fn merge_literals(segments: Vec<Segment>) -> Vec<Segment> {
    let mut result = Vec::with_capacity(segments.len());

    for segment in segments {
        match segment {
            Segment::Literal(text) => {
                if let Some(Segment::Literal(prev)) = result.last_mut() {
                    prev.push_str(&text);
                } else {
                    result.push(Segment::Literal(text));
                }
            }
            other => result.push(other),
        }
    }

    result
}

/// Parse a single segment.
fn segment(input: &mut &str, total: usize, last_close: Option<usize>) -> ModalResult<Segment> {
    alt((
        escape_sequence,
        placeholder,
        literal_run,
        |i: &mut &str| stray_open_brace(i, total, last_close),
        '}'.value(Segment::Literal("}".to_string())),
    ))
    .parse_next(input)
}

/// Parse escape sequences: {{ -> {, }} -> }
fn escape_sequence(input: &mut &str) -> ModalResult<Segment> {
    alt((
        "{{".value(Segment::Literal("{".to_string())),
        "}}".value(Segment::Literal("}".to_string())),
    ))
    .parse_next(input)
}

/// Parse a run of text containing no braces.
fn literal_run(input: &mut &str) -> ModalResult<Segment> {
    take_while(1.., |c: char| c != '{' && c != '}')
        .map(|s: &str| Segment::Literal(s.to_string()))
        .parse_next(input)
}

/// Parse a placeholder: { name }
fn placeholder(input: &mut &str) -> ModalResult<Segment> {
    delimited(('{', ws), identifier, (ws, '}'))
        .map(|name: &str| Segment::Placeholder(name.to_string()))
        .parse_next(input)
}

/// Accept a `{` that does not start a placeholder, as long as some `}` follows
/// it. The position of the last `}` is computed once up front so that this
/// check stays constant-time.
fn stray_open_brace(
    input: &mut &str,
    total: usize,
    last_close: Option<usize>,
) -> ModalResult<Segment> {
    let offset = total - input.len();
    if input.starts_with('{') && last_close.is_none_or(|close| close < offset) {
        return Err(ErrMode::Cut(ContextError::new()));
    }
    '{'.value(Segment::Literal("{".to_string())).parse_next(input)
}

/// Parse optional whitespace.
fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_ascii_whitespace())
        .void()
        .parse_next(input)
}

/// Parse an identifier.
fn identifier<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (one_of(is_ident_start), take_while(0.., is_ident_cont))
        .take()
        .parse_next(input)
}

/// Check if a character can start an identifier.
fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

/// Check if a character can continue an identifier.
fn is_ident_cont(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
