//! Placeholder substitution.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::interpreter::ResolveError;
use crate::parser::{Segment, Template, parse_template};
use crate::types::{ParamSnapshot, Value};

/// Characters to rewrite in string parameter values before insertion.
///
/// Only parameter values are escaped; template text is trusted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EscapeSet {
    replacements: BTreeMap<char, String>,
}

impl EscapeSet {
    /// Leave values untouched.
    pub fn none() -> Self {
        Self::default()
    }

    /// Escape `& < > " '` as HTML entities.
    pub fn html() -> Self {
        Self::none()
            .with('&', "&amp;")
            .with('<', "&lt;")
            .with('>', "&gt;")
            .with('"', "&quot;")
            .with('\'', "&#39;")
    }

    /// Render C0 control characters as `\u{..}` escapes.
    pub fn control() -> Self {
        ('\u{0}'..='\u{1f}').fold(Self::none(), |set, c| {
            let replacement = format!("\\u{{{:x}}}", u32::from(c));
            set.with(c, replacement)
        })
    }

    /// Add or replace the escape for one character.
    pub fn with(mut self, c: char, replacement: impl Into<String>) -> Self {
        self.replacements.insert(c, replacement.into());
        self
    }

    /// Combine two sets; entries in `other` win on conflict.
    pub fn union(&self, other: &EscapeSet) -> EscapeSet {
        let mut replacements = self.replacements.clone();
        replacements.extend(
            other
                .replacements
                .iter()
                .map(|(c, r)| (*c, r.clone())),
        );
        EscapeSet { replacements }
    }

    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }

    /// Apply the escapes to `input`, borrowing when nothing changes.
    pub fn escape<'a>(&self, input: &'a str) -> Cow<'a, str> {
        if !input.chars().any(|c| self.replacements.contains_key(&c)) {
            return Cow::Borrowed(input);
        }
        let mut out = String::with_capacity(input.len() + 8);
        for c in input.chars() {
            match self.replacements.get(&c) {
                Some(replacement) => out.push_str(replacement),
                None => out.push(c),
            }
        }
        Cow::Owned(out)
    }
}

/// Replace every `{name}` in `template` with its parameter value.
///
/// # Errors
///
/// - [`ResolveError::MalformedTemplate`] if a `{` is never closed
/// - [`ResolveError::UnresolvedVariable`] if a placeholder has no parameter
///
/// # Example
///
/// ```
/// use lexa::interpreter::{EscapeSet, substitute};
/// use lexa::ParamSnapshot;
///
/// let params = ParamSnapshot::from_pairs([("name", "Alice")]);
/// let text = substitute("Hello, {name}!", &params, &EscapeSet::none()).unwrap();
/// assert_eq!(text, "Hello, Alice!");
/// ```
pub fn substitute(
    template: &str,
    params: &ParamSnapshot,
    escape: &EscapeSet,
) -> Result<String, ResolveError> {
    let parsed = parse_template(template).map_err(|e| ResolveError::MalformedTemplate {
        template: template.to_string(),
        offset: e.offset,
    })?;
    render(&parsed, params, escape)
}

/// Render an already tokenized template.
pub fn render(
    template: &Template,
    params: &ParamSnapshot,
    escape: &EscapeSet,
) -> Result<String, ResolveError> {
    let mut out = String::new();
    for segment in &template.segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Placeholder(name) => {
                let value = params
                    .get(name)
                    .ok_or_else(|| ResolveError::UnresolvedVariable { name: name.clone() })?;
                match value {
                    Value::String(s) => out.push_str(&escape.escape(s)),
                    other => {
                        let _ = write!(out, "{other}");
                    }
                }
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_escapes_only_listed_characters() {
        assert_eq!(
            EscapeSet::html().escape("<b>Tom & \"Jerry\"</b>"),
            "&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;"
        );
        assert!(matches!(EscapeSet::html().escape("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn control_escapes_c0() {
        assert_eq!(EscapeSet::control().escape("a\u{1b}b\n"), "a\\u{1b}b\\u{a}");
    }

    #[test]
    fn union_prefers_right_hand_side() {
        let set = EscapeSet::html().union(&EscapeSet::none().with('&', "and"));
        assert_eq!(set.escape("a & <b>"), "a and &lt;b&gt;");
    }

    #[test]
    fn non_string_values_render_plainly() {
        let params = ParamSnapshot::from_pairs([
            ("n", Value::Integer(-3)),
            ("f", Value::Float(0.1)),
            ("b", Value::Boolean(true)),
        ]);
        let text = substitute("{n} {f} {b}", &params, &EscapeSet::html()).unwrap();
        assert_eq!(text, "-3 0.1 true");
    }
}
