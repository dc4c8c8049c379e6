//! Ahead-of-use validation of catalog contents.
//!
//! Expressions and templates are otherwise only checked when a key is first
//! resolved. Running [`validate_catalog`] after loading surfaces authoring
//! defects for every key at once.

use std::fmt;

use crate::catalog::{Branch, Catalog, Conditional, Node};
use crate::parser::{ExpressionSyntaxError, compile_expression, parse_template};

/// How serious an issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// The entry can resolve, but may fail for some parameters.
    Warning,
    /// Resolving the entry will fail.
    Error,
}

/// What is wrong with an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// An arm expression does not parse.
    ExpressionSyntax {
        arm: usize,
        error: ExpressionSyntaxError,
    },
    /// A template has an unterminated placeholder. `arm` is `None` for leaf
    /// templates and conditional defaults.
    MalformedTemplate {
        arm: Option<usize>,
        template: String,
        offset: usize,
    },
    /// A conditional has no arms.
    EmptyConditional,
    /// A conditional has no default and its last arm is not `true`, so some
    /// parameters may match nothing.
    MissingDefault,
}

/// A problem found in one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogIssue {
    pub locale: String,
    pub key: String,
    pub kind: IssueKind,
}

impl CatalogIssue {
    pub fn severity(&self) -> Severity {
        match self.kind {
            IssueKind::MissingDefault => Severity::Warning,
            IssueKind::ExpressionSyntax { .. }
            | IssueKind::MalformedTemplate { .. }
            | IssueKind::EmptyConditional => Severity::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }
}

impl fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: '{}': ", self.locale, self.key)?;
        match &self.kind {
            IssueKind::ExpressionSyntax { arm, error } => write!(f, "arm {arm}: {error}"),
            IssueKind::MalformedTemplate {
                arm: Some(arm),
                offset,
                ..
            } => write!(f, "arm {arm}: unterminated placeholder at byte {offset}"),
            IssueKind::MalformedTemplate {
                arm: None, offset, ..
            } => write!(f, "unterminated placeholder at byte {offset}"),
            IssueKind::EmptyConditional => write!(f, "conditional has no arms"),
            IssueKind::MissingDefault => write!(
                f,
                "conditional has no default and its last arm is not 'true'"
            ),
        }
    }
}

/// Check every entry of every locale, in locale then document order.
///
/// # Example
///
/// ```
/// use lexa::{Catalog, NestedValue, build_root, validate_catalog};
///
/// let value: NestedValue = serde_json::from_str(r#"{ "broken": "Hello {name" }"#).unwrap();
/// let catalog = Catalog::new().with_locale("en", build_root(&value).unwrap());
/// let issues = validate_catalog(&catalog);
/// assert_eq!(issues.len(), 1);
/// assert_eq!(issues[0].key, "broken");
/// ```
pub fn validate_catalog(catalog: &Catalog) -> Vec<CatalogIssue> {
    let mut issues = Vec::new();
    for locale in catalog.locales() {
        if let Some(root) = catalog.root(locale) {
            let mut linter = Linter {
                locale,
                path: Vec::new(),
                issues: &mut issues,
            };
            linter.branch(root);
        }
    }
    issues
}

struct Linter<'a> {
    locale: &'a str,
    path: Vec<&'a str>,
    issues: &'a mut Vec<CatalogIssue>,
}

impl<'a> Linter<'a> {
    fn branch(&mut self, branch: &'a Branch) {
        for (segment, node) in branch.iter() {
            self.path.push(segment);
            match node {
                Node::Branch(nested) => self.branch(nested),
                Node::Leaf(template) => self.template(None, template),
                Node::Conditional(conditional) => self.conditional(conditional),
            }
            self.path.pop();
        }
    }

    fn conditional(&mut self, conditional: &Conditional) {
        if conditional.arms.is_empty() {
            self.report(IssueKind::EmptyConditional);
        }
        for (index, arm) in conditional.arms.iter().enumerate() {
            if let Err(error) = compile_expression(&arm.when) {
                self.report(IssueKind::ExpressionSyntax { arm: index, error });
            }
            self.template(Some(index), &arm.template);
        }
        match &conditional.default {
            Some(default) => self.template(None, default),
            None => {
                let catch_all = conditional
                    .arms
                    .last()
                    .is_some_and(|arm| arm.when.trim() == "true");
                if !conditional.arms.is_empty() && !catch_all {
                    self.report(IssueKind::MissingDefault);
                }
            }
        }
    }

    fn template(&mut self, arm: Option<usize>, template: &str) {
        if let Err(error) = parse_template(template) {
            self.report(IssueKind::MalformedTemplate {
                arm,
                template: template.to_string(),
                offset: error.offset,
            });
        }
    }

    fn report(&mut self, kind: IssueKind) {
        self.issues.push(CatalogIssue {
            locale: self.locale.to_string(),
            key: self.path.join("."),
            kind,
        });
    }
}
