//! Immutable, locale-scoped translation catalogs.
//!
//! A [`Catalog`] maps locale identifiers to root [`Branch`]es. Catalogs are
//! never mutated in place: every load produces a new catalog with a higher
//! generation number, which the engine swaps in atomically.

mod build;
mod loader;
mod nested;
mod node;

use std::collections::BTreeMap;
use std::sync::Arc;

pub use build::{CONDITIONAL_KEY, DEFAULT_KEY, build_root};
pub use loader::{Format, load_nested_file, parse_nested_str};
pub use nested::NestedValue;
pub use node::{Arm, Branch, Conditional, Node};

/// A snapshot of every loaded locale's translation tree.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    locales: BTreeMap<String, Arc<Branch>>,
    generation: u64,
}

impl Catalog {
    /// Create an empty catalog at generation 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic counter identifying this catalog version.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Root branch for a locale, if loaded.
    pub fn root(&self, locale: &str) -> Option<&Branch> {
        self.locales.get(locale).map(Arc::as_ref)
    }

    /// Whether a locale has been loaded.
    pub fn has_locale(&self, locale: &str) -> bool {
        self.locales.contains_key(locale)
    }

    /// Loaded locale identifiers, sorted.
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.locales.keys().map(String::as_str)
    }

    /// Every dotted key that resolves to a leaf or conditional, in document
    /// order. Returns an empty list for unknown locales.
    pub fn keys(&self, locale: &str) -> Vec<String> {
        let mut keys = Vec::new();
        if let Some(root) = self.root(locale) {
            collect_keys(root, &mut Vec::new(), &mut keys);
        }
        keys
    }

    /// Return a new catalog with `locale`'s tree replaced by `root`.
    ///
    /// Other locales are shared with `self`, not copied.
    pub fn with_locale(&self, locale: impl Into<String>, root: Branch) -> Catalog {
        let mut locales = self.locales.clone();
        locales.insert(locale.into(), Arc::new(root));
        Catalog {
            locales,
            generation: self.generation + 1,
        }
    }

    /// Number of terminal keys in a locale; 0 for unknown locales.
    pub fn key_count(&self, locale: &str) -> usize {
        self.root(locale).map_or(0, Branch::terminal_count)
    }

    /// Return the same locales stamped with a different generation.
    pub(crate) fn with_generation(mut self, generation: u64) -> Catalog {
        self.generation = generation;
        self
    }

    /// Return a new catalog without `locale`.
    pub fn without_locale(&self, locale: &str) -> Catalog {
        let mut locales = self.locales.clone();
        locales.remove(locale);
        Catalog {
            locales,
            generation: self.generation + 1,
        }
    }
}

fn collect_keys(branch: &Branch, prefix: &mut Vec<String>, out: &mut Vec<String>) {
    for (segment, child) in branch.iter() {
        prefix.push(segment.to_string());
        match child {
            Node::Branch(nested) => collect_keys(nested, prefix, out),
            Node::Leaf(_) | Node::Conditional(_) => out.push(prefix.join(".")),
        }
        prefix.pop();
    }
}
