use std::collections::HashMap;

use super::Value;

/// Canonical, order-independent view of caller-supplied parameters.
///
/// A snapshot is the parameter mapping sorted by name. Two logically identical
/// parameter sets always produce equal snapshots (and equal hashes), which is
/// what makes them usable as part of a cache key.
///
/// # Example
///
/// ```
/// use lexa::{ParamSnapshot, Value};
///
/// let a = ParamSnapshot::from_pairs([("b", Value::from(2)), ("a", Value::from(1))]);
/// let b = ParamSnapshot::from_pairs([("a", Value::from(1)), ("b", Value::from(2))]);
/// assert_eq!(a, b);
/// assert_eq!(a.get("a"), Some(&Value::Integer(1)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ParamSnapshot {
    entries: Vec<(String, Value)>,
}

impl ParamSnapshot {
    /// Returns an empty snapshot.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot from a parameter map.
    pub fn from_map(params: &HashMap<String, Value>) -> Self {
        Self::from_pairs(params.iter().map(|(k, v)| (k.clone(), v.clone())))
    }

    /// Build a snapshot from `(name, value)` pairs.
    ///
    /// If a name appears more than once, the last occurrence wins, matching
    /// map insertion semantics.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut entries: Vec<(String, Value)> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        // Stable sort keeps insertion order among equal names, so the dedup
        // below can keep the last one.
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let mut deduped: Vec<(String, Value)> = Vec::with_capacity(entries.len());
        for (name, value) in entries {
            match deduped.last_mut() {
                Some(last) if last.0 == name => last.1 = value,
                _ => deduped.push((name, value)),
            }
        }
        Self { entries: deduped }
    }

    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .binary_search_by(|(k, _)| k.as_str().cmp(name))
            .ok()
            .map(|idx| &self.entries[idx].1)
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<&HashMap<String, Value>> for ParamSnapshot {
    fn from(params: &HashMap<String, Value>) -> Self {
        Self::from_map(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_names_keep_last_value() {
        let snapshot = ParamSnapshot::from_pairs([
            ("a", Value::from(1)),
            ("b", Value::from(2)),
            ("a", Value::from(3)),
        ]);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("a"), Some(&Value::Integer(3)));
    }

    #[test]
    fn entries_are_sorted_by_name() {
        let snapshot = ParamSnapshot::from_pairs([
            ("zeta", Value::from(1)),
            ("alpha", Value::from(2)),
            ("mid", Value::from(3)),
        ]);
        let names: Vec<&str> = snapshot.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }
}
