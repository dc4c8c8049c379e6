//! Format-independent nested value tree handed over by catalog loaders.

use std::fmt::{Formatter, Result as FmtResult};

use serde::de::{Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};

/// A generic tree of mappings, sequences and scalars.
///
/// This is the ingestion format for catalogs: whatever source format the
/// catalog was written in (JSON, YAML, TOML, or built in code) is first
/// turned into a `NestedValue`. Mappings preserve document order, which
/// matters for conditional arms.
#[derive(Debug, Clone, PartialEq)]
pub enum NestedValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<NestedValue>),
    Mapping(Vec<(String, NestedValue)>),
}

impl NestedValue {
    /// Build a mapping from `(key, value)` pairs, preserving their order.
    pub fn mapping<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<NestedValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        NestedValue::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Short name of the value's kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            NestedValue::Null => "null",
            NestedValue::Bool(_) => "boolean",
            NestedValue::Integer(_) => "integer",
            NestedValue::Float(_) => "float",
            NestedValue::String(_) => "string",
            NestedValue::Sequence(_) => "sequence",
            NestedValue::Mapping(_) => "mapping",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            NestedValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for NestedValue {
    fn from(s: &str) -> Self {
        NestedValue::String(s.to_string())
    }
}

impl From<String> for NestedValue {
    fn from(s: String) -> Self {
        NestedValue::String(s)
    }
}

impl From<serde_json::Value> for NestedValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match value {
            Json::Null => NestedValue::Null,
            Json::Bool(b) => NestedValue::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => NestedValue::Integer(i),
                None => NestedValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => NestedValue::String(s),
            Json::Array(items) => {
                NestedValue::Sequence(items.into_iter().map(NestedValue::from).collect())
            }
            Json::Object(map) => NestedValue::Mapping(
                map.into_iter()
                    .map(|(k, v)| (k, NestedValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl<'de> Deserialize<'de> for NestedValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(NestedVisitor)
    }
}

struct NestedVisitor;

impl<'de> Visitor<'de> for NestedVisitor {
    type Value = NestedValue;

    fn expecting(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("a catalog value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<NestedValue, E> {
        Ok(NestedValue::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<NestedValue, E> {
        Ok(NestedValue::Integer(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<NestedValue, E> {
        Ok(match i64::try_from(v) {
            Ok(i) => NestedValue::Integer(i),
            Err(_) => NestedValue::Float(v as f64),
        })
    }

    fn visit_f64<E>(self, v: f64) -> Result<NestedValue, E> {
        Ok(NestedValue::Float(v))
    }

    fn visit_str<E>(self, v: &str) -> Result<NestedValue, E> {
        Ok(NestedValue::String(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<NestedValue, E> {
        Ok(NestedValue::String(v))
    }

    fn visit_unit<E>(self) -> Result<NestedValue, E> {
        Ok(NestedValue::Null)
    }

    fn visit_none<E>(self) -> Result<NestedValue, E> {
        Ok(NestedValue::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<NestedValue, D::Error>
    where
        D: Deserializer<'de>,
    {
        NestedValue::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<NestedValue, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<NestedValue>()? {
            items.push(item);
        }
        Ok(NestedValue::Sequence(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<NestedValue, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, NestedValue>()? {
            entries.push((key, value));
        }
        Ok(NestedValue::Mapping(entries))
    }
}
