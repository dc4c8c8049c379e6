pub mod catalog;
pub mod interpreter;
pub mod parser;
pub mod types;

pub use catalog::{Catalog, NestedValue, build_root, load_nested_file};
pub use interpreter::{
    CacheStats, CatalogIssue, Engine, EngineConfig, EscapeSet, LoadError, ResolveError,
    ResolveOptions, compute_suggestions, validate_catalog,
};
pub use parser::{ExpressionSyntaxError, SyntaxReason};
pub use types::{ParamSnapshot, Value};

/// Creates a `HashMap<String, Value>` from key-value pairs.
///
/// Values are converted via `Into<Value>`, so you can pass integers, floats,
/// booleans or strings directly.
///
/// # Example
///
/// ```
/// use lexa::{params, Value};
///
/// let p = params! { "count" => 3, "name" => "Alice" };
/// assert_eq!(p.len(), 2);
/// assert_eq!(p["count"].as_integer(), Some(3));
/// assert_eq!(p["name"].as_string(), Some("Alice"));
/// ```
#[macro_export]
macro_rules! params {
    {} => {
        ::std::collections::HashMap::<String, $crate::Value>::new()
    };
    { $($key:expr => $value:expr),+ $(,)? } => {
        {
            let mut map = ::std::collections::HashMap::<String, $crate::Value>::new();
            $(
                map.insert($key.to_string(), ::std::convert::Into::<$crate::Value>::into($value));
            )+
            map
        }
    };
}
