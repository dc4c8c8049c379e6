//! The user-facing resolution engine.
//!
//! [`Engine`] owns the current [`Catalog`], the resolution cache and the
//! compiled-expression cache. It is `Send + Sync`: share it by reference or
//! behind an `Arc`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bon::Builder;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::catalog::{Branch, Catalog, NestedValue, Node, build_root, load_nested_file};
use crate::interpreter::cache::{CacheKey, CacheStats, ResolutionCache};
use crate::interpreter::compiler::ExpressionCompiler;
use crate::interpreter::error::{LoadError, ResolveError};
use crate::interpreter::evaluator::select_branch;
use crate::interpreter::path::{split_key, walk_segments};
use crate::interpreter::substitute::{EscapeSet, substitute};
use crate::types::{ParamSnapshot, Value};

/// Engine-wide settings.
///
/// # Example
///
/// ```
/// use lexa::{EngineConfig, EscapeSet};
///
/// let config = EngineConfig::builder()
///     .default_locale("de")
///     .fallback_locale("en")
///     .escape(EscapeSet::html())
///     .build();
/// assert!(config.strict);
/// assert_eq!(config.cache_capacity, 1024);
/// ```
#[derive(Debug, Clone, Builder)]
pub struct EngineConfig {
    /// Locale used by [`Engine::get`].
    #[builder(into, default = "en".to_string())]
    pub default_locale: String,

    /// Whether lookup failures are returned as errors. When false, a missing
    /// or invalid key resolves to the key itself.
    #[builder(default = true)]
    pub strict: bool,

    /// Locale to retry in when the requested one has no answer.
    #[builder(into)]
    pub fallback_locale: Option<String>,

    /// Maximum number of resolved strings kept. 0 disables the cache.
    #[builder(default = 1024)]
    pub cache_capacity: usize,

    /// Number of independently locked cache shards.
    #[builder(default = 8)]
    pub cache_shards: usize,

    /// Maximum number of compiled expressions kept. 0 disables memoization.
    #[builder(default = 256)]
    pub compiled_expr_cache_capacity: usize,

    /// Escapes applied to string parameter values.
    #[builder(default)]
    pub escape: EscapeSet,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig::builder().build()
    }
}

/// Per-call resolution policy.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct ResolveOptions {
    #[builder(default = true)]
    pub strict: bool,
    #[builder(into)]
    pub fallback_locale: Option<String>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        ResolveOptions::builder().build()
    }
}

impl ResolveOptions {
    /// Non-strict options with no fallback.
    pub fn lenient() -> Self {
        ResolveOptions::builder().strict(false).build()
    }
}

/// Resolves translation keys against an atomically swappable catalog.
///
/// # Example
///
/// ```
/// use lexa::{Engine, NestedValue, params};
///
/// let engine = Engine::new();
/// let catalog: NestedValue = serde_json::from_str(r#"{
///     "greeting": "Hello, {name}!",
///     "age": {
///         "$conditional": [
///             { "when": "age >= 18", "text": "Adult" },
///             { "when": "age >= 0", "text": "Minor" }
///         ]
///     }
/// }"#).unwrap();
/// engine.load_catalog("en", &catalog).unwrap();
///
/// let greeting = engine.resolve("greeting", "en", &params! { "name" => "Alice" });
/// assert_eq!(greeting.unwrap(), "Hello, Alice!");
/// assert_eq!(engine.resolve("age", "en", &params! { "age" => 25 }).unwrap(), "Adult");
/// ```
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    defaults: ResolveOptions,
    catalog: RwLock<Arc<Catalog>>,
    /// File paths for reload support: locale -> path.
    ///
    /// Holding this lock also serializes catalog writers, so two loads never
    /// build on the same base catalog.
    loaded_paths: Mutex<HashMap<String, PathBuf>>,
    results: ResolutionCache,
    expressions: ExpressionCompiler,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::with_config(EngineConfig::default())
    }
}

impl Engine {
    /// Create an engine with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let defaults = ResolveOptions {
            strict: config.strict,
            fallback_locale: config.fallback_locale.clone(),
        };
        Self {
            results: ResolutionCache::with_shards(config.cache_capacity, config.cache_shards),
            expressions: ExpressionCompiler::new(config.compiled_expr_cache_capacity),
            catalog: RwLock::new(Arc::new(Catalog::new())),
            loaded_paths: Mutex::new(HashMap::new()),
            defaults,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // =========================================================================
    // Locale Management
    // =========================================================================

    pub fn default_locale(&self) -> &str {
        &self.config.default_locale
    }

    /// Change the locale used by [`get`](Self::get).
    ///
    /// The locale does not need to be loaded yet.
    pub fn set_default_locale(&mut self, locale: impl Into<String>) {
        self.config.default_locale = locale.into();
    }

    // =========================================================================
    // Catalog Loading
    // =========================================================================

    /// The catalog currently in use.
    ///
    /// The returned snapshot stays valid and unchanged even if a reload
    /// happens meanwhile.
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog.read())
    }

    /// Replace the whole catalog. Returns the generation it was installed as.
    ///
    /// Remembered file paths are forgotten, so no locale can be reloaded until
    /// it is loaded from a file again.
    pub fn install_catalog(&self, catalog: Catalog) -> u64 {
        let mut paths = self.loaded_paths.lock();
        paths.clear();
        let generation = self.catalog().generation() + 1;
        self.swap(catalog.with_generation(generation));
        generation
    }

    /// Build a locale's tree from `value` and install it, replacing any tree
    /// previously loaded for that locale. Returns the number of keys.
    ///
    /// On error nothing changes. A locale loaded this way cannot be reloaded
    /// with [`reload_catalog`](Self::reload_catalog).
    pub fn load_catalog(&self, locale: &str, value: &NestedValue) -> Result<usize, LoadError> {
        let root = build_root(value)?;
        let mut paths = self.loaded_paths.lock();
        paths.remove(locale);
        Ok(self.replace_locale(locale, root))
    }

    /// Deep-merge `value` over the locale's current tree.
    ///
    /// Branches present on both sides merge child by child; any other
    /// collision is won by `value`. Loading into an empty locale behaves like
    /// [`load_catalog`](Self::load_catalog).
    pub fn extend_catalog(&self, locale: &str, value: &NestedValue) -> Result<usize, LoadError> {
        let overlay = build_root(value)?;
        let _writer = self.loaded_paths.lock();
        let merged = match self.catalog().root(locale) {
            Some(base) => base.merge(&overlay),
            None => overlay,
        };
        Ok(self.replace_locale(locale, merged))
    }

    /// Load a locale from a JSON, YAML or TOML file.
    ///
    /// The path is remembered for [`reload_catalog`](Self::reload_catalog).
    pub fn load_catalog_file(
        &self,
        locale: &str,
        path: impl AsRef<Path>,
    ) -> Result<usize, LoadError> {
        let path = path.as_ref();
        let root = build_root(&load_nested_file(path)?)?;
        let mut paths = self.loaded_paths.lock();
        paths.insert(locale.to_string(), path.to_path_buf());
        Ok(self.replace_locale(locale, root))
    }

    /// Re-read a locale from the file it was loaded from.
    ///
    /// If the file is now invalid, the previous tree stays installed.
    pub fn reload_catalog(&self, locale: &str) -> Result<usize, LoadError> {
        let path = self
            .loaded_paths
            .lock()
            .get(locale)
            .cloned()
            .ok_or_else(|| LoadError::NoPathForReload {
                locale: locale.to_string(),
            })?;
        self.load_catalog_file(locale, path)
    }

    /// Remove a locale. Returns whether it was loaded.
    pub fn unload_locale(&self, locale: &str) -> bool {
        let mut paths = self.loaded_paths.lock();
        paths.remove(locale);
        let current = self.catalog();
        if !current.has_locale(locale) {
            return false;
        }
        self.swap(current.without_locale(locale));
        true
    }

    /// Install `root` for `locale`. Callers must hold the writer lock.
    fn replace_locale(&self, locale: &str, root: Branch) -> usize {
        let keys = root.terminal_count();
        let next = self.catalog().with_locale(locale, root);
        debug!(locale, keys, generation = next.generation(), "loaded catalog");
        self.swap(next);
        keys
    }

    fn swap(&self, next: Catalog) {
        let generation = next.generation();
        *self.catalog.write() = Arc::new(next);
        // Entries from older generations can never be hit again.
        self.results.clear();
        debug!(generation, "installed catalog generation");
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Resolve `key` in `locale` using the engine's default policy.
    ///
    /// # Errors
    ///
    /// See [`ResolveError`]. In non-strict mode `MissingKey` and `InvalidKey`
    /// are replaced by the key itself.
    pub fn resolve(
        &self,
        key: &str,
        locale: &str,
        params: &HashMap<String, Value>,
    ) -> Result<String, ResolveError> {
        self.resolve_snapshot(key, locale, &ParamSnapshot::from_map(params), &self.defaults)
    }

    /// Resolve with explicit per-call options.
    pub fn resolve_with(
        &self,
        key: &str,
        locale: &str,
        params: &HashMap<String, Value>,
        options: &ResolveOptions,
    ) -> Result<String, ResolveError> {
        self.resolve_snapshot(key, locale, &ParamSnapshot::from_map(params), options)
    }

    /// Resolve `key` in the default locale.
    pub fn get(&self, key: &str, params: &HashMap<String, Value>) -> Result<String, ResolveError> {
        self.resolve(key, &self.config.default_locale, params)
    }

    /// Resolve with an already canonical parameter snapshot.
    pub fn resolve_snapshot(
        &self,
        key: &str,
        locale: &str,
        params: &ParamSnapshot,
        options: &ResolveOptions,
    ) -> Result<String, ResolveError> {
        let catalog = self.catalog();
        let cache_key = CacheKey {
            key: key.to_string(),
            locale: locale.to_string(),
            fallback: options.fallback_locale.clone(),
            generation: catalog.generation(),
            params: params.clone(),
        };
        let fallback = options.fallback_locale.as_deref();
        let result = self.results.get_or_try_compute(cache_key, || {
            self.resolve_uncached(&catalog, key, locale, fallback, params)
        });

        match result {
            Err(err) if !options.strict && err.is_lookup_failure() => {
                warn!(key, locale, error = %err, "translation not found, using the key");
                Ok(key.to_string())
            }
            other => other,
        }
    }

    fn resolve_uncached(
        &self,
        catalog: &Catalog,
        key: &str,
        locale: &str,
        fallback: Option<&str>,
        params: &ParamSnapshot,
    ) -> Result<String, ResolveError> {
        let primary = match self.resolve_in(catalog, key, locale, params) {
            Err(err) if err.allows_fallback() => err,
            other => return other,
        };
        let Some(fallback) = fallback.filter(|fallback| *fallback != locale) else {
            return Err(primary);
        };
        debug!(key, locale, fallback, "retrying in fallback locale");
        match self.resolve_in(catalog, key, fallback, params) {
            Ok(text) => Ok(text),
            // The caller asked about `locale`, so report its failure.
            Err(secondary) if secondary.allows_fallback() || secondary.is_lookup_failure() => {
                Err(primary)
            }
            Err(secondary) => Err(secondary),
        }
    }

    fn resolve_in(
        &self,
        catalog: &Catalog,
        key: &str,
        locale: &str,
        params: &ParamSnapshot,
    ) -> Result<String, ResolveError> {
        let segments = split_key(key)?;
        let Some(root) = catalog.root(locale) else {
            return Err(ResolveError::MissingKey {
                key: key.to_string(),
                locale: locale.to_string(),
                suggestions: Vec::new(),
            });
        };

        let template = match walk_segments(root, &segments, key, locale)? {
            Node::Leaf(template) => template.as_str(),
            Node::Conditional(conditional) => select_branch(conditional, params, &self.expressions)?
                .ok_or_else(|| ResolveError::NoMatchingBranch {
                    key: key.to_string(),
                    locale: locale.to_string(),
                })?,
            Node::Branch(_) => {
                return Err(ResolveError::MissingKey {
                    key: key.to_string(),
                    locale: locale.to_string(),
                    suggestions: Vec::new(),
                });
            }
        };
        substitute(template, params, &self.config.escape)
    }

    // =========================================================================
    // Cache Introspection
    // =========================================================================

    pub fn cache_stats(&self) -> CacheStats {
        self.results.stats()
    }

    /// Number of memoized compiled expressions.
    pub fn compiled_expression_count(&self) -> usize {
        self.expressions.len()
    }

    /// Drop all cached results and compiled expressions.
    pub fn clear_caches(&self) {
        self.results.clear();
        self.expressions.clear();
        debug!("cleared caches");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn engine_is_send_and_sync() {
        assert_send_sync::<Engine>();
    }

    #[test]
    fn config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.default_locale, "en");
        assert!(config.strict);
        assert_eq!(config.fallback_locale, None);
        assert_eq!(config.cache_capacity, 1024);
        assert_eq!(config.cache_shards, 8);
        assert_eq!(config.compiled_expr_cache_capacity, 256);
        assert_eq!(config.escape, EscapeSet::none());
    }

    #[test]
    fn install_catalog_bumps_generation() {
        let engine = Engine::new();
        let first = engine.install_catalog(Catalog::new());
        let second = engine.install_catalog(Catalog::new());
        assert!(second > first);
        assert_eq!(engine.catalog().generation(), second);
    }
}
