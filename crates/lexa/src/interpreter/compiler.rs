//! Memoizing front end for the expression parser.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

use crate::parser::{CompiledExpression, ExpressionSyntaxError, compile_expression};

/// Compiles conditional expressions, memoizing results by exact source.
///
/// The memo is a bounded LRU separate from the resolution cache. Failed
/// compilations are not memoized. A capacity of 0 compiles on every call.
#[derive(Debug)]
pub struct ExpressionCompiler {
    cache: Option<Mutex<LruCache<String, Arc<CompiledExpression>>>>,
}

impl ExpressionCompiler {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
        }
    }

    /// Compile `source`, returning a shared tree.
    ///
    /// Parsing happens outside the lock; two threads compiling the same new
    /// source at once may both parse it, and the later insert wins.
    pub fn compile(&self, source: &str) -> Result<Arc<CompiledExpression>, ExpressionSyntaxError> {
        let Some(cache) = &self.cache else {
            return compile_expression(source).map(Arc::new);
        };
        if let Some(hit) = cache.lock().get(source) {
            return Ok(Arc::clone(hit));
        }
        let compiled = Arc::new(compile_expression(source)?);
        cache.lock().put(source.to_string(), Arc::clone(&compiled));
        Ok(compiled)
    }

    /// Number of memoized expressions.
    pub fn len(&self) -> usize {
        self.cache.as_ref().map_or(0, |cache| cache.lock().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Some(cache) = &self.cache {
            cache.lock().clear();
        }
    }
}

impl Default for ExpressionCompiler {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_sources_share_one_tree() {
        let compiler = ExpressionCompiler::new(4);
        let a = compiler.compile("age >= 18").unwrap();
        let b = compiler.compile("age >= 18").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(compiler.len(), 1);
    }

    #[test]
    fn memo_is_bounded() {
        let compiler = ExpressionCompiler::new(2);
        compiler.compile("a = 1").unwrap();
        compiler.compile("a = 2").unwrap();
        compiler.compile("a = 3").unwrap();
        assert_eq!(compiler.len(), 2);
    }

    #[test]
    fn zero_capacity_disables_memo() {
        let compiler = ExpressionCompiler::new(0);
        let a = compiler.compile("x").unwrap();
        let b = compiler.compile("x").unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(compiler.is_empty());
    }

    #[test]
    fn failures_are_not_memoized() {
        let compiler = ExpressionCompiler::new(4);
        assert!(compiler.compile("a >").is_err());
        assert!(compiler.is_empty());
    }
}
