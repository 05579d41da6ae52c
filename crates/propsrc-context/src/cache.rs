//! Declarative result caching around invocations
//!
//! Provides:
//! - [`CacheOperationSource`]: decides which cache operation applies to a method
//! - [`NameMatchCacheOperationSource`]: method-name patterns to operations
//! - [`CacheInterceptor`]: stores results in bounded `moka` caches

use crate::error::InvocationError;
use crate::intercept::{Interceptor, Invocation, Next};
use moka::sync::Cache;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Default number of entries per named cache
pub const DEFAULT_CACHE_CAPACITY: u64 = 1_000;

/// What to do with a cache around a call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheOperation {
    /// Return the cached result if present, store it otherwise
    Cacheable {
        /// Cache name
        cache_name: String,
    },
    /// Drop cached results after the call succeeds
    Evict {
        /// Cache name
        cache_name: String,
        /// Drop every entry rather than those cached for the same arguments
        all_entries: bool,
    },
}

impl CacheOperation {
    /// Create a cacheable operation
    #[inline]
    #[must_use]
    pub fn cacheable(cache_name: impl Into<String>) -> Self {
        Self::Cacheable {
            cache_name: cache_name.into(),
        }
    }

    /// Create an evict operation
    #[inline]
    #[must_use]
    pub fn evict(cache_name: impl Into<String>, all_entries: bool) -> Self {
        Self::Evict {
            cache_name: cache_name.into(),
            all_entries,
        }
    }

    /// Name of the cache this operation touches
    #[must_use]
    pub fn cache_name(&self) -> &str {
        match self {
            Self::Cacheable { cache_name } | Self::Evict { cache_name, .. } => cache_name,
        }
    }
}

/// Source of cache operations for methods
pub trait CacheOperationSource: Debug + Send + Sync {
    /// Operation for `method`, if any
    ///
    /// `target_type` is `None` when the caller has no target in hand.
    fn cache_operation(&self, method: &str, target_type: Option<&str>) -> Option<CacheOperation>;
}

/// Maps method-name patterns to operations
///
/// A pattern is an exact name, or contains `*` at its start, its end or
/// both. Exact names win over wildcards; among wildcards the longest
/// pattern wins.
#[derive(Debug, Clone, Default)]
pub struct NameMatchCacheOperationSource {
    operations: Vec<(String, CacheOperation)>,
}

impl NameMatchCacheOperationSource {
    /// Create empty source
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `pattern` to `operation`
    #[must_use]
    pub fn with_method(mut self, pattern: impl Into<String>, operation: CacheOperation) -> Self {
        let pattern = pattern.into();
        self.operations.retain(|(existing, _)| *existing != pattern);
        self.operations.push((pattern, operation));
        self
    }

    fn is_match(method: &str, pattern: &str) -> bool {
        match (pattern.strip_prefix('*'), pattern.strip_suffix('*')) {
            _ if pattern == "*" => true,
            (Some(rest), _) if rest.ends_with('*') => method.contains(&rest[..rest.len() - 1]),
            (Some(suffix), None) => method.ends_with(suffix),
            (None, Some(prefix)) => method.starts_with(prefix),
            _ => method == pattern,
        }
    }
}

impl CacheOperationSource for NameMatchCacheOperationSource {
    fn cache_operation(&self, method: &str, _target_type: Option<&str>) -> Option<CacheOperation> {
        if let Some((_, op)) = self.operations.iter().find(|(pattern, _)| pattern == method) {
            return Some(op.clone());
        }
        self.operations
            .iter()
            .filter(|(pattern, _)| pattern.contains('*') && Self::is_match(method, pattern))
            .max_by_key(|(pattern, _)| pattern.len())
            .map(|(_, op)| op.clone())
    }
}

/// Cache entry key
///
/// Results are keyed by method and arguments, so methods sharing a cache
/// never see each other's results.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    method: String,
    args: String,
}

impl CacheKey {
    /// Key for `invocation`
    #[must_use]
    pub fn for_invocation(invocation: &Invocation) -> Self {
        Self {
            method: invocation.method().to_string(),
            args: Value::Array(invocation.args().to_vec()).to_string(),
        }
    }

    /// Method name
    #[inline]
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Arguments rendered as a JSON array
    #[inline]
    #[must_use]
    pub fn args(&self) -> &str {
        &self.args
    }
}

/// Caches invocation results per operation
///
/// A single-entry evict drops the entries cached for the same arguments,
/// whichever method produced them.
#[derive(Debug)]
pub struct CacheInterceptor {
    source: Arc<dyn CacheOperationSource>,
    capacity: u64,
    caches: Mutex<HashMap<String, Cache<CacheKey, Value>>>,
}

impl CacheInterceptor {
    /// Create interceptor with the default capacity
    #[inline]
    #[must_use]
    pub fn new(source: Arc<dyn CacheOperationSource>) -> Self {
        Self::with_capacity(source, DEFAULT_CACHE_CAPACITY)
    }

    /// Create interceptor bounding each named cache to `capacity` entries
    #[must_use]
    pub fn with_capacity(source: Arc<dyn CacheOperationSource>, capacity: u64) -> Self {
        Self {
            source,
            capacity,
            caches: Mutex::new(HashMap::new()),
        }
    }

    /// Named cache, created on first use
    #[must_use]
    pub fn cache(&self, name: &str) -> Cache<CacheKey, Value> {
        self.caches
            .lock()
            .entry(name.to_string())
            .or_insert_with(|| Cache::new(self.capacity))
            .clone()
    }
}

impl Interceptor for CacheInterceptor {
    fn intercept(&self, invocation: &Invocation, next: Next<'_>) -> Result<Value, InvocationError> {
        let Some(operation) = self
            .source
            .cache_operation(invocation.method(), Some(next.target_type()))
        else {
            return next.proceed(invocation);
        };

        let cache = self.cache(operation.cache_name());
        let key = CacheKey::for_invocation(invocation);
        match operation {
            CacheOperation::Cacheable { .. } => {
                if let Some(hit) = cache.get(&key) {
                    tracing::trace!(method = key.method(), args = key.args(), "cache hit");
                    return Ok(hit);
                }
                let value = next.proceed(invocation)?;
                cache.insert(key, value.clone());
                Ok(value)
            }
            CacheOperation::Evict { all_entries, .. } => {
                let value = next.proceed(invocation)?;
                if all_entries {
                    cache.invalidate_all();
                } else {
                    for (cached, _) in &cache {
                        if cached.args() == key.args() {
                            cache.invalidate(cached.as_ref());
                        }
                    }
                }
                Ok(value)
            }
        }
    }
}
