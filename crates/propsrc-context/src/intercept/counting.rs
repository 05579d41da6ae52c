//! Small stateful interceptors

use super::{Interceptor, Invocation, Next};
use crate::error::InvocationError;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Error kind raised by [`LockMixin`] for setters on a locked target
pub const LOCKED_KIND: &str = "LockedException";

/// Passes every call through, counting them
#[derive(Debug, Default)]
pub struct NopInterceptor {
    count: AtomicUsize,
}

impl NopInterceptor {
    /// Create new interceptor
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls seen so far
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl Interceptor for NopInterceptor {
    fn intercept(&self, invocation: &Invocation, next: Next<'_>) -> Result<Value, InvocationError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        next.proceed(invocation)
    }
}

/// Counts calls per method before proceeding
#[derive(Debug, Default)]
pub struct CountingBeforeAdvice {
    counts: Mutex<HashMap<String, usize>>,
}

impl CountingBeforeAdvice {
    /// Create new advice
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls across all methods
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.lock().values().sum()
    }

    /// Calls to `method`
    #[must_use]
    pub fn count_for(&self, method: &str) -> usize {
        self.counts.lock().get(method).copied().unwrap_or(0)
    }
}

impl Interceptor for CountingBeforeAdvice {
    fn intercept(&self, invocation: &Invocation, next: Next<'_>) -> Result<Value, InvocationError> {
        *self
            .counts
            .lock()
            .entry(invocation.method().to_string())
            .or_insert(0) += 1;
        next.proceed(invocation)
    }
}

/// Adds `lock`, `unlock` and `locked` to a target
///
/// While locked, any `set*` call fails with [`LOCKED_KIND`]. Holds per-target
/// state, so register it through a per-target advisor factory.
#[derive(Debug, Default)]
pub struct LockMixin {
    locked: AtomicBool,
}

impl LockMixin {
    /// Create new unlocked mixin
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check lock state
    #[inline]
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::SeqCst)
    }
}

impl Interceptor for LockMixin {
    fn intercept(&self, invocation: &Invocation, next: Next<'_>) -> Result<Value, InvocationError> {
        match invocation.method() {
            "lock" => {
                self.locked.store(true, Ordering::SeqCst);
                Ok(Value::Null)
            }
            "unlock" => {
                self.locked.store(false, Ordering::SeqCst);
                Ok(Value::Null)
            }
            "locked" => Ok(Value::Bool(self.is_locked())),
            method if method.starts_with("set") && self.is_locked() => Err(InvocationError::new(
                LOCKED_KIND,
                format!("{}.{method} called while locked", next.target_type()),
            )),
            _ => next.proceed(invocation),
        }
    }
}
