//! Transaction demarcation around invocations
//!
//! [`TransactionInterceptor`] begins a transaction before the call and
//! commits or rolls back afterwards. A failing call rolls back unless its
//! error kind is listed in the [`RollbackRules`]; a successful call still
//! rolls back if the invocation was marked rollback-only.

use super::{Interceptor, Invocation, Next};
use crate::error::InvocationError;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Handle for one begun transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionStatus {
    id: usize,
}

impl TransactionStatus {
    /// Create status with id
    #[inline]
    #[must_use]
    pub fn new(id: usize) -> Self {
        Self { id }
    }

    /// Transaction id
    #[inline]
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }
}

/// Begins and completes transactions
pub trait TransactionManager: Debug + Send + Sync {
    /// Begin a transaction
    fn begin(&self) -> TransactionStatus;

    /// Commit `status`
    fn commit(&self, status: TransactionStatus);

    /// Roll back `status`
    fn rollback(&self, status: TransactionStatus);
}

/// Manager that only counts what it was asked to do
#[derive(Debug, Default)]
pub struct CallCountingTransactionManager {
    begun: AtomicUsize,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
}

impl CallCountingTransactionManager {
    /// Create new manager
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Transactions begun
    #[inline]
    #[must_use]
    pub fn begun(&self) -> usize {
        self.begun.load(Ordering::SeqCst)
    }

    /// Transactions committed
    #[inline]
    #[must_use]
    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    /// Transactions rolled back
    #[inline]
    #[must_use]
    pub fn rollbacks(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }
}

impl TransactionManager for CallCountingTransactionManager {
    fn begin(&self) -> TransactionStatus {
        TransactionStatus::new(self.begun.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn commit(&self, _status: TransactionStatus) {
        self.commits.fetch_add(1, Ordering::SeqCst);
    }

    fn rollback(&self, _status: TransactionStatus) {
        self.rollbacks.fetch_add(1, Ordering::SeqCst);
    }
}

/// Error kinds that commit instead of rolling back
#[derive(Debug, Clone, Default)]
pub struct RollbackRules {
    no_rollback_for: HashSet<String>,
}

impl RollbackRules {
    /// Roll back on every error
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit when a call fails with `kind`
    #[must_use]
    pub fn no_rollback_for(mut self, kind: impl Into<String>) -> Self {
        self.no_rollback_for.insert(kind.into());
        self
    }

    /// Check if `error` should roll back
    #[must_use]
    pub fn rolls_back_on(&self, error: &InvocationError) -> bool {
        !self.no_rollback_for.contains(error.kind())
    }
}

/// Wraps each call in a transaction
#[derive(Debug)]
pub struct TransactionInterceptor<M> {
    manager: M,
    rules: RollbackRules,
}

impl<M: TransactionManager> TransactionInterceptor<M> {
    /// Create interceptor with default rules
    #[inline]
    #[must_use]
    pub fn new(manager: M) -> Self {
        Self::with_rules(manager, RollbackRules::new())
    }

    /// Create interceptor with `rules`
    #[inline]
    #[must_use]
    pub fn with_rules(manager: M, rules: RollbackRules) -> Self {
        Self { manager, rules }
    }

    /// Transaction manager
    #[inline]
    #[must_use]
    pub fn manager(&self) -> &M {
        &self.manager
    }
}

impl<M: TransactionManager> Interceptor for TransactionInterceptor<M> {
    fn intercept(&self, invocation: &Invocation, next: Next<'_>) -> Result<Value, InvocationError> {
        let status = self.manager.begin();
        let result = next.proceed(invocation);

        let rollback = match &result {
            Err(error) => self.rules.rolls_back_on(error),
            Ok(_) => invocation.is_rollback_only(),
        };
        if rollback {
            tracing::debug!(method = invocation.method(), tx = status.id(), "rolling back");
            self.manager.rollback(status);
        } else {
            tracing::debug!(method = invocation.method(), tx = status.id(), "committing");
            self.manager.commit(status);
        }
        result
    }
}
