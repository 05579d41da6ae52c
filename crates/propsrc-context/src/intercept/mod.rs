//! Explicit interceptor chains
//!
//! Behaviour is interposed around a [`Target`] by wrapping it in an
//! [`AdvisedTarget`], which is itself a `Target`. Chains are composed at
//! construction time; nothing is generated or discovered.
//!
//! # Example
//!
//! ```rust,ignore
//! let advised = AdvisedTarget::new(target)
//!     .with_advisor(Advisor::new("count", Arc::new(RegexpMethodPointcut::new(&[".*get.*"])?), counter));
//! advised.invoke(&Invocation::new("getName"))?;
//! ```

mod counting;
mod pointcut;
mod target_source;
mod transaction;

pub use counting::{CountingBeforeAdvice, LockMixin, NopInterceptor, LOCKED_KIND};
pub use pointcut::{MatchAllPointcut, MethodPointcut, RegexpMethodPointcut};
pub use target_source::{LazyInitTarget, PrototypeTarget};
pub use transaction::{
    CallCountingTransactionManager, RollbackRules, TransactionInterceptor, TransactionManager,
    TransactionStatus,
};

use crate::error::InvocationError;
use propsrc_core::{Named, OrderedNamedRegistry, Position, RegistryError};
use serde_json::Value;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A method call travelling down an interceptor chain
#[derive(Debug, Default)]
pub struct Invocation {
    method: String,
    args: Vec<Value>,
    rollback_only: AtomicBool,
}

impl Invocation {
    /// Create invocation without arguments
    #[inline]
    #[must_use]
    pub fn new(method: impl Into<String>) -> Self {
        Self::with_args(method, Vec::new())
    }

    /// Create invocation with arguments
    #[inline]
    #[must_use]
    pub fn with_args(method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            args,
            rollback_only: AtomicBool::new(false),
        }
    }

    /// Method name
    #[inline]
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Arguments
    #[inline]
    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Argument at `index`
    #[inline]
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    /// Mark the surrounding transaction for rollback
    pub fn set_rollback_only(&self) {
        self.rollback_only.store(true, Ordering::SeqCst);
    }

    /// Check if rollback was requested
    #[must_use]
    pub fn is_rollback_only(&self) -> bool {
        self.rollback_only.load(Ordering::SeqCst)
    }
}

/// Something methods can be invoked on
pub trait Target: Debug + Send + Sync {
    /// Type name used by pointcuts
    fn type_name(&self) -> &str;

    /// Methods this target exposes
    fn methods(&self) -> Vec<String>;

    /// Invoke a method
    ///
    /// # Errors
    /// Application failures, or [`InvocationError::no_such_method`]
    fn invoke(&self, invocation: &Invocation) -> Result<Value, InvocationError>;

    /// Check if calls pass through an interceptor chain
    fn is_advised(&self) -> bool {
        false
    }
}

/// Behaviour interposed around an invocation
pub trait Interceptor: Debug + Send + Sync {
    /// Handle `invocation`, usually calling `next.proceed`
    ///
    /// # Errors
    /// Propagates or raises invocation errors
    fn intercept(&self, invocation: &Invocation, next: Next<'_>) -> Result<Value, InvocationError>;
}

/// Remainder of an interceptor chain
#[derive(Clone, Copy)]
pub struct Next<'a> {
    interceptors: &'a [Arc<dyn Interceptor>],
    target: &'a dyn Target,
}

impl<'a> Next<'a> {
    /// Type name of the target at the end of the chain
    #[inline]
    #[must_use]
    pub fn target_type(&self) -> &'a str {
        self.target.type_name()
    }

    /// Continue with the next interceptor, or the target
    ///
    /// # Errors
    /// Whatever the rest of the chain returns
    pub fn proceed(self, invocation: &Invocation) -> Result<Value, InvocationError> {
        match self.interceptors.split_first() {
            Some((first, rest)) => first.intercept(
                invocation,
                Next {
                    interceptors: rest,
                    target: self.target,
                },
            ),
            None => self.target.invoke(invocation),
        }
    }
}

/// Pointcut paired with the interceptor it guards
#[derive(Debug, Clone)]
pub struct Advisor {
    name: String,
    pointcut: Arc<dyn MethodPointcut>,
    interceptor: Arc<dyn Interceptor>,
}

impl Advisor {
    /// Create new advisor
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        pointcut: Arc<dyn MethodPointcut>,
        interceptor: Arc<dyn Interceptor>,
    ) -> Self {
        Self {
            name: name.into(),
            pointcut,
            interceptor,
        }
    }

    /// Advisor applying to every method
    #[must_use]
    pub fn for_all(name: impl Into<String>, interceptor: Arc<dyn Interceptor>) -> Self {
        Self::new(name, Arc::new(MatchAllPointcut), interceptor)
    }

    /// Check if this advisor applies to `method` on `target_type`
    #[inline]
    #[must_use]
    pub fn matches(&self, method: &str, target_type: &str) -> bool {
        self.pointcut.matches(method, target_type)
    }

    /// Check if this advisor applies to any method of `target`
    #[must_use]
    pub fn applies_to(&self, target: &dyn Target) -> bool {
        target
            .methods()
            .iter()
            .any(|method| self.matches(method, target.type_name()))
    }

    /// Guarded interceptor
    #[inline]
    #[must_use]
    pub fn interceptor(&self) -> &Arc<dyn Interceptor> {
        &self.interceptor
    }
}

impl Named for Advisor {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Target wrapped in an ordered chain of advisors
///
/// Advisors are held in an [`OrderedNamedRegistry`]: the front advisor
/// sees a call first.
#[derive(Debug)]
pub struct AdvisedTarget {
    target: Arc<dyn Target>,
    advisors: OrderedNamedRegistry<Advisor>,
}

impl AdvisedTarget {
    /// Wrap `target` with no advisors
    #[must_use]
    pub fn new(target: Arc<dyn Target>) -> Self {
        Self {
            target,
            advisors: OrderedNamedRegistry::new(),
        }
    }

    /// Add advisor at `position`
    ///
    /// # Errors
    /// Propagates positional errors for relative positions
    pub fn add_advisor(&mut self, position: &Position, advisor: Advisor) -> Result<(), RegistryError> {
        self.advisors.insert_at(position, advisor)
    }

    /// Builder-style `add_advisor` at the back of the chain
    #[must_use]
    pub fn with_advisor(mut self, advisor: Advisor) -> Self {
        self.advisors.add_last(advisor);
        self
    }

    /// Remove advisor by name
    pub fn remove_advisor(&mut self, name: &str) -> bool {
        self.advisors.remove(name)
    }

    /// Advisor names, front first
    #[must_use]
    pub fn advisor_names(&self) -> Vec<&str> {
        self.advisors.names()
    }

    /// Wrapped target
    #[inline]
    #[must_use]
    pub fn target(&self) -> &Arc<dyn Target> {
        &self.target
    }

    fn chain_for(&self, method: &str) -> Vec<Arc<dyn Interceptor>> {
        let target_type = self.target.type_name();
        self.advisors
            .iter()
            .filter(|advisor| advisor.matches(method, target_type))
            .map(|advisor| Arc::clone(&advisor.interceptor))
            .collect()
    }
}

impl Target for AdvisedTarget {
    fn type_name(&self) -> &str {
        self.target.type_name()
    }

    fn methods(&self) -> Vec<String> {
        self.target.methods()
    }

    fn invoke(&self, invocation: &Invocation) -> Result<Value, InvocationError> {
        let chain = self.chain_for(invocation.method());
        tracing::trace!(
            method = invocation.method(),
            interceptors = chain.len(),
            "invoking advised target"
        );
        Next {
            interceptors: &chain,
            target: self.target.as_ref(),
        }
        .proceed(invocation)
    }

    fn is_advised(&self) -> bool {
        true
    }
}

/// How an [`AutoAdvisor`] obtains an advisor for each target
#[derive(Clone)]
pub enum AdvisorSource {
    /// Same advisor instance for every target
    Shared(Advisor),
    /// Fresh advisor per target, for stateful interceptors
    PerTarget(Arc<dyn Fn() -> Advisor + Send + Sync>),
}

impl AdvisorSource {
    fn instantiate(&self) -> Advisor {
        match self {
            Self::Shared(advisor) => advisor.clone(),
            Self::PerTarget(factory) => factory(),
        }
    }
}

impl Debug for AdvisorSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shared(advisor) => f.debug_tuple("Shared").field(&advisor.name).finish(),
            Self::PerTarget(_) => f.write_str("PerTarget(..)"),
        }
    }
}

/// Applies matching advisors to targets
///
/// A target none of whose methods match any advisor is returned bare.
/// Common advisors go in front of the specific ones, and only on targets
/// that receive at least one specific advisor.
#[derive(Debug, Clone, Default)]
pub struct AutoAdvisor {
    common: Vec<Advisor>,
    advisors: Vec<AdvisorSource>,
}

impl AutoAdvisor {
    /// Create empty auto-advisor
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add common advisor
    #[must_use]
    pub fn with_common(mut self, advisor: Advisor) -> Self {
        self.common.push(advisor);
        self
    }

    /// Add advisor shared across targets
    #[must_use]
    pub fn with_advisor(mut self, advisor: Advisor) -> Self {
        self.advisors.push(AdvisorSource::Shared(advisor));
        self
    }

    /// Add advisor created afresh for each target
    #[must_use]
    pub fn with_per_target<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Advisor + Send + Sync + 'static,
    {
        self.advisors.push(AdvisorSource::PerTarget(Arc::new(factory)));
        self
    }

    /// Wrap `target` with the advisors that apply to it
    #[must_use]
    pub fn advise(&self, target: Arc<dyn Target>) -> Arc<dyn Target> {
        let specific: Vec<Advisor> = self
            .advisors
            .iter()
            .map(AdvisorSource::instantiate)
            .filter(|advisor| advisor.applies_to(target.as_ref()))
            .collect();

        if specific.is_empty() {
            tracing::debug!(target_type = target.type_name(), "no advisors apply; leaving target bare");
            return target;
        }

        let advised = self
            .common
            .iter()
            .cloned()
            .chain(specific)
            .fold(AdvisedTarget::new(target), AdvisedTarget::with_advisor);
        tracing::debug!(
            target_type = advised.type_name(),
            advisors = ?advised.advisor_names(),
            "advised target"
        );
        Arc::new(advised)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct Echo;

    impl Target for Echo {
        fn type_name(&self) -> &str {
            "Echo"
        }

        fn methods(&self) -> Vec<String> {
            vec!["echo".to_string()]
        }

        fn invoke(&self, invocation: &Invocation) -> Result<Value, InvocationError> {
            match invocation.method() {
                "echo" => Ok(invocation.arg(0).cloned().unwrap_or(Value::Null)),
                other => Err(InvocationError::no_such_method("Echo", other)),
            }
        }
    }

    #[derive(Debug)]
    struct Tag(&'static str);

    impl Interceptor for Tag {
        fn intercept(&self, invocation: &Invocation, next: Next<'_>) -> Result<Value, InvocationError> {
            let inner = next.proceed(invocation)?;
            Ok(json!(format!("{}({})", self.0, inner.as_str().unwrap_or_default())))
        }
    }

    fn tag(name: &'static str) -> Advisor {
        Advisor::for_all(name, Arc::new(Tag(name)))
    }

    #[test]
    fn chain_runs_front_to_back() {
        let advised = AdvisedTarget::new(Arc::new(Echo))
            .with_advisor(tag("outer"))
            .with_advisor(tag("inner"));

        let result = advised
            .invoke(&Invocation::with_args("echo", vec![json!("x")]))
            .unwrap();
        assert_eq!(result, json!("outer(inner(x))"));
        assert!(advised.is_advised());
    }

    #[test]
    fn advisor_positions_reorder_chain() {
        let mut advised = AdvisedTarget::new(Arc::new(Echo)).with_advisor(tag("b"));
        advised.add_advisor(&Position::First, tag("a")).unwrap();
        advised.add_advisor(&Position::After("b".into()), tag("c")).unwrap();
        assert_eq!(advised.advisor_names(), vec!["a", "b", "c"]);

        let result = advised
            .invoke(&Invocation::with_args("echo", vec![json!("x")]))
            .unwrap();
        assert_eq!(result, json!("a(b(c(x)))"));

        assert!(advised.add_advisor(&Position::Before("zz".into()), tag("d")).is_err());
        assert!(advised.remove_advisor("b"));
        assert_eq!(advised.advisor_names(), vec!["a", "c"]);
    }

    #[test]
    fn unmatched_target_stays_bare() {
        let pointcut = Arc::new(RegexpMethodPointcut::new(&[".*\\.set.*"]).unwrap());
        let auto = AutoAdvisor::new().with_advisor(Advisor::new("tx", pointcut, Arc::new(Tag("tx"))));

        let target = auto.advise(Arc::new(Echo));
        assert!(!target.is_advised());
    }

    #[test]
    fn unknown_method_passes_through_chain() {
        let advised = AdvisedTarget::new(Arc::new(Echo)).with_advisor(tag("t"));
        let err = advised.invoke(&Invocation::new("fly")).unwrap_err();
        assert_eq!(err.kind(), InvocationError::NO_SUCH_METHOD);
    }

    #[test]
    fn rollback_flag_is_sticky() {
        let invocation = Invocation::new("m");
        assert!(!invocation.is_rollback_only());
        invocation.set_rollback_only();
        assert!(invocation.is_rollback_only());
    }
}
