//! propsrc Context
//!
//! Explicit composition-time wiring on top of `propsrc-core`.
//!
//! # Core Concepts
//!
//! - [`ComponentRegistry`]: uniquely-named component definitions
//! - [`Capability`] / [`Bootstrap`]: features that register infrastructure
//!   components, enabled once
//! - [`FeatureSpecification`] / [`ExecutorResolver`]: configuration
//!   described by value, applied by executors registered per kind
//! - [`AdvisedTarget`] / [`AutoAdvisor`]: ordered interceptor chains
//!   around [`Target`]s
//! - [`CacheInterceptor`]: result caching driven by a [`CacheOperationSource`]
//!
//! # Example
//!
//! ```rust
//! use propsrc_context::{
//!     Bootstrap, CapabilityMetadata, ComponentRegistry, SchedulingCapability,
//!     SCHEDULED_PROCESSOR_NAME,
//! };
//! use std::sync::Arc;
//!
//! let mut bootstrap = Bootstrap::new();
//! bootstrap
//!     .enable(Arc::new(SchedulingCapability), CapabilityMetadata::new("AppConfig"))
//!     .unwrap();
//!
//! let mut registry = ComponentRegistry::new();
//! bootstrap.apply(&mut registry).unwrap();
//! assert!(registry.contains(SCHEDULED_PROCESSOR_NAME));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod cache;
mod capability;
mod component;
mod error;
mod intercept;
mod specification;

// Re-exports
pub use cache::{
    CacheInterceptor, CacheKey, CacheOperation, CacheOperationSource, NameMatchCacheOperationSource,
    DEFAULT_CACHE_CAPACITY,
};
pub use capability::{
    Bootstrap, Capability, CapabilityMetadata, CapabilityRegistration, SchedulingCapability,
    SCHEDULED_PROCESSOR_KIND, SCHEDULED_PROCESSOR_NAME,
};
pub use component::{ComponentDefinition, ComponentRegistry, ComponentRole};
pub use error::{ContextError, InvalidSpecification, InvocationError};
pub use intercept::{
    AdvisedTarget, Advisor, AdvisorSource, AutoAdvisor, CallCountingTransactionManager,
    CountingBeforeAdvice, Interceptor, Invocation, LazyInitTarget, LockMixin, MatchAllPointcut,
    MethodPointcut, Next, NopInterceptor, PrototypeTarget, RegexpMethodPointcut, RollbackRules,
    Target, TransactionInterceptor, TransactionManager, TransactionStatus, LOCKED_KIND,
};
pub use specification::{
    ExecutorContext, ExecutorFactory, ExecutorResolver, FeatureSpecification,
    PropertySourceExecutor, PropertySourceSpecification, SpecificationExecutor,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
