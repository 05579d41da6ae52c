//! Error types for composition-time wiring and advised invocations

use propsrc_core::RegistryError;

/// Composition errors
///
/// All variants are configuration errors; none are retried.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    /// Component name already taken
    #[error("component named '{0}' is already registered")]
    DuplicateComponent(String),

    /// Capability enabled twice, or its component already exists
    #[error("{0}")]
    CapabilityConflict(String),

    /// Specification failed its own validation
    #[error(transparent)]
    InvalidSpecification(#[from] InvalidSpecification),

    /// No executor registered for a specification kind
    #[error("no executor registered for specification kind '{0}'")]
    NoExecutorRegistered(String),

    /// Executor kind registered twice
    #[error("executor for specification kind '{0}' is already registered")]
    DuplicateExecutor(String),

    /// Executor received a specification of another kind
    #[error("executor '{executor}' cannot handle specification kind '{kind}'")]
    UnsupportedSpecification {
        /// Executor name
        executor: &'static str,
        /// Kind of the specification passed in
        kind: String,
    },

    /// Positional mutation of an ordered registry failed
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// A feature specification rejected its own configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid specification: {0}")]
pub struct InvalidSpecification(pub String);

/// Failure raised by an invoked target or interceptor
///
/// `kind` plays the role of an exception type: rollback rules and tests
/// match on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct InvocationError {
    kind: String,
    message: String,
}

impl InvocationError {
    /// Kind raised for methods a target does not expose
    pub const NO_SUCH_METHOD: &'static str = "NoSuchMethod";

    /// Create new invocation error
    #[inline]
    #[must_use]
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Error for an unknown method
    #[must_use]
    pub fn no_such_method(target_type: &str, method: &str) -> Self {
        Self::new(Self::NO_SUCH_METHOD, format!("{target_type} has no method '{method}'"))
    }

    /// Error classification
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Human-readable message
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_error_is_transparent() {
        let err: ContextError = RegistryError::ReferenceNotFound("x".to_string()).into();
        assert_eq!(err.to_string(), "PropertySource named 'x' does not exist");
    }

    #[test]
    fn invocation_error_display() {
        let err = InvocationError::no_such_method("TestBean", "fly");
        assert_eq!(err.kind(), InvocationError::NO_SUCH_METHOD);
        assert_eq!(err.to_string(), "NoSuchMethod: TestBean has no method 'fly'");
    }

    #[test]
    fn invalid_specification_converts() {
        let err: ContextError = InvalidSpecification("missing name".to_string()).into();
        assert!(matches!(err, ContextError::InvalidSpecification(_)));
        assert_eq!(err.to_string(), "invalid specification: missing name");
    }
}
