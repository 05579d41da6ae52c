//! Method pointcuts

use regex::Regex;
use std::fmt::Debug;

/// Decides which methods an advisor applies to
pub trait MethodPointcut: Debug + Send + Sync {
    /// Check if `method` on a target of `target_type` matches
    fn matches(&self, method: &str, target_type: &str) -> bool;
}

/// Matches every method
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchAllPointcut;

impl MethodPointcut for MatchAllPointcut {
    fn matches(&self, _method: &str, _target_type: &str) -> bool {
        true
    }
}

/// Matches `Type.method` against a set of regular expressions
///
/// Each pattern must match the whole qualified name.
#[derive(Debug, Clone)]
pub struct RegexpMethodPointcut {
    patterns: Vec<Regex>,
}

impl RegexpMethodPointcut {
    /// Compile `patterns`
    ///
    /// # Errors
    /// Returns the first pattern that fails to compile
    pub fn new(patterns: &[&str]) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|pattern| Regex::new(&format!("^(?:{pattern})$")))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }
}

impl MethodPointcut for RegexpMethodPointcut {
    fn matches(&self, method: &str, target_type: &str) -> bool {
        let qualified = format!("{target_type}.{method}");
        self.patterns.iter().any(|re| re.is_match(&qualified))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_qualified_name() {
        let pointcut = RegexpMethodPointcut::new(&[".*get.*", "Rollback\\.echo.*"]).unwrap();
        assert!(pointcut.matches("getName", "TestBean"));
        assert!(pointcut.matches("echoException", "Rollback"));
        assert!(!pointcut.matches("setAge", "TestBean"));
        assert!(!pointcut.matches("echoException", "TestBean"));
    }

    #[test]
    fn patterns_are_anchored() {
        let pointcut = RegexpMethodPointcut::new(&["TestBean\\.get"]).unwrap();
        assert!(!pointcut.matches("getName", "TestBean"));
        assert!(pointcut.matches("get", "TestBean"));
    }

    #[test]
    fn invalid_pattern_rejected() {
        assert!(RegexpMethodPointcut::new(&["("]).is_err());
    }

    #[test]
    fn match_all() {
        assert!(MatchAllPointcut.matches("anything", "Any"));
    }
}
