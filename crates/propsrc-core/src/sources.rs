//! Precedence-ordered list of property sources

use crate::registry::{Named, OrderedNamedRegistry};
use crate::source::PropertySource;
use serde_json::Value;
use std::sync::Arc;

/// Ordered property sources; the first source defining a key wins
pub type PropertySources = OrderedNamedRegistry<Arc<dyn PropertySource>>;

impl OrderedNamedRegistry<Arc<dyn PropertySource>> {
    /// Value of `key` from the highest-precedence source defining it
    #[must_use]
    pub fn get_property(&self, key: &str) -> Option<&Value> {
        self.find_property(key).map(|(_, value)| value)
    }

    /// Like [`get_property`](Self::get_property), also naming the source
    #[must_use]
    pub fn find_property(&self, key: &str) -> Option<(&str, &Value)> {
        self.iter().find_map(|source| {
            let value = source.get_property(key)?;
            tracing::trace!(key, source = source.name(), "found key in property source");
            Some((Named::name(source), value))
        })
    }

    /// Check if any source defines `key`
    #[must_use]
    pub fn contains_property(&self, key: &str) -> bool {
        self.iter().any(|source| source.contains_property(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MapPropertySource;
    use serde_json::json;

    fn sources() -> PropertySources {
        let mut sources = PropertySources::new();
        sources.add_last(Arc::new(
            MapPropertySource::empty("defaults")
                .with_property("port", 80)
                .with_property("host", "example.org"),
        ));
        sources.add_first(Arc::new(
            MapPropertySource::empty("overrides").with_property("port", 8080),
        ));
        sources
    }

    #[test]
    fn first_source_wins() {
        let sources = sources();
        assert_eq!(sources.get_property("port"), Some(&json!(8080)));
        assert_eq!(sources.find_property("host"), Some(("defaults", &json!("example.org"))));
        assert!(sources.get_property("missing").is_none());
    }

    #[test]
    fn reordering_changes_precedence() {
        let mut sources = sources();
        let defaults = sources.take("defaults").unwrap();
        sources.add_first(defaults);
        assert_eq!(sources.get_property("port"), Some(&json!(80)));
    }

    #[test]
    fn contains_property_spans_sources() {
        let sources = sources();
        assert!(sources.contains_property("host"));
        assert!(!sources.contains_property("path"));
    }
}
