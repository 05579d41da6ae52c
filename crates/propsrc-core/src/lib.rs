//! propsrc Core
//!
//! Uniquely-named, precedence-ordered property sources.
//!
//! # Core Concepts
//!
//! - [`OrderedNamedRegistry`]: ordered list of uniquely-named entries with
//!   positional insert/replace/remove
//! - [`PropertySource`]: named bag of configuration values
//! - [`PropertySources`]: the registry specialised to property sources
//! - [`PropertyResolver`]: typed lookups and `${key:default}` expansion
//! - [`load_source`]: read TOML/JSON/YAML files into sources
//!
//! # Example
//!
//! ```rust
//! use propsrc_core::{MapPropertySource, PropertyResolver, PropertySources};
//! use std::sync::Arc;
//!
//! let mut sources = PropertySources::new();
//! sources.add_last(Arc::new(MapPropertySource::empty("defaults").with_property("port", 80)));
//! sources.add_first(Arc::new(MapPropertySource::empty("cli").with_property("port", 8080)));
//!
//! let resolver = PropertyResolver::new(&sources);
//! assert_eq!(resolver.get_as::<u16>("port").unwrap(), Some(8080));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod loader;
mod registry;
mod resolver;
mod source;
mod sources;

// Re-exports
pub use error::{LoadError, RegistryError, ResolveError};
pub use loader::{load_source, parse_source, SourceFormat};
pub use registry::{Entry, Named, OrderedNamedRegistry, Position};
pub use resolver::PropertyResolver;
pub use source::{
    EnvironmentPropertySource, MapPropertySource, PropertySource,
    SYSTEM_ENVIRONMENT_PROPERTY_SOURCE_NAME,
};
pub use sources::PropertySources;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn environment_overrides_file_defaults() {
        let file = parse_source("application", SourceFormat::Toml, "[server]\nport = 80\n").unwrap();
        let env = EnvironmentPropertySource::from_vars(
            SYSTEM_ENVIRONMENT_PROPERTY_SOURCE_NAME,
            [("SERVER_PORT", "9000")],
        );

        let mut sources = PropertySources::new();
        sources.add_last(Arc::new(file));
        sources.add_first(Arc::new(env));

        assert_eq!(sources.get_property("server.port"), Some(&json!("9000")));

        sources.remove(SYSTEM_ENVIRONMENT_PROPERTY_SOURCE_NAME);
        let resolver = PropertyResolver::new(&sources);
        assert_eq!(resolver.get_as::<u16>("server.port").unwrap(), Some(80));
    }
}
