//! Loading property sources from TOML, JSON and YAML documents
//!
//! Nested tables are flattened to dotted keys (`server.port`) and arrays
//! to indexed keys (`hosts[0]`).

use crate::error::LoadError;
use crate::source::MapPropertySource;
use indexmap::IndexMap;
use serde_json::Value;
use std::path::Path;

/// Document format of a property file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// `.toml`
    Toml,
    /// `.json`
    Json,
    /// `.yaml` / `.yml`
    Yaml,
}

impl SourceFormat {
    /// Detect format from file extension
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Load a property file into a source named `name`
///
/// # Errors
/// Fails on IO errors, unknown extensions, invalid documents, or a
/// document whose root is not a table
pub fn load_source(name: impl Into<String>, path: impl AsRef<Path>) -> Result<MapPropertySource, LoadError> {
    let path = path.as_ref();
    let format =
        SourceFormat::from_path(path).ok_or_else(|| LoadError::UnsupportedFormat(path.to_path_buf()))?;
    let text = std::fs::read_to_string(path).map_err(|e| LoadError::io_error(path, e))?;

    let source = parse_source(name, format, &text)?;
    tracing::debug!(
        source = %crate::PropertySource::name(&source),
        path = %path.display(),
        properties = source.len(),
        "loaded property source"
    );
    Ok(source)
}

/// Parse a property document held in memory
///
/// # Errors
/// Fails on invalid documents or a non-table root
pub fn parse_source(
    name: impl Into<String>,
    format: SourceFormat,
    text: &str,
) -> Result<MapPropertySource, LoadError> {
    let name = name.into();
    let document: Value = match format {
        SourceFormat::Toml => toml::from_str(text)?,
        SourceFormat::Json => serde_json::from_str(text)?,
        SourceFormat::Yaml => serde_yaml::from_str(text)?,
    };

    let Value::Object(root) = document else {
        return Err(LoadError::NotATable(name));
    };

    let mut properties = IndexMap::new();
    for (key, value) in root {
        flatten(key, value, &mut properties);
    }
    Ok(MapPropertySource::new(name, properties))
}

fn flatten(prefix: String, value: Value, out: &mut IndexMap<String, Value>) {
    match value {
        Value::Object(map) => {
            for (key, value) in map {
                flatten(format!("{prefix}.{key}"), value, out);
            }
        }
        Value::Array(items) => {
            for (index, value) in items.into_iter().enumerate() {
                flatten(format!("{prefix}[{index}]"), value, out);
            }
        }
        scalar => {
            out.insert(prefix, scalar);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::PropertySource;
    use serde_json::json;

    #[test]
    fn format_from_extension() {
        assert_eq!(SourceFormat::from_path(Path::new("a.toml")), Some(SourceFormat::Toml));
        assert_eq!(SourceFormat::from_path(Path::new("a.YML")), Some(SourceFormat::Yaml));
        assert_eq!(SourceFormat::from_path(Path::new("a.json")), Some(SourceFormat::Json));
        assert_eq!(SourceFormat::from_path(Path::new("a.ini")), None);
        assert_eq!(SourceFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn toml_tables_flatten_to_dotted_keys() {
        let text = r#"
            name = "demo"

            [server]
            port = 8080
            hosts = ["a", "b"]

            [server.tls]
            enabled = true
        "#;
        let source = parse_source("file", SourceFormat::Toml, text).unwrap();

        assert_eq!(source.get_property("name"), Some(&json!("demo")));
        assert_eq!(source.get_property("server.port"), Some(&json!(8080)));
        assert_eq!(source.get_property("server.hosts[1]"), Some(&json!("b")));
        assert_eq!(source.get_property("server.tls.enabled"), Some(&json!(true)));
    }

    #[test]
    fn yaml_and_json_flatten_alike() {
        let yaml = parse_source("y", SourceFormat::Yaml, "db:\n  url: jdbc\n  pool: 4\n").unwrap();
        let json = parse_source("j", SourceFormat::Json, r#"{"db": {"url": "jdbc", "pool": 4}}"#).unwrap();
        assert_eq!(yaml.properties(), json.properties());
    }

    #[test]
    fn non_table_root_rejected() {
        let err = parse_source("list", SourceFormat::Json, "[1, 2]").unwrap_err();
        assert!(matches!(err, LoadError::NotATable(name) if name == "list"));
    }

    #[test]
    fn invalid_document_rejected() {
        assert!(matches!(
            parse_source("bad", SourceFormat::Toml, "= nope"),
            Err(LoadError::InvalidToml(_))
        ));
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.toml");
        std::fs::write(&path, "port = 1\n").unwrap();

        let source = load_source("app", &path).unwrap();
        assert_eq!(source.get_property("port"), Some(&json!(1)));

        let missing = dir.path().join("missing.toml");
        assert!(matches!(load_source("x", &missing), Err(LoadError::Io { .. })));

        let unknown = dir.path().join("app.ini");
        assert!(matches!(load_source("x", &unknown), Err(LoadError::UnsupportedFormat(_))));
    }
}
