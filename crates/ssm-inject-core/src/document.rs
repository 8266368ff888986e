//! Loading and saving configuration documents
//!
//! Files ending in `.json` are read as JSON; everything else as YAML.
//! Multiple files are deep-merged in order, later files winning.

use std::path::Path;

use crate::error::{Error, Result};
use crate::value::Value;

/// Parse a YAML string into a configuration tree
pub fn from_yaml(yaml: &str) -> Result<Value> {
    serde_yaml::from_str(yaml).map_err(|e| Error::parse(e.to_string()))
}

/// Parse a JSON string into a configuration tree
pub fn from_json(json: &str) -> Result<Value> {
    serde_json::from_str(json).map_err(|e| Error::parse(e.to_string()))
}

/// Load a single configuration file
pub fn load_file(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::io(format!("Failed to read file '{}': {}", path.display(), e)))?;

    let parsed = if is_json(path) {
        from_json(&content)
    } else {
        from_yaml(&content)
    };

    parsed.map_err(|e| e.with_help(format!("Fix the syntax of '{}'", path.display())))
}

/// Load and merge multiple configuration files
///
/// Mappings are deep-merged, scalars and sequences from later files replace
/// earlier ones, and a `null` in a later file removes the key. An empty list
/// yields an empty mapping.
pub fn load_merged<P: AsRef<Path>>(paths: &[P]) -> Result<Value> {
    let mut merged: Option<Value> = None;

    for path in paths {
        let value = load_file(path)?;
        log::debug!("Loaded {}", path.as_ref().display());
        match &mut merged {
            Some(base) => base.merge(value),
            None => merged = Some(value),
        }
    }

    Ok(merged.unwrap_or_else(Value::mapping))
}

/// Serialize a tree as YAML
pub fn to_yaml(value: &Value) -> Result<String> {
    serde_yaml::to_string(value).map_err(|e| Error::parse(e.to_string()))
}

/// Serialize a tree as pretty-printed JSON
pub fn to_json(value: &Value) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| Error::parse(e.to_string()))
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ssm-inject-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_yaml_and_json() {
        let yaml = write_temp("load.yaml", "db:\n  host: aws-ssm://app/db/host\n");
        let json = write_temp("load.json", r#"{"db": {"port": 5432}}"#);

        assert_eq!(
            load_file(&yaml).unwrap().get_path("db.host").unwrap().as_str(),
            Some("aws-ssm://app/db/host")
        );
        assert_eq!(
            load_file(&json).unwrap().get_path("db.port").unwrap().as_i64(),
            Some(5432)
        );
    }

    #[test]
    fn test_load_merged_in_order() {
        let base = write_temp("base.yaml", "db:\n  host: localhost\n  port: 5432\nlegacy: x\n");
        let prod = write_temp("prod.yaml", "db:\n  host: aws-ssm://app/prod/db/host\nlegacy: ~\n");

        let merged = load_merged(&[base, prod]).unwrap();
        assert_eq!(
            merged,
            from_yaml("db:\n  host: aws-ssm://app/prod/db/host\n  port: 5432").unwrap()
        );
    }

    #[test]
    fn test_load_merged_empty() {
        let none: [PathBuf; 0] = [];
        assert_eq!(load_merged(&none).unwrap(), Value::mapping());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_file("/nonexistent/ssm-inject/config.yaml").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Io);
    }

    #[test]
    fn test_load_invalid_yaml() {
        let bad = write_temp("bad.yaml", "db: [unclosed\n");
        let err = load_file(&bad).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
        assert!(err.to_string().contains("bad.yaml"));
    }

    #[test]
    fn test_serialize() {
        let value = from_yaml("key: true\nname: billing").unwrap();

        assert_eq!(to_yaml(&value).unwrap(), "key: true\nname: billing\n");
        assert_eq!(
            to_json(&value).unwrap(),
            "{\n  \"key\": true,\n  \"name\": \"billing\"\n}"
        );
    }
}
