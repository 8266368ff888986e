//! Configuration tree values
//!
//! A configuration tree is a scalar (string, integer, float, bool, null),
//! a sequence, or a mapping with string keys. Placeholders live in string
//! leaves; injection produces a new tree of the same shape.

use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// A node of a configuration tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// Null value
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// String value (may be a placeholder like `aws-ssm://app/db/host`)
    String(String),
    /// Sequence of values
    Sequence(Vec<Value>),
    /// Mapping of string keys to values
    Mapping(IndexMap<String, Value>),
}

impl Value {
    /// Create an empty mapping
    pub fn mapping() -> Self {
        Value::Mapping(IndexMap::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get as boolean if this is a Bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i64 if this is an Integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as str if this is a String
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as slice if this is a Sequence
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(s) => Some(s),
            _ => None,
        }
    }

    /// Get as mapping if this is a Mapping
    pub fn as_mapping(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// True for an empty string or an empty mapping
    ///
    /// These are the shapes a parent-probe lookup produces when the requested
    /// leaf does not exist.
    pub fn is_empty_result(&self) -> bool {
        match self {
            Value::String(s) => s.is_empty(),
            Value::Mapping(m) => m.is_empty(),
            _ => false,
        }
    }

    /// Look up a value by dotted path (`database.host`, `servers[0].name`).
    ///
    /// The empty path is the value itself.
    pub fn get_path(&self, path: &str) -> Result<&Value> {
        let mut current = self;
        for step in path_steps(path)? {
            let next = match (step, current) {
                (PathStep::Key(key), Value::Mapping(map)) => map.get(key),
                (PathStep::Index(i), Value::Sequence(seq)) => seq.get(i),
                _ => None,
            };
            current = next.ok_or_else(|| path_not_found(path))?;
        }
        Ok(current)
    }

    /// Returns the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }

    /// Deep-merge `overlay` into this value.
    ///
    /// Mappings merge key by key; a `null` in the overlay deletes the key.
    /// Any other combination replaces this value with the overlay.
    pub fn merge(&mut self, overlay: Value) {
        match (self, overlay) {
            (Value::Mapping(base), Value::Mapping(overlay)) => merge_mappings(base, overlay),
            (slot, overlay) => *slot = overlay,
        }
    }
}

fn merge_mappings(base: &mut IndexMap<String, Value>, overlay: IndexMap<String, Value>) {
    for (key, value) in overlay {
        if value.is_null() {
            base.shift_remove(&key);
            continue;
        }
        match base.entry(key) {
            Entry::Occupied(mut slot) => slot.get_mut().merge(value),
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
        }
    }
}

fn path_not_found(path: &str) -> Error {
    Error::parse(format!("Path '{}' not found in configuration", path))
        .with_help(format!("Check that '{}' exists in the configuration", path))
}

/// Scalars print bare; sequences and mappings print as compact JSON.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Sequence(_) | Value::Mapping(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Sequence(v.into_iter().map(Into::into).collect())
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(m: IndexMap<String, Value>) -> Self {
        Value::Mapping(m)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PathStep<'a> {
    Key(&'a str),
    Index(usize),
}

/// Split `servers[0].name` into `servers`, `[0]`, `name`.
fn path_steps(path: &str) -> Result<Vec<PathStep<'_>>> {
    let mut steps = Vec::new();

    for part in path.split('.').filter(|p| !p.is_empty()) {
        let (key, mut indexes) = part.split_at(part.find('[').unwrap_or(part.len()));
        if key.contains(']') {
            return Err(Error::parse(format!("Unexpected ']' in path: {}", path)));
        }
        if !key.is_empty() {
            steps.push(PathStep::Key(key));
        }

        while !indexes.is_empty() {
            let (index, rest) = indexes
                .strip_prefix('[')
                .and_then(|r| r.split_once(']'))
                .ok_or_else(|| Error::parse(format!("Unclosed '[' in path: {}", path)))?;
            let index = index.parse::<usize>().map_err(|_| {
                Error::parse(format!("Invalid sequence index in path: {}", index))
            })?;
            steps.push(PathStep::Index(index));
            indexes = rest;
        }
    }

    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn service_config() -> Value {
        let yaml = r#"
service:
  name: billing
  hosts:
    - aws-ssm://billing/primary
    - aws-ssm://billing/replica
  port: 8443
"#;
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_path_steps() {
        assert_eq!(
            path_steps("service.hosts[1].name").unwrap(),
            vec![
                PathStep::Key("service"),
                PathStep::Key("hosts"),
                PathStep::Index(1),
                PathStep::Key("name"),
            ]
        );
        assert_eq!(
            path_steps("matrix[0][2]").unwrap(),
            vec![PathStep::Key("matrix"), PathStep::Index(0), PathStep::Index(2)]
        );
        assert!(path_steps("").unwrap().is_empty());
    }

    #[test]
    fn test_path_steps_reject_bad_index() {
        assert!(path_steps("hosts[x]").is_err());
        assert!(path_steps("hosts]").is_err());
        assert!(path_steps("hosts[0").is_err());
    }

    #[test]
    fn test_get_path_through_sequence() {
        let value = service_config();

        assert_eq!(
            value.get_path("service.hosts[1]").unwrap().as_str(),
            Some("aws-ssm://billing/replica")
        );
        assert_eq!(value.get_path("service.port").unwrap().as_i64(), Some(8443));
        assert!(value.get_path("service.missing").is_err());
        assert!(value.get_path("service.hosts[5]").is_err());
    }

    #[test]
    fn test_yaml_scalars_deserialize_to_variants() {
        let value: Value = serde_yaml::from_str("a: true\nb: 1.5\nc: ~\nd: '42'").unwrap();
        let map = value.as_mapping().unwrap();

        assert_eq!(map["a"], Value::Bool(true));
        assert_eq!(map["b"], Value::Float(1.5));
        assert_eq!(map["c"], Value::Null);
        assert_eq!(map["d"], Value::String("42".into()));
    }

    #[test]
    fn test_empty_result_shapes() {
        assert!(Value::String(String::new()).is_empty_result());
        assert!(Value::mapping().is_empty_result());
        assert!(!Value::from("one").is_empty_result());
        assert!(!Value::Null.is_empty_result());
    }

    #[test]
    fn test_merge_overlays_environment_file() {
        let mut base = service_config();
        let overlay: Value = serde_yaml::from_str(
            "service:\n  hosts:\n    - aws-ssm://billing/staging\n  port: ~\n  debug: true",
        )
        .unwrap();

        base.merge(overlay);

        let hosts = base.get_path("service.hosts").unwrap().as_sequence().unwrap();
        assert_eq!(hosts.len(), 1);
        assert_eq!(base.get_path("service.name").unwrap().as_str(), Some("billing"));
        assert_eq!(base.get_path("service.debug").unwrap().as_bool(), Some(true));
        assert!(base.get_path("service.port").is_err());
    }

    #[test]
    fn test_display_mapping() {
        let value: Value = serde_yaml::from_str("key: true\nlist: [1, two]").unwrap();
        assert_eq!(value.to_string(), r#"{"key":true,"list":[1,"two"]}"#);
        assert_eq!(Value::from("plain").to_string(), "plain");
    }
}
