//! Parameter store abstraction
//!
//! The store is the only point of contact with the remote hierarchical
//! key-value service. Implementations return every parameter whose name equals
//! the queried prefix or is nested under it by `/`, in any order. An empty
//! result means "nothing there"; errors mean the store itself failed.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::value::Value;

/// A single parameter returned by a store query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Fully qualified name, e.g. `/app/prod/db/host`
    pub name: String,
    /// Raw string value
    pub value: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Trait for parameter store implementations
pub trait ParameterStore: Send + Sync {
    /// Fetch all parameters equal to or nested under `prefix`
    fn query(&self, prefix: &str) -> Result<Vec<Parameter>>;

    /// Get the name of this store (used in error messages)
    fn name(&self) -> &str;
}

/// Check whether `name` equals `prefix` or sits below it in the `/` hierarchy
pub fn is_under(name: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return name.starts_with('/');
    }
    match name.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// An in-memory parameter store
///
/// Useful for tests and for resolving configuration offline from a local
/// parameters file.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    parameters: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a parameter
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parameters.insert(name.into(), value.into());
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Build a store from a flat mapping of parameter names to scalars
    ///
    /// ```yaml
    /// /app/prod/db/host: db.internal
    /// /app/prod/db/port: 5432
    /// ```
    ///
    /// Numbers and booleans are stored in their string form. Nested values and
    /// names that don't start with `/` are rejected.
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = value.as_mapping().ok_or_else(|| {
            Error::parse(format!(
                "Parameters file must be a mapping of names to values, got {}",
                value.type_name()
            ))
        })?;

        let mut store = Self::new();
        for (name, v) in map {
            if !name.starts_with('/') {
                return Err(Error::parse(format!(
                    "Parameter name must start with /: {}",
                    name
                )));
            }
            let raw = match v {
                Value::String(s) => s.clone(),
                Value::Integer(_) | Value::Float(_) | Value::Bool(_) => v.to_string(),
                other => {
                    return Err(Error::parse(format!(
                        "Parameter '{}' must be a scalar, got {}",
                        name,
                        other.type_name()
                    )))
                }
            };
            store.insert(name.clone(), raw);
        }
        Ok(store)
    }
}

impl ParameterStore for MemoryStore {
    fn query(&self, prefix: &str) -> Result<Vec<Parameter>> {
        Ok(self
            .parameters
            .iter()
            .filter(|(name, _)| is_under(name, prefix))
            .map(|(name, value)| Parameter::new(name.clone(), value.clone()))
            .collect())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
