//! Tree substitution
//!
//! Walks a configuration tree and replaces every placeholder string with the
//! value it references. Mappings are visited key by key and sequences element
//! by element; everything that isn't a placeholder string is copied through.
//! Substituted values are not scanned again.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::path::replace_env_placeholder;
use crate::placeholder::Placeholder;
use crate::resolve::pull_value;
use crate::store::{Parameter, ParameterStore};
use crate::value::Value;

/// Resolve every placeholder in `tree`, returning a new tree.
///
/// The first failure aborts the walk; the error carries the location of the
/// offending placeholder (e.g. `database.hosts[1]`).
pub fn inject(tree: &Value, store: &dyn ParameterStore) -> Result<Value> {
    inject_node(tree, store, "")
}

fn inject_node(node: &Value, store: &dyn ParameterStore, location: &str) -> Result<Value> {
    match node {
        Value::String(s) => match Placeholder::parse(s) {
            Some(placeholder) => {
                log::debug!("Placeholder at {}: {}", display_location(location), s);
                substitute(&placeholder, store).map_err(|e| e.with_path(display_location(location)))
            }
            None => Ok(node.clone()),
        },
        Value::Sequence(seq) => seq
            .iter()
            .enumerate()
            .map(|(i, item)| inject_node(item, store, &index_location(location, i)))
            .collect::<Result<Vec<_>>>()
            .map(Value::Sequence),
        Value::Mapping(map) => {
            let mut out = IndexMap::with_capacity(map.len());
            for (key, item) in map {
                let resolved = inject_node(item, store, &key_location(location, key))?;
                out.insert(key.clone(), resolved);
            }
            Ok(Value::Mapping(out))
        }
        _ => Ok(node.clone()),
    }
}

/// Compute the replacement for a single placeholder.
pub fn substitute(placeholder: &Placeholder, store: &dyn ParameterStore) -> Result<Value> {
    let path = replace_env_placeholder(&placeholder.path)?;

    let mut value = pull_value(store, &path)?;
    if value.is_null() {
        value = Value::String(String::new());
    }

    // A suffix wins over the JSON flag: the concatenation is returned as-is
    if let Some(suffix) = &placeholder.suffix {
        return match value {
            Value::String(mut s) => {
                s.push_str(suffix);
                Ok(Value::String(s))
            }
            other => Err(Error::type_coercion(&path, "string", other.type_name())
                .with_help(format!(
                    "'{}' resolved to a {}; a |suffix can only be appended to a single parameter",
                    path,
                    other.type_name()
                ))),
        };
    }

    if placeholder.json {
        return decode_json(&path, &value);
    }

    Ok(value)
}

/// JSON-decode a resolved value.
///
/// A decoded object whose `key` is the string "true"/"false" becomes exactly
/// `{key: <bool>}`. A document that decodes to `null` is malformed.
fn decode_json(path: &str, value: &Value) -> Result<Value> {
    let Value::String(raw) = value else {
        return Err(Error::malformed_json(
            path,
            value.to_string(),
            format!("Expected a JSON string, got {}", value.type_name()),
        ));
    };

    let parsed: Value = serde_json::from_str(raw)
        .map_err(|e| Error::malformed_json(path, raw.clone(), e.to_string()))?;
    if parsed.is_null() {
        return Err(Error::malformed_json(path, raw.clone(), "Decoded to null"));
    }

    if let Some(Value::String(flag)) = parsed.as_mapping().and_then(|m| m.get("key")) {
        if flag == "true" || flag == "false" {
            let mut normalized = IndexMap::new();
            normalized.insert("key".to_string(), Value::Bool(flag == "true"));
            return Ok(Value::Mapping(normalized));
        }
    }

    Ok(parsed)
}

/// List every placeholder in `tree` with its location, without resolving.
pub fn find_placeholders(tree: &Value) -> Vec<(String, Placeholder)> {
    let mut found = Vec::new();
    collect_placeholders(tree, "", &mut found);
    found
}

fn collect_placeholders(node: &Value, location: &str, found: &mut Vec<(String, Placeholder)>) {
    match node {
        Value::String(s) => {
            if let Some(placeholder) = Placeholder::parse(s) {
                found.push((display_location(location), placeholder));
            }
        }
        Value::Sequence(seq) => {
            for (i, item) in seq.iter().enumerate() {
                collect_placeholders(item, &index_location(location, i), found);
            }
        }
        Value::Mapping(map) => {
            for (key, item) in map {
                collect_placeholders(item, &key_location(location, key), found);
            }
        }
        _ => {}
    }
}

fn key_location(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

fn index_location(parent: &str, index: usize) -> String {
    format!("{}[{}]", parent, index)
}

fn display_location(location: &str) -> String {
    if location.is_empty() {
        "<root>".to_string()
    } else {
        location.to_string()
    }
}

/// A reusable handle pairing the resolution pass with a parameter store
#[derive(Clone)]
pub struct Injector {
    store: Arc<dyn ParameterStore>,
}

impl Injector {
    /// Create an injector over a store
    pub fn new(store: impl ParameterStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Name of the underlying store
    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    /// Resolve every placeholder in `tree`
    pub fn inject(&self, tree: &Value) -> Result<Value> {
        inject(tree, self.store.as_ref())
    }

    /// Resolve a parameter path (scalar or subtree, with parent fallback)
    pub fn pull_value(&self, path: &str) -> Result<Value> {
        pull_value(self.store.as_ref(), path)
    }

    /// Expand a `${NAME}` token in `path`, then resolve it
    pub fn resolve_path(&self, path: &str) -> Result<Value> {
        let expanded = replace_env_placeholder(path)?;
        self.pull_value(&expanded)
    }

    /// Raw store entries under `path`
    pub fn query(&self, path: &str) -> Result<Vec<Parameter>> {
        self.store.query(path)
    }
}

impl std::fmt::Debug for Injector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Injector")
            .field("store", &self.store.name())
            .finish()
    }
}
