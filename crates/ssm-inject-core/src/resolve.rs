//! Resolving a single parameter path against a store
//!
//! Parameter stores hold either a plain value at a key or a tree of children
//! under it. The path is queried directly first; with nothing there, the
//! parent is queried and only the entry named exactly like the path is kept.

use crate::error::{Error, Result};
use crate::path::find_last_path_key;
use crate::reconcile::cleanup_results;
use crate::store::ParameterStore;
use crate::value::Value;

/// Resolve `path` to a scalar string or a mapping of its children.
pub fn pull_value(store: &dyn ParameterStore, path: &str) -> Result<Value> {
    log::debug!("Querying '{}' for {}", store.name(), path);
    let results = store.query(path)?;
    if !results.is_empty() {
        log::debug!("{} parameter(s) under {}", results.len(), path);
        return Ok(cleanup_results(path, &results, false));
    }

    let split = find_last_path_key(path).ok_or_else(|| {
        Error::internal(format!("Parameter path has no parent segment: {}", path))
    })?;
    let parent = if split.parent.is_empty() {
        "/"
    } else {
        split.parent.as_str()
    };

    log::trace!("Nothing under {}, probing parent {}", path, parent);
    let parent_results = store.query(parent)?;
    let resolved = cleanup_results(path, &parent_results, true);

    if resolved.is_empty_result() {
        return Err(Error::unresolved_path(path));
    }
    Ok(resolved)
}
