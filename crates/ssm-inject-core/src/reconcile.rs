//! Turning flat store results into a scalar or a nested mapping
//!
//! A prefix query returns `(name, value)` pairs. The entry whose name equals
//! the queried path is the value itself; deeper entries are laid out in a
//! mapping keyed by what remains of their name below the prefix.

use indexmap::IndexMap;

use crate::store::Parameter;
use crate::value::Value;

/// Reconcile the results of querying `path`.
///
/// Each entry's name has `path` (and at most one following `/`) stripped:
/// - an empty remainder makes the entry's value the whole result;
/// - otherwise, unless `level_up` is set, the value is stored under the
///   remainder with only its first `/` treated as a nesting step
///   (`a/b/c` lands at `result["a"]["b/c"]`); dots in the remainder also
///   nest, so `db.host` lands at `result["db"]["host"]`.
///
/// With `level_up` set, entries with a non-empty remainder are discarded.
/// The returned mapping may be empty.
pub fn cleanup_results(path: &str, results: &[Parameter], level_up: bool) -> Value {
    let mut structure = Value::mapping();

    for entry in results {
        let relative = strip_queried_prefix(&entry.name, path);

        if relative.is_empty() {
            structure = Value::String(entry.value.clone());
            continue;
        }

        if level_up {
            continue;
        }

        let dotted = relative.replacen('/', ".", 1);
        if !set_dotted(&mut structure, &dotted, &entry.value) {
            log::trace!(
                "Dropped parameter '{}' below '{}': no mapping to place it in",
                entry.name,
                path
            );
        }
    }

    structure
}

fn strip_queried_prefix<'a>(name: &'a str, path: &str) -> &'a str {
    match name.strip_prefix(path) {
        Some(rest) => rest.strip_prefix('/').unwrap_or(rest),
        None => name,
    }
}

/// Dotted-path assignment creating intermediate mappings.
///
/// Returns false when a scalar is in the way of the path.
fn set_dotted(target: &mut Value, dotted: &str, value: &str) -> bool {
    let segments: Vec<&str> = dotted.split('.').collect();
    let Some((last, intermediate)) = segments.split_last() else {
        return false;
    };

    let mut current = target;
    for segment in intermediate {
        let Value::Mapping(map) = current else {
            return false;
        };
        current = map
            .entry((*segment).to_string())
            .or_insert_with(|| Value::Mapping(IndexMap::new()));
    }

    match current {
        Value::Mapping(map) => {
            map.insert((*last).to_string(), Value::String(value.to_string()));
            true
        }
        _ => false,
    }
}
