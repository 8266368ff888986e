//! Parameter path helpers
//!
//! Splitting a path into its parent and last segment for the parent-probe
//! lookup, and expanding a `${NAME}` environment token inside a path.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{Error, Result};

static ENV_TOKEN_RE: OnceLock<Regex> = OnceLock::new();

fn env_token_re() -> &'static Regex {
    ENV_TOKEN_RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env token pattern is valid"))
}

/// A path split at its final `/` boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathKey {
    /// Everything before the last segment (empty for a top-level path like `/a`)
    pub parent: String,
    /// The last segment including its leading `/`
    pub key: String,
    /// The path that was split
    pub full: String,
}

/// Split `/a/b/c/d` into `{parent: "/a/b/c", key: "/d", full: "/a/b/c/d"}`.
///
/// Returns `None` when the path has no `/` followed by a non-empty last
/// segment (`"abc"`, `"/a/b/"`).
pub fn find_last_path_key(path: &str) -> Option<PathKey> {
    let idx = path.rfind('/')?;
    if idx + 1 == path.len() {
        return None;
    }

    Some(PathKey {
        parent: path[..idx].to_string(),
        key: path[idx..].to_string(),
        full: path.to_string(),
    })
}

/// Expand the first `${NAME}` token in `path` from the process environment.
///
/// Paths without a token are returned unchanged. An unset or empty variable
/// is an error; only the first token is expanded.
pub fn replace_env_placeholder(path: &str) -> Result<String> {
    let Some(caps) = env_token_re().captures(path) else {
        return Ok(path.to_string());
    };

    let (Some(token), Some(name)) = (caps.get(0), caps.get(1)) else {
        return Ok(path.to_string());
    };

    let value = match std::env::var(name.as_str()) {
        Ok(v) if !v.is_empty() => v,
        _ => return Err(Error::env_not_found(name.as_str())),
    };

    log::trace!("Expanded ${{{}}} in parameter path", name.as_str());

    let mut expanded = String::with_capacity(path.len() + value.len());
    expanded.push_str(&path[..token.start()]);
    expanded.push_str(&value);
    expanded.push_str(&path[token.end()..]);
    Ok(expanded)
}
