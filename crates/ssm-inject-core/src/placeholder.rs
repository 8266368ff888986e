//! Placeholder grammar
//!
//! Recognizes parameter-store references embedded as string leaves:
//! - `aws-ssm://app/db/host` - resolve a scalar or a subtree
//! - `aws-ssm://app/domain|/api/v1` - resolve, then append `/api/v1`
//! - `aws-ssm-json://app/flags` - resolve, then JSON-decode
//!
//! The path may carry one `${ENV_NAME}` token, expanded before lookup.

use regex::Regex;
use std::sync::OnceLock;

/// `aws-ssm` or `aws-ssm-json`, then `:/`, then an absolute path whose first
/// segment is `[A-Za-z0-9_-]+`, then an optional `|suffix`.
const PLACEHOLDER_PATTERN: &str = r"^aws-ssm(-json)?:/(/[A-Za-z0-9_-]+[^|]*)\|?([^|]+)?";

static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();

fn placeholder_re() -> &'static Regex {
    PLACEHOLDER_RE
        .get_or_init(|| Regex::new(PLACEHOLDER_PATTERN).expect("placeholder pattern is valid"))
}

/// A parsed placeholder string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// The full text matched by the grammar
    pub matched: String,
    /// Whether the `aws-ssm-json` form was used
    pub json: bool,
    /// Absolute parameter path, starting with `/`
    pub path: String,
    /// Text appended verbatim after the resolved value
    pub suffix: Option<String>,
}

impl Placeholder {
    /// Parse a string as a placeholder, returning `None` if it isn't one
    pub fn parse(input: &str) -> Option<Self> {
        let caps = placeholder_re().captures(input)?;

        // Group 2 is mandatory in the pattern, so a match always has it
        let path = caps.get(2)?.as_str().to_string();

        Some(Self {
            matched: caps.get(0).map(|m| m.as_str().to_string()).unwrap_or_default(),
            json: caps.get(1).is_some(),
            path,
            suffix: caps.get(3).map(|m| m.as_str().to_string()),
        })
    }
}
