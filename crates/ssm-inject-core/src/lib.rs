//! ssm-inject-core: resolve parameter-store placeholders in configuration trees
//!
//! String leaves of the form `aws-ssm://path`, `aws-ssm://path|suffix` or
//! `aws-ssm-json://path` are replaced with values fetched from a
//! [`ParameterStore`]. A path may contain one `${ENV_NAME}` token.
//!
//! # Example
//!
//! ```rust
//! use ssm_inject_core::{document, Injector, MemoryStore};
//!
//! let store = MemoryStore::new()
//!     .with("/app/prod/db/host", "db.internal")
//!     .with("/app/prod/domain", "https://billing.example.org");
//!
//! let config = document::from_yaml(r#"
//! database:
//!   host: aws-ssm://app/prod/db/host
//! health: aws-ssm://app/prod/domain|/health
//! "#).unwrap();
//!
//! let resolved = Injector::new(store).inject(&config).unwrap();
//! assert_eq!(resolved.get_path("database.host").unwrap().as_str(), Some("db.internal"));
//! assert_eq!(
//!     resolved.get_path("health").unwrap().as_str(),
//!     Some("https://billing.example.org/health")
//! );
//! ```

pub mod document;
pub mod error;
pub mod inject;
pub mod path;
pub mod placeholder;
pub mod reconcile;
pub mod resolve;
pub mod store;
pub mod value;

pub use error::{Error, Result};
pub use inject::{find_placeholders, inject, Injector};
pub use placeholder::Placeholder;
pub use resolve::pull_value;
pub use store::{MemoryStore, Parameter, ParameterStore};
pub use value::Value;
