//! AWS backend for ssm-inject
//!
//! Provides [`SsmStore`], a [`ParameterStore`](ssm_inject_core::ParameterStore)
//! backed by AWS Systems Manager Parameter Store.
//!
//! ```rust,ignore
//! use ssm_inject_core::{document, Injector};
//! use ssm_inject_aws::SsmStore;
//!
//! let config = document::load_file("config.yaml")?;
//! let resolved = Injector::new(SsmStore::new()?).inject(&config)?;
//! ```
//!
//! Region, profile and endpoint are taken, highest first, from
//! [`SsmStoreOptions`], then [`configure_ssm`], then [`configure`], then the
//! AWS SDK defaults (environment variables, credentials file).

use once_cell::sync::Lazy;
use std::sync::RwLock;

mod ssm;

pub use ssm::{SsmStore, SsmStoreOptions};

// =============================================================================
// Configuration
// =============================================================================

/// Global configuration (applies to every AWS service client we build)
#[derive(Clone, Default, Debug)]
struct GlobalConfig {
    region: Option<String>,
    profile: Option<String>,
}

/// SSM-specific configuration
#[derive(Clone, Default, Debug)]
struct SsmConfig {
    endpoint: Option<String>,
    region: Option<String>,
    profile: Option<String>,
}

static GLOBAL_CONFIG: Lazy<RwLock<GlobalConfig>> = Lazy::new(Default::default);
static SSM_CONFIG: Lazy<RwLock<SsmConfig>> = Lazy::new(Default::default);

/// Configure global defaults.
///
/// # Arguments
///
/// * `region` - Default AWS region (e.g., "us-east-1"). Pass `None` to leave unchanged.
/// * `profile` - Default AWS profile name. Pass `None` to leave unchanged.
pub fn configure(region: Option<String>, profile: Option<String>) {
    // Panic on lock poisoning is acceptable - a panic mid-update leaves the config unusable
    let mut config = GLOBAL_CONFIG.write().unwrap();
    if let Some(r) = region {
        config.region = Some(r);
    }
    if let Some(p) = profile {
        config.profile = Some(p);
    }
}

/// Configure SSM-specific defaults, overriding [`configure`].
///
/// # Arguments
///
/// * `endpoint` - SSM endpoint URL (for LocalStack/moto, e.g., "http://localhost:4566"). Pass `None` to leave unchanged.
/// * `region` - AWS region. Pass `None` to leave unchanged.
/// * `profile` - AWS profile name. Pass `None` to leave unchanged.
///
/// # Example
///
/// ```rust,ignore
/// ssm_inject_aws::configure_ssm(Some("http://localhost:4566".to_string()), None, None);
/// ```
pub fn configure_ssm(endpoint: Option<String>, region: Option<String>, profile: Option<String>) {
    let mut config = SSM_CONFIG.write().unwrap();
    if let Some(e) = endpoint {
        config.endpoint = Some(e);
    }
    if let Some(r) = region {
        config.region = Some(r);
    }
    if let Some(p) = profile {
        config.profile = Some(p);
    }
}

/// Reset all configuration. Useful for test isolation.
pub fn reset() {
    *GLOBAL_CONFIG.write().unwrap() = Default::default();
    *SSM_CONFIG.write().unwrap() = Default::default();
}

/// Endpoint, region and profile after applying precedence
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ResolvedSettings {
    pub(crate) endpoint: Option<String>,
    pub(crate) region: Option<String>,
    pub(crate) profile: Option<String>,
}

/// Resolve SSM settings: explicit options > SSM config > global config.
pub(crate) fn resolve_ssm_config(options: &SsmStoreOptions) -> ResolvedSettings {
    // Copy out and drop the locks before applying precedence
    let (service, global) = {
        let global = GLOBAL_CONFIG.read().unwrap();
        let service = SSM_CONFIG.read().unwrap();
        (service.clone(), global.clone())
    };
    apply_precedence(options, &service, &global)
}

fn apply_precedence(
    options: &SsmStoreOptions,
    service: &SsmConfig,
    global: &GlobalConfig,
) -> ResolvedSettings {
    ResolvedSettings {
        endpoint: options.endpoint.clone().or_else(|| service.endpoint.clone()),
        region: options
            .region
            .clone()
            .or_else(|| service.region.clone())
            .or_else(|| global.region.clone()),
        profile: options
            .profile
            .clone()
            .or_else(|| service.profile.clone())
            .or_else(|| global.profile.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn options(endpoint: Option<&str>, region: Option<&str>, profile: Option<&str>) -> SsmStoreOptions {
        SsmStoreOptions {
            endpoint: endpoint.map(String::from),
            region: region.map(String::from),
            profile: profile.map(String::from),
        }
    }

    #[test]
    fn test_options_override_everything() {
        let service = SsmConfig {
            endpoint: Some("http://service-endpoint".into()),
            region: Some("us-west-2".into()),
            profile: Some("service-profile".into()),
        };
        let global = GlobalConfig {
            region: Some("us-east-1".into()),
            profile: Some("global-profile".into()),
        };

        let resolved = apply_precedence(
            &options(Some("http://kwarg-endpoint"), Some("eu-west-1"), Some("kwarg-profile")),
            &service,
            &global,
        );
        assert_eq!(
            resolved,
            ResolvedSettings {
                endpoint: Some("http://kwarg-endpoint".into()),
                region: Some("eu-west-1".into()),
                profile: Some("kwarg-profile".into()),
            }
        );
    }

    #[test]
    fn test_service_over_global_with_partial_fallback() {
        let service = SsmConfig {
            endpoint: None,
            region: Some("us-west-2".into()),
            profile: None,
        };
        let global = GlobalConfig {
            region: Some("us-east-1".into()),
            profile: Some("global-profile".into()),
        };

        let resolved = apply_precedence(&SsmStoreOptions::default(), &service, &global);
        assert_eq!(resolved.endpoint, None);
        assert_eq!(resolved.region, Some("us-west-2".into()));
        assert_eq!(resolved.profile, Some("global-profile".into()));
    }

    #[test]
    fn test_nothing_configured() {
        let resolved = apply_precedence(
            &SsmStoreOptions::default(),
            &SsmConfig::default(),
            &GlobalConfig::default(),
        );
        assert_eq!(resolved, ResolvedSettings::default());
    }

    #[test]
    fn test_global_configuration_lifecycle() {
        // Single test touching the process-wide state so parallel tests don't race
        configure(Some("us-east-1".into()), Some("initial-profile".into()));
        configure(None, None);
        configure_ssm(Some("http://localhost:4566".into()), None, None);

        let resolved = resolve_ssm_config(&SsmStoreOptions::default());
        assert_eq!(resolved.endpoint, Some("http://localhost:4566".into()));
        assert_eq!(resolved.region, Some("us-east-1".into()));
        assert_eq!(resolved.profile, Some("initial-profile".into()));

        reset();
        assert_eq!(
            resolve_ssm_config(&SsmStoreOptions::default()),
            ResolvedSettings::default()
        );
    }
}
