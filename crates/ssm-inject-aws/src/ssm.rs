//! SSM Parameter Store backend
//!
//! Provides [`SsmStore`], which answers prefix queries with
//! `GetParametersByPath` (recursive, decrypted, paginated) plus a
//! `GetParameter` for the exact name.

use aws_config::BehaviorVersion;
use aws_sdk_ssm::error::DisplayErrorContext;
use ssm_inject_core::error::{Error, Result};
use ssm_inject_core::store::{Parameter, ParameterStore};
use tokio::runtime::Runtime;

use crate::{resolve_ssm_config, ResolvedSettings};

const STORE_NAME: &str = "ssm";

/// Explicit connection settings; unset fields fall back to configured defaults
#[derive(Clone, Debug, Default)]
pub struct SsmStoreOptions {
    /// Endpoint URL override (LocalStack, moto, VPC endpoints)
    pub endpoint: Option<String>,
    /// AWS region
    pub region: Option<String>,
    /// AWS profile name
    pub profile: Option<String>,
}

/// SSM Parameter Store backend.
///
/// ## Parameter Types
///
/// - **String**: returned as-is
/// - **SecureString**: returned decrypted
/// - **StringList**: returned as the raw comma-separated string
///
/// Calls block on a private Tokio runtime, so the store can be used from
/// synchronous code. It must not be dropped inside an async context.
pub struct SsmStore {
    runtime: Runtime,
    client: aws_sdk_ssm::Client,
}

impl SsmStore {
    /// Create a store using configured defaults and the AWS SDK chain
    pub fn new() -> Result<Self> {
        Self::with_options(SsmStoreOptions::default())
    }

    /// Create a store with explicit settings
    pub fn with_options(options: SsmStoreOptions) -> Result<Self> {
        let runtime = Runtime::new().map_err(|e| {
            Error::store(STORE_NAME, format!("Failed to create Tokio runtime: {}", e))
        })?;

        let settings = resolve_ssm_config(&options);
        log::debug!(
            "Building SSM client (region: {}, profile: {}, endpoint: {})",
            settings.region.as_deref().unwrap_or("<sdk default>"),
            settings.profile.as_deref().unwrap_or("<sdk default>"),
            settings.endpoint.as_deref().unwrap_or("<sdk default>"),
        );
        let client = runtime.block_on(build_client(&settings));

        Ok(Self { runtime, client })
    }

    /// The underlying SDK client
    pub fn client(&self) -> &aws_sdk_ssm::Client {
        &self.client
    }

    /// Fetch every parameter below `path`, following pagination.
    async fn fetch_by_path(&self, path: &str) -> Result<Vec<Parameter>> {
        let mut parameters = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let response = self
                .client
                .get_parameters_by_path()
                .path(path)
                .recursive(true)
                .with_decryption(true)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| {
                    Error::store(
                        STORE_NAME,
                        format!("GetParametersByPath '{}': {}", path, DisplayErrorContext(&e)),
                    )
                })?;

            for parameter in response.parameters() {
                if let (Some(name), Some(value)) = (parameter.name(), parameter.value()) {
                    parameters.push(Parameter::new(name, value));
                }
            }

            match response.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        Ok(parameters)
    }

    /// Fetch the parameter named exactly `name`, if it exists.
    async fn fetch_exact(&self, name: &str) -> Result<Option<Parameter>> {
        let response = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send()
            .await;

        match response {
            Ok(output) => Ok(output.parameter().and_then(|p| {
                p.value()
                    .map(|value| Parameter::new(p.name().unwrap_or(name), value))
            })),
            Err(e) if e
                .as_service_error()
                .is_some_and(|se| se.is_parameter_not_found()) =>
            {
                Ok(None)
            }
            Err(e) => Err(Error::store(
                STORE_NAME,
                format!("GetParameter '{}': {}", name, DisplayErrorContext(&e)),
            )),
        }
    }
}

impl ParameterStore for SsmStore {
    fn query(&self, prefix: &str) -> Result<Vec<Parameter>> {
        self.runtime.block_on(async {
            let mut parameters = Vec::new();
            // The root has no parameter of its own
            if prefix != "/" {
                if let Some(exact) = self.fetch_exact(prefix).await? {
                    parameters.push(exact);
                }
            }
            parameters.extend(self.fetch_by_path(prefix).await?);
            log::trace!("SSM returned {} parameter(s) for {}", parameters.len(), prefix);
            Ok(parameters)
        })
    }

    fn name(&self) -> &str {
        STORE_NAME
    }
}

async fn build_client(settings: &ResolvedSettings) -> aws_sdk_ssm::Client {
    let mut config_loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = &settings.region {
        config_loader = config_loader.region(aws_config::Region::new(region.clone()));
    }

    if let Some(profile) = &settings.profile {
        config_loader = config_loader.profile_name(profile);
    }

    if let Some(endpoint) = &settings.endpoint {
        config_loader = config_loader.endpoint_url(endpoint);
    }

    let sdk_config = config_loader.load().await;
    aws_sdk_ssm::Client::new(&sdk_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssm_store_name() {
        let store = SsmStore::with_options(SsmStoreOptions {
            region: Some("us-east-1".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(store.name(), "ssm");
    }

    #[test]
    fn test_explicit_region_reaches_client() {
        let store = SsmStore::with_options(SsmStoreOptions {
            region: Some("eu-west-1".into()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            store.client().config().region().unwrap().as_ref(),
            "eu-west-1"
        );
    }

    // Queries against real SSM need AWS credentials and run outside unit tests
}
