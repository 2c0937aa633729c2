// crates/sitestack-harness/src/emulator/session.rs
// ============================================================================
// Module: Emulator Session
// Description: Cloud API session bound to a local emulator endpoint.
// Purpose: Query buckets and distributions named in provisioning outputs.
// Dependencies: aws-config, aws-sdk-s3, aws-sdk-cloudfront, aws-sdk-route53, url
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_config::SdkConfig;
use aws_sdk_route53::error::ProvideErrorMetadata;
use aws_sdk_s3::config::Credentials;
use tracing::debug;
use url::Url;

use super::classify::QueryError;
use super::classify::is_already_exists;
use crate::error::HarnessError;
use crate::options::DEFAULT_REGION;
use crate::options::PLACEHOLDER_ACCESS_KEY;
use crate::options::PLACEHOLDER_SECRET_KEY;

// ============================================================================
// SECTION: Endpoint
// ============================================================================

/// Emulator endpoint URL and region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmulatorEndpoint {
    /// Endpoint URL (for example `http://localhost:4566`).
    pub url: String,
    /// Region identifier.
    pub region: String,
}

impl EmulatorEndpoint {
    /// Builds an endpoint with the default region.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            region: DEFAULT_REGION.to_string(),
        }
    }

    /// Overrides the region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Validates the endpoint URL shape and region.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Configuration`] for empty, unparsable, or
    /// non-HTTP endpoints and empty regions.
    pub fn validate(&self) -> Result<Url, HarnessError> {
        let trimmed = self.url.trim();
        if trimmed.is_empty() {
            return Err(HarnessError::Configuration("emulator endpoint must not be empty".into()));
        }
        let url = Url::parse(trimmed).map_err(|err| {
            HarnessError::Configuration(format!("invalid emulator endpoint {trimmed}: {err}"))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(HarnessError::Configuration(format!(
                "emulator endpoint must use http or https: {trimmed}"
            )));
        }
        if url.host_str().is_none() {
            return Err(HarnessError::Configuration(format!(
                "emulator endpoint has no host: {trimmed}"
            )));
        }
        if self.region.trim().is_empty() {
            return Err(HarnessError::Configuration("emulator region must not be empty".into()));
        }
        Ok(url)
    }
}

// ============================================================================
// SECTION: Snapshots
// ============================================================================

/// Bucket versioning state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketVersioning {
    /// Versioning status (`Enabled`, `Suspended`) when configured.
    pub status: Option<String>,
}

/// Bucket default encryption rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketEncryption {
    /// Default SSE algorithms, one per rule.
    pub algorithms: Vec<String>,
}

/// Bucket static website configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketWebsite {
    /// Index document suffix.
    pub index_document: Option<String>,
    /// Error document key.
    pub error_document: Option<String>,
    /// Redirect-all-requests target host.
    pub redirect_host: Option<String>,
}

/// Bucket access logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketLogging {
    /// Destination bucket when logging is enabled.
    pub target_bucket: Option<String>,
    /// Destination key prefix when logging is enabled.
    pub target_prefix: Option<String>,
}

/// Bucket public access block flags; unset flags read as `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools, reason = "Mirrors the four public access block flags.")]
pub struct PublicAccessBlock {
    /// Block public ACLs.
    pub block_public_acls: bool,
    /// Ignore public ACLs.
    pub ignore_public_acls: bool,
    /// Block public bucket policies.
    pub block_public_policy: bool,
    /// Restrict public buckets.
    pub restrict_public_buckets: bool,
}

impl PublicAccessBlock {
    /// Returns true when every public access flag is set.
    #[must_use]
    pub const fn fully_blocked(&self) -> bool {
        self.block_public_acls
            && self.ignore_public_acls
            && self.block_public_policy
            && self.restrict_public_buckets
    }
}

/// CDN distribution summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionSnapshot {
    /// Distribution id.
    pub id: String,
    /// Deployment status.
    pub status: String,
    /// Distribution domain name.
    pub domain_name: String,
    /// Alternate domain names.
    pub aliases: Vec<String>,
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// Cloud API session bound to an emulator endpoint.
///
/// # Invariants
/// - Credentials are static placeholders, never real secrets.
/// - S3 uses path-style addressing.
#[derive(Debug, Clone)]
pub struct EmulatorSession {
    /// Endpoint the session is bound to.
    endpoint: EmulatorEndpoint,
    /// Shared SDK configuration.
    config: SdkConfig,
    /// Object storage client.
    s3: aws_sdk_s3::Client,
    /// CDN client.
    cloudfront: aws_sdk_cloudfront::Client,
    /// DNS client.
    route53: aws_sdk_route53::Client,
}

impl EmulatorSession {
    /// Builds a session for the endpoint.
    ///
    /// Reachability is not checked here; connection errors surface on first use.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Configuration`] when the endpoint is malformed.
    pub async fn connect(endpoint: EmulatorEndpoint) -> Result<Self, HarnessError> {
        let url = endpoint.validate()?;
        let credentials = Credentials::new(
            PLACEHOLDER_ACCESS_KEY,
            PLACEHOLDER_SECRET_KEY,
            None,
            None,
            "sitestack-harness",
        );
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(endpoint.region.clone()))
            .endpoint_url(endpoint.url.trim())
            .credentials_provider(credentials)
            .load()
            .await;
        let s3_config = aws_sdk_s3::config::Builder::from(&config).force_path_style(true).build();
        let s3 = aws_sdk_s3::Client::from_conf(s3_config);
        let cloudfront = aws_sdk_cloudfront::Client::new(&config);
        let route53 = aws_sdk_route53::Client::new(&config);
        debug!(endpoint = %url, region = %endpoint.region, "emulator session configured");
        Ok(Self {
            endpoint,
            config,
            s3,
            cloudfront,
            route53,
        })
    }

    /// Returns the endpoint the session is bound to.
    #[must_use]
    pub const fn endpoint(&self) -> &EmulatorEndpoint {
        &self.endpoint
    }

    /// Returns the shared SDK configuration.
    #[must_use]
    pub const fn sdk_config(&self) -> &SdkConfig {
        &self.config
    }

    /// Returns the S3 client.
    #[must_use]
    pub const fn s3(&self) -> &aws_sdk_s3::Client {
        &self.s3
    }

    /// Returns the CloudFront client.
    #[must_use]
    pub const fn cloudfront(&self) -> &aws_sdk_cloudfront::Client {
        &self.cloudfront
    }

    /// Returns the Route53 client.
    #[must_use]
    pub const fn route53(&self) -> &aws_sdk_route53::Client {
        &self.route53
    }

    /// Creates the public hosted zone `name` unless it already exists.
    ///
    /// Returns true when the zone was created by this call. Losing a creation
    /// race to a parallel scenario counts as already present.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] when listing or creating the zone fails.
    pub async fn ensure_hosted_zone(&self, name: &str) -> Result<bool, QueryError> {
        let wanted = name.trim_end_matches('.');
        let listed = self
            .route53
            .list_hosted_zones_by_name()
            .dns_name(wanted)
            .send()
            .await
            .map_err(|err| QueryError::from_sdk("list_hosted_zones_by_name", &err))?;
        if listed.hosted_zones().iter().any(|zone| zone.name().trim_end_matches('.') == wanted) {
            return Ok(false);
        }
        let created = self
            .route53
            .create_hosted_zone()
            .name(wanted)
            .caller_reference(format!("sitestack-{wanted}"))
            .send()
            .await;
        match created {
            Ok(_) => {
                debug!(zone = wanted, "hosted zone created");
                Ok(true)
            }
            // A concurrent scenario created it between the list and the create.
            Err(err) if is_already_exists(err.code()) => {
                debug!(zone = wanted, "hosted zone created concurrently");
                Ok(false)
            }
            Err(err) => Err(QueryError::from_sdk("create_hosted_zone", &err)),
        }
    }

    /// Returns true when the bucket exists.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] for failures other than "not found".
    pub async fn bucket_exists(&self, bucket: &str) -> Result<bool, QueryError> {
        match self.s3.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(err) if err.as_service_error().is_some_and(|service| service.is_not_found()) => {
                Ok(false)
            }
            Err(err) => Err(QueryError::from_sdk("head_bucket", &err)),
        }
    }

    /// Reads the bucket versioning state.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] when the query fails.
    pub async fn bucket_versioning(&self, bucket: &str) -> Result<BucketVersioning, QueryError> {
        let output = self
            .s3
            .get_bucket_versioning()
            .bucket(bucket)
            .send()
            .await
            .map_err(|err| QueryError::from_sdk("get_bucket_versioning", &err))?;
        Ok(BucketVersioning {
            status: output.status().map(|status| status.as_str().to_string()),
        })
    }

    /// Reads the bucket default encryption rules.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] when the query fails, including when no
    /// encryption configuration exists.
    pub async fn bucket_encryption(&self, bucket: &str) -> Result<BucketEncryption, QueryError> {
        let output = self
            .s3
            .get_bucket_encryption()
            .bucket(bucket)
            .send()
            .await
            .map_err(|err| QueryError::from_sdk("get_bucket_encryption", &err))?;
        let algorithms = output
            .server_side_encryption_configuration()
            .map(|config| {
                config
                    .rules()
                    .iter()
                    .filter_map(|rule| rule.apply_server_side_encryption_by_default())
                    .map(|default| default.sse_algorithm().as_str().to_string())
                    .collect()
            })
            .unwrap_or_default();
        Ok(BucketEncryption {
            algorithms,
        })
    }

    /// Reads the bucket website configuration.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] when the query fails.
    pub async fn bucket_website(&self, bucket: &str) -> Result<BucketWebsite, QueryError> {
        let output = self
            .s3
            .get_bucket_website()
            .bucket(bucket)
            .send()
            .await
            .map_err(|err| QueryError::from_sdk("get_bucket_website", &err))?;
        Ok(BucketWebsite {
            index_document: output.index_document().map(|doc| doc.suffix().to_string()),
            error_document: output.error_document().map(|doc| doc.key().to_string()),
            redirect_host: output
                .redirect_all_requests_to()
                .map(|redirect| redirect.host_name().to_string()),
        })
    }

    /// Reads the bucket access logging configuration.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] when the query fails.
    pub async fn bucket_logging(&self, bucket: &str) -> Result<BucketLogging, QueryError> {
        let output = self
            .s3
            .get_bucket_logging()
            .bucket(bucket)
            .send()
            .await
            .map_err(|err| QueryError::from_sdk("get_bucket_logging", &err))?;
        let enabled = output.logging_enabled();
        Ok(BucketLogging {
            target_bucket: enabled.map(|logging| logging.target_bucket().to_string()),
            target_prefix: enabled.map(|logging| logging.target_prefix().to_string()),
        })
    }

    /// Reads the bucket public access block flags.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] when the query fails.
    pub async fn public_access_block(&self, bucket: &str) -> Result<PublicAccessBlock, QueryError> {
        let output = self
            .s3
            .get_public_access_block()
            .bucket(bucket)
            .send()
            .await
            .map_err(|err| QueryError::from_sdk("get_public_access_block", &err))?;
        let config = output.public_access_block_configuration();
        let flag = |read: fn(&aws_sdk_s3::types::PublicAccessBlockConfiguration) -> Option<bool>| {
            config.and_then(read).unwrap_or(false)
        };
        Ok(PublicAccessBlock {
            block_public_acls: flag(|c| c.block_public_acls()),
            ignore_public_acls: flag(|c| c.ignore_public_acls()),
            block_public_policy: flag(|c| c.block_public_policy()),
            restrict_public_buckets: flag(|c| c.restrict_public_buckets()),
        })
    }

    /// Reads a distribution by id.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] when the query fails or the response carries no distribution.
    pub async fn distribution(&self, id: &str) -> Result<DistributionSnapshot, QueryError> {
        let output = self
            .cloudfront
            .get_distribution()
            .id(id)
            .send()
            .await
            .map_err(|err| QueryError::from_sdk("get_distribution", &err))?;
        let distribution = output.distribution().ok_or_else(|| QueryError::Service {
            operation: "get_distribution",
            code: "EmptyResponse".to_string(),
            detail: format!("no distribution returned for {id}"),
        })?;
        let aliases = distribution
            .distribution_config()
            .and_then(|config| config.aliases())
            .map(|aliases| aliases.items().to_vec())
            .unwrap_or_default();
        Ok(DistributionSnapshot {
            id: distribution.id().to_string(),
            status: distribution.status().to_string(),
            domain_name: distribution.domain_name().to_string(),
            aliases,
        })
    }
}
