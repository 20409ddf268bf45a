use crate::context::Context;
use crate::image::ImageData;
use crate::severity::Vulnerability;
use crate::signer::{Attestation, SignedAttestation};
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Build provenance recorded for an image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildDetail {
    pub project_id: String,
    pub build_creator: String,
    pub build_url: String,
    pub repository_url: String,
    pub commit: String,
    pub artifacts: Vec<BuildArtifact>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildArtifact {
    pub id: String,
    pub checksum: String,
}

/// Access to the metadata store holding analysis results and attestations.
///
/// Implementations hold no per-image state and must be safe to share between
/// checks running concurrently.
#[async_trait]
pub trait MetadataClient: Send + Sync {
    /// Whether signing key material is available
    fn can_attest(&self) -> bool;

    /// Canonical attestation payload for `image`
    fn new_payload_body(&self, image: &ImageData) -> Result<String> {
        crate::payload::new_payload_body(image)
    }

    /// Vulnerabilities for `image`, waiting for vulnerability analysis first
    async fn get_vulnerabilities(&self, ctx: &Context, image: &ImageData)
        -> Result<Vec<Vulnerability>>;

    async fn get_build_details(&self, ctx: &Context, image: &ImageData)
        -> Result<Vec<BuildDetail>>;

    async fn get_attestations(
        &self,
        ctx: &Context,
        image: &ImageData,
    ) -> Result<Vec<SignedAttestation>>;

    /// Sign and publish `attestation`. Publishing the same attestation twice
    /// succeeds both times.
    async fn add_attestation_to_image(
        &self,
        ctx: &Context,
        image: &ImageData,
        attestation: Attestation,
    ) -> Result<SignedAttestation>;

    /// Release held state; calling it again is a no-op
    fn close(&self);
}

/// Source of bearer credentials for the store and registry
#[async_trait]
pub trait Auth: Send + Sync {
    async fn token(&self, ctx: &Context) -> Result<String>;
}

/// Fixed bearer token
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken(<redacted>)")
    }
}

#[async_trait]
impl Auth for StaticToken {
    async fn token(&self, ctx: &Context) -> Result<String> {
        ctx.err()?;
        Ok(self.0.clone())
    }
}

/// Fetches a software bill of materials for an image
#[async_trait]
pub trait SbomClient: Send + Sync {
    async fn get_sbom(&self, ctx: &Context, image: &ImageData) -> Result<serde_json::Value>;
}
