use thiserror::Error;

pub mod check;
pub mod checks;
pub mod config;
pub mod context;
pub mod engine;
pub mod grafeas;
pub mod image;
pub mod metadata;
pub mod payload;
pub mod severity;
pub mod signer;

// Re-export commonly used types
pub use check::{Check, CheckFactories, CheckFactory};
pub use checks::{default_registry, register_default_checks};
pub use config::{AttestPolicy, Config, EngineConfig, GrafeasConfig, PollConfig};
pub use context::Context;
pub use engine::{CheckResult, Engine, Response};
pub use grafeas::{GrafeasClient, GrafeasMetadataClient};
pub use image::ImageData;
pub use metadata::{Auth, BuildArtifact, BuildDetail, MetadataClient, SbomClient, StaticToken};
pub use payload::Payload;
pub use severity::{FailOn, Severity, Vulnerability, should_include_vulnerability};
pub use signer::{Attestation, KeyRing, SignedAttestation, Signer, SigningKey};

#[derive(Debug, Error)]
pub enum VoucherError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid image reference: {0}")]
    InvalidImage(String),

    #[error("requested check \"{0}\" does not exist")]
    UnknownCheck(String),

    #[error("cannot create attestations, keyring is empty")]
    CannotAttest,

    #[error("no signing key for check \"{0}\"")]
    NoSigningKey(String),

    #[error("key error: {0}")]
    Key(String),

    #[error("no {kind} metadata found for image {image}")]
    NoMetadata { kind: &'static str, image: String },

    #[error("discoveries have not finished for image {image} after {attempts} attempts")]
    DiscoveriesUnfinished { image: String, attempts: u32 },

    #[error("{method} {url} returned {status}: {body}")]
    Http {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot convert occurrence: {0}")]
    Conversion(String),

    #[error("context cancelled")]
    Cancelled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,

    #[error("check requires a {0} but none is configured")]
    MissingCollaborator(&'static str),

    #[error("metadata client is closed")]
    Closed,

    #[error("check {0} panicked")]
    CheckPanicked(String),
}

impl VoucherError {
    /// Whether retrying the whole check later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, VoucherError::DiscoveriesUnfinished { .. })
    }

    pub fn is_no_metadata(&self) -> bool {
        matches!(self, VoucherError::NoMetadata { .. })
    }
}

pub type Result<T> = std::result::Result<T, VoucherError>;

// ===== Top-level entry points =====

/// Run `checks` against `reference` with a ready-made engine.
///
/// # Arguments
/// * `engine` - Engine holding the registry and collaborators
/// * `reference` - Image reference; must be pinned by digest
/// * `checks` - Names of registered checks to run
/// * `attest` - Publish signed attestations for the results
pub async fn check_image(
    engine: &Engine,
    reference: &str,
    checks: &[&str],
    attest: bool,
) -> Result<Response> {
    let image = ImageData::parse(reference)?;
    let ctx = engine.context();
    engine.check(&ctx, &image, checks, attest).await
}

/// Report which of `checks` already have attestations for `reference`
pub async fn verify_image(engine: &Engine, reference: &str, checks: &[&str]) -> Result<Response> {
    let image = ImageData::parse(reference)?;
    let ctx = engine.context();
    engine.verify(&ctx, &image, checks).await
}
