use crate::check::{Check, CheckFactories};
use crate::config::{AttestPolicy, EngineConfig};
use crate::context::Context;
use crate::image::ImageData;
use crate::metadata::{Auth, MetadataClient, SbomClient};
use crate::payload::Payload;
use crate::signer::Attestation;
use crate::{Result, VoucherError};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Outcome of one check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub success: bool,
    pub attested: bool,
    pub details: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckResult {
    fn failed(name: impl Into<String>, error: &VoucherError) -> Self {
        let message = error.to_string();
        Self {
            name: name.into(),
            success: false,
            attested: false,
            details: Some(serde_json::json!({ "error": message })),
            error: Some(message),
        }
    }
}

/// Aggregate outcome for one image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub image: String,
    pub success: bool,
    pub results: Vec<CheckResult>,
}

impl Response {
    /// Results are ordered by check name; `success` requires every check to pass.
    /// A failed publish is reported on its check without changing `success`.
    pub fn new(image: &ImageData, mut results: Vec<CheckResult>) -> Self {
        results.sort_by(|a, b| a.name.cmp(&b.name));
        let success = results.iter().all(|r| r.success);
        Self {
            image: image.to_string(),
            success,
            results,
        }
    }

    pub fn result(&self, name: &str) -> Option<&CheckResult> {
        self.results.iter().find(|r| r.name == name)
    }
}

/// Runs registered checks against images and publishes their attestations
pub struct Engine {
    registry: Arc<CheckFactories>,
    config: EngineConfig,
    metadata: Option<Arc<dyn MetadataClient>>,
    auth: Option<Arc<dyn Auth>>,
    sbom: Option<Arc<dyn SbomClient>>,
}

impl Engine {
    pub fn new(registry: Arc<CheckFactories>, config: EngineConfig) -> Self {
        Self {
            registry,
            config,
            metadata: None,
            auth: None,
            sbom: None,
        }
    }

    pub fn with_metadata_client(mut self, client: Arc<dyn MetadataClient>) -> Self {
        self.metadata = Some(client);
        self
    }

    pub fn with_auth(mut self, auth: Arc<dyn Auth>) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn with_sbom_client(mut self, client: Arc<dyn SbomClient>) -> Self {
        self.sbom = Some(client);
        self
    }

    pub fn registry(&self) -> &CheckFactories {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fresh root context for a single request
    pub fn context(&self) -> Context {
        Context::background()
    }

    fn scoped(&self, ctx: &Context) -> Context {
        match self.config.timeout() {
            Some(timeout) => ctx.with_timeout(timeout),
            None => ctx.child(),
        }
    }

    /// Hand each collaborator to the checks that advertise a need for it
    fn inject(&self, check: &mut dyn Check) {
        if let (Some(c), Some(auth)) = (check.as_authorized_check(), &self.auth) {
            c.set_auth(Arc::clone(auth));
        }
        if let (Some(c), Some(metadata)) = (check.as_metadata_check(), &self.metadata) {
            c.set_metadata_client(Arc::clone(metadata));
        }
        if let Some(c) = check.as_provenance_check() {
            c.set_trusted_build_creators(self.config.trusted_build_creators.clone());
            c.set_trusted_projects(self.config.trusted_projects.clone());
        }
        if let (Some(c), Some(sbom)) = (check.as_sbom_client_check(), &self.sbom) {
            c.set_sbom_client(Arc::clone(sbom));
        }
        if let Some(c) = check.as_repo_validator_check() {
            c.set_valid_repos(self.config.valid_repos.clone());
        }
    }

    fn resolve_names<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<String>> {
        if names.is_empty() {
            return Err(VoucherError::Config("no checks requested".into()));
        }
        let mut resolved: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            if !self.registry.is_check_factory_registered(name) {
                return Err(VoucherError::UnknownCheck(name.to_string()));
            }
            resolved.push(name.to_string());
        }
        resolved.sort();
        resolved.dedup();
        Ok(resolved)
    }

    /// Run `names` against `image` concurrently and aggregate the outcomes.
    ///
    /// Only configuration errors (unknown or missing check names) fail the
    /// call; anything a single check runs into is reported in its result.
    pub async fn check<S: AsRef<str>>(
        &self,
        ctx: &Context,
        image: &ImageData,
        names: &[S],
        attest: bool,
    ) -> Result<Response> {
        let names = self.resolve_names(names)?;
        let mut checks = self.registry.get_new_checks(&names)?;
        let ctx = self.scoped(ctx);
        // Spawned checks outlive this future if it is dropped; cancel them with it
        let _cancel_on_drop = ctx.drop_guard();

        let publisher = match &self.metadata {
            Some(metadata) if attest && metadata.can_attest() => Some(Arc::clone(metadata)),
            _ => {
                if attest {
                    warn!("Attestation requested for {} but no signing keys are available", image);
                }
                None
            }
        };

        let mut handles = Vec::with_capacity(names.len());
        for name in names {
            let Some(mut check) = checks.remove(&name) else {
                continue;
            };
            self.inject(check.as_mut());

            let task = run_check(
                name.clone(),
                check,
                ctx.clone(),
                image.clone(),
                publisher.clone(),
                self.config.attest,
            );
            handles.push((name, tokio::spawn(task)));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (name, handle) in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Check {} did not complete: {}", name, e);
                    let error = VoucherError::CheckPanicked(name.clone());
                    results.push(CheckResult::failed(name, &error));
                }
            }
        }

        Ok(Response::new(image, results))
    }

    /// Report which of `names` already hold an attestation for `image`.
    ///
    /// Nothing is computed or published.
    pub async fn verify<S: AsRef<str>>(
        &self,
        ctx: &Context,
        image: &ImageData,
        names: &[S],
    ) -> Result<Response> {
        let names = self.resolve_names(names)?;
        let metadata = self
            .metadata
            .as_ref()
            .ok_or(VoucherError::MissingCollaborator("metadata client"))?;
        let ctx = self.scoped(ctx);

        let attestations = match metadata.get_attestations(&ctx, image).await {
            Ok(attestations) => attestations,
            Err(e) if e.is_no_metadata() => Vec::new(),
            Err(e) => return Err(e),
        };

        let results = names
            .into_iter()
            .map(|name| {
                let found = attestations.iter().find(|a| {
                    a.check_name() == name
                        && Payload::parse(a.body())
                            .map(|p| p.matches(image))
                            .unwrap_or(false)
                });
                CheckResult {
                    success: found.is_some(),
                    attested: found.is_some(),
                    details: found.map(|a| serde_json::json!({ "key_id": a.key_id() })),
                    error: None,
                    name,
                }
            })
            .collect();

        Ok(Response::new(image, results))
    }

    /// Close the metadata client, if any
    pub fn close(&self) {
        if let Some(metadata) = &self.metadata {
            metadata.close();
        }
    }
}

async fn run_check(
    name: String,
    mut check: Box<dyn Check>,
    ctx: Context,
    image: ImageData,
    publisher: Option<Arc<dyn MetadataClient>>,
    policy: AttestPolicy,
) -> CheckResult {
    debug!("Running check {} against {}", name, image);

    let success = match ctx.run(check.check(&ctx, &image)).await {
        Ok(success) => success,
        Err(e) => {
            debug!("Check {} errored: {}", name, e);
            return CheckResult::failed(name, &e);
        }
    };
    debug!("Check {} finished: success={}", name, success);

    let mut result = CheckResult {
        name,
        success,
        attested: false,
        details: check.details(),
        error: None,
    };

    let Some(metadata) = publisher else {
        return result;
    };
    if !success && policy == AttestPolicy::PassingOnly {
        return result;
    }
    if let Err(e) = ctx.err() {
        debug!("Not attesting {} for {}: {}", result.name, image, e);
        result.error = Some(format!("attestation failed: {}", e));
        return result;
    }

    match attest(metadata.as_ref(), &ctx, &image, &result.name).await {
        Ok(()) => result.attested = true,
        Err(e) => {
            warn!("Failed to attest {} for {}: {}", result.name, image, e);
            result.error = Some(format!("attestation failed: {}", e));
        }
    }
    result
}

async fn attest(
    metadata: &dyn MetadataClient,
    ctx: &Context,
    image: &ImageData,
    check_name: &str,
) -> Result<()> {
    let body = metadata.new_payload_body(image)?;
    metadata
        .add_attestation_to_image(ctx, image, Attestation::new(check_name, body))
        .await?;
    Ok(())
}
