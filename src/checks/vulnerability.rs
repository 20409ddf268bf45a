use crate::check::{Check, MetadataCheck};
use crate::context::Context;
use crate::image::ImageData;
use crate::metadata::MetadataClient;
use crate::severity::{FailOn, Severity, Vulnerability};
use crate::{Result, VoucherError};
use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

pub const NAME: &str = "snakeoil";

/// Fails images carrying vulnerabilities at or above the severity floor
pub struct VulnerabilityCheck {
    metadata: Option<Arc<dyn MetadataClient>>,
    fail_on: FailOn,
    found: Vec<Vulnerability>,
}

impl VulnerabilityCheck {
    pub fn new(fail_on: Severity) -> Self {
        Self {
            metadata: None,
            fail_on: FailOn::new(fail_on),
            found: Vec::new(),
        }
    }

    pub fn fail_on(&self) -> Severity {
        self.fail_on.floor()
    }
}

#[async_trait]
impl Check for VulnerabilityCheck {
    async fn check(&mut self, ctx: &Context, image: &ImageData) -> Result<bool> {
        let metadata = self
            .metadata
            .clone()
            .ok_or(VoucherError::MissingCollaborator("metadata client"))?;

        let vulnerabilities = metadata.get_vulnerabilities(ctx, image).await?;
        self.found = self.fail_on.filter(&vulnerabilities);

        debug!(
            "{} of {} vulnerabilities for {} are at or above {}",
            self.found.len(),
            vulnerabilities.len(),
            image,
            self.fail_on.floor()
        );
        Ok(self.found.is_empty())
    }

    fn details(&self) -> Option<serde_json::Value> {
        if self.found.is_empty() {
            return None;
        }
        serde_json::to_value(&self.found).ok()
    }

    fn as_metadata_check(&mut self) -> Option<&mut dyn MetadataCheck> {
        Some(self)
    }
}

impl MetadataCheck for VulnerabilityCheck {
    fn set_metadata_client(&mut self, client: Arc<dyn MetadataClient>) {
        self.metadata = Some(client);
    }
}
