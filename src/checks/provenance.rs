use crate::check::{self, Check, MetadataCheck};
use crate::context::Context;
use crate::image::ImageData;
use crate::metadata::{BuildDetail, MetadataClient};
use crate::{Result, VoucherError};
use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

pub const NAME: &str = "provenance";

/// Passes images built by a trusted builder in a trusted project
#[derive(Default)]
pub struct ProvenanceCheck {
    metadata: Option<Arc<dyn MetadataClient>>,
    trusted_build_creators: Vec<String>,
    trusted_projects: Vec<String>,
    matched: Option<BuildDetail>,
}

impl ProvenanceCheck {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_trusted(&self, detail: &BuildDetail, image: &ImageData) -> bool {
        let creator_ok = self
            .trusted_build_creators
            .iter()
            .any(|c| c == &detail.build_creator);
        let project_ok = self.trusted_projects.iter().any(|p| p == &detail.project_id);
        let artifact_ok = detail.artifacts.iter().any(|a| {
            a.checksum == image.digest()
                || a.checksum == image.digest_hex()
                || a.id.ends_with(&format!("@{}", image.digest()))
        });

        debug!(
            "Build {} trusted creator: {}, trusted project: {}, builds image: {}",
            detail.build_url, creator_ok, project_ok, artifact_ok
        );
        creator_ok && project_ok && artifact_ok
    }
}

#[async_trait]
impl Check for ProvenanceCheck {
    async fn check(&mut self, ctx: &Context, image: &ImageData) -> Result<bool> {
        let metadata = self
            .metadata
            .clone()
            .ok_or(VoucherError::MissingCollaborator("metadata client"))?;

        let details = metadata.get_build_details(ctx, image).await?;
        self.matched = details.into_iter().find(|d| self.is_trusted(d, image));
        Ok(self.matched.is_some())
    }

    fn details(&self) -> Option<serde_json::Value> {
        self.matched
            .as_ref()
            .and_then(|detail| serde_json::to_value(detail).ok())
    }

    fn as_metadata_check(&mut self) -> Option<&mut dyn MetadataCheck> {
        Some(self)
    }

    fn as_provenance_check(&mut self) -> Option<&mut dyn check::ProvenanceCheck> {
        Some(self)
    }
}

impl MetadataCheck for ProvenanceCheck {
    fn set_metadata_client(&mut self, client: Arc<dyn MetadataClient>) {
        self.metadata = Some(client);
    }
}

impl check::ProvenanceCheck for ProvenanceCheck {
    fn set_trusted_build_creators(&mut self, creators: Vec<String>) {
        self.trusted_build_creators = creators;
    }

    fn set_trusted_projects(&mut self, projects: Vec<String>) {
        self.trusted_projects = projects;
    }
}
