pub mod registry;

pub use registry::{CheckFactories, CheckFactory};

use crate::context::Context;
use crate::image::ImageData;
use crate::metadata::{Auth, MetadataClient, SbomClient};
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// A single verification run against one image.
///
/// Every run gets a fresh instance from its factory, so implementations may
/// keep state (for example what they found) between `check` and `details`.
///
/// Collaborators are injected through the optional capability accessors
/// below: a check that needs, say, a metadata client overrides
/// [`Check::as_metadata_check`] and the engine hands it one before running.
#[async_trait]
pub trait Check: Send {
    /// Whether the image passes; `Err` means the check could not decide
    async fn check(&mut self, ctx: &Context, image: &ImageData) -> Result<bool>;

    /// Free-form findings to report alongside the outcome
    fn details(&self) -> Option<serde_json::Value> {
        None
    }

    fn as_authorized_check(&mut self) -> Option<&mut dyn AuthorizedCheck> {
        None
    }

    fn as_metadata_check(&mut self) -> Option<&mut dyn MetadataCheck> {
        None
    }

    fn as_provenance_check(&mut self) -> Option<&mut dyn ProvenanceCheck> {
        None
    }

    fn as_sbom_client_check(&mut self) -> Option<&mut dyn SbomClientCheck> {
        None
    }

    fn as_repo_validator_check(&mut self) -> Option<&mut dyn RepoValidatorCheck> {
        None
    }
}

/// Needs credentials for registry or store access
pub trait AuthorizedCheck: Send {
    fn set_auth(&mut self, auth: Arc<dyn Auth>);
}

/// Reads analysis results from the metadata store
pub trait MetadataCheck: Send {
    fn set_metadata_client(&mut self, client: Arc<dyn MetadataClient>);
}

/// Judges build provenance against trusted builders and projects
pub trait ProvenanceCheck: Send {
    fn set_trusted_build_creators(&mut self, creators: Vec<String>);
    fn set_trusted_projects(&mut self, projects: Vec<String>);
}

pub trait SbomClientCheck: Send {
    fn set_sbom_client(&mut self, client: Arc<dyn SbomClient>);
}

/// Restricts images to known repositories
pub trait RepoValidatorCheck: Send {
    fn set_valid_repos(&mut self, repos: Vec<String>);
}
