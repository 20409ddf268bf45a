use crate::check::{Check, RepoValidatorCheck};
use crate::context::Context;
use crate::image::ImageData;
use crate::Result;
use async_trait::async_trait;
use log::debug;

pub const NAME: &str = "diy";

/// Passes images that live under one of the configured repositories
#[derive(Debug, Default)]
pub struct DiyCheck {
    valid_repos: Vec<String>,
}

impl DiyCheck {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Check for DiyCheck {
    async fn check(&mut self, ctx: &Context, image: &ImageData) -> Result<bool> {
        ctx.err()?;
        let valid = self
            .valid_repos
            .iter()
            .any(|repo| is_under_repo(image.name(), repo));
        debug!("Image {} in valid repositories: {}", image, valid);
        Ok(valid)
    }

    fn details(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({ "valid_repos": self.valid_repos }))
    }

    fn as_repo_validator_check(&mut self) -> Option<&mut dyn RepoValidatorCheck> {
        Some(self)
    }
}

impl RepoValidatorCheck for DiyCheck {
    fn set_valid_repos(&mut self, repos: Vec<String>) {
        self.valid_repos = repos;
    }
}

/// `gcr.io/team` covers `gcr.io/team/app` but not `gcr.io/teamster/app`
fn is_under_repo(name: &str, repo: &str) -> bool {
    let repo = repo.trim_end_matches('/');
    if repo.is_empty() {
        return false;
    }
    match name.strip_prefix(repo) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
