use crate::severity::Severity;
use crate::{Result, VoucherError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_GRAFEAS_URL: &str = "https://containeranalysis.googleapis.com";
const DEFAULT_USER_AGENT: &str = "binauthz-voucher/0.1.0";

/// Everything needed to wire an engine, loadable from any serde format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub grafeas: GrafeasConfig,
    pub poll: PollConfig,
    pub engine: EngineConfig,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.grafeas.validate()?;
        self.poll.validate()
    }
}

/// Metadata store endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GrafeasConfig {
    pub base_url: String,
    /// Project owning occurrences and attestation notes
    pub project: String,
    pub page_size: u32,
    pub user_agent: String,
}

impl Default for GrafeasConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GRAFEAS_URL.to_string(),
            project: String::new(),
            page_size: 100,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl GrafeasConfig {
    pub fn new(base_url: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            project: project.into(),
            ..Default::default()
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(VoucherError::Config("empty hostname".into()));
        }
        if self.project.trim().is_empty() {
            return Err(VoucherError::Config("empty project".into()));
        }
        if self.page_size == 0 {
            return Err(VoucherError::Config("page size must be positive".into()));
        }
        Ok(())
    }
}

/// Bounded wait for vulnerability discovery to finish
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub attempts: u32,
    pub interval_ms: u64,
    /// Discovery note whose occurrence tracks vulnerability analysis
    pub note_id: String,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            attempts: 6,
            interval_ms: 10_000,
            note_id: "PACKAGE_VULNERABILITY".to_string(),
        }
    }
}

impl PollConfig {
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval_ms = millis(interval);
        self
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.attempts == 0 {
            return Err(VoucherError::Config("poll attempts must be positive".into()));
        }
        Ok(())
    }
}

/// Which check outcomes get a signed attestation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttestPolicy {
    #[default]
    PassingOnly,
    Always,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub fail_on: Severity,
    pub attest: AttestPolicy,
    pub trusted_build_creators: Vec<String>,
    pub trusted_projects: Vec<String>,
    pub valid_repos: Vec<String>,
    pub timeout_ms: Option<u64>,
}

impl EngineConfig {
    pub fn with_fail_on(mut self, fail_on: Severity) -> Self {
        self.fail_on = fail_on;
        self
    }

    pub fn with_attest_policy(mut self, attest: AttestPolicy) -> Self {
        self.attest = attest;
        self
    }

    pub fn with_trusted_build_creators(mut self, creators: Vec<String>) -> Self {
        self.trusted_build_creators = creators;
        self
    }

    pub fn with_trusted_projects(mut self, projects: Vec<String>) -> Self {
        self.trusted_projects = projects;
        self
    }

    pub fn with_valid_repos(mut self, repos: Vec<String>) -> Self {
        self.valid_repos = repos;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(millis(timeout));
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
