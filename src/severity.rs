use crate::VoucherError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Vulnerability severity, ordered from least to most severe.
///
/// `Unknown` sorts below every named level, so any floor above `Unknown`
/// excludes vulnerabilities the store could not classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    #[default]
    Unknown,
    Negligible,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 6] = [
        Severity::Unknown,
        Severity::Negligible,
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Unknown => "unknown",
            Severity::Negligible => "negligible",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// Maps the store's severity names; anything unrecognised is `Unknown`
    pub fn from_store(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "MINIMAL" | "NEGLIGIBLE" => Severity::Negligible,
            "LOW" => Severity::Low,
            "MEDIUM" => Severity::Medium,
            "HIGH" => Severity::High,
            "CRITICAL" => Severity::Critical,
            _ => Severity::Unknown,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = VoucherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::ALL
            .into_iter()
            .find(|severity| severity.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| VoucherError::Config(format!("unknown severity: {:?}", s)))
    }
}

impl Serialize for Severity {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// A vulnerability reported against an image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vulnerability {
    /// CVE or advisory identifier
    pub name: String,
    pub description: String,
    pub package: String,
    pub severity: Severity,
    pub affected_version: Option<String>,
    pub fixed_version: Option<String>,
    pub fix_available: bool,
}

/// Severity floor: vulnerabilities below it are ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FailOn(Severity);

impl FailOn {
    pub fn new(floor: Severity) -> Self {
        Self(floor)
    }

    pub fn floor(&self) -> Severity {
        self.0
    }

    pub fn should_include(&self, vulnerability: &Vulnerability) -> bool {
        should_include_vulnerability(vulnerability, self.0)
    }

    pub fn filter<'a, I>(&self, vulnerabilities: I) -> Vec<Vulnerability>
    where
        I: IntoIterator<Item = &'a Vulnerability>,
    {
        vulnerabilities
            .into_iter()
            .filter(|v| self.should_include(v))
            .cloned()
            .collect()
    }
}

impl From<Severity> for FailOn {
    fn from(floor: Severity) -> Self {
        Self(floor)
    }
}

pub fn should_include_vulnerability(vulnerability: &Vulnerability, floor: Severity) -> bool {
    vulnerability.severity >= floor
}
