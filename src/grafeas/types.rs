//! Wire records of the Grafeas v1 REST API (the subset this crate reads and writes).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoteKind {
    Vulnerability,
    Build,
    Attestation,
    Discovery,
    #[default]
    #[serde(other)]
    NoteKindUnspecified,
}

impl NoteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteKind::Vulnerability => "VULNERABILITY",
            NoteKind::Build => "BUILD",
            NoteKind::Attestation => "ATTESTATION",
            NoteKind::Discovery => "DISCOVERY",
            NoteKind::NoteKindUnspecified => "NOTE_KIND_UNSPECIFIED",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub resource_uri: String,
    #[serde(default)]
    pub note_name: String,
    #[serde(default)]
    pub kind: NoteKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vulnerability: Option<VulnerabilityOccurrence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildOccurrence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attestation: Option<AttestationOccurrence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery: Option<DiscoveryOccurrence>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VulnerabilityOccurrence {
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub effective_severity: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub long_description: Option<String>,
    #[serde(default)]
    pub package_issue: Vec<PackageIssue>,
    #[serde(default)]
    pub fix_available: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageIssue {
    #[serde(default)]
    pub affected_package: String,
    #[serde(default)]
    pub affected_version: Option<Version>,
    #[serde(default)]
    pub fixed_version: Option<Version>,
    #[serde(default)]
    pub fix_available: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOccurrence {
    #[serde(default)]
    pub provenance: Option<BuildProvenance>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildProvenance {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub logs_uri: String,
    #[serde(default)]
    pub source_provenance: Option<SourceProvenance>,
    #[serde(default)]
    pub built_artifacts: Vec<Artifact>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceProvenance {
    #[serde(default)]
    pub context: Option<SourceContext>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceContext {
    #[serde(default)]
    pub git: Option<GitSourceContext>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitSourceContext {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub revision_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    #[serde(default)]
    pub checksum: String,
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationOccurrence {
    /// Base64 of the signed body
    pub serialized_payload: String,
    #[serde(default)]
    pub signatures: Vec<Signature>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    /// Base64 of the raw signature bytes
    pub signature: String,
    #[serde(default)]
    pub public_key_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisStatus {
    Pending,
    Scanning,
    FinishedSuccess,
    Complete,
    FinishedFailed,
    FinishedUnsupported,
    #[default]
    #[serde(other)]
    AnalysisStatusUnspecified,
}

impl AnalysisStatus {
    pub fn is_finished_success(&self) -> bool {
        matches!(self, AnalysisStatus::FinishedSuccess | AnalysisStatus::Complete)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryOccurrence {
    #[serde(default)]
    pub analysis_status: AnalysisStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub kind: NoteKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attestation: Option<AttestationNote>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationNote {
    pub hint: Hint,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub human_readable_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOccurrencesResponse {
    #[serde(default)]
    pub occurrences: Vec<Occurrence>,
    #[serde(default)]
    pub next_page_token: String,
}
