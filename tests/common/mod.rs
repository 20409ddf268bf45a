#![allow(dead_code)]

use async_trait::async_trait;
use binauthz_voucher::grafeas::types::{
    AnalysisStatus, Artifact, BuildOccurrence, BuildProvenance, DiscoveryOccurrence,
    GitSourceContext, PackageIssue, SourceContext, SourceProvenance, Version,
    VulnerabilityOccurrence,
};
use binauthz_voucher::grafeas::{
    Note, NoteKind, Occurrence, OccurrencePage, OccurrenceStore, Publish,
};
use binauthz_voucher::{Context, ImageData, KeyRing, Result, SigningKey, VoucherError};
use std::collections::HashMap;
use std::sync::Mutex;

pub const PROJECT: &str = "test-project";
pub const DIGEST: &str =
    "sha256:8c733d1c02c1b23a1c4d6d8c6e2b5c8e0f3a9e4d7b2c1a0f9e8d7c6b5a493827";

pub fn image() -> ImageData {
    ImageData::parse(&format!("gcr.io/test/image/we/are/testing@{}", DIGEST)).unwrap()
}

pub fn other_image() -> ImageData {
    ImageData::parse(&format!("gcr.io/test/other@{}", DIGEST)).unwrap()
}

pub fn keyring(check_names: &[&str]) -> KeyRing {
    let mut keyring = KeyRing::new();
    for (i, name) in check_names.iter().enumerate() {
        let key = p256::ecdsa::SigningKey::from_slice(&[0x11 + i as u8; 32]).unwrap();
        keyring.insert(*name, SigningKey::P256(key));
    }
    keyring
}

pub fn vulnerability_occurrence(image: &ImageData, cve: &str, severity: &str) -> Occurrence {
    Occurrence {
        name: format!("projects/{}/occurrences/{}", PROJECT, cve),
        resource_uri: image.resource_url(),
        note_name: format!("projects/goog-vulnz/notes/{}", cve),
        kind: NoteKind::Vulnerability,
        vulnerability: Some(VulnerabilityOccurrence {
            severity: Some(severity.to_string()),
            effective_severity: Some(severity.to_string()),
            short_description: Some(cve.to_string()),
            package_issue: vec![PackageIssue {
                affected_package: "openssl".to_string(),
                affected_version: Some(Version {
                    name: "1.1.1".to_string(),
                    full_name: Some("1.1.1k-1".to_string()),
                    kind: Some("NORMAL".to_string()),
                }),
                fixed_version: Some(Version {
                    name: "1.1.1".to_string(),
                    full_name: Some("1.1.1n-0".to_string()),
                    kind: Some("NORMAL".to_string()),
                }),
                fix_available: Some(true),
            }],
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn build_occurrence(image: &ImageData, creator: &str, project: &str) -> Occurrence {
    Occurrence {
        name: format!("projects/{}/occurrences/build-1", PROJECT),
        resource_uri: image.resource_url(),
        note_name: format!("projects/{}/notes/build", PROJECT),
        kind: NoteKind::Build,
        build: Some(BuildOccurrence {
            provenance: Some(BuildProvenance {
                id: "build-1".to_string(),
                project_id: project.to_string(),
                creator: creator.to_string(),
                logs_uri: "https://console.cloud.google.com/build/1".to_string(),
                source_provenance: Some(SourceProvenance {
                    context: Some(SourceContext {
                        git: Some(GitSourceContext {
                            url: "https://github.com/example/app".to_string(),
                            revision_id: "abc123".to_string(),
                        }),
                    }),
                }),
                built_artifacts: vec![Artifact {
                    checksum: image.digest().to_string(),
                    id: image.to_string(),
                }],
            }),
        }),
        ..Default::default()
    }
}

pub fn discovery_occurrence(image: &ImageData, status: AnalysisStatus) -> Occurrence {
    Occurrence {
        name: format!("projects/{}/occurrences/discovery", PROJECT),
        resource_uri: image.resource_url(),
        note_name: "projects/goog-analysis/notes/PACKAGE_VULNERABILITY".to_string(),
        kind: NoteKind::Discovery,
        discovery: Some(DiscoveryOccurrence {
            analysis_status: status,
        }),
        ..Default::default()
    }
}

#[derive(Default)]
struct State {
    occurrences: Vec<Occurrence>,
    notes: HashMap<String, Note>,
    /// Discovery status per poll; `None` means no discovery occurrence yet.
    /// The last entry repeats once the script runs out.
    discovery_script: Vec<Option<AnalysisStatus>>,
    list_calls: HashMap<String, usize>,
    create_calls: usize,
    fail_lists: Option<u16>,
}

/// In-memory occurrence store with page-token pagination
pub struct FakeStore {
    page_size: usize,
    state: Mutex<State>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::with_page_size(2)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size,
            state: Mutex::new(State::default()),
        }
    }

    pub fn add(&self, occurrence: Occurrence) {
        self.state.lock().unwrap().occurrences.push(occurrence);
    }

    pub fn script_discovery(&self, script: Vec<Option<AnalysisStatus>>) {
        self.state.lock().unwrap().discovery_script = script;
    }

    pub fn fail_lists_with(&self, status: u16) {
        self.state.lock().unwrap().fail_lists = Some(status);
    }

    /// Number of list requests (pages) issued for `kind`
    pub fn list_calls(&self, kind: NoteKind) -> usize {
        let state = self.state.lock().unwrap();
        state.list_calls.get(kind.as_str()).copied().unwrap_or(0)
    }

    pub fn create_calls(&self) -> usize {
        self.state.lock().unwrap().create_calls
    }

    pub fn occurrences_of(&self, kind: NoteKind) -> Vec<Occurrence> {
        let state = self.state.lock().unwrap();
        state
            .occurrences
            .iter()
            .filter(|o| o.kind == kind)
            .cloned()
            .collect()
    }

    pub fn note_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.state.lock().unwrap().notes.keys().cloned().collect();
        ids.sort();
        ids
    }
}

/// Split `kind="X" AND resourceUrl="Y"` into `(X, Y)`
fn parse_filter(filter: &str) -> (String, String) {
    let parts: Vec<&str> = filter.split('"').collect();
    (parts[1].to_string(), parts[3].to_string())
}

#[async_trait]
impl OccurrenceStore for FakeStore {
    async fn list_occurrences(
        &self,
        ctx: &Context,
        filter: &str,
        page_token: Option<&str>,
    ) -> Result<OccurrencePage> {
        ctx.err()?;
        let (kind, resource_url) = parse_filter(filter);
        let mut state = self.state.lock().unwrap();
        let calls = state.list_calls.entry(kind.clone()).or_insert(0);
        *calls += 1;
        let call_index = *calls - 1;

        if let Some(status) = state.fail_lists {
            return Err(VoucherError::Http {
                method: "GET".to_string(),
                url: "fake://occurrences".to_string(),
                status,
                body: "store unavailable".to_string(),
            });
        }

        if kind == "DISCOVERY" && !state.discovery_script.is_empty() {
            let index = call_index.min(state.discovery_script.len() - 1);
            let occurrences = match state.discovery_script[index] {
                Some(status) => {
                    let image = ImageData::parse(resource_url.trim_start_matches("https://"))?;
                    vec![discovery_occurrence(&image, status)]
                }
                None => Vec::new(),
            };
            return Ok(OccurrencePage {
                occurrences,
                next_page_token: String::new(),
            });
        }

        let matching: Vec<Occurrence> = state
            .occurrences
            .iter()
            .filter(|o| o.kind.as_str() == kind && o.resource_uri == resource_url)
            .cloned()
            .collect();

        let offset: usize = page_token.map(|t| t.parse().unwrap()).unwrap_or(0);
        let end = (offset + self.page_size).min(matching.len());
        let next_page_token = if end < matching.len() {
            end.to_string()
        } else {
            String::new()
        };

        Ok(OccurrencePage {
            occurrences: matching[offset..end].to_vec(),
            next_page_token,
        })
    }

    async fn create_occurrence(&self, ctx: &Context, occurrence: &Occurrence) -> Result<Publish> {
        ctx.err()?;
        let mut state = self.state.lock().unwrap();
        state.create_calls += 1;

        let exists = state.occurrences.iter().any(|o| {
            o.note_name == occurrence.note_name
                && o.resource_uri == occurrence.resource_uri
                && o.attestation == occurrence.attestation
        });
        if exists {
            return Ok(Publish::AlreadyExists);
        }

        let mut stored = occurrence.clone();
        stored.name = format!(
            "projects/{}/occurrences/{}",
            PROJECT,
            state.occurrences.len()
        );
        state.occurrences.push(stored);
        Ok(Publish::Created)
    }

    async fn create_note(&self, ctx: &Context, note_id: &str, note: &Note) -> Result<Publish> {
        ctx.err()?;
        let mut state = self.state.lock().unwrap();
        if state.notes.contains_key(note_id) {
            return Ok(Publish::AlreadyExists);
        }
        state.notes.insert(note_id.to_string(), note.clone());
        Ok(Publish::Created)
    }

    fn project(&self) -> &str {
        PROJECT
    }
}
