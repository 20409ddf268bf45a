//! Conversions between store occurrences and domain entities.

use crate::grafeas::types::{
    AttestationNote, AttestationOccurrence, Hint, Note, NoteKind, Occurrence, Signature, Version,
};
use crate::grafeas::{note_id, note_name};
use crate::image::ImageData;
use crate::metadata::{BuildArtifact, BuildDetail};
use crate::severity::{Severity, Vulnerability};
use crate::signer::{Attestation, SignedAttestation};
use crate::{Result, VoucherError};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

pub fn vulnerability_from_occurrence(occurrence: &Occurrence) -> Result<Vulnerability> {
    let details = occurrence.vulnerability.as_ref().ok_or_else(|| {
        VoucherError::Conversion(format!(
            "occurrence {:?} has no vulnerability details",
            occurrence.name
        ))
    })?;

    // Effective severity accounts for distro-specific scoring, so prefer it
    let severity = details
        .effective_severity
        .as_deref()
        .or(details.severity.as_deref())
        .map(Severity::from_store)
        .unwrap_or_default();

    let issue = details.package_issue.first();

    Ok(Vulnerability {
        name: note_id(&occurrence.note_name).to_string(),
        description: details
            .short_description
            .clone()
            .or_else(|| details.long_description.clone())
            .unwrap_or_default(),
        package: issue.map(|i| i.affected_package.clone()).unwrap_or_default(),
        severity,
        affected_version: issue
            .and_then(|i| i.affected_version.as_ref())
            .and_then(version_string),
        fixed_version: issue
            .and_then(|i| i.fixed_version.as_ref())
            .and_then(version_string),
        fix_available: details
            .fix_available
            .or_else(|| issue.and_then(|i| i.fix_available))
            .unwrap_or(false),
    })
}

fn version_string(version: &Version) -> Option<String> {
    // MAXIMUM marks "no fix yet" in the store's version encoding
    if version.kind.as_deref() == Some("MAXIMUM") {
        return None;
    }
    version
        .full_name
        .clone()
        .filter(|n| !n.is_empty())
        .or_else(|| Some(version.name.clone()).filter(|n| !n.is_empty()))
}

pub fn build_detail_from_occurrence(occurrence: &Occurrence) -> Result<BuildDetail> {
    let provenance = occurrence
        .build
        .as_ref()
        .and_then(|b| b.provenance.as_ref())
        .ok_or_else(|| {
            VoucherError::Conversion(format!(
                "occurrence {:?} has no build provenance",
                occurrence.name
            ))
        })?;

    let git = provenance
        .source_provenance
        .as_ref()
        .and_then(|s| s.context.as_ref())
        .and_then(|c| c.git.as_ref());

    Ok(BuildDetail {
        project_id: provenance.project_id.clone(),
        build_creator: provenance.creator.clone(),
        build_url: provenance.logs_uri.clone(),
        repository_url: git.map(|g| g.url.clone()).unwrap_or_default(),
        commit: git.map(|g| g.revision_id.clone()).unwrap_or_default(),
        artifacts: provenance
            .built_artifacts
            .iter()
            .map(|a| BuildArtifact {
                id: a.id.clone(),
                checksum: a.checksum.clone(),
            })
            .collect(),
    })
}

pub fn signed_attestation_from_occurrence(occurrence: &Occurrence) -> Result<SignedAttestation> {
    let details = occurrence.attestation.as_ref().ok_or_else(|| {
        VoucherError::Conversion(format!(
            "occurrence {:?} has no attestation details",
            occurrence.name
        ))
    })?;

    let payload = BASE64.decode(&details.serialized_payload).map_err(|e| {
        VoucherError::Conversion(format!("Failed to decode attestation payload: {}", e))
    })?;
    let body = String::from_utf8(payload).map_err(|e| {
        VoucherError::Conversion(format!("attestation payload is not UTF-8: {}", e))
    })?;

    let signature = details.signatures.first().ok_or_else(|| {
        VoucherError::Conversion(format!(
            "attestation occurrence {:?} has no signatures",
            occurrence.name
        ))
    })?;

    let attestation = Attestation::new(note_id(&occurrence.note_name), body);
    Ok(SignedAttestation::new(
        attestation,
        signature.signature.clone(),
        signature.public_key_id.clone(),
    ))
}

pub fn occurrence_from_signed_attestation(
    project: &str,
    image: &ImageData,
    signed: &SignedAttestation,
) -> Occurrence {
    Occurrence {
        resource_uri: image.resource_url(),
        note_name: note_name(project, signed.check_name()),
        kind: NoteKind::Attestation,
        attestation: Some(AttestationOccurrence {
            serialized_payload: BASE64.encode(signed.body().as_bytes()),
            signatures: vec![Signature {
                signature: signed.signature().to_string(),
                public_key_id: signed.key_id().to_string(),
            }],
        }),
        ..Default::default()
    }
}

/// Attestation authority note for one check
pub fn attestation_note(check_name: &str) -> Note {
    Note {
        short_description: format!("{} check attestation", check_name),
        kind: NoteKind::Attestation,
        attestation: Some(AttestationNote {
            hint: Hint {
                human_readable_name: check_name.to_string(),
            },
        }),
        ..Default::default()
    }
}
