use crate::config::{GrafeasConfig, PollConfig};
use crate::context::Context;
use crate::grafeas::client::GrafeasClient;
use crate::grafeas::convert;
use crate::grafeas::discovery::wait_for_discoveries;
use crate::grafeas::types::{NoteKind, Occurrence};
use crate::grafeas::{list_all_occurrences, OccurrenceStore, Publish};
use crate::image::ImageData;
use crate::metadata::{BuildDetail, MetadataClient};
use crate::severity::Vulnerability;
use crate::signer::{Attestation, SignedAttestation, Signer};
use crate::{Result, VoucherError};
use async_trait::async_trait;
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// [`MetadataClient`] backed by a Grafeas occurrence store
pub struct GrafeasMetadataClient<S = GrafeasClient> {
    store: S,
    signer: Option<Arc<dyn Signer>>,
    poll: PollConfig,
    closed: AtomicBool,
}

impl GrafeasMetadataClient<GrafeasClient> {
    pub fn from_config(config: &GrafeasConfig, poll: PollConfig) -> Result<Self> {
        Ok(Self::new(GrafeasClient::new(config)?, poll))
    }
}

impl<S: OccurrenceStore> GrafeasMetadataClient<S> {
    pub fn new(store: S, poll: PollConfig) -> Self {
        Self {
            store,
            signer: None,
            poll,
            closed: AtomicBool::new(false),
        }
    }

    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(VoucherError::Closed);
        }
        Ok(())
    }

    async fn occurrences(
        &self,
        ctx: &Context,
        kind: NoteKind,
        image: &ImageData,
    ) -> Result<Vec<Occurrence>> {
        self.ensure_open()?;
        let occurrences = list_all_occurrences(&self.store, ctx, kind, image).await?;
        if occurrences.is_empty() {
            return Err(VoucherError::NoMetadata {
                kind: kind_label(kind),
                image: image.to_string(),
            });
        }
        Ok(occurrences)
    }
}

fn kind_label(kind: NoteKind) -> &'static str {
    match kind {
        NoteKind::Vulnerability => "vulnerability",
        NoteKind::Build => "build",
        NoteKind::Attestation => "attestation",
        NoteKind::Discovery => "discovery",
        NoteKind::NoteKindUnspecified => "unspecified",
    }
}

#[async_trait]
impl<S: OccurrenceStore> MetadataClient for GrafeasMetadataClient<S> {
    fn can_attest(&self) -> bool {
        self.signer.as_ref().map(|s| s.can_sign()).unwrap_or(false)
    }

    async fn get_vulnerabilities(
        &self,
        ctx: &Context,
        image: &ImageData,
    ) -> Result<Vec<Vulnerability>> {
        self.ensure_open()?;
        wait_for_discoveries(&self.store, ctx, image, &self.poll).await?;

        self.occurrences(ctx, NoteKind::Vulnerability, image)
            .await?
            .iter()
            .map(convert::vulnerability_from_occurrence)
            .collect()
    }

    async fn get_build_details(&self, ctx: &Context, image: &ImageData) -> Result<Vec<BuildDetail>> {
        self.occurrences(ctx, NoteKind::Build, image)
            .await?
            .iter()
            .map(convert::build_detail_from_occurrence)
            .collect()
    }

    async fn get_attestations(
        &self,
        ctx: &Context,
        image: &ImageData,
    ) -> Result<Vec<SignedAttestation>> {
        self.occurrences(ctx, NoteKind::Attestation, image)
            .await?
            .iter()
            .map(convert::signed_attestation_from_occurrence)
            .collect()
    }

    async fn add_attestation_to_image(
        &self,
        ctx: &Context,
        image: &ImageData,
        attestation: Attestation,
    ) -> Result<SignedAttestation> {
        self.ensure_open()?;
        let signer = match &self.signer {
            Some(signer) if signer.can_sign() => signer,
            _ => return Err(VoucherError::CannotAttest),
        };

        let signed = signer.sign_attestation(attestation)?;
        let check_name = signed.check_name().to_string();

        let note = convert::attestation_note(&check_name);
        if self.store.create_note(ctx, &check_name, &note).await? == Publish::AlreadyExists {
            debug!("Attestation note for {} already exists", check_name);
        }

        let occurrence =
            convert::occurrence_from_signed_attestation(self.store.project(), image, &signed);
        match self.store.create_occurrence(ctx, &occurrence).await? {
            Publish::Created => debug!("Published {} attestation for {}", check_name, image),
            Publish::AlreadyExists => {
                debug!("{} attestation for {} already exists", check_name, image)
            }
        }

        Ok(signed)
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!("Closed metadata client");
        }
    }
}
