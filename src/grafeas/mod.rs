pub mod client;
pub mod convert;
pub mod discovery;
pub mod metadata;
pub mod types;

pub use client::GrafeasClient;
pub use metadata::GrafeasMetadataClient;
pub use types::{ListOccurrencesResponse, Note, NoteKind, Occurrence};

use crate::context::Context;
use crate::image::ImageData;
use crate::Result;
use async_trait::async_trait;
use log::trace;

/// One page of a filtered occurrence listing
pub type OccurrencePage = ListOccurrencesResponse;

/// Outcome of a create call.
///
/// Stores report a record that is already present as `AlreadyExists` rather
/// than as an error, which makes publishing idempotent for callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publish {
    Created,
    AlreadyExists,
}

/// Raw access to a Grafeas-style occurrence store
#[async_trait]
pub trait OccurrenceStore: Send + Sync {
    /// Fetch a single page of occurrences matching `filter`
    async fn list_occurrences(
        &self,
        ctx: &Context,
        filter: &str,
        page_token: Option<&str>,
    ) -> Result<OccurrencePage>;

    async fn create_occurrence(&self, ctx: &Context, occurrence: &Occurrence) -> Result<Publish>;

    async fn create_note(&self, ctx: &Context, note_id: &str, note: &Note) -> Result<Publish>;

    /// Project that owns created notes and occurrences
    fn project(&self) -> &str;
}

/// Filter selecting occurrences of `kind` for exactly this image
pub fn kind_filter(kind: NoteKind, image: &ImageData) -> String {
    format!(
        "kind=\"{}\" AND resourceUrl=\"{}\"",
        kind.as_str(),
        image.resource_url()
    )
}

/// Follow page tokens until the listing is exhausted
pub async fn list_all_occurrences<S>(
    store: &S,
    ctx: &Context,
    kind: NoteKind,
    image: &ImageData,
) -> Result<Vec<Occurrence>>
where
    S: OccurrenceStore + ?Sized,
{
    let filter = kind_filter(kind, image);
    let resource_url = image.resource_url();
    let mut occurrences = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = store
            .list_occurrences(ctx, &filter, page_token.as_deref())
            .await?;
        trace!(
            "Fetched {} {} occurrences for {}",
            page.occurrences.len(),
            kind.as_str(),
            image
        );

        occurrences.extend(
            page.occurrences
                .into_iter()
                .filter(|o| o.kind == kind && o.resource_uri == resource_url),
        );

        if page.next_page_token.is_empty() {
            break;
        }
        page_token = Some(page.next_page_token);
    }

    Ok(occurrences)
}

/// Last path segment of a note name (`projects/p/notes/<id>`)
pub fn note_id(note_name: &str) -> &str {
    note_name.rsplit('/').next().unwrap_or(note_name)
}

pub fn note_name(project: &str, note_id: &str) -> String {
    format!("projects/{}/notes/{}", project, note_id)
}
