use crate::config::PollConfig;
use crate::context::Context;
use crate::grafeas::types::{NoteKind, Occurrence};
use crate::grafeas::{list_all_occurrences, note_id, OccurrenceStore};
use crate::image::ImageData;
use crate::{Result, VoucherError};
use log::debug;

/// Progress of the tracked analysis for one image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryStatus {
    /// No discovery occurrence yet; analysis has not been scheduled
    Absent,
    Pending,
    Finished,
}

pub fn discovery_status(occurrences: &[Occurrence], tracked_note: &str) -> DiscoveryStatus {
    let mut status = DiscoveryStatus::Absent;
    for occurrence in occurrences {
        if note_id(&occurrence.note_name) != tracked_note {
            continue;
        }
        let finished = occurrence
            .discovery
            .as_ref()
            .map(|d| d.analysis_status.is_finished_success())
            .unwrap_or(false);
        if finished {
            return DiscoveryStatus::Finished;
        }
        status = DiscoveryStatus::Pending;
    }
    status
}

/// Block until the tracked analysis for `image` has finished.
///
/// Queries at most `config.attempts` times, sleeping `config.interval()`
/// between queries. Store errors and context expiry end the wait at once.
pub async fn wait_for_discoveries<S>(
    store: &S,
    ctx: &Context,
    image: &ImageData,
    config: &PollConfig,
) -> Result<()>
where
    S: OccurrenceStore + ?Sized,
{
    for attempt in 1..=config.attempts {
        ctx.err()?;

        let occurrences = list_all_occurrences(store, ctx, NoteKind::Discovery, image).await?;
        match discovery_status(&occurrences, &config.note_id) {
            DiscoveryStatus::Finished => {
                debug!("Discovery finished for {} after {} attempt(s)", image, attempt);
                return Ok(());
            }
            status => {
                debug!(
                    "Discovery for {} is {:?} (attempt {}/{})",
                    image, status, attempt, config.attempts
                );
            }
        }

        if attempt < config.attempts {
            tokio::select! {
                err = ctx.done() => return Err(err),
                _ = tokio::time::sleep(config.interval()) => {}
            }
        }
    }

    Err(VoucherError::DiscoveriesUnfinished {
        image: image.to_string(),
        attempts: config.attempts,
    })
}
