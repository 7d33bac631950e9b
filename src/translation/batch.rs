/*!
 * Sequential batch translation with progress reporting and recovery.
 *
 * One batch is in flight at a time; the caller observes each batch's
 * result before the next begins, and may cancel between batches. A failed
 * batch is replaced by tagged placeholder lines and the job continues.
 */

use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use anyhow::Result;
use log::{info, warn};

use crate::errors::TranslationError;
use crate::subtitle_processor::SubtitleTrack;
use super::core::{TranslationService, BATCH_SEPARATOR};

/// Counters reported after a translation run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TranslationSummary {
    /// Number of batches attempted
    pub total_batches: usize,
    /// Batches replaced by placeholder lines
    pub failed_batches: usize,
    /// Number of lines applied back to the track
    pub translated_lines: usize,
    /// Whether the run was stopped by the cancel flag
    pub cancelled: bool,
}

/// Batch translator that walks a track one batch at a time
pub struct BatchTranslator {
    /// The translation service to use
    service: TranslationService,

    /// Number of cue texts per batch
    batch_size: usize,
}

impl BatchTranslator {
    /// Create a new batch translator
    pub fn new(service: TranslationService) -> Self {
        Self {
            batch_size: service.config.batch_size.max(1),
            service,
        }
    }

    /// Translate every cue of the track in place.
    ///
    /// The callback receives the completed fraction in [0,1] plus the
    /// original and translated lines of the batch that just finished.
    /// Cancellation is cooperative: the flag is consulted between batches
    /// only, and already-translated lines are kept.
    pub async fn translate_track(
        &self,
        track: &mut SubtitleTrack,
        cancel: &AtomicBool,
        mut on_batch: impl FnMut(f64, &[String], &[String]),
    ) -> Result<TranslationSummary> {
        let lines: Vec<String> = track.cues.iter().map(|cue| cue.text.clone()).collect();
        let total_lines = lines.len();
        let mut summary = TranslationSummary::default();

        if total_lines == 0 {
            return Ok(summary);
        }

        let mut translated_lines: Vec<String> = Vec::with_capacity(total_lines);

        for chunk in lines.chunks(self.batch_size) {
            if cancel.load(AtomicOrdering::SeqCst) {
                info!("Translation cancelled after {} batches", summary.total_batches);
                summary.cancelled = true;
                break;
            }

            summary.total_batches += 1;

            let translated_batch = match self.service.translate_batch_raw(chunk).await {
                Ok(raw) => Self::split_response(&raw, chunk),
                Err(e) => {
                    summary.failed_batches += 1;
                    warn!(
                        "Batch {} failed ({}), substituting placeholders",
                        summary.total_batches, e
                    );
                    let kind = failure_kind(&e);
                    chunk
                        .iter()
                        .map(|line| format!("[translation {}] {}", kind, line))
                        .collect()
                }
            };

            let progress =
                (translated_lines.len() + translated_batch.len()) as f64 / total_lines as f64;
            on_batch(progress, chunk, &translated_batch);
            translated_lines.extend(translated_batch);
        }

        // Apply translated text back, tolerating a short list after
        // cancellation
        summary.translated_lines = translated_lines.len().min(track.cues.len());
        for (cue, line) in track.cues.iter_mut().zip(translated_lines) {
            cue.text = line;
        }

        Ok(summary)
    }

    /// Split a raw response back into one line per batch entry.
    ///
    /// A count mismatch first attempts a fallback re-split on plain
    /// newlines; if still mismatched, pads with missing-translation
    /// placeholders or truncates. Never fails.
    fn split_response(raw: &str, batch: &[String]) -> Vec<String> {
        let mut parts: Vec<String> = raw
            .split(BATCH_SEPARATOR)
            .map(|part| part.trim().to_string())
            .collect();

        if parts.len() != batch.len() {
            let resplit: Vec<String> = raw
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && *line != "---")
                .map(String::from)
                .collect();
            if resplit.len() == batch.len() {
                parts = resplit;
            }
        }

        match parts.len().cmp(&batch.len()) {
            Ordering::Equal => parts,
            Ordering::Less => {
                warn!(
                    "Response had {} lines for a batch of {}, padding",
                    parts.len(),
                    batch.len()
                );
                let missing = batch.len() - parts.len();
                parts.extend(
                    batch[batch.len() - missing..]
                        .iter()
                        .map(|line| format!("[translation missing] {}", line)),
                );
                parts
            }
            Ordering::Greater => {
                warn!(
                    "Response had {} lines for a batch of {}, truncating",
                    parts.len(),
                    batch.len()
                );
                parts.truncate(batch.len());
                parts
            }
        }
    }
}

/// Short failure tag for placeholder lines
fn failure_kind(error: &TranslationError) -> &'static str {
    match error {
        TranslationError::Provider(p) => p.kind(),
        TranslationError::EmptyResponse => "empty",
    }
}
