use anyhow::{Result, Context};
use log::{error, warn, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use indicatif::{ProgressBar, ProgressStyle};

use crate::app_config::{ColorTrack, Config};
use crate::encoding_recovery;
use crate::episode_utils;
use crate::file_utils::FileManager;
use crate::merge_engine::{self, ColorTarget, MergeOptions};
use crate::subtitle_processor::SubtitleTrack;
use crate::translation::{BatchTranslator, TranslationService};

// @module: Application controller for subtitle processing

/// Main application controller for merge, translation and shift jobs
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    /// Merge options derived from the validated configuration
    fn merge_options(&self) -> MergeOptions {
        let merge = &self.config.merge;
        MergeOptions {
            // Negative thresholds were rejected by Config::validate
            threshold_ms: merge.threshold_ms.max(0) as u64,
            color_target: match merge.color_track {
                ColorTrack::None => ColorTarget::None,
                ColorTrack::TrackA => ColorTarget::TrackA,
                ColorTrack::TrackB => ColorTarget::TrackB,
            },
            color_hex: merge.color_hex.clone(),
            shift_a_ms: merge.shift_a_ms,
            shift_b_ms: merge.shift_b_ms,
            shift_global_ms: merge.shift_global_ms,
        }
    }

    /// Load one subtitle file through the encoding recovery engine
    fn load_track(&self, path: &Path) -> Result<SubtitleTrack> {
        let raw = FileManager::read_bytes(path)?;
        let (mut track, detection) = encoding_recovery::recover(&raw)
            .with_context(|| format!("Failed to recover subtitle file: {}", path.display()))?;
        track.source_file = path.to_path_buf();
        info!(
            "Loaded {} ({} cues, encoding {}, script {})",
            path.display(),
            track.cues.len(),
            detection.encoding,
            detection.family.as_str()
        );
        Ok(track)
    }

    /// Merge one A/B pair into the output path. All-or-nothing: nothing is
    /// written when any stage fails.
    pub fn run_merge_pair(&self, file_a: &Path, file_b: &Path, output_path: &Path) -> Result<()> {
        let track_a = self.load_track(file_a)?;
        let track_b = self.load_track(file_b)?;

        let merged = merge_engine::merge(track_a, track_b, &self.merge_options())?;
        merged.write_to_srt(output_path)?;

        info!("Success: {}", output_path.display());
        Ok(())
    }

    /// Merge every episode pair found in a directory.
    ///
    /// Partial-failure tolerant: a failing pair is logged and the run
    /// continues to the next one.
    pub fn run_merge_dir(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        force_overwrite: bool,
    ) -> Result<()> {
        let start_time = std::time::Instant::now();

        if !input_dir.exists() {
            return Err(anyhow::anyhow!(
                "Input directory does not exist: {:?}",
                input_dir
            ));
        }
        FileManager::ensure_dir(output_dir)?;

        let files = FileManager::find_files(input_dir, "srt")?;
        if files.is_empty() {
            return Err(anyhow::anyhow!(
                "No subtitle files found in directory: {:?}",
                input_dir
            ));
        }

        let groups = episode_utils::group_by_episode(&files);

        let pair_pb = ProgressBar::new(groups.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pairs ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{bar:40}] {pos}/{len} {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pair_pb.set_style(template_result);

        let mut success_count = 0;
        let mut error_count = 0;
        let mut skip_count = 0;

        for (code, group) in &groups {
            pair_pb.set_message(format!("Merging: {}", code));

            let Some((file_a, file_b)) =
                episode_utils::identify_pair(group, &self.config.merge.track_b_keyword)
            else {
                warn!(
                    "Skipping episode {}: expected exactly 2 files, found {}",
                    code,
                    group.len()
                );
                skip_count += 1;
                pair_pb.inc(1);
                continue;
            };

            let output_path = FileManager::merged_output_path(output_dir, code);
            if output_path.exists() && !force_overwrite {
                warn!(
                    "Skipping {}, output already exists (use -f to force overwrite)",
                    code
                );
                skip_count += 1;
                pair_pb.inc(1);
                continue;
            }

            match self.run_merge_pair(&file_a, &file_b, &output_path) {
                Ok(()) => success_count += 1,
                Err(e) => {
                    error!("Error merging episode {}: {}", code, e);
                    error_count += 1;
                }
            }
            pair_pb.inc(1);
        }

        pair_pb.finish_and_clear();

        info!(
            "Merge run completed in {:.1?}: {} merged, {} skipped, {} errors",
            start_time.elapsed(),
            success_count,
            skip_count,
            error_count
        );

        Ok(())
    }

    /// Translate one subtitle file batch by batch.
    ///
    /// Per-batch failures become placeholder lines and the job still
    /// completes; cancellation is honored between batches.
    pub async fn run_translate(
        &self,
        input_file: &Path,
        output_path: Option<PathBuf>,
        cancel: Arc<AtomicBool>,
    ) -> Result<()> {
        let mut track = self.load_track(input_file)?;

        let service = TranslationService::new(self.config.translation.clone())?;
        let translator = BatchTranslator::new(service);

        info!(
            "Translating {} -> {} via {}",
            self.config.translation.source_language,
            self.config.translation.target_language,
            self.config.translation.provider.display_name()
        );

        let progress_bar = ProgressBar::new(100);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{bar:40}] {percent}%"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result);
        progress_bar.set_message("Translating");

        let pb = progress_bar.clone();
        let summary = translator
            .translate_track(&mut track, &cancel, move |progress, _original, _translated| {
                pb.set_position((progress * 100.0).round() as u64);
            })
            .await?;

        progress_bar.finish_and_clear();

        if summary.failed_batches > 0 {
            warn!(
                "Translation completed with {}/{} failed batches (placeholders substituted)",
                summary.failed_batches, summary.total_batches
            );
        } else if summary.cancelled {
            warn!(
                "Translation stopped early after {} batches, partial result saved",
                summary.total_batches
            );
        } else {
            info!("Successfully translated {} lines", summary.translated_lines);
        }

        track.sort_cues();
        track.renumber();

        let output_path = output_path
            .unwrap_or_else(|| FileManager::prefixed_output_path(input_file, "AI_"));
        track.write_to_srt(&output_path)?;
        info!("Success: {}", output_path.display());

        Ok(())
    }

    /// Apply a linear shift and speed correction to one subtitle file
    pub fn run_shift(
        &self,
        input_file: &Path,
        shift_ms: i64,
        speed_factor: f64,
        output_path: Option<PathBuf>,
    ) -> Result<()> {
        let mut track = self.load_track(input_file)?;

        track.shift(shift_ms, speed_factor);
        track.sort_cues();
        track.renumber();

        let report = track.validate_timing();
        if report.overlapping > 0 || report.inverted > 0 {
            warn!(
                "Timing check after shift: {} overlapping, {} inverted cues",
                report.overlapping, report.inverted
            );
        }

        let output_path = output_path
            .unwrap_or_else(|| FileManager::prefixed_output_path(input_file, "Fixed_"));
        track.write_to_srt(&output_path)?;
        info!("Success: {}", output_path.display());

        Ok(())
    }
}
