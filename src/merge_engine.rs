/*!
 * Timed-interval merge of two subtitle tracks into one bilingual track.
 *
 * Aligns cues from track B onto track A by nearest start time within a
 * threshold, with per-track and global timing shifts applied around the
 * matching step.
 */

use std::collections::HashSet;
use log::debug;

use crate::errors::MergeError;
use crate::subtitle_processor::SubtitleTrack;

/// Which track, if any, gets its text wrapped in a color tag before merging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorTarget {
    /// Leave both tracks uncolored
    None,
    /// Color every cue of track A
    TrackA,
    /// Color every cue of track B
    #[default]
    TrackB,
}

/// Configuration for one merge run.
///
/// Validated up front: the engine never partially applies shifts and then
/// fails mid-merge.
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Maximum start-time difference in milliseconds for two cues to be
    /// considered the same moment
    pub threshold_ms: u64,

    /// Track whose text gets the color tag
    pub color_target: ColorTarget,

    /// 24-bit color as a 6-hex-digit string, leading '#' optional
    pub color_hex: String,

    /// Timing correction for track A, applied before matching
    pub shift_a_ms: i64,

    /// Timing correction for track B, applied before matching
    pub shift_b_ms: i64,

    /// Shift applied to the fully merged result
    pub shift_global_ms: i64,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            threshold_ms: 1000,
            color_target: ColorTarget::default(),
            color_hex: "#ffff54".to_string(),
            shift_a_ms: 0,
            shift_b_ms: 0,
            shift_global_ms: 0,
        }
    }
}

impl MergeOptions {
    /// Validate the configuration before any document mutation begins
    pub fn validate(&self) -> Result<(), MergeError> {
        if self.color_target != ColorTarget::None {
            let digits = self.color_hex.strip_prefix('#').unwrap_or(&self.color_hex);
            if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(MergeError::InvalidColor(self.color_hex.clone()));
            }
        }
        Ok(())
    }

    /// Color value normalized to a leading-'#' form for the font tag
    fn normalized_color(&self) -> String {
        if self.color_hex.starts_with('#') {
            self.color_hex.clone()
        } else {
            format!("#{}", self.color_hex)
        }
    }
}

/// Merge track B into track A by nearest-start-time matching.
///
/// Steps run in a fixed order that affects the result: per-track shifts,
/// coloring, matching, appending unmatched B cues, the global shift, and
/// a final sort. Matching is greedy per A-cue in original order: an
/// earlier A cue may claim a B cue that a later A cue would have matched
/// more closely. That is long-standing observed behavior, kept as-is in
/// preference to a globally optimal assignment that would change output
/// on ambiguous inputs.
pub fn merge(
    mut track_a: SubtitleTrack,
    mut track_b: SubtitleTrack,
    options: &MergeOptions,
) -> Result<SubtitleTrack, MergeError> {
    options.validate()?;

    // 1. Individual track shifts happen before any matching
    track_a.shift(options.shift_a_ms, 1.0);
    track_b.shift(options.shift_b_ms, 1.0);

    // 2. Color the chosen track so colored text is what gets concatenated
    match options.color_target {
        ColorTarget::TrackA => track_a.colorize(&options.normalized_color()),
        ColorTarget::TrackB => track_b.colorize(&options.normalized_color()),
        ColorTarget::None => {}
    }

    // 3. Greedy nearest-match with an exclusion set: every B cue is
    //    claimed at most once.
    let mut claimed: HashSet<usize> = HashSet::new();
    let mut matched = 0usize;
    for cue_a in &mut track_a.cues {
        let mut best: Option<(usize, u64)> = None;
        for (idx, cue_b) in track_b.cues.iter().enumerate() {
            if claimed.contains(&idx) {
                continue;
            }
            let delta = cue_a.start_time_ms.abs_diff(cue_b.start_time_ms);
            if delta > options.threshold_ms {
                continue;
            }
            match best {
                Some((_, best_delta)) if best_delta <= delta => {}
                _ => best = Some((idx, delta)),
            }
        }
        if let Some((idx, _)) = best {
            cue_a.text.push('\n');
            cue_a.text.push_str(&track_b.cues[idx].text);
            claimed.insert(idx);
            matched += 1;
        }
    }

    // 4. Unclaimed B cues are inserted as standalone cues
    let unmatched = track_b.cues.len() - matched;
    for (idx, cue_b) in track_b.cues.into_iter().enumerate() {
        if !claimed.contains(&idx) {
            track_a.cues.push(cue_b);
        }
    }

    debug!(
        "Merged {} matched pairs, {} unmatched B cues appended",
        matched, unmatched
    );

    // 5. Global shift applies to the fully merged document
    track_a.shift(options.shift_global_ms, 1.0);

    // 6. Sort and renumber before serialization
    track_a.sort_cues();
    track_a.renumber();

    Ok(track_a)
}
