use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, Context};
use log::{warn, debug};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SubtitleError;

// @module: Timed-text document model and SRT container handling

// @const: SRT timestamp regex
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2}):(\d{2}):(\d{2}),(\d{3}) --> (\d{2}):(\d{2}):(\d{2}),(\d{3})").unwrap()
});

// @struct: Single timed caption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleCue {
    // @field: Sequence number
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Caption text, may contain embedded newlines and inline markup
    pub text: String,
}

impl SubtitleCue {
    /// Creates a new cue
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Self {
        SubtitleCue {
            seq_num,
            start_time_ms,
            end_time_ms,
            text,
        }
    }

    /// Parse an SRT timestamp to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64, SubtitleError> {
        // Parse HH:MM:SS,mmm format
        let parts: Vec<&str> = timestamp.split(&[':', ',', '.'][..]).collect();

        if parts.len() != 4 {
            return Err(SubtitleError::InvalidTimestamp(timestamp.to_string()));
        }

        let mut fields = [0u64; 4];
        for (i, part) in parts.iter().enumerate() {
            fields[i] = part
                .parse()
                .map_err(|_| SubtitleError::InvalidTimestamp(timestamp.to_string()))?;
        }
        let [hours, minutes, seconds, millis] = fields;

        // Validate time components
        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(SubtitleError::InvalidTimestamp(timestamp.to_string()));
        }

        Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_time_ms)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_time_ms)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

impl fmt::Display for SubtitleCue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// One subtitle track: an ordered sequence of cues.
///
/// Order carries no inherent meaning; callers that mutate timing must
/// re-sort with [`SubtitleTrack::sort_cues`] before serializing.
#[derive(Debug, Default)]
pub struct SubtitleTrack {
    /// Source filename
    pub source_file: PathBuf,

    /// List of cues
    pub cues: Vec<SubtitleCue>,
}

impl SubtitleTrack {
    /// Create a new empty track
    pub fn new(source_file: PathBuf) -> Self {
        SubtitleTrack {
            source_file,
            cues: Vec::new(),
        }
    }

    /// Create a track from already-parsed cues
    pub fn from_cues(source_file: PathBuf, cues: Vec<SubtitleCue>) -> Self {
        SubtitleTrack { source_file, cues }
    }

    /// Parse SRT format string into cues
    ///
    /// Tolerates malformed fragments by skipping them with a warning. Fails
    /// only when not a single valid cue could be read, so that a parse
    /// "success" on garbage cannot masquerade as an empty subtitle file.
    pub fn parse_srt_string(content: &str) -> Result<Vec<SubtitleCue>, SubtitleError> {
        let mut cues = Vec::new();

        // State variables for parsing
        let mut current_seq_num: Option<usize> = None;
        let mut current_start_time_ms: Option<u64> = None;
        let mut current_end_time_ms: Option<u64> = None;
        let mut current_text = String::new();
        let mut line_count = 0;

        let mut add_current_cue = |seq_num: usize, start_ms: u64, end_ms: u64, text: &str| {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                warn!("Skipping empty cue {}", seq_num);
                return;
            }
            if end_ms <= start_ms {
                warn!(
                    "Cue {} has end time {} <= start time {}, keeping as-is",
                    seq_num, end_ms, start_ms
                );
            }
            cues.push(SubtitleCue::new(seq_num, start_ms, end_ms, trimmed.to_string()));
        };

        for line in content.lines() {
            line_count += 1;
            let trimmed = line.trim();

            // Blank line terminates the current cue, if complete
            if trimmed.is_empty() {
                if let (Some(seq_num), Some(start_ms), Some(end_ms)) =
                    (current_seq_num, current_start_time_ms, current_end_time_ms)
                {
                    if !current_text.is_empty() {
                        add_current_cue(seq_num, start_ms, end_ms, &current_text);

                        current_seq_num = None;
                        current_start_time_ms = None;
                        current_end_time_ms = None;
                        current_text.clear();
                    }
                }
                continue;
            }

            // Try to parse as sequence number (only if we're starting a new cue)
            if current_seq_num.is_none() && current_text.is_empty() {
                if let Ok(num) = trimmed.parse::<usize>() {
                    current_seq_num = Some(num);
                    continue;
                }
            }

            // Try to parse as timestamp
            if current_seq_num.is_some()
                && current_start_time_ms.is_none()
                && current_end_time_ms.is_none()
            {
                if let Some(caps) = TIMESTAMP_REGEX.captures(trimmed) {
                    match (
                        Self::parse_timestamp_to_ms(&caps, 1),
                        Self::parse_timestamp_to_ms(&caps, 5),
                    ) {
                        (Ok(start_ms), Ok(end_ms)) => {
                            current_start_time_ms = Some(start_ms);
                            current_end_time_ms = Some(end_ms);
                            continue;
                        }
                        _ => {
                            warn!("Invalid timestamp format at line {}: {}", line_count, trimmed);
                        }
                    }
                }
            }

            // If we have a sequence number and timestamps, this must be cue text
            if current_seq_num.is_some()
                && current_start_time_ms.is_some()
                && current_end_time_ms.is_some()
            {
                if !current_text.is_empty() {
                    current_text.push('\n');
                }
                current_text.push_str(trimmed);
            } else {
                warn!(
                    "Unexpected text at line {} before sequence number or timestamp: {}",
                    line_count, trimmed
                );
            }
        }

        // Add the last cue if there is one
        if let (Some(seq_num), Some(start_ms), Some(end_ms)) =
            (current_seq_num, current_start_time_ms, current_end_time_ms)
        {
            if !current_text.is_empty() {
                add_current_cue(seq_num, start_ms, end_ms, &current_text);
            }
        }

        if cues.is_empty() {
            return Err(SubtitleError::MalformedDocument(
                "no valid cues found in SRT content".to_string(),
            ));
        }

        Ok(cues)
    }

    /// Parse timestamp capture group to milliseconds
    fn parse_timestamp_to_ms(caps: &regex::Captures, start_idx: usize) -> Result<u64, SubtitleError> {
        let field = |idx: usize| -> u64 {
            caps.get(start_idx + idx)
                .map_or(0, |m| m.as_str().parse().unwrap_or(0))
        };
        let (hours, minutes, seconds, millis) = (field(0), field(1), field(2), field(3));

        Ok((hours * 3600 + minutes * 60 + seconds) * 1000 + millis)
    }

    /// Serialize the track to SRT format
    pub fn to_srt_string(&self) -> String {
        let mut out = String::new();
        for cue in &self.cues {
            out.push_str(&cue.to_string());
        }
        out
    }

    /// Write the track to an SRT file as UTF-8 without a byte-order mark
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        fs::write(path, self.to_srt_string())
            .with_context(|| format!("Failed to write subtitle file: {}", path.display()))?;

        Ok(())
    }

    /// Shift and scale every cue's timing in place.
    ///
    /// The speed factor is applied before the additive shift: a drift
    /// correction (frame-rate mismatch) must be anchored before a constant
    /// delay is layered on. Results are clamped to a minimum of 0 ms.
    pub fn shift(&mut self, shift_ms: i64, speed_factor: f64) {
        // Fast path avoids floating-point rounding artifacts on plain re-saves
        if shift_ms == 0 && speed_factor == 1.0 {
            return;
        }
        for cue in &mut self.cues {
            cue.start_time_ms = Self::transform_ms(cue.start_time_ms, shift_ms, speed_factor);
            cue.end_time_ms = Self::transform_ms(cue.end_time_ms, shift_ms, speed_factor);
        }
    }

    /// Scale then shift one timestamp, clamped at zero
    fn transform_ms(ms: u64, shift_ms: i64, speed_factor: f64) -> u64 {
        let scaled = (ms as f64 * speed_factor).floor() as i64;
        scaled.saturating_add(shift_ms).max(0) as u64
    }

    /// Wrap every cue's text in an inline font-color tag
    pub fn colorize(&mut self, color_hex: &str) {
        for cue in &mut self.cues {
            cue.text = format!("<font color=\"{}\">{}</font>", color_hex, cue.text);
        }
    }

    /// Sort cues by start time (stable)
    pub fn sort_cues(&mut self) {
        self.cues.sort_by_key(|cue| cue.start_time_ms);
    }

    /// Reassign sequence numbers in current order
    pub fn renumber(&mut self) {
        for (i, cue) in self.cues.iter_mut().enumerate() {
            cue.seq_num = i + 1;
        }
    }

    /// Advisory timing check: counts overlapping neighbours and duplicated
    /// start times. Logged, never enforced.
    pub fn validate_timing(&self) -> TimingReport {
        let mut report = TimingReport::default();
        for window in self.cues.windows(2) {
            if window[0].end_time_ms > window[1].start_time_ms {
                report.overlapping += 1;
            }
            if window[0].start_time_ms == window[1].start_time_ms {
                report.duplicate_starts += 1;
            }
        }
        for cue in &self.cues {
            if cue.end_time_ms <= cue.start_time_ms {
                report.inverted += 1;
            }
        }
        if report.overlapping > 0 {
            debug!("Found {} overlapping cues", report.overlapping);
        }
        report
    }
}

/// Result of an advisory timing validation pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TimingReport {
    /// Consecutive cues whose time ranges overlap
    pub overlapping: usize,
    /// Consecutive cues sharing the same start time
    pub duplicate_starts: usize,
    /// Cues whose end does not come after their start
    pub inverted: usize,
}

impl fmt::Display for SubtitleTrack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Track")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Cues: {}", self.cues.len())?;
        Ok(())
    }
}
