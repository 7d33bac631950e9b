/*!
 * Tests for the timed-text document model
 */

use std::fmt::Write;
use anyhow::Result;
use subforge::subtitle_processor::{SubtitleCue, SubtitleTrack};
use subforge::errors::SubtitleError;
use crate::common;

/// Test timestamp parsing and formatting
#[test]
fn test_timestamp_parsing_withValidTimestamp_shouldParseAndFormat() {
    let ts = "01:23:45,678";
    let ms = SubtitleCue::parse_timestamp(ts).unwrap();
    assert_eq!(ms, 5025678);

    let formatted = SubtitleCue::format_timestamp(ms);
    assert_eq!(formatted, ts);
}

/// Test timestamp parsing rejects out-of-range components
#[test]
fn test_timestamp_parsing_withInvalidComponents_shouldFail() {
    assert!(matches!(
        SubtitleCue::parse_timestamp("00:61:00,000"),
        Err(SubtitleError::InvalidTimestamp(_))
    ));
    assert!(matches!(
        SubtitleCue::parse_timestamp("nonsense"),
        Err(SubtitleError::InvalidTimestamp(_))
    ));
}

/// Test cue display formatting
#[test]
fn test_cue_display_withValidCue_shouldFormatCorrectly() {
    let cue = SubtitleCue::new(1, 5000, 10000, "Test subtitle".to_string());
    let mut output = String::new();
    write!(output, "{}", cue).unwrap();

    assert!(output.contains("1"));
    assert!(output.contains("00:00:05,000"));
    assert!(output.contains("00:00:10,000"));
    assert!(output.contains("Test subtitle"));
}

/// Test parsing SRT string content
#[test]
fn test_parse_srt_string_withValidContent_shouldParseCorrectly() -> Result<()> {
    let srt_content = "1\n00:00:01,000 --> 00:00:04,000\nHello world\n\n2\n00:00:05,000 --> 00:00:08,000\nTest subtitle\nSecond line\n\n";

    let cues = SubtitleTrack::parse_srt_string(srt_content)?;

    assert_eq!(cues.len(), 2);

    assert_eq!(cues[0].seq_num, 1);
    assert_eq!(cues[0].start_time_ms, 1000);
    assert_eq!(cues[0].end_time_ms, 4000);
    assert_eq!(cues[0].text, "Hello world");

    assert_eq!(cues[1].seq_num, 2);
    assert_eq!(cues[1].start_time_ms, 5000);
    assert_eq!(cues[1].end_time_ms, 8000);
    assert_eq!(cues[1].text, "Test subtitle\nSecond line");

    Ok(())
}

/// Test parsing garbage content fails with a distinct error
#[test]
fn test_parse_srt_string_withGarbage_shouldReturnMalformedError() {
    let result = SubtitleTrack::parse_srt_string("this is not a subtitle file at all");
    assert!(matches!(result, Err(SubtitleError::MalformedDocument(_))));
}

/// Test that a malformed fragment is skipped while the rest parses
#[test]
fn test_parse_srt_string_withPartialGarbage_shouldKeepValidCues() -> Result<()> {
    let srt_content = "garbage line\n\n1\n00:00:01,000 --> 00:00:02,000\nKept\n\n";
    let cues = SubtitleTrack::parse_srt_string(srt_content)?;

    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0].text, "Kept");
    Ok(())
}

/// Test round-trip serialization preserves text and millisecond timestamps
#[test]
fn test_round_trip_withCanonicalDocument_shouldBeByteIdentical() -> Result<()> {
    let srt_content = "1\n00:00:01,000 --> 00:00:04,000\nHello world\n\n2\n01:02:03,456 --> 01:02:05,999\nTwo\nlines\n\n";

    let cues = SubtitleTrack::parse_srt_string(srt_content)?;
    let track = SubtitleTrack::from_cues("test.srt".into(), cues);

    assert_eq!(track.to_srt_string(), srt_content);
    Ok(())
}

/// Test shift applies speed before the additive offset
#[test]
fn test_shift_withSpeedAndOffset_shouldScaleBeforeShifting() {
    let mut track = common::build_track(&[(500, 1000, "a")]);
    track.shift(100, 2.0);

    // floor(500 * 2.0) + 100, not (500 + 100) * 2.0
    assert_eq!(track.cues[0].start_time_ms, 1100);
    assert_ne!(track.cues[0].start_time_ms, (500 + 100) * 2);
    assert_eq!(track.cues[0].end_time_ms, 2100);
}

/// Test shifting forward then backward restores the original timing
#[test]
fn test_shift_withInverseShift_shouldRestoreOriginalTimes() {
    let original = [(1000u64, 2000u64, "a"), (3000, 4500, "b")];
    let mut track = common::build_track(&original);

    track.shift(700, 1.0);
    track.shift(-700, 1.0);

    for (cue, (start, end, _)) in track.cues.iter().zip(original.iter()) {
        assert_eq!(cue.start_time_ms, *start);
        assert_eq!(cue.end_time_ms, *end);
    }
}

/// Test negative shifts clamp at zero
#[test]
fn test_shift_withLargeNegativeOffset_shouldClampToZero() {
    let mut track = common::build_track(&[(100, 700, "a")]);
    track.shift(-500, 1.0);

    assert_eq!(track.cues[0].start_time_ms, 0);
    assert_eq!(track.cues[0].end_time_ms, 200);
}

/// Test the no-op fast path leaves timing untouched
#[test]
fn test_shift_withIdentityParameters_shouldNotChangeTimes() {
    let mut track = common::build_track(&[(333, 997, "a")]);
    track.shift(0, 1.0);

    assert_eq!(track.cues[0].start_time_ms, 333);
    assert_eq!(track.cues[0].end_time_ms, 997);
}

/// Test fractional speed factors floor the scaled value
#[test]
fn test_shift_withFractionalSpeed_shouldFloorResult() {
    let mut track = common::build_track(&[(333, 1001, "a")]);
    track.shift(0, 0.5);

    assert_eq!(track.cues[0].start_time_ms, 166);
    assert_eq!(track.cues[0].end_time_ms, 500);
}

/// Test colorize wraps every cue in a font tag
#[test]
fn test_colorize_withHexColor_shouldWrapEveryCue() {
    let mut track = common::build_track(&[(0, 1000, "One"), (2000, 3000, "Two")]);
    track.colorize("#ffff54");

    assert_eq!(track.cues[0].text, "<font color=\"#ffff54\">One</font>");
    assert_eq!(track.cues[1].text, "<font color=\"#ffff54\">Two</font>");
}

/// Test sorting and renumbering restore document order
#[test]
fn test_sort_cues_withUnorderedTrack_shouldOrderByStartTime() {
    let mut track = common::build_track(&[(5000, 6000, "late"), (0, 1000, "early")]);
    track.sort_cues();
    track.renumber();

    assert_eq!(track.cues[0].text, "early");
    assert_eq!(track.cues[0].seq_num, 1);
    assert_eq!(track.cues[1].text, "late");
    assert_eq!(track.cues[1].seq_num, 2);
}

/// Test advisory timing validation counts
#[test]
fn test_validate_timing_withOverlapsAndDuplicates_shouldReportCounts() {
    let mut track = common::build_track(&[
        (0, 2000, "a"),
        (1000, 3000, "b"),
        (1000, 500, "c"),
    ]);
    track.sort_cues();
    let report = track.validate_timing();

    assert_eq!(report.overlapping, 2);
    assert_eq!(report.duplicate_starts, 1);
    assert_eq!(report.inverted, 1);
}

/// Test writing a track produces UTF-8 without a byte-order mark
#[test]
fn test_write_to_srt_withValidTrack_shouldWriteUtf8WithoutBom() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("out.srt");

    let track = common::build_track(&[(0, 1000, "Héllo")]);
    track.write_to_srt(&path)?;

    let bytes = std::fs::read(&path)?;
    assert!(!bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
    let content = String::from_utf8(bytes)?;
    assert!(content.contains("Héllo"));
    Ok(())
}
