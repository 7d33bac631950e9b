/*!
 * Tests for the timed-interval merge engine
 */

use anyhow::Result;
use subforge::merge_engine::{merge, ColorTarget, MergeOptions};
use subforge::errors::MergeError;
use crate::common;

/// Options with coloring disabled so merged text is predictable
fn plain_options(threshold_ms: u64) -> MergeOptions {
    MergeOptions {
        threshold_ms,
        color_target: ColorTarget::None,
        ..MergeOptions::default()
    }
}

/// Test the basic bilingual merge scenario
#[test]
fn test_merge_withCuesInsideThreshold_shouldConcatenateText() -> Result<()> {
    let track_a = common::build_track(&[(0, 1000, "Hello")]);
    let track_b = common::build_track(&[(200, 1200, "Bonjour")]);

    let merged = merge(track_a, track_b, &plain_options(1000))?;

    assert_eq!(merged.cues.len(), 1);
    assert_eq!(merged.cues[0].start_time_ms, 0);
    assert_eq!(merged.cues[0].end_time_ms, 1000);
    assert_eq!(merged.cues[0].text, "Hello\nBonjour");
    Ok(())
}

/// Test the same pair with a tight threshold keeps separate cues
#[test]
fn test_merge_withCuesOutsideThreshold_shouldKeepSeparateCues() -> Result<()> {
    let track_a = common::build_track(&[(0, 1000, "Hello")]);
    let track_b = common::build_track(&[(200, 1200, "Bonjour")]);

    let merged = merge(track_a, track_b, &plain_options(100))?;

    assert_eq!(merged.cues.len(), 2);
    assert_eq!(merged.cues[0].text, "Hello");
    assert_eq!(merged.cues[0].start_time_ms, 0);
    assert_eq!(merged.cues[1].text, "Bonjour");
    assert_eq!(merged.cues[1].start_time_ms, 200);
    Ok(())
}

/// Test the threshold boundary: an exact distance matches, one more does not
#[test]
fn test_merge_withDeltaAtThreshold_shouldMatchButNotBeyond() -> Result<()> {
    let options = plain_options(500);

    let track_a = common::build_track(&[(0, 1000, "A")]);
    let track_b = common::build_track(&[(500, 1500, "B")]);
    let merged = merge(track_a, track_b, &options)?;
    assert_eq!(merged.cues.len(), 1);
    assert_eq!(merged.cues[0].text, "A\nB");

    let track_a = common::build_track(&[(0, 1000, "A")]);
    let track_b = common::build_track(&[(501, 1500, "B")]);
    let merged = merge(track_a, track_b, &options)?;
    assert_eq!(merged.cues.len(), 2);
    Ok(())
}

/// Test a zero threshold requires exact start-time equality
#[test]
fn test_merge_withZeroThreshold_shouldRequireExactEquality() -> Result<()> {
    let track_a = common::build_track(&[(100, 1000, "A"), (3000, 4000, "C")]);
    let track_b = common::build_track(&[(100, 1200, "B"), (3001, 4200, "D")]);

    let merged = merge(track_a, track_b, &plain_options(0))?;

    assert_eq!(merged.cues.len(), 3);
    assert_eq!(merged.cues[0].text, "A\nB");
    assert_eq!(merged.cues[1].text, "C");
    assert_eq!(merged.cues[2].text, "D");
    Ok(())
}

/// Test every B cue is claimed at most once
#[test]
fn test_merge_withTwoCloseACues_shouldClaimBCueOnlyOnce() -> Result<()> {
    let track_a = common::build_track(&[(0, 1000, "A1"), (100, 1100, "A2")]);
    let track_b = common::build_track(&[(50, 900, "B1")]);

    let merged = merge(track_a, track_b, &plain_options(200))?;

    assert_eq!(merged.cues.len(), 2);
    let claimed: Vec<_> = merged
        .cues
        .iter()
        .filter(|cue| cue.text.contains("B1"))
        .collect();
    assert_eq!(claimed.len(), 1);
    assert_eq!(claimed[0].text, "A1\nB1");
    Ok(())
}

/// Test the greedy match lets an earlier A cue win even when a later one
/// is closer
#[test]
fn test_merge_withNearTie_shouldLetEarlierACueClaim() -> Result<()> {
    let track_a = common::build_track(&[(0, 1000, "A1"), (40, 1100, "A2")]);
    let track_b = common::build_track(&[(50, 900, "B1")]);

    let merged = merge(track_a, track_b, &plain_options(100))?;

    // A2 (delta 10) would be the better match, but A1 (delta 50) runs first
    assert_eq!(merged.cues[0].text, "A1\nB1");
    assert_eq!(merged.cues[1].text, "A2");
    Ok(())
}

/// Test each A cue picks its nearest unclaimed B cue, not the first
#[test]
fn test_merge_withMultipleCandidates_shouldPickNearestBCue() -> Result<()> {
    let track_a = common::build_track(&[(1000, 2000, "A")]);
    let track_b = common::build_track(&[(200, 900, "far"), (950, 1900, "near")]);

    let merged = merge(track_a, track_b, &plain_options(1000))?;

    assert_eq!(merged.cues.len(), 2);
    assert!(merged.cues.iter().any(|c| c.text == "A\nnear"));
    assert!(merged.cues.iter().any(|c| c.text == "far"));
    Ok(())
}

/// Test merge cardinality: n + (m - matched) cues in the output
#[test]
fn test_merge_withPartialOverlap_shouldPreserveCardinality() -> Result<()> {
    let track_a = common::build_track(&[(0, 500, "A1"), (5000, 5500, "A2"), (9000, 9500, "A3")]);
    let track_b = common::build_track(&[(100, 600, "B1"), (20000, 20500, "B2")]);

    let merged = merge(track_a, track_b, &plain_options(300))?;

    // matched = 1, so 3 + (2 - 1)
    assert_eq!(merged.cues.len(), 4);
    Ok(())
}

/// Test merging with an empty B track returns the shifted, sorted A track
#[test]
fn test_merge_withEmptyTrackB_shouldReturnTrackA() -> Result<()> {
    let track_a = common::build_track(&[(5000, 6000, "late"), (0, 1000, "early")]);
    let track_b = common::build_track(&[]);

    let merged = merge(track_a, track_b, &plain_options(1000))?;

    assert_eq!(merged.cues.len(), 2);
    assert_eq!(merged.cues[0].text, "early");
    assert_eq!(merged.cues[1].text, "late");
    Ok(())
}

/// Test merging with an empty A track returns the shifted B cues in order
#[test]
fn test_merge_withEmptyTrackA_shouldReturnSortedTrackB() -> Result<()> {
    let track_a = common::build_track(&[]);
    let track_b = common::build_track(&[(5000, 6000, "late"), (0, 1000, "early")]);

    let mut options = plain_options(1000);
    options.shift_b_ms = 500;
    let merged = merge(track_a, track_b, &options)?;

    assert_eq!(merged.cues.len(), 2);
    assert_eq!(merged.cues[0].start_time_ms, 500);
    assert_eq!(merged.cues[0].text, "early");
    assert_eq!(merged.cues[1].start_time_ms, 5500);
    Ok(())
}

/// Test per-track shifts apply before matching
#[test]
fn test_merge_withTrackShifts_shouldShiftBeforeMatching() -> Result<()> {
    // Unshifted the cues are 800ms apart; shift_a brings them within 50ms
    let track_a = common::build_track(&[(1000, 2000, "A")]);
    let track_b = common::build_track(&[(250, 1200, "B")]);

    let mut options = plain_options(100);
    options.shift_a_ms = -800;
    let merged = merge(track_a, track_b, &options)?;

    assert_eq!(merged.cues.len(), 1);
    assert_eq!(merged.cues[0].text, "A\nB");
    assert_eq!(merged.cues[0].start_time_ms, 200);
    Ok(())
}

/// Test the global shift applies to matched and unmatched cues alike
#[test]
fn test_merge_withGlobalShift_shouldShiftWholeResult() -> Result<()> {
    let track_a = common::build_track(&[(1000, 2000, "A")]);
    let track_b = common::build_track(&[(8000, 9000, "B")]);

    let mut options = plain_options(100);
    options.shift_global_ms = 500;
    let merged = merge(track_a, track_b, &options)?;

    assert_eq!(merged.cues.len(), 2);
    assert_eq!(merged.cues[0].start_time_ms, 1500);
    assert_eq!(merged.cues[1].start_time_ms, 8500);
    Ok(())
}

/// Test coloring track B wraps its text before concatenation
#[test]
fn test_merge_withTrackBColor_shouldColorConcatenatedText() -> Result<()> {
    let track_a = common::build_track(&[(0, 1000, "Hello")]);
    let track_b = common::build_track(&[(200, 1200, "Bonjour")]);

    let options = MergeOptions {
        threshold_ms: 1000,
        color_target: ColorTarget::TrackB,
        color_hex: "ffff54".to_string(),
        ..MergeOptions::default()
    };
    let merged = merge(track_a, track_b, &options)?;

    assert_eq!(
        merged.cues[0].text,
        "Hello\n<font color=\"#ffff54\">Bonjour</font>"
    );
    Ok(())
}

/// Test an invalid color is rejected before any mutation
#[test]
fn test_merge_withInvalidColor_shouldRejectConfiguration() {
    let track_a = common::build_track(&[(0, 1000, "Hello")]);
    let track_b = common::build_track(&[(200, 1200, "Bonjour")]);

    let options = MergeOptions {
        color_hex: "#zzzzzz".to_string(),
        ..MergeOptions::default()
    };
    let result = merge(track_a, track_b, &options);
    assert!(matches!(result, Err(MergeError::InvalidColor(_))));
}

/// Test output is renumbered sequentially after sorting
#[test]
fn test_merge_withUnmatchedBCues_shouldRenumberOutput() -> Result<()> {
    let track_a = common::build_track(&[(4000, 5000, "A")]);
    let track_b = common::build_track(&[(0, 1000, "B")]);

    let merged = merge(track_a, track_b, &plain_options(100))?;

    assert_eq!(merged.cues[0].seq_num, 1);
    assert_eq!(merged.cues[0].text, "B");
    assert_eq!(merged.cues[1].seq_num, 2);
    assert_eq!(merged.cues[1].text, "A");
    Ok(())
}
