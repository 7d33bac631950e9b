/*!
 * Encoding recovery for subtitle files of uncertain or corrupted encoding.
 *
 * Given raw bytes, determines the true source encoding, rejects candidate
 * decodes that show mojibake corruption, and produces a canonical UTF-8
 * subtitle track plus a diagnostic record of what was detected.
 */

use std::path::PathBuf;
use encoding_rs::Encoding;
use log::{debug, warn};

use crate::errors::SubtitleError;
use crate::subtitle_processor::{SubtitleCue, SubtitleTrack};

/// Number of cues sampled from the head of a trial decode when testing for
/// corruption markers
const CORRUPTION_SAMPLE_CUES: usize = 12;

/// Minimum number of script-specific byte patterns before a file is
/// classified into that script family
const SCRIPT_HINT_MIN_COUNT: usize = 3;

/// Two-byte prefixes of UTF-8 encoded Thai codepoints (U+0E00..U+0E7F)
const THAI_UTF8_PREFIXES: [[u8; 2]; 2] = [[0xE0, 0xB8], [0xE0, 0xB9]];

/// Lead bytes of three-byte UTF-8 sequences in the CJK unified block
const CJK_UTF8_LEAD_BYTES: [u8; 6] = [0xE4, 0xE5, 0xE6, 0xE7, 0xE8, 0xE9];

/// Substrings that only show up when UTF-8 bytes were decoded through a
/// Western single-byte table. The decode itself raises no error, so these
/// markers are the only signal that the candidate table was wrong.
const WESTERN_MOJIBAKE_MARKERS: [&str; 5] = ["\u{C3}\u{A9}", "\u{C3}\u{A8}", "\u{C3}\u{A2}", "\u{E2}\u{20AC}", "\u{EF}\u{BB}\u{BF}"];

/// Western-table misreads of UTF-8 Thai lead bytes
const THAI_MOJIBAKE_MARKERS: [&str; 2] = ["\u{E0}\u{B8}", "\u{E0}\u{B9}"];

/// Coarse classification of the writing system suggested by raw bytes.
/// Used only to bias the candidate encoding order, never as an
/// authoritative decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptFamily {
    /// Thai script byte patterns dominate
    Thai,
    /// CJK three-byte sequences dominate
    Cjk,
    /// Latin/Western byte distribution
    Western,
    /// No usable signal
    Unknown,
}

impl ScriptFamily {
    /// Human-readable family name for diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Thai => "thai-like",
            Self::Cjk => "cjk-like",
            Self::Western => "latin/western-like",
            Self::Unknown => "unknown",
        }
    }
}

/// Diagnostic record of a recovery run. Reported alongside the recovered
/// track; never fed back into merge logic.
#[derive(Debug, Clone)]
pub struct EncodingDetection {
    /// Name of the encoding that produced the accepted decode
    pub encoding: String,
    /// Script family the raw bytes were classified into
    pub family: ScriptFamily,
    /// Whether the statistical detector agreed with the accepted encoding
    pub statistical_match: bool,
}

/// Classify the script family from raw bytes.
///
/// Scans for the fixed Thai two-byte prefixes and CJK three-byte lead
/// bytes; ASCII-dominated input with neither signal is Western.
pub fn classify_script(raw: &[u8]) -> ScriptFamily {
    let mut thai_hits = 0usize;
    let mut cjk_hits = 0usize;
    let mut high_bytes = 0usize;

    for window in raw.windows(2) {
        if THAI_UTF8_PREFIXES.contains(&[window[0], window[1]]) {
            thai_hits += 1;
        }
    }
    for (i, byte) in raw.iter().enumerate() {
        if *byte >= 0x80 {
            high_bytes += 1;
        }
        // A CJK lead byte only counts when followed by two continuation bytes
        if CJK_UTF8_LEAD_BYTES.contains(byte)
            && raw.len() > i + 2
            && (0x80..0xC0).contains(&raw[i + 1])
            && (0x80..0xC0).contains(&raw[i + 2])
        {
            cjk_hits += 1;
        }
    }

    if thai_hits >= SCRIPT_HINT_MIN_COUNT && thai_hits >= cjk_hits {
        ScriptFamily::Thai
    } else if cjk_hits >= SCRIPT_HINT_MIN_COUNT {
        ScriptFamily::Cjk
    } else if high_bytes == 0 || high_bytes * 50 < raw.len() {
        ScriptFamily::Western
    } else {
        ScriptFamily::Unknown
    }
}

/// Statistical encoding guess over the raw bytes, resolved to an
/// encoding_rs encoding when the detector's label is usable
fn statistical_guess(raw: &[u8]) -> Option<&'static Encoding> {
    let (charset, confidence, _) = chardet::detect(raw);
    let label = chardet::charset2encoding(&charset);
    let encoding = Encoding::for_label(label.as_bytes());
    if let Some(enc) = encoding {
        debug!(
            "Statistical detector suggests '{}' (confidence {:.2})",
            enc.name(),
            confidence
        );
    }
    encoding
}

/// Build the ordered candidate list for a script family.
///
/// Western legacy tables are deliberately tried before UTF-8 for the
/// Western family: a UTF-8 file still decodes "successfully" through a
/// single-byte table, and the corruption markers are what reject that
/// decode. For the Thai family the order flips, with UTF-8 and the Thai
/// legacy table ahead of Western ones.
fn candidate_encodings(
    family: ScriptFamily,
    guess: Option<&'static Encoding>,
) -> Vec<&'static Encoding> {
    let mut labels: Vec<&'static Encoding> = Vec::new();

    let push = |enc: Option<&'static Encoding>, list: &mut Vec<&'static Encoding>| {
        if let Some(enc) = enc {
            if !list
                .iter()
                .any(|e| e.name().eq_ignore_ascii_case(enc.name()))
            {
                list.push(enc);
            }
        }
    };

    match family {
        ScriptFamily::Thai => {
            push(Some(encoding_rs::UTF_8), &mut labels);
            push(Encoding::for_label(b"windows-874"), &mut labels);
            push(guess, &mut labels);
            push(Some(encoding_rs::WINDOWS_1252), &mut labels);
        }
        ScriptFamily::Cjk => {
            push(Some(encoding_rs::UTF_8), &mut labels);
            push(guess, &mut labels);
            push(Encoding::for_label(b"gb18030"), &mut labels);
        }
        ScriptFamily::Western | ScriptFamily::Unknown => {
            push(Some(encoding_rs::WINDOWS_1252), &mut labels);
            push(Encoding::for_label(b"iso-8859-15"), &mut labels);
            push(guess, &mut labels);
            push(Some(encoding_rs::UTF_8), &mut labels);
        }
    }

    labels
}

/// Last-resort encodings tried after every candidate failed or showed
/// corruption, before degrading to a permissive decode
fn fallback_ladder(family: ScriptFamily) -> Vec<&'static Encoding> {
    let labels: &[&[u8]] = match family {
        ScriptFamily::Thai => &[b"windows-874"],
        ScriptFamily::Cjk => &[b"gb18030", b"shift_jis", b"euc-kr"],
        ScriptFamily::Western | ScriptFamily::Unknown => &[b"windows-1252"],
    };
    labels
        .iter()
        .filter_map(|l| Encoding::for_label(l))
        .collect()
}

/// Corruption marker substrings checked against a sampled decode for the
/// given script family
fn corruption_markers(family: ScriptFamily) -> Vec<&'static str> {
    let mut markers: Vec<&'static str> = WESTERN_MOJIBAKE_MARKERS.to_vec();
    if family == ScriptFamily::Thai {
        markers.extend(THAI_MOJIBAKE_MARKERS);
    }
    markers
}

/// True when the candidate is a Western single-byte table
fn is_western_legacy(encoding: &'static Encoding) -> bool {
    let name = encoding.name();
    name.eq_ignore_ascii_case("windows-1252") || name.to_ascii_lowercase().starts_with("iso-8859")
}

/// Join the text of the first few cues for corruption sampling
fn sample_text(cues: &[SubtitleCue]) -> String {
    cues.iter()
        .take(CORRUPTION_SAMPLE_CUES)
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// True when the sample contains codepoints from the Thai Unicode block
fn contains_thai_codepoints(sample: &str) -> bool {
    sample.chars().any(|c| ('\u{0E00}'..='\u{0E7F}').contains(&c))
}

/// Normalize every line-ending variant to a single LF convention
fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Attempt one candidate: decode, parse, and validate the sample against
/// the family's corruption markers.
///
/// Returns the parsed cues and the encoding that actually produced the
/// decode (a byte-order mark overrides the candidate table), `None` when
/// the candidate must be discarded. Decode trials reject on any
/// undecodable byte; the permissive final fallback is handled separately
/// by the caller.
fn try_candidate(
    raw: &[u8],
    encoding: &'static Encoding,
    family: ScriptFamily,
) -> Option<(Vec<SubtitleCue>, &'static Encoding)> {
    let (text, used, had_errors) = encoding.decode(raw);
    if had_errors {
        debug!("Candidate '{}' rejected: undecodable bytes", encoding.name());
        return None;
    }

    let text = normalize_newlines(&text);
    let cues = match SubtitleTrack::parse_srt_string(&text) {
        Ok(cues) => cues,
        Err(e) => {
            debug!("Candidate '{}' rejected: {}", encoding.name(), e);
            return None;
        }
    };

    let sample = sample_text(&cues);
    for marker in corruption_markers(family) {
        if sample.contains(marker) {
            debug!(
                "Candidate '{}' rejected: corruption marker {:?} in sample",
                encoding.name(),
                marker
            );
            return None;
        }
    }

    // A Thai-classified file decoded through a Western table can produce
    // valid-but-wrong text; require the script to actually be present.
    if family == ScriptFamily::Thai
        && is_western_legacy(used)
        && !contains_thai_codepoints(&sample)
    {
        debug!(
            "Candidate '{}' rejected: no Thai codepoints in Thai-classified file",
            encoding.name()
        );
        return None;
    }

    Some((cues, used))
}

/// Recover a subtitle track from raw bytes of unknown encoding.
///
/// Never fails on undecodable bytes: after the candidate list and the
/// per-family fallback ladder are exhausted, a permissive single-byte
/// decode with lossy substitution guarantees some text. The only error is
/// a document that cannot be parsed as an SRT container under any decode.
pub fn recover(raw: &[u8]) -> Result<(SubtitleTrack, EncodingDetection), SubtitleError> {
    let family = classify_script(raw);
    let guess = statistical_guess(raw);
    debug!("Classified raw bytes as {}", family.as_str());

    let candidates = candidate_encodings(family, guess);
    for encoding in candidates {
        if let Some((cues, used)) = try_candidate(raw, encoding, family) {
            debug!("Accepted encoding '{}'", used.name());
            let detection = EncodingDetection {
                encoding: used.name().to_string(),
                family,
                statistical_match: guess
                    .map(|g| g.name().eq_ignore_ascii_case(used.name()))
                    .unwrap_or(false),
            };
            return Ok((
                SubtitleTrack::from_cues(PathBuf::new(), cues),
                detection,
            ));
        }
    }

    // Fallback ladder: corruption checks no longer apply, a clean decode
    // plus a parsable document is enough.
    for encoding in fallback_ladder(family) {
        let (text, _, had_errors) = encoding.decode(raw);
        if had_errors {
            continue;
        }
        let text = normalize_newlines(&text);
        if let Ok(cues) = SubtitleTrack::parse_srt_string(&text) {
            warn!(
                "All candidates rejected, fell back to '{}'",
                encoding.name()
            );
            let detection = EncodingDetection {
                encoding: encoding.name().to_string(),
                family,
                statistical_match: false,
            };
            return Ok((SubtitleTrack::from_cues(PathBuf::new(), cues), detection));
        }
    }

    // Permissive last resort: a single-byte table maps every byte to some
    // character, so this decode cannot fail.
    let (text, _, _) = encoding_rs::WINDOWS_1252.decode(raw);
    let text = normalize_newlines(&text);
    warn!("Degraded to permissive windows-1252 decode with substitution");
    let cues = SubtitleTrack::parse_srt_string(&text)?;
    let detection = EncodingDetection {
        encoding: format!("{} (lossy)", encoding_rs::WINDOWS_1252.name()),
        family,
        statistical_match: false,
    };
    Ok((SubtitleTrack::from_cues(PathBuf::new(), cues), detection))
}
