use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use once_cell::sync::Lazy;
use regex::Regex;

// @module: Episode-code extraction and file pairing

// @const: Episode patterns, tried in order of specificity
static EPISODE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"[sS]\d+[eE]\d+").unwrap(),
        Regex::new(r"\d+[xX]\d+").unwrap(),
        Regex::new(r"[eE]\d+").unwrap(),
        Regex::new(r"\d{3,4}").unwrap(),
    ]
});

/// Extract an episode grouping key from a filename.
///
/// Tries "S01E02", "1x02", "E02", then a bare 3-4 digit run, returning the
/// first match upper-cased. Falls back to the filename with its extension
/// stripped so that unmatched files still group with themselves.
pub fn extract_episode_code(filename: &str) -> String {
    for pattern in EPISODE_PATTERNS.iter() {
        if let Some(m) = pattern.find(filename) {
            return m.as_str().to_uppercase();
        }
    }

    Path::new(filename)
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| filename.to_string())
}

/// Group a list of subtitle files by their episode code
pub fn group_by_episode(files: &[PathBuf]) -> BTreeMap<String, Vec<PathBuf>> {
    let mut groups: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for file in files {
        let name = file
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_default();
        groups.entry(extract_episode_code(&name)).or_default().push(file.clone());
    }
    groups
}

/// Split an episode pair into (track A, track B) using a filename keyword.
///
/// The file whose name contains the keyword (case-insensitive) becomes
/// track B; when the keyword matches neither name, the second file is B.
/// Returns `None` unless the group holds exactly two files.
pub fn identify_pair(pair: &[PathBuf], track_b_keyword: &str) -> Option<(PathBuf, PathBuf)> {
    if pair.len() != 2 {
        return None;
    }

    let keyword = track_b_keyword.to_lowercase();
    let first_name = pair[0]
        .file_name()
        .map(|f| f.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if !keyword.is_empty() && first_name.contains(&keyword) {
        Some((pair[1].clone(), pair[0].clone()))
    } else {
        Some((pair[0].clone(), pair[1].clone()))
    }
}
