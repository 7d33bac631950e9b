/*!
 * Tests for file system utilities
 */

use std::path::PathBuf;
use anyhow::Result;
use subforge::file_utils::FileManager;
use crate::common;

/// Test finding files by extension
#[test]
fn test_find_files_withMixedExtensions_shouldReturnOnlyMatching() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();

    common::create_test_file(&dir, "a.srt", "x")?;
    common::create_test_file(&dir, "b.SRT", "x")?;
    common::create_test_file(&dir, "c.txt", "x")?;

    let mut found = FileManager::find_files(&dir, "srt")?;
    found.sort();

    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|p| FileManager::is_subtitle_file(p)));
    Ok(())
}

/// Test subtitle extension detection
#[test]
fn test_is_subtitle_file_withVariousPaths_shouldMatchSrtOnly() {
    assert!(FileManager::is_subtitle_file("movie.srt"));
    assert!(FileManager::is_subtitle_file("movie.SRT"));
    assert!(!FileManager::is_subtitle_file("movie.mkv"));
    assert!(!FileManager::is_subtitle_file("movie"));
}

/// Test merged output naming
#[test]
fn test_merged_output_path_withEpisodeCode_shouldUseMergedPrefix() {
    let path = FileManager::merged_output_path("/out", "S01E02");
    assert_eq!(path, PathBuf::from("/out/Merged_S01E02.srt"));
}

/// Test prefixed output naming stays in the input directory
#[test]
fn test_prefixed_output_path_withInputFile_shouldPrefixFilename() {
    let path = FileManager::prefixed_output_path("/subs/movie.en.srt", "AI_");
    assert_eq!(path, PathBuf::from("/subs/AI_movie.en.srt"));
}

/// Test reading raw bytes round trips binary content
#[test]
fn test_read_bytes_withBinaryContent_shouldReturnExactBytes() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    let content: &[u8] = &[0xE0, 0xB8, 0xAA, 0x0A, 0xFF];

    let path = common::create_test_bytes(&dir, "raw.srt", content)?;
    let read = FileManager::read_bytes(&path)?;

    assert_eq!(read, content);
    Ok(())
}

/// Test writing creates parent directories
#[test]
fn test_write_to_file_withMissingParent_shouldCreateDirectories() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("a/b/out.srt");

    FileManager::write_to_file(&nested, "content")?;

    assert!(FileManager::file_exists(&nested));
    Ok(())
}
