use anyhow::{Result, Context};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Read a file's raw bytes; decoding is the recovery engine's job
    pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        fs::read(&path).with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Find files with a specific extension in a directory
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let normalized_ext = extension.trim_start_matches('.');

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(normalized_ext) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        Ok(result)
    }

    /// True for the subtitle container extensions this tool processes
    pub fn is_subtitle_file<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("srt"))
            .unwrap_or(false)
    }

    // @generates: Output path for a merged episode pair
    pub fn merged_output_path<P: AsRef<Path>>(output_dir: P, episode_code: &str) -> PathBuf {
        output_dir
            .as_ref()
            .join(format!("Merged_{}.srt", episode_code))
    }

    // @generates: Output path for a processed single file, prefix style
    pub fn prefixed_output_path<P: AsRef<Path>>(input_file: P, prefix: &str) -> PathBuf {
        let input_file = input_file.as_ref();
        let file_name = input_file
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| "output.srt".to_string());
        let dir = input_file.parent().unwrap_or(Path::new("."));
        dir.join(format!("{}{}", prefix, file_name))
    }
}
