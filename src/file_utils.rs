use anyhow::{Result, Context};
use std::fs;
use std::path::{Path, PathBuf};
use regex::Regex;
use once_cell::sync::Lazy;

// @module: File and directory utilities for the command-line front end

// @const: SRT block start (sequence number followed by a time line)
static SRT_BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+\s*\r?\n\d{2,}:\d{2}:\d{2},\d{3}\s+-->\s+\d{2,}:\d{2}:\d{2},\d{3}").unwrap()
});

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        }
        Ok(())
    }

    // @generates: Output path for a rendered format
    // @params: input_file, output_dir, extension
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        extension: &str,
    ) -> PathBuf {
        let stem = input_file.as_ref().file_stem().unwrap_or_default();

        let mut output_filename = stem.to_string_lossy().to_string();
        output_filename.push('.');
        output_filename.push_str(extension);

        output_dir.as_ref().join(output_filename)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file, creating the parent directory
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                Self::ensure_dir(parent)?;
            }
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))
    }

    /// Decide how an input file should be read, by extension first, then by content
    pub fn detect_input_type<P: AsRef<Path>>(path: P, content: &str) -> InputType {
        if let Some(ext) = path.as_ref().extension() {
            match ext.to_string_lossy().to_lowercase().as_str() {
                "json" => return InputType::Json,
                "srt" => return InputType::Srt,
                _ => {}
            }
        }

        let trimmed = content.trim_start();
        if trimmed.starts_with('[') || trimmed.starts_with('{') {
            InputType::Json
        } else if SRT_BLOCK_REGEX.is_match(content) {
            InputType::Srt
        } else {
            InputType::Unknown
        }
    }
}

/// Kinds of input the front end understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    /// JSON payload with raw subtitle items
    Json,
    /// SubRip subtitle file
    Srt,
    /// Unknown file type
    Unknown,
}
