use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

/// Output format of a results file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
}

impl OutputFormat {
    // @returns: File extension without the dot
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @generates: Default results path next to the input, e.g. `notes.french.json`
    pub fn generate_output_path<P: AsRef<Path>>(input_file: P, target_language: &str, format: OutputFormat) -> PathBuf {
        let input_file = input_file.as_ref();
        let stem = input_file.file_stem().unwrap_or_default().to_string_lossy();

        let language_tag: String = target_language
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();

        let output_filename = format!("{}.{}.{}", stem, language_tag, format.extension());
        match input_file.parent() {
            Some(parent) => parent.join(output_filename),
            None => PathBuf::from(output_filename),
        }
    }

    /// Read a document to translate
    pub fn read_document<P: AsRef<Path>>(path: P) -> Result<String> {
        let path = path.as_ref();
        if !Self::file_exists(path) {
            return Err(anyhow!("Input file does not exist: {:?}", path));
        }
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))
    }

    /// Write a string to a file, refusing to replace an existing file unless `force` is set
    pub fn write_output<P: AsRef<Path>>(path: P, content: &str, force: bool) -> Result<()> {
        let path = path.as_ref();
        if path.exists() && !force {
            return Err(anyhow!(
                "Output file already exists: {:?}. Use -f to force overwrite.",
                path
            ));
        }

        // Ensure the parent directory exists
        if let Some(parent) = path.parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(path, content).with_context(|| format!("Failed to write to file: {:?}", path))
    }
}
