//! In-memory filesystem used to stage generated output

use crate::error::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A generated file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// File content as bytes
    pub content: Vec<u8>,
    /// Module that generated the file
    pub module: String,
}

impl File {
    /// Create a new file with content
    pub fn new(content: Vec<u8>, module: &str) -> Self {
        Self {
            content,
            module: module.to_string(),
        }
    }

    /// Create a new file from string content
    pub fn from_string(content: &str, module: &str) -> Self {
        Self::new(content.as_bytes().to_vec(), module)
    }

    /// Get file size in bytes
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// Staging area for generated output, keyed by path relative to the
/// output root.
#[derive(Debug, Clone, Default)]
pub struct MemoryFS {
    files: BTreeMap<PathBuf, File>,
}

impl MemoryFS {
    /// Create a new empty filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, replacing any file at the same path.
    ///
    /// Ownership of output paths is checked by the build log, not here.
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P, file: File) -> Result<()> {
        self.files.insert(path.as_ref().to_path_buf(), file);
        Ok(())
    }

    /// Add a file with string content
    pub fn add_file_string<P: AsRef<Path>>(&mut self, path: P, content: &str, module: &str) -> Result<()> {
        self.add_file(path, File::from_string(content, module))
    }

    /// Get a file by path
    pub fn get_file<P: AsRef<Path>>(&self, path: P) -> Option<&File> {
        self.files.get(path.as_ref())
    }

    /// Check if a file exists
    pub fn exists<P: AsRef<Path>>(&self, path: P) -> bool {
        self.files.contains_key(path.as_ref())
    }

    /// List all files in path order
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.files.keys().cloned().collect()
    }

    /// Get the number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if filesystem is empty
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate over all files as (path, file) pairs in path order
    pub fn files(&self) -> impl Iterator<Item = (&PathBuf, &File)> {
        self.files.iter()
    }
}
