//! Phase 6: Writing to Disk
//!
//! The final phase of the build pipeline. Writes the generated files to the
//! output directory.
//!
//! ## Process
//!
//! 1.  **Iterate Files**: The process iterates through all files in the
//!     MemoryFS, in path order.
//!
//! 2.  **Create Directories**: For each file, creates any necessary parent
//!     directories recursively.
//!
//! 3.  **Write Content**: Writes the file content to disk, replacing files
//!     from earlier runs.
//!
//! Files that were written before a failure are not rolled back. Concurrent
//! runs against the same output directory are not coordinated.

use std::fs;
use std::path::Path;

use log::debug;

use crate::error::{Error, Result};
use crate::filesystem::MemoryFS;

/// Execute Phase 6: Write the generated files below `output_path`.
pub fn execute(files: &MemoryFS, output_path: &Path) -> Result<()> {
    for (relative_path, file) in files.files() {
        let full_path = output_path.join(relative_path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::Path {
                message: format!("Failed to create directory '{}': {}", parent.display(), e),
            })?;
        }

        fs::write(&full_path, &file.content).map_err(|e| Error::Path {
            message: format!("Failed to write file '{}': {}", full_path.display(), e),
        })?;
        debug!("Wrote {} ({} bytes)", full_path.display(), file.size());
    }
    Ok(())
}
