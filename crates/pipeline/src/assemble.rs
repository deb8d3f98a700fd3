//! Repacks the working directory into a deck archive.

use std::fs;
use std::io::Write;
use std::path::Path;

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::PipelineError;

/// Write the working directory's contents into a zip archive at `dest`.
///
/// Internal relative paths are preserved exactly (the deck format requires
/// root-relative paths matching the original template layout). An existing
/// file at `dest` is overwritten.
pub fn assemble_deck(workdir: &Path, dest: &Path) -> Result<(), PipelineError> {
    let file = fs::File::create(dest)?;
    let mut archive = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(workdir).sort_by_file_name() {
        let entry = entry.map_err(|e| PipelineError::Io(e.into()))?;
        let path = entry.path();
        let Ok(rel) = path.strip_prefix(workdir) else {
            continue;
        };
        if rel.as_os_str().is_empty() {
            continue;
        }
        // Archive entry names always use forward slashes.
        let name = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if entry.file_type().is_dir() {
            archive.add_directory(name, options)?;
        } else {
            archive.start_file(name, options)?;
            archive.write_all(&fs::read(path)?)?;
        }
    }
    archive.finish()?;
    tracing::debug!(deck = %dest.display(), "deck assembled");
    Ok(())
}
