//! Create output from a field map: field files and archives of them.

pub mod archive;
pub mod file;

use crate::error::Result;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Directory that a new file at `path` will be created in.
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// Writes `contents` to `path` via a temporary file in the same directory.
///
/// The destination only ever holds the old contents or the complete new contents.
pub fn persist_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let mut temp = NamedTempFile::new_in(parent_dir(path))?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    temp.persist(path)?;
    Ok(())
}
