//! Compresses written field files into archives.

use crate::error::{FieldMapError, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Bundles files into a single archive at `destination`.
///
/// Implementations store each file under its base name and must not modify the input files.
pub trait Archiver {
    fn archive(&self, files: &[&Path], destination: &Path) -> Result<()>;
}

/// Writes gzip compressed tar archives, the form BDSIM example field maps are distributed in.
pub struct TarGzArchiver {
    pub compression: Compression,
}

impl Default for TarGzArchiver {
    fn default() -> Self {
        TarGzArchiver {
            compression: Compression::default(),
        }
    }
}

impl Archiver for TarGzArchiver {
    fn archive(&self, files: &[&Path], destination: &Path) -> Result<()> {
        let temp = NamedTempFile::new_in(super::parent_dir(destination))?;
        {
            let encoder = GzEncoder::new(temp.as_file(), self.compression);
            let mut builder = tar::Builder::new(encoder);
            builder.mode(tar::HeaderMode::Deterministic);
            for file in files {
                let name = file.file_name().ok_or_else(|| {
                    FieldMapError::Io(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("{} has no file name", file.display()),
                    ))
                })?;
                builder.append_path_with_name(file, name)?;
            }
            builder.into_inner()?.finish()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(destination)?;
        debug!("archived {} file(s) to {}", files.len(), destination.display());
        Ok(())
    }
}
