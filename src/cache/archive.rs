//! Tar.gz archives for cache payloads

use crate::error::{Error, Result};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::fs::File;
use std::path::Path;
use tar::{Archive, Builder};
use tracing::debug;

/// Archive `paths` (files or directories, relative to `root`) into a
/// gzipped tarball at `dest`. Returns the archive size in bytes.
///
/// Paths that don't exist are skipped; an archive with no content at all
/// is an error because saving it would cache nothing.
pub fn create_archive(root: &Path, paths: &[String], dest: &Path) -> Result<u64> {
    let file = File::create(dest)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = Builder::new(encoder);
    let mut appended = 0usize;

    for path in paths {
        let full = root.join(path);
        if full.is_dir() {
            builder.append_dir_all(path, &full)?;
            appended += 1;
        } else if full.is_file() {
            builder.append_path_with_name(&full, path)?;
            appended += 1;
        } else {
            debug!(path = %full.display(), "cache path missing, skipping");
        }
    }

    if appended == 0 {
        return Err(Error::Cache(format!(
            "none of the configured cache paths exist: {}",
            paths.join(", ")
        )));
    }

    let encoder = builder.into_inner()?;
    let file = encoder.finish()?;
    let size = file.metadata()?.len();
    debug!(size, dest = %dest.display(), "created cache archive");
    Ok(size)
}

/// Unpack a gzipped tarball into `dest_dir`.
pub fn extract_archive(src: &Path, dest_dir: &Path) -> Result<()> {
    let file = File::open(src)?;
    let mut archive = Archive::new(GzDecoder::new(file));
    archive.unpack(dest_dir)?;
    debug!(src = %src.display(), "extracted cache archive");
    Ok(())
}
