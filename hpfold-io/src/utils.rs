use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::info;

/// Creates `path`'s parent directory (and any missing ancestors), if it has
/// one and it doesn't already exist. Shared by [`out_writer`] and by callers
/// that write a file through some other API (e.g. an image encoder) but
/// still need the destination directory to exist first.
pub fn ensure_parent_dir(path: &str) -> io::Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Opens `fname` for writing, creating parent directories if necessary.
///
/// Mirrors the small file-opening helpers bioshell-io provides rather than
/// inlining `File::create` at every call site.
pub fn out_writer(fname: &str) -> io::Result<BufWriter<File>> {
    ensure_parent_dir(fname)?;
    info!("writing to {fname}");
    Ok(BufWriter::new(File::create(fname)?))
}
