use std::fs;
use std::io;
use std::path::Path;

use gamever_core::{io_error, Result};

pub fn remove_file_if_exists(path: &Path) -> io::Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Merges every entry of `from` into `to`, then removes the emptied `from`.
///
/// Directories present on both sides are merged recursively. Any other entry already at the
/// destination is replaced, so extracting over an earlier install converges on the new tree.
pub(crate) fn hoist_dir_entries(from: &Path, to: &Path) -> Result<()> {
    for entry in fs::read_dir(from).map_err(io_error("read wrapper directory", from))? {
        let entry = entry.map_err(io_error("read wrapper directory", from))?;
        let source = entry.path();
        let destination = to.join(entry.file_name());

        if source.is_dir() && destination.is_dir() {
            hoist_dir_entries(&source, &destination)?;
            continue;
        }
        if destination.is_dir() {
            fs::remove_dir_all(&destination)
                .map_err(io_error("replace extracted directory", &destination))?;
        } else if destination.exists() {
            fs::remove_file(&destination)
                .map_err(io_error("replace extracted file", &destination))?;
        }
        fs::rename(&source, &destination)
            .map_err(io_error("move extracted entry", &destination))?;
    }
    fs::remove_dir(from).map_err(io_error("remove wrapper directory", from))
}
