use std::fs::{self, File};
use std::io;
use std::path::Path;

use gamever_core::{io_error, GameverError, Result};
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::fs_utils::hoist_dir_entries;

pub fn extract_zip(archive_path: &Path, destination: &Path) -> Result<usize> {
    let file = File::open(archive_path).map_err(io_error("open source archive", archive_path))?;
    let mut archive = ZipArchive::new(file).map_err(|err| zip_error(archive_path, err))?;
    fs::create_dir_all(destination).map_err(io_error("create source directory", destination))?;

    let mut extracted = 0_usize;
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|err| zip_error(archive_path, err))?;
        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            warn!(entry = entry.name(), "skipping archive entry with unsafe path");
            continue;
        };
        let out_path = destination.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)
                .map_err(io_error("create extracted directory", &out_path))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(io_error("create extracted directory", parent))?;
        }
        let mut outfile =
            File::create(&out_path).map_err(io_error("create extracted file", &out_path))?;
        io::copy(&mut entry, &mut outfile).map_err(io_error("write extracted file", &out_path))?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;

            fs::set_permissions(&out_path, fs::Permissions::from_mode(mode & 0o777))
                .map_err(io_error("set extracted file mode", &out_path))?;
        }
        extracted += 1;
    }

    debug!(
        archive = %archive_path.display(),
        destination = %destination.display(),
        files = extracted,
        "extracted source archive"
    );
    Ok(extracted)
}

/// Flattens `owner-repo-*` wrapper folders into `source_dir`.
///
/// Returns how many wrappers were hoisted. Zero is a valid outcome for archives without one.
pub fn flatten_wrapper_dirs(source_dir: &Path, wrapper_prefix: &str) -> Result<usize> {
    let prefix = wrapper_prefix.to_ascii_lowercase();
    let mut wrappers = Vec::new();
    for entry in fs::read_dir(source_dir).map_err(io_error("read source directory", source_dir))? {
        let entry = entry.map_err(io_error("read source directory", source_dir))?;
        let is_dir = entry
            .file_type()
            .map_err(io_error("stat extracted entry", &entry.path()))?
            .is_dir();
        let matches_prefix = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.to_ascii_lowercase().starts_with(&prefix));
        if is_dir && matches_prefix {
            wrappers.push(entry.path());
        }
    }

    for wrapper in &wrappers {
        hoist_dir_entries(wrapper, source_dir)?;
        debug!(wrapper = %wrapper.display(), "flattened archive wrapper");
    }
    Ok(wrappers.len())
}

fn zip_error(archive_path: &Path, err: zip::result::ZipError) -> GameverError {
    match err {
        zip::result::ZipError::Io(source) => GameverError::Io {
            operation: "read source archive",
            path: archive_path.to_path_buf(),
            source,
        },
        other => GameverError::Decode {
            what: "source archive",
            target: archive_path.display().to_string(),
            message: other.to_string(),
            on_disk: true,
        },
    }
}
