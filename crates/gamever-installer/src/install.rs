use std::fs;
use std::path::PathBuf;

use gamever_core::{
    io_error, validate_version_name, verify_sha256_file, GameverError, Release, ReleaseAsset,
    RepoCoordinates, Result, VersionMetadata,
};
use gamever_remote::{download_to_path, Client};
use tracing::{debug, info};

use crate::extract::{extract_zip, flatten_wrapper_dirs};
use crate::fs_utils::remove_file_if_exists;
use crate::layout::VersionLayout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStage<'a> {
    DownloadArchive,
    Extract,
    DownloadAsset(&'a str),
    Finalize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallEvent<'a> {
    Stage(InstallStage<'a>),
    Transfer {
        label: &'a str,
        downloaded: u64,
        total: Option<u64>,
    },
}

/// Downloads one release into `<root>/<name>/`.
///
/// The metadata record is written last. A failure at any step leaves the metadata-less
/// directory in place for the caller to inspect or delete; the store does not list it.
#[derive(Debug, Clone)]
pub struct VersionInstaller {
    client: Client,
    wrapper_prefix: String,
}

impl VersionInstaller {
    pub fn new(client: Client, coordinates: &RepoCoordinates) -> Self {
        Self {
            client,
            wrapper_prefix: coordinates.archive_wrapper_prefix(),
        }
    }

    pub fn install(
        &self,
        release: &Release,
        destination_name: &str,
        layout: &VersionLayout,
    ) -> Result<PathBuf> {
        self.install_with_progress(release, destination_name, layout, |_event| {})
    }

    pub fn install_with_progress<F>(
        &self,
        release: &Release,
        destination_name: &str,
        layout: &VersionLayout,
        mut observer: F,
    ) -> Result<PathBuf>
    where
        F: FnMut(InstallEvent<'_>),
    {
        validate_version_name(destination_name)?;
        for asset in &release.assets {
            validate_asset_name(asset)?;
        }

        let version_dir = layout.version_dir(destination_name);
        fs::create_dir_all(&version_dir)
            .map_err(io_error("create version directory", &version_dir))?;
        // An earlier record must not vouch for files this install is about to replace.
        let metadata_path = layout.metadata_path(destination_name);
        remove_file_if_exists(&metadata_path)
            .map_err(io_error("remove stale version metadata", &metadata_path))?;
        info!(
            release = %release.display_name,
            version = destination_name,
            path = %version_dir.display(),
            "installing release"
        );

        observer(InstallEvent::Stage(InstallStage::DownloadArchive));
        let archive_path = layout.archive_tmp_path(destination_name);
        download_to_path(
            &self.client,
            &release.source_archive_url,
            &archive_path,
            |downloaded, total| {
                observer(InstallEvent::Transfer {
                    label: "source",
                    downloaded,
                    total,
                })
            },
        )?;

        observer(InstallEvent::Stage(InstallStage::Extract));
        let source_dir = layout.source_dir(destination_name);
        extract_zip(&archive_path, &source_dir)?;
        let flattened = flatten_wrapper_dirs(&source_dir, &self.wrapper_prefix)?;
        if flattened == 0 {
            debug!(
                prefix = %self.wrapper_prefix,
                "source archive has no wrapper directory; leaving layout as extracted"
            );
        }
        remove_file_if_exists(&archive_path)
            .map_err(io_error("remove source archive", &archive_path))?;

        for asset in &release.assets {
            observer(InstallEvent::Stage(InstallStage::DownloadAsset(&asset.name)));
            let asset_path = source_dir.join(&asset.name);
            download_to_path(&self.client, &asset.url, &asset_path, |downloaded, total| {
                observer(InstallEvent::Transfer {
                    label: &asset.name,
                    downloaded,
                    total,
                })
            })?;
            if let Some(expected) = asset.sha256() {
                verify_sha256_file(&asset_path, expected)?;
            }
            debug!(asset = %asset.name, "asset downloaded");
        }

        observer(InstallEvent::Stage(InstallStage::Finalize));
        VersionMetadata::new(destination_name).write_to(&metadata_path)?;
        info!(version = destination_name, "install complete");
        Ok(version_dir)
    }
}

fn validate_asset_name(asset: &ReleaseAsset) -> Result<()> {
    let name = asset.name.as_str();
    let reason = if name.trim().is_empty() {
        Some("asset name must not be empty")
    } else if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        Some("asset name must be a plain file name")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(GameverError::Validation {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
