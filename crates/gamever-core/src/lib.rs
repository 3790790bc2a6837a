mod config;
mod descriptor;
mod digest;
mod error;
mod metadata;
mod names;
mod release;

pub use config::{
    default_config_root, Config, ConfigStore, DownloadDirStatus, APP_DIR_NAME, CONFIG_DIR_ENV,
    CONFIG_FILE_NAME,
};
pub use descriptor::{LaunchArgument, LaunchDescriptor, LaunchMode, DESCRIPTOR_FILE_NAME};
pub use digest::{sha256_file_hex, verify_sha256_file};
pub use error::{io_error, ErrorKind, GameverError, Result};
pub use metadata::{VersionMetadata, METADATA_FILE_NAME};
pub use names::validate_version_name;
pub use release::{
    Release, ReleaseAsset, RepoCoordinates, DEFAULT_OWNER, DEFAULT_REPO, GITHUB_API_ROOT,
};

#[cfg(test)]
mod tests;
