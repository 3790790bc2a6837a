use std::path::{Path, PathBuf};

use gamever_core::{DESCRIPTOR_FILE_NAME, METADATA_FILE_NAME};

pub const SOURCE_DIR_NAME: &str = "source";

pub const EXECUTABLE_NAME: &str = if cfg!(windows) { "main.exe" } else { "main" };

/// Paths of the on-disk version store rooted at the configured download directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionLayout {
    root: PathBuf,
}

impl VersionLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn version_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn source_dir(&self, name: &str) -> PathBuf {
        self.version_dir(name).join(SOURCE_DIR_NAME)
    }

    pub fn metadata_path(&self, name: &str) -> PathBuf {
        self.version_dir(name).join(METADATA_FILE_NAME)
    }

    pub fn descriptor_path(&self, name: &str) -> PathBuf {
        self.source_dir(name).join(DESCRIPTOR_FILE_NAME)
    }

    pub fn archive_tmp_path(&self, name: &str) -> PathBuf {
        self.version_dir(name).join(format!("{name}_source.zip"))
    }

    pub fn executable_path(&self, name: &str) -> PathBuf {
        self.source_dir(name).join(EXECUTABLE_NAME)
    }
}
