use std::fs;
use std::path::{Path, PathBuf};

use gamever_core::{io_error, validate_version_name, GameverError, Result, VersionMetadata};
use tracing::{info, warn};

use crate::layout::VersionLayout;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct InstalledVersion {
    /// Directory name; the canonical identity of the version.
    pub name: String,
    /// Version text recorded at install time. Display only.
    pub metadata_version: String,
}

/// Finalized versions under one download root.
#[derive(Debug, Clone)]
pub struct VersionStore {
    layout: VersionLayout,
}

impl VersionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            layout: VersionLayout::new(root),
        }
    }

    pub fn layout(&self) -> &VersionLayout {
        &self.layout
    }

    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    /// Subdirectories carrying a readable metadata record, sorted by name.
    pub fn list_installed(&self) -> Result<Vec<InstalledVersion>> {
        let mut installed = Vec::new();
        for name in self.version_dir_names()? {
            let metadata_path = self.layout.metadata_path(&name);
            if !metadata_path.is_file() {
                continue;
            }
            match VersionMetadata::read_from(&metadata_path) {
                Ok(metadata) => installed.push(InstalledVersion {
                    name,
                    metadata_version: metadata.version,
                }),
                Err(err) => {
                    warn!(version = %name, error = %err, "ignoring unreadable version metadata");
                }
            }
        }
        installed.sort();
        Ok(installed)
    }

    pub fn installed_names(&self) -> Result<Vec<String>> {
        Ok(self
            .list_installed()?
            .into_iter()
            .map(|version| version.name)
            .collect())
    }

    /// Directories without a readable metadata record: interrupted or corrupt installs.
    pub fn list_incomplete(&self) -> Result<Vec<String>> {
        let mut incomplete = Vec::new();
        for name in self.version_dir_names()? {
            let metadata_path = self.layout.metadata_path(&name);
            if !metadata_path.is_file() || VersionMetadata::read_from(&metadata_path).is_err() {
                incomplete.push(name);
            }
        }
        incomplete.sort();
        Ok(incomplete)
    }

    pub fn contains(&self, name: &str) -> bool {
        validate_version_name(name).is_ok() && self.layout.version_dir(name).exists()
    }

    pub fn read_metadata(&self, name: &str) -> Result<VersionMetadata> {
        validate_version_name(name)?;
        let path = self.layout.metadata_path(name);
        if !path.is_file() {
            return Err(GameverError::not_found("installed version", name));
        }
        VersionMetadata::read_from(&path)
    }

    pub fn write_metadata(&self, name: &str, metadata: &VersionMetadata) -> Result<()> {
        validate_version_name(name)?;
        let dir = self.layout.version_dir(name);
        if !dir.is_dir() {
            return Err(GameverError::not_found("version directory", name));
        }
        metadata.write_to(&self.layout.metadata_path(name))
    }

    /// Renames the version directory. The metadata record keeps its original version text.
    pub fn rename(&self, old_name: &str, new_name: &str) -> Result<()> {
        validate_version_name(new_name)?;
        validate_version_name(old_name)?;

        let from = self.layout.version_dir(old_name);
        if !from.is_dir() {
            return Err(GameverError::not_found("version directory", old_name));
        }
        let to = self.layout.version_dir(new_name);
        if to.exists() {
            return Err(GameverError::Conflict(new_name.to_string()));
        }

        fs::rename(&from, &to).map_err(io_error("rename version directory", &from))?;
        info!(from = old_name, to = new_name, "renamed version");
        Ok(())
    }

    /// Recursively removes the version directory. Irreversible.
    pub fn delete(&self, name: &str) -> Result<()> {
        validate_version_name(name)?;
        let dir = self.layout.version_dir(name);
        if !dir.is_dir() {
            return Err(GameverError::not_found("version directory", name));
        }

        fs::remove_dir_all(&dir).map_err(io_error("delete version directory", &dir))?;
        info!(version = name, "deleted version");
        Ok(())
    }

    /// Path of the game binary. Existence is checked by the launcher, not here.
    pub fn locate_executable(&self, name: &str) -> PathBuf {
        self.layout.executable_path(name)
    }

    fn version_dir_names(&self) -> Result<Vec<String>> {
        let root = self.layout.root();
        if !root.is_dir() {
            return Err(GameverError::not_found(
                "download directory",
                root.display().to_string(),
            ));
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(root).map_err(io_error("read download directory", root))? {
            let entry = entry.map_err(io_error("read download directory", root))?;
            if !entry.path().is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                warn!(
                    path = %entry.path().display(),
                    "skipping version directory with non-UTF-8 name"
                );
                continue;
            };
            names.push(name);
        }
        Ok(names)
    }
}
