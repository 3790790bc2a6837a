use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{io_error, GameverError, Result};

pub const METADATA_FILE_NAME: &str = "metadata.toml";

/// Finalization marker written last by the installer.
///
/// `version` is display text recorded at install time. The directory name stays the canonical
/// identity, and a rename does not touch this record, so the two may drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionMetadata {
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct MetadataDocument {
    metadata: VersionMetadata,
}

impl VersionMetadata {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    pub fn from_toml_str(input: &str) -> std::result::Result<Self, toml::de::Error> {
        let document: MetadataDocument = toml::from_str(input)?;
        Ok(document.metadata)
    }

    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string(&MetadataDocument {
            metadata: self.clone(),
        })
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(io_error("read version metadata", path))?;
        Self::from_toml_str(&raw).map_err(|err| GameverError::Decode {
            what: "version metadata",
            target: path.display().to_string(),
            message: err.to_string(),
            on_disk: true,
        })
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let payload = self.to_toml_string().map_err(|err| GameverError::Decode {
            what: "version metadata",
            target: path.display().to_string(),
            message: err.to_string(),
            on_disk: true,
        })?;
        fs::write(path, payload).map_err(io_error("write version metadata", path))
    }
}
