use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{io_error, GameverError, Result};

pub const DESCRIPTOR_FILE_NAME: &str = "launch.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchArgument {
    pub name: String,
    #[serde(default)]
    pub default: String,
    pub label: Option<String>,
}

impl LaunchArgument {
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchMode {
    pub label: Option<String>,
    #[serde(default)]
    pub args: Vec<LaunchArgument>,
}

impl LaunchMode {
    /// The game takes a single positional argument after the mode keyword.
    pub fn primary_argument(&self) -> Option<&LaunchArgument> {
        self.args.first()
    }
}

/// Launch modes shipped inside a version's `source/launch.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchDescriptor {
    pub default_mode: Option<String>,
    #[serde(default)]
    pub modes: BTreeMap<String, LaunchMode>,
}

impl LaunchDescriptor {
    pub fn from_toml_str(input: &str) -> std::result::Result<Self, String> {
        let descriptor: Self = toml::from_str(input).map_err(|err| err.to_string())?;
        if descriptor.modes.is_empty() {
            return Err("launch descriptor must declare at least one mode".to_string());
        }
        for name in descriptor.modes.keys() {
            if name.trim().is_empty() || name.chars().any(char::is_whitespace) {
                return Err(format!("invalid launch mode name '{name}'"));
            }
        }
        if let Some(default_mode) = &descriptor.default_mode {
            if !descriptor.modes.contains_key(default_mode) {
                return Err(format!(
                    "default_mode '{default_mode}' is not a declared launch mode"
                ));
            }
        }
        Ok(descriptor)
    }

    /// Modes the game understands when a version ships no descriptor.
    pub fn builtin() -> Self {
        let mut modes = BTreeMap::new();
        modes.insert(
            "host".to_string(),
            LaunchMode {
                label: Some("Host a game".to_string()),
                args: vec![LaunchArgument {
                    name: "port".to_string(),
                    default: "8080".to_string(),
                    label: Some("Port".to_string()),
                }],
            },
        );
        modes.insert(
            "join".to_string(),
            LaunchMode {
                label: Some("Join a game".to_string()),
                args: vec![LaunchArgument {
                    name: "address".to_string(),
                    default: String::new(),
                    label: Some("Join link".to_string()),
                }],
            },
        );
        Self {
            default_mode: Some("host".to_string()),
            modes,
        }
    }

    /// Reads the descriptor at `path`; a missing file is `None`.
    pub fn load_optional(path: &Path) -> Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }

        let raw = fs::read_to_string(path).map_err(io_error("read launch descriptor", path))?;
        let descriptor = Self::from_toml_str(&raw).map_err(|message| GameverError::Decode {
            what: "launch descriptor",
            target: path.display().to_string(),
            message,
            on_disk: true,
        })?;
        Ok(Some(descriptor))
    }

    pub fn load_or_builtin(path: &Path) -> Result<Self> {
        Ok(Self::load_optional(path)?.unwrap_or_else(Self::builtin))
    }

    pub fn mode(&self, name: &str) -> Option<&LaunchMode> {
        self.modes.get(name)
    }

    pub fn default_mode_name(&self) -> Option<&str> {
        self.default_mode
            .as_deref()
            .or_else(|| self.modes.keys().next().map(String::as_str))
    }

    pub fn mode_names(&self) -> Vec<&str> {
        self.modes.keys().map(String::as_str).collect()
    }
}
