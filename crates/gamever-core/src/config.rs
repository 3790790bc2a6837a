use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{io_error, GameverError, Result};

pub const APP_DIR_NAME: &str = "first-go-game-launcher";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const CONFIG_DIR_ENV: &str = "GAMEVER_CONFIG_DIR";

static CONFIG_WRITE_COUNTER: AtomicU64 = AtomicU64::new(0);
// Serializes read-modify-write cycles of every store in this process.
static CONFIG_UPDATE_LOCK: Mutex<()> = Mutex::new(());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub download_dir: PathBuf,
    pub selected_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadDirStatus {
    Present(PathBuf),
    Reset { missing: PathBuf, reset_to: PathBuf },
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    download_dir: Option<PathBuf>,
    #[serde(default)]
    version: String,
}

/// Persisted launcher settings, rewritten wholesale on every mutation.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    root: PathBuf,
}

impl ConfigStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn open_default() -> Result<Self> {
        Ok(Self::new(default_config_root()?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    pub fn default_download_dir(&self) -> PathBuf {
        self.root.join("versions")
    }

    /// Reads the config, creating it with the default download directory on first access.
    pub fn load(&self) -> Result<Config> {
        let path = self.config_path();
        if !path.exists() {
            let config = Config {
                download_dir: self.default_download_dir(),
                selected_version: String::new(),
            };
            create_dir(&config.download_dir)?;
            self.save(&config)?;
            info!(path = %path.display(), "created default config");
            return Ok(config);
        }

        let document = self.read_document(&path)?;
        Ok(Config {
            download_dir: document
                .settings
                .download_dir
                .unwrap_or_else(|| self.default_download_dir()),
            selected_version: document.settings.version,
        })
    }

    pub fn selected_version(&self) -> Result<String> {
        Ok(self.load()?.selected_version)
    }

    pub fn set_selected_version(&self, name: &str) -> Result<()> {
        self.update(|config| {
            config.selected_version = name.to_string();
            true
        })?;
        Ok(())
    }

    /// Writes `new` only if the stored selection still equals `expected`.
    ///
    /// Returns `false` without touching the file when another writer changed the selection
    /// after the caller read it.
    pub fn replace_selected_version(&self, expected: &str, new: &str) -> Result<bool> {
        self.update(|config| {
            if config.selected_version != expected {
                return false;
            }
            config.selected_version = new.to_string();
            true
        })
    }

    pub fn download_dir(&self) -> Result<PathBuf> {
        Ok(self.load()?.download_dir)
    }

    pub fn set_download_dir(&self, dir: &Path) -> Result<PathBuf> {
        create_dir(dir)?;
        let resolved = fs::canonicalize(dir).map_err(io_error("resolve download directory", dir))?;
        let stored = resolved.clone();
        self.update(move |config| {
            config.download_dir = stored;
            true
        })?;
        Ok(resolved)
    }

    pub fn reset_download_dir(&self) -> Result<PathBuf> {
        let dir = self.default_download_dir();
        create_dir(&dir)?;
        let stored = dir.clone();
        self.update(move |config| {
            config.download_dir = stored;
            true
        })?;
        Ok(dir)
    }

    /// Falls back to the default directory when the configured one disappeared.
    pub fn ensure_download_dir(&self) -> Result<DownloadDirStatus> {
        let configured = self.download_dir()?;
        if configured.is_dir() {
            return Ok(DownloadDirStatus::Present(configured));
        }

        let reset_to = self.reset_download_dir()?;
        info!(
            missing = %configured.display(),
            reset_to = %reset_to.display(),
            "download directory missing; reset to default"
        );
        Ok(DownloadDirStatus::Reset {
            missing: configured,
            reset_to,
        })
    }

    fn update(&self, apply: impl FnOnce(&mut Config) -> bool) -> Result<bool> {
        let _guard = CONFIG_UPDATE_LOCK
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut config = self.load()?;
        if !apply(&mut config) {
            return Ok(false);
        }
        self.save(&config)?;
        Ok(true)
    }

    fn read_document(&self, path: &Path) -> Result<ConfigDocument> {
        let raw = fs::read_to_string(path).map_err(io_error("read config", path))?;
        toml::from_str(&raw).map_err(|err| GameverError::Decode {
            what: "config",
            target: path.display().to_string(),
            message: err.to_string(),
            on_disk: true,
        })
    }

    fn save(&self, config: &Config) -> Result<()> {
        create_dir(&self.root)?;

        let path = self.config_path();
        let document = ConfigDocument {
            settings: SettingsSection {
                download_dir: Some(config.download_dir.clone()),
                version: config.selected_version.clone(),
            },
        };
        let content = toml::to_string(&document).map_err(|err| GameverError::Decode {
            what: "config",
            target: path.display().to_string(),
            message: err.to_string(),
            on_disk: true,
        })?;

        let tmp_path = self.root.join(format!(
            "{CONFIG_FILE_NAME}.tmp-{}-{}",
            std::process::id(),
            CONFIG_WRITE_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&tmp_path, content).map_err(io_error("write config", &tmp_path))?;
        if let Err(err) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(io_error("replace config", &path)(err));
        }
        debug!(
            path = %path.display(),
            version = %config.selected_version,
            "config saved"
        );
        Ok(())
    }
}

pub fn default_config_root() -> Result<PathBuf> {
    if let Some(dir) = non_empty_env(CONFIG_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }

    if cfg!(windows) {
        let app_data = non_empty_env("APPDATA")
            .ok_or_else(|| GameverError::not_found("environment variable", "APPDATA"))?;
        return Ok(PathBuf::from(app_data).join(APP_DIR_NAME));
    }

    if let Some(xdg) = non_empty_env("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg).join(APP_DIR_NAME));
    }
    let home = non_empty_env("HOME")
        .ok_or_else(|| GameverError::not_found("environment variable", "HOME"))?;
    Ok(PathBuf::from(home).join(".config").join(APP_DIR_NAME))
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(io_error("create directory", dir))
}
