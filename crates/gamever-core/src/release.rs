use serde::{Deserialize, Serialize};

pub const DEFAULT_OWNER: &str = "jonasb2510";
pub const DEFAULT_REPO: &str = "first-go-game";
pub const GITHUB_API_ROOT: &str = "https://api.github.com";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoCoordinates {
    pub owner: String,
    pub repo: String,
}

impl Default for RepoCoordinates {
    fn default() -> Self {
        Self {
            owner: DEFAULT_OWNER.to_string(),
            repo: DEFAULT_REPO.to_string(),
        }
    }
}

impl RepoCoordinates {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    pub fn releases_url(&self, api_root: &str) -> String {
        format!(
            "{}/repos/{}/{}/releases",
            api_root.trim_end_matches('/'),
            self.owner,
            self.repo
        )
    }

    /// Prefix of the top-level folder GitHub wraps source archives in (`owner-repo-<sha>`).
    pub fn archive_wrapper_prefix(&self) -> String {
        format!("{}-{}", self.owner, self.repo).to_ascii_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub digest: Option<String>,
}

impl ReleaseAsset {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            size: None,
            digest: None,
        }
    }

    /// Returns the hex sha256 when the catalog published a `sha256:` digest.
    pub fn sha256(&self) -> Option<&str> {
        self.digest
            .as_deref()
            .and_then(|digest| digest.strip_prefix("sha256:"))
            .map(str::trim)
            .filter(|hex| !hex.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub display_name: String,
    pub source_archive_url: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    pub fn new(display_name: impl Into<String>, source_archive_url: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            source_archive_url: source_archive_url.into(),
            assets: Vec::new(),
        }
    }

    pub fn with_asset(mut self, asset: ReleaseAsset) -> Self {
        self.assets.push(asset);
        self
    }
}
