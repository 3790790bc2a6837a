use std::time::Duration;

use gamever_core::{GameverError, Release, ReleaseAsset, RepoCoordinates, Result, GITHUB_API_ROOT};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tracing::{debug, info};

use crate::http::network_error;

const CATALOG_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct GithubRelease {
    name: Option<String>,
    tag_name: String,
    zipball_url: Option<String>,
    #[serde(default)]
    assets: Vec<GithubAsset>,
}

#[derive(Debug, Deserialize)]
struct GithubAsset {
    name: String,
    browser_download_url: String,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    digest: Option<String>,
}

/// Read-only view of the releases published for one repository.
///
/// Holds no state between calls; every `list_releases` performs a fresh request.
#[derive(Debug, Clone)]
pub struct ReleaseCatalog {
    client: Client,
    url: String,
}

impl ReleaseCatalog {
    pub fn new(client: Client, coordinates: &RepoCoordinates) -> Self {
        Self::with_api_root(client, coordinates, GITHUB_API_ROOT)
    }

    pub fn with_api_root(client: Client, coordinates: &RepoCoordinates, api_root: &str) -> Self {
        Self {
            client,
            url: coordinates.releases_url(api_root),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Releases in published order (newest first). Any failure yields no releases.
    pub fn list_releases(&self) -> Result<Vec<Release>> {
        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, "application/vnd.github+json")
            .timeout(CATALOG_TIMEOUT)
            .send()
            .map_err(|err| network_error("fetch releases", &self.url, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GameverError::Http {
                operation: "fetch releases",
                target: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .map_err(|err| network_error("fetch releases", &self.url, err))?;
        let releases = parse_releases(&body, &self.url)?;
        info!(url = %self.url, count = releases.len(), "fetched release catalog");
        Ok(releases)
    }
}

pub fn parse_releases(raw: &str, source: &str) -> Result<Vec<Release>> {
    let payload: Vec<GithubRelease> =
        serde_json::from_str(raw).map_err(|err| GameverError::Decode {
            what: "release catalog",
            target: source.to_string(),
            message: err.to_string(),
            on_disk: false,
        })?;

    let mut releases = Vec::with_capacity(payload.len());
    for release in payload {
        let display_name = release
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(release.tag_name);
        let Some(source_archive_url) = release.zipball_url else {
            debug!(release = %display_name, "skipping release without source archive");
            continue;
        };

        releases.push(Release {
            display_name,
            source_archive_url,
            assets: release
                .assets
                .into_iter()
                .map(|asset| ReleaseAsset {
                    name: asset.name,
                    url: asset.browser_download_url,
                    size: asset.size,
                    digest: asset.digest,
                })
                .collect(),
        });
    }
    Ok(releases)
}
