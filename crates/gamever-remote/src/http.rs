use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use gamever_core::{io_error, GameverError, Result};
use reqwest::blocking::Client;
use tracing::debug;

pub const USER_AGENT: &str = concat!("gamever/", env!("CARGO_PKG_VERSION"));
const DOWNLOAD_CHUNK_SIZE: usize = 8192;

/// Shared blocking client. Body reads are not time-limited so large archives can finish.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(30))
        .timeout(None::<Duration>)
        .build()
        .map_err(|err| GameverError::Network {
            operation: "build http client",
            target: USER_AGENT.to_string(),
            message: err.to_string(),
        })
}

pub(crate) fn network_error(
    operation: &'static str,
    target: &str,
    err: reqwest::Error,
) -> GameverError {
    GameverError::Network {
        operation,
        target: target.to_string(),
        message: err.to_string(),
    }
}

/// Streams `url` into `destination` without buffering the whole body.
///
/// Bytes land in a `.part` sibling first and are renamed into place once complete. `progress`
/// receives the running byte count and the advertised length, if any.
pub fn download_to_path<F>(
    client: &Client,
    url: &str,
    destination: &Path,
    mut progress: F,
) -> Result<u64>
where
    F: FnMut(u64, Option<u64>),
{
    let mut response = client
        .get(url)
        .send()
        .map_err(|err| network_error("download", url, err))?;
    let status = response.status();
    if !status.is_success() {
        return Err(GameverError::Http {
            operation: "download",
            target: url.to_string(),
            status: status.as_u16(),
        });
    }

    let total = response.content_length();
    let part_path = part_path_for(destination);
    let result = stream_body(&mut response, url, &part_path, total, &mut progress);
    let downloaded = match result {
        Ok(downloaded) => downloaded,
        Err(err) => {
            let _ = fs::remove_file(&part_path);
            return Err(err);
        }
    };

    if destination.exists() {
        fs::remove_file(destination)
            .map_err(io_error("replace downloaded file", destination))?;
    }
    fs::rename(&part_path, destination).map_err(io_error("finalize download", destination))?;
    debug!(url, path = %destination.display(), bytes = downloaded, "download complete");
    Ok(downloaded)
}

fn stream_body<R, F>(
    body: &mut R,
    url: &str,
    part_path: &Path,
    total: Option<u64>,
    progress: &mut F,
) -> Result<u64>
where
    R: Read,
    F: FnMut(u64, Option<u64>),
{
    let mut file = File::create(part_path).map_err(io_error("create download file", part_path))?;
    let mut buffer = [0_u8; DOWNLOAD_CHUNK_SIZE];
    let mut downloaded = 0_u64;
    progress(downloaded, total);

    loop {
        let read = body.read(&mut buffer).map_err(|err| GameverError::Network {
            operation: "download",
            target: url.to_string(),
            message: err.to_string(),
        })?;
        if read == 0 {
            break;
        }
        file.write_all(&buffer[..read])
            .map_err(io_error("write download file", part_path))?;
        downloaded += read as u64;
        progress(downloaded, total);
    }

    file.flush().map_err(io_error("flush download file", part_path))?;
    Ok(downloaded)
}

fn part_path_for(destination: &Path) -> PathBuf {
    let file_name = destination
        .file_name()
        .and_then(|value| value.to_str())
        .unwrap_or("download");
    destination.with_file_name(format!("{file_name}.part"))
}
