mod catalog;
mod http;

pub use catalog::{parse_releases, ReleaseCatalog};
pub use http::{build_client, download_to_path, USER_AGENT};

pub use reqwest::blocking::Client;

#[cfg(test)]
mod tests;
