//! Retrieval of the audio referenced by a request
//!
//! A [`Fetcher`] turns a URL into a byte stream. The pipeline copies that
//! stream into its staging file; fetchers never touch temporary storage and
//! never retry.

mod file;
mod http;

pub use file::{local_path, FileFetcher};
pub use http::HttpFetcher;

use crate::error::FetchError;
use std::io::Read;
use std::time::Duration;

/// Byte stream of a fetched resource
pub type ByteStream = Box<dyn Read + Send>;

/// Source of encoded audio bytes
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<ByteStream, FetchError>;
}

/// Dispatches on the URL scheme: `http`/`https` go over the network,
/// `file://` URLs and bare paths are read from disk when allowed
pub struct SchemeFetcher {
    http: HttpFetcher,
    file: FileFetcher,
    allow_local_files: bool,
}

impl SchemeFetcher {
    pub fn new(timeout: Duration, allow_local_files: bool) -> anyhow::Result<Self> {
        Ok(Self {
            http: HttpFetcher::new(timeout)?,
            file: FileFetcher,
            allow_local_files,
        })
    }
}

impl Fetcher for SchemeFetcher {
    fn fetch(&self, url: &str) -> Result<ByteStream, FetchError> {
        match scheme(url).as_deref() {
            Some("http") | Some("https") => self.http.fetch(url),
            Some("file") | None if self.allow_local_files => self.file.fetch(url),
            Some("file") | None => Err(FetchError::LocalFilesDisabled(url.to_string())),
            Some(_) => Err(FetchError::UnsupportedScheme(url.to_string())),
        }
    }
}

/// Lowercased URL scheme, if the string has one
pub fn scheme(url: &str) -> Option<String> {
    let (scheme, _) = url.split_once("://")?;
    let valid = !scheme.is_empty()
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then(|| scheme.to_ascii_lowercase())
}

/// File extension of the last path segment, used as a decoder hint
pub fn url_extension(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let path = path.split_once("://").map_or(path, |(_, rest)| rest);
    let segment = path.rsplit('/').next()?;
    let (stem, ext) = segment.rsplit_once('.')?;

    let plausible = !stem.is_empty()
        && (1..=5).contains(&ext.len())
        && ext.chars().all(|c| c.is_ascii_alphanumeric());
    plausible.then(|| ext.to_ascii_lowercase())
}
