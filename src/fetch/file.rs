use super::{ByteStream, Fetcher};
use crate::error::FetchError;
use std::fs::File;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Reads `file://` URLs and plain filesystem paths
pub struct FileFetcher;

impl Fetcher for FileFetcher {
    fn fetch(&self, url: &str) -> Result<ByteStream, FetchError> {
        let path =
            local_path(url).ok_or_else(|| FetchError::UnsupportedScheme(url.to_string()))?;

        log::debug!("Reading local file {:?}", path);

        match File::open(&path) {
            Ok(file) => Ok(Box::new(file)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(FetchError::NotFound(url.to_string())),
            Err(e) => Err(FetchError::Io {
                url: url.to_string(),
                source: e,
            }),
        }
    }
}

/// Convert a `file://` URI or bare path to a `PathBuf`
pub fn local_path(url: &str) -> Option<PathBuf> {
    match super::scheme(url).as_deref() {
        Some("file") => {
            let (_, rest) = url.split_once("://")?;
            // Only local files: file:///path or file://localhost/path
            let path = rest.strip_prefix("localhost").unwrap_or(rest);
            if !path.starts_with('/') {
                return None;
            }
            let decoded = urlencoding::decode(path).ok()?;
            Some(PathBuf::from(decoded.into_owned()))
        }
        Some(_) => None,
        None if url.trim().is_empty() => None,
        None => Some(PathBuf::from(url)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_local_path_decoding() {
        assert_eq!(
            local_path("file:///music/My%20Song.flac"),
            Some(PathBuf::from("/music/My Song.flac"))
        );
        assert_eq!(
            local_path("file://localhost/tmp/a.wav"),
            Some(PathBuf::from("/tmp/a.wav"))
        );
        assert_eq!(local_path("file://remote-host/a.wav"), None);
        assert_eq!(local_path("/tmp/a.wav"), Some(PathBuf::from("/tmp/a.wav")));
        assert_eq!(local_path("https://example.com/a.wav"), None);
        assert_eq!(local_path("  "), None);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let result = FileFetcher.fetch("file:///nonexistent/file.mp3");
        assert!(matches!(result, Err(FetchError::NotFound(_))));
    }

    #[test]
    fn test_reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, b"abc").unwrap();

        let mut stream = FileFetcher.fetch(path.to_str().unwrap()).unwrap();
        let mut contents = Vec::new();
        stream.read_to_end(&mut contents).unwrap();
        assert_eq!(contents, b"abc");
    }
}
