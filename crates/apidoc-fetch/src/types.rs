//! Location and acquisition result types

use crate::error::{Error, Result};
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// Where an archive or metadata descriptor lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// A URI with a network host; fetched over HTTP(S).
    Remote(Url),
    /// Already on the local filesystem; used in place.
    Local(PathBuf),
}

impl Location {
    /// Classify a caller-supplied location.
    ///
    /// Anything that parses as a URL with a host is remote. `file:` URLs and
    /// plain paths are local.
    pub fn parse(location: &str) -> Result<Self> {
        match Url::parse(location) {
            Ok(url) if url.host().is_some() && url.scheme() != "file" => {
                match url.scheme() {
                    "http" | "https" => Ok(Location::Remote(url)),
                    other => Err(Error::UnsupportedScheme(other.to_string())),
                }
            }
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map(Location::Local)
                .map_err(|_| Error::other(format!("Invalid file URL: {}", location))),
            _ => Ok(Location::Local(PathBuf::from(location))),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Location::Remote(_))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Remote(url) => write!(f, "{}", url),
            Location::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A file made available locally by the acquirer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredFile {
    /// Local path of the content.
    pub path: PathBuf,
    /// True when the file was downloaded into the target directory and is
    /// therefore owned (and later deleted) by the caller. Local sources are
    /// never owned.
    pub downloaded: bool,
}
