//! Locates the trace to analyze and turns it into a stream of lines.
//!
//! A source name is tried, in order, as a filesystem path, as an `http(s)` URL and as the name of
//! a trace bundled with the binary. The first one that resolves wins.

pub mod bundled;
pub mod error;
mod http;
pub mod reader;

use std::{
    fmt::{self, Display, Formatter},
    fs::File,
    io::{BufRead, BufReader, Cursor},
    path::{Path, PathBuf},
};

use log::{info, warn};

pub use crate::error::SourceError;
pub use crate::reader::LineReader;

/// Where a resolved trace comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    File(PathBuf),
    Url(String),
    Bundled(String),
}

impl Display for Origin {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Origin::File(path) => write!(f, "Using log file: {}", path.display()),
            Origin::Url(url) => write!(f, "Using log file at url: {}", url),
            Origin::Bundled(name) => write!(f, "Using resource at: /{}", name),
        }
    }
}

pub struct ResolvedSource {
    pub origin: Origin,
    reader: Box<dyn BufRead>,
}

impl ResolvedSource {
    pub fn lines(self) -> LineReader<Box<dyn BufRead>> {
        LineReader::new(self.reader)
    }
}

/// Resolve `location` to a readable trace.
pub fn resolve(location: &str) -> Result<ResolvedSource, SourceError> {
    let path = Path::new(location);
    if path.is_file() {
        let file = File::open(path)?;
        let absolute = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        info!("Reading trace from file {}", absolute.display());
        return Ok(ResolvedSource {
            origin: Origin::File(absolute),
            reader: Box::new(BufReader::new(file)),
        });
    }

    if let Some(uri) = http::parse_url(location) {
        match http::fetch(&uri) {
            Ok(body) => {
                info!("Reading trace from {}", uri);
                return Ok(ResolvedSource {
                    origin: Origin::Url(uri.to_string()),
                    reader: Box::new(Cursor::new(body)),
                });
            }
            Err(e) => {
                warn!("Failed to fetch {}: {}. Falling back to bundled traces", uri, e);
            }
        }
    }

    if let Some(content) = bundled::lookup(location) {
        let name = location.trim_start_matches('/').to_owned();
        info!("Reading bundled trace {}", name);
        return Ok(ResolvedSource {
            origin: Origin::Bundled(name),
            reader: Box::new(content.as_bytes()),
        });
    }

    Err(SourceError::NotFound(location.to_owned()))
}
