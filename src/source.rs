//! Where clip bytes come from.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// A clip's media location: an HTTP(S) URL or a local file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClipSource {
    Remote(String),
    Local(PathBuf),
}

impl ClipSource {
    /// `http://` and `https://` are remote, `file://` URLs and anything
    /// else are local paths.
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            ClipSource::Remote(s.to_string())
        } else if let Some(path) = s.strip_prefix("file://") {
            ClipSource::Local(PathBuf::from(path))
        } else {
            ClipSource::Local(PathBuf::from(s))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, ClipSource::Remote(_))
    }
}

impl fmt::Display for ClipSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipSource::Remote(url) => f.write_str(url),
            ClipSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

impl From<String> for ClipSource {
    fn from(s: String) -> Self {
        ClipSource::parse(&s)
    }
}

impl From<&str> for ClipSource {
    fn from(s: &str) -> Self {
        ClipSource::parse(s)
    }
}

impl From<PathBuf> for ClipSource {
    fn from(p: PathBuf) -> Self {
        ClipSource::Local(p)
    }
}

impl From<ClipSource> for String {
    fn from(s: ClipSource) -> Self {
        s.to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
}

/// Opens a clip's bytes as a forward-only stream.
pub trait ClipFetcher {
    fn open(&self, source: &ClipSource) -> Result<Box<dyn Read>, FetchError>;
}

impl<F: ClipFetcher + ?Sized> ClipFetcher for &F {
    fn open(&self, source: &ClipSource) -> Result<Box<dyn Read>, FetchError> {
        (**self).open(source)
    }
}

/// Blocking fetcher: files are opened directly, URLs fetched with a
/// single GET. Anything but `200 OK` is a failure.
///
/// `idle_timeout` bounds connecting and each socket read or write. A body
/// that keeps arriving is never cut off, however long the download takes.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new(idle_timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(idle_timeout)
            .timeout_read(idle_timeout)
            .timeout_write(idle_timeout)
            .build();
        Self { agent }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(300))
    }
}

impl ClipFetcher for HttpFetcher {
    fn open(&self, source: &ClipSource) -> Result<Box<dyn Read>, FetchError> {
        match source {
            ClipSource::Local(path) => {
                debug!(path = %path.display(), "opening local clip");
                Ok(Box::new(File::open(path)?))
            }
            ClipSource::Remote(url) => {
                debug!(%url, "fetching remote clip");
                let resp = self.agent.get(url).call().map_err(|e| match e {
                    ureq::Error::Status(status, _) => FetchError::Status { url: url.clone(), status },
                    ureq::Error::Transport(t) => FetchError::Transport {
                        url: url.clone(),
                        message: t.to_string(),
                    },
                })?;
                if resp.status() != 200 {
                    return Err(FetchError::Status { url: url.clone(), status: resp.status() });
                }
                Ok(Box::new(resp.into_reader()))
            }
        }
    }
}
