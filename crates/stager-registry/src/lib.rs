//! Remote repository access for stager.
//!
//! This crate answers two questions about a Maven-layout repository: does
//! something exist at a URL, and what does the document at a URL contain.
//! Both go through the [`ArtifactProbe`] trait so callers can swap the HTTP
//! transport for [`memory::MemoryProbe`] in tests.
//!
//! # Example
//!
//! ```no_run
//! use stager_registry::{ArtifactProbe, HttpProbe, artifact_path, join_url};
//!
//! let probe = HttpProbe::new();
//! let path = artifact_path("org.example", "demo", "1.0.0", "pom");
//! let url = join_url("https://repo.maven.apache.org/maven2/", &path);
//!
//! // Transport failures read as "absent", never as an error.
//! let published = probe.exists(&url, None);
//! ```

use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder};
use thiserror::Error;

pub mod memory;

/// Default connect timeout for repository requests
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Default read timeout for repository requests
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 5;

/// Default user agent for repository requests
pub const USER_AGENT: &str = concat!("stager/", env!("CARGO_PKG_VERSION"));

/// Basic-auth credentials handed through to the repository.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Failure to retrieve a document body.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("unexpected status {status} from {url}")]
    Status { url: String, status: u16 },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. } | Self::Status { url, .. } => url,
        }
    }
}

/// Read-only view of a remote repository.
pub trait ArtifactProbe {
    /// Lightweight existence check. Only a `200` answer counts as present;
    /// any other status and any transport failure read as absent.
    fn exists(&self, url: &str, credentials: Option<&Credentials>) -> bool;

    /// Download a document. `Ok(None)` means the server answered `404`.
    fn fetch(
        &self,
        url: &str,
        credentials: Option<&Credentials>,
    ) -> Result<Option<Vec<u8>>, FetchError>;
}

/// Blocking HTTP implementation of [`ArtifactProbe`].
#[derive(Debug, Clone)]
pub struct HttpProbe {
    connect_timeout: Duration,
    read_timeout: Duration,
    client: Client,
}

impl Default for HttpProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpProbe {
    /// Create a probe with the default timeouts
    pub fn new() -> Self {
        Self::with_timeouts(
            Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
        )
    }

    /// Create a probe with explicit connect and read timeouts.
    ///
    /// The blocking client only bounds the whole request, so the overall
    /// deadline is the sum of both.
    pub fn with_timeouts(connect_timeout: Duration, read_timeout: Duration) -> Self {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(connect_timeout + read_timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            connect_timeout,
            read_timeout,
            client,
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    fn authorize(request: RequestBuilder, credentials: Option<&Credentials>) -> RequestBuilder {
        match credentials {
            Some(c) => request.basic_auth(&c.username, Some(&c.password)),
            None => request,
        }
    }
}

impl ArtifactProbe for HttpProbe {
    fn exists(&self, url: &str, credentials: Option<&Credentials>) -> bool {
        let request = Self::authorize(self.client.head(url), credentials);
        match request.send() {
            Ok(response) => {
                let status = response.status();
                tracing::debug!(url, status = status.as_u16(), "existence probe answered");
                status == StatusCode::OK
            }
            Err(err) => {
                tracing::debug!(url, error = %err, "existence probe failed, reading as absent");
                false
            }
        }
    }

    fn fetch(
        &self,
        url: &str,
        credentials: Option<&Credentials>,
    ) -> Result<Option<Vec<u8>>, FetchError> {
        let request = Self::authorize(self.client.get(url), credentials);
        let response = request.send().map_err(|err| FetchError::Transport {
            url: url.to_string(),
            source: Box::new(err),
        })?;

        let status = response.status();
        tracing::debug!(url, status = status.as_u16(), "document fetch answered");
        match status {
            StatusCode::OK => {
                let body = response.bytes().map_err(|err| FetchError::Transport {
                    url: url.to_string(),
                    source: Box::new(err),
                })?;
                Ok(Some(body.to_vec()))
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }),
        }
    }
}

/// Map a dotted group id onto its repository directory (`org.example` ->
/// `org/example`).
pub fn group_path(group_id: &str) -> String {
    group_id.replace('.', "/")
}

/// Repository path of one artifact file:
/// `{group path}/{artifact}/{version}/{artifact}-{version}.{extension}`.
pub fn artifact_path(group_id: &str, artifact_id: &str, version: &str, extension: &str) -> String {
    format!(
        "{}/{artifact_id}/{version}/{artifact_id}-{version}.{extension}",
        group_path(group_id)
    )
}

/// File name of the group metadata document inside an artifact directory.
pub const METADATA_FILE: &str = "maven-metadata.xml";

/// Repository path of the group metadata document of an artifact family.
pub fn metadata_path(group_id: &str, artifact_id: &str) -> String {
    format!("{}/{artifact_id}/{METADATA_FILE}", group_path(group_id))
}

/// Join a repository base URL and a relative path with exactly one slash.
pub fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
