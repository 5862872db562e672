//! In-memory [`ArtifactProbe`] for exercising release logic without a network.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use crate::{ArtifactProbe, Credentials, FetchError};

/// A fake repository keyed by absolute URL.
///
/// URLs registered with [`MemoryProbe::with_document`] exist and serve their
/// body; URLs registered with [`MemoryProbe::with_unreachable`] behave like a
/// dead host. Everything else answers `404`.
#[derive(Debug, Default)]
pub struct MemoryProbe {
    documents: BTreeMap<String, Vec<u8>>,
    unreachable: BTreeSet<String>,
    requests: RefCell<Vec<String>>,
}

impl MemoryProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.documents.insert(url.into(), body.into());
        self
    }

    /// Register a published artifact with an empty body.
    pub fn with_artifact(self, url: impl Into<String>) -> Self {
        self.with_document(url, Vec::new())
    }

    pub fn with_unreachable(mut self, url: impl Into<String>) -> Self {
        self.unreachable.insert(url.into());
        self
    }

    /// URLs requested so far, in call order.
    pub fn requested(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    fn record(&self, url: &str) {
        self.requests.borrow_mut().push(url.to_string());
    }
}

impl ArtifactProbe for MemoryProbe {
    fn exists(&self, url: &str, _credentials: Option<&Credentials>) -> bool {
        self.record(url);
        !self.unreachable.contains(url) && self.documents.contains_key(url)
    }

    fn fetch(
        &self,
        url: &str,
        _credentials: Option<&Credentials>,
    ) -> Result<Option<Vec<u8>>, FetchError> {
        self.record(url);
        if self.unreachable.contains(url) {
            return Err(FetchError::Transport {
                url: url.to_string(),
                source: "connection refused".into(),
            });
        }
        Ok(self.documents.get(url).cloned())
    }
}
