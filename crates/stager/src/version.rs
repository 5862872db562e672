//! Version lifecycle derivation.
//!
//! [`to_pre_release`] and [`to_release`] are pure. [`VersionResolver`] reads the
//! remote group metadata to find the alpha sequence for a numeric root.

use serde::{Deserialize, Serialize};
use stager_metadata::MavenMetadataDocument;
use stager_registry::ArtifactProbe;

use crate::error::{Result, StagerError};
use crate::types::{Qualifier, RepositoryTarget, Version};

/// Snapshot form of `base`. A snapshot is returned unchanged; a release or
/// alpha has its qualifier replaced.
pub fn to_pre_release(base: &Version) -> Version {
    if base.is_snapshot() {
        base.clone()
    } else {
        base.with_qualifier(Qualifier::Snapshot)
    }
}

/// Strip the snapshot qualifier, leaving any other version untouched.
pub fn to_release(base: &Version) -> Version {
    if base.is_snapshot() {
        base.root()
    } else {
        base.clone()
    }
}

/// What to do when the group metadata cannot be fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnavailablePolicy {
    /// Propagate [`StagerError::MetadataUnavailable`].
    #[default]
    Fail,
    /// Log a warning and continue as if no version had been published.
    AssumeNone,
}

/// Computes alpha versions from the published history of one artifact family.
pub struct VersionResolver<'a> {
    probe: &'a dyn ArtifactProbe,
    repository: RepositoryTarget,
    group_id: String,
    artifact_id: String,
    on_unavailable: UnavailablePolicy,
}

impl<'a> VersionResolver<'a> {
    pub fn new(
        probe: &'a dyn ArtifactProbe,
        repository: RepositoryTarget,
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
    ) -> Self {
        Self {
            probe,
            repository,
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            on_unavailable: UnavailablePolicy::default(),
        }
    }

    pub fn with_unavailable_policy(mut self, policy: UnavailablePolicy) -> Self {
        self.on_unavailable = policy;
        self
    }

    /// URL of the `maven-metadata.xml` consulted for alpha sequencing.
    pub fn metadata_url(&self) -> String {
        self.repository.url_for(&stager_registry::metadata_path(
            &self.group_id,
            &self.artifact_id,
        ))
    }

    /// Greatest published alpha sharing the numeric root of `base`.
    ///
    /// Alpha numbers compare numerically, so `alpha-10` wins over `alpha-2`.
    /// Entries that do not parse as versions are ignored.
    pub fn last_alpha(&self, base: &Version) -> Result<Option<Version>> {
        let root = base.root();
        let last = self
            .published_versions()?
            .iter()
            .filter_map(|raw| Version::parse(raw).ok())
            .filter(|v| v.base() == root.base())
            .filter_map(|v| v.alpha_number())
            .max();
        Ok(last.map(|n| root.with_qualifier(Qualifier::Alpha(n))))
    }

    /// `root-alpha-(last + 1)`, or `root-alpha-1` when no alpha was published.
    pub fn next_alpha(&self, base: &Version) -> Result<Version> {
        let root = base.root();
        let next = match self.last_alpha(base)?.and_then(|v| v.alpha_number()) {
            None => 1,
            Some(n) => n.checked_add(1).ok_or_else(|| StagerError::InvalidVersion {
                version: root.with_qualifier(Qualifier::Alpha(n)).to_string(),
                reason: "alpha number cannot be incremented".to_string(),
            })?,
        };
        Ok(root.with_qualifier(Qualifier::Alpha(next)))
    }

    fn published_versions(&self) -> Result<Vec<String>> {
        let url = self.metadata_url();
        let body = match self
            .probe
            .fetch(&url, self.repository.credentials.as_ref())
        {
            Ok(Some(body)) => body,
            Ok(None) => {
                tracing::debug!(url = %url, "no group metadata published yet");
                return Ok(Vec::new());
            }
            Err(source) => match self.on_unavailable {
                UnavailablePolicy::Fail => {
                    return Err(StagerError::MetadataUnavailable { url, source });
                }
                UnavailablePolicy::AssumeNone => {
                    tracing::warn!(url = %url, error = %source, "metadata unavailable, assuming no alpha published");
                    return Ok(Vec::new());
                }
            },
        };

        let document = MavenMetadataDocument::from_xml(&body)
            .map_err(|source| StagerError::MalformedMetadata { url, source })?;
        Ok(document.versioning.versions)
    }
}
