//! Duplicate-publish detection.
//!
//! The check is best effort: nothing stops a concurrent build of the same
//! coordinate from passing the guard between the probe and the upload.

use stager_registry::ArtifactProbe;

use crate::engine::Reporter;
use crate::types::{ArtifactCoordinate, RepositoryTarget};

/// Default probe extension: the POM is uploaded for every packaging.
pub const DEFAULT_EXTENSION: &str = "pom";

pub struct PublicationGuard<'a> {
    probe: &'a dyn ArtifactProbe,
    extension: String,
}

impl<'a> PublicationGuard<'a> {
    pub fn new(probe: &'a dyn ArtifactProbe, extension: impl Into<String>) -> Self {
        Self {
            probe,
            extension: extension.into(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// First target, in the given order, that already holds `coordinate`.
    pub fn find_published<'t>(
        &self,
        coordinate: &ArtifactCoordinate,
        targets: &'t [RepositoryTarget],
    ) -> Option<&'t RepositoryTarget> {
        let path = coordinate.artifact_path(&self.extension);
        targets.iter().find(|target| {
            let url = target.url_for(&path);
            let found = self.probe.exists(&url, target.credentials.as_ref());
            tracing::debug!(url = %url, kind = %target.kind, found, "publication probe");
            found
        })
    }

    /// True if any target answers `200` for the artifact. Emits a notice
    /// through `reporter` when publication should be skipped.
    pub fn is_already_published(
        &self,
        coordinate: &ArtifactCoordinate,
        targets: &[RepositoryTarget],
        reporter: &mut dyn Reporter,
    ) -> bool {
        match self.find_published(coordinate, targets) {
            Some(target) => {
                reporter.info(&format!(
                    "{coordinate} is already published to the {} repository ({}); skipping publication",
                    target.kind, target.base_url
                ));
                true
            }
            None => false,
        }
    }
}
