use std::fmt;

use stager_registry::ArtifactProbe;

use crate::config::Settings;
use crate::error::Result;
use crate::guard::PublicationGuard;
use crate::pom::{self, PomDescriptor, ProjectDefaults};
use crate::types::{ArtifactCoordinate, RepositoryTarget, Version};
use crate::version::{VersionResolver, to_pre_release, to_release};

/// Sink for user-facing progress messages.
pub trait Reporter {
    fn info(&mut self, msg: &str);
    fn warn(&mut self, msg: &str);
    fn error(&mut self, msg: &str);
}

/// Which kind of build is being published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Snapshot,
    Release,
    Alpha,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Snapshot => "snapshot",
            Self::Release => "release",
            Self::Alpha => "alpha",
        })
    }
}

/// Outcome of [`plan_release`]: what to publish and where.
#[derive(Debug, Clone)]
pub struct ReleasePlan {
    pub mode: Mode,
    pub coordinate: ArtifactCoordinate,
    pub target: RepositoryTarget,
    /// Absolute URL the packaging artifact will be uploaded to.
    pub publish_url: String,
    pub already_published: bool,
    /// Present when a description file exists and publication goes ahead.
    pub pom: Option<PomDescriptor>,
}

impl ReleasePlan {
    pub fn version(&self) -> &Version {
        &self.coordinate.version
    }

    pub fn should_publish(&self) -> bool {
        !self.already_published
    }
}

/// Decide the version, check for an earlier publication, and prepare the POM.
///
/// Snapshots go to the snapshot repository unguarded. Releases and alphas are
/// checked against the release and staging repositories first.
pub fn plan_release(
    settings: &Settings,
    probe: &dyn ArtifactProbe,
    mode: Mode,
    reporter: &mut dyn Reporter,
) -> Result<ReleasePlan> {
    reporter.info(&format!(
        "planning {mode} build of {}:{} from {}",
        settings.group_id, settings.artifact_id, settings.version
    ));

    let (version, target) = match mode {
        Mode::Snapshot => (to_pre_release(&settings.version), settings.snapshots.clone()),
        Mode::Release => (to_release(&settings.version), settings.releases.clone()),
        Mode::Alpha => {
            let resolver = VersionResolver::new(
                probe,
                settings.metadata.clone(),
                &settings.group_id,
                &settings.artifact_id,
            )
            .with_unavailable_policy(settings.on_unavailable);
            (resolver.next_alpha(&settings.version)?, settings.releases.clone())
        }
    };
    reporter.info(&format!("version: {version}"));

    let coordinate = ArtifactCoordinate::new(&settings.group_id, &settings.artifact_id, version);

    let already_published = match mode {
        Mode::Snapshot => false,
        Mode::Release | Mode::Alpha => PublicationGuard::new(probe, &settings.packaging)
            .is_already_published(&coordinate, &settings.guarded_targets(), reporter),
    };

    let pom = if already_published {
        None
    } else {
        load_pom(settings, reporter)?
    };

    Ok(ReleasePlan {
        mode,
        publish_url: target.url_for(&coordinate.artifact_path(&settings.packaging)),
        coordinate,
        target,
        already_published,
        pom,
    })
}

/// Translate the configured description file, if there is one.
pub fn load_pom(settings: &Settings, reporter: &mut dyn Reporter) -> Result<Option<PomDescriptor>> {
    let Some(doc) = pom::read_description(&settings.description_file)? else {
        reporter.warn(&format!(
            "no project description at {}; POM will only carry name and coordinates",
            settings.description_file.display()
        ));
        return Ok(None);
    };
    Ok(Some(pom::translate(&doc, &project_defaults(settings))))
}

pub fn project_defaults(settings: &Settings) -> ProjectDefaults {
    ProjectDefaults {
        title: settings.title.clone(),
        description: settings.description.clone(),
    }
}

#[cfg(test)]
pub(crate) mod tests_support {
    use super::Reporter;

    #[derive(Default)]
    pub(crate) struct CollectingReporter {
        pub(crate) infos: Vec<String>,
        pub(crate) warns: Vec<String>,
        pub(crate) errors: Vec<String>,
    }

    impl Reporter for CollectingReporter {
        fn info(&mut self, msg: &str) {
            self.infos.push(msg.to_string());
        }

        fn warn(&mut self, msg: &str) {
            self.warns.push(msg.to_string());
        }

        fn error(&mut self, msg: &str) {
            self.errors.push(msg.to_string());
        }
    }
}
