//! Configuration file support for stager (`.stager.toml`).
//!
//! Every section is optional. Values given on the command line win over the
//! file, and the file wins over the built-in defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::pom::DEFAULT_DESCRIPTION_FILE;
use crate::properties::{self, DEFAULT_PROPERTIES_FILE};
use crate::types::{RepositoryKind, RepositoryTarget, Version};
use crate::version::UnavailablePolicy;

pub const CONFIG_FILE: &str = ".stager.toml";

pub const DEFAULT_RELEASES_URL: &str = "https://repo.maven.apache.org/maven2/";
pub const DEFAULT_STAGING_URL: &str =
    "https://ossrh-staging-api.central.sonatype.com/service/local/staging/deploy/maven2/";
pub const DEFAULT_SNAPSHOTS_URL: &str = "https://central.sonatype.com/repository/maven-snapshots/";

/// `[project]`: what is being published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub artifact: Option<String>,
    /// Base version. Falls back to the `version` line of `properties_file`.
    #[serde(default)]
    pub version: Option<String>,
    /// POM `<name>`. Defaults to the artifact id.
    #[serde(default)]
    pub title: Option<String>,
    /// POM `<description>` when the description file has none.
    #[serde(default)]
    pub description: Option<String>,
    /// Extension probed by the publication guard.
    #[serde(default = "default_packaging")]
    pub packaging: String,
    #[serde(default = "default_description_file")]
    pub description_file: PathBuf,
    #[serde(default = "default_properties_file")]
    pub properties_file: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            group: None,
            artifact: None,
            version: None,
            title: None,
            description: None,
            packaging: default_packaging(),
            description_file: default_description_file(),
            properties_file: default_properties_file(),
        }
    }
}

/// `[repositories]`: base URLs of the Maven repositories involved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoriesConfig {
    #[serde(default = "default_releases")]
    pub releases: String,
    #[serde(default = "default_staging")]
    pub staging: String,
    #[serde(default = "default_snapshots")]
    pub snapshots: String,
    /// Where `maven-metadata.xml` is read from. Defaults to `releases`.
    #[serde(default)]
    pub metadata: Option<String>,
}

impl Default for RepositoriesConfig {
    fn default() -> Self {
        Self {
            releases: default_releases(),
            staging: default_staging(),
            snapshots: default_snapshots(),
            metadata: None,
        }
    }
}

/// `[credentials]`: values may be literal, `env:VAR` or `file:/path`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    pub username: String,
    pub password: String,
}

/// `[probe]`: HTTP timeouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    #[serde(with = "humantime_serde", default = "default_connect_timeout")]
    pub connect_timeout: Duration,
    #[serde(with = "humantime_serde", default = "default_read_timeout")]
    pub read_timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            read_timeout: default_read_timeout(),
        }
    }
}

/// `[alpha]`: alpha sequencing behaviour.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlphaConfig {
    #[serde(default)]
    pub on_unavailable: UnavailablePolicy,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StagerConfig {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub repositories: RepositoriesConfig,

    #[serde(default)]
    pub credentials: Option<CredentialsConfig>,

    #[serde(default)]
    pub probe: ProbeConfig,

    #[serde(default)]
    pub alpha: AlphaConfig,
}

/// Values passed on the command line.
///
/// `None` means "user did not pass this flag".
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub group: Option<String>,
    pub artifact: Option<String>,
    pub version: Option<String>,
    pub packaging: Option<String>,
    pub description_file: Option<PathBuf>,
    pub properties_file: Option<PathBuf>,
    pub on_unavailable: Option<UnavailablePolicy>,
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub project_dir: PathBuf,
    pub group_id: String,
    pub artifact_id: String,
    pub version: Version,
    pub title: String,
    pub description: Option<String>,
    pub packaging: String,
    pub description_file: PathBuf,
    pub properties_file: PathBuf,
    pub releases: RepositoryTarget,
    pub staging: RepositoryTarget,
    pub snapshots: RepositoryTarget,
    pub metadata: RepositoryTarget,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub on_unavailable: UnavailablePolicy,
}

impl Settings {
    /// Targets the publication guard checks, in priority order.
    pub fn guarded_targets(&self) -> Vec<RepositoryTarget> {
        vec![self.releases.clone(), self.staging.clone()]
    }
}

fn default_packaging() -> String {
    "pom".to_string()
}

fn default_description_file() -> PathBuf {
    PathBuf::from(DEFAULT_DESCRIPTION_FILE)
}

fn default_properties_file() -> PathBuf {
    PathBuf::from(DEFAULT_PROPERTIES_FILE)
}

fn default_releases() -> String {
    DEFAULT_RELEASES_URL.to_string()
}

fn default_staging() -> String {
    DEFAULT_STAGING_URL.to_string()
}

fn default_snapshots() -> String {
    DEFAULT_SNAPSHOTS_URL.to_string()
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(stager_registry::DEFAULT_CONNECT_TIMEOUT_SECS)
}

fn default_read_timeout() -> Duration {
    Duration::from_secs(stager_registry::DEFAULT_READ_TIMEOUT_SECS)
}

fn validate_url(field: &str, url: &str) -> Result<()> {
    if url.trim().is_empty() {
        bail!("{field} cannot be empty");
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!("{field} must be an http:// or https:// URL, got '{url}'");
    }
    Ok(())
}

impl StagerConfig {
    /// Load `.stager.toml` from `project_dir`.
    ///
    /// Returns `Ok(None)` if no config file exists.
    pub fn load_from_dir(project_dir: &Path) -> Result<Option<Self>> {
        let config_path = project_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(None);
        }
        Self::load_from_file(&config_path).map(Some)
    }

    /// Load configuration from a specific file path
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: StagerConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(group) = &self.project.group
            && group.trim().is_empty()
        {
            bail!("project.group cannot be empty");
        }
        if let Some(artifact) = &self.project.artifact
            && artifact.trim().is_empty()
        {
            bail!("project.artifact cannot be empty");
        }
        if let Some(version) = &self.project.version {
            Version::parse(version).context("project.version is not a valid version")?;
        }
        if self.project.packaging.trim().is_empty() {
            bail!("project.packaging cannot be empty");
        }

        validate_url("repositories.releases", &self.repositories.releases)?;
        validate_url("repositories.staging", &self.repositories.staging)?;
        validate_url("repositories.snapshots", &self.repositories.snapshots)?;
        if let Some(metadata) = &self.repositories.metadata {
            validate_url("repositories.metadata", metadata)?;
        }

        if self.probe.connect_timeout.is_zero() {
            bail!("probe.connect_timeout must be greater than 0");
        }
        if self.probe.read_timeout.is_zero() {
            bail!("probe.read_timeout must be greater than 0");
        }

        Ok(())
    }

    /// Build [`Settings`] by merging CLI overrides with config file values.
    ///
    /// The base version comes from the CLI, then `project.version`, then the
    /// `version` line of the properties file. Relative paths resolve against
    /// `project_dir`.
    pub fn build_settings(&self, project_dir: &Path, cli: CliOverrides) -> Result<Settings> {
        let group_id = cli
            .group
            .or_else(|| self.project.group.clone())
            .context("no group id configured; set project.group in .stager.toml or pass --group")?;
        let artifact_id = cli.artifact.or_else(|| self.project.artifact.clone()).context(
            "no artifact id configured; set project.artifact in .stager.toml or pass --artifact",
        )?;

        let properties_file = project_dir.join(
            cli.properties_file
                .unwrap_or_else(|| self.project.properties_file.clone()),
        );
        let description_file = project_dir.join(
            cli.description_file
                .unwrap_or_else(|| self.project.description_file.clone()),
        );

        let raw_version = match cli.version.or_else(|| self.project.version.clone()) {
            Some(v) => v,
            None => properties::read_version(&properties_file)?.with_context(|| {
                format!(
                    "no version configured; pass --version, set project.version, or add a version line to {}",
                    properties_file.display()
                )
            })?,
        };
        let version = Version::parse(&raw_version)?;

        let credentials = auth::resolve_credentials(self.credentials.as_ref())?;
        let target = |url: &str, kind| {
            RepositoryTarget::new(url, kind).with_credentials(credentials.clone())
        };
        let releases = target(&self.repositories.releases, RepositoryKind::Release);
        let metadata = match &self.repositories.metadata {
            Some(url) => target(url, RepositoryKind::Release),
            None => releases.clone(),
        };

        Ok(Settings {
            project_dir: project_dir.to_path_buf(),
            title: self
                .project
                .title
                .clone()
                .unwrap_or_else(|| artifact_id.clone()),
            group_id,
            artifact_id,
            version,
            description: self.project.description.clone(),
            packaging: cli
                .packaging
                .unwrap_or_else(|| self.project.packaging.clone()),
            description_file,
            properties_file,
            staging: target(&self.repositories.staging, RepositoryKind::Staging),
            snapshots: target(&self.repositories.snapshots, RepositoryKind::Snapshot),
            releases,
            metadata,
            connect_timeout: self.probe.connect_timeout,
            read_timeout: self.probe.read_timeout,
            on_unavailable: cli.on_unavailable.unwrap_or(self.alpha.on_unavailable),
        })
    }
}
