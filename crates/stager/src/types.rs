use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use stager_registry::{Credentials, artifact_path, join_url};

use crate::error::{Result, StagerError};

/// Suffix marking a snapshot (pre-release) build.
pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// Separator between the numeric base and the alpha sequence number.
pub const ALPHA_MARKER: &str = "-alpha-";

/// Lifecycle qualifier of a [`Version`]. Exactly one applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Qualifier {
    Release,
    Snapshot,
    Alpha(u32),
}

/// A numeric base such as `1.2.3` plus at most one qualifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    base: String,
    qualifier: Qualifier,
}

impl Version {
    /// Parse `1.2.3`, `1.2.3-SNAPSHOT` or `1.2.3-alpha-N` (N > 0).
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let invalid = |reason: &str| StagerError::InvalidVersion {
            version: input.to_string(),
            reason: reason.to_string(),
        };

        let (base, qualifier) = if let Some(base) = trimmed.strip_suffix(SNAPSHOT_SUFFIX) {
            (base, Qualifier::Snapshot)
        } else if let Some((base, number)) = trimmed.rsplit_once(ALPHA_MARKER) {
            if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid("alpha number must be a positive integer"));
            }
            let n: u32 = number
                .parse()
                .map_err(|_| invalid("alpha number is out of range"))?;
            if n == 0 {
                return Err(invalid("alpha number must be a positive integer"));
            }
            (base, Qualifier::Alpha(n))
        } else {
            (trimmed, Qualifier::Release)
        };

        if !is_numeric_base(base) {
            return Err(invalid("expected dot-separated numbers such as 1.2.3"));
        }

        Ok(Self {
            base: base.to_string(),
            qualifier,
        })
    }

    /// The numeric part, without any qualifier.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn qualifier(&self) -> Qualifier {
        self.qualifier
    }

    pub fn is_release(&self) -> bool {
        self.qualifier == Qualifier::Release
    }

    pub fn is_snapshot(&self) -> bool {
        self.qualifier == Qualifier::Snapshot
    }

    pub fn alpha_number(&self) -> Option<u32> {
        match self.qualifier {
            Qualifier::Alpha(n) => Some(n),
            _ => None,
        }
    }

    /// The bare numeric base as a release version.
    pub fn root(&self) -> Self {
        self.with_qualifier(Qualifier::Release)
    }

    /// Replace whatever qualifier is present.
    pub fn with_qualifier(&self, qualifier: Qualifier) -> Self {
        Self {
            base: self.base.clone(),
            qualifier,
        }
    }
}

fn is_numeric_base(base: &str) -> bool {
    !base.is_empty()
        && base
            .split('.')
            .all(|segment| !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()))
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.qualifier {
            Qualifier::Release => f.write_str(&self.base),
            Qualifier::Snapshot => write!(f, "{}{SNAPSHOT_SUFFIX}", self.base),
            Qualifier::Alpha(n) => write!(f, "{}{ALPHA_MARKER}{n}", self.base),
        }
    }
}

impl FromStr for Version {
    type Err = StagerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// `{groupId, artifactId, version}` of one publish attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCoordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Version,
}

impl ArtifactCoordinate {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>, version: Version) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version,
        }
    }

    /// Repository-relative path of the artifact file with `extension`.
    pub fn artifact_path(&self, extension: &str) -> String {
        artifact_path(
            &self.group_id,
            &self.artifact_id,
            &self.version.to_string(),
            extension,
        )
    }
}

impl fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepositoryKind {
    Snapshot,
    Staging,
    Release,
}

impl fmt::Display for RepositoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Snapshot => "snapshot",
            Self::Staging => "staging",
            Self::Release => "release",
        })
    }
}

/// A repository the pipeline reads from or publishes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryTarget {
    pub base_url: String,
    pub kind: RepositoryKind,
    pub credentials: Option<Credentials>,
}

impl RepositoryTarget {
    pub fn new(base_url: impl Into<String>, kind: RepositoryKind) -> Self {
        Self {
            base_url: base_url.into(),
            kind,
            credentials: None,
        }
    }

    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Absolute URL of a repository-relative path.
    pub fn url_for(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_qualifier() {
        let release = Version::parse("1.2.3").expect("release");
        assert_eq!(release.qualifier(), Qualifier::Release);
        assert_eq!(release.base(), "1.2.3");

        let snapshot = Version::parse("1.2.3-SNAPSHOT").expect("snapshot");
        assert!(snapshot.is_snapshot());
        assert_eq!(snapshot.base(), "1.2.3");

        let alpha = Version::parse("1.2.3-alpha-12").expect("alpha");
        assert_eq!(alpha.alpha_number(), Some(12));
        assert_eq!(alpha.base(), "1.2.3");
    }

    #[test]
    fn display_roundtrips_input() {
        for input in ["0.9.0", "0.9.0-SNAPSHOT", "0.9.0-alpha-3", "10.20"] {
            assert_eq!(Version::parse(input).expect("parse").to_string(), input);
        }
    }

    #[test]
    fn rejects_malformed_versions() {
        for input in [
            "",
            "1.2.x",
            "1..2",
            "1.2.3-beta",
            "1.2.3-alpha-",
            "1.2.3-alpha-0",
            "1.2.3-alpha-+4",
            "1.2.3-SNAPSHOT-SNAPSHOT",
            "1.2.3-alpha-1-SNAPSHOT",
        ] {
            assert!(
                matches!(Version::parse(input), Err(StagerError::InvalidVersion { .. })),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn root_drops_qualifier() {
        let v = Version::parse("2.0.0-alpha-4").expect("parse");
        assert_eq!(v.root().to_string(), "2.0.0");
        assert!(v.root().is_release());
    }

    #[test]
    fn coordinate_paths_use_version_string() {
        let coord = ArtifactCoordinate::new(
            "org.eclipse.keyple",
            "keyple-java-core",
            Version::parse("1.0.0").expect("parse"),
        );
        assert_eq!(
            coord.artifact_path("pom"),
            "org/eclipse/keyple/keyple-java-core/1.0.0/keyple-java-core-1.0.0.pom"
        );
        assert_eq!(coord.to_string(), "org.eclipse.keyple:keyple-java-core:1.0.0");
    }

    #[test]
    fn repository_kind_serializes_snake_case() {
        let kinds: Vec<RepositoryKind> =
            toml::from_str::<std::collections::BTreeMap<String, Vec<RepositoryKind>>>(
                "kinds = [\"release\", \"staging\", \"snapshot\"]",
            )
            .expect("parse")
            .remove("kinds")
            .expect("kinds");
        assert_eq!(
            kinds,
            vec![
                RepositoryKind::Release,
                RepositoryKind::Staging,
                RepositoryKind::Snapshot
            ]
        );
    }

    #[test]
    fn target_url_joins_base_and_path() {
        let target = RepositoryTarget::new("https://repo.example/maven2/", RepositoryKind::Release);
        assert_eq!(target.url_for("a/b.pom"), "https://repo.example/maven2/a/b.pom");
    }
}
