//! Project description translation and POM rendering.
//!
//! The description is a YAML document (`PUBLISHERS.yml` by default) written
//! by people. [`translate`] maps it onto a [`PomDescriptor`]; [`render_pom`]
//! writes the descriptor as a Maven 4.0.0 `<project>` document.
//!
//! Absent fields stay absent all the way through: an unset leaf is never
//! rendered as an empty element.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Result, StagerError};
use crate::types::ArtifactCoordinate;

/// Default file name of the project description.
pub const DEFAULT_DESCRIPTION_FILE: &str = "PUBLISHERS.yml";

const POM_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const POM_NAMESPACE: &str = "http://maven.apache.org/POM/4.0.0";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const POM_SCHEMA_LOCATION: &str =
    "http://maven.apache.org/POM/4.0.0 https://maven.apache.org/xsd/maven-4.0.0.xsd";
const MODEL_VERSION: &str = "4.0.0";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Organization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct License {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

// Field order follows the POM schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Scm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer_connection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DistributionManagement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

/// Shape shared by `issueManagement` and `ciManagement`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Management {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A developer or contributor as written in the description file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PersonEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub organization_url: Option<String>,
    #[serde(default, alias = "timeZone")]
    pub timezone: Option<String>,
    #[serde(default)]
    pub roles: Option<Vec<String>>,
}

/// The structured project description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectDescription {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub organization: Option<Organization>,
    #[serde(default)]
    pub licenses: Option<Vec<License>>,
    #[serde(default)]
    pub developers: Option<Vec<PersonEntry>>,
    #[serde(default)]
    pub contributors: Option<Vec<PersonEntry>>,
    #[serde(default)]
    pub scm: Option<Scm>,
    #[serde(default)]
    pub distribution_management: Option<DistributionManagement>,
    #[serde(default)]
    pub issue_management: Option<Management>,
    #[serde(default)]
    pub ci_management: Option<Management>,
    #[serde(default)]
    pub properties: Option<BTreeMap<String, String>>,
}

/// Values the build project supplies regardless of the description file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDefaults {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PomDeveloper {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub url: Option<String>,
    pub organization: Option<String>,
    pub organization_url: Option<String>,
    pub timezone: Option<String>,
    pub roles: Option<BTreeSet<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PomContributor {
    pub name: Option<String>,
    pub email: Option<String>,
    pub url: Option<String>,
    pub organization: Option<String>,
    pub organization_url: Option<String>,
    pub timezone: Option<String>,
    pub roles: Option<BTreeSet<String>>,
}

/// The POM metadata tree. `None` means "do not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PomDescriptor {
    pub name: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub organization: Option<Organization>,
    pub licenses: Option<Vec<License>>,
    pub developers: Option<Vec<PomDeveloper>>,
    pub contributors: Option<Vec<PomContributor>>,
    pub scm: Option<Scm>,
    pub distribution_management: Option<DistributionManagement>,
    pub issue_management: Option<Management>,
    pub ci_management: Option<Management>,
    pub properties: Option<BTreeMap<String, String>>,
}

/// Parse a description document. `origin` names the source in errors.
///
/// A document with no content (blank or comments only) is an empty
/// description.
pub fn parse_description(text: &str, origin: &str) -> Result<ProjectDescription> {
    let has_content = text
        .lines()
        .map(str::trim)
        .any(|line| !line.is_empty() && !line.starts_with('#') && line != "---");
    if !has_content {
        return Ok(ProjectDescription::default());
    }

    serde_yaml::from_str(text).map_err(|source| StagerError::MalformedDescription {
        origin: origin.to_string(),
        source,
    })
}

/// Read and parse the description at `path`. `Ok(None)` if the file does not exist.
pub fn read_description(path: &Path) -> Result<Option<ProjectDescription>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(StagerError::io(path, err)),
    };
    parse_description(&text, &path.display().to_string()).map(Some)
}

/// Build the POM tree from a parsed description.
///
/// `name` always comes from `defaults.title`. `description` falls back to
/// `defaults.description` when the document has none.
pub fn translate(doc: &ProjectDescription, defaults: &ProjectDefaults) -> PomDescriptor {
    PomDescriptor {
        name: defaults.title.clone(),
        description: doc
            .description
            .clone()
            .or_else(|| defaults.description.clone()),
        url: doc.url.clone(),
        organization: doc.organization.clone(),
        licenses: doc.licenses.clone(),
        developers: doc
            .developers
            .as_ref()
            .map(|people| people.iter().map(developer).collect()),
        contributors: doc
            .contributors
            .as_ref()
            .map(|people| people.iter().map(contributor).collect()),
        scm: doc.scm.clone(),
        distribution_management: doc.distribution_management.clone(),
        issue_management: doc.issue_management.clone(),
        ci_management: doc.ci_management.clone(),
        properties: doc.properties.clone(),
    }
}

fn role_set(roles: &Option<Vec<String>>) -> Option<BTreeSet<String>> {
    roles.as_ref().map(|roles| roles.iter().cloned().collect())
}

fn developer(entry: &PersonEntry) -> PomDeveloper {
    PomDeveloper {
        id: entry.id.clone(),
        name: entry.name.clone(),
        email: entry.email.clone(),
        url: entry.url.clone(),
        organization: entry.organization.clone(),
        organization_url: entry.organization_url.clone(),
        timezone: entry.timezone.clone(),
        roles: role_set(&entry.roles),
    }
}

fn contributor(entry: &PersonEntry) -> PomContributor {
    PomContributor {
        name: entry.name.clone(),
        email: entry.email.clone(),
        url: entry.url.clone(),
        organization: entry.organization.clone(),
        organization_url: entry.organization_url.clone(),
        timezone: entry.timezone.clone(),
        roles: role_set(&entry.roles),
    }
}

// Serialization views. Element order is the POM schema order.

#[derive(Serialize)]
#[serde(rename = "project", rename_all = "camelCase")]
struct ProjectXml<'a> {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(rename = "@xmlns:xsi")]
    xmlns_xsi: &'static str,
    #[serde(rename = "@xsi:schemaLocation")]
    schema_location: &'static str,
    model_version: &'static str,
    group_id: &'a str,
    artifact_id: &'a str,
    version: String,
    packaging: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    organization: Option<&'a Organization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    licenses: Option<LicensesXml<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    developers: Option<DevelopersXml<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    contributors: Option<ContributorsXml<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scm: Option<&'a Scm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    issue_management: Option<&'a Management>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ci_management: Option<&'a Management>,
    #[serde(skip_serializing_if = "Option::is_none")]
    distribution_management: Option<&'a DistributionManagement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<&'a BTreeMap<String, String>>,
}

#[derive(Serialize)]
struct LicensesXml<'a> {
    license: &'a [License],
}

#[derive(Serialize)]
struct DevelopersXml<'a> {
    developer: Vec<DeveloperXml<'a>>,
}

#[derive(Serialize)]
struct ContributorsXml<'a> {
    contributor: Vec<ContributorXml<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeveloperXml<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    organization: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    organization_url: Option<&'a str>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_roles"
    )]
    roles: Option<&'a BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timezone: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContributorXml<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    organization: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    organization_url: Option<&'a str>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_roles"
    )]
    roles: Option<&'a BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timezone: Option<&'a str>,
}

fn serialize_roles<S: Serializer>(
    roles: &Option<&BTreeSet<String>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    struct Roles<'a> {
        role: Vec<&'a String>,
    }
    let role = roles.map(|set| set.iter().collect()).unwrap_or_default();
    Roles { role }.serialize(serializer)
}

impl<'a> From<&'a PomDeveloper> for DeveloperXml<'a> {
    fn from(d: &'a PomDeveloper) -> Self {
        Self {
            id: d.id.as_deref(),
            name: d.name.as_deref(),
            email: d.email.as_deref(),
            url: d.url.as_deref(),
            organization: d.organization.as_deref(),
            organization_url: d.organization_url.as_deref(),
            roles: d.roles.as_ref(),
            timezone: d.timezone.as_deref(),
        }
    }
}

impl<'a> From<&'a PomContributor> for ContributorXml<'a> {
    fn from(c: &'a PomContributor) -> Self {
        Self {
            name: c.name.as_deref(),
            email: c.email.as_deref(),
            url: c.url.as_deref(),
            organization: c.organization.as_deref(),
            organization_url: c.organization_url.as_deref(),
            roles: c.roles.as_ref(),
            timezone: c.timezone.as_deref(),
        }
    }
}

/// Render `pom` as an indented Maven 4.0.0 POM for `coordinate`.
pub fn render_pom(
    pom: &PomDescriptor,
    coordinate: &ArtifactCoordinate,
    packaging: &str,
) -> Result<String> {
    let view = ProjectXml {
        xmlns: POM_NAMESPACE,
        xmlns_xsi: XSI_NAMESPACE,
        schema_location: POM_SCHEMA_LOCATION,
        model_version: MODEL_VERSION,
        group_id: &coordinate.group_id,
        artifact_id: &coordinate.artifact_id,
        version: coordinate.version.to_string(),
        packaging,
        name: &pom.name,
        description: pom.description.as_deref(),
        url: pom.url.as_deref(),
        organization: pom.organization.as_ref(),
        licenses: pom
            .licenses
            .as_deref()
            .map(|license| LicensesXml { license }),
        developers: pom.developers.as_ref().map(|people| DevelopersXml {
            developer: people.iter().map(DeveloperXml::from).collect(),
        }),
        contributors: pom.contributors.as_ref().map(|people| ContributorsXml {
            contributor: people.iter().map(ContributorXml::from).collect(),
        }),
        scm: pom.scm.as_ref(),
        issue_management: pom.issue_management.as_ref(),
        ci_management: pom.ci_management.as_ref(),
        distribution_management: pom.distribution_management.as_ref(),
        properties: pom.properties.as_ref(),
    };

    let mut body = String::new();
    let mut serializer = quick_xml::se::Serializer::new(&mut body);
    serializer.indent(' ', 2);
    view.serialize(serializer)?;

    let mut out = String::with_capacity(POM_DECLARATION.len() + body.len() + 2);
    out.push_str(POM_DECLARATION);
    out.push('\n');
    out.push_str(&body);
    out.push('\n');
    Ok(out)
}
