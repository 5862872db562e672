//! Repository group metadata for stager.
//!
//! Maven-layout repositories publish a `maven-metadata.xml` index next to
//! every artifact family, listing each version ever uploaded. This crate
//! models that document and converts it to and from its wire form.
//!
//! The decoder is namespace-unaware: element names are matched literally, so
//! documents with or without an `xmlns` declaration bind the same way.
//!
//! # Example
//!
//! ```
//! use stager_metadata::{MavenMetadataDocument, marshal, unmarshal};
//!
//! let xml = br#"<metadata>
//!   <groupId>org.example</groupId>
//!   <artifactId>demo</artifactId>
//!   <versioning>
//!     <versions><version>1.0.0</version><version>1.1.0</version></versions>
//!   </versioning>
//! </metadata>"#;
//!
//! let doc: MavenMetadataDocument = unmarshal(xml).unwrap();
//! assert_eq!(doc.versioning.versions, vec!["1.0.0", "1.1.0"]);
//!
//! let wire = marshal(&doc).unwrap();
//! assert!(wire.starts_with("<?xml"));
//! ```

use std::io::BufRead;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Declaration written in front of every marshalled document.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Errors raised while encoding or decoding XML documents.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("failed to parse XML document: {0}")]
    Parse(#[from] quick_xml::DeError),

    #[error("failed to serialize XML document: {0}")]
    Serialize(#[from] quick_xml::SeError),
}

/// The `<metadata>` root of a group metadata document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "metadata", rename_all = "camelCase")]
pub struct MavenMetadataDocument {
    #[serde(default)]
    pub group_id: String,
    #[serde(default)]
    pub artifact_id: String,
    /// Required: a document without `<versioning>` does not decode.
    pub versioning: Versioning,
}

/// Published versions and the repository's latest/release markers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Versioning {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    /// Versions in publication order, duplicates kept as found.
    #[serde(default, with = "version_list")]
    pub versions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl MavenMetadataDocument {
    /// Decode a document from raw bytes.
    pub fn from_xml(bytes: &[u8]) -> Result<Self, MetadataError> {
        unmarshal(bytes)
    }

    /// Encode the document, declaration included.
    pub fn to_xml(&self) -> Result<String, MetadataError> {
        marshal(self)
    }
}

/// `<versions><version>..</version>..</versions>` wrapper.
mod version_list {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize)]
    struct VersionsRef<'a> {
        version: &'a [String],
    }

    #[derive(Deserialize)]
    struct Versions {
        #[serde(default)]
        version: Vec<String>,
    }

    pub(super) fn serialize<S: Serializer>(
        versions: &[String],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        VersionsRef { version: versions }.serialize(serializer)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<String>, D::Error> {
        Versions::deserialize(deserializer).map(|v| v.version)
    }
}

/// Serialize `value` to its wire form: declaration, then the root element
/// with no whitespace between elements.
pub fn marshal<T: Serialize>(value: &T) -> Result<String, MetadataError> {
    let body = quick_xml::se::to_string(value)?;
    Ok(format!("{XML_DECLARATION}{body}"))
}

/// Decode a document held in memory.
pub fn unmarshal<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, MetadataError> {
    unmarshal_reader(bytes)
}

/// Decode a document from a buffered stream, such as an HTTP response body.
pub fn unmarshal_reader<T: DeserializeOwned, R: BufRead>(reader: R) -> Result<T, MetadataError> {
    Ok(quick_xml::de::from_reader(reader)?)
}
