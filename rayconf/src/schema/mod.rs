//! Engine document schemas.
//!
//! Two mutually exclusive document shapes are produced: the V2Ray/Xray
//! document ([`V2rayConfig`]) and the sing-box document
//! ([`SingboxConfig`]). A merge emits a [`DocumentCollection`] holding
//! several documents keyed by position.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub mod singbox;
pub mod v2ray;

pub use singbox::SingboxConfig;
pub use v2ray::V2rayConfig;

/// A generated document for one of the two engine families.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GeneratedDocument {
    /// V2Ray/Xray document.
    V2ray(V2rayConfig),
    /// sing-box document.
    Singbox(SingboxConfig),
}

impl GeneratedDocument {
    /// The V2Ray document, if this is one.
    #[must_use]
    pub const fn as_v2ray(&self) -> Option<&V2rayConfig> {
        match self {
            Self::V2ray(config) => Some(config),
            Self::Singbox(_) => None,
        }
    }

    /// The sing-box document, if this is one.
    #[must_use]
    pub const fn as_singbox(&self) -> Option<&SingboxConfig> {
        match self {
            Self::Singbox(config) => Some(config),
            Self::V2ray(_) => None,
        }
    }
}

impl From<V2rayConfig> for GeneratedDocument {
    fn from(config: V2rayConfig) -> Self {
        Self::V2ray(config)
    }
}

impl From<SingboxConfig> for GeneratedDocument {
    fn from(config: SingboxConfig) -> Self {
        Self::Singbox(config)
    }
}

/// An ordered set of documents written as one artifact.
///
/// Serializes as a JSON object keyed by zero-based insertion index
/// (`"0"`, `"1"`, ...).
///
/// # Examples
///
/// ```
/// use rayconf::schema::{DocumentCollection, SingboxConfig, V2rayConfig};
///
/// let mut collection = DocumentCollection::new();
/// collection.push(SingboxConfig::default());
/// collection.push(V2rayConfig::default());
///
/// let value = serde_json::to_value(&collection).unwrap();
/// assert!(value["0"]["log"]["timestamp"].is_boolean());
/// assert_eq!(value["1"]["routing"]["domainStrategy"], "AsIs");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentCollection {
    documents: Vec<GeneratedDocument>,
}

impl DocumentCollection {
    /// An empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            documents: Vec::new(),
        }
    }

    /// Append a document at the next index.
    pub fn push(&mut self, document: impl Into<GeneratedDocument>) {
        self.documents.push(document.into());
    }

    /// Number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Documents in insertion order.
    #[must_use]
    pub fn documents(&self) -> &[GeneratedDocument] {
        &self.documents
    }

    /// The most recently appended document.
    #[must_use]
    pub fn last(&self) -> Option<&GeneratedDocument> {
        self.documents.last()
    }
}

impl Serialize for DocumentCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.documents.len()))?;
        for (index, document) in self.documents.iter().enumerate() {
            map.serialize_entry(&index.to_string(), document)?;
        }
        map.end()
    }
}
