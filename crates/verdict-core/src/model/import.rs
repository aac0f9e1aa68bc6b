//! Cross-model import declarations

use serde::{Deserialize, Serialize};

/// Reference to another model's namespace.
///
/// Resolution happens lazily against a registry of loaded models; an import
/// that cannot be resolved is a structural warning, never a load failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Import {
    /// The imported model's namespace identifier
    pub namespace: String,

    /// Optional retrieval hint for collaborators that fetch models
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_uri: Option<String>,

    /// Format discriminator for the imported document
    #[serde(default)]
    pub import_type: String,
}

impl Import {
    /// Create an import of the given namespace
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            location_uri: None,
            import_type: String::new(),
        }
    }

    /// Set the retrieval hint
    pub fn with_location_uri(mut self, uri: impl Into<String>) -> Self {
        self.location_uri = Some(uri.into());
        self
    }

    /// Set the format discriminator
    pub fn with_import_type(mut self, import_type: impl Into<String>) -> Self {
        self.import_type = import_type.into();
        self
    }
}
