//! Named type definitions
//!
//! An `ItemDefinition` describes the shape of a value: a primitive leaf, an
//! alias of another definition, or a structural record built from nested
//! component definitions. Collections are marked with a flag rather than a
//! wrapper type.

use serde::{Deserialize, Serialize};

/// Identifier of the engine's own type grammar, the default `type_language`
pub const DEFAULT_TYPE_LANGUAGE: &str = "verdict";

/// A named, possibly recursive type definition.
///
/// Well-formed definitions are one of:
/// - a record type: non-empty `item_components`, no `type_ref`
/// - an alias type: a `type_ref`, empty `item_components`
/// - a bare primitive leaf: neither
///
/// Cycles through component `type_ref`s are illegal and rejected when the
/// type registry is built, not at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    /// Unique name within the enclosing scope
    pub name: String,

    /// Reference to a primitive or another item definition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_ref: Option<String>,

    /// Grammar the type expressions are written in
    #[serde(default = "default_type_language")]
    pub type_language: String,

    /// Marks the type as "list of T"
    #[serde(default)]
    pub is_collection: bool,

    /// Unary-test source constraining legal values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<String>,

    /// Nested component definitions for structural record types
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub item_components: Vec<ItemDefinition>,
}

fn default_type_language() -> String {
    DEFAULT_TYPE_LANGUAGE.to_string()
}

impl ItemDefinition {
    /// Create a bare leaf definition
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_ref: None,
            type_language: default_type_language(),
            is_collection: false,
            allowed_values: None,
            item_components: Vec::new(),
        }
    }

    /// Set the type reference
    pub fn with_type_ref(mut self, type_ref: impl Into<String>) -> Self {
        self.type_ref = Some(type_ref.into());
        self
    }

    /// Mark this definition as a collection
    pub fn as_collection(mut self) -> Self {
        self.is_collection = true;
        self
    }

    /// Set the allowed-values constraint
    pub fn with_allowed_values(mut self, tests: impl Into<String>) -> Self {
        self.allowed_values = Some(tests.into());
        self
    }

    /// Add a nested component definition
    pub fn with_component(mut self, component: ItemDefinition) -> Self {
        self.item_components.push(component);
        self
    }

    /// Check if this is a structural record type
    pub fn is_record(&self) -> bool {
        !self.item_components.is_empty()
    }

    /// Check if this is an alias of another definition
    pub fn is_alias(&self) -> bool {
        self.type_ref.is_some() && self.item_components.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_definition() {
        let def = ItemDefinition::new("Age").with_type_ref("number");
        assert!(def.is_alias());
        assert!(!def.is_record());
        assert_eq!(def.type_language, DEFAULT_TYPE_LANGUAGE);
    }

    #[test]
    fn test_record_definition() {
        let def = ItemDefinition::new("Customer")
            .with_component(ItemDefinition::new("name").with_type_ref("string"))
            .with_component(ItemDefinition::new("age").with_type_ref("number"));

        assert!(def.is_record());
        assert!(!def.is_alias());
        assert_eq!(def.item_components.len(), 2);
    }

    #[test]
    fn test_collection_with_allowed_values() {
        let def = ItemDefinition::new("RiskLevel")
            .with_type_ref("string")
            .with_allowed_values(r#""low", "medium", "high""#)
            .as_collection();

        assert!(def.is_collection);
        assert_eq!(def.allowed_values.as_deref(), Some(r#""low", "medium", "high""#));
    }

    #[test]
    fn test_serde_defaults() {
        let json = r#"{"name": "Amount"}"#;
        let def: ItemDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.name, "Amount");
        assert!(!def.is_collection);
        assert_eq!(def.type_language, DEFAULT_TYPE_LANGUAGE);
        assert!(def.item_components.is_empty());
    }
}
