//! Structural and constraint validation
//!
//! Violations are accumulated, never fail-fast: callers need every violation,
//! not just the first. An unresolved type reference skips validation for that
//! branch rather than failing the value.

use super::registry::{TypeRegistry, TypeResolution};
use crate::context::EvaluationContext;
use crate::eval::Evaluator;
use crate::imports::ModelRegistry;
use serde::Serialize;
use verdict_core::model::ItemDefinition;
use verdict_core::Value;

/// One constraint or structure violation, located by value path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Path into the validated value (empty for the root)
    pub path: String,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Accumulated outcome of validating one value
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationOutcome {
    pub violations: Vec<Violation>,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    fn add(&mut self, path: &str, message: impl Into<String>) {
        self.violations.push(Violation::new(path, message));
    }
}

/// Validates values against declared types across the model registry
pub struct TypeValidator<'a> {
    models: &'a ModelRegistry,
}

impl<'a> TypeValidator<'a> {
    pub fn new(models: &'a ModelRegistry) -> Self {
        Self { models }
    }

    /// Validate a value against a type reference declared in the given
    /// model's namespace
    pub fn validate(&self, value: &Value, namespace: &str, type_ref: &str) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::default();
        self.validate_ref(value, namespace, type_ref, "", &mut outcome);
        outcome
    }

    fn validate_ref(
        &self,
        value: &Value,
        namespace: &str,
        type_ref: &str,
        path: &str,
        outcome: &mut ValidationOutcome,
    ) {
        let registry = match self.models.types(namespace) {
            Some(registry) => registry,
            None => {
                tracing::warn!(namespace, "type validation against unknown model skipped");
                return;
            }
        };

        match registry.resolve(type_ref) {
            TypeResolution::BuiltIn(primitive) => {
                if !primitive.matches(value) {
                    outcome.add(
                        path,
                        format!("expected {}, got {}", primitive.name(), value.type_name()),
                    );
                }
            }
            TypeResolution::Item(index) => {
                let def = registry.def(index).clone();
                self.validate_def(value, namespace, registry, &def, &def.name, path, outcome);
            }
            TypeResolution::Foreign {
                namespace: foreign_ns,
                remainder,
            } => {
                if self.models.types(&foreign_ns).is_some() {
                    self.validate_ref(value, &foreign_ns, &remainder, path, outcome);
                } else {
                    tracing::warn!(
                        namespace = foreign_ns.as_str(),
                        type_ref,
                        "imported namespace not loaded; reference left unresolved"
                    );
                }
            }
            TypeResolution::Unresolved => {
                tracing::warn!(namespace, type_ref, "unresolved type reference skipped");
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn validate_def(
        &self,
        value: &Value,
        namespace: &str,
        registry: &TypeRegistry,
        def: &ItemDefinition,
        def_path: &str,
        path: &str,
        outcome: &mut ValidationOutcome,
    ) {
        if def.is_collection {
            match value {
                Value::List(items) => {
                    // Each element validates independently
                    for (index, item) in items.iter().enumerate() {
                        let element_path = format!("{}[{}]", path, index);
                        self.validate_element(
                            item,
                            namespace,
                            registry,
                            def,
                            def_path,
                            &element_path,
                            outcome,
                        );
                    }
                }
                _ => outcome.add(
                    path,
                    format!("expected a list of {}, got {}", def.name, value.type_name()),
                ),
            }
        } else {
            self.validate_element(value, namespace, registry, def, def_path, path, outcome);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn validate_element(
        &self,
        value: &Value,
        namespace: &str,
        registry: &TypeRegistry,
        def: &ItemDefinition,
        def_path: &str,
        path: &str,
        outcome: &mut ValidationOutcome,
    ) {
        if let Some(constraint) = registry.allowed_values(def_path) {
            let ctx = EvaluationContext::new();
            let result = Evaluator::evaluate_with_candidate(constraint, value, &ctx);
            match result.value() {
                Some(Value::Boolean(true)) => {}
                _ => outcome.add(
                    path,
                    format!(
                        "value violates allowed values '{}'",
                        constraint.source()
                    ),
                ),
            }
        }

        if def.is_record() {
            let entries = match value {
                Value::Context(entries) => entries,
                _ => {
                    outcome.add(
                        path,
                        format!("expected a {} record, got {}", def.name, value.type_name()),
                    );
                    return;
                }
            };

            for component in &def.item_components {
                let component_path = if path.is_empty() {
                    component.name.clone()
                } else {
                    format!("{}.{}", path, component.name)
                };
                match entries.get(&component.name) {
                    None => outcome.add(
                        &component_path,
                        format!("missing required component '{}'", component.name),
                    ),
                    Some(field) => {
                        let component_def_path = format!("{}.{}", def_path, component.name);
                        self.validate_def(
                            field,
                            namespace,
                            registry,
                            component,
                            &component_def_path,
                            &component_path,
                            outcome,
                        );
                    }
                }
            }
        } else if let Some(type_ref) = &def.type_ref {
            self.validate_ref(value, namespace, type_ref, path, outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use verdict_core::model::Definitions;

    fn registry_with(model: Definitions) -> ModelRegistry {
        let mut models = ModelRegistry::new();
        models.register(model).unwrap();
        models
    }

    fn person_model() -> Definitions {
        Definitions::new("people", "ns1").with_item_definition(
            ItemDefinition::new("Person")
                .with_component(ItemDefinition::new("name").with_type_ref("string"))
                .with_component(ItemDefinition::new("age").with_type_ref("number")),
        )
    }

    fn person(name: &str, age: i64) -> Value {
        Value::Context(HashMap::from([
            ("name".to_string(), Value::string(name)),
            ("age".to_string(), Value::number(age)),
        ]))
    }

    #[test]
    fn test_builtin_validation() {
        let models = registry_with(Definitions::new("m", "ns1"));
        let validator = TypeValidator::new(&models);

        assert!(validator
            .validate(&Value::number(1), "ns1", "number")
            .is_valid());
        let outcome = validator.validate(&Value::string("x"), "ns1", "number");
        assert_eq!(outcome.violations.len(), 1);
        assert!(outcome.violations[0].message.contains("expected number"));
    }

    #[test]
    fn test_record_validation() {
        let models = registry_with(person_model());
        let validator = TypeValidator::new(&models);

        assert!(validator
            .validate(&person("Alice", 30), "ns1", "Person")
            .is_valid());

        let incomplete = Value::Context(HashMap::from([(
            "name".to_string(),
            Value::string("Bob"),
        )]));
        let outcome = validator.validate(&incomplete, "ns1", "Person");
        assert_eq!(outcome.violations.len(), 1);
        assert_eq!(outcome.violations[0].path, "age");
        assert!(outcome.violations[0].message.contains("missing"));
    }

    #[test]
    fn test_collection_validation_per_element() {
        let model = Definitions::new("people", "ns1").with_item_definition(
            ItemDefinition::new("People")
                .with_component(ItemDefinition::new("name").with_type_ref("string"))
                .with_component(ItemDefinition::new("age").with_type_ref("number"))
                .as_collection(),
        );
        let models = registry_with(model);
        let validator = TypeValidator::new(&models);

        let valid = Value::List(vec![person("A", 1), person("B", 2)]);
        assert!(validator.validate(&valid, "ns1", "People").is_valid());

        let invalid = Value::List(vec![Value::Context(HashMap::from([(
            "name".to_string(),
            Value::string("A"),
        )]))]);
        let outcome = validator.validate(&invalid, "ns1", "People");
        assert_eq!(outcome.violations.len(), 1);
        assert_eq!(outcome.violations[0].path, "[0].age");
    }

    #[test]
    fn test_violations_accumulate() {
        let models = registry_with(person_model());
        let validator = TypeValidator::new(&models);

        // Both fields missing: both violations reported
        let outcome = validator.validate(&Value::Context(HashMap::new()), "ns1", "Person");
        assert_eq!(outcome.violations.len(), 2);
    }

    #[test]
    fn test_allowed_values_validation() {
        let model = Definitions::new("m", "ns1").with_item_definition(
            ItemDefinition::new("Score")
                .with_type_ref("number")
                .with_allowed_values("[1..5]"),
        );
        let models = registry_with(model);
        let validator = TypeValidator::new(&models);

        assert!(validator
            .validate(&Value::number(3), "ns1", "Score")
            .is_valid());

        let outcome = validator.validate(&Value::number(6), "ns1", "Score");
        assert_eq!(outcome.violations.len(), 1);
        assert!(outcome.violations[0].message.contains("[1..5]"));
    }

    #[test]
    fn test_alias_resolution() {
        let model = Definitions::new("m", "ns1").with_item_definition(
            ItemDefinition::new("Amount").with_type_ref("number"),
        );
        let models = registry_with(model);
        let validator = TypeValidator::new(&models);

        assert!(validator
            .validate(&Value::number(10), "ns1", "Amount")
            .is_valid());
        assert!(!validator
            .validate(&Value::string("x"), "ns1", "Amount")
            .is_valid());
    }

    #[test]
    fn test_imported_type_resolution() {
        let importing = Definitions::new("m1", "ns1")
            .with_import(verdict_core::model::Import::new("ns2"));
        let imported = Definitions::new("m2", "ns2").with_item_definition(
            ItemDefinition::new("Customer")
                .with_component(ItemDefinition::new("name").with_type_ref("string")),
        );

        let mut models = ModelRegistry::new();
        models.register(importing).unwrap();
        models.register(imported).unwrap();
        let validator = TypeValidator::new(&models);

        let customer = Value::Context(HashMap::from([(
            "name".to_string(),
            Value::string("Acme"),
        )]));
        assert!(validator
            .validate(&customer, "ns1", "ns2.Customer")
            .is_valid());
        assert!(!validator
            .validate(&Value::number(1), "ns1", "ns2.Customer")
            .is_valid());
    }

    #[test]
    fn test_unresolved_import_does_not_crash() {
        let importing = Definitions::new("m1", "ns1")
            .with_import(verdict_core::model::Import::new("ns2"));
        let models = registry_with(importing);
        let validator = TypeValidator::new(&models);

        // The imported model is absent: the reference stays unresolved and
        // validation reports no violations
        let outcome = validator.validate(&Value::number(1), "ns1", "ns2.Customer");
        assert!(outcome.is_valid());
    }
}
