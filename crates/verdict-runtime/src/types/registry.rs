//! Per-model type registry
//!
//! Item definitions are kept in an arena addressed by index so a definition's
//! `type_ref` can point at any other definition without cyclic ownership;
//! cycle detection is a reachability check over those indices, performed once
//! when the registry is built. Allowed-value constraints are compiled here,
//! once, and looked up by definition path during validation.

use crate::error::{Result, RuntimeError};
use std::collections::HashMap;
use std::sync::Arc;
use verdict_compiler::{CompiledExpression, Compiler};
use verdict_core::model::{Definitions, ItemDefinition};
use verdict_core::Value;

/// Primitive types of the expression language's type grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltInType {
    Number,
    String,
    Boolean,
    Date,
    Time,
    DateTime,
    Any,
}

impl BuiltInType {
    /// Resolve a primitive type name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "number" => Some(BuiltInType::Number),
            "string" => Some(BuiltInType::String),
            "boolean" => Some(BuiltInType::Boolean),
            "date" => Some(BuiltInType::Date),
            "time" => Some(BuiltInType::Time),
            "datetime" => Some(BuiltInType::DateTime),
            "any" => Some(BuiltInType::Any),
            _ => None,
        }
    }

    /// Check whether a value belongs to this primitive type. Null only
    /// conforms to `any`.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            BuiltInType::Any => true,
            BuiltInType::Number => matches!(value, Value::Number(_)),
            BuiltInType::String => matches!(value, Value::String(_)),
            BuiltInType::Boolean => matches!(value, Value::Boolean(_)),
            BuiltInType::Date => matches!(value, Value::Date(_)),
            BuiltInType::Time => matches!(value, Value::Time(_)),
            BuiltInType::DateTime => matches!(value, Value::DateTime(_)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BuiltInType::Number => "number",
            BuiltInType::String => "string",
            BuiltInType::Boolean => "boolean",
            BuiltInType::Date => "date",
            BuiltInType::Time => "time",
            BuiltInType::DateTime => "datetime",
            BuiltInType::Any => "any",
        }
    }
}

/// Outcome of resolving a type reference against one model's registry
#[derive(Debug, Clone, PartialEq)]
pub enum TypeResolution {
    BuiltIn(BuiltInType),
    /// Index into this registry's definition arena
    Item(usize),
    /// The leading qualifier names an imported namespace; the remainder must
    /// be resolved against that model
    Foreign { namespace: String, remainder: String },
    Unresolved,
}

/// Registry of one model's item definitions
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    namespace: String,
    defs: Vec<ItemDefinition>,
    by_name: HashMap<String, usize>,
    /// Compiled allowed-value tests, keyed by definition path
    /// (e.g. `Customer.age`)
    allowed: HashMap<String, Arc<CompiledExpression>>,
    import_namespaces: Vec<String>,
}

impl TypeRegistry {
    /// Build the registry for a model, rejecting cyclic definitions and
    /// compiling every allowed-value constraint once
    pub fn build(definitions: &Definitions) -> Result<Self> {
        let defs = definitions.item_definitions.clone();
        let by_name: HashMap<String, usize> = defs
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name.clone(), i))
            .collect();

        let registry = Self {
            namespace: definitions.namespace.clone(),
            import_namespaces: definitions
                .imports
                .iter()
                .map(|i| i.namespace.clone())
                .collect(),
            allowed: Self::compile_allowed_values(&defs)?,
            defs,
            by_name,
        };

        registry.reject_cycles()?;
        Ok(registry)
    }

    /// The owning model's namespace
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Fetch a definition from the arena
    pub fn def(&self, index: usize) -> &ItemDefinition {
        &self.defs[index]
    }

    /// Resolve a type reference against this registry
    pub fn resolve(&self, type_ref: &str) -> TypeResolution {
        if let Some(primitive) = BuiltInType::from_name(type_ref) {
            return TypeResolution::BuiltIn(primitive);
        }
        if let Some(&index) = self.by_name.get(type_ref) {
            return TypeResolution::Item(index);
        }
        if let Some((prefix, remainder)) = type_ref.split_once('.') {
            if self.import_namespaces.iter().any(|ns| ns == prefix) {
                return TypeResolution::Foreign {
                    namespace: prefix.to_string(),
                    remainder: remainder.to_string(),
                };
            }
        }
        TypeResolution::Unresolved
    }

    /// The compiled allowed-values constraint for a definition path
    pub fn allowed_values(&self, def_path: &str) -> Option<&Arc<CompiledExpression>> {
        self.allowed.get(def_path)
    }

    fn compile_allowed_values(
        defs: &[ItemDefinition],
    ) -> Result<HashMap<String, Arc<CompiledExpression>>> {
        let mut compiled = HashMap::new();
        for def in defs {
            Self::compile_allowed_walk(def, &def.name, &mut compiled)?;
        }
        Ok(compiled)
    }

    fn compile_allowed_walk(
        def: &ItemDefinition,
        path: &str,
        out: &mut HashMap<String, Arc<CompiledExpression>>,
    ) -> Result<()> {
        if let Some(source) = &def.allowed_values {
            let tests = verdict_parser::parse_unary_tests(source).map_err(|e| {
                RuntimeError::InvalidAllowedValues {
                    name: path.to_string(),
                    message: e.to_string(),
                }
            })?;
            let expression = Compiler::compile_unary_tests(&tests, source.clone()).map_err(|e| {
                RuntimeError::InvalidAllowedValues {
                    name: path.to_string(),
                    message: e.to_string(),
                }
            })?;
            out.insert(path.to_string(), Arc::new(expression));
        }
        for component in &def.item_components {
            let component_path = format!("{}.{}", path, component.name);
            Self::compile_allowed_walk(component, &component_path, out)?;
        }
        Ok(())
    }

    /// Reject definitions that reach themselves through `type_ref` edges
    fn reject_cycles(&self) -> Result<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            InStack,
            Done,
        }

        fn referenced_names(def: &ItemDefinition, out: &mut Vec<String>) {
            if let Some(type_ref) = &def.type_ref {
                out.push(type_ref.clone());
            }
            for component in &def.item_components {
                referenced_names(component, out);
            }
        }

        fn visit(
            index: usize,
            registry: &TypeRegistry,
            marks: &mut [Mark],
        ) -> Result<()> {
            marks[index] = Mark::InStack;
            let mut names = Vec::new();
            referenced_names(&registry.defs[index], &mut names);
            for name in names {
                if let Some(&target) = registry.by_name.get(&name) {
                    match marks[target] {
                        Mark::InStack => {
                            return Err(RuntimeError::CyclicTypeDefinition {
                                name: registry.defs[target].name.clone(),
                            })
                        }
                        Mark::Unvisited => visit(target, registry, marks)?,
                        Mark::Done => {}
                    }
                }
            }
            marks[index] = Mark::Done;
            Ok(())
        }

        let mut marks = vec![Mark::Unvisited; self.defs.len()];
        for index in 0..self.defs.len() {
            if marks[index] == Mark::Unvisited {
                visit(index, self, &mut marks)?;
            }
        }
        Ok(())
    }
}
