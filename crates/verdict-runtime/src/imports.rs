//! Model registry and cross-namespace import resolution
//!
//! The registry holds already-loaded models keyed by namespace. Imports are
//! resolved lazily against it; an import whose namespace is not loaded is a
//! structural warning that leaves crossing references unresolved, never a
//! load failure. Registering a model also builds its type registry and
//! compiles its decision and knowledge logic once, so compiled expressions
//! are shared across runs.

use crate::context::UserFunction;
use crate::error::Result;
use crate::result::{EvaluationFailure, FailureKind};
use crate::types::TypeRegistry;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use verdict_compiler::{CompiledExpression, Compiler};
use verdict_core::model::{Decision, DecisionLogic, Definitions, Import};

/// A loaded model: its definitions, type registry and compiled logic
#[derive(Debug)]
pub struct ModelHandle {
    definitions: Arc<Definitions>,
    types: TypeRegistry,
    /// Per-decision compiled literal expression, or the failure produced
    /// while compiling it (recorded, not fatal to the model)
    decision_logic: HashMap<String, std::result::Result<Arc<CompiledExpression>, EvaluationFailure>>,
    /// Per-knowledge-model compiled function
    knowledge: HashMap<String, std::result::Result<UserFunction, EvaluationFailure>>,
}

impl ModelHandle {
    /// Load a model: build its type registry and compile its logic.
    ///
    /// Structural defects of the type lattice (cycles, malformed allowed
    /// values) fail the load; a single decision's bad expression is recorded
    /// against that decision only.
    pub fn new(definitions: Definitions) -> Result<Self> {
        let types = TypeRegistry::build(&definitions)?;

        let mut decision_logic = HashMap::new();
        for decision in &definitions.decisions {
            if let Some(DecisionLogic::LiteralExpression { text }) = &decision.decision_logic {
                decision_logic.insert(
                    decision.name.clone(),
                    Self::compile_expression(text, &decision.name),
                );
            }
        }

        let mut knowledge = HashMap::new();
        for bkm in &definitions.business_knowledge_models {
            let compiled = Self::compile_expression(&bkm.encapsulated_logic.body, &bkm.name).map(
                |body| {
                    UserFunction::new(
                        bkm.encapsulated_logic
                            .parameters
                            .iter()
                            .map(|p| p.name.clone())
                            .collect(),
                        body,
                    )
                },
            );
            knowledge.insert(bkm.name.clone(), compiled);
        }

        Ok(Self {
            definitions: Arc::new(definitions),
            types,
            decision_logic,
            knowledge,
        })
    }

    fn compile_expression(
        text: &str,
        node_name: &str,
    ) -> std::result::Result<Arc<CompiledExpression>, EvaluationFailure> {
        let ast = verdict_parser::parse(text).map_err(|e| {
            EvaluationFailure::new(FailureKind::Parse, e.to_string()).with_source(node_name)
        })?;
        let compiled = Compiler::compile(&ast, text).map_err(|e| {
            EvaluationFailure::new(FailureKind::Compile, e.to_string()).with_source(node_name)
        })?;
        Ok(Arc::new(compiled))
    }

    pub fn definitions(&self) -> &Arc<Definitions> {
        &self.definitions
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// The compiled logic of a decision, if it has any
    pub fn decision_logic(
        &self,
        name: &str,
    ) -> Option<&std::result::Result<Arc<CompiledExpression>, EvaluationFailure>> {
        self.decision_logic.get(name)
    }

    /// Collect the transitive closure of knowledge functions a decision
    /// requires, ready to be bound into its evaluation scope
    pub fn knowledge_for(
        &self,
        decision: &Decision,
    ) -> std::result::Result<HashMap<String, UserFunction>, EvaluationFailure> {
        let mut functions = HashMap::new();
        let mut queue: VecDeque<&str> = decision
            .knowledge_requirements
            .iter()
            .map(|r| r.required_knowledge.as_str())
            .collect();
        let mut visited = HashSet::new();

        while let Some(name) = queue.pop_front() {
            if !visited.insert(name.to_string()) {
                continue;
            }
            let bkm = self.definitions.knowledge_model(name).ok_or_else(|| {
                EvaluationFailure::new(
                    FailureKind::Structural,
                    format!("unknown knowledge model '{}'", name),
                )
                .with_source(&decision.name)
            })?;
            match self.knowledge.get(name) {
                Some(Ok(function)) => {
                    functions.insert(name.to_string(), function.clone());
                }
                Some(Err(failure)) => return Err(failure.clone()),
                None => {
                    return Err(EvaluationFailure::new(
                        FailureKind::Structural,
                        format!("knowledge model '{}' has no compiled logic", name),
                    )
                    .with_source(&decision.name))
                }
            }
            for requirement in &bkm.knowledge_requirements {
                queue.push_back(&requirement.required_knowledge);
            }
        }

        Ok(functions)
    }
}

/// Registry of loaded models keyed by namespace
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: HashMap<String, Arc<ModelHandle>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and register a model under its namespace. Unresolved imports are
    /// logged as structural warnings, not errors.
    pub fn register(&mut self, definitions: Definitions) -> Result<()> {
        for import in &definitions.imports {
            if !self.models.contains_key(&import.namespace) {
                tracing::warn!(
                    namespace = import.namespace.as_str(),
                    model = definitions.name.as_str(),
                    "import not yet resolvable; references will stay unresolved"
                );
            }
        }

        let namespace = definitions.namespace.clone();
        let handle = ModelHandle::new(definitions)?;
        self.models.insert(namespace, Arc::new(handle));
        Ok(())
    }

    /// A loaded model by namespace
    pub fn get(&self, namespace: &str) -> Option<&Arc<ModelHandle>> {
        self.models.get(namespace)
    }

    /// A loaded model's type registry by namespace
    pub fn types(&self, namespace: &str) -> Option<&TypeRegistry> {
        self.models.get(namespace).map(|m| m.types())
    }

    /// Resolve an import declaration against the registry
    pub fn resolve_import(&self, import: &Import) -> Option<&Arc<ModelHandle>> {
        let resolved = self.models.get(&import.namespace);
        if resolved.is_none() {
            tracing::warn!(
                namespace = import.namespace.as_str(),
                location_uri = import.location_uri.as_deref().unwrap_or(""),
                "import unresolved"
            );
        }
        resolved
    }

    /// Namespaces currently loaded
    pub fn namespaces(&self) -> Vec<&str> {
        self.models.keys().map(|s| s.as_str()).collect()
    }
}
