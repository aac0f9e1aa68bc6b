//! Root decision model and its node definitions

use super::import::Import;
use super::item_definition::ItemDefinition;
use serde::{Deserialize, Serialize};

/// Root of a decision model.
///
/// Owns the ordered collections of type definitions, inputs, decisions,
/// reusable knowledge and imports. Immutable after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definitions {
    /// Model name
    pub name: String,

    /// Globally meaningful namespace identifier for cross-model references
    pub namespace: String,

    /// Reusable type definitions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub item_definitions: Vec<ItemDefinition>,

    /// Externally supplied input nodes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input_data: Vec<InputData>,

    /// Decision nodes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decisions: Vec<Decision>,

    /// Reusable invocable knowledge
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub business_knowledge_models: Vec<BusinessKnowledgeModel>,

    /// Cross-namespace imports
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<Import>,
}

/// A named, optionally typed variable attached to a model node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InformationItem {
    pub name: String,

    /// Qualified type reference, resolved by the type system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_ref: Option<String>,
}

/// An externally supplied input node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputData {
    pub name: String,
    pub variable: InformationItem,
}

/// A decision node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub name: String,

    /// The decision's result variable
    pub variable: InformationItem,

    /// The logic producing this decision's value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision_logic: Option<DecisionLogic>,

    /// Dependencies on inputs and other decisions, by name
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub information_requirements: Vec<InformationRequirement>,

    /// Dependencies on business knowledge models, by name
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub knowledge_requirements: Vec<KnowledgeRequirement>,
}

/// The logic attached to a decision.
///
/// Literal expressions are evaluated by the expression evaluator; other
/// boxed-expression kinds plug in through the same evaluator contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecisionLogic {
    /// A single expression-language source fragment
    LiteralExpression { text: String },
}

/// A dependency of a decision on another model node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InformationRequirement {
    /// Requires an input data node's externally supplied value
    RequiredInput { name: String },
    /// Requires another decision's computed value
    RequiredDecision { name: String },
}

/// A dependency of a decision or knowledge model on invocable knowledge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeRequirement {
    pub required_knowledge: String,
}

/// Reusable, invocable business knowledge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessKnowledgeModel {
    pub name: String,
    pub variable: InformationItem,

    /// The function this knowledge model encapsulates
    pub encapsulated_logic: FunctionDefinition,

    /// Other knowledge models this one invokes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub knowledge_requirements: Vec<KnowledgeRequirement>,
}

/// A function definition: named parameters and an expression body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub parameters: Vec<InformationItem>,
    pub body: String,
}

impl Definitions {
    /// Create an empty model with the given name and namespace
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            item_definitions: Vec::new(),
            input_data: Vec::new(),
            decisions: Vec::new(),
            business_knowledge_models: Vec::new(),
            imports: Vec::new(),
        }
    }

    /// Add an item definition
    pub fn with_item_definition(mut self, def: ItemDefinition) -> Self {
        self.item_definitions.push(def);
        self
    }

    /// Add an input data node
    pub fn with_input_data(mut self, input: InputData) -> Self {
        self.input_data.push(input);
        self
    }

    /// Add a decision node
    pub fn with_decision(mut self, decision: Decision) -> Self {
        self.decisions.push(decision);
        self
    }

    /// Add a business knowledge model
    pub fn with_knowledge_model(mut self, bkm: BusinessKnowledgeModel) -> Self {
        self.business_knowledge_models.push(bkm);
        self
    }

    /// Add an import
    pub fn with_import(mut self, import: Import) -> Self {
        self.imports.push(import);
        self
    }

    /// Find a decision by name
    pub fn decision(&self, name: &str) -> Option<&Decision> {
        self.decisions.iter().find(|d| d.name == name)
    }

    /// Find an input data node by name
    pub fn input(&self, name: &str) -> Option<&InputData> {
        self.input_data.iter().find(|i| i.name == name)
    }

    /// Find a business knowledge model by name
    pub fn knowledge_model(&self, name: &str) -> Option<&BusinessKnowledgeModel> {
        self.business_knowledge_models.iter().find(|b| b.name == name)
    }

    /// Find an item definition by name
    pub fn item_definition(&self, name: &str) -> Option<&ItemDefinition> {
        self.item_definitions.iter().find(|d| d.name == name)
    }

    /// Find an import by namespace
    pub fn import(&self, namespace: &str) -> Option<&Import> {
        self.imports.iter().find(|i| i.namespace == namespace)
    }
}

impl InformationItem {
    /// Create an untyped information item
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_ref: None,
        }
    }

    /// Set the type reference
    pub fn with_type_ref(mut self, type_ref: impl Into<String>) -> Self {
        self.type_ref = Some(type_ref.into());
        self
    }
}

impl InputData {
    /// Create an input data node whose variable shares the node name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            variable: InformationItem::new(name.clone()),
            name,
        }
    }

    /// Set the variable's type reference
    pub fn with_type_ref(mut self, type_ref: impl Into<String>) -> Self {
        self.variable.type_ref = Some(type_ref.into());
        self
    }
}

impl Decision {
    /// Create a decision with a literal-expression body
    pub fn literal(name: impl Into<String>, text: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            variable: InformationItem::new(name.clone()),
            name,
            decision_logic: Some(DecisionLogic::LiteralExpression { text: text.into() }),
            information_requirements: Vec::new(),
            knowledge_requirements: Vec::new(),
        }
    }

    /// Require an input data node's value
    pub fn requires_input(mut self, name: impl Into<String>) -> Self {
        self.information_requirements
            .push(InformationRequirement::RequiredInput { name: name.into() });
        self
    }

    /// Require another decision's value
    pub fn requires_decision(mut self, name: impl Into<String>) -> Self {
        self.information_requirements
            .push(InformationRequirement::RequiredDecision { name: name.into() });
        self
    }

    /// Require a business knowledge model
    pub fn requires_knowledge(mut self, name: impl Into<String>) -> Self {
        self.knowledge_requirements.push(KnowledgeRequirement {
            required_knowledge: name.into(),
        });
        self
    }

    /// Set the result variable's type reference
    pub fn with_type_ref(mut self, type_ref: impl Into<String>) -> Self {
        self.variable.type_ref = Some(type_ref.into());
        self
    }
}

impl BusinessKnowledgeModel {
    /// Create a knowledge model from parameter names and a body expression
    pub fn function(
        name: impl Into<String>,
        parameters: Vec<&str>,
        body: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            variable: InformationItem::new(name.clone()),
            name,
            encapsulated_logic: FunctionDefinition {
                parameters: parameters.into_iter().map(InformationItem::new).collect(),
                body: body.into(),
            },
            knowledge_requirements: Vec::new(),
        }
    }

    /// Require another knowledge model
    pub fn requires_knowledge(mut self, name: impl Into<String>) -> Self {
        self.knowledge_requirements.push(KnowledgeRequirement {
            required_knowledge: name.into(),
        });
        self
    }
}
