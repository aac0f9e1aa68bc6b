//! Decision model definitions
//!
//! The in-memory model tree. The textual exchange format is handled by an
//! external binding layer; this crate only defines the already-parsed tree.

pub mod definitions;
pub mod import;
pub mod item_definition;

pub use definitions::{
    BusinessKnowledgeModel, Decision, DecisionLogic, Definitions, FunctionDefinition,
    InformationItem, InformationRequirement, InputData, KnowledgeRequirement,
};
pub use import::Import;
pub use item_definition::ItemDefinition;
