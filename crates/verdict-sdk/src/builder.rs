//! Decision engine builder

use crate::config::EngineConfig;
use crate::engine::DecisionEngine;
use crate::error::Result;
use verdict_core::model::Definitions;

/// Builder assembling a `DecisionEngine` from models and configuration
#[derive(Default)]
pub struct DecisionEngineBuilder {
    models: Vec<Definitions>,
    config: EngineConfig,
}

impl DecisionEngineBuilder {
    pub fn new() -> Self {
        Self {
            models: Vec::new(),
            config: EngineConfig::new(),
        }
    }

    /// Add a decision model to register
    pub fn with_model(mut self, model: Definitions) -> Self {
        self.models.push(model);
        self
    }

    /// Set the engine configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the engine, loading every model
    pub fn build(self) -> Result<DecisionEngine> {
        let mut engine = DecisionEngine::with_config(self.config);
        for model in self.models {
            engine.add_model(model)?;
        }
        Ok(engine)
    }
}
