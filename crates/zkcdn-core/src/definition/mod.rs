//! Definición inmutable de un workflow: secuencia ordenada, no vacía y con
//! nombres únicos de etapas.
//!
//! El `definition_hash` identifica la revisión del pipeline (nombre + orden de
//! etapas + versión del engine) y viaja en el evento `RunStarted`.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;

use crate::constants::ENGINE_VERSION;
use crate::errors::EngineError;
use crate::hashing::hash_value;
use crate::stage::{Stage, StageExecutor, TypedStage};

#[derive(Debug, Clone)]
pub struct WorkflowDefinition {
    pub name: String,
    pub stages: Vec<Stage>,
    pub definition_hash: String,
}

impl WorkflowDefinition {
    /// Valida y construye la definición.
    pub fn new(name: impl Into<String>, stages: Vec<Stage>) -> Result<Self, EngineError> {
        if stages.is_empty() {
            return Err(EngineError::EmptyDefinition);
        }
        let mut seen = HashSet::with_capacity(stages.len());
        for s in &stages {
            if !seen.insert(s.name.as_str()) {
                return Err(EngineError::DuplicateStageName(s.name.clone()));
            }
        }
        let name = name.into();
        let ids: Vec<&str> = stages.iter().map(|s| s.name.as_str()).collect();
        let definition_hash = build_definition_hash(&name, &ids);
        Ok(Self { name,
                  stages,
                  definition_hash })
    }

    pub fn builder(name: impl Into<String>) -> DefinitionBuilder {
        DefinitionBuilder { name: name.into(),
                            stages: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn position(&self, stage: &str) -> Option<usize> {
        self.stages.iter().position(|s| s.name == stage)
    }
}

pub fn build_definition_hash(name: &str, stage_names: &[&str]) -> String {
    hash_value(&json!({
        "engine_version": ENGINE_VERSION,
        "pipeline": name,
        "stages": stage_names,
    }))
}

/// Builder que acumula etapas en orden. La validación ocurre en `build`.
pub struct DefinitionBuilder {
    name: String,
    stages: Vec<Stage>,
}

impl DefinitionBuilder {
    /// Añade una etapa tipada; su nombre sale de `TypedStage::name`.
    pub fn then<S>(mut self, stage: S) -> Self
        where S: TypedStage + 'static
    {
        let name = stage.name();
        self.stages.push(Stage::new(name, Arc::new(stage)));
        self
    }

    /// Añade un ejecutor neutro con nombre explícito.
    pub fn stage(mut self, name: impl Into<String>, executor: Arc<dyn StageExecutor>) -> Self {
        self.stages.push(Stage::new(name, executor));
        self
    }

    pub fn build(self) -> Result<WorkflowDefinition, EngineError> {
        WorkflowDefinition::new(self.name, self.stages)
    }
}
