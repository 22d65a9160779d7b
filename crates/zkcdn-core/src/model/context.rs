//! Contexto acumulado que cada etapa recibe en sólo lectura.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errores al leer el contexto con tipos concretos.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("no output recorded for stage `{0}`")]
    MissingOutput(String),
    #[error("cannot decode output of stage `{stage}`: {reason}")]
    Decode { stage: String, reason: String },
    #[error("cannot decode pipeline input: {0}")]
    Input(String),
}

/// Input original del pipeline más las salidas de las etapas previas, en
/// orden de ejecución y indexadas por nombre de etapa.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageContext {
    pub input: Value,
    pub outputs: IndexMap<String, Value>,
}

impl StageContext {
    pub fn new(input: Value) -> Self {
        Self { input,
               outputs: IndexMap::new() }
    }

    pub fn output(&self, stage: &str) -> Option<&Value> {
        self.outputs.get(stage)
    }

    /// Decodifica la salida de `stage` a un tipo concreto.
    pub fn output_as<T: DeserializeOwned>(&self, stage: &str) -> Result<T, ContextError> {
        let raw = self.outputs
                      .get(stage)
                      .ok_or_else(|| ContextError::MissingOutput(stage.to_string()))?;
        serde_json::from_value(raw.clone()).map_err(|e| ContextError::Decode { stage: stage.to_string(),
                                                                               reason: e.to_string() })
    }

    /// Decodifica el input original del pipeline.
    pub fn input_as<T: DeserializeOwned>(&self) -> Result<T, ContextError> {
        serde_json::from_value(self.input.clone()).map_err(|e| ContextError::Input(e.to_string()))
    }

    pub(crate) fn record(&mut self, stage: &str, output: Value) {
        self.outputs.insert(stage.to_string(), output);
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Etapas con salida registrada, en orden de ejecución.
    pub fn stage_names(&self) -> Vec<&str> {
        self.outputs.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn output_as_reports_missing_stage() {
        let ctx = StageContext::new(json!(null));
        let err = ctx.output_as::<String>("storeContent").unwrap_err();
        assert_eq!(err, ContextError::MissingOutput("storeContent".into()));
    }

    #[test]
    fn outputs_keep_insertion_order() {
        let mut ctx = StageContext::new(json!({}));
        ctx.record("b", json!(1));
        ctx.record("a", json!(2));
        let names: Vec<&str> = ctx.outputs.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn input_as_decodes_original_input() {
        let ctx = StageContext::new(json!({"fingerprint": 177670}));
        #[derive(serde::Deserialize)]
        struct In {
            fingerprint: u32,
        }
        assert_eq!(ctx.input_as::<In>().unwrap().fingerprint, 177_670);
    }
}
