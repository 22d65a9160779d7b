use async_trait::async_trait;
use serde::Serialize;

use super::{FailureKind, StageExecutor, StageFailure, StageOutcome};
use crate::model::StageContext;

/// Interfaz de alto nivel para definir etapas con salida tipada.
///
/// Los implementadores escriben `run_typed` con tipos concretos (leyendo el
/// contexto con `input_as` / `output_as`); el adaptador de abajo serializa la
/// salida a JSON para el contexto neutro del engine.
#[async_trait]
pub trait TypedStage: Send + Sync {
    type Output: Serialize + Send;

    /// Nombre estable de la etapa; es la clave de su salida en el contexto.
    fn name(&self) -> &'static str;

    async fn run_typed(&self, ctx: &StageContext) -> Result<Self::Output, StageFailure>;
}

// -------------------------------------------------------------
// Adaptador: cualquier `TypedStage` implementa `StageExecutor` neutro.
// -------------------------------------------------------------
#[async_trait]
impl<T> StageExecutor for T where T: TypedStage
{
    async fn execute(&self, ctx: &StageContext) -> StageOutcome {
        match self.run_typed(ctx).await {
            Ok(out) => match serde_json::to_value(&out) {
                Ok(value) => StageOutcome::Success(value),
                Err(e) => StageOutcome::failure(FailureKind::InvalidContext,
                                                format!("cannot encode output of `{}`: {e}", self.name())),
            },
            Err(failure) => StageOutcome::Failure(failure),
        }
    }
}
