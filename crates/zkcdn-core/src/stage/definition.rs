use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use super::StageOutcome;
use crate::model::StageContext;

/// Unidad asíncrona de trabajo de un pipeline.
///
/// Recibe una vista de sólo lectura del contexto (input original + salidas
/// previas) y realiza exactamente una interacción externa. No debe mutar
/// estado compartido: todo lo que importa al pipeline viaja en el
/// `StageOutcome` devuelto. Las etapas acotan su propia latencia remota y
/// traducen un timeout a `StageOutcome::Failure`.
#[async_trait]
pub trait StageExecutor: Send + Sync {
    async fn execute(&self, ctx: &StageContext) -> StageOutcome;
}

/// Etapa con nombre dentro de una `WorkflowDefinition`.
#[derive(Clone)]
pub struct Stage {
    pub name: String,
    pub executor: Arc<dyn StageExecutor>,
}

impl Stage {
    pub fn new(name: impl Into<String>, executor: Arc<dyn StageExecutor>) -> Self {
        Self { name: name.into(),
               executor }
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Adaptador de closures a `StageExecutor`. El closure recibe una copia del
/// contexto para que el future resultante no tome prestado nada del engine.
pub struct FnStage<F> {
    f: F,
}

impl<F> FnStage<F> {
    pub fn new<Fut>(f: F) -> Self
        where F: Fn(StageContext) -> Fut + Send + Sync,
              Fut: Future<Output = StageOutcome> + Send
    {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> StageExecutor for FnStage<F>
    where F: Fn(StageContext) -> Fut + Send + Sync,
          Fut: Future<Output = StageOutcome> + Send
{
    async fn execute(&self, ctx: &StageContext) -> StageOutcome {
        (self.f)(ctx.clone()).await
    }
}
