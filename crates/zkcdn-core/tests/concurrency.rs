use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::{oneshot, Notify};
use zkcdn_core::{EngineError, FailureKind, FnStage, RecordingReporter, RunStatus, StageContext, StageExecutor,
                 StageOutcome, WorkflowDefinition, WorkflowEngine};

/// Etapa que avisa al entrar y espera a que el test la libere.
struct GatedStage {
    entered: Arc<Notify>,
    release: Mutex<Option<oneshot::Receiver<Value>>>,
}

#[async_trait]
impl StageExecutor for GatedStage {
    async fn execute(&self, _ctx: &StageContext) -> StageOutcome {
        self.entered.notify_one();
        let rx = self.release.lock().unwrap().take();
        match rx {
            Some(rx) => match rx.await {
                Ok(value) => StageOutcome::Success(value),
                Err(_) => StageOutcome::failure(FailureKind::ProverUnavailable, "release dropped"),
            },
            None => StageOutcome::failure(FailureKind::ProverUnavailable, "executed twice"),
        }
    }
}

struct Fixture {
    definition: Arc<WorkflowDefinition>,
    entered: Arc<Notify>,
    release: oneshot::Sender<Value>,
    second_calls: Arc<AtomicUsize>,
}

fn gated_definition() -> Fixture {
    let entered = Arc::new(Notify::new());
    let (release, rx) = oneshot::channel();
    let second_calls = Arc::new(AtomicUsize::new(0));
    let counter = second_calls.clone();
    let second = FnStage::new(move |_ctx| {
        counter.fetch_add(1, Ordering::SeqCst);
        async { StageOutcome::Success(json!("second")) }
    });
    let definition = WorkflowDefinition::builder("gated").stage("gated",
                                                               Arc::new(GatedStage { entered: entered.clone(),
                                                                                     release: Mutex::new(Some(rx)) }))
                                                         .stage("second", Arc::new(second))
                                                         .build()
                                                         .expect("definition");
    Fixture { definition: Arc::new(definition),
              entered,
              release,
              second_calls }
}

#[tokio::test]
async fn cancel_during_stage_discards_output_and_skips_the_rest() {
    let fx = gated_definition();
    let reporter = Arc::new(RecordingReporter::default());
    let engine = WorkflowEngine::new(reporter.clone());
    let handle = engine.start(fx.definition.clone(), json!({})).expect("start");

    let entered = fx.entered.clone();
    let release = fx.release;
    let controller = async {
        entered.notified().await;
        assert_eq!(engine.cancel(&handle), Ok(true));
        // La etapa sigue en vuelo: el run todavía no es terminal.
        assert_eq!(handle.status(), RunStatus::Running);
        assert!(handle.snapshot().cancel_requested());
        release.send(json!("late")).expect("stage waiting");
    };
    let (run, ()) = tokio::join!(engine.drive(&handle), controller);
    let run = run.expect("drive");

    assert_eq!(run.status, RunStatus::Cancelled);
    assert_eq!(run.current_index, 0);
    assert_eq!(run.context.output("gated"), None);
    assert_eq!(fx.second_calls.load(Ordering::SeqCst), 0);
    assert_eq!(reporter.variants(run.id), vec!["I", "S", "K"]);
    assert!(!engine.is_busy());
}

#[tokio::test]
async fn second_start_is_rejected_while_a_run_is_active() {
    let fx = gated_definition();
    let engine = WorkflowEngine::new(Arc::new(RecordingReporter::default()));
    let first = engine.start(fx.definition.clone(), json!({})).expect("first start");

    let entered = fx.entered.clone();
    let release = fx.release;
    let other = fx.definition.clone();
    let controller = async {
        entered.notified().await;
        let err = engine.start(other.clone(), json!({})).unwrap_err();
        assert_eq!(err, EngineError::AlreadyRunning { active: first.id() });
        assert_eq!(first.status(), RunStatus::Running);
        assert_eq!(engine.drive(&first).await.unwrap_err(), EngineError::StageInFlight);
        release.send(json!("done")).expect("stage waiting");
    };
    let (run, ()) = tokio::join!(engine.drive(&first), controller);

    let run = run.expect("drive");
    assert_eq!(run.status, RunStatus::Succeeded);
    assert_eq!(fx.second_calls.load(Ordering::SeqCst), 1);
    assert_eq!(run.context.output("gated"), Some(&json!("done")));

    // Terminado el primer run, el engine acepta otro.
    let again = engine.start(fx.definition, json!({})).expect("engine released");
    assert_eq!(engine.cancel(&again), Ok(true));
}

#[tokio::test]
async fn dropping_drive_mid_stage_cancels_the_run_and_frees_the_engine() {
    let stalled = FnStage::new(|_ctx| std::future::pending::<StageOutcome>());
    let definition = Arc::new(WorkflowDefinition::builder("stalled").stage("stalled", Arc::new(stalled))
                                                                     .build()
                                                                     .expect("definition"));
    let reporter = Arc::new(RecordingReporter::default());
    let engine = WorkflowEngine::new(reporter.clone());
    let handle = engine.start(definition.clone(), json!({})).expect("start");

    let timed_out = tokio::time::timeout(Duration::from_millis(50), engine.drive(&handle)).await;
    assert!(timed_out.is_err());

    assert_eq!(handle.status(), RunStatus::Cancelled);
    assert!(!engine.is_busy());
    assert_eq!(engine.cancel(&handle), Ok(false));
    let run = engine.drive(&handle).await.expect("drive after drop");
    assert_eq!(run.status, RunStatus::Cancelled);
    assert_eq!(run.current_index, 0);
    assert_eq!(reporter.variants(handle.id()), vec!["I", "S", "K"]);

    let next = engine.start(definition, json!({})).expect("engine released");
    assert_eq!(engine.cancel(&next), Ok(true));
}
