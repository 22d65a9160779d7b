use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use zkcdn_core::{FailureKind, RecordingReporter, RunStatus, StageContext, StageExecutor, StageOutcome,
                 WorkflowDefinition, WorkflowEngine};

/// Etapa espía: anota inicio y fin en un log compartido y cede el control
/// entre ambos para que un solapamiento fuera observable.
struct SpyStage {
    name: &'static str,
    log: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

#[async_trait]
impl StageExecutor for SpyStage {
    async fn execute(&self, ctx: &StageContext) -> StageOutcome {
        self.log.lock().unwrap().push(format!("begin {} (seen {})", self.name, ctx.len()));
        tokio::task::yield_now().await;
        self.log.lock().unwrap().push(format!("end {}", self.name));
        if self.fail {
            StageOutcome::failure(FailureKind::LedgerRejected, "nonce too low")
        } else {
            StageOutcome::Success(json!(self.name))
        }
    }
}

fn spy_definition(log: &Arc<Mutex<Vec<String>>>, failing: Option<&str>) -> Arc<WorkflowDefinition> {
    let mut builder = WorkflowDefinition::builder("spy");
    for name in ["s0", "s1", "s2", "s3"] {
        builder = builder.stage(name,
                                Arc::new(SpyStage { name,
                                                    log: log.clone(),
                                                    fail: failing == Some(name) }));
    }
    Arc::new(builder.build().expect("definition"))
}

#[tokio::test]
async fn stages_run_strictly_in_order_and_see_previous_outputs() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let reporter = Arc::new(RecordingReporter::default());
    let engine = WorkflowEngine::new(reporter.clone());

    let run = engine.run(spy_definition(&log, None), Value::Null).await.expect("run");

    assert_eq!(run.status, RunStatus::Succeeded);
    assert_eq!(run.current_index, 4);
    assert_eq!(*log.lock().unwrap(),
               vec!["begin s0 (seen 0)", "end s0", "begin s1 (seen 1)", "end s1", "begin s2 (seen 2)", "end s2",
                    "begin s3 (seen 3)", "end s3"]);
    assert_eq!(run.context.stage_names(), vec!["s0", "s1", "s2", "s3"]);
    assert_eq!(reporter.variants(run.id), vec!["I", "S", "F", "S", "F", "S", "F", "S", "F", "C"]);
}

#[tokio::test]
async fn first_failure_halts_the_run() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let reporter = Arc::new(RecordingReporter::default());
    let engine = WorkflowEngine::new(reporter.clone());

    let run = engine.run(spy_definition(&log, Some("s1")), Value::Null).await.expect("run");

    assert_eq!(run.status, RunStatus::Failed);
    assert_eq!(run.current_index, 1);
    let err = run.last_error.clone().expect("last error");
    assert_eq!(err.stage_index, 1);
    assert_eq!(err.kind, FailureKind::LedgerRejected);
    assert!(log.lock().unwrap().iter().all(|l| !l.contains("s2") && !l.contains("s3")));
    assert_eq!(run.context.output("s1"), None);
    assert_eq!(reporter.variants(run.id), vec!["I", "S", "F", "S", "X"]);
}

#[tokio::test]
async fn event_sequence_numbers_are_monotonic() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let reporter = Arc::new(RecordingReporter::default());
    let engine = WorkflowEngine::new(reporter.clone());

    let run = engine.run(spy_definition(&log, None), Value::Null).await.expect("run");

    let seqs: Vec<u64> = reporter.events(run.id).iter().map(|e| e.seq).collect();
    assert!(seqs.windows(2).all(|w| w[0] < w[1]));
}
