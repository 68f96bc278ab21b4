//! End-to-end behaviour of `DagOrchestrator`: ordering, context propagation,
//! failure containment, and construction-time validation.

mod common;

use common::*;
use dagflow_core::{
    ConfigurationError, DagOrchestrator, OrchestrationError, StepContext, StepStatus,
    WorkflowStep,
};
use serde_json::{json, Value};
use std::time::Duration;

fn context_with(pairs: &[(&str, Value)]) -> StepContext {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[tokio::test]
async fn test_fan_in_waits_for_slowest_dependency() {
    let probe = ExecutionProbe::new();
    let c_context = std::sync::Arc::new(std::sync::Mutex::new(None));
    let captured = c_context.clone();

    let orchestrator = DagOrchestrator::new(vec![
        probe.step("a", Duration::from_millis(100)),
        probe.step("b", Duration::from_millis(50)),
        WorkflowStep::from_fn("c", move |ctx: StepContext| {
            let captured = captured.clone();
            async move {
                *captured.lock().unwrap() = Some(ctx);
                Ok(json!("c"))
            }
        })
        .depends_on(["a", "b"]),
    ])
    .unwrap();

    let outcomes = orchestrator.execute(StepContext::new()).await.unwrap();

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes.values().all(|o| o.status == StepStatus::Completed));

    // a and b overlapped
    let a = probe.event("a").unwrap();
    let b = probe.event("b").unwrap();
    assert!(b.started < a.finished);

    // c started only after both finished
    assert!(outcomes["c"].started_at >= outcomes["a"].finished_at);
    assert!(outcomes["c"].started_at >= outcomes["b"].finished_at);

    let ctx = c_context.lock().unwrap().clone().unwrap();
    assert_eq!(ctx.get("a_result"), Some(&json!("a")));
    assert_eq!(ctx.get("b_result"), Some(&json!("b")));
}

#[tokio::test]
async fn test_independent_steps_run_concurrently() {
    let probe = ExecutionProbe::new();
    let orchestrator = DagOrchestrator::new(vec![
        probe.step("s1", Duration::from_millis(100)),
        probe.step("s2", Duration::from_millis(100)),
        probe.step("s3", Duration::from_millis(100)),
    ])
    .unwrap();

    let start = std::time::Instant::now();
    let outcomes = orchestrator.execute(StepContext::new()).await.unwrap();

    assert_eq!(outcomes.len(), 3);
    assert_eq!(probe.peak_concurrency(), 3);
    assert!(start.elapsed() < Duration::from_millis(280));
}

#[tokio::test]
async fn test_caller_context_reaches_every_step_and_is_not_mutated() {
    let orchestrator = DagOrchestrator::new(vec![
        echo_context_step("root"),
        echo_context_step("leaf").depends_on(["root"]),
    ])
    .unwrap();

    let context = context_with(&[("provider_id", json!("aws"))]);
    let outcomes = orchestrator.execute(context.clone()).await.unwrap();

    assert_eq!(
        outcomes["root"].result,
        Some(json!({"provider_id": "aws"}))
    );
    assert_eq!(
        outcomes["leaf"].result,
        Some(json!({
            "provider_id": "aws",
            "root_result": {"provider_id": "aws"}
        }))
    );
    assert_eq!(context.len(), 1);
}

#[tokio::test]
async fn test_only_direct_dependencies_are_exposed() {
    let orchestrator = DagOrchestrator::new(vec![
        constant_step("a", json!(1)),
        constant_step("b", json!(2)).depends_on(["a"]),
        echo_context_step("c").depends_on(["b"]),
    ])
    .unwrap();

    let outcomes = orchestrator.execute(StepContext::new()).await.unwrap();

    assert_eq!(outcomes["c"].result, Some(json!({"b_result": 2})));
}

#[tokio::test]
async fn test_step_timeout_fails_only_that_step() {
    let orchestrator = DagOrchestrator::new(vec![
        sleeping_step("slow", Duration::from_secs(1), json!("late"))
            .with_timeout(Duration::from_millis(100)),
        sleeping_step("quick", Duration::from_millis(10), json!("fast")),
    ])
    .unwrap();

    let start = std::time::Instant::now();
    let outcomes = orchestrator.execute(StepContext::new()).await.unwrap();
    let elapsed = start.elapsed();

    let slow = &outcomes["slow"];
    assert_eq!(slow.status, StepStatus::Failed);
    assert_eq!(slow.error.as_deref(), Some("Step timed out after 0.1s"));
    assert!(slow.result.is_none());
    assert!(slow.duration >= Duration::from_millis(100));
    assert!(elapsed < Duration::from_millis(900));

    assert_eq!(outcomes["quick"].status, StepStatus::Completed);
    assert_eq!(outcomes["quick"].result, Some(json!("fast")));
}

#[tokio::test]
async fn test_execution_error_is_recorded_verbatim() {
    let orchestrator = DagOrchestrator::new(vec![
        failing_step("bad", "boom"),
        constant_step("good", json!("ok")),
    ])
    .unwrap();

    let outcomes = orchestrator.execute(StepContext::new()).await.unwrap();

    assert_eq!(outcomes["bad"].status, StepStatus::Failed);
    assert_eq!(outcomes["bad"].error.as_deref(), Some("boom"));
    assert_eq!(outcomes["bad"].error_code.as_deref(), Some("EXECUTION_ERROR"));
    assert_eq!(outcomes["good"].status, StepStatus::Completed);
}

#[tokio::test]
async fn test_failed_dependency_still_dispatches_dependent_with_null_result() {
    let orchestrator = DagOrchestrator::new(vec![
        failing_step("a", "boom"),
        echo_context_step("b").depends_on(["a"]),
    ])
    .unwrap();

    let outcomes = orchestrator.execute(StepContext::new()).await.unwrap();

    assert_eq!(outcomes["a"].status, StepStatus::Failed);
    assert_eq!(outcomes["b"].status, StepStatus::Completed);
    assert_eq!(outcomes["b"].result, Some(json!({"a_result": null})));
}

#[tokio::test]
async fn test_panicking_step_is_contained() {
    let orchestrator = DagOrchestrator::new(vec![
        WorkflowStep::from_fn("panics", |_ctx: StepContext| async {
            if true {
                panic!("kaboom");
            }
            Ok(json!(null))
        }),
        constant_step("sibling", json!("fine")),
        echo_context_step("after").depends_on(["panics"]),
    ])
    .unwrap();

    let outcomes = orchestrator.execute(StepContext::new()).await.unwrap();

    assert_eq!(outcomes["panics"].status, StepStatus::Failed);
    assert_eq!(
        outcomes["panics"].error_code.as_deref(),
        Some("EXECUTION_PANICKED")
    );
    assert_eq!(outcomes["sibling"].status, StepStatus::Completed);
    assert_eq!(outcomes["after"].result, Some(json!({"panics_result": null})));
}

#[tokio::test]
async fn test_every_step_has_exactly_one_outcome() {
    let orchestrator = DagOrchestrator::new(vec![
        constant_step("a", json!(1)),
        failing_step("b", "nope").depends_on(["a"]),
        constant_step("c", json!(3)).depends_on(["a", "b"]),
        constant_step("d", json!(4)),
    ])
    .unwrap();

    let report = orchestrator
        .execute_with_report(StepContext::new())
        .await
        .unwrap();

    let names: Vec<_> = report.outcomes.keys().cloned().collect();
    assert_eq!(names, vec!["a", "b", "c", "d"]);
    assert_eq!(report.failed_steps(), vec!["b"]);
    assert_eq!(report.completed_steps(), vec!["a", "c", "d"]);
    assert!(!report.is_success());
    assert_eq!(report.waves, vec![vec!["a", "d"], vec!["b"], vec!["c"]]);
    for outcome in report.outcomes.values() {
        assert!(outcome.status.is_terminal());
        assert!(outcome.finished_at >= outcome.started_at);
    }
}

#[tokio::test]
async fn test_empty_workflow_returns_empty_map() {
    let orchestrator = DagOrchestrator::new(vec![]).unwrap();
    let outcomes = orchestrator.execute(StepContext::new()).await.unwrap();
    assert!(outcomes.is_empty());
}

#[test]
fn test_cycle_rejected_at_construction() {
    let err = DagOrchestrator::new(vec![
        constant_step("a", json!(1)).depends_on(["b"]),
        constant_step("b", json!(2)).depends_on(["a"]),
    ])
    .unwrap_err();

    assert!(matches!(err, ConfigurationError::CircularDependency { .. }));
    assert!(err.to_string().starts_with("Circular dependency detected"));
}

#[test]
fn test_self_dependency_rejected() {
    let err = DagOrchestrator::new(vec![constant_step("a", json!(1)).depends_on(["a"])])
        .unwrap_err();

    assert!(matches!(err, ConfigurationError::CircularDependency { .. }));
}

#[test]
fn test_unknown_dependency_rejected() {
    let err = DagOrchestrator::new(vec![constant_step("a", json!(1)).depends_on(["ghost"])])
        .unwrap_err();

    assert_eq!(
        err,
        ConfigurationError::UnknownDependency {
            step_name: "a".to_string(),
            dependency: "ghost".to_string(),
        }
    );
}

#[test]
fn test_duplicate_names_rejected() {
    let err = DagOrchestrator::new(vec![
        constant_step("a", json!(1)),
        constant_step("a", json!(2)),
    ])
    .unwrap_err();

    assert_eq!(
        err,
        ConfigurationError::DuplicateStep {
            step_name: "a".to_string()
        }
    );
}

#[test]
fn test_construction_errors_convert_to_orchestration_errors() {
    let err: OrchestrationError = DagOrchestrator::new(vec![constant_step("", json!(1))])
        .unwrap_err()
        .into();

    assert_eq!(
        err,
        OrchestrationError::Configuration(ConfigurationError::EmptyStepName)
    );
}

#[test]
fn test_deep_linear_chain_constructs() {
    let depth = 50_000;
    let steps: Vec<WorkflowStep> = (0..depth)
        .rev()
        .map(|i| {
            let step = constant_step(&format!("step_{i}"), json!(i));
            if i == 0 {
                step
            } else {
                step.depends_on([format!("step_{}", i - 1)])
            }
        })
        .collect();

    let orchestrator = DagOrchestrator::new(steps).unwrap();

    assert_eq!(orchestrator.step_names().len(), depth);
}
