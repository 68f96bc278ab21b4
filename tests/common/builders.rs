//! Step builders and probes shared by the integration tests.

#![allow(dead_code)]

use dagflow_core::{StepContext, WorkflowStep};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Step that returns `value` immediately
pub fn constant_step(name: &str, value: Value) -> WorkflowStep {
    WorkflowStep::from_fn(name, move |_ctx: StepContext| {
        let value = value.clone();
        async move { Ok(value) }
    })
}

/// Step that sleeps for `delay` and returns `value`
pub fn sleeping_step(name: &str, delay: Duration, value: Value) -> WorkflowStep {
    WorkflowStep::from_fn(name, move |_ctx: StepContext| {
        let value = value.clone();
        async move {
            tokio::time::sleep(delay).await;
            Ok(value)
        }
    })
}

/// Step that always fails with `message`
pub fn failing_step(name: &str, message: &'static str) -> WorkflowStep {
    WorkflowStep::from_fn(name, move |_ctx: StepContext| async move {
        Err(anyhow::anyhow!(message))
    })
}

/// Step that returns the context it received
pub fn echo_context_step(name: &str) -> WorkflowStep {
    WorkflowStep::from_fn(name, |ctx: StepContext| async move {
        Ok::<_, anyhow::Error>(serde_json::to_value(ctx)?)
    })
}

/// Records when each step ran and how many ran at once
#[derive(Debug, Clone)]
pub struct ExecutionProbe {
    origin: Instant,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    events: Arc<Mutex<Vec<ProbeEvent>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeEvent {
    pub step: String,
    pub started: Duration,
    pub finished: Duration,
}

impl ExecutionProbe {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Step that sleeps for `delay` while counted as in flight, returning its own name
    pub fn step(&self, name: &str, delay: Duration) -> WorkflowStep {
        let probe = self.clone();
        let step_name = name.to_string();
        WorkflowStep::from_fn(name, move |_ctx: StepContext| {
            let probe = probe.clone();
            let step_name = step_name.clone();
            async move {
                let started = probe.enter();
                tokio::time::sleep(delay).await;
                probe.exit(&step_name, started);
                Ok(json!(step_name))
            }
        })
    }

    fn enter(&self) -> Duration {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.origin.elapsed()
    }

    fn exit(&self, step: &str, started: Duration) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.events.lock().unwrap().push(ProbeEvent {
            step: step.to_string(),
            started,
            finished: self.origin.elapsed(),
        });
    }

    /// Highest number of steps observed running at the same time
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn events(&self) -> Vec<ProbeEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn event(&self, step: &str) -> Option<ProbeEvent> {
        self.events().into_iter().find(|e| e.step == step)
    }

    /// Step names in the order they finished
    pub fn completion_order(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.step).collect()
    }
}

impl Default for ExecutionProbe {
    fn default() -> Self {
        Self::new()
    }
}
