//! Shared test doubles for integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use devflow_hooks::collaborators::{
    EvaluationReport, Evaluator, ProjectRegistry, ProjectSwitcher, RegistrySettings,
    RegistrySnapshot,
};
use devflow_hooks::error::{HookError, HookResult};
use devflow_hooks::hooks::{HookContext, HookHandler, Next};

/// Registry that serves a fixed snapshot and counts reads.
pub struct CountingRegistry {
    snapshot: RegistrySnapshot,
    loads: AtomicUsize,
}

impl CountingRegistry {
    pub fn new(projects: &[(&Path, &str)], auto_switch: Option<bool>) -> Self {
        Self {
            snapshot: RegistrySnapshot {
                settings: RegistrySettings {
                    auto_switch_on_directory_change: auto_switch,
                },
                projects: projects
                    .iter()
                    .map(|(path, id)| (path.to_string_lossy().to_string(), id.to_string()))
                    .collect::<BTreeMap<_, _>>(),
            },
            loads: AtomicUsize::new(0),
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProjectRegistry for CountingRegistry {
    async fn load(&self) -> HookResult<RegistrySnapshot> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.snapshot.clone())
    }
}

/// In-memory switcher that records every switch.
#[derive(Default)]
pub struct RecordingSwitcher {
    current: Mutex<Option<String>>,
    switches: Mutex<Vec<(String, PathBuf)>>,
}

impl RecordingSwitcher {
    pub fn with_current(project: &str) -> Self {
        Self {
            current: Mutex::new(Some(project.to_string())),
            switches: Mutex::new(Vec::new()),
        }
    }

    pub fn switches(&self) -> Vec<(String, PathBuf)> {
        self.switches.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProjectSwitcher for RecordingSwitcher {
    async fn current_project(&self) -> HookResult<Option<String>> {
        Ok(self.current.lock().unwrap().clone())
    }

    async fn switch_project(&self, project_id: &str, directory: &Path) -> HookResult<()> {
        *self.current.lock().unwrap() = Some(project_id.to_string());
        self.switches
            .lock()
            .unwrap()
            .push((project_id.to_string(), directory.to_path_buf()));
        Ok(())
    }
}

/// Evaluator that counts runs and succeeds or fails on demand.
#[derive(Default)]
pub struct CountingEvaluator {
    runs: AtomicUsize,
    fail: bool,
}

impl CountingEvaluator {
    pub fn failing() -> Self {
        Self {
            runs: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Evaluator for CountingEvaluator {
    async fn evaluate(&self, _file: &Path) -> HookResult<EvaluationReport> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(HookError::ExternalProcess {
                code: 1,
                stderr: "review failed".to_string(),
            });
        }
        Ok(EvaluationReport {
            exit_code: Some(0),
            stdout: "looks fine".to_string(),
            duration_ms: 1,
        })
    }
}

/// Shared, ordered log of handler events.
pub type Trace = Arc<Mutex<Vec<String>>>;

pub fn trace() -> Trace {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(trace: &Trace) -> Vec<String> {
    trace.lock().unwrap().clone()
}

/// Records `pre:<name>` and `post:<name>` around the rest of the chain.
pub struct Recorder {
    name: String,
    trace: Trace,
}

impl Recorder {
    pub fn handler(name: &str, trace: &Trace) -> Arc<dyn HookHandler> {
        Arc::new(Self {
            name: name.to_string(),
            trace: trace.clone(),
        })
    }
}

#[async_trait]
impl HookHandler for Recorder {
    async fn handle(&self, ctx: &mut HookContext, next: Next<'_>) -> HookResult<()> {
        self.trace.lock().unwrap().push(format!("pre:{}", self.name));
        next.run(ctx).await;
        self.trace.lock().unwrap().push(format!("post:{}", self.name));
        Ok(())
    }
}

/// Fails before invoking the continuation.
pub struct FailsBeforeNext;

#[async_trait]
impl HookHandler for FailsBeforeNext {
    async fn handle(&self, _ctx: &mut HookContext, _next: Next<'_>) -> HookResult<()> {
        Err(HookError::Handler("boom".to_string()))
    }
}

/// Panics before invoking the continuation.
pub struct PanicsBeforeNext;

#[async_trait]
impl HookHandler for PanicsBeforeNext {
    async fn handle(&self, _ctx: &mut HookContext, _next: Next<'_>) -> HookResult<()> {
        panic!("handler exploded");
    }
}

/// Invokes the continuation, then fails.
pub struct FailsAfterNext {
    pub trace: Trace,
}

#[async_trait]
impl HookHandler for FailsAfterNext {
    async fn handle(&self, ctx: &mut HookContext, next: Next<'_>) -> HookResult<()> {
        next.run(ctx).await;
        self.trace.lock().unwrap().push("after-next".to_string());
        Err(HookError::Handler("late failure".to_string()))
    }
}
