//! Concurrent evaluation of several inventory scopes
//!
//! Every {scope x check} pair runs as its own task and owns one result
//! stream. A failing check sends a single [`ClassificationResult::Failure`]
//! on its own stream and closes it; sibling streams are unaffected.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::{ReconciliationEngine, UnitMap};
use crate::error::HealthResult;
use crate::result::{CheckKind, ClassificationResult};

/// One independently credentialed inventory scope.
pub struct Scope {
    /// Display name, e.g. "ASI"
    pub name: String,

    /// Engine bound to this scope's clients and sample cache
    pub engine: Arc<ReconciliationEngine>,

    /// Project names gating which tenants are in scope
    pub projects: Vec<String>,

    /// Checks to run for this scope
    pub checks: Vec<CheckKind>,
}

impl Scope {
    pub fn new(
        name: impl Into<String>,
        engine: Arc<ReconciliationEngine>,
        projects: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            engine,
            projects,
            checks: CheckKind::ALL.to_vec(),
        }
    }

    pub fn with_checks(mut self, checks: Vec<CheckKind>) -> Self {
        self.checks = checks;
        self
    }
}

/// The result stream of one check in one scope.
#[derive(Debug)]
pub struct ScopeReport {
    pub scope: String,
    pub check: CheckKind,
    pub results: mpsc::Receiver<ClassificationResult>,
}

impl ScopeReport {
    /// Read the stream to completion.
    pub async fn drain(mut self) -> Vec<ClassificationResult> {
        let mut results = Vec::new();
        while let Some(result) = self.results.recv().await {
            results.push(result);
        }
        results
    }
}

/// Runs the configured checks of every scope concurrently.
pub struct ScopeOrchestrator {
    scopes: Vec<Scope>,
}

impl ScopeOrchestrator {
    pub fn new(scopes: Vec<Scope>) -> Self {
        Self { scopes }
    }

    /// Spawn one task per {scope x check} and return their streams in
    /// scope order, then check order.
    ///
    /// Must be called from within a tokio runtime.
    pub fn run(&self) -> Vec<ScopeReport> {
        let mut reports = Vec::new();

        for scope in &self.scopes {
            info!(scope = %scope.name, checks = scope.checks.len(), "evaluating scope");

            for &check in &scope.checks {
                let (tx, rx) = mpsc::channel(1);
                tokio::spawn(evaluate(
                    scope.name.clone(),
                    Arc::clone(&scope.engine),
                    scope.projects.clone(),
                    check,
                    tx,
                ));

                reports.push(ScopeReport {
                    scope: scope.name.clone(),
                    check,
                    results: rx,
                });
            }
        }

        reports
    }
}

async fn evaluate(
    scope: String,
    engine: Arc<ReconciliationEngine>,
    projects: Vec<String>,
    check: CheckKind,
    tx: mpsc::Sender<ClassificationResult>,
) {
    match run_check(&engine, &projects, check).await {
        Ok(units) => {
            debug!(scope = %scope, check = %check, units = units.len(), "check complete");
            for (name, value) in units {
                if tx.send(ClassificationResult::unit(name, value)).await.is_err() {
                    debug!(scope = %scope, check = %check, "result stream dropped by consumer");
                    return;
                }
            }
        }
        Err(e) => {
            warn!(scope = %scope, check = %check, error = %e, "check failed");
            if tx.send(ClassificationResult::Failure(e)).await.is_err() {
                debug!(scope = %scope, check = %check, "result stream dropped by consumer");
            }
        }
    }
}

async fn run_check(
    engine: &ReconciliationEngine,
    projects: &[String],
    check: CheckKind,
) -> HealthResult<UnitMap> {
    let ids = engine.resolve_projects(projects).await?;
    engine.run(check, &ids).await
}
