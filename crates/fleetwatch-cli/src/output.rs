//! Report collection and rendering

use colored::*;
use fleetwatch_health::{CheckKind, ClassificationResult, ScopeReport};
use serde::Serialize;

use crate::error::CliResult;

/// Output format for the report
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human readable summary
    #[default]
    Table,
    /// JSON document
    Json,
}

/// The full report, one entry per evaluated scope.
#[derive(Debug, Serialize)]
pub struct Report {
    pub scopes: Vec<ScopeSummary>,
}

#[derive(Debug, Serialize)]
pub struct ScopeSummary {
    pub scope: String,
    pub checks: Vec<CheckSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Unknown,
}

#[derive(Debug, Serialize)]
pub struct CheckSummary {
    pub check: CheckKind,
    pub status: CheckStatus,
    pub units: Vec<UnitLine>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UnitLine {
    pub name: String,
    pub value: Option<f64>,
}

impl CheckSummary {
    /// Fold a drained result stream. Units are sorted by name.
    pub fn from_results(check: CheckKind, results: Vec<ClassificationResult>) -> Self {
        let mut units = Vec::new();
        let mut error = None;

        for result in results {
            match result {
                ClassificationResult::Unit { name, value } => units.push(UnitLine { name, value }),
                ClassificationResult::Failure(e) => error = Some(e.to_string()),
            }
        }
        units.sort_by(|a, b| a.name.cmp(&b.name));

        let status = if error.is_some() {
            CheckStatus::Unknown
        } else {
            CheckStatus::Ok
        };

        Self {
            check,
            status,
            units,
            error,
        }
    }
}

/// Read every stream to completion, grouping checks under their scope in
/// the order the streams were produced.
pub async fn collect(reports: Vec<ScopeReport>) -> Report {
    let mut scopes: Vec<ScopeSummary> = Vec::new();

    for report in reports {
        let scope = report.scope.clone();
        let check = report.check;
        let summary = CheckSummary::from_results(check, report.drain().await);

        match scopes.last_mut() {
            Some(last) if last.scope == scope => last.checks.push(summary),
            _ => scopes.push(ScopeSummary {
                scope,
                checks: vec![summary],
            }),
        }
    }

    Report { scopes }
}

/// Print the report in the requested format
pub fn print_report(report: &Report, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Table => print!("{}", render_human(report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}

fn format_value(check: CheckKind, value: Option<f64>) -> String {
    match (check, value) {
        (_, None) => "n/a".to_string(),
        (CheckKind::OfflineUnits, Some(hours)) => format!("{:.1}h", hours),
        (_, Some(seconds)) => format!("{:.0}s", seconds),
    }
}

pub fn render_human(report: &Report) -> String {
    let mut out = String::new();

    for scope in &report.scopes {
        out.push_str(&format!("{}\n", scope.scope.bold()));

        for check in &scope.checks {
            let label = check.check.label();
            match (&check.error, check.units.is_empty()) {
                (Some(e), _) => out.push_str(&format!(
                    "  {} {}: status unknown ({})\n",
                    "✗".red(),
                    label,
                    e
                )),
                (None, true) => {
                    out.push_str(&format!("  {} {}: none\n", "✓".green(), label))
                }
                (None, false) => {
                    out.push_str(&format!(
                        "  {} {}: {}\n",
                        "⚠".yellow(),
                        label,
                        check.units.len()
                    ));
                    for unit in &check.units {
                        out.push_str(&format!(
                            "    - {} ({})\n",
                            unit.name,
                            format_value(check.check, unit.value)
                        ));
                    }
                }
            }
        }
    }

    out
}
