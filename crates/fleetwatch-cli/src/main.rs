//! Fleetwatch CLI - report unhealthy units across inventory scopes
//!
//! Each configured scope is evaluated once:
//! - offline appliances and how long they have been down
//! - online appliances whose replication lag exceeds the threshold
//! - database hosts whose replication lag exceeds the threshold
//!
//! Failed checks are reported as "status unknown" and do not change the
//! exit code. Only configuration or startup problems do.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use fleetwatch_clients::{build_http_client, HttpInventoryClient, HttpMetricsClient, MetricsClient};
use fleetwatch_health::{ReconciliationEngine, SampleFetcher, Scope, ScopeOrchestrator};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod output;

use config::{Config, ScopeConfig};
use error::CliResult;

/// Fleetwatch CLI application
#[derive(Parser)]
#[command(name = "fleetwatch")]
#[command(about = "Fleetwatch - which appliances are unhealthy right now", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "FLEETWATCH_CONFIG")]
    config: Option<String>,

    /// Only evaluate this scope (repeatable)
    #[arg(short, long = "scope", value_name = "NAME")]
    scopes: Vec<String>,

    /// Output format (table, json)
    #[arg(short, long, value_enum, default_value = "table")]
    output: output::OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn init_tracing(verbose: bool, json: bool) {
    let filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| {
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr)
        }))
        .init();
}

fn build_scope(
    scope: &ScopeConfig,
    http: &reqwest::Client,
    metrics: &Arc<dyn MetricsClient>,
) -> Scope {
    let inventory = HttpInventoryClient::new(
        http.clone(),
        &scope.instance_url,
        &scope.space,
        scope.api_key.clone(),
    );
    let samples = SampleFetcher::new(Arc::clone(metrics));
    let engine = ReconciliationEngine::new(Arc::new(inventory), Arc::new(samples));

    Scope::new(scope.name.clone(), Arc::new(engine), scope.projects.clone())
        .with_checks(scope.checks())
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let config = Config::load(cli.config.as_deref())?;
    config.validate()?;
    let selected = config.select_scopes(&cli.scopes)?;

    let http = build_http_client(Duration::from_secs(config.http.timeout_seconds))?;
    let metrics: Arc<dyn MetricsClient> = Arc::new(HttpMetricsClient::new(
        http.clone(),
        &config.metrics.base_url,
        config.metrics.username.clone(),
        config.metrics.password.clone(),
    ));

    let scopes: Vec<Scope> = selected
        .into_iter()
        .map(|scope| build_scope(scope, &http, &metrics))
        .collect();
    info!(scopes = scopes.len(), "starting evaluation");

    let reports = ScopeOrchestrator::new(scopes).run();
    let report = output::collect(reports).await;
    output::print_report(&report, cli.output)
}
