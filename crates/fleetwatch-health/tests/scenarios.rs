//! End-to-end checks over in-memory inventory and metrics data.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use fleetwatch_clients::fake::{StaticInventory, StaticMetrics};
use fleetwatch_health::{
    CheckKind, ClassificationResult, ReconciliationEngine, SampleFetcher, Scope, ScopeOrchestrator,
};
use fleetwatch_types::{
    roles, CorrelationKey, Event, EventId, Machine, MachineStatus, ProjectId, Tenant,
};
use proptest::prelude::*;

fn engine_with(inventory: StaticInventory, metrics: StaticMetrics) -> ReconciliationEngine {
    ReconciliationEngine::new(
        Arc::new(inventory),
        Arc::new(SampleFetcher::new(Arc::new(metrics))),
    )
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn online_appliance(id: &str, tenant: &str) -> Machine {
    Machine::new(id, id, MachineStatus::Online)
        .with_role(roles::APPLIANCE)
        .with_tenant(tenant)
}

#[tokio::test]
async fn offline_appliance_reports_hours_since_critical_event() {
    let machine = Machine::new("Machines-1", "nuc-t1", MachineStatus::Offline)
        .with_role(roles::APPLIANCE)
        .with_tenant("t1");
    let inventory = StaticInventory::new()
        .with_machine(machine.clone())
        .with_tenant(Tenant::new("t1", "Tenant One").with_project("p1"))
        .with_event(
            &machine.id,
            Event {
                id: EventId::new("Events-1"),
                category: "MachineUnavailable".to_string(),
                occurred: Utc::now() - chrono::Duration::hours(2),
            },
        );

    let units = engine_with(inventory, StaticMetrics::new())
        .check_offline_units(&[ProjectId::new("p1")])
        .await
        .unwrap();

    assert_eq!(units.len(), 1);
    assert!((units["Tenant One"] - 2.0).abs() < 0.01);
}

#[tokio::test]
async fn no_offline_machines_is_empty_not_error() {
    let inventory = StaticInventory::new()
        .with_machine(online_appliance("Machines-1", "t1"))
        .with_tenant(Tenant::new("t1", "Tenant One").with_project("p1"));

    let units = engine_with(inventory, StaticMetrics::new())
        .check_offline_units(&[ProjectId::new("p1")])
        .await
        .unwrap();

    assert!(units.is_empty());
}

#[tokio::test]
async fn lag_of_exactly_threshold_is_not_recorded() {
    let inventory = StaticInventory::new()
        .with_machine(online_appliance("Machines-1", "t1"))
        .with_machine(online_appliance("Machines-2", "t2"))
        .with_tenant(
            Tenant::new("t1", "At threshold")
                .with_project("p1")
                .with_variable("UAID", "AT600"),
        )
        .with_tenant(
            Tenant::new("t2", "Just over")
                .with_project("p1")
                .with_variable("UAID", "OVER600"),
        );
    let metrics = StaticMetrics::new()
        .with_sample("hvr_latency.at600.integrate", 600.0)
        .with_sample("hvr_latency.over600.integrate", 600.5);

    let units = engine_with(inventory, metrics)
        .check_idle_units(&[ProjectId::new("p1")])
        .await
        .unwrap();

    assert!(!units.contains_key("At threshold"));
    assert_eq!(units.get("Just over"), Some(&600.5));
}

#[tokio::test]
async fn failed_metric_is_absent_not_zero() {
    init_tracing();
    let metrics = StaticMetrics::new()
        .with_failing_sample("hvr_latency.broken.integrate")
        .with_sample("hvr_latency.quiet.integrate", 0.0);
    let fetcher = SampleFetcher::new(Arc::new(metrics));

    let samples = fetcher.samples().await.unwrap();

    assert_eq!(samples.lag(&CorrelationKey::new("BROKEN")), None);
    assert_eq!(samples.lag(&CorrelationKey::new("QUIET")), Some(0.0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn partial_samples_are_memoized_across_callers() {
    let metrics = Arc::new(
        StaticMetrics::new()
            .with_failing_sample("hvr_latency.broken.integrate")
            .with_sample("hvr_latency.abc123.integrate", 900.0)
            .with_delay(Duration::from_millis(10)),
    );
    let fetcher = Arc::new(SampleFetcher::new(metrics.clone()));

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let fetcher = Arc::clone(&fetcher);
            tokio::spawn(async move { fetcher.samples().await.unwrap() })
        })
        .collect();

    let mut maps = Vec::new();
    for handle in handles {
        maps.push(handle.await.unwrap());
    }
    maps.push(fetcher.samples().await.unwrap());

    assert_eq!(metrics.listing_calls(), 1);
    assert_eq!(metrics.value_calls(), 2);
    for map in &maps {
        assert!(Arc::ptr_eq(map, &maps[0]));
    }
    assert_eq!(maps[0].len(), 1);
    assert_eq!(maps[0].lag(&CorrelationKey::new("BROKEN")), None);
}

#[tokio::test]
async fn concurrent_first_use_fetches_once() {
    let metrics = Arc::new(
        StaticMetrics::new()
            .with_sample("hvr_latency.abc123.integrate", 900.0)
            .with_sample("hvr_latency.def456.integrate", 10.0)
            .with_delay(Duration::from_millis(20)),
    );
    let fetcher = Arc::new(SampleFetcher::new(metrics.clone()));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let fetcher = Arc::clone(&fetcher);
            tokio::spawn(async move { fetcher.samples().await.unwrap() })
        })
        .collect();

    let mut maps = Vec::new();
    for handle in handles {
        maps.push(handle.await.unwrap());
    }

    assert_eq!(metrics.listing_calls(), 1);
    assert_eq!(metrics.value_calls(), 2);
    for map in &maps {
        assert!(Arc::ptr_eq(map, &maps[0]));
    }
    assert_eq!(maps[0].len(), 2);
}

#[tokio::test]
async fn failing_scope_does_not_affect_sibling() {
    init_tracing();
    let failing = engine_with(
        StaticInventory::new()
            .with_project("p1", "CDC Install")
            .failing("machines"),
        StaticMetrics::new(),
    );
    let healthy = engine_with(
        StaticInventory::new()
            .with_project("p1", "CDC Install")
            .with_machine(online_appliance("Machines-1", "t1"))
            .with_tenant(
                Tenant::new("t1", "Lagging site")
                    .with_project("p1")
                    .with_variable("UAID", "ABC123"),
            ),
        StaticMetrics::new().with_sample("hvr_latency.abc123.integrate", 4200.0),
    );

    let projects = vec!["CDC Install".to_string()];
    let orchestrator = ScopeOrchestrator::new(vec![
        Scope::new("ASI", Arc::new(failing), projects.clone())
            .with_checks(vec![CheckKind::IdleUnits]),
        Scope::new("AOS", Arc::new(healthy), projects).with_checks(vec![CheckKind::IdleUnits]),
    ]);

    let mut reports = orchestrator.run();
    let aos = reports.pop().unwrap();
    let asi = reports.pop().unwrap();
    assert_eq!(asi.scope, "ASI");
    assert_eq!(aos.scope, "AOS");

    let asi_results = asi.drain().await;
    assert_eq!(asi_results.len(), 1);
    assert!(asi_results[0].is_failure());

    let aos_results = aos.drain().await;
    assert_eq!(aos_results.len(), 1);
    match &aos_results[0] {
        ClassificationResult::Unit { name, value } => {
            assert_eq!(name, "Lagging site");
            assert_eq!(*value, Some(4200.0));
        }
        other => panic!("expected unit, got {:?}", other),
    }
}

#[tokio::test]
async fn lag_checks_in_one_scope_share_the_sample_cache() {
    let metrics = Arc::new(
        StaticMetrics::new()
            .with_sample("hvr_latency.abc123.integrate", 4200.0)
            .with_delay(Duration::from_millis(10)),
    );
    let engine = ReconciliationEngine::new(
        Arc::new(
            StaticInventory::new()
                .with_project("p1", "CDC Install")
                .with_machine(
                    Machine::new("Machines-1", "db", MachineStatus::Online)
                        .with_role(roles::DB_HOST)
                        .with_tenant("t1"),
                )
                .with_tenant(
                    Tenant::new("t1", "Db site")
                        .with_project("p1")
                        .with_variable("UAID", "ABC123"),
                ),
        ),
        Arc::new(SampleFetcher::new(metrics.clone())),
    );

    let orchestrator = ScopeOrchestrator::new(vec![Scope::new(
        "ASI",
        Arc::new(engine),
        vec!["CDC Install".to_string()],
    )
    .with_checks(vec![CheckKind::IdleUnits, CheckKind::LaggingDbHosts])]);

    for report in orchestrator.run() {
        let results = report.drain().await;
        assert_eq!(results.len(), 1, "{:?}", results);
    }
    assert_eq!(metrics.listing_calls(), 1);
}

fn gating_fixture(
    tenant_projects: &[BTreeSet<u8>],
    machine_owners: &[BTreeSet<usize>],
) -> (StaticInventory, StaticMetrics) {
    let mut inventory = StaticInventory::new();
    let mut metrics = StaticMetrics::new();

    for (i, projects) in tenant_projects.iter().enumerate() {
        let mut tenant = Tenant::new(format!("t{}", i), format!("tenant-{}", i))
            .with_variable("UAID", format!("KEY{}", i));
        for p in projects {
            tenant = tenant.with_project(format!("p{}", p));
        }
        inventory = inventory.with_tenant(tenant);
        metrics = metrics.with_sample(&format!("hvr_latency.key{}.integrate", i), 1000.0);
    }

    for (m, owners) in machine_owners.iter().enumerate() {
        let mut online = Machine::new(format!("Machines-{}", m), "on", MachineStatus::Online)
            .with_role(roles::APPLIANCE);
        let mut offline = Machine::new(format!("Offline-{}", m), "off", MachineStatus::Offline)
            .with_role(roles::APPLIANCE);
        for owner in owners.iter().filter(|o| **o < tenant_projects.len()) {
            online = online.with_tenant(format!("t{}", owner));
            offline = offline.with_tenant(format!("t{}", owner));
        }
        inventory = inventory
            .with_event(
                &offline.id,
                Event {
                    id: EventId::new(format!("Events-{}", m)),
                    category: "MachineUnavailable".to_string(),
                    occurred: Utc::now() - chrono::Duration::hours(1),
                },
            )
            .with_machine(online)
            .with_machine(offline);
    }

    (inventory, metrics)
}

proptest! {
    #[test]
    fn reported_tenants_belong_to_a_target_project(
        tenant_projects in prop::collection::vec(prop::collection::btree_set(0u8..5, 0..3), 1..6),
        machine_owners in prop::collection::vec(prop::collection::btree_set(0usize..6, 0..3), 0..6),
        targets in prop::collection::btree_set(0u8..5, 0..3),
    ) {
        let (inventory, metrics) = gating_fixture(&tenant_projects, &machine_owners);
        let engine = engine_with(inventory, metrics);
        let target_ids: Vec<ProjectId> = targets.iter().map(|p| ProjectId::new(format!("p{}", p))).collect();

        let allowed: BTreeSet<String> = tenant_projects
            .iter()
            .enumerate()
            .filter(|(_, projects)| projects.iter().any(|p| targets.contains(p)))
            .map(|(i, _)| format!("tenant-{}", i))
            .collect();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        for check in CheckKind::ALL {
            let units = runtime.block_on(engine.run(check, &target_ids)).unwrap();
            for name in units.keys() {
                prop_assert!(allowed.contains(name), "{} reported {} outside target projects", check, name);
            }
        }
    }
}
