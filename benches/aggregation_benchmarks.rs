//! Performance benchmarks for the Liquidation Engine.
//!
//! This benchmark suite covers the hot paths of a liquidation run:
//! - Aggregating one employee over a month of shifts
//! - Choosing the closest event for a signal
//! - A full liquidation through the HTTP API for growing employee counts
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::sync::Arc;

use chrono::{Days, NaiveDate, NaiveDateTime};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use liquidation_engine::api::{AppState, create_router};
use liquidation_engine::calculation::{
    aggregate_employee, bucket_into_weeks, collect_candidates, select_closest_event,
};
use liquidation_engine::config::{ConfigLoader, LiquidationRules};
use liquidation_engine::models::{
    DateWindow, Employee, EmployeeProfile, EmployeeStatus, Event, Period, Shift,
};
use liquidation_engine::service::LiquidationPorts;
use liquidation_engine::store::{
    InMemoryAuditLog, InMemoryEmployeeDirectory, InMemoryLiquidationStore, InMemoryNewsStore,
    InMemoryPeriodStore, RecordingNotifier,
};

use axum::{body::Body, http::Request};
use tower::ServiceExt;
use uuid::Uuid;

fn month_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

fn employee(index: usize) -> Employee {
    Employee {
        id: format!("emp_{:04}", index),
        enrollment: format!("{}", 1000 + index),
        badge_id: format!("badge_{:04}", index),
        profile: EmployeeProfile::default(),
        status: EmployeeStatus::Activo,
    }
}

/// A 12-hour shift every day of March, alternating day and night.
fn month_of_events() -> Vec<Event> {
    (0..31u64)
        .map(|offset| {
            let day = month_start() + Days::new(offset);
            let start_hour = if offset % 2 == 0 { 8 } else { 20 };
            let from: NaiveDateTime = day.and_hms_opt(start_hour, 0, 0).unwrap();
            let mut event = Event::scheduled(
                format!("ev_{:02}", offset),
                from,
                from + chrono::Duration::hours(12),
            );
            if offset % 3 == 0 {
                event.checkin = Some(from - chrono::Duration::minutes(7));
                event.checkout = Some(from + chrono::Duration::minutes(12 * 60 + 4));
            }
            event
        })
        .collect()
}

fn periods_for(employee_count: usize) -> Vec<Period> {
    vec![Period {
        id: "per_mar".to_string(),
        objective_id: "obj_1".to_string(),
        from_date: month_start(),
        to_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        shifts: (0..employee_count)
            .map(|i| Shift {
                employee_id: employee(i).id,
                events: month_of_events(),
                signed_dates: vec![],
            })
            .collect(),
    }]
}

fn create_router_for(employee_count: usize) -> axum::Router {
    let config = ConfigLoader::load("./config/default").expect("Failed to load config");
    let ports = LiquidationPorts {
        periods: Arc::new(InMemoryPeriodStore::with_periods(periods_for(employee_count))),
        news: Arc::new(InMemoryNewsStore::default()),
        employees: Arc::new(InMemoryEmployeeDirectory::with_employees(
            (0..employee_count).map(employee).collect(),
        )),
        liquidations: Arc::new(InMemoryLiquidationStore::default()),
        audit: Arc::new(InMemoryAuditLog::default()),
    };
    create_router(AppState::new(
        config,
        ports,
        Arc::new(RecordingNotifier::default()),
    ))
}

/// Benchmark: one employee, one month of shifts.
fn bench_aggregate_employee(c: &mut Criterion) {
    let rules = LiquidationRules::default();
    let window = DateWindow::new(month_start(), NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
    let weeks = bucket_into_weeks(window.from, window.to);
    let periods = periods_for(1);
    let employee = employee(0);

    c.bench_function("aggregate_employee_month", |b| {
        b.iter(|| {
            black_box(aggregate_employee(
                Uuid::nil(),
                &employee,
                &window,
                &periods,
                &weeks,
                &[],
                &rules,
            ))
        })
    });
}

/// Benchmark: candidate collection and closest-event selection.
fn bench_select_closest_event(c: &mut Criterion) {
    let periods = periods_for(1);
    let timestamp = NaiveDate::from_ymd_opt(2024, 3, 15)
        .unwrap()
        .and_hms_opt(19, 55, 0)
        .unwrap();

    c.bench_function("select_closest_event", |b| {
        b.iter(|| {
            let candidates = collect_candidates(&periods, "emp_0000", timestamp, 1);
            black_box(select_closest_event(&candidates, timestamp).map(|c| c.event.id.clone()))
        })
    });
}

/// Benchmark: full liquidation runs for growing employee counts.
fn bench_liquidation_scaling(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("liquidation_scaling");
    group.sample_size(20);

    for employee_count in [1usize, 10, 100].iter() {
        let router = create_router_for(*employee_count);
        let employee_ids: Vec<String> = (0..*employee_count).map(|i| employee(i).id).collect();
        let body = serde_json::json!({
            "date_from": "2024-03-01",
            "date_to": "2024-03-31",
            "employee_ids": employee_ids,
            "actor_user_id": "bench",
        })
        .to_string();

        group.throughput(Throughput::Elements(*employee_count as u64));
        group.bench_with_input(
            BenchmarkId::new("employees", employee_count),
            employee_count,
            |b, _| {
                b.to_async(&rt).iter(|| async {
                    let router = router.clone();
                    let response = router
                        .oneshot(
                            Request::builder()
                                .method("POST")
                                .uri("/liquidations")
                                .header("Content-Type", "application/json")
                                .body(Body::from(body.clone()))
                                .unwrap(),
                        )
                        .await
                        .unwrap();
                    black_box(response)
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_aggregate_employee,
    bench_select_closest_event,
    bench_liquidation_scaling,
);
criterion_main!(benches);
