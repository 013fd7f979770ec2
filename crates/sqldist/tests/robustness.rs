//! Totality, deadlines, concurrency, and the fallible setup surface.

mod support;

use proptest::prelude::*;
use sqldist::{
    core::{
        driver::NoDriver,
        obs::{MetricsEvent, MetricsReport, MetricsSink},
    },
    error::{ErrorKind, ErrorOrigin},
    prelude::*,
};
use std::{
    sync::{Arc, Mutex},
    thread,
    time::{Duration, Instant},
};
use support::{FailingDriver, MemoryDriver, PanickingDriver};

// ---- helpers ----

fn slow_users(delay: Duration) -> MemoryDriver {
    MemoryDriver::new()
        .with_table("users", vec![vec![("age", 3.into())]])
        .with_delay(delay)
}

fn engine_with_timeout(timeout_ms: u64) -> SqlDistanceEngine {
    SqlDistanceEngine::new(DistanceConfig::default().with_timeout_ms(timeout_ms))
}

///
/// RecordingSink
///

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<MetricsEvent>>,
}

impl MetricsSink for RecordingSink {
    fn record(&self, event: MetricsEvent) {
        self.events.lock().expect("sink lock").push(event);
    }
}

// ---- deadlines ----

#[test]
fn slow_probe_times_out() {
    let engine = engine_with_timeout(10);
    let driver = slow_users(Duration::from_millis(800));

    let started = Instant::now();
    let out = engine.calculate_with_metrics("SELECT * FROM users WHERE age > 1", None, &driver);

    assert_eq!(out.distance, INF_DISTANCE);
    assert!(out.evaluation_failed);
    assert!(started.elapsed() < Duration::from_millis(400));
    assert_eq!(engine.metrics_report().timeouts, 1);
}

#[test]
fn slow_subquery_times_out() {
    let engine = engine_with_timeout(10);
    let driver = slow_users(Duration::from_millis(800));
    let rows = [Row::new().with_unqualified("x", 1)];

    let started = Instant::now();
    let out = engine.calculate_with_metrics(
        "EXISTS (SELECT 1 FROM users) OR x = 1",
        Some(&rows[..]),
        &driver,
    );

    assert_eq!(out.distance, INF_DISTANCE);
    assert!(out.evaluation_failed);
    assert!(started.elapsed() < Duration::from_millis(400));
    assert_eq!(engine.metrics_report().timeouts, 1);
}

#[test]
fn fast_driver_within_budget_is_answered() {
    let engine = engine_with_timeout(2_000);
    let driver = slow_users(Duration::from_millis(5));

    let d = engine.calculate("SELECT * FROM users WHERE age > 1", &driver);

    assert_eq!(d, Distance::ZERO);
}

#[test]
fn zero_timeout_disables_the_deadline() {
    let engine = engine_with_timeout(0);
    let driver = slow_users(Duration::from_millis(5));

    let d = engine.calculate("SELECT * FROM users WHERE age > 1", &driver);

    assert_eq!(d, Distance::ZERO);
}

// ---- driver failures ----

#[test]
fn failing_probe_is_infinite() {
    let engine = SqlDistanceEngine::default();

    assert_eq!(engine.calculate("users.age = 1", &FailingDriver), INF_DISTANCE);
    // repeated failures stay total
    assert_eq!(engine.calculate("users.age = 1", &FailingDriver), INF_DISTANCE);
    assert_eq!(engine.metrics_report().failures, 2);
}

#[test]
fn panicking_driver_is_contained() {
    let engine = SqlDistanceEngine::default();
    let out = engine.calculate_with_metrics("users.age = 1", None, &PanickingDriver);

    assert_eq!(out.distance, INF_DISTANCE);
    assert!(out.evaluation_failed);
}

#[test]
fn oversized_condition_is_infinite_on_a_small_stack() {
    let condition = vec!["x = 5"; 50_000].join(" AND ");
    let rows = vec![Row::new().with_unqualified("x", 5)];

    let (distance, kind) = thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(move || {
            let engine = SqlDistanceEngine::default();
            let distance = engine.calculate_rows(&condition, &rows, &NoDriver);
            let kind = sqldist::parse(&condition).map(|_| ()).map_err(|err| err.kind);
            (distance, kind)
        })
        .expect("spawn worker")
        .join()
        .expect("worker finished");

    assert_eq!(distance, INF_DISTANCE);
    assert_eq!(kind, Err(ErrorKind::Unsupported));
}

// ---- concurrency ----

#[test]
fn engine_is_shared_across_threads() {
    let engine = SqlDistanceEngine::default();
    let rows = vec![Row::new().with_unqualified("x", 3)];

    thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..50 {
                    let d = engine.calculate_rows("x = 5", &rows, &NoDriver);
                    assert_eq!(d.get(), 2.0);
                }
            });
        }
    });

    let report = engine.metrics_report();
    assert_eq!(engine.cache().len(), 1);
    assert_eq!(report.calculations, 400);
    assert_eq!(report.cache_hits + report.cache_misses, 400);
    assert!(report.cache_misses >= 1);
}

// ---- sinks and session ----

#[test]
fn custom_sink_receives_events() {
    let sink = Arc::new(RecordingSink::default());
    let engine = SqlDistanceEngine::with_sink(DistanceConfig::default(), sink.clone());
    let rows = [Row::new().with_unqualified("x", 5)];

    let _ = engine.calculate_rows("x = 5", &rows, &NoDriver);
    let _ = engine.calculate_rows("x = 5", &rows, &NoDriver);

    let events = sink.events.lock().expect("sink lock").clone();
    assert_eq!(
        events,
        vec![
            MetricsEvent::CacheMiss,
            MetricsEvent::Calculated { rows_evaluated: 1 },
            MetricsEvent::CacheHit,
            MetricsEvent::Calculated { rows_evaluated: 1 },
        ]
    );
    // the recording sink keeps no counters
    assert_eq!(engine.metrics_report(), MetricsReport::default());
}

#[test]
fn reset_session_clears_the_cache() {
    let engine = SqlDistanceEngine::default();
    let rows = [Row::new().with_unqualified("x", 5)];

    let _ = engine.calculate_rows("x = 5", &rows, &NoDriver);
    assert_eq!(engine.cache().len(), 1);

    engine.reset_session();
    assert!(engine.cache().is_empty());
}

// ---- setup surface ----

#[test]
fn engine_loads_from_toml() {
    let engine = engine_from_toml("not_equal_penalty = 2.0\ntimeout_ms = 50").expect("valid config");
    let rows = [Row::new().with_unqualified("x", 5)];

    assert_eq!(engine.config().timeout_ms, 50);
    assert_eq!(engine.calculate_rows("x <> 5", &rows, &NoDriver).get(), 2.0);
}

#[test]
fn invalid_toml_is_a_config_error() {
    let err = engine_from_toml("timeout_ms = -1").expect_err("negative timeout");

    assert_eq!(err.kind, ErrorKind::Config);
    assert_eq!(err.origin, ErrorOrigin::Config);
}

#[test]
fn parse_errors_are_classified() {
    let malformed = parse("x = = 5").expect_err("malformed");
    let unsupported = parse("upper(x) = 'A'").expect_err("unsupported");

    assert_eq!(malformed.kind, ErrorKind::Malformed);
    assert_eq!(malformed.origin, ErrorOrigin::Translate);
    assert_eq!(unsupported.kind, ErrorKind::Unsupported);
    assert!(parse("x BETWEEN 1 AND 2").is_ok());
}

// ---- totality ----

fn arb_token_soup() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("x"),
            Just("t.x"),
            Just("="),
            Just("<>"),
            Just("<"),
            Just("5"),
            Just("-1.5"),
            Just("'a%'"),
            Just("AND"),
            Just("OR"),
            Just("NOT"),
            Just("("),
            Just(")"),
            Just(","),
            Just("IN"),
            Just("LIKE"),
            Just("BETWEEN"),
            Just("IS"),
            Just("NULL"),
            Just("TRUE"),
            Just("SELECT"),
            Just("*"),
            Just("FROM"),
            Just("WHERE"),
            Just("EXISTS"),
            Just("/"),
        ],
        0..24,
    )
    .prop_map(|tokens| tokens.join(" "))
}

fn arb_condition_text() -> impl Strategy<Value = String> {
    prop_oneof![arb_token_soup(), "\\PC{0,64}"]
}

proptest! {
    #[test]
    fn calculate_is_total(text in arb_condition_text(), x in -100i64..100) {
        let engine = SqlDistanceEngine::default();
        let rows = [Row::new().with_unqualified("x", x).with("t", "x", x)];

        let d = engine.calculate_rows(&text, &rows, &NoDriver);

        prop_assert!(!d.get().is_nan());
        prop_assert!(d.get() >= 0.0);
    }
}
