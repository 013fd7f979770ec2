//! Statements, probe queries, aliases, and subqueries against an in-memory driver.

mod support;

use sqldist::prelude::*;
use support::MemoryDriver;

// ---- helpers ----

fn shop() -> MemoryDriver {
    MemoryDriver::new()
        .with_table(
            "users",
            vec![
                vec![("id", 1.into()), ("age", 10.into()), ("name", "ann".into())],
                vec![("id", 2.into()), ("age", 15.into()), ("name", "bob".into())],
            ],
        )
        .with_table(
            "orders",
            vec![vec![("user_id", 2.into()), ("total", 30.into())]],
        )
}

fn score(condition: &str) -> SqlDistance {
    SqlDistanceEngine::default().calculate_with_metrics(condition, None, &shop())
}

// ---- probe queries ----

#[test]
fn select_probes_its_from_clause() {
    assert_eq!(score("SELECT * FROM users WHERE age > 18").distance.get(), 4.0);
}

#[test]
fn aliases_resolve_to_tables() {
    assert_eq!(
        score("SELECT name FROM users u WHERE u.age = 15").distance,
        Distance::ZERO
    );
}

#[test]
fn joins_probe_every_joined_table() {
    let out = score(
        "SELECT * FROM users u JOIN orders o ON u.id = o.user_id WHERE o.total > u.age * 3",
    );

    assert_eq!(out.distance.get(), 1.0);
    assert_eq!(out.rows_evaluated, 2);
}

#[test]
fn update_and_delete_probe_their_targets() {
    assert_eq!(
        score("UPDATE users SET age = 0 WHERE name = 'bob'").distance,
        Distance::ZERO
    );
    assert_eq!(score("DELETE FROM orders WHERE total < 10").distance.get(), 21.0);
}

#[test]
fn bare_qualified_conditions_probe_their_tables() {
    assert_eq!(score("users.age = 12").distance.get(), 2.0);
    assert_eq!(score("users.id = orders.user_id").distance, Distance::ZERO);
}

#[test]
fn unknown_probe_table_fails() {
    let out = score("SELECT * FROM nope WHERE x = 1");

    assert_eq!(out.distance, INF_DISTANCE);
    assert!(out.evaluation_failed);
}

// ---- subqueries ----

#[test]
fn in_subselect_consults_the_driver_per_row() {
    let driver = shop();
    let engine = SqlDistanceEngine::default();

    let d = engine.calculate(
        "SELECT * FROM users WHERE id IN (SELECT user_id FROM orders)",
        &driver,
    );

    assert_eq!(d, Distance::ZERO);
    // probe + one subquery per row until the match
    assert_eq!(driver.executed(), 3);
    assert_eq!(engine.metrics_report().subqueries, 2);
}

#[test]
fn exists_and_not_exists() {
    assert_eq!(
        score("SELECT * FROM users WHERE EXISTS (SELECT 1 FROM orders)").distance,
        Distance::ZERO
    );
    assert_eq!(
        score("NOT EXISTS (SELECT 1 FROM orders) AND users.age > 0")
            .distance
            .get(),
        1.0
    );
}

#[test]
fn failed_subquery_degrades_only_its_leaf() {
    let out = score("SELECT * FROM users WHERE id IN (SELECT x FROM missing)");

    assert_eq!(out.distance, INF_DISTANCE);
    assert!(!out.evaluation_failed);

    let out = score("SELECT * FROM users WHERE id IN (SELECT x FROM missing) OR age = 14");
    assert_eq!(out.distance.get(), 1.0);
}
