//! In-memory driver shared by the integration tests.

#![allow(dead_code)]

use sqldist::core::{
    driver::{DriverError, QueryResult, SqlDriver},
    row::Row,
    value::Value,
};
use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicUsize, Ordering},
    thread,
    time::Duration,
};

///
/// MemoryDriver
///
/// Understands the two query shapes the engine issues:
/// `SELECT * FROM t1, t2 [JOIN t3 ...]` (cross product) and
/// `SELECT <column|number> FROM t` (single-column projection).
///

#[derive(Debug, Default)]
pub struct MemoryDriver {
    tables: BTreeMap<String, Vec<Row>>,
    delay: Option<Duration>,
    executed: AtomicUsize,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table whose rows are given as (column, value) lists.
    pub fn with_table(mut self, table: &str, rows: Vec<Vec<(&str, Value)>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|cells| {
                cells
                    .into_iter()
                    .fold(Row::new(), |row, (column, value)| row.with(table, column, value))
            })
            .collect();
        self.tables.insert(table.to_lowercase(), rows);
        self
    }

    /// Sleep before answering each query; a shorter budget cuts the sleep
    /// and fails the query as timed out.
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn executed(&self) -> usize {
        self.executed.load(Ordering::SeqCst)
    }

    fn table(&self, name: &str) -> Result<&[Row], DriverError> {
        self.tables
            .get(&name.to_lowercase())
            .map(Vec::as_slice)
            .ok_or_else(|| DriverError::execution(name, format!("no such table: {name}")))
    }

    fn select_all(&self, from: &str) -> Result<QueryResult, DriverError> {
        let mut product = vec![Row::new()];

        for name in table_names(from) {
            let rows = self.table(&name)?;
            product = product
                .iter()
                .flat_map(|left| rows.iter().map(move |right| merge(left, right)))
                .collect();
        }

        Ok(product.into())
    }

    fn project(&self, column: &str, table: &str) -> Result<QueryResult, DriverError> {
        let rows = self.table(table)?;

        rows.iter()
            .map(|row| {
                let value = match column.parse::<i64>() {
                    Ok(n) => Value::Int(n),
                    Err(_) => row
                        .field(None, &column.to_lowercase())
                        .present()
                        .cloned()
                        .ok_or_else(|| {
                            DriverError::execution(column, format!("no such column: {column}"))
                        })?,
                };
                Ok(Row::new().with_unqualified(column, value))
            })
            .collect()
    }
}

impl SqlDriver for MemoryDriver {
    fn execute(&self, query: &str) -> Result<QueryResult, DriverError> {
        self.executed.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }

        self.answer(query)
    }

    fn execute_with_timeout(
        &self,
        query: &str,
        timeout: Duration,
    ) -> Result<QueryResult, DriverError> {
        match self.delay {
            Some(delay) if delay > timeout => {
                self.executed.fetch_add(1, Ordering::SeqCst);
                thread::sleep(timeout);
                Err(DriverError::timeout(query))
            }
            _ => self.execute(query),
        }
    }

    fn dump_state(&self) -> String {
        let tables: Vec<_> = self
            .tables
            .iter()
            .map(|(name, rows)| format!("{name}({})", rows.len()))
            .collect();
        format!("tables=[{}]", tables.join(", "))
    }
}

impl MemoryDriver {
    fn answer(&self, query: &str) -> Result<QueryResult, DriverError> {
        let lowered = query.to_lowercase();
        let Some(rest) = lowered.strip_prefix("select ") else {
            return Err(DriverError::execution(query, "only SELECT is supported"));
        };
        let Some((projection, from)) = rest.split_once(" from ") else {
            return Err(DriverError::execution(query, "missing FROM"));
        };

        match projection.trim() {
            "*" => self.select_all(from),
            column => self.project(column, from.trim()),
        }
    }
}

///
/// FailingDriver
///

#[derive(Debug, Default)]
pub struct FailingDriver;

impl SqlDriver for FailingDriver {
    fn execute(&self, query: &str) -> Result<QueryResult, DriverError> {
        Err(DriverError::execution(query, "connection refused"))
    }
}

///
/// PanickingDriver
///

#[derive(Debug, Default)]
pub struct PanickingDriver;

impl SqlDriver for PanickingDriver {
    fn execute(&self, _query: &str) -> Result<QueryResult, DriverError> {
        panic!("driver exploded");
    }

    fn dump_state(&self) -> String {
        panic!("state unavailable");
    }
}

// Table names in a FROM clause: the first word of each comma item and the
// word after every JOIN.
fn table_names(from: &str) -> Vec<String> {
    let mut names = Vec::new();

    for item in from.split(',') {
        let words: Vec<&str> = item.split_whitespace().collect();
        if let Some(first) = words.first() {
            names.push((*first).to_string());
        }
        for pair in words.windows(2) {
            if pair[0] == "join" {
                names.push(pair[1].to_string());
            }
        }
    }

    names
}

fn merge(left: &Row, right: &Row) -> Row {
    let mut merged = left.clone();
    for cell in right {
        merged.insert(cell.table.as_deref(), &cell.column, cell.value.clone());
    }
    merged
}
