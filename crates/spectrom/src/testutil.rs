//! Shared in-memory database handle for unit tests.

use crate::error::SpectromResult;
use crate::handle::DbHandle;
use crate::row::Row;
use crate::value::Value;
use std::cell::RefCell;

/// Scripted [`DbHandle`] that records every statement it receives.
///
/// `SHOW COLUMNS` queries are answered from `columns`; everything else is
/// answered from the canned `row` / `results` / `affected` fields.
#[derive(Debug)]
pub(crate) struct MockDb {
    pub prefix: String,
    pub row: Option<Row>,
    pub results: Vec<Row>,
    pub columns: Vec<String>,
    pub affected: u64,
    pub executed: RefCell<Vec<String>>,
    pub introspections: RefCell<usize>,
}

impl MockDb {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            row: None,
            results: Vec::new(),
            columns: Vec::new(),
            affected: 0,
            executed: RefCell::new(Vec::new()),
            introspections: RefCell::new(0),
        }
    }

    pub fn with_columns(prefix: &str, columns: &[&str]) -> Self {
        let mut db = Self::new(prefix);
        db.columns = columns.iter().map(|c| c.to_string()).collect();
        db
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.borrow().clone()
    }

    pub fn last_executed(&self) -> Option<String> {
        self.executed.borrow().last().cloned()
    }

    pub fn introspection_count(&self) -> usize {
        *self.introspections.borrow()
    }
}

impl DbHandle for MockDb {
    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn get_row(&self, sql: &str) -> SpectromResult<Option<Row>> {
        self.executed.borrow_mut().push(sql.to_string());
        Ok(self.row.clone())
    }

    fn get_results(&self, sql: &str) -> SpectromResult<Vec<Row>> {
        self.executed.borrow_mut().push(sql.to_string());
        if sql.starts_with("SHOW COLUMNS") {
            *self.introspections.borrow_mut() += 1;
            return Ok(self
                .columns
                .iter()
                .map(|column| {
                    let mut row = Row::new();
                    row.set("Field", Value::from(column.as_str()));
                    row
                })
                .collect());
        }
        Ok(self.results.clone())
    }

    fn execute(&self, sql: &str) -> SpectromResult<u64> {
        self.executed.borrow_mut().push(sql.to_string());
        Ok(self.affected)
    }
}
