//! Database handle abstraction.
//!
//! The hosting process owns the actual connection; this crate only needs the
//! narrow surface below. Execution is synchronous and request-scoped, one
//! autonomous statement per call, with no transaction demarcation.

use crate::error::SpectromResult;
use crate::row::Row;

/// The database surface required by models and the query builder.
pub trait DbHandle {
    /// Table-name prefix prepended to every unqualified table name.
    fn prefix(&self) -> &str;

    /// Execute a query and return the first row, if any.
    fn get_row(&self, sql: &str) -> SpectromResult<Option<Row>>;

    /// Execute a query and return all rows.
    fn get_results(&self, sql: &str) -> SpectromResult<Vec<Row>>;

    /// Execute a statement and return the number of affected rows.
    fn execute(&self, sql: &str) -> SpectromResult<u64>;
}

impl<H: DbHandle> DbHandle for &H {
    fn prefix(&self) -> &str {
        (*self).prefix()
    }

    fn get_row(&self, sql: &str) -> SpectromResult<Option<Row>> {
        (*self).get_row(sql)
    }

    fn get_results(&self, sql: &str) -> SpectromResult<Vec<Row>> {
        (*self).get_results(sql)
    }

    fn execute(&self, sql: &str) -> SpectromResult<u64> {
        (*self).execute(sql)
    }
}

/// Fetch the column names of `table` via schema introspection.
///
/// Issues a `SHOW COLUMNS` query through the handle and collects the `Field`
/// column of the result set.
pub fn table_columns<H: DbHandle>(db: &H, table: &str) -> SpectromResult<Vec<String>> {
    let sql = format!("SHOW COLUMNS FROM `{}{}`", db.prefix(), table);
    tracing::debug!(target: "spectrom.sql", sql = %sql, "schema introspection");
    let rows = db.get_results(&sql)?;
    let mut columns = Vec::with_capacity(rows.len());
    for row in rows {
        columns.push(row.try_get::<String>("Field")?);
    }
    Ok(columns)
}
