//! Fluent SQL statement builder with nested WHERE-group support.
//!
//! [`QueryBuilder`] accumulates SELECT columns, JOIN clauses, WHERE
//! predicates (possibly grouped), ordering and pagination through fluent
//! calls, then serializes the whole state into one value-escaped statement
//! when a terminal operation runs. The accumulator is reset after every
//! terminal call, so a builder instance can be reused for the next
//! statement.
//!
//! # Usage
//!
//! ```ignore
//! use spectrom::QueryBuilder;
//!
//! let mut qb = QueryBuilder::new(&db, "orders");
//! let rows = qb
//!     .select("id")?
//!     .where_eq("status", "active")?
//!     .where_or_eq("status", "pending")?
//!     .order_by("created", "DESC")?
//!     .limit(10, Some(2))
//!     .results()?;
//! ```

mod predicate;

pub use predicate::{CmpOp, Joiner, Predicate};

use crate::error::{SpectromError, SpectromResult};
use crate::handle::{DbHandle, table_columns};
use crate::ident::ColumnRef;
use crate::row::{FromRow, Row};
use crate::value::Value;
use predicate::{collect_checked_columns, render_predicates};
use std::fmt::Write;
use std::str::FromStr;

/// Recognized JOIN orientations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Left,
    LeftInner,
    LeftOuter,
    Right,
    RightInner,
    RightOuter,
}

impl JoinKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "LEFT",
            Self::LeftInner => "LEFT INNER",
            Self::LeftOuter => "LEFT OUTER",
            Self::Right => "RIGHT",
            Self::RightInner => "RIGHT INNER",
            Self::RightOuter => "RIGHT OUTER",
        }
    }
}

impl FromStr for JoinKind {
    type Err = SpectromError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "LEFT" => Ok(Self::Left),
            "LEFT INNER" => Ok(Self::LeftInner),
            "LEFT OUTER" => Ok(Self::LeftOuter),
            "RIGHT" => Ok(Self::Right),
            "RIGHT INNER" => Ok(Self::RightInner),
            "RIGHT OUTER" => Ok(Self::RightOuter),
            other => Err(SpectromError::input(format!(
                "unrecognized JOIN specification: {other}"
            ))),
        }
    }
}

/// Ordering direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDir {
    Asc,
    Desc,
}

impl OrderDir {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for OrderDir {
    type Err = SpectromError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            other => Err(SpectromError::input(format!(
                "unrecognized ordering specified: {other}"
            ))),
        }
    }
}

/// Statement builder over a database handle and a base table.
#[derive(Debug)]
pub struct QueryBuilder<'h, H> {
    db: &'h H,
    table: String,
    check_columns: bool,
    /// Cached column list for the base table, fetched once per instance.
    columns: Option<Vec<String>>,
    last_query: Option<String>,

    select: Vec<String>,
    from: Option<String>,
    joins: Vec<String>,
    wheres: Vec<Predicate>,
    /// In-progress WHERE group. Opening a new group while one is active
    /// replaces this buffer; nesting deeper than one level is not supported.
    group: Option<(Joiner, Vec<Predicate>)>,
    order: Option<(ColumnRef, OrderDir)>,
    page_items: Option<u64>,
    page: Option<u64>,
}

impl<'h, H: DbHandle> QueryBuilder<'h, H> {
    /// Create a builder for `table` (unprefixed) over the given handle.
    pub fn new(db: &'h H, table: &str) -> Self {
        Self {
            db,
            table: table.to_string(),
            check_columns: false,
            columns: None,
            last_query: None,
            select: Vec::new(),
            from: None,
            joins: Vec::new(),
            wheres: Vec::new(),
            group: None,
            order: None,
            page_items: None,
            page: None,
        }
    }

    /// Toggle strict column checking. Recommended on during development.
    pub fn set_check_columns(&mut self, check: bool) -> &mut Self {
        self.check_columns = check;
        self
    }

    /// The last statement this builder constructed.
    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    /// Check whether `name` exists among the base table's columns.
    ///
    /// The column list is fetched once per builder instance and cached.
    /// Qualified references (`table.column`) are always treated as valid
    /// since cross-table resolution is not attempted.
    pub fn has_column(&mut self, name: &str) -> SpectromResult<bool> {
        if name.contains('.') {
            return Ok(true);
        }
        if self.columns.is_none() {
            self.columns = Some(table_columns(self.db, &self.table)?);
        }
        let known = self.columns.as_deref().unwrap_or(&[]);
        Ok(known.iter().any(|column| column == name))
    }

    fn check_column(&mut self, column: &ColumnRef) -> SpectromResult<()> {
        if !self.check_columns || column.is_qualified() {
            return Ok(());
        }
        if self.has_column(column.column())? {
            Ok(())
        } else {
            Err(SpectromError::unknown_column(column.column(), &self.table))
        }
    }

    fn check_where_columns(&mut self) -> SpectromResult<()> {
        if !self.check_columns {
            return Ok(());
        }
        let mut names = Vec::new();
        collect_checked_columns(&self.wheres, &mut names);
        for name in names {
            if !self.has_column(&name)? {
                return Err(SpectromError::unknown_column(name, &self.table));
            }
        }
        Ok(())
    }

    /// Clear the accumulator. Column cache, checking mode and the last
    /// built statement survive a reset.
    pub fn reset(&mut self) -> &mut Self {
        self.select.clear();
        self.from = None;
        self.joins.clear();
        self.wheres.clear();
        self.group = None;
        self.order = None;
        self.page_items = None;
        self.page = None;
        self
    }

    // ==================== SELECT columns ====================

    /// Append a SELECT column.
    pub fn select(&mut self, name: &str) -> SpectromResult<&mut Self> {
        self.push_select(name, None)
    }

    /// Append a SELECT column with an AS alias.
    pub fn select_as(&mut self, name: &str, alias: &str) -> SpectromResult<&mut Self> {
        self.push_select(name, Some(alias))
    }

    /// Append multiple SELECT columns.
    pub fn select_cols(&mut self, names: &[&str]) -> SpectromResult<&mut Self> {
        for name in names {
            self.push_select(name, None)?;
        }
        Ok(self)
    }

    fn push_select(&mut self, name: &str, alias: Option<&str>) -> SpectromResult<&mut Self> {
        let column = ColumnRef::parse(name)?;
        self.check_column(&column)?;
        let mut expr = column.to_sql();
        if let Some(alias) = alias {
            let _ = write!(expr, " AS `{}`", alias.trim_matches('`'));
        }
        self.select.push(expr);
        Ok(self)
    }

    /// Append a SQL function expression over a column to the SELECT list.
    pub fn select_function(
        &mut self,
        func: &str,
        name: &str,
        alias: Option<&str>,
    ) -> SpectromResult<&mut Self> {
        let column = ColumnRef::parse(name)?;
        self.check_column(&column)?;
        let mut expr = format!("{func}({})", column.to_sql());
        if let Some(alias) = alias {
            let _ = write!(expr, " AS `{}`", alias.trim_matches('`'));
        }
        self.select.push(expr);
        Ok(self)
    }

    /// Append a MAX() reference to the SELECT list.
    pub fn select_max(&mut self, name: &str, alias: Option<&str>) -> SpectromResult<&mut Self> {
        self.select_function("MAX", name, alias)
    }

    /// Append a MIN() reference to the SELECT list.
    pub fn select_min(&mut self, name: &str, alias: Option<&str>) -> SpectromResult<&mut Self> {
        self.select_function("MIN", name, alias)
    }

    /// Append an AVG() reference to the SELECT list.
    pub fn select_avg(&mut self, name: &str, alias: Option<&str>) -> SpectromResult<&mut Self> {
        self.select_function("AVG", name, alias)
    }

    /// Append a SUM() reference to the SELECT list.
    pub fn select_sum(&mut self, name: &str, alias: Option<&str>) -> SpectromResult<&mut Self> {
        self.select_function("SUM", name, alias)
    }

    // ==================== FROM / JOIN ====================

    /// Override the FROM table, optionally prepending the handle prefix.
    pub fn from(&mut self, table: &str, with_prefix: bool) -> &mut Self {
        let table = if with_prefix {
            format!("{}{}", self.db.prefix(), table)
        } else {
            table.to_string()
        };
        self.from = Some(table);
        self
    }

    /// Add a JOIN clause.
    ///
    /// `direction` must be one of LEFT, LEFT INNER, LEFT OUTER, RIGHT,
    /// RIGHT INNER, RIGHT OUTER. Joins and filtered predicates are tracked
    /// independently per statement phase, so adding a join resets all
    /// accumulated WHERE state.
    pub fn join(
        &mut self,
        table: &str,
        on: &str,
        direction: &str,
        alias: Option<&str>,
    ) -> SpectromResult<&mut Self> {
        let kind: JoinKind = direction.parse()?;
        let mut clause = format!("{} JOIN `{}`", kind.as_str(), table.trim_matches('`'));
        if let Some(alias) = alias {
            let _ = write!(clause, " AS `{}`", alias.trim_matches('`'));
        }
        let _ = write!(clause, " ON {on}");
        self.joins.push(clause);
        Ok(self.where_reset())
    }

    // ==================== WHERE conditions ====================

    /// Add an AND-joined equality predicate: column = value.
    pub fn where_eq(&mut self, column: &str, value: impl Into<Value>) -> SpectromResult<&mut Self> {
        self.push_compare(Joiner::And, column, CmpOp::Eq, value.into())
    }

    /// Add an AND-joined comparison predicate with an explicit operator,
    /// one of `=`, `!=`, `<`, `>`, `<=`, `>=`.
    pub fn where_cmp(
        &mut self,
        column: &str,
        value: impl Into<Value>,
        op: &str,
    ) -> SpectromResult<&mut Self> {
        let op: CmpOp = op.parse()?;
        self.push_compare(Joiner::And, column, op, value.into())
    }

    /// Add an AND-joined raw condition, emitted verbatim.
    pub fn where_raw(&mut self, condition: &str) -> &mut Self {
        self.push_where(Predicate::raw(Joiner::And, condition));
        self
    }

    /// Expand a mapping into AND-joined equality predicates, in iteration
    /// order.
    pub fn where_map<I, S, V>(&mut self, pairs: I) -> SpectromResult<&mut Self>
    where
        I: IntoIterator<Item = (S, V)>,
        S: AsRef<str>,
        V: Into<Value>,
    {
        for (column, value) in pairs {
            self.push_compare(Joiner::And, column.as_ref(), CmpOp::Eq, value.into())?;
        }
        Ok(self)
    }

    /// Add an OR-joined equality predicate.
    pub fn where_or_eq(
        &mut self,
        column: &str,
        value: impl Into<Value>,
    ) -> SpectromResult<&mut Self> {
        self.push_compare(Joiner::Or, column, CmpOp::Eq, value.into())
    }

    /// Add an OR-joined comparison predicate with an explicit operator.
    pub fn where_or_cmp(
        &mut self,
        column: &str,
        value: impl Into<Value>,
        op: &str,
    ) -> SpectromResult<&mut Self> {
        let op: CmpOp = op.parse()?;
        self.push_compare(Joiner::Or, column, op, value.into())
    }

    /// Add an OR-joined raw condition, emitted verbatim.
    pub fn where_or_raw(&mut self, condition: &str) -> &mut Self {
        self.push_where(Predicate::raw(Joiner::Or, condition));
        self
    }

    /// Add an AND-joined membership predicate. Polarity `"="` means
    /// inclusion (`IN`); anything else means exclusion (`NOT IN`).
    pub fn where_in<I, V>(
        &mut self,
        column: &str,
        values: I,
        polarity: &str,
    ) -> SpectromResult<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push_in(Joiner::And, column, values, polarity)
    }

    /// Add an OR-joined membership predicate.
    pub fn where_in_or<I, V>(
        &mut self,
        column: &str,
        values: I,
        polarity: &str,
    ) -> SpectromResult<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push_in(Joiner::Or, column, values, polarity)
    }

    /// Begin a WHERE group. Predicates added until [`where_end_group`] are
    /// captured as children of one parenthesized group predicate joined to
    /// the outer sequence with `joiner` (AND or OR).
    ///
    /// Groups do not stack: opening a group while one is active replaces
    /// the active group's buffer.
    ///
    /// [`where_end_group`]: QueryBuilder::where_end_group
    pub fn where_group(&mut self, joiner: &str) -> SpectromResult<&mut Self> {
        let joiner: Joiner = joiner.parse()?;
        self.group = Some((joiner, Vec::new()));
        Ok(self)
    }

    /// Close the active WHERE group, inserting it into the outer sequence.
    /// A no-op when no group is active.
    pub fn where_end_group(&mut self) -> &mut Self {
        if let Some((joiner, children)) = self.group.take() {
            self.wheres.push(Predicate::group(joiner, children));
        }
        self
    }

    /// Clear all WHERE state, including any in-progress group.
    pub fn where_reset(&mut self) -> &mut Self {
        self.wheres.clear();
        self.group = None;
        self
    }

    fn push_compare(
        &mut self,
        joiner: Joiner,
        column: &str,
        op: CmpOp,
        value: Value,
    ) -> SpectromResult<&mut Self> {
        let column = ColumnRef::parse(column)?;
        self.push_where(Predicate::compare(joiner, column, op, value));
        Ok(self)
    }

    fn push_in<I, V>(
        &mut self,
        joiner: Joiner,
        column: &str,
        values: I,
        polarity: &str,
    ) -> SpectromResult<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let column = ColumnRef::parse(column)?;
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let negated = polarity != "=";
        self.push_where(Predicate::in_list(joiner, column, values, negated));
        Ok(self)
    }

    fn push_where(&mut self, predicate: Predicate) {
        match &mut self.group {
            Some((_, children)) => children.push(predicate),
            None => self.wheres.push(predicate),
        }
    }

    // ==================== Ordering & pagination ====================

    /// Specify ordering. `direction` must be ASC or DESC.
    pub fn order_by(&mut self, column: &str, direction: &str) -> SpectromResult<&mut Self> {
        let direction: OrderDir = direction.parse()?;
        let column = ColumnRef::parse(column)?;
        self.check_column(&column)?;
        self.order = Some((column, direction));
        Ok(self)
    }

    /// Set the LIMIT values: a page size and an optional 0-based page
    /// index. With a page index the statement renders `LIMIT offset,count`
    /// (offset = page × size); without one only the row count is applied.
    pub fn limit(&mut self, per_page: u64, page: Option<u64>) -> &mut Self {
        self.page_items = Some(per_page);
        self.page = page;
        self
    }

    // ==================== Statement construction ====================

    /// Render the WHERE clause of the current predicate set without
    /// executing, force-closing any open group. Mostly used for debugging.
    pub fn where_clause(&mut self) -> SpectromResult<String> {
        self.where_end_group();
        self.check_where_columns()?;
        Ok(render_predicates(&self.wheres))
    }

    fn build_select(&mut self) -> SpectromResult<String> {
        self.where_end_group();
        self.check_where_columns()?;

        let mut sql = String::from("SELECT ");
        if self.select.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.select.join(","));
        }

        match &self.from {
            Some(from) => {
                let _ = write!(sql, " FROM `{from}`");
            }
            None => {
                let _ = write!(sql, " FROM `{}{}`", self.db.prefix(), self.table);
            }
        }

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }

        let where_sql = render_predicates(&self.wheres);
        if !where_sql.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }

        if let Some((column, direction)) = &self.order {
            let _ = write!(sql, " ORDER BY {} {}", column.to_sql(), direction.as_str());
        }

        match (self.page_items, self.page) {
            (Some(items), Some(page)) => {
                let _ = write!(sql, " LIMIT {},{}", page * items, items);
            }
            (Some(items), None) => {
                let _ = write!(sql, " LIMIT {items}");
            }
            (None, _) => sql.push_str(" LIMIT 1"),
        }

        self.last_query = Some(sql.clone());
        Ok(sql)
    }

    fn build_update<I, S, V>(
        &mut self,
        data: I,
        limit: u64,
        table: Option<&str>,
    ) -> SpectromResult<String>
    where
        I: IntoIterator<Item = (S, V)>,
        S: AsRef<str>,
        V: Into<Value>,
    {
        self.where_end_group();
        self.check_where_columns()?;

        let set_sql = render_set(data)?;
        let table = table.unwrap_or(&self.table);
        let mut sql = format!("UPDATE `{}{}` SET {}", self.db.prefix(), table, set_sql);

        let where_sql = render_predicates(&self.wheres);
        if !where_sql.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }
        let _ = write!(sql, " LIMIT {limit}");

        self.last_query = Some(sql.clone());
        Ok(sql)
    }

    fn build_delete(&mut self, limit: u64, table: Option<&str>) -> SpectromResult<String> {
        self.where_end_group();
        self.check_where_columns()?;

        let table = table.unwrap_or(&self.table);
        let mut sql = format!("DELETE FROM `{}{}`", self.db.prefix(), table);

        let where_sql = render_predicates(&self.wheres);
        if !where_sql.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }
        let _ = write!(sql, " LIMIT {limit}");

        self.last_query = Some(sql.clone());
        Ok(sql)
    }

    // ==================== Terminal operations ====================
    //
    // Each builds one statement from the accumulated state, resets the
    // accumulator, then executes. The reset happens whether or not the
    // build succeeded, so the next cycle always starts from fresh state.

    /// Build and run the query, returning a single row.
    pub fn run(&mut self) -> SpectromResult<Option<Row>> {
        let sql = self.build_select();
        self.reset();
        let sql = sql?;
        tracing::debug!(target: "spectrom.sql", sql = %sql, "single-row query");
        self.db.get_row(&sql)
    }

    /// Build and run the query, mapping the single row onto `T`.
    pub fn run_as<T: FromRow>(&mut self) -> SpectromResult<Option<T>> {
        match self.run()? {
            Some(row) => Ok(Some(T::from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Build and run the query, returning all rows.
    pub fn results(&mut self) -> SpectromResult<Vec<Row>> {
        let sql = self.build_select();
        self.reset();
        let sql = sql?;
        tracing::debug!(target: "spectrom.sql", sql = %sql, "multi-row query");
        self.db.get_results(&sql)
    }

    /// Build and run the query, mapping all rows onto `T`.
    pub fn results_as<T: FromRow>(&mut self) -> SpectromResult<Vec<T>> {
        self.results()?.iter().map(T::from_row).collect()
    }

    /// Build an UPDATE from the tracked WHERE state and the `data` map,
    /// returning the number of rows updated. An empty `data` map is a data
    /// error raised before anything executes. `table` overrides the
    /// builder's base table.
    pub fn update<I, S, V>(
        &mut self,
        data: I,
        limit: u64,
        table: Option<&str>,
    ) -> SpectromResult<u64>
    where
        I: IntoIterator<Item = (S, V)>,
        S: AsRef<str>,
        V: Into<Value>,
    {
        let sql = self.build_update(data, limit, table);
        self.reset();
        let sql = sql?;
        tracing::debug!(target: "spectrom.sql", sql = %sql, "update");
        self.db.execute(&sql)
    }

    /// Build a DELETE from the tracked WHERE state, returning the number
    /// of rows deleted. `table` overrides the builder's base table.
    pub fn delete(&mut self, limit: u64, table: Option<&str>) -> SpectromResult<u64> {
        let sql = self.build_delete(limit, table);
        self.reset();
        let sql = sql?;
        tracing::debug!(target: "spectrom.sql", sql = %sql, "delete");
        self.db.execute(&sql)
    }
}

/// Render a column → value map as a SET list. Errors on an empty map.
pub(crate) fn render_set<I, S, V>(data: I) -> SpectromResult<String>
where
    I: IntoIterator<Item = (S, V)>,
    S: AsRef<str>,
    V: Into<Value>,
{
    let mut out = String::new();
    for (column, value) in data {
        let column = ColumnRef::parse(column.as_ref())?;
        if !out.is_empty() {
            out.push_str(", ");
        }
        column.write_sql(&mut out);
        out.push_str(" = ");
        value.into().write_sql(&mut out);
    }
    if out.is_empty() {
        return Err(SpectromError::data("update payload is empty"));
    }
    Ok(out)
}
