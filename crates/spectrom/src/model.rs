//! Active-record style base model over a database handle.
//!
//! A [`BaseModel`] owns the handle reference, the target table name and an
//! optional default key, and exposes single-row lookup by key plus a
//! minimal update-by-key. Rows come back as raw [`Row`] values; mapping
//! onto structs goes through [`FromRow`].

use crate::builder::{QueryBuilder, render_set};
use crate::error::{SpectromError, SpectromResult};
use crate::handle::DbHandle;
use crate::ident::ColumnRef;
use crate::row::{FromRow, Row};
use crate::value::Value;
use std::fmt::Write;

/// Single-row lookup and update-by-key over one table.
#[derive(Debug)]
pub struct BaseModel<'h, H> {
    db: &'h H,
    table: String,
    key: Option<String>,
    last_sql: Option<String>,
}

impl<'h, H: DbHandle> BaseModel<'h, H> {
    /// Create a model for `table` (unprefixed). An empty table name is a
    /// configuration error.
    pub fn new(db: &'h H, table: &str) -> SpectromResult<Self> {
        if table.trim().is_empty() {
            return Err(SpectromError::config(
                "need to specify table name for model",
            ));
        }
        Ok(Self {
            db,
            table: table.to_string(),
            key: None,
            last_sql: None,
        })
    }

    /// Set the default key column used by [`get`] and [`update_by_key`].
    ///
    /// [`get`]: BaseModel::get
    /// [`update_by_key`]: BaseModel::update_by_key
    pub fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    /// The model's table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The last statement this model constructed.
    pub fn last_sql(&self) -> Option<&str> {
        self.last_sql.as_deref()
    }

    /// Hand out a [`QueryBuilder`] over the same handle and table.
    pub fn builder(&self) -> QueryBuilder<'h, H> {
        QueryBuilder::new(self.db, &self.table)
    }

    /// Look up a single row by the default key. Errors if no default key
    /// was configured.
    pub fn get(&mut self, id: impl Into<Value>) -> SpectromResult<Option<Row>> {
        let key = self.default_key()?;
        self.lookup(id.into(), &key, &[])
    }

    /// Look up a single row by an explicit key column.
    pub fn find(&mut self, id: impl Into<Value>, key: &str) -> SpectromResult<Option<Row>> {
        self.lookup(id.into(), key, &[])
    }

    /// Look up a single row by key with extra AND-ed raw conditions.
    /// `key` falls back to the default key when `None`.
    pub fn get_where(
        &mut self,
        id: impl Into<Value>,
        key: Option<&str>,
        extra: &[&str],
    ) -> SpectromResult<Option<Row>> {
        let key = match key {
            Some(key) => key.to_string(),
            None => self.default_key()?,
        };
        self.lookup(id.into(), &key, extra)
    }

    /// Look up a single row by the default key and map it onto `T`.
    pub fn get_as<T: FromRow>(&mut self, id: impl Into<Value>) -> SpectromResult<Option<T>> {
        match self.get(id)? {
            Some(row) => Ok(Some(T::from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Update a single row by key. `key` falls back to the default key;
    /// an empty `data` map is a data error. Returns the number of rows
    /// updated.
    pub fn update_by_key<I, S, V>(
        &mut self,
        id: impl Into<Value>,
        key: Option<&str>,
        data: I,
    ) -> SpectromResult<u64>
    where
        I: IntoIterator<Item = (S, V)>,
        S: AsRef<str>,
        V: Into<Value>,
    {
        let key = match key {
            Some(key) => key.to_string(),
            None => self.default_key()?,
        };
        let key = ColumnRef::parse(&key)?;
        let set_sql = render_set(data)?;

        let mut sql = format!(
            "UPDATE `{}{}` SET {} WHERE {} = ",
            self.db.prefix(),
            self.table,
            set_sql,
            key.to_sql()
        );
        let _ = write!(sql, "{}", id.into().render());
        sql.push_str(" LIMIT 1");

        tracing::debug!(target: "spectrom.sql", sql = %sql, "update by key");
        self.last_sql = Some(sql.clone());
        self.db.execute(&sql)
    }

    fn default_key(&self) -> SpectromResult<String> {
        self.key
            .clone()
            .ok_or_else(|| SpectromError::config("no default key specified for this model"))
    }

    fn lookup(&mut self, id: Value, key: &str, extra: &[&str]) -> SpectromResult<Option<Row>> {
        let key = ColumnRef::parse(key)?;
        let mut sql = format!(
            "SELECT * FROM `{}{}` WHERE {} = {}",
            self.db.prefix(),
            self.table,
            key.to_sql(),
            id.render()
        );
        for condition in extra {
            let _ = write!(sql, " AND {condition}");
        }
        sql.push_str(" LIMIT 1");

        tracing::debug!(target: "spectrom.sql", sql = %sql, "single-row lookup");
        self.last_sql = Some(sql.clone());
        self.db.get_row(&sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockDb;

    #[test]
    fn new_rejects_empty_table() {
        let db = MockDb::new("wp_");
        assert!(BaseModel::new(&db, "").unwrap_err().is_config());
        assert!(BaseModel::new(&db, "   ").unwrap_err().is_config());
    }

    #[test]
    fn get_requires_a_default_key() {
        let db = MockDb::new("wp_");
        let mut model = BaseModel::new(&db, "users").unwrap();
        assert!(model.get(1).unwrap_err().is_config());
        assert!(db.executed().is_empty());
    }

    #[test]
    fn get_renders_key_lookup() {
        let db = MockDb::new("wp_");
        let mut model = BaseModel::new(&db, "users").unwrap().with_key("id");
        model.get(42).unwrap();
        assert_eq!(
            db.last_executed().unwrap(),
            "SELECT * FROM `wp_users` WHERE `id` = 42 LIMIT 1"
        );
        assert_eq!(model.last_sql(), db.last_executed().as_deref());
    }

    #[test]
    fn find_uses_the_explicit_key_and_escapes_the_id() {
        let db = MockDb::new("wp_");
        let mut model = BaseModel::new(&db, "users").unwrap();
        model.find("bob's", "login").unwrap();
        assert_eq!(
            db.last_executed().unwrap(),
            "SELECT * FROM `wp_users` WHERE `login` = 'bob''s' LIMIT 1"
        );
    }

    #[test]
    fn get_where_appends_extra_conditions() {
        let db = MockDb::new("wp_");
        let mut model = BaseModel::new(&db, "users").unwrap().with_key("id");
        model
            .get_where(7, None, &["`active` = 1", "`role` = 'editor'"])
            .unwrap();
        assert_eq!(
            db.last_executed().unwrap(),
            "SELECT * FROM `wp_users` WHERE `id` = 7 AND `active` = 1 AND `role` = 'editor' LIMIT 1"
        );
    }

    #[test]
    fn update_by_key_renders_set_list() {
        let mut db = MockDb::new("wp_");
        db.affected = 1;
        let mut model = BaseModel::new(&db, "users").unwrap().with_key("id");
        let affected = model
            .update_by_key(7, None, [("name", "Ada"), ("role", "admin")])
            .unwrap();
        assert_eq!(affected, 1);
        assert_eq!(
            db.last_executed().unwrap(),
            "UPDATE `wp_users` SET `name` = 'Ada', `role` = 'admin' WHERE `id` = 7 LIMIT 1"
        );
    }

    #[test]
    fn update_by_key_with_empty_data_errors() {
        let db = MockDb::new("wp_");
        let mut model = BaseModel::new(&db, "users").unwrap().with_key("id");
        let err = model
            .update_by_key(7, None, Vec::<(&str, Value)>::new())
            .unwrap_err();
        assert!(matches!(err, SpectromError::Data(_)));
        assert!(db.executed().is_empty());
    }

    #[test]
    fn update_by_key_without_any_key_errors() {
        let db = MockDb::new("wp_");
        let mut model = BaseModel::new(&db, "users").unwrap();
        assert!(model
            .update_by_key(7, None, [("a", 1)])
            .unwrap_err()
            .is_config());
    }

    #[test]
    fn builder_targets_the_model_table() {
        let db = MockDb::new("wp_");
        let model = BaseModel::new(&db, "users").unwrap();
        let mut qb = model.builder();
        qb.run().unwrap();
        assert_eq!(
            db.last_executed().unwrap(),
            "SELECT * FROM `wp_users` LIMIT 1"
        );
    }
}
