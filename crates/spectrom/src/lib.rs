//! # spectrom
//!
//! Data-access, content-query and settings helpers for SpectrOM plugin
//! services.
//!
//! ## Features
//!
//! - **Fluent statement builder**: SELECT/JOIN/WHERE/ORDER/LIMIT accumulated
//!   through chained calls, with nested WHERE groups, serialized into one
//!   value-escaped statement per terminal operation
//! - **Active-record base model**: single-row lookup and update-by-key over
//!   an abstract database handle
//! - **Strict column checking**: optional validation of referenced columns
//!   against the table's introspected schema
//! - **Content-query assembly**: builds the parameter mapping handed to the
//!   CMS's native content query
//! - **Settings pages**: serde-described sections and fields rendered as
//!   escaped form markup, validated by a rule-based form validator
//!
//! ## Query builder
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
//!
//! Execution is synchronous and request-scoped: one autonomous statement
//! per terminal call, no retries, errors propagate directly to the caller.

pub mod builder;
pub mod content;
pub mod error;
pub mod handle;
pub mod ident;
pub mod model;
pub mod row;
pub mod settings;
pub mod value;

#[cfg(feature = "validate")]
pub mod validation;

pub use builder::{CmpOp, JoinKind, Joiner, OrderDir, Predicate, QueryBuilder};
pub use content::{ContentQuery, DEFAULT_POSTS_PER_PAGE};
pub use error::{SpectromError, SpectromResult};
pub use handle::{DbHandle, table_columns};
pub use ident::ColumnRef;
pub use model::BaseModel;
pub use row::{FromRow, FromValue, Row};
pub use settings::{
    Field, FieldType, Section, SelectOption, SettingsConfig, render_field, render_section_header,
};
pub use value::{Value, escape_str};

#[cfg(feature = "validate")]
pub use settings::validate_input;

#[cfg(feature = "validate")]
pub use validation::{Rule, Validator};

#[cfg(test)]
mod testutil;
