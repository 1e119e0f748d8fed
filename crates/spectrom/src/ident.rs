//! Column reference normalization and backtick quoting.
//!
//! A [`ColumnRef`] is a column identifier optionally qualified by a table
//! prefix (`table.column`). Each dot-separated segment is stripped of any
//! surrounding backticks and re-quoted independently, so `table.column`
//! renders as `` `table`.`column` ``.

use crate::error::{SpectromError, SpectromResult};

/// A normalized column reference, optionally table-qualified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    segments: Vec<String>,
}

impl ColumnRef {
    /// Parse a column reference in `column` or `table.column` notation.
    ///
    /// Surrounding backticks on either segment are tolerated and stripped.
    /// Empty segments, embedded backticks and NUL characters are rejected.
    pub fn parse(name: &str) -> SpectromResult<Self> {
        if name.contains('\0') {
            return Err(SpectromError::input(
                "column reference cannot contain NUL character",
            ));
        }

        let raw: Vec<&str> = match name.split_once('.') {
            Some((table, column)) => vec![table, column],
            None => vec![name],
        };

        let mut segments = Vec::with_capacity(raw.len());
        for part in raw {
            let part = part.trim().trim_matches('`');
            if part.is_empty() {
                return Err(SpectromError::input(format!(
                    "empty segment in column reference: '{name}'"
                )));
            }
            if part.contains('`') {
                return Err(SpectromError::input(format!(
                    "backtick inside column reference segment: '{name}'"
                )));
            }
            segments.push(part.to_string());
        }

        Ok(Self { segments })
    }

    /// Whether the reference carries a table qualifier.
    pub fn is_qualified(&self) -> bool {
        self.segments.len() > 1
    }

    /// The bare column portion (last segment).
    pub fn column(&self) -> &str {
        self.segments
            .last()
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Render the reference with each segment backtick-quoted.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push('`');
            out.push_str(segment);
            out.push('`');
        }
    }
}
