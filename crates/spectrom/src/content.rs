//! Content query parameter assembly.
//!
//! [`ContentQuery`] accumulates a parameter mapping (post type, ordering,
//! pagination, sticky-item suppression) and hands it off as a
//! `serde_json::Map` for the CMS's native content query to consume. Query
//! execution, pagination mechanics and sticky-item logic stay on the CMS
//! side.

use crate::builder::OrderDir;
use crate::error::{SpectromError, SpectromResult};
use serde_json::{Map, Value as JsonValue};

/// Page size used when none was configured.
pub const DEFAULT_POSTS_PER_PAGE: u64 = 10;

/// Ordering fields accepted by the CMS query.
const ORDER_FIELDS: &[&str] = &[
    "none",
    "ID",
    "author",
    "title",
    "name",
    "type",
    "date",
    "modified",
    "parent",
    "rand",
    "comment_count",
    "menu_order",
    "meta_value",
    "meta_value_num",
    "post__in",
];

/// Accumulator for CMS content-query parameters.
#[derive(Debug, Clone, Default)]
pub struct ContentQuery {
    post_type: String,
    page: u64,
    posts_per_page: u64,
    args: Map<String, JsonValue>,
}

impl ContentQuery {
    /// Create a query accumulator for the given post type.
    pub fn new(post_type: &str) -> Self {
        Self {
            post_type: post_type.to_string(),
            ..Self::default()
        }
    }

    /// Change the post type for queries built with this instance.
    pub fn post_type(&mut self, post_type: &str) -> &mut Self {
        self.post_type = post_type.to_string();
        self
    }

    /// The page size to use, falling back to the default when unset.
    pub fn posts_per_page(&mut self) -> u64 {
        if self.posts_per_page == 0 {
            self.posts_per_page = DEFAULT_POSTS_PER_PAGE;
        }
        self.posts_per_page
    }

    /// Set the page size; `None` restores the default.
    pub fn set_posts_per_page(&mut self, posts: Option<u64>) -> &mut Self {
        self.posts_per_page = posts.unwrap_or(DEFAULT_POSTS_PER_PAGE);
        self
    }

    /// Set the page number to use for queries.
    pub fn set_page(&mut self, page: u64) -> &mut Self {
        self.page = page;
        self
    }

    /// Ignore sticky items when querying.
    pub fn ignore_sticky(&mut self, ignore: bool) -> &mut Self {
        self.args
            .insert("ignore_sticky".to_string(), JsonValue::from(ignore));
        self
    }

    /// Skip a number of items. Careful, this can interfere with pagination.
    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.args
            .insert("offset".to_string(), JsonValue::from(offset));
        self
    }

    /// Order results by one of the allowed fields, ASC or DESC.
    pub fn order_by(&mut self, field: &str, direction: &str) -> SpectromResult<&mut Self> {
        if !ORDER_FIELDS.contains(&field) {
            return Err(SpectromError::input(format!(
                "order_by value '{field}' not recognized"
            )));
        }
        let direction: OrderDir = direction.parse()?;
        self.args
            .insert("orderby".to_string(), JsonValue::from(field));
        self.args
            .insert("order".to_string(), JsonValue::from(direction.as_str()));
        Ok(self)
    }

    /// Adopt the current request's page variable for pagination, defaulting
    /// to the first page, and lock in a page size.
    pub fn add_pagination(&mut self, current_page: Option<u64>) -> &mut Self {
        self.posts_per_page();
        self.page = match current_page {
            Some(page) if page > 0 => page,
            _ => 1,
        };
        self
    }

    /// Turn off found-rows counting in the query the CMS is going to build.
    pub fn no_found_rows(&mut self) -> &mut Self {
        self.args
            .insert("no_found_rows".to_string(), JsonValue::from(true));
        self
    }

    /// Assemble the final parameter mapping.
    ///
    /// Caller-supplied `extra` arguments are merged in first, so the
    /// accumulated values win on conflict. Pagination parameters are only
    /// injected when both a page and a page size are set.
    pub fn build_args(&self, extra: Map<String, JsonValue>) -> Map<String, JsonValue> {
        let mut merged = extra;
        for (key, value) in &self.args {
            merged.insert(key.clone(), value.clone());
        }
        merged.insert(
            "post_type".to_string(),
            JsonValue::from(self.post_type.clone()),
        );
        if self.page != 0 && self.posts_per_page != 0 {
            merged.insert("paged".to_string(), JsonValue::from(self.page));
            merged.insert(
                "posts_per_page".to_string(),
                JsonValue::from(self.posts_per_page),
            );
        }
        merged
    }
}
