//! OData query construction
//!
//! Builds the `$filter` / `$orderby` / `$expand` / `$top` / `$skip` /
//! `$count` query strings the backend understands, and decodes the
//! `{"@odata.count": n, "value": [...]}` envelope it answers with.

use serde::Deserialize;
use std::fmt;

use crate::models::{Paged, Pagination};

/// Sort direction for `$orderby`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => write!(f, "asc"),
            Direction::Desc => write!(f, "desc"),
        }
    }
}

/// OData query options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ODataQuery {
    filters: Vec<String>,
    order_by: Vec<String>,
    expand: Vec<String>,
    top: Option<u64>,
    skip: Option<u64>,
    count: bool,
}

impl ODataQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter expression; multiple filters are joined with `and`
    pub fn filter(mut self, expr: impl Into<String>) -> Self {
        let expr = expr.into();
        if !expr.trim().is_empty() {
            self.filters.push(expr);
        }
        self
    }

    /// Add a filter only when one is given
    pub fn filter_opt(self, expr: Option<String>) -> Self {
        match expr {
            Some(expr) => self.filter(expr),
            None => self,
        }
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by.push(format!("{} {}", field, direction));
        self
    }

    pub fn expand(mut self, navigation: &str) -> Self {
        self.expand.push(navigation.to_string());
        self
    }

    pub fn top(mut self, top: u64) -> Self {
        self.top = Some(top);
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Ask for `@odata.count`
    pub fn count(mut self) -> Self {
        self.count = true;
        self
    }

    /// `$top`, `$skip` and `$count` for one page of a listing
    pub fn page(self, pagination: &Pagination) -> Self {
        self.top(u64::from(pagination.limit))
            .skip(pagination.skip())
            .count()
    }

    /// Combined `$filter` expression, if any
    pub fn filter_expr(&self) -> Option<String> {
        match self.filters.len() {
            0 => None,
            1 => Some(self.filters[0].clone()),
            _ => Some(
                self.filters
                    .iter()
                    .map(|f| format!("({})", f))
                    .collect::<Vec<_>>()
                    .join(" and "),
            ),
        }
    }

    /// Render as a percent-encoded query string (no leading `?`)
    pub fn to_query_string(&self) -> String {
        let mut parts: Vec<(&str, String)> = Vec::new();

        if let Some(filter) = self.filter_expr() {
            parts.push(("$filter", filter));
        }
        if !self.order_by.is_empty() {
            parts.push(("$orderby", self.order_by.join(",")));
        }
        if !self.expand.is_empty() {
            parts.push(("$expand", self.expand.join(",")));
        }
        if let Some(top) = self.top {
            parts.push(("$top", top.to_string()));
        }
        if let Some(skip) = self.skip {
            parts.push(("$skip", skip.to_string()));
        }
        if self.count {
            parts.push(("$count", "true".to_string()));
        }

        parts
            .into_iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(&value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Append the query string to a URL
    pub fn apply(&self, url: &str) -> String {
        let query = self.to_query_string();
        if query.is_empty() {
            url.to_string()
        } else {
            format!("{}?{}", url, query)
        }
    }
}

/// Quote a string literal, doubling embedded single quotes
pub fn literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// `Field eq value` for numeric or boolean values
pub fn eq(field: &str, value: impl fmt::Display) -> String {
    format!("{} eq {}", field, value)
}

/// `Field eq 'value'`
pub fn eq_str(field: &str, value: &str) -> String {
    format!("{} eq {}", field, literal(value))
}

/// Case-insensitive substring match
pub fn contains(field: &str, needle: &str) -> String {
    format!("contains(tolower({}),{})", field, literal(&needle.to_lowercase()))
}

/// Keyword matched against any of the fields, or `None` for a blank keyword
pub fn keyword_filter(fields: &[&str], keyword: &str) -> Option<String> {
    let keyword = keyword.trim();
    if keyword.is_empty() || fields.is_empty() {
        return None;
    }
    let clauses: Vec<String> = fields.iter().map(|f| contains(f, keyword)).collect();
    Some(if clauses.len() == 1 {
        clauses.into_iter().next().unwrap_or_default()
    } else {
        format!("({})", clauses.join(" or "))
    })
}

/// OData collection envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ODataPage<T> {
    #[serde(rename = "@odata.count", default)]
    pub count: Option<u64>,
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

impl<T> ODataPage<T> {
    /// Attach the reported count to the requested page.
    ///
    /// When the backend omits `@odata.count` the total is inferred from the
    /// items seen so far.
    pub fn into_paged(self, requested: Pagination) -> Paged<T> {
        let total = self
            .count
            .unwrap_or_else(|| requested.skip() + self.value.len() as u64);
        Paged::new(self.value, requested.with_total(total))
    }
}
