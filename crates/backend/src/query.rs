//! REST query builder.
//!
//! Filters render as query parameters in the backend's REST dialect:
//! `column=eq.value`, `order=column.desc`, `limit=20`. Values are URL encoded
//! by the HTTP client when the request is sent.

use std::fmt::Display;

/// A read against one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    table: String,
    params: Vec<(String, String)>,
    order: Vec<String>,
}

impl Query {
    /// Start a query against `table`, selecting every column.
    #[must_use]
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            params: Vec::new(),
            order: Vec::new(),
        }
    }

    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Choose columns, including embedded relations such as `*,order_items(*)`.
    #[must_use]
    pub fn select(self, columns: &str) -> Self {
        self.set("select", columns.to_string())
    }

    #[must_use]
    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "eq", value)
    }

    #[must_use]
    pub fn neq(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "neq", value)
    }

    #[must_use]
    pub fn gte(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "gte", value)
    }

    /// Case-insensitive substring match.
    #[must_use]
    pub fn ilike(self, column: &str, term: &str) -> Self {
        let term = sanitize_term(term);
        self.filter(column, "ilike", format!("*{term}*"))
    }

    /// Case-insensitive substring match on any of `columns`.
    #[must_use]
    pub fn ilike_any(mut self, columns: &[&str], term: &str) -> Self {
        let term = sanitize_term(term);
        let clauses = columns
            .iter()
            .map(|column| format!("{column}.ilike.*{term}*"))
            .collect::<Vec<_>>()
            .join(",");
        self.params.push(("or".to_string(), format!("({clauses})")));
        self
    }

    /// Match any of `values`. An empty list matches nothing.
    #[must_use]
    pub fn is_in<V: Display>(self, column: &str, values: impl IntoIterator<Item = V>) -> Self {
        let list = values
            .into_iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.filter(column, "in", format!("({list})"))
    }

    #[must_use]
    pub fn is_null(self, column: &str) -> Self {
        self.filter(column, "is", "null")
    }

    /// Add an ordering. Later calls break ties of earlier ones.
    #[must_use]
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.order.push(format!("{column}.{direction}"));
        self
    }

    #[must_use]
    pub fn limit(self, limit: u32) -> Self {
        self.set("limit", limit.to_string())
    }

    #[must_use]
    pub fn offset(self, offset: u32) -> Self {
        self.set("offset", offset.to_string())
    }

    /// One-based page of `per_page` rows.
    #[must_use]
    pub fn page(self, page: u32, per_page: u32) -> Self {
        let page = page.max(1);
        self.limit(per_page)
            .offset((page - 1).saturating_mul(per_page))
    }

    /// Parameters in the order they will be sent.
    #[must_use]
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = self.params.clone();
        if !self.order.is_empty() {
            params.push(("order".to_string(), self.order.join(",")));
        }
        params
    }

    /// The same query without paging or ordering, for counts.
    #[must_use]
    pub(crate) fn without_paging(&self) -> Self {
        Self {
            table: self.table.clone(),
            params: self
                .params
                .iter()
                .filter(|(key, _)| !matches!(key.as_str(), "limit" | "offset" | "select"))
                .cloned()
                .collect(),
            order: Vec::new(),
        }
    }

    /// Encoded query string, used for logging.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.params()
            .iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn filter(mut self, column: &str, operator: &str, value: impl Display) -> Self {
        self.params
            .push((column.to_string(), format!("{operator}.{value}")));
        self
    }

    fn set(mut self, key: &str, value: String) -> Self {
        self.params.retain(|(existing, _)| existing != key);
        self.params.push((key.to_string(), value));
        self
    }
}

/// Turn characters that carry meaning in filter expressions into word
/// breaks, collapsing runs of whitespace.
fn sanitize_term(term: &str) -> String {
    let is_break =
        |c: char| c.is_whitespace() || matches!(c, ',' | '(' | ')' | '*' | '%' | '"' | '\\' | ':');
    term.split(is_break)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
