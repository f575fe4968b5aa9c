//! Row filters and the select builder for table reads.
//!
//! Filters render to the store's `column=op.value` query-string grammar; the
//! builder collects filters, ordering and a limit and performs the fetch.

use serde::de::DeserializeOwned;

use crate::client::{StoreClient, ACCEPT_SINGLE_OBJECT};
use crate::error::{StoreError, StoreResult};

/// Sort direction for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

impl Order {
    pub fn as_str(&self) -> &'static str {
        match self {
            Order::Ascending => "asc",
            Order::Descending => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterOp {
    Eq,
    Gte,
    Lte,
    Lt,
    Ilike,
}

impl FilterOp {
    fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Gte => "gte",
            FilterOp::Lte => "lte",
            FilterOp::Lt => "lt",
            FilterOp::Ilike => "ilike",
        }
    }
}

/// A single column predicate.
#[derive(Debug, Clone)]
pub struct Filter {
    column: String,
    op: FilterOp,
    value: String,
}

impl Filter {
    pub fn eq(column: &str, value: impl ToString) -> Self {
        Self::new(column, FilterOp::Eq, value)
    }

    pub fn gte(column: &str, value: impl ToString) -> Self {
        Self::new(column, FilterOp::Gte, value)
    }

    pub fn lte(column: &str, value: impl ToString) -> Self {
        Self::new(column, FilterOp::Lte, value)
    }

    pub fn lt(column: &str, value: impl ToString) -> Self {
        Self::new(column, FilterOp::Lt, value)
    }

    /// Case-insensitive substring match. The term is wrapped in wildcards
    /// here so callers pass the bare search text.
    pub fn contains(column: &str, term: &str) -> Self {
        Self::new(column, FilterOp::Ilike, format!("*{term}*"))
    }

    fn new(column: &str, op: FilterOp, value: impl ToString) -> Self {
        Self {
            column: column.to_string(),
            op,
            value: value.to_string(),
        }
    }

    /// Render as a `key=value` query pair.
    pub(crate) fn to_query_pair(&self) -> (String, String) {
        (
            self.column.clone(),
            format!("{}.{}", self.op.as_str(), self.value),
        )
    }

    /// Render as one clause of an `or=(...)` group.
    fn to_or_clause(&self) -> String {
        format!("{}.{}.{}", self.column, self.op.as_str(), self.value)
    }
}

/// Builder for a table read: columns, predicates, ordering, limit.
pub struct SelectBuilder<'a> {
    client: &'a StoreClient,
    table: String,
    columns: String,
    filters: Vec<Filter>,
    any_of: Option<Vec<Filter>>,
    order: Option<(String, Order)>,
    limit: Option<u32>,
}

impl<'a> SelectBuilder<'a> {
    pub(crate) fn new(client: &'a StoreClient, table: &str) -> Self {
        Self {
            client,
            table: table.to_string(),
            columns: "*".to_string(),
            filters: Vec::new(),
            any_of: None,
            order: None,
            limit: None,
        }
    }

    /// Restrict the returned columns (defaults to `*`).
    pub fn columns(mut self, columns: &str) -> Self {
        self.columns = columns.to_string();
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Match rows satisfying at least one of the given predicates.
    pub fn any_of(mut self, filters: Vec<Filter>) -> Self {
        self.any_of = Some(filters);
        self
    }

    pub fn order(mut self, column: &str, direction: Order) -> Self {
        self.order = Some((column.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Fetch all matching rows.
    pub async fn fetch<T: DeserializeOwned>(self) -> StoreResult<Vec<T>> {
        let url = self.client.rest_url(&self.table);
        let request = self
            .client
            .authed(self.client.http().get(url))
            .query(&self.query_pairs());

        let response = self.client.send_checked(request).await?;
        Ok(response.json::<Vec<T>>().await?)
    }

    /// Fetch exactly one row; zero rows map to [`StoreError::NotFound`].
    pub async fn fetch_one<T: DeserializeOwned>(self) -> StoreResult<T> {
        let url = self.client.rest_url(&self.table);
        let request = self
            .client
            .authed(self.client.http().get(url))
            .header(reqwest::header::ACCEPT, ACCEPT_SINGLE_OBJECT)
            .query(&self.query_pairs());

        let response = self.client.send_checked(request).await?;
        Ok(response.json::<T>().await?)
    }

    /// The rendered query pairs, in a fixed order: select, filters, or
    /// group, ordering, limit.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), self.columns.clone())];

        for filter in &self.filters {
            pairs.push(filter.to_query_pair());
        }

        if let Some(any_of) = &self.any_of {
            let clauses = any_of
                .iter()
                .map(Filter::to_or_clause)
                .collect::<Vec<_>>()
                .join(",");
            pairs.push(("or".to_string(), format!("({clauses})")));
        }

        if let Some((column, direction)) = &self.order {
            pairs.push((
                "order".to_string(),
                format!("{column}.{}", direction.as_str()),
            ));
        }

        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }

        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::StoreClient;

    fn test_client() -> StoreClient {
        StoreClient::from_parts("http://localhost:54321", "anon-key", None)
    }

    fn pair(pairs: &[(String, String)], key: &str) -> Option<String> {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    #[test]
    fn renders_filters_order_and_limit() {
        let client = test_client();
        let builder = SelectBuilder::new(&client, "events")
            .filter(Filter::gte("date", "2025-01-01"))
            .filter(Filter::eq("is_featured", true))
            .order("date", Order::Ascending)
            .limit(5);

        let pairs = builder.query_pairs();
        assert_eq!(pair(&pairs, "select").as_deref(), Some("*"));
        assert_eq!(pair(&pairs, "date").as_deref(), Some("gte.2025-01-01"));
        assert_eq!(pair(&pairs, "is_featured").as_deref(), Some("eq.true"));
        assert_eq!(pair(&pairs, "order").as_deref(), Some("date.asc"));
        assert_eq!(pair(&pairs, "limit").as_deref(), Some("5"));
    }

    #[test]
    fn renders_or_group_with_wildcards() {
        let client = test_client();
        let builder = SelectBuilder::new(&client, "events").any_of(vec![
            Filter::contains("title", "youth"),
            Filter::contains("description", "youth"),
            Filter::contains("location", "youth"),
        ]);

        let pairs = builder.query_pairs();
        assert_eq!(
            pair(&pairs, "or").as_deref(),
            Some("(title.ilike.*youth*,description.ilike.*youth*,location.ilike.*youth*)")
        );
    }

    #[test]
    fn descending_order_renders_desc_suffix() {
        let client = test_client();
        let builder =
            SelectBuilder::new(&client, "announcements").order("created_at", Order::Descending);

        let pairs = builder.query_pairs();
        assert_eq!(pair(&pairs, "order").as_deref(), Some("created_at.desc"));
    }
}
