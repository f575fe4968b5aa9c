//! The configured handle to the hosted backend.
//!
//! One `StoreClient` is shared by every manager in the process. It carries
//! the project URL, the public API key, and the signed-in user's bearer
//! token; the auth layer swaps the token on every session transition so all
//! table and storage calls run with the caller's credentials.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use ayf_config::RemoteConfig;

use crate::auth_api::AuthHandle;
use crate::error::{StoreError, StoreResult};
use crate::query::{Filter, SelectBuilder};
use crate::storage::BucketHandle;

pub(crate) const ACCEPT_SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

const API_KEY_HEADER: &str = "apikey";

#[derive(Clone)]
pub struct StoreClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    service_role_key: Option<String>,
    bearer: RwLock<Option<String>>,
}

impl StoreClient {
    pub fn new(config: &RemoteConfig) -> StoreResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self::with_http(
            http,
            &config.url,
            &config.anon_key,
            config.service_role_key.clone(),
        ))
    }

    /// Build a client from raw parts with a default HTTP client. Intended
    /// for tests and tooling.
    pub fn from_parts(base_url: &str, anon_key: &str, service_role_key: Option<String>) -> Self {
        Self::with_http(
            reqwest::Client::new(),
            base_url,
            anon_key,
            service_role_key,
        )
    }

    fn with_http(
        http: reqwest::Client,
        base_url: &str,
        anon_key: &str,
        service_role_key: Option<String>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                http,
                base_url: base_url.trim_end_matches('/').to_string(),
                anon_key: anon_key.to_string(),
                service_role_key,
                bearer: RwLock::new(None),
            }),
        }
    }

    /// Install or clear the signed-in user's access token. All subsequent
    /// table, storage and rpc calls carry it.
    pub fn set_bearer(&self, token: Option<String>) {
        let mut bearer = self.inner.bearer.write().expect("bearer lock poisoned");
        *bearer = token;
    }

    pub fn table(&self, name: &str) -> TableHandle<'_> {
        TableHandle {
            client: self,
            table: name.to_string(),
        }
    }

    pub fn bucket(&self, name: &str) -> BucketHandle<'_> {
        BucketHandle::new(self, name)
    }

    pub fn auth(&self) -> AuthHandle<'_> {
        AuthHandle::new(self)
    }

    /// Invoke a named server-side procedure with JSON arguments.
    pub async fn rpc<T: DeserializeOwned>(
        &self,
        function: &str,
        args: serde_json::Value,
    ) -> StoreResult<T> {
        let url = format!("{}/rest/v1/rpc/{function}", self.inner.base_url);
        debug!(function, "invoking remote procedure");

        let request = self.authed(self.inner.http.post(url)).json(&args);
        let response = self.send_checked(request).await?;
        Ok(response.json::<T>().await?)
    }

    /// Invoke a procedure that returns nothing.
    pub async fn rpc_unit(&self, function: &str, args: serde_json::Value) -> StoreResult<()> {
        let url = format!("{}/rest/v1/rpc/{function}", self.inner.base_url);
        debug!(function, "invoking remote procedure");

        let request = self.authed(self.inner.http.post(url)).json(&args);
        self.send_checked(request).await?;
        Ok(())
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub(crate) fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.inner.base_url)
    }

    /// Attach the public key and the current bearer token (falling back to
    /// the public key when no user is signed in).
    pub(crate) fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = {
            let guard = self.inner.bearer.read().expect("bearer lock poisoned");
            guard.clone()
        };
        let token = bearer.unwrap_or_else(|| self.inner.anon_key.clone());

        request
            .header(API_KEY_HEADER, &self.inner.anon_key)
            .header(AUTHORIZATION, format!("Bearer {token}"))
    }

    /// Attach the service role key. Fails when the deployment does not
    /// carry one; only the operator console should.
    pub(crate) fn admin_authed(&self, request: RequestBuilder) -> StoreResult<RequestBuilder> {
        let key = self
            .inner
            .service_role_key
            .as_deref()
            .ok_or(StoreError::MissingServiceKey)?;

        Ok(request
            .header(API_KEY_HEADER, key)
            .header(AUTHORIZATION, format!("Bearer {key}")))
    }

    /// Send a request and convert non-success statuses into store errors.
    pub(crate) async fn send_checked(&self, request: RequestBuilder) -> StoreResult<Response> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        // A single-object read with zero matching rows comes back as 406.
        if status == StatusCode::NOT_ACCEPTABLE {
            return Err(StoreError::NotFound);
        }

        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Api {
            status: status.as_u16(),
            message: extract_error_message(&body),
        })
    }
}

/// Pull the human-readable message out of an error body. The table API and
/// the auth API use different field names.
fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "msg", "error_description", "error"] {
            if let Some(message) = value.get(key).and_then(|v| v.as_str()) {
                return message.to_string();
            }
        }
    }
    body.to_string()
}

/// Handle for one remote table.
pub struct TableHandle<'a> {
    client: &'a StoreClient,
    table: String,
}

impl<'a> TableHandle<'a> {
    pub fn select(&self) -> SelectBuilder<'a> {
        SelectBuilder::new(self.client, &self.table)
    }

    /// Insert one row and return the stored representation.
    pub async fn insert<T: DeserializeOwned>(
        &self,
        row: &(impl Serialize + ?Sized),
    ) -> StoreResult<T> {
        let url = self.client.rest_url(&self.table);
        let request = self
            .client
            .authed(self.client.http().post(url))
            .header("Prefer", "return=representation")
            .json(row);

        let response = self.client.send_checked(request).await?;
        let mut rows = response.json::<Vec<T>>().await?;
        if rows.is_empty() {
            return Err(StoreError::NotFound);
        }
        Ok(rows.remove(0))
    }

    /// Update matching rows and return the first updated representation;
    /// zero matches map to [`StoreError::NotFound`].
    pub async fn update<T: DeserializeOwned>(
        &self,
        filters: Vec<Filter>,
        changes: &(impl Serialize + ?Sized),
    ) -> StoreResult<T> {
        let url = self.client.rest_url(&self.table);
        let request = self
            .client
            .authed(self.client.http().patch(url))
            .header("Prefer", "return=representation")
            .query(&Self::filter_pairs(&filters))
            .json(changes);

        let response = self.client.send_checked(request).await?;
        let mut rows = response.json::<Vec<T>>().await?;
        if rows.is_empty() {
            return Err(StoreError::NotFound);
        }
        Ok(rows.remove(0))
    }

    /// Update matching rows without asking for the representation back.
    pub async fn update_minimal(
        &self,
        filters: Vec<Filter>,
        changes: &(impl Serialize + ?Sized),
    ) -> StoreResult<()> {
        let url = self.client.rest_url(&self.table);
        let request = self
            .client
            .authed(self.client.http().patch(url))
            .header("Prefer", "return=minimal")
            .query(&Self::filter_pairs(&filters))
            .json(changes);

        self.client.send_checked(request).await?;
        Ok(())
    }

    pub async fn delete(&self, filters: Vec<Filter>) -> StoreResult<()> {
        let url = self.client.rest_url(&self.table);
        let request = self
            .client
            .authed(self.client.http().delete(url))
            .query(&Self::filter_pairs(&filters));

        self.client.send_checked(request).await?;
        Ok(())
    }

    /// Exact row count via a HEAD probe; no row data crosses the wire.
    pub async fn count(&self, filters: Vec<Filter>) -> StoreResult<u64> {
        let url = self.client.rest_url(&self.table);
        let request = self
            .client
            .authed(self.client.http().head(url))
            .header("Prefer", "count=exact")
            .query(&Self::filter_pairs(&filters));

        let response = self.client.send_checked(request).await?;
        let range = response
            .headers()
            .get("content-range")
            .and_then(|value| value.to_str().ok())
            .ok_or(StoreError::MalformedCount)?;

        // The header reads like `0-24/57` (or `*/57` for a pure count).
        range
            .rsplit('/')
            .next()
            .and_then(|total| total.parse::<u64>().ok())
            .ok_or(StoreError::MalformedCount)
    }

    fn filter_pairs(filters: &[Filter]) -> Vec<(String, String)> {
        filters.iter().map(Filter::to_query_pair).collect()
    }
}
