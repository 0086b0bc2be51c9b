//! HTTP client for the backend's REST, RPC, auth and storage endpoints.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CONTENT_RANGE, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::auth::AccessToken;
use crate::config::BackendConfig;
use crate::error::BackendError;
use crate::query::Query;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Who a request is made as.
///
/// Row-level security in the backend decides what each identity may read or
/// write. `Service` bypasses it and is only available when a service-role key
/// is configured.
#[derive(Debug, Clone, Copy)]
pub enum Auth<'a> {
    Anon,
    User(&'a AccessToken),
    Service,
}

/// Client for the hosted backend.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    http: reqwest::Client,
    base_url: String,
    anon_key: SecretString,
    service_key: Option<SecretString>,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.inner.base_url)
            .field("service_key", &self.inner.service_key.is_some())
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not absolute or the HTTP client cannot
    /// be built.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let parsed = url::Url::parse(&config.url)
            .map_err(|e| BackendError::Config(format!("invalid backend URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(BackendError::Config(format!(
                "backend URL must be http(s): {}",
                config.url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("aurelia/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                http,
                base_url: config.url.trim_end_matches('/').to_string(),
                anon_key: config.anon_key.clone(),
                service_key: config.service_role_key.clone(),
            }),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    #[must_use]
    pub fn has_service_key(&self) -> bool {
        self.inner.service_key.is_some()
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'))
    }

    /// Start a request with the headers for `auth`.
    pub(crate) fn request(
        &self,
        method: Method,
        url: &str,
        auth: Auth<'_>,
    ) -> Result<RequestBuilder, BackendError> {
        let (api_key, bearer) = match auth {
            Auth::Anon => (
                self.inner.anon_key.expose_secret(),
                self.inner.anon_key.expose_secret(),
            ),
            Auth::User(token) => (self.inner.anon_key.expose_secret(), token.expose()),
            Auth::Service => {
                let key = self.inner.service_key.as_ref().ok_or_else(|| {
                    BackendError::Config("service role key is not configured".to_string())
                })?;
                (key.expose_secret(), key.expose_secret())
            }
        };

        Ok(self
            .inner
            .http
            .request(method, url)
            .header("apikey", api_key)
            .bearer_auth(bearer))
    }

    /// Send a request and fail on non-success statuses.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        log_failure(status, &body);
        Err(BackendError::from_response(status, &body))
    }

    /// Send a request and parse its JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = self.send(request).await?;
        let text = response.text().await?;
        parse_body(&text)
    }

    fn table_url(&self, query: &Query) -> Result<String, BackendError> {
        let base = self.endpoint(&format!("rest/v1/{}", query.table_name()));
        let url = url::Url::parse_with_params(&base, query.params())
            .map_err(|e| BackendError::Config(format!("invalid query URL: {e}")))?;
        Ok(url.into())
    }

    /// Read rows matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status or a body
    /// that does not match `T`.
    #[instrument(skip(self, query), fields(table = %query.table_name()))]
    pub async fn select<T: DeserializeOwned>(
        &self,
        auth: Auth<'_>,
        query: &Query,
    ) -> Result<Vec<T>, BackendError> {
        debug!(query = %query.to_query_string(), "select");
        let request = self.request(Method::GET, &self.table_url(query)?, auth)?;
        self.send_json(request).await
    }

    /// Read the first row matching `query`, if any.
    ///
    /// # Errors
    ///
    /// See [`Self::select`].
    pub async fn select_one<T: DeserializeOwned>(
        &self,
        auth: Auth<'_>,
        query: &Query,
    ) -> Result<Option<T>, BackendError> {
        let rows = self.select(auth, &query.clone().limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    /// Read rows and the total number of rows matching the filters,
    /// ignoring paging.
    ///
    /// # Errors
    ///
    /// See [`Self::select`].
    #[instrument(skip(self, query), fields(table = %query.table_name()))]
    pub async fn select_with_count<T: DeserializeOwned>(
        &self,
        auth: Auth<'_>,
        query: &Query,
    ) -> Result<(Vec<T>, u64), BackendError> {
        let request = self
            .request(Method::GET, &self.table_url(query)?, auth)?
            .header("Prefer", "count=exact");
        let response = self.send(request).await?;
        let total = total_from_headers(response.headers());
        let text = response.text().await?;
        let rows: Vec<T> = parse_body(&text)?;
        let total = total.unwrap_or(rows.len() as u64);
        Ok((rows, total))
    }

    /// Count rows matching the filters of `query`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    #[instrument(skip(self, query), fields(table = %query.table_name()))]
    pub async fn count(&self, auth: Auth<'_>, query: &Query) -> Result<u64, BackendError> {
        let query = query.without_paging();
        let request = self
            .request(Method::HEAD, &self.table_url(&query)?, auth)?
            .header("Prefer", "count=exact");
        let response = self.send(request).await?;
        total_from_headers(response.headers()).ok_or_else(|| BackendError::Api {
            status: response.status().as_u16(),
            code: None,
            message: "missing Content-Range total".to_string(),
        })
    }

    /// Insert rows and return them as stored.
    ///
    /// # Errors
    ///
    /// See [`Self::select`].
    #[instrument(skip(self, body))]
    pub async fn insert<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        auth: Auth<'_>,
        table: &str,
        body: &B,
    ) -> Result<Vec<T>, BackendError> {
        let url = self.endpoint(&format!("rest/v1/{table}"));
        let request = self
            .request(Method::POST, &url, auth)?
            .header("Prefer", "return=representation")
            .json(body);
        self.send_json(request).await
    }

    /// Insert one row and return it as stored.
    ///
    /// # Errors
    ///
    /// See [`Self::select`]. Also fails when the backend returns no row.
    pub async fn insert_one<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        auth: Auth<'_>,
        table: &str,
        body: &B,
    ) -> Result<T, BackendError> {
        self.insert(auth, table, body)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(format!("insert into {table} returned no row")))
    }

    /// Insert or update by the `on_conflict` column.
    ///
    /// # Errors
    ///
    /// See [`Self::select`].
    #[instrument(skip(self, body))]
    pub async fn upsert<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        auth: Auth<'_>,
        table: &str,
        on_conflict: &str,
        body: &B,
    ) -> Result<Vec<T>, BackendError> {
        let base = self.endpoint(&format!("rest/v1/{table}"));
        let url = url::Url::parse_with_params(&base, [("on_conflict", on_conflict)])
            .map_err(|e| BackendError::Config(format!("invalid query URL: {e}")))?;
        let request = self
            .request(Method::POST, url.as_str(), auth)?
            .header("Prefer", "return=representation,resolution=merge-duplicates")
            .json(body);
        self.send_json(request).await
    }

    /// Update rows matching `query` and return them.
    ///
    /// # Errors
    ///
    /// See [`Self::select`].
    #[instrument(skip(self, query, body), fields(table = %query.table_name()))]
    pub async fn update<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        auth: Auth<'_>,
        query: &Query,
        body: &B,
    ) -> Result<Vec<T>, BackendError> {
        let request = self
            .request(Method::PATCH, &self.table_url(query)?, auth)?
            .header("Prefer", "return=representation")
            .json(body);
        self.send_json(request).await
    }

    /// Delete rows matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    #[instrument(skip(self, query), fields(table = %query.table_name()))]
    pub async fn delete(&self, auth: Auth<'_>, query: &Query) -> Result<(), BackendError> {
        let request = self.request(Method::DELETE, &self.table_url(query)?, auth)?;
        self.send(request).await?;
        Ok(())
    }

    /// Call a database function.
    ///
    /// # Errors
    ///
    /// See [`Self::select`].
    #[instrument(skip(self, args))]
    pub async fn rpc<A: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        auth: Auth<'_>,
        function: &str,
        args: &A,
    ) -> Result<T, BackendError> {
        let url = self.endpoint(&format!("rest/v1/rpc/{function}"));
        let request = self.request(Method::POST, &url, auth)?.json(args);
        self.send_json(request).await
    }

    /// Check that the auth service answers.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend is unreachable or unhealthy.
    pub async fn ping(&self) -> Result<(), BackendError> {
        let url = self.endpoint("auth/v1/health");
        let request = self.request(Method::GET, &url, Auth::Anon)?;
        self.send(request).await?;
        Ok(())
    }
}

fn log_failure(status: StatusCode, body: &str) {
    let body = body.chars().take(500).collect::<String>();
    if status.is_server_error() {
        tracing::error!(status = %status, body = %body, "backend returned non-success status");
    } else {
        tracing::debug!(status = %status, body = %body, "backend returned non-success status");
    }
}

fn parse_body<T: DeserializeOwned>(text: &str) -> Result<T, BackendError> {
    serde_json::from_str(text).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %text.chars().take(500).collect::<String>(),
            "failed to parse backend response"
        );
        BackendError::Parse(e)
    })
}

/// Total row count from a `Content-Range: 0-9/42` (or `*/42`) header.
fn total_from_headers(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_RANGE)
        .and_then(|value: &HeaderValue| value.to_str().ok())
        .and_then(parse_content_range_total)
}

fn parse_content_range_total(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(service: bool) -> BackendClient {
        BackendClient::new(&BackendConfig {
            url: "https://project.backend.test/".to_string(),
            anon_key: SecretString::from("anon"),
            service_role_key: service.then(|| SecretString::from("service")),
        })
        .unwrap()
    }

    fn header(request: &reqwest::Request, name: &str) -> String {
        request
            .headers()
            .get(name)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_content_range_total() {
        assert_eq!(parse_content_range_total("0-9/42"), Some(42));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-9/*"), None);
        assert_eq!(parse_content_range_total("garbage"), None);
    }

    #[test]
    fn test_rejects_non_http_url() {
        let result = BackendClient::new(&BackendConfig {
            url: "ftp://project.backend.test".to_string(),
            anon_key: SecretString::from("anon"),
            service_role_key: None,
        });
        assert!(matches!(result, Err(BackendError::Config(_))));
    }

    #[test]
    fn test_anon_headers() {
        let client = client(false);
        let request = client
            .request(Method::GET, &client.endpoint("rest/v1/products"), Auth::Anon)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(request.url().as_str(), "https://project.backend.test/rest/v1/products");
        assert_eq!(header(&request, "apikey"), "anon");
        assert_eq!(header(&request, "authorization"), "Bearer anon");
    }

    #[test]
    fn test_user_headers_keep_anon_api_key() {
        let client = client(false);
        let token = AccessToken::new("user-jwt");
        let request = client
            .request(Method::GET, &client.endpoint("rest/v1/orders"), Auth::User(&token))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(header(&request, "apikey"), "anon");
        assert_eq!(header(&request, "authorization"), "Bearer user-jwt");
    }

    #[test]
    fn test_service_requires_key() {
        let without = client(false);
        assert!(matches!(
            without.request(Method::GET, "https://x.test", Auth::Service),
            Err(BackendError::Config(_))
        ));

        let with = client(true);
        let request = with
            .request(Method::GET, "https://x.test", Auth::Service)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(header(&request, "apikey"), "service");
        assert_eq!(header(&request, "authorization"), "Bearer service");
    }

    #[test]
    fn test_table_url_encodes_filters() {
        let client = client(false);
        let url = client
            .table_url(&Query::table("posts").eq("slug", "año").order("created_at", false))
            .unwrap();
        assert_eq!(
            url,
            "https://project.backend.test/rest/v1/posts?slug=eq.a%C3%B1o&order=created_at.desc"
        );
    }
}
