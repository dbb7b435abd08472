//! PostgREST-style client for the hosted database.
//!
//! Every request carries the service key twice, as `apikey` and as a bearer
//! token. Writes ask for `Prefer: return=representation` so callers can tell
//! whether a row was touched.

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Postgres `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Errors from the BaaS API.
#[derive(Debug, Error)]
pub enum BaasError {
    #[error("BaaS request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A unique constraint rejected the write.
    #[error("BaaS conflict: {0}")]
    Conflict(String),

    #[error("BaaS returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected BaaS response: {0}")]
    Decode(String),

    #[error("Invalid BaaS configuration: {0}")]
    Config(String),
}

pub type BaasResult<T> = Result<T, BaasError>;

/// Connection settings for [`BaasClient`].
#[derive(Clone, Debug)]
pub struct BaasClientConfig {
    /// Project URL. `/rest/v1` is appended unless already present.
    pub url: String,
    pub service_key: String,
    pub timeout: Duration,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Row filters, ordering and paging for one request.
///
/// Values are sent as PostgREST operators (`eq.x`, `in.(a,b)`, ...).
#[derive(Clone, Debug, Default)]
pub struct Query {
    params: Vec<(String, String)>,
    count: bool,
}

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn filter(mut self, column: &str, op: &str, value: impl std::fmt::Display) -> Self {
        self.params.push((column.to_string(), format!("{op}.{value}")));
        self
    }

    #[must_use]
    pub fn eq(self, column: &str, value: impl std::fmt::Display) -> Self {
        self.filter(column, "eq", value)
    }

    #[must_use]
    pub fn lte(self, column: &str, value: impl std::fmt::Display) -> Self {
        self.filter(column, "lte", value)
    }

    #[must_use]
    pub fn gte(self, column: &str, value: impl std::fmt::Display) -> Self {
        self.filter(column, "gte", value)
    }

    /// `column` is one of `values`. Values are double-quoted so commas survive.
    #[must_use]
    pub fn in_list<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: std::fmt::Display,
    {
        let list = values
            .into_iter()
            .map(|v| format!("\"{}\"", v.to_string().replace('"', "\\\"")))
            .collect::<Vec<_>>()
            .join(",");
        self.filter(column, "in", format!("({list})"))
    }

    /// JSON/array column contains `value` (`cs.[...]`).
    #[must_use]
    pub fn contains_json(self, column: &str, value: &serde_json::Value) -> Self {
        self.filter(column, "cs", value)
    }

    #[must_use]
    pub fn select(mut self, columns: &str) -> Self {
        self.params.push(("select".to_string(), columns.to_string()));
        self
    }

    /// `ordering` is PostgREST syntax, e.g. `created_at.desc`.
    #[must_use]
    pub fn order(mut self, ordering: &str) -> Self {
        self.params.push(("order".to_string(), ordering.to_string()));
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.params.push(("limit".to_string(), limit.to_string()));
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: usize) -> Self {
        self.params.push(("offset".to_string(), offset.to_string()));
        self
    }

    /// Ask for the total row count in `Content-Range`.
    #[must_use]
    pub fn exact_count(mut self) -> Self {
        self.count = true;
        self
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

/// Total from a `Content-Range` header such as `0-24/3573` or `*/0`.
pub fn parse_content_range(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.parse().ok()
}

/// HTTP client for the hosted database's REST API.
pub struct BaasClient {
    client: Client,
    rest_url: String,
    service_key: String,
}

impl BaasClient {
    pub fn new(config: BaasClientConfig) -> BaasResult<Self> {
        let base = config.url.trim_end_matches('/');
        if base.is_empty() {
            return Err(BaasError::Config("url is empty".to_string()));
        }
        if config.service_key.is_empty() {
            return Err(BaasError::Config("service key is empty".to_string()));
        }
        let rest_url = if base.ends_with("/rest/v1") {
            base.to_string()
        } else {
            format!("{base}/rest/v1")
        };

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            rest_url,
            service_key: config.service_key,
        })
    }

    pub fn rest_url(&self) -> &str {
        &self.rest_url
    }

    fn request(&self, method: Method, table: &str, query: &Query) -> RequestBuilder {
        let mut request = self
            .client
            .request(method, format!("{}/{table}", self.rest_url))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .query(query.params());
        if query.count {
            request = request.header("Prefer", "count=exact");
        }
        request
    }

    async fn send(&self, table: &str, request: RequestBuilder) -> BaasResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        debug!(table, status = status.as_u16(), "[store] BaaS response");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let parsed = serde_json::from_str::<ErrorBody>(&body).ok();
        let code = parsed.as_ref().and_then(|e| e.code.clone());
        let message = parsed.and_then(|e| e.message).unwrap_or(body);
        if status == StatusCode::CONFLICT || code.as_deref() == Some(UNIQUE_VIOLATION) {
            Err(BaasError::Conflict(message))
        } else {
            Err(BaasError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn rows<T: DeserializeOwned>(response: Response) -> BaasResult<Vec<T>> {
        let body = response.bytes().await?;
        if body.is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&body).map_err(|e| BaasError::Decode(e.to_string()))
    }

    /// `GET /table` with filters.
    pub async fn select<T: DeserializeOwned>(&self, table: &str, query: &Query) -> BaasResult<Vec<T>> {
        let response = self
            .send(table, self.request(Method::GET, table, query))
            .await?;
        Self::rows(response).await
    }

    /// First matching row, if any.
    pub async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        query: Query,
    ) -> BaasResult<Option<T>> {
        let mut rows = self.select(table, &query.limit(1)).await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    /// Rows plus the total match count. `query` should carry `exact_count()`.
    pub async fn select_counted<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
    ) -> BaasResult<(Vec<T>, u64)> {
        let response = self
            .send(table, self.request(Method::GET, table, query))
            .await?;
        let total = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range);
        let rows: Vec<T> = Self::rows(response).await?;
        let total = total.unwrap_or(rows.len() as u64);
        Ok((rows, total))
    }

    /// Number of rows matching `query`.
    pub async fn count(&self, table: &str, query: Query) -> BaasResult<u64> {
        let query = query.select("id").limit(1).exact_count();
        let (_, total) = self.select_counted::<serde_json::Value>(table, &query).await?;
        Ok(total)
    }

    /// `POST /table`, returning the stored rows.
    pub async fn insert<B, T>(&self, table: &str, body: &B) -> BaasResult<Vec<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .request(Method::POST, table, &Query::new())
            .header("Prefer", "return=representation")
            .json(body);
        Self::rows(self.send(table, request).await?).await
    }

    /// Insert or merge on the primary key.
    pub async fn upsert<B, T>(&self, table: &str, body: &B) -> BaasResult<Vec<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .request(Method::POST, table, &Query::new())
            .header(
                "Prefer",
                "resolution=merge-duplicates,return=representation",
            )
            .json(body);
        Self::rows(self.send(table, request).await?).await
    }

    /// `PATCH /table?filters`, returning the updated rows.
    pub async fn update<B, T>(&self, table: &str, query: &Query, body: &B) -> BaasResult<Vec<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .request(Method::PATCH, table, query)
            .header("Prefer", "return=representation")
            .json(body);
        Self::rows(self.send(table, request).await?).await
    }

    /// `DELETE /table?filters`. Returns the number of rows removed.
    pub async fn delete(&self, table: &str, query: &Query) -> BaasResult<usize> {
        let request = self
            .request(Method::DELETE, table, query)
            .header("Prefer", "return=representation");
        let rows: Vec<serde_json::Value> = Self::rows(self.send(table, request).await?).await?;
        Ok(rows.len())
    }
}
