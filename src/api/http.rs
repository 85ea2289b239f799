//! Implements the `Store` trait against the expense tracker's HTTP API.

use crate::api::{AuthResponse, Credentials, NewAccount, Store};
use crate::error::{ApiError, ApiResult};
use crate::model::{Draft, Summary, Transaction};
use crate::Result;
use anyhow::Context;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::trace;
use url::Url;

/// Talks to the remote store over HTTP with a bounded per-request timeout. Token-bearing
/// requests carry the session credential as a bearer header.
pub(super) struct HttpStore {
    base_url: String,
    client: reqwest::Client,
}

impl HttpStore {
    pub(super) fn new(api_url: &str, timeout: Duration) -> Result<Self> {
        // Parse up front so a bad URL fails at construction, not per request.
        let parsed = Url::parse(api_url)
            .with_context(|| format!("Invalid API URL '{api_url}'"))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Unable to construct the HTTP client")?;
        Ok(Self {
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait::async_trait]
impl Store for HttpStore {
    async fn list(&mut self, token: &str) -> ApiResult<Vec<Transaction>> {
        trace!("GET /expenses");
        let response = self
            .client
            .get(self.endpoint("expenses"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }

    async fn get(&mut self, token: &str, id: &str) -> ApiResult<Transaction> {
        trace!("GET /expenses/{id}");
        let response = self
            .client
            .get(self.endpoint(&format!("expenses/{id}")))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }

    async fn create(&mut self, token: &str, draft: &Draft) -> ApiResult<Transaction> {
        trace!("POST /expenses");
        let response = self
            .client
            .post(self.endpoint("expenses"))
            .bearer_auth(token)
            .json(draft)
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }

    async fn update(&mut self, token: &str, id: &str, draft: &Draft) -> ApiResult<Transaction> {
        trace!("PUT /expenses/{id}");
        let response = self
            .client
            .put(self.endpoint(&format!("expenses/{id}")))
            .bearer_auth(token)
            .json(draft)
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }

    async fn delete(&mut self, token: &str, id: &str) -> ApiResult<()> {
        trace!("DELETE /expenses/{id}");
        let response = self
            .client
            .delete(self.endpoint(&format!("expenses/{id}")))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(status_error(response).await)
        }
    }

    async fn summary(&mut self, token: &str) -> ApiResult<Summary> {
        trace!("GET /expenses/summary");
        let response = self
            .client
            .get(self.endpoint("expenses/summary"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }

    async fn login(&mut self, credentials: &Credentials) -> ApiResult<AuthResponse> {
        trace!("POST /auth/login");
        let response = self
            .client
            .post(self.endpoint("auth/login"))
            .json(credentials)
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }

    async fn register(&mut self, account: &NewAccount) -> ApiResult<String> {
        trace!("POST /auth/register");
        let response = self
            .client
            .post(self.endpoint("auth/register"))
            .json(account)
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(response).await);
        }
        // The register endpoint responds with a plain confirmation message.
        response
            .text()
            .await
            .map(|body| body.trim().to_string())
            .map_err(transport_error)
    }
}

/// Maps a transport-level failure (connect, DNS, timeout) to the network error class.
fn transport_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Network(format!("request timed out: {e}"))
    } else {
        ApiError::Network(e.to_string())
    }
}

/// Reads a successful JSON body, or maps a non-success status to the error taxonomy.
async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(status_error(response).await);
    }
    let body = response.text().await.map_err(transport_error)?;
    serde_json::from_str(&body).map_err(|e| {
        ApiError::server(
            status.as_u16(),
            format!("unable to decode the response body: {e}"),
        )
    })
}

/// Maps a non-success response to the error taxonomy, pulling a human-readable message out of
/// the body when one is present.
async fn status_error(response: Response) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = extract_message(&body, status);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Auth(message),
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        _ => ApiError::server(status.as_u16(), message),
    }
}

/// Error bodies arrive either as `{"message": "..."}`, as a bare JSON string, or as plain
/// text. Falls back to the status line when the body is empty.
fn extract_message(body: &str, status: StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
            return message.to_string();
        }
        if let Some(message) = value.as_str() {
            return message.to_string();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_bad_url() {
        assert!(HttpStore::new("not a url", Duration::from_secs(10)).is_err());
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let store = HttpStore::new("http://localhost:8080/api/", Duration::from_secs(10)).unwrap();
        assert_eq!(store.endpoint("expenses"), "http://localhost:8080/api/expenses");
        assert_eq!(
            store.endpoint("expenses/tx1"),
            "http://localhost:8080/api/expenses/tx1"
        );
    }

    #[test]
    fn test_extract_message_shapes() {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        assert_eq!(
            extract_message(r#"{"message": "boom"}"#, status),
            "boom"
        );
        assert_eq!(extract_message(r#""plain json string""#, status), "plain json string");
        assert_eq!(extract_message("Error: Username is already taken!", status), "Error: Username is already taken!");
        assert_eq!(extract_message("", status), "500 Internal Server Error");
    }
}
