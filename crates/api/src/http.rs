use std::env;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Response};
use serde_json::{Value, json};

use plan_core::{Session, SessionId, SessionSummary};

use crate::error::ApiError;
use crate::session_api::SessionApi;

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: String,
}

impl ApiConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let token = env::var("PLAN_API_TOKEN").ok()?;
        if token.trim().is_empty() {
            return None;
        }
        let base_url =
            env::var("PLAN_API_URL").unwrap_or_else(|_| "http://localhost:8000".into());
        Some(Self { base_url, token })
    }
}

/// `SessionApi` over the live sessions backend.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    config: ApiConfig,
}

impl HttpApi {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn from_env() -> Option<Self> {
        ApiConfig::from_env().map(Self::new)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Parse the response body, mapping non-success answers to `ApiError`.
    async fn read_body(response: Response) -> Result<Value, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.json::<Value>().await.unwrap_or(Value::Null);
            return Err(ApiError::from_response(status, &body));
        }
        Ok(response.json().await?)
    }

    /// Like [`Self::read_body`], for endpoints whose success body is noise.
    async fn expect_success(response: Response) -> Result<(), ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.json::<Value>().await.unwrap_or(Value::Null);
            return Err(ApiError::from_response(status, &body));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionApi for HttpApi {
    async fn fetch_session(&self, id: SessionId) -> Result<Session, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("/sessions/{id}")))
            .bearer_auth(&self.config.token)
            .send()
            .await?;
        let body = Self::read_body(response).await?;
        Ok(Session::new(id, body))
    }

    async fn fetch_progress(&self, id: SessionId) -> Result<Value, ApiError> {
        // _ts busts intermediary caches; progress must always be current.
        let response = self
            .client
            .get(self.url(&format!("/sessions/{id}/progress")))
            .query(&[("_ts", Utc::now().timestamp_millis().to_string())])
            .bearer_auth(&self.config.token)
            .send()
            .await?;
        Self::read_body(response).await
    }

    async fn complete_day(&self, id: SessionId, day: u32) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url(&format!("/sessions/{id}/day/{day}/complete")))
            .bearer_auth(&self.config.token)
            .json(&json!({}))
            .send()
            .await?;
        Self::expect_success(response).await
    }

    async fn undo_day(&self, id: SessionId, day: u32) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url(&format!("/sessions/{id}/day/{day}/undo")))
            .bearer_auth(&self.config.token)
            .json(&json!({}))
            .send()
            .await?;
        Self::expect_success(response).await
    }

    async fn list_sessions(&self, limit: u32) -> Result<Vec<SessionSummary>, ApiError> {
        let response = self
            .client
            .get(self.url("/sessions"))
            .query(&[("limit", limit.to_string())])
            .bearer_auth(&self.config.token)
            .send()
            .await?;
        let body = Self::read_body(response).await?;
        Ok(summaries_from_body(&body))
    }

    async fn rename_session(&self, id: SessionId, title: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .patch(self.url(&format!("/sessions/{id}/title")))
            .bearer_auth(&self.config.token)
            .json(&json!({ "title": title }))
            .send()
            .await?;
        Self::expect_success(response).await
    }

    async fn delete_session(&self, id: SessionId) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.url(&format!("/sessions/{id}")))
            .bearer_auth(&self.config.token)
            .send()
            .await?;
        Self::expect_success(response).await
    }
}

/// Pull summary rows out of a listing body.
///
/// The endpoint has answered both as a bare array and as `{"items": [...]}`
/// across backend versions. Rows that do not parse are dropped so one bad
/// record cannot empty the whole list.
fn summaries_from_body(body: &Value) -> Vec<SessionSummary> {
    let items = body
        .as_array()
        .or_else(|| body.get("items").and_then(Value::as_array));
    let Some(items) = items else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            serde_json::from_value::<SessionSummary>(item.clone())
                .map_err(|err| tracing::debug!(%err, "skipping unparseable session row"))
                .ok()
        })
        .collect()
}
