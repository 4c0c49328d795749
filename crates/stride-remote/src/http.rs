//! REST backend for the fitness API.
//!
//! Speaks the reminder (`/api/reminders`), undo (`/api/undo/*`) and search
//! (`/api/search/*`) endpoints of the tracker's backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stride_core::{
    config::{RemoteConfig, SearchScope},
    error::StrideError,
    model::{HistoryRecord, Priority, QueueSnapshot},
    traits::ReminderStore,
};
use tracing::debug;

/// Reminder store backed by the REST API.
pub struct HttpStore {
    client: reqwest::Client,
    base_url: String,
    scope: SearchScope,
}

impl HttpStore {
    /// Create from config values.
    pub fn from_config(remote: &RemoteConfig, scope: SearchScope) -> Result<Self, StrideError> {
        let client = reqwest::Client::builder()
            .timeout(remote.timeout())
            .build()
            .map_err(|e| StrideError::Remote(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            base_url: remote.base_url.trim_end_matches('/').to_string(),
            scope,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, StrideError> {
        let resp = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(|e| StrideError::Remote(format!("GET {path} failed: {e}")))?;
        let resp = check_status(path, resp)?;
        resp.json::<T>()
            .await
            .map_err(|e| StrideError::Remote(format!("GET {path}: bad response body: {e}")))
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, StrideError> {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| StrideError::Remote(format!("POST {path} failed: {e}")))
    }
}

fn check_status(path: &str, resp: reqwest::Response) -> Result<reqwest::Response, StrideError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(StrideError::Remote(format!("{path} returned {status}")))
    }
}

// --- Serde types ---

#[derive(Deserialize)]
struct RemindersResponse {
    #[serde(default)]
    all_reminders: Vec<(i64, Option<String>)>,
}

#[derive(Serialize)]
struct CreateReminderRequest<'a> {
    message: &'a str,
    priority: i64,
}

#[derive(Deserialize)]
struct StackResponse {
    #[serde(default)]
    stack: Vec<HistoryRecord>,
}

#[derive(Deserialize)]
struct PopResponse {
    undone: Option<HistoryRecord>,
}

#[derive(Deserialize)]
struct SearchAllResponse {
    #[serde(default)]
    exercises: Vec<serde_json::Value>,
    #[serde(default)]
    food: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct SearchResultsResponse {
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

/// Suggestion name from either a bare string or a `{name, ...}` object.
fn suggestion_name(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Object(map) => map
            .get("name")
            .and_then(|n| n.as_str())
            .map(str::to_string),
        _ => None,
    }
}

#[async_trait]
impl ReminderStore for HttpStore {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_reminders(&self) -> Result<QueueSnapshot, StrideError> {
        let body: RemindersResponse = self.get_json("/api/reminders", &[]).await?;
        // The API lists reminders lowest priority first; the snapshot
        // re-sorts highest first.
        let rows = body
            .all_reminders
            .into_iter()
            .filter_map(|(priority, text)| text.map(|t| (Priority::clamped(priority), t)))
            .collect();
        Ok(QueueSnapshot::from_rows(rows))
    }

    async fn create_reminder(&self, priority: Priority, text: &str) -> Result<(), StrideError> {
        let req = CreateReminderRequest {
            message: text,
            priority: priority.into(),
        };
        let resp = self.post_json("/api/reminders", &req).await?;
        check_status("/api/reminders", resp)?;
        debug!("http: reminder created (p{priority})");
        Ok(())
    }

    async fn fetch_history(&self) -> Result<Vec<HistoryRecord>, StrideError> {
        let body: StackResponse = self.get_json("/api/undo/all", &[]).await?;
        Ok(body.stack)
    }

    async fn push_history(&self, record: &HistoryRecord) -> Result<(), StrideError> {
        let resp = self.post_json("/api/undo/push", record).await?;
        check_status("/api/undo/push", resp)?;
        Ok(())
    }

    async fn pop_history(&self) -> Result<Option<HistoryRecord>, StrideError> {
        let resp = self
            .post_json("/api/undo/pop", &serde_json::json!({}))
            .await?;
        // An empty log answers 400 "Nothing to undo".
        if resp.status() == reqwest::StatusCode::BAD_REQUEST {
            debug!("http: undo log empty");
            return Ok(None);
        }
        let resp = check_status("/api/undo/pop", resp)?;
        let body: PopResponse = resp
            .json()
            .await
            .map_err(|e| StrideError::Remote(format!("/api/undo/pop: bad response body: {e}")))?;
        Ok(body.undone)
    }

    async fn search(&self, query: &str) -> Result<Vec<String>, StrideError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let names = match self.scope {
            SearchScope::All => {
                let body: SearchAllResponse =
                    self.get_json("/api/search/all", &[("q", query)]).await?;
                body.exercises
                    .iter()
                    .chain(body.food.iter())
                    .filter_map(suggestion_name)
                    .collect()
            }
            SearchScope::Exercise | SearchScope::Food => {
                let path = format!("/api/search/{}", self.scope.as_str());
                let body: SearchResultsResponse = self.get_json(&path, &[("q", query)]).await?;
                body.results.iter().filter_map(suggestion_name).collect()
            }
        };
        Ok(names)
    }
}
