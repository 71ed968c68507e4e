//! `reqwest`-backed client for the remote task authority.

use super::RemoteClientConfig;
use crate::task::{
    domain::{NewTask, TaskFilter, TaskId, TaskPatch, TaskRecord, TaskStats},
    ports::{HostContext, RemoteError, RemoteOperation, RemoteResult, RemoteTaskClient},
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, header::AUTHORIZATION};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// HTTP client for the `/api/tasks` surface.
///
/// Every request carries the host's identity token verbatim in the
/// `Authorization` header.
pub struct HttpTaskClient<H>
where
    H: HostContext,
{
    client: Client,
    tasks_url: String,
    host: Arc<H>,
}

impl<H> HttpTaskClient<H>
where
    H: HostContext,
{
    /// Creates a client for the configured remote authority.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Request`] when the underlying HTTP client
    /// cannot be built.
    pub fn new(config: &RemoteClientConfig, host: Arc<H>) -> RemoteResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(RemoteError::request)?;
        Ok(Self {
            client,
            tasks_url: format!("{}/api/tasks", config.base_url()),
            host,
        })
    }

    fn task_url(&self, id: TaskId) -> String {
        format!("{}/{id}", self.tasks_url)
    }

    async fn execute(
        &self,
        operation: RemoteOperation,
        request: RequestBuilder,
    ) -> RemoteResult<Response> {
        tracing::debug!(%operation, "dispatching remote request");
        let response = request
            .header(AUTHORIZATION, self.host.identity_token())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(%operation, status = status.as_u16(), "remote request rejected");
        Err(RemoteError::Status {
            status: status.as_u16(),
            detail: error_detail(&body),
        })
    }
}

async fn decode<T>(response: Response) -> RemoteResult<T>
where
    T: DeserializeOwned,
{
    let bytes = response.bytes().await.map_err(transport_error)?;
    serde_json::from_slice(&bytes).map_err(RemoteError::decode)
}

fn transport_error(err: reqwest::Error) -> RemoteError {
    if err.is_builder() {
        RemoteError::request(err)
    } else if err.is_decode() {
        RemoteError::decode(err)
    } else {
        RemoteError::no_response(err)
    }
}

/// Extracts the `detail` field of an error body, falling back to the raw
/// text.
fn error_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    let detail = serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .and_then(|value| match value.get("detail") {
            Some(serde_json::Value::String(text)) => Some(text.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        });
    Some(detail.unwrap_or_else(|| trimmed.to_owned()))
}

#[async_trait]
impl<H> RemoteTaskClient for HttpTaskClient<H>
where
    H: HostContext,
{
    async fn list(&self, filter: &TaskFilter) -> RemoteResult<Vec<TaskRecord>> {
        let mut request = self.client.get(&self.tasks_url);
        if !filter.is_unrestricted() {
            request = request.query(&filter.query_pairs());
        }
        let response = self.execute(RemoteOperation::List, request).await?;
        decode(response).await
    }

    async fn create(&self, task: &NewTask) -> RemoteResult<TaskRecord> {
        let request = self.client.post(&self.tasks_url).json(task);
        let response = self.execute(RemoteOperation::Create, request).await?;
        decode(response).await
    }

    async fn update(&self, id: TaskId, patch: &TaskPatch) -> RemoteResult<TaskRecord> {
        let request = self.client.put(self.task_url(id)).json(patch);
        let response = self.execute(RemoteOperation::Update, request).await?;
        decode(response).await
    }

    async fn delete(&self, id: TaskId) -> RemoteResult<()> {
        let request = self.client.delete(self.task_url(id));
        self.execute(RemoteOperation::Delete, request).await?;
        Ok(())
    }

    async fn stats(&self) -> RemoteResult<TaskStats> {
        let request = self.client.get(format!("{}/stats", self.tasks_url));
        let response = self.execute(RemoteOperation::Stats, request).await?;
        decode(response).await
    }
}
