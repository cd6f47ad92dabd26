//! Typed endpoints over a [`Transport`].

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::model::{Ack, ChatRequest, ChatResponse, Draft, DraftId, Email, Prompt};
use crate::transport::{Method, Transport};

const EMAILS: &str = "/emails";
const PROMPTS: &str = "/prompts";
const DRAFTS: &str = "/drafts";
const INGEST_MOCK: &str = "/ingest/mock";
const INGEST_PROCESS: &str = "/ingest/process";
const CHAT: &str = "/chat";

/// Typed access to the backend, one method per endpoint.
///
/// Cloning is cheap; all clones share one transport.
#[derive(Debug)]
pub struct Api<T> {
    transport: Arc<T>,
}

impl<T> Clone for Api<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: Transport> Api<T> {
    /// Wraps a transport.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::from_shared(Arc::new(transport))
    }

    /// Wraps an already shared transport.
    #[must_use]
    pub const fn from_shared(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// The underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// `GET /emails`, in server order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a list of emails.
    pub async fn list_emails(&self) -> Result<Vec<Email>> {
        self.get(EMAILS).await
    }

    /// `GET /prompts`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a list of prompts.
    pub async fn list_prompts(&self) -> Result<Vec<Prompt>> {
        self.get(PROMPTS).await
    }

    /// `POST /prompts`: creates or updates the prompt with the same name.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a prompt.
    pub async fn upsert_prompt(&self, prompt: &Prompt) -> Result<Prompt> {
        self.post(PROMPTS, prompt).await
    }

    /// `GET /drafts`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a list of drafts.
    pub async fn list_drafts(&self) -> Result<Vec<Draft>> {
        self.get(DRAFTS).await
    }

    /// `POST /drafts` with the full draft.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a draft.
    pub async fn save_draft(&self, draft: &Draft) -> Result<Draft> {
        self.post(DRAFTS, draft).await
    }

    /// `DELETE /drafts/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_draft(&self, id: DraftId) -> Result<Ack> {
        let body = self
            .transport
            .request(Method::Delete, &format!("{DRAFTS}/{id}"), None)
            .await?;
        Ok(ack(body))
    }

    /// `POST /ingest/mock`: asks the backend to generate synthetic emails.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn ingest_mock(&self) -> Result<Ack> {
        let body = self.transport.request(Method::Post, INGEST_MOCK, None).await?;
        Ok(ack(body))
    }

    /// `POST /ingest/process`: runs categorization and extraction.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn run_processing(&self) -> Result<Ack> {
        let body = self
            .transport
            .request(Method::Post, INGEST_PROCESS, None)
            .await?;
        Ok(ack(body))
    }

    /// `POST /chat`: one conversational turn.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body has no `response`.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.post(CHAT, request).await
    }

    async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        let body = self.transport.request(Method::Get, path, None).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn post<B: Serialize + Sync, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        let payload = serde_json::to_value(body)?;
        let body = self
            .transport
            .request(Method::Post, path, Some(payload))
            .await?;
        Ok(serde_json::from_value(body)?)
    }
}

/// Trigger acknowledgements are informational; an odd shape is not an error.
fn ack(body: Value) -> Ack {
    if body.is_null() {
        return Ack::default();
    }
    serde_json::from_value(body).unwrap_or_else(|e| {
        debug!("ignoring unrecognised acknowledgement: {e}");
        Ack::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ack_is_lenient() {
        assert_eq!(ack(Value::Null), Ack::default());
        assert_eq!(ack(json!({ "processed": 5 })).processed, Some(5));
        assert_eq!(
            ack(json!({ "message": "Mock data loaded" })).message.as_deref(),
            Some("Mock data loaded")
        );
        assert_eq!(ack(json!([1, 2, 3])), Ack::default());
    }
}
