//! The aggregate a view layer holds.

use std::future::Future;

use tracing::info;

use oceandesk_api::{Api, ApiConfig, HttpTransport, Transport};

use crate::chat::ChatSession;
use crate::error::Result;
use crate::guard::BusyFlag;
use crate::orchestrator::Orchestrator;
use crate::store::drafts::DraftStore;
use crate::store::inbox::InboxStore;
use crate::store::prompts::PromptStore;

/// All stores, the orchestrator and the chat session over one transport.
///
/// Cloning is cheap; clones share everything.
#[derive(Debug)]
pub struct Dashboard<T> {
    inbox: InboxStore<T>,
    prompts: PromptStore<T>,
    drafts: DraftStore<T>,
    chat: ChatSession<T>,
    orchestrator: Orchestrator<T>,
    refreshing: [BusyFlag; 3],
}

impl<T> Clone for Dashboard<T> {
    fn clone(&self) -> Self {
        Self {
            inbox: self.inbox.clone(),
            prompts: self.prompts.clone(),
            drafts: self.drafts.clone(),
            chat: self.chat.clone(),
            orchestrator: self.orchestrator.clone(),
            refreshing: self.refreshing.clone(),
        }
    }
}

impl Dashboard<HttpTransport> {
    /// Connects to the backend over HTTP.
    ///
    /// No request is sent until a store operation runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn connect(config: &ApiConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        info!(base_url = %config.base_url, timeout = ?config.timeout, "backend configured");
        Ok(Self::from_api(Api::new(transport)))
    }
}

impl<T: Transport> Dashboard<T> {
    /// Builds every component over the same API handle.
    #[must_use]
    pub fn from_api(api: Api<T>) -> Self {
        let inbox = InboxStore::new(api.clone());
        Self {
            orchestrator: Orchestrator::new(inbox.clone()),
            inbox,
            prompts: PromptStore::new(api.clone()),
            drafts: DraftStore::new(api.clone()),
            chat: ChatSession::new(api),
            refreshing: Default::default(),
        }
    }

    /// The inbox.
    #[must_use]
    pub const fn inbox(&self) -> &InboxStore<T> {
        &self.inbox
    }

    /// The prompts.
    #[must_use]
    pub const fn prompts(&self) -> &PromptStore<T> {
        &self.prompts
    }

    /// The drafts.
    #[must_use]
    pub const fn drafts(&self) -> &DraftStore<T> {
        &self.drafts
    }

    /// The chat session.
    #[must_use]
    pub const fn chat(&self) -> &ChatSession<T> {
        &self.chat
    }

    /// The workflow orchestrator.
    #[must_use]
    pub const fn orchestrator(&self) -> &Orchestrator<T> {
        &self.orchestrator
    }

    /// Reloads the inbox unless a plain refresh of it is already running.
    pub fn refresh_inbox(&self) -> Option<impl Future<Output = Result<usize>> + Send + use<T>> {
        let busy = self.refreshing[0].try_acquire()?;
        let fetch = self.inbox.fetch_all();
        Some(async move {
            let _busy = busy;
            fetch.await
        })
    }

    /// Reloads the prompts unless a refresh of them is already running.
    pub fn refresh_prompts(
        &self,
    ) -> Option<impl Future<Output = Result<usize>> + Send + use<T>> {
        let busy = self.refreshing[1].try_acquire()?;
        let fetch = self.prompts.fetch_all();
        Some(async move {
            let _busy = busy;
            fetch.await
        })
    }

    /// Reloads the drafts unless a refresh of them is already running.
    pub fn refresh_drafts(&self) -> Option<impl Future<Output = Result<usize>> + Send + use<T>> {
        let busy = self.refreshing[2].try_acquire()?;
        let fetch = self.drafts.fetch_all();
        Some(async move {
            let _busy = busy;
            fetch.await
        })
    }

    /// Whether any store, flow or chat turn has a request in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.inbox.is_loading()
            || self.prompts.is_loading()
            || self.drafts.is_loading()
            || self.orchestrator.any_busy()
            || self.chat.is_awaiting()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedTransport, draft, email, prompt};
    use oceandesk_api::Method;
    use serde_json::json;
    use std::sync::Arc;
    use tokio_test::{assert_pending, assert_ready, task};

    #[test]
    fn test_connect_sends_nothing() {
        let config = ApiConfig::new("http://127.0.0.1:9").unwrap();
        let dashboard = Dashboard::connect(&config).unwrap();

        assert!(dashboard.inbox().is_empty());
        assert!(!dashboard.is_busy());
        assert_eq!(dashboard.chat().len(), 1);
    }

    #[tokio::test]
    async fn test_refreshes_load_each_store() {
        let transport = ScriptedTransport::shared();
        transport.reply(Method::Get, "/emails", json!([email(1, "Important")]));
        transport.reply(Method::Get, "/prompts", json!([prompt(1, "auto_reply", "Hi")]));
        transport.reply(Method::Get, "/drafts", json!([draft(1, "Re", "Body")]));
        let dashboard = Dashboard::from_api(Api::from_shared(Arc::clone(&transport)));

        assert_eq!(dashboard.refresh_inbox().unwrap().await.unwrap(), 1);
        assert_eq!(dashboard.refresh_prompts().unwrap().await.unwrap(), 1);
        assert_eq!(dashboard.refresh_drafts().unwrap().await.unwrap(), 1);

        assert_eq!(dashboard.inbox().len(), 1);
        assert_eq!(dashboard.prompts().len(), 1);
        assert_eq!(dashboard.drafts().len(), 1);
    }

    #[test]
    fn test_refresh_while_refreshing_is_a_no_op() {
        let transport = ScriptedTransport::shared();
        let gate = transport.gate(Method::Get, "/emails");
        let dashboard = Dashboard::from_api(Api::from_shared(Arc::clone(&transport)));

        let mut refresh = task::spawn(dashboard.refresh_inbox().unwrap());
        assert_pending!(refresh.poll());
        assert!(dashboard.refresh_inbox().is_none());
        assert!(dashboard.is_busy());

        gate.send(Ok(json!([]))).unwrap();
        assert_ready!(refresh.poll()).unwrap();
        assert!(dashboard.refresh_inbox().is_some());
    }

    #[tokio::test]
    async fn test_orchestrator_shares_inbox() {
        let transport = ScriptedTransport::shared();
        transport.reply(Method::Post, "/ingest/mock", json!({}));
        transport.reply(Method::Get, "/emails", json!([email(1, "Spam"), email(2, "Spam")]));
        let dashboard = Dashboard::from_api(Api::from_shared(Arc::clone(&transport)));

        let report = dashboard.orchestrator().load_mock_then_refresh().unwrap().await;

        assert!(report.is_success());
        assert_eq!(dashboard.inbox().len(), 2);
    }
}
