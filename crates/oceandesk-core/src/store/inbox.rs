//! Inbox store: the processed email collection and its triggers.

use std::future::Future;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use oceandesk_api::{Ack, Api, Category, Email, EmailId, Transport};

use super::{Status, Tickets, lock};
use crate::error::Result;
use crate::guard::{Activity, ActivityGuard};

#[derive(Debug, Default)]
struct InboxState {
    emails: Vec<Email>,
    error: Option<String>,
    tickets: Tickets,
}

/// Owns the list of emails exactly as the backend last returned it.
///
/// Cloning is cheap; clones share state.
#[derive(Debug)]
pub struct InboxStore<T> {
    api: Api<T>,
    state: Arc<Mutex<InboxState>>,
    activity: Activity,
}

impl<T> Clone for InboxStore<T> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            state: Arc::clone(&self.state),
            activity: self.activity.clone(),
        }
    }
}

impl<T: Transport> InboxStore<T> {
    /// Creates an empty store.
    #[must_use]
    pub fn new(api: Api<T>) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(InboxState::default())),
            activity: Activity::new(),
        }
    }

    /// Replaces the collection with the backend's current list.
    ///
    /// Loading is reported as soon as this returns. A response that arrives
    /// after a later fetch's response has been applied is discarded.
    pub fn fetch_all(&self) -> impl Future<Output = Result<usize>> + Send + use<T> {
        let guard = self.activity.begin();
        let ticket = lock(&self.state).tickets.issue();
        let api = self.api.clone();
        let state = Arc::clone(&self.state);

        async move {
            let _guard = guard;
            debug!(ticket, "fetching inbox");
            let result = api.list_emails().await;
            settle_fetch(&state, ticket, result)
        }
    }

    /// Asks the backend to generate synthetic emails.
    ///
    /// The local collection is untouched; follow with [`fetch_all`](Self::fetch_all).
    pub fn ingest_mock(&self) -> impl Future<Output = Result<Ack>> + Send + use<T> {
        let guard = self.activity.begin();
        let api = self.api.clone();
        let state = Arc::clone(&self.state);

        async move {
            let _guard = guard;
            let result = api.ingest_mock().await;
            settle_trigger(&state, "mock ingestion", result)
        }
    }

    /// Asks the backend to categorize emails and extract action items.
    ///
    /// The local collection is untouched; follow with [`fetch_all`](Self::fetch_all).
    pub fn run_processing(&self) -> impl Future<Output = Result<Ack>> + Send + use<T> {
        let guard = self.activity.begin();
        let api = self.api.clone();
        let state = Arc::clone(&self.state);

        async move {
            let _guard = guard;
            let result = api.run_processing().await;
            settle_trigger(&state, "processing", result)
        }
    }

    /// Reports loading until the guard drops.
    pub(crate) fn hold_loading(&self) -> ActivityGuard {
        self.activity.begin()
    }

    /// Snapshot of the emails in server order.
    #[must_use]
    pub fn emails(&self) -> Vec<Email> {
        lock(&self.state).emails.clone()
    }

    /// One email by id.
    #[must_use]
    pub fn get(&self, id: EmailId) -> Option<Email> {
        lock(&self.state).emails.iter().find(|e| e.id == id).cloned()
    }

    /// Number of emails.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.state).emails.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.state).emails.is_empty()
    }

    /// Whether any request is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.activity.is_active()
    }

    /// Message of the latest failure, cleared by the next successful fetch.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        lock(&self.state).error.clone()
    }

    /// Overall lifecycle.
    #[must_use]
    pub fn status(&self) -> Status {
        let state = lock(&self.state);
        Status::resolve(
            self.activity.is_active(),
            state.error.is_some(),
            state.tickets.has_applied(),
        )
    }

    /// Email counts per category: the known categories first, in their fixed
    /// order, then any others in order of first appearance.
    #[must_use]
    pub fn count_by_category(&self) -> Vec<(Category, usize)> {
        let state = lock(&self.state);
        let mut counts: Vec<(Category, usize)> =
            Category::KNOWN.iter().map(|c| (c.clone(), 0)).collect();
        for email in &state.emails {
            match counts.iter_mut().find(|(c, _)| *c == email.category) {
                Some((_, n)) => *n += 1,
                None => counts.push((email.category.clone(), 1)),
            }
        }
        counts
    }

    /// Number of emails with at least one extracted action item.
    #[must_use]
    pub fn action_item_count(&self) -> usize {
        lock(&self.state)
            .emails
            .iter()
            .filter(|e| e.has_action_items())
            .count()
    }
}

fn settle_fetch(
    state: &Mutex<InboxState>,
    ticket: u64,
    result: oceandesk_api::Result<Vec<Email>>,
) -> Result<usize> {
    let mut state = lock(state);
    let settle = state.tickets.settle(ticket, result.is_ok());
    match result {
        Ok(emails) => {
            let count = emails.len();
            if settle.data {
                state.emails = emails;
                info!(count, "inbox refreshed");
            } else {
                debug!(ticket, "discarding stale inbox response");
            }
            if settle.outcome {
                state.error = None;
            }
            Ok(count)
        }
        Err(e) => {
            warn!("inbox fetch failed: {e}");
            if settle.outcome {
                state.error = Some(e.to_string());
            }
            Err(e.into())
        }
    }
}

fn settle_trigger(
    state: &Mutex<InboxState>,
    what: &str,
    result: oceandesk_api::Result<Ack>,
) -> Result<Ack> {
    match result {
        Ok(ack) => {
            info!(message = ack.message.as_deref().unwrap_or_default(), "{what} finished");
            Ok(ack)
        }
        Err(e) => {
            warn!("{what} failed: {e}");
            lock(state).error = Some(e.to_string());
            Err(e.into())
        }
    }
}
