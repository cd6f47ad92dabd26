//! Collections of server entities the user edits locally before saving.
//!
//! Every entity is held as a pair: `synced` is the last value the server
//! confirmed, `buffer` is what the user is editing. An entity is dirty while
//! the two differ. Saving sends a snapshot of the buffer and, once the server
//! confirms, that snapshot becomes the new `synced` value. The buffer itself
//! is never touched by a save, so a failure loses nothing.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use oceandesk_api::{Ack, Api, Transport};

use super::{Status, Tickets, lock};
use crate::error::{Error, Result};
use crate::guard::Activity;

/// A kind of server entity that can be listed, edited and saved.
pub trait EditableResource: Send + Sync + 'static {
    /// Entity identifier.
    type Id: Copy + Eq + fmt::Display + fmt::Debug + Send + Sync + 'static;
    /// Entity value.
    type Item: Clone + PartialEq + fmt::Debug + Send + Sync + 'static;
    /// Editable fields of an entity.
    type Field: Copy + fmt::Debug;

    /// Lower-case name used in logs and errors.
    const KIND: &'static str;

    /// Identifier of an entity.
    fn id(item: &Self::Item) -> Self::Id;

    /// Writes one field.
    fn set_field(item: &mut Self::Item, field: Self::Field, value: String);

    /// Fetches the whole collection.
    fn list<T: Transport>(
        api: &Api<T>,
    ) -> impl Future<Output = oceandesk_api::Result<Vec<Self::Item>>> + Send;

    /// Persists one entity.
    fn save<T: Transport>(
        api: &Api<T>,
        item: &Self::Item,
    ) -> impl Future<Output = oceandesk_api::Result<Self::Item>> + Send;
}

/// An [`EditableResource`] the backend can also delete.
pub trait DeletableResource: EditableResource {
    /// Removes one entity on the server.
    fn delete<T: Transport>(
        api: &Api<T>,
        id: Self::Id,
    ) -> impl Future<Output = oceandesk_api::Result<Ack>> + Send;
}

/// Read-only view of one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditableItem<I> {
    /// Last server-confirmed value.
    pub synced: I,
    /// The value being edited.
    pub buffer: I,
    /// Whether `buffer` differs from `synced`.
    pub dirty: bool,
    /// Whether a save is in flight.
    pub saving: bool,
    /// Whether a delete is in flight.
    pub deleting: bool,
    /// Latest save or delete failure for this entity.
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
struct Entry<I> {
    synced: I,
    buffer: I,
    saves: Tickets,
    saving: usize,
    deleting: bool,
    error: Option<String>,
}

impl<I: Clone + PartialEq> Entry<I> {
    fn new(item: I) -> Self {
        Self {
            buffer: item.clone(),
            synced: item,
            saves: Tickets::default(),
            saving: 0,
            deleting: false,
            error: None,
        }
    }

    fn is_dirty(&self) -> bool {
        self.buffer != self.synced
    }

    /// Adopts a freshly fetched server value. Unsaved edits survive.
    fn rebase(&mut self, fresh: I) {
        if self.is_dirty() {
            self.synced = fresh;
        } else {
            self.buffer = fresh.clone();
            self.synced = fresh;
            self.error = None;
        }
    }

    fn view(&self) -> EditableItem<I> {
        EditableItem {
            synced: self.synced.clone(),
            buffer: self.buffer.clone(),
            dirty: self.is_dirty(),
            saving: self.saving > 0,
            deleting: self.deleting,
            error: self.error.clone(),
        }
    }
}

struct EditableState<R: EditableResource> {
    entries: Vec<Entry<R::Item>>,
    error: Option<String>,
    tickets: Tickets,
    selected: Option<R::Id>,
}

impl<R: EditableResource> Default for EditableState<R> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            error: None,
            tickets: Tickets::default(),
            selected: None,
        }
    }
}

impl<R: EditableResource> EditableState<R> {
    fn find(&self, id: R::Id) -> Option<&Entry<R::Item>> {
        self.entries.iter().find(|e| R::id(&e.synced) == id)
    }

    fn find_mut(&mut self, id: R::Id) -> Option<&mut Entry<R::Item>> {
        self.entries.iter_mut().find(|e| R::id(&e.synced) == id)
    }

    fn entry_mut(&mut self, id: R::Id) -> Result<&mut Entry<R::Item>> {
        self.find_mut(id).ok_or_else(|| Error::unknown(R::KIND, id))
    }

    /// Replaces the collection with `fresh`, keeping local state of entities
    /// that are still present.
    fn merge(&mut self, fresh: Vec<R::Item>) {
        let mut previous = std::mem::take(&mut self.entries);
        self.entries = fresh
            .into_iter()
            .map(|item| {
                let id = R::id(&item);
                match previous.iter().position(|e| R::id(&e.synced) == id) {
                    Some(index) => {
                        let mut entry = previous.swap_remove(index);
                        entry.rebase(item);
                        entry
                    }
                    None => Entry::new(item),
                }
            })
            .collect();

        for dropped in &previous {
            if dropped.is_dirty() {
                warn!(
                    kind = R::KIND,
                    id = %R::id(&dropped.synced),
                    "discarding unsaved edits of removed entity"
                );
            }
        }
        if let Some(selected) = self.selected
            && self.find(selected).is_none()
        {
            self.selected = None;
        }
    }
}

/// Which in-flight marker a [`Pending`] guard clears.
#[derive(Debug, Clone, Copy)]
enum Op {
    Save,
    Delete,
}

/// Clears an entity's in-flight marker when the request settles or is dropped.
struct Pending<R: EditableResource> {
    state: Arc<Mutex<EditableState<R>>>,
    id: R::Id,
    op: Op,
}

impl<R: EditableResource> Drop for Pending<R> {
    fn drop(&mut self) {
        let mut state = lock(&self.state);
        if let Some(entry) = state.find_mut(self.id) {
            match self.op {
                Op::Save => entry.saving = entry.saving.saturating_sub(1),
                Op::Delete => entry.deleting = false,
            }
        }
    }
}

/// Store of editable entities of kind `R`.
///
/// Cloning is cheap; clones share state.
pub struct EditableStore<R: EditableResource, T> {
    api: Api<T>,
    state: Arc<Mutex<EditableState<R>>>,
    activity: Activity,
}

impl<R: EditableResource, T> Clone for EditableStore<R, T> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            state: Arc::clone(&self.state),
            activity: self.activity.clone(),
        }
    }
}

impl<R: EditableResource, T> fmt::Debug for EditableStore<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditableStore")
            .field("kind", &R::KIND)
            .field("len", &lock(&self.state).entries.len())
            .field("loading", &self.activity.count())
            .finish_non_exhaustive()
    }
}

impl<R: EditableResource, T: Transport> EditableStore<R, T> {
    /// Creates an empty store.
    #[must_use]
    pub fn new(api: Api<T>) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(EditableState::default())),
            activity: Activity::new(),
        }
    }

    /// Replaces the collection with the backend's current list.
    ///
    /// Entities with unsaved edits keep their buffer; entities the backend no
    /// longer returns are dropped. Out-of-order responses are discarded.
    pub fn fetch_all(&self) -> impl Future<Output = Result<usize>> + Send + use<R, T> {
        let guard = self.activity.begin();
        let ticket = lock(&self.state).tickets.issue();
        let api = self.api.clone();
        let state = Arc::clone(&self.state);

        async move {
            let _guard = guard;
            debug!(kind = R::KIND, ticket, "fetching collection");
            let result = R::list(&api).await;
            settle_fetch(&state, ticket, result)
        }
    }

    /// Changes one field of an entity's edit buffer. Never contacts the server.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownEntity`] if the entity is not in the store.
    pub fn begin_edit(&self, id: R::Id, field: R::Field, value: impl Into<String>) -> Result<()> {
        let mut state = lock(&self.state);
        let entry = state.entry_mut(id)?;
        R::set_field(&mut entry.buffer, field, value.into());
        Ok(())
    }

    /// Throws away unsaved edits of one entity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownEntity`] if the entity is not in the store.
    pub fn discard(&self, id: R::Id) -> Result<()> {
        let mut state = lock(&self.state);
        let entry = state.entry_mut(id)?;
        entry.buffer = entry.synced.clone();
        entry.error = None;
        Ok(())
    }

    /// Sends a snapshot of the entity's buffer to the backend.
    ///
    /// On success the snapshot becomes the synced value, unless a save issued
    /// later has already been confirmed. On failure the buffer stays as it is
    /// and the entity records the error. A reply carrying another entity's id
    /// counts as a failure ([`Error::Diverged`]).
    pub fn save(&self, id: R::Id) -> impl Future<Output = Result<R::Item>> + Send + use<R, T> {
        let prepared = self.prepare_save(id);
        let api = self.api.clone();
        let state = Arc::clone(&self.state);

        async move {
            let (sent, ticket, _pending) = prepared?;
            debug!(kind = R::KIND, %id, ticket, "saving");
            let result = R::save(&api, &sent).await;
            settle_save(&state, id, sent, ticket, result)
        }
    }

    fn prepare_save(&self, id: R::Id) -> Result<(R::Item, u64, Pending<R>)> {
        let mut state = lock(&self.state);
        let entry = state.entry_mut(id)?;
        if entry.deleting {
            return Err(Error::busy(R::KIND, id));
        }
        let ticket = entry.saves.issue();
        entry.saving += 1;
        let sent = entry.buffer.clone();
        drop(state);
        Ok((sent, ticket, self.pending(id, Op::Save)))
    }

    fn pending(&self, id: R::Id, op: Op) -> Pending<R> {
        Pending {
            state: Arc::clone(&self.state),
            id,
            op,
        }
    }

    /// Marks one entity as the one being edited.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownEntity`] if the entity is not in the store.
    pub fn select(&self, id: R::Id) -> Result<()> {
        let mut state = lock(&self.state);
        if state.find(id).is_none() {
            return Err(Error::unknown(R::KIND, id));
        }
        state.selected = Some(id);
        Ok(())
    }

    /// Clears the selection.
    pub fn clear_selection(&self) {
        lock(&self.state).selected = None;
    }

    /// The selected entity's id.
    #[must_use]
    pub fn selected(&self) -> Option<R::Id> {
        lock(&self.state).selected
    }

    /// The selected entity.
    #[must_use]
    pub fn selected_item(&self) -> Option<EditableItem<R::Item>> {
        let state = lock(&self.state);
        state
            .selected
            .and_then(|id| state.find(id))
            .map(Entry::view)
    }

    /// Snapshot of all entities in server order.
    #[must_use]
    pub fn items(&self) -> Vec<EditableItem<R::Item>> {
        lock(&self.state).entries.iter().map(Entry::view).collect()
    }

    /// Snapshot of one entity.
    #[must_use]
    pub fn item(&self, id: R::Id) -> Option<EditableItem<R::Item>> {
        lock(&self.state).find(id).map(Entry::view)
    }

    /// Whether the entity has unsaved edits. Unknown entities are clean.
    #[must_use]
    pub fn is_dirty(&self, id: R::Id) -> bool {
        lock(&self.state).find(id).is_some_and(Entry::is_dirty)
    }

    /// Whether a save of the entity is in flight.
    #[must_use]
    pub fn is_saving(&self, id: R::Id) -> bool {
        lock(&self.state).find(id).is_some_and(|e| e.saving > 0)
    }

    /// Ids of entities with unsaved edits.
    #[must_use]
    pub fn dirty_ids(&self) -> Vec<R::Id> {
        lock(&self.state)
            .entries
            .iter()
            .filter(|e| e.is_dirty())
            .map(|e| R::id(&e.synced))
            .collect()
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.state).entries.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.state).entries.is_empty()
    }

    /// Whether a fetch is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.activity.is_active()
    }

    /// Message of the latest fetch failure.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        lock(&self.state).error.clone()
    }

    /// Overall lifecycle of the collection.
    #[must_use]
    pub fn status(&self) -> Status {
        let state = lock(&self.state);
        Status::resolve(
            self.activity.is_active(),
            state.error.is_some(),
            state.tickets.has_applied(),
        )
    }

    /// First synced value matching `f`, in server order.
    pub(crate) fn find_synced(&self, mut f: impl FnMut(&R::Item) -> bool) -> Option<R::Item> {
        lock(&self.state)
            .entries
            .iter()
            .find(|e| f(&e.synced))
            .map(|e| e.synced.clone())
    }
}

impl<R: DeletableResource, T: Transport> EditableStore<R, T> {
    /// Deletes an entity on the server.
    ///
    /// The entity leaves the store only after the backend confirms; on failure
    /// it stays, with the error recorded on it.
    pub fn delete(&self, id: R::Id) -> impl Future<Output = Result<()>> + Send + use<R, T> {
        let prepared = self.prepare_delete(id);
        let api = self.api.clone();
        let state = Arc::clone(&self.state);

        async move {
            let _pending = prepared?;
            debug!(kind = R::KIND, %id, "deleting");
            let result = R::delete(&api, id).await;
            settle_delete(&state, id, result)
        }
    }

    fn prepare_delete(&self, id: R::Id) -> Result<Pending<R>> {
        let mut state = lock(&self.state);
        let entry = state.entry_mut(id)?;
        if entry.deleting || entry.saving > 0 {
            return Err(Error::busy(R::KIND, id));
        }
        entry.deleting = true;
        drop(state);
        Ok(self.pending(id, Op::Delete))
    }
}

fn settle_fetch<R: EditableResource>(
    state: &Mutex<EditableState<R>>,
    ticket: u64,
    result: oceandesk_api::Result<Vec<R::Item>>,
) -> Result<usize> {
    let mut state = lock(state);
    let settle = state.tickets.settle(ticket, result.is_ok());
    match result {
        Ok(items) => {
            let count = items.len();
            if settle.data {
                state.merge(items);
                info!(kind = R::KIND, count, "collection refreshed");
            } else {
                debug!(kind = R::KIND, ticket, "discarding stale response");
            }
            if settle.outcome {
                state.error = None;
            }
            Ok(count)
        }
        Err(e) => {
            warn!(kind = R::KIND, "fetch failed: {e}");
            if settle.outcome {
                state.error = Some(e.to_string());
            }
            Err(e.into())
        }
    }
}

fn settle_save<R: EditableResource>(
    state: &Mutex<EditableState<R>>,
    id: R::Id,
    sent: R::Item,
    ticket: u64,
    result: oceandesk_api::Result<R::Item>,
) -> Result<R::Item> {
    // A reply naming another entity means the server stored a new copy.
    let result = result.map_err(Error::from).and_then(|saved| {
        let returned = R::id(&saved);
        if returned == id {
            Ok(saved)
        } else {
            Err(Error::diverged(R::KIND, id, returned))
        }
    });

    let mut state = lock(state);
    let Some(entry) = state.find_mut(id) else {
        debug!(kind = R::KIND, %id, "entity removed before its save settled");
        return result.map(|_| sent);
    };

    let settle = entry.saves.settle(ticket, result.is_ok());
    match result {
        Ok(_) => {
            if settle.data {
                entry.synced = sent.clone();
                info!(kind = R::KIND, %id, "saved");
            } else {
                debug!(kind = R::KIND, %id, ticket, "superseded by a later save");
            }
            if settle.outcome {
                entry.error = None;
            }
            Ok(sent)
        }
        Err(e) => {
            warn!(kind = R::KIND, %id, "save failed: {e}");
            if settle.outcome {
                entry.error = Some(e.to_string());
            }
            Err(e)
        }
    }
}

fn settle_delete<R: EditableResource>(
    state: &Mutex<EditableState<R>>,
    id: R::Id,
    result: oceandesk_api::Result<Ack>,
) -> Result<()> {
    let mut state = lock(state);
    match result {
        Ok(_) => {
            state.entries.retain(|e| R::id(&e.synced) != id);
            if state.selected == Some(id) {
                state.selected = None;
            }
            info!(kind = R::KIND, %id, "deleted");
            Ok(())
        }
        Err(e) => {
            warn!(kind = R::KIND, %id, "delete failed: {e}");
            if let Some(entry) = state.find_mut(id) {
                entry.error = Some(e.to_string());
            }
            Err(e.into())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::prompts::{PromptField, PromptStore};
    use crate::testing::{ScriptedTransport, prompt};
    use oceandesk_api::{Method, PromptId};
    use serde_json::json;
    use tokio_test::{assert_pending, assert_ready, task};

    const AUTO_REPLY: PromptId = PromptId(1);
    const SUMMARY: PromptId = PromptId(2);

    async fn loaded(transport: &Arc<ScriptedTransport>) -> PromptStore<ScriptedTransport> {
        transport.reply(
            Method::Get,
            "/prompts",
            json!([
                prompt(1, "auto_reply", "Reply politely."),
                prompt(2, "summary", "Summarize."),
            ]),
        );
        let store = PromptStore::new(Api::from_shared(Arc::clone(transport)));
        store.fetch_all().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_dirty_iff_buffer_differs_from_synced() {
        let transport = ScriptedTransport::shared();
        let store = loaded(&transport).await;
        assert!(!store.is_dirty(AUTO_REPLY));

        store
            .begin_edit(AUTO_REPLY, PromptField::Template, "Reply tersely.")
            .unwrap();
        assert!(store.is_dirty(AUTO_REPLY));
        assert!(!store.is_dirty(SUMMARY));

        store
            .begin_edit(AUTO_REPLY, PromptField::Template, "Reply politely.")
            .unwrap();
        assert!(!store.is_dirty(AUTO_REPLY));
        assert!(store.dirty_ids().is_empty());
    }

    #[tokio::test]
    async fn test_edit_does_not_contact_server() {
        let transport = ScriptedTransport::shared();
        let store = loaded(&transport).await;

        store.begin_edit(SUMMARY, PromptField::Template, "x").unwrap();

        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_entity_is_rejected() {
        let transport = ScriptedTransport::shared();
        let store = loaded(&transport).await;

        let err = store
            .begin_edit(PromptId(99), PromptField::Template, "x")
            .unwrap_err();
        assert!(matches!(err, Error::UnknownEntity { kind: "prompt", .. }));
        assert!(store.save(PromptId(99)).await.is_err());
        assert_eq!(transport.calls(Method::Post, "/prompts"), 0);
    }

    #[tokio::test]
    async fn test_successful_save_syncs_sent_snapshot() {
        let transport = ScriptedTransport::shared();
        let store = loaded(&transport).await;
        transport.reply(Method::Post, "/prompts", prompt(1, "auto_reply", "Reply tersely."));

        store
            .begin_edit(AUTO_REPLY, PromptField::Template, "Reply tersely.")
            .unwrap();
        store.save(AUTO_REPLY).await.unwrap();

        let item = store.item(AUTO_REPLY).unwrap();
        assert_eq!(item.synced.template, "Reply tersely.");
        assert!(!item.dirty);
        assert!(!item.saving);
        let sent = &transport.requests()[1];
        assert_eq!(sent.body.as_ref().unwrap()["template"], "Reply tersely.");
    }

    #[tokio::test]
    async fn test_failed_save_preserves_buffer() {
        let transport = ScriptedTransport::shared();
        let store = loaded(&transport).await;
        transport.fail(Method::Post, "/prompts", 500);

        store
            .begin_edit(AUTO_REPLY, PromptField::Template, "Reply tersely.")
            .unwrap();
        assert!(store.save(AUTO_REPLY).await.is_err());

        let item = store.item(AUTO_REPLY).unwrap();
        assert_eq!(item.buffer.template, "Reply tersely.");
        assert_eq!(item.synced.template, "Reply politely.");
        assert!(item.dirty);
        assert!(item.error.is_some());
    }

    #[tokio::test]
    async fn test_save_answered_with_other_id_stays_dirty() {
        let transport = ScriptedTransport::shared();
        let store = loaded(&transport).await;
        transport.reply(Method::Post, "/prompts", prompt(7, "auto_reply", "Reply tersely."));

        store
            .begin_edit(AUTO_REPLY, PromptField::Template, "Reply tersely.")
            .unwrap();
        let err = store.save(AUTO_REPLY).await.unwrap_err();

        assert!(matches!(err, Error::Diverged { kind: "prompt", .. }));
        let item = store.item(AUTO_REPLY).unwrap();
        assert_eq!(item.synced.template, "Reply politely.");
        assert_eq!(item.buffer.template, "Reply tersely.");
        assert!(item.dirty);
        assert!(item.error.is_some());
        assert!(!item.saving);
    }

    #[tokio::test]
    async fn test_saving_one_entity_leaves_others_dirty() {
        let transport = ScriptedTransport::shared();
        let store = loaded(&transport).await;
        transport.reply(Method::Post, "/prompts", prompt(1, "auto_reply", "Reply tersely."));

        store
            .begin_edit(AUTO_REPLY, PromptField::Template, "Reply tersely.")
            .unwrap();
        store
            .begin_edit(SUMMARY, PromptField::Template, "Summarize in a line.")
            .unwrap();
        store.save(AUTO_REPLY).await.unwrap();

        assert!(!store.is_dirty(AUTO_REPLY));
        assert!(store.is_dirty(SUMMARY));
        assert_eq!(store.dirty_ids(), vec![SUMMARY]);
        let summary = store.item(SUMMARY).unwrap();
        assert_eq!(summary.buffer.template, "Summarize in a line.");
        assert_eq!(summary.synced.template, "Summarize.");
    }

    #[tokio::test]
    async fn test_pending_save_does_not_block_other_entity() {
        let transport = ScriptedTransport::shared();
        let store = loaded(&transport).await;
        let gate = transport.gate(Method::Post, "/prompts");

        store.begin_edit(AUTO_REPLY, PromptField::Template, "v1").unwrap();
        let mut save = task::spawn(store.save(AUTO_REPLY));
        assert_pending!(save.poll());

        store.begin_edit(SUMMARY, PromptField::Template, "Summarize twice.").unwrap();
        assert!(store.is_dirty(SUMMARY));
        assert!(!store.is_saving(SUMMARY));
        store.discard(SUMMARY).unwrap();
        assert!(!store.is_dirty(SUMMARY));
        assert!(store.is_saving(AUTO_REPLY));

        gate.send(Ok(prompt(1, "auto_reply", "v1"))).unwrap();
        assert_ready!(save.poll()).unwrap();

        assert!(!store.is_dirty(AUTO_REPLY));
        let summary = store.item(SUMMARY).unwrap();
        assert_eq!(summary.buffer.template, "Summarize.");
        assert!(summary.error.is_none());
    }

    #[tokio::test]
    async fn test_edits_during_save_stay_dirty() {
        let transport = ScriptedTransport::shared();
        let store = loaded(&transport).await;
        let gate = transport.gate(Method::Post, "/prompts");

        store.begin_edit(AUTO_REPLY, PromptField::Template, "v1").unwrap();
        let mut save = task::spawn(store.save(AUTO_REPLY));
        assert_pending!(save.poll());
        assert!(store.is_saving(AUTO_REPLY));

        store.begin_edit(AUTO_REPLY, PromptField::Template, "v2").unwrap();
        gate.send(Ok(prompt(1, "auto_reply", "v1"))).unwrap();
        assert_ready!(save.poll()).unwrap();

        let item = store.item(AUTO_REPLY).unwrap();
        assert_eq!(item.synced.template, "v1");
        assert_eq!(item.buffer.template, "v2");
        assert!(item.dirty);
        assert!(!item.saving);
    }

    #[tokio::test]
    async fn test_last_issued_save_wins() {
        let transport = ScriptedTransport::shared();
        let store = loaded(&transport).await;
        let first_gate = transport.gate(Method::Post, "/prompts");
        let second_gate = transport.gate(Method::Post, "/prompts");

        store.begin_edit(AUTO_REPLY, PromptField::Template, "first").unwrap();
        let mut first = task::spawn(store.save(AUTO_REPLY));
        assert_pending!(first.poll());
        store.begin_edit(AUTO_REPLY, PromptField::Template, "second").unwrap();
        let mut second = task::spawn(store.save(AUTO_REPLY));
        assert_pending!(second.poll());

        second_gate.send(Ok(prompt(1, "auto_reply", "second"))).unwrap();
        assert_ready!(second.poll()).unwrap();
        first_gate.send(Ok(prompt(1, "auto_reply", "first"))).unwrap();
        assert_ready!(first.poll()).unwrap();

        let item = store.item(AUTO_REPLY).unwrap();
        assert_eq!(item.synced.template, "second");
        assert!(!item.dirty);
    }

    #[tokio::test]
    async fn test_dropped_save_clears_saving_flag() {
        let transport = ScriptedTransport::shared();
        let store = loaded(&transport).await;
        let _gate = transport.gate(Method::Post, "/prompts");

        let mut save = task::spawn(store.save(AUTO_REPLY));
        assert_pending!(save.poll());
        assert!(store.is_saving(AUTO_REPLY));

        drop(save);
        assert!(!store.is_saving(AUTO_REPLY));
    }

    #[tokio::test]
    async fn test_refetch_keeps_dirty_buffers_and_drops_removed() {
        let transport = ScriptedTransport::shared();
        let store = loaded(&transport).await;
        store.begin_edit(AUTO_REPLY, PromptField::Template, "mine").unwrap();
        store.select(SUMMARY).unwrap();

        transport.reply(
            Method::Get,
            "/prompts",
            json!([prompt(1, "auto_reply", "theirs"), prompt(3, "triage", "Sort.")]),
        );
        store.fetch_all().await.unwrap();

        let items = store.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].synced.template, "theirs");
        assert_eq!(items[0].buffer.template, "mine");
        assert!(items[0].dirty);
        assert!(!items[1].dirty);
        assert!(store.item(SUMMARY).is_none());
        assert_eq!(store.selected(), None);
    }

    #[tokio::test]
    async fn test_refetch_updates_clean_entities() {
        let transport = ScriptedTransport::shared();
        let store = loaded(&transport).await;

        transport.reply(
            Method::Get,
            "/prompts",
            json!([prompt(1, "auto_reply", "Updated elsewhere."), prompt(2, "summary", "Summarize.")]),
        );
        store.fetch_all().await.unwrap();

        let item = store.item(AUTO_REPLY).unwrap();
        assert_eq!(item.buffer.template, "Updated elsewhere.");
        assert!(!item.dirty);
    }

    #[tokio::test]
    async fn test_discard_restores_synced() {
        let transport = ScriptedTransport::shared();
        let store = loaded(&transport).await;
        store.begin_edit(SUMMARY, PromptField::Description, "").unwrap();
        assert!(store.is_dirty(SUMMARY));

        store.discard(SUMMARY).unwrap();

        assert!(!store.is_dirty(SUMMARY));
    }
}
