//! Conversation with the email agent.
//!
//! At most one turn is outstanding. A turn always ends with exactly one agent
//! message: the reply, or a fixed fallback if the request failed.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use oceandesk_api::{Api, ChatRequest, EmailId, Transport};

use crate::store::lock;

/// First message of every new session.
pub const GREETING: &str =
    "Hello! I am your Ocean AI Email Agent. How can I help you with your inbox today?";

/// Agent message shown in place of a reply when a turn fails.
pub const FALLBACK_REPLY: &str = "I'm sorry, I encountered an error processing your request.";

/// Identifier of a message within one session. Strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The person using the dashboard.
    User,
    /// The email agent.
    Agent,
}

/// One entry of the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Position in the session.
    pub id: MessageId,
    /// Author.
    pub role: Role,
    /// Text.
    pub content: String,
}

/// Whether the session can accept a new message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Ready for input.
    Composing,
    /// A turn is in flight.
    AwaitingResponse,
}

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The agent replied.
    Resolved,
    /// The request failed and the fallback reply was appended.
    Failed,
}

#[derive(Debug, Default)]
struct ChatState {
    messages: Vec<ChatMessage>,
    next_id: u64,
    input: String,
    awaiting: bool,
    last_outcome: Option<TurnOutcome>,
    context: Option<EmailId>,
}

impl ChatState {
    fn push(&mut self, role: Role, content: String) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        self.messages.push(ChatMessage { id, role, content });
        id
    }
}

/// Ends a turn exactly once, with a fallback if it never completed.
struct Turn {
    state: Arc<Mutex<ChatState>>,
    done: bool,
}

impl Turn {
    fn finish(mut self, reply: Option<String>) -> TurnOutcome {
        self.done = true;
        let outcome = if reply.is_some() {
            TurnOutcome::Resolved
        } else {
            TurnOutcome::Failed
        };
        end_turn(&self.state, reply, outcome);
        outcome
    }
}

impl Drop for Turn {
    fn drop(&mut self) {
        if !self.done {
            debug!("chat turn abandoned");
            end_turn(&self.state, None, TurnOutcome::Failed);
        }
    }
}

fn end_turn(state: &Mutex<ChatState>, reply: Option<String>, outcome: TurnOutcome) {
    let mut state = lock(state);
    state.push(
        Role::Agent,
        reply.unwrap_or_else(|| FALLBACK_REPLY.to_string()),
    );
    state.awaiting = false;
    state.last_outcome = Some(outcome);
}

/// An append-only conversation with the agent.
///
/// Cloning is cheap; clones share the transcript.
#[derive(Debug)]
pub struct ChatSession<T> {
    api: Api<T>,
    state: Arc<Mutex<ChatState>>,
}

impl<T> Clone for ChatSession<T> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: Transport> ChatSession<T> {
    /// Starts a session with the standard greeting.
    #[must_use]
    pub fn new(api: Api<T>) -> Self {
        Self::with_greeting(api, Some(GREETING))
    }

    /// Starts a session with a custom greeting, or none.
    #[must_use]
    pub fn with_greeting(api: Api<T>, greeting: Option<&str>) -> Self {
        let mut state = ChatState::default();
        if let Some(greeting) = greeting {
            state.push(Role::Agent, greeting.to_string());
        }
        Self {
            api,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Sends `text` as the user's next message.
    ///
    /// Returns `None` and changes nothing if `text` is blank or a turn is
    /// already in flight. Otherwise the user message is appended and the
    /// session is awaiting before this returns; the future appends the reply.
    pub fn submit(&self, text: &str) -> Option<impl Future<Output = TurnOutcome> + Send + use<T>> {
        if text.trim().is_empty() {
            return None;
        }

        let request = {
            let mut state = lock(&self.state);
            if state.awaiting {
                debug!("turn in flight, ignoring submit");
                return None;
            }
            state.awaiting = true;
            state.push(Role::User, text.to_owned());
            state.input.clear();
            ChatRequest {
                query: text.to_owned(),
                email_id: state.context,
            }
        };

        let turn = Turn {
            state: Arc::clone(&self.state),
            done: false,
        };
        let api = self.api.clone();

        Some(async move {
            match api.chat(&request).await {
                Ok(reply) => turn.finish(Some(reply.response)),
                Err(e) => {
                    warn!("chat turn failed: {e}");
                    turn.finish(None)
                }
            }
        })
    }

    /// Sends the composing buffer.
    pub fn submit_input(&self) -> Option<impl Future<Output = TurnOutcome> + Send + use<T>> {
        let text = self.input();
        self.submit(&text)
    }

    /// Snapshot of the transcript.
    #[must_use]
    pub fn messages(&self) -> Vec<ChatMessage> {
        lock(&self.state).messages.clone()
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.state).messages.len()
    }

    /// Whether the transcript is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.state).messages.is_empty()
    }

    /// Current turn state.
    #[must_use]
    pub fn state(&self) -> TurnState {
        if lock(&self.state).awaiting {
            TurnState::AwaitingResponse
        } else {
            TurnState::Composing
        }
    }

    /// Whether a turn is in flight.
    #[must_use]
    pub fn is_awaiting(&self) -> bool {
        self.state() == TurnState::AwaitingResponse
    }

    /// How the latest turn ended.
    #[must_use]
    pub fn last_outcome(&self) -> Option<TurnOutcome> {
        lock(&self.state).last_outcome
    }

    /// The composing buffer.
    #[must_use]
    pub fn input(&self) -> String {
        lock(&self.state).input.clone()
    }

    /// Replaces the composing buffer.
    pub fn set_input(&self, input: impl Into<String>) {
        lock(&self.state).input = input.into();
    }

    /// Email that later turns are about.
    #[must_use]
    pub fn context(&self) -> Option<EmailId> {
        lock(&self.state).context
    }

    /// Sets or clears the email later turns are about.
    pub fn set_context(&self, email: Option<EmailId>) {
        lock(&self.state).context = email;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use oceandesk_api::Method;
    use serde_json::json;
    use tokio_test::{assert_pending, assert_ready, task};

    fn session(transport: &Arc<ScriptedTransport>) -> ChatSession<ScriptedTransport> {
        ChatSession::new(Api::from_shared(Arc::clone(transport)))
    }

    #[test]
    fn test_starts_with_greeting() {
        let transport = ScriptedTransport::shared();
        let chat = session(&transport);

        let messages = chat.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::Agent);
        assert_eq!(messages[0].content, GREETING);
        assert_eq!(chat.state(), TurnState::Composing);

        let silent = ChatSession::with_greeting(Api::from_shared(transport), None);
        assert!(silent.is_empty());
    }

    #[test]
    fn test_blank_submit_is_a_no_op() {
        let transport = ScriptedTransport::shared();
        let chat = session(&transport);

        assert!(chat.submit("").is_none());
        assert!(chat.submit("   \n").is_none());
        assert_eq!(chat.len(), 1);
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_one_turn_at_a_time() {
        let transport = ScriptedTransport::shared();
        let gate = transport.gate(Method::Post, "/chat");
        let chat = session(&transport);

        let mut turn = task::spawn(chat.submit("What's urgent?").unwrap());
        assert!(chat.is_awaiting());
        assert_pending!(turn.poll());

        assert!(chat.submit("Hello?").is_none());
        assert_eq!(chat.len(), 2);

        gate.send(Ok(json!({ "response": "The Q4 report." }))).unwrap();
        assert_eq!(assert_ready!(turn.poll()), TurnOutcome::Resolved);

        let messages = chat.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[2].content, "The Q4 report.");
        assert_eq!(chat.state(), TurnState::Composing);
        assert_eq!(transport.calls(Method::Post, "/chat"), 1);
    }

    #[tokio::test]
    async fn test_failure_appends_fallback() {
        let transport = ScriptedTransport::shared();
        transport.fail(Method::Post, "/chat", 500);
        let chat = session(&transport);

        let outcome = chat.submit("Summarize my inbox").unwrap().await;

        assert_eq!(outcome, TurnOutcome::Failed);
        let messages = chat.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].role, Role::Agent);
        assert_eq!(messages[2].content, FALLBACK_REPLY);
        assert_eq!(chat.last_outcome(), Some(TurnOutcome::Failed));
        assert!(!chat.is_awaiting());
    }

    #[tokio::test]
    async fn test_message_ids_strictly_increase() {
        let transport = ScriptedTransport::shared();
        transport.reply(Method::Post, "/chat", json!({ "response": "one" }));
        transport.fail(Method::Post, "/chat", 502);
        let chat = session(&transport);

        chat.submit("first").unwrap().await;
        chat.submit("second").unwrap().await;

        let ids: Vec<MessageId> = chat.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids.len(), 5);
        assert_eq!(ids[0], MessageId(0));
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_turn_outlives_submitted_text() {
        let transport = ScriptedTransport::shared();
        transport.reply(Method::Post, "/chat", json!({ "response": "Two invoices." }));
        let chat = session(&transport);

        let text = String::from("Anything overdue?");
        let turn = chat.submit(&text).unwrap();
        drop(text);

        assert_eq!(turn.await, TurnOutcome::Resolved);
        assert_eq!(chat.messages()[1].content, "Anything overdue?");
        assert_eq!(chat.messages()[1].id, MessageId(1));
    }

    #[tokio::test]
    async fn test_submit_input_sends_full_text_with_context() {
        let transport = ScriptedTransport::shared();
        transport.reply(Method::Post, "/chat", json!({ "response": "ok" }));
        let chat = session(&transport);
        chat.set_context(Some(EmailId(7)));
        chat.set_input("Draft a reply to this");

        chat.submit_input().unwrap().await;

        assert_eq!(chat.input(), "");
        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(body["query"], "Draft a reply to this");
        assert_eq!(body["email_id"], 7);
    }

    #[test]
    fn test_abandoned_turn_gets_fallback() {
        let transport = ScriptedTransport::shared();
        let _gate = transport.gate(Method::Post, "/chat");
        let chat = session(&transport);

        let mut turn = task::spawn(chat.submit("hi").unwrap());
        assert_pending!(turn.poll());
        drop(turn);

        assert!(!chat.is_awaiting());
        assert_eq!(chat.messages().last().unwrap().content, FALLBACK_REPLY);
    }
}
