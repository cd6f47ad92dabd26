//! Scripted in-memory transport for store tests.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use tokio::sync::oneshot;

use oceandesk_api::{Method, Result, Transport, TransportError};

/// Outcome a gated reply is released with: a body or a status code.
pub type Release = std::result::Result<Value, u16>;

enum Reply {
    Ok(Value),
    Fail(u16),
    Gated(oneshot::Receiver<Release>),
}

/// A request the transport has seen.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Default)]
struct Script {
    replies: HashMap<(Method, String), VecDeque<Reply>>,
    calls: Vec<Call>,
}

/// Answers each `(method, path)` with queued replies, in order.
///
/// Unscripted requests fail with 404.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<Script>,
}

impl ScriptedTransport {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        self.script
            .lock()
            .unwrap()
            .replies
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    pub fn reply(&self, method: Method, path: &str, body: Value) {
        self.push(method, path, Reply::Ok(body));
    }

    pub fn fail(&self, method: Method, path: &str, status: u16) {
        self.push(method, path, Reply::Fail(status));
    }

    /// Queues a reply that stays pending until the returned sender fires.
    pub fn gate(&self, method: Method, path: &str) -> oneshot::Sender<Release> {
        let (tx, rx) = oneshot::channel();
        self.push(method, path, Reply::Gated(rx));
        tx
    }

    pub fn calls(&self, method: Method, path: &str) -> usize {
        self.script
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .count()
    }

    pub fn requests(&self) -> Vec<Call> {
        self.script.lock().unwrap().calls.clone()
    }
}

fn status_error(method: Method, path: &str, status: u16) -> TransportError {
    TransportError::Status {
        method,
        path: path.to_string(),
        status,
        body: "scripted failure".to_string(),
    }
}

impl Transport for ScriptedTransport {
    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let reply = {
            let mut script = self.script.lock().unwrap();
            script.calls.push(Call {
                method,
                path: path.to_string(),
                body,
            });
            script
                .replies
                .get_mut(&(method, path.to_string()))
                .and_then(VecDeque::pop_front)
        };

        let released = match reply {
            None => Err(404),
            Some(Reply::Ok(value)) => Ok(value),
            Some(Reply::Fail(status)) => Err(status),
            Some(Reply::Gated(rx)) => rx.await.unwrap_or(Err(503)),
        };
        released.map_err(|status| status_error(method, path, status))
    }
}

pub fn email(id: i64, category: &str) -> Value {
    json!({
        "id": id,
        "sender": format!("sender{id}@example.com"),
        "subject": format!("Subject {id}"),
        "body": "Body",
        "timestamp": "2025-11-20T08:15:30",
        "category": category,
        "is_read": false,
        "action_items": "[]"
    })
}

pub fn prompt(id: i64, name: &str, template: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "template": template,
        "description": format!("{name} prompt"),
    })
}

pub fn draft(id: i64, subject: &str, body: &str) -> Value {
    json!({
        "id": id,
        "email_id": id * 10,
        "subject": subject,
        "body": body,
        "status": "draft",
    })
}
