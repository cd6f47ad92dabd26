//! Wire models exchanged with the agent backend.
//!
//! The backend is lenient about optional fields (`null` categories, naive
//! timestamps, stringly-typed action item lists), so decoding here is lenient
//! too: anything missing falls back to a sensible default instead of failing
//! the whole collection.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Create a new identifier.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Server-assigned identifier of an email.
    EmailId
);
entity_id!(
    /// Server-assigned identifier of a prompt.
    PromptId
);
entity_id!(
    /// Server-assigned identifier of a draft.
    DraftId
);

/// Category label assigned by the backend's processing pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Category {
    /// Needs attention soon.
    Important,
    /// Subscriptions and digests.
    Newsletter,
    /// Contains something the user has to do.
    ToDo,
    /// Junk.
    Spam,
    /// Not processed yet.
    #[default]
    Uncategorized,
    /// Any label the client does not know about.
    Other(String),
}

impl Category {
    /// The labels produced by the processing pass, in display order.
    pub const KNOWN: [Self; 4] = [Self::Important, Self::Newsletter, Self::ToDo, Self::Spam];

    /// Parse from the backend's label.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "Important" => Self::Important,
            "Newsletter" => Self::Newsletter,
            "To-Do" | "ToDo" | "Todo" => Self::ToDo,
            "Spam" => Self::Spam,
            "" | "Uncategorized" => Self::Uncategorized,
            other => Self::Other(other.to_string()),
        }
    }

    /// Convert to the backend's label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Important => "Important",
            Self::Newsletter => "Newsletter",
            Self::ToDo => "To-Do",
            Self::Spam => "Spam",
            Self::Uncategorized => "Uncategorized",
            Self::Other(label) => label,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(label.as_deref().map_or_else(Self::default, Self::parse))
    }
}

/// One extracted action item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionItem {
    /// What has to be done.
    pub task: String,
    /// Free-form deadline, if the extractor found one.
    pub deadline: Option<String>,
}

/// An email as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    /// Unique identifier.
    pub id: EmailId,
    /// Sender address.
    pub sender: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    /// Receive time.
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Category assigned by processing.
    #[serde(default)]
    pub category: Category,
    /// Whether the message has been read.
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_read: bool,
    /// Serialized JSON list of action items (`"[]"` when there are none).
    #[serde(default, deserialize_with = "null_as_default")]
    pub action_items: String,
}

impl Email {
    /// Whether processing extracted anything actionable.
    #[must_use]
    pub fn has_action_items(&self) -> bool {
        !self.action_items().is_empty()
    }

    /// Decodes the serialized action item list.
    ///
    /// Entries may be plain strings or `{ "task", "deadline" }` objects.
    /// Unparsable payloads yield an empty list.
    #[must_use]
    pub fn action_items(&self) -> Vec<ActionItem> {
        let raw = self.action_items.trim();
        if raw.is_empty() || raw == "[]" {
            return Vec::new();
        }
        let Ok(entries) = serde_json::from_str::<Vec<serde_json::Value>>(raw) else {
            return Vec::new();
        };
        entries.into_iter().filter_map(action_item_from_value).collect()
    }
}

fn action_item_from_value(value: serde_json::Value) -> Option<ActionItem> {
    match value {
        serde_json::Value::String(task) if !task.trim().is_empty() => Some(ActionItem {
            task,
            deadline: None,
        }),
        serde_json::Value::Object(map) => {
            let task = map.get("task").and_then(serde_json::Value::as_str)?;
            let deadline = map
                .get("deadline")
                .and_then(serde_json::Value::as_str)
                .map(ToString::to_string);
            Some(ActionItem {
                task: task.to_string(),
                deadline,
            })
        }
        _ => None,
    }
}

/// A reusable instruction template that steers the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    /// Unique identifier.
    pub id: PromptId,
    /// Stable key (e.g. `auto_reply`).
    pub name: String,
    /// The editable template text.
    pub template: String,
    /// What the prompt is used for.
    #[serde(default)]
    pub description: Option<String>,
}

impl Prompt {
    /// Human-readable label derived from the key (`auto_reply` → `Auto Reply`).
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name
            .split(['_', '-'])
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars).collect::<String>()
                })
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Lifecycle tag of a draft.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DraftStatus {
    /// Still being edited.
    #[default]
    Draft,
    /// Already sent.
    Sent,
    /// Any tag the client does not know about.
    Other(String),
}

impl DraftStatus {
    /// Parse from the backend's tag.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "" | "draft" => Self::Draft,
            "sent" => Self::Sent,
            _ => Self::Other(s.trim().to_string()),
        }
    }

    /// Convert to the backend's tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Other(tag) => tag,
        }
    }
}

impl Serialize for DraftStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DraftStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = Option::<String>::deserialize(deserializer)?;
        Ok(tag.as_deref().map_or_else(Self::default, Self::parse))
    }
}

/// A generated (or user-edited) reply draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    /// Unique identifier.
    pub id: DraftId,
    /// Email this draft replies to, if any.
    #[serde(default)]
    pub email_id: Option<EmailId>,
    /// Subject line.
    pub subject: String,
    /// Body text.
    pub body: String,
    /// Lifecycle tag.
    #[serde(default)]
    pub status: DraftStatus,
}

/// Body of a chat turn request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's full message.
    pub query: String,
    /// Email the question is about, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_id: Option<EmailId>,
}

/// Body of a chat turn response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The agent's reply.
    pub response: String,
}

/// Acknowledgement returned by trigger endpoints.
///
/// The client only logs it; no state depends on its contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    /// Status message, if the backend sent one.
    #[serde(default)]
    pub message: Option<String>,
    /// Number of emails processed, for the processing trigger.
    #[serde(default)]
    pub processed: Option<u64>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts RFC 3339 as well as the naive ISO-8601 the backend emits (UTC).
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(parse_timestamp(&raw))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}
