//! Sandbox Bridge
//!
//! The preview document runs isolated and talks to the host over a one-way channel.
//! The document side only holds an [`Outlet`]; the host only holds an [`Inbox`].
//! Whatever arrives is untrusted JSON and is checked against [`ConsoleMessage`]
//! before it reaches the [`ConsoleLog`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use tokio::sync::mpsc;
use tracing::debug;

/// Label carried in the `type` field of every bridge message
pub const MESSAGE_TYPE: &str = "webpad:console";

/// Substituted for console arguments the bridge could not serialize
pub const UNSERIALIZABLE_PLACEHOLDER: &str = "[Unserializable]";

/// The four console channels the bridge relays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleChannel {
    Log,
    Warn,
    Error,
    Info,
}

impl ConsoleChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsoleChannel::Log => "log",
            ConsoleChannel::Warn => "warn",
            ConsoleChannel::Error => "error",
            ConsoleChannel::Info => "info",
        }
    }
}

impl std::fmt::Display for ConsoleChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire shape of one console message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsoleMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub channel: ConsoleChannel,
    /// Milliseconds since the Unix epoch, as reported by the document
    pub timestamp: f64,
    pub payload: Vec<Value>,
}

impl ConsoleMessage {
    pub fn new(channel: ConsoleChannel, timestamp: f64, payload: Vec<Value>) -> Self {
        Self {
            kind: MESSAGE_TYPE.to_string(),
            channel,
            timestamp,
            payload,
        }
    }

    /// Parse and check an incoming value; `None` for anything off-schema
    pub fn from_value(value: &Value) -> Option<Self> {
        let message: ConsoleMessage = match ConsoleMessage::deserialize(value) {
            Ok(message) => message,
            Err(e) => {
                debug!(error = %e, "Ignoring malformed sandbox message");
                return None;
            }
        };
        if message.kind != MESSAGE_TYPE || !message.timestamp.is_finite() {
            debug!(kind = %message.kind, "Ignoring foreign sandbox message");
            return None;
        }
        Some(message)
    }

    /// Arguments joined the way a console prints them
    pub fn text(&self) -> String {
        self.payload
            .iter()
            .map(|value| match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Send-only end handed to the executing document
#[derive(Debug, Clone)]
pub struct Outlet {
    sender: mpsc::UnboundedSender<Value>,
}

impl Outlet {
    /// Post a raw message; returns false once the host side is gone
    pub fn post(&self, message: Value) -> bool {
        self.sender.send(message).is_ok()
    }
}

/// Receive-only end kept by the host
#[derive(Debug)]
pub struct Inbox {
    receiver: mpsc::UnboundedReceiver<Value>,
}

impl Inbox {
    /// Take everything queued so far without waiting
    pub fn drain(&mut self) -> Vec<Value> {
        let mut messages = Vec::new();
        while let Ok(message) = self.receiver.try_recv() {
            messages.push(message);
        }
        messages
    }

    /// Wait for the next message; `None` when every outlet has been dropped
    pub async fn recv(&mut self) -> Option<Value> {
        self.receiver.recv().await
    }
}

/// Create a connected outlet/inbox pair
pub fn bridge_channel() -> (Outlet, Inbox) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (Outlet { sender }, Inbox { receiver })
}

/// Most recent accepted console messages, oldest first
#[derive(Debug, Clone)]
pub struct ConsoleLog {
    entries: VecDeque<ConsoleMessage>,
    capacity: usize,
}

impl ConsoleLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Validate and append; the oldest entry is evicted once full
    pub fn accept(&mut self, value: &Value) -> Option<&ConsoleMessage> {
        let message = ConsoleMessage::from_value(value)?;
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(message);
        self.entries.back()
    }

    pub fn entries(&self) -> impl Iterator<Item = &ConsoleMessage> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
