// src/infrastructure/bus.rs
use crate::constants::BUS_CAPACITY;
use crate::domain::{BridgeRequest, WireMessage};
use tokio::sync::broadcast;
use tracing::trace;

/// Who may read a posted message, like `postMessage`'s `targetOrigin`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOrigin {
    Any,
    Exact(String),
}

impl TargetOrigin {
    pub fn admits(&self, origin: &str) -> bool {
        match self {
            TargetOrigin::Any => true,
            TargetOrigin::Exact(target) => target == origin,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostedMessage {
    /// Origin of the context that posted the message, as the channel reports it
    pub origin: String,
    pub target: TargetOrigin,
    pub message: WireMessage,
}

impl PostedMessage {
    pub fn request(&self) -> Option<&BridgeRequest> {
        match &self.message {
            WireMessage::Request(request) => Some(request),
            WireMessage::Response(_) => None,
        }
    }
}

/// The page's message channel, shared by the page bridge and the relay.
///
/// Every subscriber sees every message posted after it subscribed.
#[derive(Debug, Clone)]
pub struct MessageBus {
    sender: broadcast::Sender<PostedMessage>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::with_capacity(BUS_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Post a message; returns how many listeners received it
    pub fn post(
        &self,
        origin: impl Into<String>,
        target: TargetOrigin,
        message: impl Into<WireMessage>,
    ) -> usize {
        let posted = PostedMessage {
            origin: origin.into(),
            target,
            message: message.into(),
        };
        trace!(?posted, "Posting message");
        // No listener is not an error: the message is simply lost, as on a page
        self.sender.send(posted).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PostedMessage> {
        self.sender.subscribe()
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}
