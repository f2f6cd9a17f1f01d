// src/domain/message.rs
//! Messages exchanged between the page and the relay.
//!
//! The JSON shape follows the content-script protocol: a `type` tag plus the
//! fields that kind needs. `id` correlates a response with its request; pages
//! that omit it are still served and get a response without one.
use crate::domain::{BridgeError, Card, ErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result of one bridge operation as the page sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl Outcome {
    pub fn succeeded(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            error_kind: None,
        }
    }

    /// Well-formed reply that does not count as success (permission denied,
    /// `error` field set by Anki).
    pub fn failed(data: Value, error: Option<String>) -> Self {
        Self {
            success: false,
            data: Some(data),
            error_kind: error.as_ref().map(|_| ErrorKind::Application),
            error,
        }
    }

    pub fn from_error(err: &BridgeError) -> Self {
        let message = match err {
            BridgeError::Transport(cause)
            | BridgeError::MalformedResponse(cause)
            | BridgeError::Application(cause) => cause.clone(),
            other => other.to_string(),
        };
        Self {
            success: false,
            data: None,
            error: Some(message),
            error_kind: Some(err.kind()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BridgeRequest {
    #[serde(rename = "ANKI_CHECK_CONNECTION")]
    CheckConnection {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<RequestId>,
    },
    #[serde(rename = "ANKI_SAVE_CARD")]
    SaveCard {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<RequestId>,
        card: Card,
    },
}

impl BridgeRequest {
    pub fn id(&self) -> Option<RequestId> {
        match self {
            BridgeRequest::CheckConnection { id } | BridgeRequest::SaveCard { id, .. } => *id,
        }
    }

    /// Build the response of the matching kind, echoing the request id
    pub fn respond(&self, outcome: Outcome) -> BridgeResponse {
        let Outcome {
            success,
            data,
            error,
            error_kind,
        } = outcome;
        match self {
            BridgeRequest::CheckConnection { id } => BridgeResponse::ConnectionStatus {
                id: *id,
                success,
                data,
                error,
                error_kind,
            },
            BridgeRequest::SaveCard { id, .. } => BridgeResponse::SaveResult {
                id: *id,
                success,
                data,
                error,
                error_kind,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BridgeResponse {
    #[serde(rename = "ANKI_CONNECTION_STATUS", rename_all = "camelCase")]
    ConnectionStatus {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<RequestId>,
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_kind: Option<ErrorKind>,
    },
    #[serde(rename = "ANKI_SAVE_RESULT", rename_all = "camelCase")]
    SaveResult {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<RequestId>,
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_kind: Option<ErrorKind>,
    },
}

impl BridgeResponse {
    pub fn id(&self) -> Option<RequestId> {
        match self {
            BridgeResponse::ConnectionStatus { id, .. } | BridgeResponse::SaveResult { id, .. } => {
                *id
            }
        }
    }

    /// True when this response has the kind and id `request` is waiting for
    pub fn answers(&self, request: &BridgeRequest) -> bool {
        let same_kind = matches!(
            (self, request),
            (
                BridgeResponse::ConnectionStatus { .. },
                BridgeRequest::CheckConnection { .. }
            ) | (BridgeResponse::SaveResult { .. }, BridgeRequest::SaveCard { .. })
        );
        same_kind && self.id() == request.id()
    }

    pub fn into_outcome(self) -> Outcome {
        match self {
            BridgeResponse::ConnectionStatus {
                success,
                data,
                error,
                error_kind,
                ..
            }
            | BridgeResponse::SaveResult {
                success,
                data,
                error,
                error_kind,
                ..
            } => Outcome {
                success,
                data,
                error,
                error_kind,
            },
        }
    }
}

/// Anything travelling on the page message channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireMessage {
    Request(BridgeRequest),
    Response(BridgeResponse),
}

impl From<BridgeRequest> for WireMessage {
    fn from(request: BridgeRequest) -> Self {
        WireMessage::Request(request)
    }
}

impl From<BridgeResponse> for WireMessage {
    fn from(response: BridgeResponse) -> Self {
        WireMessage::Response(response)
    }
}
