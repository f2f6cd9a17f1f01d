// src/domain/error.rs
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    #[error("Origin not allowed: {0}")]
    OriginRejected(String),
    #[error("AnkiConnect request failed: {0}")]
    Transport(String),
    #[error("Invalid response from Anki: {0}")]
    MalformedResponse(String),
    #[error("Anki error: {0}")]
    Application(String),
    #[error("No bridge response within {0:?}")]
    Timeout(Duration),
    #[error("Bridge channel closed: {0}")]
    Disconnected(String),
}

/// Failure classification carried across the bridge in `errorKind`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    OriginRejected,
    Transport,
    MalformedResponse,
    Application,
    Timeout,
    Disconnected,
}

impl BridgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::OriginRejected(_) => ErrorKind::OriginRejected,
            BridgeError::Transport(_) => ErrorKind::Transport,
            BridgeError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            BridgeError::Application(_) => ErrorKind::Application,
            BridgeError::Timeout(_) => ErrorKind::Timeout,
            BridgeError::Disconnected(_) => ErrorKind::Disconnected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_malformed_response_when_classifying_then_kind_is_distinct_from_application() {
        let malformed = BridgeError::MalformedResponse("empty body".to_string());
        let explicit = BridgeError::Application("model was not found".to_string());

        assert_eq!(malformed.kind(), ErrorKind::MalformedResponse);
        assert_eq!(explicit.kind(), ErrorKind::Application);
        assert_ne!(malformed.kind(), explicit.kind());
    }

    #[test]
    fn given_error_kind_when_serializing_then_uses_camel_case() {
        let json = serde_json::to_string(&ErrorKind::MalformedResponse).unwrap();
        assert_eq!(json, "\"malformedResponse\"");
    }
}
