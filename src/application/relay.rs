// src/application/relay.rs
use crate::application::background::{BackgroundHandle, RuntimeAction};
use crate::domain::{BridgeRequest, BridgeResponse, Outcome, OriginGuard};
use crate::infrastructure::bus::{MessageBus, PostedMessage, TargetOrigin};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Privileged intermediary between the page channel and the background worker
#[derive(Debug, Clone)]
pub struct Relay {
    guard: Arc<OriginGuard>,
    background: BackgroundHandle,
}

impl Relay {
    pub fn new(guard: OriginGuard, background: BackgroundHandle) -> Self {
        Self {
            guard: Arc::new(guard),
            background,
        }
    }

    /// Answer one posted message.
    ///
    /// Returns `None` for responses (our own or another relay's) and for
    /// requests from origins outside the allow-list, which are dropped without
    /// touching the background worker.
    #[instrument(level = "debug", skip(self, posted), fields(origin = %posted.origin))]
    pub async fn handle(&self, posted: &PostedMessage) -> Option<BridgeResponse> {
        let request = posted.request()?;

        if !self.guard.is_allowed(&posted.origin) {
            warn!(origin = %posted.origin, "Ignoring message from unauthorized origin");
            return None;
        }
        debug!(?request, "Received request");

        let action = match request {
            BridgeRequest::CheckConnection { .. } => RuntimeAction::CheckAnkiConnection,
            BridgeRequest::SaveCard { card, .. } => RuntimeAction::SaveCard(card.clone()),
        };
        let outcome = match self.background.call(action).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "Background call failed");
                Outcome::from_error(&err)
            }
        };

        let response = request.respond(outcome);
        debug!(?response, "Relaying response");
        Some(response)
    }

    /// Listen on the bus and answer every request in its own task, addressed
    /// to the sender's origin. Stops when the bus closes.
    pub fn spawn(self, bus: MessageBus) -> JoinHandle<()> {
        let mut receiver = bus.subscribe();
        tokio::spawn(async move {
            info!("Relay listening");
            loop {
                let posted = match receiver.recv().await {
                    Ok(posted) => posted,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Relay lagged behind the page channel");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                if posted.request().is_none() {
                    continue;
                }

                let relay = self.clone();
                let bus = bus.clone();
                tokio::spawn(async move {
                    if let Some(response) = relay.handle(&posted).await {
                        bus.post(
                            posted.origin.clone(),
                            TargetOrigin::Exact(posted.origin),
                            response,
                        );
                    }
                });
            }
            info!("Relay stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{Background, FlashcardClient};
    use crate::domain::{Card, RequestId, WireMessage};
    use crate::util::testing::{MockReply, MockTransport};
    use serde_json::json;

    fn relay_with(transport: MockTransport) -> Relay {
        let background = Background::spawn(FlashcardClient::new(transport));
        Relay::new(OriginGuard::default(), background)
    }

    fn posted(origin: &str, request: BridgeRequest) -> PostedMessage {
        PostedMessage {
            origin: origin.to_string(),
            target: TargetOrigin::Any,
            message: WireMessage::Request(request),
        }
    }

    #[tokio::test]
    async fn given_allowed_origin_when_saving_then_save_result_echoes_id() {
        // Arrange
        let transport = MockTransport::builder()
            .with_reply("addNote", MockReply::json(json!({"result": 1, "error": null})))
            .build();
        let relay = relay_with(transport);
        let request = BridgeRequest::SaveCard {
            id: Some(RequestId(11)),
            card: Card {
                front: "2 + 2 = ?".to_string(),
                back: "4".to_string(),
                level: 1,
            },
        };

        // Act
        let response = relay
            .handle(&posted("http://localhost:3000", request.clone()))
            .await
            .expect("Allowed origin should get a response");

        // Assert
        assert!(response.answers(&request));
        assert!(matches!(response, BridgeResponse::SaveResult { success: true, .. }));
    }

    #[tokio::test]
    async fn given_rejected_origin_when_handling_then_no_response_and_no_http() {
        // Arrange
        let transport = MockTransport::builder().build();
        let relay = relay_with(transport.clone());

        // Act
        let response = relay
            .handle(&posted(
                "https://evil.example",
                BridgeRequest::CheckConnection { id: None },
            ))
            .await;

        // Assert
        assert_eq!(response, None);
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn given_response_message_when_handling_then_ignored() {
        let transport = MockTransport::builder().build();
        let relay = relay_with(transport.clone());
        let message = PostedMessage {
            origin: "http://localhost:3000".to_string(),
            target: TargetOrigin::Any,
            message: WireMessage::Response(
                BridgeRequest::CheckConnection { id: None }.respond(Outcome::succeeded(json!(null))),
            ),
        };

        let response = relay.handle(&message).await;

        assert_eq!(response, None);
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn given_malformed_anki_reply_when_checking_then_failed_status_not_dropped() {
        let transport = MockTransport::builder()
            .with_reply("requestPermission", MockReply::body("not json"))
            .build();
        let relay = relay_with(transport);

        let response = relay
            .handle(&posted(
                "http://localhost:3001",
                BridgeRequest::CheckConnection { id: None },
            ))
            .await
            .expect("Failures still produce a response");

        let outcome = response.into_outcome();
        assert!(!outcome.success);
        assert!(outcome.error.is_some());
    }
}
