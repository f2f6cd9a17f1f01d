// src/application/background.rs
use crate::application::{AnkiTransport, FlashcardClient};
use crate::constants::BACKGROUND_QUEUE;
use crate::domain::{BridgeError, Card, Outcome};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Call from the relay into the privileged worker that owns network access
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", content = "data", rename_all = "camelCase")]
pub enum RuntimeAction {
    CheckAnkiConnection,
    SaveCard(Card),
}

struct RuntimeCall {
    action: RuntimeAction,
    reply: oneshot::Sender<Outcome>,
}

/// Sending side of the background worker; cheap to clone
#[derive(Debug, Clone)]
pub struct BackgroundHandle {
    sender: mpsc::Sender<RuntimeCall>,
}

impl std::fmt::Debug for RuntimeCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeCall")
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}

impl BackgroundHandle {
    /// Run an action in the background worker.
    ///
    /// Anki-side failures come back as a failed `Outcome`; `Err` only means
    /// the worker is gone.
    pub async fn call(&self, action: RuntimeAction) -> Result<Outcome, BridgeError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(RuntimeCall { action, reply })
            .await
            .map_err(|_| BridgeError::Disconnected("background worker stopped".to_string()))?;
        response
            .await
            .map_err(|_| BridgeError::Disconnected("background worker dropped the call".to_string()))
    }
}

pub struct Background;

impl Background {
    /// Spawn the worker; it runs until every handle is dropped
    pub fn spawn<T>(client: FlashcardClient<T>) -> BackgroundHandle
    where
        T: AnkiTransport + 'static,
    {
        let (sender, mut receiver) = mpsc::channel::<RuntimeCall>(BACKGROUND_QUEUE);
        let client = Arc::new(client);

        tokio::spawn(async move {
            while let Some(call) = receiver.recv().await {
                let client = Arc::clone(&client);
                tokio::spawn(async move {
                    let outcome = execute(&client, &call.action).await;
                    if call.reply.send(outcome).is_err() {
                        debug!(action = ?call.action, "Caller gone before reply");
                    }
                });
            }
            info!("Background worker stopped");
        });

        BackgroundHandle { sender }
    }
}

/// Run one action, turning every error into a failed outcome
pub async fn execute<T: AnkiTransport>(
    client: &FlashcardClient<T>,
    action: &RuntimeAction,
) -> Outcome {
    let result = match action {
        RuntimeAction::CheckAnkiConnection => client.check_connection().await,
        RuntimeAction::SaveCard(card) => client.save_card(card).await,
    };

    match result {
        Ok(outcome) => {
            debug!(?action, success = outcome.success, "Action finished");
            outcome
        }
        Err(err) => {
            warn!(?action, kind = ?err.kind(), error = %err, "Action failed");
            Outcome::from_error(&err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;
    use crate::util::testing::{MockReply, MockTransport};
    use serde_json::json;

    #[tokio::test]
    async fn given_running_worker_when_checking_connection_then_outcome_returned() {
        // Arrange
        let transport = MockTransport::builder()
            .with_reply(
                "requestPermission",
                MockReply::json(json!({"result": {"permission": "granted"}, "error": null})),
            )
            .build();
        let handle = Background::spawn(FlashcardClient::new(transport));

        // Act
        let outcome = handle.call(RuntimeAction::CheckAnkiConnection).await.unwrap();

        // Assert
        assert!(outcome.success);
    }

    #[tokio::test]
    async fn given_empty_body_when_checking_connection_then_failure_not_error() {
        let transport = MockTransport::builder()
            .with_reply("requestPermission", MockReply::body(""))
            .build();
        let handle = Background::spawn(FlashcardClient::new(transport));

        let outcome = handle.call(RuntimeAction::CheckAnkiConnection).await.unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.error_kind, Some(ErrorKind::MalformedResponse));
        assert_eq!(outcome.error.as_deref(), Some("Empty response from Anki"));
    }

    #[tokio::test]
    async fn given_refused_connection_when_saving_then_transport_failure() {
        let transport = MockTransport::builder()
            .with_reply("createDeck", MockReply::refused())
            .build();
        let handle = Background::spawn(FlashcardClient::new(transport.clone()));
        let card = Card {
            front: "1 + 2 = ?".to_string(),
            back: "3".to_string(),
            level: 1,
        };

        let outcome = handle.call(RuntimeAction::SaveCard(card)).await.unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.error_kind, Some(ErrorKind::Transport));
        assert_eq!(transport.calls_for("addNote"), 0);
    }

    #[test]
    fn given_save_action_when_serializing_then_matches_runtime_message() {
        let action = RuntimeAction::SaveCard(Card {
            front: "1 + 1 = ?".to_string(),
            back: "2".to_string(),
            level: 1,
        });

        let value = serde_json::to_value(&action).unwrap();

        assert_eq!(
            value,
            json!({"action": "saveCard", "data": {"front": "1 + 1 = ?", "back": "2", "level": 1}})
        );
    }
}
