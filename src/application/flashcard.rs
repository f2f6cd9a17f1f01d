// src/application/flashcard.rs
use crate::constants::ANKI_CONNECT_VERSION;
use crate::domain::{BridgeError, Card, FlashcardNote, NoteTemplate, Outcome};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

/// Raw HTTP exchange result; the body is decoded by the client, not the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outbound channel to AnkiConnect
#[async_trait]
pub trait AnkiTransport: Send + Sync {
    /// POST a JSON request body. Fails only if no HTTP exchange completed.
    async fn post(&self, body: &Value) -> Result<HttpReply, BridgeError>;
}

pub struct FlashcardClient<T: AnkiTransport> {
    transport: T,
    template: NoteTemplate,
}

impl<T: AnkiTransport> FlashcardClient<T> {
    pub fn new(transport: T) -> Self {
        Self::with_template(transport, NoteTemplate::default())
    }

    pub fn with_template(transport: T, template: NoteTemplate) -> Self {
        Self {
            transport,
            template,
        }
    }

    pub fn template(&self) -> &NoteTemplate {
        &self.template
    }

    /// Success iff Anki answers with `result.permission == "granted"`
    #[instrument(level = "debug", skip(self))]
    pub async fn check_connection(&self) -> Result<Outcome, BridgeError> {
        let reply = self.request("requestPermission", None).await?;
        let data = decode(&reply)?;

        let granted = data
            .get("result")
            .and_then(|result| result.get("permission"))
            .and_then(Value::as_str)
            == Some("granted");
        debug!(granted, "Permission response");

        Ok(if granted {
            Outcome::succeeded(data)
        } else {
            Outcome::failed(data, None)
        })
    }

    /// Create the deck. The reply is not inspected: an existing deck is fine.
    #[instrument(level = "debug", skip(self))]
    pub async fn ensure_deck(&self, name: &str) -> Result<(), BridgeError> {
        let reply = self
            .request("createDeck", Some(json!({ "deck": name })))
            .await?;
        debug!(status = reply.status, body = %reply.body, "createDeck reply ignored");
        Ok(())
    }

    /// Success iff the decoded reply is an object carrying a falsy `error`
    #[instrument(level = "debug", skip(self))]
    pub async fn add_note(&self, note: &FlashcardNote) -> Result<Outcome, BridgeError> {
        let reply = self
            .request("addNote", Some(json!({ "note": note })))
            .await?;
        let data = decode(&reply)?;
        if !data.is_object() {
            return Err(BridgeError::MalformedResponse(format!(
                "expected an object, got {data}"
            )));
        }

        match data.get("error").filter(|error| is_truthy(error)) {
            None => Ok(Outcome::succeeded(data)),
            Some(error) => {
                let message = error
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| error.to_string());
                warn!(%message, "Anki rejected note");
                Ok(Outcome::failed(data, Some(message)))
            }
        }
    }

    /// Ensure the configured deck exists, then add the card as a note
    #[instrument(level = "debug", skip(self), fields(front = %card.front))]
    pub async fn save_card(&self, card: &Card) -> Result<Outcome, BridgeError> {
        self.ensure_deck(&self.template.deck).await?;
        let note = FlashcardNote::from_card(card, &self.template);
        self.add_note(&note).await
    }

    /// AnkiConnect `version`: success iff the HTTP status is 2xx and `result` is truthy
    #[instrument(level = "debug", skip(self))]
    pub async fn version(&self) -> Result<Outcome, BridgeError> {
        let reply = self.request("version", None).await?;
        let data = decode(&reply)?;

        let has_result = data.get("result").is_some_and(is_truthy);
        if reply.is_success() && has_result {
            return Ok(Outcome::succeeded(data));
        }

        let message = match data.get("error").filter(|error| is_truthy(error)) {
            Some(error) => error
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string()),
            None => "Failed to connect".to_string(),
        };
        Err(BridgeError::Application(message))
    }

    async fn request(&self, action: &str, params: Option<Value>) -> Result<HttpReply, BridgeError> {
        let body = request_body(action, params);
        debug!(action, "Posting to AnkiConnect");
        self.transport.post(&body).await
    }
}

/// `{action, version, params?}` envelope expected by AnkiConnect
pub fn request_body(action: &str, params: Option<Value>) -> Value {
    let mut body = json!({
        "action": action,
        "version": ANKI_CONNECT_VERSION,
    });
    if let Some(params) = params {
        body["params"] = params;
    }
    body
}

fn decode(reply: &HttpReply) -> Result<Value, BridgeError> {
    if reply.body.trim().is_empty() {
        return Err(BridgeError::MalformedResponse(
            "Empty response from Anki".to_string(),
        ));
    }
    serde_json::from_str(&reply.body).map_err(|e| {
        debug!(body = %reply.body, "Failed to parse AnkiConnect reply");
        BridgeError::MalformedResponse(e.to_string())
    })
}

/// JavaScript-style truthiness of a JSON value
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
