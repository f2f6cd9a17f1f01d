// src/util/testing.rs

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::env;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::{AnkiTransport, HttpReply};
use crate::domain::BridgeError;

/// Scripted answer of the mock AnkiConnect endpoint
#[derive(Debug, Clone)]
pub enum MockReply {
    Http(HttpReply),
    Refused,
}

impl MockReply {
    pub fn json(value: Value) -> Self {
        MockReply::Http(HttpReply::ok(value.to_string()))
    }

    pub fn body(body: impl Into<String>) -> Self {
        MockReply::Http(HttpReply::ok(body))
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        MockReply::Http(HttpReply {
            status,
            body: body.into(),
        })
    }

    pub fn refused() -> Self {
        MockReply::Refused
    }
}

struct MockState {
    replies: HashMap<String, VecDeque<MockReply>>,
    requests: Vec<Value>,
}

/// Shared mock AnkiConnect endpoint for testing the client and the bridge
///
/// Replies are scripted per action and consumed in order; the last scripted
/// reply for an action repeats. Unscripted actions answer
/// `{"result": null, "error": null}`. Clones share state, so a test can keep
/// one handle for assertions after moving another into the bridge.
///
/// # Examples
///
/// ```
/// use ankibridge::util::testing::{MockReply, MockTransport};
/// use serde_json::json;
///
/// let mock = MockTransport::builder()
///     .with_reply("addNote", MockReply::json(json!({"result": 1, "error": null})))
///     .build();
/// assert_eq!(mock.call_count(), 0);
/// ```
#[derive(Clone)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
    delay: Option<Duration>,
}

impl MockTransport {
    pub fn builder() -> MockTransportBuilder {
        MockTransportBuilder::new()
    }

    /// Every request body posted so far, in order
    pub fn requests(&self) -> Vec<Value> {
        self.lock().requests.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().requests.len()
    }

    pub fn calls_for(&self, action: &str) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|request| request["action"] == action)
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn next_reply(&self, body: &Value) -> MockReply {
        let mut state = self.lock();
        state.requests.push(body.clone());

        let action = body["action"].as_str().unwrap_or_default().to_string();
        match state.replies.get_mut(&action) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(MockReply::Refused),
            Some(queue) => queue.front().cloned().unwrap_or(MockReply::Refused),
            None => MockReply::body(r#"{"result":null,"error":null}"#),
        }
    }
}

#[async_trait]
impl AnkiTransport for MockTransport {
    async fn post(&self, body: &Value) -> Result<HttpReply, BridgeError> {
        let reply = self.next_reply(body);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match reply {
            MockReply::Http(reply) => Ok(reply),
            MockReply::Refused => Err(BridgeError::Transport(
                "error sending request: connection refused".to_string(),
            )),
        }
    }
}

/// Builder for MockTransport
pub struct MockTransportBuilder {
    replies: HashMap<String, VecDeque<MockReply>>,
    delay: Option<Duration>,
}

impl MockTransportBuilder {
    pub fn new() -> Self {
        Self {
            replies: HashMap::new(),
            delay: None,
        }
    }

    /// Queue a reply for an action
    pub fn with_reply(mut self, action: &str, reply: MockReply) -> Self {
        self.replies
            .entry(action.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    /// Delay every reply, to keep calls overlapping
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn build(self) -> MockTransport {
        MockTransport {
            state: Arc::new(Mutex::new(MockState {
                replies: self.replies,
                requests: Vec::new(),
            })),
            delay: self.delay,
        }
    }
}

impl Default for MockTransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn init_test_setup() -> Result<()> {
    // Set up logging first
    setup_test_logging();

    info!("Test Setup complete");
    Ok(())
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "trace");
    }

    // Create a filter for noisy modules
    let noisy_modules = ["hyper", "hyper_util", "reqwest", "mio", "h2"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    // Set up the subscriber with environment filter
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    // Build and set the subscriber
    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[ctor::ctor]
    fn init() {
        init_test_setup().expect("Failed to initialize test setup");
    }

    #[tokio::test]
    async fn given_scripted_replies_when_posting_then_consumed_in_order_and_last_repeats() {
        let mock = MockTransport::builder()
            .with_reply("version", MockReply::body("first"))
            .with_reply("version", MockReply::body("second"))
            .build();
        let body = json!({"action": "version", "version": 6});

        let bodies: Vec<String> = [
            mock.post(&body).await.unwrap(),
            mock.post(&body).await.unwrap(),
            mock.post(&body).await.unwrap(),
        ]
        .into_iter()
        .map(|reply| reply.body)
        .collect();

        assert_eq!(bodies, vec!["first", "second", "second"]);
        assert_eq!(mock.calls_for("version"), 3);
    }

    #[tokio::test]
    async fn given_refused_reply_when_posting_then_transport_error() {
        let mock = MockTransport::builder()
            .with_reply("version", MockReply::refused())
            .build();

        let result = mock.post(&json!({"action": "version"})).await;

        assert!(matches!(result, Err(BridgeError::Transport(_))));
    }

    #[tokio::test]
    async fn given_unscripted_action_when_posting_then_null_result() {
        let mock = MockTransport::builder().build();

        let reply = mock.post(&json!({"action": "createDeck"})).await.unwrap();

        assert_eq!(reply.body, r#"{"result":null,"error":null}"#);
        assert_eq!(mock.call_count(), 1);
    }
}
