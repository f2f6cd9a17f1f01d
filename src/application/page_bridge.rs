// src/application/page_bridge.rs
use crate::domain::{BridgeError, BridgeRequest, Card, Outcome, RequestId, WireMessage};
use crate::infrastructure::bus::{MessageBus, TargetOrigin};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Page-side API of the bridge.
///
/// Each call subscribes its own listener, posts a request carrying a fresh
/// id and waits for the response with the same kind and id. The listener is
/// dropped on the first match or when the timeout expires.
#[derive(Debug, Clone)]
pub struct PageBridge {
    bus: MessageBus,
    origin: String,
    timeout: Duration,
    next_id: Arc<AtomicU64>,
}

/// Installer side of the readiness announcement
#[derive(Debug)]
pub struct ReadySignal {
    sender: watch::Sender<Option<PageBridge>>,
}

/// Page side of the readiness announcement
#[derive(Debug, Clone)]
pub struct BridgeReady {
    receiver: watch::Receiver<Option<PageBridge>>,
}

/// Channel page code waits on until a bridge is installed
pub fn readiness() -> (ReadySignal, BridgeReady) {
    let (sender, receiver) = watch::channel(None);
    (ReadySignal { sender }, BridgeReady { receiver })
}

impl BridgeReady {
    /// Resolve with the installed bridge, immediately if it is already there
    pub async fn wait(&mut self) -> Result<PageBridge, BridgeError> {
        let installed = self
            .receiver
            .wait_for(Option::is_some)
            .await
            .map_err(|_| BridgeError::Disconnected("bridge installer dropped".to_string()))?;
        (*installed)
            .clone()
            .ok_or_else(|| BridgeError::Disconnected("bridge not installed".to_string()))
    }

    pub fn is_ready(&self) -> bool {
        self.receiver.borrow().is_some()
    }
}

impl PageBridge {
    /// Create the bridge for a page at `origin` and announce it
    pub fn install(
        bus: MessageBus,
        origin: impl Into<String>,
        timeout: Duration,
        signal: &ReadySignal,
    ) -> Self {
        let bridge = Self {
            bus,
            origin: origin.into(),
            timeout,
            next_id: Arc::new(AtomicU64::new(1)),
        };
        signal.sender.send_replace(Some(bridge.clone()));
        info!(origin = %bridge.origin, "Anki bridge created and ready");
        bridge
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub async fn check_connection(&self) -> Result<Outcome, BridgeError> {
        self.call(|id| BridgeRequest::CheckConnection { id }).await
    }

    pub async fn save_card(&self, card: Card) -> Result<Outcome, BridgeError> {
        self.call(|id| BridgeRequest::SaveCard { id, card }).await
    }

    #[instrument(level = "debug", skip_all, fields(origin = %self.origin))]
    async fn call<F>(&self, build: F) -> Result<Outcome, BridgeError>
    where
        F: FnOnce(Option<RequestId>) -> BridgeRequest,
    {
        let id = RequestId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let request = build(Some(id));

        // Subscribe before posting so the response cannot slip past
        let mut listener = self.bus.subscribe();
        debug!(%id, ?request, "Posting request");
        self.bus
            .post(self.origin.clone(), TargetOrigin::Any, request.clone());

        let wait = async {
            loop {
                let posted = match listener.recv().await {
                    Ok(posted) => posted,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(%id, skipped, "Listener lagged, response may be lost");
                        continue;
                    }
                    Err(RecvError::Closed) => {
                        return Err(BridgeError::Disconnected("page channel closed".to_string()))
                    }
                };
                if !posted.target.admits(&self.origin) {
                    continue;
                }
                if let WireMessage::Response(response) = posted.message {
                    if response.answers(&request) {
                        return Ok(response.into_outcome());
                    }
                }
            }
        };

        match tokio::time::timeout(self.timeout, wait).await {
            Ok(result) => {
                debug!(%id, ok = result.is_ok(), "Request settled");
                result
            }
            Err(_) => {
                warn!(%id, timeout = ?self.timeout, "No response from extension");
                Err(BridgeError::Timeout(self.timeout))
            }
        }
    }
}
