use ankibridge::application::{readiness, Background, FlashcardClient, PageBridge, Relay};
use ankibridge::domain::OriginGuard;
use ankibridge::infrastructure::MessageBus;
use ankibridge::util::testing::MockTransport;
use std::time::Duration;
use tokio::task::JoinHandle;

pub const PAGE_ORIGIN: &str = "http://localhost:3000";

/// Full bridge stack over a mock AnkiConnect endpoint
#[allow(dead_code)]
pub struct TestBridge {
    pub bridge: PageBridge,
    pub bus: MessageBus,
    pub transport: MockTransport,
    relay: JoinHandle<()>,
}

impl TestBridge {
    /// Bridge for the default page origin with a generous timeout
    pub async fn new(transport: MockTransport) -> Self {
        Self::with_origin(transport, PAGE_ORIGIN, Duration::from_secs(2)).await
    }

    pub async fn with_origin(transport: MockTransport, origin: &str, timeout: Duration) -> Self {
        let bus = MessageBus::new();
        let background = Background::spawn(FlashcardClient::new(transport.clone()));
        let relay = Relay::new(OriginGuard::default(), background).spawn(bus.clone());

        let (signal, mut ready) = readiness();
        PageBridge::install(bus.clone(), origin, timeout, &signal);
        let bridge = ready.wait().await.expect("Bridge should be announced");

        Self {
            bridge,
            bus,
            transport,
            relay,
        }
    }
}

impl Drop for TestBridge {
    fn drop(&mut self) {
        self.relay.abort();
    }
}
