// src/application/mod.rs
pub mod background;
pub mod flashcard;
pub mod page_bridge;
pub mod practice;
pub mod relay;

pub use background::{Background, BackgroundHandle, RuntimeAction};
pub use flashcard::{AnkiTransport, FlashcardClient, HttpReply};
pub use page_bridge::{readiness, BridgeReady, PageBridge, ReadySignal};
pub use practice::Practice;
pub use relay::Relay;
