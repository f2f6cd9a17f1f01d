// src/infrastructure/mod.rs
pub mod anki_connect;
pub mod bus;
pub mod config;

pub use anki_connect::HttpTransport;
pub use bus::{MessageBus, PostedMessage, TargetOrigin};
pub use config::Config;
