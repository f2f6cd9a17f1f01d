// src/domain/mod.rs
pub mod card;
pub mod error;
pub mod game;
pub mod message;
pub mod origin;
pub mod problem;

pub use card::{Card, FlashcardNote, NoteTemplate};
pub use error::{BridgeError, ErrorKind};
pub use game::{AnswerOutcome, GameSession};
pub use message::{BridgeRequest, BridgeResponse, Outcome, RequestId, WireMessage};
pub use origin::OriginGuard;
pub use problem::{Level, Problem};
