// src/constants.rs
//
// Fixed values of the AnkiConnect contract and bridge defaults.

/// Local AnkiConnect endpoint.
///
/// Used in: `infrastructure/config.rs`
pub const ANKI_CONNECT_URL: &str = "http://localhost:8765";

/// AnkiConnect API version sent with every action.
pub const ANKI_CONNECT_VERSION: u32 = 6;

pub const DEFAULT_DECK: &str = "Addition";
pub const DEFAULT_MODEL: &str = "Basic";

/// Static tag put on every exported note, next to `level-<n>`.
pub const DEFAULT_GAME_TAG: &str = "addition-game";

/// Page origins allowed to drive the bridge out of the box.
///
/// Used in: `domain/origin.rs`, `infrastructure/config.rs`
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "https://subtle-daifuku-10602c.netlify.app",
    "http://localhost:3000",
    "http://localhost:3001",
];

/// Origin the CLI posts from when none is given.
pub const DEFAULT_PAGE_ORIGIN: &str = "http://localhost:3000";

/// How long a page call waits for its response before failing with a timeout.
pub const BRIDGE_TIMEOUT_MS: u64 = 5_000;

/// Upper bound for one HTTP exchange with AnkiConnect.
pub const REQUEST_TIMEOUT_MS: u64 = 3_000;

/// Capacity of the page message channel; slow listeners skip older messages.
pub const BUS_CAPACITY: usize = 64;

/// Pending calls the background worker queues before senders wait.
pub const BACKGROUND_QUEUE: usize = 32;
