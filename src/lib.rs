// Public modules
pub mod chat;
pub mod classifier;
pub mod client;
pub mod client_logger;
pub mod error;
pub mod platform;
pub mod render;
pub mod sse;
pub mod stream;
pub mod types;

mod observability;

// Re-exports
pub use classifier::{BoundaryPolicy, ChunkClassifier, Phase, RESULT_BANNER_POLICY, TurnOutcome};
pub use client::OpenAi;
pub use client_logger::ClientLogger;
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use render::{PlainTextRenderer, Renderer};
pub use stream::{ChatBackend, ChatStream, ChunkStream};
pub use types::*;
