// Public modules
pub mod chat_completion_chunk;
pub mod chat_completion_request;
pub mod chat_message;
pub mod model_info;
pub mod model_list_response;
pub mod usage;

// Re-exports
pub use chat_completion_chunk::{ChatCompletionChunk, ChunkChoice, Delta};
pub use chat_completion_request::{ChatCompletionRequest, StreamOptions};
pub use chat_message::{ChatMessage, ChatRole};
pub use model_info::ModelInfo;
pub use model_list_response::ModelListResponse;
pub use usage::Usage;
