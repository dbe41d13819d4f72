use serde::{Deserialize, Serialize};

/// Token counts reported by the server for one completion.
///
/// OpenAI-compatible servers attach this to the last chunk(s) of a stream
/// rather than to every chunk.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    /// Tokens in the prompt (the transcript sent with the request).
    #[serde(default)]
    pub prompt_tokens: u64,

    /// Tokens generated, reasoning included.
    #[serde(default)]
    pub completion_tokens: u64,

    /// Sum of prompt and completion tokens as counted by the server.
    #[serde(default)]
    pub total_tokens: u64,
}

impl Usage {
    /// Create a new `Usage`.
    pub fn new(prompt_tokens: u64, completion_tokens: u64, total_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens,
        }
    }
}

impl std::ops::Add for Usage {
    type Output = Usage;

    fn add(self, rhs: Usage) -> Usage {
        Usage {
            prompt_tokens: self.prompt_tokens.saturating_add(rhs.prompt_tokens),
            completion_tokens: self.completion_tokens.saturating_add(rhs.completion_tokens),
            total_tokens: self.total_tokens.saturating_add(rhs.total_tokens),
        }
    }
}
