use serde::{Deserialize, Serialize};

/// A model as returned by `GET /models`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier usable in a chat request.
    pub id: String,

    /// Object type, normally `"model"`.
    #[serde(default)]
    pub object: String,

    /// Unix timestamp (seconds) of when the model was created.
    #[serde(default)]
    pub created: i64,

    /// Organization that owns the model.
    #[serde(default)]
    pub owned_by: String,

    /// Context window in tokens, reported by some providers only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_window: Option<u64>,
}

impl ModelInfo {
    /// One-line summary used by `--list`.
    pub fn summary(&self) -> String {
        format!(
            "{} ({}) created {} owner({}) Window({})",
            self.id,
            self.object,
            self.created,
            self.owned_by,
            self.context_window.unwrap_or(0)
        )
    }
}
