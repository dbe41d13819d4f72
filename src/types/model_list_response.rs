use serde::{Deserialize, Serialize};

use crate::types::ModelInfo;

/// Response from the list models endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelListResponse {
    /// Object type, normally `"list"`.
    #[serde(default)]
    pub object: String,

    /// The models, in server order.
    #[serde(default)]
    pub data: Vec<ModelInfo>,
}

impl ModelListResponse {
    /// Get the list of models.
    pub fn models(&self) -> &[ModelInfo] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn model_list_deserialization() {
        let response: ModelListResponse = serde_json::from_value(json!({
            "object": "list",
            "data": [
                {"id": "a", "object": "model", "created": 1, "owned_by": "x"},
                {"id": "b", "object": "model", "created": 2, "owned_by": "y"}
            ]
        }))
        .unwrap();
        let ids: Vec<_> = response.models().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
