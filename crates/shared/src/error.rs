use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error body the backend attaches to rejected requests (`{"detail": ...}`).
///
/// `detail` is a plain string for explicit rejections and a list of field errors
/// when request validation fails, so it is kept as raw JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub detail: Value,
}

impl ApiErrorBody {
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    pub fn message(&self) -> String {
        match &self.detail {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}
