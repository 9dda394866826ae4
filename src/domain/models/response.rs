#[cfg(test)]
#[path = "response_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;

/// A single model's answer for one message, written to the store by the
/// backend fan-out process. A completed response carries either `answer` or
/// `error`; a record with neither is rendered as an unknown error.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: i64,
}

impl ModelResponse {
    pub fn with_answer(answer: &str, timestamp: i64) -> ModelResponse {
        return ModelResponse {
            answer: Some(answer.to_string()),
            error: None,
            timestamp,
        };
    }

    pub fn with_error(error: &str, timestamp: i64) -> ModelResponse {
        return ModelResponse {
            answer: None,
            error: Some(error.to_string()),
            timestamp,
        };
    }

    pub fn display_text(&self) -> String {
        if let Some(answer) = &self.answer {
            return answer.to_string();
        }
        if let Some(error) = &self.error {
            return format!("Error: {error}");
        }

        return "Error: Unknown error".to_string();
    }
}
