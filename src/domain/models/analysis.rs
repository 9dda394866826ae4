use serde_derive::Deserialize;
use serde_derive::Serialize;

/// The judged comparison across one message's responses. Attached to a
/// message once, client-side, after the analysis service replies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    pub best_model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<u64>,
    pub timestamp: i64,
}

impl AnalysisResult {
    pub fn new(summary: &str, best_model: &str) -> AnalysisResult {
        return AnalysisResult {
            summary: summary.to_string(),
            best_model: best_model.to_string(),
            estimated_time: None,
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
    }
}
