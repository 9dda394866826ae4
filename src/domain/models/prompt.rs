use serde_derive::Deserialize;
use serde_derive::Serialize;

/// The body posted to the submission service. Field names follow the
/// service's wire contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptSubmission {
    pub content: String,
    pub id: String,
    pub user_id: String,
    #[serde(rename = "enabledLLMs")]
    pub enabled_llms: Vec<String>,
}

impl PromptSubmission {
    pub fn new(content: &str, id: &str, user_id: &str, enabled_llms: Vec<String>) -> PromptSubmission {
        return PromptSubmission {
            content: content.to_string(),
            id: id.to_string(),
            user_id: user_id.to_string(),
            enabled_llms,
        };
    }
}
