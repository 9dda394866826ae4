use std::collections::BTreeMap;

use super::ModelResponse;
use super::PromptSubmission;

/// Requests from the UI loop to the background action loop.
pub enum Action {
    SubmitPrompt(PromptSubmission),
    RequestAnalysis(String, BTreeMap<String, ModelResponse>),
    WatchMessage(String, Vec<String>),
    ReleaseMessage(String),
    ReleaseAll(),
}
