#[cfg(test)]
#[path = "aggregator_test.rs"]
mod tests;

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::collections::HashSet;

use crate::domain::models::AnalysisResult;
use crate::domain::models::Message;
use crate::domain::models::ModelResponse;

/// Reconciles the two concurrent data sources feeding the rendered view: the
/// bulk listener over the whole message history, and the per-model listeners
/// scoped to individual messages. Both may deliver the same update, in any
/// order. Merges are last-write-wins per model key and idempotent, so
/// duplicated or reordered delivery never changes the outcome.
#[derive(Default)]
pub struct Aggregator {
    messages: Vec<Message>,
    local_ids: HashSet<String>,
    responses: HashMap<String, BTreeMap<String, ModelResponse>>,
    analyses: HashMap<String, AnalysisResult>,
}

impl Aggregator {
    /// Replaces the message list with the store's view sorted newest first,
    /// keeping locally created messages the backend hasn't persisted yet.
    /// Returns ids seen for the first time so the caller can open per-model
    /// watches for them.
    pub fn on_history_snapshot(&mut self, snapshot: Vec<Message>) -> Vec<String> {
        let known = self
            .messages
            .iter()
            .map(|message| return message.id.to_string())
            .collect::<HashSet<String>>();
        let snapshot_ids = snapshot
            .iter()
            .map(|message| return message.id.to_string())
            .collect::<HashSet<String>>();

        self.local_ids
            .retain(|id| return !snapshot_ids.contains(id));

        let mut next = snapshot;
        for message in &self.messages {
            if self.local_ids.contains(&message.id) {
                next.push(message.clone());
            }
        }
        next.sort_by(|a, b| return b.timestamp.cmp(&a.timestamp));

        let new_ids = next
            .iter()
            .filter(|message| return !known.contains(&message.id))
            .map(|message| return message.id.to_string())
            .collect::<Vec<String>>();

        // Responses and analyses for messages no longer in the view would
        // otherwise accumulate for the whole session.
        let live = next
            .iter()
            .map(|message| return message.id.to_string())
            .collect::<HashSet<String>>();
        self.responses.retain(|id, _| return live.contains(id));
        self.analyses.retain(|id, _| return live.contains(id));

        self.messages = next;
        return new_ids;
    }

    /// Registers a message created in this session before the store has
    /// echoed it back. The next snapshot containing the id takes over.
    pub fn add_local(&mut self, message: Message) {
        if self
            .messages
            .iter()
            .any(|existing| return existing.id == message.id)
        {
            return;
        }

        self.local_ids.insert(message.id.to_string());
        self.messages.insert(0, message);
    }

    pub fn on_model_update(&mut self, message_id: &str, model_key: &str, response: ModelResponse) {
        self.responses
            .entry(message_id.to_string())
            .or_default()
            .insert(model_key.to_string(), response);
    }

    pub fn on_analysis_result(&mut self, message_id: &str, result: AnalysisResult) {
        self.analyses.insert(message_id.to_string(), result);
    }

    pub fn messages(&self) -> &[Message] {
        return &self.messages;
    }

    pub fn responses_for(&self, message_id: &str) -> Option<&BTreeMap<String, ModelResponse>> {
        return self.responses.get(message_id);
    }

    pub fn analysis_for(&self, message_id: &str) -> Option<&AnalysisResult> {
        return self.analyses.get(message_id);
    }

    /// Completeness with respect to an enabled set: every enabled key has a
    /// recorded response. Reevaluated on every event, never cached, so
    /// toggling a model mid-flight immediately changes the answer.
    pub fn is_complete(&self, message_id: &str, enabled: &[String]) -> bool {
        let responses = self.responses.get(message_id);
        return enabled.iter().all(|key| {
            return responses
                .map(|map| return map.contains_key(key))
                .unwrap_or(false);
        });
    }

    pub fn missing_keys(&self, message_id: &str, enabled: &[String]) -> Vec<String> {
        let responses = self.responses.get(message_id);
        return enabled
            .iter()
            .filter(|key| {
                return !responses
                    .map(|map| return map.contains_key(key.as_str()))
                    .unwrap_or(false);
            })
            .map(|key| return key.to_string())
            .collect();
    }

    pub fn latest_complete(&self, enabled: &[String]) -> Option<&Message> {
        return self
            .messages
            .iter()
            .find(|message| return self.is_complete(&message.id, enabled));
    }
}
