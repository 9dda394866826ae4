#[cfg(test)]
#[path = "tree_test.rs"]
mod tests;

use serde_json::Map;
use serde_json::Value;

use crate::domain::models::Message;
use crate::domain::models::ModelResponse;

fn is_response_node(node: &Map<String, Value>) -> bool {
    return node.contains_key("answer")
        || node.contains_key("error")
        || node.contains_key("timestamp");
}

/// Splits a raw `/users/{uid}/question` tree into the prompts it holds and
/// every per-model response nested under them. Nodes that don't look like
/// prompts or responses were written by something else and are skipped.
pub fn decode_history(tree: &Value) -> (Vec<Message>, Vec<(String, String, ModelResponse)>) {
    let mut messages: Vec<Message> = vec![];
    let mut responses: Vec<(String, String, ModelResponse)> = vec![];

    let nodes = match tree.as_object() {
        Some(nodes) => nodes,
        None => return (messages, responses),
    };

    for (message_id, node) in nodes {
        let fields = match node.as_object() {
            Some(fields) => fields,
            None => {
                tracing::warn!(message_id = message_id, "Skipping non-object history node");
                continue;
            }
        };

        let content = fields
            .get("content")
            .and_then(|value| return value.as_str())
            .unwrap_or_default();
        if content.is_empty() {
            tracing::warn!(message_id = message_id, "Skipping history node without content");
            continue;
        }

        let timestamp = fields
            .get("timestamp")
            .and_then(|value| return value.as_i64())
            .unwrap_or_default();
        messages.push(Message::new_with_timestamp(message_id, content, timestamp));

        for (model_key, child) in fields {
            if model_key == "content" || model_key == "timestamp" {
                continue;
            }

            let child_fields = match child.as_object() {
                Some(child_fields) => child_fields,
                None => continue,
            };
            if !is_response_node(child_fields) {
                tracing::warn!(
                    message_id = message_id,
                    model = model_key,
                    "Skipping unrecognized child node"
                );
                continue;
            }

            match serde_json::from_value::<ModelResponse>(child.clone()) {
                Ok(response) => {
                    responses.push((message_id.to_string(), model_key.to_string(), response));
                }
                Err(err) => {
                    tracing::warn!(
                        error = ?err,
                        message_id = message_id,
                        model = model_key,
                        "Skipping undecodable response node"
                    );
                }
            }
        }
    }

    return (messages, responses);
}
