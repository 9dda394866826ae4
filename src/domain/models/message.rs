#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use chrono::NaiveDateTime;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use uuid::Uuid;

/// A single user-submitted prompt. Immutable once created. The id is
/// generated client-side before the submission request goes out, and doubles
/// as the store path segment all model responses land under.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub timestamp: i64,
}

impl Message {
    pub fn new(id: &str, content: &str) -> Message {
        return Message {
            id: id.to_string(),
            content: content.to_string().replace('\t', "  "),
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
    }

    pub fn new_with_timestamp(id: &str, content: &str, timestamp: i64) -> Message {
        return Message {
            id: id.to_string(),
            content: content.to_string().replace('\t', "  "),
            timestamp,
        };
    }

    /// Collision resistance only needs to hold for the lifetime of a session.
    /// The store is keyed by this id, so a collision duplicates a path rather
    /// than corrupting data.
    pub fn generate_id() -> String {
        return format!("q{}", Uuid::new_v4().simple());
    }

    pub fn timestamp_formatted(&self) -> String {
        return NaiveDateTime::from_timestamp_millis(self.timestamp)
            .map(|dt| return dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| return "-".to_string());
    }
}

pub fn wrap_text(text: &str, line_max_width: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();

    for full_line in text.split('\n') {
        if full_line.trim().is_empty() {
            lines.push(" ".to_string());
            continue;
        }

        let mut char_count = 0;
        let mut current_lines: Vec<&str> = vec![];

        for word in full_line.split(' ') {
            if word.len() + char_count + 1 > line_max_width {
                lines.push(current_lines.join(" ").trim_end().to_string());
                current_lines = vec![word];
                char_count = word.len() + 1;
            } else {
                current_lines.push(word);
                char_count += word.len() + 1;
            }
        }
        if !current_lines.is_empty() {
            lines.push(current_lines.join(" ").trim_end().to_string());
        }
    }

    return lines;
}
