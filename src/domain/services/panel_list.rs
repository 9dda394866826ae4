#[cfg(test)]
#[path = "panel_list_test.rs"]
mod tests;

use std::collections::HashMap;
use std::collections::HashSet;

use ratatui::prelude::Backend;
use ratatui::prelude::Rect;
use ratatui::text::Line;
use ratatui::widgets::Block;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use super::Aggregator;
use crate::domain::models::enabled_keys;
use crate::domain::models::ModelToggle;

struct PanelCacheEntry {
    fingerprint: String,
    lines: Vec<Line<'static>>,
}

/// Renders the aggregated view as a flat scrollable list of lines, one
/// message group after another, newest first. Groups are cached per message
/// id and only rebuilt when their inputs change.
#[derive(Default)]
pub struct PanelList {
    cache: HashMap<String, PanelCacheEntry>,
    order: Vec<String>,
    line_width: u16,
    lines_len: usize,
}

impl PanelList {
    pub fn update(
        &mut self,
        aggregator: &Aggregator,
        toggles: &[ModelToggle],
        current_id: Option<&str>,
        analyzing: &HashSet<String>,
        line_width: u16,
    ) {
        if self.line_width != line_width {
            self.cache.clear();
            self.line_width = line_width;
        }

        self.order = aggregator
            .messages()
            .iter()
            .map(|message| return message.id.to_string())
            .collect();
        let live = self.order.iter().cloned().collect::<HashSet<String>>();
        self.cache.retain(|id, _| return live.contains(id));

        let enabled = enabled_keys(toggles).join(",");
        let mut lines_len = 0;

        for message in aggregator.messages() {
            let in_flight = current_id == Some(message.id.as_str());
            let is_analyzing = analyzing.contains(&message.id);
            let responses = aggregator.responses_for(&message.id);
            let analysis = aggregator.analysis_for(&message.id);

            let fingerprint = format!(
                "{}|{}|{}|{}|{}|{}",
                message.timestamp,
                in_flight,
                is_analyzing,
                serde_json::to_string(&responses).unwrap_or_default(),
                serde_json::to_string(&analysis).unwrap_or_default(),
                enabled,
            );

            if let Some(entry) = self.cache.get(&message.id) {
                if entry.fingerprint == fingerprint {
                    lines_len += entry.lines.len();
                    continue;
                }
            }

            let lines = super::PanelGroup::new(
                message,
                toggles,
                responses,
                analysis,
                in_flight,
                is_analyzing,
            )
            .as_lines(line_width);

            lines_len += lines.len();
            self.cache.insert(
                message.id.to_string(),
                PanelCacheEntry { fingerprint, lines },
            );
        }

        self.lines_len = lines_len;
    }

    pub fn len(&self) -> usize {
        return self.lines_len;
    }

    pub fn is_empty(&self) -> bool {
        return self.lines_len == 0;
    }

    pub fn lines(&self) -> Vec<Line<'static>> {
        return self
            .order
            .iter()
            .filter_map(|id| return self.cache.get(id))
            .flat_map(|entry| return entry.lines.to_owned())
            .collect();
    }

    pub fn render<B: Backend>(&self, frame: &mut Frame<B>, rect: Rect, scroll: u16) {
        frame.render_widget(
            Paragraph::new(self.lines())
                .block(Block::default())
                .scroll((scroll, 0)),
            rect,
        );
    }
}
