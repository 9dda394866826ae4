#[cfg(test)]
#[path = "panel_test.rs"]
mod tests;

use std::collections::BTreeMap;

use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;

use crate::domain::models::enabled_keys;
use crate::domain::models::wrap_text;
use crate::domain::models::AnalysisResult;
use crate::domain::models::Message;
use crate::domain::models::ModelResponse;
use crate::domain::models::ModelToggle;

/// One message group: the prompt header, one panel per enabled model, and
/// the analysis section once every enabled model has answered.
pub struct PanelGroup<'a> {
    message: &'a Message,
    toggles: &'a [ModelToggle],
    responses: Option<&'a BTreeMap<String, ModelResponse>>,
    analysis: Option<&'a AnalysisResult>,
    in_flight: bool,
    analyzing: bool,
}

impl<'a> PanelGroup<'a> {
    pub fn new(
        message: &'a Message,
        toggles: &'a [ModelToggle],
        responses: Option<&'a BTreeMap<String, ModelResponse>>,
        analysis: Option<&'a AnalysisResult>,
        in_flight: bool,
        analyzing: bool,
    ) -> PanelGroup<'a> {
        return PanelGroup {
            message,
            toggles,
            responses,
            analysis,
            in_flight,
            analyzing,
        };
    }

    pub fn as_lines(&self, line_width: u16) -> Vec<Line<'static>> {
        let wrap_width = usize::from(line_width).saturating_sub(4).max(20);
        let mut lines: Vec<Line<'static>> = vec![];

        for (idx, text) in wrap_text(&self.message.content, wrap_width)
            .into_iter()
            .enumerate()
        {
            if idx == 0 {
                lines.push(Line::from(vec![
                    Span::styled(
                        self.message.timestamp_formatted(),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw("  "),
                    Span::styled(text, Style::default().add_modifier(Modifier::BOLD)),
                ]));
            } else {
                lines.push(Line::from(Span::styled(
                    text,
                    Style::default().add_modifier(Modifier::BOLD),
                )));
            }
        }

        let best_model = self
            .analysis
            .map(|analysis| return analysis.best_model.to_string());

        for toggle in self.toggles.iter().filter(|toggle| return toggle.enabled) {
            let response = self
                .responses
                .and_then(|responses| return responses.get(&toggle.key));

            let mut title = vec![
                Span::styled("▌ ".to_string(), Style::default().fg(Color::Blue)),
                Span::styled(
                    toggle.name.to_string(),
                    Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
                ),
            ];
            if best_model.as_deref() == Some(toggle.key.as_str()) {
                title.push(Span::styled(
                    "  ★ best answer".to_string(),
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ));
            }
            lines.push(Line::from(title));

            match response {
                Some(response) => {
                    let style = if response.answer.is_some() {
                        Style::default()
                    } else {
                        Style::default().fg(Color::Red)
                    };
                    for text in wrap_text(&response.display_text(), wrap_width) {
                        lines.push(Line::from(Span::styled(format!("  {text}"), style)));
                    }
                }
                None => {
                    let text = if self.in_flight {
                        "Waiting for response..."
                    } else {
                        "No response yet"
                    };
                    lines.push(Line::from(Span::styled(
                        format!("  {text}"),
                        Style::default().fg(Color::DarkGray),
                    )));
                }
            }
        }

        self.append_analysis_section(&mut lines, wrap_width);
        lines.push(Line::from("".to_string()));

        return lines;
    }

    fn is_complete(&self) -> bool {
        let enabled = enabled_keys(self.toggles);
        if enabled.is_empty() {
            return false;
        }

        return enabled.iter().all(|key| {
            return self
                .responses
                .map(|responses| return responses.contains_key(key))
                .unwrap_or(false);
        });
    }

    fn append_analysis_section(&self, lines: &mut Vec<Line<'static>>, wrap_width: usize) {
        if !self.is_complete() {
            return;
        }

        if self.analyzing {
            lines.push(Line::from(Span::styled(
                "  Analyzing responses...".to_string(),
                Style::default().fg(Color::Yellow),
            )));
            return;
        }

        if let Some(analysis) = self.analysis {
            for (idx, text) in wrap_text(&analysis.summary, wrap_width).iter().enumerate() {
                let prefix = if idx == 0 { "  Summary: " } else { "  " };
                lines.push(Line::from(Span::styled(
                    format!("{prefix}{text}"),
                    Style::default().fg(Color::Yellow),
                )));
            }
            let mut best_line = format!("  Best model: {}", analysis.best_model);
            if let Some(secs) = analysis.estimated_time {
                best_line.push_str(&format!(" (judged in ~{secs}s)"));
            }
            lines.push(Line::from(Span::styled(
                best_line,
                Style::default().fg(Color::Green),
            )));
            return;
        }

        lines.push(Line::from(Span::styled(
            "  All models have answered. Use /analyze to compare.".to_string(),
            Style::default().fg(Color::DarkGray),
        )));
    }
}
