use std::collections::BTreeMap;

use ratatui::text::Line;

use super::PanelGroup;
use crate::domain::models::toggles_from_keys;
use crate::domain::models::AnalysisResult;
use crate::domain::models::Message;
use crate::domain::models::ModelResponse;
use crate::domain::models::ModelToggle;

fn line_text(line: &Line) -> String {
    return line
        .spans
        .iter()
        .map(|span| return span.content.to_string())
        .collect::<Vec<String>>()
        .join("");
}

fn rendered(group: &PanelGroup) -> Vec<String> {
    return group
        .as_lines(100)
        .iter()
        .map(|line| return line_text(line))
        .collect();
}

fn toggles() -> Vec<ModelToggle> {
    return toggles_from_keys("deepseek,grok");
}

fn responses() -> BTreeMap<String, ModelResponse> {
    let mut map = BTreeMap::new();
    map.insert(
        "deepseek".to_string(),
        ModelResponse::with_answer("Hi", 1700000002000),
    );
    map.insert(
        "grok".to_string(),
        ModelResponse::with_error("timeout", 1700000003000),
    );
    return map;
}

#[test]
fn it_renders_no_response_yet_for_historical_messages() {
    let message = Message::new_with_timestamp("q1", "hello", 1700000001000);
    let toggles = toggles();
    let group = PanelGroup::new(&message, &toggles, None, None, false, false);

    let lines = rendered(&group);
    assert_eq!(
        lines
            .iter()
            .filter(|line| return line.contains("No response yet"))
            .count(),
        2
    );
}

#[test]
fn it_renders_waiting_for_the_in_flight_message() {
    let message = Message::new_with_timestamp("q1", "hello", 1700000001000);
    let toggles = toggles();
    let group = PanelGroup::new(&message, &toggles, None, None, true, false);

    let lines = rendered(&group);
    assert_eq!(
        lines
            .iter()
            .filter(|line| return line.contains("Waiting for response..."))
            .count(),
        2
    );
}

#[test]
fn it_renders_answers_and_errors() {
    let message = Message::new_with_timestamp("q1", "hello", 1700000001000);
    let toggles = toggles();
    let responses = responses();
    let group = PanelGroup::new(&message, &toggles, Some(&responses), None, false, false);

    let lines = rendered(&group);
    assert!(lines.iter().any(|line| return line.contains("Deepseek")));
    assert!(lines.iter().any(|line| return line == &"  Hi"));
    assert!(lines
        .iter()
        .any(|line| return line.contains("Error: timeout")));
}

#[test]
fn it_renders_unknown_errors_for_empty_records() {
    let message = Message::new_with_timestamp("q1", "hello", 1700000001000);
    let toggles = toggles_from_keys("deepseek");
    let mut responses = BTreeMap::new();
    responses.insert("deepseek".to_string(), ModelResponse::default());
    let group = PanelGroup::new(&message, &toggles, Some(&responses), None, false, false);

    let lines = rendered(&group);
    assert!(lines
        .iter()
        .any(|line| return line.contains("Error: Unknown error")));
}

#[test]
fn it_skips_disabled_models() {
    let message = Message::new_with_timestamp("q1", "hello", 1700000001000);
    let mut toggles = toggles();
    toggles[1].enabled = false;
    let group = PanelGroup::new(&message, &toggles, None, None, false, false);

    let lines = rendered(&group);
    assert!(lines.iter().any(|line| return line.contains("Deepseek")));
    assert!(!lines.iter().any(|line| return line.contains("Grok")));
}

#[test]
fn it_shows_the_analyze_hint_only_when_complete() {
    let message = Message::new_with_timestamp("q1", "hello", 1700000001000);
    let toggles = toggles();
    let responses = responses();

    let complete = PanelGroup::new(&message, &toggles, Some(&responses), None, false, false);
    assert!(rendered(&complete)
        .iter()
        .any(|line| return line.contains("/analyze")));

    let mut partial = responses.clone();
    partial.remove("grok");
    let incomplete = PanelGroup::new(&message, &toggles, Some(&partial), None, false, false);
    assert!(!rendered(&incomplete)
        .iter()
        .any(|line| return line.contains("/analyze")));
}

#[test]
fn it_renders_the_analyzing_state() {
    let message = Message::new_with_timestamp("q1", "hello", 1700000001000);
    let toggles = toggles();
    let responses = responses();
    let group = PanelGroup::new(&message, &toggles, Some(&responses), None, false, true);

    assert!(rendered(&group)
        .iter()
        .any(|line| return line.contains("Analyzing responses...")));
}

#[test]
fn it_highlights_the_best_model() {
    let message = Message::new_with_timestamp("q1", "hello", 1700000001000);
    let toggles = toggles();
    let responses = responses();
    let analysis = AnalysisResult::new("deepseek wins", "deepseek");
    let group = PanelGroup::new(
        &message,
        &toggles,
        Some(&responses),
        Some(&analysis),
        false,
        false,
    );

    let lines = rendered(&group);
    assert!(lines
        .iter()
        .any(|line| return line.contains("Deepseek") && line.contains("★ best answer")));
    assert!(!lines
        .iter()
        .any(|line| return line.contains("Grok") && line.contains("★ best answer")));
    assert!(lines
        .iter()
        .any(|line| return line.contains("Summary: deepseek wins")));
    assert!(lines
        .iter()
        .any(|line| return line.contains("Best model: deepseek")));
}

#[test]
fn it_shows_the_judging_time_when_reported() {
    let message = Message::new_with_timestamp("q1", "hello", 1700000001000);
    let toggles = toggles();
    let responses = responses();
    let mut analysis = AnalysisResult::new("deepseek wins", "deepseek");
    analysis.estimated_time = Some(4);
    let group = PanelGroup::new(
        &message,
        &toggles,
        Some(&responses),
        Some(&analysis),
        false,
        false,
    );

    assert!(rendered(&group)
        .iter()
        .any(|line| return line.contains("Best model: deepseek (judged in ~4s)")));
}

#[test]
fn it_wraps_long_answers() {
    let message = Message::new_with_timestamp("q1", "hello", 1700000001000);
    let toggles = toggles_from_keys("deepseek");
    let mut responses = BTreeMap::new();
    responses.insert(
        "deepseek".to_string(),
        ModelResponse::with_answer(&"word ".repeat(100), 1),
    );
    let group = PanelGroup::new(&message, &toggles, Some(&responses), None, false, false);

    let answer_lines = rendered(&group)
        .iter()
        .filter(|line| return line.contains("word"))
        .count();
    assert!(answer_lines > 1);
}
