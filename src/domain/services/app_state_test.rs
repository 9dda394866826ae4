use std::collections::HashSet;

use anyhow::bail;
use anyhow::Result;
use tokio::sync::mpsc;

use super::Aggregator;
use super::AppState;
use super::PanelList;
use super::Scroll;
use crate::domain::models::toggles_from_keys;
use crate::domain::models::Action;
use crate::domain::models::AnalysisResult;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::ModelResponse;
use crate::domain::models::SlashCommand;

impl Default for AppState {
    fn default() -> AppState {
        return AppState {
            aggregator: Aggregator::default(),
            panel_list: PanelList::default(),
            scroll: Scroll::default(),
            toggles: toggles_from_keys("deepseek,grok,gemini,openai"),
            user_id: "user-1".to_string(),
            current_message_id: None,
            submitting: false,
            analyzing: HashSet::new(),
            status_line: None,
            last_known_width: 100,
            last_known_height: 40,
        };
    }
}

fn disable(app_state: &mut AppState, keys: &[&str]) {
    for toggle in app_state.toggles.iter_mut() {
        if keys.contains(&toggle.key.as_str()) {
            toggle.enabled = false;
        }
    }
}

fn complete_message(app_state: &mut AppState, id: &str) {
    app_state
        .aggregator
        .add_local(Message::new_with_timestamp(id, "hello", 100));
    app_state
        .aggregator
        .on_model_update(id, "deepseek", ModelResponse::with_answer("Hi", 1));
    app_state
        .aggregator
        .on_model_update(id, "grok", ModelResponse::with_error("timeout", 2));
}

mod handle_submit {
    use super::*;

    #[test]
    fn it_submits_and_watches_enabled_models() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();
        disable(&mut app_state, &["gemini", "openai"]);

        assert!(app_state.handle_submit("Hello", &tx)?);
        assert!(app_state.submitting);

        let submission = match rx.try_recv()? {
            Action::SubmitPrompt(submission) => submission,
            _ => bail!("Wrong action"),
        };
        assert_eq!(submission.content, "Hello");
        assert_eq!(submission.user_id, "user-1");
        assert_eq!(submission.enabled_llms, vec!["deepseek", "grok"]);
        assert!(submission.id.starts_with('q'));

        let (watch_id, watch_keys) = match rx.try_recv()? {
            Action::WatchMessage(id, keys) => (id, keys),
            _ => bail!("Wrong action"),
        };
        assert_eq!(watch_id, submission.id);
        assert_eq!(watch_keys, vec!["deepseek", "grok"]);

        assert_eq!(app_state.current_message_id, Some(submission.id));
        assert_eq!(app_state.aggregator.messages().len(), 1);
        return Ok(());
    }

    #[test]
    fn it_rejects_empty_prompts() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();

        assert!(!app_state.handle_submit("   ", &tx)?);
        assert!(!app_state.submitting);
        assert!(rx.try_recv().is_err());
        return Ok(());
    }

    #[test]
    fn it_rejects_prompts_while_submitting() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();
        app_state.submitting = true;

        assert!(!app_state.handle_submit("Hello", &tx)?);
        assert!(rx.try_recv().is_err());
        return Ok(());
    }

    #[test]
    fn it_rejects_prompts_with_no_models_enabled() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();
        disable(&mut app_state, &["deepseek", "grok", "gemini", "openai"]);

        assert!(!app_state.handle_submit("Hello", &tx)?);
        assert!(app_state.status_line.is_some());
        assert!(rx.try_recv().is_err());
        return Ok(());
    }
}

mod handle_slash_commands {
    use super::*;

    #[test]
    fn it_breaks_on_quit() -> Result<()> {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();

        let command = SlashCommand::parse("/q").unwrap();
        let (should_break, should_continue) = app_state.handle_slash_commands(&command, &tx)?;

        assert!(should_break);
        assert!(!should_continue);
        return Ok(());
    }

    #[test]
    fn it_toggles_models() -> Result<()> {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();

        let command = SlashCommand::parse("/toggle grok").unwrap();
        app_state.handle_slash_commands(&command, &tx)?;
        assert!(!app_state.toggles[1].enabled);

        app_state.handle_slash_commands(&command, &tx)?;
        assert!(app_state.toggles[1].enabled);
        return Ok(());
    }

    #[test]
    fn it_reports_unknown_toggle_keys() -> Result<()> {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();

        let command = SlashCommand::parse("/toggle claude").unwrap();
        app_state.handle_slash_commands(&command, &tx)?;
        assert!(app_state.status_line.as_ref().unwrap().contains("claude"));
        return Ok(());
    }

    #[test]
    fn it_lists_models() -> Result<()> {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();
        app_state.toggles[1].enabled = false;

        let command = SlashCommand::parse("/models").unwrap();
        app_state.handle_slash_commands(&command, &tx)?;

        let status = app_state.status_line.unwrap();
        assert!(status.contains("deepseek [on]"));
        assert!(status.contains("grok [off]"));
        return Ok(());
    }

    #[test]
    fn it_analyzes_the_latest_complete_message() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();
        disable(&mut app_state, &["gemini", "openai"]);
        complete_message(&mut app_state, "q1");

        let command = SlashCommand::parse("/analyze").unwrap();
        app_state.handle_slash_commands(&command, &tx)?;

        let (message_id, responses) = match rx.try_recv()? {
            Action::RequestAnalysis(message_id, responses) => (message_id, responses),
            _ => bail!("Wrong action"),
        };
        assert_eq!(message_id, "q1");
        assert_eq!(responses.len(), 2);
        assert!(app_state.analyzing.contains("q1"));
        return Ok(());
    }

    #[test]
    fn it_refuses_to_analyze_incomplete_messages() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();
        disable(&mut app_state, &["openai"]);
        complete_message(&mut app_state, "q1");

        // gemini is still enabled and has not answered.
        let command = SlashCommand::parse("/analyze 1").unwrap();
        app_state.handle_slash_commands(&command, &tx)?;

        assert!(rx.try_recv().is_err());
        assert!(app_state.status_line.as_ref().unwrap().contains("gemini"));
        assert!(app_state.analyzing.is_empty());
        return Ok(());
    }

    #[test]
    fn it_skips_duplicate_analysis_requests() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();
        disable(&mut app_state, &["gemini", "openai"]);
        complete_message(&mut app_state, "q1");
        app_state.analyzing.insert("q1".to_string());

        let command = SlashCommand::parse("/analyze").unwrap();
        app_state.handle_slash_commands(&command, &tx)?;

        assert!(rx.try_recv().is_err());
        return Ok(());
    }
}

mod handle_worker_event {
    use super::*;

    #[test]
    fn it_opens_watches_for_newly_discovered_messages() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();
        disable(&mut app_state, &["gemini", "openai"]);

        let snapshot = vec![Message::new_with_timestamp("q1", "hello", 100)];
        app_state.handle_worker_event(Event::HistorySnapshot(snapshot), &tx)?;

        let (watch_id, watch_keys) = match rx.try_recv()? {
            Action::WatchMessage(id, keys) => (id, keys),
            _ => bail!("Wrong action"),
        };
        assert_eq!(watch_id, "q1");
        assert_eq!(watch_keys, vec!["deepseek", "grok"]);

        // The same snapshot again discovers nothing new.
        let snapshot = vec![Message::new_with_timestamp("q1", "hello", 100)];
        app_state.handle_worker_event(Event::HistorySnapshot(snapshot), &tx)?;
        assert!(rx.try_recv().is_err());
        return Ok(());
    }

    #[test]
    fn it_merges_model_updates() -> Result<()> {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();

        app_state.handle_worker_event(
            Event::ModelUpdate(
                "q1".to_string(),
                "deepseek".to_string(),
                ModelResponse::with_answer("Hi", 1),
            ),
            &tx,
        )?;

        assert_eq!(
            app_state.aggregator.responses_for("q1").unwrap()["deepseek"].answer,
            Some("Hi".to_string())
        );
        return Ok(());
    }

    #[test]
    fn it_stores_analysis_results_and_clears_the_flag() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();
        app_state.analyzing.insert("q1".to_string());

        app_state.handle_worker_event(
            Event::AnalysisReady("q1".to_string(), AnalysisResult::new("ok", "deepseek")),
            &tx,
        )?;

        assert!(app_state.analyzing.is_empty());
        assert_eq!(
            app_state.aggregator.analysis_for("q1").unwrap().best_model,
            "deepseek"
        );

        // A judged message no longer needs its per-model watches.
        let released = match rx.try_recv()? {
            Action::ReleaseMessage(released) => released,
            _ => bail!("Wrong action"),
        };
        assert_eq!(released, "q1");
        return Ok(());
    }

    #[test]
    fn it_reports_store_disconnects() -> Result<()> {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();

        app_state.handle_worker_event(Event::StoreDisconnected("history".to_string()), &tx)?;

        let status = app_state.status_line.unwrap();
        assert!(status.contains("history"));
        assert!(status.contains("reconnecting"));
        return Ok(());
    }

    #[test]
    fn it_recovers_from_analysis_failures() -> Result<()> {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();
        app_state.analyzing.insert("q1".to_string());

        app_state.handle_worker_event(
            Event::AnalysisFailed("q1".to_string(), "HTTP 500".to_string()),
            &tx,
        )?;

        assert!(app_state.analyzing.is_empty());
        assert!(app_state.aggregator.analysis_for("q1").is_none());
        assert!(app_state.status_line.unwrap().contains("HTTP 500"));
        return Ok(());
    }

    #[test]
    fn it_clears_the_submitting_flag_on_acceptance() -> Result<()> {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();
        app_state.submitting = true;
        app_state.current_message_id = Some("q1".to_string());

        app_state.handle_worker_event(Event::SubmitAccepted("q1".to_string()), &tx)?;
        assert!(!app_state.submitting);
        return Ok(());
    }

    #[test]
    fn it_recovers_from_submission_failures() -> Result<()> {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();
        app_state.submitting = true;
        app_state.current_message_id = Some("q1".to_string());

        app_state.handle_worker_event(
            Event::SubmitFailed("q1".to_string(), "connection refused".to_string()),
            &tx,
        )?;

        assert!(!app_state.submitting);
        assert!(app_state
            .status_line
            .unwrap()
            .contains("connection refused"));
        return Ok(());
    }
}
