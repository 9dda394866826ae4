#[cfg(test)]
#[path = "app_state_test.rs"]
mod tests;

use std::collections::HashSet;

use anyhow::bail;
use anyhow::Result;
use ratatui::prelude::Rect;
use tokio::sync::mpsc;

use super::Aggregator;
use super::PanelList;
use super::Scroll;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::enabled_keys;
use crate::domain::models::toggles_from_keys;
use crate::domain::models::Action;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::ModelToggle;
use crate::domain::models::PromptSubmission;
use crate::domain::models::SlashCommand;

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /analyze (/an) [MESSAGE_INDEX?] - Ask for a judged comparison of a message's answers. Defaults to the newest message every enabled model has answered.
- /toggle (/t) [MODEL_KEY] - Enable or disable a model for the next prompt.
- /models (/ml) - Show every model key and whether it is enabled.
- /quit /exit (/q) - Exit Medley.
- /help (/h) - Provides this help menu.

HOTKEYS:
- Up arrow - Scroll up
- Down arrow - Scroll down
- CTRL+U - Page up
- CTRL+D - Page down
- CTRL+C - Exit.
        "#;

    return text.trim().to_string();
}

pub struct AppState {
    pub aggregator: Aggregator,
    pub panel_list: PanelList,
    pub scroll: Scroll,
    pub toggles: Vec<ModelToggle>,
    pub user_id: String,
    pub current_message_id: Option<String>,
    pub submitting: bool,
    pub analyzing: HashSet<String>,
    pub status_line: Option<String>,
    pub last_known_width: u16,
    pub last_known_height: u16,
}

impl AppState {
    pub fn new() -> Result<AppState> {
        let user_id = Config::get(ConfigKey::UserID);
        if user_id.is_empty() {
            bail!("A user id is required. Pass --user-id, set MEDLEY_USER_ID, or add user-id to the config file.");
        }

        let toggles = toggles_from_keys(&Config::get(ConfigKey::Models));
        if toggles.is_empty() {
            bail!("At least one model key is required. Check the models config value.");
        }

        return Ok(AppState {
            aggregator: Aggregator::default(),
            panel_list: PanelList::default(),
            scroll: Scroll::default(),
            toggles,
            user_id,
            current_message_id: None,
            submitting: false,
            analyzing: HashSet::new(),
            status_line: None,
            last_known_width: 0,
            last_known_height: 0,
        });
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.last_known_width = rect.width;
        self.last_known_height = rect.height;
        self.sync_dependants();
    }

    pub fn enabled_keys(&self) -> Vec<String> {
        return enabled_keys(&self.toggles);
    }

    /// Validates and sends a prompt: one submission request, one watch per
    /// enabled model under the freshly generated id. Returns false when
    /// nothing was sent.
    pub fn handle_submit(
        &mut self,
        input: &str,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<bool> {
        let content = input.trim();
        if content.is_empty() || self.submitting {
            return Ok(false);
        }

        let enabled = self.enabled_keys();
        if enabled.is_empty() {
            self.status_line = Some("Enable at least one model before sending a prompt.".to_string());
            self.sync_dependants();
            return Ok(false);
        }

        let id = Message::generate_id();
        self.submitting = true;
        self.status_line = None;
        self.current_message_id = Some(id.to_string());
        self.aggregator.add_local(Message::new(&id, content));

        tx.send(Action::SubmitPrompt(PromptSubmission::new(
            content,
            &id,
            &self.user_id,
            enabled.clone(),
        )))?;
        tx.send(Action::WatchMessage(id, enabled))?;

        self.sync_dependants();
        self.scroll.first();
        return Ok(true);
    }

    /// Returns (should_break, should_continue), matching the UI loop's two
    /// exits: quitting outright, or swallowing the input as handled.
    pub fn handle_slash_commands(
        &mut self,
        command: &SlashCommand,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<(bool, bool)> {
        if command.is_quit() {
            return Ok((true, false));
        }

        if command.is_help() {
            self.status_line =
                Some("Commands: /analyze [N], /toggle KEY, /models, /help, /quit".to_string());
        }

        if command.is_models() {
            let listed = self
                .toggles
                .iter()
                .map(|toggle| {
                    let state = if toggle.enabled { "on" } else { "off" };
                    return format!("{} [{state}]", toggle.key);
                })
                .collect::<Vec<String>>()
                .join(", ");
            self.status_line = Some(format!("Models: {listed}"));
        }

        if command.is_toggle() {
            self.handle_toggle(command);
        }

        if command.is_analyze() {
            self.handle_analyze(command, tx)?;
        }

        self.sync_dependants();
        return Ok((false, true));
    }

    /// Merges worker events into the aggregated view. All mutation happens
    /// here on the UI loop, so merges never race.
    pub fn handle_worker_event(
        &mut self,
        event: Event,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<()> {
        match event {
            Event::HistorySnapshot(messages) => {
                let new_ids = self.aggregator.on_history_snapshot(messages);
                let enabled = self.enabled_keys();
                for id in new_ids {
                    tx.send(Action::WatchMessage(id, enabled.clone()))?;
                }
            }
            Event::ModelUpdate(message_id, model_key, response) => {
                self.aggregator
                    .on_model_update(&message_id, &model_key, response);
            }
            Event::AnalysisReady(message_id, result) => {
                self.analyzing.remove(&message_id);
                self.aggregator.on_analysis_result(&message_id, result);
                // The judged comparison settles the message; the history
                // listener still covers any stragglers.
                tx.send(Action::ReleaseMessage(message_id))?;
            }
            Event::AnalysisFailed(message_id, error) => {
                self.analyzing.remove(&message_id);
                self.status_line = Some(format!("Analysis failed: {error}"));
            }
            Event::StoreDisconnected(scope) => {
                self.status_line = Some(format!(
                    "Live updates interrupted ({scope}); reconnecting..."
                ));
            }
            Event::SubmitAccepted(message_id) => {
                if self.current_message_id.as_deref() == Some(message_id.as_str()) {
                    self.submitting = false;
                }
            }
            Event::SubmitFailed(message_id, error) => {
                if self.current_message_id.as_deref() == Some(message_id.as_str()) {
                    self.submitting = false;
                }
                self.status_line = Some(format!("Submission failed: {error}"));
            }
            _ => (),
        }

        self.sync_dependants();
        return Ok(());
    }

    fn handle_toggle(&mut self, command: &SlashCommand) {
        let key = match command.args.first() {
            Some(key) => key.to_string(),
            None => {
                self.status_line = Some("Usage: /toggle MODEL_KEY".to_string());
                return;
            }
        };

        match self
            .toggles
            .iter_mut()
            .find(|toggle| return toggle.key == key)
        {
            Some(toggle) => {
                toggle.enabled = !toggle.enabled;
                let state = if toggle.enabled { "enabled" } else { "disabled" };
                self.status_line = Some(format!("{} is now {state}.", toggle.name));
            }
            None => {
                self.status_line = Some(format!("No model with key {key}. Run /models."));
            }
        }
    }

    fn handle_analyze(
        &mut self,
        command: &SlashCommand,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<()> {
        let enabled = self.enabled_keys();
        if enabled.is_empty() {
            self.status_line = Some("Enable at least one model before analyzing.".to_string());
            return Ok(());
        }

        let target = match command.args.first() {
            Some(arg) => {
                let idx = match arg.parse::<usize>() {
                    Ok(idx) if idx >= 1 => idx - 1,
                    _ => {
                        self.status_line =
                            Some("Usage: /analyze [MESSAGE_INDEX], counted from the top.".to_string());
                        return Ok(());
                    }
                };
                self.aggregator
                    .messages()
                    .get(idx)
                    .map(|message| return message.id.to_string())
            }
            None => self
                .aggregator
                .latest_complete(&enabled)
                .map(|message| return message.id.to_string()),
        };

        let message_id = match target {
            Some(message_id) => message_id,
            None => {
                self.status_line =
                    Some("No message has answers from every enabled model yet.".to_string());
                return Ok(());
            }
        };

        // The trigger stays disabled until completeness holds.
        if !self.aggregator.is_complete(&message_id, &enabled) {
            let missing = self.aggregator.missing_keys(&message_id, &enabled);
            self.status_line = Some(format!("Still waiting on: {}.", missing.join(", ")));
            return Ok(());
        }

        if self.analyzing.contains(&message_id) {
            return Ok(());
        }

        let responses = match self.aggregator.responses_for(&message_id) {
            Some(responses) => responses.clone(),
            None => return Ok(()),
        };

        self.analyzing.insert(message_id.to_string());
        self.status_line = None;
        tx.send(Action::RequestAnalysis(message_id, responses))?;
        return Ok(());
    }

    fn sync_dependants(&mut self) {
        self.panel_list.update(
            &self.aggregator,
            &self.toggles,
            self.current_message_id.as_deref(),
            &self.analyzing,
            self.last_known_width,
        );

        self.scroll
            .set_state(self.panel_list.len() as u16, self.last_known_height);
    }
}
