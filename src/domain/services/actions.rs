use std::collections::BTreeMap;

use anyhow::Result;
use tokio::sync::mpsc;

use super::WatcherRegistry;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Action;
use crate::domain::models::Event;
use crate::domain::models::ModelResponse;
use crate::domain::models::PromptSubmission;
use crate::infrastructure::gateway::AnalysisGateway;
use crate::infrastructure::gateway::SubmissionGateway;
use crate::infrastructure::store::StoreClient;

async fn submit_worker(
    gateway: SubmissionGateway,
    prompt: PromptSubmission,
    tx: &mpsc::UnboundedSender<Event>,
) -> Result<()> {
    let message_id = prompt.id.to_string();
    if let Err(err) = gateway.submit(&prompt).await {
        tx.send(Event::SubmitFailed(message_id, format!("{err}")))?;
        return Ok(());
    }

    tx.send(Event::SubmitAccepted(message_id))?;
    return Ok(());
}

async fn analyze_worker(
    gateway: AnalysisGateway,
    message_id: String,
    responses: BTreeMap<String, ModelResponse>,
    tx: &mpsc::UnboundedSender<Event>,
) -> Result<()> {
    match gateway.analyze(&message_id, responses).await {
        Ok(result) => {
            tx.send(Event::AnalysisReady(message_id, result))?;
        }
        Err(err) => {
            tx.send(Event::AnalysisFailed(message_id, format!("{err}")))?;
        }
    }

    return Ok(());
}

pub struct ActionsService {}

impl ActionsService {
    /// Owns every outbound side effect: the history listener, per-model
    /// watches, prompt submission, and analysis requests. Each one runs in
    /// its own task and reports back through events, so a hung backend never
    /// stalls the UI.
    pub async fn start(
        tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        let store = StoreClient::default();
        let submission = SubmissionGateway::default();
        let analysis = AnalysisGateway::default();
        let limit = Config::get(ConfigKey::WatchLimit).parse::<usize>()?;
        let mut registry = WatcherRegistry::new(limit);

        let history_store = store.clone();
        let history_tx = tx.clone();
        tokio::spawn(async move {
            if let Err(err) = history_store.watch_history_with_retry(&history_tx).await {
                tracing::error!(error = ?err, "history watch ended");
            }
        });

        loop {
            let action = rx.recv().await;
            if action.is_none() {
                continue;
            }

            match action.unwrap() {
                Action::SubmitPrompt(prompt) => {
                    let gateway = submission.clone();
                    let worker_tx = tx.clone();
                    tokio::spawn(async move {
                        if let Err(err) = submit_worker(gateway, prompt, &worker_tx).await {
                            tracing::error!(error = ?err, "submission worker failed");
                        }
                    });
                }
                Action::RequestAnalysis(message_id, responses) => {
                    let gateway = analysis.clone();
                    let worker_tx = tx.clone();
                    tokio::spawn(async move {
                        let res =
                            analyze_worker(gateway, message_id, responses, &worker_tx).await;
                        if let Err(err) = res {
                            tracing::error!(error = ?err, "analysis worker failed");
                        }
                    });
                }
                Action::WatchMessage(message_id, model_keys) => {
                    if registry.contains(&message_id) {
                        registry.touch(&message_id);
                        continue;
                    }

                    let mut handles = vec![];
                    for model_key in model_keys {
                        let watcher = store.clone();
                        let watch_tx = tx.clone();
                        let id = message_id.to_string();
                        handles.push(tokio::spawn(async move {
                            let res = watcher
                                .watch_model_with_retry(&id, &model_key, &watch_tx)
                                .await;
                            if let Err(err) = res {
                                tracing::error!(
                                    error = ?err,
                                    message_id = %id,
                                    model = %model_key,
                                    "model watch ended"
                                );
                            }
                        }));
                    }

                    for evicted in registry.track(&message_id, handles) {
                        tracing::debug!(message_id = %evicted, "evicted watch set");
                    }
                }
                Action::ReleaseMessage(message_id) => {
                    registry.release(&message_id);
                }
                Action::ReleaseAll() => {
                    registry.release_all();
                }
            }
        }
    }
}
