#[cfg(test)]
#[path = "client_test.rs"]
mod tests;

use std::time::Duration;
use std::time::Instant;

use anyhow::bail;
use anyhow::Result;
use futures::stream::TryStreamExt;
use serde_derive::Deserialize;
use serde_json::Value;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tokio_util::io::StreamReader;

use super::tree;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Event;
use crate::domain::models::ModelResponse;

fn convert_err(err: reqwest::Error) -> std::io::Error {
    let err_msg = err.to_string();
    return std::io::Error::new(std::io::ErrorKind::Interrupted, err_msg);
}

const RETRY_DELAY_FLOOR_MS: u64 = 1000;
const RETRY_DELAY_CAP_MS: u64 = 30000;

/// One change pushed down a streaming read. `path` is relative to the node
/// the stream was opened on, `data` is the new value at that path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct PushedChange {
    #[serde(default)]
    path: String,
    data: Value,
}

/// REST client for the realtime store. One-shot reads fetch a node as JSON,
/// streaming reads hold the connection open and receive server-sent events
/// as the node changes.
#[derive(Clone)]
pub struct StoreClient {
    url: String,
    user_id: String,
    auth_token: String,
    timeout: String,
}

impl Default for StoreClient {
    fn default() -> StoreClient {
        return StoreClient {
            url: Config::get(ConfigKey::StoreURL),
            user_id: Config::get(ConfigKey::UserID),
            auth_token: Config::get(ConfigKey::AuthToken),
            timeout: Config::get(ConfigKey::RequestTimeout),
        };
    }
}

impl StoreClient {
    fn node_url(&self, segments: &[&str]) -> String {
        let mut url = format!(
            "{url}/users/{user_id}/question",
            url = self.url,
            user_id = self.user_id
        );
        for segment in segments {
            url.push('/');
            url.push_str(segment);
        }
        url.push_str(".json");
        if !self.auth_token.is_empty() {
            url.push_str(&format!("?auth={token}", token = self.auth_token));
        }

        return url;
    }

    pub async fn fetch_history(&self) -> Result<Option<Value>> {
        if self.url.is_empty() {
            bail!("Store URL is not defined");
        }

        let res = reqwest::Client::new()
            .get(self.node_url(&[]))
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "History read failed");
            bail!(
                "History read failed with status {status}",
                status = res.status().as_u16()
            );
        }

        let value = res.json::<Value>().await?;
        if value.is_null() {
            return Ok(None);
        }

        return Ok(Some(value));
    }

    async fn forward_snapshot(&self, tx: &mpsc::UnboundedSender<Event>) -> Result<()> {
        let (messages, responses) = match self.fetch_history().await? {
            Some(value) => tree::decode_history(&value),
            None => (vec![], vec![]),
        };

        tx.send(Event::HistorySnapshot(messages))?;
        for (message_id, model_key, response) in responses {
            tx.send(Event::ModelUpdate(message_id, model_key, response))?;
        }

        return Ok(());
    }

    /// Streams the whole history node. The pushed payloads only say that
    /// something changed, so each change triggers a fresh one-shot read and
    /// a full snapshot downstream. Returns when the server closes the
    /// stream, errors when it revokes it.
    pub async fn watch_history(&self, tx: &mpsc::UnboundedSender<Event>) -> Result<()> {
        if self.url.is_empty() {
            bail!("Store URL is not defined");
        }

        let res = reqwest::Client::new()
            .get(self.node_url(&[]))
            .header("Accept", "text/event-stream")
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "History stream refused");
            bail!(
                "History stream failed with status {status}",
                status = res.status().as_u16()
            );
        }

        let stream = res.bytes_stream().map_err(convert_err);
        let mut lines_reader = StreamReader::new(stream).lines();

        let mut current_event = "".to_string();
        while let Ok(line) = lines_reader.next_line().await {
            if line.is_none() {
                break;
            }

            let cleaned_line = line.unwrap().trim().to_string();
            if let Some(name) = cleaned_line.strip_prefix("event:") {
                current_event = name.trim().to_string();
                continue;
            }
            if cleaned_line.strip_prefix("data:").is_none() {
                continue;
            }

            match current_event.as_str() {
                "put" | "patch" => {
                    self.forward_snapshot(tx).await?;
                }
                "cancel" | "auth_revoked" => {
                    bail!("History stream was revoked");
                }
                _ => continue,
            }
        }

        return Ok(());
    }

    /// Keeps the history stream open for the life of the session. A server
    /// close or transport failure is reported downstream as a disconnect,
    /// then the stream reopens after a backoff. Only returns once the
    /// receiving side is gone.
    pub async fn watch_history_with_retry(&self, tx: &mpsc::UnboundedSender<Event>) -> Result<()> {
        let mut delay = Duration::from_millis(RETRY_DELAY_FLOOR_MS);
        loop {
            let connected_at = Instant::now();
            match self.watch_history(tx).await {
                Ok(()) => tracing::warn!("History stream closed"),
                Err(err) => tracing::error!(error = ?err, "History stream failed"),
            }
            if tx
                .send(Event::StoreDisconnected("history".to_string()))
                .is_err()
            {
                return Ok(());
            }

            // A stream that held for a while earns a fresh backoff.
            if connected_at.elapsed() >= Duration::from_millis(RETRY_DELAY_CAP_MS) {
                delay = Duration::from_millis(RETRY_DELAY_FLOOR_MS);
            }
            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(Duration::from_millis(RETRY_DELAY_CAP_MS));
        }
    }

    /// Same recovery loop for a single model's stream. Runs until the watch
    /// task is aborted or the receiving side is gone.
    pub async fn watch_model_with_retry(
        &self,
        message_id: &str,
        model_key: &str,
        tx: &mpsc::UnboundedSender<Event>,
    ) -> Result<()> {
        let mut delay = Duration::from_millis(RETRY_DELAY_FLOOR_MS);
        loop {
            let connected_at = Instant::now();
            match self.watch_model(message_id, model_key, tx).await {
                Ok(()) => tracing::warn!(
                    message_id = message_id,
                    model = model_key,
                    "Model stream closed"
                ),
                Err(err) => tracing::error!(
                    error = ?err,
                    message_id = message_id,
                    model = model_key,
                    "Model stream failed"
                ),
            }
            if tx
                .send(Event::StoreDisconnected(format!(
                    "{model_key}/{message_id}"
                )))
                .is_err()
            {
                return Ok(());
            }

            if connected_at.elapsed() >= Duration::from_millis(RETRY_DELAY_CAP_MS) {
                delay = Duration::from_millis(RETRY_DELAY_FLOOR_MS);
            }
            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(Duration::from_millis(RETRY_DELAY_CAP_MS));
        }
    }

    /// Streams a single model's node under one message, forwarding each
    /// non-null value as a response update. Null payloads mean nothing is
    /// recorded there yet.
    pub async fn watch_model(
        &self,
        message_id: &str,
        model_key: &str,
        tx: &mpsc::UnboundedSender<Event>,
    ) -> Result<()> {
        if self.url.is_empty() {
            bail!("Store URL is not defined");
        }

        let res = reqwest::Client::new()
            .get(self.node_url(&[message_id, model_key]))
            .header("Accept", "text/event-stream")
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(
                status = res.status().as_u16(),
                message_id = message_id,
                model = model_key,
                "Model stream refused"
            );
            bail!(
                "Stream for {model_key} failed with status {status}",
                status = res.status().as_u16()
            );
        }

        let stream = res.bytes_stream().map_err(convert_err);
        let mut lines_reader = StreamReader::new(stream).lines();

        let mut current_event = "".to_string();
        while let Ok(line) = lines_reader.next_line().await {
            if line.is_none() {
                break;
            }

            let cleaned_line = line.unwrap().trim().to_string();
            if let Some(name) = cleaned_line.strip_prefix("event:") {
                current_event = name.trim().to_string();
                continue;
            }
            let data = match cleaned_line.strip_prefix("data:") {
                Some(data) => data.trim(),
                None => continue,
            };

            match current_event.as_str() {
                "put" | "patch" => {
                    let change = match serde_json::from_str::<PushedChange>(data) {
                        Ok(change) => change,
                        Err(err) => {
                            tracing::warn!(error = ?err, "Unparseable stream payload");
                            continue;
                        }
                    };
                    if change.data.is_null() {
                        continue;
                    }

                    tracing::debug!(
                        path = %change.path,
                        message_id = message_id,
                        model = model_key,
                        "Model update pushed"
                    );
                    match serde_json::from_value::<ModelResponse>(change.data) {
                        Ok(response) => {
                            tx.send(Event::ModelUpdate(
                                message_id.to_string(),
                                model_key.to_string(),
                                response,
                            ))?;
                        }
                        Err(err) => {
                            tracing::warn!(error = ?err, "Undecodable response payload");
                        }
                    }
                }
                "cancel" | "auth_revoked" => {
                    bail!("Stream for {model_key} was revoked");
                }
                _ => continue,
            }
        }

        return Ok(());
    }
}
