#[cfg(test)]
#[path = "submission_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::PromptSubmission;

/// Hands prompts to the fan-out service, which forwards them to every
/// requested model and records the results in the realtime store.
#[derive(Clone)]
pub struct SubmissionGateway {
    url: String,
    timeout: String,
}

impl Default for SubmissionGateway {
    fn default() -> SubmissionGateway {
        return SubmissionGateway {
            url: Config::get(ConfigKey::ServiceURL),
            timeout: Config::get(ConfigKey::RequestTimeout),
        };
    }
}

impl SubmissionGateway {
    pub async fn submit(&self, prompt: &PromptSubmission) -> Result<()> {
        if self.url.is_empty() {
            bail!("Service URL is not defined");
        }

        let res = reqwest::Client::new()
            .post(format!("{url}/api/message", url = self.url))
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .json(prompt)
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(
                status = res.status().as_u16(),
                message_id = %prompt.id,
                "Prompt submission was rejected"
            );
            bail!(
                "Prompt submission failed with status {status}",
                status = res.status().as_u16()
            );
        }

        return Ok(());
    }
}
