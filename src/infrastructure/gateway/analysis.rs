#[cfg(test)]
#[path = "analysis_test.rs"]
mod tests;

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::AnalysisResult;
use crate::domain::models::ModelResponse;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisRequest {
    message_id: String,
    responses: BTreeMap<String, ModelResponse>,
    user_id: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisResponse {
    summary: String,
    best_model: String,
    #[serde(default)]
    estimated_time: Option<u64>,
}

/// Asks the judging service to compare every recorded response for one
/// message and pick a winner.
#[derive(Clone)]
pub struct AnalysisGateway {
    url: String,
    token: String,
    user_id: String,
    timeout: String,
}

impl Default for AnalysisGateway {
    fn default() -> AnalysisGateway {
        return AnalysisGateway {
            url: Config::get(ConfigKey::ServiceURL),
            token: Config::get(ConfigKey::AuthToken),
            user_id: Config::get(ConfigKey::UserID),
            timeout: Config::get(ConfigKey::RequestTimeout),
        };
    }
}

impl AnalysisGateway {
    pub async fn analyze(
        &self,
        message_id: &str,
        responses: BTreeMap<String, ModelResponse>,
    ) -> Result<AnalysisResult> {
        if self.url.is_empty() {
            bail!("Service URL is not defined");
        }

        let req = AnalysisRequest {
            message_id: message_id.to_string(),
            responses,
            user_id: self.user_id.to_string(),
        };

        let mut builder = reqwest::Client::new()
            .post(format!("{url}/api/analyze", url = self.url))
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .json(&req);
        if !self.token.is_empty() {
            builder = builder.header("Authorization", format!("Bearer {}", self.token));
        }

        let res = builder.send().await?;
        if !res.status().is_success() {
            tracing::error!(
                status = res.status().as_u16(),
                message_id = message_id,
                "Analysis request was rejected"
            );
            bail!(
                "Analysis request failed with status {status}",
                status = res.status().as_u16()
            );
        }

        let body = res.json::<AnalysisResponse>().await?;
        tracing::debug!(body = ?body, "Analysis response");

        let mut result = AnalysisResult::new(&body.summary, &body.best_model);
        result.estimated_time = body.estimated_time;
        return Ok(result);
    }
}
