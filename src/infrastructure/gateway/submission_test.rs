use anyhow::Result;
use mockito::Matcher;

use super::SubmissionGateway;
use crate::domain::models::PromptSubmission;

impl SubmissionGateway {
    fn with_url(url: String) -> SubmissionGateway {
        return SubmissionGateway {
            url,
            timeout: "200".to_string(),
        };
    }
}

#[tokio::test]
async fn it_submits_prompts() -> Result<()> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/api/message")
        .match_body(Matcher::Json(serde_json::json!({
            "content": "Hello world",
            "id": "q1",
            "userId": "user-1",
            "enabledLLMs": ["deepseek", "grok"],
        })))
        .with_status(200)
        .create();

    let gateway = SubmissionGateway::with_url(server.url());
    let prompt = PromptSubmission::new(
        "Hello world",
        "q1",
        "user-1",
        vec!["deepseek".to_string(), "grok".to_string()],
    );
    gateway.submit(&prompt).await?;

    mock.assert();
    return Ok(());
}

#[tokio::test]
async fn it_fails_on_server_errors() {
    let mut server = mockito::Server::new();
    let mock = server.mock("POST", "/api/message").with_status(500).create();

    let gateway = SubmissionGateway::with_url(server.url());
    let prompt = PromptSubmission::new("Hello world", "q1", "user-1", vec![]);
    let res = gateway.submit(&prompt).await;

    assert!(res.is_err());
    mock.assert();
}

#[tokio::test]
async fn it_fails_without_a_url() {
    let gateway = SubmissionGateway::with_url("".to_string());
    let prompt = PromptSubmission::new("Hello world", "q1", "user-1", vec![]);
    let res = gateway.submit(&prompt).await;

    assert!(res.is_err());
}
