use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::time::Duration;

use crate::kv::command::Command;
use crate::kv::core::{StoreError, Transport};
use crate::kv::reply::Reply;

/// 单条命令的响应体：`{"result": ...}` 或 `{"error": "..."}`
#[derive(Debug, Deserialize)]
struct RestResponse {
    #[serde(default)]
    result: JsonValue,
    #[serde(default)]
    error: Option<String>,
}

/// 基于 HTTP 的传输实现
///
/// 单条命令：`POST {url}`，请求体为 `["CMD", "arg", ...]`；
/// 流水线：`POST {url}/pipeline`，请求体为命令数组，响应为逐条结果数组。
/// 认证使用 `Authorization: Bearer {token}`。
pub struct RestTransport {
    client: reqwest::Client,
    url: String,
    token: String,
}

impl RestTransport {
    pub fn new(
        url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::InvalidConfig(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    async fn post(&self, url: String, body: JsonValue) -> Result<reqwest::Response, StoreError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        Ok(response)
    }
}

/// JSON 结果转为原始 Reply
fn reply_from_json(value: JsonValue) -> Reply {
    match value {
        JsonValue::Null => Reply::Nil,
        JsonValue::Bool(b) => Reply::Integer(b as i64),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Reply::Integer(i),
            None => Reply::Text(n.to_string()),
        },
        JsonValue::String(s) => Reply::Text(s),
        JsonValue::Array(items) => Reply::Array(items.into_iter().map(reply_from_json).collect()),
        other => Reply::Text(other.to_string()),
    }
}

#[async_trait]
impl Transport for RestTransport {
    async fn execute(&self, command: Command) -> Result<Reply, StoreError> {
        let body = serde_json::json!(command.to_command_line());
        let response = self.post(self.url.clone(), body).await?;
        let status = response.status();

        let text = response.text().await?;
        let parsed: RestResponse = serde_json::from_str(&text).map_err(|e| {
            StoreError::UnexpectedReply(format!("status {}: {} ({})", status, text, e))
        })?;

        if let Some(error) = parsed.error {
            return Err(StoreError::Command(error));
        }
        if !status.is_success() {
            return Err(StoreError::Command(format!("status {}: {}", status, text)));
        }
        Ok(reply_from_json(parsed.result))
    }

    async fn execute_pipeline(&self, commands: Vec<Command>) -> Result<Vec<Reply>, StoreError> {
        let lines: Vec<Vec<String>> = commands.iter().map(Command::to_command_line).collect();
        let response = self
            .post(format!("{}/pipeline", self.url), serde_json::json!(lines))
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<RestResponse>(&text)
                .ok()
                .and_then(|r| r.error)
                .unwrap_or_else(|| format!("status {}: {}", status, text));
            return Err(StoreError::Command(message));
        }

        let entries: Vec<RestResponse> = serde_json::from_str(&text)
            .map_err(|e| StoreError::UnexpectedReply(format!("{} ({})", text, e)))?;
        if entries.len() != commands.len() {
            return Err(StoreError::UnexpectedReply(format!(
                "pipeline returned {} results for {} commands",
                entries.len(),
                commands.len()
            )));
        }

        let mut replies = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            if let Some(message) = entry.error {
                return Err(StoreError::Pipeline { index, message });
            }
            replies.push(reply_from_json(entry.result));
        }
        Ok(replies)
    }
}
