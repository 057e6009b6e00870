//! Minimal Anthropic Messages API client for structured extraction.
//!
//! Every call forces a single tool whose input schema is the derived
//! `JsonSchema` of the output type, then deserializes the tool input. No
//! streaming, no multi-turn state; the oracles only ever need one shot.

use std::time::Duration;

use anyhow::{anyhow, Context};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const STRUCTURED_TOOL: &str = "structured_response";
const MAX_TOKENS: u32 = 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) struct Claude {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<WireMessage<'a>>,
    tools: Vec<ToolSpec<'a>>,
    tool_choice: Value,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ToolSpec<'a> {
    name: &'static str,
    description: &'static str,
    input_schema: &'a Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "tool_use")]
    ToolUse { input: Value },
    #[serde(other)]
    Other,
}

impl Claude {
    pub(crate) fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// One-shot structured call: system prompt plus user message in, `T` out.
    pub(crate) async fn extract<T>(&self, system: &str, user: &str) -> anyhow::Result<T>
    where
        T: DeserializeOwned + JsonSchema,
    {
        let schema =
            serde_json::to_value(schemars::schema_for!(T)).context("serializing output schema")?;
        let request = ChatRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![WireMessage {
                role: "user",
                content: user,
            }],
            tools: vec![ToolSpec {
                name: STRUCTURED_TOOL,
                description: "Record the structured answer.",
                input_schema: &schema,
            }],
            tool_choice: json!({ "type": "tool", "name": STRUCTURED_TOOL }),
        };

        let resp = self
            .http
            .post(format!("{ANTHROPIC_BASE_URL}/messages"))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()
            .await
            .context("calling model API")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("model API error ({status}): {body}"));
        }

        let chat: ChatResponse = resp.json().await.context("decoding model response")?;
        for block in chat.content {
            if let ContentBlock::ToolUse { input } = block {
                return serde_json::from_value(input).context("decoding structured output");
            }
        }
        Err(anyhow!("model response contained no structured output block"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, JsonSchema)]
    struct Ack {
        #[allow(dead_code)]
        ok: bool,
    }

    #[test]
    fn request_forces_the_structured_tool() {
        let schema = serde_json::to_value(schemars::schema_for!(Ack)).unwrap();
        let request = ChatRequest {
            model: "test-model",
            max_tokens: MAX_TOKENS,
            system: "sys",
            messages: vec![WireMessage {
                role: "user",
                content: "hi",
            }],
            tools: vec![ToolSpec {
                name: STRUCTURED_TOOL,
                description: "Record the structured answer.",
                input_schema: &schema,
            }],
            tool_choice: json!({ "type": "tool", "name": STRUCTURED_TOOL }),
        };

        let wire = serde_json::to_value(&request).unwrap();
        assert_eq!(wire["tool_choice"]["type"], "tool");
        assert_eq!(wire["tool_choice"]["name"], STRUCTURED_TOOL);
        assert_eq!(wire["tools"][0]["name"], STRUCTURED_TOOL);
        assert!(wire["tools"][0]["input_schema"]["properties"]["ok"].is_object());
    }

    #[test]
    fn tool_use_block_is_extracted_from_mixed_content() {
        let raw = json!({
            "content": [
                { "type": "text", "text": "thinking out loud" },
                { "type": "tool_use", "id": "tu_1", "name": "structured_response",
                  "input": { "ok": true } }
            ]
        });
        let chat: ChatResponse = serde_json::from_value(raw).unwrap();
        let ack = chat
            .content
            .into_iter()
            .find_map(|block| match block {
                ContentBlock::ToolUse { input } => serde_json::from_value::<Ack>(input).ok(),
                ContentBlock::Other => None,
            })
            .unwrap();
        assert!(ack.ok);
    }
}
