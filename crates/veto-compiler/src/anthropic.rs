//! Non-streaming Anthropic Messages API provider, forcing structured output
//! via a single tool the model must call (`tool_choice: {type: "tool", name:
//! "emit_policy"}`) rather than parsing free text.

use crate::provider::{CompileRequest, LlmError, LlmProvider, LlmResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
const EMIT_POLICY_TOOL: &str = "emit_policy";

fn policy_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "action": {"type": "string", "enum": ["delete", "modify", "execute", "read"]},
            "include": {"type": "array", "items": {"type": "string"}},
            "exclude": {"type": "array", "items": {"type": "string"}},
            "description": {"type": "string"},
            "commandRules": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "block": {"type": "array", "items": {"type": "string"}},
                        "reason": {"type": "string"},
                        "suggest": {"type": "string"}
                    },
                    "required": ["block", "reason"]
                }
            },
            "contentRules": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "pattern": {"type": "string"},
                        "fileTypes": {"type": "array", "items": {"type": "string"}},
                        "reason": {"type": "string"},
                        "suggest": {"type": "string"}
                    },
                    "required": ["pattern", "reason"]
                }
            },
            "astRules": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "id": {"type": "string"},
                        "query": {"type": "string"},
                        "languages": {"type": "array", "items": {"type": "string"}},
                        "reason": {"type": "string"},
                        "suggest": {"type": "string"},
                        "regexPreFilter": {"type": "string"}
                    },
                    "required": ["id", "query", "languages", "reason"]
                }
            }
        },
        "required": ["action", "description"]
    })
}

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: ANTHROPIC_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<AnthropicMessage>,
    tools: Vec<AnthropicTool>,
    tool_choice: Value,
}

#[derive(Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct AnthropicTool {
    name: String,
    description: String,
    input_schema: Value,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ResponseBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ResponseBlock {
    #[serde(rename = "tool_use")]
    ToolUse {
        #[serde(default)]
        name: String,
        input: Value,
    },
    #[serde(other)]
    Other,
}

#[async_trait::async_trait]
impl LlmProvider for AnthropicProvider {
    async fn compile_structured(&self, request: CompileRequest) -> LlmResult<Value> {
        let body = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: 2048,
            system: request.system_prompt,
            messages: vec![AnthropicMessage {
                role: "user",
                content: format!(
                    "Restriction: {}\nSuggested action: {}",
                    request.restriction, request.suggested_action
                ),
            }],
            tools: vec![AnthropicTool {
                name: EMIT_POLICY_TOOL.to_string(),
                description: "Emit the compiled Policy for this restriction.".to_string(),
                input_schema: policy_schema(),
            }],
            tool_choice: json!({"type": "tool", "name": EMIT_POLICY_TOOL}),
        };

        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 => LlmError::AuthFailed(text),
                429 => LlmError::RateLimited { retry_after_ms: 60_000 },
                503 => LlmError::ServiceUnavailable(text),
                _ => LlmError::InvalidResponse(format!("{status}: {text}")),
            });
        }

        let parsed: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        parsed
            .content
            .into_iter()
            .find_map(|block| match block {
                ResponseBlock::ToolUse { name, input } if name == EMIT_POLICY_TOOL => Some(input),
                _ => None,
            })
            .ok_or_else(|| LlmError::InvalidResponse("no emit_policy tool call in response".into()))
    }
}
