//! OpenAI-compatible Chat Completions provider.
//!
//! Model ids are provider-prefixed (`openai/gpt-...`, `anthropic/claude-...`,
//! `openrouter/...`); the prefix picks the endpoint and API-key variable, the
//! remainder is sent as the model name. Works against any endpoint speaking
//! the Chat Completions protocol.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LlmError;
use crate::llm::provider::{
    ChatMessage, CompletionRequest, ModelProvider, ProviderResponse, Role, WireTool, WireToolCall,
};

pub struct OpenAiCompatibleProvider {
    client: Client,
    provider: String,
    model: String,
    base_url: String,
    api_key: String,
}

impl OpenAiCompatibleProvider {
    /// Resolve a provider-prefixed model id into an endpoint + credentials.
    pub fn from_model_id(model_id: &str) -> Result<Self, LlmError> {
        let (provider, model) = model_id
            .split_once('/')
            .ok_or_else(|| LlmError::UnknownProvider(model_id.to_string()))?;

        let (base_url, env_var) = match provider {
            "openai" => ("https://api.openai.com/v1", "OPENAI_API_KEY"),
            "anthropic" => ("https://api.anthropic.com/v1", "ANTHROPIC_API_KEY"),
            "openrouter" => ("https://openrouter.ai/api/v1", "OPENROUTER_API_KEY"),
            _ => return Err(LlmError::UnknownProvider(model_id.to_string())),
        };

        let api_key = std::env::var(env_var).map_err(|_| LlmError::MissingApiKey {
            provider: provider.to_string(),
            env_var: env_var.to_string(),
        })?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .map_err(|e| LlmError::RequestFailed {
                provider: provider.to_string(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            provider: provider.to_string(),
            model: model.to_string(),
            base_url: base_url.to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl ModelProvider for OpenAiCompatibleProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<ProviderResponse, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut body = serde_json::Map::new();
        body.insert("model".into(), Value::String(self.model.clone()));
        body.insert(
            "messages".into(),
            serde_json::to_value(
                request
                    .messages
                    .into_iter()
                    .map(ApiMessage::from)
                    .collect::<Vec<_>>(),
            )
            .map_err(|e| LlmError::RequestFailed {
                provider: self.provider.clone(),
                reason: format!("message serialization: {e}"),
            })?,
        );
        if !request.tools.is_empty() {
            body.insert(
                "tools".into(),
                serde_json::to_value(
                    request.tools.into_iter().map(ApiTool::from).collect::<Vec<_>>(),
                )
                .map_err(|e| LlmError::RequestFailed {
                    provider: self.provider.clone(),
                    reason: format!("tool serialization: {e}"),
                })?,
            );
        }
        // Model params ride along verbatim (temperature, max_tokens, ...).
        for (key, value) in request.model_params {
            body.insert(key, value);
        }

        tracing::debug!(url = %url, model = %self.model, "sending chat completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&Value::Object(body))
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed {
                provider: self.provider.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| LlmError::RequestFailed {
            provider: self.provider.clone(),
            reason: format!("failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            if status.as_u16() == 401 {
                return Err(LlmError::AuthFailed {
                    provider: self.provider.clone(),
                });
            }
            if status.as_u16() == 429 {
                return Err(LlmError::RateLimited {
                    provider: self.provider.clone(),
                });
            }
            return Err(LlmError::RequestFailed {
                provider: self.provider.clone(),
                reason: format!("HTTP {}: {}", status, &text[..text.len().min(200)]),
            });
        }

        let parsed: ApiResponse =
            serde_json::from_str(&text).map_err(|e| LlmError::InvalidResponse {
                provider: self.provider.clone(),
                reason: format!("JSON parse error: {e}. Raw: {}", &text[..text.len().min(200)]),
            })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse {
                provider: self.provider.clone(),
                reason: "no choices in response".to_string(),
            })?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| WireToolCall {
                id: tc.id,
                name: tc.function.name,
                // Arguments stay a raw JSON string; the orchestrator parses.
                arguments: tc.function.arguments,
            })
            .collect();

        Ok(ProviderResponse {
            content: choice.message.content,
            tool_calls,
        })
    }
}

// Chat Completions API types.

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ApiToolCall>>,
}

impl From<ChatMessage> for ApiMessage {
    fn from(msg: ChatMessage) -> Self {
        let role = match msg.role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        };
        let tool_calls = msg.tool_calls.map(|calls| {
            calls
                .into_iter()
                .map(|tc| ApiToolCall {
                    id: tc.id,
                    call_type: "function".to_string(),
                    function: ApiFunctionCall {
                        name: tc.name,
                        arguments: tc.arguments,
                    },
                })
                .collect()
        });
        let content = if role == "assistant" && tool_calls.is_some() && msg.content.is_empty() {
            None
        } else {
            Some(msg.content)
        };
        Self {
            role,
            content,
            tool_call_id: msg.tool_call_id,
            name: msg.name,
            tool_calls,
        }
    }
}

#[derive(Debug, Serialize)]
struct ApiTool {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: ApiFunction,
}

#[derive(Debug, Serialize)]
struct ApiFunction {
    name: String,
    description: String,
    parameters: Value,
}

impl From<WireTool> for ApiTool {
    fn from(tool: WireTool) -> Self {
        Self {
            tool_type: "function",
            function: ApiFunction {
                name: tool.name,
                description: tool.description,
                parameters: tool.parameters,
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolCall {
    id: String,
    #[serde(rename = "type")]
    call_type: String,
    function: ApiFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ApiToolCall>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unprefixed_model_ids() {
        let err = OpenAiCompatibleProvider::from_model_id("gpt-4o");
        assert!(matches!(err, Err(LlmError::UnknownProvider(_))));
    }

    #[test]
    fn rejects_unknown_provider_prefixes() {
        let err = OpenAiCompatibleProvider::from_model_id("acme/genius-1");
        assert!(matches!(err, Err(LlmError::UnknownProvider(_))));
    }

    #[test]
    fn assistant_tool_call_message_serializes_arguments_as_string() {
        let msg = ChatMessage::assistant_with_tool_calls(
            None,
            vec![WireToolCall {
                id: "call_1".into(),
                name: "make_call".into(),
                arguments: r#"{"number":"+1-917-482-7391"}"#.into(),
            }],
        );
        let api: ApiMessage = msg.into();
        let value = serde_json::to_value(&api).unwrap();
        assert!(value["tool_calls"][0]["function"]["arguments"].is_string());
        assert!(value.get("content").is_none());
    }

    #[test]
    fn response_parsing_keeps_arguments_raw() {
        let raw = r#"{
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "type": "function",
                        "function": {"name": "read_memory", "arguments": "{\"key\": \"note\"}"}
                    }]
                }
            }]
        }"#;
        let parsed: ApiResponse = serde_json::from_str(raw).unwrap();
        let tc = &parsed.choices[0].message.tool_calls.as_ref().unwrap()[0];
        assert_eq!(tc.function.arguments, r#"{"key": "note"}"#);
    }
}
