//! Provider-agnostic LLM completion contract.
//!
//! The runtime only assumes: a completion call taking (messages, tools,
//! params) and returning a first choice with optional text and optional tool
//! calls whose arguments arrive as JSON strings. Argument strings are kept
//! raw here — the orchestrator owns the parse and its failure policy.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LlmError;
use crate::models::scenario::ToolDefinition;

/// Role in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A tool call on the wire: sanitized name, arguments as a JSON string (the
/// provider-agnostic assistant-message format).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

/// A message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Tool call id when this is a tool result message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Tool name for tool results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Tool calls on the assistant message that precedes their results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<WireToolCall>>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            tool_call_id: None,
            name: None,
            tool_calls: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_call_id: None,
            name: None,
            tool_calls: None,
        }
    }

    /// Assistant message carrying tool calls. Per the OpenAI protocol this
    /// must precede the corresponding tool result messages.
    pub fn assistant_with_tool_calls(content: Option<String>, tool_calls: Vec<WireToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.unwrap_or_default(),
            tool_call_id: None,
            name: None,
            tool_calls: if tool_calls.is_empty() {
                None
            } else {
                Some(tool_calls)
            },
        }
    }

    pub fn tool_result(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_call_id: Some(tool_call_id.into()),
            name: Some(name.into()),
            tool_calls: None,
        }
    }
}

/// A tool as presented to the model: sanitized name plus JSON-schema params.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireTool {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// One completion request. `model_params` is forwarded verbatim into the
/// provider request body.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<WireTool>,
    pub model_params: serde_json::Map<String, Value>,
}

/// The first choice of a completion response.
#[derive(Debug, Clone, Default)]
pub struct ProviderResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<WireToolCall>,
}

/// Trait for LLM providers. No retry policy lives behind this trait: errors
/// propagate and the caller decides.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    fn model_name(&self) -> &str;

    async fn complete(&self, request: CompletionRequest) -> Result<ProviderResponse, LlmError>;
}

/// Some providers reject tool names containing dots; MCP-style noise tools
/// are dotted. Dots map to a reserved two-character sequence on the way out
/// and back on receipt.
pub fn sanitize_tool_name(name: &str) -> String {
    name.replace('.', "__")
}

/// Reverse of [`sanitize_tool_name`].
pub fn restore_tool_name(sanitized: &str) -> String {
    sanitized.replace("__", ".")
}

/// Convert scenario tool definitions to the wire format: sanitized names and
/// a JSON-schema object per tool.
pub fn to_wire_tools(definitions: &[ToolDefinition]) -> Vec<WireTool> {
    definitions
        .iter()
        .map(|td| {
            let properties: serde_json::Map<String, Value> = td
                .parameters
                .iter()
                .map(|p| {
                    (
                        p.name.clone(),
                        serde_json::json!({
                            "type": p.param_type,
                            "description": p.description,
                        }),
                    )
                })
                .collect();
            let required: Vec<Value> = td
                .parameters
                .iter()
                .filter(|p| p.required)
                .map(|p| Value::String(p.name.clone()))
                .collect();
            WireTool {
                name: sanitize_tool_name(&td.name),
                description: td.description.clone(),
                parameters: serde_json::json!({
                    "type": "object",
                    "properties": properties,
                    "required": required,
                }),
            }
        })
        .collect()
}
