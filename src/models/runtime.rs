//! Runtime data models — tool responses, transcripts, run configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::scenario::{
    CalendarEvent, Contact, HeartbeatPayload, PendingCharge, Transaction, WeatherData,
    WearableData,
};

// ---------------------------------------------------------------------------
// Tool responses
// ---------------------------------------------------------------------------

/// Error response returned when a tool call fails. The agent sees it and may
/// retry, write to memory, or move on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }
}

/// Response from `query_wearable`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryWearableResponse {
    pub status: String,
    /// Serialized wearable module, or an empty object if absent.
    pub data: Value,
}

/// Response from `get_recent_updates`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GetRecentUpdatesResponse {
    pub status: String,
    pub heartbeats: Vec<HeartbeatPayload>,
}

/// Response from `get_contacts`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GetContactsResponse {
    pub status: String,
    pub contacts: Vec<Contact>,
}

/// A conversation thread with a contact. Reserved for the conversation
/// tracking increment; `get_conversations` returns an empty list today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub contact_id: String,
    pub contact_name: String,
    pub messages: Vec<ConversationMessage>,
}

/// A single message within a conversation thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub sender: String,
    pub text: String,
    pub timestamp: String,
}

/// Response from `get_conversations`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GetConversationsResponse {
    pub status: String,
    pub conversations: Vec<Conversation>,
}

/// Response from `read_memory`. `content` is null when the key has no file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadMemoryResponse {
    pub status: String,
    pub content: Option<String>,
}

/// Response from `write_memory`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WriteMemoryResponse {
    pub status: String,
}

/// Response from `list_memories`; keys sorted by name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListMemoriesResponse {
    pub status: String,
    pub keys: Vec<String>,
}

/// Response from `list_events`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListEventsResponse {
    pub status: String,
    pub events: Vec<CalendarEvent>,
}

/// Response from `get_forecast`. Empty object when the tier carries no weather.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GetForecastResponse {
    pub status: String,
    pub forecast: Value,
}

/// Response from `get_balance`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GetBalanceResponse {
    pub status: String,
    pub account_balance: f64,
    pub pending_charges: Vec<PendingCharge>,
}

/// Response from `get_transactions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GetTransactionsResponse {
    pub status: String,
    pub transactions: Vec<Transaction>,
}

/// Every tool handler returns one of these. Serializes untagged, so the agent
/// sees a flat object with a `status` field plus the payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolResponse {
    Error(ErrorResponse),
    QueryWearable(QueryWearableResponse),
    RecentUpdates(GetRecentUpdatesResponse),
    Contacts(GetContactsResponse),
    Conversations(GetConversationsResponse),
    ReadMemory(ReadMemoryResponse),
    WriteMemory(WriteMemoryResponse),
    ListMemories(ListMemoriesResponse),
    ListEvents(ListEventsResponse),
    Forecast(GetForecastResponse),
    Balance(GetBalanceResponse),
    Transactions(GetTransactionsResponse),
}

impl ToolResponse {
    pub fn error(message: impl Into<String>) -> Self {
        ToolResponse::Error(ErrorResponse::new(message))
    }

    pub fn status(&self) -> &str {
        match self {
            ToolResponse::Error(r) => &r.status,
            ToolResponse::QueryWearable(r) => &r.status,
            ToolResponse::RecentUpdates(r) => &r.status,
            ToolResponse::Contacts(r) => &r.status,
            ToolResponse::Conversations(r) => &r.status,
            ToolResponse::ReadMemory(r) => &r.status,
            ToolResponse::WriteMemory(r) => &r.status,
            ToolResponse::ListMemories(r) => &r.status,
            ToolResponse::ListEvents(r) => &r.status,
            ToolResponse::Forecast(r) => &r.status,
            ToolResponse::Balance(r) => &r.status,
            ToolResponse::Transactions(r) => &r.status,
        }
    }

    pub fn query_wearable(data: Option<&WearableData>) -> Self {
        let data = match data {
            Some(w) => serde_json::to_value(w).unwrap_or(Value::Null),
            None => Value::Object(serde_json::Map::new()),
        };
        ToolResponse::QueryWearable(QueryWearableResponse {
            status: "ok".into(),
            data,
        })
    }

    pub fn forecast(weather: Option<&WeatherData>) -> Self {
        let forecast = match weather {
            Some(w) => serde_json::to_value(w).unwrap_or(Value::Null),
            None => Value::Object(serde_json::Map::new()),
        };
        ToolResponse::Forecast(GetForecastResponse {
            status: "ok".into(),
            forecast,
        })
    }
}

// ---------------------------------------------------------------------------
// LLM response parsing
// ---------------------------------------------------------------------------

/// A tool call parsed out of the model response, arguments decoded from the
/// provider's JSON string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedToolCall {
    pub call_id: String,
    pub name: String,
    pub arguments: serde_json::Map<String, Value>,
}

/// Structured return from one model call: optional text plus tool calls.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AgentResponse {
    pub text: Option<String>,
    pub tool_calls: Vec<ParsedToolCall>,
}

// ---------------------------------------------------------------------------
// Transcript records
// ---------------------------------------------------------------------------

/// A single tool invocation as recorded in the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub tool: String,
    pub args: Value,
    /// Serialized tool response.
    pub result: Value,
    /// Type name of the handler that processed the call ("none" if unrouted).
    pub routed_to: String,
}

/// A single agent turn: optional text plus the tool calls it made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub agent_text: Option<String>,
    pub tool_calls: Vec<ToolCallRecord>,
}

/// A memory operation performed during a heartbeat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryOp {
    pub op: MemoryOpKind,
    pub key: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryOpKind {
    Read,
    Write,
    List,
}

/// An exchange with the user simulator. Reserved: the user-sim handler is a
/// future increment, so runs today record none of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSimInteraction {
    #[serde(rename = "type")]
    pub kind: UserSimChannel,
    pub agent_sent: String,
    pub user_response: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserSimChannel {
    Message,
    Call,
}

/// Size of the context delivered to the agent for one heartbeat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSent {
    pub system_prompt_chars: usize,
    pub user_message_chars: usize,
}

/// Complete transcript for a single heartbeat execution. Embeds the scenario
/// content hash so scoring can link results to the exact scenario version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatTranscript {
    pub heartbeat_id: u32,
    pub timestamp: String,
    pub scenario_hash: String,
    pub context_sent: ContextSent,
    pub turns: Vec<Turn>,
    pub memory_ops: Vec<MemoryOp>,
    pub user_sim_interactions: Vec<UserSimInteraction>,
}

/// An entry in the rolling action log shown back to the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    /// Heartbeat timestamp when the action ran.
    pub time: String,
    pub action_type: String,
    pub tool_name: String,
    /// Brief human-readable summary.
    pub summary: String,
}

// ---------------------------------------------------------------------------
// Run configuration and full transcript
// ---------------------------------------------------------------------------

fn default_max_tool_turns() -> usize {
    10
}

fn default_max_post_crisis_heartbeats() -> usize {
    20
}

fn default_action_log_window() -> usize {
    20
}

/// Run configuration, loaded from a JSON object. Model ids are
/// provider-prefixed (`"openai/gpt-..."`, `"anthropic/claude-..."`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub agent_model: String,
    pub user_sim_model: String,
    pub judge_model: String,
    /// Forwarded verbatim to the LLM call (temperature, max tokens, ...).
    #[serde(default)]
    pub model_params: serde_json::Map<String, Value>,
    #[serde(default = "default_max_tool_turns")]
    pub max_tool_turns: usize,
    #[serde(default = "default_max_post_crisis_heartbeats")]
    pub max_post_crisis_heartbeats: usize,
    #[serde(default = "default_action_log_window")]
    pub action_log_window: usize,
}

impl RunConfig {
    /// Minimal config for tests and quick inspection runs.
    pub fn minimal(model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            agent_model: model.clone(),
            user_sim_model: model.clone(),
            judge_model: model,
            model_params: serde_json::Map::new(),
            max_tool_turns: default_max_tool_turns(),
            max_post_crisis_heartbeats: default_max_post_crisis_heartbeats(),
            action_log_window: default_action_log_window(),
        }
    }
}

/// Complete transcript for a full benchmark run. Append-only during the run,
/// immutable once the run completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunTranscript {
    pub scenario_id: String,
    pub run_id: String,
    pub run_config: RunConfig,
    pub heartbeats: Vec<HeartbeatTranscript>,
}
