//! Rolling action log.
//!
//! The agent has no conversation history across heartbeats, so this bounded
//! window of its own recent tool calls is how it remembers what it already
//! did today. Entries are appended in execution order and never mutated.

use std::collections::VecDeque;

use serde_json::Value;

use crate::models::runtime::ActionLogEntry;

const MEMORY_TOOLS: [&str; 3] = ["read_memory", "write_memory", "list_memories"];

const QUERY_TOOLS: [&str; 8] = [
    "query_wearable",
    "get_recent_updates",
    "get_contacts",
    "get_conversations",
    "list_events",
    "get_forecast",
    "get_balance",
    "get_transactions",
];

/// Fixed classifier from tool name to action category. The `communication`
/// category lands together with the user-simulator handler; until then
/// outbound tools classify as plain `tool_call`.
pub fn classify_action(tool_name: &str) -> &'static str {
    if MEMORY_TOOLS.contains(&tool_name) {
        "memory"
    } else if QUERY_TOOLS.contains(&tool_name) {
        "query"
    } else {
        "tool_call"
    }
}

/// Pull a displayable argument value, tolerating whatever the model sent.
/// Cosmetic rendering must never crash on malformed arguments.
fn arg(args: &serde_json::Map<String, Value>, key: &str) -> String {
    match args.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "?".to_string(),
    }
}

/// Brief human-readable summary of one tool call.
pub fn summarize_tool_call(tool_name: &str, args: &serde_json::Map<String, Value>) -> String {
    match tool_name {
        "make_call" => format!("Called {}", arg(args, "number")),
        "send_message" => format!("Messaged {}", arg(args, "contact_id")),
        "get_contacts" => "Fetched contact list".to_string(),
        "get_conversations" => "Fetched recent conversations".to_string(),
        "query_wearable" => "Queried wearable readings".to_string(),
        "get_recent_updates" => format!("Fetched last {} updates", arg(args, "count")),
        "read_memory" => format!("Read memory '{}'", arg(args, "key")),
        "write_memory" => format!("Updated memory '{}'", arg(args, "key")),
        "list_memories" => "Listed memory keys".to_string(),
        "list_events" => format!("Listed events for {}", arg(args, "date")),
        "get_forecast" => format!("Checked forecast for {}", arg(args, "location")),
        "get_balance" => "Checked account balance".to_string(),
        "get_transactions" => "Fetched recent transactions".to_string(),
        other => format!("Called {other}"),
    }
}

/// Bounded rolling window with a running total.
#[derive(Debug)]
pub struct ActionLog {
    entries: VecDeque<ActionLogEntry>,
    window: usize,
    total: usize,
}

impl ActionLog {
    pub fn new(window: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(window),
            window,
            total: 0,
        }
    }

    pub fn record(
        &mut self,
        time: impl Into<String>,
        action_type: &str,
        tool_name: impl Into<String>,
        summary: impl Into<String>,
    ) {
        self.total += 1;
        if self.entries.len() == self.window {
            self.entries.pop_front();
        }
        self.entries.push_back(ActionLogEntry {
            time: time.into(),
            action_type: action_type.to_string(),
            tool_name: tool_name.into(),
            summary: summary.into(),
        });
    }

    /// The last `window` entries plus the running total.
    pub fn window(&self) -> (Vec<ActionLogEntry>, usize) {
        (self.entries.iter().cloned().collect(), self.total)
    }
}
