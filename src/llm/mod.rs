//! LLM abstraction: a provider-agnostic completion contract plus an
//! OpenAI-compatible HTTP implementation.

mod openai_compatible;
mod provider;

pub use openai_compatible::OpenAiCompatibleProvider;
pub use provider::{
    restore_tool_name, sanitize_tool_name, to_wire_tools, ChatMessage, CompletionRequest,
    ModelProvider, ProviderResponse, Role, WireTool, WireToolCall,
};
