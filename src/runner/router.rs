//! Tool routing: an ordered list of handlers, first match wins.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::models::runtime::ToolResponse;

/// A handler services some subset of tool names. Handlers are async for
/// uniformity even when their work is synchronous inside.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Type name recorded as `routed_to` in transcripts.
    fn handler_name(&self) -> &'static str;

    fn can_handle(&self, tool_name: &str) -> bool;

    async fn handle(&self, tool_name: &str, args: &serde_json::Map<String, Value>) -> ToolResponse;
}

/// Dispatches tool calls to the first registered handler that accepts the
/// name. Registration order is the deterministic tiebreak, though handlers
/// must not overlap on a tool name in practice.
pub struct ToolRouter {
    handlers: Vec<Arc<dyn ToolHandler>>,
}

impl ToolRouter {
    pub fn new(handlers: Vec<Arc<dyn ToolHandler>>) -> Self {
        Self { handlers }
    }

    /// Returns the response plus the name of the handler that produced it
    /// (`"none"` when no handler matched).
    pub async fn route(
        &self,
        tool_name: &str,
        args: &serde_json::Map<String, Value>,
    ) -> (ToolResponse, String) {
        for handler in &self.handlers {
            if handler.can_handle(tool_name) {
                let response = handler.handle(tool_name, args).await;
                tracing::debug!(
                    tool_name,
                    routed_to = handler.handler_name(),
                    status = response.status(),
                    "tool dispatched"
                );
                return (response, handler.handler_name().to_string());
            }
        }
        tracing::debug!(tool_name, routed_to = "none", "tool dispatched");
        (ToolResponse::error("Unknown tool"), "none".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::runtime::ReadMemoryResponse;

    struct FixedHandler {
        name: &'static str,
        accepts: &'static str,
        reply: &'static str,
    }

    #[async_trait]
    impl ToolHandler for FixedHandler {
        fn handler_name(&self) -> &'static str {
            self.name
        }

        fn can_handle(&self, tool_name: &str) -> bool {
            tool_name == self.accepts
        }

        async fn handle(
            &self,
            _tool_name: &str,
            _args: &serde_json::Map<String, Value>,
        ) -> ToolResponse {
            ToolResponse::ReadMemory(ReadMemoryResponse {
                status: "ok".into(),
                content: Some(self.reply.into()),
            })
        }
    }

    #[tokio::test]
    async fn routes_to_matching_handler() {
        let router = ToolRouter::new(vec![Arc::new(FixedHandler {
            name: "FixedHandler",
            accepts: "read_memory",
            reply: "hello",
        })]);
        let (response, routed_to) = router.route("read_memory", &serde_json::Map::new()).await;
        assert_eq!(routed_to, "FixedHandler");
        assert_eq!(response.status(), "ok");
    }

    #[tokio::test]
    async fn unknown_tool_returns_error_without_a_handler() {
        let router = ToolRouter::new(vec![]);
        let (response, routed_to) = router.route("make_call", &serde_json::Map::new()).await;
        assert_eq!(routed_to, "none");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"status": "error", "message": "Unknown tool"})
        );
    }

    #[tokio::test]
    async fn first_registered_handler_wins_on_overlap() {
        let router = ToolRouter::new(vec![
            Arc::new(FixedHandler {
                name: "First",
                accepts: "list_memories",
                reply: "first",
            }),
            Arc::new(FixedHandler {
                name: "Second",
                accepts: "list_memories",
                reply: "second",
            }),
        ]);
        let (response, routed_to) = router.route("list_memories", &serde_json::Map::new()).await;
        assert_eq!(routed_to, "First");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["content"], "first");
    }
}
