//! The heartbeat orchestrator.
//!
//! Strictly sequential: one heartbeat runs to completion before the next
//! begins, and within a heartbeat tool turns run one after another. Every
//! heartbeat's model conversation starts `[system, user]` — no message from
//! any earlier heartbeat may leak in; the file-backed memory store is the
//! agent's only continuity. The rolling action log and the memory directory
//! are the only mutable state across heartbeats.

use std::sync::Arc;

use serde_json::Value;

use crate::error::RunError;
use crate::llm::{
    restore_tool_name, sanitize_tool_name, to_wire_tools, ChatMessage, CompletionRequest,
    ModelProvider, ProviderResponse, WireTool, WireToolCall,
};
use crate::models::runtime::{
    AgentResponse, ContextSent, HeartbeatTranscript, MemoryOp, MemoryOpKind, ParsedToolCall,
    RunConfig, ToolCallRecord, Turn, UserSimInteraction,
};
use crate::models::scenario::ScenarioPackage;
use crate::runner::action_log::{classify_action, summarize_tool_call, ActionLog};
use crate::runner::handlers::ScenarioDataHandler;
use crate::runner::prompt::PromptBuilder;
use crate::runner::router::ToolRouter;

pub struct Orchestrator {
    scenario: Arc<ScenarioPackage>,
    config: RunConfig,
    provider: Arc<dyn ModelProvider>,
    prompt_builder: PromptBuilder,
    router: ToolRouter,
    scenario_handler: Arc<ScenarioDataHandler>,
    action_log: ActionLog,
    wire_tools: Vec<WireTool>,
}

impl Orchestrator {
    /// Wire up the router (registration order is the routing order) and
    /// precompute the immutable system prompt and wire tool list.
    pub fn new(
        scenario: Arc<ScenarioPackage>,
        config: RunConfig,
        provider: Arc<dyn ModelProvider>,
        memory_dir: &std::path::Path,
    ) -> Result<Self, RunError> {
        let prompt_builder = PromptBuilder::new(&scenario);
        let wire_tools = to_wire_tools(&scenario.tool_definitions);

        let scenario_handler = Arc::new(ScenarioDataHandler::new(Arc::clone(&scenario)));
        let memory_handler = Arc::new(
            crate::runner::handlers::MemoryHandler::new(memory_dir, &scenario.memory_files)?,
        );
        let router = ToolRouter::new(vec![
            Arc::clone(&scenario_handler) as Arc<dyn crate::runner::router::ToolHandler>,
            memory_handler,
        ]);

        let action_log = ActionLog::new(config.action_log_window);

        Ok(Self {
            scenario,
            config,
            provider,
            prompt_builder,
            router,
            scenario_handler,
            action_log,
            wire_tools,
        })
    }

    /// Drive the full run. Stops when the heartbeat list is exhausted, when
    /// more than `max_post_crisis_heartbeats` post-crisis beats have run, or
    /// at the caller's `max_heartbeats` inspection bound.
    pub async fn run(
        &mut self,
        max_heartbeats: Option<usize>,
    ) -> Result<Vec<HeartbeatTranscript>, RunError> {
        let mut transcripts = Vec::new();
        let mut post_crisis_count = 0usize;
        let scenario = Arc::clone(&self.scenario);

        for (index, heartbeat) in scenario.heartbeats.iter().enumerate() {
            if heartbeat.heartbeat_id > self.scenario.crisis_heartbeat_id {
                post_crisis_count += 1;
                if post_crisis_count > self.config.max_post_crisis_heartbeats {
                    break;
                }
            }
            if let Some(limit) = max_heartbeats {
                if transcripts.len() >= limit {
                    break;
                }
            }

            tracing::info!(
                heartbeat_id = heartbeat.heartbeat_id,
                timestamp = %heartbeat.timestamp,
                "heartbeat"
            );
            if heartbeat.heartbeat_id == self.scenario.crisis_heartbeat_id {
                tracing::info!(heartbeat_id = heartbeat.heartbeat_id, "crisis heartbeat reached");
            }

            let transcript = self.run_heartbeat(index).await?;
            transcripts.push(transcript);
        }

        tracing::info!(
            total_heartbeats = transcripts.len(),
            post_crisis_heartbeats = post_crisis_count.min(self.config.max_post_crisis_heartbeats),
            "run complete"
        );
        Ok(transcripts)
    }

    /// Execute one heartbeat: fresh two-message context, then up to
    /// `max_tool_turns` additional rounds of tool execution. When the budget
    /// is reached the final turn's tool calls still execute, but no further
    /// model call is made — the agent only learns of the cap next heartbeat
    /// through its action log.
    async fn run_heartbeat(&mut self, index: usize) -> Result<HeartbeatTranscript, RunError> {
        let heartbeat = self.scenario.heartbeats[index].clone();
        self.scenario_handler.set_current_index(index);

        let (entries, total) = self.action_log.window();
        let user_message = self.prompt_builder.build_user_message(
            &heartbeat,
            &entries,
            total,
            self.config.action_log_window,
            &[],
        );

        let context_sent = ContextSent {
            system_prompt_chars: self.prompt_builder.system_prompt().len(),
            user_message_chars: user_message.len(),
        };

        let mut messages = vec![
            ChatMessage::system(self.prompt_builder.system_prompt()),
            ChatMessage::user(&user_message),
        ];

        let mut turns: Vec<Turn> = Vec::new();
        let mut memory_ops: Vec<MemoryOp> = Vec::new();
        let user_sim_interactions: Vec<UserSimInteraction> = Vec::new();

        for turn_index in 0..=self.config.max_tool_turns {
            let request = CompletionRequest {
                messages: messages.clone(),
                tools: self.wire_tools.clone(),
                model_params: self.config.model_params.clone(),
            };
            let response = self.provider.complete(request).await?;
            let agent = self.parse_response(response)?;

            if agent.tool_calls.is_empty() {
                turns.push(Turn {
                    agent_text: agent.text,
                    tool_calls: vec![],
                });
                break;
            }

            // Echo the assistant message back with re-sanitized names: the
            // model saw sanitized names and expects them on later turns.
            messages.push(ChatMessage::assistant_with_tool_calls(
                agent.text.clone(),
                agent
                    .tool_calls
                    .iter()
                    .map(|call| WireToolCall {
                        id: call.call_id.clone(),
                        name: sanitize_tool_name(&call.name),
                        arguments: Value::Object(call.arguments.clone()).to_string(),
                    })
                    .collect(),
            ));

            let mut records = Vec::new();
            for call in &agent.tool_calls {
                let (response, routed_to) = self.router.route(&call.name, &call.arguments).await;

                self.action_log.record(
                    heartbeat.timestamp.clone(),
                    classify_action(&call.name),
                    call.name.clone(),
                    summarize_tool_call(&call.name, &call.arguments),
                );
                if let Some(op) = memory_op_for(call) {
                    memory_ops.push(op);
                }

                let result = serde_json::to_value(&response)?;
                messages.push(ChatMessage::tool_result(
                    &call.call_id,
                    sanitize_tool_name(&call.name),
                    result.to_string(),
                ));
                records.push(ToolCallRecord {
                    tool: call.name.clone(),
                    args: Value::Object(call.arguments.clone()),
                    result,
                    routed_to,
                });
            }

            turns.push(Turn {
                agent_text: agent.text,
                tool_calls: records,
            });

            if turn_index == self.config.max_tool_turns {
                break;
            }
        }

        Ok(HeartbeatTranscript {
            heartbeat_id: heartbeat.heartbeat_id,
            timestamp: heartbeat.timestamp.clone(),
            scenario_hash: self.scenario.manifest.content_hash().to_string(),
            context_sent,
            turns,
            memory_ops,
            user_sim_interactions,
        })
    }

    /// Restore dotted names and decode each call's JSON arguments string.
    /// A parse failure is loud and fatal: it means the provider (or the
    /// sanitization round-trip) is broken, and swallowing it would hide that.
    fn parse_response(&self, response: ProviderResponse) -> Result<AgentResponse, RunError> {
        let mut tool_calls = Vec::new();
        for call in response.tool_calls {
            let name = restore_tool_name(&call.name);
            let arguments: serde_json::Map<String, Value> = serde_json::from_str(&call.arguments)
                .map_err(|source| {
                tracing::error!(
                    tool_call_id = %call.id,
                    tool_name = %name,
                    raw_arguments = %call.arguments,
                    "malformed tool-call arguments"
                );
                RunError::MalformedToolArguments {
                    tool: name.clone(),
                    call_id: call.id.clone(),
                    source,
                }
            })?;
            tool_calls.push(ParsedToolCall {
                call_id: call.id,
                name,
                arguments,
            });
        }
        Ok(AgentResponse {
            text: response.content.filter(|t| !t.is_empty()),
            tool_calls,
        })
    }
}

/// Memory ops are recorded observationally from the call itself; the handler
/// result doesn't change what the agent asked for.
fn memory_op_for(call: &ParsedToolCall) -> Option<MemoryOp> {
    let op = match call.name.as_str() {
        "read_memory" => MemoryOpKind::Read,
        "write_memory" => MemoryOpKind::Write,
        "list_memories" => MemoryOpKind::List,
        _ => return None,
    };
    let key = call
        .arguments
        .get("key")
        .and_then(Value::as_str)
        .map(str::to_string);
    let content = match op {
        MemoryOpKind::Write => call
            .arguments
            .get("content")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    };
    Some(MemoryOp { op, key, content })
}
