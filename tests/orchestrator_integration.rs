//! Orchestrator behaviour against scripted mock providers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::TimeZone;

use crisisbench::error::LlmError;
use crisisbench::llm::{CompletionRequest, ModelProvider, ProviderResponse, WireToolCall};
use crisisbench::models::runtime::{MemoryOpKind, RunConfig, RunTranscript};
use crisisbench::models::scenario::NoiseTier;
use crisisbench::{generate_scenario, write_scenario, GenerateParams, RunOptions};

fn write_package(parent: &std::path::Path, tier: NoiseTier) -> std::path::PathBuf {
    let mut params = GenerateParams::new("cardiac_arrest", tier, 42);
    params.generated_at = Some(chrono::Utc.with_ymd_and_hms(2027, 6, 14, 12, 0, 0).unwrap());
    let pkg = generate_scenario(params).unwrap();
    write_scenario(&pkg, parent).unwrap()
}

fn config() -> RunConfig {
    RunConfig::minimal("mock/scripted")
}

/// Scripted mock: a fixed sequence of responses per heartbeat, repeating for
/// every heartbeat. Records each request's message count.
struct ScriptedProvider {
    script: Vec<ProviderResponse>,
    cursor: AtomicUsize,
    message_counts: Mutex<Vec<usize>>,
    user_messages: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn new(script: Vec<ProviderResponse>) -> Self {
        Self {
            script,
            cursor: AtomicUsize::new(0),
            message_counts: Mutex::new(Vec::new()),
            user_messages: Mutex::new(Vec::new()),
        }
    }

    fn text(content: &str) -> ProviderResponse {
        ProviderResponse {
            content: Some(content.to_string()),
            tool_calls: vec![],
        }
    }

    fn tool(id: &str, name: &str, arguments: &str) -> WireToolCall {
        WireToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<ProviderResponse, LlmError> {
        self.message_counts
            .lock()
            .unwrap()
            .push(request.messages.len());
        if request.messages.len() == 2 {
            // Fresh heartbeat: restart the script, remember the user message.
            self.cursor.store(0, Ordering::SeqCst);
            self.user_messages
                .lock()
                .unwrap()
                .push(request.messages[1].content.clone());
        }
        let idx = self.cursor.fetch_add(1, Ordering::SeqCst);
        let response = self
            .script
            .get(idx)
            .cloned()
            .unwrap_or_else(|| Self::text("done"));
        Ok(response)
    }
}

async fn run_with(
    script: Vec<ProviderResponse>,
    tier: NoiseTier,
    config: RunConfig,
    max_heartbeats: Option<usize>,
) -> (RunTranscript, Arc<ScriptedProvider>) {
    let parent = tempfile::tempdir().unwrap();
    let dir = write_package(parent.path(), tier);
    let provider = Arc::new(ScriptedProvider::new(script));
    let transcript = crisisbench::run_benchmark_with_provider(
        &dir,
        config,
        Arc::clone(&provider) as Arc<dyn ModelProvider>,
        RunOptions { max_heartbeats },
    )
    .await
    .unwrap();
    (transcript, provider)
}

#[tokio::test]
async fn every_heartbeat_starts_with_exactly_system_and_user() {
    let (_transcript, provider) = run_with(
        vec![ScriptedProvider::text("nothing to do")],
        NoiseTier::T1,
        config(),
        Some(5),
    )
    .await;
    let counts = provider.message_counts.lock().unwrap();
    assert_eq!(counts.len(), 5);
    assert!(counts.iter().all(|&c| c == 2), "got {counts:?}");
}

#[tokio::test]
async fn tool_budget_caps_model_calls_per_heartbeat() {
    // The model always asks for one more tool call. With max_tool_turns = 2
    // the orchestrator makes exactly 3 model calls (turns 0, 1, 2), executes
    // turn 2's tool call, and never calls a fourth time.
    let always_tool = ProviderResponse {
        content: None,
        tool_calls: vec![ScriptedProvider::tool("call_x", "query_wearable", "{}")],
    };
    let mut cfg = config();
    cfg.max_tool_turns = 2;
    let (transcript, provider) = run_with(
        vec![always_tool.clone(), always_tool.clone(), always_tool.clone(), always_tool],
        NoiseTier::T1,
        cfg,
        Some(1),
    )
    .await;

    let counts = provider.message_counts.lock().unwrap();
    assert_eq!(counts.len(), 3, "expected exactly 3 model calls, got {counts:?}");

    let hb = &transcript.heartbeats[0];
    assert_eq!(hb.turns.len(), 3);
    assert!(hb.turns.iter().all(|t| t.tool_calls.len() == 1));
}

#[tokio::test]
async fn conversation_grows_within_a_heartbeat_only() {
    let script = vec![
        ProviderResponse {
            content: None,
            tool_calls: vec![ScriptedProvider::tool("call_1", "query_wearable", "{}")],
        },
        ScriptedProvider::text("all good"),
    ];
    let (_transcript, provider) = run_with(script, NoiseTier::T1, config(), Some(2)).await;
    let counts = provider.message_counts.lock().unwrap();
    // Heartbeat: [system,user] then [system,user,assistant,tool] — twice.
    assert_eq!(*counts, vec![2, 4, 2, 4]);
}

#[tokio::test]
async fn memory_write_then_read_round_trips_in_one_heartbeat() {
    let script = vec![
        ProviderResponse {
            content: None,
            tool_calls: vec![
                ScriptedProvider::tool(
                    "call_1",
                    "write_memory",
                    r#"{"key": "note", "content": "hr=0 spotted"}"#,
                ),
                ScriptedProvider::tool("call_2", "read_memory", r#"{"key": "note"}"#),
            ],
        },
        ScriptedProvider::text("noted"),
    ];
    let (transcript, _provider) = run_with(script, NoiseTier::T1, config(), Some(1)).await;

    let hb = &transcript.heartbeats[0];
    let calls = &hb.turns[0].tool_calls;
    assert_eq!(calls[0].routed_to, "MemoryHandler");
    assert_eq!(
        calls[1].result,
        serde_json::json!({"status": "ok", "content": "hr=0 spotted"})
    );

    assert_eq!(hb.memory_ops.len(), 2);
    assert_eq!(hb.memory_ops[0].op, MemoryOpKind::Write);
    assert_eq!(hb.memory_ops[0].key.as_deref(), Some("note"));
    assert_eq!(hb.memory_ops[0].content.as_deref(), Some("hr=0 spotted"));
    assert_eq!(hb.memory_ops[1].op, MemoryOpKind::Read);
}

#[tokio::test]
async fn unrouted_tools_return_unknown_tool_and_land_in_the_action_log() {
    // No user-sim handler exists yet, so make_call is expected to miss.
    let script = vec![
        ProviderResponse {
            content: None,
            tool_calls: vec![ScriptedProvider::tool(
                "call_1",
                "make_call",
                r#"{"number": "911"}"#,
            )],
        },
        ScriptedProvider::text("tried calling"),
    ];
    let (transcript, provider) = run_with(script, NoiseTier::T1, config(), Some(2)).await;

    let hb = &transcript.heartbeats[0];
    let call = &hb.turns[0].tool_calls[0];
    assert_eq!(call.routed_to, "none");
    assert_eq!(
        call.result,
        serde_json::json!({"status": "error", "message": "Unknown tool"})
    );

    // The next heartbeat's action log shows what happened.
    let messages = provider.user_messages.lock().unwrap();
    assert!(messages[1].contains("Called 911"), "{}", messages[1]);
}

#[tokio::test]
async fn noise_tools_are_unknown_in_this_version() {
    let script = vec![
        ProviderResponse {
            content: None,
            tool_calls: vec![ScriptedProvider::tool(
                "call_1",
                // Arrives sanitized, as a provider would deliver it.
                "spotify__search_tracks",
                r#"{"query": "focus playlist"}"#,
            )],
        },
        ScriptedProvider::text("oh well"),
    ];
    let (transcript, _provider) = run_with(script, NoiseTier::T3, config(), Some(1)).await;
    let call = &transcript.heartbeats[0].turns[0].tool_calls[0];
    // The dotted name is restored before routing and recording.
    assert_eq!(call.tool, "spotify.search_tracks");
    assert_eq!(call.routed_to, "none");
}

#[tokio::test]
async fn post_crisis_window_bounds_the_run() {
    let mut cfg = config();
    cfg.max_post_crisis_heartbeats = 2;
    let (transcript, _provider) = run_with(
        vec![ScriptedProvider::text("quiet")],
        NoiseTier::T1,
        cfg,
        None,
    )
    .await;
    // Crisis at 139; beats 140 and 141 run post-crisis, then the run stops.
    assert_eq!(transcript.heartbeats.last().unwrap().heartbeat_id, 141);
    assert_eq!(transcript.heartbeats.len(), 142);
}

#[tokio::test]
async fn transcripts_embed_the_scenario_hash() {
    let (transcript, _provider) = run_with(
        vec![ScriptedProvider::text("ok")],
        NoiseTier::T1,
        config(),
        Some(3),
    )
    .await;
    for hb in &transcript.heartbeats {
        assert_eq!(hb.scenario_hash.len(), 64);
    }
    let unique: std::collections::HashSet<&str> = transcript
        .heartbeats
        .iter()
        .map(|hb| hb.scenario_hash.as_str())
        .collect();
    assert_eq!(unique.len(), 1);
}

#[tokio::test]
async fn malformed_tool_arguments_fail_loudly() {
    let script = vec![ProviderResponse {
        content: None,
        tool_calls: vec![ScriptedProvider::tool("call_1", "read_memory", "{not json")],
    }];
    let parent = tempfile::tempdir().unwrap();
    let dir = write_package(parent.path(), NoiseTier::T1);
    let provider = Arc::new(ScriptedProvider::new(script));
    let result = crisisbench::run_benchmark_with_provider(
        &dir,
        config(),
        provider as Arc<dyn ModelProvider>,
        RunOptions { max_heartbeats: Some(1) },
    )
    .await;
    assert!(matches!(
        result,
        Err(crisisbench::error::RunError::MalformedToolArguments { .. })
    ));
}

#[tokio::test]
async fn scenario_queries_route_to_the_scenario_handler() {
    let script = vec![
        ProviderResponse {
            content: None,
            tool_calls: vec![ScriptedProvider::tool("call_1", "get_contacts", "{}")],
        },
        ScriptedProvider::text("got them"),
    ];
    let (transcript, _provider) = run_with(script, NoiseTier::T1, config(), Some(1)).await;
    let call = &transcript.heartbeats[0].turns[0].tool_calls[0];
    assert_eq!(call.routed_to, "ScenarioDataHandler");
    assert_eq!(call.result["contacts"].as_array().unwrap().len(), 20);
}
