//! Error types for CrisisBench.

use std::path::PathBuf;

/// Errors raised while constructing contract records.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error("content_hash must be a 64-character lowercase hex SHA-256 digest, got {0:?}")]
    InvalidContentHash(String),

    #[error("{field} must be within {low}..={high}, got {value}")]
    OutOfRange {
        field: &'static str,
        low: f64,
        high: f64,
        value: f64,
    },

    #[error("run_count must be >= 1, got {0}")]
    EmptyAggregate(usize),
}

/// Errors raised by the scenario generation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("Unknown crisis_type {0:?}")]
    UnknownCrisisType(String),

    #[error("scenario_date year must be >= {min}, got {year}")]
    ScenarioDateTooEarly { year: i32, min: i32 },

    #[error("Schedule must contain a terminal crisis block (end_time = None)")]
    MissingCrisisBlock,

    #[error("No activity block covers timestamp {0:?}")]
    UncoveredTimestamp(String),

    #[error(
        "Module {module:?} is missing at heartbeat {heartbeat_id} inside the crisis window; \
         the protected zone should have prevented sensor dropouts here"
    )]
    CrisisModuleMissing { module: &'static str, heartbeat_id: u32 },

    #[error("Tool catalogue entry {name:?} contains banned stem {stem:?}")]
    BannedToolLanguage { name: String, stem: &'static str },

    #[error("Contract error: {0}")]
    Contract(#[from] ContractError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while loading a scenario package from disk.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioLoadError {
    #[error("Missing required file: {0}")]
    MissingFile(String),

    #[error("Failed to parse {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Content hash mismatch: manifest says {expected}, heartbeats.json hashes to {computed}")]
    HashMismatch { expected: String, computed: String },

    #[error("manifest.json and the manifest embedded in scenario.json disagree")]
    ManifestDisagreement,

    #[error("Contract error: {0}")]
    Contract(#[from] ContractError),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the LLM provider layer. Never retried here; the caller decides.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("LLM request to {provider} failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Authentication with {provider} failed")]
    AuthFailed { provider: String },

    #[error("Rate limited by {provider}")]
    RateLimited { provider: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Missing API key: set {env_var} for provider {provider}")]
    MissingApiKey { provider: String, env_var: String },

    #[error("Model id {0:?} has no provider prefix (expected e.g. \"openai/gpt-...\")")]
    UnknownProvider(String),
}

/// Errors raised while executing a benchmark run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Scenario load failed: {0}")]
    Load(#[from] ScenarioLoadError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error(
        "Malformed tool-call arguments for {tool} (call {call_id}): {source}. \
         Symptom of a provider or sanitization mismatch, not an agent mistake"
    )]
    MalformedToolArguments {
        tool: String,
        call_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid run config: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
