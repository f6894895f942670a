//! Scenario package loader — the inverse of the generator's packaging step.
//!
//! Everything is verified before a single model call happens: required files,
//! schema parses, the canonical re-hash of `heartbeats.json` against the
//! manifest, and agreement between `manifest.json` and the manifest copy
//! embedded in `scenario.json`.

use std::path::Path;

use crate::canonical::content_hash;
use crate::error::ScenarioLoadError;
use crate::models::scenario::{
    HeartbeatPayload, MemoryFile, ScenarioManifest, ScenarioMeta, ScenarioPackage, ToolDefinition,
};

const REQUIRED_FILES: [&str; 5] = [
    "manifest.json",
    "scenario.json",
    "heartbeats.json",
    "tools.json",
    "persona.md",
];

fn read_text(dir: &Path, name: &str) -> Result<String, ScenarioLoadError> {
    let path = dir.join(name);
    std::fs::read_to_string(&path).map_err(|source| ScenarioLoadError::Io { path, source })
}

fn parse_json<T: serde::de::DeserializeOwned>(
    file: &str,
    text: &str,
) -> Result<T, ScenarioLoadError> {
    serde_json::from_str(text).map_err(|source| ScenarioLoadError::Parse {
        file: file.to_string(),
        source,
    })
}

/// Read and verify a scenario package directory.
pub fn load_scenario(scenario_dir: &Path) -> Result<ScenarioPackage, ScenarioLoadError> {
    for file in REQUIRED_FILES {
        if !scenario_dir.join(file).exists() {
            return Err(ScenarioLoadError::MissingFile(file.to_string()));
        }
    }
    let memories_dir = scenario_dir.join("memories");
    if !memories_dir.is_dir() {
        return Err(ScenarioLoadError::MissingFile("memories/".to_string()));
    }

    let manifest: ScenarioManifest =
        parse_json("manifest.json", &read_text(scenario_dir, "manifest.json")?)?;
    let meta: ScenarioMeta = parse_json("scenario.json", &read_text(scenario_dir, "scenario.json")?)?;
    let heartbeats: Vec<HeartbeatPayload> =
        parse_json("heartbeats.json", &read_text(scenario_dir, "heartbeats.json")?)?;
    let tool_definitions: Vec<ToolDefinition> =
        parse_json("tools.json", &read_text(scenario_dir, "tools.json")?)?;
    let persona_document = read_text(scenario_dir, "persona.md")?;

    let mut memory_files = Vec::new();
    let entries = std::fs::read_dir(&memories_dir).map_err(|source| ScenarioLoadError::Io {
        path: memories_dir.clone(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| ScenarioLoadError::Io {
            path: memories_dir.clone(),
            source,
        })?;
        let path = entry.path();
        if path.extension().map_or(false, |ext| ext == "md") {
            let key = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let content = std::fs::read_to_string(&path)
                .map_err(|source| ScenarioLoadError::Io { path, source })?;
            memory_files.push(MemoryFile { key, content });
        }
    }
    memory_files.sort_by(|a, b| a.key.cmp(&b.key));
    if memory_files.is_empty() {
        return Err(ScenarioLoadError::MissingFile("memories/*.md".to_string()));
    }

    // Reproducibility gate: the heartbeats on disk must hash to exactly what
    // the manifest promised.
    let computed = content_hash(&heartbeats).map_err(|source| ScenarioLoadError::Parse {
        file: "heartbeats.json".to_string(),
        source,
    })?;
    if computed != manifest.content_hash() {
        return Err(ScenarioLoadError::HashMismatch {
            expected: manifest.content_hash().to_string(),
            computed,
        });
    }

    if meta.manifest != manifest {
        return Err(ScenarioLoadError::ManifestDisagreement);
    }

    Ok(ScenarioPackage {
        scenario_id: meta.scenario_id,
        version: meta.version,
        seed: meta.seed,
        crisis_type: meta.crisis_type,
        noise_tier: meta.noise_tier,
        crisis_heartbeat_id: meta.crisis_heartbeat_id,
        person: meta.person,
        contacts: meta.contacts,
        agent_identity: meta.agent_identity,
        heartbeats,
        tool_definitions,
        memory_files,
        persona_document,
        manifest,
    })
}
