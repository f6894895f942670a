//! File-backed memory store.
//!
//! Memory keys map to `{key}.md` files inside a per-run working directory
//! seeded from the package's memory files. I/O is synchronous with an
//! explicit flush so a `write_memory` followed by `read_memory` in the same
//! heartbeat always returns the written content. Any key whose resolved path
//! would escape the working directory is rejected without touching the
//! filesystem.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use crate::models::runtime::{
    ListMemoriesResponse, ReadMemoryResponse, ToolResponse, WriteMemoryResponse,
};
use crate::models::scenario::MemoryFile;
use crate::runner::router::ToolHandler;

const MEMORY_TOOLS: [&str; 3] = ["read_memory", "write_memory", "list_memories"];

pub struct MemoryHandler {
    memory_dir: PathBuf,
}

impl MemoryHandler {
    /// Create the working directory (if needed) and seed the initial files.
    pub fn new(memory_dir: &Path, initial_files: &[MemoryFile]) -> std::io::Result<Self> {
        std::fs::create_dir_all(memory_dir)?;
        for mf in initial_files {
            std::fs::write(memory_dir.join(format!("{}.md", mf.key)), &mf.content)?;
        }
        Ok(Self {
            memory_dir: memory_dir.to_path_buf(),
        })
    }

    /// Resolve a key to a path inside the working directory, or `None` if the
    /// key tries to escape it.
    fn resolve(&self, key: &str) -> Option<PathBuf> {
        if key.is_empty()
            || key.contains('/')
            || key.contains('\\')
            || key.contains("..")
            || key.starts_with('.')
        {
            return None;
        }
        let path = self.memory_dir.join(format!("{key}.md"));
        // Belt over suspenders: the joined path must still sit in the dir.
        if !path.starts_with(&self.memory_dir) {
            return None;
        }
        Some(path)
    }

    fn read(&self, args: &serde_json::Map<String, Value>) -> ToolResponse {
        let Some(key) = args.get("key").and_then(Value::as_str) else {
            return ToolResponse::error("key parameter required");
        };
        let Some(path) = self.resolve(key) else {
            return ToolResponse::error(format!("Invalid memory key {key:?}"));
        };
        match std::fs::read_to_string(&path) {
            Ok(content) => ToolResponse::ReadMemory(ReadMemoryResponse {
                status: "ok".into(),
                content: Some(content),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                ToolResponse::ReadMemory(ReadMemoryResponse {
                    status: "ok".into(),
                    content: None,
                })
            }
            Err(e) => ToolResponse::error(format!("Memory read failed: {e}")),
        }
    }

    fn write(&self, args: &serde_json::Map<String, Value>) -> ToolResponse {
        let Some(key) = args.get("key").and_then(Value::as_str) else {
            return ToolResponse::error("key parameter required");
        };
        let Some(content) = args.get("content").and_then(Value::as_str) else {
            return ToolResponse::error("content parameter required");
        };
        let Some(path) = self.resolve(key) else {
            return ToolResponse::error(format!("Invalid memory key {key:?}"));
        };
        let result = std::fs::File::create(&path)
            .and_then(|mut f| f.write_all(content.as_bytes()).and_then(|_| f.flush()));
        match result {
            Ok(()) => ToolResponse::WriteMemory(WriteMemoryResponse {
                status: "written".into(),
            }),
            Err(e) => ToolResponse::error(format!("Memory write failed: {e}")),
        }
    }

    fn list(&self) -> ToolResponse {
        let mut keys: Vec<String> = match std::fs::read_dir(&self.memory_dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.extension().map_or(false, |ext| ext == "md"))
                .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
                .collect(),
            Err(e) => return ToolResponse::error(format!("Memory list failed: {e}")),
        };
        keys.sort();
        ToolResponse::ListMemories(ListMemoriesResponse {
            status: "ok".into(),
            keys,
        })
    }
}

#[async_trait]
impl ToolHandler for MemoryHandler {
    fn handler_name(&self) -> &'static str {
        "MemoryHandler"
    }

    fn can_handle(&self, tool_name: &str) -> bool {
        MEMORY_TOOLS.contains(&tool_name)
    }

    async fn handle(&self, tool_name: &str, args: &serde_json::Map<String, Value>) -> ToolResponse {
        match tool_name {
            "read_memory" => self.read(args),
            "write_memory" => self.write(args),
            "list_memories" => self.list(),
            other => ToolResponse::error(format!("Unhandled tool {other}")),
        }
    }
}
