//! CrisisBench: measures whether a general-purpose LLM agent, embedded in a
//! realistic mixed-data stream, notices a life-threatening anomaly buried in
//! noise and acts on its own. The interesting output is the degradation
//! curve as ambient noise scales from tier T1 to T4, not the detection task
//! itself.
//!
//! Three subsystems:
//! - [`generator`] — seeded, reproducible synthesis of a full simulated day
//!   with a precisely timed crisis injection; byte-identical output for
//!   identical inputs.
//! - [`runner`] — the heartbeat orchestrator: fresh-context model calls,
//!   pluggable tool handlers, a rolling action log, file-backed memory.
//! - [`models`] — the immutable data contract binding generation, execution,
//!   and scoring, integrity-checked by a SHA-256 content hash.

pub mod canonical;
pub mod error;
pub mod generator;
pub mod llm;
pub mod models;
pub mod runner;

pub use generator::{generate_scenario, write_scenario, GenerateParams};
pub use runner::{run_benchmark, run_benchmark_with_provider, RunOptions};
