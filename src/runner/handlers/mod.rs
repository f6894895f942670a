//! Tool handlers registered with the router.
//!
//! `send_message`, `make_call`, and the dotted external-service names have no
//! handler in this version; the router answers them with an unknown-tool
//! error until the user-simulator and external-service handlers land.

pub mod memory;
pub mod scenario_data;

pub use memory::MemoryHandler;
pub use scenario_data::ScenarioDataHandler;
