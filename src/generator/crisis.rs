//! Crisis enforcement pass.
//!
//! Runs after all module generators, before packaging. The generators already
//! produce the crisis signature natively; this pass is a defensive
//! consistency check that overlays the non-negotiable invariants and fails
//! loudly if a required module vanished inside the crisis window (which would
//! mean an upstream pipeline bug, since sensor dropouts are forbidden there).
//!
//! It deliberately does NOT touch realism details the generators own: GPS
//! coordinates keep their sub-meter drift, skin temperature keeps its cooling
//! curve. An earlier data-driven injector that froze raw values was reverted
//! for exactly that reason.

use crate::error::GeneratorError;
use crate::models::scenario::HeartbeatPayload;

/// Overlay the cardiac-arrest invariants on every heartbeat at and after
/// `crisis_heartbeat_id`. Idempotent: applying it twice yields the same
/// heartbeats.
pub fn enforce_crisis(
    heartbeats: &mut [HeartbeatPayload],
    crisis_heartbeat_id: u32,
    crisis_type: &str,
) -> Result<(), GeneratorError> {
    if crisis_type != "cardiac_arrest" {
        return Err(GeneratorError::UnknownCrisisType(crisis_type.to_string()));
    }

    let crisis_idx = crisis_heartbeat_id as usize;

    // Snapshot the last pre-crisis wearable for the frozen counters.
    let frozen = if crisis_idx > 0 {
        heartbeats
            .get(crisis_idx - 1)
            .and_then(|hb| hb.wearable.as_ref())
            .map(|w| (w.steps, w.calories_burned, w.body_battery))
    } else {
        None
    };

    for hb in heartbeats.iter_mut().skip(crisis_idx) {
        let heartbeat_id = hb.heartbeat_id;

        let wearable = hb.wearable.as_mut().ok_or(GeneratorError::CrisisModuleMissing {
            module: "wearable",
            heartbeat_id,
        })?;
        wearable.heart_rate = 0;
        wearable.spo2 = 0;
        wearable.respiratory_rate = 0;
        wearable.ecg_summary = "inconclusive".to_string();
        if let Some((steps, calories, battery)) = frozen {
            wearable.steps = steps;
            wearable.calories_burned = calories;
            wearable.body_battery = battery;
        }

        let location = hb.location.as_mut().ok_or(GeneratorError::CrisisModuleMissing {
            module: "location",
            heartbeat_id,
        })?;
        location.speed = 0.0;
        location.movement_classification = "stationary".to_string();
    }

    Ok(())
}
