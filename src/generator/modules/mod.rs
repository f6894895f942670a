//! Per-module data generators.
//!
//! Every generator consumes a fixed number of RNG draws per heartbeat
//! regardless of which branch runs; a branch that doesn't need a sample
//! still burns it. That keeps the shared stream stable when any single
//! generator's logic changes shape. One-time per-scenario initialization may
//! draw extra samples on the first heartbeat only.

pub mod calendar;
pub mod comms;
pub mod financial;
pub mod location;
pub mod weather;
pub mod wearable;

use chrono::{DateTime, Utc};

use crate::error::GeneratorError;
use crate::generator::rng::RngStream;
use crate::generator::schedule::PersonSchedule;

/// Interface every data-module generator satisfies. Generators are stateful
/// across heartbeats (cumulative counters, random walks, crisis anchors) and
/// are driven strictly in heartbeat order.
pub trait ModuleGenerator {
    type Output;

    fn generate(
        &mut self,
        schedule: &PersonSchedule,
        heartbeat_id: u32,
        timestamp: DateTime<Utc>,
        rng: &mut RngStream,
    ) -> Result<Self::Output, GeneratorError>;
}

/// Fractional hour of day, e.g. 14:30 -> 14.5.
pub(crate) fn fractional_hour(ts: DateTime<Utc>) -> f64 {
    use chrono::Timelike;
    f64::from(ts.hour()) + f64::from(ts.minute()) / 60.0
}

/// Round to one decimal place.
pub(crate) fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Round to two decimal places.
pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Round to six decimal places (GPS degrees).
pub(crate) fn round6(v: f64) -> f64 {
    (v * 1_000_000.0).round() / 1_000_000.0
}

/// Smoothly compress values near boundaries instead of hard walls. Hard
/// min/max clamping produces flat lines that read as synthetic; tanh gives an
/// S-curve that only asymptotically approaches the bounds.
pub(crate) fn soft_clamp(value: f64, low: f64, high: f64) -> f64 {
    let mid = (low + high) / 2.0;
    let half = (high - low) / 2.0;
    mid + half * ((value - mid) / half).tanh()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soft_clamp_stays_inside_bounds() {
        for v in [-100.0, -5.0, 0.0, 7.5, 50.0, 1000.0] {
            let clamped = soft_clamp(v, 0.0, 15.0);
            assert!((0.0..=15.0).contains(&clamped), "{v} -> {clamped}");
        }
    }

    #[test]
    fn soft_clamp_is_near_identity_in_the_middle() {
        let v = soft_clamp(7.5, 0.0, 15.0);
        assert!((v - 7.5).abs() < 1e-9);
    }

    #[test]
    fn rounding_helpers() {
        assert_eq!(round1(36.449), 36.4);
        assert_eq!(round2(3.14159), 3.14);
        assert_eq!(round6(40.78512345), 40.785123);
    }
}
