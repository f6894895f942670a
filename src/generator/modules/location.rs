//! GPS and spatial data driven by the day's schedule.
//!
//! Stationary blocks hover around known coordinates with indoor/outdoor
//! jitter; commutes interpolate between the surrounding blocks with lateral
//! wobble and occasional station stops; the evening run random-walks near the
//! park center. During the crisis the receiver keeps reporting: sub-meter
//! drift around the collapse point, zero speed, heading locked at the last
//! fix. A perfect freeze or monotonically degrading accuracy would be a
//! synthetic tell.

use chrono::{DateTime, Timelike, Utc};

use crate::error::GeneratorError;
use crate::generator::modules::{round1, round2, round6, ModuleGenerator};
use crate::generator::rng::RngStream;
use crate::generator::schedule::{Activity, ActivityBlock, LocationKey, PersonSchedule};
use crate::models::scenario::LocationData;

/// Running random-walk step, ~150-200 m per 5-minute heartbeat in degrees.
const RUNNING_STEP: f64 = 0.0015;

/// How close (degrees, ~550 m) the previous fix must be to the park center to
/// continue the random walk instead of resetting to it.
const PARK_PROXIMITY: f64 = 0.005;

/// Sub-meter crisis drift sigma (~3 m outdoor).
const CRISIS_DRIFT_SIGMA: f64 = 0.00003;

#[derive(Debug, Default)]
pub struct LocationGenerator {
    prev_lat: Option<f64>,
    prev_lon: Option<f64>,
    prev_heading: u16,
    crisis_base: Option<(f64, f64)>,
}

impl LocationGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    fn heading(&mut self, lat: f64, lon: f64, r_heading: f64) -> u16 {
        if let (Some(prev_lat), Some(prev_lon)) = (self.prev_lat, self.prev_lon) {
            let dlat = lat - prev_lat;
            let dlon = lon - prev_lon;
            if dlat.abs() > 1e-8 || dlon.abs() > 1e-8 {
                let angle = dlon.atan2(dlat).to_degrees();
                let mut h = ((angle as i64 % 360) + 360) % 360;
                h = (h + (r_heading * 10.0) as i64).rem_euclid(360);
                self.prev_heading = h as u16;
                return self.prev_heading;
            }
        }
        // No movement yet: drift from the previous heading.
        let h = (i64::from(self.prev_heading) + (r_heading * 30.0) as i64).rem_euclid(360);
        self.prev_heading = h as u16;
        self.prev_heading
    }

    fn stationary(
        &mut self,
        block: &ActivityBlock,
        draws: Draws,
    ) -> LocationData {
        let (base_lat, base_lon) = block
            .location_key
            .coords()
            .expect("stationary blocks have fixed coordinates");

        let sigma = block.location_key.gps_sigma();
        let lat = base_lat + draws.lat * sigma;
        let lon = base_lon + draws.lon * sigma;

        let (alt_lo, alt_hi) = block.location_key.altitude_range();
        let altitude = alt_lo + draws.alt * (alt_hi - alt_lo);

        let movement = block.activity.movement();
        let speed = if movement == "walking" {
            1.0 + draws.speed * 0.8
        } else {
            draws.speed * 0.3
        };

        let heading = self.heading(lat, lon, draws.heading);
        let accuracy = 3.0 + draws.acc * 7.0;

        self.prev_lat = Some(lat);
        self.prev_lon = Some(lon);

        LocationData {
            lat: round6(lat),
            lon: round6(lon),
            altitude: round1(altitude),
            speed: round2(speed),
            heading,
            accuracy: round1(accuracy),
            geofence_status: block.location_key.geofence().map(str::to_string),
            movement_classification: movement.to_string(),
        }
    }

    fn transit(
        &mut self,
        schedule: &PersonSchedule,
        block: &ActivityBlock,
        timestamp: DateTime<Utc>,
        draws: Draws,
    ) -> LocationData {
        let (origin, dest) = commute_route(schedule, block);

        let start_min = i64::from(block.start.hour()) * 60 + i64::from(block.start.minute());
        let end = block.end.expect("transit blocks are bounded");
        let end_min = i64::from(end.hour()) * 60 + i64::from(end.minute());
        let cur_min = i64::from(timestamp.hour()) * 60 + i64::from(timestamp.minute());
        let duration = end_min - start_min;
        let progress = if duration > 0 {
            ((cur_min - start_min) as f64 / duration as f64).clamp(0.0, 1.0)
        } else {
            0.5
        };

        let lat = origin.0 + (dest.0 - origin.0) * progress + draws.lat * 0.0002;
        let lon = origin.1 + (dest.1 - origin.1) * progress + draws.lon * 0.0002;

        // ~25% of subway beats are stopped at a station, otherwise moving.
        let speed = if draws.speed < 0.25 {
            draws.speed * 4.0
        } else {
            3.0 + (draws.speed - 0.25) / 0.75 * 9.0
        };
        let heading = self.heading(lat, lon, draws.heading);

        let (alt_lo, alt_hi) = LocationKey::Transit.altitude_range();
        let altitude = alt_lo + draws.alt * (alt_hi - alt_lo);
        let accuracy = 5.0 + draws.acc * 10.0;

        self.prev_lat = Some(lat);
        self.prev_lon = Some(lon);

        LocationData {
            lat: round6(lat),
            lon: round6(lon),
            altitude: round1(altitude),
            speed: round2(speed),
            heading,
            accuracy: round1(accuracy),
            geofence_status: None,
            movement_classification: "driving".to_string(),
        }
    }

    fn running(&mut self, draws: Draws) -> LocationData {
        let (park_lat, park_lon) = LocationKey::CentralPark
            .coords()
            .expect("park has fixed coordinates");

        // Continue the walk if the previous fix is near the park, otherwise
        // reset to the park center (handles the jump from the home block).
        let (base_lat, base_lon) = match (self.prev_lat, self.prev_lon) {
            (Some(lat), Some(lon))
                if (lat - park_lat).abs() < PARK_PROXIMITY
                    && (lon - park_lon).abs() < PARK_PROXIMITY =>
            {
                (lat, lon)
            }
            _ => (park_lat, park_lon),
        };

        let lat = base_lat + draws.lat * RUNNING_STEP;
        let lon = base_lon + draws.lon * RUNNING_STEP;
        let speed = 2.5 + draws.speed * 1.0;
        let heading = self.heading(lat, lon, draws.heading);

        let (alt_lo, alt_hi) = LocationKey::CentralPark.altitude_range();
        let altitude = alt_lo + draws.alt * (alt_hi - alt_lo);
        let accuracy = 3.0 + draws.acc * 5.0;

        self.prev_lat = Some(lat);
        self.prev_lon = Some(lon);

        LocationData {
            lat: round6(lat),
            lon: round6(lon),
            altitude: round1(altitude),
            speed: round2(speed),
            heading,
            accuracy: round1(accuracy),
            geofence_status: None,
            movement_classification: "running".to_string(),
        }
    }

    fn crisis(&mut self, draws: Draws) -> LocationData {
        // First crisis beat: anchor the base position where the run ended.
        let (base_lat, base_lon) = *self.crisis_base.get_or_insert((
            self.prev_lat.unwrap_or(40.7812),
            self.prev_lon.unwrap_or(-73.9665),
        ));

        let lat = base_lat + draws.lat * CRISIS_DRIFT_SIGMA;
        let lon = base_lon + draws.lon * CRISIS_DRIFT_SIGMA;

        // Park-level altitude with ±3 m of real GPS altitude noise.
        let altitude = 15.0 + draws.alt * 6.0 - 3.0;

        // Accuracy stays outdoor-normal. Heading stays at the last fix:
        // meaningless at zero speed, and that's what devices report.
        let accuracy = 3.0 + draws.acc * 5.0;

        LocationData {
            lat: round6(lat),
            lon: round6(lon),
            altitude: round1(altitude),
            speed: 0.0,
            heading: self.prev_heading,
            accuracy: round1(accuracy),
            geofence_status: None,
            movement_classification: "stationary".to_string(),
        }
    }
}

/// One heartbeat's worth of pre-consumed draws.
#[derive(Clone, Copy)]
struct Draws {
    lat: f64,
    lon: f64,
    speed: f64,
    heading: f64,
    alt: f64,
    acc: f64,
}

/// Resolve a commute block's origin and destination from its neighbours.
fn commute_route(schedule: &PersonSchedule, block: &ActivityBlock) -> ((f64, f64), (f64, f64)) {
    let idx = schedule
        .blocks
        .iter()
        .position(|b| b.start == block.start)
        .expect("block comes from this schedule");
    let origin_key = if idx > 0 {
        schedule.blocks[idx - 1].location_key
    } else {
        LocationKey::Home
    };
    let dest_key = if idx + 1 < schedule.blocks.len() {
        schedule.blocks[idx + 1].location_key
    } else {
        LocationKey::Home
    };
    let origin = origin_key.coords().expect("commute origin has coordinates");
    let dest = dest_key.coords().expect("commute destination has coordinates");
    (origin, dest)
}

impl ModuleGenerator for LocationGenerator {
    type Output = LocationData;

    fn generate(
        &mut self,
        schedule: &PersonSchedule,
        _heartbeat_id: u32,
        timestamp: DateTime<Utc>,
        rng: &mut RngStream,
    ) -> Result<LocationData, GeneratorError> {
        // Exactly 6 draws per heartbeat regardless of path.
        let draws = Draws {
            lat: rng.uniform_range(-1.0, 1.0),
            lon: rng.uniform_range(-1.0, 1.0),
            speed: rng.uniform(),
            heading: rng.uniform_range(-1.0, 1.0),
            alt: rng.uniform(),
            acc: rng.uniform(),
        };

        let block = schedule.block_at(timestamp)?;

        Ok(match block.activity {
            Activity::Crisis => self.crisis(draws),
            Activity::Running => self.running(draws),
            _ if block.location_key == LocationKey::Transit => {
                self.transit(schedule, block, timestamp, draws)
            }
            _ => self.stationary(block, draws),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::schedule::cardiac_arrest_blocks;
    use chrono::TimeZone;

    fn schedule() -> PersonSchedule {
        PersonSchedule::new(cardiac_arrest_blocks(), PersonSchedule::default_date()).unwrap()
    }

    fn at(sched: &PersonSchedule, h: u32, m: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(
            &sched
                .scenario_date
                .and_time(chrono::NaiveTime::from_hms_opt(h, m, 0).unwrap()),
        )
    }

    #[test]
    fn stationary_jitters_around_block_coordinates() {
        let sched = schedule();
        let mut rng = RngStream::new(42);
        let mut gen = LocationGenerator::new();
        let data = gen.generate(&sched, 0, at(&sched, 9, 0), &mut rng).unwrap();
        let (office_lat, office_lon) = LocationKey::Office.coords().unwrap();
        assert!((data.lat - office_lat).abs() < 0.001);
        assert!((data.lon - office_lon).abs() < 0.001);
        assert_eq!(data.geofence_status.as_deref(), Some("at_office"));
        assert_eq!(data.movement_classification, "stationary");
    }

    #[test]
    fn commute_interpolates_between_home_and_office() {
        let sched = schedule();
        let mut rng = RngStream::new(42);
        let mut gen = LocationGenerator::new();
        let data = gen.generate(&sched, 0, at(&sched, 7, 15), &mut rng).unwrap();
        let (home_lat, _) = LocationKey::Home.coords().unwrap();
        let (office_lat, _) = LocationKey::Office.coords().unwrap();
        let lo = office_lat.min(home_lat) - 0.001;
        let hi = office_lat.max(home_lat) + 0.001;
        assert!((lo..=hi).contains(&data.lat));
        assert!(data.geofence_status.is_none());
    }

    #[test]
    fn crisis_drifts_sub_meter_with_zero_speed() {
        let sched = schedule();
        let mut rng = RngStream::new(42);
        let mut gen = LocationGenerator::new();

        gen.generate(&sched, 0, at(&sched, 18, 0), &mut rng).unwrap();
        let c1 = gen.generate(&sched, 1, at(&sched, 18, 5), &mut rng).unwrap();
        let c2 = gen.generate(&sched, 2, at(&sched, 18, 10), &mut rng).unwrap();
        let c3 = gen.generate(&sched, 3, at(&sched, 18, 15), &mut rng).unwrap();

        assert_eq!(c1.speed, 0.0);
        assert_eq!(c2.speed, 0.0);
        // Not a perfect freeze: fixes drift within a few meters of each other.
        assert!(c1.lat != c2.lat || c1.lon != c2.lon || c2.lat != c3.lat);
        assert!((c1.lat - c2.lat).abs() < 0.0001);
        // Heading locked at the last pre-crisis value.
        assert_eq!(c1.heading, c2.heading);
        assert_eq!(c2.heading, c3.heading);
        // Accuracy stays outdoor-normal, never degrades monotonically.
        for c in [&c1, &c2, &c3] {
            assert!((3.0..=8.0).contains(&c.accuracy));
        }
    }

    #[test]
    fn running_walk_stays_near_the_park() {
        let sched = schedule();
        let mut rng = RngStream::new(42);
        let mut gen = LocationGenerator::new();
        let (park_lat, park_lon) = LocationKey::CentralPark.coords().unwrap();
        for i in 0..4u32 {
            let minutes = 17 * 60 + 46 + i * 5;
            let data = gen
                .generate(&sched, i, at(&sched, minutes / 60, minutes % 60), &mut rng)
                .unwrap();
            assert!((data.lat - park_lat).abs() < 0.01);
            assert!((data.lon - park_lon).abs() < 0.01);
            assert_eq!(data.movement_classification, "running");
            assert!((2.5..=3.5).contains(&data.speed));
        }
    }

    #[test]
    fn draw_count_is_fixed_across_paths() {
        let sched = schedule();
        let mut rng_a = RngStream::new(8);
        let mut rng_b = RngStream::new(8);
        let mut gen_a = LocationGenerator::new();
        let mut gen_b = LocationGenerator::new();
        gen_a.generate(&sched, 0, at(&sched, 7, 15), &mut rng_a).unwrap();
        gen_b.generate(&sched, 0, at(&sched, 18, 30), &mut rng_b).unwrap();
        assert_eq!(rng_a.state(), rng_b.state());
    }
}
