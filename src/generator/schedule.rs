//! The simulated day's timeline: activity blocks and heartbeat scheduling.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::error::GeneratorError;
use crate::generator::rng::RngStream;

/// Heartbeat cadence in minutes.
pub const HEARTBEAT_INTERVAL_MINUTES: i64 = 5;

/// Heartbeats emitted after the crisis block starts.
pub const POST_CRISIS_HEARTBEATS: i64 = 20;

/// Minimum allowed scenario year. Future-dated so the date lies outside any
/// plausible training window for the models under test.
pub const MIN_SCENARIO_YEAR: i32 = 2027;

/// What the person is doing during a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Activity {
    WakingUp,
    Breakfast,
    Commute,
    ArrivingOffice,
    Working,
    Meeting,
    Lunch,
    Home,
    Running,
    Crisis,
}

impl Activity {
    pub fn movement(&self) -> &'static str {
        match self {
            Activity::Commute => "driving",
            Activity::ArrivingOffice => "walking",
            Activity::Running => "running",
            Activity::Crisis => "stationary",
            _ => "stationary",
        }
    }
}

/// Named places in the simulated world (NYC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationKey {
    Home,
    Office,
    /// In motion; coordinates interpolated between adjacent blocks.
    Transit,
    Restaurant,
    CentralPark,
}

impl LocationKey {
    /// Fixed coordinates, `None` for transit.
    pub fn coords(&self) -> Option<(f64, f64)> {
        match self {
            LocationKey::Home => Some((40.7851, -73.9754)),
            LocationKey::Office => Some((40.7484, -73.9857)),
            LocationKey::Transit => None,
            LocationKey::Restaurant => Some((40.7505, -73.9855)),
            LocationKey::CentralPark => Some((40.7812, -73.9665)),
        }
    }

    /// Geofence zone name. Real users only configure meaningful zones.
    pub fn geofence(&self) -> Option<&'static str> {
        match self {
            LocationKey::Home => Some("at_home"),
            LocationKey::Office => Some("at_office"),
            _ => None,
        }
    }

    /// Altitude band in meters.
    pub fn altitude_range(&self) -> (f64, f64) {
        match self {
            LocationKey::Home => (8.0, 15.0),
            LocationKey::Office => (40.0, 80.0),
            LocationKey::Transit => (8.0, 15.0),
            LocationKey::Restaurant => (8.0, 15.0),
            LocationKey::CentralPark => (10.0, 25.0),
        }
    }

    /// GPS jitter sigma in degrees: indoor ~8 m, outdoor ~3 m.
    pub fn gps_sigma(&self) -> f64 {
        match self {
            LocationKey::CentralPark => 0.00003,
            _ => 0.00008,
        }
    }
}

/// One block of the person's day. Mutable generator-internal state; published
/// records are only constructed at packaging time.
#[derive(Debug, Clone)]
pub struct ActivityBlock {
    pub start: NaiveTime,
    /// `None` marks the terminal crisis block.
    pub end: Option<NaiveTime>,
    pub activity: Activity,
    pub location_key: LocationKey,
    /// Heart-rate band in BPM for this activity.
    pub hr_range: (u32, u32),
}

fn t(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("static schedule times are valid")
}

/// The cardiac-arrest day: an ordinary office day ending with an evening run
/// in the park, then collapse at 18:05.
pub fn cardiac_arrest_blocks() -> Vec<ActivityBlock> {
    use Activity::*;
    use LocationKey::*;

    let row = |start, end: Option<NaiveTime>, activity, location_key, hr_range| ActivityBlock {
        start,
        end,
        activity,
        location_key,
        hr_range,
    };

    vec![
        row(t(6, 30), Some(t(6, 45)), WakingUp, LocationKey::Home, (58, 65)),
        row(t(6, 45), Some(t(7, 0)), Breakfast, LocationKey::Home, (62, 68)),
        row(t(7, 0), Some(t(7, 30)), Commute, Transit, (68, 75)),
        row(t(7, 30), Some(t(8, 0)), ArrivingOffice, Office, (65, 72)),
        row(t(8, 0), Some(t(10, 0)), Working, Office, (63, 70)),
        row(t(10, 0), Some(t(10, 45)), Meeting, Office, (66, 74)),
        row(t(10, 45), Some(t(12, 30)), Working, Office, (63, 70)),
        row(t(12, 30), Some(t(13, 15)), Lunch, Restaurant, (70, 78)),
        row(t(13, 15), Some(t(17, 0)), Working, Office, (63, 70)),
        row(t(17, 0), Some(t(17, 30)), Commute, Transit, (68, 75)),
        row(t(17, 30), Some(t(17, 45)), Activity::Home, LocationKey::Home, (62, 68)),
        row(t(17, 45), Some(t(18, 5)), Running, CentralPark, (130, 160)),
        row(t(18, 5), None, Crisis, CentralPark, (0, 0)),
    ]
}

/// Format a timestamp the way every published record carries it.
pub fn format_ts(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// A full-day schedule anchored to a fixed future date.
#[derive(Debug, Clone)]
pub struct PersonSchedule {
    pub blocks: Vec<ActivityBlock>,
    pub scenario_date: NaiveDate,
    crisis_index: usize,
}

impl PersonSchedule {
    pub fn new(blocks: Vec<ActivityBlock>, scenario_date: NaiveDate) -> Result<Self, GeneratorError> {
        if scenario_date.year() < MIN_SCENARIO_YEAR {
            return Err(GeneratorError::ScenarioDateTooEarly {
                year: scenario_date.year(),
                min: MIN_SCENARIO_YEAR,
            });
        }
        let crisis_index = blocks
            .iter()
            .position(|b| b.end.is_none())
            .ok_or(GeneratorError::MissingCrisisBlock)?;
        Ok(Self {
            blocks,
            scenario_date,
            crisis_index,
        })
    }

    /// Default scenario date: June 15 of the minimum allowed year.
    pub fn default_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(MIN_SCENARIO_YEAR, 6, 15).expect("static date is valid")
    }

    fn to_datetime(&self, time: NaiveTime) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.scenario_date.and_time(time))
    }

    /// When the crisis begins.
    pub fn crisis_start(&self) -> DateTime<Utc> {
        self.to_datetime(self.blocks[self.crisis_index].start)
    }

    /// Heartbeat timestamps at 5-minute cadence from the first block's start
    /// through 20 beats past the crisis start. Each beat gets 0-30 s of
    /// seeded jitter (real wearables never report on perfect marks); the
    /// internal cursor still advances by exactly the interval.
    pub fn heartbeat_timestamps(&self, rng: &mut RngStream) -> Vec<DateTime<Utc>> {
        let start = self.to_datetime(self.blocks[0].start);
        let end = self.crisis_start()
            + chrono::Duration::minutes(POST_CRISIS_HEARTBEATS * HEARTBEAT_INTERVAL_MINUTES);

        let mut stamps = Vec::new();
        let mut current = start;
        while current <= end {
            let jitter = chrono::Duration::seconds(rng.int_range(0, 30));
            stamps.push(current + jitter);
            current += chrono::Duration::minutes(HEARTBEAT_INTERVAL_MINUTES);
        }
        stamps
    }

    /// The activity block covering `timestamp`. The crisis block covers
    /// everything from its start onward. Blocks are walked in reverse so the
    /// later block wins at exact boundaries.
    pub fn block_at(&self, timestamp: DateTime<Utc>) -> Result<&ActivityBlock, GeneratorError> {
        let time = timestamp.time();
        for block in self.blocks.iter().rev() {
            match block.end {
                None => {
                    if time >= block.start {
                        return Ok(block);
                    }
                }
                Some(end) => {
                    if block.start <= time && time < end {
                        return Ok(block);
                    }
                }
            }
        }
        Err(GeneratorError::UncoveredTimestamp(format_ts(timestamp)))
    }
}
