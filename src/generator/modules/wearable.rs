//! Wearable biometrics with realistic texture and crisis degradation.

use chrono::{DateTime, Utc};

use crate::error::GeneratorError;
use crate::generator::modules::{round1, ModuleGenerator};
use crate::generator::rng::RngStream;
use crate::generator::schedule::{Activity, PersonSchedule};
use crate::models::scenario::WearableData;

/// Steps added per 5-minute heartbeat, by activity.
fn step_range(activity: Activity) -> (i64, i64) {
    match activity {
        Activity::WakingUp => (0, 15),
        Activity::Breakfast => (0, 10),
        Activity::Commute => (40, 120),
        Activity::ArrivingOffice => (20, 60),
        Activity::Working => (0, 20),
        Activity::Meeting => (0, 5),
        Activity::Lunch => (10, 40),
        Activity::Running => (150, 280),
        Activity::Home => (0, 15),
        Activity::Crisis => (0, 0),
    }
}

/// Calories added per 5-minute heartbeat, by activity.
fn calorie_range(activity: Activity) -> (i64, i64) {
    match activity {
        Activity::Commute => (3, 8),
        Activity::ArrivingOffice => (2, 5),
        Activity::Running => (15, 30),
        Activity::Crisis => (0, 0),
        _ => (1, 3),
    }
}

/// Effective ambient temperature for post-collapse skin cooling (clothed,
/// mild evening).
const COOLING_AMBIENT_C: f64 = 28.0;

/// Per-heartbeat retention factor for Newton's law of cooling. Tuned so the
/// first crisis drops are ~0.4 C and still visible after one-decimal
/// rounding twenty beats later.
const COOLING_FACTOR: f64 = 0.955;

const ECG_NORMAL: &str = "normal sinus rhythm";
const ECG_ARTIFACTS: [&str; 2] = [
    "signal quality low, possible motion artifact",
    "brief irregular interval, likely motion",
];

/// Stateful wearable generator: cumulative steps/calories, drifting glucose,
/// depleting body battery, and a crisis mode where the sensor simply stops
/// getting readings.
#[derive(Debug, Default)]
pub struct WearableGenerator {
    steps: u32,
    calories: u32,
    last_heart_rate: Option<u32>,
    prev_activity: Option<Activity>,
    glucose: Option<f64>,
    battery: Option<i64>,
    battery_floor: i64,
    skin_temp: Option<f64>,
    frozen: Option<WearableData>,
}

impl WearableGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    fn init_once(&mut self, rng: &mut RngStream) {
        if self.battery.is_none() {
            self.battery = Some(rng.int_range(85, 95));
            // Soft floor the battery wobbles against instead of flatlining.
            self.battery_floor = rng.int_range(5, 15);
            self.glucose = Some(rng.uniform_range(85.0, 105.0));
        }
    }
}

impl ModuleGenerator for WearableGenerator {
    type Output = WearableData;

    fn generate(
        &mut self,
        schedule: &PersonSchedule,
        _heartbeat_id: u32,
        timestamp: DateTime<Utc>,
        rng: &mut RngStream,
    ) -> Result<WearableData, GeneratorError> {
        self.init_once(rng);

        // Fixed draw budget: 15 per heartbeat (gauss counts as two).
        let r_hr = rng.uniform();
        let r_warm = rng.uniform();
        let r_spo2 = rng.uniform();
        let r_spo2_artifact = rng.uniform();
        let r_steps = rng.uniform();
        let r_calories = rng.uniform();
        let r_skin = rng.uniform();
        let g_glucose = rng.gauss(0.0, 1.1);
        let r_dip = rng.uniform();
        let r_precision = rng.uniform();
        let r_resp = rng.uniform();
        let r_drain = rng.uniform();
        let r_wobble = rng.uniform();
        let r_ecg = rng.uniform();

        let block = schedule.block_at(timestamp)?;

        if block.activity == Activity::Crisis {
            // The person collapsed; the wearable can't get active readings.
            // Skin temperature keeps cooling toward ambient, everything the
            // device would have to re-measure flatlines or freezes.
            if self.frozen.is_none() {
                self.frozen = Some(WearableData {
                    heart_rate: 0,
                    spo2: 0,
                    steps: self.steps,
                    skin_temp: self.skin_temp.unwrap_or(36.5),
                    ecg_summary: "inconclusive".to_string(),
                    blood_glucose: round1(self.glucose.unwrap_or(95.0)),
                    calories_burned: self.calories,
                    sleep_stage: "none".to_string(),
                    respiratory_rate: 0,
                    body_battery: self.battery.unwrap_or(30).max(0) as u32,
                });
            }

            let cooled = COOLING_AMBIENT_C
                + (self.skin_temp.unwrap_or(36.5) - COOLING_AMBIENT_C) * COOLING_FACTOR;
            self.skin_temp = Some(cooled);

            let mut data = self.frozen.clone().expect("set above");
            data.skin_temp = round1(cooled);
            return Ok(data);
        }

        // Heart rate from the block's band, warmed up on the first running
        // beat so the jump from sedentary to full running pace isn't instant.
        let (hr_lo, hr_hi) = block.hr_range;
        let span = (hr_hi - hr_lo + 1) as f64;
        let mut heart_rate = hr_lo + (r_hr * span) as u32;
        let entering_run = block.activity == Activity::Running
            && self.prev_activity != Some(Activity::Running);
        self.prev_activity = Some(block.activity);
        if entering_run {
            let resting = f64::from(self.last_heart_rate.unwrap_or(70));
            let blend = 0.45 + r_warm * 0.15;
            heart_rate = (resting + (f64::from(heart_rate) - resting) * blend) as u32;
        }
        self.last_heart_rate = Some(heart_rate);

        // SpO2 base 95-99 with rare sensor artifacts: ~3% pegged reads of
        // 100, ~3% brief dips to 93-94.
        let mut spo2 = 95 + (r_spo2 * 5.0) as u32;
        if r_spo2_artifact < 0.03 {
            spo2 = 100;
        } else if r_spo2_artifact < 0.06 {
            spo2 = 93 + (r_spo2 * 2.0) as u32;
        }

        let (step_lo, step_hi) = step_range(block.activity);
        self.steps += (step_lo as f64 + r_steps * (step_hi - step_lo + 1) as f64) as u32;

        let (cal_lo, cal_hi) = calorie_range(block.activity);
        self.calories += (cal_lo as f64 + r_calories * (cal_hi - cal_lo + 1) as f64) as u32;

        let skin_temp = round1(36.0 + r_skin * 1.5);
        self.skin_temp = Some(skin_temp);

        // Glucose drifts; running dips it 0.8-2.0 mg/dL per beat (3-8 over
        // the block) as muscles consume it. Reported precision varies the way
        // real CGM exports do.
        let glucose = self.glucose.as_mut().expect("initialized above");
        *glucose += g_glucose;
        if block.activity == Activity::Running {
            *glucose -= 0.8 + r_dip * 1.2;
        }
        *glucose = glucose.clamp(72.0, 135.0);
        let blood_glucose = if r_precision < 0.15 {
            glucose.round()
        } else {
            round1(*glucose)
        };

        let respiratory_rate = 14 + (r_resp * 7.0) as u32;

        let battery = self.battery.as_mut().expect("initialized above");
        let drain = match block.activity {
            Activity::Running => 3.0 + r_drain * 4.0,
            Activity::Commute | Activity::ArrivingOffice => 1.0 + r_drain * 3.0,
            _ => r_drain * 3.0,
        };
        *battery -= drain as i64;
        if *battery <= self.battery_floor {
            *battery = self.battery_floor + (r_wobble * 3.0) as i64;
        }
        let body_battery = (*battery).max(0) as u32;

        let ecg_summary = if r_ecg < 0.03 {
            (*rng_free_choice(&ECG_ARTIFACTS, r_ecg)).to_string()
        } else {
            ECG_NORMAL.to_string()
        };

        Ok(WearableData {
            heart_rate,
            spo2,
            steps: self.steps,
            skin_temp,
            ecg_summary,
            blood_glucose,
            calories_burned: self.calories,
            sleep_stage: "awake".to_string(),
            respiratory_rate,
            body_battery,
        })
    }
}

/// Pick from a slice using an already-consumed uniform draw, so the choice
/// doesn't cost an extra sample.
fn rng_free_choice<'a, T>(items: &'a [T], draw: f64) -> &'a T {
    let idx = ((draw / 0.03) * items.len() as f64) as usize;
    &items[idx.min(items.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::schedule::{cardiac_arrest_blocks, PersonSchedule};
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
    fn draw_count_is_fixed_across_activities() {
        let sched = schedule();
        // Same seed, different timestamps: state after one generate call must
        // only depend on the draw count, which is constant.
        let mut rng_a = RngStream::new(5);
        let mut rng_b = RngStream::new(5);
        let mut gen_a = WearableGenerator::new();
        let mut gen_b = WearableGenerator::new();
        gen_a
            .generate(&sched, 0, at(&sched, 8, 30), &mut rng_a)
            .unwrap();
        gen_b
            .generate(&sched, 0, at(&sched, 18, 30), &mut rng_b)
            .unwrap();
        assert_eq!(rng_a.state(), rng_b.state());
    }

    #[test]
    fn crisis_zeroes_active_vitals_and_freezes_counters() {
        let sched = schedule();
        let mut rng = RngStream::new(42);
        let mut gen = WearableGenerator::new();

        // Walk a few normal beats, then into the crisis.
        gen.generate(&sched, 0, at(&sched, 17, 50), &mut rng).unwrap();
        let pre = gen.generate(&sched, 1, at(&sched, 18, 0), &mut rng).unwrap();
        let c1 = gen.generate(&sched, 2, at(&sched, 18, 5), &mut rng).unwrap();
        let c2 = gen.generate(&sched, 3, at(&sched, 18, 10), &mut rng).unwrap();

        assert_eq!(c1.heart_rate, 0);
        assert_eq!(c1.spo2, 0);
        assert_eq!(c1.respiratory_rate, 0);
        assert_eq!(c1.ecg_summary, "inconclusive");
        assert_eq!(c1.steps, pre.steps);
        assert_eq!(c2.steps, c1.steps);
        assert_eq!(c2.body_battery, c1.body_battery);
    }

    #[test]
    fn crisis_skin_temp_follows_exponential_cooling() {
        let sched = schedule();
        let mut rng = RngStream::new(42);
        let mut gen = WearableGenerator::new();

        gen.generate(&sched, 0, at(&sched, 18, 0), &mut rng).unwrap();
        let mut temps = Vec::new();
        for i in 0..12u32 {
            let minutes = 18 * 60 + 5 + i * 5;
            let data = gen
                .generate(&sched, i + 1, at(&sched, minutes / 60, minutes % 60), &mut rng)
                .unwrap();
            temps.push(data.skin_temp);
        }
        // Monotone decline toward ambient, early drops larger than late ones.
        assert!(temps.windows(2).all(|w| w[1] <= w[0]));
        let first_drop = temps[0] - temps[1];
        let late_drop = temps[10] - temps[11];
        assert!(first_drop > late_drop);
        assert!(*temps.last().unwrap() > COOLING_AMBIENT_C);
    }

    #[test]
    fn first_running_beat_warms_up_instead_of_jumping() {
        let sched = schedule();
        let mut rng = RngStream::new(11);
        let mut gen = WearableGenerator::new();

        gen.generate(&sched, 0, at(&sched, 17, 35), &mut rng).unwrap();
        let warm = gen.generate(&sched, 1, at(&sched, 17, 46), &mut rng).unwrap();
        assert!(
            warm.heart_rate < 130,
            "first running beat should be below the full band, got {}",
            warm.heart_rate
        );
        let full = gen.generate(&sched, 2, at(&sched, 17, 51), &mut rng).unwrap();
        assert!((130..=160).contains(&full.heart_rate));
    }

    #[test]
    fn spo2_stays_in_plausible_envelope() {
        let sched = schedule();
        let mut rng = RngStream::new(3);
        let mut gen = WearableGenerator::new();
        for i in 0..120 {
            let data = gen
                .generate(&sched, i, at(&sched, 9, 0), &mut rng)
                .unwrap();
            assert!((93..=100).contains(&data.spo2), "spo2 {}", data.spo2);
        }
    }
}
