//! Diurnal weather evolving through the day.
//!
//! Temperature follows a half-sine warm-up into an exponential evening
//! cool-down; humidity runs inverse to temperature; wind random-walks with a
//! prevailing-direction anchor; UV tracks the sun arc; pressure, AQI, and
//! cloud cover drift via mean-reverting walks; pollen is chosen once per
//! scenario. The crisis changes nothing here — weather doesn't know.

use chrono::{DateTime, Utc};

use crate::error::GeneratorError;
use crate::generator::modules::{fractional_hour, round1, round2, soft_clamp, ModuleGenerator};
use crate::generator::rng::RngStream;
use crate::generator::schedule::PersonSchedule;
use crate::models::scenario::WeatherData;

/// Wind direction labels in clockwise order.
const WIND_DIRS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

const POLLEN_LEVELS: [&str; 3] = ["Low", "Medium", "High"];

/// Diurnal temperature parameters, NYC mid-June.
const T_BASE: f64 = 16.0;
const T_PEAK: f64 = 25.0;
const T_RISE_HOUR: f64 = 5.5;
const T_PEAK_HOUR: f64 = 15.0;

#[derive(Debug, Default)]
pub struct WeatherGenerator {
    wind_speed: Option<f64>,
    wind_dir_idx: usize,
    prevailing_dir_idx: usize,
    pressure: f64,
    cloud_cover: f64,
    aqi: f64,
    pollen_level: &'static str,
}

impl WeatherGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    fn init_once(&mut self, rng: &mut RngStream) {
        if self.wind_speed.is_none() {
            self.wind_speed = Some(3.0 + rng.uniform() * 4.0);
            self.wind_dir_idx = (rng.next_u64() % 8) as usize;
            // Anchor for the day so wind stays in one quadrant.
            self.prevailing_dir_idx = self.wind_dir_idx;
            self.pressure = 29.9 + rng.uniform() * 0.2;
            self.cloud_cover = 20.0 + rng.uniform() * 30.0;
            self.aqi = 30.0 + rng.uniform() * 20.0;
            self.pollen_level = *rng.choice(&POLLEN_LEVELS);
        }
    }
}

impl ModuleGenerator for WeatherGenerator {
    type Output = WeatherData;

    fn generate(
        &mut self,
        _schedule: &PersonSchedule,
        _heartbeat_id: u32,
        timestamp: DateTime<Utc>,
        rng: &mut RngStream,
    ) -> Result<WeatherData, GeneratorError> {
        self.init_once(rng);

        // Fixed draw budget: 13 per heartbeat (each gauss is two draws).
        let g_temp = rng.gauss(0.0, 0.5);
        let g_wind_speed = rng.gauss(0.0, 0.3);
        let r_wind_dir = rng.uniform();
        let g_humidity = rng.gauss(0.0, 1.5);
        let g_uv = rng.gauss(0.0, 0.9);
        let g_aqi = rng.gauss(0.0, 1.0);
        let g_pressure = rng.gauss(0.0, 0.01);
        let g_cloud = rng.gauss(0.0, 2.0);

        let hour = fractional_hour(timestamp);

        // Temperature: flat pre-dawn, half-sine warming, exponential cooling.
        let amplitude = T_PEAK - T_BASE;
        let mut temp = if hour <= T_RISE_HOUR {
            T_BASE
        } else if hour <= T_PEAK_HOUR {
            let progress = (hour - T_RISE_HOUR) / (T_PEAK_HOUR - T_RISE_HOUR);
            T_BASE + amplitude * (progress * std::f64::consts::FRAC_PI_2).sin()
        } else {
            T_BASE + amplitude * (-0.15 * (hour - T_PEAK_HOUR)).exp()
        };
        temp = round1(temp + g_temp);

        let wind_speed_state = self.wind_speed.as_mut().expect("initialized above");
        *wind_speed_state = soft_clamp(*wind_speed_state + g_wind_speed, 0.5, 15.0);
        let wind_speed = round1(*wind_speed_state);

        let wind_chill = -0.1 * wind_speed;
        let feels_like = round1(temp + wind_chill + if temp > 22.0 { 0.3 } else { -0.2 });

        let base_humidity = 70.0 - 1.8 * (temp - T_BASE);
        let humidity = (base_humidity + g_humidity).clamp(20.0, 98.0) as u32;

        // Wind direction: sticky drift, biased back toward the prevailing
        // direction. No flips between adjacent samples.
        if r_wind_dir < 0.04 {
            self.wind_dir_idx = (self.wind_dir_idx + 1) % 8;
        } else if r_wind_dir > 0.96 {
            self.wind_dir_idx = (self.wind_dir_idx + 7) % 8;
        } else if r_wind_dir < 0.10 {
            let delta = (self.prevailing_dir_idx + 8 - self.wind_dir_idx) % 8;
            if delta != 0 {
                let step = if delta <= 4 { 1 } else { 7 };
                self.wind_dir_idx = (self.wind_dir_idx + step) % 8;
            }
        }
        let wind_dir = WIND_DIRS[self.wind_dir_idx].to_string();

        // UV: sun arc peaking near 13:00.
        let uv_index = if (6.0..=20.0).contains(&hour) {
            let raw = if hour <= 13.0 {
                let progress = (hour - 6.0) / 7.0;
                8.0 * (progress * std::f64::consts::FRAC_PI_2).sin()
            } else {
                let decay = (hour - 13.0) / 7.0;
                8.0 * (decay * std::f64::consts::FRAC_PI_2).cos()
            };
            (raw + g_uv).max(0.0) as u32
        } else {
            0
        };

        self.aqi = soft_clamp(self.aqi + g_aqi, 15.0, 80.0);
        let aqi = self.aqi as u32;

        self.pressure = soft_clamp(self.pressure + g_pressure, 29.7, 30.3);
        let pressure = round2(self.pressure);

        // Dew point from the Magnus approximation.
        let gamma = (f64::from(humidity) / 100.0).ln() + (17.67 * temp) / (243.5 + temp);
        let dew_point = round1(243.5 * gamma / (17.67 - gamma));

        self.cloud_cover = soft_clamp(self.cloud_cover + g_cloud, 0.0, 100.0);
        let cloud_cover = self.cloud_cover as u32;

        Ok(WeatherData {
            temp,
            feels_like,
            humidity,
            wind_speed,
            wind_dir,
            uv_index,
            aqi,
            pollen_level: self.pollen_level.to_string(),
            pressure,
            dew_point,
            cloud_cover,
        })
    }
}
