//! Scripted calendar with a sliding window of upcoming events.

use chrono::{DateTime, NaiveTime, TimeZone, Utc};

use crate::error::GeneratorError;
use crate::generator::modules::ModuleGenerator;
use crate::generator::rng::RngStream;
use crate::generator::schedule::{format_ts, PersonSchedule};
use crate::models::scenario::{CalendarData, CalendarEvent, Reminder};

/// Scripted events for the day: (HH, MM, title, location, attendees).
const EVENTS: [(u32, u32, &str, &str, &[&str]); 8] = [
    (9, 0, "Daily Standup", "Zoom", &["Priya Kapoor", "Mike Chang", "Kira Nakamura"]),
    (10, 0, "Sprint Planning", "Conf Room B", &["Priya Kapoor", "Mike Chang", "Rachel Torres"]),
    (11, 30, "1:1 with Rachel", "Rachel's Office", &["Rachel Torres"]),
    (12, 30, "Lunch with Tom", "Koreatown", &["Tom Brennan"]),
    (14, 0, "Design Review", "Zoom", &["Kira Nakamura", "Priya Kapoor"]),
    (15, 30, "Team Sync", "Conf Room A", &["Priya Kapoor", "Mike Chang"]),
    (17, 30, "Gym", "Home", &[]),
    (19, 0, "Dinner with Sarah", "Home", &["Sarah Mitchell"]),
];

/// Scripted reminders: (HH, MM, text).
const REMINDERS: [(u32, u32, &str); 3] = [
    (8, 0, "Review PR from Priya"),
    (12, 0, "Take vitamins"),
    (17, 0, "Pick up dry cleaning"),
];

const SOCIAL_KEYWORDS: [&str; 5] = ["lunch", "dinner", "gym", "coffee", "drinks"];

#[derive(Debug, Default)]
pub struct CalendarGenerator {
    events: Vec<(DateTime<Utc>, CalendarEvent)>,
    reminders: Vec<(DateTime<Utc>, Reminder)>,
    today_summary: String,
}

impl CalendarGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    fn init_once(&mut self, schedule: &PersonSchedule) {
        if !self.events.is_empty() {
            return;
        }
        let date = schedule.scenario_date;
        for (h, m, title, location, attendees) in EVENTS {
            let dt = Utc.from_utc_datetime(
                &date.and_time(NaiveTime::from_hms_opt(h, m, 0).expect("static time")),
            );
            self.events.push((
                dt,
                CalendarEvent {
                    title: title.to_string(),
                    time: format_ts(dt),
                    location: location.to_string(),
                    attendees: attendees.iter().map(|a| a.to_string()).collect(),
                },
            ));
        }
        for (h, m, text) in REMINDERS {
            let dt = Utc.from_utc_datetime(
                &date.and_time(NaiveTime::from_hms_opt(h, m, 0).expect("static time")),
            );
            self.reminders.push((
                dt,
                Reminder {
                    text: text.to_string(),
                    time: format_ts(dt),
                },
            ));
        }
        self.today_summary = build_today_summary();
    }
}

impl ModuleGenerator for CalendarGenerator {
    type Output = CalendarData;

    fn generate(
        &mut self,
        schedule: &PersonSchedule,
        _heartbeat_id: u32,
        timestamp: DateTime<Utc>,
        rng: &mut RngStream,
    ) -> Result<CalendarData, GeneratorError> {
        // Calendar content is scripted; burn one draw to keep the stream
        // layout uniform with the other generators.
        let _ = rng.uniform();

        self.init_once(schedule);

        let next_3_events = self
            .events
            .iter()
            .filter(|(dt, _)| *dt > timestamp)
            .take(3)
            .map(|(_, e)| e.clone())
            .collect();

        let reminders = self
            .reminders
            .iter()
            .filter(|(dt, _)| *dt > timestamp)
            .map(|(_, r)| r.clone())
            .collect();

        Ok(CalendarData {
            next_3_events,
            reminders,
            today_summary: self.today_summary.clone(),
        })
    }
}

fn format_casual_time(hour: u32, minute: u32) -> String {
    if hour == 12 && minute == 0 {
        return "noon".to_string();
    }
    let suffix = if hour < 12 { "am" } else { "pm" };
    let display = match hour {
        0 => 12,
        h if h <= 12 => h,
        h => h - 12,
    };
    if minute != 0 {
        format!("{display}:{minute:02}{suffix}")
    } else {
        format!("{display}{suffix}")
    }
}

fn build_today_summary() -> String {
    let mut notable = Vec::new();
    let mut highlighted = vec![false; EVENTS.len()];

    for (i, (h, m, title, _, _)) in EVENTS.iter().enumerate() {
        let lower = title.to_lowercase();
        if SOCIAL_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            highlighted[i] = true;
            notable.push(format!("{} at {}", lower, format_casual_time(*h, *m)));
        }
    }

    let meeting_count = EVENTS
        .iter()
        .enumerate()
        .filter(|&(i, (_, _, _, _, attendees))| !highlighted[i] && !attendees.is_empty())
        .count();
    let solo_count = EVENTS
        .iter()
        .enumerate()
        .filter(|&(i, (_, _, _, _, attendees))| !highlighted[i] && attendees.is_empty())
        .count();

    let mut parts = Vec::new();
    if meeting_count > 0 {
        parts.push(format!("{meeting_count} meetings"));
    }
    if solo_count > 0 {
        let plural = if solo_count > 1 { "s" } else { "" };
        parts.push(format!("{solo_count} block{plural}"));
    }
    parts.extend(notable);
    parts.join(", ")
}
