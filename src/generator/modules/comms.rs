//! Scripted communications emitted as per-heartbeat deltas.
//!
//! Each scripted item lands in exactly one heartbeat: the first whose
//! timestamp is at or past the item's scheduled time. Nothing repeats;
//! nothing accumulates. Messaging systems have no idea anyone collapsed, so
//! the stream keeps flowing through and after the crisis.

use chrono::{DateTime, NaiveTime, TimeZone, Utc};

use crate::error::GeneratorError;
use crate::generator::modules::ModuleGenerator;
use crate::generator::rng::RngStream;
use crate::generator::schedule::PersonSchedule;
use crate::models::scenario::{ChatMessage, CommsData, Email, Sms, SocialNotification};

/// Emails: (HH, MM, sender, subject). Headers only, never a body. Timing is
/// irregular with occasional clusters.
const EMAILS: [(u32, u32, &str, &str); 10] = [
    (7, 3, "Priya Kapoor", "Re: PR #482 — small nit on the retry logic"),
    (7, 11, "LinkedIn Notifications", "3 new connection requests this week"),
    (8, 47, "Amazon Shipping", "Your order has shipped — arriving Thursday"),
    (9, 14, "Mike Chang", "Re: Refactoring proposal for auth service"),
    (9, 17, "HR Newsletter", "Q2 Benefits Enrollment Reminder"),
    (11, 3, "Rachel Torres", "Fwd: Leadership offsite agenda — June 20"),
    (12, 51, "GitHub", "[dependabot] Bump axios from 1.6.2 to 1.7.0"),
    (14, 23, "Bank of America Alerts", "Your monthly statement is ready"),
    (15, 8, "Kira Nakamura", "Design mockups v2 attached"),
    (16, 37, "Priya Kapoor", "Re: Sprint retrospective action items"),
];

/// Chat messages: (HH, MM, channel, sender, text). Work hours, clustered
/// around standup and meetings.
const CHAT_MESSAGES: [(u32, u32, &str, &str, &str); 9] = [
    (9, 2, "#engineering", "Priya Kapoor", "merged the PR from yday, will deploy after standup"),
    (9, 3, "#general", "Mike Chang", "sry can't make standup today"),
    (9, 5, "#engineering", "Kira Nakamura", "aight no worries"),
    (11, 38, "#design-review", "Kira Nakamura", "updated mockups are in the drive, same folder as before"),
    (13, 22, "#random", "Mike Chang", "https://www.youtube.com/watch?v=TiQm5Fh5NjE"),
    (14, 41, "#engineering", "Priya Kapoor", "customer page on staging seems to be broken, mike can you check it out?"),
    (14, 46, "#engineering", "Mike Chang", "yep on ti"),
    (15, 53, "#general", "Rachel Torres", "reminder — happy hour friday at 5, no excuses🕺🕺🕺"),
    (16, 28, "#engineering", "Mike Chang", "btw customer page issue is fixed! was just an issue with one of our dependencies which needed a quick version bump"),
];

/// SMS: (HH, MM, sender, text).
const SMS_MESSAGES: [(u32, u32, &str, &str); 6] = [
    (8, 6, "Sarah Mitchell", "dont forget i'm making slop@7 so don't be late :)"),
    (12, 22, "Jake Mitchell", "new ps6 leak on beebom👀"),
    (14, 58, "Tom Brennan", "https://www.youtube.com/watch?v=PrSzdTjSwIA"),
    (14, 58, "Tom Brennan", "can't stop listening to this mix"),
    (16, 44, "Sarah Mitchell", "i just realised"),
    (16, 44, "Sarah Mitchell", "i NEED to find my nintendo ds again that shit was goated"),
];

/// Missed calls: (HH, MM). One spam call during sprint planning, one from Tom
/// during the design review.
const MISSED_CALLS: [(u32, u32); 2] = [(10, 51), (14, 33)];

/// Voicemails: (HH, MM). The spam caller leaves one.
const VOICEMAILS: [(u32, u32); 1] = [(10, 52)];

/// Social notifications: (HH, MM, platform, text).
const NOTIFICATIONS: [(u32, u32, &str, &str); 5] = [
    (7, 22, "Instagram", "tom_brennan and 2 others liked your photo"),
    (9, 38, "LinkedIn", "You have 3 new connection requests"),
    (12, 4, "Reddit", "Trending in r/programming: \"Rust vs Go — the debate that won't die\""),
    (14, 16, "X", "5 new posts from people you follow"),
    (16, 11, "Instagram", "sarahm_photos posted a story"),
];

#[derive(Debug, Default)]
pub struct CommsGenerator {
    emails: Vec<(DateTime<Utc>, Email)>,
    chat: Vec<(DateTime<Utc>, ChatMessage)>,
    sms: Vec<(DateTime<Utc>, Sms)>,
    calls: Vec<DateTime<Utc>>,
    voicemails: Vec<DateTime<Utc>>,
    notifications: Vec<(DateTime<Utc>, SocialNotification)>,
    prev_timestamp: Option<DateTime<Utc>>,
    initialized: bool,
}

impl CommsGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    fn init_once(&mut self, schedule: &PersonSchedule) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        let date = schedule.scenario_date;
        let stamp = |h: u32, m: u32| {
            Utc.from_utc_datetime(
                &date.and_time(NaiveTime::from_hms_opt(h, m, 0).expect("static time")),
            )
        };

        for (h, m, sender, subject) in EMAILS {
            self.emails.push((
                stamp(h, m),
                Email {
                    sender: sender.to_string(),
                    subject: subject.to_string(),
                },
            ));
        }
        for (h, m, channel, sender, message) in CHAT_MESSAGES {
            self.chat.push((
                stamp(h, m),
                ChatMessage {
                    channel: channel.to_string(),
                    sender: sender.to_string(),
                    message: message.to_string(),
                },
            ));
        }
        for (h, m, sender, message) in SMS_MESSAGES {
            self.sms.push((
                stamp(h, m),
                Sms {
                    sender: sender.to_string(),
                    message: message.to_string(),
                },
            ));
        }
        self.calls = MISSED_CALLS.iter().map(|&(h, m)| stamp(h, m)).collect();
        self.voicemails = VOICEMAILS.iter().map(|&(h, m)| stamp(h, m)).collect();
        for (h, m, platform, text) in NOTIFICATIONS {
            self.notifications.push((
                stamp(h, m),
                SocialNotification {
                    platform: platform.to_string(),
                    notification_text: text.to_string(),
                },
            ));
        }
    }
}

/// Did this item arrive in the (prev, current] window?
fn arrived(
    item_time: DateTime<Utc>,
    prev: Option<DateTime<Utc>>,
    current: DateTime<Utc>,
) -> bool {
    prev.map_or(true, |p| item_time > p) && item_time <= current
}

impl ModuleGenerator for CommsGenerator {
    type Output = CommsData;

    fn generate(
        &mut self,
        schedule: &PersonSchedule,
        _heartbeat_id: u32,
        timestamp: DateTime<Utc>,
        rng: &mut RngStream,
    ) -> Result<CommsData, GeneratorError> {
        // Scripted data; burn one draw to keep the stream layout uniform.
        let _ = rng.uniform();

        self.init_once(schedule);
        let prev = self.prev_timestamp;

        let new_emails = self
            .emails
            .iter()
            .filter(|(t, _)| arrived(*t, prev, timestamp))
            .map(|(_, e)| e.clone())
            .collect();
        let new_chat_messages = self
            .chat
            .iter()
            .filter(|(t, _)| arrived(*t, prev, timestamp))
            .map(|(_, m)| m.clone())
            .collect();
        let new_sms = self
            .sms
            .iter()
            .filter(|(t, _)| arrived(*t, prev, timestamp))
            .map(|(_, s)| s.clone())
            .collect();
        let new_missed_calls = self
            .calls
            .iter()
            .filter(|t| arrived(**t, prev, timestamp))
            .count() as u32;
        let new_voicemails = self
            .voicemails
            .iter()
            .filter(|t| arrived(**t, prev, timestamp))
            .count() as u32;
        let new_notifications = self
            .notifications
            .iter()
            .filter(|(t, _)| arrived(*t, prev, timestamp))
            .map(|(_, n)| n.clone())
            .collect();

        self.prev_timestamp = Some(timestamp);

        Ok(CommsData {
            new_emails,
            new_chat_messages,
            new_sms,
            new_missed_calls,
            new_voicemails,
            new_notifications,
        })
    }
}
