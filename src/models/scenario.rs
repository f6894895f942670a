//! Scenario package data models — the contract shared by generation and execution.
//!
//! Records are immutable once constructed: no setters, no interior mutability.
//! Serialized form uses lower-snake-case keys throughout. Absent modules on a
//! heartbeat serialize as explicit `null`s; the prompt builder strips them
//! before the agent sees the payload.

use serde::{Deserialize, Serialize};

use crate::error::ContractError;

// ---------------------------------------------------------------------------
// Module payloads
// ---------------------------------------------------------------------------

/// Wearable device biometric readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WearableData {
    /// Current heart rate in BPM.
    pub heart_rate: u32,
    /// Blood oxygen saturation percentage.
    pub spo2: u32,
    /// Step count since midnight.
    pub steps: u32,
    /// Skin temperature in Celsius.
    pub skin_temp: f64,
    /// ECG reading summary text.
    pub ecg_summary: String,
    /// Blood glucose level in mg/dL.
    pub blood_glucose: f64,
    /// Calories burned since midnight.
    pub calories_burned: u32,
    /// Current or last sleep stage.
    pub sleep_stage: String,
    /// Breaths per minute.
    pub respiratory_rate: u32,
    /// Body battery energy level 0-100.
    pub body_battery: u32,
}

/// GPS and spatial positioning data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationData {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
    /// Altitude in meters.
    pub altitude: f64,
    /// Speed in m/s.
    pub speed: f64,
    /// Compass heading in degrees 0-360.
    pub heading: u16,
    /// GPS accuracy in meters.
    pub accuracy: f64,
    /// Geofence zone name; set only for configured zones (home, office).
    pub geofence_status: Option<String>,
    /// Movement type: stationary / walking / running / driving.
    pub movement_classification: String,
}

/// Local weather conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    /// Temperature in Celsius.
    pub temp: f64,
    /// Feels-like temperature in Celsius.
    pub feels_like: f64,
    /// Relative humidity percentage.
    pub humidity: u32,
    /// Wind speed in mph.
    pub wind_speed: f64,
    /// Wind direction abbreviation (N, NE, ...).
    pub wind_dir: String,
    /// UV index 0-11+.
    pub uv_index: u32,
    /// Air quality index.
    pub aqi: u32,
    /// Pollen level (Low / Medium / High), stable for the day.
    pub pollen_level: String,
    /// Barometric pressure in inHg.
    pub pressure: f64,
    /// Dew point in Celsius.
    pub dew_point: f64,
    /// Cloud cover percentage.
    pub cloud_cover: u32,
}

/// A single calendar event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub title: String,
    /// Event start as ISO 8601 datetime.
    pub time: String,
    pub location: String,
    pub attendees: Vec<String>,
}

/// A scheduled reminder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub text: String,
    /// Reminder time as ISO 8601 datetime.
    pub time: String,
}

/// Calendar module: sliding window of upcoming events plus reminders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarData {
    /// Next 3 events whose start is still in the future.
    pub next_3_events: Vec<CalendarEvent>,
    /// Reminders that have not fired yet.
    pub reminders: Vec<Reminder>,
    /// Natural-language summary of the day, generated once.
    pub today_summary: String,
}

/// An email header (sender + subject only — never a body).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
    pub sender: String,
    pub subject: String,
}

/// A workplace chat message with full text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub channel: String,
    pub sender: String,
    pub message: String,
}

/// An SMS with full text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sms {
    pub sender: String,
    pub message: String,
}

/// A platform notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialNotification {
    pub platform: String,
    pub notification_text: String,
}

/// Communications module: per-heartbeat deltas, never cumulative. Each item
/// appears in exactly one heartbeat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommsData {
    pub new_emails: Vec<Email>,
    pub new_chat_messages: Vec<ChatMessage>,
    pub new_sms: Vec<Sms>,
    pub new_missed_calls: u32,
    pub new_voicemails: u32,
    pub new_notifications: Vec<SocialNotification>,
}

/// A settled financial transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub counterparty: String,
    /// Signed amount in USD (negative = outgoing).
    pub amount: f64,
    pub category: String,
}

/// A charge that has not settled yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingCharge {
    pub merchant: String,
    pub amount: f64,
}

/// A stock price quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockQuote {
    pub symbol: String,
    pub price: f64,
}

/// A cryptocurrency price quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoQuote {
    pub symbol: String,
    pub price: f64,
}

/// Financial module: transactions, balances, markets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialData {
    pub last_3_transactions: Vec<Transaction>,
    pub account_balance: f64,
    pub pending_charges: Vec<PendingCharge>,
    pub stock_watchlist: Vec<StockQuote>,
    pub crypto_watchlist: Vec<CryptoQuote>,
    pub spending_vs_budget: String,
}

// ---------------------------------------------------------------------------
// Heartbeat and scenario records
// ---------------------------------------------------------------------------

/// One heartbeat's payload. Modules a tier excludes (or a sensor dropout
/// blanked) are `None` and serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatPayload {
    pub heartbeat_id: u32,
    /// Heartbeat time as ISO 8601 datetime.
    pub timestamp: String,
    pub wearable: Option<WearableData>,
    pub location: Option<LocationData>,
    pub weather: Option<WeatherData>,
    pub calendar: Option<CalendarData>,
    pub communications: Option<CommsData>,
    pub financial: Option<FinancialData>,
}

/// A contact in the simulated user's address book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub display_name: String,
    pub relationship: String,
    pub phone: String,
}

/// Simulated user's demographic profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonProfile {
    pub name: String,
    pub age: u32,
    pub occupation: String,
    pub home_address: String,
    pub office_address: String,
    pub birthday: String,
}

/// The AI assistant's identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentIdentity {
    pub name: String,
    pub personality: String,
}

/// A single parameter in a tool definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    /// Parameter type (string, integer, number, boolean).
    #[serde(rename = "type")]
    pub param_type: String,
    pub description: String,
    pub required: bool,
}

/// A tool available to the agent during execution. Flat snake_case names for
/// core tools, dotted `server.action` names for external noise tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ToolParameter>,
}

/// A pre-seeded memory file; `key` is the file stem, content is Markdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryFile {
    pub key: String,
    pub content: String,
}

/// Discrete noise level controlling module and tool visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NoiseTier {
    T1,
    T2,
    T3,
    T4,
}

impl NoiseTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoiseTier::T1 => "T1",
            NoiseTier::T2 => "T2",
            NoiseTier::T3 => "T3",
            NoiseTier::T4 => "T4",
        }
    }
}

impl std::fmt::Display for NoiseTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NoiseTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "T1" | "t1" => Ok(NoiseTier::T1),
            "T2" | "t2" => Ok(NoiseTier::T2),
            "T3" | "t3" => Ok(NoiseTier::T3),
            "T4" | "t4" => Ok(NoiseTier::T4),
            other => Err(format!("unknown noise tier {other:?} (expected T1..T4)")),
        }
    }
}

/// Scenario package manifest with the reproducibility content hash.
///
/// Fields are private so an invalid hash can never be constructed; the
/// deserializer routes through the same validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawManifest")]
pub struct ScenarioManifest {
    content_hash: String,
    generator_version: String,
    generated_at: String,
}

#[derive(Deserialize)]
struct RawManifest {
    content_hash: String,
    generator_version: String,
    generated_at: String,
}

impl TryFrom<RawManifest> for ScenarioManifest {
    type Error = ContractError;

    fn try_from(raw: RawManifest) -> Result<Self, Self::Error> {
        ScenarioManifest::new(raw.content_hash, raw.generator_version, raw.generated_at)
    }
}

impl ScenarioManifest {
    pub fn new(
        content_hash: String,
        generator_version: String,
        generated_at: String,
    ) -> Result<Self, ContractError> {
        let valid = content_hash.len() == 64
            && content_hash
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
        if !valid {
            return Err(ContractError::InvalidContentHash(content_hash));
        }
        Ok(Self {
            content_hash,
            generator_version,
            generated_at,
        })
    }

    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    pub fn generator_version(&self) -> &str {
        &self.generator_version
    }

    pub fn generated_at(&self) -> &str {
        &self.generated_at
    }
}

/// Complete scenario package — the published benchmark artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioPackage {
    pub scenario_id: String,
    /// Scenario format version.
    pub version: String,
    pub seed: u64,
    pub crisis_type: String,
    pub noise_tier: NoiseTier,
    /// Index into `heartbeats` of the first crisis heartbeat.
    pub crisis_heartbeat_id: u32,
    pub person: PersonProfile,
    pub contacts: Vec<Contact>,
    pub agent_identity: AgentIdentity,
    pub heartbeats: Vec<HeartbeatPayload>,
    pub tool_definitions: Vec<ToolDefinition>,
    pub memory_files: Vec<MemoryFile>,
    /// User-simulator persona document (simulator config, never agent-visible).
    pub persona_document: String,
    pub manifest: ScenarioManifest,
}

/// The `scenario.json` view of a package: everything except the bulk files
/// (`heartbeats`, `tool_definitions`, `memory_files`, `persona_document`),
/// which live beside it in the package directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMeta {
    pub scenario_id: String,
    pub version: String,
    pub seed: u64,
    pub crisis_type: String,
    pub noise_tier: NoiseTier,
    pub crisis_heartbeat_id: u32,
    pub person: PersonProfile,
    pub contacts: Vec<Contact>,
    pub agent_identity: AgentIdentity,
    pub manifest: ScenarioManifest,
}

impl From<&ScenarioPackage> for ScenarioMeta {
    fn from(pkg: &ScenarioPackage) -> Self {
        Self {
            scenario_id: pkg.scenario_id.clone(),
            version: pkg.version.clone(),
            seed: pkg.seed,
            crisis_type: pkg.crisis_type.clone(),
            noise_tier: pkg.noise_tier,
            crisis_heartbeat_id: pkg.crisis_heartbeat_id,
            person: pkg.person.clone(),
            contacts: pkg.contacts.clone(),
            agent_identity: pkg.agent_identity.clone(),
            manifest: pkg.manifest.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_hash() -> String {
        "a".repeat(64)
    }

    #[test]
    fn manifest_accepts_valid_hash() {
        let m = ScenarioManifest::new(valid_hash(), "0.1.0".into(), "2027-06-15T00:00:00Z".into());
        assert!(m.is_ok());
    }

    #[test]
    fn manifest_rejects_short_hash() {
        let err = ScenarioManifest::new("abc123".into(), "0.1.0".into(), "t".into());
        assert!(err.is_err());
    }

    #[test]
    fn manifest_rejects_uppercase_hex() {
        let err = ScenarioManifest::new("A".repeat(64), "0.1.0".into(), "t".into());
        assert!(err.is_err());
    }

    #[test]
    fn manifest_rejects_non_hex() {
        let err = ScenarioManifest::new("g".repeat(64), "0.1.0".into(), "t".into());
        assert!(err.is_err());
    }

    #[test]
    fn manifest_deserialization_validates() {
        let json = format!(
            r#"{{"content_hash":"{}","generator_version":"0.1.0","generated_at":"t"}}"#,
            "Z".repeat(64)
        );
        let result: Result<ScenarioManifest, _> = serde_json::from_str(&json);
        assert!(result.is_err());
    }

    #[test]
    fn heartbeat_serializes_absent_modules_as_null() {
        let hb = HeartbeatPayload {
            heartbeat_id: 0,
            timestamp: "2027-06-15T06:30:00Z".into(),
            wearable: None,
            location: None,
            weather: None,
            calendar: None,
            communications: None,
            financial: None,
        };
        let value = serde_json::to_value(&hb).unwrap();
        assert!(value.get("wearable").unwrap().is_null());
        assert!(value.get("financial").unwrap().is_null());
    }

    #[test]
    fn heartbeat_round_trips() {
        let hb = HeartbeatPayload {
            heartbeat_id: 7,
            timestamp: "2027-06-15T07:05:12Z".into(),
            wearable: Some(WearableData {
                heart_rate: 71,
                spo2: 98,
                steps: 412,
                skin_temp: 36.4,
                ecg_summary: "normal sinus rhythm".into(),
                blood_glucose: 94.2,
                calories_burned: 35,
                sleep_stage: "awake".into(),
                respiratory_rate: 16,
                body_battery: 88,
            }),
            location: None,
            weather: None,
            calendar: None,
            communications: None,
            financial: None,
        };
        let json = serde_json::to_string(&hb).unwrap();
        let back: HeartbeatPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(hb, back);
    }

    #[test]
    fn tier_parses_and_orders() {
        assert_eq!("T3".parse::<NoiseTier>().unwrap(), NoiseTier::T3);
        assert!(NoiseTier::T1 < NoiseTier::T4);
        assert!("T5".parse::<NoiseTier>().is_err());
    }

    #[test]
    fn tool_parameter_serializes_type_key() {
        let p = ToolParameter {
            name: "count".into(),
            param_type: "integer".into(),
            description: "How many".into(),
            required: true,
        };
        let value = serde_json::to_value(&p).unwrap();
        assert_eq!(value.get("type").unwrap(), "integer");
    }
}
