//! Scenario generation pipeline.
//!
//! Given (crisis_type, tier, seed, date) this produces a complete,
//! deterministic, schema-valid scenario package. One seeded stream drives
//! everything; all six module generators run on every heartbeat regardless of
//! tier, and tier filtering only nulls modules at packaging time, so the
//! underlying world is identical across tiers for a given seed.

pub mod crisis;
pub mod memories;
pub mod modules;
pub mod persona;
pub mod rng;
pub mod schedule;
pub mod tools;

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};

use crate::canonical::content_hash;
use crate::error::GeneratorError;
use crate::generator::crisis::enforce_crisis;
use crate::generator::modules::{
    calendar::CalendarGenerator, comms::CommsGenerator, financial::FinancialGenerator,
    location::LocationGenerator, weather::WeatherGenerator, wearable::WearableGenerator,
    ModuleGenerator,
};
use crate::generator::rng::RngStream;
use crate::generator::schedule::{cardiac_arrest_blocks, format_ts, Activity, PersonSchedule};
use crate::models::scenario::{
    AgentIdentity, Contact, HeartbeatPayload, NoiseTier, PersonProfile, ScenarioManifest,
    ScenarioMeta, ScenarioPackage,
};

/// Per-module chance that a sensor silently fails to report on a heartbeat.
const DROPOUT_PROBABILITY: f64 = 0.015;

/// No dropouts this many heartbeats before the crisis, or ever after it.
const DROPOUT_PROTECTED_ZONE: u32 = 10;

const SCENARIO_FORMAT_VERSION: &str = "1.0.0";

/// Inputs to [`generate_scenario`].
#[derive(Debug, Clone)]
pub struct GenerateParams {
    pub crisis_type: String,
    pub tier: NoiseTier,
    pub seed: u64,
    /// Defaults to June 15 of the minimum allowed year.
    pub scenario_date: Option<NaiveDate>,
    /// Manifest timestamp. An explicit parameter so identical inputs produce
    /// byte-identical packages; the CLI passes the wall clock.
    pub generated_at: Option<DateTime<Utc>>,
}

impl GenerateParams {
    pub fn new(crisis_type: impl Into<String>, tier: NoiseTier, seed: u64) -> Self {
        Self {
            crisis_type: crisis_type.into(),
            tier,
            seed,
            scenario_date: None,
            generated_at: None,
        }
    }
}

/// Which modules a tier retains.
fn tier_has_module(tier: NoiseTier, module: &str) -> bool {
    match module {
        "wearable" => true,
        "location" | "weather" => tier >= NoiseTier::T2,
        "calendar" | "communications" => tier >= NoiseTier::T3,
        "financial" => tier >= NoiseTier::T4,
        _ => false,
    }
}

/// The default simulated person (the David scenario).
pub fn default_person() -> PersonProfile {
    PersonProfile {
        name: "David Mitchell".into(),
        age: 34,
        occupation: "Software Engineering Manager".into(),
        home_address: "425 W 82nd St, New York, NY 10024".into(),
        office_address: "350 5th Ave, New York, NY 10118".into(),
        birthday: "March 12, 1993".into(),
    }
}

pub fn default_agent_identity() -> AgentIdentity {
    AgentIdentity {
        name: "Atlas".into(),
        personality: "Helpful personal AI assistant".into(),
    }
}

/// Twenty contacts spanning family, coworkers, friends, and services — the
/// realistic haystack `get_contacts` returns.
pub fn default_contacts() -> Vec<Contact> {
    let raw: [(&str, &str, &str, &str); 20] = [
        ("contact-001", "Sarah Mitchell", "wife", "+1-917-482-7391"),
        ("contact-002", "Mom (Linda Mitchell)", "mother", "+1-212-738-4052"),
        ("contact-003", "Jake Mitchell", "brother", "+1-347-261-8843"),
        ("contact-004", "Dad (Robert Mitchell)", "father", "+1-212-738-4017"),
        ("contact-005", "Tony Russo", "college friend", "+1-646-319-7724"),
        ("contact-006", "Amanda Liu", "college friend", "+1-917-205-6138"),
        ("contact-007", "Priya Kapoor", "coworker (engineering)", "+1-646-841-2290"),
        ("contact-008", "Mike Chang", "coworker (engineering)", "+1-347-592-0461"),
        ("contact-009", "Rachel Torres", "manager", "+1-212-904-3178"),
        ("contact-010", "Kira Nakamura", "coworker (design)", "+1-646-773-5504"),
        ("contact-011", "Brian O'Connor", "neighbor", "+1-212-367-1482"),
        ("contact-012", "Samantha Wells", "personal trainer", "+1-718-430-8856"),
        ("contact-013", "Carlos Rivera", "barber", "+1-347-685-2019"),
        ("contact-014", "Dr. James Chen", "primary care physician", "+1-212-639-4700"),
        ("contact-015", "Landlord (Apex Property Mgmt)", "building management", "+1-212-502-3341"),
        ("contact-016", "Dan Kowalski", "fantasy football league", "+1-718-294-7763"),
        ("contact-017", "Lisa Park", "dentist office", "+1-212-861-5092"),
        ("contact-018", "Aunt Diane", "aunt", "+1-516-437-2618"),
        ("contact-019", "Tom Brennan", "gym buddy", "+1-917-328-4175"),
        ("contact-020", "Deepak Mehta", "accountant", "+1-646-902-3387"),
    ];
    raw.into_iter()
        .map(|(id, display_name, relationship, phone)| Contact {
            id: id.into(),
            display_name: display_name.into(),
            relationship: relationship.into(),
            phone: phone.into(),
        })
        .collect()
}

/// Generate a complete scenario package. Same inputs, same package.
pub fn generate_scenario(params: GenerateParams) -> Result<ScenarioPackage, GeneratorError> {
    if params.crisis_type != "cardiac_arrest" {
        return Err(GeneratorError::UnknownCrisisType(params.crisis_type));
    }

    let scenario_date = params.scenario_date.unwrap_or_else(PersonSchedule::default_date);
    let schedule = PersonSchedule::new(cardiac_arrest_blocks(), scenario_date)?;

    let mut rng = RngStream::new(params.seed);
    let timestamps = schedule.heartbeat_timestamps(&mut rng);

    let crisis_idx = timestamps
        .iter()
        .position(|ts| {
            schedule
                .block_at(*ts)
                .map(|b| b.activity == Activity::Crisis)
                .unwrap_or(false)
        })
        .ok_or(GeneratorError::MissingCrisisBlock)? as u32;

    let mut wearable_gen = WearableGenerator::new();
    let mut location_gen = LocationGenerator::new();
    let mut weather_gen = WeatherGenerator::new();
    let mut calendar_gen = CalendarGenerator::new();
    let mut comms_gen = CommsGenerator::new();
    let mut financial_gen = FinancialGenerator::new();

    let mut heartbeats: Vec<HeartbeatPayload> = Vec::with_capacity(timestamps.len());

    for (hb_id, ts) in timestamps.iter().enumerate() {
        let hb_id = hb_id as u32;

        // All six generators run every heartbeat, in a fixed order, each
        // followed by a dropout roll. Tier never changes the draw sequence.
        let wearable = wearable_gen.generate(&schedule, hb_id, *ts, &mut rng)?;
        let _ = drop_roll(&mut rng, hb_id, crisis_idx); // wearable never drops
        let location = location_gen.generate(&schedule, hb_id, *ts, &mut rng)?;
        let drop_location = drop_roll(&mut rng, hb_id, crisis_idx);
        let weather = weather_gen.generate(&schedule, hb_id, *ts, &mut rng)?;
        let drop_weather = drop_roll(&mut rng, hb_id, crisis_idx);
        let calendar = calendar_gen.generate(&schedule, hb_id, *ts, &mut rng)?;
        let drop_calendar = drop_roll(&mut rng, hb_id, crisis_idx);
        let communications = comms_gen.generate(&schedule, hb_id, *ts, &mut rng)?;
        let drop_comms = drop_roll(&mut rng, hb_id, crisis_idx);
        let financial = financial_gen.generate(&schedule, hb_id, *ts, &mut rng)?;
        let drop_financial = drop_roll(&mut rng, hb_id, crisis_idx);

        heartbeats.push(HeartbeatPayload {
            heartbeat_id: hb_id,
            timestamp: format_ts(*ts),
            wearable: Some(wearable),
            location: (!drop_location).then_some(location),
            weather: (!drop_weather).then_some(weather),
            calendar: (!drop_calendar).then_some(calendar),
            communications: (!drop_comms).then_some(communications),
            financial: (!drop_financial).then_some(financial),
        });
    }

    enforce_crisis(&mut heartbeats, crisis_idx, "cardiac_arrest")?;

    // Tier filtering happens here, after generation and enforcement.
    for hb in &mut heartbeats {
        if !tier_has_module(params.tier, "location") {
            hb.location = None;
        }
        if !tier_has_module(params.tier, "weather") {
            hb.weather = None;
        }
        if !tier_has_module(params.tier, "calendar") {
            hb.calendar = None;
        }
        if !tier_has_module(params.tier, "communications") {
            hb.communications = None;
        }
        if !tier_has_module(params.tier, "financial") {
            hb.financial = None;
        }
    }

    let hash = content_hash(&heartbeats)?;
    let generated_at = params.generated_at.unwrap_or_else(Utc::now);
    let manifest = ScenarioManifest::new(
        hash,
        env!("CARGO_PKG_VERSION").to_string(),
        format_ts(generated_at),
    )?;

    let person = default_person();
    let contacts = default_contacts();
    let agent_identity = default_agent_identity();
    let persona_document = persona::generate_persona(&person, &agent_identity, &contacts);

    Ok(ScenarioPackage {
        scenario_id: format!("{}_{}_s{}", "cardiac_arrest", params.tier, params.seed),
        version: SCENARIO_FORMAT_VERSION.to_string(),
        seed: params.seed,
        crisis_type: "cardiac_arrest".to_string(),
        noise_tier: params.tier,
        crisis_heartbeat_id: crisis_idx,
        person,
        contacts,
        agent_identity,
        heartbeats,
        tool_definitions: tools::collect_tool_definitions(params.tier)?,
        memory_files: memories::generate_memory_files(),
        persona_document,
        manifest,
    })
}

/// Consume the per-module dropout roll; apply it only outside the protected
/// zone around the crisis.
fn drop_roll(rng: &mut RngStream, hb_id: u32, crisis_idx: u32) -> bool {
    let roll = rng.uniform();
    hb_id + DROPOUT_PROTECTED_ZONE < crisis_idx && roll < DROPOUT_PROBABILITY
}

/// Write a package to `parent_dir/{scenario_id}/`. Returns the package path.
pub fn write_scenario(
    package: &ScenarioPackage,
    parent_dir: &Path,
) -> Result<PathBuf, GeneratorError> {
    let dir = parent_dir.join(&package.scenario_id);
    std::fs::create_dir_all(dir.join("memories"))?;

    std::fs::write(
        dir.join("manifest.json"),
        serde_json::to_string_pretty(&package.manifest)? + "\n",
    )?;
    std::fs::write(
        dir.join("scenario.json"),
        serde_json::to_string_pretty(&ScenarioMeta::from(package))? + "\n",
    )?;
    std::fs::write(
        dir.join("heartbeats.json"),
        serde_json::to_string_pretty(&package.heartbeats)? + "\n",
    )?;
    std::fs::write(
        dir.join("tools.json"),
        serde_json::to_string_pretty(&package.tool_definitions)? + "\n",
    )?;
    std::fs::write(dir.join("persona.md"), &package.persona_document)?;
    for mf in &package.memory_files {
        std::fs::write(dir.join("memories").join(format!("{}.md", mf.key)), &mf.content)?;
    }

    Ok(dir)
}
