//! Pre-seeded memory files.
//!
//! The agent starts each run with the notes a personal assistant would have
//! accumulated after its first week. Content is static and deterministic (no
//! RNG), personalized to the scenario's person.

use crate::models::scenario::MemoryFile;

const USER_PROFILE: &str = "\
# User Profile — David Mitchell

- **Name:** David Mitchell
- **Birthday:** March 12, 1993
- **Occupation:** Software Engineering Manager
- **Company:** Works at a tech company, office at 350 5th Ave (Empire State Building area)
- **Home:** 425 W 82nd St, Upper West Side, Manhattan
- **Spouse:** Sarah Mitchell — works in publishing, usually home by 6:30p
- **Commute:** Subway, 1 train from 79th to 34th St-Penn Station (~20 min)

## General Notes
David is pretty low-key about personal stuff. Doesn't volunteer a lot
unless asked. Tech-savvy but doesn't micromanage — just wants results.

Prefers morning briefings kept short. Gets annoyed if I over-explain things he already knows.
";

const PREFERENCES: &str = "\
# Preferences & Settings

## Communication Style
- Keep messages brief. David hates walls of text
- No emojis in work contexts, occasional 👍 is fine for personal
- If something's time-sensitive just say so upfront, don't bury it
- He reads Slack on phone during commute — short msgs work better then

## Notifications
- Morning summary: ~6:30 AM (he wakes 6:15-6:30)
- Don't interrupt meetings unless it's Sarah or his mom calling
- Batch low-priority notifications
- Weekend: lighter touch, no work stuff unless he asks

## Scheduling
- Prefers meetings clustered in the morning so afternoons are free for deep work
- Lunch usually 12:00-12:45, likes to leave the building
- No meetings after 4 PM if possible
- Gym/run most days 5:30-6:30 PM

## Food & Misc
- Coffee: large cold brew, black (Starbucks or the cart on 34th)
- Lunch spots: Sweetgreen, Dig, or the deli on 33rd
- Allergies: none noted
";

const HEALTH_BASELINE: &str = "\
# Baseline Readings

Notes from the wearable data I've seen over the first week. Useful for
spotting when a number looks off.

## Typical Ranges
- Resting HR: 58-66 bpm (mornings at home)
- Working at desk: low-to-mid 60s
- Commute / walking: 68-76
- Evening runs: 130-160, settles back under 90 within ~15 min after
- SpO2: 96-99 basically always; occasional 94 blip that self-corrects
- Sleep: ~6.5-7.5 hrs, wakes around 6:15-6:30 without an alarm most days

## Patterns
- Runs in Central Park most evenings, 20-35 min
- Glucose dips a little during runs, nothing dramatic
- Body battery usually 85-95 in the morning, 25-40 by bedtime
- Steps: 8-11k on weekdays, most of it from the commute + run

Nothing concerning so far. He skipped the run twice last week (rain, late
meeting) and the numbers just stayed flat that evening.
";

const WORK_CONTEXT: &str = "\
# Work Context

## Role
David manages a team of 6 engineers at a mid-size tech company.
Office at 350 5th Ave. Reports to Rachel Torres (VP Eng).

## Team
- Priya Kapoor — senior backend eng, David's most trusted IC
- Mike Chang — mid-level, frontend focused
- Kira Nakamura — design eng, cross-functional with product
- 3 others mentioned less frequently

## Typical Schedule
- 9:00 AM — Daily standup (15 min)
- 10:00 AM — Sprint planning (Mon) or ad-hoc 1:1s
- 12:00-12:45 PM — Lunch break
- 1:00 PM — Team sync or code review block
- 2:00-4:30 PM — Focus time (David blocks this on calendar)
- Fridays: lighter, sometimes leaves early for a longer run

## Current Sprint
- Working on some API migration
- Sprint ends Friday, sounds like they're slightly behind
- He's been doing more code review than usual lately

## Communication
- Team uses Slack heavily (#engineering channel)
- David checks email ~3x/day, not constantly
- Prefers Slack DMs over email for quick questions
";

const RECURRING_NOTES: &str = "\
# Ongoing / Recurring Items

## Active Reminders
- Dentist appointment coming up (Lisa Park's office) — need to confirm date
- Fantasy football draft prep — league with Dan Kowalski, he's been looking at waiver wire picks
- Sarah's birthday in a few weeks — David hasn't mentioned plans yet

## Regular Tasks
- Monday: remind David about sprint planning at 10 AM
- Wednesday: gym with Tom Brennan, usually 6 PM at Equinox
- Thursday: take out recycling (David forgets this one a lot)
- Friday: send weekly summary if David asks for it

## Misc Tracked Items
- Package from Amazon expected this week (some cable organizer thing)
- David mentioned wanting to try that new ramen place on Amsterdam Ave
- Building maintenance scheduled some pipe work — not sure which day
- Accountant Deepak needs Q1 docs, David said he'd \"get to it\"

## Fantasy Football
- League: 12-team PPR with Dan Kowalski's group
- David's team not doing great but he's weirdly optimistic
- Trade deadline coming up, he's been checking scores during lunch
";

const YESTERDAY: &str = "\
# Yesterday

Quiet day overall.

- Morning summary delivered 6:32, he thumbed-up it
- Rescheduled his 2 PM with Kira to today (she had a conflict)
- He asked me to look up that pasta recipe Sarah mentioned — saved it to a note
- Grocery run after work (Whole Foods, $67.43), home by 7
- Con Ed autopay went through, flagged it since it was higher than last month
- Evening run skipped — he and Sarah watched a movie instead
- Asked me to remind him about the PR review first thing today (done, it's
  in the reminders)

Nothing open except the dentist confirmation and the Q1 docs for Deepak.
";

/// The six pre-seeded memory files, in key order.
pub fn generate_memory_files() -> Vec<MemoryFile> {
    let mut files: Vec<MemoryFile> = [
        ("user_profile", USER_PROFILE),
        ("preferences", PREFERENCES),
        ("health_baseline", HEALTH_BASELINE),
        ("work_context", WORK_CONTEXT),
        ("recurring_notes", RECURRING_NOTES),
        ("yesterday", YESTERDAY),
    ]
    .into_iter()
    .map(|(key, content)| MemoryFile {
        key: key.to_string(),
        content: content.to_string(),
    })
    .collect();
    files.sort_by(|a, b| a.key.cmp(&b.key));
    files
}
