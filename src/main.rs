//! Follow-up wizard CLI. Runs one scheduling session end to end.
//!
//! Uses the built-in working-hours provider and a dry-run calendar, so it is
//! safe to run anywhere. Usage:
//!
//! ```text
//! followup-wizard --type product-demo --date 2026-03-10 \
//!     --company Acme --participant "Dana Ruiz <dana@acme.io>"
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use chrono::{Datelike, Duration, Local, NaiveDate, Utc, Weekday};
use clap::Parser;

use followup_scheduler::config::{load_config, load_config_from};
use followup_scheduler::{
    list_meeting_types, CalendarSubmitter, Confirmation, DetailsUpdate, MeetingContext,
    Participant, ScheduleRequest, SchedulingError, SchedulingWizard, WizardError,
    WorkingHoursProvider,
};

#[derive(Debug, Parser)]
#[command(name = "followup-wizard", about = "Schedule a sales follow-up meeting")]
struct Args {
    /// Print the meeting-type catalog and exit.
    #[arg(long)]
    list_types: bool,

    /// Meeting type id from the catalog.
    #[arg(long = "type", default_value = "product-demo")]
    meeting_type: String,

    /// Date to schedule on (YYYY-MM-DD). Defaults to the next weekday.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Index into the ranked suggestions (0 = best).
    #[arg(long, default_value_t = 0)]
    slot: usize,

    /// Attendee as "Name <email>". Repeatable.
    #[arg(long = "participant")]
    participants: Vec<String>,

    /// Timezone for attendees given on the command line.
    #[arg(long, default_value = "UTC")]
    timezone: String,

    #[arg(long)]
    company: Option<String>,

    #[arg(long)]
    notes: Option<String>,

    /// Config file. Defaults to ~/.followup/config.json.
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Confirms every request without touching a real calendar.
struct DryRunSubmitter;

#[async_trait]
impl CalendarSubmitter for DryRunSubmitter {
    async fn submit_meeting(
        &self,
        request: &ScheduleRequest,
    ) -> Result<Confirmation, SchedulingError> {
        log::info!(
            "Dry run: would book '{}' for {} attendee(s)",
            request.title,
            request.participants.len()
        );
        Ok(Confirmation {
            event_id: format!("dry-run-{}", uuid::Uuid::new_v4()),
            calendar_link: None,
            confirmed_at: Utc::now(),
        })
    }
}

fn parse_participant(raw: &str, timezone: &str) -> anyhow::Result<Participant> {
    let (name, email) = match (raw.find('<'), raw.rfind('>')) {
        (Some(open), Some(close)) if open < close => {
            (raw[..open].trim(), raw[open + 1..close].trim())
        }
        _ => (raw.trim(), raw.trim()),
    };
    if !email.contains('@') {
        bail!("Participant '{}' needs an email address", raw);
    }
    Ok(Participant::new(name, email, timezone))
}

fn next_weekday(from: NaiveDate) -> NaiveDate {
    let mut date = from + Duration::days(1);
    while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        date += Duration::days(1);
    }
    date
}

/// Turn a scheduling error into a host-style message with its recovery hint.
fn explain(err: SchedulingError) -> anyhow::Error {
    let payload = WizardError::from(&err);
    anyhow!("{} ({})", payload.message, payload.recovery_suggestion)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.list_types {
        for meeting_type in list_meeting_types() {
            println!(
                "{:<22} {:>3} min  {}",
                meeting_type.id, meeting_type.duration_minutes, meeting_type.name
            );
        }
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => load_config_from(path),
        None => load_config(),
    }
    .map_err(|e| anyhow!("Failed to load config: {e}"))?;

    let participants = args
        .participants
        .iter()
        .map(|raw| parse_participant(raw, &args.timezone))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let context = MeetingContext {
        call_id: None,
        company: args.company.clone(),
        summary: None,
        participants,
    };
    let date = args
        .date
        .unwrap_or_else(|| next_weekday(Local::now().date_naive()));

    let mut wizard = SchedulingWizard::open(
        context,
        date,
        Arc::new(WorkingHoursProvider::from_config(&config)),
        Arc::new(DryRunSubmitter),
        &config,
    );

    wizard
        .choose_type(&args.meeting_type)
        .await
        .map_err(explain)?;

    let slot_id = {
        let session = wizard.session().map_err(explain)?;
        let slots = session.suggested_slots();
        if slots.is_empty() {
            bail!("No suggestions for {}. Try a weekday.", date);
        }
        for (i, slot) in slots.iter().enumerate() {
            println!(
                "[{}] {} - {} ({}%) {}",
                i,
                slot.start.format("%Y-%m-%d %H:%M UTC"),
                slot.end.format("%H:%M"),
                slot.confidence,
                slot.reasoning
            );
        }
        slots
            .get(args.slot)
            .map(|slot| slot.id.clone())
            .with_context(|| format!("--slot {} out of range ({} suggestions)", args.slot, slots.len()))?
    };

    wizard.select_slot(&slot_id).map_err(explain)?;
    wizard.advance().map_err(explain)?;
    if let Some(notes) = args.notes {
        wizard
            .update_details(DetailsUpdate {
                notes: Some(notes),
                ..Default::default()
            })
            .map_err(explain)?;
    }
    wizard.advance().map_err(explain)?;

    let request = wizard.review_request().map_err(explain)?;
    println!("{}", serde_json::to_string_pretty(&request)?);

    let confirmation = wizard.submit().await.map_err(explain)?;
    println!("{}", serde_json::to_string_pretty(&confirmation)?);
    Ok(())
}
