use chrono::{Duration, Utc};
use clap::Subcommand;
use launchgate_core::storage::{CountdownOutcome, CountdownRecord};
use launchgate_core::{Config, Database, Event};

#[derive(Subcommand)]
pub enum CountdownAction {
    /// Start a countdown toward the reveal
    Start {
        /// Countdown length in minutes (default: the configured launch countdown)
        #[arg(long, conflicts_with_all = ["seconds", "demo", "stage"])]
        minutes: Option<i64>,
        /// Countdown length in seconds
        #[arg(long, conflicts_with_all = ["demo", "stage"])]
        seconds: Option<i64>,
        /// Use the quick demo countdown
        #[arg(long, conflicts_with = "stage")]
        demo: bool,
        /// Use the on-stage short countdown
        #[arg(long)]
        stage: bool,
    },
    /// Tick the countdown and print the gate snapshot as JSON
    Status,
    /// Abandon the running countdown without revealing
    Cancel,
}

pub fn run(action: CountdownAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = Database::open()?;
    let mut gate = super::load_gate(&db, &config)?;

    match action {
        CountdownAction::Start {
            minutes,
            seconds,
            demo,
            stage,
        } => {
            let duration = if let Some(s) = seconds {
                Duration::seconds(s)
            } else if let Some(m) = minutes {
                Duration::minutes(m)
            } else if demo {
                config.demo_duration()
            } else if stage {
                config.stage_duration()
            } else {
                config.launch_duration()
            };
            match gate.start_countdown(duration)? {
                Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
                None => eprintln!("site already revealed; nothing to count down to"),
            }
        }
        CountdownAction::Status => {
            let events = gate.tick(&db)?;
            for event in &events {
                println!("{}", serde_json::to_string_pretty(event)?);
                if matches!(event, Event::CountdownExpired { .. }) {
                    super::record_completed(&db, gate.countdown())?;
                }
            }
            println!("{}", serde_json::to_string_pretty(&gate.snapshot())?);
        }
        CountdownAction::Cancel => {
            // Capture the session before cancel clears it.
            let session = gate
                .countdown()
                .session_id()
                .zip(gate.countdown().started_at())
                .map(|(id, started_at)| (id, started_at, gate.countdown().duration_ms()));
            match gate.cancel_countdown() {
                Some(event) => {
                    if let Some((session_id, started_at, duration_ms)) = session {
                        db.record_countdown(&CountdownRecord {
                            session_id,
                            duration_ms,
                            started_at,
                            ended_at: Utc::now(),
                            outcome: CountdownOutcome::Cancelled,
                        })?;
                    }
                    println!("{}", serde_json::to_string_pretty(&event)?);
                }
                None => eprintln!("no countdown running"),
            }
        }
    }

    super::save_engine(&db, gate.countdown())?;
    Ok(())
}
