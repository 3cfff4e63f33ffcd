use clap::Subcommand;
use launchgate_core::Database;

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List recent countdown sessions, newest first
    List {
        #[arg(long, default_value = "20")]
        limit: u32,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    match action {
        HistoryAction::List { limit, json } => {
            let records = db.countdown_history(limit)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                eprintln!("no countdown sessions recorded");
            } else {
                for r in &records {
                    println!(
                        "{}  {:>6}s  {:<9}  {}",
                        r.started_at.format("%Y-%m-%d %H:%M:%S"),
                        r.duration_ms / 1000,
                        format!("{:?}", r.outcome).to_lowercase(),
                        r.session_id
                    );
                }
            }
        }
    }
    Ok(())
}
