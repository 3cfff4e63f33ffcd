use clap::Subcommand;
use launchgate_core::{
    Burst, CelebrationPreset, Config, Database, KeyChord, Route, StaticAuth,
};

#[derive(Subcommand)]
pub enum GateAction {
    /// Print the gate snapshot as JSON
    Status,
    /// Operator override: reveal the site now, bypassing the countdown
    Reveal,
    /// Fire a decorative celebration burst (site must be live)
    Celebrate {
        /// Seed for reproducible particle sampling
        #[arg(long, default_value = "0")]
        seed: u64,
        /// Also print the sampled particles
        #[arg(long)]
        particles: bool,
    },
    /// Feed a key press to the gate, e.g. "ctrl+alt+i" or "space"
    Key { chord: String },
    /// Resolve a route against the gate, e.g. "/register"
    Route {
        path: String,
        /// Treat the visitor as authenticated for the admin view
        #[arg(long)]
        authenticated: bool,
    },
}

pub fn run(action: GateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = Database::open()?;
    let mut gate = super::load_gate(&db, &config)?;

    match action {
        GateAction::Status => {
            println!("{}", serde_json::to_string_pretty(&gate.snapshot())?);
        }
        GateAction::Reveal => {
            let events = gate.reveal_override(&db)?;
            if events.is_empty() {
                eprintln!("site already revealed");
            }
            for event in &events {
                println!("{}", serde_json::to_string_pretty(event)?);
            }
        }
        GateAction::Celebrate { seed, particles } => match gate.celebrate() {
            Some(event) => {
                println!("{}", serde_json::to_string_pretty(&event)?);
                if particles {
                    let burst =
                        Burst::sample(CelebrationPreset::Ambient, &config.celebration.palette, seed);
                    println!("{}", serde_json::to_string_pretty(&burst)?);
                }
            }
            None => {
                return Err("celebrations need a revealed site (and celebration.enabled)".into())
            }
        },
        GateAction::Key { chord } => {
            let chord = KeyChord::parse(&chord)?;
            let events = gate.handle_key(&db, &chord.to_event())?;
            if events.is_empty() {
                eprintln!("no effect in the current gate state");
            }
            for event in &events {
                println!("{}", serde_json::to_string_pretty(event)?);
            }
        }
        GateAction::Route {
            path,
            authenticated,
        } => {
            let route = Route::parse(&path)
                .ok_or_else(|| format!("unknown route: {path}"))?;
            let view = gate.view(route, &StaticAuth(authenticated));
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
    }

    super::save_engine(&db, gate.countdown())?;
    Ok(())
}
