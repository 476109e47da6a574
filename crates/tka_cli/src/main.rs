//! tka-plan
//!
//! Replays a planning session against the femur and tibia models and prints
//! the captured landmarks and built artifacts as JSON.
//!
//! Run with: cargo run -p tka_cli -- --session demos/session.toml --pretty

use std::path::PathBuf;

use clap::Parser;
use tka_cli::{replay, Session, SessionOutput};
use tka_plan::{Planner, PlannerConfig};

#[derive(Debug, Parser)]
#[command(name = "tka-plan", version, about = "Knee landmark and resection plane planner")]
struct Args {
    /// Planner configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Femur STL, overriding the configured path
    #[arg(long)]
    femur: Option<PathBuf>,

    /// Tibia STL, overriding the configured path
    #[arg(long)]
    tibia: Option<PathBuf>,

    /// Session script (TOML) to replay
    #[arg(long)]
    session: Option<PathBuf>,

    /// Write JSON here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON
    #[arg(long)]
    pretty: bool,
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    if let Err(e) = run(Args::parse()) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = PlannerConfig::load_or_default(args.config.as_deref())?;
    let models_requested = args.femur.is_some() || args.tibia.is_some();
    if let Some(femur) = args.femur {
        config.models.femur = femur;
    }
    if let Some(tibia) = args.tibia {
        config.models.tibia = tibia;
    }

    let models_present = config.models.femur.exists() && config.models.tibia.exists();
    let mut planner = Planner::new(config)?;
    if models_requested || models_present {
        planner.load_models()?;
    } else {
        log::warn!("Bone models not found; clicks will miss until models are provided");
    }

    let session = match &args.session {
        Some(path) => Session::load(path)?,
        None => Session::default(),
    };
    let report = replay(&mut planner, &session);
    log::info!(
        "Replayed {} steps: {} committed, {} missed, {} failed",
        report.steps,
        report.committed,
        report.missed,
        report.failures.len()
    );

    let output = SessionOutput { report, plan: planner.snapshot() };
    let json = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };

    match args.output {
        Some(path) => {
            std::fs::write(&path, json)?;
            log::info!("Wrote plan to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
