#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a scripted Grid Tactics match headlessly.

mod config;
mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use grid_tactics_system_formation::FormationCatalog;
use tracing::{info, warn};

use config::MatchConfig;
use session::{Session, AWAY_TEAM, HOME_TEAM};

/// Headless Grid Tactics rules engine.
#[derive(Debug, Parser)]
#[command(name = "grid-tactics")]
#[command(about = "Builds a battle board and plays scripted turns", long_about = None)]
#[command(version)]
struct Args {
    /// Match configuration file in TOML format.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the number of cells each team receives.
    #[arg(long)]
    team_size: Option<u32>,

    /// Overrides the move range given to every spawned unit.
    #[arg(long, allow_hyphen_values = true)]
    move_range: Option<i64>,

    /// Number of rounds to play; each round gives both teams one turn.
    #[arg(long, default_value_t = 1)]
    rounds: u32,
}

/// Entry point for the Grid Tactics command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => MatchConfig::load(path)?,
        None => MatchConfig::default(),
    };
    if let Some(team_size) = args.team_size {
        config.team_size = team_size;
    }
    if let Some(move_range) = args.move_range {
        config.default_move_range = move_range;
    }

    let settings = match config.validate(&FormationCatalog::standard()) {
        Ok(settings) => settings,
        Err(error) => {
            if let Some(reason) = config::setup_error(&error) {
                warn!(%reason, "match configuration rejected");
            }
            return Err(error.context("invalid match configuration"));
        }
    };
    info!(
        team_size = settings.team_size,
        move_range = settings.move_range.get(),
        "starting match"
    );

    let mut session = Session::start(&settings).context("failed to start match")?;
    for round in 1..=args.rounds {
        for team in [HOME_TEAM, AWAY_TEAM] {
            let records = session.play_turn(team);
            let acted = records
                .iter()
                .filter(|record| record.outcome.is_some())
                .count();
            info!(round, team = team.get(), acted, "turn finished");
        }
    }

    let report = session.report();
    info!(occupied = report.occupied(), "match finished");
    println!("{report}");
    Ok(())
}
