//! hoops CLI
//!
//! Runs games from team JSON files, plays a game one quarter at a time
//! against a state file, and checks playbooks and stored states.

mod store;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use hoops_core::api::TeamData;
use hoops_core::data::{default_playbook, Playbook};
use hoops_core::engine::{EngineConfig, PeriodEnd};
use hoops_core::{GameAdjustments, GameEngine, GameReport, GameState, TeamSetup, TeamSide};

#[derive(Parser)]
#[command(name = "hoops")]
#[command(about = "Deterministic basketball game simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a full game
    Simulate {
        /// Home team JSON file
        #[arg(long)]
        home: PathBuf,

        /// Away team JSON file
        #[arg(long)]
        away: PathBuf,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Engine config JSON file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the full report as JSON
        #[arg(long, default_value = "false")]
        json: bool,

        /// Also save the final state to this file
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Play the next quarter of a game stored in a state file
    Quarter {
        /// State file; created from --home/--away when missing
        #[arg(long)]
        state: PathBuf,

        #[arg(long)]
        home: Option<PathBuf>,

        #[arg(long)]
        away: Option<PathBuf>,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        #[arg(long)]
        config: Option<PathBuf>,

        /// Adjustments JSON applied to the home team before the quarter
        #[arg(long)]
        home_adjustments: Option<PathBuf>,

        /// Adjustments JSON applied to the away team before the quarter
        #[arg(long)]
        away_adjustments: Option<PathBuf>,
    },

    /// Parse and validate a playbook (the embedded one by default)
    ValidatePlaybook {
        path: Option<PathBuf>,
    },

    /// Print a summary of a stored state
    InspectState {
        path: PathBuf,

        /// Dump the whole state as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate { home, away, seed, config, json, save } => {
            let config = load_config(config.as_deref())?;
            let mut engine = GameEngine::with_config(load_team(&home)?, load_team(&away)?, seed, config)?;
            let report = engine.simulate_game()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(engine.state(), &report);
            }

            if let Some(path) = save {
                store::save_state(&path, &engine.snapshot_state())?;
                println!("\nState saved to: {}", path.display());
            }
        }

        Commands::Quarter { state, home, away, seed, config, home_adjustments, away_adjustments } => {
            let config = load_config(config.as_deref())?;
            let mut engine = if state.exists() {
                GameEngine::from_state(store::load_state(&state)?, config)?
            } else {
                let (Some(home), Some(away)) = (home, away) else {
                    bail!("{} does not exist; pass --home and --away to start a game", state.display());
                };
                GameEngine::with_config(load_team(&home)?, load_team(&away)?, seed, config)?
            };

            if engine.is_final() {
                bail!("Game in {} is already final", state.display());
            }

            for (side, path) in [(TeamSide::Home, home_adjustments), (TeamSide::Away, away_adjustments)] {
                if let Some(path) = path {
                    let adjustments: GameAdjustments = store::read_json(&path)?;
                    engine.apply_adjustments(side, &adjustments)?;
                }
            }

            let quarter = engine.simulate_quarter()?;
            for entry in &quarter.play_by_play {
                println!(
                    "Q{} {:>5}  {:<16} {:<24} {:>3}-{:<3} {}",
                    entry.quarter, entry.clock, entry.team, entry.play, entry.score_home, entry.score_away, entry.description
                );
            }
            print_period(engine.state(), &quarter.period);

            store::save_state(&state, &engine.snapshot_state())?;
            if quarter.period.finished {
                let report = engine.report();
                print_report(engine.state(), &report);
            }
        }

        Commands::ValidatePlaybook { path } => {
            let playbook = match path {
                Some(path) => {
                    let json = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    Playbook::from_json(&json)?
                }
                None => default_playbook()?.clone(),
            };

            println!("Playbook v{} is valid ({} plays)", playbook.version, playbook.plays.len());
            for play in &playbook.plays {
                println!("   {:<24} weight {:>4.1}  {} actions", play.name, play.weight, play.actions.len());
            }
        }

        Commands::InspectState { path, json } => {
            let state = store::load_state(&path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&state)?);
            } else {
                print_state(&state);
            }
        }
    }

    Ok(())
}

fn load_team(path: &Path) -> Result<TeamSetup> {
    let data: TeamData = store::read_json(path)?;
    data.into_setup().with_context(|| format!("Invalid team in {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            let json =
                std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(EngineConfig::from_json(&json)?)
        }
        None => Ok(EngineConfig::default()),
    }
}

fn period_label(period: u8) -> String {
    if period > 4 {
        format!("OT{}", period - 4)
    } else {
        format!("Q{}", period)
    }
}

fn print_period(state: &GameState, period: &PeriodEnd) {
    println!(
        "\nEnd of {}: {} {} - {} {} (period {}-{})",
        period_label(period.quarter),
        state.team_name(TeamSide::Home),
        period.scores.home,
        period.scores.away,
        state.team_name(TeamSide::Away),
        period.period_score.home,
        period.period_score.away
    );
}

fn print_report(state: &GameState, report: &GameReport) {
    println!(
        "\nFinal: {} {} - {} {}",
        state.team_name(TeamSide::Home),
        report.final_score.home,
        report.final_score.away,
        state.team_name(TeamSide::Away)
    );
    if report.overtime_periods > 0 {
        println!("   Overtime periods: {}", report.overtime_periods);
    }
    println!("   Possessions:      {}", report.possessions);
    if let Some(winner) = &report.game_winner {
        println!("   Game winner:      {} {}", winner.clock, winner.description);
    }

    for side in TeamSide::BOTH {
        println!("\n{}", state.team_name(side));
        println!("   {:<20} {:>5} {:>4} {:>4} {:>4}", "Player", "MIN", "PTS", "REB", "AST");
        for line in report.box_scores.get(side).to_wire() {
            println!("   {:<20} {:>5.1} {:>4} {:>4} {:>4}", line.name, line.min, line.pts, line.reb, line.ast);
        }
    }

    if !report.degraded.is_clean() {
        println!("\nDegraded: {:?}", report.degraded);
    }
}

fn print_state(state: &GameState) {
    println!("State v{} (seed {})", state.version, state.seed);
    println!(
        "   {} {} - {} {}",
        state.team_name(TeamSide::Home),
        state.scores.home,
        state.scores.away,
        state.team_name(TeamSide::Away)
    );
    if state.finished {
        println!("   Final after {}", period_label(state.quarter));
    } else {
        println!("   {} with {:.2} minutes left, {:?} ball", period_label(state.quarter), state.clock_minutes, state.possession);
    }
    println!("   Possessions: {}", state.possession_count);
    for side in TeamSide::BOTH {
        println!("   {:?} lineup: {}", side, state.lineups.get(side).join(", "));
    }
    if !state.degraded.is_clean() {
        println!("   Degraded: {:?}", state.degraded);
    }
}
