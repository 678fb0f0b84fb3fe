//! Console entry point.
//!
//! # Responsibility
//! - Wire the SQLite provider and repositories together explicitly.
//! - Print store contents and run the "attach a player to race 1" scenario.

use clap::Parser;
use moto_core::{
    default_log_level, ensure_schema, init_logging, Player, Repository, SqliteConnectionProvider,
    SqlitePlayerRepository, SqliteRaceRepository, SqliteTeamRepository, Team,
};
use std::collections::HashMap;
use std::fmt::Display;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "moto")]
#[command(about = "Inspect and exercise the race/player store", long_about = None)]
struct Cli {
    /// SQLite path or `Data Source=<path>` connection string
    #[arg(long, env = "MOTO_DB", default_value = "Data Source=moto.db")]
    db: String,
    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, env = "MOTO_LOG_DIR")]
    log_dir: Option<String>,
    /// trace|debug|info|warn|error
    #[arg(long, env = "MOTO_LOG_LEVEL")]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    }

    match run(&cli.db) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_run module=cli status=error error={err}");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(connection_string: &str) -> Result<(), Box<dyn std::error::Error>> {
    let provider = SqliteConnectionProvider::new();
    ensure_schema(&provider, connection_string)?;

    let players = SqlitePlayerRepository::open(&provider, connection_string)?;
    print_all("players", &players.find_all());

    let teams = SqliteTeamRepository::open(&provider, connection_string)?;
    print_all("teams", &teams.find_all());

    let races = SqliteRaceRepository::open(&provider, connection_string, &players)?;
    print_all("races", &races.find_all());

    let team = teams.save(Team::new("McLaren"))?;
    println!("{team}");

    let player = players.save(Player::new("Norris", "1110001110001", 3))?;
    println!("{player}");

    match races.find_one(1)? {
        Some(mut race) => {
            race.attach_player(player);
            races.update(race)?;
        }
        None => println!("No race with id 1; nothing to update"),
    }

    print_all("races after update", &races.find_all());
    Ok(())
}

fn print_all<V: Display>(label: &str, records: &HashMap<i64, V>) {
    println!("All {label} in the database:");
    let mut ids: Vec<_> = records.keys().copied().collect();
    ids.sort_unstable();
    for id in ids {
        println!("{id} => {}", records[&id]);
    }
}
