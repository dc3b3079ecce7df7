//! keg-migrate
//!
//! Command line entry point for the formula rename migration engine.

mod cli;
mod commands;
mod logging;

use keg_core::{EngineError, TriggerCoordinator};
use std::process::ExitCode;

fn main() -> ExitCode {
    let matches = cli::build().get_matches();
    logging::init(matches.get_count("verbose"), matches.get_flag("log-json"));

    match run(&matches) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = err
                .downcast_ref::<EngineError>()
                .map_or(1, EngineError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn run(matches: &clap::ArgMatches) -> anyhow::Result<ExitCode> {
    let config = commands::load_config(matches)?;
    let coordinator = TriggerCoordinator::new(config);

    match matches.subcommand() {
        Some(("migrate", args)) => commands::migrate(&coordinator, args),
        Some(("update", args)) => commands::update(&coordinator, args),
        Some(("uninstall", args)) => commands::uninstall(&coordinator, args),
        Some(("renames", args)) => commands::renames(&coordinator, args),
        Some(("list", args)) => commands::list(&coordinator, args),
        _ => Ok(ExitCode::FAILURE),
    }
}
