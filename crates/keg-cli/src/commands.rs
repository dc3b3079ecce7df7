//! Subcommand handlers

use anyhow::{Context, Result};
use clap::ArgMatches;
use keg_catalog::QualifiedName;
use keg_core::{EngineConfig, MigrateReport, TriggerCoordinator};
use keg_store::MigrationOutcome;
use std::path::PathBuf;
use std::process::ExitCode;

/// Build engine configuration from `--config` and `--prefix`
///
/// `--prefix` wins over the prefix in the config file.
pub(crate) fn load_config(matches: &ArgMatches) -> Result<EngineConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => EngineConfig::from_toml_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(prefix) = matches.get_one::<PathBuf>("prefix") {
        config.prefix.clone_from(prefix);
    }
    tracing::debug!(?config, "engine configuration");
    Ok(config)
}

pub(crate) fn migrate(coordinator: &TriggerCoordinator, args: &ArgMatches) -> Result<ExitCode> {
    let raw = args
        .get_one::<String>("name")
        .context("missing formula name")?;
    let request: QualifiedName = raw
        .parse()
        .with_context(|| format!("invalid formula name {raw:?}"))?;
    let report = coordinator.migrate(&request, args.get_flag("dry-run"))?;

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_migrate(&report);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_migrate(report: &MigrateReport) {
    match (&report.outcome, report.decision.rename()) {
        (None, Some(entry)) => println!("Would migrate {entry}"),
        (None, None) => println!("{}", report.decision),
        (Some(MigrationOutcome::AlreadyMigrated { old_name, new_name }), _) => {
            println!("{old_name} is already migrated to {new_name}");
        }
        (
            Some(MigrationOutcome::Migrated {
                old_name,
                new_name,
                superseded,
                ..
            }),
            _,
        ) => {
            if *superseded {
                println!("Migrated {old_name} to {new_name} (existing {new_name} kept)");
            } else {
                println!("Migrated {old_name} to {new_name}");
            }
        }
    }
}

pub(crate) fn update(coordinator: &TriggerCoordinator, args: &ArgMatches) -> Result<ExitCode> {
    let report = coordinator.sweep()?;

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for outcome in &report.migrated {
            if let MigrationOutcome::Migrated { old_name, new_name, .. } = outcome {
                println!("Migrated {old_name} to {new_name}");
            }
        }
        for failed in &report.failed {
            eprintln!("Error: migration of {} failed: {}", failed.name, failed.error);
        }
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

pub(crate) fn uninstall(coordinator: &TriggerCoordinator, args: &ArgMatches) -> Result<ExitCode> {
    let name = args
        .get_one::<String>("name")
        .context("missing formula name")?;
    let report = coordinator.uninstall(name)?;

    println!("Uninstalled {}", report.keg);
    for alias in &report.removed_aliases {
        println!("Removed alias {}", alias.display());
    }
    Ok(ExitCode::SUCCESS)
}

pub(crate) fn renames(coordinator: &TriggerCoordinator, args: &ArgMatches) -> Result<ExitCode> {
    let maps = coordinator.renames()?;

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&maps)?);
    } else {
        for (authority, map) in maps.iter() {
            for (old_name, new_name) in map {
                println!("{authority}: {old_name} -> {new_name}");
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

pub(crate) fn list(coordinator: &TriggerCoordinator, args: &ArgMatches) -> Result<ExitCode> {
    let installed = coordinator.installed()?;

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&installed)?);
    } else {
        for receipt in &installed {
            println!(
                "{} {} ({})",
                receipt.installed_name(),
                receipt.version,
                receipt.source_authority()
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}
