//! Command line definition

use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;

pub(crate) fn build() -> Command {
    Command::new("keg-migrate")
        .version(keg_core::VERSION)
        .about("Migrate installed formulae to their renamed identities")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("prefix")
                .long("prefix")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Installation prefix; every path defaults under it"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML file with engine paths"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("Increase log detail (-v debug, -vv trace)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("migrate")
                .about("Migrate one installed formula (manual trigger)")
                .arg(
                    Arg::new("name")
                        .required(true)
                        .help("Formula name, optionally qualified as owner/repo/name or core/name"),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Print the decision without touching the cellar"),
                )
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("update")
                .about("Migrate every installed formula after a catalog sync (automatic trigger)")
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("uninstall")
                .about("Remove an installed formula and every alias of it")
                .arg(Arg::new("name").required(true).help("Installed name or alias")),
        )
        .subcommand(
            Command::new("renames")
                .about("List rename declarations per authority")
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("list")
                .about("List installed formulae")
                .arg(json_flag()),
        )
}

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON")
}
