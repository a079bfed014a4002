pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use zarigani_core::config::LoadOptions;

#[derive(Debug, Parser)]
#[command(
    name = "zarigani",
    about = "Zarigani operator CLI",
    long_about = "Inspect configuration, check runtime readiness, and audit the image catalog.",
    after_help = "Examples:\n  zarigani doctor --json\n  zarigani config\n  zarigani catalog verify"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Config file to read instead of zarigani.toml")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, catalog readability, and image files")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(subcommand, about = "Read-only catalog tools")]
    Catalog(CatalogCommand),
}

#[derive(Debug, Subcommand)]
enum CatalogCommand {
    #[command(about = "List catalog records")]
    List {
        #[arg(long, help = "Emit the records as a JSON array")]
        json: bool,
    },
    #[command(about = "Check ids, file names, tags, and image files for consistency")]
    Verify,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = LoadOptions {
        require_file: cli.config.is_some(),
        config_path: cli.config,
        ..LoadOptions::default()
    };

    let result = match cli.command {
        Command::Config => commands::CommandResult {
            exit_code: 0,
            output: commands::config::run(&options),
        },
        Command::Doctor { json } => commands::doctor::run(&options, json),
        Command::Catalog(CatalogCommand::List { json }) => {
            commands::catalog::list(&options, json)
        }
        Command::Catalog(CatalogCommand::Verify) => commands::catalog::verify(&options),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
