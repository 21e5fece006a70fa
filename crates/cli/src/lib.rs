pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "leavewise",
    about = "Leavewise operator CLI",
    long_about = "Inspect Leavewise configuration, check runtime readiness, and resolve leave requests from the terminal.",
    after_help = "Examples:\n  leavewise doctor --json\n  leavewise config\n  leavewise ask \"Can John Doe take a leave on Feb 10th?\""
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, policy document discovery, and gateway readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Resolve one leave request from the terminal")]
    Ask {
        #[arg(help = "The free-text leave request")]
        query: String,
        #[arg(long, help = "Employee id to use when the directory returns several candidates")]
        employee_id: Option<i64>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Ask { query, employee_id } => commands::ask::run(&query, employee_id),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
