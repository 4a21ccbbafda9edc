// householder CLI - household account cleanup against the contact directory

mod exit_codes;
mod logging;
mod pipeline;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use householder_directory::{CredentialFlags, DirectoryError};

use exit_codes::{
    directory_exit_code, EXIT_ERROR, EXIT_IO, EXIT_RULES, EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "householder")]
#[command(about = "Canonicalize household accounts and link household members in the contact directory")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error, off). Defaults to RUST_LOG, then info.
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Directory credentials. Each falls back to its environment variable.
#[derive(Args, Debug, Default)]
struct DirectoryArgs {
    /// Airtable access token [env: AIRTABLE_ACCESS_TOKEN]
    #[arg(long, value_name = "TOKEN")]
    token: Option<String>,

    /// Airtable base id [env: AIRTABLE_BASE_ID]
    #[arg(long, value_name = "BASE_ID")]
    base: Option<String>,

    /// Contacts table id [env: AIRTABLE_CONTACTS_TABLE_ID]
    #[arg(long, value_name = "TABLE_ID")]
    table: Option<String>,
}

impl From<DirectoryArgs> for CredentialFlags {
    fn from(args: DirectoryArgs) -> Self {
        CredentialFlags {
            token: args.token,
            base_id: args.base,
            table_id: args.table,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize, group, infer occupants and write affiliations
    #[command(after_help = "\
Examples:
  householder run household-accounts.csv -o household-contact-import.csv
  householder run accounts.csv -o out.csv --dry-run --json
  householder run accounts.csv -o out.csv --offline --rules rules.toml
  householder run accounts.csv -o out.csv --summary summary.json")]
    Run {
        /// Household accounts CSV (First Name, Last Name, Name, Account Name)
        input: PathBuf,

        /// Contact import CSV to write
        #[arg(long, short = 'o')]
        output: PathBuf,

        /// Rules TOML overriding suffix, markers, separators or conjunction
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Do not contact the directory (no matches, no writes)
        #[arg(long)]
        offline: bool,

        /// Load the directory but never write affiliations
        #[arg(long)]
        dry_run: bool,

        /// Print the run summary as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write the run summary as JSON to a file
        #[arg(long, value_name = "FILE")]
        summary: Option<PathBuf>,

        #[command(flatten)]
        directory: DirectoryArgs,
    },

    /// Normalize and group only; never touches the directory
    #[command(after_help = "\
Examples:
  householder canonicalize accounts.csv -o canonical.csv")]
    Canonicalize {
        /// Household accounts CSV
        input: PathBuf,

        /// CSV to write
        #[arg(long, short = 'o')]
        output: PathBuf,

        /// Rules TOML
        #[arg(long)]
        rules: Option<PathBuf>,
    },

    /// Load the contact directory and report what was found
    Contacts {
        /// Output JSON to stdout instead of a human summary
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        directory: DirectoryArgs,
    },

    /// Rules file commands
    #[command(subcommand)]
    Rules(RulesCommands),
}

#[derive(Subcommand)]
enum RulesCommands {
    /// Parse and validate a rules file without running
    Validate {
        /// Rules TOML file
        file: PathBuf,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  householder-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    dotenv::dotenv().ok();

    let _logger = match logging::init_logging(cli.log_level.as_deref()) {
        Ok(handle) => handle,
        Err(message) => {
            eprintln!("error: {}", message);
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let result = match cli.command {
        Commands::Run {
            input,
            output,
            rules,
            offline,
            dry_run,
            json,
            summary,
            directory,
        } => pipeline::cmd_run(pipeline::RunOptions {
            input,
            output,
            rules,
            offline,
            dry_run,
            json,
            summary,
            credentials: directory.into(),
        }),
        Commands::Canonicalize { input, output, rules } => {
            pipeline::cmd_canonicalize(input, output, rules)
        }
        Commands::Contacts { json, directory } => pipeline::cmd_contacts(directory.into(), json),
        Commands::Rules(RulesCommands::Validate { file }) => pipeline::cmd_rules_validate(file),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn rules(msg: impl Into<String>) -> Self {
        Self { code: EXIT_RULES, message: msg.into(), hint: None }
    }

    /// Create error from a directory error with the registry exit code.
    pub fn directory(err: DirectoryError) -> Self {
        let code = directory_exit_code(&err);
        let hint = match &err {
            DirectoryError::MissingConfig { .. } => {
                Some("set it in the environment or a .env file, or use --offline".to_string())
            }
            DirectoryError::Auth { .. } => {
                Some("check that the token can read and write the contacts table".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<DirectoryError> for CliError {
    fn from(err: DirectoryError) -> Self {
        CliError::directory(err)
    }
}
