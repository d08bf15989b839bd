//! AAPS export command-line tool
//!
//! Usage:
//!   aaps-export-tool decrypt <file>     - Decrypt an encrypted export
//!   aaps-export-tool encrypt <file>     - Encrypt an unencrypted export
//!   aaps-export-tool format <file>      - Toggle preferences between string and object
//!   aaps-export-tool rehash <file>      - Recalculate the file hash
//!   aaps-export-tool verify <file>      - Check the file hash
//!   aaps-export-tool objectives <file>  - Mark objectives as completed

use aaps_export::ExportError;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod prompt;

use config::ToolConfig;

#[derive(Parser)]
#[command(name = "aaps-export-tool")]
#[command(about = "A CLI tool for exported AndroidAPS settings files")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decrypt an encrypted settings file
    Decrypt {
        /// Settings file
        file: PathBuf,
        #[command(flatten)]
        password: PasswordArgs,
        #[command(flatten)]
        output: OutputArgs,
        /// Store the preferences as a JSON object instead of a string
        #[arg(short = 'm', long, conflicts_with = "only_preferences")]
        preferences_object: bool,
        /// Write only the decrypted preferences
        #[arg(long)]
        only_preferences: bool,
    },

    /// Encrypt an unencrypted settings file
    Encrypt {
        /// Settings file
        file: PathBuf,
        #[command(flatten)]
        password: PasswordArgs,
        #[command(flatten)]
        output: OutputArgs,
        /// Salt as hex (random when omitted)
        #[arg(short, long)]
        salt: Option<String>,
    },

    /// Toggle the preferences between a JSON string and a JSON object
    Format {
        /// Settings file
        file: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Recalculate the file hash
    Rehash {
        /// Settings file
        file: PathBuf,
        /// Output file (defaults to the input file)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Check whether the file hash matches the content
    Verify {
        /// Settings file
        file: PathBuf,
    },

    /// Mark objectives as completed
    #[command(hide = true)]
    Objectives {
        /// Settings file
        file: PathBuf,
        #[command(flatten)]
        password: PasswordArgs,
        #[command(flatten)]
        output: OutputArgs,
        /// Objective numbers, comma separated (prompted when omitted)
        #[arg(short = 'j', long, value_delimiter = ',')]
        objectives: Option<Vec<u32>>,
    },
}

#[derive(Args)]
struct PasswordArgs {
    /// Master password
    #[arg(short, long, env = "AAPS_EXPORT_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Args)]
struct OutputArgs {
    /// Output file
    #[arg(short, long, conflicts_with = "console")]
    out: Option<PathBuf>,
    /// Print the result instead of writing a file
    #[arg(short, long)]
    console: bool,
}

fn init_logging(verbose: bool, config: &ToolConfig) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match ToolConfig::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(cli.verbose, &config);

    let result = match cli.command {
        Commands::Decrypt {
            file,
            password,
            output,
            preferences_object,
            only_preferences,
        } => commands::decrypt(
            &config,
            &file,
            password.password,
            output.target(),
            commands::DecryptMode::from_flags(preferences_object, only_preferences),
        ),
        Commands::Encrypt {
            file,
            password,
            output,
            salt,
        } => commands::encrypt(&config, &file, password.password, output.target(), salt),
        Commands::Format { file, output } => commands::format(&file, output.target()),
        Commands::Rehash { file, out } => commands::rehash(&file, out),
        Commands::Verify { file } => commands::verify(&file),
        Commands::Objectives {
            file,
            password,
            output,
            objectives,
        } => commands::objectives(&config, &file, password.password, output.target(), objectives),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let wrong_password = e
                .downcast_ref::<ExportError>()
                .is_some_and(ExportError::is_authentication_failure);
            if wrong_password {
                eprintln!("Error: could not decrypt the file, the password is probably wrong");
            } else {
                eprintln!("Error: {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}

impl OutputArgs {
    fn target(self) -> commands::Target {
        if self.console {
            commands::Target::Console
        } else {
            commands::Target::File(self.out)
        }
    }
}
