//! faceauth CLI - face-recognition login in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use faceauth_core::ContextOptions;

mod commands;
mod output;
mod shell;

use commands::{app, config, doctor, health, login, logout, logs, register, whoami};

/// faceauth - password and face login against a recognition backend
#[derive(Parser)]
#[command(name = "faceauth", version, about, long_about = None)]
struct Cli {
    /// Backend base URL (overrides settings and FACEAUTH_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Use this image file as the camera
    #[arg(long, global = true)]
    image: Option<PathBuf>,

    /// Camera device to open
    #[arg(long, global = true)]
    device: Option<String>,

    /// Do not persist the session to disk
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Show debug logs and detailed output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive login / register / dashboard app
    App,

    /// Create an account with a face photo
    Register {
        /// Username (prompted if omitted)
        #[arg(short, long)]
        username: Option<String>,
        /// Email (prompted if omitted)
        #[arg(short, long)]
        email: Option<String>,
        /// Password (else FACEAUTH_PASSWORD or a prompt)
        #[arg(short, long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Log in with a password or your face
    Login {
        /// Log in with a camera capture instead of a password
        #[arg(long)]
        face: bool,
        /// Username (prompted if omitted)
        #[arg(short, long)]
        username: Option<String>,
        /// Password (else FACEAUTH_PASSWORD or a prompt)
        #[arg(short, long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the signed-in user
    Whoami {
        /// Fetch the profile from the backend first
        #[arg(long)]
        refresh: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Forget the signed-in user
    Logout,

    /// Check that the backend is reachable
    Health {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check configuration, backend, camera and session
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("FACEAUTH_LOG")
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let options = ContextOptions {
        api_url: cli.api_url,
        image: cli.image,
        device: cli.device,
        ephemeral: cli.ephemeral,
    };

    match cli.command {
        Commands::App => app::run(&options),
        Commands::Register { username, email, password, json } => register::run(
            &options,
            register::RegisterArgs { username, email, password, json },
        ),
        Commands::Login { face, username, password, json } => login::run(&options, face, username, password, json),
        Commands::Whoami { refresh, json } => whoami::run(&options, refresh, json),
        Commands::Logout => logout::run(&options),
        Commands::Health { json } => health::run(&options, json),
        Commands::Doctor { json } => doctor::run(&options, cli.verbose, json),
        Commands::Logs { command } => logs::run(command),
        Commands::Config { command } => config::run(command),
    }
}
