//! simplessh: run a remote command or upload a file over SSH.
//!
//! Thin front end over `simplessh-client`: resolves flags and the config
//! file, opens and authenticates one session, performs one operation, and
//! always closes the session.

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use simplessh_client::SshError;
use tracing::error;

use commands::ConnectOpts;

/// simplessh: minimal SSH client
#[derive(Parser)]
#[command(name = "simplessh", version, about = "Run a remote command or upload a file over SSH")]
struct Cli {
    /// Server port (overrides the config file)
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Private key file for public key authentication
    #[arg(short = 'i', long = "identity", global = true)]
    identity: Option<PathBuf>,

    /// Connect timeout in seconds (overrides the config file)
    #[arg(short = 't', long = "timeout", global = true)]
    timeout: Option<u64>,

    /// Config file path
    #[arg(long = "config", global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute a command and print its output
    Exec {
        /// Target in [user@]host format
        target: String,
        /// Command to run
        #[arg(required = true, trailing_var_arg = true)]
        command: Vec<String>,
    },

    /// Upload a local file to [user@]host:path
    Send {
        /// Local file to upload
        local: PathBuf,
        /// Destination in [user@]host:path format
        destination: String,
        /// Remote permission bits (octal)
        #[arg(short, long, default_value = "644", value_parser = commands::send::parse_mode)]
        mode: u32,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing.
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("simplessh=debug,simplessh_cli=debug,simplessh_client=debug")
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("simplessh=warn,simplessh_cli=warn,simplessh_client=error")
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    // Load config file.
    let config_path = cli.config.clone().or_else(config::Config::default_path);
    let cfg = match config_path {
        Some(path) => config::Config::load(&path).unwrap_or_else(|e| {
            eprintln!("simplessh: {e:#}");
            config::Config::default()
        }),
        None => config::Config::default(),
    };

    // CLI flags override config values.
    let mut session = cfg.session.clone();
    if let Some(secs) = cli.timeout {
        session.connect_timeout_secs = secs;
    }
    let identity = cli.identity.clone().or_else(|| {
        let configured = cfg.default.identity.trim();
        (!configured.is_empty()).then(|| PathBuf::from(configured))
    });
    let opts = ConnectOpts {
        port: cli.port.unwrap_or(cfg.default.port),
        default_user: cfg.default.user.clone(),
        identity,
        session,
    };

    let result = match cli.command {
        Command::Exec { target, command } => {
            commands::exec::run(&target, &command.join(" "), &opts)
        }
        Command::Send {
            local,
            destination,
            mode,
        } => commands::send::run(&local, &destination, mode, &opts).map(|_| 0),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            let kind = e
                .chain()
                .find_map(|cause| cause.downcast_ref::<SshError>())
                .map(SshError::kind_name);
            error!(kind, "{:#}", e);
            match kind {
                Some(kind) => eprintln!("simplessh: {kind} error: {e:#}"),
                None => eprintln!("simplessh: {e:#}"),
            }
            std::process::exit(1);
        }
    }
}
