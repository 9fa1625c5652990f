use anyhow::Result;
use clap::{Parser, Subcommand};

use callsight::cli;

#[derive(Debug, Parser)]
#[command(name = "callsight")]
#[command(about = "Call-transcript analytics dashboard with causal-reasoning chat")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the embedded web dashboard
    Serve {
        /// Bind address (overrides [server].addr, default 127.0.0.1:8787)
        #[arg(long)]
        addr: Option<String>,
    },
    /// Show derived metrics for the loaded transcript
    Inspect {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Relay a single question to the reasoning backend
    Ask {
        /// The question to send
        #[arg(trailing_var_arg = true, required = true)]
        message: Vec<String>,
    },
    /// Fetch the causal analysis for a transcript via the proxy client
    Analysis {
        /// Transcript id (default: the loaded transcript's id)
        #[arg(long)]
        id: Option<String>,
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Check system health: backend, transcript, config, request log
    Health,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective (merged) configuration
    Show,
    /// Write a default config file to ~/.callsight/config.toml
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Set a single config value, e.g. `config set backend.base_url http://...`
    Set { key: String, value: String },
    /// Reset the global config file to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Serve { addr } => cli::run_serve(addr),
        Commands::Inspect { format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_inspect(fmt)
        }
        Commands::Ask { message } => {
            let message = message.join(" ");
            cli::run_ask(&message)
        }
        Commands::Analysis { id, format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_analysis(id, fmt)
        }
        Commands::Health => cli::run_health(),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
