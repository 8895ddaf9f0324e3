use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use saml_sso_server::config::ServerConfig;
use saml_sso_server::{logging, server};

/// SAML SSO demo host
#[derive(Parser)]
#[command(name = "saml-sso-server", version, about, long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Run,

    /// Print the resolved configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = ServerConfig::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Check => {
            println!("{}", serde_json::to_string_pretty(&cfg)?);
            Ok(())
        }
        Commands::Run => {
            logging::init_logging(&cfg.logging)?;
            tracing::info!(bind_addr = %cfg.bind_addr, "starting saml-sso-server");

            let app = server::build(&cfg).await?;
            server::serve(&cfg, app.router).await
        }
    }
}
