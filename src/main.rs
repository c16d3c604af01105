#![warn(clippy::all, clippy::pedantic)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use foliochat::{Config, gateway};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// `foliochat`: chat gateway for a personal portfolio site.
#[derive(Parser, Debug)]
#[command(name = "foliochat")]
#[command(version = "0.1.0")]
#[command(about = "Chat gateway that keeps the assistant credential server-side.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the chat gateway server
    Serve {
        /// Port to listen on (use 0 for a random available port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
    },

    /// Report which configuration fields are present (secrets are not echoed)
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install default crypto provider for Rustls TLS.
    // This prevents the error: "could not automatically determine the process-level CryptoProvider"
    // when both aws-lc-rs and ring features are available (or neither is explicitly selected).
    if let Err(e) = rustls::crypto::ring::default_provider().install_default() {
        eprintln!("Warning: Failed to install default crypto provider: {e:?}");
    }

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.gateway.host.clone());
            let port = port.unwrap_or(config.gateway.port);
            gateway::run_gateway(&host, port, config).await
        }
        Commands::CheckConfig => {
            report_config(&config);
            Ok(())
        }
    }
}

fn report_config(config: &Config) {
    let flag = |present: bool| if present { "configured" } else { "missing" };
    println!("api key:      {}", flag(config.api_key.is_some()));
    println!("assistant id: {}", flag(config.assistant_id.is_some()));
    println!("base url:     {}", config.base_url);
    println!(
        "bind:         {}:{}",
        config.gateway.host, config.gateway.port
    );
    println!(
        "polling:      every {} ms, {} attempts max",
        config.poll.interval_ms, config.poll.max_attempts
    );
}
