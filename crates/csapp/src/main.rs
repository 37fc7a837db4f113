//! CSApp - command line client for the subdivision management platform.
//!
//! Main entry point for the `csapp` CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{api, auth, clients, invoices, serve, whoami};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// CSApp - subdivision management from the terminal
#[derive(Parser)]
#[command(name = "csapp")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Backend API base URL (default: http://localhost:8000/api/v1)
    #[arg(long, global = true, env = "CSAPP_API_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in, sign up, sign out
    Auth(auth::AuthArgs),

    /// Show the signed-in user
    Whoami,

    /// Send a raw request through the authenticated client
    Api(api::ApiArgs),

    /// Client management (admin)
    Clients(clients::ClientsArgs),

    /// Your invoices (portal)
    Invoices(invoices::InvoicesArgs),

    /// Run the browser gateway
    Serve(serve::ServeArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config_dir = csapp_config::xdg_config_dir()
        .unwrap_or_else(|| std::path::PathBuf::from(".csapp"));

    // Console (human-readable) + rotating JSON file
    let filter = if cli.verbose {
        "csapp=debug,csapp_client=debug,csapp_session=debug,csapp_web=debug,csapp_config=debug,info"
    } else {
        "csapp=info,csapp_client=warn,csapp_session=warn,csapp_web=info,warn"
    };

    let file_appender = tracing_appender::rolling::daily(config_dir.join("logs"), "csapp.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "csapp=trace,csapp_client=trace,csapp_session=trace,csapp_web=trace,csapp_config=trace,info",
                )),
        )
        .init();

    let result = match commands::Context::load(config_dir, cli.api_url, cli.json, cli.verbose) {
        Ok(ctx) => dispatch(cli.command, &ctx).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        commands::report_error(&e);
        // Flush the file log before exiting.
        drop(guard);
        std::process::exit(1);
    }
}

async fn dispatch(command: Commands, ctx: &commands::Context) -> Result<()> {
    match command {
        Commands::Auth(args) => auth::run(args, ctx).await,
        Commands::Whoami => whoami::run(ctx).await,
        Commands::Api(args) => api::run(args, ctx).await,
        Commands::Clients(args) => clients::run(args, ctx).await,
        Commands::Invoices(args) => invoices::run(args, ctx).await,
        Commands::Serve(args) => serve::run(args, ctx).await,
    }
}
