//! Serve command - run the browser gateway.

use std::net::SocketAddr;

use anyhow::{Context as _, Result};
use clap::Args;
use console::{Style, style};
use csapp_client::ApiClient;
use csapp_web::{Server, ServerConfig};

use super::Context;

/// Arguments for the serve command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind to (overrides [web].bind_address)
    #[arg(short, long)]
    pub bind: Option<SocketAddr>,

    /// Mark token cookies Secure (overrides config)
    #[arg(long)]
    pub secure_cookies: bool,
}

/// Run the serve command.
pub async fn run(args: ServeArgs, ctx: &Context) -> Result<()> {
    let mut config = ServerConfig::from_config(&ctx.config)?;
    if let Some(addr) = args.bind {
        config = config.with_bind_address(addr);
    }
    if args.secure_cookies {
        config = config.with_secure_cookies(true);
    }

    // Tokens live in each browser's cookies, never in the token file.
    let client = ApiClient::builder()
        .base_url(&ctx.api_url)
        .timeout(ctx.config.api_timeout())
        .build()?;

    let server = Server::new(client, config);

    if !ctx.json_output {
        let dim = Style::new().dim();
        println!("{}", style("CSApp Gateway").bold());
        println!("  {} http://{}", dim.apply_to("Listening:"), server.bind_address());
        println!("  {} {}", dim.apply_to("Backend:"), ctx.api_url);
        println!();
    }

    server.run().await.context("Gateway stopped")
}
