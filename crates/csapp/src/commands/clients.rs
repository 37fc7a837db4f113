//! Clients command - client management for admins.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::Style;
use csapp_types::PageQuery;

use super::{Context, heading, label};

/// Arguments for the clients command.
#[derive(Args, Debug)]
pub struct ClientsArgs {
    #[command(subcommand)]
    pub command: ClientsCommand,
}

#[derive(Subcommand, Debug)]
pub enum ClientsCommand {
    /// List clients
    List {
        /// Page number (1-based)
        #[arg(short, long)]
        page: Option<u32>,

        /// Page size
        #[arg(long)]
        per_page: Option<u32>,

        /// Filter by status (active, inactive, defaulter)
        #[arg(short, long)]
        status: Option<String>,

        /// Search by name, email or document
        #[arg(long)]
        search: Option<String>,
    },
}

/// Run the clients command.
pub async fn run(args: ClientsArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;

    match args.command {
        ClientsCommand::List {
            page,
            per_page,
            status,
            search,
        } => {
            let query = PageQuery {
                page,
                per_page,
                status,
                search,
            };
            let clients = client.clients().list(&query).await?;

            if ctx.json_output {
                return ctx.print_json(&clients);
            }

            let dim = Style::new().dim();
            let red = Style::new().red();

            heading("Clients");
            println!();
            if clients.items.is_empty() {
                println!("{}", dim.apply_to("No clients found"));
            }
            for c in &clients.items {
                let status = label(&c.status);
                let status = if status == "defaulter" {
                    red.apply_to(status).to_string()
                } else {
                    dim.apply_to(status).to_string()
                };
                println!(
                    "{} {:<30} {:<28} {}",
                    dim.apply_to(format!("[{}]", short_id(&c.id))),
                    c.full_name,
                    c.email,
                    status
                );
            }
            println!();
            println!(
                "{}",
                dim.apply_to(format!(
                    "Page {} of {} ({} total)",
                    clients.page,
                    clients.pages.max(1),
                    clients.total
                ))
            );
        }
    }

    Ok(())
}

/// First eight characters of an id.
pub(crate) fn short_id(id: &str) -> &str {
    id.char_indices().nth(8).map_or(id, |(i, _)| &id[..i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }
}
