//! Invoices command - the signed-in client's invoices.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::Style;
use csapp_types::PageQuery;

use super::{Context, clients::short_id, heading, label};

/// Arguments for the invoices command.
#[derive(Args, Debug)]
pub struct InvoicesArgs {
    #[command(subcommand)]
    pub command: InvoicesCommand,
}

#[derive(Subcommand, Debug)]
pub enum InvoicesCommand {
    /// List your invoices
    List {
        /// Page number (1-based)
        #[arg(short, long)]
        page: Option<u32>,

        /// Filter by status (pending, paid, overdue, cancelled)
        #[arg(short, long)]
        status: Option<String>,
    },
}

/// Run the invoices command.
pub async fn run(args: InvoicesArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;

    match args.command {
        InvoicesCommand::List { page, status } => {
            let query = PageQuery {
                page,
                status,
                ..Default::default()
            };
            let invoices = client.portal().invoices(&query).await?;

            if ctx.json_output {
                return ctx.print_json(&invoices);
            }

            let dim = Style::new().dim();
            let yellow = Style::new().yellow();

            heading("Invoices");
            println!();
            if invoices.items.is_empty() {
                println!("{}", dim.apply_to("No invoices found"));
            }
            for inv in &invoices.items {
                let status = label(&inv.status);
                let status = if status == "overdue" {
                    yellow.apply_to(status).to_string()
                } else {
                    status
                };
                println!(
                    "{} #{:<3} {:<12} {:>12} {}",
                    dim.apply_to(format!("[{}]", short_id(&inv.id))),
                    inv.installment_number,
                    inv.due_date,
                    inv.amount,
                    status
                );
            }
            println!();
            println!(
                "{}",
                dim.apply_to(format!(
                    "Page {} of {} ({} total)",
                    invoices.page,
                    invoices.pages.max(1),
                    invoices.total
                ))
            );
        }
    }

    Ok(())
}
