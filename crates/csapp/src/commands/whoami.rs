//! Whoami command - show the signed-in user.

use anyhow::Result;
use console::Style;
use csapp_client::TokenStore;

use super::{Context, auth::describe, heading};

/// Run the whoami command.
pub async fn run(ctx: &Context) -> Result<()> {
    if !ctx.token_store().has_session() {
        anyhow::bail!("Not signed in. Run: csapp auth login --email <EMAIL>");
    }

    let (session, _) = ctx.session()?;
    session.initialize().await;

    // A failed profile fetch leaves no user; ask again for the real error.
    let Some(me) = session.user() else {
        session.client().auth().me().await?;
        anyhow::bail!("Not signed in");
    };

    if ctx.json_output {
        return ctx.print_json(&me);
    }

    let dim = Style::new().dim();
    heading("Signed In");
    println!();
    println!("  {}", describe(&me));
    if let Some(company) = &me.company_id {
        println!("  {} {}", dim.apply_to("Company:"), company);
    }
    if session.is_admin() {
        println!("  {} admin area", dim.apply_to("Access:"));
    } else {
        println!("  {} client portal", dim.apply_to("Access:"));
    }
    println!("  {} {}", dim.apply_to("Home:"), me.default_landing());
    println!();

    Ok(())
}
