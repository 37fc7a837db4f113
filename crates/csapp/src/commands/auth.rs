//! Auth command - sign in, sign up, sign out and session status.

use std::io::BufRead;

use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use console::Style;
use csapp_client::TokenStore;
use csapp_types::{LoginRequest, Me, SignupRequest};
use serde::Serialize;

use super::{Context, heading};

/// Arguments for the auth command.
#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Sign in with email and password
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Read the password from stdin instead of prompting
        #[arg(long)]
        password_stdin: bool,
    },

    /// Register a company and its first admin
    Signup {
        /// Company display name
        #[arg(long)]
        company_name: String,

        /// Company URL slug
        #[arg(long)]
        company_slug: String,

        /// Admin's full name
        #[arg(long)]
        full_name: String,

        /// Admin's email
        #[arg(long)]
        email: String,

        /// Company CPF/CNPJ
        #[arg(long)]
        cpf_cnpj: String,

        /// Contact phone
        #[arg(long)]
        phone: String,

        /// Read the password from stdin instead of prompting
        #[arg(long)]
        password_stdin: bool,
    },

    /// Sign out and forget stored tokens
    Logout,

    /// Show stored session state (no network)
    Status,
}

/// Run the auth command.
pub async fn run(args: AuthArgs, ctx: &Context) -> Result<()> {
    match args.command {
        AuthCommand::Login {
            email,
            password_stdin,
        } => cmd_login(email, password_stdin, ctx).await,
        AuthCommand::Signup {
            company_name,
            company_slug,
            full_name,
            email,
            cpf_cnpj,
            phone,
            password_stdin,
        } => {
            let password = read_password(password_stdin)?;
            let request = SignupRequest {
                company_name,
                company_slug,
                full_name,
                email,
                password,
                cpf_cnpj,
                phone,
            };
            cmd_signup(&request, ctx).await
        }
        AuthCommand::Logout => cmd_logout(ctx).await,
        AuthCommand::Status => cmd_status(ctx),
    }
}

fn read_password(from_stdin: bool) -> Result<String> {
    let password = if from_stdin {
        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read password from stdin")?;
        line.trim_end_matches(['\r', '\n']).to_string()
    } else {
        rpassword::prompt_password("Password: ").context("Failed to read password")?
    };

    if password.is_empty() {
        anyhow::bail!("Password must not be empty");
    }
    Ok(password)
}

#[derive(Debug, Serialize)]
struct SignedIn<'a> {
    user: &'a Me,
    landing: &'a str,
}

fn print_signed_in(ctx: &Context, me: &Me, landing: &str) -> Result<()> {
    if ctx.json_output {
        return ctx.print_json(&SignedIn { user: me, landing });
    }

    let green = Style::new().green();
    let dim = Style::new().dim();
    println!(
        "{} Signed in as {} {}",
        green.apply_to("✓"),
        me.full_name,
        dim.apply_to(format!("({}, {})", me.email, me.role))
    );
    println!("  {} {}", dim.apply_to("Home:"), landing);
    Ok(())
}

async fn cmd_login(email: String, password_stdin: bool, ctx: &Context) -> Result<()> {
    let password = read_password(password_stdin)?;
    let (session, _) = ctx.session()?;

    let landing = session
        .login(&LoginRequest::new(email, password), None)
        .await?;
    match session.user() {
        Some(me) => print_signed_in(ctx, &me, &landing),
        None => anyhow::bail!("Signed in but no profile was returned"),
    }
}

async fn cmd_signup(request: &SignupRequest, ctx: &Context) -> Result<()> {
    let (session, _) = ctx.session()?;

    let landing = session.signup(request).await?;
    match session.user() {
        Some(me) => print_signed_in(ctx, &me, &landing),
        None => anyhow::bail!("Signed up but no profile was returned"),
    }
}

async fn cmd_logout(ctx: &Context) -> Result<()> {
    let store = ctx.token_store();
    if !store.has_session() {
        // Nothing to tell the backend; still remove any stale file.
        store.clear_tokens();
    } else {
        let (session, _) = ctx.session()?;
        session.logout().await;
    }

    if ctx.json_output {
        ctx.print_json(&serde_json::json!({ "signed_in": false }))
    } else {
        let green = Style::new().green();
        println!("{} Signed out", green.apply_to("✓"));
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct StatusOutput {
    signed_in: bool,
    token_file: String,
    access_expires_at: Option<DateTime<Utc>>,
    refresh_expires_at: Option<DateTime<Utc>>,
    api_url: String,
}

fn cmd_status(ctx: &Context) -> Result<()> {
    let store = ctx.token_store();
    let (access, refresh) = store.expiries();

    let output = StatusOutput {
        signed_in: store.has_session(),
        token_file: store.token_path().display().to_string(),
        access_expires_at: access,
        refresh_expires_at: refresh,
        api_url: ctx.api_url.clone(),
    };

    if ctx.json_output {
        return ctx.print_json(&output);
    }

    let green = Style::new().green();
    let red = Style::new().red();
    let dim = Style::new().dim();

    heading("Authentication Status");
    println!();
    if output.signed_in {
        println!("  {} {}", dim.apply_to("Session:"), green.apply_to("● signed in"));
    } else {
        println!("  {} {}", dim.apply_to("Session:"), red.apply_to("● not signed in"));
    }
    println!("  {} {}", dim.apply_to("API:"), output.api_url);
    if let Some(at) = output.access_expires_at {
        println!("  {} {}", dim.apply_to("Access expires:"), expiry(at));
    }
    if let Some(at) = output.refresh_expires_at {
        println!("  {} {}", dim.apply_to("Refresh expires:"), expiry(at));
    }
    if ctx.verbose {
        println!("  {} {}", dim.apply_to("Token file:"), output.token_file);
    }
    if !output.signed_in {
        println!();
        println!("  {}", dim.apply_to("Sign in with: csapp auth login --email <EMAIL>"));
    }
    println!();

    Ok(())
}

fn expiry(at: DateTime<Utc>) -> String {
    let remaining = at - Utc::now();
    if remaining <= chrono::Duration::zero() {
        format!("{} (expired)", at.format("%Y-%m-%d %H:%M UTC"))
    } else if remaining.num_hours() >= 24 {
        format!("in {}d", remaining.num_days())
    } else {
        format!("in {}m", remaining.num_minutes())
    }
}

/// One-line user summary.
pub(crate) fn describe(me: &Me) -> String {
    format!("{} <{}> {}", me.full_name, me.email, me.role)
}
