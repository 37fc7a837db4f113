//! Api command - raw requests through the authenticated client.
//!
//! Useful for endpoints without a dedicated command. The request gets the
//! same bearer token and refresh-on-401 handling as every other call.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Args, ValueEnum};
use csapp_client::{ApiRequest, FilePart};
use reqwest::Method;
use serde_json::Value;

use super::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

/// Arguments for the api command.
#[derive(Args, Debug)]
pub struct ApiArgs {
    /// HTTP method
    #[arg(value_enum, ignore_case = true)]
    pub method: HttpMethod,

    /// Path relative to the API base URL (e.g. admin/clients/)
    pub path: String,

    /// JSON request body
    #[arg(short, long, conflicts_with = "file")]
    pub data: Option<String>,

    /// Upload a file as multipart form data
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Query parameters as key=value
    #[arg(short, long = "query", value_parser = parse_pair)]
    pub query: Vec<(String, String)>,
}

fn parse_pair(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))
}

/// Build the request described by the arguments.
async fn build_request(args: &ApiArgs) -> Result<ApiRequest> {
    let path = args.path.trim_start_matches('/');
    let mut request = ApiRequest::new(args.method.into(), path);

    if !args.query.is_empty() {
        let query: BTreeMap<&str, &str> = args
            .query
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        request = request.query(&query)?;
    }
    if let Some(data) = &args.data {
        let body: Value = serde_json::from_str(data).context("--data is not valid JSON")?;
        request = request.json(&body)?;
    }
    if let Some(file) = &args.file {
        request = request.file(FilePart::from_path(file).await?);
    }
    Ok(request)
}

/// Run the api command.
pub async fn run(args: ApiArgs, ctx: &Context) -> Result<()> {
    let request = build_request(&args).await?;
    tracing::debug!(method = ?args.method, path = %args.path, "Raw API request");

    let client = ctx.client()?;
    let response: Value = client.send(request).await?;

    if response.is_null() {
        if !ctx.json_output {
            println!("(no content)");
        }
        return Ok(());
    }
    ctx.print_json(&response)
}
