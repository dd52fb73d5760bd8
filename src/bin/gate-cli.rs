use std::path::PathBuf;
use std::process::ExitCode;

use admin_gate::access::{Decision, GateSnapshot};
use admin_gate::config::{load_config, GateConfig};
use axum::http::{header, HeaderMap, HeaderValue};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "gate-cli")]
#[command(about = "Management CLI for the admin access gate", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate a config file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the gate decision for a request path
    Check {
        /// Config file; built-in defaults when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Request path, e.g. /dashboard
        path: String,

        /// Raw Cookie header to evaluate with
        #[arg(long)]
        cookie: Option<String>,

        /// Treat the session credential as present
        #[arg(long)]
        credential: bool,
    },
    /// Query a running gate's health endpoint
    Status {
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config } => match load_config(&config) {
            Ok(_) => {
                println!("{}: ok", config.display());
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                eprintln!("{}: {}", config.display(), e);
                Ok(ExitCode::FAILURE)
            }
        },
        Commands::Check {
            config,
            path,
            cookie,
            credential,
        } => {
            let config = match config {
                Some(p) => load_config(&p)?,
                None => GateConfig::default(),
            };
            let snapshot = GateSnapshot::from_config(&config);

            let mut headers = HeaderMap::new();
            if let Some(cookie) = cookie {
                headers.insert(header::COOKIE, HeaderValue::from_str(&cookie)?);
            }

            let report = check_report(&snapshot, &path, &headers, credential);
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Status { url } => {
            let res = reqwest::get(format!("{}/api/health", url.trim_end_matches('/'))).await?;
            print_response(res).await
        }
    }
}

fn check_report(snapshot: &GateSnapshot, path: &str, headers: &HeaderMap, force: bool) -> Value {
    if !snapshot.matcher.should_gate(path) {
        return json!({ "path": path, "gated": false, "decision": "allow" });
    }

    let present = force || snapshot.probe.is_present(headers);
    match snapshot.evaluator.evaluate(path, present) {
        Decision::Allow => json!({
            "path": path,
            "gated": true,
            "credential_present": present,
            "public": snapshot.evaluator.is_public(path),
            "decision": "allow",
        }),
        Decision::Redirect(location) => json!({
            "path": path,
            "gated": true,
            "credential_present": present,
            "public": false,
            "decision": "redirect",
            "location": location,
            "status": snapshot.redirect_status,
        }),
    }
}

async fn print_response(res: reqwest::Response) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gate returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(ExitCode::FAILURE);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(ExitCode::SUCCESS)
}
