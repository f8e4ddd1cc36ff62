//! Command-line interface for aquamon.
//!
//! This binary provides a CLI for querying and exercising the monitoring
//! daemon via the HTTP API.

use std::env;

use anyhow::{Result, bail};

use aquamon_service::api_client;
use aquamon_service::api_client::types::ReportRequest;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: aquamon-cli <command>");
        eprintln!();
        eprintln!("Commands:");
        eprintln!("  health                                    Check daemon liveness");
        eprintln!("  tanks                                     Show per-tank monitor status");
        eprintln!("  report <tds> <temperature> <turbidity> <ph>");
        eprintln!("                                            Generate a water-quality report");
        eprintln!();
        eprintln!("Environment:");
        eprintln!("  AQUAMON_API_URL    API base URL (default: http://127.0.0.1:5000)");
        std::process::exit(1);
    }

    let command = &args[1];

    match command.as_str() {
        "health" => cmd_health().await?,
        "tanks" => cmd_tanks().await?,
        "report" => cmd_report(&args[2..]).await?,
        _ => {
            eprintln!("Unknown command: {}", command);
            eprintln!("Run without arguments to see usage.");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Build an API client, honoring AQUAMON_API_URL if set.
fn make_client() -> api_client::Client {
    match env::var("AQUAMON_API_URL") {
        Ok(url) => api_client::Client::with_base_url(url),
        Err(_) => api_client::Client::new(),
    }
}

async fn cmd_health() -> Result<()> {
    let client = make_client();
    println!("{}", client.health().await?);
    Ok(())
}

/// Print a summary of every monitored tank.
async fn cmd_tanks() -> Result<()> {
    let client = make_client();
    let tanks = client.tanks().await?;

    if tanks.is_empty() {
        println!("Tanks: (no readings yet)");
        return Ok(());
    }

    println!("Tanks:");
    for tank in &tanks {
        let status = if tank.armed { "ALERT" } else { "ok" };
        println!("  - {}  level {}  [{}]", tank.source, tank.level, status);
    }

    Ok(())
}

/// Request a water-quality report for one sensor snapshot.
async fn cmd_report(args: &[String]) -> Result<()> {
    if args.len() != 4 {
        bail!("report requires <tds> <temperature> <turbidity> <ph>");
    }

    let mut values = [0.0f64; 4];
    for (slot, raw) in values.iter_mut().zip(args) {
        *slot = raw
            .parse()
            .map_err(|_| anyhow::anyhow!("not a number: {raw}"))?;
    }

    let client = make_client();
    let response = client
        .report(&ReportRequest {
            tds: Some(values[0]),
            temperature: Some(values[1]),
            turbidity: Some(values[2]),
            ph: Some(values[3]),
        })
        .await?;

    println!("{}", response.report);
    Ok(())
}
