//! stream-probe — resoluce jednoho zápasu na kandidátní streamy
//!
//! Co dělá:
//!   1. Dohledá zápas podle id (strict; volitelně loose přes titulek)
//!   2. Paralelně vytáhne streamy ze všech zdrojů zápasu
//!   3. Vytiskne kandidáty, první použitelný označí jako aktivní
//!
//! Spuštění:
//!   cargo run --bin stream-probe -- <matchId> [source:id,source:id]
//!   STREAMISKO_LOOSE_LOOKUP=1 cargo run --bin stream-probe -- "arsenal"
//!   STREAM_PROBE_RETRIES=2 cargo run --bin stream-probe -- uefa-1

use anyhow::{bail, Result};
use catalog_client::{CatalogClient, SourceRef, Stream, DEFAULT_API_BASE, DEFAULT_ASSET_BASE};
use dotenv::dotenv;
use std::env;
use std::sync::Arc;
use stream_resolver::{ResolutionState, StreamSession};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// "alpha:123,bravo:9" → source refy; kusy bez dvojtečky se zahazují
fn parse_source_refs(raw: &str) -> Vec<SourceRef> {
    raw.split(',')
        .filter_map(|pair| {
            let (source, id) = pair.split_once(':')?;
            if source.is_empty() || id.is_empty() {
                return None;
            }
            Some(SourceRef { source: source.to_string(), id: id.to_string() })
        })
        .collect()
}

fn stream_line(s: &Stream, active: bool) -> String {
    format!(
        "{} {:<12} stream {}  {}  {}  {}",
        if active { "▶" } else { " " },
        s.key(),
        s.stream_no,
        if s.hd { "HD" } else { "SD" },
        s.language.as_deref().unwrap_or("Unknown"),
        s.embed_url,
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let match_id = match args.first() {
        Some(id) => id.clone(),
        None => bail!("usage: stream-probe <matchId> [source:id,source:id]"),
    };
    let fallback = args.get(1).map(|raw| parse_source_refs(raw)).unwrap_or_default();

    let api_base = env::var("STREAMISKO_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
    let asset_base =
        env::var("STREAMISKO_ASSET_BASE").unwrap_or_else(|_| DEFAULT_ASSET_BASE.to_string());
    let log_dir = env::var("STREAMISKO_LOG_DIR").unwrap_or_else(|_| "logs".to_string());
    let loose = env::var("STREAMISKO_LOOSE_LOOKUP").ok().as_deref() == Some("1");
    let max_retries: u32 = env::var("STREAM_PROBE_RETRIES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    info!("=== Streamisko Stream Probe ===");
    info!("Match: {match_id} (fallback refs: {})", fallback.len());

    let client = Arc::new(CatalogClient::new(api_base, asset_base));
    let session = StreamSession::new(client, log_dir).with_loose_lookup(loose);

    let mut state = session.activate(&match_id, &fallback).await;
    while matches!(state, ResolutionState::Error { .. }) && session.retry_count() < max_retries {
        warn!("resolution failed, retrying ({}/{max_retries})", session.retry_count() + 1);
        state = session.retry(&match_id, &fallback).await;
    }

    match state {
        ResolutionState::Ready { match_details, streams, active } => {
            println!("{} [{}]", match_details.title, match_details.category);
            if streams.is_empty() {
                // Platný koncový stav — zápas prostě teď nevysílá
                println!("No streams available — no active broadcasts for this match.");
            } else {
                for s in &streams {
                    let is_active = active.as_ref() == Some(s);
                    println!("{}", stream_line(s, is_active));
                }
            }
            Ok(())
        }
        ResolutionState::Error { message } => {
            eprintln!("Error: {message}");
            std::process::exit(1);
        }
        ResolutionState::Idle | ResolutionState::Loading => {
            // Po dokončené aktivaci sem nelze dojít
            Ok(())
        }
    }
}
