//! match-browser — CLI prohlížečka zápasů z upstream katalogu
//!
//! Co dělá:
//!   1. Stáhne listing (all | live | <sportId>)
//!   2. Aplikuje search + date filtr (čistě client-side)
//!   3. Vytiskne jednu stránku + navigační okno stránek
//!   4. Stav promítne do query stringu (restorovatelný přes STREAMISKO_QUERY)
//!
//! Spuštění:
//!   cargo run --bin match-browser -- all "arsenal" 2
//!   STREAMISKO_DATE_FILTER=today cargo run --bin match-browser -- live
//!   STREAMISKO_QUERY="search=liga&page=3" cargo run --bin match-browser

mod browse_query;
mod render;

use anyhow::{Context, Result};
use catalog_client::{CatalogClient, MatchScope, DEFAULT_API_BASE, DEFAULT_ASSET_BASE};
use chrono::Local;
use dotenv::dotenv;
use match_browse::{
    filter_matches, page_window, paginate, total_pages, BrowseState, DateFilter,
    MAX_VISIBLE_PAGES, PAGE_SIZE,
};
use std::env;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let api_base = env::var("STREAMISKO_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
    let asset_base =
        env::var("STREAMISKO_ASSET_BASE").unwrap_or_else(|_| DEFAULT_ASSET_BASE.to_string());

    let args: Vec<String> = env::args().skip(1).collect();
    let scope = args
        .first()
        .map(|s| MatchScope::from_arg(s))
        .unwrap_or(MatchScope::All);

    // Stav: nejdřív restore z query (reload scénář), pak explicitní args navrch
    let mut browse = match env::var("STREAMISKO_QUERY") {
        Ok(q) => browse_query::from_query(&q),
        Err(_) => BrowseState::new(),
    };
    if let Some(term) = args.get(1) {
        browse.set_search(term.clone());
    }
    if let Ok(raw) = env::var("STREAMISKO_DATE_FILTER") {
        match DateFilter::parse(&raw) {
            Some(f) => browse.set_date_filter(f),
            None => warn!("unknown date filter '{raw}', using 'all'"),
        }
    }
    if let Some(page) = args.get(2).and_then(|p| p.parse().ok()) {
        browse.set_page(page);
    }

    let client = CatalogClient::new(api_base, asset_base);

    info!("=== Streamisko Match Browser ===");
    if let MatchScope::Sport(id) = &scope {
        // Sport info je best-effort — listing jede i bez něj
        match client.sport_by_id(id).await {
            Ok(sport) => info!("Sport: {}", sport.name),
            Err(e) => warn!("sport info lookup failed: {e}"),
        }
    }

    let matches = client
        .list_matches(&scope)
        .await
        .context("match listing fetch failed")?;
    info!("Fetched {} matches", matches.len());

    let filtered = filter_matches(&matches, &browse.filter, Local::now());
    let total = total_pages(filtered.len(), PAGE_SIZE);
    let page_items = paginate(&filtered, browse.page, PAGE_SIZE);

    if page_items.is_empty() {
        if browse.filter.search_term.is_empty() {
            println!("No matches available at the moment.");
        } else {
            println!(
                "No matches found for \"{}\". Try adjusting your search or filters.",
                browse.filter.search_term
            );
        }
        return Ok(());
    }

    for m in page_items {
        println!("{}", render::match_line(m, &client));
    }

    println!();
    println!(
        "page {}/{} ({} matches)  {}",
        browse.page,
        total,
        filtered.len(),
        render::window_line(&page_window(browse.page, total, MAX_VISIBLE_PAGES), browse.page),
    );
    println!("state: ?{}", browse_query::to_query(&browse));

    Ok(())
}
