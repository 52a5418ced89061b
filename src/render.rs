//! Terminálový rendering zápasů a streamů (ekvivalent match karty)

use catalog_client::{CatalogClient, Match};
use chrono::{DateTime, Local, TimeZone};
use match_browse::PageItem;

fn local_dt(ms: i64) -> Option<DateTime<Local>> {
    Local.timestamp_millis_opt(ms).single()
}

/// "18:30"
pub fn format_time(ms: i64) -> String {
    local_dt(ms)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

/// "Mar 5"
pub fn format_date(ms: i64) -> String {
    local_dt(ms)
        .map(|dt| dt.format("%b %-d").to_string())
        .unwrap_or_else(|| "?".to_string())
}

/// Jedna řádka karty: čas, týmy/titulek, kategorie, poster URL
pub fn match_line(m: &Match, client: &CatalogClient) -> String {
    let versus = match m.teams.as_ref() {
        Some(teams) => {
            let home = teams.home.as_ref().map(|t| t.name.as_str()).unwrap_or("?");
            let away = teams.away.as_ref().map(|t| t.name.as_str()).unwrap_or("?");
            format!("{home} vs {away}")
        }
        None => m.title.clone(),
    };

    let mut line = format!(
        "{} {}  {:<45} [{}]  id={}",
        format_date(m.date),
        format_time(m.date),
        versus,
        m.category,
        m.id,
    );
    if let Some(poster) = &m.poster {
        line.push_str(&format!("  poster={}", client.poster_url(poster)));
    }
    line
}

/// "1 … 5 6 [7] 8 9 … 20"
pub fn window_line(items: &[PageItem], current: usize) -> String {
    let parts: Vec<String> = items
        .iter()
        .map(|item| match item {
            PageItem::Page(p) if *p == current => format!("[{p}]"),
            PageItem::Page(p) => p.to_string(),
            PageItem::Ellipsis => "…".to_string(),
        })
        .collect();
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use match_browse::page_window;

    #[test]
    fn window_line_marks_current_page() {
        let line = window_line(&page_window(7, 20, 5), 7);
        assert_eq!(line, "1 … 5 6 [7] 8 9 … 20");
    }
}
