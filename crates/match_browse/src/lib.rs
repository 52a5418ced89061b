//! Streamisko — Match Browse
//!
//! Čisté filtrování + stránkování nad staženým listingem zápasů.
//! Žádné I/O, žádný globální stav — vstup + FilterState dovnitř,
//! nová kolekce ven. Pořadí vstupu se vždy zachovává (žádný re-sort),
//! opakovaná aplikace stejného filtru je no-op.

use catalog_client::Match;
use chrono::{DateTime, Days, Local, LocalResult, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

/// Fixní velikost stránky listingu
pub const PAGE_SIZE: usize = 50;
/// Šířka navigačního okna stránek
pub const MAX_VISIBLE_PAGES: usize = 5;

// ── Filter ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFilter {
    #[default]
    All,
    Today,
    Upcoming,
}

impl DateFilter {
    pub fn parse(s: &str) -> Option<DateFilter> {
        match s {
            "all"      => Some(DateFilter::All),
            "today"    => Some(DateFilter::Today),
            "upcoming" => Some(DateFilter::Upcoming),
            _          => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DateFilter::All      => "all",
            DateFilter::Today    => "today",
            DateFilter::Upcoming => "upcoming",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub search_term: String,
    pub date_filter: DateFilter,
}

/// Půlnoc lokálního dne v epoch ms. DST přechody: při nejednoznačnosti
/// bereme dřívější instanci, při gapu UTC aproximaci.
fn local_midnight_ms(day: NaiveDate) -> i64 {
    let naive = match day.and_hms_opt(0, 0, 0) {
        Some(n) => n,
        None => return 0,
    };
    match naive.and_local_timezone(Local) {
        LocalResult::Single(dt)       => dt.timestamp_millis(),
        LocalResult::Ambiguous(dt, _) => dt.timestamp_millis(),
        LocalResult::None             => Local.from_utc_datetime(&naive).timestamp_millis(),
    }
}

/// (půlnoc dnes, půlnoc zítra) v epoch ms
fn local_day_bounds(now: DateTime<Local>) -> (i64, i64) {
    let today = now.date_naive();
    let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
    (local_midnight_ms(today), local_midnight_ms(tomorrow))
}

/// Search (case-insensitive substring na title) AND date bucket.
/// `now` se injektuje, aby funkce zůstala čistá a testovatelná.
pub fn filter_matches(matches: &[Match], state: &FilterState, now: DateTime<Local>) -> Vec<Match> {
    let needle = state.search_term.to_lowercase();
    let (today_start, tomorrow_start) = local_day_bounds(now);

    matches
        .iter()
        .filter(|m| needle.is_empty() || m.title.to_lowercase().contains(&needle))
        .filter(|m| match state.date_filter {
            DateFilter::All      => true,
            DateFilter::Today    => m.date >= today_start && m.date < tomorrow_start,
            DateFilter::Upcoming => m.date >= tomorrow_start,
        })
        .cloned()
        .collect()
}

/// Popular rail: jen zápasy od dnešní půlnoci dál (datum zaokrouhlené
/// na den — dnešní ranní zápas zůstává, včerejší ne).
pub fn from_today(matches: &[Match], now: DateTime<Local>) -> Vec<Match> {
    let (today_start, _) = local_day_bounds(now);
    matches.iter().filter(|m| m.date >= today_start).cloned().collect()
}

// ── Pagination ────────────────────────────────────────────────────────────────

/// Výřez [(page-1)*size, page*size) oříznutý na hranice kolekce.
/// Stránka mimo rozsah (page < 1 i page > total) = prázdný výřez, ne chyba.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page < 1 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = (start + page_size).min(items.len());
    &items[start..end]
}

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

/// Navigační okno: celé 1..=total když se vejde, jinak centrované okno
/// šířky max_visible kolem current, s "1 …" prefixem když okno začíná
/// za 2 a "… total" suffixem když končí před total-1.
pub fn page_window(current: usize, total: usize, max_visible: usize) -> Vec<PageItem> {
    if total == 0 || max_visible == 0 {
        return Vec::new();
    }
    if total <= max_visible {
        return (1..=total).map(PageItem::Page).collect();
    }

    let mut start = current.saturating_sub(max_visible / 2).max(1);
    let end = (start + max_visible - 1).min(total);
    if end - start < max_visible - 1 {
        start = end.saturating_sub(max_visible - 1).max(1);
    }

    let mut out = Vec::with_capacity(max_visible + 4);
    if start > 1 {
        out.push(PageItem::Page(1));
        if start > 2 {
            out.push(PageItem::Ellipsis);
        }
    }
    out.extend((start..=end).map(PageItem::Page));
    if end < total {
        if end < total - 1 {
            out.push(PageItem::Ellipsis);
        }
        out.push(PageItem::Page(total));
    }
    out
}

// ── Browse state ──────────────────────────────────────────────────────────────

/// Filtr + stránka jako jeden stav. Invariant: změna search termu nebo
/// date filtru (= nová identita filtrované množiny) resetuje stránku
/// na 1; explicitní změna stránky filtr nechává být.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowseState {
    pub filter: FilterState,
    pub page:   usize,
}

impl Default for BrowseState {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowseState {
    pub fn new() -> Self {
        Self { filter: FilterState::default(), page: 1 }
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.filter.search_term = term.into();
        self.page = 1;
    }

    pub fn set_date_filter(&mut self, filter: DateFilter) {
        self.filter.date_filter = filter;
        self.page = 1;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_client::Match;

    fn mk_match(id: &str, title: &str, date: i64) -> Match {
        Match {
            id:       id.to_string(),
            title:    title.to_string(),
            category: "football".to_string(),
            date,
            poster:   None,
            teams:    None,
            sources:  Vec::new(),
        }
    }

    fn fixed_now() -> DateTime<Local> {
        // Ne-DST den ve většině zón
        match Local.with_ymd_and_hms(2025, 3, 5, 15, 0, 0) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
            LocalResult::None => panic!("invalid test datetime"),
        }
    }

    #[test]
    fn empty_search_and_all_filter_is_identity() {
        let now = fixed_now();
        let matches = vec![
            mk_match("1", "Arsenal vs Chelsea", now.timestamp_millis()),
            mk_match("2", "Sparta vs Slavia", now.timestamp_millis() + 86_400_000),
        ];
        let state = FilterState::default();
        assert_eq!(filter_matches(&matches, &state, now), matches);
    }

    #[test]
    fn search_is_case_insensitive_substring_on_title() {
        let now = fixed_now();
        let matches = vec![
            mk_match("1", "Arsenal vs Chelsea", now.timestamp_millis()),
            mk_match("2", "Sparta vs Slavia", now.timestamp_millis()),
            mk_match("3", "ARSENAL Reserves", now.timestamp_millis()),
        ];
        let state = FilterState { search_term: "arsenal".to_string(), date_filter: DateFilter::All };
        let out = filter_matches(&matches, &state, now);
        let ids: Vec<&str> = out.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn filter_is_idempotent_and_preserves_input_order() {
        let now = fixed_now();
        let matches = vec![
            mk_match("z", "Zebra Cup", now.timestamp_millis()),
            mk_match("a", "Alpha Cup", now.timestamp_millis() + 1000),
            mk_match("m", "Mid Cup", now.timestamp_millis() + 2000),
        ];
        let state = FilterState { search_term: "cup".to_string(), date_filter: DateFilter::Today };
        let once = filter_matches(&matches, &state, now);
        let twice = filter_matches(&once, &state, now);
        assert_eq!(once, twice);
        let ids: Vec<&str> = once.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a", "m"]); // vstupní pořadí, žádný sort
    }

    #[test]
    fn today_and_upcoming_buckets_split_on_local_midnights() {
        let now = fixed_now();
        let yesterday = mk_match("y", "Old Game", now.timestamp_millis() - 86_400_000);
        let today = mk_match("t", "Today Game", now.timestamp_millis());
        let tomorrow = mk_match("u", "Tomorrow Game", now.timestamp_millis() + 86_400_000);
        let matches = vec![yesterday, today, tomorrow];

        let today_out = filter_matches(
            &matches,
            &FilterState { search_term: String::new(), date_filter: DateFilter::Today },
            now,
        );
        assert_eq!(today_out.len(), 1);
        assert_eq!(today_out[0].id, "t");

        let upcoming_out = filter_matches(
            &matches,
            &FilterState { search_term: String::new(), date_filter: DateFilter::Upcoming },
            now,
        );
        assert_eq!(upcoming_out.len(), 1);
        assert_eq!(upcoming_out[0].id, "u");
    }

    #[test]
    fn from_today_keeps_todays_morning_game_drops_yesterday() {
        let now = fixed_now();
        let (today_start, _) = local_day_bounds(now);
        let matches = vec![
            mk_match("y", "Yesterday", today_start - 3_600_000),
            mk_match("m", "This Morning", today_start + 600_000),
            mk_match("u", "Tomorrow", today_start + 100_000_000),
        ];
        let out = from_today(&matches, now);
        let ids: Vec<&str> = out.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m", "u"]);
    }

    #[test]
    fn paginate_clips_to_bounds_and_rejects_out_of_range() {
        let items: Vec<usize> = (0..120).collect();
        let page3 = paginate(&items, 3, 50);
        assert_eq!(page3.len(), 20);
        assert_eq!(page3[0], 100);
        assert_eq!(page3[19], 119);
        assert!(paginate(&items, 4, 50).is_empty());
        assert!(paginate(&items, 0, 50).is_empty());
        assert_eq!(total_pages(120, 50), 3);
        assert_eq!(total_pages(0, 50), 0);
    }

    #[test]
    fn page_window_small_total_lists_everything() {
        use PageItem::*;
        assert_eq!(page_window(1, 3, 5), vec![Page(1), Page(2), Page(3)]);
    }

    #[test]
    fn page_window_centers_and_adds_both_ellipses() {
        use PageItem::*;
        assert_eq!(
            page_window(7, 20, 5),
            vec![Page(1), Ellipsis, Page(5), Page(6), Page(7), Page(8), Page(9), Ellipsis, Page(20)],
        );
    }

    #[test]
    fn page_window_clamps_at_the_end() {
        use PageItem::*;
        assert_eq!(
            page_window(10, 10, 5),
            vec![Page(1), Ellipsis, Page(6), Page(7), Page(8), Page(9), Page(10)],
        );
    }

    #[test]
    fn page_window_start_edge_has_no_leading_ellipsis() {
        use PageItem::*;
        assert_eq!(
            page_window(1, 20, 5),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Ellipsis, Page(20)],
        );
    }

    #[test]
    fn browse_state_resets_page_on_filter_change_only() {
        let mut state = BrowseState::new();
        state.set_page(4);
        assert_eq!(state.page, 4);

        state.set_search("arsenal");
        assert_eq!(state.page, 1);

        state.set_page(3);
        state.set_date_filter(DateFilter::Today);
        assert_eq!(state.page, 1);

        state.set_page(0); // normalizace na 1
        assert_eq!(state.page, 1);
    }
}
