//! Jednosměrná projekce browse stavu do query stringu + restore z něj.
//! Drženo mimo filter/pagination engine — ty o URL nic nevědí.

use match_browse::BrowseState;
use reqwest::Url;

const BASE: &str = "http://streamisko.local/";

/// "search=arsenal&page=2" — persistuje se jen search a page
pub fn to_query(state: &BrowseState) -> String {
    let mut url = match Url::parse(BASE) {
        Ok(u) => u,
        Err(_) => return String::new(),
    };
    url.query_pairs_mut()
        .append_pair("search", &state.filter.search_term)
        .append_pair("page", &state.page.to_string());
    url.query().unwrap_or("").to_string()
}

/// Restore stavu z query stringu (reload scénář). Neznámé klíče se
/// ignorují, rozbitá page spadne na 1.
pub fn from_query(query: &str) -> BrowseState {
    let mut state = BrowseState::new();
    let raw = query.trim_start_matches('?');
    let url = match Url::parse(&format!("{BASE}?{raw}")) {
        Ok(u) => u,
        Err(_) => return state,
    };
    let mut page = state.page;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "search" => state.set_search(value.into_owned()),
            "page" => {
                if let Ok(p) = value.parse() {
                    page = p;
                }
            }
            _ => {}
        }
    }
    // Page až po search — set_search resetuje na 1
    state.set_page(page);
    state
}
