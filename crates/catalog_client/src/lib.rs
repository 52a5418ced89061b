//! Streamisko — Catalog Client
//!
//! Typovaný wrapper nad upstream JSON API (sports / matches / streams).
//! Jedno volání = jedna request, žádné built-in retry — retry je věc
//! orchestrátoru. Všechna selhání se vrací jako `CatalogError`, nikdy
//! se nepropaguje panic ani surová reqwest chyba.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "https://streamed.su/api";
pub const DEFAULT_ASSET_BASE: &str = "https://streamed.su";

const REQUEST_TIMEOUT_SECS: u64 = 10;

// ── Data model ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    #[serde(default)]
    pub badge: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Teams {
    #[serde(default)]
    pub home: Option<Team>,
    #[serde(default)]
    pub away: Option<Team>,
}

/// Ukazatel na záznam zápasu u jednoho providera.
/// Dedup klíč je celý pár (source, id) — stejný provider se může
/// objevit vícekrát s různými idčky.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef {
    pub source: String,
    pub id:     String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id:       String,
    pub title:    String,
    #[serde(default)]
    pub category: String,
    /// Start zápasu, Unix epoch v milisekundách
    pub date:     i64,
    #[serde(default)]
    pub poster:   Option<String>,
    #[serde(default)]
    pub teams:    Option<Teams>,
    #[serde(default)]
    pub sources:  Vec<SourceRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    pub source:    String,
    #[serde(rename = "streamNo")]
    pub stream_no: u32,
    /// Prázdný embedUrl = nepoužitelný kandidát; resolver ho zahodí
    #[serde(default, rename = "embedUrl")]
    pub embed_url: String,
    #[serde(default)]
    pub hd:        bool,
    #[serde(default)]
    pub language:  Option<String>,
}

impl Stream {
    /// Identita pro rendering: "{source}-{streamNo}"
    pub fn key(&self) -> String {
        format!("{}-{}", self.source, self.stream_no)
    }

    pub fn is_playable(&self) -> bool {
        !self.embed_url.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SportDescriptor {
    pub id:   String,
    pub name: String,
}

/// Výběr listing endpointu
#[derive(Debug, Clone, PartialEq)]
pub enum MatchScope {
    All,
    Live,
    Sport(String),
}

impl MatchScope {
    pub fn from_arg(arg: &str) -> MatchScope {
        match arg {
            "all"  => MatchScope::All,
            "live" => MatchScope::Live,
            other  => MatchScope::Sport(other.to_string()),
        }
    }

    fn endpoint(&self) -> String {
        match self {
            MatchScope::All       => "matches/all".to_string(),
            MatchScope::Live      => "matches/live".to_string(),
            MatchScope::Sport(id) => format!("matches/{id}"),
        }
    }
}

// ── Error taxonomie ───────────────────────────────────────────────────────────

/// Typované výsledky boundary volání — orchestrátor na nich větví
/// bez catchování, viz state machine ve stream_resolveru.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    /// Transport/HTTP selhání nebo rozbitý payload
    #[error("fetch failed: {message}")]
    Fetch {
        status:  Option<u16>,
        message: String,
    },
    /// Lookup prošel, ale cílová entita neexistuje
    #[error("not found: {0}")]
    NotFound(String),
    /// Zápas nemá žádný zdroj, ze kterého by šlo resolvovat
    #[error("no streams available")]
    NoStreams,
}

// ── Client ────────────────────────────────────────────────────────────────────

pub struct CatalogClient {
    http:       reqwest::Client,
    api_base:   String,
    asset_base: String,
}

impl CatalogClient {
    pub fn new(api_base: impl Into<String>, asset_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::builder()
                // Imitujeme prohlížeč kvůli anti-bot ochranám na upstreamu
                .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            api_base:   api_base.into().trim_end_matches('/').to_string(),
            asset_base: asset_base.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, CatalogError> {
        let url = format!("{}/{}", self.api_base, path);
        tracing::debug!("GET {url}");

        let resp = self.http.get(&url).send().await.map_err(|e| CatalogError::Fetch {
            status:  e.status().map(|s| s.as_u16()),
            message: format!("request failed for {path}: {e}"),
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::Fetch {
                status:  Some(status.as_u16()),
                message: format!("HTTP {status} for {path}"),
            });
        }

        // Schema violation = FetchError, ne runtime type error downstream
        resp.json::<T>().await.map_err(|e| CatalogError::Fetch {
            status:  Some(status.as_u16()),
            message: format!("invalid payload for {path}: {e}"),
        })
    }

    /// GET /sports
    pub async fn sports(&self) -> Result<Vec<SportDescriptor>, CatalogError> {
        self.get_json("sports").await
    }

    /// Dohledání sportu podle id nad /sports listingem
    pub async fn sport_by_id(&self, id: &str) -> Result<SportDescriptor, CatalogError> {
        let sports = self.sports().await?;
        sports
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| CatalogError::NotFound(format!("sport {id}")))
    }

    /// GET /matches/{all|live|sportId}
    pub async fn list_matches(&self, scope: &MatchScope) -> Result<Vec<Match>, CatalogError> {
        self.get_json(&scope.endpoint()).await
    }

    /// GET /match/{matchId} — 404 mapujeme na NotFound
    pub async fn match_by_id(&self, match_id: &str) -> Result<Match, CatalogError> {
        match self.get_json(&format!("match/{match_id}")).await {
            Err(CatalogError::Fetch { status: Some(404), .. }) => {
                Err(CatalogError::NotFound(format!("match {match_id}")))
            }
            other => other,
        }
    }

    /// GET /stream/{source}/{id} — streamy jednoho provider páru
    pub async fn streams(&self, source: &str, id: &str) -> Result<Vec<Stream>, CatalogError> {
        self.get_json(&format!("stream/{source}/{id}")).await
    }

    /// GET /streams/{matchId} — bulk lookup přes všechny providery najednou
    pub async fn streams_for_match(&self, match_id: &str) -> Result<Vec<Stream>, CatalogError> {
        self.get_json(&format!("streams/{match_id}")).await
    }

    // ── Asset URL kontrakt (§ rendering) ──────────────────────────────────────

    /// Poster je v API relativní cesta, resolvuje se proti asset hostu
    pub fn poster_url(&self, poster: &str) -> String {
        format!("{}{}", self.asset_base, poster)
    }

    pub fn badge_url(&self, badge: &str) -> String {
        format!("{}/api/images/badge/{}.webp", self.asset_base, badge)
    }
}
