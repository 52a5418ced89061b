//! Streamisko — Stream Resolver
//!
//! Fan-out resoluce: match id → paralelní per-source lookupy → jeden
//! seřazený kandidátní seznam. Výpadek jednoho provider API nesmí
//! zablokovat ostatní — selhání zdroje se absorbuje jako prázdný
//! příspěvek a jede se dál.
//!
//! StreamSession drží state machine Idle → Loading → {Ready, Error}
//! s manuálním retry a last-request-wins ochranou proti stale výsledkům.

use async_trait::async_trait;
use catalog_client::{CatalogClient, CatalogError, Match, MatchScope, SourceRef, Stream};
use futures_util::future::join_all;
use logger::{now_iso, ApiStatusEvent, EventLogger, ResolutionEvent};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

// ── Catalog seam ──────────────────────────────────────────────────────────────

/// Boundary trait nad katalogem — produkčně CatalogClient, v testech
/// in-memory fake. Resolver ani orchestrátor na HTTP nesahají přímo.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn match_by_id(&self, match_id: &str) -> Result<Match, CatalogError>;
    async fn list_matches(&self, scope: &MatchScope) -> Result<Vec<Match>, CatalogError>;
    async fn streams(&self, source: &str, id: &str) -> Result<Vec<Stream>, CatalogError>;
    async fn streams_for_match(&self, match_id: &str) -> Result<Vec<Stream>, CatalogError>;
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn match_by_id(&self, match_id: &str) -> Result<Match, CatalogError> {
        CatalogClient::match_by_id(self, match_id).await
    }

    async fn list_matches(&self, scope: &MatchScope) -> Result<Vec<Match>, CatalogError> {
        CatalogClient::list_matches(self, scope).await
    }

    async fn streams(&self, source: &str, id: &str) -> Result<Vec<Stream>, CatalogError> {
        CatalogClient::streams(self, source, id).await
    }

    async fn streams_for_match(&self, match_id: &str) -> Result<Vec<Stream>, CatalogError> {
        CatalogClient::streams_for_match(self, match_id).await
    }
}

// ── Fan-out ───────────────────────────────────────────────────────────────────

/// Paralelní resoluce všech source refs na kandidátní streamy.
///
/// Lookupy běží souběžně, ale výstup drží pořadí vstupního seznamu
/// (join_all skládá podle indexu, ne podle dokončení). Spadlý zdroj
/// přispěje prázdně, kandidáti bez embedUrl se zahazují.
pub async fn resolve_streams(api: &dyn CatalogApi, refs: &[SourceRef]) -> Vec<Stream> {
    resolve_streams_detailed(api, refs).await.0
}

/// Varianta vracející i počet zdrojů, které odpověděly — pro audit log.
pub async fn resolve_streams_detailed(
    api: &dyn CatalogApi,
    refs: &[SourceRef],
) -> (Vec<Stream>, usize) {
    if refs.is_empty() {
        return (Vec::new(), 0);
    }

    let lookups = refs.iter().map(|r| async move {
        match api.streams(&r.source, &r.id).await {
            Ok(streams) => Ok(streams),
            Err(e) => {
                warn!("stream lookup {}/{} failed: {}", r.source, r.id, e);
                Err(e)
            }
        }
    });

    let results = join_all(lookups).await;

    let healthy = results.iter().filter(|r| r.is_ok()).count();
    let streams = results
        .into_iter()
        .flat_map(|r| r.unwrap_or_default())
        .filter(|s| s.is_playable())
        .collect();
    (streams, healthy)
}

/// Sekundární volné dohledání: přesná shoda id, pak case-insensitive
/// substring titulku. Primární cesta je striktní — tohle se zapíná jen
/// explicitně přes `with_loose_lookup`.
pub fn find_match_loose<'a>(matches: &'a [Match], needle: &str) -> Option<&'a Match> {
    if let Some(m) = matches.iter().find(|m| m.id == needle) {
        return Some(m);
    }
    let lower = needle.to_lowercase();
    if lower.is_empty() {
        return None;
    }
    matches.iter().find(|m| m.title.to_lowercase().contains(&lower))
}

// ── Orchestrátor ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResolutionState {
    #[default]
    Idle,
    Loading,
    /// Prázdné streams = platný koncový stav "nic teď nevysílá",
    /// ne chyba — rozlišuj od Error (fetch/lookup selhal)
    Ready {
        match_details: Match,
        streams:       Vec<Stream>,
        active:        Option<Stream>,
    },
    Error {
        message: String,
    },
}

pub struct StreamSession<A: CatalogApi> {
    api:          Arc<A>,
    logger:       EventLogger,
    loose_lookup: bool,
    state:        Mutex<ResolutionState>,
    /// Monotónní čítač aktivací — commitnout smí jen ta nejnovější
    generation:   AtomicU64,
    retries:      AtomicU32,
}

impl<A: CatalogApi> StreamSession<A> {
    pub fn new(api: Arc<A>, log_dir: impl Into<PathBuf>) -> Self {
        Self {
            api,
            logger:       EventLogger::new(log_dir),
            loose_lookup: false,
            state:        Mutex::new(ResolutionState::Idle),
            generation:   AtomicU64::new(0),
            retries:      AtomicU32::new(0),
        }
    }

    pub fn with_loose_lookup(mut self, enabled: bool) -> Self {
        self.loose_lookup = enabled;
        self
    }

    /// Snapshot aktuálního stavu
    pub fn state(&self) -> ResolutionState {
        self.state.lock().unwrap().clone()
    }

    pub fn retry_count(&self) -> u32 {
        self.retries.load(Ordering::SeqCst)
    }

    /// Aktivace pro match id. Každá nová aktivace zneplatní výsledky
    /// všech starších in-flight aktivací (last-request-wins).
    pub async fn activate(&self, match_id: &str, fallback_sources: &[SourceRef]) -> ResolutionState {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.commit(generation, ResolutionState::Loading);

        let outcome = self.run_pipeline(match_id, fallback_sources).await;
        self.commit(generation, outcome.clone());
        outcome
    }

    /// Manuální retry — počet neomezený, vždy restart celé sekvence
    /// od kroku 1, žádné částečné pokračování.
    pub async fn retry(&self, match_id: &str, fallback_sources: &[SourceRef]) -> ResolutionState {
        let retry_no = self.retries.fetch_add(1, Ordering::SeqCst) + 1;
        info!("manual retry #{retry_no} for match {match_id}");
        self.activate(match_id, fallback_sources).await
    }

    fn commit(&self, generation: u64, next: ResolutionState) {
        let mut state = self.state.lock().unwrap();
        if self.generation.load(Ordering::SeqCst) == generation {
            *state = next;
        } else {
            debug!("stale resolution result dropped (generation {generation})");
        }
    }

    async fn run_pipeline(&self, match_id: &str, fallback: &[SourceRef]) -> ResolutionState {
        // 1. Kanonický lookup zápasu (strict id)
        let matched = match self.lookup_match(match_id).await {
            Ok(m) => m,
            Err(CatalogError::NotFound(_)) => {
                return ResolutionState::Error { message: "Match not found".to_string() };
            }
            Err(e) => {
                warn!("match lookup failed for {match_id}: {e}");
                return ResolutionState::Error { message: e.to_string() };
            }
        };

        // 2. Pořadí zdrojů: sources ze zápasu → fallback z navigace → bulk endpoint
        let (streams, healthy, requested) = if !matched.sources.is_empty() {
            let (s, h) = resolve_streams_detailed(self.api.as_ref(), &matched.sources).await;
            (s, h, matched.sources.len())
        } else if !fallback.is_empty() {
            let (s, h) = resolve_streams_detailed(self.api.as_ref(), fallback).await;
            (s, h, fallback.len())
        } else {
            match self.api.streams_for_match(match_id).await {
                Ok(bulk) => {
                    let s: Vec<Stream> = bulk.into_iter().filter(|s| s.is_playable()).collect();
                    if s.is_empty() {
                        // Zápas nenese žádný source ref a bulk nic nedal —
                        // není z čeho resolvovat
                        return ResolutionState::Error {
                            message: "No streams available for this match".to_string(),
                        };
                    }
                    (s, 1, 1)
                }
                Err(e) => {
                    self.log_api_status("streams", match_id, false, None, &e.to_string(), 0);
                    return ResolutionState::Error {
                        message: "No streams available for this match".to_string(),
                    };
                }
            }
        };

        // 3. Ready — první přeživší kandidát je aktivní stream
        let active = streams.first().cloned();
        let _ = self.logger.log(&ResolutionEvent {
            ts:                now_iso(),
            event:             "STREAMS_RESOLVED",
            match_id:          match_id.to_string(),
            requested_sources: requested,
            healthy_sources:   healthy,
            streams_found:     streams.len(),
            retry_no:          self.retries.load(Ordering::SeqCst),
        });
        info!(
            "resolved {} streams for match {} ({}/{} sources healthy)",
            streams.len(),
            match_id,
            healthy,
            requested
        );

        ResolutionState::Ready { match_details: matched, streams, active }
    }

    /// Detail endpoint první, pak strict-id scan celého listingu.
    /// Loose title fallback jen při explicitním opt-inu.
    async fn lookup_match(&self, match_id: &str) -> Result<Match, CatalogError> {
        match self.api.match_by_id(match_id).await {
            Ok(m) => return Ok(m),
            Err(e) => debug!("match detail lookup failed for {match_id}: {e}"),
        }

        let all = self.api.list_matches(&MatchScope::All).await?;
        if let Some(m) = all.iter().find(|m| m.id == match_id) {
            return Ok(m.clone());
        }
        if self.loose_lookup {
            if let Some(m) = find_match_loose(&all, match_id) {
                info!("loose lookup matched '{}' for needle '{}'", m.title, match_id);
                return Ok(m.clone());
            }
        }
        Err(CatalogError::NotFound(format!("match {match_id}")))
    }

    fn log_api_status(&self, source: &str, scope: &str, ok: bool, status: Option<u16>, message: &str, items: usize) {
        let _ = self.logger.log(&ApiStatusEvent {
            ts:          now_iso(),
            event:       "API_STATUS",
            source:      source.to_string(),
            scope:       scope.to_string(),
            ok,
            status_code: status,
            message:     message.to_string(),
            items,
        });
    }
}
