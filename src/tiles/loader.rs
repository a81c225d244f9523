use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crossbeam_channel::{unbounded, Receiver, Sender};
use fxhash::FxHashMap;
use once_cell::sync::Lazy;

use crate::core::config::TileLoaderConfig;
use crate::core::geo::TileKey;
use crate::tiles::source::TileSource;
use crate::{MapError, Result};

/// Shared async HTTP client with a custom User-Agent so that public tile
/// servers (e.g. OpenStreetMap) don't reject the request. Building the
/// client once avoids the cost of TLS and connection pool setup per tile.
pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .user_agent("tileway/0.1 (+https://github.com/example/tileway)")
        .build()
        .expect("failed to build reqwest client")
});

/// Outcome of one accepted tile request, broadcast to whoever drains the
/// loader's event channel. Each accepted request cycle produces exactly one
/// event.
#[derive(Debug, Clone)]
pub enum TileEvent {
    Loaded { key: TileKey, bytes: Arc<Vec<u8>> },
    Failed { key: TileKey, reason: String },
}

struct PendingRequest {
    /// Attempts that have already failed for this key.
    retry_count: u32,
    /// Source generation the request was accepted under; a completion whose
    /// generation no longer matches is stale and must be discarded.
    generation: u64,
}

struct Shared {
    pending: Mutex<FxHashMap<TileKey, PendingRequest>>,
    source: Mutex<TileSource>,
    generation: AtomicU64,
}

/// Asynchronous tile fetcher with per-key request deduplication, timeout,
/// and bounded retry.
///
/// `request_tile` never blocks: the first call for a key spawns a driver
/// task onto the ambient tokio runtime and records the key as pending;
/// further calls while the key is pending are no-ops. The driver runs all
/// attempts for its key serially, so no two network operations for one key
/// ever overlap. Terminal outcomes arrive on the event channel.
pub struct TileLoader {
    shared: Arc<Shared>,
    events_tx: Sender<TileEvent>,
    events_rx: Receiver<TileEvent>,
    config: TileLoaderConfig,
}

impl TileLoader {
    pub fn new(source: TileSource, config: TileLoaderConfig) -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            shared: Arc::new(Shared {
                pending: Mutex::new(FxHashMap::default()),
                source: Mutex::new(source),
                generation: AtomicU64::new(0),
            }),
            events_tx,
            events_rx,
            config,
        }
    }

    /// Completion events, drained by polling (`try_recv`) or blocking
    /// (`recv`).
    pub fn events(&self) -> &Receiver<TileEvent> {
        &self.events_rx
    }

    pub fn config(&self) -> &TileLoaderConfig {
        &self.config
    }

    /// Number of keys currently pending (for diagnostics and tests).
    pub fn pending_count(&self) -> usize {
        self.shared
            .pending
            .lock()
            .map(|pending| pending.len())
            .unwrap_or(0)
    }

    /// Abandon every in-flight request. Their late completions are
    /// discarded without emitting events.
    pub fn invalidate(&self) {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut pending) = self.shared.pending.lock() {
            let dropped = pending.len();
            pending.clear();
            if dropped > 0 {
                log::debug!("abandoned {dropped} in-flight tile requests");
            }
        }
    }

    /// Switch to a new provider. In-flight requests for the old provider
    /// are abandoned first.
    pub fn set_source(&self, source: TileSource) {
        self.invalidate();
        if let Ok(mut current) = self.shared.source.lock() {
            *current = source;
        }
    }

    /// Begin loading `key` unless it is already pending. Returns whether a
    /// new request cycle was started.
    pub fn request_tile(&self, key: TileKey) -> bool {
        let generation = self.shared.generation.load(Ordering::SeqCst);
        {
            let Ok(mut pending) = self.shared.pending.lock() else {
                return false;
            };
            if pending.contains_key(&key) {
                return false;
            }
            pending.insert(
                key,
                PendingRequest {
                    retry_count: 0,
                    generation,
                },
            );
        }

        let shared = Arc::clone(&self.shared);
        let events_tx = self.events_tx.clone();
        let config = self.config.clone();
        tokio::spawn(async move {
            drive_request(shared, events_tx, config, key, generation).await;
        });
        true
    }
}

/// Runs every attempt for one accepted request, serially.
async fn drive_request(
    shared: Arc<Shared>,
    events_tx: Sender<TileEvent>,
    config: TileLoaderConfig,
    key: TileKey,
    generation: u64,
) {
    let mut attempt = 1u32;
    loop {
        // Re-resolve the URL each attempt so every retry re-rolls the {s}
        // subdomain. The guard must not be held across an await point.
        let url = match shared.source.lock() {
            Ok(source) => source.url(key),
            Err(_) => return,
        };
        log::debug!("fetch tile {key:?} attempt {attempt}: {url}");

        match fetch_tile(&url, &config).await {
            Ok(bytes) => {
                if take_pending(&shared, key, generation) {
                    log::info!("loaded tile {key:?} ({} bytes)", bytes.len());
                    let _ = events_tx.send(TileEvent::Loaded {
                        key,
                        bytes: Arc::new(bytes),
                    });
                } else {
                    log::debug!("discarding stale completion for tile {key:?}");
                }
                return;
            }
            Err(err) if err.is_retryable() => {
                let failed = match record_failure(&shared, key, generation) {
                    Some(count) => count,
                    // The request was abandoned while we were fetching.
                    None => return,
                };
                if failed >= config.max_retries {
                    if take_pending(&shared, key, generation) {
                        log::warn!("giving up on tile {key:?} after {failed} attempts: {err}");
                        let _ = events_tx.send(TileEvent::Failed {
                            key,
                            reason: err.to_string(),
                        });
                    }
                    return;
                }
                log::warn!("tile {key:?} attempt {attempt} failed: {err}");
                tokio::time::sleep(config.retry_delay).await;
                attempt += 1;
            }
            Err(err) => {
                // Undecodable payload: retrying cannot fix malformed server
                // data, so the failure is terminal on the first occurrence.
                if take_pending(&shared, key, generation) {
                    log::warn!("tile {key:?} returned undecodable data: {err}");
                    let _ = events_tx.send(TileEvent::Failed {
                        key,
                        reason: err.to_string(),
                    });
                }
                return;
            }
        }
    }
}

/// Removes the pending record if it still belongs to this request cycle.
/// Returns false when the record is gone or was re-created under a newer
/// generation, meaning the completion is stale.
fn take_pending(shared: &Shared, key: TileKey, generation: u64) -> bool {
    let Ok(mut pending) = shared.pending.lock() else {
        return false;
    };
    match pending.get(&key) {
        Some(record) if record.generation == generation => {
            pending.remove(&key);
            true
        }
        _ => false,
    }
}

/// Counts one failed attempt against the pending record. `None` when the
/// record no longer belongs to this request cycle.
fn record_failure(shared: &Shared, key: TileKey, generation: u64) -> Option<u32> {
    let mut pending = shared.pending.lock().ok()?;
    match pending.get_mut(&key) {
        Some(record) if record.generation == generation => {
            record.retry_count += 1;
            Some(record.retry_count)
        }
        _ => None,
    }
}

/// One network attempt: fetch, check status, validate that the payload
/// decodes as an image. Timeout aborts the attempt and surfaces as a
/// retryable error.
async fn fetch_tile(url: &str, config: &TileLoaderConfig) -> Result<Vec<u8>> {
    let attempt = async {
        let response = HTTP_CLIENT.get(url).send().await?;
        if !response.status().is_success() {
            return Err(MapError::HttpStatus(response.status().as_u16()));
        }
        let bytes = response.bytes().await?;
        if let Err(e) = image::load_from_memory(&bytes) {
            return Err(MapError::Decode(e.to_string()));
        }
        Ok(bytes.to_vec())
    };
    match tokio::time::timeout(config.timeout, attempt).await {
        Ok(result) => result,
        Err(_) => Err(MapError::Timeout),
    }
}
