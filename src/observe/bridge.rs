//! Push-to-poll subscription bridge.
//!
//! # Responsibilities
//! - Keep one cache entry per observed resource path
//! - Register a long-lived watch on the first poll of a path
//! - Publish each push notification as an atomic (body, etag, timestamp)
//!   snapshot
//! - Serve polls from the cache without touching the network
//!
//! # Design Decisions
//! - Subscriptions are keyed by resource path; independent resources never
//!   interfere
//! - One writer per key (the notification callback), any number of poll
//!   readers; the snapshot is swapped whole so a reader never observes a
//!   torn body/etag pair
//! - The etag tracks recency, not content: every push produces a fresh tag,
//!   identical bodies included
//! - A notification failure moves the subscription to a terminal Degraded
//!   state; polls keep serving the stale snapshot, visibly

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use arc_swap::ArcSwap;
use axum::http::request::Parts;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::coap::client::{CoapExchange, NotificationHandler};
use crate::mapping::MappingTable;
use crate::observability::metrics;
use crate::translate::{RequestTranslator, TranslationError};

/// Lifecycle of a subscription record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    /// Record created, watch not yet registered.
    Subscribing,
    /// Watch registered; pushes keep the cache fresh.
    Active,
    /// Terminal: a notification failed. The cache is stale and stays so.
    Degraded,
}

impl SubscriptionState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Subscribing,
            1 => Self::Active,
            _ => Self::Degraded,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Subscribing => 0,
            Self::Active => 1,
            Self::Degraded => 2,
        }
    }
}

/// The atomically published cache value.
#[derive(Debug)]
pub struct Snapshot {
    pub body: String,
    pub etag: String,
    pub updated_at: SystemTime,
}

/// One subscription record. The snapshot is replaced whole on every push.
pub struct SubscriptionEntry {
    state: AtomicU8,
    snapshot: ArcSwap<Snapshot>,
    seq: AtomicU64,
}

impl SubscriptionEntry {
    fn new() -> Arc<Self> {
        let entry = Self {
            state: AtomicU8::new(SubscriptionState::Subscribing.as_u8()),
            snapshot: ArcSwap::from_pointee(Snapshot {
                body: String::new(),
                etag: make_etag(0),
                updated_at: SystemTime::now(),
            }),
            seq: AtomicU64::new(1),
        };
        Arc::new(entry)
    }

    pub fn state(&self) -> SubscriptionState {
        SubscriptionState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: SubscriptionState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }

    /// Publish a fresh snapshot. Single writer per entry.
    fn publish(&self, body: String) {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.snapshot.store(Arc::new(Snapshot {
            body,
            etag: make_etag(seq),
            updated_at: SystemTime::now(),
        }));
    }

    fn read(&self) -> Arc<Snapshot> {
        self.snapshot.load_full()
    }
}

/// Timestamp-derived tag, disambiguated by a per-entry sequence so that two
/// pushes in the same millisecond still differ.
fn make_etag(seq: u64) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    format!("{millis}-{seq}")
}

/// What a poll reads out of the cache.
#[derive(Debug, Clone)]
pub struct PollReading {
    pub etag: String,
    pub body: String,
    pub state: SubscriptionState,
}

pub struct ObserveBridge {
    entries: DashMap<String, Arc<SubscriptionEntry>>,
    translator: RequestTranslator,
    exchange: Arc<dyn CoapExchange>,
    prefix: String,
}

impl ObserveBridge {
    pub fn new(
        table: Arc<MappingTable>,
        exchange: Arc<dyn CoapExchange>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            entries: DashMap::new(),
            translator: RequestTranslator::new(table),
            exchange,
            prefix: prefix.into(),
        }
    }

    /// Serve one poll. The first poll of a path registers the watch; every
    /// later poll is a pure cache read. `Ok(None)` mirrors the translator's
    /// misrouted result.
    pub async fn poll(&self, parts: &Parts) -> Result<Option<PollReading>, TranslationError> {
        let key = parts.uri.path().to_string();

        if let Some(entry) = self.entries.get(&key) {
            return Ok(Some(reading_of(&entry)));
        }

        let Some(request) = self.translator.translate(parts, &[], &self.prefix)? else {
            return Ok(None);
        };
        let target = request.proxy_uri().unwrap_or(&key).to_string();

        // First poll for this path; losing a creation race just means the
        // winner's record is read instead.
        let entry = match self.entries.entry(key.clone()) {
            Entry::Occupied(existing) => return Ok(Some(reading_of(existing.get()))),
            Entry::Vacant(slot) => {
                let entry = SubscriptionEntry::new();
                slot.insert(entry.clone());
                entry
            }
        };

        let handler = notification_handler(entry.clone(), key.clone());
        match self.exchange.observe(request, handler).await {
            Ok(()) => {
                entry.set_state(SubscriptionState::Active);
                metrics::record_subscription_event("registered");
                metrics::set_active_subscriptions(self.entries.len());
                tracing::info!(path = %key, target = %target, "Observe subscription registered");
            }
            Err(e) => {
                entry.set_state(SubscriptionState::Degraded);
                metrics::record_subscription_event("degraded");
                tracing::warn!(path = %key, error = %e, "Observe registration failed");
            }
        }

        Ok(Some(reading_of(&entry)))
    }

    /// Lifecycle state of a path's subscription, if one exists.
    pub fn state_of(&self, path: &str) -> Option<SubscriptionState> {
        self.entries.get(path).map(|e| e.state())
    }

    pub fn subscription_count(&self) -> usize {
        self.entries.len()
    }
}

fn reading_of(entry: &SubscriptionEntry) -> PollReading {
    let snapshot = entry.read();
    PollReading {
        etag: snapshot.etag.clone(),
        body: snapshot.body.clone(),
        state: entry.state(),
    }
}

/// The single writer for a subscription entry, driven by the transport.
fn notification_handler(entry: Arc<SubscriptionEntry>, key: String) -> NotificationHandler {
    Box::new(move |result| match result {
        Ok(notification) => {
            entry.publish(notification.payload_text());
            tracing::debug!(path = %key, "Observe notification cached");
        }
        Err(e) => {
            entry.set_state(SubscriptionState::Degraded);
            metrics::record_subscription_event("degraded");
            tracing::warn!(path = %key, error = %e, "Observe notification failed; cache frozen");
        }
    })
}
