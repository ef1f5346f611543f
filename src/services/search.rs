//! Debounce for live search
//!
//! Every keystroke in the search box fires a request. Each request takes a
//! ticket for its key (the session id), waits the configured delay, and only
//! proceeds if no newer ticket was issued for the same key in the meantime.
//!
//! Tickets live in a moka cache that expires them shortly after the delay,
//! so calls dropped mid-wait (client disconnects) leave nothing behind.

use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use std::time::Duration;

/// Upper bound on keys tracked at once
const MAX_KEYS: u64 = 100_000;

/// How long a ticket outlives the delay before it expires
const TICKET_GRACE: Duration = Duration::from_millis(100);

/// Keyed latest-wins debouncer
#[derive(Clone)]
pub struct SearchDebouncer {
    delay: Duration,
    /// Latest ticket per key
    tickets: Cache<String, u64>,
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        let tickets = Cache::builder()
            .max_capacity(MAX_KEYS)
            .time_to_live(delay * 2 + TICKET_GRACE)
            .build();
        Self { delay, tickets }
    }

    /// Wait out the delay; `true` if this is still the newest call for `key`
    pub async fn settle(&self, key: &str) -> bool {
        let ticket = self
            .tickets
            .entry(key.to_string())
            .and_upsert_with(|latest| {
                let next = latest.map_or(1, |e| e.into_value().wrapping_add(1));
                std::future::ready(next)
            })
            .await
            .into_value();

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let outcome = self
            .tickets
            .entry(key.to_string())
            .and_compute_with(|latest| {
                let op = match latest {
                    Some(entry) if *entry.value() == ticket => Op::Remove,
                    _ => Op::Nop,
                };
                std::future::ready(op)
            })
            .await;
        matches!(outcome, CompResult::Removed(_))
    }

    /// Number of keys with a call in flight
    pub async fn pending(&self) -> u64 {
        self.tickets.run_pending_tasks().await;
        self.tickets.entry_count()
    }
}
