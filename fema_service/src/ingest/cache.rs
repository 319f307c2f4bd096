/// Session-owned fetch cache.
///
/// Holds the raw records returned for each endpoint URL so that rendering
/// a report more than once in a session does not refetch. Entries expire
/// after an optional time-to-live and can be dropped by hand.
///
/// # Clock injection
/// Lookups take a `now: DateTime<Utc>` parameter rather than calling
/// `Utc::now()` internally, which keeps expiry deterministic in tests.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::logging::{self, Component};
use crate::model::RawRecord;

struct CacheEntry {
    fetched_at: DateTime<Utc>,
    records: Vec<RawRecord>,
}

pub struct FetchCache {
    /// `None` keeps entries until invalidated.
    ttl: Option<Duration>,
    entries: HashMap<String, CacheEntry>,
}

impl FetchCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// True when `url` has an entry that has not expired at `now`.
    pub fn is_fresh_at(&self, url: &str, now: DateTime<Utc>) -> bool {
        self.entries
            .get(url)
            .map(|entry| self.entry_is_fresh(entry, now))
            .unwrap_or(false)
    }

    fn entry_is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        match self.ttl {
            Some(ttl) => now - entry.fetched_at < ttl,
            None => true,
        }
    }

    /// Returns the cached records for `url`, calling `fetch` on a miss or
    /// after expiry.
    ///
    /// An empty result is handed back but not stored: the fetcher returns
    /// an empty collection on failure, and caching it would pin the outage
    /// for the rest of the session.
    pub fn get_or_fetch_at<F>(&mut self, url: &str, now: DateTime<Utc>, fetch: F) -> Vec<RawRecord>
    where
        F: FnOnce(&str) -> Vec<RawRecord>,
    {
        if let Some(entry) = self.entries.get(url) {
            if self.entry_is_fresh(entry, now) {
                logging::debug(
                    Component::Cache,
                    None,
                    &format!("Hit for {} ({} records)", url, entry.records.len()),
                );
                return entry.records.clone();
            }
            logging::debug(Component::Cache, None, &format!("Expired entry for {}", url));
        }

        let records = fetch(url);
        if records.is_empty() {
            self.entries.remove(url);
        } else {
            self.entries.insert(
                url.to_string(),
                CacheEntry {
                    fetched_at: now,
                    records: records.clone(),
                },
            );
        }
        records
    }

    /// Drops the entry for `url`. Returns whether one existed.
    pub fn invalidate(&mut self, url: &str) -> bool {
        self.entries.remove(url).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
