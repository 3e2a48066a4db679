use std::collections::{HashMap, VecDeque};

use tracing::debug;

use super::source::ClientError;
use crate::entities::Reading;
use crate::range::ResolvedRange;

/// Handle for one fetch. Results are only applied while its key is still
/// the current key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    id: u64,
    key: ResolvedRange,
}

impl QueryTicket {
    pub fn key(&self) -> &ResolvedRange {
        &self.key
    }
}

/// Coarse state of the query for loading indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// Current range is not ready; nothing to fetch
    Idle,
    /// Fetching with no data for the current range yet
    Loading,
    /// Fetching while showing data for the current or a previous range
    Revalidating,
    /// Showing data for the current range
    Ready,
    /// Last fetch for the current range failed
    Failed,
}

/// Ranges kept in the cache. Preset keys move with the clock, so older
/// entries are evicted least recently used first.
pub const MAX_CACHED_RANGES: usize = 8;

/// Keyed readings cache.
///
/// Data stays visible while a new range is fetched, results for ranges the
/// user has already moved away from are dropped, and ranges seen before are
/// shown from cache right away while they revalidate.
#[derive(Debug, Default)]
pub struct ReadingsQuery {
    current: ResolvedRange,
    in_flight: Option<QueryTicket>,
    next_id: u64,
    cache: HashMap<ResolvedRange, Vec<Reading>>,
    /// Cached keys, least recently used first
    recent: VecDeque<ResolvedRange>,
    shown: Option<ResolvedRange>,
    error: Option<ClientError>,
}

impl ReadingsQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `key` current and issue a ticket for fetching it, or `None` when
    /// the range is not ready.
    pub fn begin(&mut self, key: ResolvedRange) -> Option<QueryTicket> {
        if key != self.current {
            self.error = None;
        }
        self.current = key.clone();

        if !key.is_ready() {
            self.in_flight = None;
            return None;
        }

        if self.cache.contains_key(&key) {
            self.touch(&key);
            self.shown = Some(key.clone());
        }

        self.next_id += 1;
        let ticket = QueryTicket { id: self.next_id, key };
        self.in_flight = Some(ticket.clone());
        Some(ticket)
    }

    /// Apply a fetch result. Returns false when the ticket's key is no
    /// longer current and the result was discarded.
    pub fn complete(&mut self, ticket: QueryTicket, result: Result<Vec<Reading>, ClientError>) -> bool {
        if ticket.key != self.current {
            debug!("Discarding result for superseded range {:?}", ticket.key);
            return false;
        }

        if self.in_flight.as_ref().map(|t| t.id) == Some(ticket.id) {
            self.in_flight = None;
        }

        match result {
            Ok(readings) => {
                self.cache.insert(ticket.key.clone(), readings);
                self.touch(&ticket.key);
                self.evict();
                self.shown = Some(ticket.key);
                self.error = None;
            }
            Err(err) => {
                debug!("Fetch for {:?} failed: {}", ticket.key, err);
                self.error = Some(err);
            }
        }
        true
    }

    /// Readings to display; may belong to a previous range while fetching
    pub fn data(&self) -> &[Reading] {
        self.shown
            .as_ref()
            .and_then(|key| self.cache.get(key))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of ranges with cached readings
    pub fn cached_ranges(&self) -> usize {
        self.cache.len()
    }

    fn touch(&mut self, key: &ResolvedRange) {
        self.recent.retain(|k| k != key);
        self.recent.push_back(key.clone());
    }

    // The key just touched sits at the back and is never evicted
    fn evict(&mut self) {
        while self.recent.len() > MAX_CACHED_RANGES {
            if let Some(oldest) = self.recent.pop_front() {
                self.cache.remove(&oldest);
            }
        }
    }

    pub fn current_key(&self) -> &ResolvedRange {
        &self.current
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether the displayed data belongs to a different range
    pub fn is_stale(&self) -> bool {
        self.shown.as_ref() != Some(&self.current)
    }

    /// Error from the last fetch of the current range
    pub fn error(&self) -> Option<&ClientError> {
        self.error.as_ref()
    }

    pub fn status(&self) -> QueryStatus {
        if !self.current.is_ready() {
            QueryStatus::Idle
        } else if self.is_fetching() {
            if self.shown.is_some() {
                QueryStatus::Revalidating
            } else {
                QueryStatus::Loading
            }
        } else if self.error.is_some() {
            QueryStatus::Failed
        } else {
            QueryStatus::Ready
        }
    }
}
