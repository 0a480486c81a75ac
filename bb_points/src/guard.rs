//! Process-local guard against two handlers working on the same reward key at once.
//!
//! This only narrows the window between "is it in the ledger?" and "write it to the
//! ledger" inside one process. The unique index on the ledger stays the authority:
//! after a restart, or with several processes, the guard knows nothing.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
struct Marker {
    entered_at: Instant,
    /// Set when the ticket is dropped, the key is free again after this instant
    release_at: Option<Instant>,
}

impl Marker {
    fn is_active(&self, now: Instant) -> bool {
        match self.release_at {
            None => true,
            Some(at) => now < at,
        }
    }
}

#[derive(Debug)]
pub struct InFlightGuard {
    markers: Mutex<HashMap<String, Marker>>,
    release_after: Duration,
}

/// Holds a reward key in flight, the release window starts when it is dropped
#[derive(Debug)]
pub struct InFlightTicket {
    guard: Arc<InFlightGuard>,
    key: String,
}

impl InFlightGuard {
    pub fn new(release_after: Duration) -> Arc<Self> {
        Arc::new(Self {
            markers: Mutex::new(HashMap::new()),
            release_after,
        })
    }

    /// `None` means another handler holds this key (or released it a moment ago) and
    /// the caller must give up
    pub fn try_enter(self: &Arc<Self>, key: &str) -> Option<InFlightTicket> {
        let now = Instant::now();
        let mut markers = self.markers.lock();
        markers.retain(|_, m| m.is_active(now));
        if let Some(marker) = markers.get(key) {
            debug!(
                "`{}` in flight since {:?}",
                key,
                now.saturating_duration_since(marker.entered_at)
            );
            return None;
        }
        markers.insert(
            key.to_string(),
            Marker {
                entered_at: now,
                release_at: None,
            },
        );
        Some(InFlightTicket {
            guard: Arc::clone(self),
            key: key.to_string(),
        })
    }

    #[cfg(test)]
    fn is_in_flight(&self, key: &str) -> bool {
        let now = Instant::now();
        self.markers
            .lock()
            .get(key)
            .map(|m| m.is_active(now))
            .unwrap_or(false)
    }

    fn leave(&self, key: &str) {
        let release_at = Instant::now() + self.release_after;
        if let Some(marker) = self.markers.lock().get_mut(key) {
            marker.release_at = Some(release_at);
        }
    }
}

impl InFlightTicket {
    #[cfg(test)]
    fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for InFlightTicket {
    fn drop(&mut self) {
        self.guard.leave(&self.key);
    }
}
