//! Latest device snapshot shared between the sampler and the responder.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use super::model::DeviceMap;

/// Snapshot as seen by a reader: the device map and when it was captured.
///
/// `updated_at` is monotonic and drives every age check; `last_updated` is
/// the wall-clock time of the same write, for logs and display only.
#[derive(Debug, Clone)]
pub struct CachedStats {
    pub devices: Arc<DeviceMap>,
    pub updated_at: Option<Instant>,
    pub last_updated: DateTime<Utc>,
}

impl CachedStats {
    /// Time since the snapshot was written, or `None` if it never was.
    pub fn age(&self, now: Instant) -> Option<Duration> {
        self.updated_at.map(|at| now.saturating_duration_since(at))
    }
}

#[derive(Debug)]
struct CacheState {
    devices: Arc<DeviceMap>,
    updated_at: Option<Instant>,
    last_updated: DateTime<Utc>,
}

/// Thread-safe holder of the latest snapshot and its timestamps.
///
/// Everything lives behind one mutex, so a reader never sees new devices with
/// an old timestamp or the reverse. Cloning yields another handle to the same
/// cache.
#[derive(Debug, Clone)]
pub struct StatsCache {
    inner: Arc<Mutex<CacheState>>,
}

impl StatsCache {
    /// Creates an empty, never updated cache. The wall-clock stamp starts at
    /// the Unix epoch.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheState {
                devices: Arc::new(DeviceMap::new()),
                updated_at: None,
                last_updated: DateTime::<Utc>::default(),
            })),
        }
    }

    /// Returns the current snapshot. The device map is shared, not copied.
    pub fn read(&self) -> CachedStats {
        let state = self.lock();
        CachedStats {
            devices: Arc::clone(&state.devices),
            updated_at: state.updated_at,
            last_updated: state.last_updated,
        }
    }

    /// Replaces the snapshot wholesale, stamped with `at` on the monotonic
    /// clock and `wall` on the system clock.
    pub fn write(&self, devices: DeviceMap, at: Instant, wall: DateTime<Utc>) {
        let devices = Arc::new(devices);
        let mut state = self.lock();
        state.devices = devices;
        state.updated_at = Some(at);
        state.last_updated = wall;
    }

    /// Monotonic time of the last successful write.
    pub fn updated_at(&self) -> Option<Instant> {
        self.lock().updated_at
    }

    /// Wall-clock time of the last successful write.
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.lock().last_updated
    }

    // Writers never leave the state half-updated, so a poisoned lock is safe to reuse.
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for StatsCache {
    fn default() -> Self {
        Self::new()
    }
}
