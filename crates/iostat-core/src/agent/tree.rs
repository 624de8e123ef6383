//! OID tree derived from the latest device snapshot.
//!
//! # Layout
//!
//! Devices are sorted by name and numbered from 1. For device `i` under root
//! `R`:
//!
//! ```text
//! R.1.i   INTEGER  device index
//! R.2.i   STRING   device name
//! R.3.i   STRING   rrqm/s      R.10.i  STRING   avgqu-sz
//! R.4.i   STRING   wrqm/s      R.11.i  STRING   await
//! R.5.i   STRING   r/s         R.12.i  STRING   r_await
//! R.6.i   STRING   w/s         R.13.i  STRING   w_await
//! R.7.i   STRING   rkB/s       R.14.i  STRING   svctm
//! R.8.i   STRING   wkB/s       R.15.i  STRING   %util
//! R.9.i   STRING   avgrq-sz
//! ```
//!
//! Metrics are rendered with two decimals.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::oid::Oid;
use super::value::{Value, VarBind};
use crate::storage::cache::StatsCache;
use crate::storage::model::DeviceMap;

/// Column of the device index.
pub const COLUMN_INDEX: u32 = 1;
/// Column of the device name.
pub const COLUMN_NAME: u32 = 2;
/// Column of the first metric; the rest follow in field order.
pub const COLUMN_FIRST_METRIC: u32 = 3;

/// Sorted set of entries, rebuilt wholesale from one snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OidTree {
    entries: Vec<VarBind>,
}

impl OidTree {
    /// Builds a tree from unordered entries.
    pub fn from_entries(mut entries: Vec<VarBind>) -> Self {
        entries.sort_by(|a, b| a.oid.cmp(&b.oid));
        Self { entries }
    }

    pub fn entries(&self) -> &[VarBind] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact match.
    pub fn get(&self, oid: &Oid) -> Option<&VarBind> {
        self.entries
            .binary_search_by(|e| e.oid.cmp(oid))
            .ok()
            .map(|idx| &self.entries[idx])
    }

    /// Smallest entry `x` with `from < x < to`, or `x == from` when
    /// `include_from` is set. An empty `to` means no upper bound.
    pub fn next(&self, from: &Oid, include_from: bool, to: &Oid) -> Option<&VarBind> {
        let idx = if include_from {
            self.entries.partition_point(|e| e.oid < *from)
        } else {
            self.entries.partition_point(|e| e.oid <= *from)
        };

        self.entries
            .get(idx)
            .filter(|e| to.is_empty() || e.oid < *to)
    }
}

/// Maps a snapshot onto the column layout under `root`.
pub fn build_tree(root: &Oid, devices: &DeviceMap) -> OidTree {
    let mut entries = Vec::with_capacity(devices.len() * 15);

    // BTreeMap iteration is already sorted by device name.
    for (idx, (name, sample)) in devices.iter().enumerate() {
        let index = (idx + 1) as u32;

        entries.push(VarBind::new(
            root.child(&[COLUMN_INDEX, index]),
            Value::Integer(index as i32),
        ));
        entries.push(VarBind::new(
            root.child(&[COLUMN_NAME, index]),
            Value::OctetString(name.clone()),
        ));

        for (column, metric) in (COLUMN_FIRST_METRIC..).zip(sample.metrics()) {
            entries.push(VarBind::new(
                root.child(&[column, index]),
                Value::OctetString(format!("{:.2}", metric)),
            ));
        }
    }

    // Emitted per device, but the OID order groups by column first.
    OidTree::from_entries(entries)
}

#[derive(Debug, Default)]
struct BuildState {
    last_rebuild: Option<Instant>,
    tree: Arc<OidTree>,
}

/// Rebuilds the tree from the cache, at most once per throttle window.
///
/// If the cached snapshot is older than `max_age` the tree is emptied, so
/// every query answers "no such object" instead of serving outdated numbers.
/// Both checks run on the monotonic clock; wall-clock steps do not affect them.
#[derive(Debug)]
pub struct TreeBuilder {
    root: Oid,
    max_age: Duration,
    throttle: Duration,
    state: Mutex<BuildState>,
}

impl TreeBuilder {
    pub fn new(root: Oid, max_age: Duration, throttle: Duration) -> Self {
        Self {
            root,
            max_age,
            throttle,
            state: Mutex::new(BuildState::default()),
        }
    }

    pub fn root(&self) -> &Oid {
        &self.root
    }

    /// Returns the current tree, rebuilding it if the throttle window passed.
    pub fn refresh(&self, cache: &StatsCache, now: Instant) -> Arc<OidTree> {
        let mut state = self.lock();

        if let Some(last) = state.last_rebuild
            && now.saturating_duration_since(last) < self.throttle
        {
            return Arc::clone(&state.tree);
        }

        state.last_rebuild = Some(now);

        let stats = cache.read();
        let fresh = stats.age(now).is_some_and(|age| age <= self.max_age);
        if !fresh {
            warn!(
                last_updated = %stats.last_updated,
                max_age_secs = self.max_age.as_secs(),
                "stats are not updated, serving empty tree"
            );
            state.tree = Arc::new(OidTree::default());
        } else {
            let tree = build_tree(&self.root, &stats.devices);
            debug!(
                devices = stats.devices.len(),
                entries = tree.len(),
                "oid tree rebuilt"
            );
            state.tree = Arc::new(tree);
        }

        Arc::clone(&state.tree)
    }

    fn lock(&self) -> MutexGuard<'_, BuildState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
