//! GET/GETNEXT responder over the device OID tree.

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use super::handler::{self, Handler};
use super::oid::Oid;
use super::tree::{OidTree, TreeBuilder};
use super::value::{Response, VarBind};
use crate::config::AgentConfig;
use crate::storage::cache::StatsCache;

/// Answers queries from the tree built out of the shared stats cache.
///
/// Every query first asks the builder for a refresh; the builder decides
/// whether that means a rebuild, the cached tree, or an empty tree.
#[derive(Debug)]
pub struct TreeResponder {
    cache: StatsCache,
    builder: TreeBuilder,
}

impl TreeResponder {
    pub fn new(cache: StatsCache, builder: TreeBuilder) -> Self {
        Self { cache, builder }
    }

    /// Creates a responder using the root and thresholds from `config`.
    pub fn from_config(cache: StatsCache, config: &AgentConfig) -> Self {
        Self::new(
            cache,
            TreeBuilder::new(config.root.clone(), config.max_age, config.rebuild_throttle),
        )
    }

    pub fn root(&self) -> &Oid {
        self.builder.root()
    }

    /// Tree as of `now`, refreshing if due.
    pub fn tree_at(&self, now: Instant) -> Arc<OidTree> {
        self.builder.refresh(&self.cache, now)
    }

    /// Every exposed entry in OID order, collected through GETNEXT.
    pub fn walk(&self) -> Vec<VarBind> {
        handler::walk(self, self.root())
    }
}

impl Handler for TreeResponder {
    fn get(&self, oid: &Oid) -> Response {
        debug!(%oid, "snmp get");
        let tree = self.tree_at(Instant::now());
        tree.get(oid).cloned().into()
    }

    fn get_next(&self, from: &Oid, include_from: bool, to: &Oid) -> Response {
        debug!(%from, include_from, %to, "snmp getnext");
        let tree = self.tree_at(Instant::now());
        tree.next(from, include_from, to).cloned().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::value::{Value, VariableType};
    use crate::collector::iostat::parse_device_table;
    use crate::storage::model::{DeviceMap, DeviceSample};
    use chrono::Utc;
    use std::thread;
    use std::time::Duration;

    const ROOT: &str = "1.3.6.1.3.1";

    fn oid(s: &str) -> Oid {
        s.parse().unwrap()
    }

    fn sub(suffix: &str) -> Oid {
        oid(&format!("{ROOT}.{suffix}"))
    }

    fn responder(cache: StatsCache) -> TreeResponder {
        TreeResponder::from_config(cache, &AgentConfig::default())
    }

    fn three_devices() -> DeviceMap {
        let rows = [
            ("sda", 3.0),
            ("dm-0", 1.0),
            ("dm-1", 2.0),
        ];
        rows.iter()
            .map(|(name, base)| {
                let mut m = [0.0; 13];
                for (i, v) in m.iter_mut().enumerate() {
                    *v = base + (i + 1) as f64 / 100.0;
                }
                (name.to_string(), DeviceSample::from_metrics(*name, m))
            })
            .collect()
    }

    fn found(oid: Oid, value: Value) -> Response {
        Response::Found(VarBind::new(oid, value))
    }

    fn text(s: &str) -> Value {
        Value::OctetString(s.to_string())
    }

    #[test]
    fn test_get() {
        let cache = StatsCache::new();
        cache.write(three_devices(), Instant::now(), Utc::now());
        let h = responder(cache);

        assert_eq!(h.get(&sub("2.1")), found(sub("2.1"), text("dm-0")));
        assert_eq!(h.get(&sub("2.2")), found(sub("2.2"), text("dm-1")));
        assert_eq!(h.get(&sub("2.3")), found(sub("2.3"), text("sda")));

        for missing in ["2.4", "2.3.1", "16.1", "0.1"] {
            assert_eq!(h.get(&sub(missing)), Response::NoSuchObject, "{missing}");
        }
        assert_eq!(h.get(&oid("1.3.6.1.3")), Response::NoSuchObject);
        assert_eq!(h.get(&oid(ROOT)), Response::NoSuchObject);

        for device in 1..=3 {
            for field in 1..=13 {
                let id = sub(&format!("{}.{}", 2 + field, device));
                let expected = format!("{:.2}", device as f64 + field as f64 / 100.0);
                assert_eq!(h.get(&id), found(id.clone(), text(&expected)));
            }
        }
    }

    #[test]
    fn test_get_next() {
        let cache = StatsCache::new();
        cache.write(three_devices(), Instant::now(), Utc::now());
        let h = responder(cache);
        let end = oid("2");

        let cases = [
            (oid(ROOT), found(sub("1.1"), Value::Integer(1))),
            (sub("2"), found(sub("2.1"), text("dm-0"))),
            (sub("2.1"), found(sub("2.2"), text("dm-1"))),
            (sub("2.2"), found(sub("2.3"), text("sda"))),
            (sub("1.3"), found(sub("2.1"), text("dm-0"))),
            (sub("15.3"), Response::NoSuchObject),
        ];
        for (from, expected) in cases {
            assert_eq!(h.get_next(&from, false, &end), expected, "from {from}");
        }
    }

    #[test]
    fn test_get_next_include_from_and_bounds() {
        let cache = StatsCache::new();
        cache.write(three_devices(), Instant::now(), Utc::now());
        let h = responder(cache);

        assert_eq!(
            h.get_next(&sub("2.2"), true, &oid("2")),
            found(sub("2.2"), text("dm-1"))
        );
        assert_eq!(
            h.get_next(&sub("2.2"), false, &sub("2.3")),
            Response::NoSuchObject
        );
        assert_eq!(
            h.get_next(&sub("2.2"), false, &Oid::default()).kind(),
            VariableType::OctetString
        );
    }

    #[test]
    fn test_parsed_row_exposed() {
        let devices = parse_device_table(
            "sda 0.00 3.07 0.03 4.93 0.13 1505.33 606.23 0.49 99.65 12.00 100.24 4.48 2.23",
        )
        .unwrap();
        let cache = StatsCache::new();
        cache.write(devices, Instant::now(), Utc::now());
        let h = responder(cache);

        assert_eq!(h.get(&sub("1.1")), found(sub("1.1"), Value::Integer(1)));
        assert_eq!(h.get(&sub("2.1")), found(sub("2.1"), text("sda")));
        assert_eq!(h.get(&sub("8.1")), found(sub("8.1"), text("1505.33")));
        assert_eq!(h.get(&sub("15.1")), found(sub("15.1"), text("2.23")));
    }

    #[test]
    fn test_stale_cache_answers_nothing() {
        let cache = StatsCache::new();
        let t0 = Instant::now();
        cache.write(three_devices(), t0, Utc::now());
        let h = responder(cache);

        let tree = h.tree_at(t0 + Duration::from_secs(120));
        assert!(tree.get(&sub("2.1")).is_none());
        assert!(tree.next(&oid(ROOT), false, &oid("2")).is_none());
        // Live queries inside the throttle window reuse the emptied tree.
        assert_eq!(h.get(&sub("2.1")), Response::NoSuchObject);
        assert!(h.walk().is_empty());
    }

    #[test]
    fn test_previously_valid_oids_vanish_when_stale() {
        let cache = StatsCache::new();
        let t0 = Instant::now();
        cache.write(three_devices(), t0, Utc::now());
        let h = responder(cache);

        assert_eq!(h.tree_at(t0).get(&sub("2.1")).unwrap().value, text("dm-0"));
        assert!(h.tree_at(t0 + Duration::from_secs(61)).get(&sub("2.1")).is_none());
    }

    #[test]
    fn test_never_sampled_answers_nothing() {
        let h = responder(StatsCache::new());
        assert_eq!(h.get(&sub("1.1")), Response::NoSuchObject);
        assert_eq!(h.get_next(&oid(ROOT), true, &Oid::default()), Response::NoSuchObject);
    }

    #[test]
    fn test_walk_visits_every_entry_in_order() {
        let cache = StatsCache::new();
        cache.write(three_devices(), Instant::now(), Utc::now());
        let h = responder(cache);

        let walked = h.walk();
        assert_eq!(walked.len(), 45);
        assert_eq!(walked[0].oid, sub("1.1"));
        assert_eq!(walked[44].oid, sub("15.3"));
        assert!(walked.windows(2).all(|w| w[0].oid < w[1].oid));
    }

    #[test]
    fn test_concurrent_queries() {
        let cache = StatsCache::new();
        cache.write(three_devices(), Instant::now(), Utc::now());
        let h = Arc::new(TreeResponder::new(
            cache,
            TreeBuilder::new(oid(ROOT), Duration::from_secs(60), Duration::ZERO),
        ));

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let h = Arc::clone(&h);
                thread::spawn(move || {
                    for _ in 0..100 {
                        assert_eq!(h.get(&sub("2.3")), found(sub("2.3"), text("sda")));
                    }
                })
            })
            .collect();

        for w in workers {
            w.join().unwrap();
        }
    }
}
