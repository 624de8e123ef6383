//! In-process session that dispatches queries to registered handlers.
//!
//! Plays the master agent's part for local use by the CLI: each query is routed to the handler whose registered
//! root covers the requested OID.

use std::fmt;
use std::sync::Arc;

use super::handler::{Handler, Session};
use super::oid::Oid;
use super::value::Response;

/// A root was registered twice.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationError {
    pub root: Oid,
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subtree {} is already registered", self.root)
    }
}

impl std::error::Error for RegistrationError {}

/// Registry of subtrees, ordered by root.
#[derive(Default)]
pub struct LocalSession {
    registrations: Vec<(Oid, Arc<dyn Handler>)>,
}

impl LocalSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roots(&self) -> impl Iterator<Item = &Oid> {
        self.registrations.iter().map(|(root, _)| root)
    }
}

impl Handler for LocalSession {
    /// Routes to the most specific registration covering `oid`.
    fn get(&self, oid: &Oid) -> Response {
        self.registrations
            .iter()
            .filter(|(root, _)| oid.starts_with(root))
            .max_by_key(|(root, _)| root.len())
            .map_or(Response::NoSuchObject, |(_, h)| h.get(oid))
    }

    /// Asks each subtree at or after `from`, in root order, until one answers.
    fn get_next(&self, from: &Oid, include_from: bool, to: &Oid) -> Response {
        for (root, handler) in &self.registrations {
            // Subtrees entirely before `from` cannot hold a successor.
            if root < from && !from.starts_with(root) {
                continue;
            }
            let start = if root > from { root } else { from };
            let inclusive = include_from && start == from;
            if let found @ Response::Found(_) = handler.get_next(start, inclusive, to) {
                return found;
            }
        }
        Response::NoSuchObject
    }
}

impl Session for LocalSession {
    type Error = RegistrationError;

    fn register(&mut self, root: &Oid, handler: Arc<dyn Handler>) -> Result<(), Self::Error> {
        if self.registrations.iter().any(|(r, _)| r == root) {
            return Err(RegistrationError { root: root.clone() });
        }
        self.registrations.push((root.clone(), handler));
        self.registrations.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(())
    }
}

impl fmt::Debug for LocalSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSession")
            .field("roots", &self.roots().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::handler::walk;
    use crate::agent::responder::TreeResponder;
    use crate::agent::value::{Value, VarBind};
    use crate::config::AgentConfig;
    use crate::storage::cache::StatsCache;
    use crate::storage::model::{DeviceMap, DeviceSample};
    use chrono::Utc;
    use std::time::Instant;

    fn oid(s: &str) -> Oid {
        s.parse().unwrap()
    }

    /// Handler exposing a single fixed object.
    struct Scalar(VarBind);

    impl Handler for Scalar {
        fn get(&self, oid: &Oid) -> Response {
            if *oid == self.0.oid {
                Response::Found(self.0.clone())
            } else {
                Response::NoSuchObject
            }
        }

        fn get_next(&self, from: &Oid, include_from: bool, to: &Oid) -> Response {
            let oid = &self.0.oid;
            let after = oid > from || (include_from && oid == from);
            if after && (to.is_empty() || oid < to) {
                Response::Found(self.0.clone())
            } else {
                Response::NoSuchObject
            }
        }
    }

    fn iostat_responder(root: &str) -> Arc<TreeResponder> {
        let cache = StatsCache::new();
        let mut devices = DeviceMap::new();
        devices.insert(
            "sda".to_string(),
            DeviceSample::from_metrics("sda", [1.0; 13]),
        );
        cache.write(devices, Instant::now(), Utc::now());
        let config = AgentConfig {
            root: oid(root),
            ..AgentConfig::default()
        };
        Arc::new(TreeResponder::from_config(cache, &config))
    }

    #[test]
    fn test_register_rejects_duplicate_root() {
        let mut session = LocalSession::new();
        let root = oid("1.3.6.1.3.1");

        session.register(&root, iostat_responder("1.3.6.1.3.1")).unwrap();
        let err = session
            .register(&root, iostat_responder("1.3.6.1.3.1"))
            .unwrap_err();

        assert_eq!(err.root, root);
        assert_eq!(session.roots().count(), 1);
    }

    #[test]
    fn test_get_routes_by_root() {
        let mut session = LocalSession::new();
        let responder = iostat_responder("1.3.6.1.3.1");
        session.register(responder.root(), responder.clone()).unwrap();

        let found = session.get(&oid("1.3.6.1.3.1.2.1"));
        assert_eq!(found.value(), Some(&Value::OctetString("sda".to_string())));
        assert_eq!(session.get(&oid("1.3.6.1.4.1")), Response::NoSuchObject);
    }

    #[test]
    fn test_get_next_crosses_subtrees() {
        let mut session = LocalSession::new();
        let responder = iostat_responder("1.3.6.1.3.1");
        session.register(responder.root(), responder.clone()).unwrap();
        session
            .register(
                &oid("1.3.6.1.3.2"),
                Arc::new(Scalar(VarBind::new(oid("1.3.6.1.3.2.1"), Value::Integer(7)))),
            )
            .unwrap();

        // From the top of the tree into the first subtree.
        let first = session.get_next(&oid("1.3.6.1"), false, &Oid::default());
        assert_eq!(first.oid(), Some(&oid("1.3.6.1.3.1.1.1")));

        // From the last object of the first subtree into the second.
        let next = session.get_next(&oid("1.3.6.1.3.1.15.1"), false, &Oid::default());
        assert_eq!(next.oid(), Some(&oid("1.3.6.1.3.2.1")));

        // Past everything.
        assert_eq!(
            session.get_next(&oid("1.3.6.1.3.2.1"), false, &Oid::default()),
            Response::NoSuchObject
        );
    }

    #[test]
    fn test_walk_spans_registered_subtrees() {
        let mut session = LocalSession::new();
        let responder = iostat_responder("1.3.6.1.3.1");
        session.register(responder.root(), responder.clone()).unwrap();
        session
            .register(
                &oid("1.3.6.1.3.2"),
                Arc::new(Scalar(VarBind::new(oid("1.3.6.1.3.2.1"), Value::Integer(7)))),
            )
            .unwrap();

        let all = walk(&session, &oid("1.3.6.1.3"));
        assert_eq!(all.len(), 16);
        assert_eq!(all[15].value, Value::Integer(7));

        let first = walk(&session, responder.root());
        assert_eq!(first.len(), 15);
        assert_eq!(first, responder.walk());
    }
}
