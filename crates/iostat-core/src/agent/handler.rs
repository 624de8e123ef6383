//! Seam between the OID tree and the AgentX transport.
//!
//! The transport library owns the master-agent connection. It registers a
//! [`Handler`] under a root OID through its [`Session`] and calls back into it
//! for every GET and GETNEXT that falls inside the registered subtree.

use std::sync::Arc;

use super::oid::Oid;
use super::value::{Response, VarBind};

/// Answers queries for one registered subtree.
pub trait Handler: Send + Sync {
    /// Exact lookup.
    fn get(&self, oid: &Oid) -> Response;

    /// First object after `from` (or at `from` when `include_from`) and
    /// strictly before `to`.
    fn get_next(&self, from: &Oid, include_from: bool, to: &Oid) -> Response;
}

/// Registration side of a transport session.
pub trait Session {
    type Error: std::error::Error;

    /// Registers `handler` as the responder for the subtree rooted at `root`.
    fn register(&mut self, root: &Oid, handler: Arc<dyn Handler>) -> Result<(), Self::Error>;
}

/// Collects every object under `root` by repeated GETNEXT, in OID order.
pub fn walk<H: Handler + ?Sized>(handler: &H, root: &Oid) -> Vec<VarBind> {
    let unbounded = Oid::default();
    let mut out = Vec::new();
    let mut cursor = root.clone();

    while let Some(vb) = handler.get_next(&cursor, false, &unbounded).into_varbind() {
        if !vb.oid.starts_with(root) {
            break;
        }
        cursor = vb.oid.clone();
        out.push(vb);
    }

    out
}
