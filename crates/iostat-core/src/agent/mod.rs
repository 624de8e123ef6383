//! SNMP subagent side: the OID tree and the GET/GETNEXT responder.
//!
//! ```text
//! StatsCache ──► TreeBuilder ──► OidTree ──► TreeResponder ──► Session
//!   (shared)     (throttle,      (sorted     (Handler impl)    (transport)
//!                 staleness)      entries)
//! ```

pub mod handler;
pub mod oid;
pub mod responder;
pub mod session;
pub mod tree;
pub mod value;

pub use handler::{Handler, Session, walk};
pub use oid::{Oid, OidParseError};
pub use responder::TreeResponder;
pub use session::{LocalSession, RegistrationError};
pub use tree::{OidTree, TreeBuilder, build_tree};
pub use value::{Response, Value, VarBind, VariableType};
