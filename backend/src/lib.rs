//! Book catalogue and review backend library modules.
//!
//! The crate is laid out as a hexagon: `domain` holds entities, ports, and
//! use-case services; `inbound` adapts HTTP onto the driving ports;
//! `outbound` implements the driven ports over PostgreSQL and the token and
//! password primitives.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::{Deadline, Trace};
