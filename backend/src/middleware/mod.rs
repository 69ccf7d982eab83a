//! Actix middleware shared across the HTTP surface.

pub mod deadline;
pub mod trace;

pub use deadline::Deadline;
pub use trace::Trace;
