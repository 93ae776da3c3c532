//! Interface Diagnostics
//!
//! Turns parsed records into normalized observations and evaluates the
//! built-in anomaly predicates over them.

pub mod engine;
pub mod observation;

pub use engine::{evaluate, Finding, Predicate, Severity, PREDICATES};
pub use observation::{coerce_count, normalize_speed, observe, InterfaceObservation};
