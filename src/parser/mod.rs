//! Template-driven Text Parser
//!
//! Runs a compiled template over command output and collects the emitted
//! records.

pub mod error;
pub mod fsm;
pub mod record;

pub use error::{ParseError, ParseResult};
pub use fsm::{parse, parse_text, Flow, Interpreter};
pub use record::{FieldValue, ParsedRecord, RecordBuilder};
