//! ifdiag
//!
//! Template-driven extraction of network device CLI output with interface
//! diagnostics.
//!
//! This library provides:
//! - A TextFSM-style template compiler and finite-state parser
//! - Interface observations and anomaly findings
//! - The request/response envelope and a device session seam
//! - Configuration management

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod parser;
pub mod report;
pub mod session;
pub mod template;

// Re-exports for clean public API
pub use config::Config;
pub use diagnostics::{evaluate, Finding, InterfaceObservation, Severity};
pub use parser::{parse, parse_text, ParseError, ParsedRecord};
pub use report::{analyze, Request, Response};
pub use template::{compile, TemplateDefinition, TemplateRegistry, TemplateSyntaxError};
