//! Request / Response Envelope
//!
//! The outer process reads a [`Request`] and writes a [`Response`];
//! [`analyze`] produces the response from captured text.

use serde::{Deserialize, Serialize};

use crate::diagnostics::{evaluate, observe, Finding, InterfaceObservation};
use crate::parser::{parse, ParseResult};
use crate::template::TemplateDefinition;

/// Device to collect from
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Request {
    pub host: String,
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub secret: String,
    /// Missing, null and 0 all mean the default SSH port
    #[serde(default)]
    pub port: Option<u16>,
}

/// Analysis result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub interfaces: Vec<InterfaceObservation>,
    pub findings: Vec<Finding>,
    /// Unparsed command output
    pub raw: String,
}

/// Parse `raw` with `template`, normalize and evaluate
pub fn analyze(raw: &str, template: &TemplateDefinition, strict: bool) -> ParseResult<Response> {
    let records = parse(raw, template, strict)?;
    let interfaces = observe(&records);
    let findings = evaluate(&interfaces);

    log::info!(
        "{} interfaces, {} findings",
        interfaces.len(),
        findings.len()
    );

    Ok(Response {
        interfaces,
        findings,
        raw: raw.to_string(),
    })
}
