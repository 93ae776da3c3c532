//! Diagnostic Rule Engine
//!
//! Fixed, ordered predicates over interface observations. Evaluation is
//! total: malformed input was already coerced to defaults and simply does
//! not trigger.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::observation::InterfaceObservation;

/// Severity of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        })
    }
}

/// A diagnostic message about one interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    pub fn medium(message: String) -> Self {
        Self {
            severity: Severity::Medium,
            message,
        }
    }
}

/// A built-in check; `None` when the observation is healthy
pub type Predicate = fn(&InterfaceObservation) -> Option<Finding>;

/// Built-in predicates in evaluation order
pub const PREDICATES: &[(&str, Predicate)] = &[
    ("half-duplex", half_duplex),
    ("error-counters", error_counters),
];

/// Run every predicate against every observation. Findings keep
/// observation order, then predicate order.
pub fn evaluate(observations: &[InterfaceObservation]) -> Vec<Finding> {
    let mut findings = Vec::new();

    for obs in observations {
        for (name, predicate) in PREDICATES {
            if let Some(finding) = predicate(obs) {
                log::debug!("{}: {} fired", obs.iface, name);
                findings.push(finding);
            }
        }
    }

    findings
}

fn half_duplex(obs: &InterfaceObservation) -> Option<Finding> {
    obs.duplex.to_lowercase().starts_with("half").then(|| {
        Finding::medium(format!(
            "Interface {} is operating in half-duplex mode.",
            obs.iface
        ))
    })
}

fn error_counters(obs: &InterfaceObservation) -> Option<Finding> {
    (obs.input_errs > 0 || obs.output_errs > 0 || obs.crc > 0).then(|| {
        Finding::medium(format!(
            "Interface {} reports errors (input={}, output={}, crc={}).",
            obs.iface, obs.input_errs, obs.output_errs, obs.crc
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(iface: &str, duplex: &str, crc: u64, input: u64, output: u64) -> InterfaceObservation {
        InterfaceObservation {
            iface: iface.to_string(),
            duplex: duplex.to_string(),
            speed: "100Mbps".to_string(),
            crc,
            input_errs: input,
            output_errs: output,
        }
    }

    #[test]
    fn test_half_duplex_detected_case_insensitively() {
        let findings = evaluate(&[obs("Fa0/1", "HALF-duplex", 0, 0, 0)]);
        assert_eq!(
            findings,
            vec![Finding {
                severity: Severity::Medium,
                message: "Interface Fa0/1 is operating in half-duplex mode.".to_string(),
            }]
        );
    }

    #[test]
    fn test_clean_interface_has_no_findings() {
        assert!(evaluate(&[obs("Gi0/1", "full-duplex", 0, 0, 0)]).is_empty());
    }

    #[test]
    fn test_error_message_format() {
        let findings = evaluate(&[obs("Gi0/2", "full-duplex", 3, 0, 1)]);
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].message,
            "Interface Gi0/2 reports errors (input=0, output=1, crc=3)."
        );
    }

    #[test]
    fn test_order_is_record_then_predicate() {
        let findings = evaluate(&[
            obs("A", "half", 1, 0, 0),
            obs("B", "full", 0, 0, 0),
            obs("C", "half", 0, 0, 0),
        ]);

        let messages: Vec<_> = findings.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Interface A is operating in half-duplex mode.",
                "Interface A reports errors (input=0, output=0, crc=1).",
                "Interface C is operating in half-duplex mode.",
            ]
        );
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        let json = serde_json::to_string(&Finding::medium("m".to_string())).unwrap();
        assert_eq!(json, r#"{"severity":"medium","message":"m"}"#);
        assert_eq!(Severity::High.to_string(), "high");
    }
}
