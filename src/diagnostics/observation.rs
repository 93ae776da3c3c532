//! Interface Observations
//!
//! Normalized view of one `show interfaces` record.

use serde::{Deserialize, Serialize};

use crate::parser::ParsedRecord;

/// Template value names the observation is read from
pub mod fields {
    pub const INTERFACE: &str = "INTERFACE";
    pub const DUPLEX: &str = "DUPLEX";
    pub const SPEED: &str = "SPEED";
    pub const CRC: &str = "CRC";
    pub const INPUT_ERRS: &str = "INPUT_ERRS";
    pub const OUTPUT_ERRS: &str = "OUTPUT_ERRS";
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InterfaceObservation {
    pub iface: String,
    /// Lower-cased
    pub duplex: String,
    /// `"{digits}Mbps"`, or the raw text when it has no digits
    pub speed: String,
    pub crc: u64,
    pub input_errs: u64,
    pub output_errs: u64,
}

impl InterfaceObservation {
    pub fn from_record(record: &ParsedRecord) -> Self {
        Self {
            iface: record.scalar(fields::INTERFACE).to_string(),
            duplex: record.scalar(fields::DUPLEX).to_lowercase(),
            speed: normalize_speed(record.scalar(fields::SPEED)),
            crc: coerce_count(record.scalar(fields::CRC)),
            input_errs: coerce_count(record.scalar(fields::INPUT_ERRS)),
            output_errs: coerce_count(record.scalar(fields::OUTPUT_ERRS)),
        }
    }
}

/// Map every record, keeping order
pub fn observe(records: &[ParsedRecord]) -> Vec<InterfaceObservation> {
    records.iter().map(InterfaceObservation::from_record).collect()
}

/// Keep only the digits and suffix `Mbps`; text without digits passes
/// through unchanged.
pub fn normalize_speed(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        raw.to_string()
    } else {
        format!("{}Mbps", digits)
    }
}

/// Lenient counter parse: anything that is not a non-negative integer
/// reads as 0.
pub fn coerce_count(raw: &str) -> u64 {
    raw.trim().parse().unwrap_or(0)
}
