//! Parse-time errors

pub type ParseResult<T> = Result<T, ParseError>;

/// A parse call failed. Both variants carry the 1-based input line number,
/// the active state and the offending line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("line {line_number}: no rule in state '{state}' matched '{line}'")]
    UnmatchedLine {
        line_number: usize,
        state: String,
        line: String,
    },

    #[error("line {line_number}: error action in state '{state}'{}: '{line}'", message_suffix(.message))]
    ErrorAction {
        line_number: usize,
        state: String,
        line: String,
        message: Option<String>,
    },
}

impl ParseError {
    pub fn line_number(&self) -> usize {
        match self {
            Self::UnmatchedLine { line_number, .. } | Self::ErrorAction { line_number, .. } => {
                *line_number
            }
        }
    }

    pub fn state(&self) -> &str {
        match self {
            Self::UnmatchedLine { state, .. } | Self::ErrorAction { state, .. } => state,
        }
    }

    pub fn line(&self) -> &str {
        match self {
            Self::UnmatchedLine { line, .. } | Self::ErrorAction { line, .. } => line,
        }
    }
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_ref()
        .map(|m| format!(" ({})", m))
        .unwrap_or_default()
}
