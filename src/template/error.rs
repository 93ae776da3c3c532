//! Template compilation errors

pub type TemplateResult<T> = Result<T, TemplateSyntaxError>;

/// A template failed to compile. Every variant carries the 1-based template
/// line and the offending construct.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateSyntaxError {
    #[error("line {line}: malformed value definition '{text}'")]
    InvalidValue { line: usize, text: String },

    #[error("line {line}: invalid value name '{name}'")]
    InvalidValueName { line: usize, name: String },

    #[error("line {line}: duplicate value name '{name}'")]
    DuplicateValue { line: usize, name: String },

    #[error("line {line}: unrecognized option '{option}' on value '{name}'")]
    UnknownOption {
        line: usize,
        name: String,
        option: String,
    },

    #[error("line {line}: option '{option}' repeated on value '{name}'")]
    DuplicateOption {
        line: usize,
        name: String,
        option: String,
    },

    #[error("line {line}: value regex '{pattern}' must be enclosed in parentheses")]
    UnwrappedValueRegex { line: usize, pattern: String },

    #[error("line {line}: invalid regex '{pattern}': {reason}")]
    InvalidRegex {
        line: usize,
        pattern: String,
        reason: String,
    },

    #[error("line {line}: invalid state name '{name}'")]
    InvalidStateName { line: usize, name: String },

    #[error("line {line}: duplicate state '{name}'")]
    DuplicateState { line: usize, name: String },

    #[error("line {line}: reserved state '{name}' must not contain rules")]
    NonEmptyReservedState { line: usize, name: String },

    #[error("template has no 'Start' state")]
    MissingStartState,

    #[error("line {line}: malformed rule '{text}'")]
    InvalidRule { line: usize, text: String },

    #[error("line {line}: rule references undeclared value '{name}'")]
    UndefinedValue { line: usize, name: String },

    #[error("line {line}: malformed action '{action}'")]
    InvalidAction { line: usize, action: String },

    #[error("line {line}: 'Continue' cannot be combined with a transition to '{state}'")]
    ContinueWithTransition { line: usize, state: String },

    #[error("line {line}: transition to undeclared state '{state}'")]
    UnknownState { line: usize, state: String },

    #[error("line {line}: unexpected text '{text}'")]
    UnexpectedLine { line: usize, text: String },
}

impl TemplateSyntaxError {
    /// Template line the error points at, when it has one
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::MissingStartState => None,
            Self::InvalidValue { line, .. }
            | Self::InvalidValueName { line, .. }
            | Self::DuplicateValue { line, .. }
            | Self::UnknownOption { line, .. }
            | Self::DuplicateOption { line, .. }
            | Self::UnwrappedValueRegex { line, .. }
            | Self::InvalidRegex { line, .. }
            | Self::InvalidStateName { line, .. }
            | Self::DuplicateState { line, .. }
            | Self::NonEmptyReservedState { line, .. }
            | Self::InvalidRule { line, .. }
            | Self::UndefinedValue { line, .. }
            | Self::InvalidAction { line, .. }
            | Self::ContinueWithTransition { line, .. }
            | Self::UnknownState { line, .. }
            | Self::UnexpectedLine { line, .. } => Some(*line),
        }
    }
}
