//! Template Schema Types
//!
//! Compiled, immutable representation of a TextFSM-style template. Built by
//! [`crate::template::compile`] and shared read-only by every parse call.

use regex::Regex;

/// Name of the state every parse begins in
pub const START_STATE: &str = "Start";
/// Terminal state: stop parsing, skip the implicit end-of-input record
pub const END_STATE: &str = "End";
/// Terminal state: stop parsing, then run the end-of-input step
pub const EOF_STATE: &str = "EOF";

bitflags::bitflags! {
    /// Option flags attached to a template value.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ValueOptions: u8 {
        /// A record is only emitted when this value is bound
        const REQUIRED = 1 << 0;
        /// Repeated matches accumulate instead of overwriting
        const LIST     = 1 << 1;
        /// Binding survives record emission until reassigned
        const FILLDOWN = 1 << 2;
        /// Marks the value as part of the record identity
        const KEY      = 1 << 3;
    }
}

impl ValueOptions {
    /// Resolve an option keyword as written in a template
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "Required" => Some(Self::REQUIRED),
            "List" => Some(Self::LIST),
            "Filldown" => Some(Self::FILLDOWN),
            "Key" => Some(Self::KEY),
            _ => None,
        }
    }
}

/// A named extraction slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    pub name: String,
    pub options: ValueOptions,
    /// Value regex including its outer parentheses, e.g. `(\S+)`
    pub pattern: String,
}

impl Value {
    pub fn is_required(&self) -> bool {
        self.options.contains(ValueOptions::REQUIRED)
    }

    pub fn is_list(&self) -> bool {
        self.options.contains(ValueOptions::LIST)
    }

    pub fn is_filldown(&self) -> bool {
        self.options.contains(ValueOptions::FILLDOWN)
    }

    pub fn is_key(&self) -> bool {
        self.options.contains(ValueOptions::KEY)
    }

    /// The pattern rewritten as a named capture group for this value
    pub(crate) fn named_group(&self) -> String {
        // `pattern` is guaranteed by the compiler to start with '('
        format!("(?P<{}>{}", self.name, &self.pattern[1..])
    }
}

/// What happens to the input line after a rule matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineOp {
    /// Finish with this line and read the next one
    #[default]
    Next,
    /// Keep scanning the remaining rules against the same line
    Continue,
    /// Abort the parse
    Error,
}

/// What happens to the in-progress record after a rule matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordOp {
    #[default]
    NoRecord,
    Record,
    /// Reset every non-Filldown value
    Clear,
    /// Reset every value, Filldown included
    Clearall,
}

/// Resolved rule target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    /// Index into `TemplateDefinition::states`
    State(usize),
    End,
    Eof,
}

/// A single line-matching rule within a state
#[derive(Debug, Clone)]
pub struct Rule {
    /// Pattern as written in the template
    pub source: String,
    /// Pattern with value placeholders expanded to named groups
    pub regex: Regex,
    pub line_op: LineOp,
    pub record_op: RecordOp,
    pub next_state: Option<String>,
    /// Message attached to an `Error` action
    pub message: Option<String>,
    /// 1-based template line the rule was declared on
    pub line: usize,
    /// Indices of values whose named group appears in `regex`
    pub(crate) bindings: Vec<usize>,
    pub(crate) transition: Option<Transition>,
}

/// A named, ordered list of rules
#[derive(Debug, Clone)]
pub struct State {
    pub name: String,
    pub rules: Vec<Rule>,
}

/// Immutable, compiled template
#[derive(Debug, Clone)]
pub struct TemplateDefinition {
    pub(crate) values: Vec<Value>,
    pub(crate) states: Vec<State>,
    /// Index of the `Start` state
    pub(crate) start: usize,
    /// Whether the template declares its own (empty) `EOF` state
    pub(crate) explicit_eof: bool,
}

impl TemplateDefinition {
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Value names in declaration order
    pub fn header(&self) -> Vec<&str> {
        self.values.iter().map(|v| v.name.as_str()).collect()
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.iter().find(|v| v.name == name)
    }

    pub fn state(&self, name: &str) -> Option<&State> {
        self.states.iter().find(|s| s.name == name)
    }

    pub fn has_explicit_eof(&self) -> bool {
        self.explicit_eof
    }
}
