//! FSM Interpreter
//!
//! Drives a compiled template over input text one line at a time. All
//! mutable state (current state, bindings, emitted records) belongs to one
//! [`Interpreter`]; the [`TemplateDefinition`] is only ever read.

use crate::parser::error::{ParseError, ParseResult};
use crate::parser::record::{ParsedRecord, RecordBuilder};
use crate::template::schema::{LineOp, RecordOp, Rule, TemplateDefinition, Transition};

/// Whether the interpreter wants more input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// A rule moved to `End` or `EOF`; further lines are ignored
    Stopped,
}

/// Per-call interpreter state
#[derive(Debug)]
pub struct Interpreter<'t> {
    template: &'t TemplateDefinition,
    strict: bool,
    state: usize,
    line_number: usize,
    builder: RecordBuilder<'t>,
    records: Vec<ParsedRecord>,
    terminal: Option<Transition>,
}

impl<'t> Interpreter<'t> {
    pub fn new(template: &'t TemplateDefinition, strict: bool) -> Self {
        Self {
            template,
            strict,
            state: template.start,
            line_number: 0,
            builder: RecordBuilder::new(&template.values),
            records: Vec::new(),
            terminal: None,
        }
    }

    /// Name of the active state
    pub fn state_name(&self) -> &'t str {
        &self.template.states[self.state].name
    }

    /// Records emitted so far
    pub fn records(&self) -> &[ParsedRecord] {
        &self.records
    }

    /// Process one input line
    pub fn feed_line(&mut self, line: &str) -> ParseResult<Flow> {
        if self.terminal.is_some() {
            return Ok(Flow::Stopped);
        }
        self.line_number += 1;

        let template = self.template;
        let mut matched = false;

        for rule in &template.states[self.state].rules {
            let Some(caps) = rule.regex.captures(line) else {
                continue;
            };
            matched = true;

            for &index in &rule.bindings {
                if let Some(m) = caps.name(&template.values[index].name) {
                    self.builder.bind(index, m.as_str());
                }
            }

            if rule.line_op == LineOp::Error {
                return Err(ParseError::ErrorAction {
                    line_number: self.line_number,
                    state: self.state_name().to_string(),
                    line: line.to_string(),
                    message: rule.message.clone(),
                });
            }

            self.apply_record_op(rule.record_op);

            if let Some(transition) = rule.transition {
                self.transition(rule, transition);
            }

            if rule.line_op != LineOp::Continue {
                break;
            }
        }

        if !matched {
            if self.strict {
                return Err(ParseError::UnmatchedLine {
                    line_number: self.line_number,
                    state: self.state_name().to_string(),
                    line: line.to_string(),
                });
            }
            log::trace!(
                "line {}: no match in state '{}', skipped",
                self.line_number,
                self.state_name()
            );
        }

        Ok(if self.terminal.is_some() {
            Flow::Stopped
        } else {
            Flow::Continue
        })
    }

    /// Run the end-of-input step and return every emitted record
    pub fn finish(mut self) -> Vec<ParsedRecord> {
        let skip_eof = self.terminal == Some(Transition::End) || self.template.explicit_eof;

        if !skip_eof && self.builder.has_pending_record() {
            self.emit();
        }

        log::debug!(
            "parse finished after {} lines with {} records",
            self.line_number,
            self.records.len()
        );
        self.records
    }

    fn apply_record_op(&mut self, op: RecordOp) {
        match op {
            RecordOp::NoRecord => {}
            RecordOp::Record => self.emit(),
            RecordOp::Clear => self.builder.clear(),
            RecordOp::Clearall => self.builder.clear_all(),
        }
    }

    fn emit(&mut self) {
        if let Some(record) = self.builder.record() {
            log::debug!(
                "line {}: record #{} emitted",
                self.line_number,
                self.records.len() + 1
            );
            self.records.push(record);
        }
    }

    fn transition(&mut self, rule: &Rule, transition: Transition) {
        log::trace!(
            "line {}: '{}' -> '{}' (template line {})",
            self.line_number,
            self.state_name(),
            rule.next_state.as_deref().unwrap_or_default(),
            rule.line
        );

        match transition {
            Transition::State(index) => self.state = index,
            Transition::End | Transition::Eof => self.terminal = Some(transition),
        }
    }
}

/// Parse `text` with `template`.
///
/// In strict mode a line no rule matches fails the parse; otherwise it is
/// skipped.
pub fn parse(
    text: &str,
    template: &TemplateDefinition,
    strict: bool,
) -> ParseResult<Vec<ParsedRecord>> {
    let mut interpreter = Interpreter::new(template, strict);

    for line in text.lines() {
        if interpreter.feed_line(line)? == Flow::Stopped {
            break;
        }
    }

    Ok(interpreter.finish())
}

/// Non-strict [`parse`]
pub fn parse_text(text: &str, template: &TemplateDefinition) -> ParseResult<Vec<ParsedRecord>> {
    parse(text, template, false)
}
