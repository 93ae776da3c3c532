//! Template Compiler
//!
//! Turns TextFSM-style template source into an immutable
//! [`TemplateDefinition`]. Compilation is all-or-nothing: the first violation
//! aborts with a [`TemplateSyntaxError`].
//!
//! ```text
//! Value Required INTERFACE (\S+)
//! Value List VLANS (\d+)
//!
//! Start
//!   ^Interface ${INTERFACE} -> Continue.Record
//!   ^\s+vlan ${VLANS}
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::{TemplateResult, TemplateSyntaxError};
use super::schema::{
    LineOp, RecordOp, Rule, State, TemplateDefinition, Transition, Value, ValueOptions, END_STATE,
    EOF_STATE, START_STATE,
};

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex"));

static STATE_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w+$").expect("state name regex"));

// Greedy on the pattern side: the last " ->" splits pattern from action.
static MATCH_ACTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<pattern>.*)\s->(?P<action>.*)$").expect("action split regex"));

/// Compile template source into a definition
pub fn compile(source: &str) -> TemplateResult<TemplateDefinition> {
    let mut compiler = Compiler::default();

    for (idx, raw) in source.lines().enumerate() {
        compiler.feed(idx + 1, raw)?;
    }

    compiler.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Section {
    #[default]
    Values,
    States,
}

/// State block still being read
struct OpenState {
    name: String,
    line: usize,
    rules: Vec<Rule>,
}

#[derive(Default)]
struct Compiler {
    section: Section,
    values: Vec<Value>,
    states: Vec<State>,
    declared: Vec<String>,
    explicit_eof: bool,
    open: Option<OpenState>,
}

impl Compiler {
    fn feed(&mut self, line: usize, raw: &str) -> TemplateResult<()> {
        let trimmed = raw.trim();
        if trimmed.starts_with('#') {
            return Ok(());
        }

        match self.section {
            Section::Values => {
                if trimmed.is_empty() {
                    if !self.values.is_empty() {
                        self.section = Section::States;
                    }
                    return Ok(());
                }
                if is_value_line(raw) {
                    let value = parse_value(line, trimmed)?;
                    if self.values.iter().any(|v| v.name == value.name) {
                        return Err(TemplateSyntaxError::DuplicateValue {
                            line,
                            name: value.name,
                        });
                    }
                    self.values.push(value);
                    return Ok(());
                }
                if !self.values.is_empty() {
                    return Err(TemplateSyntaxError::UnexpectedLine {
                        line,
                        text: trimmed.to_string(),
                    });
                }
                // No value section at all, states start right away
                self.section = Section::States;
                self.feed_state_line(line, raw)
            }
            Section::States => self.feed_state_line(line, raw),
        }
    }

    fn feed_state_line(&mut self, line: usize, raw: &str) -> TemplateResult<()> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            self.close_state();
            return Ok(());
        }

        if raw.starts_with(char::is_whitespace) {
            let rule = parse_rule(line, trimmed, &self.values)?;
            return match self.open.as_mut() {
                Some(open) if is_reserved(&open.name) => {
                    Err(TemplateSyntaxError::NonEmptyReservedState {
                        line,
                        name: open.name.clone(),
                    })
                }
                Some(open) => {
                    open.rules.push(rule);
                    Ok(())
                }
                None => Err(TemplateSyntaxError::UnexpectedLine {
                    line,
                    text: trimmed.to_string(),
                }),
            };
        }

        if !STATE_NAME_RE.is_match(trimmed) {
            return Err(TemplateSyntaxError::InvalidStateName {
                line,
                name: trimmed.to_string(),
            });
        }
        if self.declared.iter().any(|name| name == trimmed) {
            return Err(TemplateSyntaxError::DuplicateState {
                line,
                name: trimmed.to_string(),
            });
        }

        self.close_state();
        self.declared.push(trimmed.to_string());
        self.open = Some(OpenState {
            name: trimmed.to_string(),
            line,
            rules: Vec::new(),
        });
        Ok(())
    }

    fn close_state(&mut self) {
        let Some(open) = self.open.take() else {
            return;
        };

        match open.name.as_str() {
            EOF_STATE => self.explicit_eof = true,
            END_STATE => {}
            _ => {
                log::trace!("compiled state '{}' (line {})", open.name, open.line);
                self.states.push(State {
                    name: open.name,
                    rules: open.rules,
                });
            }
        }
    }

    fn finish(mut self) -> TemplateResult<TemplateDefinition> {
        self.close_state();

        let start = self
            .states
            .iter()
            .position(|s| s.name == START_STATE)
            .ok_or(TemplateSyntaxError::MissingStartState)?;

        let names: Vec<String> = self.states.iter().map(|s| s.name.clone()).collect();
        for rule in self.states.iter_mut().flat_map(|s| s.rules.iter_mut()) {
            let Some(target) = &rule.next_state else {
                continue;
            };
            let transition = match target.as_str() {
                END_STATE => Transition::End,
                EOF_STATE => Transition::Eof,
                name => names
                    .iter()
                    .position(|n| n == name)
                    .map(Transition::State)
                    .ok_or_else(|| TemplateSyntaxError::UnknownState {
                        line: rule.line,
                        state: target.clone(),
                    })?,
            };
            rule.transition = Some(transition);
        }

        Ok(TemplateDefinition {
            values: self.values,
            states: self.states,
            start,
            explicit_eof: self.explicit_eof,
        })
    }
}

fn is_reserved(name: &str) -> bool {
    name == END_STATE || name == EOF_STATE
}

fn is_value_line(raw: &str) -> bool {
    raw.strip_prefix("Value")
        .is_some_and(|rest| rest.starts_with(char::is_whitespace))
}

/// Parse `Value [Opt[,Opt]] NAME (regex)`
fn parse_value(line: usize, text: &str) -> TemplateResult<Value> {
    let invalid = || TemplateSyntaxError::InvalidValue {
        line,
        text: text.to_string(),
    };

    let rest = text["Value".len()..].trim_start();
    let (first, after_first) = split_token(rest).ok_or_else(invalid)?;

    let (options_text, name, pattern) = if after_first.starts_with('(') {
        (None, first, after_first)
    } else {
        let (name, pattern) = split_token(after_first).ok_or_else(invalid)?;
        (Some(first), name, pattern)
    };

    if pattern.is_empty() {
        return Err(invalid());
    }
    if !IDENTIFIER_RE.is_match(name) {
        return Err(TemplateSyntaxError::InvalidValueName {
            line,
            name: name.to_string(),
        });
    }

    let mut options = ValueOptions::empty();
    for keyword in options_text.into_iter().flat_map(|o| o.split(',')) {
        let flag =
            ValueOptions::from_keyword(keyword).ok_or_else(|| TemplateSyntaxError::UnknownOption {
                line,
                name: name.to_string(),
                option: keyword.to_string(),
            })?;
        if options.contains(flag) {
            return Err(TemplateSyntaxError::DuplicateOption {
                line,
                name: name.to_string(),
                option: keyword.to_string(),
            });
        }
        options |= flag;
    }

    if !pattern.starts_with('(') || !pattern.ends_with(')') || pattern.ends_with(r"\)") {
        return Err(TemplateSyntaxError::UnwrappedValueRegex {
            line,
            pattern: pattern.to_string(),
        });
    }
    check_regex(line, pattern)?;

    Ok(Value {
        name: name.to_string(),
        options,
        pattern: pattern.to_string(),
    })
}

/// Parse an indented rule line (already trimmed)
fn parse_rule(line: usize, text: &str, values: &[Value]) -> TemplateResult<Rule> {
    if !text.starts_with('^') {
        return Err(TemplateSyntaxError::InvalidRule {
            line,
            text: text.to_string(),
        });
    }

    let (source, action) = match MATCH_ACTION_RE.captures(text) {
        Some(caps) => (
            caps["pattern"].trim_end().to_string(),
            Some(caps["action"].trim().to_string()),
        ),
        None => (text.to_string(), None),
    };

    let (expanded, bindings) = expand_placeholders(line, &source, values)?;
    let regex = check_regex(line, &expanded)?;

    let mut rule = Rule {
        source,
        regex,
        line_op: LineOp::Next,
        record_op: RecordOp::NoRecord,
        next_state: None,
        message: None,
        line,
        bindings,
        transition: None,
    };

    if let Some(action) = action {
        parse_action(line, &action, &mut rule)?;
    }

    Ok(rule)
}

/// Parse the text after `->` into the rule's operators and target
fn parse_action(line: usize, action: &str, rule: &mut Rule) -> TemplateResult<()> {
    let invalid = || TemplateSyntaxError::InvalidAction {
        line,
        action: action.to_string(),
    };

    let Some((op, rest)) = split_token(action) else {
        return Ok(());
    };

    if let Some((line_op, record_op)) = op.split_once('.') {
        rule.line_op = parse_line_op(line_op).ok_or_else(invalid)?;
        rule.record_op = parse_record_op(record_op).ok_or_else(invalid)?;
    } else if let Some(line_op) = parse_line_op(op) {
        rule.line_op = line_op;
    } else if let Some(record_op) = parse_record_op(op) {
        rule.record_op = record_op;
    } else {
        if !rest.is_empty() || !STATE_NAME_RE.is_match(op) {
            return Err(invalid());
        }
        rule.next_state = Some(op.to_string());
        return Ok(());
    }

    if rule.line_op == LineOp::Error {
        if !rest.is_empty() {
            let message = rest
                .strip_prefix('"')
                .and_then(|m| m.strip_suffix('"'))
                .unwrap_or(rest);
            rule.message = Some(message.to_string());
        }
        return Ok(());
    }

    if !rest.is_empty() {
        if rest.contains(char::is_whitespace) || !STATE_NAME_RE.is_match(rest) {
            return Err(invalid());
        }
        if rule.line_op == LineOp::Continue {
            return Err(TemplateSyntaxError::ContinueWithTransition {
                line,
                state: rest.to_string(),
            });
        }
        rule.next_state = Some(rest.to_string());
    }

    Ok(())
}

fn parse_line_op(text: &str) -> Option<LineOp> {
    match text {
        "Next" => Some(LineOp::Next),
        "Continue" => Some(LineOp::Continue),
        "Error" => Some(LineOp::Error),
        _ => None,
    }
}

fn parse_record_op(text: &str) -> Option<RecordOp> {
    match text {
        "NoRecord" => Some(RecordOp::NoRecord),
        "Record" => Some(RecordOp::Record),
        "Clear" => Some(RecordOp::Clear),
        "Clearall" => Some(RecordOp::Clearall),
        _ => None,
    }
}

/// Replace `${NAME}` / `$NAME` with named capture groups and `$$` with `$`.
///
/// Returns the expanded pattern and the indices of the values it binds.
fn expand_placeholders(
    line: usize,
    pattern: &str,
    values: &[Value],
) -> TemplateResult<(String, Vec<usize>)> {
    let mut out = String::with_capacity(pattern.len());
    let mut bindings = Vec::new();
    let mut chars = pattern.char_indices().peekable();

    while let Some((_, ch)) = chars.next() {
        if ch != '$' {
            out.push(ch);
            continue;
        }

        let name = match chars.peek() {
            Some(&(_, '$')) => {
                chars.next();
                out.push('$');
                continue;
            }
            Some(&(start, '{')) => {
                let close = pattern[start..]
                    .find('}')
                    .ok_or_else(|| TemplateSyntaxError::InvalidRule {
                        line,
                        text: pattern.to_string(),
                    })?;
                let name = &pattern[start + 1..start + close];
                while chars.next_if(|&(i, _)| i <= start + close).is_some() {}
                name
            }
            Some(&(start, c)) if c.is_ascii_alphabetic() || c == '_' => {
                let mut end = start;
                while let Some((i, c)) = chars.next_if(|&(_, c)| c.is_ascii_alphanumeric() || c == '_')
                {
                    end = i + c.len_utf8();
                }
                &pattern[start..end]
            }
            // A bare `$` stays a regex anchor
            _ => {
                out.push('$');
                continue;
            }
        };

        let index = values
            .iter()
            .position(|v| v.name == name)
            .ok_or_else(|| TemplateSyntaxError::UndefinedValue {
                line,
                name: name.to_string(),
            })?;
        out.push_str(&values[index].named_group());
        if !bindings.contains(&index) {
            bindings.push(index);
        }
    }

    Ok((out, bindings))
}

fn check_regex(line: usize, pattern: &str) -> TemplateResult<Regex> {
    Regex::new(pattern).map_err(|e| TemplateSyntaxError::InvalidRegex {
        line,
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// Split off the first whitespace-delimited token
fn split_token(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }
    match text.find(char::is_whitespace) {
        Some(end) => Some((&text[..end], text[end..].trim())),
        None => Some((text, "")),
    }
}
