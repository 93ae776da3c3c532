//! Record Builder
//!
//! Live value bindings for the record being assembled, and the immutable
//! [`ParsedRecord`] snapshots it produces.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::template::Value;

/// A bound value: a single string, or an ordered list for `List` values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Scalar(String),
    List(Vec<String>),
}

impl FieldValue {
    fn default_for(value: &Value) -> Self {
        if value.is_list() {
            FieldValue::List(Vec::new())
        } else {
            FieldValue::Scalar(String::new())
        }
    }

    /// Whether the field still holds its default (`""` or `[]`)
    pub fn is_default(&self) -> bool {
        match self {
            FieldValue::Scalar(s) => s.is_empty(),
            FieldValue::List(items) => items.is_empty(),
        }
    }

    /// Scalar view: the string itself, or the first list element
    pub fn as_scalar(&self) -> &str {
        match self {
            FieldValue::Scalar(s) => s,
            FieldValue::List(items) => items.first().map(String::as_str).unwrap_or(""),
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            FieldValue::Scalar(_) => None,
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Scalar(s) => serializer.serialize_str(s),
            FieldValue::List(items) => items.serialize(serializer),
        }
    }
}

/// One emitted record. Fields keep template declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedRecord {
    fields: Vec<(String, FieldValue)>,
}

impl ParsedRecord {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Scalar view of a field; absent fields read as `""`
    pub fn scalar(&self, name: &str) -> &str {
        self.get(name).map(FieldValue::as_scalar).unwrap_or("")
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, FieldValue)> for ParsedRecord {
    fn from_iter<I: IntoIterator<Item = (N, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        }
    }
}

impl Serialize for ParsedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Bindings for the in-progress record, one slot per template value
#[derive(Debug)]
pub struct RecordBuilder<'t> {
    values: &'t [Value],
    bindings: Vec<FieldValue>,
}

impl<'t> RecordBuilder<'t> {
    pub fn new(values: &'t [Value]) -> Self {
        Self {
            values,
            bindings: values.iter().map(FieldValue::default_for).collect(),
        }
    }

    /// Bind text to the value at `index`: `List` values append, others
    /// overwrite
    pub fn bind(&mut self, index: usize, text: &str) {
        match &mut self.bindings[index] {
            FieldValue::List(items) => items.push(text.to_string()),
            FieldValue::Scalar(current) => {
                current.clear();
                current.push_str(text);
            }
        }
    }

    pub fn binding(&self, name: &str) -> Option<&FieldValue> {
        self.values
            .iter()
            .position(|v| v.name == name)
            .map(|i| &self.bindings[i])
    }

    /// Snapshot the bindings, then reset every non-Filldown value.
    ///
    /// Returns `None` without emitting when no value is bound or a `Required`
    /// value is unbound; the reset happens either way.
    pub fn record(&mut self) -> Option<ParsedRecord> {
        let emit = self.bindings.iter().any(|b| !b.is_default())
            && self
                .values
                .iter()
                .zip(&self.bindings)
                .all(|(value, binding)| !value.is_required() || !binding.is_default());

        let record = emit.then(|| {
            self.values
                .iter()
                .zip(&self.bindings)
                .map(|(value, binding)| (value.name.clone(), binding.clone()))
                .collect()
        });

        self.clear();
        record
    }

    /// Reset every value not flagged `Filldown`
    pub fn clear(&mut self) {
        for (value, binding) in self.values.iter().zip(self.bindings.iter_mut()) {
            if !value.is_filldown() {
                *binding = FieldValue::default_for(value);
            }
        }
    }

    /// Reset every value, `Filldown` included
    pub fn clear_all(&mut self) {
        for (value, binding) in self.values.iter().zip(self.bindings.iter_mut()) {
            *binding = FieldValue::default_for(value);
        }
    }

    /// Whether the end-of-input step should emit a record: some `Required`
    /// value is bound, or, for templates without `Required` values, some
    /// non-Filldown value is bound
    pub fn has_pending_record(&self) -> bool {
        let mut pairs = self.values.iter().zip(&self.bindings);
        if self.values.iter().any(Value::is_required) {
            pairs.any(|(value, binding)| value.is_required() && !binding.is_default())
        } else {
            pairs.any(|(value, binding)| !value.is_filldown() && !binding.is_default())
        }
    }
}
