//! Mutable-until-frozen message container
//!
//! A message is bound to exactly one schema and moves through a one-way
//! lifecycle: created with defaults populated, mutated through
//! field-mediated accessors, then frozen. Every mutator rejects a frozen
//! message; a frozen message is safe to share and read concurrently.

use crate::field::Rule;
use crate::schema::Schema;
use crate::value::Value;
use crate::{Error, Result};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// Per-field storage, shaped by the field's cardinality rule. Sets keep
/// `(normalized key, original value)` pairs in insertion order so dedup is
/// by canonical form while first-inserted casing survives.
#[derive(Debug, Clone, PartialEq)]
enum Stored {
    Single(Value),
    Set(Vec<(String, Value)>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

/// A keyed value store conforming to one [`Schema`].
#[derive(Debug, Clone)]
pub struct Message {
    schema: Arc<Schema>,
    data: HashMap<String, Stored>,
    cleared: HashSet<String>,
    frozen: bool,
    is_replay: Option<bool>,
}

impl Message {
    /// Create a message for `schema` with all single-value field defaults
    /// populated (including the discriminator).
    pub fn new(schema: Arc<Schema>) -> Result<Self> {
        let mut message = Self {
            schema,
            data: HashMap::new(),
            cleared: HashSet::new(),
            frozen: false,
            is_replay: None,
        };
        message.populate_defaults()?;
        Ok(message)
    }

    /// The schema this message conforms to.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Whether the message is frozen.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// The replay flag, when it has been set.
    pub fn is_replay(&self) -> Option<bool> {
        self.is_replay
    }

    /// Whether a field holds any value.
    pub fn has(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }

    /// Whether a field was explicitly cleared.
    pub fn was_cleared(&self, name: &str) -> bool {
        self.cleared.contains(name)
    }

    /// Single-value accessor.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self.data.get(name) {
            Some(Stored::Single(v)) => Some(v),
            _ => None,
        }
    }

    /// Set accessor; values in insertion order.
    pub fn get_set(&self, name: &str) -> Vec<&Value> {
        match self.data.get(name) {
            Some(Stored::Set(entries)) => entries.iter().map(|(_, v)| v).collect(),
            _ => Vec::new(),
        }
    }

    /// List accessor.
    pub fn get_list(&self, name: &str) -> &[Value] {
        match self.data.get(name) {
            Some(Stored::List(items)) => items,
            _ => &[],
        }
    }

    /// List element accessor.
    pub fn get_from_list_at(&self, name: &str, index: usize) -> Option<&Value> {
        self.get_list(name).get(index)
    }

    /// Map accessor.
    pub fn get_map(&self, name: &str) -> Option<&BTreeMap<String, Value>> {
        match self.data.get(name) {
            Some(Stored::Map(map)) => Some(map),
            _ => None,
        }
    }

    /// Map entry accessor.
    pub fn get_from_map(&self, name: &str, key: &str) -> Option<&Value> {
        self.get_map(name).and_then(|m| m.get(key))
    }

    /// Whether `value` is in the set, by normalized key.
    pub fn is_in_set(&self, name: &str, value: &Value) -> bool {
        let Some(key) = value.set_key() else {
            return false;
        };
        match self.data.get(name) {
            Some(Stored::Set(entries)) => entries.iter().any(|(k, _)| k == &key),
            _ => false,
        }
    }

    fn check_not_frozen(&self) -> Result<()> {
        if self.frozen {
            Err(Error::FrozenMessageIsImmutable {
                schema: self.schema.id().to_string(),
            })
        } else {
            Ok(())
        }
    }

    fn expect_rule(&self, name: &str, rule: Rule) -> Result<()> {
        let field = self.schema.get_field(name)?;
        if field.rule() == rule {
            Ok(())
        } else {
            Err(Error::assertion(
                name,
                format!("field expects {:?} cardinality, not {rule:?}", field.rule()),
            ))
        }
    }

    /// Set a single-value field. Passing `None` delegates to [`clear`].
    ///
    /// [`clear`]: Message::clear
    pub fn set(&mut self, name: &str, value: impl Into<Option<Value>>) -> Result<&mut Self> {
        let Some(value) = value.into() else {
            return self.clear(name);
        };

        self.check_not_frozen()?;
        self.expect_rule(name, Rule::SingleValue)?;
        let schema = Arc::clone(&self.schema);
        schema.get_field(name)?.guard_value(&value)?;

        self.data.insert(name.to_string(), Stored::Single(value));
        self.cleared.remove(name);
        Ok(self)
    }

    /// Remove a field's value, record it as cleared, then re-apply the
    /// field's default (which may leave it unset when the default is
    /// empty).
    pub fn clear(&mut self, name: &str) -> Result<&mut Self> {
        self.check_not_frozen()?;
        let schema = Arc::clone(&self.schema);
        let field = schema.get_field(name)?;

        self.data.remove(name);
        self.cleared.insert(name.to_string());

        if field.is_a_single_value() {
            if let Some(default) = field.get_default(Some(self)) {
                field.guard_value(&default)?;
                self.data
                    .insert(name.to_string(), Stored::Single(default));
            }
        }
        Ok(self)
    }

    /// Add values to a set field, deduping by trimmed/lowercased canonical
    /// key. The first inserted form of a key wins. Every value is checked
    /// before anything is stored; one that normalizes to an empty key
    /// fails the whole call.
    pub fn add_to_set(&mut self, name: &str, values: Vec<Value>) -> Result<&mut Self> {
        self.check_not_frozen()?;
        self.expect_rule(name, Rule::Set)?;
        let schema = Arc::clone(&self.schema);
        let field = schema.get_field(name)?;

        let mut incoming = Vec::with_capacity(values.len());
        for value in values {
            field.guard_value(&value)?;
            let key = value.set_key().ok_or_else(|| {
                Error::assertion(name, format!("{} has no set key", value.type_label()))
            })?;
            if key.is_empty() {
                return Err(Error::assertion(
                    name,
                    "set values must normalize to a non-empty key",
                ));
            }
            incoming.push((key, value));
        }
        if incoming.is_empty() {
            return Ok(self);
        }

        let entries = match self
            .data
            .entry(name.to_string())
            .or_insert_with(|| Stored::Set(Vec::new()))
        {
            Stored::Set(entries) => entries,
            _ => unreachable!("rule checked above"),
        };
        for (key, value) in incoming {
            if !entries.iter().any(|(k, _)| k == &key) {
                entries.push((key, value));
            }
        }
        self.cleared.remove(name);
        Ok(self)
    }

    /// Remove values from a set field, by normalized key.
    pub fn remove_from_set(&mut self, name: &str, values: Vec<Value>) -> Result<&mut Self> {
        self.check_not_frozen()?;
        self.expect_rule(name, Rule::Set)?;

        let keys: HashSet<String> = values.iter().filter_map(|v| v.set_key()).collect();
        if let Some(Stored::Set(entries)) = self.data.get_mut(name) {
            entries.retain(|(k, _)| !keys.contains(k));
            if entries.is_empty() {
                self.data.remove(name);
            }
        }
        Ok(self)
    }

    /// Append values to a list field.
    pub fn add_to_list(&mut self, name: &str, values: Vec<Value>) -> Result<&mut Self> {
        self.check_not_frozen()?;
        self.expect_rule(name, Rule::List)?;
        let schema = Arc::clone(&self.schema);
        let field = schema.get_field(name)?;

        for value in &values {
            field.guard_value(value)?;
        }
        if values.is_empty() {
            return Ok(self);
        }

        match self
            .data
            .entry(name.to_string())
            .or_insert_with(|| Stored::List(Vec::new()))
        {
            Stored::List(items) => items.extend(values),
            _ => unreachable!("rule checked above"),
        }
        self.cleared.remove(name);
        Ok(self)
    }

    /// Remove the list element at `index`; out-of-range is a no-op.
    pub fn remove_from_list_at(&mut self, name: &str, index: usize) -> Result<&mut Self> {
        self.check_not_frozen()?;
        self.expect_rule(name, Rule::List)?;

        if let Some(Stored::List(items)) = self.data.get_mut(name) {
            if index < items.len() {
                items.remove(index);
            }
            if items.is_empty() {
                self.data.remove(name);
            }
        }
        Ok(self)
    }

    /// Put a keyed value into a map field.
    pub fn add_to_map(&mut self, name: &str, key: &str, value: Value) -> Result<&mut Self> {
        self.check_not_frozen()?;
        self.expect_rule(name, Rule::Map)?;
        if key.is_empty() {
            return Err(Error::assertion(name, "map keys must be non-empty"));
        }
        let schema = Arc::clone(&self.schema);
        schema.get_field(name)?.guard_value(&value)?;

        match self
            .data
            .entry(name.to_string())
            .or_insert_with(|| Stored::Map(BTreeMap::new()))
        {
            Stored::Map(map) => {
                map.insert(key.to_string(), value);
            }
            _ => unreachable!("rule checked above"),
        }
        self.cleared.remove(name);
        Ok(self)
    }

    /// Remove a keyed value from a map field.
    pub fn remove_from_map(&mut self, name: &str, key: &str) -> Result<&mut Self> {
        self.check_not_frozen()?;
        self.expect_rule(name, Rule::Map)?;

        if let Some(Stored::Map(map)) = self.data.get_mut(name) {
            map.remove(key);
            if map.is_empty() {
                self.data.remove(name);
            }
        }
        Ok(self)
    }

    /// Populate defaults for any single-value field still unset.
    pub fn populate_defaults(&mut self) -> Result<&mut Self> {
        self.check_not_frozen()?;
        let schema = Arc::clone(&self.schema);

        for field in schema.fields() {
            if self.has(field.name()) || !field.is_a_single_value() {
                continue;
            }
            if let Some(default) = field.get_default(Some(self)) {
                field.guard_value(&default)?;
                self.data
                    .insert(field.name().to_string(), Stored::Single(default));
            }
        }
        Ok(self)
    }

    /// Check that every required field is populated.
    pub fn validate(&self) -> Result<()> {
        for field in self.schema.required_fields() {
            if !self.has(field.name()) {
                return Err(Error::required_field_not_set(
                    self.schema.id().to_string(),
                    field.name(),
                ));
            }
        }
        Ok(())
    }

    /// Validate, then flip the frozen flag and recursively freeze every
    /// nested message value. Idempotent.
    pub fn freeze(&mut self) -> Result<&mut Self> {
        if self.frozen {
            return Ok(self);
        }
        self.validate()?;
        self.frozen = true;

        for stored in self.data.values_mut() {
            match stored {
                Stored::Single(Value::Message(m)) => {
                    m.freeze()?;
                }
                Stored::List(items) => {
                    for value in items {
                        if let Value::Message(m) = value {
                            m.freeze()?;
                        }
                    }
                }
                Stored::Map(map) => {
                    for value in map.values_mut() {
                        if let Value::Message(m) = value {
                            m.freeze()?;
                        }
                    }
                }
                // Message kinds are not allowed in sets.
                _ => {}
            }
        }
        Ok(self)
    }

    /// Set the one-shot replay flag. Marking `replay = true` freezes the
    /// message as a documented side effect.
    pub fn set_is_replay(&mut self, replay: bool) -> Result<&mut Self> {
        if self.is_replay.is_some() {
            return Err(Error::ReplayAlreadySet {
                schema: self.schema.id().to_string(),
            });
        }
        self.is_replay = Some(replay);
        if replay {
            self.freeze()?;
        }
        Ok(self)
    }

    /// Deep-clone this message with the frozen and replay state reset on
    /// the copy and every nested message, yielding a fresh mutable graph.
    pub fn mutable_copy(&self) -> Self {
        let mut copy = self.clone();
        copy.reset_lifecycle();
        copy
    }

    /// Cleared markers that show on the wire: a cleared field whose
    /// default repopulated carries its value and leaves no trace in the
    /// serialized form.
    fn wire_visible_cleared(&self) -> HashSet<&str> {
        self.cleared
            .iter()
            .filter(|name| !self.data.contains_key(name.as_str()))
            .map(String::as_str)
            .collect()
    }

    fn reset_lifecycle(&mut self) {
        self.frozen = false;
        self.is_replay = None;
        for stored in self.data.values_mut() {
            match stored {
                Stored::Single(Value::Message(m)) => m.reset_lifecycle(),
                Stored::List(items) => {
                    for value in items {
                        if let Value::Message(m) = value {
                            m.reset_lifecycle();
                        }
                    }
                }
                Stored::Map(map) => {
                    for value in map.values_mut() {
                        if let Value::Message(m) = value {
                            m.reset_lifecycle();
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

/// Messages are equal when their canonical serialized forms are equal:
/// same schema id, same stored values, and the same cleared markers where
/// those are visible on the wire (a cleared field whose default
/// repopulated serializes like an untouched one). Frozen and replay state
/// are lifecycle metadata, not data.
impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.schema.id() == other.schema.id()
            && self.data == other.data
            && self.wire_visible_cleared() == other.wire_visible_cleared()
    }
}
