//! Field descriptor and builder

use crate::format::Format;
use crate::message::Message;
use crate::type_name::TypeName;
use crate::types;
use crate::value::Value;
use crate::{Error, Result};
use pbj_identity::SchemaCurie;
use regex::Regex;
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Grammar for field names.
static FIELD_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]{0,126}$").expect("valid field name regex"));

/// Cardinality of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rule {
    /// Exactly zero or one value.
    #[default]
    SingleValue,
    /// Unordered-by-contract unique values, deduped by canonical string key.
    Set,
    /// Ordered values, duplicates allowed.
    List,
    /// String-keyed values.
    Map,
}

/// Caller-supplied cross-field or business-rule check, run after the
/// type-level guard.
pub type Assertion = Arc<dyn Fn(&Value, &Field) -> Result<()> + Send + Sync>;

/// Caller-supplied default producer, invoked with the message being
/// populated (when available) and the field.
pub type DefaultProvider = Arc<dyn Fn(Option<&Message>, &Field) -> Option<Value> + Send + Sync>;

/// How a field's default is produced.
#[derive(Clone)]
enum FieldDefault {
    Literal(Value),
    Provider(DefaultProvider),
}

/// An immutable field descriptor: name, type, cardinality, bounds, and
/// default policy. Built via [`FieldBuilder`].
#[derive(Clone)]
pub struct Field {
    name: String,
    type_name: TypeName,
    rule: Rule,
    required: bool,
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<Regex>,
    format: Option<Format>,
    min: Option<i64>,
    max: Option<i64>,
    precision: u8,
    scale: u8,
    default: Option<FieldDefault>,
    use_type_default: bool,
    payload_curies: Vec<Arc<SchemaCurie>>,
    allowed_values: Vec<Value>,
    assertion: Option<Assertion>,
    overridable: bool,
}

impl Field {
    /// Start building a field of the given type.
    pub fn builder(name: impl Into<String>, type_name: TypeName) -> FieldBuilder {
        FieldBuilder::new(name, type_name)
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type kind.
    pub fn type_name(&self) -> TypeName {
        self.type_name
    }

    /// Cardinality rule.
    pub fn rule(&self) -> Rule {
        self.rule
    }

    /// Whether the field must be populated for the message to validate.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether the field holds a single value.
    pub fn is_a_single_value(&self) -> bool {
        self.rule == Rule::SingleValue
    }

    /// Whether the field holds a set.
    pub fn is_a_set(&self) -> bool {
        self.rule == Rule::Set
    }

    /// Whether the field holds a list.
    pub fn is_a_list(&self) -> bool {
        self.rule == Rule::List
    }

    /// Whether the field holds a map.
    pub fn is_a_map(&self) -> bool {
        self.rule == Rule::Map
    }

    /// Minimum byte length for string/binary kinds.
    pub fn min_length(&self) -> usize {
        self.min_length.unwrap_or(0)
    }

    /// Maximum byte length for string/binary kinds, capped by the type.
    pub fn max_length(&self) -> Option<usize> {
        match (self.max_length, self.type_name.max_bytes()) {
            (Some(f), Some(t)) => Some(f.min(t)),
            (Some(f), None) => Some(f),
            (None, t) => t,
        }
    }

    /// Regex the value must match, for string kinds.
    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    /// Named format the value must satisfy, for string kinds.
    pub fn format(&self) -> Option<Format> {
        self.format
    }

    /// Lower numeric bound, tightening the type's own bound.
    pub fn min(&self) -> Option<i64> {
        self.min
    }

    /// Upper numeric bound, tightening the type's own bound.
    pub fn max(&self) -> Option<i64> {
        self.max
    }

    /// Total digits for decimal kinds.
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Fractional digits for decimal kinds.
    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// Expected payload curies for message and message-ref kinds. A nested
    /// message matches when its schema's curie equals one of these or
    /// composes one as a mixin; empty means any.
    pub fn payload_curies(&self) -> &[Arc<SchemaCurie>] {
        &self.payload_curies
    }

    /// Closed value set for enum kinds; empty means unconstrained.
    pub fn allowed_values(&self) -> &[Value] {
        &self.allowed_values
    }

    /// Whether a later schema (or composing schema) may replace this field
    /// with a structurally compatible one.
    pub fn is_overridable(&self) -> bool {
        self.overridable
    }

    /// Whether an overriding field is structurally compatible: same name,
    /// type, rule, and required flag.
    pub fn is_compatible_for_override(&self, other: &Field) -> bool {
        self.name == other.name
            && self.type_name == other.type_name
            && self.rule == other.rule
            && self.required == other.required
    }

    /// Guard a value against this field: required fields reject empty
    /// values, then type-level structure and bounds, then the
    /// caller-supplied assertion if configured.
    pub fn guard_value(&self, value: &Value) -> Result<()> {
        if self.required {
            let empty = match value {
                Value::String(s) => s.is_empty(),
                Value::Binary(b) => b.is_empty(),
                _ => false,
            };
            if empty {
                return Err(Error::assertion(
                    &self.name,
                    "required field cannot hold an empty value",
                ));
            }
        }
        types::guard(value, self)?;
        if let Some(assertion) = &self.assertion {
            assertion(value, self)?;
        }
        Ok(())
    }

    /// Produce the field's default, if any. A literal default wins, then a
    /// provider, then the type default for single-value fields with
    /// `use_type_default` on.
    pub fn get_default(&self, message: Option<&Message>) -> Option<Value> {
        if let Some(default) = &self.default {
            return match default {
                FieldDefault::Literal(v) => Some(v.clone()),
                FieldDefault::Provider(f) => f(message, self),
            };
        }
        if self.rule == Rule::SingleValue && self.use_type_default {
            return self.type_name.default_value();
        }
        None
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("rule", &self.rule)
            .field("required", &self.required)
            .field("overridable", &self.overridable)
            .finish_non_exhaustive()
    }
}

/// Fluent builder producing an immutable [`Field`].
///
/// Defaults: rule=single-value, required=false, precision=10, scale=2,
/// use_type_default=true, overridable=false.
pub struct FieldBuilder {
    name: String,
    type_name: TypeName,
    rule: Rule,
    required: bool,
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<String>,
    format: Option<Format>,
    min: Option<i64>,
    max: Option<i64>,
    precision: u8,
    scale: u8,
    default: Option<FieldDefault>,
    use_type_default: bool,
    payload_curies: Vec<Arc<SchemaCurie>>,
    allowed_values: Vec<Value>,
    assertion: Option<Assertion>,
    overridable: bool,
}

impl FieldBuilder {
    /// Start building a field of the given type.
    pub fn new(name: impl Into<String>, type_name: TypeName) -> Self {
        Self {
            name: name.into(),
            type_name,
            rule: Rule::SingleValue,
            required: false,
            min_length: None,
            max_length: None,
            pattern: None,
            format: None,
            min: None,
            max: None,
            precision: 10,
            scale: 2,
            default: None,
            use_type_default: true,
            payload_curies: Vec::new(),
            allowed_values: Vec::new(),
            assertion: None,
            overridable: false,
        }
    }

    /// Set the cardinality rule.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rule = rule;
        self
    }

    /// Mark the field required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Minimum byte length for string/binary kinds.
    pub fn min_length(mut self, len: usize) -> Self {
        self.min_length = Some(len);
        self
    }

    /// Maximum byte length for string/binary kinds.
    pub fn max_length(mut self, len: usize) -> Self {
        self.max_length = Some(len);
        self
    }

    /// Regex source the value must match; compiled at build time.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Named format constraint.
    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Lower numeric bound.
    pub fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    /// Upper numeric bound.
    pub fn max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    /// Total digits for decimal kinds.
    pub fn precision(mut self, precision: u8) -> Self {
        self.precision = precision;
        self
    }

    /// Fractional digits for decimal kinds.
    pub fn scale(mut self, scale: u8) -> Self {
        self.scale = scale;
        self
    }

    /// Literal default value, re-guarded at build time.
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(FieldDefault::Literal(value));
        self
    }

    /// Default producer invoked at populate time.
    pub fn default_provider(mut self, provider: DefaultProvider) -> Self {
        self.default = Some(FieldDefault::Provider(provider));
        self
    }

    /// Disable the type-level default fallback.
    pub fn no_type_default(mut self) -> Self {
        self.use_type_default = false;
        self
    }

    /// Add an expected payload curie for message/message-ref kinds.
    pub fn payload_curie(mut self, curie: Arc<SchemaCurie>) -> Self {
        self.payload_curies.push(curie);
        self
    }

    /// Constrain enum kinds to this closed value set.
    pub fn allowed_values(mut self, values: Vec<Value>) -> Self {
        self.allowed_values = values;
        self
    }

    /// Attach a caller-supplied assertion run after the type guard.
    pub fn assertion(mut self, assertion: Assertion) -> Self {
        self.assertion = Some(assertion);
        self
    }

    /// Allow composing schemas to override this field.
    pub fn overridable(mut self) -> Self {
        self.overridable = true;
        self
    }

    /// Snapshot the configuration into an immutable [`Field`], validating
    /// the name grammar, rule/type compatibility, bounds ordering, pattern
    /// compilation, and any literal default.
    pub fn build(self) -> Result<Field> {
        if !FIELD_NAME_PATTERN.is_match(&self.name) {
            return Err(Error::assertion(
                &self.name,
                "field name must match [a-zA-Z_][a-zA-Z0-9_]{0,126}",
            ));
        }

        if self.rule == Rule::Set && !self.type_name.allowed_in_set() {
            return Err(Error::assertion(
                &self.name,
                format!("type {} is not allowed in a set", self.type_name),
            ));
        }

        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(Error::assertion(
                    &self.name,
                    format!("min {min} exceeds max {max}"),
                ));
            }
        }

        if let (Some(min), Some(max)) = (self.min_length, self.max_length) {
            if min > max {
                return Err(Error::assertion(
                    &self.name,
                    format!("min_length {min} exceeds max_length {max}"),
                ));
            }
        }

        let pattern = match self.pattern {
            Some(p) => Some(Regex::new(&p).map_err(|e| {
                Error::assertion(&self.name, format!("invalid pattern '{p}': {e}"))
            })?),
            None => None,
        };

        if matches!(self.default, Some(FieldDefault::Literal(_))) && self.rule != Rule::SingleValue
        {
            return Err(Error::assertion(
                &self.name,
                "literal defaults apply only to single-value fields",
            ));
        }

        let field = Field {
            name: self.name,
            type_name: self.type_name,
            rule: self.rule,
            required: self.required,
            min_length: self.min_length,
            max_length: self.max_length,
            pattern,
            format: self.format,
            min: self.min,
            max: self.max,
            precision: self.precision,
            scale: self.scale,
            default: self.default,
            use_type_default: self.use_type_default,
            payload_curies: self.payload_curies,
            allowed_values: self.allowed_values,
            assertion: self.assertion,
            overridable: self.overridable,
        };

        if let Some(FieldDefault::Literal(v)) = &field.default {
            types::guard(v, &field)?;
        }

        Ok(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let f = Field::builder("title", TypeName::String).build().unwrap();
        assert_eq!(f.name(), "title");
        assert_eq!(f.rule(), Rule::SingleValue);
        assert!(!f.is_required());
        assert!(!f.is_overridable());
        assert_eq!(f.precision(), 10);
        assert_eq!(f.scale(), 2);
    }

    #[test]
    fn test_bad_name_rejected() {
        assert!(Field::builder("9title", TypeName::String).build().is_err());
        assert!(Field::builder("", TypeName::String).build().is_err());
        assert!(Field::builder("has space", TypeName::String).build().is_err());
    }

    #[test]
    fn test_set_rule_rejected_for_disallowed_type() {
        let err = Field::builder("points", TypeName::GeoPoint)
            .rule(Rule::Set)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::AssertionFailed { .. }));

        assert!(
            Field::builder("tags", TypeName::String)
                .rule(Rule::Set)
                .build()
                .is_ok()
        );
    }

    #[test]
    fn test_bounds_ordering() {
        assert!(
            Field::builder("n", TypeName::Int)
                .min(10)
                .max(5)
                .build()
                .is_err()
        );
        assert!(
            Field::builder("s", TypeName::String)
                .min_length(10)
                .max_length(5)
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_pattern_compiles_at_build() {
        assert!(
            Field::builder("s", TypeName::String)
                .pattern("([")
                .build()
                .is_err()
        );
        let f = Field::builder("s", TypeName::String)
            .pattern("^[a-z]+$")
            .build()
            .unwrap();
        assert!(f.pattern().unwrap().is_match("abc"));
    }

    #[test]
    fn test_literal_default_guarded() {
        let err = Field::builder("n", TypeName::TinyInt)
            .default_value(Value::Int(9000))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::AssertionFailed { .. }));
    }

    #[test]
    fn test_literal_default_only_for_single() {
        let err = Field::builder("tags", TypeName::String)
            .rule(Rule::Set)
            .default_value(Value::from("x"))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::AssertionFailed { .. }));
    }

    #[test]
    fn test_get_default_precedence() {
        let literal = Field::builder("n", TypeName::Int)
            .default_value(Value::Int(7))
            .build()
            .unwrap();
        assert_eq!(literal.get_default(None), Some(Value::Int(7)));

        let type_default = Field::builder("n", TypeName::Int).build().unwrap();
        assert_eq!(type_default.get_default(None), Some(Value::Int(0)));

        let suppressed = Field::builder("n", TypeName::Int)
            .no_type_default()
            .build()
            .unwrap();
        assert_eq!(suppressed.get_default(None), None);

        let provider = Field::builder("n", TypeName::Int)
            .default_provider(Arc::new(|_, _| Some(Value::Int(42))))
            .build()
            .unwrap();
        assert_eq!(provider.get_default(None), Some(Value::Int(42)));
    }

    #[test]
    fn test_max_length_caps_at_type() {
        let f = Field::builder("s", TypeName::String)
            .max_length(9000)
            .build()
            .unwrap();
        assert_eq!(f.max_length(), Some(255));
    }

    #[test]
    fn test_override_compatibility() {
        let a = Field::builder("title", TypeName::String)
            .required()
            .overridable()
            .build()
            .unwrap();
        let same = Field::builder("title", TypeName::String)
            .required()
            .build()
            .unwrap();
        let different_type = Field::builder("title", TypeName::Text)
            .required()
            .build()
            .unwrap();
        let different_rule = Field::builder("title", TypeName::String)
            .required()
            .rule(Rule::List)
            .build()
            .unwrap();

        assert!(a.is_compatible_for_override(&same));
        assert!(!a.is_compatible_for_override(&different_type));
        assert!(!a.is_compatible_for_override(&different_rule));
    }

    #[test]
    fn test_required_rejects_empty_values() {
        let required = Field::builder("title", TypeName::String)
            .required()
            .build()
            .unwrap();
        assert!(required.guard_value(&Value::from("")).is_err());
        assert!(required.guard_value(&Value::from("x")).is_ok());

        let optional = Field::builder("title", TypeName::String).build().unwrap();
        assert!(optional.guard_value(&Value::from("")).is_ok());

        let payload = Field::builder("payload", TypeName::Binary)
            .required()
            .build()
            .unwrap();
        assert!(payload.guard_value(&Value::Binary(vec![])).is_err());
        assert!(payload.guard_value(&Value::Binary(vec![1])).is_ok());
    }

    #[test]
    fn test_assertion_runs_after_guard() {
        let f = Field::builder("title", TypeName::String)
            .assertion(Arc::new(|v, field| {
                if v.as_str() == Some("forbidden") {
                    Err(Error::assertion(field.name(), "forbidden title"))
                } else {
                    Ok(())
                }
            }))
            .build()
            .unwrap();

        assert!(f.guard_value(&Value::from("ok")).is_ok());
        assert!(f.guard_value(&Value::from("forbidden")).is_err());
    }
}
