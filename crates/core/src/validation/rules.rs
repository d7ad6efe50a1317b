//! Declarative schema types.
//!
//! Schemas are plain `static` data built with `const fn` helpers, e.g.
//!
//! ```ignore
//! pub static CATEGORY_SCHEMA: Schema = Schema::new("Category", &[
//!     FieldRule::required("name", FieldKind::Text),
//!     FieldRule::optional("imageUrl", FieldKind::Text),
//! ]);
//! ```

/// The shape a field value is coerced into.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// A JSON string, kept verbatim.
    Text,
    /// A whole number; numeric strings are parsed.
    Integer,
    /// Any finite number; numeric strings are parsed.
    Number,
    /// A positive row id; numeric strings are parsed.
    Id,
    /// An ISO-8601 date or date-time, normalized to `YYYY-MM-DD`.
    Date,
    /// A list of strings. A JSON-encoded string is decoded first.
    TextList,
    /// A list of objects, each validated against the nested schema.
    /// A JSON-encoded string is decoded first.
    ObjectList(&'static Schema),
}

/// When a field has to be present.
#[derive(Debug, Clone, Copy)]
pub enum Presence {
    Required,
    Optional,
    /// Required when `field` equals `equals`, rejected when `field` holds
    /// any other value.
    When {
        field: &'static str,
        equals: &'static str,
    },
}

/// Value inserted for an absent field on create.
#[derive(Debug, Clone, Copy)]
pub enum DefaultValue {
    Text(&'static str),
    Integer(i64),
}

/// A constraint applied after coercion.
#[derive(Debug, Clone, Copy)]
pub enum Check {
    /// The text value must be one of these.
    OneOf(&'static [&'static str]),
    /// Minimum text length in characters.
    MinLength(usize),
    /// Inclusive numeric lower bound.
    Min(f64),
    /// Inclusive numeric upper bound.
    Max(f64),
    /// Strictly greater than zero.
    Positive,
    /// Numeric value must not exceed the (normalized) value of another field.
    AtMostField(&'static str),
    /// Minimum number of list items.
    MinItems(usize),
    Email,
    Url,
    /// International phone number, optional leading `+`, 8 to 15 digits.
    Phone,
}

/// One field of a schema.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
    pub default: Option<DefaultValue>,
    pub checks: &'static [Check],
}

impl FieldRule {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Required,
            default: None,
            checks: &[],
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Optional,
            default: None,
            checks: &[],
        }
    }

    /// Field that is required only while `field == equals`.
    pub const fn when(
        name: &'static str,
        kind: FieldKind,
        field: &'static str,
        equals: &'static str,
    ) -> Self {
        Self {
            name,
            kind,
            presence: Presence::When { field, equals },
            default: None,
            checks: &[],
        }
    }

    pub const fn default_to(self, value: DefaultValue) -> Self {
        Self {
            default: Some(value),
            ..self
        }
    }

    pub const fn checks(self, checks: &'static [Check]) -> Self {
        Self { checks, ..self }
    }
}

/// A named, ordered set of field rules. Rule order decides which failure
/// is reported first.
#[derive(Debug)]
pub struct Schema {
    pub entity: &'static str,
    pub fields: &'static [FieldRule],
}

impl Schema {
    pub const fn new(entity: &'static str, fields: &'static [FieldRule]) -> Self {
        Self { entity, fields }
    }

    /// Look up a rule by field name.
    pub fn field(&self, name: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|rule| rule.name == name)
    }
}

/// Whether a payload creates a record or patches an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Required fields enforced, defaults applied, unknown fields rejected.
    Create,
    /// Only supplied fields checked, unknown fields dropped, at least one
    /// known field must remain.
    Update,
}
