//! Schema evaluator -- pure logic, no I/O.
//!
//! Turns a raw payload (JSON body or multipart text fields) into a
//! normalized payload whose values already have the types the entity DTOs
//! expect, or reports the first failing field.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde_json::{Map, Value};
use validator::{ValidateEmail, ValidateUrl};

use super::rules::{Check, DefaultValue, FieldKind, FieldRule, Mode, Presence, Schema};
use crate::error::CoreError;

/// A JSON object payload.
pub type Payload = Map<String, Value>;

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9][0-9]{7,14}$").expect("phone pattern is valid"));

/// Validate `payload` against `schema`.
///
/// Returns the normalized payload: values coerced to their declared kind,
/// defaults applied (create only) and unknown fields removed (update only).
pub fn validate(schema: &Schema, payload: &Payload, mode: Mode) -> Result<Payload, CoreError> {
    let normalized = validate_object(schema, payload, mode, "")?;
    if mode == Mode::Update && normalized.is_empty() {
        return Err(CoreError::Validation(
            "At least one field must be provided".into(),
        ));
    }
    Ok(normalized)
}

fn validate_object(
    schema: &Schema,
    payload: &Payload,
    mode: Mode,
    prefix: &str,
) -> Result<Payload, CoreError> {
    let mut out = Payload::new();

    for rule in schema.fields {
        let path = join_path(prefix, rule.name);
        match present(payload.get(rule.name)) {
            Some(raw) => {
                let value = coerce(rule, raw, &path)?;
                check_value(rule, &value, &path)?;
                out.insert(rule.name.to_string(), value);
            }
            None if mode == Mode::Create => {
                if matches!(rule.presence, Presence::Required) {
                    return Err(required(&path));
                }
                if let Some(default) = rule.default {
                    out.insert(rule.name.to_string(), default_value(default));
                }
            }
            None => {}
        }
    }

    // Rules that look at sibling fields run once every field is normalized.
    for rule in schema.fields {
        let path = join_path(prefix, rule.name);
        if let Presence::When { field, equals } = rule.presence {
            check_conditional(&out, rule, &path, field, equals)?;
        }
        if let Some(value) = out.get(rule.name) {
            check_cross_field(rule, value, &out, &path)?;
        }
    }

    if mode == Mode::Create {
        if let Some(unknown) = payload.keys().find(|key| schema.field(key).is_none()) {
            return Err(CoreError::invalid_field(
                join_path(prefix, unknown),
                format!("\"{}\" is not allowed", join_path(prefix, unknown)),
            ));
        }
    }

    Ok(out)
}

/// Treat `null` and blank strings as absent.
fn present(value: Option<&Value>) -> Option<&Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(v) => Some(v),
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn required(path: &str) -> CoreError {
    CoreError::invalid_field(path, format!("\"{path}\" is required"))
}

fn invalid(path: &str, reason: &str) -> CoreError {
    CoreError::invalid_field(path, format!("\"{path}\" {reason}"))
}

fn default_value(default: DefaultValue) -> Value {
    match default {
        DefaultValue::Text(s) => Value::String(s.to_string()),
        DefaultValue::Integer(n) => Value::from(n),
    }
}

// ---------------------------------------------------------------------------
// Coercion
// ---------------------------------------------------------------------------

fn coerce(rule: &FieldRule, raw: &Value, path: &str) -> Result<Value, CoreError> {
    match rule.kind {
        FieldKind::Text => match raw {
            Value::String(s) => Ok(Value::String(s.clone())),
            _ => Err(invalid(path, "must be a string")),
        },
        FieldKind::Integer => {
            as_integer(raw).map(Value::from).ok_or_else(|| invalid(path, "must be an integer"))
        }
        FieldKind::Id => match as_integer(raw) {
            Some(id) if id > 0 => Ok(Value::from(id)),
            _ => Err(invalid(path, "must be a valid id")),
        },
        FieldKind::Number => as_number(raw)
            .map(Value::from)
            .ok_or_else(|| invalid(path, "must be a number")),
        FieldKind::Date => raw
            .as_str()
            .and_then(parse_date)
            .map(|date| Value::String(date.format("%Y-%m-%d").to_string()))
            .ok_or_else(|| invalid(path, "must be a valid ISO 8601 date")),
        FieldKind::TextList => {
            let items = decode_list(raw, path)?;
            items
                .iter()
                .enumerate()
                .map(|(i, item)| match item {
                    Value::String(s) => Ok(Value::String(s.clone())),
                    _ => Err(invalid(&format!("{path}[{i}]"), "must be a string")),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        FieldKind::ObjectList(nested) => {
            let items = decode_list(raw, path)?;
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let item_path = format!("{path}[{i}]");
                    match item {
                        Value::Object(obj) => {
                            validate_object(nested, obj, Mode::Create, &item_path).map(Value::Object)
                        }
                        _ => Err(invalid(&item_path, "must be an object")),
                    }
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
    }
}

fn as_integer(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_number(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// Multipart text fields carry lists as JSON strings.
fn decode_list(raw: &Value, path: &str) -> Result<Vec<Value>, CoreError> {
    let decoded;
    let value = match raw {
        Value::String(s) => {
            decoded = serde_json::from_str::<Value>(s)
                .map_err(|_| invalid(path, "must be an array"))?;
            &decoded
        }
        other => other,
    };
    match value {
        Value::Array(items) => Ok(items.clone()),
        _ => Err(invalid(path, "must be an array")),
    }
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

fn check_value(rule: &FieldRule, value: &Value, path: &str) -> Result<(), CoreError> {
    for check in rule.checks {
        let ok = match *check {
            Check::OneOf(allowed) => value.as_str().is_some_and(|s| allowed.contains(&s)),
            Check::MinLength(min) => value.as_str().is_some_and(|s| s.chars().count() >= min),
            Check::Min(min) => value.as_f64().is_some_and(|n| n >= min),
            Check::Max(max) => value.as_f64().is_some_and(|n| n <= max),
            Check::Positive => value.as_f64().is_some_and(|n| n > 0.0),
            Check::MinItems(min) => value.as_array().is_some_and(|items| items.len() >= min),
            Check::Email => value.as_str().is_some_and(|s| s.validate_email()),
            Check::Url => value.as_str().is_some_and(|s| s.validate_url()),
            Check::Phone => value.as_str().is_some_and(|s| {
                let compact: String = s.chars().filter(|c| !matches!(c, ' ' | '-')).collect();
                PHONE_PATTERN.is_match(&compact)
            }),
            Check::AtMostField(_) => true,
        };
        if !ok {
            return Err(invalid(path, &describe(check)));
        }
    }
    Ok(())
}

fn describe(check: &Check) -> String {
    match check {
        Check::OneOf(allowed) => format!("must be one of [{}]", allowed.join(", ")),
        Check::MinLength(min) => format!("length must be at least {min} characters long"),
        Check::Min(min) => format!("must be greater than or equal to {min}"),
        Check::Max(max) => format!("must be less than or equal to {max}"),
        Check::Positive => "must be a positive number".into(),
        Check::MinItems(min) => format!("must contain at least {min} items"),
        Check::Email => "must be a valid email".into(),
        Check::Url => "must be a valid uri".into(),
        Check::Phone => "must be a valid international phone number".into(),
        Check::AtMostField(other) => format!("must be less than or equal to \"{other}\""),
    }
}

fn check_conditional(
    out: &Payload,
    rule: &FieldRule,
    path: &str,
    field: &str,
    equals: &str,
) -> Result<(), CoreError> {
    let has_value = out.contains_key(rule.name);
    match out.get(field).and_then(Value::as_str) {
        Some(actual) if actual == equals => {
            if has_value {
                Ok(())
            } else {
                Err(required(path))
            }
        }
        Some(actual) if has_value => Err(invalid(
            path,
            &format!("is not allowed when \"{field}\" is {actual}"),
        )),
        None if has_value => Err(invalid(path, &format!("requires \"{field}\""))),
        _ => Ok(()),
    }
}

fn check_cross_field(
    rule: &FieldRule,
    value: &Value,
    out: &Payload,
    path: &str,
) -> Result<(), CoreError> {
    for check in rule.checks {
        if let Check::AtMostField(other) = check {
            let limit = out.get(*other).and_then(Value::as_f64);
            if let (Some(n), Some(limit)) = (value.as_f64(), limit) {
                if n > limit {
                    return Err(invalid(path, &describe(check)));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;
    use crate::validation::rules::{Check, DefaultValue, FieldKind, FieldRule, Schema};

    static ITEM_SCHEMA: Schema = Schema::new(
        "Item",
        &[
            FieldRule::required("title", FieldKind::Text),
            FieldRule::required("items", FieldKind::TextList),
        ],
    );

    static TEST_SCHEMA: Schema = Schema::new(
        "Test",
        &[
            FieldRule::required("name", FieldKind::Text),
            FieldRule::optional("status", FieldKind::Text)
                .checks(&[Check::OneOf(&["ACTIVE", "BLOCKED"])])
                .default_to(DefaultValue::Text("ACTIVE")),
            FieldRule::optional("amount", FieldKind::Number).checks(&[Check::Positive]),
            FieldRule::optional("discount", FieldKind::Number)
                .checks(&[Check::Min(0.0), Check::AtMostField("amount")]),
            FieldRule::optional("kind", FieldKind::Text).checks(&[Check::OneOf(&["UPLOAD", "LINK"])]),
            FieldRule::when("url", FieldKind::Text, "kind", "LINK").checks(&[Check::Url]),
            FieldRule::optional("phone", FieldKind::Text).checks(&[Check::Phone]),
            FieldRule::optional("email", FieldKind::Text).checks(&[Check::Email]),
            FieldRule::optional("date", FieldKind::Date),
            FieldRule::optional("parentId", FieldKind::Id),
            FieldRule::optional("includes", FieldKind::ObjectList(&ITEM_SCHEMA))
                .checks(&[Check::MinItems(1)]),
        ],
    );

    fn payload(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            _ => panic!("test payload must be an object"),
        }
    }

    fn field_of(err: CoreError) -> String {
        match err {
            CoreError::InvalidField { field, .. } => field,
            other => panic!("expected InvalidField, got {other:?}"),
        }
    }

    #[test]
    fn create_applies_defaults_and_coerces_strings() {
        let out = validate(
            &TEST_SCHEMA,
            &payload(json!({"name": "n", "amount": "12.5", "parentId": "7", "date": "2024-05-01T10:00:00Z"})),
            Mode::Create,
        )
        .unwrap();
        assert_eq!(out["status"], "ACTIVE");
        assert_eq!(out["amount"], 12.5);
        assert_eq!(out["parentId"], 7);
        assert_eq!(out["date"], "2024-05-01");
    }

    #[test]
    fn create_reports_missing_required_field() {
        let err = validate(&TEST_SCHEMA, &payload(json!({"status": "ACTIVE"})), Mode::Create)
            .unwrap_err();
        assert_matches!(&err, CoreError::InvalidField { message, .. } if message == "\"name\" is required");
    }

    #[test]
    fn blank_string_counts_as_missing() {
        let err = validate(&TEST_SCHEMA, &payload(json!({"name": "  "})), Mode::Create).unwrap_err();
        assert_eq!(field_of(err), "name");
    }

    #[test]
    fn create_rejects_unknown_fields() {
        let err = validate(&TEST_SCHEMA, &payload(json!({"name": "n", "bogus": 1})), Mode::Create)
            .unwrap_err();
        assert_eq!(field_of(err), "bogus");
    }

    #[test]
    fn enum_check_lists_allowed_values() {
        let err = validate(
            &TEST_SCHEMA,
            &payload(json!({"name": "n", "status": "GONE"})),
            Mode::Create,
        )
        .unwrap_err();
        assert_matches!(&err, CoreError::InvalidField { message, .. } if message.contains("[ACTIVE, BLOCKED]"));
    }

    #[test]
    fn discount_bounded_by_amount() {
        let err = validate(
            &TEST_SCHEMA,
            &payload(json!({"name": "n", "amount": 10, "discount": 11})),
            Mode::Create,
        )
        .unwrap_err();
        assert_eq!(field_of(err), "discount");

        let ok = validate(
            &TEST_SCHEMA,
            &payload(json!({"name": "n", "amount": 10, "discount": 10})),
            Mode::Create,
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn conditional_field_required_when_controller_matches() {
        let err = validate(
            &TEST_SCHEMA,
            &payload(json!({"name": "n", "kind": "LINK"})),
            Mode::Create,
        )
        .unwrap_err();
        assert_eq!(field_of(err), "url");
    }

    #[test]
    fn conditional_field_rejected_for_other_controller_value() {
        let err = validate(
            &TEST_SCHEMA,
            &payload(json!({"name": "n", "kind": "UPLOAD", "url": "https://cdn.example.com/a.mp4"})),
            Mode::Create,
        )
        .unwrap_err();
        assert_matches!(&err, CoreError::InvalidField { message, .. } if message.contains("not allowed when"));
    }

    #[test]
    fn conditional_field_needs_controller_in_patch() {
        let err = validate(
            &TEST_SCHEMA,
            &payload(json!({"url": "https://cdn.example.com/a.mp4"})),
            Mode::Update,
        )
        .unwrap_err();
        assert_matches!(&err, CoreError::InvalidField { message, .. } if message.contains("requires \"kind\""));
    }

    #[test]
    fn url_and_phone_and_email_patterns() {
        for (field, bad) in [("phone", "12ab"), ("email", "not-an-email")] {
            let mut body = payload(json!({"name": "n"}));
            body.insert(field.to_string(), json!(bad));
            let err = validate(&TEST_SCHEMA, &body, Mode::Create).unwrap_err();
            assert_eq!(field_of(err), field);
        }
        let ok = validate(
            &TEST_SCHEMA,
            &payload(json!({"name": "n", "phone": "+91 98765-43210", "email": "a@b.io"})),
            Mode::Create,
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn nested_lists_decode_json_strings_and_validate_items() {
        let out = validate(
            &TEST_SCHEMA,
            &payload(json!({"name": "n", "includes": "[{\"title\":\"t\",\"items\":[\"a\"]}]"})),
            Mode::Create,
        )
        .unwrap();
        assert_eq!(out["includes"][0]["items"][0], "a");

        let err = validate(
            &TEST_SCHEMA,
            &payload(json!({"name": "n", "includes": [{"items": []}]})),
            Mode::Create,
        )
        .unwrap_err();
        assert_eq!(field_of(err), "includes[0].title");

        let err = validate(&TEST_SCHEMA, &payload(json!({"name": "n", "includes": []})), Mode::Create)
            .unwrap_err();
        assert_eq!(field_of(err), "includes");
    }

    #[test]
    fn update_drops_unknown_fields_and_skips_defaults() {
        let out = validate(
            &TEST_SCHEMA,
            &payload(json!({"status": "BLOCKED", "bogus": true})),
            Mode::Update,
        )
        .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out["status"], "BLOCKED");
    }

    #[test]
    fn update_requires_at_least_one_known_field() {
        let err = validate(&TEST_SCHEMA, &payload(json!({"bogus": true})), Mode::Update).unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }
}
