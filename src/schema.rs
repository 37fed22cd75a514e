//! Record schema validation
//!
//! A `RecordSchema` describes the shape of a JSON request body: ordered
//! fields, each with a type and a presence rule. Validation runs as its own
//! pass after route matching and yields either the normalized object (in
//! declaration order, defaults filled in, unknown fields dropped) or every
//! issue found.

use serde_json::{Map, Value};

use crate::error::FieldIssue;
use crate::params::{parse_int, ConversionError, INT_PARSING, INT_PARSING_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Int,
    Float,
    Str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Presence {
    Required,
    Default(Value),
    /// May be absent or null; absent becomes null
    Optional,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub presence: Presence,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    pub name: &'static str,
    pub fields: Vec<FieldSpec>,
}

impl RecordSchema {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn required(self, name: &'static str, ty: FieldType) -> Self {
        self.field(name, ty, Presence::Required)
    }

    #[must_use]
    pub fn with_default(self, name: &'static str, ty: FieldType, value: Value) -> Self {
        self.field(name, ty, Presence::Default(value))
    }

    #[must_use]
    pub fn optional(self, name: &'static str, ty: FieldType) -> Self {
        self.field(name, ty, Presence::Optional)
    }

    fn field(mut self, name: &'static str, ty: FieldType, presence: Presence) -> Self {
        self.fields.push(FieldSpec { name, ty, presence });
        self
    }

    /// Parse and validate a raw request body
    ///
    /// Only a JSON content type (or none at all) is decoded as JSON. Any other
    /// content type is validated as the raw text, which is never an object.
    pub fn validate_bytes(
        &self,
        body: &[u8],
        content_type: Option<&str>,
    ) -> Result<Map<String, Value>, Vec<FieldIssue>> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(vec![FieldIssue::missing(vec![Value::from("body")])]);
        }

        if !is_json_content_type(content_type) {
            return self.validate(&Value::from(String::from_utf8_lossy(body).into_owned()));
        }

        let value: Value = serde_json::from_slice(body).map_err(|e| {
            let offset = byte_offset(body, e.line(), e.column());
            vec![FieldIssue::new(
                "json_invalid",
                vec![Value::from("body"), Value::from(offset)],
                format!("JSON decode error: {e}"),
            )]
        })?;

        self.validate(&value)
    }

    /// Validate an already parsed JSON value
    pub fn validate(&self, value: &Value) -> Result<Map<String, Value>, Vec<FieldIssue>> {
        let Value::Object(input) = value else {
            return Err(vec![FieldIssue::new(
                "model_attributes_type",
                vec![Value::from("body")],
                "Input should be a valid dictionary or object to extract fields from",
            )
            .with_input(value.clone())]);
        };

        let mut output = Map::new();
        let mut issues = Vec::new();

        for field in &self.fields {
            let location = vec![Value::from("body"), Value::from(field.name)];
            match (input.get(field.name), &field.presence) {
                (None, Presence::Required) => {
                    issues.push(FieldIssue::missing(location).with_input(value.clone()));
                }
                (None, Presence::Default(default)) => {
                    output.insert(field.name.to_string(), default.clone());
                }
                (None | Some(Value::Null), Presence::Optional) => {
                    output.insert(field.name.to_string(), Value::Null);
                }
                (Some(raw), _) => match coerce(field.ty, raw) {
                    Ok(v) => {
                        output.insert(field.name.to_string(), v);
                    }
                    Err((kind, msg)) => {
                        issues.push(FieldIssue::new(kind, location, msg).with_input(raw.clone()));
                    }
                },
            }
        }

        if issues.is_empty() {
            Ok(output)
        } else {
            tracing::debug!(schema = self.name, issues = issues.len(), "body rejected");
            Err(issues)
        }
    }
}

type CoerceError = ConversionError;

const INT_TYPE: CoerceError = ("int_type", "Input should be a valid integer");
const INT_FROM_FLOAT: CoerceError = (
    "int_from_float",
    "Input should be a valid integer, got a number with a fractional part",
);
const FLOAT_TYPE: CoerceError = ("float_type", "Input should be a valid number");
const FLOAT_PARSING: CoerceError = (
    "float_parsing",
    "Input should be a valid number, unable to parse string as a number",
);
const STRING_TYPE: CoerceError = ("string_type", "Input should be a valid string");

/// Lax-mode conversion of a JSON value to the declared field type
fn coerce(ty: FieldType, raw: &Value) -> Result<Value, CoerceError> {
    match ty {
        FieldType::Int => coerce_int(raw).map(Value::from),
        FieldType::Float => coerce_float(raw).map(Value::from),
        FieldType::Str => match raw {
            Value::String(s) => Ok(Value::from(s.as_str())),
            _ => Err(STRING_TYPE),
        },
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn coerce_int(raw: &Value) -> Result<i64, CoerceError> {
    match raw {
        Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                return Ok(v);
            }
            match n.as_f64() {
                Some(f) if f.fract() != 0.0 => Err(INT_FROM_FLOAT),
                Some(f) if f >= i64::MIN as f64 && f < i64::MAX as f64 => Ok(f as i64),
                Some(_) => Err(INT_PARSING_SIZE),
                None => Err(INT_PARSING),
            }
        }
        Value::String(s) => parse_int(s),
        Value::Bool(b) => Ok(i64::from(*b)),
        _ => Err(INT_TYPE),
    }
}

fn coerce_float(raw: &Value) -> Result<f64, CoerceError> {
    match raw {
        Value::Number(n) => n.as_f64().ok_or(FLOAT_PARSING),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(FLOAT_PARSING),
        },
        Value::Bool(b) => Ok(f64::from(u8::from(*b))),
        _ => Err(FLOAT_TYPE),
    }
}

/// `true` for a missing or blank content type, `application/json` and
/// `application/*+json`, parameters ignored
pub fn is_json_content_type(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type.filter(|c| !c.trim().is_empty()) else {
        return true;
    };
    let media_type = content_type.split(';').next().unwrap_or_default().trim();
    match media_type.split_once('/') {
        Some((main, sub)) if main.eq_ignore_ascii_case("application") => {
            let sub = sub.to_ascii_lowercase();
            sub == "json" || sub.ends_with("+json")
        }
        _ => false,
    }
}

/// Convert serde_json's 1-based line/column into a byte offset
fn byte_offset(body: &[u8], line: usize, column: usize) -> usize {
    let line_start: usize = body
        .split(|b| *b == b'\n')
        .take(line.saturating_sub(1))
        .map(|l| l.len() + 1)
        .sum();
    (line_start + column.saturating_sub(1)).min(body.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item_schema() -> RecordSchema {
        RecordSchema::new("Item")
            .required("id", FieldType::Int)
            .required("name", FieldType::Str)
            .required("price", FieldType::Float)
            .with_default("quantity", FieldType::Int, json!(1))
            .optional("discount", FieldType::Float)
    }

    #[test]
    fn test_defaults_and_order() {
        let out = item_schema()
            .validate(&json!({"price": 2.5, "name": "Bat", "id": 1}))
            .unwrap();
        let keys: Vec<&str> = out.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "name", "price", "quantity", "discount"]);
        assert_eq!(out["quantity"], json!(1));
        assert_eq!(out["discount"], Value::Null);
    }

    #[test]
    fn test_unknown_fields_dropped() {
        let out = item_schema()
            .validate(&json!({"id": 1, "name": "Bat", "price": 2, "color": "red"}))
            .unwrap();
        assert!(!out.contains_key("color"));
        assert_eq!(out["price"], json!(2.0));
    }

    #[test]
    fn test_missing_fields_all_reported() {
        let issues = item_schema().validate(&json!({"name": "Bat"})).unwrap_err();
        let missing: Vec<String> = issues.iter().map(FieldIssue::location).collect();
        assert_eq!(missing, vec!["body.id", "body.price"]);
        assert!(issues.iter().all(|i| i.kind == "missing"));
    }

    #[test]
    fn test_type_mismatches() {
        let issues = item_schema()
            .validate(&json!({"id": "x", "name": 5, "price": "cheap", "quantity": 1.5}))
            .unwrap_err();
        let kinds: Vec<&str> = issues.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec!["int_parsing", "string_type", "float_parsing", "int_from_float"]
        );
        assert_eq!(issues[0].input, Some(json!("x")));
    }

    #[test]
    fn test_lax_coercion() {
        let out = item_schema()
            .validate(&json!({"id": "7", "name": "Bat", "price": "1.25", "quantity": 3.0}))
            .unwrap();
        assert_eq!(out["id"], json!(7));
        assert_eq!(out["price"], json!(1.25));
        assert_eq!(out["quantity"], json!(3));
    }

    #[test]
    fn test_lax_zero_fraction_strings_and_booleans() {
        let out = item_schema()
            .validate(&json!({"id": "7.0", "name": "Bat", "price": true, "quantity": false}))
            .unwrap();
        assert_eq!(out["id"], json!(7));
        assert_eq!(out["price"], json!(1.0));
        assert_eq!(out["quantity"], json!(0));

        let out = item_schema()
            .validate(&json!({"id": true, "name": "Bat", "price": 1}))
            .unwrap();
        assert_eq!(out["id"], json!(1));
    }

    #[test]
    fn test_int_out_of_range() {
        let issues = item_schema()
            .validate(&json!({"id": "99999999999999999999", "name": "Bat", "price": 1, "quantity": 1e30}))
            .unwrap_err();
        let kinds: Vec<&str> = issues.iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec!["int_parsing_size", "int_parsing_size"]);
    }

    #[test]
    fn test_null_handling() {
        let out = item_schema()
            .validate(&json!({"id": 1, "name": "Bat", "price": 1.0, "discount": null}))
            .unwrap();
        assert_eq!(out["discount"], Value::Null);

        let issues = item_schema()
            .validate(&json!({"id": 1, "name": "Bat", "price": 1.0, "quantity": null}))
            .unwrap_err();
        assert_eq!(issues[0].kind, "int_type");
    }

    #[test]
    fn test_body_level_failures() {
        let schema = item_schema();

        let issues = schema.validate_bytes(b"", None).unwrap_err();
        assert_eq!(issues[0].kind, "missing");
        assert_eq!(issues[0].location(), "body");

        let issues = schema.validate_bytes(b"{\"id\": ", None).unwrap_err();
        assert_eq!(issues[0].kind, "json_invalid");

        let issues = schema.validate_bytes(b"[1, 2]", None).unwrap_err();
        assert_eq!(issues[0].kind, "model_attributes_type");
    }

    #[test]
    fn test_non_json_content_type_is_not_decoded() {
        let body = br#"{"id": 1, "name": "Bat", "price": 1}"#;
        let issues = item_schema()
            .validate_bytes(body, Some("text/plain"))
            .unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, "model_attributes_type");
        assert_eq!(issues[0].input, Some(json!(r#"{"id": 1, "name": "Bat", "price": 1}"#)));

        let out = item_schema()
            .validate_bytes(body, Some("application/json; charset=utf-8"))
            .unwrap();
        assert_eq!(out["id"], json!(1));

        let issues = item_schema().validate_bytes(b"  ", Some("text/plain")).unwrap_err();
        assert_eq!(issues[0].kind, "missing");
    }

    #[rstest::rstest]
    #[case(None, true)]
    #[case(Some("application/json"), true)]
    #[case(Some("Application/JSON"), true)]
    #[case(Some("application/json; charset=utf-8"), true)]
    #[case(Some("application/vnd.api+json"), true)]
    #[case(Some("text/plain"), false)]
    #[case(Some("text/json"), false)]
    #[case(Some("application/x-www-form-urlencoded"), false)]
    #[case(Some(""), true)]
    fn test_is_json_content_type(#[case] content_type: Option<&str>, #[case] expected: bool) {
        assert_eq!(is_json_content_type(content_type), expected);
    }

    #[test]
    fn test_byte_offset() {
        assert_eq!(byte_offset(b"abc", 1, 2), 1);
        assert_eq!(byte_offset(b"ab\ncd", 2, 2), 4);
        assert_eq!(byte_offset(b"ab", 1, 10), 2);
    }
}
