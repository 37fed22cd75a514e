//! Parameter binding
//!
//! Converts raw path captures and query pairs into typed values according to
//! a route's `ParamSpec` list. All problems are collected in one pass.

use serde_json::{Map, Value};
use std::num::IntErrorKind;

use super::query::QueryPairs;
use super::spec::{ParamSpec, ParamType, ParamValue, PathEnum, Requirement, Source};
use crate::error::{loc, DispatchError, FieldIssue};

/// Values bound for one request, handed to the handler
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: Vec<(&'static str, ParamValue)>,
    body: Option<Map<String, Value>>,
}

impl Params {
    pub fn insert(&mut self, name: &'static str, value: ParamValue) {
        self.values.push((name, value));
    }

    pub fn set_body(&mut self, body: Map<String, Value>) {
        self.body = Some(body);
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    pub fn int(&self, name: &str) -> Result<i64, DispatchError> {
        match self.get(name) {
            Some(ParamValue::Int(v)) => Ok(*v),
            other => Err(unbound(name, "int", other)),
        }
    }

    pub fn float_opt(&self, name: &str) -> Option<f64> {
        match self.get(name) {
            Some(ParamValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Result<&str, DispatchError> {
        self.text_opt(name)
            .ok_or_else(|| unbound(name, "str", self.get(name)))
    }

    pub fn text_opt(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(ParamValue::Str(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn list_opt(&self, name: &str) -> Option<&[String]> {
        match self.get(name) {
            Some(ParamValue::List(v)) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Bound enum label converted back to its Rust variant
    pub fn enumerated<E: PathEnum>(&self, name: &str) -> Result<E, DispatchError> {
        self.text_opt(name)
            .and_then(E::from_label)
            .ok_or_else(|| unbound(name, "enum", self.get(name)))
    }

    /// Validated request body
    pub fn body(&self) -> Result<&Map<String, Value>, DispatchError> {
        self.body
            .as_ref()
            .ok_or_else(|| DispatchError::validation(FieldIssue::missing(vec![Value::from("body")])))
    }
}

fn unbound(name: &str, expected: &str, found: Option<&ParamValue>) -> DispatchError {
    let issue = match found {
        None => FieldIssue::missing(vec![Value::from(name)]),
        Some(value) => FieldIssue::new(
            "type_mismatch",
            vec![Value::from(name)],
            format!("Bound value is not of type {expected}"),
        )
        .with_input(value.to_json()),
    };
    DispatchError::validation(issue)
}

/// Bind every spec from the matched path captures and the query string.
pub fn bind(
    specs: &[ParamSpec],
    captures: &[(String, String)],
    query: &QueryPairs,
) -> Result<Params, Vec<FieldIssue>> {
    let mut params = Params::default();
    let mut issues = Vec::new();

    for spec in specs {
        match bind_one(spec, captures, query) {
            Ok(Some(value)) => params.insert(spec.name, value),
            Ok(None) => {}
            Err(issue) => issues.push(issue),
        }
    }

    if issues.is_empty() {
        Ok(params)
    } else {
        Err(issues)
    }
}

fn bind_one(
    spec: &ParamSpec,
    captures: &[(String, String)],
    query: &QueryPairs,
) -> Result<Option<ParamValue>, FieldIssue> {
    let location = loc(spec.source.as_str(), spec.name);

    let raw = match spec.source {
        Source::Path => captures
            .iter()
            .find(|(name, _)| name == spec.name)
            .map(|(_, value)| RawValue::One(value.clone())),
        Source::Query if spec.ty == ParamType::StrList => {
            let values = query.all(spec.name);
            (!values.is_empty()).then_some(RawValue::Many(values))
        }
        Source::Query => query.last(spec.name).map(|v| RawValue::One(v.to_string())),
    };

    let Some(raw) = raw else {
        return match &spec.requirement {
            Requirement::Required => Err(FieldIssue::missing(location)),
            Requirement::Default(value) => Ok(Some(value.clone())),
            Requirement::Optional => Ok(None),
        };
    };

    if spec.deprecated {
        tracing::warn!(param = spec.name, "deprecated parameter supplied");
    }

    match raw {
        RawValue::Many(values) => Ok(Some(ParamValue::List(values))),
        RawValue::One(value) => convert(spec, &value, location).map(Some),
    }
}

/// Error kind and message for a failed string conversion
pub type ConversionError = (&'static str, &'static str);

pub const INT_PARSING: ConversionError = (
    "int_parsing",
    "Input should be a valid integer, unable to parse string as an integer",
);
pub const INT_PARSING_SIZE: ConversionError = (
    "int_parsing_size",
    "Unable to parse input string as an integer, exceeded maximum size",
);

/// Lax integer parsing: surrounding whitespace and a fractional part made
/// only of zeros (`"5.0"`, `"5."`) are accepted. Values are bounded to `i64`.
pub fn parse_int(raw: &str) -> Result<i64, ConversionError> {
    let trimmed = raw.trim();
    let digits = match trimmed.split_once('.') {
        Some((whole, fraction)) if fraction.bytes().all(|b| b == b'0') => whole,
        Some(_) => return Err(INT_PARSING),
        None => trimmed,
    };
    digits.parse::<i64>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => INT_PARSING_SIZE,
        _ => INT_PARSING,
    })
}

enum RawValue {
    One(String),
    Many(Vec<String>),
}

fn convert(spec: &ParamSpec, raw: &str, location: Vec<Value>) -> Result<ParamValue, FieldIssue> {
    let input = Value::from(raw);
    match spec.ty {
        ParamType::Int => parse_int(raw)
            .map(ParamValue::Int)
            .map_err(|(kind, msg)| FieldIssue::new(kind, location, msg).with_input(input)),
        ParamType::Float => match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(ParamValue::Float(v)),
            _ => Err(FieldIssue::new(
                "float_parsing",
                location,
                "Input should be a valid number, unable to parse string as a number",
            )
            .with_input(input)),
        },
        ParamType::Str => match spec.max_length {
            Some(max) if raw.chars().count() > max => Err(FieldIssue::new(
                "string_too_long",
                location,
                format!("String should have at most {max} characters"),
            )
            .with_input(input)),
            _ => Ok(ParamValue::Str(raw.to_string())),
        },
        ParamType::Enum(labels) => {
            if labels.contains(&raw) {
                Ok(ParamValue::Str(raw.to_string()))
            } else {
                Err(FieldIssue::new("enum", location, enum_message(labels)).with_input(input))
            }
        }
        ParamType::StrList => Ok(ParamValue::List(vec![raw.to_string()])),
    }
}

/// `Input should be 'A', 'B' or 'C'`
fn enum_message(labels: &[&str]) -> String {
    let quoted: Vec<String> = labels.iter().map(|l| format!("'{l}'")).collect();
    match quoted.split_last() {
        None => "Input should be one of no values".to_string(),
        Some((last, [])) => format!("Input should be {last}"),
        Some((last, rest)) => format!("Input should be {} or {last}", rest.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const LABELS: &[&str] = &["Praneeth", "Rohit", "Venu", "Jyothi"];

    fn captures(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_applied_when_absent() {
        let specs = vec![
            ParamSpec::query("skip", ParamType::Int).default(ParamValue::Int(0)),
            ParamSpec::query("limit", ParamType::Int).default(ParamValue::Int(10)),
        ];
        let params = bind(&specs, &[], &QueryPairs::parse(Some("limit=2"))).unwrap();
        assert_eq!(params.int("skip").unwrap(), 0);
        assert_eq!(params.int("limit").unwrap(), 2);
    }

    #[test]
    fn test_optional_absent_binds_nothing() {
        let specs = vec![ParamSpec::query("price", ParamType::Float).optional()];
        let params = bind(&specs, &[], &QueryPairs::default()).unwrap();
        assert_eq!(params.get("price"), None);
        assert_eq!(params.float_opt("price"), None);
    }

    #[test]
    fn test_missing_required_reports_location() {
        let specs = vec![ParamSpec::query("item_id", ParamType::Int)];
        let issues = bind(&specs, &[], &QueryPairs::default()).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, "missing");
        assert_eq!(issues[0].loc, json!(["query", "item_id"]).as_array().unwrap().clone());
    }

    #[test]
    fn test_conversion_failure_names_parameter() {
        let specs = vec![
            ParamSpec::path("item_id", ParamType::Int),
            ParamSpec::query("price", ParamType::Float).optional(),
        ];
        let issues = bind(
            &specs,
            &captures(&[("item_id", "abc")]),
            &QueryPairs::parse(Some("price=cheap")),
        )
        .unwrap_err();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].kind, "int_parsing");
        assert_eq!(issues[0].location(), "path.item_id");
        assert_eq!(issues[0].input, Some(json!("abc")));
        assert_eq!(issues[1].kind, "float_parsing");
        assert_eq!(issues[1].location(), "query.price");
    }

    #[rstest::rstest]
    #[case("5", Ok(5))]
    #[case(" -12 ", Ok(-12))]
    #[case("5.0", Ok(5))]
    #[case("5.000", Ok(5))]
    #[case("5.", Ok(5))]
    #[case("5.5", Err(INT_PARSING))]
    #[case(".0", Err(INT_PARSING))]
    #[case("five", Err(INT_PARSING))]
    #[case("99999999999999999999", Err(INT_PARSING_SIZE))]
    #[case("-99999999999999999999", Err(INT_PARSING_SIZE))]
    fn test_parse_int_lax(#[case] raw: &str, #[case] expected: Result<i64, ConversionError>) {
        assert_eq!(parse_int(raw), expected);
    }

    #[test]
    fn test_int_out_of_range_has_own_kind() {
        let specs = vec![ParamSpec::path("item_id", ParamType::Int)];
        let issues = bind(
            &specs,
            &captures(&[("item_id", "99999999999999999999")]),
            &QueryPairs::parse(None),
        )
        .unwrap_err();
        assert_eq!(issues[0].kind, "int_parsing_size");
        assert_eq!(issues[0].input, Some(json!("99999999999999999999")));
    }

    #[test]
    fn test_non_finite_float_rejected() {
        let specs = vec![ParamSpec::query("price", ParamType::Float)];
        assert!(bind(&specs, &[], &QueryPairs::parse(Some("price=inf"))).is_err());
        assert!(bind(&specs, &[], &QueryPairs::parse(Some("price=NaN"))).is_err());
    }

    #[test]
    fn test_scalar_takes_last_occurrence() {
        let specs = vec![ParamSpec::query("qty", ParamType::Int)];
        let params = bind(&specs, &[], &QueryPairs::parse(Some("qty=1&qty=7"))).unwrap();
        assert_eq!(params.int("qty").unwrap(), 7);
    }

    #[test]
    fn test_list_collects_in_order() {
        let specs = vec![ParamSpec::query("q", ParamType::StrList).optional()];
        let params = bind(&specs, &[], &QueryPairs::parse(Some("q=b&x=1&q=a&q=b"))).unwrap();
        assert_eq!(
            params.list_opt("q").unwrap(),
            &["b".to_string(), "a".to_string(), "b".to_string()]
        );

        let params = bind(&specs, &[], &QueryPairs::default()).unwrap();
        assert_eq!(params.list_opt("q"), None);
    }

    #[test]
    fn test_max_length_counts_chars() {
        let specs = vec![ParamSpec::query("q", ParamType::Str).optional().max_length(3)];
        assert!(bind(&specs, &[], &QueryPairs::parse(Some("q=%C3%A9%C3%A9%C3%A9"))).is_ok());

        let issues = bind(&specs, &[], &QueryPairs::parse(Some("q=abcd"))).unwrap_err();
        assert_eq!(issues[0].kind, "string_too_long");
        assert_eq!(issues[0].msg, "String should have at most 3 characters");
    }

    #[test]
    fn test_enum_membership() {
        let specs = vec![ParamSpec::path("name_id", ParamType::Enum(LABELS))];
        let params = bind(&specs, &captures(&[("name_id", "Venu")]), &QueryPairs::default()).unwrap();
        assert_eq!(params.text("name_id").unwrap(), "Venu");

        let issues =
            bind(&specs, &captures(&[("name_id", "venu")]), &QueryPairs::default()).unwrap_err();
        assert_eq!(issues[0].kind, "enum");
        assert_eq!(
            issues[0].msg,
            "Input should be 'Praneeth', 'Rohit', 'Venu' or 'Jyothi'"
        );
    }

    #[test]
    fn test_accessor_type_mismatch_is_error() {
        let mut params = Params::default();
        params.insert("q", ParamValue::Str("x".into()));
        assert!(params.int("q").is_err());
        assert!(params.int("absent").is_err());
        assert!(params.body().is_err());
    }

    #[test]
    fn test_enum_message_shapes() {
        assert_eq!(enum_message(&["A"]), "Input should be 'A'");
        assert_eq!(enum_message(&["A", "B"]), "Input should be 'A' or 'B'");
    }
}
