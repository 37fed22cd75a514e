//! Parameter descriptors
//!
//! A `ParamSpec` states where a value comes from, what type it must convert
//! to, and what happens when it is absent.

use serde_json::Value;
use std::fmt;

/// Where a parameter is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Path,
    Query,
}

impl Source {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
        }
    }
}

/// Declared type of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Int,
    Float,
    Str,
    /// Closed set of string labels, compared by value
    Enum(&'static [&'static str]),
    /// Every occurrence of a repeated query key, in order
    StrList,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Str => write!(f, "str"),
            Self::Enum(labels) => write!(f, "enum({})", labels.join("|")),
            Self::StrList => write!(f, "list[str]"),
        }
    }
}

/// A bound parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<String>),
}

impl ParamValue {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Int(v) => Value::from(*v),
            Self::Float(v) => Value::from(*v),
            Self::Str(v) => Value::from(v.as_str()),
            Self::List(v) => Value::from(v.clone()),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

/// What to do when the parameter is absent from the request
#[derive(Debug, Clone, PartialEq)]
pub enum Requirement {
    Required,
    Default(ParamValue),
    /// Absent is allowed and binds nothing
    Optional,
}

/// Closed enumeration usable as a path or query parameter
pub trait PathEnum: Sized + Copy {
    const LABELS: &'static [&'static str];

    fn from_label(label: &str) -> Option<Self>;

    fn label(self) -> &'static str;
}

#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub source: Source,
    pub ty: ParamType,
    pub requirement: Requirement,
    /// Maximum length in characters (strings only)
    pub max_length: Option<usize>,
    /// Still accepted; a warning is logged when supplied
    pub deprecated: bool,
    /// Listed in the route description printed at startup
    pub include_in_schema: bool,
}

impl ParamSpec {
    fn new(name: &'static str, source: Source, ty: ParamType) -> Self {
        Self {
            name,
            source,
            ty,
            requirement: Requirement::Required,
            max_length: None,
            deprecated: false,
            include_in_schema: true,
        }
    }

    /// Required path placeholder
    pub fn path(name: &'static str, ty: ParamType) -> Self {
        Self::new(name, Source::Path, ty)
    }

    /// Query parameter, required unless a default or `optional()` is set
    pub fn query(name: &'static str, ty: ParamType) -> Self {
        Self::new(name, Source::Query, ty)
    }

    #[must_use]
    pub fn default(mut self, value: ParamValue) -> Self {
        self.requirement = Requirement::Default(value);
        self
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.requirement = Requirement::Optional;
        self
    }

    #[must_use]
    pub const fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    #[must_use]
    pub const fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// Exclude from the startup route listing
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.include_in_schema = false;
        self
    }

    /// One-line description, e.g. `skip:int=0` or `q:str?`
    pub fn describe(&self) -> String {
        let mut out = format!("{}:{}", self.name, self.ty);
        match &self.requirement {
            Requirement::Required => {}
            Requirement::Default(value) => out.push_str(&format!("={value}")),
            Requirement::Optional => out.push('?'),
        }
        if let Some(max) = self.max_length {
            out.push_str(&format!(" (max_length={max})"));
        }
        if self.deprecated {
            out.push_str(" (deprecated)");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let spec = ParamSpec::query("skip", ParamType::Int);
        assert_eq!(spec.source, Source::Query);
        assert_eq!(spec.requirement, Requirement::Required);
        assert!(spec.include_in_schema);
        assert!(!spec.deprecated);
    }

    #[test]
    fn test_describe() {
        let spec = ParamSpec::query("skip", ParamType::Int).default(ParamValue::Int(0));
        assert_eq!(spec.describe(), "skip:int=0");

        let spec = ParamSpec::query("q", ParamType::Str).optional().max_length(50);
        assert_eq!(spec.describe(), "q:str? (max_length=50)");

        let spec = ParamSpec::query("qty", ParamType::Int)
            .default(ParamValue::Int(1))
            .deprecated();
        assert_eq!(spec.describe(), "qty:int=1 (deprecated)");

        let spec = ParamSpec::path("name_id", ParamType::Enum(&["A", "B"]));
        assert_eq!(spec.describe(), "name_id:enum(A|B)");
    }

    #[test]
    fn test_value_to_json() {
        assert_eq!(ParamValue::Int(3).to_json(), serde_json::json!(3));
        assert_eq!(ParamValue::Float(9.5).to_json(), serde_json::json!(9.5));
        assert_eq!(
            ParamValue::List(vec!["a".into(), "b".into()]).to_json(),
            serde_json::json!(["a", "b"])
        );
    }
}
