//! Path pattern module
//!
//! Parses patterns such as `/items/{item_id}` or `/files/{file_path:path}`
//! and compiles them into anchored regexes.
//!
//! Segment kinds:
//! - literal: compared exactly
//! - `{name}`: one non-empty segment (`[^/]+`)
//! - `{name:path}`: everything that remains, slashes included (`.*`); last segment only

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("pattern '{0}' must start with '/'")]
    MissingLeadingSlash(String),
    #[error("pattern '{pattern}': invalid placeholder name '{name}'")]
    InvalidName { pattern: String, name: String },
    #[error("pattern '{pattern}': unknown converter '{converter}'")]
    UnknownConverter { pattern: String, converter: String },
    #[error("pattern '{pattern}': placeholder '{name}' appears twice")]
    DuplicateName { pattern: String, name: String },
    #[error("pattern '{0}': a path placeholder must be the last segment")]
    RestNotLast(String),
    #[error("pattern '{pattern}': {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
    Rest(String),
}

impl Segment {
    /// Lower is more specific
    const fn rank(&self) -> u8 {
        match self {
            Self::Literal(_) => 0,
            Self::Param(_) => 1,
            Self::Rest(_) => 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
    rank: Vec<u8>,
    regex: Regex,
}

impl PathPattern {
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let Some(body) = raw.strip_prefix('/') else {
            return Err(PatternError::MissingLeadingSlash(raw.to_string()));
        };

        let parts: Vec<&str> = body.split('/').collect();
        let mut segments = Vec::with_capacity(parts.len());
        let mut expr = String::from("^");

        for (index, part) in parts.iter().enumerate() {
            let segment = parse_segment(raw, part)?;

            if let Segment::Param(name) | Segment::Rest(name) = &segment {
                let taken = segments
                    .iter()
                    .any(|s| matches!(s, Segment::Param(n) | Segment::Rest(n) if n == name));
                if taken {
                    return Err(PatternError::DuplicateName {
                        pattern: raw.to_string(),
                        name: name.clone(),
                    });
                }
            }
            if matches!(segment, Segment::Rest(_)) && index + 1 != parts.len() {
                return Err(PatternError::RestNotLast(raw.to_string()));
            }

            expr.push('/');
            match &segment {
                Segment::Literal(text) => expr.push_str(&regex::escape(text)),
                Segment::Param(name) => expr.push_str(&format!("(?P<{name}>[^/]+)")),
                Segment::Rest(name) => expr.push_str(&format!("(?P<{name}>.*)")),
            }
            segments.push(segment);
        }
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|source| PatternError::Regex {
            pattern: raw.to_string(),
            source,
        })?;
        let rank = segments.iter().map(Segment::rank).collect();

        Ok(Self {
            raw: raw.to_string(),
            segments,
            rank,
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Segment specificity profile, compared lexicographically
    pub fn rank(&self) -> &[u8] {
        &self.rank
    }

    /// Placeholder names in pattern order
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) | Segment::Rest(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Match a decoded path, returning the captured placeholder values
    pub fn captures(&self, path: &str) -> Option<Vec<(String, String)>> {
        let caps = self.regex.captures(path)?;
        Some(
            self.placeholders()
                .map(|name| {
                    let value = caps.name(name).map_or("", |m| m.as_str());
                    (name.to_string(), value.to_string())
                })
                .collect(),
        )
    }
}

fn parse_segment(pattern: &str, part: &str) -> Result<Segment, PatternError> {
    let Some(inner) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) else {
        return Ok(Segment::Literal(part.to_string()));
    };

    let (name, converter) = match inner.split_once(':') {
        Some((name, converter)) => (name, Some(converter)),
        None => (inner, None),
    };

    if !is_identifier(name) {
        return Err(PatternError::InvalidName {
            pattern: pattern.to_string(),
            name: name.to_string(),
        });
    }

    match converter {
        None | Some("str") => Ok(Segment::Param(name.to_string())),
        Some("path") => Ok(Segment::Rest(name.to_string())),
        Some(other) => Err(PatternError::UnknownConverter {
            pattern: pattern.to_string(),
            converter: other.to_string(),
        }),
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
