//! PATCH path expressions.
//!
//! Two shapes are understood:
//!
//! * `attribute` (dots are kept as part of the name)
//! * `attribute[key eq "value"]` optionally followed by `.subAttribute`,
//!   where `key` is `type` or `primary`
//!
//! Anything else is not understood and [`parse_path`] returns `None`.

use std::fmt;

/// Literal a `primary` flag is stored as when it is set.
pub const TRUE_LITERAL: &str = "True";
/// Literal a `primary` flag is stored as when it is cleared.
pub const FALSE_LITERAL: &str = "False";

/// Item key a value filter may compare against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    Type,
    Primary,
}

impl FilterKey {
    /// Parse a filter key, ignoring case.
    pub fn parse(key: &str) -> Option<Self> {
        if key.eq_ignore_ascii_case("type") {
            Some(Self::Type)
        } else if key.eq_ignore_ascii_case("primary") {
            Some(Self::Primary)
        } else {
            None
        }
    }

    /// Sub-attribute name the key refers to.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Primary => "primary",
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `key eq "value"` clause selecting one item of a multi-valued attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueFilter {
    pub key: FilterKey,
    pub value: String,
}

impl ValueFilter {
    /// Create a filter, canonicalizing boolean-like literals to `True`/`False`.
    pub fn new(key: FilterKey, value: impl Into<String>) -> Self {
        Self {
            key,
            value: canonical_literal(value.into()),
        }
    }
}

impl fmt::Display for ValueFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} eq \"{}\"", self.key, self.value)
    }
}

/// The resolved target of a PATCH path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathTarget {
    /// A top-level attribute, addressed by name.
    Simple(String),
    /// One item of a multi-valued attribute, optionally narrowed to a sub-attribute.
    Indexed {
        attribute: String,
        filter: ValueFilter,
        sub_attribute: Option<String>,
    },
}

impl PathTarget {
    /// Name of the top-level attribute the path addresses.
    pub fn attribute(&self) -> &str {
        match self {
            Self::Simple(attribute) => attribute,
            Self::Indexed { attribute, .. } => attribute,
        }
    }
}

/// Parse a PATCH path.
///
/// Returns `None` when the bracketed filter is not a single
/// `type|primary eq "<non-empty value>"` clause, or when `]` is followed by
/// a bare `.`. Trailing text after `]` that does not start with `.` is
/// ignored.
pub fn parse_path(path: &str) -> Option<PathTarget> {
    let Some((attribute, rest)) = path.split_once('[') else {
        return Some(PathTarget::Simple(path.to_string()));
    };

    let (filter_expr, sub_part) = rest.split_once(']')?;
    let filter = parse_value_filter(filter_expr)?;

    let sub_attribute = match sub_part.strip_prefix('.') {
        Some("") => return None,
        Some(sub) => Some(sub.to_string()),
        None => None,
    };

    Some(PathTarget::Indexed {
        attribute: attribute.to_string(),
        filter,
        sub_attribute,
    })
}

fn parse_value_filter(expr: &str) -> Option<ValueFilter> {
    let (key, rest) = expr.trim().split_once(char::is_whitespace)?;
    let key = FilterKey::parse(key)?;

    let (operator, literal) = rest.trim_start().split_once(char::is_whitespace)?;
    if !operator.eq_ignore_ascii_case("eq") {
        return None;
    }

    let value = literal
        .trim_start()
        .strip_prefix('"')?
        .strip_suffix('"')?;
    if value.is_empty() || value.contains('"') {
        return None;
    }

    Some(ValueFilter::new(key, value))
}

fn canonical_literal(value: String) -> String {
    if value.eq_ignore_ascii_case("true") {
        TRUE_LITERAL.to_string()
    } else if value.eq_ignore_ascii_case("false") {
        FALSE_LITERAL.to_string()
    } else {
        value
    }
}
