// src/filter/mod.rs
// Filter compiler: raw JSON filter mappings -> typed, ordered clauses

mod infer;

pub use infer::{BoundParse, DateBound, infer_value, parse_date_bound, parse_timestamp};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Raw caller-supplied filter: field name -> filter value
pub type FilterSpec = Map<String, Value>;

/// Typed operand for a single clause
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Equals(Value),
    DateAtLeast(DateTime<Utc>),
    DateAtMost(DateTime<Utc>),
    AnyOf(Vec<Value>),
}

/// Clause discriminant, useful for logging and assertions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    Equals,
    DateAtLeast,
    DateAtMost,
    ArrayContainsAny,
}

impl fmt::Display for ClauseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals => write!(f, "=="),
            Self::DateAtLeast => write!(f, ">="),
            Self::DateAtMost => write!(f, "<="),
            Self::ArrayContainsAny => write!(f, "array_contains_any"),
        }
    }
}

/// One compiled filter condition
#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    pub field: String,
    pub value: FilterValue,
}

impl FilterClause {
    pub fn new(field: impl Into<String>, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            value,
        }
    }

    pub fn kind(&self) -> ClauseKind {
        match self.value {
            FilterValue::Equals(_) => ClauseKind::Equals,
            FilterValue::DateAtLeast(_) => ClauseKind::DateAtLeast,
            FilterValue::DateAtMost(_) => ClauseKind::DateAtMost,
            FilterValue::AnyOf(_) => ClauseKind::ArrayContainsAny,
        }
    }
}

/// A filter entry that was dropped instead of failing the request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedClause {
    pub field: String,
    pub value: String,
    pub reason: String,
}

impl SkippedClause {
    pub fn invalid_date(field: &str, raw: &str) -> Self {
        Self {
            field: field.to_string(),
            value: raw.to_string(),
            reason: "invalid date format".to_string(),
        }
    }

    pub fn not_a_bound(field: &str, raw: &str) -> Self {
        Self {
            field: field.to_string(),
            value: raw.to_string(),
            reason: "expected a '>=' or '<=' date bound".to_string(),
        }
    }
}

/// Compiler output: clauses in input order, plus whatever was dropped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledFilter {
    pub clauses: Vec<FilterClause>,
    pub skipped: Vec<SkippedClause>,
}

impl CompiledFilter {
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// Compile an optional filter mapping into ordered clauses.
///
/// Never fails: unparsable date bounds are omitted and listed in `skipped`.
pub fn compile(spec: Option<&FilterSpec>) -> CompiledFilter {
    let mut compiled = CompiledFilter::default();
    let Some(spec) = spec else {
        return compiled;
    };

    for (field, raw) in spec {
        match infer_value(field, raw.clone()) {
            Ok(value) => compiled.clauses.push(FilterClause::new(field.clone(), value)),
            Err(skipped) => compiled.skipped.push(skipped),
        }
    }
    compiled
}
