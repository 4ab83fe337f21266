// SQL fragment builders for partial updates and filtered listings
//
// Values always travel as positional parameters; identifiers only ever come
// from 'static tables compiled into this crate.

use crate::errors::QueryBuildError;
use serde::Serialize;
use std::cmp::Ordering;

/// A typed scalar bound to a `$N` placeholder.
///
/// `None` in any variant is SQL `NULL`. Keeping the variant on nulls lets
/// PostgreSQL infer the parameter type (a bare untyped null cannot be assigned
/// to an integer column).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BindValue {
    Text(Option<String>),
    Int(Option<i64>),
    Float(Option<f64>),
    Bool(Option<bool>),
}

impl BindValue {
    pub fn is_null(&self) -> bool {
        match self {
            BindValue::Text(v) => v.is_none(),
            BindValue::Int(v) => v.is_none(),
            BindValue::Float(v) => v.is_none(),
            BindValue::Bool(v) => v.is_none(),
        }
    }

    /// Lossy numeric view; exact integer comparisons go through [`BindValue::Int`]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            BindValue::Int(Some(v)) => Some(*v as f64),
            BindValue::Float(Some(v)) => Some(*v),
            _ => None,
        }
    }

    fn numeric_label(&self) -> String {
        match self {
            BindValue::Int(Some(v)) => v.to_string(),
            BindValue::Float(Some(v)) => v.to_string(),
            _ => "null".to_string(),
        }
    }

    fn is_true(&self) -> bool {
        matches!(self, BindValue::Bool(Some(true)))
    }
}

impl From<&str> for BindValue {
    fn from(value: &str) -> Self {
        BindValue::Text(Some(value.to_string()))
    }
}

impl From<String> for BindValue {
    fn from(value: String) -> Self {
        BindValue::Text(Some(value))
    }
}

impl From<Option<String>> for BindValue {
    fn from(value: Option<String>) -> Self {
        BindValue::Text(value)
    }
}

impl From<i32> for BindValue {
    fn from(value: i32) -> Self {
        BindValue::Int(Some(value.into()))
    }
}

impl From<Option<i32>> for BindValue {
    fn from(value: Option<i32>) -> Self {
        BindValue::Int(value.map(i64::from))
    }
}

impl From<i64> for BindValue {
    fn from(value: i64) -> Self {
        BindValue::Int(Some(value))
    }
}

impl From<f64> for BindValue {
    fn from(value: f64) -> Self {
        BindValue::Float(Some(value))
    }
}

impl From<Option<f64>> for BindValue {
    fn from(value: Option<f64>) -> Self {
        BindValue::Float(value)
    }
}

impl From<bool> for BindValue {
    fn from(value: bool) -> Self {
        BindValue::Bool(Some(value))
    }
}

impl From<Option<bool>> for BindValue {
    fn from(value: Option<bool>) -> Self {
        BindValue::Bool(value)
    }
}

/// Field name to column name translation table.
///
/// Fields without an entry are used verbatim as column names.
pub type ColumnMap = &'static [(&'static str, &'static str)];

/// Ordered set of column assignments for a partial update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSpec {
    entries: Vec<(&'static str, BindValue)>,
}

impl UpdateSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`UpdateSpec::push`]
    pub fn set(mut self, field: &'static str, value: impl Into<BindValue>) -> Self {
        self.push(field, value);
        self
    }

    pub fn push(&mut self, field: &'static str, value: impl Into<BindValue>) {
        self.entries.push((field, value.into()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(&'static str, BindValue)> {
        self.entries.iter()
    }
}

/// Ordered filter entries keyed by their public filter name.
///
/// Keys may come straight from a request: they only select a predicate from
/// a rule table and are never written into the SQL text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    entries: Vec<(String, BindValue)>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<BindValue>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<BindValue>) {
        self.entries.push((key.into(), value.into()));
    }

    /// First value stored under `key`
    pub fn get(&self, key: &str) -> Option<&BindValue> {
        self.get_all(key).next()
    }

    /// Every value stored under `key`, in insertion order
    pub fn get_all<'a, 'k>(&'a self, key: &'k str) -> impl Iterator<Item = &'a BindValue> + use<'a, 'k> {
        self.entries
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, BindValue)> {
        self.entries.iter()
    }
}

/// A piece of SQL plus the values for its `$1..$n` placeholders
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SqlFragment {
    pub fragment: String,
    pub values: Vec<BindValue>,
}

impl SqlFragment {
    pub fn is_empty(&self) -> bool {
        self.fragment.is_empty()
    }

    /// Placeholder for the first parameter a caller appends after `values`
    pub fn next_placeholder(&self) -> String {
        format!("${}", self.values.len() + 1)
    }

    /// ` WHERE <fragment>`, or nothing at all for an empty fragment
    pub fn where_clause(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.fragment)
        }
    }
}

/// Compile an update spec into a `SET` list.
///
/// `{firstName: "Aliya", age: 32}` with `firstName -> first_name` becomes
/// `"first_name"=$1, "age"=$2` with values `["Aliya", 32]`.
pub fn partial_update(
    update: &UpdateSpec,
    columns: ColumnMap,
) -> Result<SqlFragment, QueryBuildError> {
    if update.is_empty() {
        return Err(QueryBuildError::EmptyUpdate);
    }

    let mut assignments = Vec::with_capacity(update.len());
    let mut values = Vec::with_capacity(update.len());

    for (idx, (field, value)) in update.iter().enumerate() {
        let column = columns
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, column)| *column)
            .unwrap_or(*field);
        assignments.push(format!("\"{}\"=${}", column, idx + 1));
        values.push(value.clone());
    }

    Ok(SqlFragment {
        fragment: assignments.join(", "),
        values,
    })
}

/// Comparison rendered for a recognized filter key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// Case-insensitive substring match
    ContainsIgnoreCase(&'static str),
    /// Inclusive lower bound
    AtLeast(&'static str),
    /// Inclusive upper bound
    AtMost(&'static str),
    /// `column > 0` when the flag is true; binds nothing
    Positive(&'static str),
}

impl Predicate {
    pub fn consumes_value(self) -> bool {
        !matches!(self, Predicate::Positive(_))
    }

    fn render(self, placeholder: usize) -> String {
        match self {
            Predicate::ContainsIgnoreCase(column) => {
                format!("upper({column}) LIKE upper('%' || ${placeholder} || '%')")
            }
            Predicate::AtLeast(column) => format!("\"{column}\">=${placeholder}"),
            Predicate::AtMost(column) => format!("\"{column}\"<=${placeholder}"),
            Predicate::Positive(column) => format!("\"{column}\">0"),
        }
    }
}

/// Maps a public filter key onto its predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterRule {
    pub key: &'static str,
    pub predicate: Predicate,
}

pub const COMPANY_FILTERS: &[FilterRule] = &[
    FilterRule {
        key: "name",
        predicate: Predicate::ContainsIgnoreCase("name"),
    },
    FilterRule {
        key: "minEmployees",
        predicate: Predicate::AtLeast("num_employees"),
    },
    FilterRule {
        key: "maxEmployees",
        predicate: Predicate::AtMost("num_employees"),
    },
];

pub const JOB_FILTERS: &[FilterRule] = &[
    FilterRule {
        key: "title",
        predicate: Predicate::ContainsIgnoreCase("title"),
    },
    FilterRule {
        key: "minSalary",
        predicate: Predicate::AtLeast("salary"),
    },
    FilterRule {
        key: "hasEquity",
        predicate: Predicate::Positive("equity"),
    },
];

/// Compile filter entries against a rule table into a `WHERE` body.
///
/// Placeholders are numbered by the values actually pushed, so flags that
/// bind nothing can sit anywhere in the input. Unknown keys are skipped.
pub fn build_filter(filter: &FilterSpec, rules: &[FilterRule]) -> SqlFragment {
    let mut clauses = Vec::new();
    let mut values = Vec::new();

    for (key, value) in filter.iter() {
        let Some(rule) = rules.iter().find(|rule| rule.key == key.as_str()) else {
            continue;
        };

        if rule.predicate.consumes_value() {
            values.push(value.clone());
            clauses.push(rule.predicate.render(values.len()));
        } else if value.is_true() {
            clauses.push(rule.predicate.render(0));
        }
    }

    SqlFragment {
        fragment: clauses.join(" AND "),
        values,
    }
}

// Integers compare exactly; a float on either side falls back to f64, where
// NaN counts as inverted. Non-numeric bounds are not comparable.
fn is_inverted(min: &BindValue, max: &BindValue) -> bool {
    if let (BindValue::Int(Some(min)), BindValue::Int(Some(max))) = (min, max) {
        return max < min;
    }
    match (min.as_f64(), max.as_f64()) {
        (Some(min), Some(max)) => !matches!(
            max.partial_cmp(&min),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        _ => false,
    }
}

/// Company listing filter: `name`, `minEmployees`, `maxEmployees`.
///
/// Fails when any maximum is below any minimum; every repeated bound is
/// rendered, so every one is checked.
pub fn company_filter(filter: &FilterSpec) -> Result<SqlFragment, QueryBuildError> {
    for min in filter.get_all("minEmployees") {
        for max in filter.get_all("maxEmployees") {
            if is_inverted(min, max) {
                return Err(QueryBuildError::InvalidRange {
                    field: "employees",
                    min: min.numeric_label(),
                    max: max.numeric_label(),
                });
            }
        }
    }

    Ok(build_filter(filter, COMPANY_FILTERS))
}

/// Job listing filter: `title`, `minSalary`, `hasEquity`
pub fn job_filter(filter: &FilterSpec) -> SqlFragment {
    build_filter(filter, JOB_FILTERS)
}
