use std::fmt;

// ============================================================================
// Column Values
// ============================================================================

/// A typed column value, used both for predicate clauses and for
/// insert-or-replace column sets. Booleans are coerced to 0/1 at the
/// conversion boundary so the storage layer only ever sees integers.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Text(String),
    Null,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            // Single quotes doubled per SQL literal rules
            Value::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::Null => write!(f, "NULL"),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Integer(if b { 1 } else { 0 })
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T> From<Option<T>> for Value
where
    Value: From<T>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Value::from(v),
            None => Value::Null,
        }
    }
}

// ============================================================================
// Predicate Builder
// ============================================================================

/// An ordered, AND-only conjunction of equality clauses.
///
/// Clauses render left to right in insertion order, which keeps the
/// generated filter deterministic for a given filter configuration.
/// An empty predicate means "unconstrained".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    clauses: Vec<(&'static str, Value)>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a `column = value` clause.
    pub fn and_eq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.clauses.push((column, value.into()));
        self
    }

    /// Append a clause only when the filter value is present.
    pub fn and_eq_opt<V>(self, column: &'static str, value: Option<V>) -> Self
    where
        V: Into<Value>,
    {
        match value {
            Some(v) => self.and_eq(column, v),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Render the filter expression, or `None` when unconstrained.
    pub fn to_sql(&self) -> Option<String> {
        self.clauses.iter().fold(None, |acc, (column, value)| {
            let clause = match value {
                Value::Null => format!("{} IS NULL", column),
                other => format!("{} = {}", column, other),
            };
            Some(append_clause(acc, &clause))
        })
    }
}

/// Join a new clause onto an existing filter expression.
///
/// Returns the clause alone when no filter exists yet, otherwise the
/// existing filter `AND` the clause, preserving left-to-right order.
fn append_clause(existing: Option<String>, clause: &str) -> String {
    match existing {
        None => clause.to_owned(),
        Some(prev) => format!("{} AND {}", prev, clause),
    }
}
