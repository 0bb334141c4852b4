use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Scalar stored in a column
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Text(String),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Text(_) => "text",
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Int(_) => None,
        }
    }

    /// True when the rendered value would contain `needle`
    pub fn contains(&self, needle: char) -> bool {
        match self {
            Value::Text(s) => s.contains(needle),
            // Digits and an optional minus sign never collide with the key separator
            Value::Int(_) => false,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// Direction of a counter update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CounterOp {
    Add,
    Sub,
}

impl CounterOp {
    /// Apply the delta, `None` on overflow
    pub fn apply(&self, current: i64, amount: i64) -> Option<i64> {
        match self {
            CounterOp::Add => current.checked_add(amount),
            CounterOp::Sub => current.checked_sub(amount),
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            CounterOp::Add => '+',
            CounterOp::Sub => '-',
        }
    }
}

/// A single column write: either overwrite with a literal or adjust a counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Literal(Value),
    Increment { op: CounterOp, amount: i64 },
}

/// Outcome of matching a value against the legacy `field+N` / `field-N` form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterExpr {
    /// Not a counter expression for this field
    NoMatch,
    /// A counter expression whose amount does not fit in an i64
    Overflow,
    Match { op: CounterOp, amount: i64 },
}

fn counter_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(.+?)\s*([+-])\s*(\d+)$").expect("counter expression pattern is valid")
    })
}

/// Match `expr` against the legacy counter grammar `<field><ws>(+|-)<ws><digits>`.
///
/// The subject must equal `field` exactly.
pub fn parse_counter_expr(field: &str, expr: &str) -> CounterExpr {
    let Some(caps) = counter_pattern().captures(expr) else {
        return CounterExpr::NoMatch;
    };
    if &caps[1] != field {
        return CounterExpr::NoMatch;
    }
    let op = if &caps[2] == "+" {
        CounterOp::Add
    } else {
        CounterOp::Sub
    };
    match caps[3].parse::<i64>() {
        Ok(amount) => CounterExpr::Match { op, amount },
        Err(_) => CounterExpr::Overflow,
    }
}

impl Mutation {
    pub fn increment(amount: i64) -> Self {
        Mutation::Increment {
            op: CounterOp::Add,
            amount,
        }
    }

    pub fn decrement(amount: i64) -> Self {
        Mutation::Increment {
            op: CounterOp::Sub,
            amount,
        }
    }

    pub fn is_counter(&self) -> bool {
        matches!(self, Mutation::Increment { .. })
    }
}
