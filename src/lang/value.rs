//! Runtime values and the coercions applied at operator boundaries.

use std::fmt;

use super::error::Error;

/// A dynamically typed OneShot value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    Number(f64),
    Str(String),
    Bool(bool),
    #[default]
    Null,
}

impl Value {
    /// Only `null` and `false` are falsy. Zero and the empty string are truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Bool(false))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Null => "null",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Require a number, naming the role the value plays in the message.
    pub fn expect_number(&self, what: &str) -> Result<f64, Error> {
        self.as_number().ok_or_else(|| {
            Error::runtime(format!("{what} must be a number, got {}", self.type_name()))
        })
    }

    /// Require a string, naming the role the value plays in the message.
    pub fn expect_str(&self, what: &str) -> Result<&str, Error> {
        match self {
            Value::Str(s) => Ok(s),
            _ => Err(Error::runtime(format!(
                "{what} must be a string, got {}",
                self.type_name()
            ))),
        }
    }

    /// Value equality. `null` equals only `null`; mixed types are unequal.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            _ => false,
        }
    }

    /// `+`: numeric sum, or string concatenation when either side is a string.
    pub fn add(&self, other: &Value) -> Result<Value, Error> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
            (Value::Str(a), Value::Number(_)) => Ok(Value::Str(format!("{a}{other}"))),
            (Value::Number(_), Value::Str(b)) => Ok(Value::Str(format!("{self}{b}"))),
            _ => Err(type_mismatch("+", self, other)),
        }
    }

    /// Both operands of a numeric operator as numbers, or a type mismatch.
    pub fn numeric_pair(&self, other: &Value, op: &str) -> Result<(f64, f64), Error> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
            _ => Err(type_mismatch(op, self, other)),
        }
    }

    /// The INT builtin's coercion.
    pub fn to_int(&self) -> Result<f64, Error> {
        match self {
            Value::Number(n) => Ok(n.trunc()),
            Value::Str(s) => s
                .trim()
                .parse::<f64>()
                .map(f64::trunc)
                .map_err(|_| Error::runtime(format!("cannot convert \"{s}\" to a number"))),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::Null => Ok(0.0),
        }
    }
}

fn type_mismatch(op: &str, left: &Value, right: &Value) -> Error {
    Error::runtime(format!(
        "operands of '{op}' must be numbers, got {} and {}",
        left.type_name(),
        right.type_name()
    ))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Value::Number(n) => write!(f, "{n}"),
            Value::Str(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => f.write_str("null"),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Number(0.0).is_truthy());
        assert!(Value::Str(String::new()).is_truthy());
    }

    #[test]
    fn add_numbers() {
        assert_eq!(Value::from(1.0).add(&Value::from(2.0)).unwrap(), Value::Number(3.0));
    }

    #[test]
    fn add_mixed_concatenates() {
        assert_eq!(Value::from("a").add(&Value::from(1.0)).unwrap(), Value::from("a1"));
        assert_eq!(Value::from(1.0).add(&Value::from("a")).unwrap(), Value::from("1a"));
        assert_eq!(Value::from("a").add(&Value::from("b")).unwrap(), Value::from("ab"));
    }

    #[test]
    fn add_bool_fails() {
        assert!(Value::Bool(true).add(&Value::from(1.0)).is_err());
        assert!(Value::Null.add(&Value::from("x")).is_err());
    }

    #[test]
    fn numeric_pair_rejects_strings() {
        let err = Value::from("1a").numeric_pair(&Value::from(2.0), ">").unwrap_err();
        assert!(err.message().contains("'>'"));
    }

    #[test]
    fn equality_null_only_equals_null() {
        assert!(Value::Null.equals(&Value::Null));
        assert!(!Value::Null.equals(&Value::Bool(false)));
        assert!(!Value::Number(0.0).equals(&Value::Null));
        assert!(!Value::Number(1.0).equals(&Value::from("1")));
        assert!(Value::from("x").equals(&Value::from("x")));
    }

    #[test]
    fn display_drops_integral_fraction() {
        assert_eq!(Value::Number(2.0).to_string(), "2");
        assert_eq!(Value::Number(-7.0).to_string(), "-7");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Null.to_string(), "null");
    }

    #[test]
    fn int_coercion() {
        assert_eq!(Value::Number(3.9).to_int().unwrap(), 3.0);
        assert_eq!(Value::Number(-3.9).to_int().unwrap(), -3.0);
        assert_eq!(Value::from(" 12.7 ").to_int().unwrap(), 12.0);
        assert_eq!(Value::Bool(true).to_int().unwrap(), 1.0);
        assert_eq!(Value::Null.to_int().unwrap(), 0.0);
        assert!(Value::from("abc").to_int().is_err());
    }
}
