use std::fmt;

/// A typed field value extracted from a trace record by a format adapter.
///
/// Trace formats encode event fields in many physical layouts; adapters map
/// them into this closed set of kinds before the values reach a store as
/// segment payloads. The index itself is payload-agnostic.
///
/// Floats compare by bit pattern so that segments carrying float payloads
/// keep full value semantics (`NaN == NaN` here, unlike IEEE comparison).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldValue {
    /// A signed integer field, the widest integer the adapters produce.
    Integer(i64),
    /// A text field. Adapters also map fixed-size byte arrays that hold
    /// UTF-8 into this kind.
    Text(String),
    /// An array or sequence of integer fields.
    IntegerArray(Vec<i64>),
    /// A floating point field.
    Float(f64),
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::IntegerArray(a), Self::IntegerArray(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for FieldValue {}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
            Self::IntegerArray(v) => {
                let parts: Vec<String> = v.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<i64>> for FieldValue {
    fn from(v: Vec<i64>) -> Self {
        Self::IntegerArray(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    fn test_kind_equality() {
        assert_eq!(FieldValue::from(42i64), FieldValue::Integer(42));
        assert_eq!(FieldValue::from("irq_handler"), FieldValue::Text("irq_handler".into()));
        assert_ne!(FieldValue::Integer(42), FieldValue::Float(42.0));
    }

    #[rstest]
    fn test_float_bitwise_equality() {
        assert_eq!(FieldValue::Float(f64::NAN), FieldValue::Float(f64::NAN));
        assert_ne!(FieldValue::Float(0.0), FieldValue::Float(-0.0));
    }

    #[rstest]
    fn test_display() {
        assert_eq!(FieldValue::Integer(-7).to_string(), "-7");
        assert_eq!(FieldValue::from(vec![1i64, 2, 3]).to_string(), "[1, 2, 3]");
    }
}
