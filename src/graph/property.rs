//! Property value and column types for vertices and edges
//!
//! Properties are stored as typed columns keyed by dense vertex or
//! edge index, not as per-item maps. Recognized element types are
//! 64-bit float, 64-bit signed integer, and string.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Element type of a property column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Float,
    Int,
    Str,
}

impl ScalarType {
    /// Get type name as string
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarType::Float => "float",
            ScalarType::Int => "int",
            ScalarType::Str => "string",
        }
    }

    /// Whether values of this type can be read as a number
    pub fn is_numeric(&self) -> bool {
        !matches!(self, ScalarType::Str)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// A single property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Float(f64),
    Int(i64),
    Str(String),
}

impl ScalarValue {
    /// Element type of this value
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            ScalarValue::Float(_) => ScalarType::Float,
            ScalarValue::Int(_) => ScalarType::Int,
            ScalarValue::Str(_) => ScalarType::Str,
        }
    }

    /// Get float value if this is a float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ScalarValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Get integer value if this is an integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ScalarValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get string value if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Read the value as a number (float or int); `None` for strings
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            ScalarValue::Float(v) => Some(*v),
            ScalarValue::Int(v) => Some(*v as f64),
            ScalarValue::Str(_) => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Float(v) => write!(f, "{}", v),
            ScalarValue::Int(v) => write!(f, "{}", v),
            ScalarValue::Str(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<f64> for ScalarValue {
    fn from(v: f64) -> Self {
        ScalarValue::Float(v)
    }
}

impl From<i64> for ScalarValue {
    fn from(v: i64) -> Self {
        ScalarValue::Int(v)
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        ScalarValue::Str(s.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(s: String) -> Self {
        ScalarValue::Str(s)
    }
}

/// A typed array of property values keyed by dense item index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum PropertyColumn {
    Float(Vec<f64>),
    Int(Vec<i64>),
    Str(Vec<String>),
}

impl PropertyColumn {
    /// Create a column of `len` copies of `default`
    pub fn filled(default: &ScalarValue, len: usize) -> Self {
        match default {
            ScalarValue::Float(v) => PropertyColumn::Float(vec![*v; len]),
            ScalarValue::Int(v) => PropertyColumn::Int(vec![*v; len]),
            ScalarValue::Str(s) => PropertyColumn::Str(vec![s.clone(); len]),
        }
    }

    /// Element type of the column
    pub fn element_type(&self) -> ScalarType {
        match self {
            PropertyColumn::Float(_) => ScalarType::Float,
            PropertyColumn::Int(_) => ScalarType::Int,
            PropertyColumn::Str(_) => ScalarType::Str,
        }
    }

    /// Number of items in the column
    pub fn len(&self) -> usize {
        match self {
            PropertyColumn::Float(v) => v.len(),
            PropertyColumn::Int(v) => v.len(),
            PropertyColumn::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append one copy of `default`; the value type must match
    pub fn push_default(&mut self, default: &ScalarValue) {
        match (self, default) {
            (PropertyColumn::Float(v), ScalarValue::Float(d)) => v.push(*d),
            (PropertyColumn::Int(v), ScalarValue::Int(d)) => v.push(*d),
            (PropertyColumn::Str(v), ScalarValue::Str(d)) => v.push(d.clone()),
            _ => unreachable!("column default type drifted from column type"),
        }
    }

    /// Remove item `i`, moving the last item into its slot
    pub fn swap_remove(&mut self, i: usize) {
        match self {
            PropertyColumn::Float(v) => {
                v.swap_remove(i);
            }
            PropertyColumn::Int(v) => {
                v.swap_remove(i);
            }
            PropertyColumn::Str(v) => {
                v.swap_remove(i);
            }
        }
    }

    /// Value at index `i`
    pub fn get(&self, i: usize) -> Option<ScalarValue> {
        match self {
            PropertyColumn::Float(v) => v.get(i).map(|x| ScalarValue::Float(*x)),
            PropertyColumn::Int(v) => v.get(i).map(|x| ScalarValue::Int(*x)),
            PropertyColumn::Str(v) => v.get(i).map(|x| ScalarValue::Str(x.clone())),
        }
    }

    /// Numeric reading of the value at `i`; `None` for string columns
    pub fn numeric(&self, i: usize) -> Option<f64> {
        match self {
            PropertyColumn::Float(v) => v.get(i).copied(),
            PropertyColumn::Int(v) => v.get(i).map(|x| *x as f64),
            PropertyColumn::Str(_) => None,
        }
    }

    /// Overwrite the value at `i`; fails with the column's element
    /// type when the value type differs
    pub fn set(&mut self, i: usize, value: ScalarValue) -> Result<(), ScalarType> {
        match (self, value) {
            (PropertyColumn::Float(v), ScalarValue::Float(x)) => {
                v[i] = x;
                Ok(())
            }
            (PropertyColumn::Int(v), ScalarValue::Int(x)) => {
                v[i] = x;
                Ok(())
            }
            (PropertyColumn::Str(v), ScalarValue::Str(x)) => {
                v[i] = x;
                Ok(())
            }
            (col, _) => Err(col.element_type()),
        }
    }

    /// Borrow the float values; `None` unless this is a float column
    pub fn as_float_slice(&self) -> Option<&[f64]> {
        match self {
            PropertyColumn::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Mutably borrow the float values; `None` unless a float column
    pub fn as_float_slice_mut(&mut self) -> Option<&mut [f64]> {
        match self {
            PropertyColumn::Float(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_value_types() {
        assert_eq!(ScalarValue::Float(1.5).scalar_type(), ScalarType::Float);
        assert_eq!(ScalarValue::Int(42).scalar_type(), ScalarType::Int);
        assert_eq!(
            ScalarValue::Str("x".to_string()).scalar_type(),
            ScalarType::Str
        );
        assert!(ScalarType::Float.is_numeric());
        assert!(!ScalarType::Str.is_numeric());
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(ScalarValue::Int(3).as_numeric(), Some(3.0));
        assert_eq!(ScalarValue::Float(2.5).as_numeric(), Some(2.5));
        assert_eq!(ScalarValue::from("a").as_numeric(), None);
    }

    #[test]
    fn test_column_fill_and_push() {
        let mut col = PropertyColumn::filled(&ScalarValue::Int(7), 3);
        assert_eq!(col.len(), 3);
        assert_eq!(col.get(2), Some(ScalarValue::Int(7)));

        col.push_default(&ScalarValue::Int(7));
        assert_eq!(col.len(), 4);
    }

    #[test]
    fn test_column_swap_remove() {
        let mut col = PropertyColumn::Float(vec![0.0, 1.0, 2.0, 3.0]);
        col.swap_remove(1);
        // last item moved into slot 1
        assert_eq!(col.len(), 3);
        assert_eq!(col.numeric(1), Some(3.0));
    }

    #[test]
    fn test_column_set_type_mismatch() {
        let mut col = PropertyColumn::Float(vec![0.0]);
        assert!(col.set(0, ScalarValue::Float(9.0)).is_ok());
        assert_eq!(col.set(0, ScalarValue::Int(1)), Err(ScalarType::Float));
    }

    #[test]
    fn test_column_serde_roundtrip() {
        let col = PropertyColumn::Str(vec!["a".to_string(), "b".to_string()]);
        let json = serde_json::to_string(&col).unwrap();
        let back: PropertyColumn = serde_json::from_str(&json).unwrap();
        assert_eq!(col, back);
    }
}
