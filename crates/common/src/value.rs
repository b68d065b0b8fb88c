//! A single runtime value, used for literals, defaults and scalar constant folding.

use crate::types::LogicalType;
use enum_as_inner::EnumAsInner;
use std::fmt;

#[derive(Debug, Clone, PartialEq, EnumAsInner)]
pub enum Value {
    Null(LogicalType),
    Bool(bool),
    Int64(i64),
    Int32(i32),
    Int16(i16),
    Double(f64),
    Float(f32),
    String(String),
    /// Bytes, used both for `DATE`/`TIMESTAMP`/`INTERVAL` encodings and the
    /// raw parse-tree bytes a property's default expression round-trips.
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Struct(Vec<(String, Value)>),
}

impl Value {
    pub fn logical_type(&self) -> LogicalType {
        match self {
            Value::Null(t) => t.clone(),
            Value::Bool(_) => LogicalType::Bool,
            Value::Int64(_) => LogicalType::Int64,
            Value::Int32(_) => LogicalType::Int32,
            Value::Int16(_) => LogicalType::Int16,
            Value::Double(_) => LogicalType::Double,
            Value::Float(_) => LogicalType::Float,
            Value::String(_) => LogicalType::String,
            Value::Bytes(_) => LogicalType::bytes(),
            Value::List(items) => {
                let child = items.first().map(Value::logical_type).unwrap_or(LogicalType::Any);
                LogicalType::var_list_of(child)
            }
            Value::Struct(fields) => LogicalType::struct_of(fields.iter().map(|(n, v)| (n.clone(), v.logical_type()))),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null(_))
    }

    /// Numeric widening/narrowing cast used by the binder's implicit `CAST`
    /// evaluate-type and by the scalar cast functions in the evaluator.
    pub fn try_cast(&self, target: &LogicalType) -> Option<Value> {
        if &self.logical_type() == target {
            return Some(self.clone());
        }
        if let Value::Null(_) = self {
            return Some(Value::Null(target.clone()));
        }
        match (self, target) {
            (Value::Int16(v), LogicalType::Int32) => Some(Value::Int32(*v as i32)),
            (Value::Int16(v), LogicalType::Int64) => Some(Value::Int64(*v as i64)),
            (Value::Int32(v), LogicalType::Int64) => Some(Value::Int64(*v as i64)),
            (Value::Int16(v), LogicalType::Double) => Some(Value::Double(*v as f64)),
            (Value::Int32(v), LogicalType::Double) => Some(Value::Double(*v as f64)),
            (Value::Int64(v), LogicalType::Double) => Some(Value::Double(*v as f64)),
            (Value::Int16(v), LogicalType::Float) => Some(Value::Float(*v as f32)),
            (Value::Int32(v), LogicalType::Float) => Some(Value::Float(*v as f32)),
            (Value::Int64(v), LogicalType::Float) => Some(Value::Float(*v as f32)),
            (Value::Float(v), LogicalType::Double) => Some(Value::Double(*v as f64)),
            (Value::Int64(v), LogicalType::Serial) => Some(Value::Int64(*v)),
            (Value::Int64(v), LogicalType::Int32) | (Value::Int32(v), LogicalType::Int32) => {
                // widen-then-narrow path is not attempted here; only identity narrows.
                let _ = v;
                None
            }
            _ => None,
        }
    }

    pub fn as_i64_lossy(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            Value::Int32(v) => Some(*v as i64),
            Value::Int16(v) => Some(*v as i64),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null(_) => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Int16(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "'{v}'"),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Value::List(items) => write!(f, "[{}]", items.iter().map(Value::to_string).collect::<Vec<_>>().join(", ")),
            Value::Struct(fields) => {
                write!(f, "{{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_casts_preserve_nullness() {
        let v = Value::Null(LogicalType::Int32);
        assert_eq!(v.try_cast(&LogicalType::Int64), Some(Value::Null(LogicalType::Int64)));
    }

    #[test]
    fn int_widens_to_double() {
        assert_eq!(Value::Int32(3).try_cast(&LogicalType::Double), Some(Value::Double(3.0)));
    }
}
