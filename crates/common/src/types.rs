//! The logical type system shared by the catalog, binder and evaluator.

use enum_as_inner::EnumAsInner;

/// An ordered, named field inside a `STRUCT` type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    pub name: String,
    pub ty: LogicalType,
}

/// Multiplicity of a relationship table endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplicity {
    One,
    Many,
}

/// Discriminated union of every logical type recognized by the engine.
///
/// Compound types carry their child type(s); `Struct` additionally carries
/// an ordered list of named fields.
#[derive(Debug, Clone, PartialEq, EnumAsInner)]
pub enum LogicalType {
    Bool,
    Int64,
    Int32,
    Int16,
    Double,
    Float,
    Date,
    Timestamp,
    Interval,
    String,
    Struct(Vec<StructField>),
    FixedList { child: Box<LogicalType>, num_elements: usize },
    VarList { child: Box<LogicalType> },
    InternalId,
    Node,
    Rel,
    RecursiveRel,
    /// Only ever appears as the type of a primary-key property; treated as
    /// `Int64` at ingest time per the copy-from engine (§4.5/§9 open question).
    Serial,
    /// Placeholder used before type inference has resolved a concrete type.
    Any,
}

impl LogicalType {
    pub fn bytes() -> LogicalType {
        LogicalType::VarList {
            child: Box::new(LogicalType::Int16),
        }
    }

    /// `true` for every numeric scalar type, i.e. every type an arithmetic
    /// scalar function may accept.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            LogicalType::Int64 | LogicalType::Int32 | LogicalType::Int16 | LogicalType::Double | LogicalType::Float
        )
    }

    pub fn is_primary_key_compatible(&self) -> bool {
        matches!(self, LogicalType::Int64 | LogicalType::String | LogicalType::Serial)
    }

    /// The type a SERIAL primary key is treated as once inside storage or
    /// at copy-from ingest time.
    pub fn underlying_storage_type(&self) -> LogicalType {
        match self {
            LogicalType::Serial => LogicalType::Int64,
            other => other.clone(),
        }
    }

    /// Whether a value of `self` can be implicitly cast to `target` by the
    /// binder when matching a copy-from source column against a property.
    pub fn can_implicit_cast_to(&self, target: &LogicalType) -> bool {
        if self == target {
            return true;
        }
        match (self, target) {
            (a, b) if a.is_numeric() && b.is_numeric() => true,
            (LogicalType::Serial, LogicalType::Int64) | (LogicalType::Int64, LogicalType::Serial) => true,
            (LogicalType::Date, LogicalType::Timestamp) => true,
            _ => false,
        }
    }

    pub fn struct_of(fields: impl IntoIterator<Item = (impl Into<String>, LogicalType)>) -> LogicalType {
        LogicalType::Struct(
            fields
                .into_iter()
                .map(|(name, ty)| StructField { name: name.into(), ty })
                .collect(),
        )
    }

    pub fn var_list_of(child: LogicalType) -> LogicalType {
        LogicalType::VarList { child: Box::new(child) }
    }

    /// Node/Rel pattern expressions evaluate to a STRUCT of this shape; used
    /// by the pattern evaluator (§4.4) to build its output type.
    pub fn node_struct(property_names: impl IntoIterator<Item = (impl Into<String>, LogicalType)>) -> LogicalType {
        let mut fields = vec![StructField {
            name: "_id".into(),
            ty: LogicalType::InternalId,
        }];
        fields.extend(
            property_names
                .into_iter()
                .map(|(name, ty)| StructField { name: name.into(), ty }),
        );
        LogicalType::Struct(fields)
    }

    pub fn path_struct() -> LogicalType {
        LogicalType::struct_of([
            ("nodes", LogicalType::var_list_of(LogicalType::Node)),
            ("rels", LogicalType::var_list_of(LogicalType::Rel)),
        ])
    }
}

impl std::fmt::Display for LogicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogicalType::Bool => write!(f, "BOOL"),
            LogicalType::Int64 => write!(f, "INT64"),
            LogicalType::Int32 => write!(f, "INT32"),
            LogicalType::Int16 => write!(f, "INT16"),
            LogicalType::Double => write!(f, "DOUBLE"),
            LogicalType::Float => write!(f, "FLOAT"),
            LogicalType::Date => write!(f, "DATE"),
            LogicalType::Timestamp => write!(f, "TIMESTAMP"),
            LogicalType::Interval => write!(f, "INTERVAL"),
            LogicalType::String => write!(f, "STRING"),
            LogicalType::Struct(fields) => {
                write!(f, "STRUCT(")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.ty)?;
                }
                write!(f, ")")
            }
            LogicalType::FixedList { child, num_elements } => write!(f, "{child}[{num_elements}]"),
            LogicalType::VarList { child } => write!(f, "{child}[]"),
            LogicalType::InternalId => write!(f, "INTERNAL_ID"),
            LogicalType::Node => write!(f, "NODE"),
            LogicalType::Rel => write!(f, "REL"),
            LogicalType::RecursiveRel => write!(f, "RECURSIVE_REL"),
            LogicalType::Serial => write!(f, "SERIAL"),
            LogicalType::Any => write!(f, "ANY"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_is_pk_compatible_and_casts_to_int64() {
        assert!(LogicalType::Serial.is_primary_key_compatible());
        assert_eq!(LogicalType::Serial.underlying_storage_type(), LogicalType::Int64);
        assert!(LogicalType::Serial.can_implicit_cast_to(&LogicalType::Int64));
    }

    #[test]
    fn numeric_widening_is_mutual() {
        assert!(LogicalType::Int32.can_implicit_cast_to(&LogicalType::Int64));
        assert!(LogicalType::Int64.can_implicit_cast_to(&LogicalType::Double));
        assert!(!LogicalType::String.can_implicit_cast_to(&LogicalType::Int64));
    }
}
