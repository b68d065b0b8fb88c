//! Builds leaf [`Expression`]s: literals, variable references and the
//! internal `ROW_OFFSET`/`SRC_OFFSET`/`DST_OFFSET` variables the copy-from
//! binder injects.

use crate::error::{BinderError, Result};
use gq_common::{LogicalType, Value};
use gq_expr::{Expression, ExpressionKind, FunctionExpr, FunctionKind, PropertyExpr};

pub const ROW_OFFSET: &str = "ROW_OFFSET";
pub const SRC_OFFSET: &str = "SRC_OFFSET";
pub const DST_OFFSET: &str = "DST_OFFSET";

/// A literal expression; always constant-foldable by construction.
pub fn bind_literal(value: Value) -> Expression {
    let ty = value.logical_type();
    Expression::leaf(format!("LITERAL({value})"), ty, ExpressionKind::Literal(value))
}

/// An internal variable reference of the given name/type. Used both for
/// visible `from`/`to`-derived offsets (`createVariable`) and for the
/// invisible `ROW_OFFSET` (`createInvisibleVariable`) — the distinction is
/// cosmetic at this layer since neither is exposed to a projection list.
pub fn create_variable(name: &str, logical_type: LogicalType) -> Expression {
    Expression::leaf(name.to_string(), logical_type, ExpressionKind::Variable(name.to_string()))
}

pub fn create_invisible_variable(name: &str, logical_type: LogicalType) -> Expression {
    create_variable(name, logical_type)
}

/// A reference to a scan source column, modeled as a PROPERTY expression
/// owned by the synthetic `_source` variable.
pub fn bind_source_column(name: &str, logical_type: LogicalType) -> Expression {
    Expression::leaf(
        format!("_source.{name}"),
        logical_type,
        ExpressionKind::Property(PropertyExpr {
            variable_name: "_source".to_string(),
            property_name: name.to_string(),
        }),
    )
}

/// Wraps `expr` in an implicit `CAST` to `target`; errors if the pair is not
/// in the implicit-cast table.
pub fn force_cast(expr: Expression, target: &LogicalType) -> Result<Expression> {
    let source_ty = expr.logical_type.clone();
    if !source_ty.can_implicit_cast_to(target) {
        return Err(BinderError::CastNotPermitted(source_ty.to_string(), target.to_string()));
    }
    let unique_name = format!("CAST({}, {})", expr.unique_name, target);
    Ok(Expression {
        unique_name,
        logical_type: target.clone(),
        children: vec![expr],
        kind: ExpressionKind::Function(FunctionExpr {
            name: "CAST".to_string(),
            function_kind: FunctionKind::Scalar,
            is_distinct: false,
        }),
    })
}
