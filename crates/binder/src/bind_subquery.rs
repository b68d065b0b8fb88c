//! Subquery binding (§4.2): rewrites a parsed COUNT/EXISTS subquery into a
//! bound `SUBQUERY` expression plus a synthetic projection expression —
//! `count(*)` for COUNT, `count(*) > 0` for EXISTS — sharing the subquery
//! expression's unique name so a later substitution pass can swap the
//! subquery's materialized result in for the placeholder without
//! re-resolving names. Grounded on `bind_subquery_expression.cpp`.

use crate::expression_binder::{bind_literal, create_invisible_variable};
use gq_common::{LogicalType, Value};
use gq_expr::{Expression, ExpressionKind, FunctionExpr, FunctionKind, SubqueryExpr, SubqueryKind};

fn unique_name(kind: SubqueryKind, query_node_variables: &[String]) -> String {
    let tag = match kind {
        SubqueryKind::Count => "COUNT",
        SubqueryKind::Exists => "EXISTS",
    };
    format!("SUBQUERY_{tag}({})", query_node_variables.join(","))
}

fn count_star(name: String) -> Expression {
    Expression::leaf(
        name,
        LogicalType::Int64,
        ExpressionKind::Function(FunctionExpr {
            name: "count".to_string(),
            // Rewritten away during binding: the subquery's own (out-of-scope)
            // plan already produces this count, this node only carries its
            // projected name and type forward.
            function_kind: FunctionKind::Rewrite,
            is_distinct: false,
        }),
    )
}

/// `query_node_variables` are the variable names of every node pattern bound
/// inside the subquery's graph; `where_expression`, if present, is already
/// bound against those variables. Returns `(subquery_expression,
/// projection_expression)`.
pub fn bind_subquery(kind: SubqueryKind, query_node_variables: &[String], where_expression: Option<Expression>) -> (Expression, Expression) {
    let name = unique_name(kind, query_node_variables);
    let query_node_internal_ids: Vec<Expression> = query_node_variables
        .iter()
        .map(|v| create_invisible_variable(&format!("{v}._id"), LogicalType::InternalId))
        .collect();

    let result_type = match kind {
        SubqueryKind::Count => LogicalType::Int64,
        SubqueryKind::Exists => LogicalType::Bool,
    };
    let subquery_expr = Expression {
        unique_name: name.clone(),
        logical_type: result_type,
        children: Vec::new(),
        kind: ExpressionKind::Subquery(SubqueryExpr {
            subquery_kind: kind,
            query_node_internal_ids,
            where_expression: where_expression.map(Box::new),
        }),
    };

    let projection = match kind {
        SubqueryKind::Count => count_star(name),
        SubqueryKind::Exists => Expression {
            unique_name: name.clone(),
            logical_type: LogicalType::Bool,
            children: vec![count_star(name.clone()), bind_literal(Value::Int64(0))],
            kind: ExpressionKind::Function(FunctionExpr {
                name: ">".to_string(),
                function_kind: FunctionKind::Scalar,
                is_distinct: false,
            }),
        },
    };

    (subquery_expr, projection)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_subquery_shares_its_unique_name_with_a_count_star_projection() {
        let (subquery, projection) = bind_subquery(SubqueryKind::Count, &["a".to_string()], None);
        assert_eq!(subquery.unique_name, projection.unique_name);
        assert_eq!(subquery.logical_type, LogicalType::Int64);
        assert!(matches!(projection.kind, ExpressionKind::Function(FunctionExpr { function_kind: FunctionKind::Rewrite, .. })));
        assert!(matches!(subquery.kind, ExpressionKind::Subquery(_)));
    }

    #[test]
    fn exists_subquery_wraps_count_star_in_a_greater_than_zero_comparison() {
        let (subquery, projection) = bind_subquery(SubqueryKind::Exists, &["a".to_string()], None);
        assert_eq!(subquery.unique_name, projection.unique_name);
        assert_eq!(subquery.logical_type, LogicalType::Bool);
        match &projection.kind {
            ExpressionKind::Function(f) => {
                assert_eq!(f.name, ">");
                assert_eq!(projection.children.len(), 2);
            }
            other => panic!("expected a comparison function, got {other:?}"),
        }
    }

    #[test]
    fn query_node_internal_ids_carry_one_entry_per_bound_variable() {
        let (subquery, _) = bind_subquery(SubqueryKind::Exists, &["a".to_string(), "b".to_string()], None);
        match subquery.kind {
            ExpressionKind::Subquery(s) => assert_eq!(s.query_node_internal_ids.len(), 2),
            _ => panic!("expected a subquery expression"),
        }
    }
}
