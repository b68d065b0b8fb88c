//! Children-collection visitor (§4.3), grounded on `expression_visitor.cpp`:
//! a single dispatch point so callers never need to know which kind hides
//! its operands in typed fields.

use crate::expression::{Expression, ExpressionKind, PatternExpr, PatternKind};
use std::collections::HashSet;

/// Collects the logical children of `expr`, reaching into CASE/SUBQUERY/
/// PATTERN's typed fields where the generic `children` list would miss them.
pub fn collect_children(expr: &Expression) -> Vec<&Expression> {
    match &expr.kind {
        ExpressionKind::CaseElse(case) => {
            let mut result = Vec::with_capacity(case.alternatives.len() * 2 + 1);
            for alt in &case.alternatives {
                result.push(&alt.when);
                result.push(&alt.then);
            }
            result.push(case.else_expression.as_ref());
            result
        }
        ExpressionKind::Subquery(subquery) => {
            let mut result: Vec<&Expression> = subquery.query_node_internal_ids.iter().collect();
            if let Some(where_expr) = &subquery.where_expression {
                result.push(where_expr.as_ref());
            }
            result
        }
        ExpressionKind::Pattern(pattern) => collect_pattern_children(pattern),
        ExpressionKind::Path(path) => path.element_expressions.iter().collect(),
        _ => expr.children.iter().collect(),
    }
}

fn collect_pattern_children(pattern: &PatternExpr) -> Vec<&Expression> {
    match pattern.pattern_kind {
        PatternKind::Node => {
            let mut result: Vec<&Expression> = pattern.property_expressions.iter().collect();
            result.push(pattern.internal_id.as_ref());
            result
        }
        PatternKind::Rel | PatternKind::RecursiveRel => {
            let mut result = Vec::new();
            if let Some((src, dst)) = &pattern.src_dst_internal_id {
                result.push(src.as_ref());
                result.push(dst.as_ref());
            }
            result.extend(pattern.property_expressions.iter());
            result
        }
    }
}

/// `true` iff every leaf reachable from `expr` is a LITERAL and no subtree
/// is an aggregate (aggregates cannot be constant-folded without a plan).
pub fn is_constant(expr: &Expression) -> bool {
    if expr.is_aggregate() {
        return false;
    }
    let children = collect_children(expr);
    if children.is_empty() {
        return expr.is_literal();
    }
    children.into_iter().all(is_constant)
}

/// `true` iff `condition` holds for `expr` or any expression reachable from it.
pub fn satisfy_any(expr: &Expression, condition: &impl Fn(&Expression) -> bool) -> bool {
    if condition(expr) {
        return true;
    }
    collect_children(expr).into_iter().any(|child| satisfy_any(child, condition))
}

pub fn has_aggregate(expr: &Expression) -> bool {
    satisfy_any(expr, &Expression::is_aggregate)
}

pub fn has_subquery(expr: &Expression) -> bool {
    satisfy_any(expr, &|e| matches!(e.kind, ExpressionKind::Subquery(_)))
}

/// Every PROPERTY expression reachable from `expr`.
pub fn collect_property_expressions(expr: &Expression) -> Vec<&Expression> {
    let mut out = Vec::new();
    collect_internal(expr, &|e| matches!(e.kind, ExpressionKind::Property(_)), &mut out);
    out
}

fn collect_internal<'a>(
    expr: &'a Expression,
    condition: &impl Fn(&Expression) -> bool,
    out: &mut Vec<&'a Expression>,
) {
    if condition(expr) {
        out.push(expr);
        return;
    }
    for child in collect_children(expr) {
        collect_internal(child, condition, out);
    }
}

/// The set of variable names `expr` depends on: PROPERTY contributes its
/// owning variable, PATTERN/VARIABLE contribute their own `uniqueName`.
pub fn collect_dependent_variable_names(expr: &Expression) -> HashSet<String> {
    let mut matches = Vec::new();
    collect_internal(
        expr,
        &|e| matches!(e.kind, ExpressionKind::Property(_) | ExpressionKind::Pattern(_) | ExpressionKind::Variable(_)),
        &mut matches,
    );
    matches
        .into_iter()
        .map(|e| match &e.kind {
            ExpressionKind::Property(p) => p.variable_name.clone(),
            _ => e.unique_name.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{CaseAlternative, CaseExpr, FunctionExpr, FunctionKind, PropertyExpr};
    use gq_common::{LogicalType, Value};

    fn literal(v: Value) -> Expression {
        let ty = v.logical_type();
        Expression::leaf(format!("{v}"), ty, ExpressionKind::Literal(v))
    }

    fn property(var: &str, prop: &str, ty: LogicalType) -> Expression {
        Expression::leaf(
            format!("{var}.{prop}"),
            ty,
            ExpressionKind::Property(PropertyExpr {
                variable_name: var.to_string(),
                property_name: prop.to_string(),
            }),
        )
    }

    #[test]
    fn literal_is_constant() {
        assert!(is_constant(&literal(Value::Int64(1))));
    }

    #[test]
    fn property_reference_is_not_constant() {
        assert!(!is_constant(&property("n", "age", LogicalType::Int64)));
    }

    #[test]
    fn case_children_reach_every_branch() {
        let case = Expression {
            unique_name: "CASE".into(),
            logical_type: LogicalType::Int64,
            children: Vec::new(),
            kind: ExpressionKind::CaseElse(CaseExpr {
                alternatives: vec![CaseAlternative {
                    when: property("n", "flag", LogicalType::Bool),
                    then: literal(Value::Int64(1)),
                }],
                else_expression: Box::new(literal(Value::Int64(0))),
            }),
        };
        let children = collect_children(&case);
        assert_eq!(children.len(), 3);
        assert!(has_aggregate(&case) == false);
        let deps = collect_dependent_variable_names(&case);
        assert_eq!(deps.len(), 1);
        assert!(deps.contains("n"));
    }

    #[test]
    fn aggregate_function_is_never_constant_even_with_literal_args() {
        let agg = Expression {
            unique_name: "count(1)".into(),
            logical_type: LogicalType::Int64,
            children: vec![literal(Value::Int64(1))],
            kind: ExpressionKind::Function(FunctionExpr {
                name: "count".into(),
                function_kind: FunctionKind::Aggregate,
                is_distinct: false,
            }),
        };
        assert!(!is_constant(&agg));
        assert!(has_aggregate(&agg));
    }
}
