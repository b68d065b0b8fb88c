//! Deterministic `uniqueName` generation (§4.3). Two expressions built from
//! the same normalized children always produce the same name, which is what
//! lets `Expression` use it as its equality/hash key.

use crate::expression::{Expression, ExpressionKind, PatternKind, SubqueryKind};

pub fn generate(kind: &ExpressionKind, children: &[Expression]) -> String {
    match kind {
        ExpressionKind::Literal(v) => format!("LITERAL({v})"),
        ExpressionKind::Parameter(name) => format!("${name}"),
        ExpressionKind::Variable(name) => name.clone(),
        ExpressionKind::Property(p) => format!("{}.{}", p.variable_name, p.property_name),
        ExpressionKind::Pattern(p) => match p.pattern_kind {
            PatternKind::Node => p.variable_name.clone(),
            PatternKind::Rel | PatternKind::RecursiveRel => p.variable_name.clone(),
        },
        ExpressionKind::Path(p) => p.variable_name.clone(),
        ExpressionKind::CaseElse(case) => {
            let mut s = String::from("CASE");
            for alt in &case.alternatives {
                s.push_str(&format!(" WHEN {} THEN {}", alt.when.unique_name, alt.then.unique_name));
            }
            s.push_str(&format!(" ELSE {} END", case.else_expression.unique_name));
            s
        }
        ExpressionKind::Subquery(sq) => {
            let kind = match sq.subquery_kind {
                SubqueryKind::Count => "COUNT",
                SubqueryKind::Exists => "EXISTS",
            };
            let where_part = sq
                .where_expression
                .as_ref()
                .map(|w| format!(" WHERE {}", w.unique_name))
                .unwrap_or_default();
            format!("{kind}_SUBQUERY({}{})", sq.query_node_internal_ids.len(), where_part)
        }
        ExpressionKind::Function(f) => {
            let args = children.iter().map(|c| c.unique_name.as_str()).collect::<Vec<_>>().join(",");
            let distinct = if f.is_distinct { "DISTINCT " } else { "" };
            format!("{}({}{})", f.name, distinct, args)
        }
        ExpressionKind::Macro(m) => {
            let args = children.iter().map(|c| c.unique_name.as_str()).collect::<Vec<_>>().join(",");
            format!("{}({})", m.name, args)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{FunctionExpr, FunctionKind};
    use gq_common::{LogicalType, Value};

    fn literal(v: Value) -> Expression {
        let ty = v.logical_type();
        Expression::leaf(generate(&ExpressionKind::Literal(v.clone()), &[]), ty, ExpressionKind::Literal(v))
    }

    #[test]
    fn identical_function_calls_generate_identical_names() {
        let a = literal(Value::Int64(1));
        let b = literal(Value::Int64(1));
        let kind = ExpressionKind::Function(FunctionExpr {
            name: "abs".into(),
            function_kind: FunctionKind::Scalar,
            is_distinct: false,
        });
        let name_a = generate(&kind, &[a]);
        let name_b = generate(&kind, &[b]);
        assert_eq!(name_a, name_b);
    }

    #[test]
    fn different_literals_generate_different_names() {
        assert_ne!(literal(Value::Int64(1)).unique_name, literal(Value::Int64(2)).unique_name);
    }
}
