//! The typed expression tree (§4.3). Composite kinds (CASE, SUBQUERY,
//! PATTERN, PATH) keep their real operands in typed subfields rather than
//! the generic `children` list; [`crate::visitor`] is what knows to look
//! there.

use gq_common::{LogicalType, TableId, Value};
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Scalar,
    Aggregate,
    /// A function rewritten away during binding (e.g. `count(*)`); kept only
    /// so the evaluator can still recognize and fold it if it slips through.
    Rewrite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubqueryKind {
    Count,
    Exists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Node,
    Rel,
    RecursiveRel,
}

#[derive(Debug, Clone)]
pub struct PropertyExpr {
    pub variable_name: String,
    pub property_name: String,
}

/// Per-entity metadata a PATTERN expression carries: the set of table ids it
/// may bind to at runtime and a name→index map into `property_expressions`.
#[derive(Debug, Clone, Default)]
pub struct PatternMetadata {
    pub table_ids: Vec<TableId>,
    pub property_index: IndexMap<String, usize>,
}

#[derive(Debug, Clone)]
pub struct PatternExpr {
    pub pattern_kind: PatternKind,
    pub variable_name: String,
    pub metadata: PatternMetadata,
    pub property_expressions: Vec<Expression>,
    pub internal_id: Box<Expression>,
    /// `None` for NODE patterns; the endpoints' `_id` expressions for REL/RECURSIVE_REL.
    pub src_dst_internal_id: Option<(Box<Expression>, Box<Expression>)>,
}

#[derive(Debug, Clone)]
pub struct PathExpr {
    pub variable_name: String,
    /// Alternating NODE/REL pattern expressions along the path, in order.
    pub element_expressions: Vec<Expression>,
}

#[derive(Debug, Clone)]
pub struct CaseAlternative {
    pub when: Expression,
    pub then: Expression,
}

#[derive(Debug, Clone)]
pub struct CaseExpr {
    pub alternatives: Vec<CaseAlternative>,
    pub else_expression: Box<Expression>,
}

#[derive(Debug, Clone)]
pub struct SubqueryExpr {
    pub subquery_kind: SubqueryKind,
    /// `_id` expressions of every node bound inside the subquery's query graph.
    pub query_node_internal_ids: Vec<Expression>,
    pub where_expression: Option<Box<Expression>>,
}

#[derive(Debug, Clone)]
pub struct FunctionExpr {
    pub name: String,
    pub function_kind: FunctionKind,
    /// `true` for `count(DISTINCT a)`-style aggregates.
    pub is_distinct: bool,
}

#[derive(Debug, Clone)]
pub struct MacroExpr {
    pub name: String,
}

#[derive(Debug, Clone)]
pub enum ExpressionKind {
    Literal(Value),
    Parameter(String),
    Variable(String),
    Property(PropertyExpr),
    Pattern(PatternExpr),
    Path(PathExpr),
    CaseElse(CaseExpr),
    Subquery(SubqueryExpr),
    Function(FunctionExpr),
    Macro(MacroExpr),
}

/// One node in the expression tree.
///
/// `children` is the *generic* child list: it is what plain kinds (FUNCTION,
/// MACRO, and leaves) store their operands in, and what the default arm of
/// `collect_children` returns. CASE/SUBQUERY/PATTERN/PATH ignore it — their
/// operands live in `kind`'s own fields instead.
#[derive(Debug, Clone)]
pub struct Expression {
    pub unique_name: String,
    pub logical_type: LogicalType,
    pub children: Vec<Expression>,
    pub kind: ExpressionKind,
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.unique_name == other.unique_name
    }
}
impl Eq for Expression {}

impl std::hash::Hash for Expression {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.unique_name.hash(state);
    }
}

impl Expression {
    pub fn leaf(unique_name: String, logical_type: LogicalType, kind: ExpressionKind) -> Self {
        Expression {
            unique_name,
            logical_type,
            children: Vec::new(),
            kind,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.kind, ExpressionKind::Literal(_))
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(
            self.kind,
            ExpressionKind::Function(FunctionExpr {
                function_kind: FunctionKind::Aggregate,
                ..
            })
        )
    }
}
