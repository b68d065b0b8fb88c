//! The expression model: a typed tree shared by the binder and evaluator
//! (§4.3).

pub mod expression;
pub mod name;
pub mod visitor;

pub use expression::{
    CaseAlternative, CaseExpr, Expression, ExpressionKind, FunctionExpr, FunctionKind, MacroExpr, PathExpr,
    PatternExpr, PatternKind, PatternMetadata, PropertyExpr, SubqueryExpr, SubqueryKind,
};
