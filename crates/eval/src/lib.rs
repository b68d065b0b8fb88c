//! Vectorized expression evaluator (§4.4): data chunks and value vectors
//! over a selection vector, plus the eight `Evaluator` variants that walk a
//! bound expression tree row-batch at a time.

pub mod chunk;
pub mod evaluator;
pub mod selection;
pub mod vector;

pub use chunk::{DataChunk, DataChunkBuilder, ResultSet};
pub use evaluator::case::{CaseAlternative, CaseEvaluator};
pub use evaluator::function::{exec_abs, exec_cast_to_double, ScalarExecFn, ScalarFunctionEvaluator};
pub use evaluator::literal::LiteralEvaluator;
pub use evaluator::parameter::ParameterEvaluator;
pub use evaluator::path::{PathElement, PathElementKind, PathEvaluator};
pub use evaluator::pattern::{PatternEvaluator, PatternField};
pub use evaluator::reference::ReferenceEvaluator;
pub use evaluator::{default_select, resolve_result_state_from_children, EvalContext, EvalError, Evaluator, Result};
pub use selection::SelectionVector;
pub use vector::ValueVector;
