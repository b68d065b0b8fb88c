//! The evaluator contract (§4.4): `init`/`evaluate`/`select`, shared by
//! every variant.

pub mod case;
pub mod function;
pub mod literal;
pub mod parameter;
pub mod pattern;
pub mod path;
pub mod reference;

use crate::chunk::DataChunk;
use crate::selection::SelectionVector;
use crate::vector::ValueVector;
use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("unbound parameter ${0}")]
    UnboundParameter(String),
    #[error("scalar function {0} received {1} arguments, expected {2}")]
    ArityMismatch(String, usize, usize),
}

pub type Result<T> = std::result::Result<T, EvalError>;

/// Evaluation-time context: the chunk currently being processed plus the
/// statement's parameter bindings (read by `ParameterEvaluator`).
pub struct EvalContext<'a> {
    pub chunk: &'a DataChunk,
    pub parameters: &'a HashMap<String, gq_common::Value>,
}

pub trait Evaluator {
    /// One-time setup per plan: allocate `resultVector`-equivalent state and
    /// recurse into children. Most leaf evaluators need nothing here.
    fn init(&mut self) {}

    fn evaluate(&mut self, ctx: &EvalContext) -> Result<()>;

    /// Predicate pass: evaluate, then fold the result into `out_sel`
    /// restricted to truthy rows. Returns whether any row passed.
    fn select(&mut self, out_sel: &mut SelectionVector, ctx: &EvalContext) -> Result<bool> {
        self.evaluate(ctx)?;
        default_select(self.result(), ctx.chunk.selection.selected_size(), out_sel)
    }

    fn result(&self) -> &ValueVector;

    fn is_result_flat(&self) -> bool {
        self.result().is_flat()
    }
}

/// Shared `select` fallback: reinterpret a just-evaluated boolean result
/// vector against the caller's selection, keeping only truthy positions.
pub fn default_select(result: &ValueVector, selected_size: usize, out_sel: &mut SelectionVector) -> Result<bool> {
    let mut kept = Vec::with_capacity(selected_size);
    for pos in 0..selected_size {
        if result.get_bool(pos) {
            kept.push(pos as u32);
        }
    }
    let any = !kept.is_empty();
    *out_sel = SelectionVector::filtered(kept);
    Ok(any)
}

/// Flatness propagation (§4.4): a result is flat iff every input whose
/// position changes per row is flat, i.e. iff *all* children are flat.
pub fn resolve_result_state_from_children(children: &[&dyn Evaluator]) -> bool {
    children.iter().all(|c| c.is_result_flat())
}
