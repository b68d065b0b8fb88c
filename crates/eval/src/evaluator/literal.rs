//! Literal evaluator (§4.4): a single constant `Value`, always flat;
//! `select` reads the boolean directly off it.

use crate::evaluator::{EvalContext, Evaluator, Result};
use crate::vector::ValueVector;
use gq_common::Value;

pub struct LiteralEvaluator {
    result: ValueVector,
}

impl LiteralEvaluator {
    pub fn new(value: Value) -> Self {
        LiteralEvaluator {
            result: ValueVector::new_flat(value),
        }
    }
}

impl Evaluator for LiteralEvaluator {
    fn evaluate(&mut self, _ctx: &EvalContext) -> Result<()> {
        Ok(())
    }

    fn result(&self) -> &ValueVector {
        &self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_result_is_flat() {
        let eval = LiteralEvaluator::new(Value::Bool(true));
        assert!(eval.is_result_flat());
        assert!(eval.result().get_bool(0));
    }
}
