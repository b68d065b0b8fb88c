//! Reference evaluator (§4.4): reads a vector already materialized in the
//! current chunk, at a fixed `(chunk_pos, vector_pos)`. No per-batch work
//! beyond pointing at it.

use crate::evaluator::{EvalContext, Evaluator, Result};
use crate::vector::ValueVector;

pub struct ReferenceEvaluator {
    pub vector_pos: usize,
    result: ValueVector,
}

impl ReferenceEvaluator {
    pub fn new(vector_pos: usize, placeholder: ValueVector) -> Self {
        ReferenceEvaluator {
            vector_pos,
            result: placeholder,
        }
    }
}

impl Evaluator for ReferenceEvaluator {
    fn evaluate(&mut self, ctx: &EvalContext) -> Result<()> {
        self.result = ctx.chunk.vectors[self.vector_pos].clone();
        Ok(())
    }

    fn result(&self) -> &ValueVector {
        &self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::DataChunkBuilder;
    use crate::selection::SelectionVector;
    use gq_common::{LogicalType, Value};
    use std::collections::HashMap;

    #[test]
    fn reads_the_fixed_vector_position() {
        let chunk = DataChunkBuilder::new()
            .add_column(LogicalType::Int64, vec![Value::Int64(10), Value::Int64(20)])
            .build();
        let params = HashMap::new();
        let ctx = EvalContext {
            chunk: &chunk,
            parameters: &params,
        };
        let mut eval = ReferenceEvaluator::new(0, ValueVector::new_flat(Value::Null(LogicalType::Int64)));
        eval.evaluate(&ctx).unwrap();
        assert_eq!(eval.result().get_value(1), &Value::Int64(20));
        let _ = SelectionVector::identity(0);
    }
}
