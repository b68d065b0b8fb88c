//! Parameter evaluator (§4.4): like LITERAL, but re-reads its backing
//! `Value` from the statement's parameter bindings on every `evaluate`
//! (the original reads through a shared pointer updated between statements).

use crate::evaluator::{EvalContext, EvalError, Evaluator, Result};
use crate::vector::ValueVector;
use gq_common::LogicalType;

pub struct ParameterEvaluator {
    pub name: String,
    result: ValueVector,
}

impl ParameterEvaluator {
    pub fn new(name: impl Into<String>) -> Self {
        ParameterEvaluator {
            name: name.into(),
            result: ValueVector::new_flat(gq_common::Value::Null(LogicalType::Any)),
        }
    }
}

impl Evaluator for ParameterEvaluator {
    fn evaluate(&mut self, ctx: &EvalContext) -> Result<()> {
        let value = ctx
            .parameters
            .get(&self.name)
            .cloned()
            .ok_or_else(|| EvalError::UnboundParameter(self.name.clone()))?;
        self.result = ValueVector::new_flat(value);
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
    use gq_common::Value;
    use std::collections::HashMap;

    #[test]
    fn reads_value_bound_for_this_statement() {
        let chunk = DataChunkBuilder::new().build();
        let mut params = HashMap::new();
        params.insert("p".to_string(), Value::Int64(5));
        let ctx = EvalContext {
            chunk: &chunk,
            parameters: &params,
        };
        let mut eval = ParameterEvaluator::new("p");
        eval.evaluate(&ctx).unwrap();
        assert_eq!(eval.result().get_value(0), &Value::Int64(5));
    }

    #[test]
    fn unbound_parameter_is_an_error() {
        let chunk = DataChunkBuilder::new().build();
        let params = HashMap::new();
        let ctx = EvalContext {
            chunk: &chunk,
            parameters: &params,
        };
        let mut eval = ParameterEvaluator::new("missing");
        assert!(eval.evaluate(&ctx).is_err());
    }
}
