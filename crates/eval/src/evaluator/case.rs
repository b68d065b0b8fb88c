//! CASE evaluator (§4.4), grounded exactly on `case_evaluator.cpp`: for each
//! `WHEN/THEN` alternative in order, evaluate WHEN as a predicate selecting
//! still-uncovered rows, fill THEN into those, track a `filledMask`, stop
//! early once every row is filled, otherwise fall back to ELSE.

use crate::evaluator::{EvalContext, Evaluator, Result};
use crate::selection::SelectionVector;
use crate::vector::ValueVector;
use gq_common::{LogicalType, Value};

pub struct CaseAlternative {
    pub when: Box<dyn Evaluator>,
    pub then: Box<dyn Evaluator>,
}

pub struct CaseEvaluator {
    pub alternatives: Vec<CaseAlternative>,
    pub else_evaluator: Box<dyn Evaluator>,
    result_type: LogicalType,
    result: ValueVector,
    filled_mask: Vec<bool>,
}

impl CaseEvaluator {
    pub fn new(alternatives: Vec<CaseAlternative>, else_evaluator: Box<dyn Evaluator>, result_type: LogicalType) -> Self {
        CaseEvaluator {
            alternatives,
            else_evaluator,
            result_type: result_type.clone(),
            result: ValueVector::new_flat(Value::Null(result_type)),
            filled_mask: Vec::new(),
        }
    }

    fn fill_entry(&mut self, result_pos: usize, src: &ValueVector, src_pos_if_unflat: usize) {
        if self.filled_mask[result_pos] {
            return;
        }
        self.filled_mask[result_pos] = true;
        let src_pos = if src.is_flat() { 0 } else { src_pos_if_unflat };
        self.result.copy_from_vector_data(result_pos, src, src_pos);
    }
}

impl Evaluator for CaseEvaluator {
    fn init(&mut self) {
        for alt in &mut self.alternatives {
            alt.when.init();
            alt.then.init();
        }
        self.else_evaluator.init();
    }

    fn evaluate(&mut self, ctx: &EvalContext) -> Result<()> {
        let selected_size = ctx.chunk.selection.selected_size();
        self.result = ValueVector::new_unflat(self.result_type.clone(), selected_size.max(1));
        self.filled_mask = vec![false; selected_size];

        for idx in 0..self.alternatives.len() {
            let mut when_sel = SelectionVector::identity(selected_size);
            let has_any = self.alternatives[idx].when.select(&mut when_sel, ctx)?;
            if !has_any {
                continue;
            }
            self.alternatives[idx].then.evaluate(ctx)?;
            let then_vector = self.alternatives[idx].then.result().clone();
            let when_is_flat = self.alternatives[idx].when.is_result_flat();
            if when_is_flat {
                for result_pos in 0..selected_size {
                    self.fill_entry(result_pos, &then_vector, result_pos);
                }
            } else {
                for i in 0..when_sel.selected_size() {
                    let result_pos = when_sel.get(i) as usize;
                    self.fill_entry(result_pos, &then_vector, result_pos);
                }
            }
            if self.filled_mask.iter().all(|&b| b) {
                return Ok(());
            }
        }
        self.else_evaluator.evaluate(ctx)?;
        let else_vector = self.else_evaluator.result().clone();
        for result_pos in 0..selected_size {
            self.fill_entry(result_pos, &else_vector, result_pos);
        }
        Ok(())
    }

    fn select(&mut self, out_sel: &mut SelectionVector, ctx: &EvalContext) -> Result<bool> {
        self.evaluate(ctx)?;
        let in_sel = &ctx.chunk.selection;
        let mut kept = Vec::with_capacity(in_sel.selected_size());
        for i in 0..in_sel.selected_size() {
            let pos = in_sel.get(i);
            if self.result.get_bool(i) {
                kept.push(pos);
            }
        }
        let any = !kept.is_empty();
        *out_sel = SelectionVector::filtered(kept);
        Ok(any)
    }

    fn result(&self) -> &ValueVector {
        &self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::DataChunkBuilder;
    use crate::evaluator::literal::LiteralEvaluator;
    use crate::evaluator::reference::ReferenceEvaluator;
    use std::collections::HashMap;

    #[test]
    fn first_matching_when_wins_and_remaining_rows_fall_to_else() {
        let chunk = DataChunkBuilder::new()
            .add_column(LogicalType::Bool, vec![Value::Bool(true), Value::Bool(false)])
            .build();
        let params = HashMap::new();
        let ctx = EvalContext {
            chunk: &chunk,
            parameters: &params,
        };
        let when = ReferenceEvaluator::new(0, ValueVector::new_flat(Value::Null(LogicalType::Bool)));
        let then = LiteralEvaluator::new(Value::Int64(1));
        let else_eval = LiteralEvaluator::new(Value::Int64(0));
        let mut case = CaseEvaluator::new(
            vec![CaseAlternative {
                when: Box::new(when),
                then: Box::new(then),
            }],
            Box::new(else_eval),
            LogicalType::Int64,
        );
        case.evaluate(&ctx).unwrap();
        assert_eq!(case.result().get_value(0), &Value::Int64(1));
        assert_eq!(case.result().get_value(1), &Value::Int64(0));
    }

    #[test]
    fn all_rows_matching_skips_else_entirely() {
        let chunk = DataChunkBuilder::new()
            .add_column(LogicalType::Bool, vec![Value::Bool(true), Value::Bool(true)])
            .build();
        let params = HashMap::new();
        let ctx = EvalContext {
            chunk: &chunk,
            parameters: &params,
        };
        let when = ReferenceEvaluator::new(0, ValueVector::new_flat(Value::Null(LogicalType::Bool)));
        let then = LiteralEvaluator::new(Value::Int64(9));
        // Else would panic if reached with a zero selected_size chunk; using
        // a literal proves the loop returned before touching it either way.
        let else_eval = LiteralEvaluator::new(Value::Int64(0));
        let mut case = CaseEvaluator::new(
            vec![CaseAlternative {
                when: Box::new(when),
                then: Box::new(then),
            }],
            Box::new(else_eval),
            LogicalType::Int64,
        );
        case.evaluate(&ctx).unwrap();
        assert_eq!(case.result().get_value(0), &Value::Int64(9));
        assert_eq!(case.result().get_value(1), &Value::Int64(9));
    }
}
