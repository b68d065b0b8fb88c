//! Pattern (NODE/REL) evaluator (§4.4): packs its child evaluators — id,
//! label, properties — into a STRUCT result; a null id makes the whole
//! struct null. Undirected rels additionally swap src/dst id fields where a
//! direction child is true.

use crate::evaluator::{EvalContext, Evaluator, Result};
use crate::vector::ValueVector;
use gq_common::{LogicalType, StructField, Value};

pub struct PatternField {
    pub name: String,
    pub evaluator: Box<dyn Evaluator>,
}

pub struct PatternEvaluator {
    pub id_field_index: usize,
    /// For an undirected REL pattern, the indices of the src-id and dst-id
    /// fields to swap, and the direction predicate evaluator.
    pub undirected_swap: Option<(usize, usize, Box<dyn Evaluator>)>,
    pub fields: Vec<PatternField>,
    result_type: LogicalType,
    result: ValueVector,
}

impl PatternEvaluator {
    pub fn new(fields: Vec<PatternField>, id_field_index: usize) -> Self {
        let result_type = LogicalType::Struct(
            fields
                .iter()
                .map(|f| StructField {
                    name: f.name.clone(),
                    ty: LogicalType::Any,
                })
                .collect(),
        );
        PatternEvaluator {
            id_field_index,
            undirected_swap: None,
            fields,
            result_type: result_type.clone(),
            result: ValueVector::new_flat(Value::Null(result_type)),
        }
    }

    pub fn with_undirected_swap(mut self, src_index: usize, dst_index: usize, direction: Box<dyn Evaluator>) -> Self {
        self.undirected_swap = Some((src_index, dst_index, direction));
        self
    }
}

impl Evaluator for PatternEvaluator {
    fn init(&mut self) {
        for field in &mut self.fields {
            field.evaluator.init();
        }
        if let Some((_, _, direction)) = &mut self.undirected_swap {
            direction.init();
        }
    }

    fn evaluate(&mut self, ctx: &EvalContext) -> Result<()> {
        for field in &mut self.fields {
            field.evaluator.evaluate(ctx)?;
        }
        let selected_size = ctx.chunk.selection.selected_size().max(1);
        let mut field_values: Vec<(String, Vec<Value>)> = self
            .fields
            .iter()
            .map(|f| {
                let values = (0..selected_size).map(|pos| f.evaluator.result().get_value(pos).clone()).collect();
                (f.name.clone(), values)
            })
            .collect();

        if let Some((src_idx, dst_idx, direction)) = &mut self.undirected_swap {
            direction.evaluate(ctx)?;
            for pos in 0..selected_size {
                if direction.result().get_bool(pos) {
                    let src_val = field_values[*src_idx].1[pos].clone();
                    let dst_val = field_values[*dst_idx].1[pos].clone();
                    field_values[*src_idx].1[pos] = dst_val;
                    field_values[*dst_idx].1[pos] = src_val;
                }
            }
        }

        let mut rows = Vec::with_capacity(selected_size);
        for pos in 0..selected_size {
            let id_is_null = field_values[self.id_field_index].1[pos].is_null();
            if id_is_null {
                rows.push(Value::Null(self.result_type.clone()));
                continue;
            }
            let fields = field_values.iter().map(|(name, values)| (name.clone(), values[pos].clone())).collect();
            rows.push(Value::Struct(fields));
        }

        self.result = ValueVector::new_unflat(self.result_type.clone(), selected_size);
        for (pos, v) in rows.into_iter().enumerate() {
            self.result.set_value(pos, v);
        }
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
    use crate::evaluator::literal::LiteralEvaluator;
    use gq_common::InternalOffset;
    use std::collections::HashMap;

    #[test]
    fn null_id_makes_the_whole_struct_null() {
        let chunk = DataChunkBuilder::new().build();
        let params = HashMap::new();
        let ctx = EvalContext {
            chunk: &chunk,
            parameters: &params,
        };
        let _ = InternalOffset(0);
        let id_field = PatternField {
            name: "_id".into(),
            evaluator: Box::new(LiteralEvaluator::new(Value::Null(LogicalType::InternalId))),
        };
        let mut pattern = PatternEvaluator::new(vec![id_field], 0);
        pattern.evaluate(&ctx).unwrap();
        assert!(pattern.result().get_value(0).is_null());
    }
}
