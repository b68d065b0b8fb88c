//! PATH evaluator (§4.4), grounded on `path_evaluator.cpp`: each child is a
//! NODE, REL, or RECURSIVE_REL; output is `{ nodes: LIST<NODE>, rels: LIST<REL> }`
//! built by walking the children once and accumulating their contribution
//! (a NODE child contributes one node, a RECURSIVE_REL child contributes its
//! whole nested node/rel lists).
//!
//! The original computes this over raw list/struct vectors with a
//! precomputed field-vector routing table (`getFieldVectors`) because its
//! `ValueVector` is a flat byte buffer with no native nesting. This crate's
//! `Value` is already a tree (`Value::Struct`/`Value::List`), so the
//! field-by-field copy collapses into building the struct/list directly —
//! there is no routing table to precompute.

use crate::evaluator::{EvalContext, Evaluator, Result};
use crate::vector::ValueVector;
use gq_common::{LogicalType, Value};

pub enum PathElementKind {
    Node,
    Rel,
    RecursiveRel,
}

pub struct PathElement {
    pub kind: PathElementKind,
    pub evaluator: Box<dyn Evaluator>,
}

pub struct PathEvaluator {
    pub elements: Vec<PathElement>,
    result_type: LogicalType,
    result: ValueVector,
}

impl PathEvaluator {
    pub fn new(elements: Vec<PathElement>) -> Self {
        let result_type = LogicalType::path_struct();
        PathEvaluator {
            elements,
            result_type: result_type.clone(),
            result: ValueVector::new_flat(Value::Null(result_type)),
        }
    }
}

impl Evaluator for PathEvaluator {
    fn init(&mut self) {
        for element in &mut self.elements {
            element.evaluator.init();
        }
    }

    fn evaluate(&mut self, ctx: &EvalContext) -> Result<()> {
        for element in &mut self.elements {
            element.evaluator.evaluate(ctx)?;
        }
        let selected_size = ctx.chunk.selection.selected_size().max(1);
        self.result = ValueVector::new_unflat(self.result_type.clone(), selected_size);

        for pos in 0..selected_size {
            let mut nodes = Vec::new();
            let mut rels = Vec::new();
            for element in &self.elements {
                let input_pos = if element.evaluator.is_result_flat() { 0 } else { pos };
                let value = element.evaluator.result().get_value(input_pos);
                match (&element.kind, value) {
                    (PathElementKind::Node, v) => nodes.push(v.clone()),
                    (PathElementKind::Rel, v) => rels.push(v.clone()),
                    (PathElementKind::RecursiveRel, Value::Struct(fields)) => {
                        for (name, field_value) in fields {
                            match name.as_str() {
                                "nodes" => {
                                    if let Value::List(items) = field_value {
                                        nodes.extend(items.iter().cloned());
                                    }
                                }
                                "rels" => {
                                    if let Value::List(items) = field_value {
                                        rels.extend(items.iter().cloned());
                                    }
                                }
                                _ => {}
                            }
                        }
                    }
                    _ => {}
                }
            }
            let path_value = Value::Struct(vec![("nodes".to_string(), Value::List(nodes)), ("rels".to_string(), Value::List(rels))]);
            self.result.set_value(pos, path_value);
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
    use std::collections::HashMap;

    fn node_value(id: i64) -> Value {
        Value::Struct(vec![("_id".to_string(), Value::Int64(id))])
    }

    #[test]
    fn node_and_recursive_rel_children_accumulate_into_one_path() {
        let chunk = DataChunkBuilder::new().build();
        let params = HashMap::new();
        let ctx = EvalContext {
            chunk: &chunk,
            parameters: &params,
        };
        let n1 = PathElement {
            kind: PathElementKind::Node,
            evaluator: Box::new(LiteralEvaluator::new(node_value(1))),
        };
        let recursive = PathElement {
            kind: PathElementKind::RecursiveRel,
            evaluator: Box::new(LiteralEvaluator::new(Value::Struct(vec![
                ("nodes".to_string(), Value::List(vec![node_value(2), node_value(3)])),
                ("rels".to_string(), Value::List(vec![Value::Int64(100)])),
            ]))),
        };
        let mut path = PathEvaluator::new(vec![n1, recursive]);
        path.evaluate(&ctx).unwrap();
        let Value::Struct(fields) = path.result().get_value(0) else {
            panic!("expected struct result");
        };
        let nodes = fields.iter().find(|(n, _)| n == "nodes").unwrap();
        match &nodes.1 {
            Value::List(items) => assert_eq!(items.len(), 3),
            _ => panic!("expected list"),
        }
    }
}
