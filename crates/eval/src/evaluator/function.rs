//! Scalar function evaluator (§4.4): evaluates every child, then calls the
//! function's `exec` over the per-row values. Implicit casts were already
//! inserted at bind time, so this never casts.

use crate::evaluator::{resolve_result_state_from_children, EvalContext, EvalError, Evaluator, Result};
use crate::vector::ValueVector;
use gq_common::{LogicalType, Value};

pub type ScalarExecFn = fn(&[Value]) -> Value;

pub struct ScalarFunctionEvaluator {
    pub name: String,
    pub children: Vec<Box<dyn Evaluator>>,
    exec: ScalarExecFn,
    result_type: LogicalType,
    result: ValueVector,
}

impl ScalarFunctionEvaluator {
    pub fn new(name: impl Into<String>, children: Vec<Box<dyn Evaluator>>, exec: ScalarExecFn, result_type: LogicalType) -> Self {
        ScalarFunctionEvaluator {
            name: name.into(),
            children,
            exec,
            result_type: result_type.clone(),
            result: ValueVector::new_flat(Value::Null(result_type)),
        }
    }
}

impl Evaluator for ScalarFunctionEvaluator {
    fn init(&mut self) {
        for child in &mut self.children {
            child.init();
        }
    }

    fn evaluate(&mut self, ctx: &EvalContext) -> Result<()> {
        for child in &mut self.children {
            child.evaluate(ctx)?;
        }
        let child_refs: Vec<&dyn Evaluator> = self.children.iter().map(|c| c.as_ref()).collect();
        let is_flat = resolve_result_state_from_children(&child_refs);
        let selected_size = if is_flat { 1 } else { ctx.chunk.selection.selected_size() };

        self.result = if is_flat {
            ValueVector::new_flat(Value::Null(self.result_type.clone()))
        } else {
            ValueVector::new_unflat(self.result_type.clone(), selected_size)
        };
        for pos in 0..selected_size {
            let args: Vec<Value> = self.children.iter().map(|c| c.result().get_value(pos).clone()).collect();
            let value = (self.exec)(&args);
            self.result.set_value(pos, value);
        }
        Ok(())
    }

    fn result(&self) -> &ValueVector {
        &self.result
    }
}

fn assert_arity(name: &str, args: &[Value], expected: usize) -> Result<()> {
    if args.len() != expected {
        return Err(EvalError::ArityMismatch(name.to_string(), args.len(), expected));
    }
    Ok(())
}

/// `abs(x)`, a representative scalar function used by the test suite and by
/// the `CAST` rewrite the binder inserts for implicit numeric widening.
pub fn exec_abs(args: &[Value]) -> Value {
    match args.first() {
        Some(Value::Int64(v)) => Value::Int64(v.abs()),
        Some(Value::Int32(v)) => Value::Int32(v.abs()),
        Some(Value::Double(v)) => Value::Double(v.abs()),
        Some(Value::Null(ty)) => Value::Null(ty.clone()),
        _ => Value::Null(LogicalType::Any),
    }
}

pub fn exec_cast_to_double(args: &[Value]) -> Value {
    args.first()
        .and_then(|v| v.try_cast(&LogicalType::Double))
        .unwrap_or(Value::Null(LogicalType::Double))
}
