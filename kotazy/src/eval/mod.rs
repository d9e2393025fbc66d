//! Restricted expression evaluator
//!
//! Expressions are parsed with a broad grammar, checked against the
//! allow-lists in [`node`], and only then evaluated. Names resolve through a
//! [`Variables`] source.

mod check;
pub mod node;
mod ops;
mod parser;
pub mod token;

pub use check::check;
pub use node::{Arg, BinOp, Expr, NodeKind, UnaryOp};
pub use parser::{parse_expression, tokenize_expression};

use crate::error::Result;
use crate::interp::{
    Bindings, EnvRef, Environment, Executor, InterpResult, NamedFunction, RuntimeError, Value,
};
use crate::util::{STACK_GROW_SIZE, STACK_RED_ZONE};
use tracing::debug;

/// Name source for expression evaluation
pub trait Variables {
    fn lookup(&self, name: &str) -> Option<Value>;

    /// Executor handed to context-wanting callables, if there is one
    fn context(&mut self) -> Option<&mut Executor> {
        None
    }
}

/// Plain bindings, read without wrapping
impl Variables for Bindings {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl Variables for Environment {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name)
    }
}

impl Variables for EnvRef {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.borrow().get(name)
    }
}

/// The engine environment plus the running executor
impl Variables for Executor {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.environment().borrow().get(name)
    }

    fn context(&mut self) -> Option<&mut Executor> {
        Some(self)
    }
}

/// Parse, check and evaluate `source` against `vars`
pub fn evaluate<V: Variables + ?Sized>(source: &str, vars: &mut V) -> Result<Value> {
    let expr = parse_expression(source)?;
    check(&expr)?;
    let value = eval_expr(&expr, vars)?;
    debug!(source, result = %value, "evaluate");
    Ok(value)
}

/// Evaluate a tree that already passed [`check`]
pub fn eval_expr<V: Variables + ?Sized>(expr: &Expr, vars: &mut V) -> InterpResult<Value> {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || eval_inner(expr, vars))
}

fn eval_inner<V: Variables + ?Sized>(expr: &Expr, vars: &mut V) -> InterpResult<Value> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Name(name) => vars
            .lookup(name)
            .ok_or_else(|| RuntimeError::unknown_variable(name)),
        Expr::BinOp { op, left, right } => {
            let left = eval_expr(left, vars)?;
            let right = eval_expr(right, vars)?;
            ops::binary(*op, left, right)
        }
        Expr::UnaryOp { op, operand } => {
            let operand = eval_expr(operand, vars)?;
            ops::unary(*op, operand)
        }
        Expr::Call { func, args } => {
            let Expr::Name(name) = func.as_ref() else {
                return Err(RuntimeError::unsafe_expression("call of a computed callee"));
            };
            let callee = vars
                .lookup(name)
                .ok_or_else(|| RuntimeError::unknown_variable(name))?;
            let function = match callee {
                Value::Function(function) => function,
                Value::Native(native) => NamedFunction::new(name.as_str(), native),
                other => return Err(RuntimeError::not_callable(name, other.type_name())),
            };
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                match arg {
                    Arg::Positional(value) => values.push(eval_expr(value, vars)?),
                    other => return Err(RuntimeError::unsafe_expression(other.describe())),
                }
            }
            function.call_with_values(vars.context(), values)
        }
        Expr::Subscript { value, index } => {
            let value = eval_expr(value, vars)?;
            let index = eval_expr(index, vars)?;
            ops::subscript(value, index)
        }
        other => Err(RuntimeError::unsafe_expression(other.kind().describe())),
    }
}

/// Evaluator with its own default variables
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    defaults: Bindings,
    variables: Bindings,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the defaults; takes effect on the next reset
    pub fn set_default_environment(&mut self, bindings: Bindings) {
        self.defaults = bindings;
    }

    /// Make the current variables a fresh copy of the defaults
    pub fn reset_environment(&mut self) {
        self.variables = self.defaults.clone();
    }

    pub fn environment(&self) -> &Bindings {
        &self.variables
    }

    pub fn environment_mut(&mut self) -> &mut Bindings {
        &mut self.variables
    }

    /// Evaluate against the current variables
    pub fn evaluate(&mut self, source: &str) -> Result<Value> {
        evaluate(source, &mut self.variables)
    }
}
