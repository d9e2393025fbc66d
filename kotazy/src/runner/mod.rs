//! Runner: the parse → lower → execute pipeline
//!
//! Owns an [`Interpreter`] and an [`Evaluator`], and bridges the two with
//! the `clc`, `pcl` and `ecl` built-ins.

use crate::ast::{CodeBlock, Param};
use crate::error::{Error, Result};
use crate::eval::{self, Evaluator};
use crate::interp::{
    Bindings, Console, EnvRef, InterpResult, Interpreter, Native, RuntimeError, Value,
};
use crate::lower::lower;
use crate::parser::parse;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, instrument, warn};

/// Pipeline stage reached by the last run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Parsed,
    Lowered,
    Running,
    Completed,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Parsed => "parsed",
            Stage::Lowered => "lowered",
            Stage::Running => "running",
            Stage::Completed => "completed",
            Stage::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

pub struct Runner {
    interpreter: Interpreter,
    evaluator: Rc<RefCell<Evaluator>>,
    stage: Stage,
}

impl Runner {
    pub fn new() -> Self {
        Self::with_interpreter(Interpreter::new())
    }

    pub fn with_console(console: Console) -> Self {
        Self::with_interpreter(Interpreter::with_console(console))
    }

    pub fn with_interpreter(mut interpreter: Interpreter) -> Self {
        let evaluator = Rc::new(RefCell::new(Evaluator::new()));
        interpreter.install_environment(bridge(&evaluator));
        Runner {
            interpreter,
            evaluator,
            stage: Stage::Idle,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    pub fn environment(&self) -> &EnvRef {
        self.interpreter.environment()
    }

    pub fn console(&self) -> &Console {
        self.interpreter.console()
    }

    pub fn evaluator(&self) -> &Rc<RefCell<Evaluator>> {
        &self.evaluator
    }

    pub fn install_environment(&mut self, bindings: Bindings) {
        self.interpreter.install_environment(bindings);
    }

    pub fn reset_environment(&mut self) {
        self.interpreter.reset_environment();
    }

    /// Parse, lower and execute one source string
    #[instrument(level = "debug", skip_all, fields(len = source.len()))]
    pub fn run(&mut self, source: &str) -> Result<Value> {
        self.advance(Stage::Idle);
        let tree = match parse(source) {
            Ok(tree) => tree,
            Err(err) => {
                self.advance(Stage::Failed);
                return Err(err);
            }
        };
        self.advance(Stage::Parsed);
        let block = lower(&tree);
        self.advance(Stage::Lowered);
        self.execute(&block)
    }

    /// Execute an already lowered block
    pub fn execute(&mut self, block: &CodeBlock) -> Result<Value> {
        self.advance(Stage::Running);
        match self.interpreter.execute(block) {
            Ok(value) => {
                self.advance(Stage::Completed);
                Ok(value)
            }
            Err(err) => {
                warn!(kind = ?err.kind, error = %err.message, "run failed");
                self.advance(Stage::Failed);
                Err(err.into())
            }
        }
    }

    /// Evaluate an expression against the evaluator's variables
    pub fn eval(&self, source: &str) -> Result<Value> {
        eval_with_defaults(&self.evaluator, source)
    }

    /// Evaluate an expression against the engine environment
    pub fn eval_in_environment(&self, source: &str) -> Result<Value> {
        let mut cx = self.interpreter.executor();
        eval::evaluate(source, &mut cx)
    }

    fn advance(&mut self, stage: Stage) {
        debug!(from = %self.stage, to = %stage, "stage");
        self.stage = stage;
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

fn eval_with_defaults(evaluator: &Rc<RefCell<Evaluator>>, source: &str) -> Result<Value> {
    let mut vars = evaluator.borrow().environment().clone();
    eval::evaluate(source, &mut vars)
}

/// Expression errors surfacing inside a running program
fn into_runtime(err: Error) -> RuntimeError {
    match err {
        Error::Runtime(err) => err,
        Error::Syntax { message, span } => {
            RuntimeError::expression_syntax(&format!("{message} at {span}"))
        }
    }
}

/// Source text of a single string parameter; `None` for any other node
fn expression_param<'a>(name: &str, params: &'a [Param]) -> InterpResult<Option<&'a str>> {
    match params {
        [Param::String(source)] => Ok(Some(source)),
        [_] => Ok(None),
        _ => Err(RuntimeError::arity_mismatch(name, "1", params.len())),
    }
}

/// `clc`, `pcl` and `ecl`
fn bridge(evaluator: &Rc<RefCell<Evaluator>>) -> Bindings {
    let mut bindings = Bindings::new();

    let clc_evaluator = Rc::clone(evaluator);
    bindings.insert(
        "clc".to_string(),
        Value::Native(Native::syntax(move |_, params| {
            match expression_param("clc", params)? {
                Some(source) => eval_with_defaults(&clc_evaluator, source).map_err(into_runtime),
                None => Ok(Value::None),
            }
        })),
    );

    let pcl_evaluator = Rc::clone(evaluator);
    bindings.insert(
        "pcl".to_string(),
        Value::Native(Native::syntax(move |cx, params| {
            let value = match expression_param("pcl", params)? {
                Some(source) => eval_with_defaults(&pcl_evaluator, source).map_err(into_runtime)?,
                None => Value::None,
            };
            cx.console().write_line(&value.to_string());
            Ok(Value::None)
        })),
    );

    bindings.insert(
        "ecl".to_string(),
        Value::Native(Native::syntax(|cx, params| {
            match expression_param("ecl", params)? {
                Some(source) => eval::evaluate(source, cx).map_err(into_runtime),
                None => Ok(Value::None),
            }
        })),
    );

    bindings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::ErrorKind;

    fn runner() -> Runner {
        Runner::with_console(Console::capture())
    }

    fn runtime_kind(result: Result<Value>) -> Option<ErrorKind> {
        result.err().and_then(|e| e.as_runtime().map(|r| r.kind.clone()))
    }

    #[test]
    fn test_stage_completed() {
        let mut runner = runner();
        assert_eq!(runner.stage(), Stage::Idle);
        assert_eq!(runner.run("{ret(1)}").ok(), Some(Value::Number(1.0)));
        assert_eq!(runner.stage(), Stage::Completed);
    }

    #[test]
    fn test_stage_failed_on_syntax() {
        let mut runner = runner();
        assert!(runner.run("{ret(1)").is_err_and(|e| e.is_syntax()));
        assert_eq!(runner.stage(), Stage::Failed);
    }

    #[test]
    fn test_stage_failed_on_runtime_error() {
        let mut runner = runner();
        assert_eq!(runtime_kind(runner.run("{nope()}")), Some(ErrorKind::UndefinedName));
        assert_eq!(runner.stage(), Stage::Failed);
    }

    #[test]
    fn test_clc_uses_evaluator_defaults() {
        let mut runner = runner();
        runner
            .evaluator()
            .borrow_mut()
            .environment_mut()
            .insert("k".into(), Value::Number(3.0));
        assert_eq!(runner.run(r#"{clc("k * 2")}"#).ok(), Some(Value::Number(6.0)));
    }

    #[test]
    fn test_clc_non_string_is_none() {
        let mut runner = runner();
        assert_eq!(runner.run("{clc(5)}").ok(), Some(Value::None));
    }

    #[test]
    fn test_pcl_prints() {
        let mut runner = runner();
        assert_eq!(runner.run(r#"{pcl("2 ** 3")}"#).ok(), Some(Value::None));
        assert_eq!(runner.console().lines(), vec!["8.0"]);
    }

    #[test]
    fn test_ecl_sees_engine_environment() {
        let mut runner = runner();
        let result = runner.run(r#"{set(x, 4); ecl("x * x + 1")}"#);
        assert_eq!(result.ok(), Some(Value::Number(17.0)));
    }

    #[test]
    fn test_ecl_cannot_see_evaluator_defaults() {
        let mut runner = runner();
        runner
            .evaluator()
            .borrow_mut()
            .environment_mut()
            .insert("only_eval".into(), Value::Number(1.0));
        assert_eq!(
            runtime_kind(runner.run(r#"{ecl("only_eval")}"#)),
            Some(ErrorKind::UnknownVariable)
        );
    }

    #[test]
    fn test_ecl_calls_definitions() {
        let mut runner = runner();
        let result = runner.run(r#"{set(n, 2); def(twice, {clc("4")}); ecl("twice() * n")}"#);
        assert_eq!(result.ok(), Some(Value::Number(8.0)));
    }

    #[test]
    fn test_malformed_expression_inside_program() {
        let mut runner = runner();
        assert_eq!(
            runtime_kind(runner.run(r#"{clc("2 +")}"#)),
            Some(ErrorKind::ExpressionSyntax)
        );
    }

    #[test]
    fn test_bridge_survives_reset() {
        let mut runner = runner();
        runner.reset_environment();
        assert_eq!(runner.run(r#"{clc("1 + 1")}"#).ok(), Some(Value::Number(2.0)));
    }

    #[test]
    fn test_eval_helpers() {
        let mut runner = runner();
        assert_eq!(runner.eval("2 + 3 * 4").ok(), Some(Value::Number(14.0)));
        runner.run("{set(y, 10)}").ok();
        assert_eq!(runner.eval_in_environment("y / 4").ok(), Some(Value::Number(2.5)));
    }
}
