//! Callables stored in environments
//!
//! Whether a callable receives the executor is decided once, by the variant
//! it is registered as. Invocation never inspects the callable beyond that.

use super::env::{EnvRef, WeakEnvRef};
use super::error::{InterpResult, RuntimeError};
use super::exec::Executor;
use super::value::Value;
use crate::ast::{CodeBlock, Param};
use std::fmt;
use std::rc::Rc;

/// Receives its parameters as unevaluated nodes, plus the executor
pub type SyntaxFn = dyn Fn(&mut Executor, &[Param]) -> InterpResult<Value>;

/// Receives loaded parameter values, plus the executor
pub type ContextFn = dyn Fn(&mut Executor, Vec<Value>) -> InterpResult<Value>;

/// Receives loaded parameter values only
pub type PureFn = dyn Fn(Vec<Value>) -> InterpResult<Value>;

/// Native callable as stored in an environment
#[derive(Clone)]
pub enum Native {
    Syntax(Rc<SyntaxFn>),
    Contextual(Rc<ContextFn>),
    Pure(Rc<PureFn>),
    /// Zero-argument definition made by `def`
    Thunk(Thunk),
}

/// A code block bound to the environment it was defined in.
///
/// The environment is looked up when the thunk runs, not when it is
/// created, so later rebindings are visible to the body.
#[derive(Clone)]
pub struct Thunk {
    body: Rc<CodeBlock>,
    env: WeakEnvRef,
}

impl Native {
    pub fn syntax(f: impl Fn(&mut Executor, &[Param]) -> InterpResult<Value> + 'static) -> Self {
        Native::Syntax(Rc::new(f))
    }

    pub fn contextual(f: impl Fn(&mut Executor, Vec<Value>) -> InterpResult<Value> + 'static) -> Self {
        Native::Contextual(Rc::new(f))
    }

    pub fn pure(f: impl Fn(Vec<Value>) -> InterpResult<Value> + 'static) -> Self {
        Native::Pure(Rc::new(f))
    }

    pub fn thunk(body: CodeBlock, env: &EnvRef) -> Self {
        Native::Thunk(Thunk {
            body: Rc::new(body),
            env: Rc::downgrade(env),
        })
    }

    /// Whether invocation hands over the executor
    pub fn wants_context(&self) -> bool {
        !matches!(self, Native::Pure(_))
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Native) -> bool {
        match (self, other) {
            (Native::Syntax(a), Native::Syntax(b)) => Rc::ptr_eq(a, b),
            (Native::Contextual(a), Native::Contextual(b)) => Rc::ptr_eq(a, b),
            (Native::Pure(a), Native::Pure(b)) => Rc::ptr_eq(a, b),
            (Native::Thunk(a), Native::Thunk(b)) => {
                Rc::ptr_eq(&a.body, &b.body) && a.env.ptr_eq(&b.env)
            }
            _ => false,
        }
    }
}

impl Thunk {
    pub fn body(&self) -> &CodeBlock {
        &self.body
    }

    fn call(&self, name: &str, cx: Option<&mut Executor>) -> InterpResult<Value> {
        let env = self
            .env
            .upgrade()
            .ok_or_else(|| RuntimeError::detached_definition(name))?;
        let mut runner = match cx {
            Some(cx) => cx.scoped(env),
            None => Executor::new(env),
        };
        runner.run(&self.body)
    }
}

impl fmt::Debug for Native {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Native::Syntax(_) => write!(f, "Native::Syntax"),
            Native::Contextual(_) => write!(f, "Native::Contextual"),
            Native::Pure(_) => write!(f, "Native::Pure"),
            Native::Thunk(thunk) => write!(f, "Native::Thunk({})", thunk.body),
        }
    }
}

/// A native callable read out of an environment under a name
#[derive(Debug, Clone)]
pub struct NamedFunction {
    name: String,
    native: Native,
}

impl NamedFunction {
    pub fn new(name: impl Into<String>, native: Native) -> Self {
        NamedFunction {
            name: name.into(),
            native,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn native(&self) -> &Native {
        &self.native
    }

    pub fn wants_context(&self) -> bool {
        self.native.wants_context()
    }

    /// Invoke from a call: parameters arrive as syntax nodes
    pub fn call_with_nodes(&self, cx: &mut Executor, params: &[Param]) -> InterpResult<Value> {
        match &self.native {
            Native::Syntax(f) => f(cx, params),
            Native::Contextual(f) => {
                let args = cx.load_list(params)?;
                f(cx, args)
            }
            Native::Pure(f) => f(cx.load_list(params)?),
            Native::Thunk(thunk) => {
                if !params.is_empty() {
                    return Err(RuntimeError::arity_mismatch(&self.name, "0", params.len()));
                }
                thunk.call(&self.name, Some(cx))
            }
        }
    }

    /// Invoke with already evaluated arguments
    ///
    /// Syntax-level callables see each argument as a literal node. Without an
    /// executor, only pure callables and definitions can run.
    pub fn call_with_values(&self, cx: Option<&mut Executor>, args: Vec<Value>) -> InterpResult<Value> {
        match &self.native {
            Native::Pure(f) => f(args),
            Native::Thunk(thunk) => {
                if !args.is_empty() {
                    return Err(RuntimeError::arity_mismatch(&self.name, "0", args.len()));
                }
                thunk.call(&self.name, cx)
            }
            Native::Contextual(f) => {
                let cx = cx.ok_or_else(|| RuntimeError::missing_context(&self.name))?;
                f(cx, args)
            }
            Native::Syntax(f) => {
                let cx = cx.ok_or_else(|| RuntimeError::missing_context(&self.name))?;
                let params = args
                    .into_iter()
                    .map(|arg| literal_param(&self.name, arg))
                    .collect::<InterpResult<Vec<_>>>()?;
                f(cx, &params)
            }
        }
    }
}

/// Express an evaluated argument as a syntax node
fn literal_param(name: &str, value: Value) -> InterpResult<Param> {
    match value {
        Value::Number(n) => Ok(Param::Number(n)),
        Value::Str(s) => Ok(Param::String(s)),
        other => Err(RuntimeError::type_error(format!(
            "function {name} takes literal arguments, got {}",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Call;
    use crate::interp::env::Environment;
    use crate::interp::error::ErrorKind;

    fn echo() -> Native {
        Native::pure(|args| Ok(Value::List(args)))
    }

    #[test]
    fn test_wants_context_follows_registration() {
        assert!(!echo().wants_context());
        assert!(Native::contextual(|_, _| Ok(Value::None)).wants_context());
        assert!(Native::syntax(|_, _| Ok(Value::None)).wants_context());
        let env = Environment::new().into_ref();
        assert!(Native::thunk(CodeBlock::default(), &env).wants_context());
    }

    #[test]
    fn test_pure_call_without_executor() {
        let func = NamedFunction::new("echo", echo());
        let result = func.call_with_values(None, vec![Value::Number(1.0)]);
        assert_eq!(result.ok(), Some(Value::List(vec![Value::Number(1.0)])));
    }

    #[test]
    fn test_contextual_call_without_executor_fails() {
        let func = NamedFunction::new("ctx", Native::contextual(|_, _| Ok(Value::None)));
        let err = func.call_with_values(None, vec![]).err().map(|e| e.kind);
        assert_eq!(err, Some(ErrorKind::MissingContext));
    }

    #[test]
    fn test_thunk_rejects_arguments() {
        let env = Environment::new().into_ref();
        let func = NamedFunction::new("f", Native::thunk(CodeBlock::default(), &env));
        let mut cx = Executor::new(Rc::clone(&env));
        let err = func
            .call_with_nodes(&mut cx, &[Param::Number(1.0)])
            .err()
            .map(|e| e.kind);
        assert_eq!(err, Some(ErrorKind::ArityMismatch));
    }

    #[test]
    fn test_thunk_without_executor_runs_in_owning_env() {
        let env = Environment::new().into_ref();
        env.borrow_mut().define("answer", Value::Number(42.0));
        env.borrow_mut().define(
            "id",
            Value::Native(Native::syntax(|cx, params| cx.load(&params[0]))),
        );
        let body = CodeBlock::new(vec![Call::new("id", vec![Param::Identifier("answer".into())])]);
        let func = NamedFunction::new("f", Native::thunk(body, &env));
        assert_eq!(func.call_with_values(None, vec![]).ok(), Some(Value::Number(42.0)));
    }

    #[test]
    fn test_thunk_outliving_env_is_detached() {
        let env = Environment::new().into_ref();
        let func = NamedFunction::new("f", Native::thunk(CodeBlock::default(), &env));
        drop(env);
        let err = func.call_with_values(None, vec![]).err().map(|e| e.kind);
        assert_eq!(err, Some(ErrorKind::DetachedDefinition));
    }

    #[test]
    fn test_syntax_call_receives_literals() {
        let func = NamedFunction::new(
            "kinds",
            Native::syntax(|_, params| {
                Ok(Value::List(params.iter().map(|p| Value::from(p.kind())).collect()))
            }),
        );
        let mut cx = Executor::new(Environment::new().into_ref());
        let result = func.call_with_values(Some(&mut cx), vec![Value::Number(1.0), Value::from("s")]);
        assert_eq!(
            result.ok(),
            Some(Value::List(vec![Value::from("number"), Value::from("string")]))
        );
    }

    #[test]
    fn test_ptr_eq() {
        let a = echo();
        assert!(a.ptr_eq(&a.clone()));
        assert!(!a.ptr_eq(&echo()));
    }
}
