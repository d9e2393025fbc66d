//! Default call-language built-ins

use super::error::{InterpResult, RuntimeError};
use super::exec::Executor;
use super::function::Native;
use super::value::{Bindings, Value};
use crate::ast::Param;

/// Fresh registry of the default built-ins
pub fn registry() -> Bindings {
    let mut bindings = Bindings::new();
    bindings.insert("out".to_string(), Value::Native(Native::syntax(builtin_out)));
    bindings.insert("set".to_string(), Value::Native(Native::syntax(builtin_set)));
    bindings.insert("ret".to_string(), Value::Native(Native::syntax(builtin_ret)));
    bindings.insert("def".to_string(), Value::Native(Native::syntax(builtin_def)));
    bindings.insert("lse".to_string(), Value::Native(Native::syntax(builtin_lse)));
    bindings.insert("fle".to_string(), Value::Native(Native::syntax(builtin_fle)));
    bindings
}

fn expect_arity(name: &str, params: &[Param], expected: usize) -> InterpResult<()> {
    if params.len() != expected {
        return Err(RuntimeError::arity_mismatch(name, &expected.to_string(), params.len()));
    }
    Ok(())
}

/// out(p, ...) prints the loaded values separated by spaces
fn builtin_out(cx: &mut Executor, params: &[Param]) -> InterpResult<Value> {
    let line = cx
        .load_list(params)?
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    cx.console().write_line(&line);
    Ok(Value::None)
}

/// set(name, value)
fn builtin_set(cx: &mut Executor, params: &[Param]) -> InterpResult<Value> {
    expect_arity("set", params, 2)?;
    cx.save(&params[0], &params[1])?;
    Ok(Value::None)
}

/// ret(p) is the loaded value; ret(p, q, ...) the list of loaded values
fn builtin_ret(cx: &mut Executor, params: &[Param]) -> InterpResult<Value> {
    match params {
        [] => Err(RuntimeError::arity_mismatch("ret", "at least 1", 0)),
        [single] => cx.load(single),
        many => Ok(Value::List(cx.load_list(many)?)),
    }
}

/// def(name, { ... })
fn builtin_def(cx: &mut Executor, params: &[Param]) -> InterpResult<Value> {
    expect_arity("def", params, 2)?;
    cx.define(&params[0], &params[1])?;
    Ok(Value::None)
}

/// lse() prints the bound names
fn builtin_lse(cx: &mut Executor, params: &[Param]) -> InterpResult<Value> {
    expect_arity("lse", params, 0)?;
    let names: Vec<Value> = cx.environment().borrow().names().map(Value::from).collect();
    cx.console().write_line(&Value::List(names).to_string());
    Ok(Value::None)
}

/// fle() prints the whole environment
fn builtin_fle(cx: &mut Executor, params: &[Param]) -> InterpResult<Value> {
    expect_arity("fle", params, 0)?;
    let dump = cx.environment().borrow().to_string();
    cx.console().write_line(&dump);
    Ok(Value::None)
}
