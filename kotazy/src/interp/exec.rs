//! Block executor
//!
//! An [`Executor`] is the context handed to context-wanting callables: the
//! environment calls resolve against plus the [`Session`] shared by every
//! executor spawned for the same run.

use super::console::Console;
use super::env::EnvRef;
use super::error::{InterpResult, RuntimeError};
use super::function::Native;
use super::value::Value;
use crate::ast::{Call, CodeBlock, Param};
use crate::util::{find_similar_name, STACK_GROW_SIZE, STACK_RED_ZONE};
use std::cell::Cell;
use std::rc::Rc;
use tracing::trace;

/// Default limit on nested block/call evaluation
pub const DEFAULT_MAX_DEPTH: usize = 10_000;

/// State shared across the executors of one run
#[derive(Debug)]
pub struct Session {
    console: Console,
    depth: Cell<usize>,
    max_depth: usize,
}

impl Session {
    pub fn new(console: Console, max_depth: usize) -> Rc<Self> {
        Rc::new(Session {
            console,
            depth: Cell::new(0),
            max_depth,
        })
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn enter(&self) -> InterpResult<DepthGuard<'_>> {
        let depth = self.depth.get();
        if depth >= self.max_depth {
            return Err(RuntimeError::stack_overflow(self.max_depth));
        }
        self.depth.set(depth + 1);
        Ok(DepthGuard(self))
    }
}

struct DepthGuard<'a>(&'a Session);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.depth.set(self.0.depth.get() - 1);
    }
}

/// Runs calls against an environment
pub struct Executor {
    env: EnvRef,
    session: Rc<Session>,
}

impl Executor {
    /// Executor with a fresh stdout session
    pub fn new(env: EnvRef) -> Self {
        Self::with_session(env, Session::new(Console::stdout(), DEFAULT_MAX_DEPTH))
    }

    pub fn with_session(env: EnvRef, session: Rc<Session>) -> Self {
        Executor { env, session }
    }

    /// Executor over another environment, same session
    pub fn scoped(&self, env: EnvRef) -> Executor {
        Executor {
            env,
            session: Rc::clone(&self.session),
        }
    }

    pub fn environment(&self) -> &EnvRef {
        &self.env
    }

    pub fn session(&self) -> &Rc<Session> {
        &self.session
    }

    pub fn console(&self) -> &Console {
        self.session.console()
    }

    /// Resolve a name through the environment, wrapped
    pub fn lookup(&self, name: &str) -> InterpResult<Value> {
        let env = self.env.borrow();
        env.get(name).ok_or_else(|| {
            let suggestion = find_similar_name(name, env.names(), 2);
            RuntimeError::undefined_name(name, suggestion.as_deref())
        })
    }

    /// Turn one parameter node into a value
    pub fn load(&mut self, node: &Param) -> InterpResult<Value> {
        match node {
            Param::Number(n) => Ok(Value::Number(*n)),
            Param::String(s) => Ok(Value::Str(s.clone())),
            Param::Identifier(name) => self.lookup(name),
            Param::Call(call) => self.run_calls(std::slice::from_ref(call)),
            Param::CodeBlock(block) => self.run(block),
        }
    }

    pub fn load_list(&mut self, nodes: &[Param]) -> InterpResult<Vec<Value>> {
        nodes.iter().map(|node| self.load(node)).collect()
    }

    /// Bind `target` to the loaded `value`
    pub fn save(&mut self, target: &Param, value: &Param) -> InterpResult<()> {
        let name = target
            .as_identifier()
            .ok_or_else(|| RuntimeError::invalid_assignment_target(target.kind()))?;
        let value = self.load(value)?;
        trace!(binding = name, value = %value, "save");
        self.env.borrow_mut().define(name, value);
        Ok(())
    }

    /// Bind `target` to a definition running `body` in this environment
    pub fn define(&mut self, target: &Param, body: &Param) -> InterpResult<()> {
        let name = target
            .as_identifier()
            .ok_or_else(|| RuntimeError::invalid_assignment_target(target.kind()))?;
        let Param::CodeBlock(block) = body else {
            return Err(RuntimeError::type_error(format!(
                "def expects a code block body, got {}",
                body.kind()
            )));
        };
        trace!(binding = name, "define");
        let thunk = Native::thunk(block.clone(), &self.env);
        self.env.borrow_mut().define(name, Value::Native(thunk));
        Ok(())
    }

    /// Look up the callee and hand it the call's parameters
    pub fn invoke(&mut self, call: &Call) -> InterpResult<Value> {
        let function = match self.lookup(&call.name)? {
            Value::Function(function) => function,
            other => return Err(RuntimeError::not_callable(&call.name, other.type_name())),
        };
        trace!(
            name = %call.name,
            params = call.params.len(),
            context = function.wants_context(),
            "invoke"
        );
        function.call_with_nodes(self, &call.params)
    }

    /// Run calls in order; the last call's value is the result
    pub fn run_calls(&mut self, calls: &[Call]) -> InterpResult<Value> {
        let session = Rc::clone(&self.session);
        let _guard = session.enter()?;
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            let mut value = Value::None;
            for call in calls {
                value = self.invoke(call)?;
            }
            Ok(value)
        })
    }

    pub fn run(&mut self, block: &CodeBlock) -> InterpResult<Value> {
        self.run_calls(&block.calls)
    }
}
