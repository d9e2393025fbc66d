//! Interpreter: default registry plus the live session environment

use super::builtins;
use super::console::Console;
use super::env::{EnvRef, Environment};
use super::error::InterpResult;
use super::exec::{DEFAULT_MAX_DEPTH, Executor, Session};
use super::value::{Bindings, Value};
use crate::ast::CodeBlock;
use std::rc::Rc;
use tracing::debug;

/// Owns the default registry and the environment programs run in
pub struct Interpreter {
    defaults: Bindings,
    env: EnvRef,
    session: Rc<Session>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_console(Console::stdout())
    }

    pub fn with_console(console: Console) -> Self {
        Self::with_options(console, DEFAULT_MAX_DEPTH)
    }

    pub fn with_options(console: Console, max_depth: usize) -> Self {
        let defaults = builtins::registry();
        Interpreter {
            env: Environment::from_bindings(defaults.clone()).into_ref(),
            defaults,
            session: Session::new(console, max_depth),
        }
    }

    /// Replace the environment with a fresh copy of the defaults
    pub fn reset_environment(&mut self) {
        debug!(names = self.defaults.len(), "reset environment");
        self.env = Environment::from_bindings(self.defaults.clone()).into_ref();
    }

    /// Merge `bindings` into both the live environment and the defaults
    pub fn install_environment(&mut self, bindings: Bindings) {
        debug!(names = ?bindings.keys().collect::<Vec<_>>(), "install environment");
        self.env.borrow_mut().extend(bindings.clone());
        self.defaults.extend(bindings);
    }

    pub fn environment(&self) -> &EnvRef {
        &self.env
    }

    pub fn defaults(&self) -> &Bindings {
        &self.defaults
    }

    pub fn console(&self) -> &Console {
        self.session.console()
    }

    pub fn session(&self) -> &Rc<Session> {
        &self.session
    }

    /// Executor over the live environment
    pub fn executor(&self) -> Executor {
        Executor::with_session(Rc::clone(&self.env), Rc::clone(&self.session))
    }

    /// Run a block; bindings it makes persist until the next reset
    pub fn execute(&self, block: &CodeBlock) -> InterpResult<Value> {
        self.executor().run(block)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
