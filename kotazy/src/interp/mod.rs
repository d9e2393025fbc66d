//! Call-language interpreter
//!
//! Executes lowered code blocks against an [`Environment`]. Built-ins and
//! host functions are [`Native`] values stored in the environment; `def`
//! stores [`function::Thunk`]s that run with dynamic scope.

mod builtins;
mod console;
mod env;
mod error;
mod exec;
pub mod function;
mod interpreter;
mod value;

pub use builtins::registry as default_registry;
pub use console::Console;
pub use env::{wrap, EnvRef, Environment, WeakEnvRef};
pub use error::{ErrorKind, InterpResult, RuntimeError};
pub use exec::{Executor, Session, DEFAULT_MAX_DEPTH};
pub use function::{NamedFunction, Native};
pub use interpreter::Interpreter;
pub use value::{Bindings, Value};
