//! Kotazy call-language engine
//!
//! Source text is a single code block of calls, `{ set(x, 5); out(x) }`.
//! The pipeline is [`parse`] (concrete tree) → [`lower`] (AST) →
//! [`Interpreter::execute`]; [`Runner`] wires the stages together and adds
//! the bridge to the restricted expression [`evaluate`]r.

pub mod ast;
pub mod config;
pub mod cst;
pub mod error;
pub mod eval;
pub mod interp;
pub mod lexer;
pub mod lower;
pub mod parser;
pub mod repl;
pub mod runner;
pub mod util;

pub use ast::{Call, CodeBlock, Param, Span};
pub use config::{Config, ConfigError};
pub use error::{Error, Result};
pub use eval::{evaluate, Evaluator, Variables};
pub use interp::{
    Bindings, Console, Environment, ErrorKind, Executor, Interpreter, Native, RuntimeError, Value,
};
pub use lower::lower;
pub use parser::parse;
pub use runner::{Runner, Stage};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset; safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
    });
}

/// Parse, lower and execute `source` in a fresh runner
pub fn run(source: &str) -> Result<Value> {
    Runner::new().run(source)
}
