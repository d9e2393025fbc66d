//! TOML configuration
//!
//! ```toml
//! [engine]
//! max_depth = 2000
//!
//! [repl]
//! prompt = "kz> "
//! history_file = "/tmp/kotazy_history"
//!
//! [bindings]
//! pi = 3.14159
//! user = { name = "Alex", age = 25 }
//! ```

use crate::interp::{Bindings, Console, Interpreter, Value, DEFAULT_MAX_DEPTH};
use crate::runner::Runner;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot write config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("binding `{name}`: {kind} values are not supported")]
    UnsupportedBinding { name: String, kind: &'static str },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub repl: ReplConfig,
    /// Values installed into the engine environment at startup
    pub bindings: toml::Table,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum nesting of blocks and calls
    pub max_depth: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplConfig {
    pub prompt: String,
    /// Defaults to `~/.kotazy_history`
    pub history_file: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: "kotazy> ".to_string(),
            history_file: None,
        }
    }
}

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The `[bindings]` table as engine values
    pub fn bindings(&self) -> Result<Bindings, ConfigError> {
        convert_table(&self.bindings)
    }

    /// A runner honoring this configuration
    pub fn runner(&self, console: Console) -> Result<Runner, ConfigError> {
        let bindings = self.bindings()?;
        let mut runner = Runner::with_interpreter(Interpreter::with_options(
            console,
            self.engine.max_depth,
        ));
        if !bindings.is_empty() {
            runner.install_environment(bindings);
        }
        Ok(runner)
    }
}

fn convert_table(table: &toml::Table) -> Result<Bindings, ConfigError> {
    table
        .iter()
        .map(|(name, value)| convert(name, value).map(|value| (name.clone(), value)))
        .collect()
}

fn convert(name: &str, value: &toml::Value) -> Result<Value, ConfigError> {
    let unsupported = |kind| ConfigError::UnsupportedBinding {
        name: name.to_string(),
        kind,
    };
    match value {
        toml::Value::Integer(n) => Ok(Value::Number(*n as f64)),
        toml::Value::Float(n) => Ok(Value::Number(*n)),
        toml::Value::String(s) => Ok(Value::Str(s.clone())),
        toml::Value::Array(items) => items
            .iter()
            .map(|item| convert(name, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        toml::Value::Table(table) => convert_table(table).map(Value::Map),
        toml::Value::Boolean(_) => Err(unsupported("boolean")),
        toml::Value::Datetime(_) => Err(unsupported("datetime")),
    }
}
