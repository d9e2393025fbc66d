//! Runtime values for the interpreter

use super::env::EnvRef;
use super::function::{NamedFunction, Native};
use crate::util::{format_number, quote_str};
use indexmap::IndexMap;
use std::fmt;

/// Raw name → value mapping, insertion ordered
pub type Bindings = IndexMap<String, Value>;

/// Runtime value
///
/// `Map` and `Native` are the forms values are *stored* in; `Env` and
/// `Function` are the views an environment read hands out for them.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Result of side-effect built-ins
    #[default]
    None,
    Number(f64),
    Str(String),
    List(Vec<Value>),
    /// Nested mapping as stored
    Map(Bindings),
    /// Nested mapping as read through an environment
    Env(EnvRef),
    /// Native callable as stored
    Native(Native),
    /// Native callable as read through an environment, carrying its name
    Function(NamedFunction),
}

impl Value {
    /// Get type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) | Value::Env(_) => "mapping",
            Value::Native(_) | Value::Function(_) => "function",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Mapping-valued, stored or wrapped
    pub fn is_mapping(&self) -> bool {
        matches!(self, Value::Map(_) | Value::Env(_))
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Native(_) | Value::Function(_))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Copy of the entries of a mapping value
    pub fn to_bindings(&self) -> Option<Bindings> {
        match self {
            Value::Map(bindings) => Some(bindings.clone()),
            Value::Env(env) => Some(env.borrow().bindings().clone()),
            _ => None,
        }
    }

    /// Form used for values nested inside printed containers
    pub fn repr(&self) -> String {
        match self {
            Value::Str(s) => quote_str(s),
            other => other.to_string(),
        }
    }
}

fn write_mapping(f: &mut fmt::Formatter<'_>, bindings: &Bindings) -> fmt::Result {
    write!(f, "{{")?;
    for (i, (key, value)) in bindings.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        match value {
            Value::Native(_) => write!(f, "{}: <function {key}>", quote_str(key))?,
            other => write!(f, "{}: {}", quote_str(key), other.repr())?,
        }
    }
    write!(f, "}}")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item.repr())?;
                }
                write!(f, "]")
            }
            Value::Map(bindings) => write_mapping(f, bindings),
            Value::Env(env) => write_mapping(f, env.borrow().bindings()),
            Value::Native(_) => write!(f, "<function>"),
            Value::Function(func) => write!(f, "<function {}>", func.name()),
        }
    }
}

/// Structural equality: wrappers compare by content, callables by identity
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Native(a), Value::Native(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => {
                a.name() == b.name() && a.native().ptr_eq(b.native())
            }
            (a, b) if a.is_mapping() && b.is_mapping() => a.to_bindings() == b.to_bindings(),
            _ => false,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Bindings> for Value {
    fn from(bindings: Bindings) -> Self {
        Value::Map(bindings)
    }
}

impl From<Native> for Value {
    fn from(native: Native) -> Self {
        Value::Native(native)
    }
}
