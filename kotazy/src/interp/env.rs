//! Environment for name bindings
//!
//! Bindings are stored raw and wrapped on every read: nested mappings come
//! back as fresh environments, lists are filtered down to their mapping
//! elements, and native callables come back carrying the key they were read
//! under. Nothing is wrapped at write time.

use super::function::NamedFunction;
use super::value::{Bindings, Value};
use crate::util::quote_str;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Shared reference to an environment
pub type EnvRef = Rc<RefCell<Environment>>;

/// Non-owning reference, held by definitions made in an environment
pub type WeakEnvRef = Weak<RefCell<Environment>>;

/// Flat name → value mapping with wrap-on-read lookups
#[derive(Debug, Clone, Default)]
pub struct Environment {
    bindings: Bindings,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bindings(bindings: Bindings) -> Self {
        Environment { bindings }
    }

    /// Wrap in Rc<RefCell<>>
    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    /// Bind a name, replacing any previous binding
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Look up a name, wrapping the stored value
    pub fn get(&self, name: &str) -> Option<Value> {
        self.bindings.get(name).map(|raw| wrap(name, raw))
    }

    /// Look up a name without wrapping
    pub fn get_raw(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.bindings.shift_remove(name)
    }

    /// Bound names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    /// Add every entry of `bindings`, replacing same-named ones
    pub fn extend(&mut self, bindings: Bindings) {
        self.bindings.extend(bindings);
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Wrap a stored value the way an environment read hands it out
pub fn wrap(name: &str, raw: &Value) -> Value {
    match raw {
        Value::Map(bindings) => Value::Env(Environment::from_bindings(bindings.clone()).into_ref()),
        Value::Env(env) => {
            let copy = env.borrow().bindings().clone();
            Value::Env(Environment::from_bindings(copy).into_ref())
        }
        Value::List(items) => Value::List(
            items
                .iter()
                .filter(|item| item.is_mapping())
                .map(|item| wrap(name, item))
                .collect(),
        ),
        Value::Native(native) => Value::Function(NamedFunction::new(name, native.clone())),
        Value::Function(func) => Value::Function(NamedFunction::new(name, func.native().clone())),
        other => other.clone(),
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.bindings.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match value {
                Value::Native(_) | Value::Function(_) => {
                    write!(f, "{}: <function {key}>", quote_str(key))?
                }
                other => write!(f, "{}: {}", quote_str(key), other.repr())?,
            }
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::function::Native;

    fn native() -> Native {
        Native::pure(|_| Ok(Value::None))
    }

    #[test]
    fn test_define_and_get() {
        let mut env = Environment::new();
        env.define("x", Value::Number(42.0));
        assert_eq!(env.get("x"), Some(Value::Number(42.0)));
        assert_eq!(env.get("y"), None);
    }

    #[test]
    fn test_define_overwrites() {
        let mut env = Environment::new();
        env.define("x", Value::Number(1.0));
        env.define("x", Value::from("two"));
        assert_eq!(env.get("x"), Some(Value::from("two")));
        assert_eq!(env.len(), 1);
    }

    #[test]
    fn test_mapping_read_is_a_fresh_env() {
        let mut inner = Bindings::new();
        inner.insert("a".into(), Value::Number(1.0));
        let mut env = Environment::new();
        env.define("m", Value::Map(inner.clone()));

        let Some(Value::Env(first)) = env.get("m") else {
            panic!("expected wrapped mapping");
        };
        let Some(Value::Env(second)) = env.get("m") else {
            panic!("expected wrapped mapping");
        };
        assert!(!Rc::ptr_eq(&first, &second));

        // Mutating a wrapper leaves the stored mapping alone
        first.borrow_mut().define("b", Value::Number(2.0));
        assert_eq!(env.get_raw("m"), Some(&Value::Map(inner)));
    }

    #[test]
    fn test_list_read_keeps_only_mappings() {
        let mut map = Bindings::new();
        map.insert("k".into(), Value::from("v"));
        let mut env = Environment::new();
        env.define(
            "l",
            Value::List(vec![Value::Number(1.0), Value::Map(map.clone()), Value::from("s")]),
        );

        let Some(Value::List(items)) = env.get("l") else {
            panic!("expected list");
        };
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Value::Env(_)));
        assert_eq!(items[0], Value::Map(map));
    }

    #[test]
    fn test_native_read_carries_key() {
        let mut env = Environment::new();
        env.define("hello", Value::Native(native()));
        let Some(Value::Function(func)) = env.get("hello") else {
            panic!("expected named function");
        };
        assert_eq!(func.name(), "hello");
    }

    #[test]
    fn test_function_reread_takes_new_key() {
        let mut env = Environment::new();
        env.define("a", Value::Native(native()));
        let Some(first) = env.get("a") else {
            panic!("expected a");
        };
        env.define("b", first);
        let Some(Value::Function(func)) = env.get("b") else {
            panic!("expected named function");
        };
        assert_eq!(func.name(), "b");
    }

    #[test]
    fn test_scalars_pass_through() {
        let mut env = Environment::new();
        env.define("n", Value::Number(3.0));
        env.define("s", Value::from("text"));
        env.define("z", Value::None);
        assert_eq!(env.get("n"), Some(Value::Number(3.0)));
        assert_eq!(env.get("s"), Some(Value::from("text")));
        assert_eq!(env.get("z"), Some(Value::None));
    }

    #[test]
    fn test_names_in_insertion_order() {
        let mut env = Environment::new();
        env.define("b", Value::None);
        env.define("a", Value::None);
        assert_eq!(env.names().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn test_display() {
        let mut env = Environment::new();
        env.define("out", Value::Native(native()));
        env.define("x", Value::Number(5.0));
        env.define("s", Value::from("hi"));
        assert_eq!(env.to_string(), "{'out': <function out>, 'x': 5.0, 's': 'hi'}");
    }

    #[test]
    fn test_default_is_empty() {
        let env = Environment::default();
        assert!(env.is_empty());
    }
}
