//! Abstract Syntax Tree definitions
//!
//! The lowered form of a program: every node is a code block, a call, or one
//! of the literal/identifier parameters. Nodes are immutable once produced.

mod span;

pub use span::*;

use crate::util::format_number;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `{ call; call; ... }`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CodeBlock {
    pub calls: Vec<Call>,
}

/// `name(param, param, ...)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub name: String,
    pub params: Vec<Param>,
}

/// Call parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "val", rename_all = "lowercase")]
pub enum Param {
    Number(f64),
    /// Text between the quotes, escape sequences kept verbatim
    String(String),
    #[serde(rename = "var")]
    Identifier(String),
    Call(Call),
    #[serde(rename = "code")]
    CodeBlock(CodeBlock),
}

impl CodeBlock {
    pub fn new(calls: Vec<Call>) -> Self {
        Self { calls }
    }
}

impl Call {
    pub fn new(name: impl Into<String>, params: Vec<Param>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }
}

impl Param {
    /// Tag name used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Param::Number(_) => "number",
            Param::String(_) => "string",
            Param::Identifier(_) => "var",
            Param::Call(_) => "call",
            Param::CodeBlock(_) => "code",
        }
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Param::Identifier(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for CodeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, call) in self.calls.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{call}")?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Number(n) => write!(f, "{}", format_number(*n)),
            Param::String(s) => write!(f, "\"{s}\""),
            Param::Identifier(name) => write!(f, "{name}"),
            Param::Call(call) => write!(f, "{call}"),
            Param::CodeBlock(block) => write!(f, "{block}"),
        }
    }
}
