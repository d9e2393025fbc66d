//! Concrete syntax tree
//!
//! What the grammar produces: one node per production, raw lexeme text and
//! byte spans preserved. String lexemes still include their quotes and number
//! lexemes their sign; [`crate::lower`] turns this into the AST.

use crate::ast::Span;
use serde::Serialize;

/// A terminal as it appeared in the source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lexeme {
    pub text: String,
    pub span: Span,
}

/// `codeblock: "{" (call (";" call)*)? "}"`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeBlockNode {
    pub calls: Vec<CallNode>,
    pub span: Span,
}

/// `call: id "(" (param ("," param)*)? ")"`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallNode {
    pub name: Lexeme,
    pub params: Vec<ParamNode>,
    pub span: Span,
}

/// `param: number | string | id | call | codeblock`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "lowercase")]
pub enum ParamNode {
    Number(Lexeme),
    String(Lexeme),
    Id(Lexeme),
    Call(CallNode),
    #[serde(rename = "codeblock")]
    CodeBlock(CodeBlockNode),
}

impl Lexeme {
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }
}

impl ParamNode {
    pub fn span(&self) -> Span {
        match self {
            ParamNode::Number(lexeme) | ParamNode::String(lexeme) | ParamNode::Id(lexeme) => {
                lexeme.span
            }
            ParamNode::Call(call) => call.span,
            ParamNode::CodeBlock(block) => block.span,
        }
    }
}
