//! Lowering from the concrete tree to the AST
//!
//! Structural and total: every production maps to exactly one AST node.

use crate::ast::{Call, CodeBlock, Param};
use crate::cst::{CallNode, CodeBlockNode, Lexeme, ParamNode};
use crate::util::{STACK_GROW_SIZE, STACK_RED_ZONE};

/// Lower a parsed code block
pub fn lower(block: &CodeBlockNode) -> CodeBlock {
    CodeBlock::new(block.calls.iter().map(lower_call).collect())
}

fn lower_call(call: &CallNode) -> Call {
    Call::new(&call.name.text, call.params.iter().map(lower_param).collect())
}

fn lower_param(param: &ParamNode) -> Param {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || lower_param_inner(param))
}

fn lower_param_inner(param: &ParamNode) -> Param {
    match param {
        ParamNode::Number(lexeme) => Param::Number(number_value(lexeme)),
        ParamNode::String(lexeme) => Param::String(string_contents(lexeme).to_string()),
        ParamNode::Id(lexeme) => Param::Identifier(lexeme.text.clone()),
        ParamNode::Call(call) => Param::Call(lower_call(call)),
        ParamNode::CodeBlock(block) => Param::CodeBlock(lower(block)),
    }
}

/// Number lexemes always match the f64 literal syntax
fn number_value(lexeme: &Lexeme) -> f64 {
    lexeme.text.parse().unwrap_or(f64::NAN)
}

/// Text between the quotes; escapes are kept as written
fn string_contents(lexeme: &Lexeme) -> &str {
    let text = lexeme.text.as_str();
    text.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(text)
}
