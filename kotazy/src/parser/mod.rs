//! Parser implementation using lalrpop

use crate::ast::Span;
use crate::cst::CodeBlockNode;
use crate::error::{from_parse_error, Error, Result};
use crate::lexer::{tokenize, Token};


lalrpop_util::lalrpop_mod!(
    #[allow(clippy::all)]
    grammar
);

/// Deepest `{`/`(` nesting accepted by the parser
pub const MAX_NESTING: usize = 1_000;

/// Parse source text into a concrete tree
///
/// The whole input must be exactly one code block.
pub fn parse(source: &str) -> Result<CodeBlockNode> {
    let tokens = tokenize(source)?;
    parse_tokens(source, tokens)
}

/// Parse an already tokenized source
pub fn parse_tokens(source: &str, tokens: Vec<(Token, Span)>) -> Result<CodeBlockNode> {
    check_nesting(&tokens)?;
    let token_iter = tokens
        .into_iter()
        .map(|(tok, span)| (span.start, tok, span.end));

    grammar::CodeBlockParser::new()
        .parse(token_iter)
        .map_err(|e| from_parse_error(e, source.len()))
}

fn check_nesting(tokens: &[(Token, Span)]) -> Result<()> {
    let mut depth = 0usize;
    for (token, span) in tokens {
        match token {
            Token::LBrace | Token::LParen => {
                depth += 1;
                if depth > MAX_NESTING {
                    return Err(Error::syntax(
                        format!("nesting deeper than {MAX_NESTING} levels"),
                        *span,
                    ));
                }
            }
            Token::RBrace | Token::RParen => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}
