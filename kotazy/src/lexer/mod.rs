//! Lexer implementation using logos

mod token;

pub use token::Token;

use crate::ast::Span;
use crate::error::{Error, Result};
use logos::Logos;

/// Tokenize call-language source
pub fn tokenize(source: &str) -> Result<Vec<(Token, Span)>> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::from(lexer.span());
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) if span.text(source).starts_with("/*") => {
                return Err(Error::syntax("unterminated block comment", span));
            }
            Err(()) => {
                return Err(Error::syntax(
                    format!("unexpected character: {:?}", span.text(source)),
                    span,
                ));
            }
        }
    }

    Ok(tokens)
}
