//! Token definitions for expression text

use logos::Logos;
use std::fmt;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum ExprToken {
    // Keywords
    #[token("True")]
    True,
    #[token("False")]
    False,
    #[token("None")]
    None,
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("not")]
    Not,
    #[token("in")]
    In,
    #[token("is")]
    Is,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("lambda")]
    Lambda,

    // Operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("**")]
    DoubleStar,
    #[token("/")]
    Slash,
    #[token("//")]
    DoubleSlash,
    #[token("%")]
    Percent,
    #[token("@")]
    At,
    #[token("^")]
    Caret,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("~")]
    Tilde,
    #[token("<<")]
    LShift,
    #[token(">>")]
    RShift,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("=")]
    Eq,

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,

    // Literals
    #[regex(r"([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    #[regex(r#""([^"\\\n]|\\[^\n])*""#, |lex| unescape(lex.slice()))]
    #[regex(r#"'([^'\\\n]|\\[^\n])*'"#, |lex| unescape(lex.slice()))]
    Str(String),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Name(String),
}

/// Drop the quotes and resolve the common escapes
fn unescape(quoted: &str) -> String {
    let inner = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other @ ('\\' | '\'' | '"')) => out.push(other),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

impl fmt::Display for ExprToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprToken::Number(n) => write!(f, "{n}"),
            ExprToken::Str(s) => write!(f, "{s:?}"),
            ExprToken::Name(s) => write!(f, "{s}"),
            other => {
                let text = match other {
                    ExprToken::True => "True",
                    ExprToken::False => "False",
                    ExprToken::None => "None",
                    ExprToken::And => "and",
                    ExprToken::Or => "or",
                    ExprToken::Not => "not",
                    ExprToken::In => "in",
                    ExprToken::Is => "is",
                    ExprToken::If => "if",
                    ExprToken::Else => "else",
                    ExprToken::For => "for",
                    ExprToken::Lambda => "lambda",
                    ExprToken::Plus => "+",
                    ExprToken::Minus => "-",
                    ExprToken::Star => "*",
                    ExprToken::DoubleStar => "**",
                    ExprToken::Slash => "/",
                    ExprToken::DoubleSlash => "//",
                    ExprToken::Percent => "%",
                    ExprToken::At => "@",
                    ExprToken::Caret => "^",
                    ExprToken::Amp => "&",
                    ExprToken::Pipe => "|",
                    ExprToken::Tilde => "~",
                    ExprToken::LShift => "<<",
                    ExprToken::RShift => ">>",
                    ExprToken::Lt => "<",
                    ExprToken::Gt => ">",
                    ExprToken::LtEq => "<=",
                    ExprToken::GtEq => ">=",
                    ExprToken::EqEq => "==",
                    ExprToken::NotEq => "!=",
                    ExprToken::Eq => "=",
                    ExprToken::LParen => "(",
                    ExprToken::RParen => ")",
                    ExprToken::LBracket => "[",
                    ExprToken::RBracket => "]",
                    ExprToken::LBrace => "{",
                    ExprToken::RBrace => "}",
                    ExprToken::Comma => ",",
                    ExprToken::Colon => ":",
                    ExprToken::Dot => ".",
                    ExprToken::Number(_) | ExprToken::Str(_) | ExprToken::Name(_) => "",
                };
                write!(f, "{text}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<ExprToken> {
        ExprToken::lexer(source).map(|t| t.unwrap()).collect()
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            lex("1 2.5 .5 1e3"),
            vec![
                ExprToken::Number(1.0),
                ExprToken::Number(2.5),
                ExprToken::Number(0.5),
                ExprToken::Number(1000.0),
            ]
        );
    }

    #[test]
    fn test_longest_operator_wins() {
        assert_eq!(
            lex("** * // / <= <<"),
            vec![
                ExprToken::DoubleStar,
                ExprToken::Star,
                ExprToken::DoubleSlash,
                ExprToken::Slash,
                ExprToken::LtEq,
                ExprToken::LShift,
            ]
        );
    }

    #[test]
    fn test_keywords_vs_names() {
        assert_eq!(
            lex("not note lambda_ None"),
            vec![
                ExprToken::Not,
                ExprToken::Name("note".into()),
                ExprToken::Name("lambda_".into()),
                ExprToken::None,
            ]
        );
    }

    #[test]
    fn test_strings_both_quotes() {
        assert_eq!(
            lex(r#"'x' "a\"b" 'tab\t'"#),
            vec![
                ExprToken::Str("x".into()),
                ExprToken::Str("a\"b".into()),
                ExprToken::Str("tab\t".into()),
            ]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(ExprToken::DoubleStar.to_string(), "**");
        assert_eq!(ExprToken::Name("a".into()).to_string(), "a");
    }
}
