//! Expression parsing

use super::node::Expr;
use super::token::ExprToken;
use crate::ast::Span;
use crate::error::{from_parse_error, Error, Result};
use logos::Logos;

lalrpop_util::lalrpop_mod!(
    #[allow(clippy::all)]
    expr_grammar
);

/// Longest expression, in tokens, accepted by the parser
pub const MAX_EXPRESSION_TOKENS: usize = 1_000;

/// Tokenize expression text
pub fn tokenize_expression(source: &str) -> Result<Vec<(ExprToken, Span)>> {
    let mut lexer = ExprToken::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = Span::new(lexer.span().start, lexer.span().end);
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(_) => {
                return Err(Error::syntax(
                    format!("unexpected character: {:?}", lexer.slice()),
                    span,
                ));
            }
        }
    }

    Ok(tokens)
}

/// Parse expression text into a tree
pub fn parse_expression(source: &str) -> Result<Expr> {
    let tokens = tokenize_expression(source)?;
    if let Some((_, span)) = tokens.get(MAX_EXPRESSION_TOKENS) {
        return Err(Error::syntax(
            format!("expression longer than {MAX_EXPRESSION_TOKENS} tokens"),
            *span,
        ));
    }
    let token_iter = tokens
        .into_iter()
        .map(|(tok, span)| (span.start, tok, span.end));

    expr_grammar::InputParser::new()
        .parse(token_iter)
        .map_err(|e| from_parse_error(e, source.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::node::{Arg, BinOp, CmpOp, NodeKind, UnaryOp};

    fn parse_ok(source: &str) -> Expr {
        parse_expression(source).expect("expression should parse")
    }

    fn num(n: f64) -> Expr {
        Expr::Number(n)
    }

    #[test]
    fn test_precedence_mul_over_add() {
        assert_eq!(
            parse_ok("2 + 3 * 4"),
            Expr::binary(BinOp::Add, num(2.0), Expr::binary(BinOp::Mul, num(3.0), num(4.0)))
        );
    }

    #[test]
    fn test_power_binds_tighter_than_unary_minus() {
        assert_eq!(
            parse_ok("-2 ** 2"),
            Expr::unary(UnaryOp::Neg, Expr::binary(BinOp::Pow, num(2.0), num(2.0)))
        );
    }

    #[test]
    fn test_power_right_operand_may_be_negative() {
        assert_eq!(
            parse_ok("2 ** -1"),
            Expr::binary(BinOp::Pow, num(2.0), Expr::unary(UnaryOp::Neg, num(1.0)))
        );
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(
            parse_ok("2 ** 3 ** 2"),
            Expr::binary(BinOp::Pow, num(2.0), Expr::binary(BinOp::Pow, num(3.0), num(2.0)))
        );
    }

    #[test]
    fn test_xor_below_arithmetic() {
        assert_eq!(
            parse_ok("1 ^ 2 + 3"),
            Expr::binary(BinOp::BitXor, num(1.0), Expr::binary(BinOp::Add, num(2.0), num(3.0)))
        );
    }

    #[test]
    fn test_call_and_subscript_chain() {
        let expr = parse_ok("f(a)[0]");
        let Expr::Subscript { value, index } = expr else {
            panic!("expected subscript");
        };
        assert_eq!(*index, num(0.0));
        assert_eq!(value.kind(), NodeKind::Call);
    }

    #[test]
    fn test_keyword_and_starred_args() {
        let Expr::Call { args, .. } = parse_ok("f(1, k=2, *xs, **kw)") else {
            panic!("expected call");
        };
        assert!(matches!(args[0], Arg::Positional(_)));
        assert!(matches!(&args[1], Arg::Keyword(name, _) if name == "k"));
        assert!(matches!(args[2], Arg::Starred(_)));
        assert!(matches!(args[3], Arg::DoubleStarred(_)));
    }

    #[test]
    fn test_chained_comparison() {
        let Expr::Compare { rest, .. } = parse_ok("a < b not in c") else {
            panic!("expected comparison");
        };
        let ops: Vec<_> = rest.iter().map(|(op, _)| *op).collect();
        assert_eq!(ops, vec![CmpOp::Lt, CmpOp::NotIn]);
    }

    #[test]
    fn test_wide_forms_get_node_kinds() {
        let cases = [
            ("'x'", NodeKind::String),
            ("True", NodeKind::Boolean),
            ("None", NodeKind::NoneLiteral),
            ("a.b", NodeKind::Attribute),
            ("a and b", NodeKind::BoolOp),
            ("1 if a else 2", NodeKind::IfExp),
            ("lambda x, y: x", NodeKind::Lambda),
            ("[1, 2]", NodeKind::List),
            ("(1, 2)", NodeKind::Tuple),
            ("{1: 2}", NodeKind::Dict),
            ("{1, 2}", NodeKind::Set),
            ("[x for x in xs if x]", NodeKind::ListComp),
            ("x = 1", NodeKind::Assign),
            ("not a", NodeKind::UnaryOp),
        ];
        for (source, kind) in cases {
            assert_eq!(parse_ok(source).kind(), kind, "{source}");
        }
    }

    #[test]
    fn test_slice_index() {
        let Expr::Subscript { index, .. } = parse_ok("a[1:]") else {
            panic!("expected subscript");
        };
        assert_eq!(index.kind(), NodeKind::Slice);
    }

    #[test]
    fn test_parenthesized_expression() {
        assert_eq!(
            parse_ok("(2 + 3) * 4"),
            Expr::binary(BinOp::Mul, Expr::binary(BinOp::Add, num(2.0), num(3.0)), num(4.0))
        );
    }

    #[test]
    fn test_syntax_errors() {
        assert!(parse_expression("").is_err());
        assert!(parse_expression("2 +").is_err());
        assert!(parse_expression("(1").is_err());
        assert!(parse_expression("1 $ 2").is_err_and(|e| e.span() == Some(Span::new(2, 3))));
    }

    #[test]
    fn test_token_limit() {
        let at_limit = format!("{}1", "-".repeat(MAX_EXPRESSION_TOKENS - 1));
        assert!(parse_expression(&at_limit).is_ok());

        let err = parse_expression(&format!("{}1", "-".repeat(20_000))).unwrap_err();
        assert!(err.is_syntax());
        let at = MAX_EXPRESSION_TOKENS;
        assert_eq!(err.span(), Some(Span::new(at, at + 1)));
    }
}
