//! Recursive-descent formula parser.
//!
//! ```text
//! expr   := term (('+'|'-') term)*
//! term   := factor (('*'|'/') factor)*
//! factor := NUMBER | '-' factor | FN '(' expr (',' expr)* ')' | cellRef | '(' expr ')'
//! ```
//!
//! Binary operators are left-associative. The parser reads left to right with
//! one token of lookahead and never backtracks.

use super::ast::{Ast, Op};
use super::cell_ref::Position;
use super::error::ParseError;
use super::scan::{Token, TokenKind, scan};

/// Deepest tree, or paren nesting, a formula may have. Every walk over an
/// [`Ast`] recurses once per level, so this bounds the stack those walks use.
pub const MAX_DEPTH: usize = 256;

/// Parse formula `text` entered into the cell at `base`.
pub fn parse(text: &str, base: Position) -> Result<Ast, ParseError> {
    let tokens = scan(text, base)?;
    Parser::new(tokens).parse()
}

/// A parsed subtree with its height.
struct Node {
    ast: Ast,
    depth: usize,
}

impl Node {
    fn leaf(ast: Ast) -> Node {
        Node { ast, depth: 1 }
    }

    fn app(op: Op, kids: Vec<Node>) -> Result<Node, ParseError> {
        let depth = 1 + kids.iter().map(|kid| kid.depth).max().unwrap_or(0);
        if depth > MAX_DEPTH {
            return Err(ParseError::TooDeep(MAX_DEPTH));
        }
        let kids = kids.into_iter().map(|kid| kid.ast).collect();
        Ok(Node {
            ast: Ast::app(op, kids),
            depth,
        })
    }
}

struct Parser {
    tokens: Vec<Token>,
    index: usize,
    nesting: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Parser {
        Parser {
            tokens,
            index: 0,
            nesting: 0,
        }
    }

    fn peek(&self) -> &Token {
        // scan() always ends with Eof and advance() never moves past it.
        &self.tokens[self.index]
    }

    fn advance(&mut self) {
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            found: self.peek().lexeme.clone(),
            expected: expected.to_string(),
        }
    }

    /// The operator at the lookahead if it is one of `accepted`.
    fn peek_op(&self, accepted: &[char]) -> Option<Op> {
        match self.peek().kind {
            TokenKind::Punct(c) if accepted.contains(&c) => Op::from_punct(c),
            _ => None,
        }
    }

    fn expect_punct(&mut self, expected: char) -> Result<(), ParseError> {
        if self.peek().kind == TokenKind::Punct(expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", expected)))
        }
    }

    fn parse(mut self) -> Result<Ast, ParseError> {
        let node = self.expr()?;
        if self.peek().kind != TokenKind::Eof {
            return Err(ParseError::TrailingInput(self.peek().lexeme.clone()));
        }
        Ok(node.ast)
    }

    fn expr(&mut self) -> Result<Node, ParseError> {
        let mut lhs = self.term()?;
        while let Some(op) = self.peek_op(&['+', '-']) {
            self.advance();
            let rhs = self.term()?;
            lhs = Node::app(op, vec![lhs, rhs])?;
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Node, ParseError> {
        let mut lhs = self.factor()?;
        while let Some(op) = self.peek_op(&['*', '/']) {
            self.advance();
            let rhs = self.factor()?;
            lhs = Node::app(op, vec![lhs, rhs])?;
        }
        Ok(lhs)
    }

    fn factor(&mut self) -> Result<Node, ParseError> {
        // Parens, unary minus and calls recurse back into the parser.
        self.nesting += 1;
        if self.nesting > MAX_DEPTH {
            return Err(ParseError::TooDeep(MAX_DEPTH));
        }
        let node = self.primary();
        self.nesting -= 1;
        node
    }

    fn primary(&mut self) -> Result<Node, ParseError> {
        match self.peek().kind.clone() {
            TokenKind::Punct('(') => {
                self.advance();
                let inner = self.expr()?;
                self.expect_punct(')')?;
                Ok(inner)
            }
            TokenKind::Punct('-') => {
                self.advance();
                let operand = self.factor()?;
                Node::app(Op::Sub, vec![operand])
            }
            TokenKind::Ref(cell_ref) => {
                self.advance();
                Ok(Node::leaf(Ast::Ref(cell_ref)))
            }
            TokenKind::Num(value) => {
                self.advance();
                Ok(Node::leaf(Ast::Num(value)))
            }
            TokenKind::Fn(op) => {
                self.advance();
                self.expect_punct('(')?;
                let mut args = vec![self.expr()?];
                while self.peek().kind == TokenKind::Punct(',') {
                    self.advance();
                    args.push(self.expr()?);
                }
                self.expect_punct(')')?;
                Node::app(op, args)
            }
            _ => Err(self.unexpected("a number, cell reference, function or '('")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a1() -> Position {
        Position::parse("a1").unwrap()
    }

    fn a5() -> Position {
        Position::parse("a5").unwrap()
    }

    fn text(formula: &str) -> String {
        parse(formula, a1()).unwrap().to_text(a1())
    }

    #[test]
    fn test_parse_simple_arith() {
        assert_eq!(text("1 + 2*3"), "1+2*3");
    }

    #[test]
    fn test_parse_drops_redundant_parens() {
        assert_eq!(text("(  (1 + 2)*3 )"), "(1+2)*3");
        assert_eq!(text("(1 + 2 - 3 )"), "1+2-3");
    }

    #[test]
    fn test_parse_keeps_right_assoc_parens() {
        assert_eq!(text("(1 + (2 - 3) )"), "1+(2-3)");
        assert_eq!(text("8 / (4 / 2)"), "8/(4/2)");
        assert_eq!(text("8 - 4 * 2"), "8-4*2");
    }

    #[test]
    fn test_parse_unary_minus() {
        assert_eq!(text("(--1 + (2))"), "--1+2");
        assert_eq!(text("-(1 + 2) * 3"), "-(1+2)*3");
        assert_eq!(text("2 - -1"), "2--1");
    }

    #[test]
    fn test_parse_functions() {
        assert_eq!(text("(1 + max((2 + 3)*4, 5, 6))"), "1+max((2+3)*4, 5, 6)");
        assert_eq!(
            text("(1 + max((2 + 3)*4, min(5, 6)))"),
            "1+max((2+3)*4, min(5, 6))"
        );
        assert_eq!(text("max(1)"), "max(1)");
    }

    #[test]
    fn test_parse_cell_refs() {
        assert_eq!(text("c$1"), "c$1");
        assert_eq!(text("C2 * $B$3"), "c2*$b$3");
    }

    #[test]
    fn test_translate_refs_to_other_base() {
        let ast = parse("c2", a1()).unwrap();
        assert_eq!(ast.to_text(a5()), "c6");
        let ast = parse("f$2", a1()).unwrap();
        assert_eq!(ast.to_text(a5()), "f$2");
        let ast = parse("((1 + F$2)*$b3)", a1()).unwrap();
        assert_eq!(ast.to_text(a5()), "(1+f$2)*$b7");
    }

    #[test]
    fn test_reparse_of_rendered_text_is_structurally_equal() {
        for formula in [
            "((1 + F$2)*$b3)",
            "-(a1 - b2) / max(c3, 2.5e1, -d4)",
            "1 - (2 - (3 - 4))",
            "min(a1*(b1+c1), 7)",
            "1e999 - 2",
        ] {
            let base = Position::parse("e9").unwrap();
            let ast = parse(formula, base).unwrap();
            let again = parse(&ast.to_text(base), base).unwrap();
            assert_eq!(ast, again, "formula {}", formula);
        }
    }

    #[test]
    fn test_parse_syntax_errors() {
        for bad in ["", "1 +", "a1 ++ 1", "max 1", "max()", "(1 + 2", "1 2", "1 )", "min(1,)"] {
            assert!(parse(bad, a1()).is_err(), "expected error for {:?}", bad);
        }
    }

    #[test]
    fn test_trailing_input_is_reported() {
        assert_eq!(
            parse("1 2", a1()).unwrap_err(),
            ParseError::TrailingInput("2".to_string())
        );
    }

    #[test]
    fn test_long_chain_within_limit() {
        let formula = vec!["1"; MAX_DEPTH].join("+");
        let ast = parse(&formula, a1()).unwrap();
        assert_eq!(parse(&ast.to_text(a1()), a1()).unwrap(), ast);
    }

    #[test]
    fn test_too_deep_is_reported() {
        let long_sum = vec!["1"; 20_000].join("+");
        let nested = format!("{}1{}", "(".repeat(20_000), ")".repeat(20_000));
        let negated = format!("{}1", "-".repeat(20_000));
        for formula in [long_sum, nested, negated] {
            assert_eq!(
                parse(&formula, a1()).unwrap_err(),
                ParseError::TooDeep(MAX_DEPTH)
            );
        }
    }

    #[test]
    fn test_bad_reference_is_reported() {
        assert_eq!(
            parse("a1 + zz9", a1()).unwrap_err(),
            ParseError::BadCellRef("zz9".to_string())
        );
    }
}
