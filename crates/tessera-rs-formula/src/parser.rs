//! Recursive-descent parser producing an [`Expr`] tree.
//!
//! Grammar:
//!
//! ```text
//! expression := term (("+" | "-") term)*
//! term       := unary (("*" | "/") unary)*
//! unary      := "-" unary | primary
//! primary    := number | identifier | call | "(" expression ")"
//! call       := function "(" expression ("," expression)* ")"
//! ```
//!
//! Nesting (parentheses, calls, unary minus and operator chains) is capped at
//! [`MAX_DEPTH`], which also bounds the depth of the resulting tree.

use crate::FormulaError;
use crate::ast::{BinaryOp, Expr, Function};
use crate::lexer::{Token, TokenKind, tokenize};

/// Deepest nesting accepted by [`parse`].
pub const MAX_DEPTH: usize = 256;

/// Parse formula text into an expression tree.
pub fn parse(source: &str) -> Result<Expr, FormulaError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        index: 0,
        depth: 0,
    };
    let expr = parser.expression()?;
    let trailing = parser.peek();
    if trailing.kind != TokenKind::End {
        return Err(FormulaError::parse(
            trailing.position,
            format!("unexpected {}", trailing.kind.describe()),
        ));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    index: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // `tokenize` always ends with `End`, and `advance` never moves past it.
        &self.tokens[self.index.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::End {
            self.index += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, FormulaError> {
        let token = self.advance();
        if token.kind == kind {
            Ok(token)
        } else {
            Err(FormulaError::parse(
                token.position,
                format!("expected {}, found {}", kind.describe(), token.kind.describe()),
            ))
        }
    }

    fn descend(&mut self) -> Result<(), FormulaError> {
        if self.depth >= MAX_DEPTH {
            return Err(FormulaError::parse(self.peek().position, "expression nested too deeply"));
        }
        self.depth += 1;
        Ok(())
    }

    fn expression(&mut self) -> Result<Expr, FormulaError> {
        let depth = self.depth;
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            // Each operator adds a level to the left-leaning chain.
            self.descend()?;
            let rhs = self.term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        self.depth = depth;
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, FormulaError> {
        let depth = self.depth;
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            self.descend()?;
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        self.depth = depth;
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, FormulaError> {
        if self.peek().kind == TokenKind::Minus {
            self.advance();
            self.descend()?;
            let operand = self.unary()?;
            self.depth -= 1;
            return Ok(Expr::Negate(Box::new(operand)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, FormulaError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Number(value) => Ok(Expr::Number(value)),
            TokenKind::Ident(name) => {
                if self.peek().kind == TokenKind::LParen {
                    self.call(name)
                } else if Function::from_name(&name).is_some() {
                    Err(FormulaError::parse(
                        self.peek().position,
                        format!("expected '(' after function '{name}'"),
                    ))
                } else {
                    Ok(Expr::Variable(name))
                }
            }
            TokenKind::LParen => {
                self.descend()?;
                let inner = self.expression()?;
                self.expect(TokenKind::RParen)?;
                self.depth -= 1;
                Ok(inner)
            }
            other => Err(FormulaError::parse(
                token.position,
                format!("expected expression, found {}", other.describe()),
            )),
        }
    }

    fn call(&mut self, name: String) -> Result<Expr, FormulaError> {
        let Some(function) = Function::from_name(&name) else {
            return Err(FormulaError::UnknownFunction(name));
        };
        self.expect(TokenKind::LParen)?;
        self.descend()?;

        let mut args = Vec::new();
        if self.peek().kind != TokenKind::RParen {
            args.push(self.expression()?);
            while self.peek().kind == TokenKind::Comma {
                self.advance();
                args.push(self.expression()?);
            }
        }
        self.expect(TokenKind::RParen)?;
        self.depth -= 1;

        let arity = function.arity();
        if !arity.accepts(args.len()) {
            return Err(FormulaError::Arity {
                function: name,
                expected: arity.to_string(),
                found: args.len(),
            });
        }
        Ok(Expr::Call { function, args })
    }
}
