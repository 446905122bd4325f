//! Expression parsing using precedence climbing.
//!
//! One Pratt loop handles every binary, conditional, and assignment form;
//! prefix and postfix operators and the primary forms (`new`, `cast<T>(e)`,
//! the compile-time operators, array literals) live in their own functions.

use super::Parser;
use crate::ast::*;
use crate::lexer::TokenKind;

/// Maximum number of arguments in a single call.
pub const MAX_CALL_ARGUMENTS: usize = 255;

/// Operator precedence levels (higher binds tighter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    None = 0,
    Assignment = 1,  // = += -= *= /= %= &= |= ^=
    Conditional = 2, // ? :
    Or = 3,          // ||
    And = 4,         // &&
    BitOr = 5,       // |
    BitXor = 6,      // ^
    BitAnd = 7,      // &
    Equality = 8,    // == !=
    Comparison = 9,  // < > <= >=
    Shift = 10,      // << >> >>>
    Term = 11,       // + -
    Factor = 12,     // * / %
    Unary = 13,      // + - ! ~ ++ -- @
    Postfix = 14,    // . @ [] ()
}

impl Precedence {
    /// The next tighter level, used for left-associative operators.
    fn next(self) -> Self {
        match self {
            Precedence::None => Precedence::Assignment,
            Precedence::Assignment => Precedence::Conditional,
            Precedence::Conditional => Precedence::Or,
            Precedence::Or => Precedence::And,
            Precedence::And => Precedence::BitOr,
            Precedence::BitOr => Precedence::BitXor,
            Precedence::BitXor => Precedence::BitAnd,
            Precedence::BitAnd => Precedence::Equality,
            Precedence::Equality => Precedence::Comparison,
            Precedence::Comparison => Precedence::Shift,
            Precedence::Shift => Precedence::Term,
            Precedence::Term => Precedence::Factor,
            Precedence::Factor => Precedence::Unary,
            Precedence::Unary => Precedence::Postfix,
            Precedence::Postfix => Precedence::Postfix,
        }
    }
}

/// Precedence of an infix operator token, if it is one.
fn infix_precedence(kind: TokenKind) -> Option<Precedence> {
    match kind {
        TokenKind::Eq
        | TokenKind::PlusEq
        | TokenKind::MinusEq
        | TokenKind::StarEq
        | TokenKind::SlashEq
        | TokenKind::PercentEq
        | TokenKind::AndEq
        | TokenKind::OrEq
        | TokenKind::CaretEq => Some(Precedence::Assignment),
        TokenKind::Question => Some(Precedence::Conditional),
        TokenKind::OrOr => Some(Precedence::Or),
        TokenKind::AndAnd => Some(Precedence::And),
        TokenKind::Or => Some(Precedence::BitOr),
        TokenKind::Caret => Some(Precedence::BitXor),
        TokenKind::And => Some(Precedence::BitAnd),
        TokenKind::EqEq | TokenKind::NotEq => Some(Precedence::Equality),
        TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => {
            Some(Precedence::Comparison)
        }
        TokenKind::Shl | TokenKind::Shr | TokenKind::Ushr => Some(Precedence::Shift),
        TokenKind::Plus | TokenKind::Minus => Some(Precedence::Term),
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some(Precedence::Factor),
        _ => None,
    }
}

fn token_to_binary_op(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Sub),
        TokenKind::Star => Some(BinaryOp::Mul),
        TokenKind::Slash => Some(BinaryOp::Div),
        TokenKind::Percent => Some(BinaryOp::Rem),
        TokenKind::EqEq => Some(BinaryOp::Eq),
        TokenKind::NotEq => Some(BinaryOp::Ne),
        TokenKind::Lt => Some(BinaryOp::Lt),
        TokenKind::LtEq => Some(BinaryOp::Le),
        TokenKind::Gt => Some(BinaryOp::Gt),
        TokenKind::GtEq => Some(BinaryOp::Ge),
        TokenKind::AndAnd => Some(BinaryOp::And),
        TokenKind::OrOr => Some(BinaryOp::Or),
        TokenKind::And => Some(BinaryOp::BitAnd),
        TokenKind::Or => Some(BinaryOp::BitOr),
        TokenKind::Caret => Some(BinaryOp::BitXor),
        TokenKind::Shl => Some(BinaryOp::Shl),
        TokenKind::Shr => Some(BinaryOp::Shr),
        TokenKind::Ushr => Some(BinaryOp::Ushr),
        _ => None,
    }
}

fn token_to_assign_op(kind: TokenKind) -> Option<AssignOp> {
    match kind {
        TokenKind::Eq => Some(AssignOp::Assign),
        TokenKind::PlusEq => Some(AssignOp::Add),
        TokenKind::MinusEq => Some(AssignOp::Sub),
        TokenKind::StarEq => Some(AssignOp::Mul),
        TokenKind::SlashEq => Some(AssignOp::Div),
        TokenKind::PercentEq => Some(AssignOp::Rem),
        TokenKind::AndEq => Some(AssignOp::BitAnd),
        TokenKind::OrEq => Some(AssignOp::BitOr),
        TokenKind::CaretEq => Some(AssignOp::BitXor),
        _ => None,
    }
}

fn token_to_prefix_op(kind: TokenKind) -> Option<UnaryOp> {
    match kind {
        TokenKind::Plus => Some(UnaryOp::Plus),
        TokenKind::Minus => Some(UnaryOp::Minus),
        TokenKind::Not => Some(UnaryOp::Not),
        TokenKind::Tilde => Some(UnaryOp::BitNot),
        TokenKind::PlusPlus => Some(UnaryOp::Increment),
        TokenKind::MinusMinus => Some(UnaryOp::Decrement),
        TokenKind::At => Some(UnaryOp::AddressOf),
        _ => None,
    }
}

/// Whether an expression may be assigned to.
fn is_lvalue(expr: &Expr) -> bool {
    matches!(
        expr.kind,
        ExprKind::Identifier(_) | ExprKind::Member { .. } | ExprKind::Index { .. }
    )
}

impl<'r> Parser<'r> {
    /// Parse one expression.
    pub fn parse_expression(&mut self) -> Option<Expr> {
        self.parse_precedence(Precedence::Assignment)
    }

    /// Parse an expression of at least the given precedence.
    fn parse_precedence(&mut self, min: Precedence) -> Option<Expr> {
        let mut left = self.parse_prefix()?;

        loop {
            let kind = self.tokens.peek().kind;
            let Some(prec) = infix_precedence(kind) else {
                break;
            };
            if prec < min {
                break;
            }

            let op_location = self.peek_location();
            self.tokens.advance();

            left = if let Some(op) = token_to_assign_op(kind) {
                if !is_lvalue(&left) {
                    self.error_at(op_location, "Invalid assignment target");
                    return None;
                }
                // Right-associative: recurse at the same level.
                let value = self.parse_precedence(Precedence::Assignment)?;
                let location = left.location.clone();
                Expr {
                    kind: ExprKind::Assign {
                        op,
                        target: Box::new(left),
                        value: Box::new(value),
                    },
                    location,
                }
            } else if kind == TokenKind::Question {
                let then_expr = self.parse_expression()?;
                if !self.consume(TokenKind::Colon, "Expected ':' in conditional expression") {
                    return None;
                }
                // Right-associative false branch.
                let else_expr = self.parse_precedence(Precedence::Conditional)?;
                let location = left.location.clone();
                Expr {
                    kind: ExprKind::Conditional {
                        condition: Box::new(left),
                        then_expr: Box::new(then_expr),
                        else_expr: Box::new(else_expr),
                    },
                    location,
                }
            } else {
                let op = token_to_binary_op(kind)
                    .expect("infix_precedence and token_to_binary_op agree on operators");
                let right = self.parse_precedence(prec.next())?;
                let location = left.location.clone();
                Expr {
                    kind: ExprKind::Binary {
                        op,
                        left: Box::new(left),
                        right: Box::new(right),
                    },
                    location,
                }
            };
        }

        Some(left)
    }

    /// Prefix operators, then the postfix chain.
    fn parse_prefix(&mut self) -> Option<Expr> {
        if let Some(op) = token_to_prefix_op(self.tokens.peek().kind) {
            let location = self.peek_location();
            self.tokens.advance();
            let operand = self.parse_prefix()?;
            return Some(Expr {
                kind: ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                    is_prefix: true,
                },
                location,
            });
        }

        self.parse_postfix()
    }

    /// A primary expression followed by any number of postfix operations:
    /// `.member`, `@member`, `[index]`, `(args)`, `++`, `--`.
    fn parse_postfix(&mut self) -> Option<Expr> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.matches(TokenKind::PlusPlus) || self.matches(TokenKind::MinusMinus) {
                let op = if self.tokens.previous().kind == TokenKind::PlusPlus {
                    UnaryOp::Increment
                } else {
                    UnaryOp::Decrement
                };
                let location = expr.location.clone();
                expr = Expr {
                    kind: ExprKind::Unary {
                        op,
                        operand: Box::new(expr),
                        is_prefix: false,
                    },
                    location,
                };
            } else if self.matches(TokenKind::LBracket) {
                let index = self.parse_expression()?;
                if !self.consume(TokenKind::RBracket, "Expected ']' after array index") {
                    return None;
                }
                let location = expr.location.clone();
                expr = Expr {
                    kind: ExprKind::Index {
                        array: Box::new(expr),
                        index: Box::new(index),
                    },
                    location,
                };
            } else if self.matches(TokenKind::LParen) {
                let arguments = self.parse_call_arguments()?;
                let location = expr.location.clone();
                expr = Expr {
                    kind: ExprKind::Call {
                        callee: Box::new(expr),
                        arguments,
                    },
                    location,
                };
            } else if self.matches(TokenKind::Dot) || self.matches(TokenKind::At) {
                let is_pointer = self.tokens.previous().kind == TokenKind::At;
                if !self.matches(TokenKind::Identifier) {
                    self.error("Expected identifier after '.' or '@'");
                    return None;
                }
                let member = self.name_from_previous();
                let location = expr.location.clone();
                expr = Expr {
                    kind: ExprKind::Member {
                        object: Box::new(expr),
                        member,
                        is_pointer,
                    },
                    location,
                };
            } else {
                break;
            }
        }

        Some(expr)
    }

    /// Comma-separated argument list up to the closing parenthesis, which is
    /// consumed. Enforces the 255-argument limit.
    fn parse_call_arguments(&mut self) -> Option<Vec<Expr>> {
        let mut arguments = Vec::new();

        if !self.matches(TokenKind::RParen) {
            loop {
                if arguments.len() >= MAX_CALL_ARGUMENTS {
                    self.error("Cannot have more than 255 arguments");
                    return None;
                }
                arguments.push(self.parse_expression()?);
                if !self.matches(TokenKind::Comma) {
                    break;
                }
            }
            if !self.consume(TokenKind::RParen, "Expected ')' after function arguments") {
                return None;
            }
        }

        Some(arguments)
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        let location = self.peek_location();

        if self.matches(TokenKind::Identifier) {
            let lexeme = self.tokens.previous().lexeme.clone();
            let symbol = self.intern(&lexeme);
            return Some(Expr {
                kind: ExprKind::Identifier(symbol),
                location,
            });
        }

        if self.matches(TokenKind::This) {
            return Some(Expr {
                kind: ExprKind::This,
                location,
            });
        }

        if self.matches(TokenKind::NumberLiteral) {
            let lexeme = self.tokens.previous().lexeme.clone();
            return Some(Expr {
                kind: ExprKind::Literal(Literal::Number(lexeme)),
                location,
            });
        }

        if self.matches(TokenKind::StringLiteral) {
            let lexeme = self.tokens.previous().lexeme.clone();
            return Some(Expr {
                kind: ExprKind::Literal(Literal::String(lexeme)),
                location,
            });
        }

        if self.matches(TokenKind::CharLiteral) {
            let lexeme = self.tokens.previous().lexeme.clone();
            return Some(Expr {
                kind: ExprKind::Literal(Literal::Char(lexeme)),
                location,
            });
        }

        if self.matches(TokenKind::True) {
            return Some(Expr {
                kind: ExprKind::Literal(Literal::Bool(true)),
                location,
            });
        }

        if self.matches(TokenKind::False) {
            return Some(Expr {
                kind: ExprKind::Literal(Literal::Bool(false)),
                location,
            });
        }

        if self.matches(TokenKind::Null) {
            return Some(Expr {
                kind: ExprKind::Literal(Literal::Null),
                location,
            });
        }

        if self.matches(TokenKind::Undefined) {
            return Some(Expr {
                kind: ExprKind::Literal(Literal::Undefined),
                location,
            });
        }

        if self.matches(TokenKind::LParen) {
            let expr = self.parse_expression()?;
            if !self.consume(TokenKind::RParen, "Expected ')' after expression") {
                return None;
            }
            return Some(expr);
        }

        if self.matches(TokenKind::LBracket) {
            return self.parse_array_literal(location);
        }

        if self.matches(TokenKind::New) {
            return self.parse_new_expression(location);
        }

        if self.matches(TokenKind::Cast) {
            return self.parse_cast_expression(location);
        }

        if self.match_any(&[
            TokenKind::Sizeof,
            TokenKind::Alignof,
            TokenKind::Typeof,
            TokenKind::Constexpr,
        ]) {
            return self.parse_compile_time_expression(location);
        }

        self.error("Expected expression");
        None
    }

    /// `[e, ...]`; the empty literal is permitted (its typing is the
    /// checker's problem).
    fn parse_array_literal(&mut self, location: crate::span::SourceLocation) -> Option<Expr> {
        let mut elements = Vec::new();

        if self.matches(TokenKind::RBracket) {
            return Some(Expr {
                kind: ExprKind::ArrayLiteral(elements),
                location,
            });
        }

        loop {
            elements.push(self.parse_expression()?);
            if !self.matches(TokenKind::Comma) {
                break;
            }
        }

        if !self.consume(TokenKind::RBracket, "Expected ']' after array elements") {
            return None;
        }

        Some(Expr {
            kind: ExprKind::ArrayLiteral(elements),
            location,
        })
    }

    /// `new Ns.Class(args?)`. The class name is a dotted identifier path.
    fn parse_new_expression(&mut self, location: crate::span::SourceLocation) -> Option<Expr> {
        if !self.matches(TokenKind::Identifier) {
            self.error("Expected type name after 'new'");
            return None;
        }
        let mut path = vec![self.name_from_previous()];

        while self.matches(TokenKind::Dot) {
            if !self.matches(TokenKind::Identifier) {
                self.error("Expected identifier after '.'");
                return None;
            }
            path.push(self.name_from_previous());
        }

        let arguments = if self.matches(TokenKind::LParen) {
            self.parse_call_arguments()?
        } else {
            Vec::new()
        };

        Some(Expr {
            kind: ExprKind::New { path, arguments },
            location,
        })
    }

    /// `cast<Target>(expr)`. The target type is kept as its written name;
    /// the checker resolves it by lookup.
    fn parse_cast_expression(&mut self, location: crate::span::SourceLocation) -> Option<Expr> {
        if !self.consume(TokenKind::Lt, "Expected '<' after 'cast'") {
            return None;
        }

        let target_location = self.peek_location();
        let target_type = self.parse_type()?;

        if !self.consume(TokenKind::Gt, "Expected '>' after type in cast expression") {
            return None;
        }

        if !self.consume(TokenKind::LParen, "Expected '(' after cast target") {
            return None;
        }
        let expr = self.parse_expression()?;
        if !self.consume(TokenKind::RParen, "Expected ')' after cast expression") {
            return None;
        }

        let rendered = self.type_to_string(&target_type);
        let symbol = self.intern(&rendered);
        Some(Expr {
            kind: ExprKind::Cast {
                target: Name::new(symbol, target_location),
                expr: Box::new(expr),
            },
            location,
        })
    }

    /// `sizeof|alignof|typeof|constexpr ( expr )`.
    fn parse_compile_time_expression(
        &mut self,
        location: crate::span::SourceLocation,
    ) -> Option<Expr> {
        let kind = match self.tokens.previous().kind {
            TokenKind::Sizeof => CompileTimeKind::Sizeof,
            TokenKind::Alignof => CompileTimeKind::Alignof,
            TokenKind::Typeof => CompileTimeKind::Typeof,
            _ => CompileTimeKind::Constexpr,
        };

        if !self.consume(TokenKind::LParen, "Expected '(' after compile-time operator") {
            return None;
        }
        let operand = self.parse_expression()?;
        if !self.consume(TokenKind::RParen, "Expected ')' after compile-time expression") {
            return None;
        }

        Some(Expr {
            kind: ExprKind::CompileTime {
                kind,
                operand: Box::new(operand),
            },
            location,
        })
    }
}
