//! Statement parsing.
//!
//! Dispatches on the current token: blocks, branches, the four loop forms,
//! flow control, `try`/`catch`/`finally`, labeled statements, inline
//! assembly, declaration statements, and the expression-statement fallback.
//! A failed statement returns `None`; the enclosing block resynchronises and
//! keeps scanning.

use super::Parser;
use crate::ast::*;
use crate::lexer::TokenKind;

impl<'r> Parser<'r> {
    /// Parse one statement.
    pub fn parse_statement(&mut self) -> Option<Stmt> {
        let location = self.peek_location();

        if self.matches(TokenKind::LBrace) {
            let block = self.parse_block()?;
            return Some(Stmt {
                kind: StmtKind::Block(block),
                location,
            });
        }
        if self.matches(TokenKind::If) {
            return self.parse_if_statement(location);
        }
        if self.matches(TokenKind::Switch) {
            return self.parse_switch_statement(location);
        }
        if self.matches(TokenKind::While) {
            return self.parse_while_statement(location);
        }
        if self.matches(TokenKind::Do) {
            return self.parse_do_while_statement(location);
        }
        if self.matches(TokenKind::For) {
            return self.parse_for_statement(location);
        }
        if self.matches(TokenKind::Try) {
            return self.parse_try_statement(location);
        }
        if self.matches(TokenKind::Return) {
            return self.parse_return_statement(location);
        }
        if self.matches(TokenKind::Break) {
            return self.parse_break_statement(location);
        }
        if self.matches(TokenKind::Continue) {
            return self.parse_continue_statement(location);
        }
        if self.matches(TokenKind::Throw) {
            return self.parse_throw_statement(location);
        }
        if self.check(TokenKind::Attribute) && self.tokens.peek().lexeme == "#asm" {
            self.tokens.advance();
            return self.parse_assembly_statement(location);
        }
        if self.is_declaration_start() {
            let decl = self.parse_declaration()?;
            return Some(Stmt {
                kind: StmtKind::Decl(decl),
                location,
            });
        }
        // `label: statement`
        if self.check(TokenKind::Identifier) && self.tokens.peek_next(1).kind == TokenKind::Colon {
            self.tokens.advance();
            let label = self.name_from_previous();
            self.tokens.advance(); // ':'
            let statement = self.parse_statement()?;
            return Some(Stmt {
                kind: StmtKind::Labeled {
                    label,
                    statement: Box::new(statement),
                },
                location,
            });
        }

        self.parse_expression_statement(location)
    }

    /// Parse statements up to the matching `}`, which is consumed. The `{`
    /// has already been consumed by the caller.
    pub fn parse_block(&mut self) -> Option<Block> {
        let location = self.previous_location();
        let mut statements = Vec::new();

        while !self.check(TokenKind::RBrace) && !self.tokens.is_at_end() {
            match self.parse_statement() {
                Some(stmt) => statements.push(stmt),
                None => self.tokens.synchronize(),
            }
        }

        if !self.consume(TokenKind::RBrace, "Expected '}' after block") {
            return None;
        }

        Some(Block {
            statements,
            location,
        })
    }

    fn parse_expression_statement(
        &mut self,
        location: crate::span::SourceLocation,
    ) -> Option<Stmt> {
        let expr = self.parse_expression()?;

        if !self.consume(TokenKind::Semicolon, "Expected ';' after expression") {
            return None;
        }

        Some(Stmt {
            kind: StmtKind::Expr(expr),
            location,
        })
    }

    fn parse_if_statement(&mut self, location: crate::span::SourceLocation) -> Option<Stmt> {
        if !self.consume(TokenKind::LParen, "Expected '(' after 'if'") {
            return None;
        }
        let condition = self.parse_expression()?;
        if !self.consume(TokenKind::RParen, "Expected ')' after condition") {
            return None;
        }

        let then_branch = Box::new(self.parse_statement()?);

        let else_branch = if self.matches(TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Some(Stmt {
            kind: StmtKind::If {
                condition,
                then_branch,
                else_branch,
            },
            location,
        })
    }

    /// `switch (expr) { (case expr: | default:) stmt* ... }`
    fn parse_switch_statement(&mut self, location: crate::span::SourceLocation) -> Option<Stmt> {
        if !self.consume(TokenKind::LParen, "Expected '(' after 'switch'") {
            return None;
        }
        let scrutinee = self.parse_expression()?;
        if !self.consume(TokenKind::RParen, "Expected ')' after switch expression") {
            return None;
        }
        if !self.consume(TokenKind::LBrace, "Expected '{' before switch body") {
            return None;
        }

        let mut cases = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.tokens.is_at_end() {
            let case_location = self.peek_location();

            let value = if self.matches(TokenKind::Case) {
                let value = self.parse_expression()?;
                if !self.consume(TokenKind::Colon, "Expected ':' after case value") {
                    return None;
                }
                Some(value)
            } else if self.matches(TokenKind::Default) {
                if !self.consume(TokenKind::Colon, "Expected ':' after 'default'") {
                    return None;
                }
                None
            } else {
                self.error("Expected 'case' or 'default' in switch body");
                return None;
            };

            // Section body runs to the next case/default or the closing brace.
            let mut body = Vec::new();
            while !self.check(TokenKind::Case)
                && !self.check(TokenKind::Default)
                && !self.check(TokenKind::RBrace)
                && !self.tokens.is_at_end()
            {
                match self.parse_statement() {
                    Some(stmt) => body.push(stmt),
                    None => self.tokens.synchronize(),
                }
            }

            cases.push(SwitchCase {
                value,
                body,
                location: case_location,
            });
        }

        if !self.consume(TokenKind::RBrace, "Expected '}' after switch body") {
            return None;
        }

        Some(Stmt {
            kind: StmtKind::Switch { scrutinee, cases },
            location,
        })
    }

    fn parse_while_statement(&mut self, location: crate::span::SourceLocation) -> Option<Stmt> {
        if !self.consume(TokenKind::LParen, "Expected '(' after 'while'") {
            return None;
        }
        let condition = self.parse_expression()?;
        if !self.consume(TokenKind::RParen, "Expected ')' after condition") {
            return None;
        }
        let body = Box::new(self.parse_statement()?);

        Some(Stmt {
            kind: StmtKind::While { condition, body },
            location,
        })
    }

    fn parse_do_while_statement(&mut self, location: crate::span::SourceLocation) -> Option<Stmt> {
        let body = Box::new(self.parse_statement()?);

        if !self.consume(TokenKind::While, "Expected 'while' after do block") {
            return None;
        }
        if !self.consume(TokenKind::LParen, "Expected '(' after 'while'") {
            return None;
        }
        let condition = self.parse_expression()?;
        if !self.consume(TokenKind::RParen, "Expected ')' after condition") {
            return None;
        }
        if !self.consume(TokenKind::Semicolon, "Expected ';' after do-while statement") {
            return None;
        }

        Some(Stmt {
            kind: StmtKind::DoWhile { body, condition },
            location,
        })
    }

    /// `for (init?; cond?; inc?) body` or `for ((let|const) x of iter) body`.
    fn parse_for_statement(&mut self, location: crate::span::SourceLocation) -> Option<Stmt> {
        if !self.consume(TokenKind::LParen, "Expected '(' after 'for'") {
            return None;
        }

        // for-of: `let`/`const`, an identifier, then `of`.
        if (self.check(TokenKind::Let) || self.check(TokenKind::Const))
            && self.tokens.peek_next(1).kind == TokenKind::Identifier
            && self.tokens.peek_next(2).kind == TokenKind::Of
        {
            let is_const = self.tokens.advance().kind == TokenKind::Const;
            self.tokens.advance();
            let binding = self.name_from_previous();
            self.tokens.advance(); // 'of'

            let iterable = self.parse_expression()?;
            if !self.consume(TokenKind::RParen, "Expected ')' after for-of clause") {
                return None;
            }
            let body = Box::new(self.parse_statement()?);

            return Some(Stmt {
                kind: StmtKind::ForOf {
                    is_const,
                    binding,
                    iterable,
                    body,
                },
                location,
            });
        }

        // Classic three-clause form. The initializer is a declaration or an
        // expression statement; either consumes its own semicolon.
        let init = if self.matches(TokenKind::Semicolon) {
            None
        } else if self.check(TokenKind::Let) || self.check(TokenKind::Const) {
            let init_location = self.peek_location();
            let decl = self.parse_declaration()?;
            Some(Box::new(Stmt {
                kind: StmtKind::Decl(decl),
                location: init_location,
            }))
        } else {
            let init_location = self.peek_location();
            let expr = self.parse_expression()?;
            if !self.consume(TokenKind::Semicolon, "Expected ';' after loop initializer") {
                return None;
            }
            Some(Box::new(Stmt {
                kind: StmtKind::Expr(expr),
                location: init_location,
            }))
        };

        let condition = if self.matches(TokenKind::Semicolon) {
            None
        } else {
            let condition = self.parse_expression()?;
            if !self.consume(TokenKind::Semicolon, "Expected ';' after loop condition") {
                return None;
            }
            Some(condition)
        };

        let increment = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };

        if !self.consume(TokenKind::RParen, "Expected ')' after for clauses") {
            return None;
        }
        let body = Box::new(self.parse_statement()?);

        Some(Stmt {
            kind: StmtKind::For {
                init,
                condition,
                increment,
                body,
            },
            location,
        })
    }

    fn parse_try_statement(&mut self, location: crate::span::SourceLocation) -> Option<Stmt> {
        let block = Box::new(self.parse_statement()?);

        let mut catch_clauses = Vec::new();
        while self.matches(TokenKind::Catch) {
            catch_clauses.push(self.parse_catch_clause()?);
        }

        let finally_block = if self.matches(TokenKind::Finally) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        if catch_clauses.is_empty() && finally_block.is_none() {
            self.error_at(
                location,
                "Try statement must have at least one catch or finally clause",
            );
            return None;
        }

        Some(Stmt {
            kind: StmtKind::Try {
                block,
                catch_clauses,
                finally_block,
            },
            location,
        })
    }

    /// `catch (name (: type)?) body`
    fn parse_catch_clause(&mut self) -> Option<CatchClause> {
        let location = self.previous_location();

        if !self.consume(TokenKind::LParen, "Expected '(' after 'catch'") {
            return None;
        }
        if !self.matches(TokenKind::Identifier) {
            self.error("Expected catch parameter name");
            return None;
        }
        let parameter = self.name_from_previous();

        let parameter_type = if self.matches(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };

        if !self.consume(TokenKind::RParen, "Expected ')' after catch parameter") {
            return None;
        }

        let body = Box::new(self.parse_statement()?);

        Some(CatchClause {
            parameter,
            parameter_type,
            body,
            location,
        })
    }

    fn parse_return_statement(&mut self, location: crate::span::SourceLocation) -> Option<Stmt> {
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };

        if !self.consume(TokenKind::Semicolon, "Expected ';' after return statement") {
            return None;
        }

        Some(Stmt {
            kind: StmtKind::Return(value),
            location,
        })
    }

    fn parse_break_statement(&mut self, location: crate::span::SourceLocation) -> Option<Stmt> {
        let label = if self.matches(TokenKind::Identifier) {
            Some(self.name_from_previous())
        } else {
            None
        };

        if !self.consume(TokenKind::Semicolon, "Expected ';' after break statement") {
            return None;
        }

        Some(Stmt {
            kind: StmtKind::Break(label),
            location,
        })
    }

    fn parse_continue_statement(&mut self, location: crate::span::SourceLocation) -> Option<Stmt> {
        let label = if self.matches(TokenKind::Identifier) {
            Some(self.name_from_previous())
        } else {
            None
        };

        if !self.consume(TokenKind::Semicolon, "Expected ';' after continue statement") {
            return None;
        }

        Some(Stmt {
            kind: StmtKind::Continue(label),
            location,
        })
    }

    fn parse_throw_statement(&mut self, location: crate::span::SourceLocation) -> Option<Stmt> {
        let value = self.parse_expression()?;

        if !self.consume(TokenKind::Semicolon, "Expected ';' after throw statement") {
            return None;
        }

        Some(Stmt {
            kind: StmtKind::Throw(value),
            location,
        })
    }

    /// `#asm("code", "constraint", ...);`
    fn parse_assembly_statement(&mut self, location: crate::span::SourceLocation) -> Option<Stmt> {
        if !self.consume(TokenKind::LParen, "Expected '(' after '#asm'") {
            return None;
        }

        if !self.matches(TokenKind::StringLiteral) {
            self.error("Expected string literal containing assembly code");
            return None;
        }
        let code = self.tokens.previous().lexeme.clone();

        let mut constraints = Vec::new();
        while self.matches(TokenKind::Comma) {
            if !self.matches(TokenKind::StringLiteral) {
                self.error("Expected constraint string");
                return None;
            }
            constraints.push(self.tokens.previous().lexeme.clone());
        }

        if !self.consume(TokenKind::RParen, "Expected ')' after assembly code") {
            return None;
        }
        if !self.consume(TokenKind::Semicolon, "Expected ';' after assembly statement") {
            return None;
        }

        Some(Stmt {
            kind: StmtKind::Assembly { code, constraints },
            location,
        })
    }
}
