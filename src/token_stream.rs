//! Random-access cursor over a token vector.
//!
//! The parser consumes tokens through this cursor. It guarantees a terminating
//! [`TokenKind::Eof`], supports arbitrary lookahead and position save/restore,
//! and owns the single panic-recovery primitive, [`TokenStream::synchronize`].

use crate::lexer::{Token, TokenKind};
use crate::span::SourceLocation;

/// Sequential access to a token sequence with lookahead and matching.
#[derive(Debug)]
pub struct TokenStream {
    tokens: Vec<Token>,
    current: usize,
}

impl TokenStream {
    /// Wrap a token vector. A missing trailing EOF token is repaired here so
    /// every downstream contract can rely on it.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map_or(true, |t| t.kind != TokenKind::Eof) {
            tokens.push(Token::eof(SourceLocation::dummy()));
        }
        Self { tokens, current: 0 }
    }

    /// The current token. Past the end, the trailing EOF token.
    pub fn peek(&self) -> &Token {
        if self.current >= self.tokens.len() {
            return self.tokens.last().expect("stream always holds EOF");
        }
        &self.tokens[self.current]
    }

    /// Lookahead by `n` tokens; `n <= 0` behaves as 1. Past the end, EOF.
    pub fn peek_next(&self, n: isize) -> &Token {
        let n = if n <= 0 { 1 } else { n as usize };
        match self.current.checked_add(n) {
            Some(idx) if idx < self.tokens.len() => &self.tokens[idx],
            _ => self.tokens.last().expect("stream always holds EOF"),
        }
    }

    /// The most recently consumed token. Before any advance, the first token.
    pub fn previous(&self) -> &Token {
        if self.current == 0 {
            return &self.tokens[0];
        }
        if self.current >= self.tokens.len() {
            return self.tokens.last().expect("stream always holds EOF");
        }
        &self.tokens[self.current - 1]
    }

    /// Consume the current token and return it.
    pub fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous().clone()
    }

    /// Whether the cursor sits on the terminating EOF.
    pub fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len() - 1 || self.tokens[self.current].kind == TokenKind::Eof
    }

    /// Whether the current token has the given kind. Never true at EOF.
    pub fn check(&self, kind: TokenKind) -> bool {
        if self.is_at_end() {
            return false;
        }
        self.peek().kind == kind
    }

    /// Consume the current token iff it has the given kind.
    pub fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            return true;
        }
        false
    }

    /// Consume the current token iff it has any of the given kinds.
    pub fn match_any(&mut self, kinds: &[TokenKind]) -> bool {
        for &kind in kinds {
            if self.matches(kind) {
                return true;
            }
        }
        false
    }

    /// Current cursor position, for save/restore.
    pub fn position(&self) -> usize {
        self.current
    }

    /// Restore a saved position, clamped to the last valid index.
    pub fn set_position(&mut self, position: usize) {
        if position < self.tokens.len() {
            self.current = position;
        } else {
            self.current = self.tokens.len() - 1;
        }
    }

    /// Panic-mode recovery: skip the offending token, then consume tokens
    /// until just past a semicolon or just before a token that starts a new
    /// declaration or statement.
    pub fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }

            match self.peek().kind {
                TokenKind::Function
                | TokenKind::Let
                | TokenKind::Const
                | TokenKind::Class
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Return => return,
                _ => {}
            }

            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn token(kind: TokenKind, lexeme: &str) -> Token {
        Token::new(
            kind,
            lexeme,
            SourceLocation::new(Arc::from("test.tspp"), 1, 1),
        )
    }

    fn stream(kinds: &[(TokenKind, &str)]) -> TokenStream {
        TokenStream::new(kinds.iter().map(|(k, l)| token(*k, l)).collect())
    }

    #[test]
    fn appends_missing_eof() {
        let s = stream(&[(TokenKind::Let, "let")]);
        assert_eq!(s.peek_next(1).kind, TokenKind::Eof);
    }

    #[test]
    fn peek_past_end_returns_eof() {
        let mut s = stream(&[(TokenKind::Let, "let")]);
        s.advance();
        s.advance();
        s.advance();
        assert_eq!(s.peek().kind, TokenKind::Eof);
        assert_eq!(s.peek_next(10).kind, TokenKind::Eof);
    }

    #[test]
    fn previous_before_any_advance_is_first_token() {
        let s = stream(&[(TokenKind::Let, "let"), (TokenKind::Identifier, "x")]);
        assert_eq!(s.previous().kind, TokenKind::Let);
    }

    #[test]
    fn matches_advances_check_does_not() {
        let mut s = stream(&[(TokenKind::Let, "let"), (TokenKind::Identifier, "x")]);
        assert!(s.check(TokenKind::Let));
        assert_eq!(s.position(), 0);
        assert!(s.matches(TokenKind::Let));
        assert_eq!(s.position(), 1);
        assert!(!s.matches(TokenKind::Let));
        assert_eq!(s.position(), 1);
    }

    #[test]
    fn match_any_tries_in_order() {
        let mut s = stream(&[(TokenKind::Const, "const")]);
        assert!(s.match_any(&[TokenKind::Let, TokenKind::Const]));
        assert_eq!(s.previous().kind, TokenKind::Const);
    }

    #[test]
    fn set_position_clamps() {
        let mut s = stream(&[(TokenKind::Let, "let")]);
        s.set_position(100);
        assert!(s.is_at_end());
        s.set_position(0);
        assert_eq!(s.peek().kind, TokenKind::Let);
    }

    #[test]
    fn peek_next_nonpositive_behaves_as_one() {
        let s = stream(&[(TokenKind::Let, "let"), (TokenKind::Identifier, "x")]);
        assert_eq!(s.peek_next(0).kind, TokenKind::Identifier);
        assert_eq!(s.peek_next(-3).kind, TokenKind::Identifier);
    }

    #[test]
    fn synchronize_stops_after_semicolon() {
        let mut s = stream(&[
            (TokenKind::Star, "*"),
            (TokenKind::Identifier, "junk"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::Identifier, "next"),
        ]);
        s.synchronize();
        assert_eq!(s.peek().kind, TokenKind::Identifier);
        assert_eq!(s.peek().lexeme, "next");
    }

    #[test]
    fn synchronize_stops_before_statement_start() {
        let mut s = stream(&[
            (TokenKind::Star, "*"),
            (TokenKind::Identifier, "junk"),
            (TokenKind::Let, "let"),
        ]);
        s.synchronize();
        assert_eq!(s.peek().kind, TokenKind::Let);
    }

    #[test]
    fn synchronize_consumes_everything_without_boundary() {
        let mut s = stream(&[
            (TokenKind::Star, "*"),
            (TokenKind::Identifier, "junk"),
            (TokenKind::Identifier, "junk2"),
        ]);
        s.synchronize();
        assert!(s.is_at_end());
    }
}
