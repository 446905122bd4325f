//! Parser for TSPP.
//!
//! A hand-written recursive-descent parser with Pratt parsing for
//! expressions. The parser consumes a [`TokenStream`] and produces the AST
//! defined in [`crate::ast`], reporting every problem to the shared
//! [`ErrorReporter`].
//!
//! # Organisation
//!
//! - `expr` — expression parsing (precedence climbing)
//! - `stmt` — statement parsing
//! - `item` — declaration parsing
//! - `types` — type expression parsing
//!
//! # Error recovery
//!
//! Parser functions never panic and never throw across component
//! boundaries: a failed production reports a diagnostic and returns `None`.
//! The enclosing scan boundary — the top-level loop, a block, a class body,
//! an enum body — decides where to resynchronise, almost always through
//! [`TokenStream::synchronize`]. The parser therefore always consumes the
//! whole token stream and surfaces as many errors as one pass can find.
//!
//! # Example
//!
//! ```rust
//! use tsppc::diagnostics::ErrorReporter;
//! use tsppc::parser::Parser;
//!
//! let mut reporter = ErrorReporter::new();
//! let mut parser = Parser::from_source(
//!     "function add(a: int, b: int): int { return a + b; }",
//!     "demo.tspp",
//!     &mut reporter,
//! );
//! let program = parser.parse_program();
//! assert_eq!(program.items.len(), 1);
//! assert!(!reporter.has_errors());
//! ```

mod expr;
mod item;
mod stmt;
mod types;


use crate::ast::{Item, Name, Program, Symbol};
use crate::diagnostics::ErrorReporter;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::span::SourceLocation;
use crate::token_stream::TokenStream;
use string_interner::DefaultStringInterner;

/// The TSPP parser.
pub struct Parser<'r> {
    /// Cursor over the lexed tokens.
    tokens: TokenStream,
    /// Shared diagnostic sink.
    reporter: &'r mut ErrorReporter,
    /// Interner for every identifier in the AST.
    interner: DefaultStringInterner,
}

impl<'r> Parser<'r> {
    /// Create a parser over an already-lexed token vector.
    ///
    /// Error tokens were reported when the lexer produced them; they are
    /// dropped here so a lexical error surfaces exactly once instead of
    /// echoing as a parse error.
    pub fn new(mut tokens: Vec<Token>, reporter: &'r mut ErrorReporter) -> Self {
        tokens.retain(|t| !t.is_error());
        Self {
            tokens: TokenStream::new(tokens),
            reporter,
            interner: DefaultStringInterner::new(),
        }
    }

    /// Lex `source` and create a parser over the result. Lexer diagnostics
    /// land in `reporter` ahead of any parser diagnostics.
    pub fn from_source(source: &str, filename: &str, reporter: &'r mut ErrorReporter) -> Self {
        let tokens = Lexer::new(source, filename, reporter).tokenize();
        Self::new(tokens, reporter)
    }

    /// Parse a whole compilation unit.
    ///
    /// The AST is returned regardless of errors; callers consult the
    /// reporter for success. Every iteration either yields one item or
    /// reports at least one diagnostic and resynchronises, so the loop
    /// terminates on any input.
    #[must_use = "parsing has no effect if the result is not used"]
    pub fn parse_program(&mut self) -> Program {
        let mut items = Vec::new();

        while !self.tokens.is_at_end() {
            if self.is_declaration_start() {
                match self.parse_declaration() {
                    Some(decl) => items.push(Item::Declaration(decl)),
                    None => self.tokens.synchronize(),
                }
            } else {
                match self.parse_statement() {
                    Some(stmt) => items.push(Item::Statement(stmt)),
                    None => self.tokens.synchronize(),
                }
            }
        }

        Program { items }
    }

    /// Whether the current token begins a declaration rather than a
    /// statement. `#asm` is the one attribute that starts a statement.
    fn is_declaration_start(&self) -> bool {
        let token = self.tokens.peek();
        match token.kind {
            TokenKind::Let
            | TokenKind::Const
            | TokenKind::Function
            | TokenKind::Class
            | TokenKind::Interface
            | TokenKind::Enum
            | TokenKind::Public
            | TokenKind::Private
            | TokenKind::Protected => true,
            TokenKind::Attribute => token.lexeme != "#asm",
            _ => false,
        }
    }

    // ============================================================
    // Token helpers shared by the sub-parsers
    // ============================================================

    fn check(&self, kind: TokenKind) -> bool {
        self.tokens.check(kind)
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        self.tokens.matches(kind)
    }

    fn match_any(&mut self, kinds: &[TokenKind]) -> bool {
        self.tokens.match_any(kinds)
    }

    /// Consume a token of the given kind or report `message`.
    fn consume(&mut self, kind: TokenKind, message: &str) -> bool {
        if self.check(kind) {
            self.tokens.advance();
            return true;
        }
        self.error(message);
        false
    }

    /// Location of the current token.
    fn peek_location(&self) -> SourceLocation {
        self.tokens.peek().location.clone()
    }

    /// Location of the most recently consumed token.
    fn previous_location(&self) -> SourceLocation {
        self.tokens.previous().location.clone()
    }

    /// Report an error at the current token.
    fn error(&mut self, message: impl Into<String>) {
        let location = self.peek_location();
        self.reporter.error(location, message);
    }

    /// Report an error at an explicit location.
    fn error_at(&mut self, location: SourceLocation, message: impl Into<String>) {
        self.reporter.error(location, message);
    }

    fn intern(&mut self, text: &str) -> Symbol {
        self.interner.get_or_intern(text)
    }

    /// Resolve a symbol for diagnostics.
    fn resolve(&self, symbol: Symbol) -> &str {
        self.interner.resolve(symbol).unwrap_or("")
    }

    /// Build a [`Name`] from the most recently consumed token.
    fn name_from_previous(&mut self) -> Name {
        let lexeme = self.tokens.previous().lexeme.clone();
        let location = self.previous_location();
        let symbol = self.intern(&lexeme);
        Name::new(symbol, location)
    }

    /// Take ownership of the interner, e.g. to hand it to the type checker.
    pub fn take_interner(&mut self) -> DefaultStringInterner {
        std::mem::take(&mut self.interner)
    }
}
