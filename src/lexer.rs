//! Lexical analysis for TSPP.
//!
//! This module tokenizes TSPP source code into a stream of tokens. It handles
//! all lexical elements of the language:
//!
//! - Keywords and identifiers
//! - Number literals (integer and decimal forms, optional exponent)
//! - String and character literals with escape sequences
//! - `#attribute` tokens (storage classes, modifiers, smart pointers, `#asm`)
//! - Operators and punctuation, longest match first
//! - Comments (line and block)
//! - Automatic semicolon insertion at statement-ending newlines
//!
//! The lexer is a stateful character scanner rather than a table-driven
//! automaton: semicolon insertion consults the previously emitted token and
//! the next non-blank character, and statement-per-line checking tracks the
//! line of the last statement-starting keyword.
//!
//! # Example
//!
//! ```rust
//! use tsppc::diagnostics::ErrorReporter;
//! use tsppc::lexer::{Lexer, TokenKind};
//!
//! let mut reporter = ErrorReporter::new();
//! let tokens = Lexer::new("let x = 42;", "demo.tspp", &mut reporter).tokenize();
//!
//! assert_eq!(tokens[0].kind, TokenKind::Let);
//! assert_eq!(tokens[1].kind, TokenKind::Identifier);
//! assert_eq!(tokens[2].kind, TokenKind::Eq);
//! assert_eq!(tokens[3].kind, TokenKind::NumberLiteral);
//! assert_eq!(tokens[4].kind, TokenKind::Semicolon);
//! assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
//! ```

use crate::diagnostics::ErrorReporter;
use crate::span::SourceLocation;
use std::sync::Arc;

/// Token kinds for the TSPP lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // ============================================================
    // Declaration keywords
    // ============================================================
    Let,
    Const,
    Function,
    Class,
    Interface,
    Enum,
    Constructor,
    Get,
    Set,

    // ============================================================
    // Type keywords
    // ============================================================
    Void,
    Int,
    Float,
    Boolean,
    StringType,

    // ============================================================
    // Control-flow keywords
    // ============================================================
    If,
    Else,
    Switch,
    Case,
    Default,
    While,
    Do,
    For,
    Of,
    Return,
    Break,
    Continue,
    Try,
    Catch,
    Finally,
    Throw,
    Throws,

    // ============================================================
    // Class-related keywords and access modifiers
    // ============================================================
    Extends,
    Implements,
    Public,
    Private,
    Protected,
    This,
    New,

    // ============================================================
    // Expression keywords
    // ============================================================
    Cast,
    Sizeof,
    Alignof,
    Typeof,
    Constexpr,

    // ============================================================
    // Parameter and constraint keywords
    // ============================================================
    Ref,
    Where,

    // ============================================================
    // Literals
    // ============================================================
    NumberLiteral,
    StringLiteral,
    CharLiteral,
    True,
    False,
    Null,
    Undefined,

    // ============================================================
    // Arithmetic operators
    // ============================================================
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // ============================================================
    // Bitwise operators
    // ============================================================
    And,
    Or,
    Caret,
    Tilde,
    Shl,
    Shr,
    Ushr,

    // ============================================================
    // Logical operators
    // ============================================================
    AndAnd,
    OrOr,
    Not,

    // ============================================================
    // Comparison operators
    // ============================================================
    EqEq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,

    // ============================================================
    // Assignment operators
    // ============================================================
    Eq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    AndEq,
    OrEq,
    CaretEq,
    ShlEq,
    ShrEq,
    UshrEq,

    // ============================================================
    // Increment / decrement
    // ============================================================
    PlusPlus,
    MinusMinus,

    // ============================================================
    // Delimiters
    // ============================================================
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Colon,
    Semicolon,
    Question,
    At,
    /// `->`, used in function type expressions.
    Arrow,

    // ============================================================
    // Identifiers and attributes (`#identifier`, lexeme keeps the `#`)
    // ============================================================
    Identifier,
    Attribute,

    // ============================================================
    // Sentinels
    // ============================================================
    Error,
    Eof,
}

impl TokenKind {
    /// Keywords that introduce a declaration.
    pub fn is_declaration(self) -> bool {
        matches!(
            self,
            TokenKind::Let
                | TokenKind::Const
                | TokenKind::Function
                | TokenKind::Class
                | TokenKind::Interface
                | TokenKind::Enum
                | TokenKind::Constructor
                | TokenKind::Get
                | TokenKind::Set
        )
    }

    /// Primitive type keywords.
    pub fn is_type(self) -> bool {
        matches!(
            self,
            TokenKind::Void
                | TokenKind::Int
                | TokenKind::Float
                | TokenKind::Boolean
                | TokenKind::StringType
        )
    }

    /// Control-flow keywords.
    pub fn is_control_flow(self) -> bool {
        matches!(
            self,
            TokenKind::If
                | TokenKind::Else
                | TokenKind::Switch
                | TokenKind::Case
                | TokenKind::Default
                | TokenKind::While
                | TokenKind::Do
                | TokenKind::For
                | TokenKind::Of
                | TokenKind::Return
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Try
                | TokenKind::Catch
                | TokenKind::Finally
                | TokenKind::Throw
                | TokenKind::Throws
        )
    }

    /// Keywords that only appear in or around class bodies.
    pub fn is_class_related(self) -> bool {
        matches!(
            self,
            TokenKind::Class
                | TokenKind::Interface
                | TokenKind::Extends
                | TokenKind::Implements
                | TokenKind::Constructor
                | TokenKind::Get
                | TokenKind::Set
                | TokenKind::This
                | TokenKind::Public
                | TokenKind::Private
                | TokenKind::Protected
        )
    }

    /// Member access modifiers.
    pub fn is_access_modifier(self) -> bool {
        matches!(
            self,
            TokenKind::Public | TokenKind::Private | TokenKind::Protected
        )
    }

    /// Compile-time operator keywords.
    pub fn is_compile_time(self) -> bool {
        matches!(
            self,
            TokenKind::Sizeof | TokenKind::Alignof | TokenKind::Typeof | TokenKind::Constexpr
        )
    }

    /// Any operator token.
    pub fn is_operator(self) -> bool {
        self.is_arithmetic_operator()
            || self.is_bitwise_operator()
            || self.is_logical_operator()
            || self.is_comparison_operator()
            || self.is_assignment_operator()
            || matches!(
                self,
                TokenKind::PlusPlus | TokenKind::MinusMinus | TokenKind::At | TokenKind::Question
            )
    }

    pub fn is_arithmetic_operator(self) -> bool {
        matches!(
            self,
            TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Star
                | TokenKind::Slash
                | TokenKind::Percent
        )
    }

    pub fn is_bitwise_operator(self) -> bool {
        matches!(
            self,
            TokenKind::And
                | TokenKind::Or
                | TokenKind::Caret
                | TokenKind::Tilde
                | TokenKind::Shl
                | TokenKind::Shr
                | TokenKind::Ushr
        )
    }

    pub fn is_logical_operator(self) -> bool {
        matches!(self, TokenKind::AndAnd | TokenKind::OrOr | TokenKind::Not)
    }

    pub fn is_comparison_operator(self) -> bool {
        matches!(
            self,
            TokenKind::EqEq
                | TokenKind::NotEq
                | TokenKind::Lt
                | TokenKind::Gt
                | TokenKind::LtEq
                | TokenKind::GtEq
        )
    }

    pub fn is_assignment_operator(self) -> bool {
        matches!(
            self,
            TokenKind::Eq
                | TokenKind::PlusEq
                | TokenKind::MinusEq
                | TokenKind::StarEq
                | TokenKind::SlashEq
                | TokenKind::PercentEq
                | TokenKind::AndEq
                | TokenKind::OrEq
                | TokenKind::CaretEq
                | TokenKind::ShlEq
                | TokenKind::ShrEq
                | TokenKind::UshrEq
        )
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::NumberLiteral
                | TokenKind::StringLiteral
                | TokenKind::CharLiteral
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
                | TokenKind::Undefined
        )
    }

    pub fn is_delimiter(self) -> bool {
        matches!(
            self,
            TokenKind::LParen
                | TokenKind::RParen
                | TokenKind::LBrace
                | TokenKind::RBrace
                | TokenKind::LBracket
                | TokenKind::RBracket
                | TokenKind::Comma
                | TokenKind::Dot
                | TokenKind::Colon
                | TokenKind::Semicolon
        )
    }

    /// Keywords that begin a new statement. Both the multi-statement-per-line
    /// check and semicolon insertion consult this set.
    pub fn is_statement_start(self) -> bool {
        matches!(
            self,
            TokenKind::Let
                | TokenKind::Const
                | TokenKind::Function
                | TokenKind::Return
                | TokenKind::If
                | TokenKind::For
                | TokenKind::While
        )
    }

    /// Human-readable description used in diagnostics.
    pub fn description(self) -> &'static str {
        match self {
            TokenKind::Let => "keyword `let`",
            TokenKind::Const => "keyword `const`",
            TokenKind::Function => "keyword `function`",
            TokenKind::Class => "keyword `class`",
            TokenKind::Interface => "keyword `interface`",
            TokenKind::Enum => "keyword `enum`",
            TokenKind::Constructor => "keyword `constructor`",
            TokenKind::Get => "keyword `get`",
            TokenKind::Set => "keyword `set`",
            TokenKind::Void => "type `void`",
            TokenKind::Int => "type `int`",
            TokenKind::Float => "type `float`",
            TokenKind::Boolean => "type `boolean`",
            TokenKind::StringType => "type `string`",
            TokenKind::If => "keyword `if`",
            TokenKind::Else => "keyword `else`",
            TokenKind::Switch => "keyword `switch`",
            TokenKind::Case => "keyword `case`",
            TokenKind::Default => "keyword `default`",
            TokenKind::While => "keyword `while`",
            TokenKind::Do => "keyword `do`",
            TokenKind::For => "keyword `for`",
            TokenKind::Of => "keyword `of`",
            TokenKind::Return => "keyword `return`",
            TokenKind::Break => "keyword `break`",
            TokenKind::Continue => "keyword `continue`",
            TokenKind::Try => "keyword `try`",
            TokenKind::Catch => "keyword `catch`",
            TokenKind::Finally => "keyword `finally`",
            TokenKind::Throw => "keyword `throw`",
            TokenKind::Throws => "keyword `throws`",
            TokenKind::Extends => "keyword `extends`",
            TokenKind::Implements => "keyword `implements`",
            TokenKind::Public => "keyword `public`",
            TokenKind::Private => "keyword `private`",
            TokenKind::Protected => "keyword `protected`",
            TokenKind::This => "keyword `this`",
            TokenKind::New => "keyword `new`",
            TokenKind::Cast => "keyword `cast`",
            TokenKind::Sizeof => "keyword `sizeof`",
            TokenKind::Alignof => "keyword `alignof`",
            TokenKind::Typeof => "keyword `typeof`",
            TokenKind::Constexpr => "keyword `constexpr`",
            TokenKind::Ref => "keyword `ref`",
            TokenKind::Where => "keyword `where`",
            TokenKind::NumberLiteral => "number literal",
            TokenKind::StringLiteral => "string literal",
            TokenKind::CharLiteral => "character literal",
            TokenKind::True => "`true`",
            TokenKind::False => "`false`",
            TokenKind::Null => "`null`",
            TokenKind::Undefined => "`undefined`",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::Percent => "`%`",
            TokenKind::And => "`&`",
            TokenKind::Or => "`|`",
            TokenKind::Caret => "`^`",
            TokenKind::Tilde => "`~`",
            TokenKind::Shl => "`<<`",
            TokenKind::Shr => "`>>`",
            TokenKind::Ushr => "`>>>`",
            TokenKind::AndAnd => "`&&`",
            TokenKind::OrOr => "`||`",
            TokenKind::Not => "`!`",
            TokenKind::EqEq => "`==`",
            TokenKind::NotEq => "`!=`",
            TokenKind::Lt => "`<`",
            TokenKind::Gt => "`>`",
            TokenKind::LtEq => "`<=`",
            TokenKind::GtEq => "`>=`",
            TokenKind::Eq => "`=`",
            TokenKind::PlusEq => "`+=`",
            TokenKind::MinusEq => "`-=`",
            TokenKind::StarEq => "`*=`",
            TokenKind::SlashEq => "`/=`",
            TokenKind::PercentEq => "`%=`",
            TokenKind::AndEq => "`&=`",
            TokenKind::OrEq => "`|=`",
            TokenKind::CaretEq => "`^=`",
            TokenKind::ShlEq => "`<<=`",
            TokenKind::ShrEq => "`>>=`",
            TokenKind::UshrEq => "`>>>=`",
            TokenKind::PlusPlus => "`++`",
            TokenKind::MinusMinus => "`--`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::Comma => "`,`",
            TokenKind::Dot => "`.`",
            TokenKind::Colon => "`:`",
            TokenKind::Semicolon => "`;`",
            TokenKind::Question => "`?`",
            TokenKind::At => "`@`",
            TokenKind::Arrow => "`->`",
            TokenKind::Attribute => "attribute",
            TokenKind::Identifier => "identifier",
            TokenKind::Error => "error",
            TokenKind::Eof => "end of file",
        }
    }
}

/// Reserved word lookup. Returns `None` for plain identifiers.
fn keyword_kind(word: &str) -> Option<TokenKind> {
    Some(match word {
        "let" => TokenKind::Let,
        "const" => TokenKind::Const,
        "function" => TokenKind::Function,
        "class" => TokenKind::Class,
        "interface" => TokenKind::Interface,
        "enum" => TokenKind::Enum,
        "constructor" => TokenKind::Constructor,
        "get" => TokenKind::Get,
        "set" => TokenKind::Set,
        "void" => TokenKind::Void,
        "int" => TokenKind::Int,
        "float" => TokenKind::Float,
        "boolean" => TokenKind::Boolean,
        "string" => TokenKind::StringType,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "switch" => TokenKind::Switch,
        "case" => TokenKind::Case,
        "default" => TokenKind::Default,
        "while" => TokenKind::While,
        "do" => TokenKind::Do,
        "for" => TokenKind::For,
        "of" => TokenKind::Of,
        "return" => TokenKind::Return,
        "break" => TokenKind::Break,
        "continue" => TokenKind::Continue,
        "try" => TokenKind::Try,
        "catch" => TokenKind::Catch,
        "finally" => TokenKind::Finally,
        "throw" => TokenKind::Throw,
        "throws" => TokenKind::Throws,
        "extends" => TokenKind::Extends,
        "implements" => TokenKind::Implements,
        "public" => TokenKind::Public,
        "private" => TokenKind::Private,
        "protected" => TokenKind::Protected,
        "this" => TokenKind::This,
        "new" => TokenKind::New,
        "cast" => TokenKind::Cast,
        "sizeof" => TokenKind::Sizeof,
        "alignof" => TokenKind::Alignof,
        "typeof" => TokenKind::Typeof,
        "constexpr" => TokenKind::Constexpr,
        "ref" => TokenKind::Ref,
        "where" => TokenKind::Where,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" => TokenKind::Null,
        "undefined" => TokenKind::Undefined,
        _ => return None,
    })
}

/// A token: kind, lexeme, source location, and an error message when the
/// kind is [`TokenKind::Error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub location: SourceLocation,
    pub error: Option<String>,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            location,
            error: None,
        }
    }

    /// Build an error token. Error tokens always carry a non-empty message.
    pub fn error(lexeme: impl Into<String>, location: SourceLocation, message: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Error,
            lexeme: lexeme.into(),
            location,
            error: Some(message.into()),
        }
    }

    pub fn eof(location: SourceLocation) -> Self {
        Self::new(TokenKind::Eof, "", location)
    }

    pub fn is_error(&self) -> bool {
        self.kind == TokenKind::Error
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

/// The TSPP lexer.
///
/// Scans the source character by character, producing a token vector
/// terminated by exactly one [`TokenKind::Eof`]. Errors are reported to the
/// shared [`ErrorReporter`] *and* surfaced as error tokens so the parser can
/// resynchronise on them.
pub struct Lexer<'r> {
    chars: Vec<char>,
    filename: Arc<str>,
    reporter: &'r mut ErrorReporter,
    tokens: Vec<Token>,
    pos: usize,
    line: u32,
    column: u32,
    /// Line of the most recent statement-starting keyword.
    last_statement_line: u32,
    /// Whether a statement has started since the last semicolon.
    statement_started: bool,
}

impl<'r> Lexer<'r> {
    pub fn new(source: &str, filename: &str, reporter: &'r mut ErrorReporter) -> Self {
        Self {
            chars: source.chars().collect(),
            filename: Arc::from(filename),
            reporter,
            tokens: Vec::new(),
            pos: 0,
            line: 1,
            column: 1,
            last_statement_line: 1,
            statement_started: false,
        }
    }

    /// Tokenize the whole source.
    pub fn tokenize(mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.skip_whitespace();
            if !self.is_at_end() {
                self.scan_token();
            }
        }

        // End of input terminates a trailing statement just as a newline
        // would.
        if self.asi_candidate() {
            let location = self.here();
            self.add_token(TokenKind::Semicolon, ";", location);
        }

        let eof_loc = self.here();
        self.tokens.push(Token::eof(eof_loc));
        self.tokens
    }

    // ============================================================
    // Character helpers
    // ============================================================

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn here(&self) -> SourceLocation {
        SourceLocation::new(self.filename.clone(), self.line, self.column)
    }

    // ============================================================
    // Whitespace, comments, and semicolon insertion
    // ============================================================

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' => {
                    self.bump();
                }
                '\n' => {
                    self.maybe_insert_semicolon();
                    self.bump();
                }
                '/' if self.peek_at(1) == Some('/') => {
                    // Line comment runs to (but not past) the newline, so the
                    // newline itself still drives semicolon insertion.
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                '/' if self.peek_at(1) == Some('*') => {
                    self.skip_block_comment();
                }
                _ => break,
            }
        }
    }

    fn skip_block_comment(&mut self) {
        let start = self.here();
        self.bump(); // /
        self.bump(); // *
        loop {
            match self.peek() {
                Some('*') if self.peek_at(1) == Some('/') => {
                    self.bump();
                    self.bump();
                    return;
                }
                Some(_) => {
                    self.bump();
                }
                None => {
                    self.report_error_at(start, "Unterminated block comment", "");
                    return;
                }
            }
        }
    }

    /// Whether the last emitted token can end a statement that a synthetic
    /// semicolon would terminate. After a semicolon nothing is needed;
    /// braces, case labels, and commas never take a terminator.
    fn asi_candidate(&self) -> bool {
        match self.tokens.last() {
            None => false,
            Some(token) => !matches!(
                token.kind,
                TokenKind::Semicolon
                    | TokenKind::LBrace
                    | TokenKind::RBrace
                    | TokenKind::Colon
                    | TokenKind::Comma
            ),
        }
    }

    /// Semicolon insertion at a newline. A synthetic `;` is emitted only when
    /// there are previous tokens, the last token can end a statement, and the
    /// next non-blank character either ends the statement context (another
    /// newline, `}`, `;`, end of input) or begins a word that starts a new
    /// statement. The last clause is what lets `let x = 10\nlet y = 20`
    /// parse as two declarations while a multi-line expression is left
    /// alone.
    fn maybe_insert_semicolon(&mut self) {
        if !self.asi_candidate() {
            return;
        }

        let mut next = self.pos + 1;
        while next < self.chars.len() && matches!(self.chars[next], ' ' | '\t') {
            next += 1;
        }

        let insert = match self.chars.get(next) {
            None => true,
            Some('\n') | Some('}') | Some(';') => true,
            Some(c) if c.is_ascii_alphabetic() || *c == '_' => {
                let mut end = next;
                while end < self.chars.len()
                    && (self.chars[end].is_ascii_alphanumeric() || self.chars[end] == '_')
                {
                    end += 1;
                }
                let word: String = self.chars[next..end].iter().collect();
                keyword_kind(&word).is_some_and(TokenKind::is_statement_start)
            }
            Some(_) => false,
        };

        if insert {
            let location = self.here();
            self.add_token(TokenKind::Semicolon, ";", location);
        }
    }

    // ============================================================
    // Token scanning
    // ============================================================

    fn scan_token(&mut self) {
        let location = self.here();
        let c = match self.peek() {
            Some(c) => c,
            None => return,
        };

        if c.is_ascii_digit() {
            self.scan_number(location);
        } else if c.is_ascii_alphabetic() || c == '_' {
            self.scan_identifier(location);
        } else if c == '"' {
            self.scan_string(location);
        } else if c == '\'' {
            self.scan_char(location);
        } else if c == '#' {
            self.scan_attribute(location);
        } else {
            self.scan_operator_or_delimiter(location);
        }
    }

    fn scan_number(&mut self, location: SourceLocation) {
        let mut lexeme = String::new();
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            lexeme.push(self.bump().unwrap());
        }

        if self.peek() == Some('.') && matches!(self.peek_at(1), Some(c) if c.is_ascii_digit()) {
            lexeme.push(self.bump().unwrap());
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                lexeme.push(self.bump().unwrap());
            }
        }

        if matches!(self.peek(), Some('e') | Some('E')) {
            let mut lookahead = 1;
            if matches!(self.peek_at(1), Some('+') | Some('-')) {
                lookahead = 2;
            }
            if matches!(self.peek_at(lookahead), Some(c) if c.is_ascii_digit()) {
                for _ in 0..lookahead {
                    lexeme.push(self.bump().unwrap());
                }
                while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    lexeme.push(self.bump().unwrap());
                }
            } else {
                lexeme.push(self.bump().unwrap());
                self.report_error_at(location, "Invalid number format", lexeme);
                return;
            }
        }

        self.add_token(TokenKind::NumberLiteral, lexeme, location);
    }

    fn scan_identifier(&mut self, location: SourceLocation) {
        let mut word = String::new();
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            word.push(self.bump().unwrap());
        }

        match keyword_kind(&word) {
            Some(kind) => self.add_token(kind, word, location),
            None => self.add_token(TokenKind::Identifier, word, location),
        }
    }

    fn scan_string(&mut self, location: SourceLocation) {
        self.bump(); // opening quote
        let mut value = String::new();

        loop {
            match self.peek() {
                None | Some('\n') => {
                    self.report_error_at(location, "Unterminated string literal", value);
                    return;
                }
                Some('"') => {
                    self.bump();
                    self.add_token(TokenKind::StringLiteral, value, location);
                    return;
                }
                Some('\\') => {
                    self.bump();
                    match self.peek() {
                        Some('n') => {
                            self.bump();
                            value.push('\n');
                        }
                        Some('t') => {
                            self.bump();
                            value.push('\t');
                        }
                        Some('r') => {
                            self.bump();
                            value.push('\r');
                        }
                        Some('\\') => {
                            self.bump();
                            value.push('\\');
                        }
                        Some('"') => {
                            self.bump();
                            value.push('"');
                        }
                        _ => {
                            self.report_error_at(
                                location.clone(),
                                "Invalid escape sequence",
                                value.clone(),
                            );
                            // Skip the rest of the literal so the parser does
                            // not see its tail as code.
                            while let Some(c) = self.peek() {
                                if c == '"' {
                                    self.bump();
                                    break;
                                }
                                if c == '\n' {
                                    break;
                                }
                                self.bump();
                            }
                            return;
                        }
                    }
                }
                Some(c) => {
                    self.bump();
                    value.push(c);
                }
            }
        }
    }

    fn scan_char(&mut self, location: SourceLocation) {
        self.bump(); // opening quote

        let value = match self.peek() {
            None | Some('\n') => {
                self.report_error_at(location, "Unterminated character literal", "");
                return;
            }
            Some('\'') => {
                self.bump();
                self.report_error_at(location, "Empty character literal", "");
                return;
            }
            Some('\\') => {
                self.bump();
                let escaped = match self.peek() {
                    Some('n') => '\n',
                    Some('t') => '\t',
                    Some('r') => '\r',
                    Some('\\') => '\\',
                    Some('\'') => '\'',
                    Some('0') => '\0',
                    _ => {
                        self.report_error_at(location, "Invalid escape sequence", "");
                        while let Some(c) = self.peek() {
                            if c == '\'' {
                                self.bump();
                                break;
                            }
                            if c == '\n' {
                                break;
                            }
                            self.bump();
                        }
                        return;
                    }
                };
                self.bump();
                escaped
            }
            Some(c) => {
                self.bump();
                c
            }
        };

        if self.peek() == Some('\'') {
            self.bump();
            self.add_token(TokenKind::CharLiteral, value.to_string(), location);
        } else {
            self.report_error_at(location, "Unterminated character literal", value.to_string());
        }
    }

    fn scan_attribute(&mut self, location: SourceLocation) {
        self.bump(); // '#'
        if !matches!(self.peek(), Some(c) if c.is_ascii_alphabetic() || c == '_') {
            self.report_error_at(location, "Unexpected character: '#'", "#");
            self.lexical_panic();
            return;
        }

        let mut lexeme = String::from("#");
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            lexeme.push(self.bump().unwrap());
        }
        self.add_token(TokenKind::Attribute, lexeme, location);
    }

    fn scan_operator_or_delimiter(&mut self, location: SourceLocation) {
        let c = self.bump().unwrap();

        // Longest match first for multi-character operators.
        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            '?' => TokenKind::Question,
            '@' => TokenKind::At,
            '~' => TokenKind::Tilde,
            '+' => match self.peek() {
                Some('+') => {
                    self.bump();
                    TokenKind::PlusPlus
                }
                Some('=') => {
                    self.bump();
                    TokenKind::PlusEq
                }
                _ => TokenKind::Plus,
            },
            '-' => match self.peek() {
                Some('-') => {
                    self.bump();
                    TokenKind::MinusMinus
                }
                Some('=') => {
                    self.bump();
                    TokenKind::MinusEq
                }
                Some('>') => {
                    self.bump();
                    TokenKind::Arrow
                }
                _ => TokenKind::Minus,
            },
            '*' => match self.peek() {
                Some('=') => {
                    self.bump();
                    TokenKind::StarEq
                }
                _ => TokenKind::Star,
            },
            '/' => match self.peek() {
                Some('=') => {
                    self.bump();
                    TokenKind::SlashEq
                }
                _ => TokenKind::Slash,
            },
            '%' => match self.peek() {
                Some('=') => {
                    self.bump();
                    TokenKind::PercentEq
                }
                _ => TokenKind::Percent,
            },
            '^' => match self.peek() {
                Some('=') => {
                    self.bump();
                    TokenKind::CaretEq
                }
                _ => TokenKind::Caret,
            },
            '&' => match self.peek() {
                Some('&') => {
                    self.bump();
                    TokenKind::AndAnd
                }
                Some('=') => {
                    self.bump();
                    TokenKind::AndEq
                }
                _ => TokenKind::And,
            },
            '|' => match self.peek() {
                Some('|') => {
                    self.bump();
                    TokenKind::OrOr
                }
                Some('=') => {
                    self.bump();
                    TokenKind::OrEq
                }
                _ => TokenKind::Or,
            },
            '!' => match self.peek() {
                Some('=') => {
                    self.bump();
                    TokenKind::NotEq
                }
                _ => TokenKind::Not,
            },
            '=' => match self.peek() {
                Some('=') => {
                    self.bump();
                    TokenKind::EqEq
                }
                _ => TokenKind::Eq,
            },
            '<' => match self.peek() {
                Some('<') => {
                    self.bump();
                    match self.peek() {
                        Some('=') => {
                            self.bump();
                            TokenKind::ShlEq
                        }
                        _ => TokenKind::Shl,
                    }
                }
                Some('=') => {
                    self.bump();
                    TokenKind::LtEq
                }
                _ => TokenKind::Lt,
            },
            '>' => match self.peek() {
                Some('>') => match self.peek_at(1) {
                    Some('>') => {
                        self.bump();
                        self.bump();
                        match self.peek() {
                            Some('=') => {
                                self.bump();
                                TokenKind::UshrEq
                            }
                            _ => TokenKind::Ushr,
                        }
                    }
                    Some('=') => {
                        self.bump();
                        self.bump();
                        TokenKind::ShrEq
                    }
                    _ => {
                        self.bump();
                        TokenKind::Shr
                    }
                },
                Some('=') => {
                    self.bump();
                    TokenKind::GtEq
                }
                _ => TokenKind::Gt,
            },
            other => {
                self.report_error_at(
                    location,
                    format!("Unexpected character: '{}'", other),
                    other.to_string(),
                );
                self.lexical_panic();
                return;
            }
        };

        let lexeme = self.lexeme_for(kind);
        self.add_token(kind, lexeme, location);
    }

    /// Canonical lexeme for a fixed token kind.
    fn lexeme_for(&self, kind: TokenKind) -> &'static str {
        match kind {
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::Question => "?",
            TokenKind::At => "@",
            TokenKind::Arrow => "->",
            TokenKind::Tilde => "~",
            TokenKind::Plus => "+",
            TokenKind::PlusPlus => "++",
            TokenKind::PlusEq => "+=",
            TokenKind::Minus => "-",
            TokenKind::MinusMinus => "--",
            TokenKind::MinusEq => "-=",
            TokenKind::Star => "*",
            TokenKind::StarEq => "*=",
            TokenKind::Slash => "/",
            TokenKind::SlashEq => "/=",
            TokenKind::Percent => "%",
            TokenKind::PercentEq => "%=",
            TokenKind::Caret => "^",
            TokenKind::CaretEq => "^=",
            TokenKind::And => "&",
            TokenKind::AndAnd => "&&",
            TokenKind::AndEq => "&=",
            TokenKind::Or => "|",
            TokenKind::OrOr => "||",
            TokenKind::OrEq => "|=",
            TokenKind::Not => "!",
            TokenKind::NotEq => "!=",
            TokenKind::Eq => "=",
            TokenKind::EqEq => "==",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Shl => "<<",
            TokenKind::ShlEq => "<<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::Shr => ">>",
            TokenKind::ShrEq => ">>=",
            TokenKind::Ushr => ">>>",
            TokenKind::UshrEq => ">>>=",
            _ => "",
        }
    }

    // ============================================================
    // Token emission and error recovery
    // ============================================================

    /// Emit a token, enforcing the one-statement-per-line rule for
    /// statement-starting keywords.
    fn add_token(&mut self, kind: TokenKind, lexeme: impl Into<String>, location: SourceLocation) {
        if kind.is_statement_start() {
            let last_is_semi = self
                .tokens
                .last()
                .is_some_and(|t| t.kind == TokenKind::Semicolon);
            if self.statement_started && location.line == self.last_statement_line && !last_is_semi
            {
                self.report_error_at(
                    location,
                    "Multiple statements on one line require explicit semicolons",
                    lexeme,
                );
                self.lexical_panic();
                return;
            }
            self.statement_started = true;
            self.last_statement_line = location.line;
        }

        // A semicolon ends the statement; parentheses and braces open a new
        // statement context (`for (let ...`, `if (c) { return x; }`), so the
        // one-per-line rule only fires on two starters in the same context.
        if matches!(
            kind,
            TokenKind::Semicolon | TokenKind::LParen | TokenKind::LBrace | TokenKind::RBrace
        ) {
            self.statement_started = false;
        }

        self.push_token(kind, lexeme, location);
    }

    fn push_token(&mut self, kind: TokenKind, lexeme: impl Into<String>, location: SourceLocation) {
        self.tokens.push(Token::new(kind, lexeme, location));
    }

    fn report_error_at(
        &mut self,
        location: SourceLocation,
        message: impl Into<String>,
        lexeme: impl Into<String>,
    ) {
        let message = message.into();
        self.reporter.error(location.clone(), message.clone());
        self.tokens.push(Token::error(lexeme, location, message));
    }

    /// Local panic: skip to the next semicolon, newline, or end of input,
    /// then resume scanning.
    fn lexical_panic(&mut self) {
        while let Some(c) = self.peek() {
            self.bump();
            if c == ';' || c == '\n' {
                return;
            }
        }
    }
}
