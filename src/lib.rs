//! # TSPP Compiler Library
//!
//! The compiler front-end for TSPP, a TypeScript-flavoured systems language
//! with explicit storage classes, raw and smart pointers, references, union
//! types, generics with constraints, classes, structured exceptions, inline
//! assembly, and compile-time operators.
//!
//! ## Pipeline
//!
//! ```text
//! Source -> Lexer -> TokenStream -> Parser -> AST -> Type Check
//! ```
//!
//! Every phase reports into one shared [`ErrorReporter`]; the pipeline always
//! runs to the end of the input so a single file surfaces as many errors as
//! possible. The result is a success exactly when no error-severity
//! diagnostic was recorded.
//!
//! ## Quick start
//!
//! ```rust
//! let result = tsppc::compile("let x: int = 42;", "demo.tspp");
//! assert!(result.success());
//! assert_eq!(result.program.items.len(), 1);
//! ```
//!
//! Errors stay in the result's reporter:
//!
//! ```rust
//! let result = tsppc::compile("const k: int;", "demo.tspp");
//! assert!(!result.success());
//! assert_eq!(result.reporter.error_count(), 1);
//! ```
//!
//! ## Module overview
//!
//! - [`span`] — source locations
//! - [`diagnostics`] — diagnostic collection and rendering
//! - [`lexer`] — tokenization, semicolon insertion, lexical recovery
//! - [`token_stream`] — cursor with lookahead and panic-mode recovery
//! - [`ast`] — the syntax tree
//! - [`parser`] — recursive-descent / Pratt parsing
//! - [`typeck`] — resolved types, scopes, and the two-pass checker
//! - [`codegen`] — the trivial backend artifact
//! - [`repl`] — the interactive loop

pub mod ast;
pub mod codegen;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod span;
pub mod token_stream;
pub mod typeck;

pub use diagnostics::{Diagnostic, DiagnosticEmitter, ErrorReporter, Severity};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;
pub use span::SourceLocation;
pub use token_stream::TokenStream;
pub use typeck::TypeChecker;

use ast::Program;

/// Everything one pipeline run produces.
///
/// The token vector and AST are always present — even a failing run builds
/// as much tree as it can — and the reporter holds every diagnostic in
/// discovery order: lexer errors, then parser errors, then checker errors
/// for any given region.
pub struct Compilation {
    pub tokens: Vec<Token>,
    pub program: Program,
    pub reporter: ErrorReporter,
}

impl Compilation {
    /// Whether the run produced no error-severity diagnostics.
    pub fn success(&self) -> bool {
        !self.reporter.has_errors()
    }
}

/// Run the whole front-end over one source string.
pub fn compile(source: &str, filename: &str) -> Compilation {
    let mut reporter = ErrorReporter::new();

    let span = tracing::debug_span!("compile", file = filename);
    let _enter = span.enter();

    tracing::debug!("lexing");
    let tokens = Lexer::new(source, filename, &mut reporter).tokenize();
    tracing::debug!(tokens = tokens.len(), "lexed");

    let (program, interner) = {
        let mut parser = Parser::new(tokens.clone(), &mut reporter);
        let program = parser.parse_program();
        let interner = parser.take_interner();
        (program, interner)
    };
    tracing::debug!(items = program.items.len(), "parsed");

    typeck::check_program(&program, interner, &mut reporter);
    tracing::debug!(errors = reporter.error_count(), "checked");

    Compilation {
        tokens,
        program,
        reporter,
    }
}
