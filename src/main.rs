//! TSPP compiler CLI.
//!
//! With no argument the binary starts the REPL; with one `.tspp` path it
//! runs the front-end over that file and prints diagnostics. Exit code 0 on
//! success, 1 on any error.
//!
//! ```text
//! tsppc [OPTIONS] [FILE]
//!
//! Arguments:
//!   [FILE]  Source file to compile (starts the REPL when omitted)
//!
//! Options:
//!       --tokens            Print the token stream
//!       --ast               Print the parsed AST
//!       --emit-llvm <PATH>  Write the trivial backend artifact
//!   -v, --verbose...        Increase log verbosity (-v, -vv)
//!   -q, --quiet             Suppress non-error output
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as ClapParser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use tsppc::diagnostics::{DiagnosticEmitter, DriverError};
use tsppc::{codegen, compile, repl};

/// The TSPP compiler front-end.
#[derive(ClapParser)]
#[command(name = "tsppc")]
#[command(version)]
#[command(about = "The TSPP language compiler front-end", long_about = None)]
struct Cli {
    /// Source file to compile. Starts the REPL when omitted.
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Print the token stream after lexing.
    #[arg(long)]
    tokens: bool,

    /// Print the parsed AST in debug format.
    #[arg(long)]
    ast: bool,

    /// Write the trivial LLVM IR artifact to the given path.
    #[arg(long, value_name = "PATH")]
    emit_llvm: Option<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "tsppc=warn",
        1 => "tsppc=debug",
        _ => "tsppc=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_source(path: &PathBuf) -> Result<String, DriverError> {
    let display = path.display().to_string();

    if path.extension().and_then(|e| e.to_str()) != Some("tspp") {
        return Err(DriverError::BadExtension(display));
    }
    if !path.exists() {
        return Err(DriverError::NotFound(display));
    }

    std::fs::read_to_string(path).map_err(|source| DriverError::Io {
        path: display,
        source,
    })
}

fn run_file(cli: &Cli, path: &PathBuf) -> ExitCode {
    let source = match read_source(path) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("{} {}", "Error:".red(), error);
            return ExitCode::FAILURE;
        }
    };

    let filename = path.display().to_string();
    let result = compile(&source, &filename);

    if cli.tokens {
        for token in &result.tokens {
            println!(
                "{}:{}: {:?} {:?}",
                token.location.line, token.location.column, token.kind, token.lexeme
            );
        }
    }

    if cli.ast {
        println!("{:#?}", result.program);
    }

    let emitter = DiagnosticEmitter::new(&filename, &source);
    emitter.emit_all(&result.reporter);

    if !result.success() {
        if !cli.quiet {
            eprintln!(
                "{} {} error(s) found",
                "Failed:".red(),
                result.reporter.error_count()
            );
        }
        return ExitCode::FAILURE;
    }

    if let Some(output) = &cli.emit_llvm {
        if let Err(error) = codegen::emit_trivial_main(&filename, output) {
            eprintln!("{} could not write {}: {}", "Error:".red(), output.display(), error);
            return ExitCode::FAILURE;
        }
    }

    if !cli.quiet {
        println!("{} {}", "Compiled".green(), filename);
    }
    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.file {
        Some(path) => run_file(&cli, path),
        None => {
            if repl::run() == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
