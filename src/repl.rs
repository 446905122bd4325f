//! Interactive line loop over the pipeline.
//!
//! Each submitted line is compiled as its own `<repl>` source; diagnostics
//! print immediately and a short status line follows. State does not carry
//! across lines — the REPL is a front-end probe, not an evaluator.

use crate::compile;
use crate::diagnostics::DiagnosticEmitter;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

const REPL_FILENAME: &str = "<repl>";

fn print_banner() {
    println!("{}", "TSPP front-end REPL".bright_blue());
    println!(
        "{}",
        "Type :help for commands, :quit to exit".bright_blue()
    );
    println!();
}

fn print_help() {
    println!(":help   show this help");
    println!(":quit   exit the REPL");
    println!("Anything else is compiled as TSPP source.");
}

/// Run the REPL until EOF or `:quit`. Returns the process exit code.
pub fn run() -> i32 {
    print_banner();

    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(error) => {
            eprintln!("Error: could not start line editor: {}", error);
            return 1;
        }
    };

    loop {
        match editor.readline("tspp> ") {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(input);

                match input {
                    ":quit" | ":q" => return 0,
                    ":help" => {
                        print_help();
                        continue;
                    }
                    _ => {}
                }

                let result = compile(&line, REPL_FILENAME);
                let emitter = DiagnosticEmitter::new(REPL_FILENAME, &line);
                emitter.emit_all(&result.reporter);

                if result.success() {
                    let summary = format!(
                        "ok: {} token(s), {} item(s)",
                        result.tokens.len().saturating_sub(1),
                        result.program.items.len()
                    );
                    println!("{}", summary.green());
                } else {
                    let summary = format!("{} error(s)", result.reporter.error_count());
                    println!("{}", summary.red());
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return 0,
            Err(error) => {
                eprintln!("Error: {}", error);
                return 1;
            }
        }
    }
}
