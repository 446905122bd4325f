//! Backend stub.
//!
//! The front-end's only obligation to the backend is a trivial artifact: the
//! textual LLVM IR of an empty `main`. Real code generation lives outside
//! this crate.

use std::io;
use std::path::Path;

/// Textual LLVM IR for a module whose `main` returns 0.
pub fn trivial_main_module(module_name: &str) -> String {
    format!(
        "; ModuleID = '{name}'\nsource_filename = \"{name}\"\n\ndefine i32 @main() {{\nentry:\n  ret i32 0\n}}\n",
        name = module_name
    )
}

/// Write the trivial module to `path`.
pub fn emit_trivial_main(module_name: &str, path: &Path) -> io::Result<()> {
    std::fs::write(path, trivial_main_module(module_name))
}
