//! Command implementations for style-cli

pub mod apply;
pub mod extract;

pub use apply::run_apply;
pub use extract::run_extract;

use colored::Colorize;
use style_blocks::Diagnostic;

/// Print recoverable problems under a heading, one per line.
pub(crate) fn print_diagnostics(heading: &str, diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    println!();
    println!("{}", heading.yellow().bold());
    for diagnostic in diagnostics {
        println!("  {} {}", "!".yellow(), diagnostic);
    }
}
