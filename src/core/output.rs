//! Unified output formatting utilities for consistent CLI presentation.
//!
//! Every story workflow reports through these functions so that errors,
//! warnings and status lines look the same across commands.
//!
//! # Design Principles
//! - **Consistent color scheme**: Red for errors, yellow for warnings, green for success
//! - **Standardized spacing**: Blank line before status lines

use colored::*;

/// Formats and prints an error message with consistent styling
///
/// # Format
/// ```text
///
/// ✕ Error: <message>
///
/// ```
pub fn print_error(message: &str) {
    println!("\n{} {}\n", "✕ Error:".red(), message.white());
}

/// Formats and prints a non-fatal problem
///
/// # Format
/// ```text
/// ! Warning: <message>
/// ```
pub fn print_warning(message: &str) {
    println!("{} {}", "! Warning:".yellow(), message.white());
}

/// Formats and prints a success message with consistent styling
///
/// # Format
/// ```text
///
/// ✓ <message>
/// ```
pub fn print_success(message: &str) {
    println!("\n{} {}", "✓".green(), message.white());
}

/// Formats and prints an informational message
pub fn print_info(message: &str) {
    println!("\n{}\n", message.white());
}

/// Formats and prints a section header
///
/// # Format
/// ```text
///
/// <header>:
///
/// ```
pub fn print_section_header(header: &str) {
    println!("\n{}:\n", header.white());
}

/// Prints one indented `label value` line, used for plans and summaries
pub fn print_detail(label: &str, value: &str) {
    println!("  {} {}", format!("{label}:").bright_black(), value.blue());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_functions_do_not_panic() {
        print_error("Test error message");
        print_warning("Remote origin not found");
        print_success("Operation completed");
        print_info("Information message");
        print_section_header("Branches");
        print_detail("Source", "origin/develop");
    }
}
