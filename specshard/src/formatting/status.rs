//! Status indicators and message formatting.

use owo_colors::OwoColorize;

#[derive(Debug, Clone, Copy)]
enum Status {
    Success,
    Warning,
}

impl Status {
    fn symbol(&self) -> &'static str {
        match self {
            Status::Success => "✓",
            Status::Warning => "⚠",
        }
    }

    fn format(&self, message: &str) -> String {
        match self {
            Status::Success => format!("{} {}", self.symbol().green(), message.green().bold()),
            Status::Warning => format!("{} {}", self.symbol().yellow(), message.yellow().bold()),
        }
    }
}

/// Prints a success message.
pub fn print_success(message: &str) {
    println!("  {}", Status::Success.format(message));
}

/// Prints a warning message.
pub fn print_warning(message: &str) {
    println!("  {}", Status::Warning.format(message));
}
