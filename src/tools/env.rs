//! Environment variable listing.

use std::io::{self, Write};

/// Values longer than this are shortened for display.
pub const MAX_VALUE_LEN: usize = 100;

/// All variables of the current process, sorted by key.
///
/// Variables whose key or value is not valid Unicode are converted lossily.
#[must_use]
pub fn collect_env() -> Vec<(String, String)> {
    let mut vars: Vec<(String, String)> = std::env::vars_os()
        .map(|(k, v)| (k.to_string_lossy().into_owned(), v.to_string_lossy().into_owned()))
        .collect();
    vars.sort();
    vars
}

/// Cut `value` to 97 characters plus `...` when it exceeds 100 characters.
#[must_use]
pub fn truncate_value(value: &str) -> String {
    if value.chars().count() <= MAX_VALUE_LEN {
        return value.to_string();
    }
    let kept: String = value.chars().take(MAX_VALUE_LEN - 3).collect();
    format!("{}...", kept)
}

/// Print `KEY=value` lines and a total.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_env<W: Write>(writer: &mut W, vars: &[(String, String)]) -> io::Result<()> {
    writeln!(writer, "Environment Variables")?;
    writeln!(writer, "{}", "=".repeat(70))?;
    for (key, value) in vars {
        writeln!(writer, "{}={}", key, truncate_value(value))?;
    }
    writeln!(writer)?;
    writeln!(writer, "Total: {} environment variables", vars.len())
}
