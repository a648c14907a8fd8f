//! Configuration option lookup.
//!
//! An option value comes from, in descending preference:
//!
//! - the environment variable itself, or
//! - a file whose path is held in the environment variable `<VAR>FILE`
//!   (the usual shape for file-mounted secrets).
//!
//! Empty values count as unset. File contents have trailing whitespace
//! trimmed, since secret files routinely end in a newline.

use std::env;
use std::fs;

/// Look up an option by environment variable name, falling back to the
/// `<VAR>FILE` indirection. Returns `None` when neither yields a value.
pub fn lookup(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| read_from_file_var(name))
}

/// Like [`lookup`], but with a default for unset options.
pub fn get_option(name: &str, default: &str) -> String {
    lookup(name).unwrap_or_else(|| default.to_string())
}

fn read_from_file_var(name: &str) -> Option<String> {
    let path = env::var(format!("{name}FILE")).ok().filter(|v| !v.is_empty())?;
    let contents = fs::read_to_string(&path).ok()?;
    let value = contents.trim_end().to_string();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
