// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reading command input from a file or stdin.

use std::io::Read;
use std::path::Path;

use serde::de::DeserializeOwned;
use streamline_core::error::StreamlineError;

/// Reads `path`, or all of stdin when no path (or `-`) is given.
pub fn read_text(path: Option<&Path>) -> Result<String, StreamlineError> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path).map_err(|e| {
            StreamlineError::Internal(format!("cannot read {}: {e}", path.display()))
        }),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| StreamlineError::Internal(format!("cannot read stdin: {e}")))?;
            Ok(buf)
        }
    }
}

/// Reads and parses a JSON document.
pub fn read_json<T: DeserializeOwned>(path: Option<&Path>) -> Result<T, StreamlineError> {
    let text = read_text(path)?;
    serde_json::from_str(&text)
        .map_err(|e| StreamlineError::Internal(format!("invalid JSON input: {e}")))
}

/// Pretty-prints a value as JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), StreamlineError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| StreamlineError::Internal(format!("cannot serialize output: {e}")))?;
    println!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_json_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"a\": 1}}").unwrap();
        let value: serde_json::Value = read_json(Some(file.path())).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = read_text(Some(Path::new("/nonexistent/input.md"))).unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }
}
