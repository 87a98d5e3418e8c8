//! Line protocol helpers for the base controller
//!
//! The controller speaks a textual request/response protocol: one lowercase
//! command per line, one response line per request. Query responses are
//! space-separated integers; mutating commands acknowledge with `ok`.

use crate::error::{Error, Result};

/// Positive acknowledgement line for mutating commands
pub const ACK: &str = "ok";

/// Format a command with arguments as a protocol line
pub fn command_line(parts: &[&str]) -> String {
    let mut line = parts.join(" ");
    line.push('\n');
    line
}

/// Parse a response of exactly `expected` space-separated integers
pub fn parse_ints(line: &str, expected: usize) -> Result<Vec<i32>> {
    let values: Vec<i32> = line
        .split_whitespace()
        .map(|field| {
            field
                .parse::<i32>()
                .map_err(|_| Error::InvalidResponse(format!("bad integer field: {:?}", field)))
        })
        .collect::<Result<_>>()?;

    if values.len() != expected {
        return Err(Error::InvalidResponse(format!(
            "expected {} fields, got {} in {:?}",
            expected,
            values.len(),
            line
        )));
    }
    Ok(values)
}

/// Parse a scan response: space-separated millimeter ranges, converted to
/// meters. An empty line is a valid empty scan.
pub fn parse_ranges_m(line: &str) -> Result<Vec<f32>> {
    line.split_whitespace()
        .map(|field| {
            field
                .parse::<i32>()
                .map(|mm| mm as f32 / 1000.0)
                .map_err(|_| Error::InvalidResponse(format!("bad range field: {:?}", field)))
        })
        .collect()
}

/// Protocol argument for a boolean switch
pub fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}
