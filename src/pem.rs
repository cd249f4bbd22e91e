//! PEM text helpers.
//!
//! Inventory records carry the bare base64 body of a certificate: no
//! `BEGIN`/`END` anchor lines, no carriage returns, no leading or trailing
//! newlines. Imports go the other way and need anchored, 64-column PEM.

use crate::{OrchestratorError, Result};

/// Certificate `BEGIN` anchor line.
pub const BEGIN_CERTIFICATE: &str = "-----BEGIN CERTIFICATE-----";

/// Certificate `END` anchor line.
pub const END_CERTIFICATE: &str = "-----END CERTIFICATE-----";

const LINE_WIDTH: usize = 64;

/// Strips certificate anchors and carriage returns from `pem`.
///
/// Idempotent: stripping an already-stripped body returns it unchanged.
///
/// ```
/// use acm_orchestrator::pem::strip_anchors;
///
/// let pem = "-----BEGIN CERTIFICATE-----\r\nMIIB\r\n-----END CERTIFICATE-----\r\n";
/// assert_eq!(strip_anchors(pem), "MIIB");
/// assert_eq!(strip_anchors("MIIB"), "MIIB");
/// ```
pub fn strip_anchors(pem: &str) -> String {
    pem.replace('\r', "")
        .replace(BEGIN_CERTIFICATE, "")
        .replace(END_CERTIFICATE, "")
        .trim()
        .to_string()
}

/// Re-flows base64 text into lines of 64 characters.
///
/// # Errors
///
/// Returns [`OrchestratorError::Configuration`] if `body` holds anything
/// other than base64 characters and whitespace.
pub fn wrap_base64(body: &str) -> Result<String> {
    let mut compact = String::with_capacity(body.len());
    for c in body.chars().filter(|c| !c.is_whitespace()) {
        if !is_base64(c) {
            return Err(OrchestratorError::Configuration(format!(
                "certificate body contains non-base64 character {:?}",
                c
            )));
        }
        compact.push(c);
    }

    Ok(compact
        .as_bytes()
        .chunks(LINE_WIDTH)
        .map(|chunk| chunk.iter().map(|&b| char::from(b)).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n"))
}

fn is_base64(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=')
}

/// Returns `text` as anchored certificate PEM.
///
/// Text that already carries a `BEGIN` anchor is only cleaned of carriage
/// returns; a bare base64 body is wrapped and anchored.
///
/// # Errors
///
/// Returns [`OrchestratorError::Configuration`] for a bare body that is not
/// base64.
pub fn ensure_pem(text: &str) -> Result<String> {
    if text.contains(BEGIN_CERTIFICATE) {
        return Ok(text.replace('\r', "").trim().to_string());
    }

    Ok(format!(
        "{}\n{}\n{}",
        BEGIN_CERTIFICATE,
        wrap_base64(text)?,
        END_CERTIFICATE
    ))
}
