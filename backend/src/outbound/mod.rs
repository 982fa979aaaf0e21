//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: subscription store backed by PostgreSQL (Diesel) or an
//!   in-memory map
//! - **covid**: reqwest clients for the case history, stringency, and country
//!   lookup providers, plus the diagnostics probe
//! - **webhook**: reqwest dispatcher posting fired notifications
//!
//! Adapters translate between domain types and wire representations. They
//! contain no business logic.

pub mod covid;
pub mod persistence;
pub mod webhook;

/// Whitespace-compacted prefix of a response body for error messages.
pub(crate) fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
