//! Strips invisible characters that break chat rendering.

use super::TextProcessor;
use tracing::debug;

/// Removes control, zero-width and bidi-embedding characters.
///
/// Whitespace is always kept so spacing restored by the reassembler survives.
pub struct SanitizationProcessor;

impl TextProcessor for SanitizationProcessor {
    fn process(&self, text: &str) -> String {
        let result = strip_control_chars(text);
        if result.len() != text.len() {
            debug!(
                "Sanitized display text: {} -> {} bytes",
                text.len(),
                result.len()
            );
        }
        result
    }
}

fn strip_control_chars(text: &str) -> String {
    text.chars()
        .filter(|&ch| {
            if ch.is_whitespace() {
                return true;
            }
            // Remove control characters (0x00-0x1F and 0x7F DEL)
            if ch.is_control() {
                return false;
            }
            // Zero-width characters
            if matches!(ch, '\u{200B}'..='\u{200D}' | '\u{FEFF}' | '\u{00AD}') {
                return false;
            }
            // Bidi embeddings and isolates; the chat client handles direction
            if matches!(ch, '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}' | '\u{061C}') {
                return false;
            }
            true
        })
        .collect()
}
