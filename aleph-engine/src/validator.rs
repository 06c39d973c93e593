//! Input checks performed before any network call.

use aleph_types::{ErrorInfo, ErrorKind, ScriptSet};

/// Validate user text against the length limit and the required script set.
///
/// Length is counted in Unicode code points so multi-byte Hebrew is not penalized.
/// Returns `None` when the text may be sent to the service.
pub fn validate(text: &str, max_length: usize, script: ScriptSet) -> Option<ErrorInfo> {
    if text.trim().is_empty() {
        return Some(ErrorInfo::new(ErrorKind::EmptyInput, "Text cannot be empty"));
    }

    let length = text.chars().count();
    if length > max_length {
        return Some(ErrorInfo::new(
            ErrorKind::TooLong,
            format!("Text exceeds maximum length of {} characters", max_length),
        ));
    }

    if !text.chars().any(|ch| script.accepts(ch)) {
        let detail = match script {
            ScriptSet::Hebrew => "Text must contain Hebrew characters",
            ScriptSet::HebrewOrLatin => "Text must contain Hebrew or English characters",
        };
        return Some(ErrorInfo::new(ErrorKind::WrongScript, detail));
    }

    None
}
