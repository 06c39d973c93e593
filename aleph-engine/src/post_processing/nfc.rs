use super::TextProcessor;
use unicode_normalization::UnicodeNormalization;

/// Canonical composition (NFC).
///
/// Hebrew points are combining marks; the service may emit them in any order
/// after the base letter. NFC sorts them by combining class so identical
/// vowelizations compare and render identically.
pub struct NfcProcessor;

impl TextProcessor for NfcProcessor {
    fn process(&self, text: &str) -> String {
        text.nfc().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unicode_normalization::is_nfc;

    #[test]
    fn test_reorders_hebrew_points() {
        // shin dot (ccc 24) emitted before qamats (ccc 18)
        let result = NfcProcessor.process("\u{05E9}\u{05C1}\u{05B8}");
        assert_eq!(result, "\u{05E9}\u{05B8}\u{05C1}");
        assert!(is_nfc(&result));
    }

    #[test]
    fn test_dagesh_before_vowel() {
        // dagesh (ccc 21) emitted before qamats (ccc 18)
        let result = NfcProcessor.process("\u{05D1}\u{05BC}\u{05B8}");
        assert_eq!(result, "\u{05D1}\u{05B8}\u{05BC}");
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(NfcProcessor.process("שלום world"), "שלום world");
    }
}
