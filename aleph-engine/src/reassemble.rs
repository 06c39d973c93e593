//! Re-inserts the original spacing between processed tokens.

use crate::post_processing::Pipeline;

/// Whitespace layout of a source text: the run before each word plus the tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpacingLayout<'a> {
    leading: Vec<&'a str>,
    trailing: &'a str,
}

impl<'a> SpacingLayout<'a> {
    /// Record the literal whitespace run preceding each whitespace-delimited word.
    pub fn of(text: &'a str) -> Self {
        let mut leading = Vec::new();
        let mut run_start = 0;
        let mut in_word = false;

        for (idx, ch) in text.char_indices() {
            if ch.is_whitespace() {
                if in_word {
                    in_word = false;
                    run_start = idx;
                }
            } else if !in_word {
                in_word = true;
                leading.push(&text[run_start..idx]);
            }
        }

        let trailing = if in_word { "" } else { &text[run_start..] };

        Self { leading, trailing }
    }

    pub fn word_count(&self) -> usize {
        self.leading.len()
    }

    pub fn leading(&self) -> &[&'a str] {
        &self.leading
    }

    pub fn trailing(&self) -> &'a str {
        self.trailing
    }
}

/// Join processed tokens using the whitespace of `original`, then normalize.
///
/// Token `i` is preceded by the whitespace run that preceded word `i` in the
/// original. Tokens beyond the original word count are separated by a single
/// space. The trailing run of the original is re-emitted at the end.
pub fn reassemble<S: AsRef<str>>(original: &str, tokens: &[S]) -> String {
    if tokens.is_empty() {
        return String::new();
    }

    let layout = SpacingLayout::of(original);
    let capacity = original.len() + tokens.iter().map(|t| t.as_ref().len()).sum::<usize>();
    let mut joined = String::with_capacity(capacity);

    for (idx, token) in tokens.iter().enumerate() {
        match layout.leading().get(idx) {
            Some(run) => joined.push_str(run),
            None if idx > 0 => joined.push(' '),
            None => {}
        }
        joined.push_str(token.as_ref());
    }
    joined.push_str(layout.trailing());

    Pipeline::for_display().process(&joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use unicode_normalization::is_nfc;

    #[test]
    fn test_layout_records_runs() {
        let layout = SpacingLayout::of("  אב \t גד\n");
        assert_eq!(layout.leading(), &["  ", " \t "]);
        assert_eq!(layout.trailing(), "\n");
        assert_eq!(layout.word_count(), 2);
    }

    #[test]
    fn test_layout_without_whitespace() {
        let layout = SpacingLayout::of("שלום");
        assert_eq!(layout.leading(), &[""]);
        assert_eq!(layout.trailing(), "");
    }

    #[test]
    fn test_preserves_every_whitespace_run() {
        let original = " א  ב\t\tג \n ד   ";
        let tokens = ["1", "2", "3", "4"];
        assert_eq!(reassemble(original, &tokens), " 1  2\t\t3 \n 4   ");
    }

    #[test]
    fn test_single_space_round_trip() {
        let result = reassemble("שלום עולם", &["שָׁלוֹם", "עוֹלָם"]);
        assert_eq!(result, "שָׁלוֹם עוֹלָם");
        assert_eq!(result.matches(' ').count(), 1);
        assert!(is_nfc(&result));
    }

    #[test]
    fn test_extra_tokens_get_single_space() {
        assert_eq!(reassemble("א  ב", &["1", "2", "3"]), "1  2 3");
    }

    #[test]
    fn test_missing_tokens_keep_trailing_run() {
        assert_eq!(reassemble("א ב ג ", &["1"]), "1 ");
    }

    #[test]
    fn test_output_is_nfc() {
        // shin dot before qamats is not canonical order
        let result = reassemble("ש", &["\u{05E9}\u{05C1}\u{05B8}"]);
        assert_eq!(result, "\u{05E9}\u{05B8}\u{05C1}");
        assert!(is_nfc(&result));
    }

    #[test]
    fn test_no_tokens() {
        let tokens: [&str; 0] = [];
        assert_eq!(reassemble("שלום", &tokens), "");
    }
}
