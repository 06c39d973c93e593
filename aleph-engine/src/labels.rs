//! User-facing strings: embed titles, bilingual field labels and message copy.

use aleph_types::{ErrorInfo, ErrorKind, Operation, ScriptSet};
use std::time::Duration;

pub const TITLE_VOWELIZE: &str = "הַנּוֹסֵחַ הַמְּנֻוקָּד | Vowelized Text";
pub const TITLE_MORPHOLOGY: &str = "ניתוח דקדוקי | Morphological Analysis";
pub const TITLE_LEMMATIZE: &str = "שורשים ובסיסי מילים | Word Roots & Base Forms";
pub const TITLE_TRANSLATION: &str = "Translation";

pub const FOOTER_NAKDAN: &str = "Powered by Dicta Nakdan • Use /help for more commands";
pub const FOOTER_TRANSLATION: &str = "Powered by Dicta Translate";

pub const DIVIDER: &str = "➖➖➖➖➖";

pub const COLOR_BLUE: u32 = 0x3498db;
pub const COLOR_GREEN: u32 = 0x2ecc71;
pub const COLOR_PURPLE: u32 = 0x9b59b6;

/// Hebrew | English label pair for a word-detail line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label {
    pub hebrew: &'static str,
    pub english: &'static str,
}

impl Label {
    const fn new(hebrew: &'static str, english: &'static str) -> Self {
        Self { hebrew, english }
    }

    /// `**מין | Gender:** value`
    pub fn line(&self, value: &str) -> String {
        format!("**{} | {}:** {}", self.hebrew, self.english, value)
    }
}

pub const VOWELIZED: Label = Label::new("מנוקד", "Vowelized");
pub const BASE_FORM: Label = Label::new("צורת המקור", "Base Form");
pub const PREFIX: Label = Label::new("תחילית", "Prefix");
pub const SUFFIX: Label = Label::new("סופית", "Suffix");
pub const PART_OF_SPEECH: Label = Label::new("חלק דיבור", "Part of Speech");
pub const GENDER: Label = Label::new("מין", "Gender");
pub const NUMBER: Label = Label::new("מספר", "Number");
pub const PERSON: Label = Label::new("גוף", "Person");
pub const STATUS: Label = Label::new("מצב", "Status");
pub const TENSE: Label = Label::new("זמן", "Tense");
pub const BINYAN: Label = Label::new("בניין", "Binyan");
pub const SUFFIX_GENDER: Label = Label::new("מין הסיומת", "Suffix Gender");
pub const SUFFIX_PERSON: Label = Label::new("גוף הסיומת", "Suffix Person");
pub const SUFFIX_NUMBER: Label = Label::new("מספר הסיומת", "Suffix Number");

/// `PAST_TENSE` → `Past Tense`.
pub fn format_feature_value(value: &str) -> String {
    value
        .replace('_', " ")
        .split(' ')
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

pub fn footer_for(operation: Operation) -> &'static str {
    match operation {
        Operation::Translate => FOOTER_TRANSLATION,
        _ => FOOTER_NAKDAN,
    }
}

/// Message shown for a failed invocation, chosen by error kind.
pub fn error_message(error: &ErrorInfo, operation: Operation, max_length: usize) -> String {
    let example = format!("Example: `/{} שלום עולם`", operation.name());
    let body = match error.kind {
        ErrorKind::EmptyInput => format!("Please provide some text. {}", example),
        ErrorKind::TooLong => format!(
            "Text is too long! Please keep it under {} characters.",
            max_length
        ),
        ErrorKind::WrongScript => match operation.required_script() {
            ScriptSet::Hebrew => format!("Please provide Hebrew text. {}", example),
            ScriptSet::HebrewOrLatin => format!("Please provide Hebrew or English text. {}", example),
        },
        ErrorKind::Connection | ErrorKind::InvalidResponse | ErrorKind::ProcessingFailure => {
            format!(
                "Sorry, there was an issue processing your text. Please try again later. ({})",
                error.detail
            )
        }
    };
    format!("❌ {}", body)
}

pub fn cooldown_message(retry_after: Duration) -> String {
    format!(
        "Please wait {:.1} seconds before using this command again.",
        retry_after.as_secs_f64()
    )
}
