//! Shared data model for the Hebrew linguistics bot.
//!
//! A [`ProcessingRequest`] is consumed to produce exactly one [`ProcessingResult`].
//! Nothing here is mutated after construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default maximum input length in code points.
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 500;
/// Default per-call network timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Returns true when `ch` lies in the Hebrew block (U+0590..=U+05FF).
pub fn is_hebrew_char(ch: char) -> bool {
    ('\u{0590}'..='\u{05FF}').contains(&ch)
}

/// Returns true when `text` contains at least one Hebrew code point.
pub fn contains_hebrew(text: &str) -> bool {
    text.chars().any(is_hebrew_char)
}

/// Linguistic operation requested by a chat command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Vowelize,
    Analyze,
    Lemmatize,
    Translate,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Vowelize,
        Operation::Analyze,
        Operation::Lemmatize,
        Operation::Translate,
    ];

    /// Command name as typed by users.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Vowelize => "vowelize",
            Operation::Analyze => "analyze",
            Operation::Lemmatize => "lemmatize",
            Operation::Translate => "translate",
        }
    }

    /// Scripts the input text must contain for this operation.
    pub fn required_script(&self) -> ScriptSet {
        match self {
            Operation::Translate => ScriptSet::HebrewOrLatin,
            _ => ScriptSet::Hebrew,
        }
    }

    /// Whether the operation produces per-word detail.
    pub fn has_word_detail(&self) -> bool {
        matches!(self, Operation::Analyze | Operation::Lemmatize)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseOptionError::new("operation", s))
    }
}

/// Set of scripts accepted by the input validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptSet {
    Hebrew,
    HebrewOrLatin,
}

impl ScriptSet {
    pub fn accepts(&self, ch: char) -> bool {
        match self {
            ScriptSet::Hebrew => is_hebrew_char(ch),
            ScriptSet::HebrewOrLatin => is_hebrew_char(ch) || ch.is_ascii_alphabetic(),
        }
    }
}

/// Translation direction as a source→target script pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TranslationDirection {
    #[serde(rename = "he-en")]
    HebrewToEnglish,
    #[serde(rename = "en-he")]
    EnglishToHebrew,
}

impl TranslationDirection {
    /// Hebrew text translates to English, anything else to Hebrew.
    pub fn detect(text: &str) -> Self {
        if contains_hebrew(text) {
            TranslationDirection::HebrewToEnglish
        } else {
            TranslationDirection::EnglishToHebrew
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TranslationDirection::HebrewToEnglish => "he-en",
            TranslationDirection::EnglishToHebrew => "en-he",
        }
    }
}

impl fmt::Display for TranslationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TranslationDirection {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "he-en" | "he2en" => Ok(TranslationDirection::HebrewToEnglish),
            "en-he" | "en2he" => Ok(TranslationDirection::EnglishToHebrew),
            _ => Err(ParseOptionError::new("direction", s)),
        }
    }
}

/// Register of the translation output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TranslationGenre {
    #[default]
    ModernFancy,
    ModernFormal,
    ModernColloquial,
    Biblical,
    Technical,
    Legal,
}

impl TranslationGenre {
    pub const ALL: [TranslationGenre; 6] = [
        TranslationGenre::ModernFancy,
        TranslationGenre::ModernFormal,
        TranslationGenre::ModernColloquial,
        TranslationGenre::Biblical,
        TranslationGenre::Technical,
        TranslationGenre::Legal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TranslationGenre::ModernFancy => "modern-fancy",
            TranslationGenre::ModernFormal => "modern-formal",
            TranslationGenre::ModernColloquial => "modern-colloquial",
            TranslationGenre::Biblical => "biblical",
            TranslationGenre::Technical => "technical",
            TranslationGenre::Legal => "legal",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TranslationGenre::ModernFancy => "Standard modern translation style",
            TranslationGenre::ModernFormal => "Formal/professional translation style",
            TranslationGenre::ModernColloquial => "Casual/conversational style",
            TranslationGenre::Biblical => "Biblical/archaic style translation",
            TranslationGenre::Technical => "Technical/scientific translation style",
            TranslationGenre::Legal => "Legal/official document style",
        }
    }
}

impl fmt::Display for TranslationGenre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TranslationGenre {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        if wanted == "modern" {
            return Ok(TranslationGenre::ModernFancy);
        }
        TranslationGenre::ALL
            .into_iter()
            .find(|genre| genre.as_str() == wanted)
            .ok_or_else(|| ParseOptionError::new("translation genre", s))
    }
}

/// Text genre hint for vowelization and morphological analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisGenre {
    #[default]
    Modern,
    Biblical,
    Mishnaic,
    Poetic,
}

impl AnalysisGenre {
    pub const ALL: [AnalysisGenre; 4] = [
        AnalysisGenre::Modern,
        AnalysisGenre::Biblical,
        AnalysisGenre::Mishnaic,
        AnalysisGenre::Poetic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisGenre::Modern => "modern",
            AnalysisGenre::Biblical => "biblical",
            AnalysisGenre::Mishnaic => "mishnaic",
            AnalysisGenre::Poetic => "poetic",
        }
    }
}

impl fmt::Display for AnalysisGenre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisGenre {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        AnalysisGenre::ALL
            .into_iter()
            .find(|genre| genre.as_str() == wanted)
            .ok_or_else(|| ParseOptionError::new("analysis genre", s))
    }
}

/// Unrecognized value for a command option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptionError {
    option: &'static str,
    value: String,
}

impl ParseOptionError {
    fn new(option: &'static str, value: &str) -> Self {
        Self {
            option,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for ParseOptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: '{}'", self.option, self.value)
    }
}

impl std::error::Error for ParseOptionError {}

/// Operation-specific options carried with a request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub analysis_genre: AnalysisGenre,
    /// `None` means detect from the text.
    pub direction: Option<TranslationDirection>,
    pub translation_genre: TranslationGenre,
    /// Translation determinism parameter, 0.0..=1.0.
    pub temperature: f32,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            analysis_genre: AnalysisGenre::default(),
            direction: None,
            translation_genre: TranslationGenre::default(),
            temperature: 0.0,
        }
    }
}

/// One linguistic operation on one piece of user text.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingRequest {
    pub text: String,
    pub operation: Operation,
    pub options: RequestOptions,
    pub timeout: Duration,
    pub max_length: usize,
}

impl ProcessingRequest {
    pub fn new(text: impl Into<String>, operation: Operation) -> Self {
        Self {
            text: text.into(),
            operation,
            options: RequestOptions::default(),
            timeout: DEFAULT_TIMEOUT,
            max_length: DEFAULT_MAX_TEXT_LENGTH,
        }
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_limits(mut self, timeout: Duration, max_length: usize) -> Self {
        self.timeout = timeout;
        self.max_length = max_length;
        self
    }

    /// Explicit direction, or the one detected from the text.
    pub fn direction(&self) -> TranslationDirection {
        self.options
            .direction
            .unwrap_or_else(|| TranslationDirection::detect(&self.text))
    }

    /// Temperature clamped into 0.0..=1.0.
    pub fn temperature(&self) -> f32 {
        if self.options.temperature.is_finite() {
            self.options.temperature.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Per-token analysis, in source order. Empty strings mean "not returned".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WordAnalysis {
    pub word: String,
    pub vowelized_form: String,
    pub lemma: String,
    pub part_of_speech: String,
    pub gender: String,
    pub number: String,
    pub person: String,
    pub tense: String,
    pub status: String,
    pub binyan: String,
    pub prefix: String,
    pub suffix: String,
    pub suffix_gender: String,
    pub suffix_person: String,
    pub suffix_number: String,
}

impl WordAnalysis {
    /// Entry for a token the service could not analyze.
    pub fn unanalyzed(word: impl Into<String>) -> Self {
        let word = word.into();
        Self {
            vowelized_form: word.clone(),
            word,
            ..Self::default()
        }
    }

    /// True when any morphological feature was returned.
    pub fn has_morphology(&self) -> bool {
        [
            &self.lemma,
            &self.part_of_speech,
            &self.gender,
            &self.number,
            &self.person,
            &self.tense,
            &self.status,
            &self.binyan,
        ]
        .iter()
        .any(|field| !field.is_empty())
    }
}

/// Failure categories surfaced to the command layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    EmptyInput,
    TooLong,
    WrongScript,
    Connection,
    InvalidResponse,
    ProcessingFailure,
}

/// User-safe failure description. `detail` never carries internal error text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub detail: String,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.detail)
    }
}

impl std::error::Error for ErrorInfo {}

/// Outcome of one operation: either displayable text (plus word detail) or an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingResult {
    display_text: String,
    words: Vec<WordAnalysis>,
    error: Option<ErrorInfo>,
}

impl ProcessingResult {
    pub fn success(display_text: String, words: Vec<WordAnalysis>) -> Self {
        Self {
            display_text,
            words,
            error: None,
        }
    }

    pub fn failure(error: ErrorInfo) -> Self {
        Self {
            display_text: String::new(),
            words: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }

    /// Empty for failed results.
    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    /// Empty for failed results and for operations without word detail.
    pub fn words(&self) -> &[WordAnalysis] {
        &self.words
    }

    pub fn into_result(self) -> Result<(String, Vec<WordAnalysis>), ErrorInfo> {
        match self.error {
            Some(error) => Err(error),
            None => Ok((self.display_text, self.words)),
        }
    }
}

impl From<ErrorInfo> for ProcessingResult {
    fn from(error: ErrorInfo) -> Self {
        ProcessingResult::failure(error)
    }
}
