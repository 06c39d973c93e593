//! Parsing of per-token morphological detail returned by the analyzer.
//!
//! Two encodings are handled here:
//! - segment markers: a token like `וְ|הַ|בַּיִת` splits into prefix, stem and suffix;
//! - the BGU block: a two-line, tab-separated header/value table of features.

use aleph_types::WordAnalysis;
use std::collections::HashMap;
use tracing::warn;

/// Reserved character separating prefix, stem and suffix inside a token.
pub const SEGMENT_SEPARATOR: char = '|';

/// A token split at segment markers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Segments {
    pub prefix: String,
    pub stem: String,
    pub suffix: String,
}

impl Segments {
    /// Split on [`SEGMENT_SEPARATOR`].
    ///
    /// One part has no prefix or suffix, two parts are prefix + stem, and three
    /// or more are prefix + stem + suffix with the middle parts rejoined as stem.
    pub fn split(token: &str) -> Self {
        let parts: Vec<&str> = token.split(SEGMENT_SEPARATOR).collect();
        match parts.as_slice() {
            [] | [_] => Self {
                stem: token.to_string(),
                ..Self::default()
            },
            [prefix, stem] => Self {
                prefix: prefix.to_string(),
                stem: stem.to_string(),
                suffix: String::new(),
            },
            [prefix, middle @ .., suffix] => Self {
                prefix: prefix.to_string(),
                stem: middle.join("|"),
                suffix: suffix.to_string(),
            },
        }
    }

    pub fn has_suffix(&self) -> bool {
        !self.suffix.is_empty()
    }
}

/// Remove segment markers, yielding the token as it should be displayed.
pub fn strip_segments(token: &str) -> String {
    token.chars().filter(|&ch| ch != SEGMENT_SEPARATOR).collect()
}

/// Feature table decoded from a BGU block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeatureMap {
    features: HashMap<String, String>,
}

impl FeatureMap {
    /// Parse a BGU block: exactly one header line and one value line, tab separated.
    ///
    /// Returns `None` for any other shape.
    pub fn parse(block: &str) -> Option<Self> {
        let lines: Vec<&str> = block
            .trim()
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .collect();

        let [header, values] = lines.as_slice() else {
            return None;
        };

        let features = header
            .split('\t')
            .zip(values.split('\t'))
            .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
            .filter(|(key, _)| !key.is_empty())
            .collect();

        Some(Self { features })
    }

    /// Value for `key`, or an empty string when absent.
    pub fn get(&self, key: &str) -> &str {
        self.features.get(key).map(String::as_str).unwrap_or("")
    }
}

/// Recognized BGU keys. Anything else in the block is ignored.
pub mod keys {
    pub const LEMMA: &str = "lex";
    pub const PART_OF_SPEECH: &str = "POS";
    pub const GENDER: &str = "Gender";
    pub const NUMBER: &str = "Number";
    pub const PERSON: &str = "Person";
    pub const TENSE: &str = "Tense";
    pub const BINYAN: &str = "Binyan";
    pub const STATUS: &str = "Status";
    pub const SUFFIX_GENDER: &str = "Suf_Gender";
    pub const SUFFIX_PERSON: &str = "Suf_Person";
    pub const SUFFIX_NUMBER: &str = "Suf_Number";
}

/// Copy recognized features into `analysis`.
///
/// Suffix features are only taken when the token actually has a suffix.
pub fn apply_features(analysis: &mut WordAnalysis, features: &FeatureMap) {
    analysis.lemma = features.get(keys::LEMMA).to_string();
    analysis.part_of_speech = features.get(keys::PART_OF_SPEECH).to_string();
    analysis.gender = features.get(keys::GENDER).to_string();
    analysis.number = features.get(keys::NUMBER).to_string();
    analysis.person = features.get(keys::PERSON).to_string();
    analysis.tense = features.get(keys::TENSE).to_string();
    analysis.binyan = features.get(keys::BINYAN).to_string();
    analysis.status = features.get(keys::STATUS).to_string();

    if !analysis.suffix.is_empty() {
        analysis.suffix_gender = features.get(keys::SUFFIX_GENDER).to_string();
        analysis.suffix_person = features.get(keys::SUFFIX_PERSON).to_string();
        analysis.suffix_number = features.get(keys::SUFFIX_NUMBER).to_string();
    }
}

/// Parse an optional BGU block for `word`, logging instead of failing.
pub fn features_for(word: &str, block: Option<&str>) -> Option<FeatureMap> {
    let block = block?;
    match FeatureMap::parse(block) {
        Some(features) => Some(features),
        None => {
            warn!(
                "Malformed morphological block for '{}' ({} lines), leaving features empty",
                word,
                block.trim().lines().count()
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK: &str = "lex\tPOS\tGender\tNumber\tPerson\tStatus\tTense\tBinyan\tSuf_Gender\tUnknown\n\
                         בית\tNOUN\tMasculine\tSingular\t\tAbsolute\t\t\tFeminine\tx";

    #[test]
    fn test_split_single_part() {
        let segments = Segments::split("בַּיִת");
        assert_eq!(segments.prefix, "");
        assert_eq!(segments.stem, "בַּיִת");
        assert_eq!(segments.suffix, "");
    }

    #[test]
    fn test_split_prefix_and_stem() {
        let segments = Segments::split("הַ|בַּיִת");
        assert_eq!(segments.prefix, "הַ");
        assert_eq!(segments.stem, "בַּיִת");
        assert!(!segments.has_suffix());
    }

    #[test]
    fn test_split_prefix_stem_suffix() {
        let segments = Segments::split("וּ|בֵית|וֹ");
        assert_eq!(segments.prefix, "וּ");
        assert_eq!(segments.stem, "בֵית");
        assert_eq!(segments.suffix, "וֹ");
    }

    #[test]
    fn test_split_rejoins_middle_parts() {
        let segments = Segments::split("a|b|c|d");
        assert_eq!(segments.prefix, "a");
        assert_eq!(segments.stem, "b|c");
        assert_eq!(segments.suffix, "d");
    }

    #[test]
    fn test_strip_segments() {
        assert_eq!(strip_segments("וּ|בֵית|וֹ"), "וּבֵיתוֹ");
    }

    #[test]
    fn test_parse_block() {
        let features = FeatureMap::parse(BLOCK).unwrap();
        assert_eq!(features.get("lex"), "בית");
        assert_eq!(features.get("POS"), "NOUN");
        assert_eq!(features.get("Person"), "");
        assert_eq!(features.get("Missing"), "");
    }

    #[test]
    fn test_parse_rejects_wrong_line_count() {
        assert!(FeatureMap::parse("lex\tPOS").is_none());
        assert!(FeatureMap::parse("lex\tPOS\nבית\tNOUN\nextra\tline").is_none());
        assert!(FeatureMap::parse("").is_none());
    }

    #[test]
    fn test_parse_handles_crlf() {
        let features = FeatureMap::parse("lex\tPOS\r\nבית\tNOUN\r\n").unwrap();
        assert_eq!(features.get("POS"), "NOUN");
    }

    #[test]
    fn test_apply_features_without_suffix() {
        let features = FeatureMap::parse(BLOCK).unwrap();
        let mut analysis = WordAnalysis::unanalyzed("בית");
        apply_features(&mut analysis, &features);

        assert_eq!(analysis.lemma, "בית");
        assert_eq!(analysis.part_of_speech, "NOUN");
        assert_eq!(analysis.gender, "Masculine");
        assert_eq!(analysis.number, "Singular");
        assert_eq!(analysis.status, "Absolute");
        assert_eq!(analysis.suffix_gender, "");
    }

    #[test]
    fn test_apply_features_with_suffix() {
        let features = FeatureMap::parse(BLOCK).unwrap();
        let mut analysis = WordAnalysis::unanalyzed("ביתה");
        analysis.suffix = "ה".to_string();
        apply_features(&mut analysis, &features);
        assert_eq!(analysis.suffix_gender, "Feminine");
    }

    #[test]
    fn test_features_for_malformed_block() {
        assert!(features_for("בית", Some("only one line")).is_none());
        assert!(features_for("בית", None).is_none());
    }
}
