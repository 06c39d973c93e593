//! Turns raw service output into a [`ProcessingResult`].
//!
//! Per-token problems never fail the batch: a token with no candidates keeps its
//! original spelling, and a token with a missing or malformed feature block keeps
//! its place in the word list with empty features.

use crate::morphology::{apply_features, features_for, strip_segments, Segments};
use crate::payload::{AnalyzedToken, RawResponse, TokenRecord};
use crate::post_processing::Pipeline;
use crate::reassemble::{reassemble, SpacingLayout};
use aleph_types::{ErrorInfo, ErrorKind, Operation, ProcessingResult, WordAnalysis};
use tracing::{debug, warn};

/// Normalize a raw response for `operation`. Pure: equal inputs give equal results.
pub fn normalize(raw: &RawResponse, operation: Operation) -> ProcessingResult {
    match (raw, operation) {
        (RawResponse::Translation { fragments }, Operation::Translate) => {
            normalize_translation(fragments)
        }
        (RawResponse::Tokens { source, records }, op) if op != Operation::Translate => {
            normalize_tokens(source, records, op)
        }
        (RawResponse::Translation { .. }, op) | (RawResponse::Tokens { .. }, op) => {
            warn!("Response shape does not match operation {}", op);
            ProcessingResult::failure(ErrorInfo::new(
                ErrorKind::InvalidResponse,
                "The linguistic service returned an unexpected response",
            ))
        }
    }
}

fn normalize_translation(fragments: &[String]) -> ProcessingResult {
    let parts: Vec<&str> = fragments
        .iter()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .collect();

    if parts.is_empty() {
        warn!("Translation produced no text ({} raw fragment(s))", fragments.len());
        return ProcessingResult::failure(ErrorInfo::new(
            ErrorKind::ProcessingFailure,
            "The translation service returned no text",
        ));
    }

    let text = Pipeline::for_display().process(&parts.join(" "));
    ProcessingResult::success(text, Vec::new())
}

/// Displayable text contributed by one record, plus its analysis when it is a word.
enum Piece {
    /// Whitespace between words; the reassembler supplies the real spacing.
    Gap,
    Text {
        /// Text as it appears in the source, used to find the piece's position.
        original: String,
        display: String,
        analysis: Option<WordAnalysis>,
    },
}

fn normalize_tokens(source: &str, records: &[TokenRecord], operation: Operation) -> ProcessingResult {
    let pieces: Vec<Piece> = records
        .iter()
        .enumerate()
        .filter_map(|(idx, record)| piece_for(idx, record, operation))
        .collect();

    let words: Vec<WordAnalysis> = pieces
        .iter()
        .filter_map(|piece| match piece {
            Piece::Text { analysis, .. } => analysis.clone(),
            Piece::Gap => None,
        })
        .collect();

    if words.is_empty() {
        warn!(
            "Service returned no usable tokens ({} record(s)) for {}",
            records.len(),
            operation
        );
        return ProcessingResult::failure(ErrorInfo::new(
            ErrorKind::ProcessingFailure,
            "The linguistic service returned no results for this text",
        ));
    }

    let tokens = group_tokens(source, &pieces);
    let display_text = reassemble(source, &tokens);

    debug!(
        "Normalized {} record(s) into {} word(s), {} display token(s)",
        records.len(),
        words.len(),
        tokens.len()
    );

    let words = if operation.has_word_detail() {
        words
    } else {
        Vec::new()
    };
    ProcessingResult::success(display_text, words)
}

fn piece_for(idx: usize, record: &TokenRecord, operation: Operation) -> Option<Piece> {
    match record {
        TokenRecord::Plain(text) if text.trim().is_empty() => Some(Piece::Gap),
        TokenRecord::Plain(text) => {
            let text = text.trim();
            let analysis = text
                .chars()
                .any(char::is_alphanumeric)
                .then(|| WordAnalysis::unanalyzed(text));
            Some(Piece::Text {
                original: text.to_string(),
                display: text.to_string(),
                analysis,
            })
        }
        TokenRecord::Analyzed(token) if token.sep && !token.word.trim().is_empty() => {
            let text = token.word.trim();
            Some(Piece::Text {
                original: text.to_string(),
                display: text.to_string(),
                analysis: None,
            })
        }
        TokenRecord::Analyzed(token) => {
            let word = match token.word.trim() {
                "" => match token.first_candidate().and_then(|c| c.rendering()) {
                    Some(rendering) if !token.sep => {
                        debug!("Record #{} has no word, using its candidate", idx);
                        strip_segments(rendering)
                    }
                    _ => return Some(Piece::Gap),
                },
                word => word.to_string(),
            };
            let analysis = analyze_token(token, &word, operation);
            let display = match operation {
                Operation::Lemmatize => analysis.lemma.clone(),
                _ => analysis.vowelized_form.clone(),
            };
            Some(Piece::Text {
                original: word,
                display,
                analysis: Some(analysis),
            })
        }
        TokenRecord::Unrecognized(value) => match value.get("word").and_then(|w| w.as_str()) {
            Some(word) if !word.trim().is_empty() => {
                warn!("Unreadable record #{}, keeping its word unanalyzed: {}", idx, value);
                let word = word.trim();
                Some(Piece::Text {
                    original: word.to_string(),
                    display: Pipeline::for_display().process(word),
                    analysis: Some(WordAnalysis::unanalyzed(word)),
                })
            }
            _ => {
                warn!("Skipping unrecognized record #{}: {}", idx, value);
                None
            }
        },
    }
}

fn analyze_token(token: &AnalyzedToken, word: &str, operation: Operation) -> WordAnalysis {
    let display = Pipeline::for_display();

    let candidate = token.first_candidate();
    let rendering = match candidate.and_then(|c| c.rendering()) {
        Some(rendering) => rendering,
        None => {
            debug!("No vowelized candidate for '{}', keeping original", word);
            word
        }
    };

    let mut analysis = WordAnalysis::unanalyzed(word);
    analysis.vowelized_form = display.process(&strip_segments(rendering));

    match operation {
        Operation::Analyze => {
            let segments = Segments::split(rendering);
            analysis.prefix = display.process(&segments.prefix);
            analysis.suffix = display.process(&segments.suffix);
            if let Some(features) = features_for(word, token.bgu_block()) {
                apply_features(&mut analysis, &features);
            }
        }
        Operation::Lemmatize => {
            let from_block = features_for(word, token.bgu_block())
                .map(|features| features.get(crate::morphology::keys::LEMMA).to_string())
                .filter(|lemma| !lemma.is_empty());
            let lemma = from_block
                .or_else(|| candidate.and_then(|c| c.nested_lemma()).map(str::to_string))
                .unwrap_or_else(|| word.to_string());
            analysis.lemma = display.process(&strip_segments(&lemma));
        }
        Operation::Vowelize | Operation::Translate => {}
    }

    analysis
}

/// Display tokens, one per whitespace-delimited source word where possible.
///
/// Each piece is located in `source` after the previous one; it starts a new
/// token when whitespace precedes it there, and otherwise stays attached to the
/// previous token. Pieces that cannot be located fall back to the gap records.
/// When that still disagrees with the source word count but there is one piece
/// per source word, each piece is its own token.
fn group_tokens(source: &str, pieces: &[Piece]) -> Vec<String> {
    let mut groups: Vec<String> = Vec::new();
    let mut texts: Vec<&str> = Vec::new();
    let mut cursor = 0;
    let mut gap_seen = false;

    for piece in pieces {
        let (original, display) = match piece {
            Piece::Gap => {
                gap_seen = true;
                continue;
            }
            Piece::Text {
                original, display, ..
            } => (original, display),
        };

        let spaced = match locate(source, cursor, original) {
            Some((start, end)) => {
                let skipped = &source[cursor..start];
                cursor = end;
                skipped.chars().any(char::is_whitespace)
            }
            None => gap_seen,
        };
        gap_seen = false;

        match groups.last_mut() {
            Some(last) if !spaced => last.push_str(display),
            _ => groups.push(display.clone()),
        }
        texts.push(display);
    }

    let source_words = SpacingLayout::of(source).word_count();
    if groups.len() != source_words && texts.len() == source_words {
        debug!(
            "Token grouping mismatch ({} groups, {} source words), using one token per record",
            groups.len(),
            source_words
        );
        return texts.into_iter().map(str::to_string).collect();
    }

    groups
}

/// Byte range of the next occurrence of `needle` at or after `cursor`.
fn locate(source: &str, cursor: usize, needle: &str) -> Option<(usize, usize)> {
    if needle.is_empty() {
        return None;
    }
    source
        .get(cursor..)?
        .find(needle)
        .map(|offset| (cursor + offset, cursor + offset + needle.len()))
}
