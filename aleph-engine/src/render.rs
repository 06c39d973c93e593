//! Rendering of results into chat messages within the platform's size limits.
//!
//! All limits are counted in characters (code points).

use crate::labels::{self, Label};
use aleph_types::{ErrorInfo, Operation, ProcessingRequest, ProcessingResult, WordAnalysis};
use std::time::Duration;

pub const MAX_TITLE: usize = 256;
pub const MAX_DESCRIPTION: usize = 4096;
pub const MAX_FIELD_NAME: usize = 256;
pub const MAX_FIELD_VALUE: usize = 1024;
pub const MAX_FIELDS: usize = 25;
pub const MAX_EMBED_TOTAL: usize = 6000;
pub const MAX_FOOTER: usize = 2048;

const CONTINUED: &str = " (cont.)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    pub fn new(name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline,
        }
    }

    fn char_count(&self) -> usize {
        self.name.chars().count() + self.value.chars().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub footer: Option<String>,
}

impl Embed {
    pub fn new(title: impl Into<String>, description: impl Into<String>, color: u32) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            color,
            fields: Vec::new(),
            footer: None,
        }
    }

    /// Characters counted against the per-message total.
    pub fn char_count(&self) -> usize {
        self.title.chars().count()
            + self.description.chars().count()
            + self.fields.iter().map(EmbedField::char_count).sum::<usize>()
            + self.footer.as_deref().map_or(0, |f| f.chars().count())
    }
}

/// A selectable option of an interactive message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
    pub description: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutgoingMessage {
    Text(String),
    Embed(Embed),
    /// Embed with a select menu and a single action button.
    Interactive {
        embed: Embed,
        choices: Vec<Choice>,
        button: String,
    },
}

/// Split `text` into chunks of at most `max_chars` characters, preferring line breaks.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let mut end = (start + max_chars).min(chars.len());
        if end < chars.len() {
            if let Some(pos) = chars[start..end].iter().rposition(|&ch| ch == '\n') {
                if pos > 0 {
                    end = start + pos + 1;
                }
            }
        }
        let chunk: String = chars[start..end].iter().collect();
        chunks.push(chunk.trim_end_matches('\n').to_string());
        start = end;
    }

    chunks
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}

/// Split one logical embed into as many embeds as the limits require.
///
/// Long descriptions and field values continue in extra fields named
/// `"... (cont.)"`; fields spill into follow-up embeds once a message is full.
pub fn paginate(embed: Embed) -> Vec<Embed> {
    let title = truncate(&embed.title, MAX_TITLE);
    let footer = embed.footer.as_deref().map(|f| truncate(f, MAX_FOOTER));
    let continued_title = truncate(&format!("{}{}", embed.title, CONTINUED), MAX_TITLE);

    let mut description_chunks = chunk_text(&embed.description, MAX_DESCRIPTION).into_iter();
    let first_description = description_chunks.next().unwrap_or_default();

    let mut fields: Vec<EmbedField> = description_chunks
        .map(|chunk| EmbedField::new(CONTINUED.trim(), chunk, false))
        .flat_map(split_field)
        .collect();
    fields.extend(embed.fields.into_iter().flat_map(split_field));

    let mut pages = vec![Embed {
        title,
        description: first_description,
        color: embed.color,
        fields: Vec::new(),
        footer: footer.clone(),
    }];

    for field in fields {
        let needs_new_page = pages.last().map_or(true, |page| {
            page.fields.len() >= MAX_FIELDS
                || page.char_count() + field.char_count() > MAX_EMBED_TOTAL
        });
        if needs_new_page {
            pages.push(Embed {
                title: continued_title.clone(),
                description: String::new(),
                color: embed.color,
                fields: Vec::new(),
                footer: footer.clone(),
            });
        }
        if let Some(page) = pages.last_mut() {
            page.fields.push(field);
        }
    }

    pages
}

fn split_field(field: EmbedField) -> Vec<EmbedField> {
    let name = truncate(&field.name, MAX_FIELD_NAME);
    let continued = truncate(&format!("{}{}", field.name, CONTINUED), MAX_FIELD_NAME);

    chunk_text(&field.value, MAX_FIELD_VALUE)
        .into_iter()
        .enumerate()
        .map(|(idx, value)| EmbedField {
            name: if idx == 0 { name.clone() } else { continued.clone() },
            value,
            inline: field.inline,
        })
        .collect()
}

fn original_text_block(text: &str) -> String {
    format!("**Original Text:**\n```{}```\n{}", text, labels::DIVIDER)
}

/// Lines describing one analyzed word, in display order.
pub fn word_detail_lines(word: &WordAnalysis) -> Vec<String> {
    let mut lines = Vec::new();

    if !word.prefix.is_empty() {
        lines.push(labels::PREFIX.line(&word.prefix));
    }
    if !word.vowelized_form.is_empty() {
        lines.push(labels::VOWELIZED.line(&word.vowelized_form));
    }
    if !word.lemma.is_empty() {
        lines.push(labels::BASE_FORM.line(&word.lemma));
    }

    let features: [(Label, &str); 7] = [
        (labels::PART_OF_SPEECH, word.part_of_speech.as_str()),
        (labels::GENDER, word.gender.as_str()),
        (labels::NUMBER, word.number.as_str()),
        (labels::PERSON, word.person.as_str()),
        (labels::STATUS, word.status.as_str()),
        (labels::TENSE, word.tense.as_str()),
        (labels::BINYAN, word.binyan.as_str()),
    ];
    push_features(&mut lines, &features);

    if !word.suffix.is_empty() {
        lines.push(labels::SUFFIX.line(&word.suffix));
        let suffix_features: [(Label, &str); 3] = [
            (labels::SUFFIX_GENDER, word.suffix_gender.as_str()),
            (labels::SUFFIX_PERSON, word.suffix_person.as_str()),
            (labels::SUFFIX_NUMBER, word.suffix_number.as_str()),
        ];
        push_features(&mut lines, &suffix_features);
    }

    lines
}

fn push_features(lines: &mut Vec<String>, features: &[(Label, &str)]) {
    for (label, value) in features {
        if !value.is_empty() {
            lines.push(label.line(&labels::format_feature_value(value)));
        }
    }
}

fn analysis_embed(request: &ProcessingRequest, result: &ProcessingResult) -> Embed {
    let mut embed = Embed::new(
        labels::TITLE_MORPHOLOGY,
        original_text_block(&request.text),
        labels::COLOR_GREEN,
    );
    let numbered = result.words().len() > 1;

    for (idx, word) in result.words().iter().enumerate() {
        let lines = word_detail_lines(word);
        if lines.is_empty() {
            continue;
        }
        let name = if numbered {
            format!("Word #{} · {}", idx + 1, word.word)
        } else {
            word.word.clone()
        };
        embed.fields.push(EmbedField::new(name, lines.join("\n"), false));
    }
    embed
}

fn lemma_embed(request: &ProcessingRequest, result: &ProcessingResult) -> Embed {
    let mut embed = Embed::new(
        labels::TITLE_LEMMATIZE,
        format!(
            "{}\n**Result:**\n{}",
            original_text_block(&request.text),
            result.display_text()
        ),
        labels::COLOR_PURPLE,
    );
    for word in result.words() {
        embed.fields.push(EmbedField::new(
            word.word.clone(),
            format!("Base form: {}", word.lemma),
            true,
        ));
    }
    embed
}

/// Title shown once a translation has completed.
pub fn translation_title(request: &ProcessingRequest) -> String {
    let genre = labels::format_feature_value(&request.options.translation_genre.as_str().replace('-', " "));
    format!("{} ({} Style)", labels::TITLE_TRANSLATION, genre)
}

fn translation_embed(request: &ProcessingRequest, result: &ProcessingResult) -> Embed {
    Embed::new(
        translation_title(request),
        format!(
            "**Original Text:**\n{}\n\n**Translated Text:**\n{}",
            request.text,
            result.display_text()
        ),
        labels::COLOR_BLUE,
    )
}

/// Render a result as one or more messages. Failed results render as their error copy.
pub fn render_result(request: &ProcessingRequest, result: &ProcessingResult) -> Vec<OutgoingMessage> {
    if let Some(error) = result.error() {
        return vec![render_error(error, request.operation, request.max_length)];
    }

    let mut embed = match request.operation {
        Operation::Vowelize => Embed::new(
            labels::TITLE_VOWELIZE,
            format!(
                "{}\n**Result:**\n{}",
                original_text_block(&request.text),
                result.display_text()
            ),
            labels::COLOR_BLUE,
        ),
        Operation::Analyze => analysis_embed(request, result),
        Operation::Lemmatize => lemma_embed(request, result),
        Operation::Translate => translation_embed(request, result),
    };
    embed.footer = Some(labels::footer_for(request.operation).to_string());

    paginate(embed).into_iter().map(OutgoingMessage::Embed).collect()
}

pub fn render_error(error: &ErrorInfo, operation: Operation, max_length: usize) -> OutgoingMessage {
    OutgoingMessage::Text(labels::error_message(error, operation, max_length))
}

pub fn render_cooldown(retry_after: Duration) -> OutgoingMessage {
    OutgoingMessage::Text(labels::cooldown_message(retry_after))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aleph_types::{ErrorKind, RequestOptions, TranslationGenre};

    fn analyzed(word: &str) -> WordAnalysis {
        WordAnalysis {
            word: word.to_string(),
            vowelized_form: word.to_string(),
            lemma: "בית".to_string(),
            part_of_speech: "NOUN".to_string(),
            gender: "Masculine".to_string(),
            ..WordAnalysis::default()
        }
    }

    #[test]
    fn test_chunk_text_counts_characters() {
        let text = "א".repeat(10);
        let chunks = chunk_text(&text, 4);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 4);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_chunk_text_prefers_newlines() {
        let chunks = chunk_text("ab\ncdef\ngh", 6);
        assert_eq!(chunks, vec!["ab", "cdef", "gh"]);
    }

    #[test]
    fn test_chunk_empty() {
        assert!(chunk_text("", 10).is_empty());
    }

    #[test]
    fn test_word_detail_lines() {
        let mut word = analyzed("ביתו");
        word.prefix = "הַ".to_string();
        word.suffix = "וֹ".to_string();
        word.suffix_gender = "MASCULINE".to_string();

        let lines = word_detail_lines(&word);
        assert_eq!(lines[0], "**תחילית | Prefix:** הַ");
        assert!(lines.contains(&"**חלק דיבור | Part of Speech:** Noun".to_string()));
        assert!(lines.contains(&"**סופית | Suffix:** וֹ".to_string()));
        assert!(lines.contains(&"**מין הסיומת | Suffix Gender:** Masculine".to_string()));
        assert!(!lines.iter().any(|l| l.contains("Tense")));
    }

    #[test]
    fn test_paginate_small_embed_untouched() {
        let mut embed = Embed::new("title", "body", labels::COLOR_BLUE);
        embed.fields.push(EmbedField::new("a", "b", false));
        let pages = paginate(embed.clone());
        assert_eq!(pages, vec![embed]);
    }

    #[test]
    fn test_paginate_respects_field_limits() {
        let mut embed = Embed::new("title", "body", labels::COLOR_BLUE);
        for idx in 0..30 {
            embed.fields.push(EmbedField::new(format!("w{}", idx), "x".repeat(1500), false));
        }
        let pages = paginate(embed);

        assert!(pages.len() > 1);
        for page in &pages {
            assert!(page.fields.len() <= MAX_FIELDS);
            assert!(page.char_count() <= MAX_EMBED_TOTAL);
            assert!(page.fields.iter().all(|f| f.value.chars().count() <= MAX_FIELD_VALUE));
        }
        let total: usize = pages.iter().map(|p| p.fields.len()).sum();
        assert_eq!(total, 60);
        assert_eq!(pages[0].fields[1].name, "w0 (cont.)");
        assert_eq!(pages[1].title, "title (cont.)");
    }

    #[test]
    fn test_paginate_long_description() {
        let embed = Embed::new("t", "ש".repeat(5000), labels::COLOR_BLUE);
        let pages = paginate(embed);
        assert_eq!(pages[0].description.chars().count(), MAX_DESCRIPTION);
        let rest: usize = pages
            .iter()
            .flat_map(|p| p.fields.iter())
            .map(|f| f.value.chars().count())
            .sum();
        assert_eq!(rest, 5000 - MAX_DESCRIPTION);
    }

    #[test]
    fn test_render_vowelize() {
        let request = ProcessingRequest::new("שלום", Operation::Vowelize);
        let result = ProcessingResult::success("שָׁלוֹם".to_string(), vec![]);
        let messages = render_result(&request, &result);

        assert_eq!(messages.len(), 1);
        let OutgoingMessage::Embed(embed) = &messages[0] else {
            panic!("expected embed");
        };
        assert_eq!(embed.title, labels::TITLE_VOWELIZE);
        assert!(embed.description.contains("```שלום```"));
        assert!(embed.description.ends_with("**Result:**\nשָׁלוֹם"));
        assert_eq!(embed.footer.as_deref(), Some(labels::FOOTER_NAKDAN));
    }

    #[test]
    fn test_render_analysis_numbers_words() {
        let request = ProcessingRequest::new("הבית הגדול", Operation::Analyze);
        let result = ProcessingResult::success(
            "הַבַּיִת הַגָּדוֹל".to_string(),
            vec![analyzed("הבית"), analyzed("הגדול")],
        );
        let messages = render_result(&request, &result);
        let OutgoingMessage::Embed(embed) = &messages[0] else {
            panic!("expected embed");
        };
        assert_eq!(embed.fields.len(), 2);
        assert_eq!(embed.fields[0].name, "Word #1 · הבית");
        assert!(embed.fields[1].value.contains("**צורת המקור | Base Form:** בית"));
    }

    #[test]
    fn test_render_translation_title() {
        let request = ProcessingRequest::new("שלום", Operation::Translate).with_options(
            RequestOptions {
                translation_genre: TranslationGenre::ModernColloquial,
                ..RequestOptions::default()
            },
        );
        let result = ProcessingResult::success("Hello".to_string(), vec![]);
        let messages = render_result(&request, &result);
        let OutgoingMessage::Embed(embed) = &messages[0] else {
            panic!("expected embed");
        };
        assert_eq!(embed.title, "Translation (Modern Colloquial Style)");
        assert!(embed.description.ends_with("**Translated Text:**\nHello"));
    }

    #[test]
    fn test_render_failure_as_text() {
        let request = ProcessingRequest::new("hello", Operation::Vowelize);
        let result = ProcessingResult::failure(ErrorInfo::new(ErrorKind::WrongScript, "x"));
        let messages = render_result(&request, &result);
        assert_eq!(
            messages,
            vec![OutgoingMessage::Text(
                "❌ Please provide Hebrew text. Example: `/vowelize שלום עולם`".to_string()
            )]
        );
    }
}
