//! Interactive translation: pick a genre, then press translate.
//!
//! One [`TranslationSession`] is owned by the interaction it belongs to; the
//! genre-select and translate-button handlers both take it by `&mut`.

use crate::adapter::Limits;
use crate::labels;
use crate::render::{Choice, Embed, OutgoingMessage};
use aleph_types::{
    Operation, ProcessingRequest, ProcessingResult, RequestOptions, TranslationDirection,
    TranslationGenre,
};
use std::time::{Duration, Instant};

/// Interactive components stop responding after this long.
pub const SESSION_TIMEOUT: Duration = Duration::from_secs(180);

pub const TRANSLATE_BUTTON: &str = "Translate";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Selecting,
    InFlight,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("this translation prompt has expired")]
    Expired,
    #[error("a translation is already in progress")]
    InFlight,
    #[error("no translation is in progress")]
    NotInFlight,
}

#[derive(Debug, Clone)]
pub struct TranslationSession {
    user_id: String,
    text: String,
    genre: TranslationGenre,
    direction: TranslationDirection,
    temperature: f32,
    state: SessionState,
    started: Instant,
    translation: Option<String>,
}

impl TranslationSession {
    /// Direction is detected from the text until set explicitly.
    pub fn new(
        user_id: impl Into<String>,
        text: impl Into<String>,
        genre: TranslationGenre,
        temperature: f32,
        now: Instant,
    ) -> Self {
        let text = text.into();
        Self {
            user_id: user_id.into(),
            direction: TranslationDirection::detect(&text),
            text,
            genre,
            temperature,
            state: SessionState::Selecting,
            started: now,
            translation: None,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn genre(&self) -> TranslationGenre {
        self.genre
    }

    pub fn direction(&self) -> TranslationDirection {
        self.direction
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn translation(&self) -> Option<&str> {
        self.translation.as_deref()
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= SESSION_TIMEOUT
    }

    fn ensure_idle(&self, now: Instant) -> Result<(), SessionError> {
        if self.is_expired(now) {
            return Err(SessionError::Expired);
        }
        if self.state == SessionState::InFlight {
            return Err(SessionError::InFlight);
        }
        Ok(())
    }

    pub fn select_genre(&mut self, genre: TranslationGenre, now: Instant) -> Result<(), SessionError> {
        self.ensure_idle(now)?;
        self.genre = genre;
        self.state = SessionState::Selecting;
        Ok(())
    }

    pub fn set_direction(
        &mut self,
        direction: TranslationDirection,
        now: Instant,
    ) -> Result<(), SessionError> {
        self.ensure_idle(now)?;
        self.direction = direction;
        Ok(())
    }

    /// Lock in the current selection and build the request to send.
    pub fn press_translate(
        &mut self,
        limits: &Limits,
        now: Instant,
    ) -> Result<ProcessingRequest, SessionError> {
        self.ensure_idle(now)?;
        self.state = SessionState::InFlight;

        let options = RequestOptions {
            direction: Some(self.direction),
            translation_genre: self.genre,
            temperature: self.temperature,
            ..RequestOptions::default()
        };
        Ok(ProcessingRequest::new(self.text.clone(), Operation::Translate)
            .with_options(options)
            .with_limits(limits.timeout, limits.max_text_length))
    }

    /// Record the outcome. A failed translation returns to selection so the
    /// user can press again.
    pub fn complete(&mut self, result: &ProcessingResult) -> Result<(), SessionError> {
        if self.state != SessionState::InFlight {
            return Err(SessionError::NotInFlight);
        }
        if result.is_success() {
            self.translation = Some(result.display_text().to_string());
            self.state = SessionState::Completed;
        } else {
            self.state = SessionState::Selecting;
        }
        Ok(())
    }

    /// Prompt with the genre menu and translate button.
    pub fn prompt(&self) -> OutgoingMessage {
        let mut embed = Embed::new(
            labels::TITLE_TRANSLATION,
            format!(
                "**Original Text:**\n{}\n\n**Select translation style below:**",
                self.text
            ),
            labels::COLOR_BLUE,
        );
        embed.footer = Some(format!(
            "{} • {}",
            labels::FOOTER_TRANSLATION,
            self.direction
        ));

        let choices = TranslationGenre::ALL
            .into_iter()
            .map(|genre| Choice {
                value: genre.as_str().to_string(),
                label: labels::format_feature_value(&genre.as_str().replace('-', " ")),
                description: genre.description().to_string(),
                selected: genre == self.genre,
            })
            .collect();

        OutgoingMessage::Interactive {
            embed,
            choices,
            button: TRANSLATE_BUTTON.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aleph_types::{ErrorInfo, ErrorKind};

    fn session(text: &str, now: Instant) -> TranslationSession {
        TranslationSession::new("42", text, TranslationGenre::default(), 0.0, now)
    }

    #[test]
    fn test_defaults() {
        let now = Instant::now();
        let session = session("שלום", now);
        assert_eq!(session.genre(), TranslationGenre::ModernFancy);
        assert_eq!(session.direction(), TranslationDirection::HebrewToEnglish);
        assert_eq!(session.state(), SessionState::Selecting);
    }

    #[test]
    fn test_selection_flows_into_request() {
        let now = Instant::now();
        let mut session = session("hello", now);
        session.select_genre(TranslationGenre::Legal, now).unwrap();

        let request = session.press_translate(&Limits::default(), now).unwrap();
        assert_eq!(request.operation, Operation::Translate);
        assert_eq!(request.options.translation_genre, TranslationGenre::Legal);
        assert_eq!(request.direction(), TranslationDirection::EnglishToHebrew);
        assert_eq!(session.state(), SessionState::InFlight);
    }

    #[test]
    fn test_no_changes_while_in_flight() {
        let now = Instant::now();
        let mut session = session("hello", now);
        session.press_translate(&Limits::default(), now).unwrap();

        assert_eq!(
            session.select_genre(TranslationGenre::Biblical, now),
            Err(SessionError::InFlight)
        );
        assert_eq!(
            session.press_translate(&Limits::default(), now).unwrap_err(),
            SessionError::InFlight
        );
    }

    #[test]
    fn test_complete_success_and_failure() {
        let now = Instant::now();
        let mut session = session("hello", now);

        assert_eq!(
            session.complete(&ProcessingResult::success("x".into(), vec![])),
            Err(SessionError::NotInFlight)
        );

        session.press_translate(&Limits::default(), now).unwrap();
        let failed = ProcessingResult::failure(ErrorInfo::new(ErrorKind::Connection, "down"));
        session.complete(&failed).unwrap();
        assert_eq!(session.state(), SessionState::Selecting);
        assert_eq!(session.translation(), None);

        session.press_translate(&Limits::default(), now).unwrap();
        session
            .complete(&ProcessingResult::success("שלום".into(), vec![]))
            .unwrap();
        assert_eq!(session.state(), SessionState::Completed);
        assert_eq!(session.translation(), Some("שלום"));
    }

    #[test]
    fn test_expiry() {
        let now = Instant::now();
        let mut session = session("hello", now);
        let later = now + SESSION_TIMEOUT;
        assert!(session.is_expired(later));
        assert_eq!(
            session.press_translate(&Limits::default(), later).unwrap_err(),
            SessionError::Expired
        );
    }

    #[test]
    fn test_prompt_marks_selected_genre() {
        let now = Instant::now();
        let mut session = session("hello", now);
        session.select_genre(TranslationGenre::Technical, now).unwrap();

        let OutgoingMessage::Interactive { choices, button, .. } = session.prompt() else {
            panic!("expected interactive prompt");
        };
        assert_eq!(choices.len(), 6);
        assert_eq!(button, TRANSLATE_BUTTON);
        let selected: Vec<&str> = choices
            .iter()
            .filter(|c| c.selected)
            .map(|c| c.value.as_str())
            .collect();
        assert_eq!(selected, vec!["technical"]);
    }
}
