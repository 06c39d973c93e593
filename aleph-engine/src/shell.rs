//! Line-oriented chat front end: reads `/command` lines and plays the part of
//! the chat framework (cooldowns, deferred replies, translation prompts).

use crate::adapter::{ChatSink, CommandAdapter, CommandError, Invocation};
use crate::cooldown::CooldownTracker;
use crate::render::OutgoingMessage;
use crate::session::{SessionState, TranslationSession};
use crate::transport::LinguisticService;
use aleph_types::{
    AnalysisGenre, Operation, ParseOptionError, RequestOptions, TranslationDirection,
    TranslationGenre,
};
use std::collections::HashMap;
use std::time::Instant;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

pub const HELP: &str = "\
Commands:
  /vowelize [genre=modern|biblical|mishnaic|poetic] <text>
  /analyze [genre=...] <text>
  /lemmatize [genre=...] <text>
  /translate [genre=<style>] [direction=he-en|en-he] [temperature=0.0-1.0] <text>
  /genre <style>          change style of the open translation
  /direction <he-en|en-he>
  /go                     translate with the current selection
  /user <id>              act as another user
  /help
  /quit";

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Run {
        operation: Operation,
        text: String,
        options: RequestOptions,
    },
    Genre(TranslationGenre),
    Direction(TranslationDirection),
    Go,
    User(String),
    Help,
    Quit,
    Empty,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShellError {
    #[error("commands start with '/', try /help")]
    NotACommand,
    #[error("unknown command '/{0}', try /help")]
    UnknownCommand(String),
    #[error("/{0} needs an argument")]
    MissingArgument(&'static str),
    #[error("unknown option '{0}'")]
    UnknownOption(String),
    #[error(transparent)]
    BadValue(#[from] ParseOptionError),
    #[error("temperature must be a number between 0 and 1")]
    BadTemperature,
}

impl ShellCommand {
    pub fn parse(line: &str) -> Result<Self, ShellError> {
        Self::parse_with(line, &RequestOptions::default())
    }

    /// Parse with `defaults` as the starting options of `/operation` commands.
    pub fn parse_with(line: &str, defaults: &RequestOptions) -> Result<Self, ShellError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(ShellCommand::Empty);
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Err(ShellError::NotACommand);
        };

        let (name, argument) = match rest.split_once(char::is_whitespace) {
            Some((name, argument)) => (name, argument.trim()),
            None => (rest, ""),
        };

        match name.to_ascii_lowercase().as_str() {
            "go" => Ok(ShellCommand::Go),
            "help" => Ok(ShellCommand::Help),
            "quit" | "exit" => Ok(ShellCommand::Quit),
            "user" => non_empty(argument, "user").map(|id| ShellCommand::User(id.to_string())),
            "genre" => Ok(ShellCommand::Genre(non_empty(argument, "genre")?.parse()?)),
            "direction" => Ok(ShellCommand::Direction(
                non_empty(argument, "direction")?.parse()?,
            )),
            other => match other.parse::<Operation>() {
                Ok(operation) => parse_run(operation, argument, defaults.clone()),
                Err(_) => Err(ShellError::UnknownCommand(other.to_string())),
            },
        }
    }
}

fn non_empty<'a>(argument: &'a str, command: &'static str) -> Result<&'a str, ShellError> {
    if argument.is_empty() {
        Err(ShellError::MissingArgument(command))
    } else {
        Ok(argument)
    }
}

/// Leading `key=value` words are options; the remainder is the text, verbatim.
fn parse_run(
    operation: Operation,
    mut argument: &str,
    mut options: RequestOptions,
) -> Result<ShellCommand, ShellError> {
    while let Some((word, rest)) = split_first_word(argument) {
        let Some((key, value)) = word.split_once('=') else {
            break;
        };
        match (key, operation) {
            ("genre", Operation::Translate) => options.translation_genre = value.parse()?,
            ("genre", _) => options.analysis_genre = value.parse::<AnalysisGenre>()?,
            ("direction", Operation::Translate) => options.direction = Some(value.parse()?),
            ("temperature", Operation::Translate) => {
                options.temperature = value
                    .parse::<f32>()
                    .ok()
                    .filter(|t| (0.0..=1.0).contains(t))
                    .ok_or(ShellError::BadTemperature)?;
            }
            _ => return Err(ShellError::UnknownOption(key.to_string())),
        }
        argument = rest;
    }

    Ok(ShellCommand::Run {
        operation,
        text: argument.to_string(),
        options,
    })
}

fn split_first_word(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => Some((word, rest)),
        None => Some((text, "")),
    }
}

/// Per-user state kept by the shell between lines.
pub struct ShellState {
    pub user: String,
    pub cooldown: CooldownTracker,
    pub defaults: RequestOptions,
    sessions: HashMap<String, TranslationSession>,
}

impl ShellState {
    pub fn new(user: impl Into<String>, cooldown: CooldownTracker, defaults: RequestOptions) -> Self {
        Self {
            user: user.into(),
            cooldown,
            defaults,
            sessions: HashMap::new(),
        }
    }

    pub fn session(&self) -> Option<&TranslationSession> {
        self.sessions.get(&self.user)
    }

    /// Drop sessions that are finished or can no longer be interacted with.
    pub fn prune_sessions(&mut self, now: Instant) {
        self.sessions.retain(|_, session| {
            session.state() != SessionState::Completed && !session.is_expired(now)
        });
    }
}

/// Read commands until EOF or `/quit`.
pub async fn run_shell<S, R, K>(
    adapter: &CommandAdapter<S>,
    input: R,
    sink: &mut K,
    state: &mut ShellState,
) -> anyhow::Result<()>
where
    S: LinguisticService,
    R: AsyncBufRead + Unpin,
    K: ChatSink,
{
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        let command = match ShellCommand::parse_with(&line, &state.defaults) {
            Ok(command) => command,
            Err(e) => {
                sink.send(OutgoingMessage::Text(format!("❌ {}", e))).await?;
                continue;
            }
        };
        debug!("Shell command: {:?}", command);

        if !dispatch(adapter, sink, state, command).await? {
            break;
        }
    }

    info!("Shell session ended");
    Ok(())
}

/// Returns false when the shell should stop.
async fn dispatch<S, K>(
    adapter: &CommandAdapter<S>,
    sink: &mut K,
    state: &mut ShellState,
    command: ShellCommand,
) -> anyhow::Result<bool>
where
    S: LinguisticService,
    K: ChatSink,
{
    let now = Instant::now();

    match command {
        ShellCommand::Empty => {}
        ShellCommand::Quit => return Ok(false),
        ShellCommand::Help => sink.send(OutgoingMessage::Text(HELP.to_string())).await?,
        ShellCommand::User(user) => {
            info!("Shell now acting as user {}", user);
            state.user = user;
        }
        ShellCommand::Run {
            operation,
            text,
            options,
        } => {
            if let Err(retry_after) = state.cooldown.check(&state.user, now) {
                adapter
                    .reject(sink, &CommandError::Cooldown { retry_after })
                    .await?;
                return Ok(true);
            }

            let invocation = Invocation::new(state.user.clone(), operation, text).with_options(options);
            if operation == Operation::Translate {
                if let Some(session) = adapter.start_translation(sink, &invocation, now).await? {
                    state.sessions.insert(state.user.clone(), session);
                }
            } else {
                adapter.handle(sink, &invocation).await?;
            }
            state.cooldown.prune(now);
            state.prune_sessions(now);
            state.cooldown.record_completion(&state.user, Instant::now());
        }
        ShellCommand::Genre(genre) => {
            with_session(sink, state, |session| session.select_genre(genre, now)).await?;
        }
        ShellCommand::Direction(direction) => {
            with_session(sink, state, |session| session.set_direction(direction, now)).await?;
        }
        ShellCommand::Go => match state.sessions.get_mut(&state.user) {
            Some(session) => {
                adapter.press_translate(sink, session, now).await?;
                state.prune_sessions(now);
            }
            None => sink.send(no_session()).await?,
        },
    }

    Ok(true)
}

async fn with_session<K, F>(sink: &mut K, state: &mut ShellState, update: F) -> anyhow::Result<()>
where
    K: ChatSink,
    F: FnOnce(&mut TranslationSession) -> Result<(), crate::session::SessionError>,
{
    let reply = match state.sessions.get_mut(&state.user) {
        None => no_session(),
        Some(session) => match update(session) {
            Ok(()) => session.prompt(),
            Err(e) => OutgoingMessage::Text(format!("❌ {}", e)),
        },
    };
    sink.send(reply).await
}

fn no_session() -> OutgoingMessage {
    OutgoingMessage::Text(
        "❌ No translation in progress. Start one with `/translate <text>`".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::Limits;
    use crate::console::ConsoleSink;
    use crate::payload::RawResponse;
    use crate::transport::TransportError;
    use aleph_types::{ProcessingRequest, ProcessingResult};
    use std::time::Duration;

    struct Offline;

    impl LinguisticService for Offline {
        async fn call(&self, _request: &ProcessingRequest) -> Result<RawResponse, TransportError> {
            Err(TransportError::Connect {
                detail: "offline".to_string(),
            })
        }
    }

    async fn run_lines(input: &str) -> String {
        let adapter = CommandAdapter::new(Offline, Limits::default());
        let mut sink = ConsoleSink::new(Vec::new());
        let mut state = ShellState::new(
            "tester",
            CooldownTracker::new(Duration::from_secs(30)),
            RequestOptions::default(),
        );
        run_shell(&adapter, input.as_bytes(), &mut sink, &mut state)
            .await
            .unwrap();
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn test_prune_drops_finished_and_expired_sessions() {
        let start = Instant::now();
        let mut state = ShellState::new(
            "tester",
            CooldownTracker::new(Duration::from_secs(30)),
            RequestOptions::default(),
        );

        let mut done = TranslationSession::new("a", "שלום", TranslationGenre::default(), 0.0, start);
        done.press_translate(&Limits::default(), start).unwrap();
        done.complete(&ProcessingResult::success("Hello".to_string(), vec![]))
            .unwrap();
        state.sessions.insert("a".to_string(), done);
        state.sessions.insert(
            "b".to_string(),
            TranslationSession::new("b", "שלום", TranslationGenre::default(), 0.0, start),
        );

        state.prune_sessions(start);
        assert!(!state.sessions.contains_key("a"));
        assert!(state.sessions.contains_key("b"));

        state.prune_sessions(start + crate::session::SESSION_TIMEOUT);
        assert!(state.sessions.is_empty());
    }

    #[tokio::test]
    async fn test_second_command_hits_cooldown() {
        let output = run_lines("/vowelize hello\n/vowelize שלום\n").await;
        assert!(output.contains("Please provide Hebrew text"));
        assert!(output.contains("Please wait"));
        assert_eq!(output.matches("... thinking").count(), 1);
    }

    #[tokio::test]
    async fn test_cooldown_is_per_user() {
        let output = run_lines("/vowelize hello\n/user other\n/vowelize hello\n").await;
        assert_eq!(output.matches("Please provide Hebrew text").count(), 2);
        assert!(!output.contains("Please wait"));
    }

    #[tokio::test]
    async fn test_session_commands_without_session() {
        let output = run_lines("/genre legal\n/go\nhello\n/help\n/quit\n/vowelize שלום\n").await;
        assert_eq!(output.matches("No translation in progress").count(), 2);
        assert!(output.contains("commands start with '/'"));
        assert!(output.contains("Commands:"));
        assert!(!output.contains("thinking"));
    }

    #[test]
    fn test_parse_run_keeps_text_verbatim() {
        let command = ShellCommand::parse("/vowelize   שלום  עולם").unwrap();
        assert_eq!(
            command,
            ShellCommand::Run {
                operation: Operation::Vowelize,
                text: "שלום  עולם".to_string(),
                options: RequestOptions::default(),
            }
        );
    }

    #[test]
    fn test_parse_options() {
        let ShellCommand::Run { options, text, .. } =
            ShellCommand::parse("/translate genre=legal direction=en-he temperature=0.5 hello there")
                .unwrap()
        else {
            panic!("expected run");
        };
        assert_eq!(text, "hello there");
        assert_eq!(options.translation_genre, TranslationGenre::Legal);
        assert_eq!(options.direction, Some(TranslationDirection::EnglishToHebrew));
        assert_eq!(options.temperature, 0.5);

        let ShellCommand::Run { options, .. } =
            ShellCommand::parse("/analyze genre=poetic שלום").unwrap()
        else {
            panic!("expected run");
        };
        assert_eq!(options.analysis_genre, AnalysisGenre::Poetic);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(ShellCommand::parse("שלום"), Err(ShellError::NotACommand));
        assert_eq!(
            ShellCommand::parse("/invite"),
            Err(ShellError::UnknownCommand("invite".to_string()))
        );
        assert_eq!(
            ShellCommand::parse("/genre"),
            Err(ShellError::MissingArgument("genre"))
        );
        assert!(matches!(
            ShellCommand::parse("/vowelize direction=he-en שלום"),
            Err(ShellError::UnknownOption(_))
        ));
        assert_eq!(
            ShellCommand::parse("/translate temperature=7 hi"),
            Err(ShellError::BadTemperature)
        );
        assert!(matches!(
            ShellCommand::parse("/genre poetic"),
            Err(ShellError::BadValue(_))
        ));
    }

    #[test]
    fn test_parse_uses_defaults() {
        let defaults = RequestOptions {
            translation_genre: TranslationGenre::Technical,
            ..RequestOptions::default()
        };
        let ShellCommand::Run { options, .. } =
            ShellCommand::parse_with("/translate hello", &defaults).unwrap()
        else {
            panic!("expected run");
        };
        assert_eq!(options.translation_genre, TranslationGenre::Technical);
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(ShellCommand::parse("/go").unwrap(), ShellCommand::Go);
        assert_eq!(ShellCommand::parse("  ").unwrap(), ShellCommand::Empty);
        assert_eq!(
            ShellCommand::parse("/genre biblical").unwrap(),
            ShellCommand::Genre(TranslationGenre::Biblical)
        );
        assert_eq!(
            ShellCommand::parse("/user 7").unwrap(),
            ShellCommand::User("7".to_string())
        );
    }
}
