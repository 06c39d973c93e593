use anyhow::Result;
use aleph_types::{AnalysisGenre, Operation, RequestOptions, TranslationDirection, TranslationGenre};
use tokio::io::BufReader;
use tracing::info;

pub mod adapter;
pub mod config;
pub mod console;
pub mod cooldown;
pub mod labels;
pub mod morphology;
pub mod normalizer;
pub mod payload;
pub mod post_processing;
pub mod reassemble;
pub mod render;
pub mod retry;
pub mod session;
pub mod shell;
pub mod transport;
pub mod validator;

use adapter::{CommandAdapter, Invocation};
use config::Config;
use console::ConsoleSink;
use cooldown::CooldownTracker;
use shell::{run_shell, ShellState};
use transport::{DictaService, NakdanClient, TranslationClient};

/// What the binary was asked to do.
#[derive(Debug, Clone)]
pub enum BotCommand {
    /// Run one command and print the reply.
    Once {
        operation: Operation,
        text: String,
        overrides: OptionOverrides,
    },
    /// Interactive chat session on stdin/stdout.
    Shell { user: String },
}

/// Options given on the command line; unset ones fall back to configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionOverrides {
    pub analysis_genre: Option<AnalysisGenre>,
    pub direction: Option<TranslationDirection>,
    pub translation_genre: Option<TranslationGenre>,
    pub temperature: Option<f32>,
}

impl OptionOverrides {
    pub fn apply(&self, base: RequestOptions) -> RequestOptions {
        RequestOptions {
            analysis_genre: self.analysis_genre.unwrap_or(base.analysis_genre),
            direction: self.direction.or(base.direction),
            translation_genre: self.translation_genre.unwrap_or(base.translation_genre),
            temperature: self.temperature.unwrap_or(base.temperature),
        }
    }
}

/// Install the global subscriber: `RUST_LOG` wins, INFO otherwise, with the
/// HTTP/WebSocket stack held at WARN.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            "info,hyper=warn,reqwest=warn,tungstenite=warn,tokio_tungstenite=warn,rustls=warn",
        )
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn build_service(config: &Config) -> DictaService {
    let retry = config.retry_policy();
    DictaService::new(
        NakdanClient::new(&config.nakdan, retry.clone()),
        TranslationClient::new(&config.translation, retry),
    )
}

/// Option defaults taken from configuration.
pub fn default_options(config: &Config) -> RequestOptions {
    RequestOptions {
        translation_genre: config.translation.default_genre,
        temperature: config.translation.temperature,
        ..RequestOptions::default()
    }
}

#[tokio::main]
pub async fn run(command: BotCommand) -> Result<()> {
    init_tracing();

    let config = config::load_config();
    let limits = config.limits();
    info!(
        "Starting alephbot (max length {}, timeout {:?}, cooldown {:?})",
        limits.max_text_length, limits.timeout, limits.cooldown
    );

    let adapter = CommandAdapter::new(build_service(&config), limits);
    let mut sink = ConsoleSink::new(tokio::io::stdout());

    match command {
        BotCommand::Once {
            operation,
            text,
            overrides,
        } => {
            let options = overrides.apply(default_options(&config));
            let invocation = Invocation::new("cli", operation, text).with_options(options);
            let report = adapter.handle(&mut sink, &invocation).await?;
            if let Some(error) = report.result.error() {
                anyhow::bail!("{} failed: {}", operation, error);
            }
        }
        BotCommand::Shell { user } => {
            let mut state = ShellState::new(
                user,
                CooldownTracker::new(limits.cooldown),
                default_options(&config),
            );
            let input = BufReader::new(tokio::io::stdin());
            run_shell(&adapter, input, &mut sink, &mut state).await?;
        }
    }

    Ok(())
}
