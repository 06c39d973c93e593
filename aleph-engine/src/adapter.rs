//! Command lifecycle: validate, call, normalize, render, send.

use crate::normalizer::normalize;
use crate::render::{render_cooldown, render_error, render_result, OutgoingMessage};
use crate::session::TranslationSession;
use crate::transport::{code_points, LinguisticService};
use crate::validator::validate;
use aleph_types::{
    Operation, ProcessingRequest, ProcessingResult, RequestOptions, DEFAULT_MAX_TEXT_LENGTH,
    DEFAULT_TIMEOUT,
};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Delivery side of the chat framework.
pub trait ChatSink: Send {
    /// Acknowledge the interaction before slow work starts.
    fn defer(&mut self) -> impl Future<Output = anyhow::Result<()>> + Send;

    fn send(&mut self, message: OutgoingMessage) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// Caller-supplied limits applied to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_text_length: usize,
    pub timeout: Duration,
    pub cooldown: Duration,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
            timeout: DEFAULT_TIMEOUT,
            cooldown: Duration::from_secs(30),
        }
    }
}

/// One command as triggered by a user.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub user_id: String,
    pub operation: Operation,
    pub text: String,
    pub options: RequestOptions,
}

impl Invocation {
    pub fn new(user_id: impl Into<String>, operation: Operation, text: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            operation,
            text: text.into(),
            options: RequestOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Validating,
    Calling,
    Normalizing,
    Rendering,
    Sent,
    Failed,
}

/// What happened to one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationReport {
    pub stages: Vec<Stage>,
    pub result: ProcessingResult,
}

impl InvocationReport {
    pub fn final_stage(&self) -> Stage {
        self.stages.last().copied().unwrap_or(Stage::Received)
    }
}

/// Rejections raised by the chat framework before the adapter runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("command on cooldown, retry after {retry_after:?}")]
    Cooldown { retry_after: Duration },
}

pub struct CommandAdapter<S> {
    service: S,
    limits: Limits,
}

impl<S: LinguisticService> CommandAdapter<S> {
    pub fn new(service: S, limits: Limits) -> Self {
        Self { service, limits }
    }

    pub fn request_for(&self, invocation: &Invocation) -> ProcessingRequest {
        ProcessingRequest::new(invocation.text.clone(), invocation.operation)
            .with_options(invocation.options.clone())
            .with_limits(self.limits.timeout, self.limits.max_text_length)
    }

    /// Validate, call and normalize without touching a sink.
    pub async fn process(&self, request: &ProcessingRequest) -> ProcessingResult {
        let mut stages = Vec::new();
        self.run(request, &mut stages).await
    }

    async fn run(&self, request: &ProcessingRequest, stages: &mut Vec<Stage>) -> ProcessingResult {
        stages.push(Stage::Validating);
        if let Some(error) = validate(
            &request.text,
            request.max_length,
            request.operation.required_script(),
        ) {
            info!("Rejected {} input: {}", request.operation, error);
            return ProcessingResult::failure(error);
        }

        stages.push(Stage::Calling);
        let raw = match self.service.call(request).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(
                    "{} failed for text [{}]: {}",
                    request.operation,
                    code_points(&request.text),
                    e
                );
                return ProcessingResult::failure(e.to_error_info());
            }
        };

        stages.push(Stage::Normalizing);
        normalize(&raw, request.operation)
    }

    /// Run one invocation end to end. Every path sends exactly one reply
    /// (split across messages only when it exceeds the size limits).
    pub async fn handle<K: ChatSink>(
        &self,
        sink: &mut K,
        invocation: &Invocation,
    ) -> anyhow::Result<InvocationReport> {
        info!(
            "{} command triggered by {}",
            invocation.operation, invocation.user_id
        );
        let request = self.request_for(invocation);
        self.handle_request(sink, &request).await
    }

    pub async fn handle_request<K: ChatSink>(
        &self,
        sink: &mut K,
        request: &ProcessingRequest,
    ) -> anyhow::Result<InvocationReport> {
        let mut stages = vec![Stage::Received];
        sink.defer().await?;

        let result = self.run(request, &mut stages).await;

        if let Some(error) = result.error() {
            sink.send(render_error(error, request.operation, request.max_length))
                .await?;
            stages.push(Stage::Failed);
            return Ok(InvocationReport { stages, result });
        }

        stages.push(Stage::Rendering);
        let messages = render_result(request, &result);
        if messages.len() > 1 {
            info!("Reply split into {} messages", messages.len());
        }
        for message in messages {
            sink.send(message).await?;
        }
        stages.push(Stage::Sent);

        Ok(InvocationReport { stages, result })
    }

    /// Open an interactive translation. Invalid text is answered with its
    /// error message and yields no session.
    pub async fn start_translation<K: ChatSink>(
        &self,
        sink: &mut K,
        invocation: &Invocation,
        now: Instant,
    ) -> anyhow::Result<Option<TranslationSession>> {
        info!("translate command triggered by {}", invocation.user_id);
        sink.defer().await?;

        if let Some(error) = validate(
            &invocation.text,
            self.limits.max_text_length,
            Operation::Translate.required_script(),
        ) {
            sink.send(render_error(&error, Operation::Translate, self.limits.max_text_length))
                .await?;
            return Ok(None);
        }

        let mut session = TranslationSession::new(
            invocation.user_id.clone(),
            invocation.text.clone(),
            invocation.options.translation_genre,
            invocation.options.temperature,
            now,
        );
        if let Some(direction) = invocation.options.direction {
            session.set_direction(direction, now)?;
        }
        sink.send(session.prompt()).await?;
        Ok(Some(session))
    }

    /// Translate-button handler for an open session.
    pub async fn press_translate<K: ChatSink>(
        &self,
        sink: &mut K,
        session: &mut TranslationSession,
        now: Instant,
    ) -> anyhow::Result<Option<InvocationReport>> {
        let request = match session.press_translate(&self.limits, now) {
            Ok(request) => request,
            Err(e) => {
                warn!("Translate pressed on unusable session: {}", e);
                sink.send(OutgoingMessage::Text(format!("❌ {}", capitalize(&e.to_string()))))
                    .await?;
                return Ok(None);
            }
        };

        let report = self.handle_request(sink, &request).await?;
        session.complete(&report.result)?;
        Ok(Some(report))
    }

    /// Render a framework-side rejection.
    pub async fn reject<K: ChatSink>(&self, sink: &mut K, error: &CommandError) -> anyhow::Result<()> {
        match error {
            CommandError::Cooldown { retry_after } => {
                info!("Cooldown rejection, retry after {:?}", retry_after);
                sink.send(render_cooldown(*retry_after)).await
            }
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
