//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the transcript
//! and drives one streamed turn at a time through a [`ChatBackend`].

use crate::chat::commands::{InputLine, parse_input};
use crate::chat::config::ChatConfig;
use crate::error::Result;
use crate::observability::{CHAT_TURN_ERRORS, CHAT_TURNS};
use crate::types::{ChatCompletionRequest, ChatMessage, Usage};
use crate::{ChatBackend, ChunkClassifier, Renderer, TurnOutcome};

/// A chat session that manages conversation state and API interactions.
///
/// The transcript starts with the system prompt and only ever grows.
pub struct ChatSession<B: ChatBackend> {
    backend: B,
    config: ChatConfig,
    messages: Vec<ChatMessage>,
    usage_totals: Usage,
    last_turn_usage: Option<Usage>,
    request_count: u64,
}

/// What [`ChatSession::handle_line`] did with a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// The user asked to leave.
    Quit,
    /// The line was empty; nothing was sent.
    Skipped,
    /// A turn ran to completion or was interrupted.
    Answered,
    /// A turn failed; the error has been printed.
    Failed,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    /// The model used for the session.
    pub model: String,
    /// The number of messages in the transcript, system prompt included.
    pub message_count: usize,
    /// Total number of API requests made.
    pub total_requests: u64,
    /// Usage summed over every turn that reported it.
    pub total_usage: Usage,
    /// Usage of the last turn that reported it.
    pub last_turn_usage: Option<Usage>,
}

impl<B: ChatBackend> ChatSession<B> {
    /// Creates a new chat session with the given backend and configuration.
    pub fn new(backend: B, config: ChatConfig) -> Self {
        let messages = vec![ChatMessage::system(config.system_prompt.clone())];
        Self {
            backend,
            config,
            messages,
            usage_totals: Usage::default(),
            last_turn_usage: None,
            request_count: 0,
        }
    }

    /// The configuration this session runs with.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// The transcript so far.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Returns the number of messages in the conversation.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Handle one line of console input.
    pub async fn handle_line(&mut self, line: &str, renderer: &mut dyn Renderer) -> LineOutcome {
        match parse_input(line) {
            InputLine::Quit => LineOutcome::Quit,
            InputLine::Skip => LineOutcome::Skipped,
            InputLine::Message(text) => match self.send_streaming(&text, renderer).await {
                Ok(_) => LineOutcome::Answered,
                Err(_) => LineOutcome::Failed,
            },
        }
    }

    /// Sends a user message and streams the response.
    ///
    /// The user message stays in the transcript whatever happens. The
    /// answer text is appended as an assistant message once the stream
    /// ends normally. The stream is closed on every path out of the turn.
    ///
    /// # Errors
    ///
    /// Returns the error that ended the turn, after printing it.
    pub async fn send_streaming(
        &mut self,
        user_input: &str,
        renderer: &mut dyn Renderer,
    ) -> Result<TurnOutcome> {
        CHAT_TURNS.click();
        self.messages.push(ChatMessage::user(user_input));

        let request = ChatCompletionRequest::new(self.config.model.clone(), self.messages.clone())
            .with_usage(self.config.verbose);
        self.request_count = self.request_count.saturating_add(1);

        let mut stream = match self.backend.open_stream(&request).await {
            Ok(stream) => stream,
            Err(err) => {
                CHAT_TURN_ERRORS.click();
                renderer.print_error(&format!("ChatCompletionStream error: {err}"));
                return Err(err);
            }
        };

        let mut classifier = ChunkClassifier::new();
        let received = loop {
            if renderer.should_interrupt() {
                renderer.print_interrupted();
                break Ok(false);
            }
            match stream.recv().await {
                Ok(Some(chunk)) => classifier.observe(&chunk, renderer),
                Ok(None) => break Ok(true),
                Err(err) => break Err(err),
            }
        };
        stream.close();
        let outcome = classifier.finish();

        match received {
            Ok(completed) => {
                if let Some(usage) = outcome.usage {
                    self.record_usage(usage);
                }
                if completed {
                    match outcome.usage {
                        Some(usage) if self.config.verbose => renderer.print_usage(&usage),
                        _ => renderer.finish_response(),
                    }
                    if !outcome.answer.is_empty() {
                        self.messages
                            .push(ChatMessage::assistant(outcome.answer.clone()));
                    }
                }
                Ok(outcome)
            }
            Err(err) => {
                CHAT_TURN_ERRORS.click();
                renderer.finish_response();
                renderer.print_error(&format!("Stream error: {err}"));
                Err(err)
            }
        }
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            model: self.config.model.clone(),
            message_count: self.message_count(),
            total_requests: self.request_count,
            total_usage: self.usage_totals,
            last_turn_usage: self.last_turn_usage,
        }
    }

    fn record_usage(&mut self, usage: Usage) {
        self.last_turn_usage = Some(usage);
        self.usage_totals = self.usage_totals + usage;
    }
}
