//! Console chat application module.
//!
//! This module provides a streaming REPL on top of the thinkstream client
//! library. Reasoning and answer text are shown as they arrive, separated by
//! phase banners.
//!
//! # Architecture
//!
//! - [`config`]: flag parsing and configuration resolution
//! - [`session`]: transcript management and one streamed turn at a time
//! - [`commands`]: input line classification

mod commands;
mod config;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{InputLine, QUIT_COMMAND, parse_input};
pub use config::{
    ChatArgs, ChatArgsError, ChatConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT,
    ENV_API_KEY, ENV_BASE_URL, ENV_MODEL,
};
pub use session::{ChatSession, LineOutcome, SessionStats};
