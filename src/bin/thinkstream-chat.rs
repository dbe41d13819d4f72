//! Interactive console for reasoning models behind OpenAI-compatible APIs.
//!
//! Streams each answer as it arrives. Reasoning text is shown under a
//! `====thinking===` banner and the answer under `====result content===`.
//!
//! # Usage
//!
//! ```bash
//! # Default platform and model
//! thinkstream-chat
//!
//! # Pick a platform preset and show token usage
//! thinkstream-chat --plat deepseek --v
//!
//! # Any compatible server
//! thinkstream-chat --baseURI http://localhost:11434/v1 --model qwq
//!
//! # List the models a server offers
//! thinkstream-chat --plat groq --list
//! ```
//!
//! Type `/bye` to leave.

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use thinkstream::OpenAi;
use thinkstream::chat::{
    ChatArgs, ChatArgsError, ChatConfig, ChatSession, LineOutcome, PlainTextRenderer, Renderer,
};

const PROGRAM: &str = "thinkstream-chat";

/// Exit status for flag-usage errors and `--help`.
const USAGE_EXIT: u8 = 2;

/// Main entry point for the thinkstream-chat application.
#[tokio::main]
async fn main() -> ExitCode {
    let args = match ChatArgs::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(ChatArgsError::Help) => {
            eprint!("{}", ChatArgs::usage(PROGRAM));
            return ExitCode::from(USAGE_EXIT);
        }
        Err(ChatArgsError::Usage(message)) => {
            eprintln!("{message}");
            eprint!("{}", ChatArgs::usage(PROGRAM));
            return ExitCode::from(USAGE_EXIT);
        }
    };
    let config = ChatConfig::from_env(args);

    if config.list_models {
        list_models(&config).await;
        return ExitCode::SUCCESS;
    }

    let client = match OpenAi::new(config.api_key.clone(), config.base_url.clone()) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(USAGE_EXIT);
        }
    };

    // Flag for interrupt handling during streaming
    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_clone = interrupted.clone();
    if let Err(err) = ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::Relaxed);
    }) {
        // Streams can still be read; they just cannot be interrupted.
        eprintln!("{}", startup_message("Ctrl+C handler", &err));
    }

    let mut renderer =
        PlainTextRenderer::with_color(config.use_color).with_interrupt(interrupted.clone());
    let mut session = ChatSession::new(client, config);
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(err) => {
            eprintln!("{}", startup_message("Line editor", &err));
            return ExitCode::SUCCESS;
        }
    };

    println!("Conversation. Enter /bye to exit");
    println!("{}", "-".repeat(21));

    loop {
        // Reset interrupt flag before each input
        interrupted.store(false, Ordering::Relaxed);

        match rl.readline("> ") {
            Ok(line) => {
                if !line.is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }
                if session.handle_line(&line, &mut renderer).await == LineOutcome::Quit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    ExitCode::SUCCESS
}

fn startup_message(what: &str, err: &dyn std::error::Error) -> String {
    format!("{what} error: {err}")
}

async fn list_models(config: &ChatConfig) {
    let result = match OpenAi::new(config.api_key.clone(), config.base_url.clone()) {
        Ok(client) => client.list_models().await,
        Err(err) => Err(err),
    };
    match result {
        Ok(models) => {
            for model in models.models() {
                println!("{}", model.summary());
            }
        }
        Err(err) => println!("ListModels error: {err}"),
    }
}
