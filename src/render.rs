//! Output rendering for streamed chat turns.
//!
//! This module provides the renderer trait the chunk classifier writes to and
//! a plain-text implementation that prints the phase banners and streamed
//! text to any [`Write`] sink.

use std::io::{self, Stdout, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::types::Usage;

/// Banner printed once when a stream starts producing reasoning text.
pub const THINKING_BANNER: &str = "====thinking===";

/// Banner printed once when the answer follows a thinking phase.
pub const RESULT_BANNER: &str = "====result content===";

/// ANSI escape code for dim text (used for reasoning).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for italic text (used for reasoning).
const ANSI_ITALIC: &str = "\x1b[3m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// Trait for rendering a streamed turn.
///
/// The chunk classifier decides *what* happens (banners, text, usage); the
/// renderer decides how it looks.
pub trait Renderer: Send {
    /// Called once per stream, before the first reasoning text.
    fn print_thinking_banner(&mut self);

    /// Called at most once per stream, when the answer phase starts.
    fn print_result_banner(&mut self);

    /// Print a chunk of reasoning text.
    fn print_reasoning(&mut self, text: &str);

    /// Print a chunk of answer text.
    ///
    /// This is called incrementally as tokens are streamed from the API.
    fn print_answer(&mut self, text: &str);

    /// Print the token usage of the finished turn.
    ///
    /// Ends the turn, so `finish_response` is not called afterwards.
    fn print_usage(&mut self, usage: &Usage);

    /// Called when a turn is complete and no usage is shown.
    fn finish_response(&mut self);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Called when the stream is interrupted by the user.
    fn print_interrupted(&mut self) {}

    /// Returns true if streaming should be interrupted.
    fn should_interrupt(&self) -> bool {
        false
    }
}

/// Plain text renderer with optional ANSI styling.
///
/// Banners and text are written exactly as they arrive; with color enabled,
/// reasoning text is additionally dimmed.
pub struct PlainTextRenderer<W: Write + Send = Stdout> {
    out: W,
    use_color: bool,
    in_reasoning: bool,
    interrupted: Option<Arc<AtomicBool>>,
}

impl PlainTextRenderer<Stdout> {
    /// Creates a new PlainTextRenderer on stdout without colors.
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }

    /// Creates a new PlainTextRenderer on stdout with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        let mut renderer = Self::new();
        renderer.use_color = use_color;
        renderer
    }
}

impl<W: Write + Send> PlainTextRenderer<W> {
    /// Creates a renderer that writes to `out`.
    pub fn with_writer(out: W) -> Self {
        Self {
            out,
            use_color: false,
            in_reasoning: false,
            interrupted: None,
        }
    }

    /// Attaches an interrupt flag to the renderer.
    pub fn with_interrupt(mut self, interrupted: Arc<AtomicBool>) -> Self {
        self.interrupted = Some(interrupted);
        self
    }

    /// Consumes the renderer and returns its sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, text: &str) {
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
    }

    fn reset_styles(&mut self) {
        if self.in_reasoning {
            if self.use_color {
                self.write(ANSI_RESET);
            }
            self.in_reasoning = false;
        }
    }
}

impl Default for PlainTextRenderer<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> Renderer for PlainTextRenderer<W> {
    fn print_thinking_banner(&mut self) {
        self.reset_styles();
        self.write(&format!("{THINKING_BANNER}\n"));
    }

    fn print_result_banner(&mut self) {
        self.reset_styles();
        self.write(&format!("\n{RESULT_BANNER}\n"));
    }

    fn print_reasoning(&mut self, text: &str) {
        if self.use_color && !self.in_reasoning {
            self.write(ANSI_DIM);
            self.write(ANSI_ITALIC);
        }
        self.in_reasoning = true;
        self.write(text);
    }

    fn print_answer(&mut self, text: &str) {
        self.reset_styles();
        self.write(text);
    }

    fn print_usage(&mut self, usage: &Usage) {
        self.reset_styles();
        self.write(&format!(
            "\n\nPromptTokens: {}, CompletionTokens: {}, Total: {}\n",
            usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        ));
    }

    fn finish_response(&mut self) {
        self.reset_styles();
        self.write("\n");
    }

    fn print_error(&mut self, error: &str) {
        self.reset_styles();
        self.write(&format!("{error}\n"));
    }

    fn print_info(&mut self, info: &str) {
        self.reset_styles();
        self.write(&format!("{info}\n"));
    }

    fn print_interrupted(&mut self) {
        self.reset_styles();
        self.write("\n[interrupted]\n");
    }

    fn should_interrupt(&self) -> bool {
        self.interrupted
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(f: impl FnOnce(&mut PlainTextRenderer<Vec<u8>>)) -> String {
        let mut renderer = PlainTextRenderer::with_writer(Vec::new());
        f(&mut renderer);
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn renderer_default_has_no_color() {
        let renderer = PlainTextRenderer::new();
        assert!(!renderer.use_color);
    }

    #[test]
    fn renderer_with_color() {
        let renderer = PlainTextRenderer::with_color(true);
        assert!(renderer.use_color);
    }

    #[test]
    fn banners_and_text() {
        let out = rendered(|r| {
            r.print_thinking_banner();
            r.print_reasoning("a");
            r.print_reasoning("b");
            r.print_result_banner();
            r.print_answer("x");
            r.finish_response();
        });
        assert_eq!(out, "====thinking===\nab\n====result content===\nx\n");
    }

    #[test]
    fn usage_line() {
        let out = rendered(|r| r.print_usage(&Usage::new(10, 20, 30)));
        assert_eq!(out, "\n\nPromptTokens: 10, CompletionTokens: 20, Total: 30\n");
    }

    #[test]
    fn color_wraps_reasoning_once() {
        let mut renderer = PlainTextRenderer::with_writer(Vec::new());
        renderer.use_color = true;
        renderer.print_reasoning("a");
        renderer.print_reasoning("b");
        renderer.print_answer("x");
        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(out, format!("{ANSI_DIM}{ANSI_ITALIC}ab{ANSI_RESET}x"));
    }

    #[test]
    fn interrupt_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        let renderer = PlainTextRenderer::with_writer(Vec::new()).with_interrupt(flag.clone());
        assert!(!renderer.should_interrupt());
        flag.store(true, Ordering::Relaxed);
        assert!(renderer.should_interrupt());
    }
}
