//! Classification of streamed deltas into a thinking phase and an answer phase.
//!
//! Reasoning models stream their "thinking" text before the answer. The
//! [`ChunkClassifier`] watches each delta of one stream and tells a
//! [`Renderer`] when to print the thinking banner, when to print the result
//! banner, and which text belongs to which phase.
//!
//! Per stream the classifier moves through three phases and never back:
//!
//! ```text
//! Idle ──reasoning──▶ Thinking ──no reasoning──▶ Answering
//!   └──────────────no reasoning──────────────────────▲
//! ```
//!
//! A delta with neither reasoning nor answer text is a heartbeat: it prints
//! nothing and changes nothing.

use crate::render::Renderer;
use crate::types::{ChatCompletionChunk, Delta, Usage};

/// When to print the result banner on entering the answer phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// Only when a thinking phase came first.
    AfterThinking,
    /// Every time the answer phase starts, thinking or not.
    Always,
}

/// The result-banner policy used by the console.
pub const RESULT_BANNER_POLICY: BoundaryPolicy = BoundaryPolicy::AfterThinking;

/// Where a stream currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No text seen yet.
    #[default]
    Idle,
    /// Reasoning text is streaming.
    Thinking,
    /// The answer has started; terminal for the stream.
    Answering,
}

/// What a finished stream produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnOutcome {
    /// The last usage record seen in the stream.
    pub usage: Option<Usage>,
    /// All reasoning fragments, concatenated.
    pub reasoning: String,
    /// All answer fragments, concatenated.
    pub answer: String,
    /// Number of chunks observed.
    pub chunk_count: u64,
}

/// Render state for a single stream.
///
/// Create one per stream; it starts in [`Phase::Idle`].
#[derive(Debug, Clone)]
pub struct ChunkClassifier {
    policy: BoundaryPolicy,
    phase: Phase,
    has_reasoning: bool,
    outcome: TurnOutcome,
}

impl ChunkClassifier {
    /// A classifier using [`RESULT_BANNER_POLICY`].
    pub fn new() -> Self {
        Self::with_policy(RESULT_BANNER_POLICY)
    }

    /// A classifier using `policy` for the result banner.
    pub fn with_policy(policy: BoundaryPolicy) -> Self {
        Self {
            policy,
            phase: Phase::Idle,
            has_reasoning: false,
            outcome: TurnOutcome::default(),
        }
    }

    /// The current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True once any reasoning text has been seen.
    pub fn has_reasoning(&self) -> bool {
        self.has_reasoning
    }

    /// True once the answer phase has begun.
    pub fn is_answering(&self) -> bool {
        self.phase == Phase::Answering
    }

    /// The last usage record seen so far.
    pub fn usage(&self) -> Option<Usage> {
        self.outcome.usage
    }

    /// Feed one chunk.
    ///
    /// The usage record is captured even when the chunk has no choices.
    pub fn observe(&mut self, chunk: &ChatCompletionChunk, renderer: &mut dyn Renderer) {
        self.outcome.chunk_count += 1;
        if let Some(usage) = chunk.usage {
            self.outcome.usage = Some(usage);
        }
        for delta in chunk.deltas() {
            self.classify(delta, renderer);
        }
    }

    /// Feed one delta.
    pub fn classify(&mut self, delta: &Delta, renderer: &mut dyn Renderer) {
        if delta.is_blank() {
            return;
        }
        let reasoning = delta.reasoning_text();
        let answer = delta.answer_text();

        if !reasoning.is_empty() && self.phase == Phase::Idle {
            self.phase = Phase::Thinking;
            renderer.print_thinking_banner();
        }
        if reasoning.is_empty() && self.phase != Phase::Answering {
            if self.phase == Phase::Thinking || self.policy == BoundaryPolicy::Always {
                renderer.print_result_banner();
            }
            self.phase = Phase::Answering;
        }

        if !reasoning.is_empty() {
            self.has_reasoning = true;
            self.outcome.reasoning.push_str(reasoning);
            renderer.print_reasoning(reasoning);
        }
        if !answer.is_empty() {
            self.outcome.answer.push_str(answer);
            renderer.print_answer(answer);
        }
    }

    /// End the stream and hand back what it produced.
    pub fn finish(self) -> TurnOutcome {
        self.outcome
    }
}

impl Default for ChunkClassifier {
    fn default() -> Self {
        Self::new()
    }
}
