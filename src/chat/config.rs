//! Configuration types for the chat application.
//!
//! Flags are parsed with `getopts` into [`ChatArgs`]; [`ChatConfig::resolve`]
//! then combines them with platform presets and the environment into the one
//! immutable configuration a session runs with.

use std::fmt;

use getopts::Options;

use crate::platform;

/// Model used when neither a flag, a preset nor `LLM_MODEL` names one.
pub const DEFAULT_MODEL: &str = "deepseek-r1";

/// Base URL used when neither a flag, a preset nor `LLM_BASE_URL` names one.
pub const DEFAULT_BASE_URL: &str = "https://api.lkeap.cloud.tencent.com/v1";

/// First message of every transcript.
pub const DEFAULT_SYSTEM_PROMPT: &str = "you are a helpful chatbot";

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "LLM_API_KEY";
/// Environment variable holding the base URL.
pub const ENV_BASE_URL: &str = "LLM_BASE_URL";
/// Environment variable holding the model name.
pub const ENV_MODEL: &str = "LLM_MODEL";

/// Command-line arguments for the thinkstream-chat tool.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChatArgs {
    /// Platform preset name.
    pub plat: Option<String>,
    /// API key.
    pub apikey: Option<String>,
    /// Model name.
    pub model: Option<String>,
    /// Base URL of the API.
    pub base_uri: Option<String>,
    /// Request and print token usage.
    pub verbose: bool,
    /// List models and exit.
    pub list: bool,
    /// System prompt for the conversation.
    pub system: Option<String>,
    /// Dim reasoning text with ANSI styles.
    pub color: bool,
}

/// Why [`ChatArgs::parse`] did not produce arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatArgsError {
    /// `--help` was given.
    Help,
    /// The flags could not be parsed.
    Usage(String),
}

impl fmt::Display for ChatArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatArgsError::Help => write!(f, "help requested"),
            ChatArgsError::Usage(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for ChatArgsError {}

impl ChatArgs {
    fn options() -> Options {
        let mut opts = Options::new();
        opts.long_only(true);
        opts.optopt(
            "",
            "plat",
            &format!("Platform preset ({})", platform::names()),
            "NAME",
        );
        opts.optopt("", "apikey", "API key (default: $LLM_API_KEY)", "KEY");
        opts.optopt(
            "",
            "model",
            &format!("Model to use (default: $LLM_MODEL or {DEFAULT_MODEL})"),
            "MODEL",
        );
        opts.optopt(
            "",
            "baseURI",
            &format!("Base URL (default: $LLM_BASE_URL or {DEFAULT_BASE_URL})"),
            "URL",
        );
        opts.optflag("v", "", "Print token usage after each answer");
        opts.optflag("", "list", "List available models and exit");
        opts.optopt(
            "",
            "system",
            &format!("System prompt (default: {DEFAULT_SYSTEM_PROMPT:?})"),
            "PROMPT",
        );
        opts.optflag("", "color", "Dim reasoning text");
        opts.optflag("h", "help", "Print this help");
        opts
    }

    /// Parse flags, not including the program name.
    ///
    /// Single-dash spellings are accepted for every flag.
    pub fn parse<I, S>(args: I) -> Result<Self, ChatArgsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let matches = Self::options()
            .parse(args)
            .map_err(|e| ChatArgsError::Usage(e.to_string()))?;
        if matches.opt_present("help") {
            return Err(ChatArgsError::Help);
        }
        Ok(Self {
            plat: matches.opt_str("plat"),
            apikey: matches.opt_str("apikey"),
            model: matches.opt_str("model"),
            base_uri: matches.opt_str("baseURI"),
            verbose: matches.opt_present("v"),
            list: matches.opt_present("list"),
            system: matches.opt_str("system"),
            color: matches.opt_present("color"),
        })
    }

    /// Usage text for `program`.
    pub fn usage(program: &str) -> String {
        Self::options().usage(&format!("Usage: {program} [OPTIONS]"))
    }
}

/// Configuration for a chat session.
///
/// Built once at startup and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,

    /// The model to use for generating responses.
    pub model: String,

    /// API key; empty means no `Authorization` header.
    pub api_key: String,

    /// Whether to request and print token usage.
    pub verbose: bool,

    /// Whether to list models instead of chatting.
    pub list_models: bool,

    /// First message of the transcript.
    pub system_prompt: String,

    /// Whether to use ANSI styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: String::new(),
            verbose: false,
            list_models: false,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            use_color: false,
        }
    }

    /// Resolve flags against presets, the environment and the defaults.
    ///
    /// Each value is taken from the first source that has it: flag, then
    /// `--plat` preset, then `env`, then the default. Unknown presets and
    /// empty environment values are ignored.
    pub fn resolve(args: ChatArgs, env: impl Fn(&str) -> Option<String>) -> Self {
        let env = |name: &str| env(name).filter(|value| !value.is_empty());
        let preset = args.plat.as_deref().and_then(platform::lookup);

        let base_url = args
            .base_uri
            .or_else(|| preset.map(|p| p.base_url.to_string()))
            .or_else(|| env(ENV_BASE_URL))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = args
            .model
            .or_else(|| preset.map(|p| p.model.to_string()))
            .or_else(|| env(ENV_MODEL))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_key = args
            .apikey
            .or_else(|| env(ENV_API_KEY))
            .unwrap_or_default();

        ChatConfig {
            base_url,
            model,
            api_key,
            verbose: args.verbose,
            list_models: args.list,
            system_prompt: args
                .system
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            use_color: args.color,
        }
    }

    /// Resolve against the process environment.
    pub fn from_env(args: ChatArgs) -> Self {
        Self::resolve(args, |name| std::env::var(name).ok())
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Sets whether token usage is requested and printed.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}
