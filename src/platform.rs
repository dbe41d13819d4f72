//! Named presets for OpenAI-compatible providers.
//!
//! `--plat <name>` picks a base URL and a default model from this table.

/// A provider preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    /// Short name given to `--plat`.
    pub name: &'static str,
    /// Base URL of the provider's OpenAI-compatible API.
    pub base_url: &'static str,
    /// Model used when none is given explicitly.
    pub model: &'static str,
}

/// Every known preset.
pub const PLATFORMS: &[Platform] = &[
    Platform {
        name: "tencent",
        base_url: "https://api.lkeap.cloud.tencent.com/v1",
        model: "deepseek-r1",
    },
    Platform {
        name: "aliyun",
        base_url: "https://dashscope.aliyuncs.com/compatible-mode/v1",
        model: "deepseek-r1",
    },
    Platform {
        name: "groq",
        base_url: "https://api.groq.com/openai/v1",
        model: "llama-3.3-70b-versatile",
    },
    Platform {
        name: "gemini",
        base_url: "https://generativelanguage.googleapis.com/v1beta/openai",
        model: "gemini-2.0-flash-thinking-exp",
    },
    Platform {
        name: "siliconflow",
        base_url: "https://api.siliconflow.cn/v1",
        model: "deepseek-ai/DeepSeek-R1",
    },
    Platform {
        name: "deepseek",
        base_url: "https://api.deepseek.com/v1",
        model: "deepseek-reasoner",
    },
];

/// Look up a preset by its exact name.
pub fn lookup(name: &str) -> Option<&'static Platform> {
    PLATFORMS.iter().find(|platform| platform.name == name)
}

/// Comma-separated preset names, for usage text.
pub fn names() -> String {
    PLATFORMS
        .iter()
        .map(|platform| platform.name)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_known() {
        let groq = lookup("groq").unwrap();
        assert_eq!(groq.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(groq.model, "llama-3.3-70b-versatile");
    }

    #[test]
    fn lookup_is_exact() {
        assert!(lookup("Groq").is_none());
        assert!(lookup("").is_none());
        assert!(lookup("openai").is_none());
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<_> = PLATFORMS.iter().map(|p| p.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), PLATFORMS.len());
        assert!(super::names().starts_with("tencent, aliyun"));
    }
}
