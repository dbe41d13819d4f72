//! Input line classification for the chat application.
//!
//! Only two inputs are special: the literal `/bye` and the empty line.
//! Everything else, including text with surrounding whitespace, is a
//! message for the model.

/// Command that ends the conversation.
pub const QUIT_COMMAND: &str = "/bye";

/// What to do with one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputLine {
    /// Exit the chat application.
    Quit,
    /// Ignore the line; no request is sent.
    Skip,
    /// Send the line as a user message.
    Message(String),
}

/// Classify a line of input, without its trailing newline.
///
/// Matching is exact: `" /bye"` and `" "` are messages.
pub fn parse_input(line: &str) -> InputLine {
    match line {
        QUIT_COMMAND => InputLine::Quit,
        "" => InputLine::Skip,
        text => InputLine::Message(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quit() {
        assert_eq!(parse_input("/bye"), InputLine::Quit);
    }

    #[test]
    fn parse_empty() {
        assert_eq!(parse_input(""), InputLine::Skip);
    }

    #[test]
    fn matching_is_exact() {
        assert_eq!(parse_input("/bye "), InputLine::Message("/bye ".to_string()));
        assert_eq!(parse_input("/BYE"), InputLine::Message("/BYE".to_string()));
        assert_eq!(parse_input(" "), InputLine::Message(" ".to_string()));
    }

    #[test]
    fn ordinary_messages() {
        assert_eq!(
            parse_input("why is the sky blue?"),
            InputLine::Message("why is the sky blue?".to_string())
        );
        assert_eq!(parse_input("/help"), InputLine::Message("/help".to_string()));
    }
}
