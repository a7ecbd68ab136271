//! Standard assertion helpers for tests

use formwork_core::Message;

/// Assert a node's current validity.
#[macro_export]
macro_rules! assert_validity {
    ($node:expr, $expected:expr) => {{
        let actual = $crate::formwork_core::Stateful::state(&$node).validity;
        assert_eq!(
            actual, $expected,
            "Expected validity {}, found {}",
            $expected, actual
        )
    }};
}

/// Assert the texts of a node's current messages, in order.
#[macro_export]
macro_rules! assert_messages {
    ($node:expr, [$($text:expr),* $(,)?]) => {{
        let state = $crate::formwork_core::Stateful::state(&$node);
        let expected: Vec<&str> = vec![$($text),*];
        assert_eq!(
            $crate::message_texts(&state.messages),
            expected,
            "Unexpected messages"
        )
    }};
}

/// The text of every message, in order.
pub fn message_texts(messages: &[Message]) -> Vec<&str> {
    messages.iter().map(|message| message.text.as_str()).collect()
}
