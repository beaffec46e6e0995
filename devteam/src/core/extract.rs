//! Extraction of fenced code blocks from model output.

use std::sync::LazyLock;

use regex::Regex;

static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_+.-]*[ \t]*\r?\n(.*?)```").expect("fence regex is valid")
});

/// Return the body of the first fenced code block, or `None` if there is none.
pub fn first_code_block(text: &str) -> Option<&str> {
    FENCE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Return the first fenced block, falling back to the full text.
pub fn code_or_text(text: &str) -> &str {
    first_code_block(text).unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_tagged_block() {
        let text = "Here you go:\n```python\nfrom flask import Flask\napp = Flask(__name__)\n```\nand\n```\nother\n```";
        assert_eq!(
            first_code_block(text),
            Some("from flask import Flask\napp = Flask(__name__)\n")
        );
    }

    #[test]
    fn untagged_fence_is_accepted() {
        assert_eq!(first_code_block("```\nx = 1\n```"), Some("x = 1\n"));
    }

    #[test]
    fn falls_back_to_full_text() {
        let text = "def test_hello():\n    assert True\n";
        assert_eq!(first_code_block(text), None);
        assert_eq!(code_or_text(text), text);
    }
}
