//! Mixed-script tokenizer.
//!
//! Each CJK unified ideograph is its own token; ASCII letter runs and digit
//! runs are tokens. Everything else separates tokens. Output is lowercase.

use std::sync::LazyLock;

use regex::Regex;

static TOKEN_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[\x{4e00}-\x{9fff}]|[a-z]+|[0-9]+").ok());

/// Split `text` into lowercase index terms.
pub fn tokenize(text: &str) -> Vec<String> {
    let Some(pattern) = TOKEN_PATTERN.as_ref() else {
        return Vec::new();
    };
    let lowered = text.to_lowercase();
    pattern
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_letters_and_digits() {
        assert_eq!(tokenize("HTTP2 over TLS1.3"), vec!["http", "2", "over", "tls", "1", "3"]);
    }

    #[test]
    fn cjk_ideographs_are_single_tokens() {
        assert_eq!(tokenize("检索增强"), vec!["检", "索", "增", "强"]);
    }

    #[test]
    fn mixed_script() {
        assert_eq!(tokenize("BM25检索"), vec!["bm", "25", "检", "索"]);
    }

    #[test]
    fn punctuation_and_whitespace_only() {
        assert!(tokenize("  ,.;!? \n").is_empty());
    }

    #[test]
    fn non_ascii_letters_are_separators() {
        assert_eq!(tokenize("café au lait"), vec!["caf", "au", "lait"]);
    }
}
