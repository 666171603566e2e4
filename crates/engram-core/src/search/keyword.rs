//! Keyword query preparation for full-text search
//!
//! Host queries are natural language; FTS engines are not. The sanitizer
//! strips the meta-characters that make FTS parsers choke, drops stop
//! words, and joins what remains with OR semantics. A malformed query must
//! never propagate to the backend.

/// Characters with meaning to FTS query parsers, stripped before matching
const FTS_META_CHARS: &[char] = &['?', '*', '-', '\'', '"', ','];

/// Common words that carry no retrieval signal
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "can", "did",
    "do", "does", "for", "from", "had", "has", "have", "how", "i", "if",
    "in", "into", "is", "it", "its", "me", "my", "no", "not", "of", "on",
    "or", "our", "so", "than", "that", "the", "their", "them", "then",
    "there", "these", "they", "this", "to", "was", "we", "were", "what",
    "when", "where", "which", "who", "why", "will", "with", "you", "your",
];

/// Whether a token is a stop word
pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

/// Lowercased, meta-stripped, stop-word-free tokens of a query.
///
/// An empty result means the query carried no searchable signal and the
/// caller should fall back to a full scan.
pub fn query_tokens(query: &str) -> Vec<String> {
    let cleaned: String = query
        .to_lowercase()
        .chars()
        .map(|c| if FTS_META_CHARS.contains(&c) { ' ' } else { c })
        .collect();

    cleaned
        .split_whitespace()
        .filter(|t| !is_stop_word(t))
        .map(|t| t.to_string())
        .collect()
}

/// Sanitized OR-of-keywords FTS query string. Empty when no tokens remain.
pub fn sanitize_fts_query(query: &str) -> String {
    query_tokens(query).join(" OR ")
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_characters_stripped() {
        let sanitized = sanitize_fts_query("what's the \"deploy\" command?");
        assert!(!sanitized.contains('\''));
        assert!(!sanitized.contains('"'));
        assert!(!sanitized.contains('?'));
        assert_eq!(sanitized, "s OR deploy OR command");
    }

    #[test]
    fn test_stop_words_dropped() {
        assert_eq!(sanitize_fts_query("what is the coffee"), "coffee");
    }

    #[test]
    fn test_stop_word_only_query_is_empty() {
        assert_eq!(sanitize_fts_query("what is the"), "");
        assert!(query_tokens("  ").is_empty());
    }

    #[test]
    fn test_or_semantics() {
        assert_eq!(
            sanitize_fts_query("espresso machine maintenance"),
            "espresso OR machine OR maintenance"
        );
    }

    #[test]
    fn test_tokens_lowercased() {
        assert_eq!(query_tokens("Espresso BEANS"), vec!["espresso", "beans"]);
    }
}
