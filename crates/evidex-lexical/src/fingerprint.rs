//! Corpus fingerprint: a cheap change detector for the lexical index.

use evidex_core::Passage;

/// blake3 over the corpus size and the leading `prefix_chars` characters of
/// each sampled passage. Detects additions, removals, and edits near the
/// front of the corpus without reading all of it.
pub fn corpus_fingerprint(total: usize, sample: &[Passage], prefix_chars: usize) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(total as u64).to_le_bytes());
    for passage in sample {
        let prefix = passage.content_prefix(prefix_chars);
        hasher.update(&(prefix.len() as u64).to_le_bytes());
        hasher.update(prefix.as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(texts: &[&str]) -> Vec<Passage> {
        texts.iter().map(|t| Passage::new(*t, "s")).collect()
    }

    #[test]
    fn deterministic() {
        let docs = corpus(&["alpha", "beta"]);
        assert_eq!(corpus_fingerprint(2, &docs, 100), corpus_fingerprint(2, &docs, 100));
    }

    #[test]
    fn changes_with_corpus_size() {
        let docs = corpus(&["alpha", "beta"]);
        assert_ne!(corpus_fingerprint(2, &docs, 100), corpus_fingerprint(3, &docs, 100));
    }

    #[test]
    fn changes_with_prefix_content() {
        let a = corpus(&["alpha", "beta"]);
        let b = corpus(&["alpha", "gamma"]);
        assert_ne!(corpus_fingerprint(2, &a, 100), corpus_fingerprint(2, &b, 100));
    }

    #[test]
    fn ignores_edits_past_the_prefix() {
        let a = corpus(&["0123456789 tail one"]);
        let b = corpus(&["0123456789 tail two"]);
        assert_eq!(corpus_fingerprint(1, &a, 10), corpus_fingerprint(1, &b, 10));
    }

    #[test]
    fn boundaries_between_documents_matter() {
        let a = corpus(&["ab", "c"]);
        let b = corpus(&["a", "bc"]);
        assert_ne!(corpus_fingerprint(2, &a, 100), corpus_fingerprint(2, &b, 100));
    }
}
