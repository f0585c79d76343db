//! Sliding-window text chunker.

/// Configuration for the chunker. Budgets are in characters of the
/// joined chunk text.
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    pub max_chars: usize,
    /// Character overlap between consecutive chunks.
    pub overlap_chars: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_chars: 4096,
            overlap_chars: 256,
        }
    }
}

/// Splits text into word-aligned chunks no longer than `max_chars`,
/// with consecutive chunks sharing roughly `overlap_chars` of trailing
/// context.
pub fn chunk_text(text: &str, config: &ChunkerConfig) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < words.len() {
        // Greedily take words until the character budget is spent; a
        // single oversized word still becomes its own chunk.
        let mut end = start;
        let mut len = 0;
        while end < words.len() {
            let add = words[end].len() + usize::from(end > start);
            if len + add > config.max_chars && end > start {
                break;
            }
            len += add;
            end += 1;
        }

        chunks.push(words[start..end].join(" "));

        if end == words.len() {
            break;
        }

        // Walk back from the cut point until the overlap budget is
        // covered, then resume there.
        let mut overlap = 0;
        let mut next = end;
        while next > start + 1 && overlap < config.overlap_chars {
            next -= 1;
            overlap += words[next].len() + 1;
        }
        start = next;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunks = chunk_text("a short abstract about reservoir computing", &ChunkerConfig::default());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], "a short abstract about reservoir computing");
    }

    #[test]
    fn test_long_text_splits_with_overlap() {
        let text = "word ".repeat(500);
        let config = ChunkerConfig {
            max_chars: 200,
            overlap_chars: 20,
        };
        let chunks = chunk_text(&text, &config);
        assert!(chunks.len() > 1, "long text should produce multiple chunks");
        for chunk in &chunks {
            assert!(chunk.len() <= 200);
        }
        // Consecutive chunks share trailing words.
        let first_tail = chunks[0].split_whitespace().last().unwrap();
        assert!(chunks[1].split_whitespace().any(|w| w == first_tail));
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        assert!(chunk_text("   \n  ", &ChunkerConfig::default()).is_empty());
    }

    #[test]
    fn test_every_word_survives_chunking() {
        let text: String = (0..300).map(|i| format!("w{i} ")).collect();
        let config = ChunkerConfig {
            max_chars: 120,
            overlap_chars: 10,
        };
        let chunks = chunk_text(&text, &config);
        let joined = chunks.join(" ");
        for i in 0..300 {
            assert!(joined.contains(&format!("w{i}")), "missing word w{i}");
        }
    }
}
