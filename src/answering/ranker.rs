//! Keyword-overlap sentence ranking for questions no rule answers

use crate::config::AnsweringConfig;

/// Question words carrying no topical signal
pub const STOP_WORDS: [&str; 11] = [
    "what", "when", "where", "how", "does", "this", "that", "the", "and", "are", "any",
];

/// Keywords must be longer than this many characters
const MIN_KEYWORD_CHARS: usize = 3;

/// A candidate sentence and the number of distinct question keywords it contains
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredSentence {
    pub text: String,
    pub score: usize,
}

/// Ranks document sentences by lexical overlap with the question
#[derive(Debug, Clone)]
pub struct LexicalRanker {
    max_sentences: usize,
    min_sentence_chars: usize,
}

impl Default for LexicalRanker {
    fn default() -> Self {
        Self::new(&AnsweringConfig::default())
    }
}

impl LexicalRanker {
    pub fn new(config: &AnsweringConfig) -> Self {
        Self {
            max_sentences: config.max_ranked_sentences,
            min_sentence_chars: config.min_sentence_chars,
        }
    }

    /// Split on sentence punctuation, dropping short fragments such as headers
    pub fn sentences<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.split(|c: char| matches!(c, '.' | '!' | '?'))
            .map(str::trim)
            .filter(|s| s.chars().count() > self.min_sentence_chars)
            .collect()
    }

    /// Distinct lowercased question tokens worth matching on
    pub fn keywords(question: &str) -> Vec<String> {
        let mut keywords: Vec<String> = Vec::new();

        for word in question.split_whitespace() {
            let word = word.to_lowercase();
            if word.chars().count() <= MIN_KEYWORD_CHARS || STOP_WORDS.contains(&word.as_str()) {
                continue;
            }
            if !keywords.contains(&word) {
                keywords.push(word);
            }
        }

        keywords
    }

    /// Sentences with a positive score, best first, document order kept among ties
    pub fn rank(&self, document_text: &str, question: &str) -> Vec<ScoredSentence> {
        let keywords = Self::keywords(question);
        if keywords.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<ScoredSentence> = self
            .sentences(document_text)
            .into_iter()
            .filter_map(|sentence| {
                let lowered = sentence.to_lowercase();
                let score = keywords
                    .iter()
                    .filter(|keyword| lowered.contains(keyword.as_str()))
                    .count();
                (score > 0).then(|| ScoredSentence {
                    text: sentence.to_string(),
                    score,
                })
            })
            .collect();

        // sort_by is stable
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored
    }

    /// Top sentences joined by a single space, or None if nothing overlaps
    pub fn answer(&self, document_text: &str, question: &str) -> Option<String> {
        let ranked = self.rank(document_text, question);
        if ranked.is_empty() {
            return None;
        }

        let top: Vec<&str> = ranked
            .iter()
            .take(self.max_sentences)
            .map(|s| s.text.as_str())
            .collect();

        Some(top.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_filter_short_and_stop_words() {
        let keywords = LexicalRanker::keywords("What does this policy say about Room charges?");
        assert_eq!(keywords, vec!["policy", "about", "room", "charges?"]);
    }

    #[test]
    fn test_keywords_are_distinct() {
        let keywords = LexicalRanker::keywords("claim claim CLAIM settlement");
        assert_eq!(keywords, vec!["claim", "settlement"]);
    }

    #[test]
    fn test_short_sentences_are_discarded() {
        let ranker = LexicalRanker::default();
        let sentences = ranker.sentences("Section 4. Claims must be filed within ninety days!");
        assert_eq!(sentences, vec!["Claims must be filed within ninety days"]);
    }

    #[test]
    fn test_exactly_twenty_chars_is_too_short() {
        let ranker = LexicalRanker::default();
        // 20 characters after trimming
        assert!(ranker.sentences("  Cats are allowed now.  ").is_empty());
        assert_eq!(ranker.sentences("Cats are allowed okay.").len(), 1);
    }

    #[test]
    fn test_rank_orders_by_score_then_document_order() {
        let ranker = LexicalRanker::default();
        let doc = "Cats are independent animals overall. \
                   The dog ran very fast across the field. \
                   Cats and dogs can play together nicely. \
                   Cats purr when they are content at home.";
        let ranked = ranker.rank(doc, "Tell me about cats and dogs");

        let texts: Vec<&str> = ranked.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Cats and dogs can play together nicely",
                "Cats are independent animals overall",
                "Cats purr when they are content at home",
            ]
        );
        assert_eq!(ranked[0].score, 2);
        assert_eq!(ranked[1].score, 1);
    }

    #[test]
    fn test_repeated_keyword_counts_once() {
        let ranker = LexicalRanker::default();
        let doc = "Premium premium premium is due monthly. Premium and renewal are both due yearly.";
        let ranked = ranker.rank(doc, "premium renewal");
        assert_eq!(ranked[0].text, "Premium and renewal are both due yearly");
        assert_eq!(ranked[0].score, 2);
        assert_eq!(ranked[1].score, 1);
    }

    #[test]
    fn test_answer_joins_top_two() {
        let ranker = LexicalRanker::default();
        let doc = "Cats are independent animals overall. \
                   The dog ran very fast across the field. \
                   Cats and dogs can play together nicely. \
                   Cats purr when they are content at home.";
        let answer = ranker.answer(doc, "Tell me about cats and dogs").unwrap();
        assert_eq!(
            answer,
            "Cats and dogs can play together nicely Cats are independent animals overall"
        );
    }

    #[test]
    fn test_answer_none_without_overlap() {
        let ranker = LexicalRanker::default();
        assert!(ranker
            .answer("The dog ran very fast across the field.", "Tell me about cats")
            .is_none());
    }

    #[test]
    fn test_configured_sentence_count() {
        let ranker = LexicalRanker::new(&AnsweringConfig {
            max_ranked_sentences: 1,
            min_sentence_chars: 20,
        });
        let doc = "Cats are independent animals overall. Cats purr when they are content at home.";
        assert_eq!(
            ranker.answer(doc, "cats").unwrap(),
            "Cats are independent animals overall"
        );
    }
}
