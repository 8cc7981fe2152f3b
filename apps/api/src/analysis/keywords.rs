//! Keyword extraction — a small, self-contained service over resume text.
//!
//! Deliberately independent of validation and rate limiting; swap the backend
//! by implementing [`KeywordExtractor`]. `AppState` holds an
//! `Arc<dyn KeywordExtractor>`.

use std::collections::HashMap;

use serde::Serialize;

pub const DEFAULT_MAX_KEYWORDS: usize = 20;

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "up", "about", "into", "through", "during", "before", "after", "above", "below",
    "between", "among", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "could", "should", "may", "might", "must", "can",
    "this", "that", "these", "those",
];

/// Fixed vocabulary used to tag keywords as technical skills.
const TECH_VOCABULARY: &[&str] = &[
    "python", "java", "javascript", "rust", "react", "postgresql", "docker", "kubernetes", "aws",
    "git", "sql", "html", "css", "nodejs", "api", "database", "backend", "frontend", "web",
    "development", "software",
];

#[derive(Debug, Clone, Serialize)]
pub struct KeywordExtraction {
    /// Top keywords, most frequent first; ties resolved by first occurrence.
    pub keywords: Vec<String>,
    /// Subset of `keywords` found in the technical vocabulary.
    pub technical: Vec<String>,
    pub frequencies: HashMap<String, usize>,
}

pub trait KeywordExtractor: Send + Sync {
    fn extract(&self, text: &str, max_keywords: usize) -> KeywordExtraction;
}

/// Frequency-based extractor: lowercase alphabetic words longer than two
/// characters, stop words removed, ranked by count.
pub struct FrequencyKeywordExtractor;

impl KeywordExtractor for FrequencyKeywordExtractor {
    fn extract(&self, text: &str, max_keywords: usize) -> KeywordExtraction {
        let mut frequencies: HashMap<String, usize> = HashMap::new();
        let mut first_seen: HashMap<String, usize> = HashMap::new();

        for (position, raw) in text
            .split(|c: char| !c.is_ascii_alphabetic())
            .filter(|w| !w.is_empty())
            .enumerate()
        {
            let word = raw.to_ascii_lowercase();
            if word.len() <= 2 || STOP_WORDS.contains(&word.as_str()) {
                continue;
            }
            first_seen.entry(word.clone()).or_insert(position);
            *frequencies.entry(word).or_insert(0) += 1;
        }

        let mut ranked: Vec<(&String, usize)> =
            frequencies.iter().map(|(w, &n)| (w, n)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| first_seen[a.0].cmp(&first_seen[b.0])));

        let keywords: Vec<String> = ranked
            .into_iter()
            .take(max_keywords)
            .map(|(w, _)| w.clone())
            .collect();

        let technical = keywords
            .iter()
            .filter(|w| TECH_VOCABULARY.contains(&w.as_str()))
            .cloned()
            .collect();

        KeywordExtraction {
            keywords,
            technical,
            frequencies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> KeywordExtraction {
        FrequencyKeywordExtractor.extract(text, DEFAULT_MAX_KEYWORDS)
    }

    #[test]
    fn test_stop_words_and_short_words_filtered() {
        let result = extract("the cat is on a mat with an ox");
        assert!(!result.keywords.contains(&"the".to_string()));
        assert!(!result.keywords.contains(&"is".to_string()));
        assert!(!result.keywords.contains(&"ox".to_string()));
        assert!(result.keywords.contains(&"cat".to_string()));
        assert!(result.keywords.contains(&"mat".to_string()));
    }

    #[test]
    fn test_frequency_ordering() {
        let result = extract("rust python rust java rust python");
        assert_eq!(result.keywords[0], "rust");
        assert_eq!(result.keywords[1], "python");
        assert_eq!(result.keywords[2], "java");
        assert_eq!(result.frequencies["rust"], 3);
    }

    #[test]
    fn test_ties_break_by_first_occurrence() {
        let result = extract("zebra apple zebra apple mango");
        assert_eq!(result.keywords[0], "zebra");
        assert_eq!(result.keywords[1], "apple");
        assert_eq!(result.keywords[2], "mango");
    }

    #[test]
    fn test_case_and_punctuation_normalized() {
        let result = extract("Docker, docker! DOCKER? (kubernetes)");
        assert_eq!(result.frequencies["docker"], 3);
        assert!(result.keywords.contains(&"kubernetes".to_string()));
    }

    #[test]
    fn test_technical_subset() {
        let result = extract("built backend services in rust using postgresql and gardening");
        assert!(result.technical.contains(&"rust".to_string()));
        assert!(result.technical.contains(&"postgresql".to_string()));
        assert!(result.technical.contains(&"backend".to_string()));
        assert!(!result.technical.contains(&"gardening".to_string()));
        assert!(result.keywords.contains(&"gardening".to_string()));
    }

    #[test]
    fn test_max_keywords_cap() {
        let text = (b'a'..=b'z')
            .map(|c| format!("word{}", c as char))
            .collect::<Vec<_>>()
            .join(" ");
        let result = FrequencyKeywordExtractor.extract(&text, 5);
        assert_eq!(result.keywords.len(), 5);
        assert_eq!(result.frequencies.len(), 26);
    }

    #[test]
    fn test_empty_input() {
        let result = extract("");
        assert!(result.keywords.is_empty());
        assert!(result.technical.is_empty());
    }
}
