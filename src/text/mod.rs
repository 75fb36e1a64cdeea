pub mod entities;
pub mod stopwords;
pub mod tokenize;

use crate::config::NormalizerConfig;
use std::collections::HashSet;

const RETWEET_MARKER: &str = "rt";
const LINK_MARKERS: &[&str] = &["http", "//t.co"];

/// Turns free text into the unigrams counted as terms.
///
/// The steps run in a fixed order: tokenize (dropping handles if configured), remove the retweet
/// marker and link tokens, remove stop words, strip ASCII punctuation other than `#` from the
/// re-joined text, and split again on whitespace. Stop words are removed before re-joining, so
/// the output does not preserve the adjacency n-grams would need.
#[derive(Clone, Debug)]
pub struct Normalizer {
    stop_words: HashSet<String>,
    strip_handles: bool,
}

impl Normalizer {
    pub fn new(config: &NormalizerConfig) -> Normalizer {
        let mut stop_words = stopwords::ENGLISH
            .iter()
            .map(|word| word.to_string())
            .collect::<HashSet<_>>();
        stop_words.extend(config.extra_stop_words.iter().map(|word| word.to_lowercase()));

        Normalizer {
            stop_words,
            strip_handles: config.strip_handles,
        }
    }

    pub fn normalize(&self, text: &str) -> Vec<String> {
        let kept = tokenize::tokenize(text)
            .into_iter()
            .filter(|token| !(self.strip_handles && tokenize::is_handle(token)))
            .filter(|token| {
                token != RETWEET_MARKER && !LINK_MARKERS.iter().any(|marker| token.contains(marker))
            })
            .filter(|token| !self.stop_words.contains(token))
            .collect::<Vec<_>>()
            .join(" ");

        let without_punctuation = kept
            .chars()
            .filter(|c| *c == '#' || !c.is_ascii_punctuation())
            .collect::<String>();

        without_punctuation
            .split_whitespace()
            .map(|term| term.to_string())
            .collect()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(&NormalizerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_tweet() {
        let normalizer = Normalizer::default();
        let terms = normalizer.normalize(
            "RT @Someone: The protest in #Ferguson is growing, growing! http://t.co/xyz",
        );

        assert_eq!(terms, vec!["protest", "#ferguson", "growing", "growing"]);
    }

    #[test]
    fn normalize_keeps_handles_when_configured() {
        let normalizer = Normalizer::new(&NormalizerConfig {
            strip_handles: false,
            extra_stop_words: vec!["Hello".to_string()],
        });

        assert_eq!(normalizer.normalize("hello @b_c"), vec!["bc"]);
    }

    #[test]
    fn punctuation_stripping_runs_after_stop_words() {
        let normalizer = Normalizer::default();

        // "don't" is a stop word and is removed whole; "can't" is not and loses its apostrophe.
        assert_eq!(normalizer.normalize("Don't worry, can't stop"), vec!["worry", "cant", "stop"]);
    }
}
