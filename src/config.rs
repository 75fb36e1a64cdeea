use crate::error::{Error, Result};
use serde_derive::Deserialize;
use std::path::{Path, PathBuf};

/// Run configuration.
///
/// The column and key mappings are part of the corpus contract: a wrong column index is not
/// detectable from the data alone.
#[derive(Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub reduced: ReducedSchema,
    pub full: FullSchema,
    pub timestamps: TimestampConfig,
    pub normalizer: NormalizerConfig,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
        let contents = std::fs::read_to_string(path).map_err(Error::ConfigRead)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Loads the given file, or uses the built-in mapping when no file is given.
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Config> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Config::default()),
        }
    }
}

#[derive(Debug, Deserialize, Eq, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            dir: PathBuf::from("."),
        }
    }
}

/// Zero-based column positions in a tab-delimited reduced record.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ReducedSchema {
    pub timestamp_column: usize,
    pub author_column: usize,
    pub text_column: usize,
    pub min_fields: usize,
}

impl ReducedSchema {
    pub(crate) fn required_fields(&self) -> usize {
        let highest = self
            .timestamp_column
            .max(self.author_column)
            .max(self.text_column);

        self.min_fields.max(highest + 1)
    }
}

impl Default for ReducedSchema {
    fn default() -> Self {
        ReducedSchema {
            timestamp_column: 1,
            author_column: 3,
            text_column: 9,
            min_fields: 10,
        }
    }
}

/// Dotted key paths into a full-format JSON document.
///
/// A segment ending in `[]` iterates over an array, so `entities.hashtags[].text` collects the
/// `text` of every hashtag entity. Annotation paths are optional: when the document lacks the
/// annotation, entities are extracted from the text instead.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FullSchema {
    pub extended_text: Option<String>,
    pub text: String,
    pub author: String,
    pub timestamp: String,
    pub timestamp_millis: Option<String>,
    pub hashtags: Option<String>,
    pub mentions: Option<String>,
    pub urls: Option<String>,
}

impl Default for FullSchema {
    fn default() -> Self {
        FullSchema {
            extended_text: Some("extended_tweet.full_text".to_string()),
            text: "text".to_string(),
            author: "user.screen_name".to_string(),
            timestamp: "created_at".to_string(),
            timestamp_millis: Some("timestamp_ms".to_string()),
            hashtags: Some("entities.hashtags[].text".to_string()),
            mentions: Some("entities.user_mentions[].screen_name".to_string()),
            urls: Some("entities.urls[].expanded_url".to_string()),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct TimestampConfig {
    /// `chrono` format strings, tried in order. Formats without an offset are read as UTC.
    pub formats: Vec<String>,
}

impl Default for TimestampConfig {
    fn default() -> Self {
        TimestampConfig {
            formats: vec![
                // Example: "Wed Aug 27 13:08:45 +0000 2008"
                "%a %b %d %H:%M:%S %z %Y".to_string(),
                "%Y-%m-%dT%H:%M:%S%z".to_string(),
                "%Y-%m-%dT%H:%M:%S%.fZ".to_string(),
                "%Y-%m-%d %H:%M:%S".to_string(),
            ],
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct NormalizerConfig {
    pub strip_handles: bool,
    pub extra_stop_words: Vec<String>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        NormalizerConfig {
            strip_handles: true,
            extra_stop_words: vec![],
        }
    }
}
