mod path;

use crate::config::{Config, FullSchema, ReducedSchema};
use crate::text::entities::{self, Entities};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;
use std::path::Path;
use std::str::FromStr;

const REDUCED_MARKER: &str = "reduced";
const REDUCED_DELIMITER: char = '\t';

#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("Expected at least {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },
    #[error("Invalid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("Invalid JSON")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Missing field: {0}")]
    MissingField(String),
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Format {
    Reduced,
    Full,
}

impl Format {
    /// A corpus directory whose name contains `reduced` holds reduced records.
    pub fn infer<P: AsRef<Path>>(dir: P) -> Format {
        let name = dir
            .as_ref()
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| dir.as_ref().to_string_lossy().to_string());

        if name.contains(REDUCED_MARKER) {
            Format::Reduced
        } else {
            Format::Full
        }
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reduced" => Ok(Format::Reduced),
            "full" => Ok(Format::Full),
            other => Err(format!("Unknown corpus format: {}", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub text: String,
    /// Lower-cased screen name.
    pub author: String,
    pub timestamp: DateTime<FixedOffset>,
    pub hashtags: Option<Vec<String>>,
    pub mentions: Option<Vec<String>>,
    pub urls: Option<Vec<String>>,
}

impl Record {
    /// Calendar day of the timestamp in its own offset.
    pub fn day(&self) -> NaiveDate {
        self.timestamp.naive_local().date()
    }

    /// Native annotations where the record has them, otherwise entities extracted from the text.
    pub fn entities(&self) -> Entities {
        let hashtags = match &self.hashtags {
            Some(hashtags) => hashtags.clone(),
            None => entities::hashtags(&self.text),
        };
        let mentions = match &self.mentions {
            Some(mentions) => mentions.clone(),
            None => entities::mentions(&self.text),
        };
        let urls = match &self.urls {
            Some(urls) => urls.clone(),
            None => entities::urls(&self.text),
        };

        Entities {
            hashtags,
            mentions,
            urls,
        }
    }
}

/// Decodes raw corpus entries into a uniform [`Record`].
///
/// The format is chosen once per corpus, never guessed per entry.
pub struct Decoder {
    format: Format,
    reduced: ReducedSchema,
    full: FullSchema,
    timestamp_formats: Vec<String>,
}

impl Decoder {
    pub fn new(format: Format, config: &Config) -> Decoder {
        Decoder {
            format,
            reduced: config.reduced.clone(),
            full: config.full.clone(),
            timestamp_formats: config.timestamps.formats.clone(),
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn decode(&self, raw: &[u8]) -> Result<Record, DecodeError> {
        let line = std::str::from_utf8(raw)?;

        match self.format {
            Format::Reduced => self.decode_reduced(line),
            Format::Full => self.decode_full(line),
        }
    }

    fn decode_reduced(&self, line: &str) -> Result<Record, DecodeError> {
        let fields = line.split(REDUCED_DELIMITER).collect::<Vec<_>>();
        let expected = self.reduced.required_fields();

        if fields.len() < expected {
            return Err(DecodeError::FieldCount {
                expected,
                found: fields.len(),
            });
        }

        let author = fields[self.reduced.author_column].trim();
        if author.is_empty() {
            return Err(DecodeError::MissingField("author".to_string()));
        }

        Ok(Record {
            text: fields[self.reduced.text_column].to_string(),
            author: entities::identifier_key(author),
            timestamp: self.parse_timestamp(fields[self.reduced.timestamp_column].trim())?,
            hashtags: None,
            mentions: None,
            urls: None,
        })
    }

    fn decode_full(&self, line: &str) -> Result<Record, DecodeError> {
        let doc = serde_json::from_str::<Value>(line)?;
        let schema = &self.full;

        let text = schema
            .extended_text
            .as_ref()
            .and_then(|key| path::resolve_string(&doc, key))
            .or_else(|| path::resolve_string(&doc, &schema.text))
            .ok_or_else(|| DecodeError::MissingField(schema.text.clone()))?;

        let author = path::resolve_string(&doc, &schema.author)
            .filter(|author| !author.is_empty())
            .ok_or_else(|| DecodeError::MissingField(schema.author.clone()))?;

        let timestamp = match path::resolve_string(&doc, &schema.timestamp) {
            Some(value) => self.parse_timestamp(&value)?,
            None => {
                let millis = schema
                    .timestamp_millis
                    .as_ref()
                    .and_then(|key| path::resolve_string(&doc, key))
                    .ok_or_else(|| DecodeError::MissingField(schema.timestamp.clone()))?;
                parse_millis(&millis).ok_or(DecodeError::InvalidTimestamp(millis))?
            }
        };

        let annotation = |key: &Option<String>| {
            key.as_ref()
                .and_then(|key| path::resolve_strings(&doc, key))
        };

        Ok(Record {
            text,
            author: entities::identifier_key(&author),
            timestamp,
            hashtags: annotation(&schema.hashtags).map(|values| {
                values
                    .iter()
                    .map(|value| entities::hashtag_key(value))
                    .collect()
            }),
            mentions: annotation(&schema.mentions).map(|values| {
                values
                    .iter()
                    .map(|value| entities::identifier_key(value))
                    .collect()
            }),
            urls: annotation(&schema.urls),
        })
    }

    fn parse_timestamp(&self, value: &str) -> Result<DateTime<FixedOffset>, DecodeError> {
        for format in &self.timestamp_formats {
            if let Ok(timestamp) = DateTime::parse_from_str(value, format) {
                return Ok(timestamp);
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
                return Ok(Utc.from_utc_datetime(&naive).into());
            }
        }

        parse_millis(value).ok_or_else(|| DecodeError::InvalidTimestamp(value.to_string()))
    }
}

fn parse_millis(value: &str) -> Option<DateTime<FixedOffset>> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    value
        .parse::<i64>()
        .ok()
        .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
        .map(|timestamp| timestamp.into())
}
