use crate::config::Config;
use crate::corpus::{Corpus, ScanSummary};
use crate::error::{Error, Result};
use crate::ranked::{self, FrequencyTable};
use crate::record::{Decoder, Record};
use crate::text::Normalizer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const TERM_COUNTS_DIR: &str = "term_counts";
pub const TOP_TERM_TWEETS_DIR: &str = "top_term_tweets";
pub const TOP_TERM_TWEETS_FILE: &str = "top_term_tweets.csv";
pub const TOP_MENTIONED_USERS_FILE: &str = "top_mentioned_users_timeline.csv";

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Category {
    Terms,
    Hashtags,
    Mentions,
    Urls,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Terms,
        Category::Hashtags,
        Category::Mentions,
        Category::Urls,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            Category::Terms => "terms.csv",
            Category::Hashtags => "hashtags.csv",
            Category::Mentions => "mentions.csv",
            Category::Urls => "urls.csv",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "terms" => Ok(Category::Terms),
            "hashtags" => Ok(Category::Hashtags),
            "mentions" => Ok(Category::Mentions),
            "urls" => Ok(Category::Urls),
            other => Err(format!("Unknown category: {}", other)),
        }
    }
}

#[derive(Debug, Default)]
pub struct TermCounts {
    pub terms: FrequencyTable,
    pub hashtags: FrequencyTable,
    pub mentions: FrequencyTable,
    pub urls: FrequencyTable,
    pub summary: ScanSummary,
}

impl TermCounts {
    pub fn table(&self, category: Category) -> &FrequencyTable {
        match category {
            Category::Terms => &self.terms,
            Category::Hashtags => &self.hashtags,
            Category::Mentions => &self.mentions,
            Category::Urls => &self.urls,
        }
    }

    fn add(&mut self, record: &Record, normalizer: &Normalizer) {
        let entities = record.entities();

        increment_all(&mut self.terms, normalizer.normalize(&record.text));
        increment_all(&mut self.hashtags, entities.hashtags);
        increment_all(&mut self.mentions, entities.mentions);
        increment_all(&mut self.urls, entities.urls);
    }

    /// Writes one ranked list per category under `term_counts/`, replacing earlier runs.
    pub fn write<P: AsRef<Path>>(&self, output_dir: P) -> Result<()> {
        let dir = output_dir.as_ref().join(TERM_COUNTS_DIR);

        for category in &Category::ALL {
            ranked::write(self.table(*category), dir.join(category.file_name()))?;
        }

        Ok(())
    }
}

fn increment_all<I: IntoIterator<Item = String>>(table: &mut FrequencyTable, keys: I) {
    for key in keys {
        *table.entry(key).or_insert(0) += 1;
    }
}

/// Records whose text contains one of the top keys.
#[derive(Debug)]
pub struct MatchedRecords {
    pub keys: Vec<String>,
    pub records: Vec<Record>,
    pub path: PathBuf,
}

pub struct TermAggregator<'a> {
    corpus: &'a Corpus,
    decoder: Decoder,
    normalizer: Normalizer,
    output_dir: PathBuf,
}

impl<'a> TermAggregator<'a> {
    pub fn new(corpus: &'a Corpus, config: &Config) -> TermAggregator<'a> {
        TermAggregator {
            corpus,
            decoder: Decoder::new(corpus.format(), config),
            normalizer: Normalizer::new(&config.normalizer),
            output_dir: config.output.dir.clone(),
        }
    }

    pub fn count_corpus(&self) -> Result<TermCounts> {
        let mut counts = TermCounts::default();
        let normalizer = &self.normalizer;

        let summary = self
            .corpus
            .scan(&self.decoder, "Term counts", |record, _| {
                counts.add(&record, normalizer)
            })?;
        counts.summary = summary;

        Ok(counts)
    }

    /// Counts all four categories and writes them to `term_counts/`.
    pub fn aggregate_corpus(&self) -> Result<TermCounts> {
        let counts = self.count_corpus()?;
        counts.write(&self.output_dir)?;

        Ok(counts)
    }

    /// Re-scans the corpus for records matching the `top_k` highest-ranked keys.
    ///
    /// The ranked lists written by [`TermAggregator::aggregate_corpus`] must already exist for
    /// every requested category; their counts are summed per key before ranking. A record
    /// matches if its lower-cased text contains a lower-cased key, or, when `include_author_on_self_mention`
    /// is set, if its author is one of the keys. Matching raw entries are written one per line.
    pub fn top_matching_records(
        &self,
        top_k: usize,
        categories: &[Category],
        include_author_on_self_mention: bool,
    ) -> Result<MatchedRecords> {
        let keys = self.top_keys(top_k, categories)?;
        let folded_keys = keys
            .iter()
            .map(|key| key.to_lowercase())
            .collect::<Vec<_>>();
        let mut matches = vec![];

        self.corpus
            .scan(&self.decoder, "Top term tweets", |record, raw| {
                let text = record.text.to_lowercase();
                let is_match = folded_keys.iter().any(|key| {
                    text.contains(key.as_str())
                        || (include_author_on_self_mention && record.author == *key)
                });

                if is_match {
                    matches.push((record, raw.to_vec()));
                }
            })?;

        let file_name = if include_author_on_self_mention {
            TOP_MENTIONED_USERS_FILE
        } else {
            TOP_TERM_TWEETS_FILE
        };
        let path = self.output_dir.join(TOP_TERM_TWEETS_DIR).join(file_name);

        write_raw_entries(&path, matches.iter().map(|(_, raw)| raw.as_slice()))?;
        log::info!(
            "Wrote {} records matching {} keys to {:?}",
            matches.len(),
            keys.len(),
            path
        );

        Ok(MatchedRecords {
            keys,
            records: matches.into_iter().map(|(record, _)| record).collect(),
            path,
        })
    }

    fn top_keys(&self, top_k: usize, categories: &[Category]) -> Result<Vec<String>> {
        let dir = self.output_dir.join(TERM_COUNTS_DIR);
        let mut merged = FrequencyTable::new();

        for category in categories {
            for (key, count) in ranked::read(dir.join(category.file_name()))? {
                *merged.entry(key).or_insert(0) += count;
            }
        }

        Ok(ranked::ranked(&merged)
            .into_iter()
            .take(top_k)
            .map(|(key, _)| key.clone())
            .collect())
    }
}

fn write_raw_entries<'a, I: Iterator<Item = &'a [u8]>>(path: &Path, entries: I) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(Error::output(parent))?;
    }

    let file = File::create(path).map_err(Error::output(path))?;
    let mut writer = BufWriter::new(file);

    for entry in entries {
        writer
            .write_all(entry)
            .and_then(|_| writer.write_all(b"\n"))
            .map_err(Error::output(path))?;
    }

    writer.flush().map_err(Error::output(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Format;

    const RECORDS: &str = "1\t2016-07-06 10:00:00\t0\ta\t0\t0\t0\t0\ten\thello #x @b\n\
                           2\t2016-07-06 11:00:00\t0\tb\t0\t0\t0\t0\ten\t#x reply\n\
                           3\t2016-07-08 12:00:00\t0\tc\t0\t0\t0\t0\ten\tno tags\n";

    fn setup() -> (tempfile::TempDir, Corpus, Config) {
        let dir = tempfile::tempdir().unwrap();
        let corpus_dir = dir.path().join("corpus");
        std::fs::create_dir(&corpus_dir).unwrap();
        std::fs::write(corpus_dir.join("part-0.csv"), RECORDS).unwrap();

        let corpus = Corpus::with_format(&corpus_dir, Format::Reduced).unwrap();
        let mut config = Config::default();
        config.output.dir = dir.path().join("results");

        (dir, corpus, config)
    }

    #[test]
    fn aggregate_small_corpus() {
        let (_dir, corpus, config) = setup();
        let aggregator = TermAggregator::new(&corpus, &config);
        let counts = aggregator.aggregate_corpus().unwrap();

        assert_eq!(counts.summary.records, 3);
        assert_eq!(counts.hashtags.len(), 1);
        assert_eq!(counts.hashtags.get("#x"), Some(&2));
        assert_eq!(counts.mentions.get("b"), Some(&1));
        assert_eq!(counts.terms.get("hello"), Some(&1));
        assert_eq!(counts.terms.get("reply"), Some(&1));
        assert_eq!(counts.terms.get("#x"), Some(&2));
        assert_eq!(counts.terms.get("no"), None);
        assert!(counts.urls.is_empty());

        let hashtags = config.output.dir.join("term_counts/hashtags.csv");
        assert_eq!(std::fs::read_to_string(&hashtags).unwrap(), "0,#x,2\n");

        let first = std::fs::read(config.output.dir.join("term_counts/terms.csv")).unwrap();
        aggregator.aggregate_corpus().unwrap();
        let second = std::fs::read(config.output.dir.join("term_counts/terms.csv")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn top_matching_records_requires_counts() {
        let (_dir, corpus, config) = setup();
        let aggregator = TermAggregator::new(&corpus, &config);

        assert!(matches!(
            aggregator.top_matching_records(5, &[Category::Terms], false),
            Err(Error::PrecursorMissing { .. })
        ));
    }

    #[test]
    fn top_matching_records_by_term() {
        let (_dir, corpus, config) = setup();
        let aggregator = TermAggregator::new(&corpus, &config);
        aggregator.aggregate_corpus().unwrap();

        let matched = aggregator
            .top_matching_records(1, &[Category::Hashtags], false)
            .unwrap();

        assert_eq!(matched.keys, vec!["#x"]);
        assert_eq!(matched.records.len(), 2);
        assert!(matched.path.ends_with("top_term_tweets/top_term_tweets.csv"));

        let contents = std::fs::read_to_string(&matched.path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.lines().all(|line| line.contains("#x")));
    }

    #[test]
    fn top_matching_records_by_mentioned_author() {
        let (_dir, corpus, config) = setup();
        let aggregator = TermAggregator::new(&corpus, &config);
        aggregator.aggregate_corpus().unwrap();

        let matched = aggregator
            .top_matching_records(1, &[Category::Mentions], true)
            .unwrap();

        // Record one mentions "b" in its text and record two is authored by "b".
        assert_eq!(matched.keys, vec!["b"]);
        let authors = matched
            .records
            .iter()
            .map(|record| record.author.as_str())
            .collect::<Vec<_>>();
        assert_eq!(authors, vec!["a", "b"]);
        assert!(matched
            .path
            .ends_with("top_term_tweets/top_mentioned_users_timeline.csv"));
    }

    #[test]
    fn top_matching_records_by_mixed_case_url() {
        let (dir, _, mut config) = setup();
        let corpus_dir = dir.path().join("links");
        std::fs::create_dir(&corpus_dir).unwrap();
        std::fs::write(
            corpus_dir.join("part-0.csv"),
            "1\t2016-07-06 10:00:00\t0\ta\t0\t0\t0\t0\ten\tsee https://t.co/AbC now\n\
             2\t2016-07-06 11:00:00\t0\tb\t0\t0\t0\t0\ten\tagain https://t.co/AbC\n\
             3\t2016-07-06 12:00:00\t0\tc\t0\t0\t0\t0\ten\thttps://t.co/xyz\n",
        )
        .unwrap();
        config.output.dir = dir.path().join("link-results");

        let corpus = Corpus::with_format(&corpus_dir, Format::Reduced).unwrap();
        let aggregator = TermAggregator::new(&corpus, &config);
        let counts = aggregator.aggregate_corpus().unwrap();
        assert_eq!(counts.urls.get("https://t.co/AbC"), Some(&2));

        let matched = aggregator
            .top_matching_records(1, &[Category::Urls], false)
            .unwrap();

        assert_eq!(matched.keys, vec!["https://t.co/AbC"]);
        let authors = matched
            .records
            .iter()
            .map(|record| record.author.as_str())
            .collect::<Vec<_>>();
        assert_eq!(authors, vec!["a", "b"]);
    }

    #[test]
    fn aggregate_into_unwritable_output() {
        let (dir, corpus, mut config) = setup();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        config.output.dir = blocker;

        let aggregator = TermAggregator::new(&corpus, &config);

        assert!(matches!(
            aggregator.aggregate_corpus(),
            Err(Error::OutputWrite { .. })
        ));
    }
}
