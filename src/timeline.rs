use crate::config::Config;
use crate::corpus::{Corpus, ScanSummary};
use crate::error::{Error, Result};
use crate::ranked;
use crate::record::Decoder;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const TIMELINES_DIR: &str = "timelines";
pub const SPIKED_FILE: &str = "spiked.csv";
pub const CUMULATIVE_FILE: &str = "cumulative.csv";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Per-day record counts for the days that were observed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Timeline {
    pub counts: BTreeMap<NaiveDate, u64>,
    pub summary: ScanSummary,
}

impl Timeline {
    pub fn add(&mut self, day: NaiveDate) {
        *self.counts.entry(day).or_insert(0) += 1;
    }

    /// Fills every day from the earliest to the latest observed day, including empty days.
    pub fn densify(&self) -> Result<DenseTimeline> {
        let earliest = *self.counts.keys().next().ok_or(Error::EmptyTimeline)?;
        let latest = *self.counts.keys().next_back().ok_or(Error::EmptyTimeline)?;

        let mut spiked = vec![];
        let mut cumulative = vec![];
        let mut total = 0;
        let mut day = Some(earliest);

        while let Some(current) = day.filter(|current| *current <= latest) {
            let count = self.counts.get(&current).copied().unwrap_or(0);
            total += count;
            spiked.push((current, count));
            cumulative.push((current, total));
            day = current.succ_opt();
        }

        Ok(DenseTimeline { spiked, cumulative })
    }
}

/// Spiked and cumulative series over the same gap-free range of days.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DenseTimeline {
    pub spiked: Vec<(NaiveDate, u64)>,
    pub cumulative: Vec<(NaiveDate, u64)>,
}

impl DenseTimeline {
    pub fn write<P: AsRef<Path>>(&self, output_dir: P) -> Result<()> {
        let dir = output_dir.as_ref().join(TIMELINES_DIR);

        write_series(&self.spiked, &dir.join(SPIKED_FILE))?;
        write_series(&self.cumulative, &dir.join(CUMULATIVE_FILE))
    }
}

fn write_series(series: &[(NaiveDate, u64)], path: &Path) -> Result<()> {
    let mut writer = ranked::create_writer(path)?;

    for (day, count) in series {
        writer
            .write_record(&[day.format(DATE_FORMAT).to_string(), count.to_string()])
            .map_err(|error| Error::output(path)(error.into()))?;
    }

    writer.flush().map_err(Error::output(path))?;
    log::info!("Wrote {} days to {:?}", series.len(), path);

    Ok(())
}

pub struct TimelineAggregator<'a> {
    corpus: &'a Corpus,
    decoder: Decoder,
    output_dir: PathBuf,
}

impl<'a> TimelineAggregator<'a> {
    pub fn new(corpus: &'a Corpus, config: &Config) -> TimelineAggregator<'a> {
        TimelineAggregator {
            corpus,
            decoder: Decoder::new(corpus.format(), config),
            output_dir: config.output.dir.clone(),
        }
    }

    pub fn build_timeline(&self) -> Result<Timeline> {
        let mut timeline = Timeline::default();

        let summary = self
            .corpus
            .scan(&self.decoder, "Timeline", |record, _| timeline.add(record.day()))?;
        timeline.summary = summary;

        Ok(timeline)
    }

    pub fn densify_and_write(&self, timeline: &Timeline) -> Result<DenseTimeline> {
        let dense = timeline.densify()?;
        dense.write(&self.output_dir)?;

        Ok(dense)
    }
}
