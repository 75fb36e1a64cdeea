pub mod topology;

use crate::config::Config;
use crate::corpus::Corpus;
use crate::error::{Error, Result};
use crate::ranked::{self, FrequencyTable};
use crate::record::Decoder;
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use topology::{GraphStatistics, UndirectedGraph};

pub const NETWORK_STATS_DIR: &str = "network_stats";
pub const EDGE_LIST_FILE: &str = "edge-list.csv";
pub const RANKED_IN_DEGREE_FILE: &str = "ranked-indegree.csv";

/// Directed mention counts keyed by `(author, mentioned)`.
///
/// Self-mentions are kept: the table is a plain projection of observed mentions.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EdgeWeightTable {
    weights: HashMap<(String, String), u64>,
}

impl EdgeWeightTable {
    pub fn add(&mut self, source: &str, target: &str) {
        *self
            .weights
            .entry((source.to_string(), target.to_string()))
            .or_insert(0) += 1;
    }

    pub fn weight(&self, source: &str, target: &str) -> u64 {
        self.weights
            .get(&(source.to_string(), target.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Edges ordered by weight descending, then source and target ascending.
    pub fn ranked(&self) -> Vec<(&str, &str, u64)> {
        ranked::ranked(&self.weights)
            .into_iter()
            .map(|((source, target), weight)| (source.as_str(), target.as_str(), weight))
            .collect()
    }

    /// Writes `source,target,weight` lines, replacing any existing file.
    pub fn write<P: AsRef<Path>>(&self, destination: P) -> Result<usize> {
        let path = destination.as_ref();
        let mut writer = ranked::create_writer(path)?;
        let edges = self.ranked();

        for (source, target, weight) in &edges {
            writer
                .write_record(&[
                    ranked::escape_key(source),
                    ranked::escape_key(target),
                    weight.to_string(),
                ])
                .map_err(|error| Error::output(path)(error.into()))?;
        }

        writer.flush().map_err(Error::output(path))?;
        log::info!("Wrote {} edges to {:?}", edges.len(), path);

        Ok(edges.len())
    }

    /// Reads an edge list written by [`EdgeWeightTable::write`].
    pub fn load<P: AsRef<Path>>(source: P) -> Result<EdgeWeightTable> {
        let path = source.as_ref();
        if !path.is_file() {
            return Err(Error::precursor_file(path));
        }

        let invalid = |message: String| Error::InvalidRankedList {
            path: path.to_path_buf(),
            message,
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .map_err(|error| invalid(error.to_string()))?;
        let mut table = EdgeWeightTable::default();

        for result in reader.records() {
            let row = result.map_err(|error| invalid(error.to_string()))?;
            let field = |index: usize| {
                row.get(index)
                    .and_then(ranked::unescape_key)
                    .ok_or_else(|| invalid(format!("Invalid edge: {:?}", row)))
            };
            let source = field(0)?;
            let target = field(1)?;
            let weight = field(2)?
                .parse::<u64>()
                .map_err(|_| invalid(format!("Invalid weight: {:?}", row)))?;

            table.weights.insert((source, target), weight);
        }

        Ok(table)
    }

    /// Number of distinct authors mentioning each entity.
    pub fn in_degree(&self) -> Result<FrequencyTable> {
        if self.is_empty() {
            return Err(Error::PrecursorMissing {
                precursor: "non-empty edge list".to_string(),
            });
        }

        let mut table = FrequencyTable::new();
        for (_, target) in self.weights.keys() {
            *table.entry(target.clone()).or_insert(0) += 1;
        }

        Ok(table)
    }

    pub fn statistics(&self) -> Result<GraphStatistics> {
        if self.is_empty() {
            return Err(Error::PrecursorMissing {
                precursor: "non-empty edge list".to_string(),
            });
        }

        let graph = UndirectedGraph::from_edges(
            self.weights
                .keys()
                .map(|(source, target)| (source.as_str(), target.as_str())),
        );

        Ok(graph.statistics())
    }
}

pub struct MentionGraphBuilder<'a> {
    corpus: &'a Corpus,
    decoder: Decoder,
    output_dir: PathBuf,
}

impl<'a> MentionGraphBuilder<'a> {
    pub fn new(corpus: &'a Corpus, config: &Config) -> MentionGraphBuilder<'a> {
        MentionGraphBuilder {
            corpus,
            decoder: Decoder::new(corpus.format(), config),
            output_dir: config.output.dir.clone(),
        }
    }

    pub fn edge_list_path(&self) -> PathBuf {
        edge_list_path(&self.output_dir)
    }

    /// Accumulates one unit of weight per mention and writes the edge list.
    pub fn build_edge_list(&self) -> Result<EdgeWeightTable> {
        let mut table = EdgeWeightTable::default();

        self.corpus
            .scan(&self.decoder, "Edge list", |record, _| {
                for mention in record.entities().mentions {
                    table.add(&record.author, &mention);
                }
            })?;

        table.write(self.edge_list_path())?;

        Ok(table)
    }

    pub fn ranked_in_degree(&self, edges: &EdgeWeightTable) -> Result<FrequencyTable> {
        let table = edges.in_degree()?;
        ranked::write(
            &table,
            self.output_dir
                .join(NETWORK_STATS_DIR)
                .join(RANKED_IN_DEGREE_FILE),
        )?;

        Ok(table)
    }

    pub fn graph_statistics(&self, edges: &EdgeWeightTable) -> Result<GraphStatistics> {
        let statistics = edges.statistics()?;

        for (name, value) in statistics.rows() {
            log::info!("{}: {}", name, value);
        }

        Ok(statistics)
    }
}

pub fn edge_list_path<P: AsRef<Path>>(output_dir: P) -> PathBuf {
    output_dir
        .as_ref()
        .join(NETWORK_STATS_DIR)
        .join(EDGE_LIST_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Format;
    use super::topology::Diameter;

    const RECORDS: &str = "1\t2016-07-06 10:00:00\t0\tA\t0\t0\t0\t0\ten\thello #x @b @B\n\
                           2\t2016-07-06 11:00:00\t0\tb\t0\t0\t0\t0\ten\t@a thanks, cc @c\n\
                           3\t2016-07-07 12:00:00\t0\td\t0\t0\t0\t0\ten\tnote to self @d\n\
                           4\t2016-07-07 12:00:00\t0\tc\t0\t0\t0\t0\ten\tno mentions\n";

    fn setup(records: &str) -> (tempfile::TempDir, Corpus, Config) {
        let dir = tempfile::tempdir().unwrap();
        let corpus_dir = dir.path().join("corpus");
        std::fs::create_dir(&corpus_dir).unwrap();
        std::fs::write(corpus_dir.join("part-0.csv"), records).unwrap();

        let corpus = Corpus::with_format(&corpus_dir, Format::Reduced).unwrap();
        let mut config = Config::default();
        config.output.dir = dir.path().join("results");

        (dir, corpus, config)
    }

    #[test]
    fn build_and_reload_edge_list() {
        let (_dir, corpus, config) = setup(RECORDS);
        let builder = MentionGraphBuilder::new(&corpus, &config);
        let edges = builder.build_edge_list().unwrap();

        assert_eq!(edges.weight("a", "b"), 2);
        assert_eq!(edges.weight("b", "a"), 1);
        assert_eq!(edges.weight("b", "c"), 1);
        assert_eq!(edges.weight("d", "d"), 1);
        assert_eq!(edges.len(), 4);

        let contents = std::fs::read_to_string(builder.edge_list_path()).unwrap();
        assert_eq!(contents, "a,b,2\nb,a,1\nb,c,1\nd,d,1\n");

        assert_eq!(EdgeWeightTable::load(builder.edge_list_path()).unwrap(), edges);
        assert_eq!(builder.build_edge_list().unwrap(), edges);
    }

    #[test]
    fn in_degree_and_statistics() {
        let (_dir, corpus, config) = setup(RECORDS);
        let builder = MentionGraphBuilder::new(&corpus, &config);
        let edges = builder.build_edge_list().unwrap();

        let in_degree = builder.ranked_in_degree(&edges).unwrap();
        assert_eq!(in_degree.get("a"), Some(&1));
        assert_eq!(in_degree.get("b"), Some(&1));
        assert_eq!(in_degree.get("d"), Some(&1));

        let written = config.output.dir.join("network_stats/ranked-indegree.csv");
        assert_eq!(
            std::fs::read_to_string(written).unwrap(),
            "0,a,1\n1,b,1\n2,c,1\n3,d,1\n"
        );

        let stats = builder.graph_statistics(&edges).unwrap();
        assert_eq!(stats.node_count, 4);
        assert_eq!(stats.edge_count, 3);
        assert_eq!(stats.component_count, 2);
        assert_eq!(stats.lcc_node_count, 3);
        assert_eq!(stats.lcc_edge_count, 2);
        assert_eq!(stats.diameter, Diameter::NotApplicable);
        assert_eq!(stats.lcc_diameter, 2);
    }

    #[test]
    fn empty_edge_list_is_rejected() {
        let (_dir, corpus, config) = setup(
            "1\t2016-07-06 10:00:00\t0\ta\t0\t0\t0\t0\ten\tnobody here\n",
        );
        let builder = MentionGraphBuilder::new(&corpus, &config);
        let edges = builder.build_edge_list().unwrap();

        assert!(edges.is_empty());
        assert!(matches!(
            builder.ranked_in_degree(&edges),
            Err(Error::PrecursorMissing { .. })
        ));
        assert!(matches!(
            builder.graph_statistics(&edges),
            Err(Error::PrecursorMissing { .. })
        ));
    }

    #[test]
    fn load_missing_edge_list() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            EdgeWeightTable::load(edge_list_path(dir.path())),
            Err(Error::PrecursorMissing { .. })
        ));
    }
}
