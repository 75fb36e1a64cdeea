use crate::error::{Error, Result};
use crate::record::{Decoder, Format, Record};
use flate2::read::GzDecoder;
use std::fs::{read_dir, File};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

/// Tally of one full pass over a corpus.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ScanSummary {
    pub files: usize,
    pub records: usize,
    pub null_records: usize,
}

impl ScanSummary {
    fn report(&self, stage: &str) {
        if self.null_records > 0 {
            log::warn!(
                "{}: skipped {} null records ({} decoded from {} files)",
                stage,
                self.null_records,
                self.records,
                self.files
            );
        } else {
            log::info!(
                "{}: decoded {} records from {} files",
                stage,
                self.records,
                self.files
            );
        }
    }
}

/// A directory of record files sharing one format.
pub struct Corpus {
    dir: Box<Path>,
    format: Format,
    files: Vec<PathBuf>,
}

impl Corpus {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Corpus> {
        let format = Format::infer(&dir);
        Self::with_format(dir, format)
    }

    pub fn with_format<P: AsRef<Path>>(dir: P, format: Format) -> Result<Corpus> {
        let path = dir.as_ref();
        let mut files = read_dir(path)
            .and_then(|entries| entries.collect::<std::io::Result<Vec<_>>>())
            .map_err(Error::corpus(path))?
            .into_iter()
            .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect::<Vec<_>>();

        files.sort();

        Ok(Corpus {
            dir: path.to_path_buf().into_boxed_path(),
            format,
            files,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Decodes every entry in every file, passing each record and its raw bytes to `f`.
    ///
    /// Entries that fail to decode are logged and counted, never returned as errors. The null
    /// record tally is reported once at the end under the given stage name.
    pub fn scan<F: FnMut(Record, &[u8])>(
        &self,
        decoder: &Decoder,
        stage: &str,
        mut f: F,
    ) -> Result<ScanSummary> {
        let mut summary = ScanSummary::default();

        for path in &self.files {
            log::info!("{}: reading {:?}", stage, path);
            let mut reader = Self::open_file(path)?;
            let mut buffer = Vec::new();
            let mut line_number = 0;

            loop {
                buffer.clear();
                let read = reader
                    .read_until(b'\n', &mut buffer)
                    .map_err(|source| Error::CorpusRead {
                        path: path.clone(),
                        source,
                    })?;
                if read == 0 {
                    break;
                }
                line_number += 1;

                let entry = trim_line_ending(&buffer);
                if entry.iter().all(|b| b.is_ascii_whitespace()) {
                    continue;
                }

                match decoder.decode(entry) {
                    Ok(record) => {
                        summary.records += 1;
                        f(record, entry);
                    }
                    Err(error) => {
                        summary.null_records += 1;
                        log::debug!("Null record at {:?}:{}: {}", path, line_number, error);
                    }
                }
            }

            summary.files += 1;
        }

        summary.report(stage);

        Ok(summary)
    }

    fn open_file(path: &Path) -> Result<Box<dyn BufRead>> {
        let file = File::open(path).map_err(Error::corpus(path))?;

        let reader: Box<dyn Read> = if path.extension().map_or(false, |ext| ext == "gz") {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };

        Ok(Box::new(BufReader::new(reader)))
    }
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
