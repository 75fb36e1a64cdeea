use crate::error::{Error, Result};
use csv::{ReaderBuilder, Writer, WriterBuilder};
use itertools::Itertools;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

pub type FrequencyTable = HashMap<String, u64>;

/// Sorts a table by count descending, then key ascending.
pub fn ranked<K: Ord>(table: &HashMap<K, u64>) -> Vec<(&K, u64)> {
    table
        .iter()
        .map(|(key, count)| (key, *count))
        .sorted_by(|(key_a, count_a), (key_b, count_b)| {
            count_b.cmp(count_a).then_with(|| key_a.cmp(key_b))
        })
        .collect()
}

/// Writes `rank,key,count` lines with zero-based ranks, replacing any existing file.
///
/// Non-ASCII keys are written with `\u{..}` escapes (see [`escape_key`]).
pub fn write<P: AsRef<Path>>(table: &FrequencyTable, destination: P) -> Result<usize> {
    let path = destination.as_ref();
    let mut writer = create_writer(path)?;
    let entries = ranked(table);

    for (rank, (key, count)) in entries.iter().enumerate() {
        writer
            .write_record(&[rank.to_string(), escape_key(key), count.to_string()])
            .map_err(|error| Error::output(path)(error.into()))?;
    }

    writer.flush().map_err(Error::output(path))?;
    log::info!("Wrote {} ranked entries to {:?}", entries.len(), path);

    Ok(entries.len())
}

/// Reads back a file produced by [`write`], in file order.
pub fn read<P: AsRef<Path>>(source: P) -> Result<Vec<(String, u64)>> {
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

    reader
        .records()
        .map(|result| {
            let row = result.map_err(|error| invalid(error.to_string()))?;
            let key = row
                .get(1)
                .ok_or_else(|| invalid(format!("Missing key in {:?}", row)))?;
            let count = row
                .get(2)
                .and_then(|count| count.parse::<u64>().ok())
                .ok_or_else(|| invalid(format!("Invalid count in {:?}", row)))?;
            let key = unescape_key(key).ok_or_else(|| invalid(format!("Invalid key: {}", key)))?;

            Ok((key, count))
        })
        .collect()
}

/// Opens a CSV writer, creating parent directories as needed.
pub(crate) fn create_writer(path: &Path) -> Result<Writer<File>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(Error::output(parent))?;
    }

    WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|error| Error::output(path)(error.into()))
}

pub fn escape_key(key: &str) -> String {
    let mut escaped = String::with_capacity(key.len());

    for c in key.chars() {
        if c == '\\' {
            escaped.push_str("\\\\");
        } else if c.is_ascii() {
            escaped.push(c);
        } else {
            escaped.extend(c.escape_unicode());
        }
    }

    escaped
}

pub fn unescape_key(escaped: &str) -> Option<String> {
    let mut key = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            key.push(c);
            continue;
        }

        match chars.next()? {
            '\\' => key.push('\\'),
            'u' => {
                if chars.next()? != '{' {
                    return None;
                }
                let digits = chars
                    .by_ref()
                    .take_while(|c| *c != '}')
                    .collect::<String>();
                let value = u32::from_str_radix(&digits, 16).ok()?;
                key.push(std::char::from_u32(value)?);
            }
            _ => return None,
        }
    }

    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, u64)]) -> FrequencyTable {
        entries
            .iter()
            .map(|(key, count)| (key.to_string(), *count))
            .collect()
    }

    #[test]
    fn ranked_breaks_ties_by_key() {
        let table = table(&[("b", 2), ("c", 5), ("a", 2), ("d", 1)]);
        let result = ranked(&table)
            .into_iter()
            .map(|(key, count)| (key.as_str(), count))
            .collect::<Vec<_>>();

        assert_eq!(result, vec![("c", 5), ("a", 2), ("b", 2), ("d", 1)]);
    }

    #[test]
    fn write_ranked_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/hashtags.csv");
        let table = table(&[("#x", 2), ("#café", 1), ("a,b", 1)]);

        assert_eq!(write(&table, &path).unwrap(), 3);
        let contents = std::fs::read_to_string(&path).unwrap();

        assert_eq!(contents, "0,#x,2\n1,#caf\\u{e9},1\n2,\"a,b\",1\n");
        assert!(contents.is_ascii());

        // Writing again replaces the file.
        write(&table, &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), contents);

        let expected = vec![
            ("#x".to_string(), 2),
            ("#café".to_string(), 1),
            ("a,b".to_string(), 1),
        ];
        assert_eq!(read(&path).unwrap(), expected);
    }

    #[test]
    fn read_missing_list() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            read(dir.path().join("terms.csv")),
            Err(Error::PrecursorMissing { .. })
        ));
    }

    #[test]
    fn escape_round_trip() {
        for key in &["plain", "back\\slash", "日本語", "emoji 😀", "\\u{41}"] {
            let escaped = escape_key(key);
            assert!(escaped.is_ascii());
            assert_eq!(unescape_key(&escaped).as_deref(), Some(*key));
        }

        assert_eq!(unescape_key("bad\\x"), None);
        assert_eq!(unescape_key("trailing\\"), None);
    }
}
