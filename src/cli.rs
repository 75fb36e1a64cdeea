use crate::config::Config;
use crate::corpus::Corpus;
use crate::error::Result;
use crate::record::Format;
use simplelog::LevelFilter;
use std::path::{Path, PathBuf};

fn select_log_level_filter(verbosity: i32) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Off,
        1 => LevelFilter::Error,
        2 => LevelFilter::Warn,
        3 => LevelFilter::Info,
        4 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn init_logging(verbosity: i32) -> std::result::Result<(), log::SetLoggerError> {
    simplelog::TermLogger::init(
        select_log_level_filter(verbosity),
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )
}

/// Loads the configuration file if given and applies a command-line output directory.
pub fn load_config(path: Option<&Path>, output_dir: Option<PathBuf>) -> Result<Config> {
    let mut config = Config::load_or_default(path)?;

    if let Some(output_dir) = output_dir {
        config.output.dir = output_dir;
    }

    Ok(config)
}

/// Opens a corpus, inferring its format from the directory name unless one is given.
pub fn open_corpus<P: AsRef<Path>>(dir: P, format: Option<Format>) -> Result<Corpus> {
    let corpus = match format {
        Some(format) => Corpus::with_format(dir, format)?,
        None => Corpus::open(dir)?,
    };

    log::info!(
        "Opened {:?} corpus at {:?} with {} files",
        corpus.format(),
        corpus.dir(),
        corpus.files().len()
    );

    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(select_log_level_filter(0), LevelFilter::Off);
        assert_eq!(select_log_level_filter(3), LevelFilter::Info);
        assert_eq!(select_log_level_filter(9), LevelFilter::Trace);
    }

    #[test]
    fn command_line_output_dir_wins() {
        let config = load_config(None, Some(PathBuf::from("results"))).unwrap();

        assert_eq!(config.output.dir, PathBuf::from("results"));
    }
}
