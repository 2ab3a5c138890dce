use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use fs_err::File;
use log::LevelFilter;

use crate::errors::{Handle, StateError};

const DEFAULT_HISTORY_LIMIT: usize = 1000;
const CONFIG_DIRECTORY: &str = ".pipesh";

// Represents any settings for the shell, most of which can be configured by the user
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    // Maximum number of entries kept in the in-memory history
    pub history_limit: usize,
    // Where the history is loaded from and saved to, if anywhere
    pub history_file: Option<PathBuf>,
    // Level for the log file; `Off` disables logging entirely
    pub log_level: LevelFilter,
    // Whether to show the prompt tick on a new line
    pub multi_line_prompt: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            history_file: config_directory().ok().map(|dir| dir.join("history")),
            log_level: LevelFilter::Off,
            multi_line_prompt: false,
        }
    }
}

impl Configuration {
    /// Loads the configuration file, falling back to defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self, StateError> {
        match File::open(path) {
            Ok(file) => Self::from_reader(BufReader::new(file), path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(StateError::FailedToReadConfigFile(e)),
        }
    }

    // Scans configuration lines for settings and updates the configuration accordingly
    // * Blank lines and lines starting with '#' are skipped
    pub fn from_reader(reader: impl BufRead, path: &Path) -> Result<Self, StateError> {
        let mut config = Self::default();

        for (index, line) in reader.lines().enumerate() {
            let line_number = index + 1;
            let line = line.map_err(StateError::FailedToReadConfigFile)?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, value) = line
                .split_once(':')
                .replace_err(|| StateError::MalformedConfigLine {
                    path: path.to_path_buf(),
                    line: line_number,
                })?;
            let (key, value) = (key.trim(), value.trim());

            let invalid = || StateError::InvalidConfigValue {
                path: path.to_path_buf(),
                line: line_number,
                key: key.to_owned(),
                value: value.to_owned(),
            };

            match key {
                "history-limit" => {
                    config.history_limit = value.parse::<usize>().replace_err(invalid)?;
                }
                "history-file" => {
                    config.history_file = match value {
                        "" | "none" => None,
                        _ => Some(path.parent().unwrap_or(Path::new(".")).join(value)),
                    };
                }
                "log-level" => {
                    config.log_level = value.parse::<LevelFilter>().replace_err(invalid)?;
                }
                "multi-line-prompt" => {
                    config.multi_line_prompt = value.parse::<bool>().replace_err(invalid)?;
                }
                _ => {
                    return Err(StateError::UnknownConfigKey {
                        path: path.to_path_buf(),
                        line: line_number,
                        key: key.to_owned(),
                    })
                }
            }
        }

        Ok(config)
    }
}

/// Directory holding the configuration, history and log files
pub fn config_directory() -> Result<PathBuf, StateError> {
    dirs::home_dir()
        .map(|home| home.join(CONFIG_DIRECTORY))
        .replace_err(|| StateError::NoHomeDirectory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(text: &str) -> Result<Configuration, StateError> {
        Configuration::from_reader(Cursor::new(text), Path::new("/etc/pipesh/config"))
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(parse("").unwrap(), Configuration::default());
    }

    #[test]
    fn reads_every_key() {
        let config = parse(
            "# comment\n\
             history-limit: 5\n\
             history-file: hist.txt\n\
             log-level: debug\n\
             \n\
             multi-line-prompt: true\n",
        )
        .unwrap();

        assert_eq!(config.history_limit, 5);
        assert_eq!(config.history_file, Some(PathBuf::from("/etc/pipesh/hist.txt")));
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert!(config.multi_line_prompt);
    }

    #[test]
    fn absolute_history_file_is_kept() {
        let config = parse("history-file: /var/tmp/h\n").unwrap();
        assert_eq!(config.history_file, Some(PathBuf::from("/var/tmp/h")));
        let config = parse("history-file: none\n").unwrap();
        assert_eq!(config.history_file, None);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = parse("colour: blue\n").unwrap_err();
        assert!(matches!(err, StateError::UnknownConfigKey { line: 1, .. }));
    }

    #[test]
    fn malformed_line_is_rejected() {
        let err = parse("history-limit 5\n").unwrap_err();
        assert!(matches!(err, StateError::MalformedConfigLine { line: 1, .. }));
    }

    #[test]
    fn invalid_value_is_rejected() {
        let err = parse("history-limit: lots\n").unwrap_err();
        assert!(matches!(err, StateError::InvalidConfigValue { .. }));
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Configuration::load(&dir.path().join("config")).unwrap();
        assert_eq!(config, Configuration::default());
    }
}
