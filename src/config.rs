//! Settings file handling.
//!
//! dorina reads a single ini-shaped file with a `[DEFAULT]` section holding
//! `data_path`, `organism`, `version` and `tissue`. A `~` in `data_path`
//! expands to the user home. The file lives at
//! `~/.config/dorina/dorina.cfg` and can be overridden with the
//! `DORINA_CONFIG` environment variable; a missing file yields defaults.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::parser::util::{open_records, trim_line_end};

/// Environment variable naming an alternative settings file.
pub const CONFIG_ENV: &str = "DORINA_CONFIG";

/// Keys of the `[DEFAULT]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_path: String,
    pub organism: String,
    pub version: String,
    pub tissue: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            data_path: "~/.local/share/dorina".to_string(),
            organism: String::new(),
            version: String::new(),
            tissue: String::new(),
        }
    }
}

impl Settings {
    /// The `data_path` with `~` expanded.
    pub fn expanded_data_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.data_path).into_owned())
    }

    /// Load settings from an ini-shaped file.
    ///
    /// Only the `[DEFAULT]` section is consumed; unknown keys and other
    /// sections are ignored. `key = value` and `key: value` are both
    /// accepted.
    pub fn load(path: &Path) -> Result<Self> {
        let reader = open_records(path)?;
        Self::parse(reader, path)
    }

    fn parse<R: BufRead>(reader: R, path: &Path) -> Result<Self> {
        let mut settings = Settings::default();
        let mut in_default = false;

        for (idx, line_result) in reader.lines().enumerate() {
            let line = line_result.map_err(|source| Error::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let line = trim_line_end(&line).trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(section) = line.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                in_default = section == "DEFAULT";
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .or_else(|| line.split_once(':'))
                .ok_or_else(|| Error::MalformedRecord {
                    file: path.to_path_buf(),
                    line: idx + 1,
                    reason: format!("expected key = value, got {:?}", line),
                })?;

            if !in_default {
                continue;
            }

            let value = value.trim().to_string();
            match key.trim() {
                "data_path" => settings.data_path = value,
                "organism" => settings.organism = value,
                "version" => settings.version = value,
                "tissue" => settings.tissue = value,
                _ => {}
            }
        }

        Ok(settings)
    }

    /// Load from `DORINA_CONFIG` or the default location; a missing file
    /// yields [`Settings::default`].
    pub fn discover() -> Result<Self> {
        let path = match std::env::var_os(CONFIG_ENV) {
            Some(value) => PathBuf::from(value),
            None => PathBuf::from(
                shellexpand::tilde("~/.config/dorina/dorina.cfg").into_owned(),
            ),
        };

        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Settings::default())
        }
    }
}
