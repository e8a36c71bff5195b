use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use casegrid_plan::{DependencyMode, Strategy};

use super::{ConfigError, ConfigResult};

/// Settings file looked up in the working directory when `--config` is absent.
pub const DEFAULT_SETTINGS_FILE: &str = "casegrid.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub run_dir: PathBuf,
    pub max_combinations: u64,
    pub csv_delimiter: char,
    pub default_strategy: Strategy,
    pub dependency_mode: DependencyMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            run_dir: PathBuf::from("runs"),
            max_combinations: 250_000,
            csv_delimiter: ';',
            default_strategy: Strategy::Pairwise,
            dependency_mode: DependencyMode::Filter,
        }
    }
}

impl Settings {
    pub fn delimiter(&self) -> ConfigResult<u8> {
        u8::try_from(self.csv_delimiter)
            .ok()
            .filter(|byte| byte.is_ascii() && !matches!(byte, b'"' | b'\n' | b'\r'))
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "csv_delimiter must be a single ASCII character, got '{}'",
                    self.csv_delimiter
                ))
            })
    }

    fn check(&self) -> ConfigResult<()> {
        if self.max_combinations == 0 {
            return Err(ConfigError::Invalid("max_combinations must be positive".to_string()));
        }
        self.delimiter().map(|_| ())
    }
}

/// Load settings from `path`, or from `casegrid.toml` when present.
///
/// An explicit path must exist; the implicit file is optional and missing
/// keys fall back to defaults.
pub fn load_settings(path: Option<&Path>) -> ConfigResult<Settings> {
    let settings = match path {
        Some(path) => parse(&std::fs::read_to_string(path)?)?,
        None => {
            let implicit = Path::new(DEFAULT_SETTINGS_FILE);
            if implicit.exists() {
                parse(&std::fs::read_to_string(implicit)?)?
            } else {
                Settings::default()
            }
        }
    };
    settings.check()?;
    Ok(settings)
}

fn parse(content: &str) -> ConfigResult<Settings> {
    Ok(toml::from_str(content)?)
}
