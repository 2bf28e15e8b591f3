//! Layered configuration: built-in defaults, then an optional TOML file,
//! then `CPPSCANNER_`-prefixed environment variables.
//!
//! Grounded in `examples/bartolli-codanna/src/config.rs`'s `figment`-based
//! `Settings::load()` chain (`Serialized::defaults` -> `Toml::file` ->
//! `Env::prefixed`).

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_parallel_threads() -> usize {
    num_cpus::get()
}

fn default_index_external_files() -> bool {
    false
}

fn default_index_local_symbols() -> bool {
    true
}

fn default_result_poll_timeout_ms() -> u64 {
    250
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    #[serde(default = "default_parallel_threads")]
    pub parallel_threads: usize,
    #[serde(default = "default_index_external_files")]
    pub index_external_files: bool,
    #[serde(default = "default_index_local_symbols")]
    pub index_local_symbols: bool,
    #[serde(default)]
    pub filters: Vec<String>,
    #[serde(default)]
    pub translation_unit_filters: Vec<String>,
    #[serde(default = "default_result_poll_timeout_ms")]
    pub result_poll_timeout_ms: u64,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        IndexingConfig {
            parallel_threads: default_parallel_threads(),
            index_external_files: default_index_external_files(),
            index_local_symbols: default_index_local_symbols(),
            filters: Vec::new(),
            translation_unit_filters: Vec::new(),
            result_poll_timeout_ms: default_result_poll_timeout_ms(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
        }
    }
}

fn default_output_path() -> String {
    "snapshot.db".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default = "default_output_path")]
    pub output: String,
    pub home: Option<PathBuf>,
    pub root: Option<PathBuf>,
    #[serde(default)]
    pub indexing: IndexingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

const ENV_PREFIX: &str = "CPPSCANNER_";
const CONFIG_DIR_NAME: &str = ".cppscanner";
const CONFIG_FILE_NAME: &str = "config.toml";

impl Settings {
    /// Load defaults, layer an optional config file, then environment
    /// variables, in that order of increasing precedence.
    pub fn load(config_path: Option<&Path>) -> Result<Settings, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Settings::default()));

        if let Some(path) = config_path.map(Path::to_path_buf).or_else(find_workspace_config) {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let mut settings: Settings = figment.extract()?;

        // The three original plugin-mode env vars take precedence over
        // everything above, including the generic CPPSCANNER_ layering.
        if let Some(index_local) = crate::env::index_local_symbols_override() {
            settings.indexing.index_local_symbols = index_local;
        }
        if let Some(home) = crate::env::home_dir_override() {
            settings.home = Some(PathBuf::from(home));
        }
        if let Some(output_dir) = crate::env::output_dir_override() {
            settings.output = output_dir;
        }

        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
        })?;
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Walk up from the current directory looking for a `.cppscanner/` config
/// directory.
pub fn find_workspace_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    for ancestor in cwd.ancestors() {
        let candidate = ancestor.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
        if candidate.exists() {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // figment reads process-wide environment variables; serialize access
    // across tests that touch env vars so they don't race.
    static ENV_GUARD: Mutex<()> = Mutex::new(());

    #[test]
    fn defaults_are_populated() {
        let _guard = ENV_GUARD.lock().unwrap();
        let settings = Settings::load(None).expect("defaults always load");
        assert_eq!(settings.output, "snapshot.db");
        assert!(settings.indexing.parallel_threads >= 1);
    }

    #[test]
    fn env_overrides_take_precedence() {
        let _guard = ENV_GUARD.lock().unwrap();
        std::env::set_var("CPPSCANNER_OUTPUT", "custom.db");
        let settings = Settings::load(None).expect("settings load");
        std::env::remove_var("CPPSCANNER_OUTPUT");
        assert_eq!(settings.output, "custom.db");
    }

    #[test]
    fn nested_env_override_via_double_underscore() {
        let _guard = ENV_GUARD.lock().unwrap();
        std::env::set_var("CPPSCANNER_INDEXING__PARALLEL_THREADS", "3");
        let settings = Settings::load(None).expect("settings load");
        std::env::remove_var("CPPSCANNER_INDEXING__PARALLEL_THREADS");
        assert_eq!(settings.indexing.parallel_threads, 3);
    }

    #[test]
    fn plugin_mode_env_vars_override_everything_else() {
        let _guard = ENV_GUARD.lock().unwrap();
        std::env::set_var("CPPSCANNER_INDEXING__INDEX_LOCAL_SYMBOLS", "true");
        std::env::set_var("CPPSCANNER_INDEX_LOCAL_SYMBOLS", "0");
        std::env::set_var("CPPSCANNER_OUTPUT_DIR", "plugin.db");
        let settings = Settings::load(None).expect("settings load");
        std::env::remove_var("CPPSCANNER_INDEXING__INDEX_LOCAL_SYMBOLS");
        std::env::remove_var("CPPSCANNER_INDEX_LOCAL_SYMBOLS");
        std::env::remove_var("CPPSCANNER_OUTPUT_DIR");
        assert!(!settings.indexing.index_local_symbols);
        assert_eq!(settings.output, "plugin.db");
    }
}
