// config.rs - Scan Configuration
// Purpose: Immutable scan parameters shared read-only by every worker

use anyhow::{bail, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::wordlists::Intensity;

/// Which candidate blocks the generator emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanMode {
    /// Skip the static wordlist block
    pub only_dynamic: bool,
    /// Skip every dynamic block
    pub disable_dynamic: bool,
}

impl ScanMode {
    pub fn static_enabled(&self) -> bool {
        !self.only_dynamic
    }

    pub fn dynamic_enabled(&self) -> bool {
        !self.disable_dynamic
    }
}

/// Per-module toggles for the dynamic candidate blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModuleToggles {
    pub years: bool,
    pub date: bool,
    pub domain_parts: bool,
    pub first_chars: bool,
}

impl ModuleToggles {
    pub fn all() -> Self {
        Self {
            years: true,
            date: true,
            domain_parts: true,
            first_chars: true,
        }
    }

    pub fn any(&self) -> bool {
        self.years || self.date || self.domain_parts || self.first_chars
    }
}

/// HTTP transport used for probing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetcherKind {
    /// HEAD gate followed by a streamed GET
    #[default]
    Standard,
    /// HTTP/1.1-only client using a one-byte ranged GET as the gate
    Lean,
}

/// Resolved word, extension and folder tables
#[derive(Debug, Clone)]
pub struct WordTables {
    pub base_paths: Arc<[String]>,
    pub extensions: Arc<[String]>,
    pub backup_folders: Arc<[String]>,
}

impl WordTables {
    pub fn new<S: AsRef<str>>(base_paths: &[S], extensions: &[S], backup_folders: &[S]) -> Self {
        let owned = |items: &[S]| -> Arc<[String]> {
            items.iter().map(|s| s.as_ref().to_string()).collect()
        };
        Self {
            base_paths: owned(base_paths),
            extensions: owned(extensions),
            backup_folders: owned(backup_folders),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub hosts_file: PathBuf,
    pub timeout: Duration,
    pub concurrency: usize,
    pub chunk_size: usize,
    pub intensity: Intensity,
    pub user_words: Vec<String>,
    pub user_extensions: Vec<String>,
    pub user_backup_folders: Vec<String>,
    pub mode: ScanMode,
    pub modules: ModuleToggles,
    pub fetcher: FetcherKind,
    pub shuffle: bool,
    pub verbose: bool,
    pub json_summary: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hosts_file: PathBuf::new(),
            timeout: Duration::from_secs(60),
            concurrency: 2500,
            chunk_size: 500,
            intensity: Intensity::Medium,
            user_words: Vec::new(),
            user_extensions: Vec::new(),
            user_backup_folders: Vec::new(),
            mode: ScanMode::default(),
            modules: ModuleToggles::default(),
            fetcher: FetcherKind::Standard,
            shuffle: false,
            verbose: false,
            json_summary: false,
        }
    }
}

impl Config {
    /// Intensity presets with any user overrides applied
    pub fn tables(&self) -> WordTables {
        fn pick(user: &[String], preset: &[&str]) -> Vec<String> {
            if user.is_empty() {
                preset.iter().map(|s| s.to_string()).collect()
            } else {
                user.to_vec()
            }
        }

        WordTables::new(
            &pick(&self.user_words, self.intensity.base_paths()),
            &pick(&self.user_extensions, self.intensity.extensions()),
            &pick(&self.user_backup_folders, self.intensity.backup_folders()),
        )
    }

    pub fn validate(&self) -> Result<()> {
        if self.hosts_file.as_os_str().is_empty() {
            bail!("a hosts file is required (--hosts <FILE>)");
        }
        if self.concurrency == 0 {
            bail!("concurrency must be at least 1");
        }
        if self.chunk_size == 0 {
            bail!("chunk size must be at least 1");
        }
        if self.timeout.is_zero() {
            bail!("timeout must be greater than zero");
        }
        if self.mode.only_dynamic && self.mode.disable_dynamic {
            bail!("--only-dynamic-entries and --disable-dynamic-entries cannot be combined");
        }

        let tables = self.tables();
        if tables.extensions.is_empty() {
            bail!("no extensions configured");
        }
        if self.mode.static_enabled() && tables.base_paths.is_empty() {
            bail!("no base words configured for the static block");
        }
        Ok(())
    }
}

/// Splits a comma-separated CLI list, trimming items and dropping empty ones
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            hosts_file: PathBuf::from("hosts.txt"),
            ..Config::default()
        }
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" zip, tar.gz ,,rar"), vec!["zip", "tar.gz", "rar"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_user_overrides_replace_presets() {
        let mut config = valid_config();
        config.intensity = Intensity::Small;
        config.user_extensions = vec!["7z".to_string()];

        let tables = config.tables();
        assert_eq!(&*tables.extensions, &["7z".to_string()]);
        assert_eq!(tables.base_paths.len(), Intensity::Small.base_paths().len());
        assert_eq!(tables.backup_folders.len(), Intensity::Small.backup_folders().len());
    }

    #[test]
    fn test_validate_rejects_contradictory_modes() {
        let mut config = valid_config();
        assert!(config.validate().is_ok());

        config.mode = ScanMode {
            only_dynamic: true,
            disable_dynamic: true,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_missing_hosts_and_zero_limits() {
        assert!(Config::default().validate().is_err());

        let mut config = valid_config();
        config.concurrency = 0;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.chunk_size = 0;
        assert!(config.validate().is_err());
    }
}
