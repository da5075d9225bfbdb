// candidates.rs - Candidate URL Generation
// Purpose: Lazily synthesize deduplicated archive URLs for one host from static
//          wordlists, host-derived tokens and year/date heuristics

use chrono::{Datelike, Local, NaiveDate};
use std::collections::HashSet;
use std::iter;
use std::sync::Arc;
use url::Url;

use crate::config::{Config, ModuleToggles, ScanMode, WordTables};
use crate::host_tokens::{extract_tokens, first_label_prefix, host_key, normalize_host};

/// One URL to probe and the host it was derived from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateUrl {
    pub url: String,
    pub host: String,
}

/// Builds per-host candidate sequences from immutable tables
#[derive(Debug, Clone)]
pub struct CandidateGenerator {
    tables: WordTables,
    mode: ScanMode,
    modules: ModuleToggles,
    today: NaiveDate,
}

impl CandidateGenerator {
    pub fn new(tables: WordTables, mode: ScanMode, modules: ModuleToggles, today: NaiveDate) -> Self {
        Self {
            tables,
            mode,
            modules,
            today,
        }
    }

    /// Generator for a scan starting now, using the local calendar date
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.tables(),
            config.mode,
            config.modules,
            Local::now().date_naive(),
        )
    }

    /// Fresh candidate sequence for one host line. Unparseable lines yield nothing.
    pub fn for_host(&self, host_line: &str) -> CandidateUrls {
        let Some(base) = normalize_host(host_line) else {
            return CandidateUrls::empty();
        };
        let Some(host) = Url::parse(&base).ok().as_ref().and_then(host_key) else {
            return CandidateUrls::empty();
        };

        let base: Arc<str> = Arc::from(base);
        let mut blocks: Vec<Box<dyn Iterator<Item = String> + Send>> = Vec::new();

        if self.mode.static_enabled() {
            blocks.push(Box::new(static_block(
                Arc::clone(&base),
                Arc::clone(&self.tables.base_paths),
                Arc::clone(&self.tables.extensions),
            )));
        }

        if self.mode.dynamic_enabled() {
            if self.modules.domain_parts {
                blocks.push(Box::new(domain_parts_block(
                    Arc::clone(&base),
                    extract_tokens(&base).into(),
                    Arc::clone(&self.tables.extensions),
                    Arc::clone(&self.tables.backup_folders),
                )));
            }

            if self.modules.first_chars {
                let prefixes: Vec<String> = [3, 4]
                    .into_iter()
                    .filter_map(|len| first_label_prefix(&base, len))
                    .collect();
                blocks.push(Box::new(static_block(
                    Arc::clone(&base),
                    prefixes.into(),
                    Arc::clone(&self.tables.extensions),
                )));
            }

            if self.modules.years || self.modules.date {
                blocks.push(Box::new(dated_block(
                    Arc::clone(&base),
                    Arc::clone(&self.tables.extensions),
                    self.today,
                    self.modules,
                )));
            }
        }

        CandidateUrls {
            inner: Box::new(blocks.into_iter().flatten()),
            seen: HashSet::new(),
            host,
        }
    }
}

/// Lazy, finite candidate sequence for a single host, duplicates suppressed
pub struct CandidateUrls {
    inner: Box<dyn Iterator<Item = String> + Send>,
    seen: HashSet<String>,
    host: String,
}

impl CandidateUrls {
    fn empty() -> Self {
        Self {
            inner: Box::new(iter::empty()),
            seen: HashSet::new(),
            host: String::new(),
        }
    }
}

impl Iterator for CandidateUrls {
    type Item = CandidateUrl;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let url = self.inner.next()?;
            if self.seen.insert(url.clone()) {
                return Some(CandidateUrl {
                    url,
                    host: self.host.clone(),
                });
            }
        }
    }
}

fn index_pairs(outer: usize, inner: usize) -> impl Iterator<Item = (usize, usize)> + Send + 'static {
    (0..outer).flat_map(move |i| (0..inner).map(move |j| (i, j)))
}

/// `<base><word>.<ext>` for every word × extension
fn static_block(
    base: Arc<str>,
    words: Arc<[String]>,
    exts: Arc<[String]>,
) -> impl Iterator<Item = String> + Send + 'static {
    index_pairs(words.len(), exts.len())
        .map(move |(i, j)| format!("{}{}.{}", base, words[i], exts[j]))
}

/// `<base><token>.<ext>` followed by `<base><folder>/<token>.<ext>` per folder
fn domain_parts_block(
    base: Arc<str>,
    tokens: Arc<[String]>,
    exts: Arc<[String]>,
    folders: Arc<[String]>,
) -> impl Iterator<Item = String> + Send + 'static {
    index_pairs(tokens.len(), exts.len()).flat_map(move |(i, j)| {
        let base = Arc::clone(&base);
        let folders = Arc::clone(&folders);
        let token = tokens[i].clone();
        let ext = exts[j].clone();

        let direct = format!("{}{}.{}", base, token, ext);
        iter::once(direct).chain(
            (0..folders.len()).map(move |k| format!("{}{}/{}.{}", base, folders[k], token, ext)),
        )
    })
}

fn dated_block(
    base: Arc<str>,
    exts: Arc<[String]>,
    today: NaiveDate,
    modules: ModuleToggles,
) -> impl Iterator<Item = String> + Send + 'static {
    let year = today.year();
    let date = today.format("%Y-%m-%d").to_string();

    (0..exts.len()).flat_map(move |j| {
        let ext = &exts[j];
        let mut urls = Vec::with_capacity(6);
        if modules.years {
            urls.push(format!("{}backup{}.{}", base, year, ext));
            urls.push(format!("{}backup-{}.{}", base, year, ext));
            urls.push(format!("{}backup_{}.{}", base, year, ext));
            urls.push(format!("{}backups/backup{}.{}", base, year, ext));
        }
        if modules.date {
            urls.push(format!("{}backup-{}.{}", base, date, ext));
            urls.push(format!("{}backups/backup-{}.{}", base, date, ext));
        }
        urls
    })
}
