// wordlists.rs - Intensity Presets
// Purpose: Static base-word, extension and backup-folder tables selected by --intensity

use std::fmt;
use std::str::FromStr;

/// Named preset selecting the default word, extension and folder tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Intensity {
    Small,
    #[default]
    Medium,
    Big,
}

impl FromStr for Intensity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "small" => Ok(Intensity::Small),
            "medium" => Ok(Intensity::Medium),
            "big" => Ok(Intensity::Big),
            other => anyhow::bail!("unknown intensity '{}' (expected small, medium or big)", other),
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Intensity::Small => "small",
            Intensity::Medium => "medium",
            Intensity::Big => "big",
        };
        f.write_str(name)
    }
}

// ═══════════════════════════════════════════════════════════════════
// BASE PATHS
// ═══════════════════════════════════════════════════════════════════

const BASE_PATHS_SMALL: &[&str] = &["backup", "backup/backup", "backups/backup"];

const BASE_PATHS_MEDIUM: &[&str] = &[
    "backup",
    "backup/backup",
    "backups/backup",
    "www",
    "database",
    "log",
    "logs",
    "123",
    "api",
    "admin",
    "inc",
    "private",
    "private/backup",
];

const BASE_PATHS_BIG: &[&str] = &[
    "backup",
    "backup/backup",
    "backups/backup",
    "admin/backup",
    "admin/log",
    "admin/backups/backup",
    "admin/logs/log",
    "www",
    "html",
    "app",
    "bin",
    "config",
    "src",
    "files",
    "uploads",
    "database",
    "mysql",
    "sql",
    "log",
    "logs",
    "export",
    "snapshot",
    "old",
    "db",
    "logs/log",
    "logs/logs",
    "site",
    "http",
    "website",
    "1",
    "123",
    "api",
    "admin",
    "inc",
    "private",
    "private/backup",
    "dump",
    "users",
    "backup1",
    "backup2",
    "backup3",
    "admins",
    "dist",
    "assets",
    "js",
];

// ═══════════════════════════════════════════════════════════════════
// EXTENSIONS
// ═══════════════════════════════════════════════════════════════════

const EXTENSIONS_SMALL: &[&str] = &["zip", "tar.gz"];
const EXTENSIONS_MEDIUM: &[&str] = &["zip", "tar.gz", "tar", "rar"];
const EXTENSIONS_BIG: &[&str] = &["zip", "tar.gz", "tar", "rar", "7z", "gz", "bz2"];

// ═══════════════════════════════════════════════════════════════════
// BACKUP FOLDERS (used by the domain-parts module)
// ═══════════════════════════════════════════════════════════════════

const BACKUP_FOLDERS_SMALL: &[&str] = &["backup", "backups"];
const BACKUP_FOLDERS_MEDIUM: &[&str] = &["backup", "backups", "old", "bak", "admin"];
const BACKUP_FOLDERS_BIG: &[&str] = &[
    "backup", "backups", "old", "bak", "admin", "archive", "archives", "dump", "dumps",
    "private", "files", "uploads",
];

impl Intensity {
    pub fn base_paths(self) -> &'static [&'static str] {
        match self {
            Intensity::Small => BASE_PATHS_SMALL,
            Intensity::Medium => BASE_PATHS_MEDIUM,
            Intensity::Big => BASE_PATHS_BIG,
        }
    }

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Intensity::Small => EXTENSIONS_SMALL,
            Intensity::Medium => EXTENSIONS_MEDIUM,
            Intensity::Big => EXTENSIONS_BIG,
        }
    }

    pub fn backup_folders(self) -> &'static [&'static str] {
        match self {
            Intensity::Small => BACKUP_FOLDERS_SMALL,
            Intensity::Medium => BACKUP_FOLDERS_MEDIUM,
            Intensity::Big => BACKUP_FOLDERS_BIG,
        }
    }
}
