// main.rs - ArchiveFinder - Exposed Backup Archive Scanner
// Purpose: Guess backup/archive URLs for a list of hosts and confirm real archives
//          by their file signatures

use anyhow::Result;
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use archivefinder::candidates::CandidateGenerator;
use archivefinder::config::{split_list, Config, FetcherKind, ModuleToggles, ScanMode};
use archivefinder::fetcher::build_fetcher;
use archivefinder::metrics::ScanSummary;
use archivefinder::prober::ConcurrentProber;
use archivefinder::progress::{ConsoleReporter, ProgressTicker, ScanReporter};
use archivefinder::registry::{FoundHostRegistry, ScanCounters};
use archivefinder::scheduler::ChunkedHostScheduler;
use archivefinder::verifier::ArchiveVerifier;
use archivefinder::wordlists::Intensity;

/// ArchiveFinder - exposed backup archive scanner
#[derive(Parser, Debug)]
#[command(
    name = "archivefinder",
    version = "0.1.0",
    about = "Find accidentally exposed backup archives by guessing paths and checking file signatures",
    after_help = r#"
EXAMPLES:

  Default (medium) scan:
    archivefinder --hosts hosts.txt

  Small static scan with host-derived names and the current year:
    archivefinder --hosts hosts.txt --intensity small --with-host-parts --with-year

  Only host-derived names, custom extensions:
    archivefinder --hosts hosts.txt --only-dynamic-entries --with-host-parts --extensions zip,7z
"#
)]
struct Args {
    // ═══════════════════════════════════════════════════════════════════════════
    // TARGET OPTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// File with one host or URL per line
    #[arg(long, value_name = "FILE", help_heading = "Target Options")]
    hosts: PathBuf,

    /// Randomize host order before chunking
    #[arg(long, help_heading = "Target Options")]
    shuffle: bool,

    // ═══════════════════════════════════════════════════════════════════════════
    // WORDLIST OPTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Scanning intensity: small, medium or big
    #[arg(long, default_value = "medium", value_name = "LEVEL", help_heading = "Wordlists")]
    intensity: Intensity,

    /// Comma-separated base words (overrides intensity words)
    #[arg(long, value_name = "LIST", help_heading = "Wordlists")]
    words: Option<String>,

    /// Comma-separated extensions (overrides intensity extensions)
    #[arg(long, value_name = "LIST", help_heading = "Wordlists")]
    extensions: Option<String>,

    /// Comma-separated backup folders (overrides intensity folders)
    #[arg(long, value_name = "LIST", help_heading = "Wordlists")]
    backup_folders: Option<String>,

    // ═══════════════════════════════════════════════════════════════════════════
    // DYNAMIC ENTRY MODULES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Use only dynamically generated entries
    #[arg(long, help_heading = "Dynamic Entries")]
    only_dynamic_entries: bool,

    /// Disable every dynamically generated entry
    #[arg(long, help_heading = "Dynamic Entries")]
    disable_dynamic_entries: bool,

    /// Generate names based on the current year
    #[arg(long, help_heading = "Dynamic Entries")]
    with_year: bool,

    /// Generate names based on the current date
    #[arg(long, help_heading = "Dynamic Entries")]
    with_date: bool,

    /// Generate names based on host parts
    #[arg(long, help_heading = "Dynamic Entries")]
    with_host_parts: bool,

    /// Generate names from the first 3-4 chars of the first subdomain label
    #[arg(long, help_heading = "Dynamic Entries")]
    with_first_chars: bool,

    // ═══════════════════════════════════════════════════════════════════════════
    // PERFORMANCE & TRANSPORT
    // ═══════════════════════════════════════════════════════════════════════════

    /// Request timeout in seconds
    #[arg(long, default_value = "60", value_name = "SECONDS", help_heading = "Performance")]
    timeout: u64,

    /// Maximum number of requests in flight
    #[arg(long, default_value = "2500", value_name = "NUM", help_heading = "Performance")]
    concurrency: usize,

    /// Hosts processed per chunk
    #[arg(long, default_value = "500", value_name = "NUM", help_heading = "Performance")]
    chunk_size: usize,

    /// Use the lean HTTP/1.1 transport with a ranged-GET gate instead of HEAD
    #[arg(long, help_heading = "Performance")]
    lean_client: bool,

    // ═══════════════════════════════════════════════════════════════════════════
    // OUTPUT
    // ═══════════════════════════════════════════════════════════════════════════

    /// Print request timings and transport errors
    #[arg(short, long, help_heading = "Output")]
    verbose: bool,

    /// Print the final summary as JSON
    #[arg(long, help_heading = "Output")]
    json_summary: bool,
}

impl Args {
    fn into_config(self) -> Config {
        let list = |raw: Option<String>| raw.as_deref().map(split_list).unwrap_or_default();

        Config {
            hosts_file: self.hosts,
            timeout: Duration::from_secs(self.timeout),
            concurrency: self.concurrency,
            chunk_size: self.chunk_size,
            intensity: self.intensity,
            user_words: list(self.words),
            user_extensions: list(self.extensions),
            user_backup_folders: list(self.backup_folders),
            mode: ScanMode {
                only_dynamic: self.only_dynamic_entries,
                disable_dynamic: self.disable_dynamic_entries,
            },
            modules: ModuleToggles {
                years: self.with_year,
                date: self.with_date,
                domain_parts: self.with_host_parts,
                first_chars: self.with_first_chars,
            },
            fetcher: if self.lean_client {
                FetcherKind::Lean
            } else {
                FetcherKind::Standard
            },
            shuffle: self.shuffle,
            verbose: self.verbose,
            json_summary: self.json_summary,
        }
    }
}

fn print_banner(config: &Config) {
    eprintln!("{}", "═══════════════════════════════════════════════════════════════".cyan().bold());
    eprintln!("{}", "  ArchiveFinder - Exposed Backup Archive Scanner".white().bold());
    eprintln!("{}", "═══════════════════════════════════════════════════════════════".cyan().bold());
    eprintln!("  {} Hosts file: {}", "├─".cyan(), config.hosts_file.display());
    eprintln!("  {} Intensity: {}", "├─".cyan(), config.intensity);
    eprintln!("  {} Concurrency: {} | Chunk size: {}", "├─".cyan(), config.concurrency, config.chunk_size);
    eprintln!("  {} Timeout: {:?} | Transport: {:?}", "└─".cyan(), config.timeout, config.fetcher);
    eprintln!();
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Args::parse().into_config();

    if let Err(e) = config.validate() {
        eprintln!("{} {:#}", "[!] Invalid configuration:".red().bold(), e);
        std::process::exit(1);
    }
    if config.mode.dynamic_enabled() && !config.mode.static_enabled() && !config.modules.any() {
        eprintln!(
            "{}",
            "[!] --only-dynamic-entries without any --with-* module generates no candidates".yellow()
        );
    }

    print_banner(&config);

    let config = Arc::new(config);
    let counters = Arc::new(ScanCounters::new());
    let registry = Arc::new(FoundHostRegistry::new());
    let console = Arc::new(ConsoleReporter::new(config.verbose));
    let reporter: Arc<dyn ScanReporter> = console.clone();

    let fetcher = build_fetcher(&config)?;
    reporter.info(&format!("Starting archive scan ({} transport)...", fetcher.name()));

    let prober = ConcurrentProber::new(
        config.concurrency,
        fetcher,
        ArchiveVerifier::default(),
        Arc::clone(&registry),
        Arc::clone(&counters),
        Arc::clone(&reporter),
    );
    let scheduler = ChunkedHostScheduler::new(
        config.chunk_size,
        config.shuffle,
        CandidateGenerator::from_config(&config),
        prober,
        Arc::clone(&counters),
        Arc::clone(&reporter),
    );

    let mut summary = ScanSummary::start(&config);
    let ticker = ProgressTicker::spawn(Arc::clone(&counters), Arc::clone(&reporter));

    let result = scheduler.run(&config.hosts_file).await;

    ticker.stop();
    console.finish();
    summary.finalize(&counters, scheduler.prober().findings());

    reporter.info(&format!("All done! Total requests: {}", counters.completed()));
    if config.json_summary {
        println!("{}", summary.to_json()?);
    } else {
        eprintln!("\n{}", summary.summary());
    }

    if let Err(e) = result {
        eprintln!("{} {:#}", "[!] Error processing hosts file:".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
