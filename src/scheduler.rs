// scheduler.rs - Chunked Host Scheduling
// Purpose: Stream the host list in bounded chunks and fully drain each chunk through
//          the prober before reading the next, capping in-flight memory

use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use crate::candidates::CandidateGenerator;
use crate::progress::ScanReporter;
use crate::prober::ConcurrentProber;
use crate::registry::ScanCounters;

/// Trimmed, non-empty host lines from a reader, grouped `chunk_size` at a time
pub struct HostChunks<R> {
    lines: io::Split<R>,
    chunk_size: usize,
}

impl<R: BufRead> HostChunks<R> {
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            lines: reader.split(b'\n'),
            chunk_size: chunk_size.max(1),
        }
    }
}

impl<R: BufRead> Iterator for HostChunks<R> {
    type Item = io::Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut chunk = Vec::with_capacity(self.chunk_size);
        while chunk.len() < self.chunk_size {
            match self.lines.next() {
                Some(Ok(raw)) => {
                    let line = String::from_utf8_lossy(&raw).trim().to_string();
                    if !line.is_empty() {
                        chunk.push(line);
                    }
                }
                Some(Err(e)) => return Some(Err(e)),
                None => break,
            }
        }
        (!chunk.is_empty()).then_some(Ok(chunk))
    }
}

pub struct ChunkedHostScheduler {
    chunk_size: usize,
    shuffle: bool,
    generator: CandidateGenerator,
    prober: ConcurrentProber,
    counters: Arc<ScanCounters>,
    reporter: Arc<dyn ScanReporter>,
}

impl ChunkedHostScheduler {
    pub fn new(
        chunk_size: usize,
        shuffle: bool,
        generator: CandidateGenerator,
        prober: ConcurrentProber,
        counters: Arc<ScanCounters>,
        reporter: Arc<dyn ScanReporter>,
    ) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            shuffle,
            generator,
            prober,
            counters,
            reporter,
        }
    }

    pub fn prober(&self) -> &ConcurrentProber {
        &self.prober
    }

    /// Scans every host in the file. Failing to open or read the file is the
    /// only error; per-host and per-request failures are absorbed.
    pub async fn run(&self, hosts_file: &Path) -> Result<()> {
        let file = File::open(hosts_file)
            .with_context(|| format!("Failed to open hosts file: {}", hosts_file.display()))?;
        let chunks = HostChunks::new(BufReader::new(file), self.chunk_size);

        if self.shuffle {
            // shuffling needs the whole list up front
            let mut hosts: Vec<String> = Vec::new();
            for chunk in chunks {
                hosts.extend(chunk.context("Failed to read hosts file")?);
            }
            hosts.shuffle(&mut rand::thread_rng());

            for (index, chunk) in hosts.chunks(self.chunk_size).enumerate() {
                self.run_chunk(index, chunk).await;
            }
        } else {
            for (index, chunk) in chunks.enumerate() {
                let chunk = chunk.context("Failed to read hosts file")?;
                self.run_chunk(index, &chunk).await;
            }
        }

        Ok(())
    }

    pub async fn run_chunk(&self, index: usize, hosts: &[String]) {
        self.reporter.chunk_started(index, hosts.len());

        let generator = &self.generator;
        let counters = &self.counters;
        let candidates = hosts.iter().flat_map(move |host| {
            counters.record_host();
            generator.for_host(host)
        });

        self.prober.run_chunk(candidates).await;
    }
}
