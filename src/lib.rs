// lib.rs - ArchiveFinder library
// Purpose: Candidate generation, concurrent probing and signature verification
//          for exposed backup archives

pub mod candidates;
pub mod config;
pub mod fetcher;
pub mod host_tokens;
pub mod metrics;
pub mod prober;
pub mod progress;
pub mod registry;
pub mod scheduler;
pub mod verifier;
pub mod wordlists;

#[cfg(test)]
mod test_support;
