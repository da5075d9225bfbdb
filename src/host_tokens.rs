// host_tokens.rs - Host Token Extraction
// Purpose: Normalize host lines and decompose host names into short candidate words
//          (registrable domain, bare domain, subdomain labels, dash fragments, path segments)

use regex::Regex;
use std::collections::HashSet;
use std::net::IpAddr;
use url::{Host, Url};

lazy_static::lazy_static! {
    static ref RE_IPV4_LITERAL: Regex = Regex::new(r"^(?:\d{1,3}\.){3}\d{1,3}(?::\d+)?$").unwrap();
    static ref RE_NUMERIC: Regex = Regex::new(r"^\d+$").unwrap();
}

/// Path segments containing one of these are assets, not project names
const IRRELEVANT_PATH_MARKERS: &[&str] = &["css", "icons", "images"];

const MAX_PATH_SEGMENT_LEN: usize = 10;
const MAX_SUBDOMAIN_LABELS: usize = 2;

/// Turns a host line into the base URL candidates are rooted at:
/// `scheme://host[:port]/path/`. Returns `None` for lines that do not parse.
pub fn normalize_host(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let with_scheme = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    let url = Url::parse(&with_scheme).ok()?;
    let host = url.host_str()?;

    let mut path = url.path().to_string();
    if !path.ends_with('/') {
        path.push('/');
    }

    Some(match url.port() {
        Some(port) => format!("{}://{}:{}{}", url.scheme(), host, port, path),
        None => format!("{}://{}{}", url.scheme(), host, path),
    })
}

/// Registry key for a URL: host plus explicit port, the way it appears in the authority
pub fn host_key(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

pub fn is_ip_literal(value: &str) -> bool {
    let trimmed = value.trim_start_matches('[').trim_end_matches(']');
    RE_IPV4_LITERAL.is_match(value) || trimmed.parse::<IpAddr>().is_ok()
}

/// 32 hex characters: almost certainly a hash, never a meaningful name
pub fn looks_like_md5(value: &str) -> bool {
    value.len() == 32 && value.chars().all(|c| c.is_ascii_hexdigit())
}

fn dash_fragments(value: &str) -> Vec<&str> {
    value.split('-').map(str::trim).collect()
}

fn named_host(url: &Url) -> Option<&str> {
    match url.host()? {
        Host::Domain(domain) if !is_ip_literal(domain) => Some(domain),
        _ => None,
    }
}

/// Ordered, deduplicated tokens derived from the host and path of `base_url`
pub fn extract_tokens(base_url: &str) -> Vec<String> {
    let Ok(url) = Url::parse(base_url) else {
        return Vec::new();
    };
    let Some(hostname) = named_host(&url) else {
        return Vec::new();
    };
    if hostname.split('.').count() < 2 {
        return Vec::new();
    }

    let Some(registrable) = psl::domain_str(hostname) else {
        return Vec::new();
    };

    let mut tokens: Vec<String> = vec![registrable.to_string(), hostname.to_string()];

    let bare = match psl::suffix_str(hostname) {
        Some(suffix) => registrable
            .strip_suffix(suffix)
            .map(|s| s.trim_end_matches('.'))
            .unwrap_or(registrable),
        None => registrable,
    };
    if bare.len() > 2 {
        tokens.push(bare.to_string());
    }

    let subdomain = hostname
        .strip_suffix(registrable)
        .map(|s| s.trim_end_matches('.'))
        .unwrap_or("");

    for label in subdomain
        .split('.')
        .filter(|l| !l.is_empty())
        .take(MAX_SUBDOMAIN_LABELS)
    {
        if is_ip_literal(label) || looks_like_md5(label) {
            continue;
        }

        tokens.push(label.to_string());

        let fragments = dash_fragments(label);
        tokens.extend(fragments.iter().filter(|f| !f.is_empty()).map(|f| f.to_string()));

        if fragments.len() > 1 {
            let initials: String = fragments.iter().filter_map(|f| f.chars().next()).collect();
            if !initials.is_empty() {
                tokens.push(initials);
            }
        }
    }

    if let Some(segments) = url.path_segments() {
        for segment in segments {
            if segment.chars().count() > MAX_PATH_SEGMENT_LEN {
                continue;
            }
            if IRRELEVANT_PATH_MARKERS.iter().any(|marker| segment.contains(marker)) {
                continue;
            }
            if segment.len() <= 2 {
                continue;
            }

            tokens.push(segment.to_string());
            tokens.extend(
                dash_fragments(segment)
                    .into_iter()
                    .filter(|f| f.len() > 2)
                    .map(str::to_string),
            );
        }
    }

    let mut seen = HashSet::with_capacity(tokens.len());
    tokens
        .into_iter()
        .filter(|t| !RE_NUMERIC.is_match(t))
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Leading `length` characters of the first label, only for hosts with 3+ labels
pub fn first_label_prefix(base_url: &str, length: usize) -> Option<String> {
    let url = Url::parse(base_url).ok()?;
    let hostname = named_host(&url)?;

    let labels: Vec<&str> = hostname.split('.').collect();
    if labels.len() < 3 || labels[0].is_empty() {
        return None;
    }

    Some(labels[0].chars().take(length).collect())
}
