// verifier.rs - Archive Signature Verification
// Purpose: Decide from content-type and a bounded body prefix whether a response
//          is a genuine archive of the type its URL claims

use std::collections::HashMap;

/// Bytes read from a body before verification; covers the 512-byte tar header
pub const MAX_BODY_PREFIX: usize = 2048;

const TAR_HEADER_LEN: usize = 512;
const TAR_MAGIC_OFFSET: usize = 257;
const TAR_MAGIC_POSIX: &[u8] = b"ustar\0";
const TAR_MAGIC_GNU: &[u8] = b"ustar";

const ZIP_MAGIC: &[u8] = &[0x50, 0x4B, 0x03, 0x04];
const GZIP_MAGIC: &[u8] = &[0x1F, 0x8B];
const MZ_MAGIC: &[u8] = &[0x4D, 0x5A];

/// Built-in extension → magic prefix table
const DEFAULT_SIGNATURES: &[(&str, &[u8])] = &[
    ("zip", ZIP_MAGIC),
    ("xlsx", ZIP_MAGIC),
    ("rar", &[0x52, 0x61, 0x72, 0x21]),
    ("tar", TAR_MAGIC_POSIX),
    ("tar.gz", GZIP_MAGIC),
    ("gz", GZIP_MAGIC),
    ("7z", &[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C]),
    ("bz2", &[0x42, 0x5A, 0x68]),
    ("dll", MZ_MAGIC),
    ("exe", MZ_MAGIC),
    ("xls", &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]),
];

/// Stateless archive predicate backed by an immutable signature table
#[derive(Debug, Clone)]
pub struct ArchiveVerifier {
    signatures: HashMap<String, Vec<u8>>,
    /// Known extensions, longest first, so `tar.gz` wins over `gz`
    extensions: Vec<String>,
}

impl Default for ArchiveVerifier {
    fn default() -> Self {
        Self::new(
            DEFAULT_SIGNATURES
                .iter()
                .map(|(ext, magic)| (ext.to_string(), magic.to_vec())),
        )
    }
}

impl ArchiveVerifier {
    pub fn new(signatures: impl IntoIterator<Item = (String, Vec<u8>)>) -> Self {
        let signatures: HashMap<String, Vec<u8>> = signatures.into_iter().collect();
        let mut extensions: Vec<String> = signatures.keys().cloned().collect();
        extensions.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        Self {
            signatures,
            extensions,
        }
    }

    /// Known extension the URL ends with, if any
    pub fn extension_of<'a>(&'a self, archive_url: &str) -> Option<&'a str> {
        let lower = archive_url.to_lowercase();
        self.extensions
            .iter()
            .find(|ext| {
                lower
                    .strip_suffix(ext.as_str())
                    .is_some_and(|rest| rest.ends_with('.'))
            })
            .map(String::as_str)
    }

    pub fn verify(&self, body: &[u8], archive_url: &str, content_type: &str) -> bool {
        if content_type.to_lowercase().contains("text/html") {
            return false;
        }
        if body.is_empty() {
            return false;
        }

        let lower_chunk = String::from_utf8_lossy(body).to_lowercase();
        if lower_chunk.contains("<html") || lower_chunk.contains("<!doctype") {
            return false;
        }

        let Some(ext) = self.extension_of(archive_url) else {
            return false;
        };

        if ext == "tar" {
            return is_tar_header(body);
        }

        self.signatures
            .get(ext)
            .is_some_and(|magic| body.starts_with(magic))
    }
}

fn is_tar_header(body: &[u8]) -> bool {
    if body.len() < TAR_HEADER_LEN {
        return false;
    }
    let field = &body[TAR_MAGIC_OFFSET..];
    field.starts_with(TAR_MAGIC_POSIX) || field.starts_with(TAR_MAGIC_GNU)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_padding(prefix: &[u8], len: usize) -> Vec<u8> {
        let mut body = prefix.to_vec();
        body.resize(len, 0);
        body
    }

    fn tar_body(len: usize) -> Vec<u8> {
        let mut body = vec![0u8; len];
        if len >= TAR_MAGIC_OFFSET + 6 {
            body[TAR_MAGIC_OFFSET..TAR_MAGIC_OFFSET + 6].copy_from_slice(b"ustar\0");
        }
        body
    }

    #[test]
    fn test_zip_magic_accepted() {
        let verifier = ArchiveVerifier::default();
        let body = with_padding(&[0x50, 0x4B, 0x03, 0x04, 0x14, 0x00], 64);
        assert!(verifier.verify(&body, "https://example.com/backup.zip", "application/zip"));
    }

    #[test]
    fn test_html_content_type_rejected_even_with_magic() {
        let verifier = ArchiveVerifier::default();
        let body = with_padding(&[0x50, 0x4B, 0x03, 0x04], 64);
        assert!(!verifier.verify(&body, "https://example.com/backup.zip", "Text/HTML; charset=utf-8"));
        assert!(!verifier.verify(
            b"<html><body>Not found</body></html>",
            "https://example.com/backup.zip",
            "text/html; charset=utf-8"
        ));
    }

    #[test]
    fn test_html_body_rejected_under_octet_stream() {
        let verifier = ArchiveVerifier::default();
        let mut body = vec![0x1F, 0x8B];
        body.extend_from_slice(b"<!DOCTYPE html><title>oops</title>");
        assert!(!verifier.verify(&body, "https://example.com/site.tar.gz", "application/octet-stream"));
    }

    #[test]
    fn test_empty_body_rejected() {
        let verifier = ArchiveVerifier::default();
        assert!(!verifier.verify(&[], "https://example.com/backup.zip", "application/zip"));
    }

    #[test]
    fn test_magic_table_truth() {
        let verifier = ArchiveVerifier::default();
        for (ext, magic) in DEFAULT_SIGNATURES.iter().filter(|(ext, _)| *ext != "tar") {
            let url = format!("https://example.com/backup.{}", ext);
            let good = with_padding(magic, 128);
            assert!(verifier.verify(&good, &url, "application/octet-stream"), "{}", ext);

            let mut bad = good.clone();
            bad[0] ^= 0xFF;
            assert!(!verifier.verify(&bad, &url, "application/octet-stream"), "{}", ext);
        }
    }

    #[test]
    fn test_tar_requires_full_header() {
        let verifier = ArchiveVerifier::default();
        let url = "https://example.com/backup.tar";
        assert!(verifier.verify(&tar_body(512), url, "application/x-tar"));
        assert!(!verifier.verify(&tar_body(300), url, "application/x-tar"));

        // zip bytes never satisfy a short tar body
        let zip = with_padding(&[0x50, 0x4B, 0x03, 0x04], 200);
        assert!(!verifier.verify(&zip, url, "application/octet-stream"));

        let mut gnu = vec![0u8; 512];
        gnu[TAR_MAGIC_OFFSET..TAR_MAGIC_OFFSET + 8].copy_from_slice(b"ustar  \0");
        assert!(verifier.verify(&gnu, url, "application/x-tar"));
    }

    #[test]
    fn test_extension_detection() {
        let verifier = ArchiveVerifier::default();
        assert_eq!(verifier.extension_of("https://a.com/x.tar.gz"), Some("tar.gz"));
        assert_eq!(verifier.extension_of("https://a.com/x.gz"), Some("gz"));
        assert_eq!(verifier.extension_of("https://a.com/x.tar"), Some("tar"));
        assert_eq!(verifier.extension_of("https://a.com/x.xlsx"), Some("xlsx"));
        assert_eq!(verifier.extension_of("https://a.com/x.sql"), None);
        assert_eq!(verifier.extension_of("https://a.com/zip"), None);
    }

    #[test]
    fn test_unknown_extension_never_verifies() {
        let verifier = ArchiveVerifier::default();
        let body = with_padding(&[0x50, 0x4B, 0x03, 0x04], 64);
        assert!(!verifier.verify(&body, "https://example.com/backup.sql", "application/octet-stream"));
    }
}
