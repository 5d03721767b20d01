//! Registrable-domain extraction using the public suffix list.
//!
//! Accepts bare domains as well as full URLs (`https://www.Example.CO.UK/path?x=1`)
//! and reduces them to `<domain>.<suffix>` (`example.co.uk`).

use std::fmt;
use std::net::IpAddr;

use tldextract::{TldExtractor, TldOption};
use url::Url;

/// Registrable label and public suffix extracted from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDomain {
    pub domain: String,
    pub suffix: String,
}

impl NormalizedDomain {
    /// Whether both a registrable label and a public suffix were found.
    pub fn is_registrable(&self) -> bool {
        !self.domain.is_empty() && !self.suffix.is_empty()
    }
}

impl fmt::Display for NormalizedDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.domain, self.suffix)
    }
}

/// Reduces arbitrary user input to its registrable domain.
pub struct DomainNormalizer {
    extractor: TldExtractor,
}

impl Default for DomainNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainNormalizer {
    /// Build a normalizer backed by the bundled public suffix snapshot.
    pub fn new() -> Self {
        Self {
            extractor: TldExtractor::new(TldOption::default()),
        }
    }

    /// Split `input` into registrable label and public suffix.
    ///
    /// Never fails. Input without a recognizable suffix keeps whatever parts
    /// were found, so it still displays in the `.`-joined form (`"."` for
    /// garbage, `"localhost."` for a bare label, `"8.8.8.8."` for an IP);
    /// callers check [`NormalizedDomain::is_registrable`] before using it.
    pub fn normalize(&self, input: &str) -> NormalizedDomain {
        let host = extract_host(input);

        // IP literals have no registrable domain.
        if host.trim_matches(|c| c == '[' || c == ']').parse::<IpAddr>().is_ok() {
            return NormalizedDomain {
                domain: host,
                suffix: String::new(),
            };
        }

        match self.extractor.extract(&host) {
            Ok(parts) => NormalizedDomain {
                domain: parts.domain.unwrap_or_default(),
                suffix: parts.suffix.unwrap_or_default(),
            },
            Err(e) => {
                tracing::debug!(input, error = ?e, "Suffix extraction failed");
                NormalizedDomain {
                    domain: String::new(),
                    suffix: String::new(),
                }
            }
        }
    }
}

/// Lower-cased host portion of `input`, with scheme, credentials, port,
/// path and query stripped.
fn extract_host(input: &str) -> String {
    let trimmed = input.trim();
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    match Url::parse(&candidate) {
        Ok(url) => match url.host_str() {
            Some(host) => host.trim_end_matches('.').to_ascii_lowercase(),
            None => trimmed.to_ascii_lowercase(),
        },
        Err(_) => trimmed.to_ascii_lowercase(),
    }
}
