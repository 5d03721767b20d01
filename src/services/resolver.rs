//! Forward DNS resolution of scanned domains.

use std::net::IpAddr;
use std::time::Duration;

use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::system_conf::read_system_conf;
use hickory_resolver::TokioAsyncResolver;

/// Resolves domains to their first A/AAAA address.
pub struct IpResolver {
    resolver: TokioAsyncResolver,
    timeout: Duration,
}

impl IpResolver {
    /// Build a resolver from the host's resolver configuration, falling back
    /// to the library defaults when it cannot be read.
    pub fn from_system_conf(timeout: Duration) -> Self {
        let (config, mut opts) = read_system_conf().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not read system resolver config, using defaults");
            (ResolverConfig::default(), ResolverOpts::default())
        });
        opts.timeout = timeout;
        opts.attempts = 1;

        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
            timeout,
        }
    }

    /// First resolved address for `domain`, or `None` on any failure.
    pub async fn resolve(&self, domain: &str) -> Option<IpAddr> {
        match tokio::time::timeout(self.timeout, self.resolver.lookup_ip(domain)).await {
            Ok(Ok(lookup)) => {
                let ip = lookup.iter().next();
                tracing::debug!(domain, ip = ?ip, "DNS lookup finished");
                ip
            }
            Ok(Err(e)) => {
                tracing::info!(domain, error = %e, "DNS lookup failed");
                None
            }
            Err(_) => {
                tracing::warn!(domain, timeout_secs = self.timeout.as_secs(), "DNS lookup timed out");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ip_literals_resolve_to_themselves() {
        let resolver = IpResolver::from_system_conf(Duration::from_secs(2));
        let ip = resolver.resolve("127.0.0.1").await;
        assert_eq!(ip, Some(IpAddr::from([127, 0, 0, 1])));
    }

    #[tokio::test]
    async fn reserved_invalid_tld_reports_absence() {
        let resolver = IpResolver::from_system_conf(Duration::from_secs(2));
        assert!(resolver.resolve("no-such-host.invalid").await.is_none());
    }
}
