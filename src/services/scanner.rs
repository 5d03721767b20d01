//! Scan orchestration: normalize the input, run DNS, header and WHOIS lookups
//! concurrently, and reconcile their outcomes into a single [`NewScan`].
//!
//! Status rules, applied in order:
//! 1. `success` by default;
//! 2. `partial` when the domain did not resolve;
//! 3. `error` when it did not resolve *and* the header check failed.
//!
//! WHOIS failures never change the status; they only show up in `whois_data`.

use std::fmt;
use std::net::IpAddr;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::scan::{NewScan, ScanStatus, SecurityHeaders, WhoisData};
use crate::services::headers::SecurityHeaderChecker;
use crate::services::normalizer::DomainNormalizer;
use crate::services::resolver::IpResolver;
use crate::services::whois::WhoisLookup;

pub const UNRESOLVED_MESSAGE: &str = "could not resolve domain IP address";

/// Composes the individual lookups into one scan.
pub struct Scanner {
    normalizer: DomainNormalizer,
    resolver: IpResolver,
    checker: SecurityHeaderChecker,
    whois: WhoisLookup,
}

impl fmt::Debug for Scanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scanner")
            .field("checker", &self.checker)
            .field("whois", &self.whois)
            .finish_non_exhaustive()
    }
}

impl Scanner {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        Ok(Self {
            normalizer: DomainNormalizer::new(),
            resolver: IpResolver::from_system_conf(config.dns_timeout()),
            checker: SecurityHeaderChecker::new(config.http_timeout())?,
            whois: WhoisLookup::new(&config.whois_server, config.whois_timeout())?,
        })
    }

    /// Scan the registrable domain behind `input`.
    ///
    /// Only input that has no registrable domain is rejected; every lookup
    /// failure is reported inside the returned scan.
    pub async fn scan(&self, input: &str) -> Result<NewScan, AppError> {
        let normalized = self.normalizer.normalize(input);
        if !normalized.is_registrable() {
            return Err(AppError::Validation(format!(
                "'{input}' does not contain a registrable domain"
            )));
        }
        let domain = normalized.to_string();

        tracing::info!(input, domain = %domain, "Starting scan");

        let (ip, headers, whois) = tokio::join!(
            self.resolver.resolve(&domain),
            self.checker.check(&domain),
            self.whois.lookup(&domain),
        );

        let scan = assemble(domain, ip, headers, whois);
        tracing::info!(
            domain = %scan.domain,
            status = ?scan.status,
            score = %scan.security_headers.score,
            whois_failed = scan.whois_data.is_failed(),
            "Scan finished"
        );
        Ok(scan)
    }
}

/// Decide the scan status from the resolution outcome and the header check error.
pub fn decide_status(resolved: bool, header_error: Option<&str>) -> (ScanStatus, Option<String>) {
    let mut status = ScanStatus::Success;
    let mut message = None;

    if !resolved {
        status = ScanStatus::Partial;
        message = Some(UNRESOLVED_MESSAGE.to_string());
    }

    if let (false, Some(err)) = (resolved, header_error) {
        status = ScanStatus::Error;
        message = Some(format!("scan failed: {err}"));
    }

    (status, message)
}

/// Build the scan record once all lookups have completed.
pub fn assemble(
    domain: String,
    ip: Option<IpAddr>,
    security_headers: SecurityHeaders,
    whois_data: WhoisData,
) -> NewScan {
    let (status, error_message) = decide_status(ip.is_some(), security_headers.error.as_deref());

    NewScan {
        domain,
        ip_address: ip.map(|ip| ip.to_string()),
        security_headers,
        whois_data,
        status,
        error_message,
    }
}
