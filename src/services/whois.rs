//! WHOIS registration lookup.
//!
//! Registries disagree on field names and on whether a field appears once or
//! many times. Raw responses are parsed into [`RawWhois`], whose fields are
//! [`OneOrMany`] values, and reduced to [`WhoisData`] in one place
//! ([`RawWhois::normalize`]).

use std::time::Duration;

use whois_rust::{WhoIs, WhoIsLookupOptions};

use crate::errors::AppError;
use crate::models::scan::WhoisData;

/// Failure of the upstream WHOIS capability.
#[derive(Debug, thiserror::Error)]
pub enum WhoisError {
    #[error("whois lookup failed: {0}")]
    Lookup(String),

    #[error("whois lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("no whois record: {0}")]
    NoRecord(String),

    #[error("whois worker failed: {0}")]
    Worker(String),
}

/// A field that a registry may report once or repeatedly.
#[derive(Debug, Clone, PartialEq)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Append another occurrence of the field.
    fn push(self, value: T) -> Self {
        match self {
            OneOrMany::One(first) => OneOrMany::Many(vec![first, value]),
            OneOrMany::Many(mut values) => {
                values.push(value);
                OneOrMany::Many(values)
            }
        }
    }

    /// The first occurrence, if any.
    pub fn first(self) -> Option<T> {
        match self {
            OneOrMany::One(value) => Some(value),
            OneOrMany::Many(values) => values.into_iter().next(),
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// Fields extracted from a WHOIS response before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawWhois {
    pub registrar: Option<OneOrMany<String>>,
    pub creation_date: Option<OneOrMany<String>>,
    pub expiration_date: Option<OneOrMany<String>>,
    pub name_servers: Option<OneOrMany<String>>,
    pub status: Option<OneOrMany<String>>,
}

impl RawWhois {
    fn is_empty(&self) -> bool {
        self.registrar.is_none()
            && self.creation_date.is_none()
            && self.expiration_date.is_none()
            && self.name_servers.is_none()
            && self.status.is_none()
    }

    fn slot(&mut self, field: Field) -> &mut Option<OneOrMany<String>> {
        match field {
            Field::Registrar => &mut self.registrar,
            Field::CreationDate => &mut self.creation_date,
            Field::ExpirationDate => &mut self.expiration_date,
            Field::NameServer => &mut self.name_servers,
            Field::Status => &mut self.status,
        }
    }

    /// Reduce every field to the shape stored with a scan.
    ///
    /// Name server entries keep only the host name; registries that append
    /// glue addresses (`ns1.example.net 192.0.2.1`) lose the addresses.
    pub fn normalize(self) -> WhoisData {
        let mut name_servers: Vec<String> = Vec::new();
        for entry in self.name_servers.map(OneOrMany::into_vec).unwrap_or_default() {
            let Some(host) = entry.split_whitespace().next() else {
                continue;
            };
            let ns = host.trim_end_matches('.').to_ascii_lowercase();
            if !name_servers.contains(&ns) {
                name_servers.push(ns);
            }
        }

        WhoisData {
            registrar: first_of(self.registrar),
            creation_date: first_of(self.creation_date),
            expiration_date: first_of(self.expiration_date),
            name_servers,
            status: first_of(self.status),
            raw: None,
        }
    }
}

fn first_of(value: Option<OneOrMany<String>>) -> Option<String> {
    value.and_then(OneOrMany::first)
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Registrar,
    CreationDate,
    ExpirationDate,
    NameServer,
    Status,
}

fn classify(key: &str) -> Option<Field> {
    match key {
        "registrar" | "registrar name" | "sponsoring registrar" => Some(Field::Registrar),
        "creation date" | "created" | "created on" | "registered" | "registered on"
        | "registration time" | "domain registration date" => Some(Field::CreationDate),
        "registry expiry date"
        | "registrar registration expiration date"
        | "expiration date"
        | "expiry date"
        | "expires"
        | "expires on"
        | "paid-till" => Some(Field::ExpirationDate),
        "name server" | "name servers" | "nameserver" | "nameservers" | "nserver" => {
            Some(Field::NameServer)
        }
        "domain status" | "status" | "registration status" => Some(Field::Status),
        _ => None,
    }
}

fn append(slot: &mut Option<OneOrMany<String>>, value: String) {
    *slot = Some(match slot.take() {
        Some(existing) => existing.push(value),
        None => OneOrMany::One(value),
    });
}

/// Split a `Key: value` line. Keys never contain a `.`, which keeps host
/// lines such as `ns1.example.net 2001:db8::53` or bare URLs from being read
/// as keys.
fn split_key(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty() || key.contains('.') {
        return None;
    }
    Some((key, value.trim()))
}

/// Parse a `Key: value` style WHOIS response.
///
/// A key with no value on its line (`Name servers:`) takes the following
/// unkeyed lines as its values, up to the next key or blank line, as Nominet
/// and some ccTLD registries format their output.
///
/// Returns [`WhoisError::NoRecord`] when no known field is present, carrying
/// the first line of the response (registries put "No match for ..." or
/// rate-limit notices there), and when the response is the IANA record of a
/// top-level domain rather than of the domain itself.
pub fn parse_response(text: &str) -> Result<RawWhois, WhoisError> {
    let mut raw = RawWhois::default();
    let mut pending: Option<Field> = None;
    let mut tld_record: Option<String> = None;
    let mut from_iana = false;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            pending = None;
            continue;
        }
        if line.starts_with('%') || line.starts_with('#') || line.starts_with(">>>") {
            continue;
        }

        let Some((key, value)) = split_key(line) else {
            if let Some(field) = pending {
                append(raw.slot(field), line.to_string());
            }
            continue;
        };

        let key = key.to_ascii_lowercase();
        match key.as_str() {
            "source" if value.eq_ignore_ascii_case("iana") => from_iana = true,
            "domain" if !value.is_empty() && !value.contains('.') => {
                tld_record = Some(value.to_ascii_lowercase());
            }
            _ => {}
        }

        let field = classify(&key);
        if value.is_empty() {
            pending = field;
            continue;
        }
        pending = None;
        if let Some(field) = field {
            append(raw.slot(field), value.to_string());
        }
    }

    if from_iana || tld_record.is_some() {
        let tld = tld_record.unwrap_or_else(|| "unknown".to_string());
        return Err(WhoisError::NoRecord(format!(
            "only the IANA record for TLD '{tld}' was returned"
        )));
    }

    if raw.is_empty() {
        let summary = text
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("empty response")
            .to_string();
        return Err(WhoisError::NoRecord(summary));
    }

    Ok(raw)
}

/// WHOIS client following referrals from a root server.
#[derive(Debug, Clone)]
pub struct WhoisLookup {
    client: WhoIs,
    timeout: Duration,
}

impl WhoisLookup {
    pub fn new(server: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = WhoIs::from_host(server)
            .map_err(|e| AppError::Internal(format!("Invalid WHOIS server '{server}': {e}")))?;
        Ok(Self { client, timeout })
    }

    /// Look up `domain`. Failures are folded into [`WhoisData::failed`].
    pub async fn lookup(&self, domain: &str) -> WhoisData {
        match self.query(domain).await {
            Ok(raw) => {
                let data = raw.normalize();
                tracing::info!(domain, registrar = ?data.registrar, "WHOIS lookup finished");
                data
            }
            Err(e) => {
                tracing::warn!(domain, error = %e, "WHOIS lookup failed");
                WhoisData::failed(e.to_string())
            }
        }
    }

    async fn query(&self, domain: &str) -> Result<RawWhois, WhoisError> {
        let client = self.client.clone();
        let target = domain.to_string();
        let timeout = self.timeout;

        // whois-rust performs blocking socket I/O.
        let task = tokio::task::spawn_blocking(move || {
            let mut options = WhoIsLookupOptions::from_string(&target)
                .map_err(|e| WhoisError::Lookup(e.to_string()))?;
            options.timeout = Some(timeout);
            client
                .lookup(options)
                .map_err(|e| WhoisError::Lookup(e.to_string()))
        });

        let text = tokio::time::timeout(timeout, task)
            .await
            .map_err(|_| WhoisError::Timeout(timeout))?
            .map_err(|e| WhoisError::Worker(e.to_string()))??;

        parse_response(&text)
    }
}
