//! Reconnaissance lookups, scan orchestration, and scan persistence.

pub mod headers;
pub mod normalizer;
pub mod resolver;
pub mod scan;
pub mod scanner;
pub mod whois;
