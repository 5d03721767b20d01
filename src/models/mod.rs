//! Database models and DTOs.

pub mod pagination;
pub mod scan;
