//! Scan persistence: insert, lookup by id, and filtered history.

use serde::Deserialize;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::pagination::Pagination;
use crate::models::scan::{NewScan, Scan, ScanHistory};

const SCAN_COLUMNS: &str = "id, domain, ip_address, security_headers, whois_data, \
                            scan_timestamp, status, error_message";

/// Filters for listing scan history.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ScanFilters {
    /// Case-sensitive substring of the scanned domain.
    pub domain: Option<String>,
}

impl ScanFilters {
    fn domain(&self) -> Option<&str> {
        self.domain.as_deref().filter(|d| !d.is_empty())
    }
}

/// Persist a scan. The database assigns `id` and `scan_timestamp`.
pub async fn insert(pool: &PgPool, scan: &NewScan) -> Result<Scan, AppError> {
    let mut tx = pool.begin().await?;

    let sql = format!(
        "INSERT INTO scans (domain, ip_address, security_headers, whois_data, status, error_message) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING {SCAN_COLUMNS}"
    );
    let stored = sqlx::query_as::<_, Scan>(&sql)
        .bind(&scan.domain)
        .bind(&scan.ip_address)
        .bind(Json(&scan.security_headers))
        .bind(Json(&scan.whois_data))
        .bind(scan.status)
        .bind(&scan.error_message)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::debug!(id = stored.id, domain = %stored.domain, "Scan stored");
    Ok(stored)
}

/// Find a scan by id.
pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Scan, AppError> {
    let sql = format!("SELECT {SCAN_COLUMNS} FROM scans WHERE id = $1");
    sqlx::query_as::<_, Scan>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Scan {id} not found")))
}

/// List scans newest first, with the total count matching the filter.
pub async fn history(
    pool: &PgPool,
    filters: &ScanFilters,
    pagination: &Pagination,
) -> Result<ScanHistory, AppError> {
    let where_clause = "WHERE ($1::text IS NULL OR strpos(domain, $1) > 0)";

    let count_sql = format!("SELECT COUNT(*) FROM scans {where_clause}");
    let data_sql = format!(
        "SELECT {SCAN_COLUMNS} FROM scans {where_clause} \
         ORDER BY scan_timestamp DESC, id DESC LIMIT $2 OFFSET $3"
    );

    let total = sqlx::query_scalar::<_, i64>(&count_sql)
        .bind(filters.domain())
        .fetch_one(pool)
        .await?;

    let scans = sqlx::query_as::<_, Scan>(&data_sql)
        .bind(filters.domain())
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(pool)
        .await?;

    Ok(ScanHistory { total, scans })
}
