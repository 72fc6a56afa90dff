// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 alterguard maintainers

//! Pre-flight server queries.
//!
//! Both probes are fatal on failure: proceeding with a guessed threshold or
//! a guessed dependency state against a production server is worse than not
//! running at all.

use alterguard_core::{Result, RunError};
use tracing::debug;

use crate::SqlRunner;

/// Server-reported `max_connections`.
pub fn server_capacity(runner: &mut dyn SqlRunner) -> Result<u32> {
	let row = runner
		.query_row("SHOW GLOBAL VARIABLES LIKE 'max_connections'")
		.map_err(|e| RunError::LoadQueryFailed(e.to_string()))?
		.ok_or_else(|| RunError::LoadQueryFailed("server returned no max_connections row".into()))?;

	// Row shape is [Variable_name, Value].
	let raw = row
		.get(1)
		.ok_or_else(|| RunError::LoadQueryFailed("max_connections row has no value column".into()))?;
	let capacity = raw
		.parse::<u32>()
		.map_err(|_| RunError::LoadQueryFailed(format!("max_connections value `{raw}` is not a number")))?;
	debug!(capacity, "server connection capacity");
	Ok(capacity)
}

/// Count foreign keys referencing or referenced by the target table.
pub fn detect_foreign_keys(runner: &mut dyn SqlRunner, schema: &str, table: &str) -> Result<u64> {
	let sql = format!(
		"SELECT COUNT(*) FROM INFORMATION_SCHEMA.KEY_COLUMN_USAGE \
		 WHERE REFERENCED_TABLE_NAME IS NOT NULL \
		 AND ((TABLE_NAME='{table}' AND TABLE_SCHEMA='{schema}') \
		 OR (REFERENCED_TABLE_NAME='{table}' AND REFERENCED_TABLE_SCHEMA='{schema}'))"
	);
	let row = runner
		.query_row(&sql)
		.map_err(|e| RunError::MetadataQueryFailed(e.to_string()))?
		.ok_or_else(|| RunError::MetadataQueryFailed("foreign key count query returned no rows".into()))?;
	let raw = row
		.first()
		.ok_or_else(|| RunError::MetadataQueryFailed("foreign key count row is empty".into()))?;
	raw.parse::<u64>()
		.map_err(|_| RunError::MetadataQueryFailed(format!("foreign key count `{raw}` is not a number")))
}

/// `SHOW CREATE TABLE` snapshot for before/after audit logging. Best-effort;
/// the caller logs a warning on failure instead of aborting.
pub fn show_create_table(
	runner: &mut dyn SqlRunner,
	schema: &str,
	table: &str,
) -> std::result::Result<Option<String>, crate::DbError> {
	let row = runner.query_row(&format!("SHOW CREATE TABLE {schema}.{table}"))?;
	// Row shape is [Table, Create Table].
	Ok(row.and_then(|r| r.get(1).cloned()))
}
