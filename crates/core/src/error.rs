// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 alterguard maintainers

//! Run-fatal error taxonomy.
//!
//! Everything here aborts the run. Cleanup and notification failures are
//! deliberately absent: both are best-effort and terminate at their own
//! boundary (logged, never propagated).

/// Result type for run-fatal operations.
pub type Result<T> = std::result::Result<T, RunError>;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
	/// The ALTER statement could not be split into schema, table and clause.
	#[error("malformed alter statement: {reason}")]
	MalformedStatement { reason: String },

	/// The server capacity query failed or returned no rows. The run must
	/// not proceed with a guessed threshold.
	#[error("failed to determine server connection capacity: {0}")]
	LoadQueryFailed(String),

	/// The foreign-key metadata query failed. A failed probe never means
	/// "no dependency".
	#[error("failed to query foreign key metadata: {0}")]
	MetadataQueryFailed(String),

	/// The wrapped change tool is not installed. Reported before any
	/// database mutation.
	#[error("{0} not found on PATH, install the percona-toolkit package")]
	ExternalToolNotFound(String),

	/// Operator-requested cancellation while the tool was running. Fatal
	/// and non-retryable.
	#[error("schema change interrupted by operator")]
	SubprocessInterrupted,

	/// Direct-mode ALTER execution failed.
	#[error("direct alter failed: {0}")]
	DirectAlterFailed(String),

	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
}
