// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 alterguard maintainers

//! Database collaborator boundary.
//!
//! Everything the wrapper asks of MySQL goes through [`SqlRunner`]: the
//! capacity query, the foreign-key probe, DDL snapshots, direct ALTERs and
//! the cleanup drops. The production implementation opens one short-lived
//! connection per operation; tests substitute a recording mock.

#![cfg_attr(not(debug_assertions), deny(warnings))]

mod mysql_runner;
mod probe;

pub use mysql_runner::{ConnectOptions, MysqlRunner};
pub use probe::{detect_foreign_keys, server_capacity, show_create_table};

/// Error at the database boundary. Callers decide whether it is fatal.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("connection failed: {0}")]
	Connect(String),
	#[error("query failed: {0}")]
	Query(String),
}

/// The live database handle the wrapper collaborates with.
///
/// One logical operation per call; implementations are free to open and
/// close a connection each time.
pub trait SqlRunner {
	/// Run a query and return the first row as text columns, if any.
	fn query_row(&mut self, sql: &str) -> Result<Option<Vec<String>>, DbError>;

	/// Run a statement for effect only.
	fn execute(&mut self, sql: &str) -> Result<(), DbError>;
}
