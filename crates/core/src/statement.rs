// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 alterguard maintainers

//! ALTER statement parsing.
//!
//! The statement is split on whitespace only far enough to pull out the
//! `schema.table` reference (third token). The clause keeps the original
//! statement bytes verbatim from the fourth token onward, so whitespace
//! inside string literals (ENUM values, DEFAULT strings) survives intact.

use crate::error::{Result, RunError};

/// A parsed ALTER statement. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlterRequest {
	/// Schema name, backticks stripped.
	pub schema: String,
	/// Table name, backticks stripped.
	pub table: String,
	/// The DDL fragment after `ALTER TABLE schema.table`, original bytes.
	pub clause: String,
	/// The statement as supplied by the operator.
	pub raw: String,
}

impl AlterRequest {
	/// Parse a raw `ALTER TABLE schema.table <clause>` statement.
	///
	/// Fails with [`RunError::MalformedStatement`] when fewer than three
	/// whitespace-delimited tokens exist or when the table reference has
	/// no `.` separator.
	pub fn parse(raw: &str) -> Result<Self> {
		let trimmed = raw.trim();
		if trimmed.is_empty() {
			return Err(RunError::MalformedStatement { reason: "statement is empty".into() });
		}

		let mut tokens: Vec<(usize, usize)> = Vec::new();
		let mut clause_start: Option<usize> = None;
		let mut token_start: Option<usize> = None;
		for (idx, ch) in trimmed.char_indices() {
			if ch.is_whitespace() {
				if let Some(start) = token_start.take() {
					tokens.push((start, idx));
				}
			} else if token_start.is_none() {
				if tokens.len() == 3 {
					clause_start = Some(idx);
					break;
				}
				token_start = Some(idx);
			}
		}
		if let Some(start) = token_start {
			tokens.push((start, trimmed.len()));
		}

		if tokens.len() < 3 {
			return Err(RunError::MalformedStatement {
				reason: format!(
					"expected `ALTER TABLE schema.table ...`, got {} token(s)",
					tokens.len()
				),
			});
		}

		let (fqn_start, fqn_end) = tokens[2];
		let fqn = trimmed[fqn_start..fqn_end].replace('`', "");
		let Some((schema, table)) = fqn.split_once('.') else {
			return Err(RunError::MalformedStatement {
				reason: format!("table reference `{fqn}` is not schema-qualified"),
			});
		};
		if schema.is_empty() || table.is_empty() {
			return Err(RunError::MalformedStatement {
				reason: format!("table reference `{fqn}` has an empty schema or table part"),
			});
		}

		let clause = clause_start.map(|idx| &trimmed[idx..]).unwrap_or("");

		Ok(Self {
			schema: schema.to_string(),
			table: table.to_string(),
			clause: clause.to_string(),
			raw: raw.to_string(),
		})
	}
}
