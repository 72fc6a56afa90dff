// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 alterguard maintainers

//! Replication guard collaborator.
//!
//! Engaged synchronously when the change tool announces trigger creation,
//! so a FLUSH TABLES WITH READ LOCK elsewhere in the replication topology
//! cannot race the trigger install. Guard failures are logged by the caller
//! but do not kill a change that is already running.

use std::process::Command;

use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum GuardError {
	#[error("could not launch the guardian: {0}")]
	Launch(String),
	#[error("guardian exited with status {0}")]
	Failed(i32),
}

pub trait ReplicationGuard {
	fn engage(&self) -> Result<(), GuardError>;
}

/// Runs the external `ftwrl-guardian` command against the target server.
pub struct CommandGuard {
	pub program: String,
	pub host: String,
	pub port: u16,
}

impl ReplicationGuard for CommandGuard {
	fn engage(&self) -> Result<(), GuardError> {
		info!(host = %self.host, port = self.port, "engaging replication guard");
		let status = Command::new(&self.program)
			.arg("--host")
			.arg(&self.host)
			.arg("--port")
			.arg(self.port.to_string())
			.status()
			.map_err(|e| GuardError::Launch(e.to_string()))?;
		if status.success() {
			Ok(())
		} else {
			Err(GuardError::Failed(status.code().unwrap_or(-1)))
		}
	}
}
