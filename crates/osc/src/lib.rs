// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 alterguard maintainers

//! Supervision of the online schema change subprocess.
//!
//! The change tool runs for hours against a live table; this crate owns the
//! part with real failure modes: streaming its output, reacting to
//! interruption, and tearing down the shadow triggers and copy table when
//! the tool dies without rolling back.

#![cfg_attr(not(debug_assertions), deny(warnings))]

mod cleanup;
mod direct;
mod guard;
mod supervisor;

pub use cleanup::cleanup_shadow_objects;
pub use direct::run_direct_alter;
pub use guard::{CommandGuard, GuardError, ReplicationGuard};
pub use supervisor::{
	Outcome, SupervisedRun, Supervisor, announces_trigger_creation, dispatch_outcome,
	transient_table_name,
};

use std::{env, path::PathBuf, time::Duration};

use alterguard_core::{Result, RunError};

/// Binary name of the wrapped change tool.
pub const OSC_TOOL: &str = "pt-online-schema-change";

/// Resolve a tool binary from PATH. Checked before any database mutation so
/// a missing percona-toolkit install fails the run cleanly.
pub fn find_tool(name: &str) -> Result<PathBuf> {
	let paths = env::var_os("PATH").ok_or_else(|| RunError::ExternalToolNotFound(name.to_string()))?;
	for dir in env::split_paths(&paths) {
		let candidate = dir.join(name);
		if candidate.is_file() {
			return Ok(candidate);
		}
	}
	Err(RunError::ExternalToolNotFound(name.to_string()))
}

/// Wall-clock duration as `H:MM:SS` for the audit log.
pub fn format_elapsed(elapsed: Duration) -> String {
	let secs = elapsed.as_secs();
	format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use super::{find_tool, format_elapsed};
	use alterguard_core::RunError;

	#[test]
	fn test_format_elapsed() {
		assert_eq!(format_elapsed(Duration::from_secs(0)), "0:00:00");
		assert_eq!(format_elapsed(Duration::from_secs(59)), "0:00:59");
		assert_eq!(format_elapsed(Duration::from_secs(3601)), "1:00:01");
		assert_eq!(format_elapsed(Duration::from_secs(7325)), "2:02:05");
	}

	#[test]
	fn test_find_tool_resolves_from_path() {
		// sh exists on any box these tests run on.
		let path = find_tool("sh").unwrap();
		assert!(path.ends_with("sh"));
	}

	#[test]
	fn test_find_tool_missing_binary() {
		let err = find_tool("definitely-not-installed-tool").unwrap_err();
		assert!(matches!(err, RunError::ExternalToolNotFound(_)));
	}
}
