// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 alterguard maintainers

//! One log file per altered table, named after the target, so concurrent
//! runs against different tables never interleave their streams.

use std::{
	fs::OpenOptions,
	io,
	path::{Path, PathBuf},
	sync::Arc,
};

use tracing_subscriber::EnvFilter;

fn log_file_path(schema: &str, table: &str, dir: &Path) -> PathBuf {
	dir.join(format!("alterguard_{schema}_{table}.log"))
}

/// Initialize the subscriber and return the resolved log path, `None` when
/// the directory is not writable and output fell back to stderr rather than
/// refusing to run the change.
pub fn init(schema: &str, table: &str, dir: &Path) -> Option<PathBuf> {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	let path = log_file_path(schema, table, dir);
	match OpenOptions::new().create(true).append(true).open(&path) {
		Ok(file) => {
			tracing_subscriber::fmt()
				.with_env_filter(filter)
				.with_ansi(false)
				.with_writer(Arc::new(file))
				.init();
			Some(path)
		}
		Err(e) => {
			tracing_subscriber::fmt()
				.with_env_filter(filter)
				.with_ansi(false)
				.with_writer(io::stderr)
				.init();
			tracing::warn!(
				error = %e,
				path = %path.display(),
				"could not open the log file, logging to stderr"
			);
			None
		}
	}
}

#[cfg(test)]
mod tests {
	use std::path::Path;

	use super::log_file_path;

	#[test]
	fn test_log_file_is_named_after_the_target_table() {
		let path = log_file_path("shop", "orders", Path::new("/var/log/alterguard"));
		assert_eq!(path, Path::new("/var/log/alterguard/alterguard_shop_orders.log"));
	}
}
