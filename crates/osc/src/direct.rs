// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 alterguard maintainers

//! Direct-mode ALTER: the statement runs synchronously through the database
//! collaborator, no supervisor, no shadow objects, no cleanup.

use std::time::Instant;

use alterguard_core::{Result, RunError};
use alterguard_db::SqlRunner;
use alterguard_notify::{Icon, Notifier, post_best_effort};
use tracing::{error, info};

use crate::format_elapsed;

pub fn run_direct_alter(
	runner: &mut dyn SqlRunner,
	statement: &str,
	notifier: Option<&dyn Notifier>,
) -> Result<()> {
	let started = Instant::now();
	match runner.execute(statement) {
		Ok(()) => {
			info!(elapsed = %format_elapsed(started.elapsed()), "completed direct alter");
			if let Some(notifier) = notifier {
				post_best_effort(notifier, &format!("{statement} has SUCCEEDED"), Icon::Check);
			}
			Ok(())
		}
		Err(e) => {
			error!(error = %e, "direct alter failed");
			if let Some(notifier) = notifier {
				post_best_effort(notifier, &format!("{statement} has FAILED"), Icon::Cross);
			}
			Err(RunError::DirectAlterFailed(e.to_string()))
		}
	}
}
