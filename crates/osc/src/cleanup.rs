// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 alterguard maintainers

//! Best-effort teardown of shadow objects after an unknown failure.
//!
//! The run's outcome is already decided by the time this runs, so nothing
//! here propagates: every failure is logged together with the exact SQL an
//! operator should run by hand. Triggers go first, as one unit; the
//! transient copy table second, separately.

use alterguard_core::CleanupPlan;
use alterguard_db::SqlRunner;
use tracing::{error, info};

pub fn cleanup_shadow_objects(runner: &mut dyn SqlRunner, plan: &CleanupPlan) {
	info!("cleaning up shadow triggers");
	let drops = plan.trigger_drops();
	let mut failed = None;
	for sql in &drops {
		if let Err(e) = runner.execute(sql) {
			failed = Some(e);
			break;
		}
	}
	match failed {
		None => info!("dropped the insert, update and delete shadow triggers"),
		Some(e) => {
			error!(error = %e, "could not drop the shadow triggers");
			info!(
				"execute the following SQL to drop the triggers safely: {}; {}; {};",
				drops[0], drops[1], drops[2]
			);
		}
	}

	match plan.table_drop() {
		None => info!("no transient copy table was announced, nothing further to drop"),
		Some(sql) => {
			info!(table = plan.transient_table.as_deref(), "cleaning up transient copy table");
			match runner.execute(&sql) {
				Ok(()) => info!("dropped the transient copy table"),
				Err(e) => {
					error!(error = %e, "could not drop the transient copy table");
					info!("execute the following SQL to drop the copy table safely: {sql};");
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use alterguard_core::CleanupPlan;
	use alterguard_db::{DbError, SqlRunner};

	use super::cleanup_shadow_objects;

	#[derive(Default)]
	struct RecordingRunner {
		executed: Vec<String>,
		fail_all: bool,
	}

	impl SqlRunner for RecordingRunner {
		fn query_row(&mut self, _sql: &str) -> Result<Option<Vec<String>>, DbError> {
			Ok(None)
		}

		fn execute(&mut self, sql: &str) -> Result<(), DbError> {
			self.executed.push(sql.to_string());
			if self.fail_all {
				return Err(DbError::Query("object does not exist".into()));
			}
			Ok(())
		}
	}

	#[test]
	fn test_cleanup_drop_order() {
		let mut runner = RecordingRunner::default();
		let plan = CleanupPlan::new("shop", "orders", Some("_orders_new"));
		cleanup_shadow_objects(&mut runner, &plan);
		assert_eq!(
			runner.executed,
			vec![
				"DROP TRIGGER IF EXISTS shop.pt_osc_shop_orders_ins",
				"DROP TRIGGER IF EXISTS shop.pt_osc_shop_orders_upd",
				"DROP TRIGGER IF EXISTS shop.pt_osc_shop_orders_del",
				"DROP TABLE IF EXISTS shop._orders_new",
			]
		);
	}

	#[test]
	fn test_cleanup_without_transient_table() {
		let mut runner = RecordingRunner::default();
		let plan = CleanupPlan::new("shop", "orders", None);
		cleanup_shadow_objects(&mut runner, &plan);
		assert_eq!(runner.executed.len(), 3);
		assert!(runner.executed.iter().all(|sql| sql.starts_with("DROP TRIGGER IF EXISTS")));
	}

	#[test]
	fn test_cleanup_never_panics_on_failure() {
		// Already-absent objects or a dead server must not escalate past
		// the cleanup boundary.
		let mut runner = RecordingRunner { fail_all: true, ..RecordingRunner::default() };
		let plan = CleanupPlan::new("shop", "orders", Some("_orders_new"));
		cleanup_shadow_objects(&mut runner, &plan);
		// Trigger batch stops at the first failure, table drop still tried.
		assert_eq!(runner.executed.len(), 2);
	}
}
