// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 alterguard maintainers

//! Shadow-object naming for post-failure cleanup.
//!
//! pt-online-schema-change installs three triggers named
//! `pt_osc_<db>_<tbl>_{ins,del,upd}` plus a transient copy table. The plan is
//! computed lazily, only when cleanup is actually invoked. Triggers must go
//! before the copy table: a trigger firing against a dropped table fails
//! live DML on the original.

/// Names and drop statements for one run's shadow objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupPlan {
	pub schema: String,
	pub insert_trigger: String,
	pub update_trigger: String,
	pub delete_trigger: String,
	/// Unset when the tool failed before announcing its copy table.
	pub transient_table: Option<String>,
}

impl CleanupPlan {
	pub fn new(schema: &str, table: &str, transient_table: Option<&str>) -> Self {
		Self {
			schema: schema.to_string(),
			insert_trigger: format!("pt_osc_{schema}_{table}_ins"),
			update_trigger: format!("pt_osc_{schema}_{table}_upd"),
			delete_trigger: format!("pt_osc_{schema}_{table}_del"),
			transient_table: transient_table.map(str::to_string),
		}
	}

	/// Trigger drops in execution order: ins, upd, del.
	pub fn trigger_drops(&self) -> [String; 3] {
		[
			format!("DROP TRIGGER IF EXISTS {}.{}", self.schema, self.insert_trigger),
			format!("DROP TRIGGER IF EXISTS {}.{}", self.schema, self.update_trigger),
			format!("DROP TRIGGER IF EXISTS {}.{}", self.schema, self.delete_trigger),
		]
	}

	/// Drop for the transient copy table, when one was announced.
	pub fn table_drop(&self) -> Option<String> {
		self.transient_table
			.as_deref()
			.map(|tbl| format!("DROP TABLE IF EXISTS {}.{}", self.schema, tbl))
	}
}

#[cfg(test)]
mod tests {
	use super::CleanupPlan;

	#[test]
	fn test_trigger_names_and_order() {
		let plan = CleanupPlan::new("shop", "orders", Some("_orders_new"));
		assert_eq!(
			plan.trigger_drops(),
			[
				"DROP TRIGGER IF EXISTS shop.pt_osc_shop_orders_ins",
				"DROP TRIGGER IF EXISTS shop.pt_osc_shop_orders_upd",
				"DROP TRIGGER IF EXISTS shop.pt_osc_shop_orders_del",
			]
		);
	}

	#[test]
	fn test_table_drop_uses_transient_name() {
		let plan = CleanupPlan::new("shop", "orders", Some("_orders_new"));
		assert_eq!(plan.table_drop().unwrap(), "DROP TABLE IF EXISTS shop._orders_new");
	}

	#[test]
	fn test_absent_transient_table_drops_nothing() {
		let plan = CleanupPlan::new("shop", "orders", None);
		assert_eq!(plan.table_drop(), None);
	}
}
