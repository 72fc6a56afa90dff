// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 alterguard maintainers

//! Load-tier threshold derivation.
//!
//! pt-online-schema-change throttles on `--max-load` and aborts on
//! `--critical-load`. Both are derived once per run from the server's
//! `max_connections` capacity and a named tier. For the `high` tier the
//! critical threshold is `capacity + 1`: unreachable on purpose, so the
//! change throttles but never aborts.

use std::fmt::{self, Display, Formatter};

/// Named throttling profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadTier {
	High,
	Medium,
	Low,
}

impl Display for LoadTier {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			LoadTier::High => f.write_str("high"),
			LoadTier::Medium => f.write_str("medium"),
			LoadTier::Low => f.write_str("low"),
		}
	}
}

/// Concurrency thresholds handed to the change tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadPolicy {
	pub max_threshold: u32,
	pub critical_threshold: u32,
}

impl LoadPolicy {
	/// Derive thresholds from server capacity and tier.
	pub fn for_tier(capacity: u32, tier: LoadTier) -> Self {
		match tier {
			LoadTier::High => Self {
				max_threshold: fraction(capacity, 0.75),
				critical_threshold: capacity + 1,
			},
			LoadTier::Medium => Self {
				max_threshold: fraction(capacity, 0.50),
				critical_threshold: fraction(capacity, 0.75),
			},
			LoadTier::Low => Self {
				max_threshold: fraction(capacity, 0.25),
				critical_threshold: fraction(capacity, 0.50),
			},
		}
	}
}

// Nearest integer, ties away from zero.
fn fraction(capacity: u32, factor: f64) -> u32 {
	(f64::from(capacity) * factor).round() as u32
}

#[cfg(test)]
mod tests {
	use super::{LoadPolicy, LoadTier};

	#[test]
	fn test_high_tier_thresholds() {
		let policy = LoadPolicy::for_tier(1000, LoadTier::High);
		assert_eq!(policy.max_threshold, 750);
		assert_eq!(policy.critical_threshold, 1001);
	}

	#[test]
	fn test_medium_tier_thresholds() {
		let policy = LoadPolicy::for_tier(1000, LoadTier::Medium);
		assert_eq!(policy.max_threshold, 500);
		assert_eq!(policy.critical_threshold, 750);
	}

	#[test]
	fn test_low_tier_thresholds() {
		let policy = LoadPolicy::for_tier(1000, LoadTier::Low);
		assert_eq!(policy.max_threshold, 250);
		assert_eq!(policy.critical_threshold, 500);
	}

	#[test]
	fn test_rounding_ties_away_from_zero() {
		// 150 * 0.75 = 112.5 rounds to 113, 150 * 0.25 = 37.5 rounds to 38.
		let high = LoadPolicy::for_tier(150, LoadTier::High);
		assert_eq!(high.max_threshold, 113);
		let low = LoadPolicy::for_tier(150, LoadTier::Low);
		assert_eq!(low.max_threshold, 38);
	}

	#[test]
	fn test_high_critical_is_unreachable() {
		for capacity in [1, 10, 151, 4096] {
			let policy = LoadPolicy::for_tier(capacity, LoadTier::High);
			assert_eq!(policy.critical_threshold, capacity + 1);
			assert!(policy.critical_threshold > policy.max_threshold);
		}
	}
}
