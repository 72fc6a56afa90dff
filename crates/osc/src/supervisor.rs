// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 alterguard maintainers

//! Process supervision state machine.
//!
//! `NotStarted → Running → {Completed(code), Killed}`. The tool's stdout and
//! stderr are merged into one line channel by two reader threads; the
//! supervisor loop suspends on a bounded `recv_timeout` so the operator
//! interrupt flag and the kill path stay responsive even when the tool is
//! silent for minutes between chunk copies.

use std::{
	io::{BufRead, BufReader, Read},
	process::{Command, Stdio},
	sync::atomic::{AtomicBool, Ordering},
	thread,
	time::{Duration, Instant},
};

use alterguard_core::{CleanupPlan, Result};
use alterguard_db::SqlRunner;
use alterguard_notify::{Icon, Notifier, post_best_effort};
use crossbeam_channel::{RecvTimeoutError, Sender, unbounded};
use tracing::{error, info, warn};

use crate::{cleanup::cleanup_shadow_objects, guard::ReplicationGuard};

/// Soft heartbeat: progress is relayed when this much time has passed since
/// the last notification. Not a deadline; a change can run for hours.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(3600);

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Terminal state of one supervised run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
	Completed(i32),
	/// Operator-requested cancellation; fatal and non-retryable.
	Killed,
}

/// Mutable state owned by the supervisor for the duration of one run.
#[derive(Debug)]
pub struct SupervisedRun {
	pub started: Instant,
	pub last_notify: Instant,
	/// Set at most once, from the tool's "Created ..." announcement. Stays
	/// unset when the tool dies before reaching the copy-table stage.
	pub transient_table: Option<String>,
	pub exit_code: Option<i32>,
}

impl SupervisedRun {
	pub fn new() -> Self {
		let now = Instant::now();
		Self { started: now, last_notify: now, transient_table: None, exit_code: None }
	}
}

impl Default for SupervisedRun {
	fn default() -> Self {
		Self::new()
	}
}

pub struct Supervisor<'a> {
	pub notifier: Option<&'a dyn Notifier>,
	pub guard: Option<&'a dyn ReplicationGuard>,
	pub interrupt: &'a AtomicBool,
	pub heartbeat: Duration,
}

impl<'a> Supervisor<'a> {
	pub fn new(
		notifier: Option<&'a dyn Notifier>,
		guard: Option<&'a dyn ReplicationGuard>,
		interrupt: &'a AtomicBool,
	) -> Self {
		Self { notifier, guard, interrupt, heartbeat: HEARTBEAT_INTERVAL }
	}

	/// Spawn the change tool and consume its merged output stream until it
	/// exits or the operator interrupts.
	pub fn supervise(&self, mut command: Command, run: &mut SupervisedRun) -> Result<Outcome> {
		command.stdout(Stdio::piped()).stderr(Stdio::piped());
		let mut child = command.spawn()?;
		info!(pid = child.id(), "change tool spawned");

		let (tx, rx) = unbounded::<String>();
		if let Some(stdout) = child.stdout.take() {
			spawn_reader(stdout, tx.clone());
		}
		if let Some(stderr) = child.stderr.take() {
			spawn_reader(stderr, tx.clone());
		}
		drop(tx);

		loop {
			if self.interrupt.load(Ordering::SeqCst) {
				warn!("operator interrupt received, killing the change tool");
				let _ = child.kill();
				let _ = child.wait();
				return Ok(Outcome::Killed);
			}
			match rx.recv_timeout(POLL_INTERVAL) {
				Ok(line) => self.observe_line(&line, run),
				Err(RecvTimeoutError::Timeout) => continue,
				// Both streams closed: the tool is done.
				Err(RecvTimeoutError::Disconnected) => break,
			}
		}

		let status = child.wait()?;
		let code = status.code().unwrap_or(-1);
		run.exit_code = Some(code);
		Ok(Outcome::Completed(code))
	}

	fn observe_line(&self, line: &str, run: &mut SupervisedRun) {
		if run.transient_table.is_none() {
			if let Some(name) = transient_table_name(line) {
				info!(table = %name, "transient copy table announced");
				run.transient_table = Some(name);
			}
		}

		if run.last_notify.elapsed() > self.heartbeat {
			if let Some(notifier) = self.notifier {
				post_best_effort(notifier, line, Icon::Pencil);
			}
			run.last_notify = Instant::now();
		}

		if let Some(guard) = self.guard {
			if announces_trigger_creation(line) {
				// Synchronous on purpose: the tool must not proceed past
				// trigger creation while the guard is still engaging.
				if let Err(e) = guard.engage() {
					error!(error = %e, "replication guard failed");
				}
			}
		}

		info!("{line}");
	}
}

fn spawn_reader<R: Read + Send + 'static>(stream: R, tx: Sender<String>) {
	thread::spawn(move || {
		let reader = BufReader::new(stream);
		for line in reader.lines() {
			match line {
				Ok(line) => {
					if tx.send(line).is_err() {
						break;
					}
				}
				Err(_) => break,
			}
		}
	});
}

/// Capture the transient copy table from the tool's announcement, e.g.
/// `Created new table shop._orders_new OK.` → `_orders_new`. The name is
/// the fourth token's portion after the first `.`.
pub fn transient_table_name(line: &str) -> Option<String> {
	let mut tokens = line.split_whitespace();
	if !tokens.next()?.eq_ignore_ascii_case("created") {
		return None;
	}
	let fourth = tokens.nth(2)?;
	let (_, name) = fourth.split_once('.')?;
	if name.is_empty() {
		return None;
	}
	Some(name.to_string())
}

/// The tool is about to install the shadow triggers, e.g.
/// `2024-03-01T00:00:00 Creating triggers...`.
pub fn announces_trigger_creation(line: &str) -> bool {
	let mut tokens = line.split_whitespace();
	let _ = tokens.next();
	matches!(
		(tokens.next(), tokens.next()),
		(Some(second), Some(third))
			if second.eq_ignore_ascii_case("creating") && third.eq_ignore_ascii_case("triggers...")
	)
}

/// Post-terminal dispatch. Exit 0 is success; 255 is the tool's "already
/// rolled back cleanly" failure and needs no cleanup; anything else is an
/// unknown failure whose shadow objects must be torn down, notification
/// channel or not. A kill gets cleanup too: orphaned triggers after a manual
/// cancel rewrite production DML exactly like the unknown-failure case.
///
/// Returns the wrapper's exit code.
pub fn dispatch_outcome(
	outcome: Outcome,
	run: &SupervisedRun,
	schema: &str,
	table: &str,
	notifier: Option<&dyn Notifier>,
	runner: &mut dyn SqlRunner,
) -> i32 {
	match outcome {
		Outcome::Completed(0) => {
			info!("online schema change for {schema}.{table} succeeded");
			if let Some(notifier) = notifier {
				post_best_effort(
					notifier,
					&format!("Online schema change for table {schema}.{table} has SUCCEEDED"),
					Icon::Check,
				);
			}
			0
		}
		Outcome::Completed(255) => {
			error!("online schema change for {schema}.{table} failed, tool rolled back");
			if let Some(notifier) = notifier {
				post_best_effort(
					notifier,
					&format!("Online schema change for table {schema}.{table} has FAILED"),
					Icon::Cross,
				);
			}
			255
		}
		Outcome::Completed(code) => {
			error!(code, "online schema change for {schema}.{table} hit an unknown error");
			if let Some(notifier) = notifier {
				post_best_effort(
					notifier,
					&format!(
						"Online schema change for table {schema}.{table} has an UNKNOWN ERROR"
					),
					Icon::Interrobang,
				);
			}
			let plan = CleanupPlan::new(schema, table, run.transient_table.as_deref());
			cleanup_shadow_objects(runner, &plan);
			// A signal-killed tool reports no code; exiting with -1 would
			// wrap to 255 and read as "rolled back cleanly".
			if code < 0 { 1 } else { code }
		}
		Outcome::Killed => {
			error!("online schema change for {schema}.{table} was killed by the operator");
			let plan = CleanupPlan::new(schema, table, run.transient_table.as_deref());
			cleanup_shadow_objects(runner, &plan);
			130
		}
	}
}

#[cfg(test)]
mod tests {
	use super::{announces_trigger_creation, transient_table_name};

	#[test]
	fn test_transient_table_capture() {
		let line = "Created new table shop._orders_new OK.";
		assert_eq!(transient_table_name(line).unwrap(), "_orders_new");
	}

	#[test]
	fn test_transient_table_capture_is_case_insensitive() {
		let line = "created new table shop._orders_new OK.";
		assert_eq!(transient_table_name(line).unwrap(), "_orders_new");
	}

	#[test]
	fn test_transient_table_ignores_other_lines() {
		assert_eq!(transient_table_name("Copying approximately 1000 rows..."), None);
		assert_eq!(transient_table_name("Created"), None);
		assert_eq!(transient_table_name(""), None);
	}

	#[test]
	fn test_transient_table_requires_qualified_name() {
		assert_eq!(transient_table_name("Created new table _orders_new OK."), None);
	}

	#[test]
	fn test_trigger_creation_announcement() {
		assert!(announces_trigger_creation("2024-03-01T00:00:01 Creating triggers..."));
		assert!(!announces_trigger_creation("2024-03-01T00:00:01 Created triggers OK."));
		assert!(!announces_trigger_creation("Creating triggers..."));
	}
}
