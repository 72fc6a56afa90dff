// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 alterguard maintainers

//! pt-online-schema-change argument assembly.
//!
//! Pure and deterministic: identical inputs produce an identical argument
//! vector. `extra_args` entries are appended verbatim, in order, with no
//! validation; they are the operator's escape hatch to the underlying tool.

use crate::{AlterRequest, LoadPolicy};

/// The server the change runs against, as passed to the tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
	pub host: String,
	pub port: u16,
}

/// Operator-supplied build flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OscOptions {
	/// Append `--set-vars=SQL_LOG_BIN=OFF`. Wins over `set_rbr`.
	pub skip_binlog: bool,
	/// Append `--set-vars=BINLOG_FORMAT=ROW` for master-slave table sync.
	pub set_rbr: bool,
	/// Build (including live queries) but only print the command.
	pub print_only: bool,
	/// Skip the foreign-key probe entirely.
	pub do_not_check_fk: bool,
	/// Raw pass-through arguments for the tool.
	pub extra_args: Vec<String>,
}

/// Assemble the ordered argument vector for the change tool, without the
/// binary path itself.
pub fn build_command(
	req: &AlterRequest,
	policy: &LoadPolicy,
	has_foreign_keys: bool,
	target: &Target,
	opts: &OscOptions,
) -> Vec<String> {
	let mut cmd = vec![
		format!("--alter={}", req.clause),
		format!("--database={}", req.schema),
		format!("t={}", req.table),
		format!("--host={}", target.host),
		format!("--port={}", target.port),
		format!("--max-load=Threads_running={}", policy.max_threshold),
		format!("--critical-load=Threads_running={}", policy.critical_threshold),
		"--no-check-replication-filters".to_string(),
		"--execute".to_string(),
	];

	if has_foreign_keys && !opts.do_not_check_fk {
		cmd.push("--alter-foreign-keys-method=auto".to_string());
	}

	cmd.extend(opts.extra_args.iter().cloned());

	if opts.skip_binlog {
		cmd.push("--set-vars=SQL_LOG_BIN=OFF".to_string());
	} else if opts.set_rbr {
		cmd.push("--set-vars=BINLOG_FORMAT=ROW".to_string());
	}

	cmd
}

/// Render a tool invocation as one shell-safe line. The `--alter` value (and
/// any extra argument) can contain whitespace, quotes and parentheses; the
/// printed form must survive word-splitting so an operator can paste it back
/// into a shell unchanged.
pub fn render_shell(tool: &str, argv: &[String]) -> String {
	let mut line = String::from(tool);
	for arg in argv {
		line.push(' ');
		line.push_str(&shell_quote(arg));
	}
	line
}

fn shell_quote(arg: &str) -> String {
	let plain = !arg.is_empty()
		&& arg
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '=' | '.' | '/' | ':' | ','));
	if plain { arg.to_string() } else { format!("'{}'", arg.replace('\'', r"'\''")) }
}

#[cfg(test)]
mod tests {
	use super::{OscOptions, Target, build_command, render_shell};
	use crate::{AlterRequest, LoadPolicy, LoadTier};

	fn request() -> AlterRequest {
		AlterRequest::parse("ALTER TABLE shop.orders ADD COLUMN note VARCHAR(32)").unwrap()
	}

	fn target() -> Target {
		Target { host: "db1.example.net".to_string(), port: 3306 }
	}

	#[test]
	fn test_base_command_order() {
		let policy = LoadPolicy::for_tier(100, LoadTier::Medium);
		let cmd = build_command(&request(), &policy, false, &target(), &OscOptions::default());
		assert_eq!(
			cmd,
			vec![
				"--alter=ADD COLUMN note VARCHAR(32)",
				"--database=shop",
				"t=orders",
				"--host=db1.example.net",
				"--port=3306",
				"--max-load=Threads_running=50",
				"--critical-load=Threads_running=75",
				"--no-check-replication-filters",
				"--execute",
			]
		);
	}

	#[test]
	fn test_build_is_idempotent() {
		let policy = LoadPolicy::for_tier(512, LoadTier::High);
		let opts = OscOptions {
			extra_args: vec!["--chunk-size=500".to_string()],
			set_rbr: true,
			..OscOptions::default()
		};
		let first = build_command(&request(), &policy, true, &target(), &opts);
		let second = build_command(&request(), &policy, true, &target(), &opts);
		assert_eq!(first, second);
	}

	#[test]
	fn test_foreign_key_flag_requires_detection_and_enabled_check() {
		let policy = LoadPolicy::for_tier(100, LoadTier::High);
		let fk_flag = "--alter-foreign-keys-method=auto";

		let detected = build_command(&request(), &policy, true, &target(), &OscOptions::default());
		assert!(detected.iter().any(|a| a == fk_flag));

		let none = build_command(&request(), &policy, false, &target(), &OscOptions::default());
		assert!(!none.iter().any(|a| a == fk_flag));

		let suppressed = OscOptions { do_not_check_fk: true, ..OscOptions::default() };
		let skipped = build_command(&request(), &policy, true, &target(), &suppressed);
		assert!(!skipped.iter().any(|a| a == fk_flag));
	}

	#[test]
	fn test_extra_args_appended_verbatim_in_order() {
		let policy = LoadPolicy::for_tier(100, LoadTier::High);
		let opts = OscOptions {
			extra_args: vec!["--chunk-size=500".to_string(), "--sleep=0.5".to_string()],
			..OscOptions::default()
		};
		let cmd = build_command(&request(), &policy, false, &target(), &opts);
		let pos_chunk = cmd.iter().position(|a| a == "--chunk-size=500").unwrap();
		let pos_sleep = cmd.iter().position(|a| a == "--sleep=0.5").unwrap();
		assert!(pos_chunk < pos_sleep);
		assert!(pos_chunk > cmd.iter().position(|a| a == "--execute").unwrap());
	}

	#[test]
	fn test_skip_binlog_wins_over_rbr() {
		let policy = LoadPolicy::for_tier(100, LoadTier::High);
		let opts = OscOptions { skip_binlog: true, set_rbr: true, ..OscOptions::default() };
		let cmd = build_command(&request(), &policy, false, &target(), &opts);
		assert!(cmd.iter().any(|a| a == "--set-vars=SQL_LOG_BIN=OFF"));
		assert!(!cmd.iter().any(|a| a == "--set-vars=BINLOG_FORMAT=ROW"));
	}

	#[test]
	fn test_render_shell_quotes_the_clause() {
		let policy = LoadPolicy::for_tier(100, LoadTier::Medium);
		let cmd = build_command(&request(), &policy, false, &target(), &OscOptions::default());
		let line = render_shell("pt-online-schema-change", &cmd);
		assert!(line.contains("'--alter=ADD COLUMN note VARCHAR(32)'"));
		// Whitespace-free arguments stay unquoted.
		assert!(line.contains(" --database=shop "));
		assert!(line.contains(" --max-load=Threads_running=50 "));
		assert!(line.starts_with("pt-online-schema-change "));
	}

	#[test]
	fn test_render_shell_escapes_embedded_quotes() {
		let argv = vec!["--alter=ADD note VARCHAR(8) DEFAULT 'n/a'".to_string()];
		let line = render_shell("tool", &argv);
		assert_eq!(line, r"tool '--alter=ADD note VARCHAR(8) DEFAULT '\''n/a'\'''");
	}

	#[test]
	fn test_at_most_one_set_vars() {
		let policy = LoadPolicy::for_tier(100, LoadTier::High);
		let opts = OscOptions { set_rbr: true, ..OscOptions::default() };
		let cmd = build_command(&request(), &policy, false, &target(), &opts);
		let count = cmd.iter().filter(|a| a.starts_with("--set-vars=")).count();
		assert_eq!(count, 1);
		assert_eq!(cmd.last().unwrap(), "--set-vars=BINLOG_FORMAT=ROW");
	}
}
