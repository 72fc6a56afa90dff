// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 alterguard maintainers

//! Command-line surface, mirroring the flags operators already know.

use std::path::PathBuf;

use alterguard_core::LoadTier;
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
	Online,
	Direct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TierArg {
	High,
	Medium,
	Low,
}

impl From<TierArg> for LoadTier {
	fn from(tier: TierArg) -> Self {
		match tier {
			TierArg::High => LoadTier::High,
			TierArg::Medium => LoadTier::Medium,
			TierArg::Low => LoadTier::Low,
		}
	}
}

#[derive(Debug, Parser)]
#[command(name = "alterguard", version, about = "Operational wrapper around pt-online-schema-change")]
pub struct Cli {
	/// Complete ALTER statement to execute.
	#[arg(short = 'a', long = "alter", required = true)]
	pub alter: String,

	/// How to run the ALTER: supervised online change or a direct statement.
	#[arg(short = 'o', long = "type", value_enum, default_value = "online")]
	pub mode: Mode,

	/// Host to execute the ALTER on.
	#[arg(short = 'H', long, default_value = "localhost")]
	pub host: String,

	/// MySQL port to connect to.
	#[arg(short = 'P', long, default_value_t = 3306)]
	pub port: u16,

	/// Socket for connecting to the MySQL instance.
	#[arg(short = 'S', long)]
	pub socket: Option<String>,

	/// MySQL user to connect as.
	#[arg(short = 'u', long)]
	pub user: Option<String>,

	/// MySQL password.
	#[arg(long, env = "ALTERGUARD_MYSQL_PASSWORD", hide_env_values = true)]
	pub password: Option<String>,

	/// Disable binary logging for the change.
	#[arg(short = 'n', long = "skip-binlog")]
	pub skip_binlog: bool,

	/// Set BINLOG_FORMAT=ROW, for syncing a table between master and slave.
	#[arg(short = 'b', long = "for-table-sync")]
	pub set_rbr: bool,

	/// Slack channel to post status to. Absent means "do not notify".
	#[arg(short = 'r', long = "slack-room")]
	pub slack_room: Option<String>,

	/// Slack incoming-webhook URL.
	#[arg(long = "webhook-url", env = "ALTERGUARD_WEBHOOK_URL")]
	pub webhook_url: Option<String>,

	/// Server load tier for the pause/abort thresholds.
	#[arg(short = 'l', long = "load", value_enum, default_value = "high")]
	pub load: TierArg,

	/// Print the pt-online-schema-change command without executing it.
	#[arg(short = 'p', long = "print-only")]
	pub print_only: bool,

	/// Skip the foreign-key probe entirely (large information schemas).
	#[arg(short = 'f', long = "do-not-check-fk")]
	pub do_not_check_fk: bool,

	/// Engage the replication guard when the tool creates its triggers.
	#[arg(short = 'g', long = "ftwrl-guard")]
	pub ftwrl_guard: bool,

	/// Comma-separated extra arguments passed through to the tool verbatim.
	#[arg(short = 'e', long = "extra-args", value_delimiter = ',', allow_hyphen_values = true)]
	pub extra_args: Vec<String>,

	/// Directory for the per-table log file.
	#[arg(long = "log-dir", default_value = "/var/log/alterguard")]
	pub log_dir: PathBuf,
}
