// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 alterguard maintainers

//! alterguard: an operational wrapper around pt-online-schema-change.
//!
//! One invocation supervises one ALTER: parse the statement, derive load
//! thresholds from the live server, probe foreign keys, run and watch the
//! change tool, relay status to Slack, and tear down shadow objects when
//! the tool dies without rolling back.

#![cfg_attr(not(debug_assertions), deny(warnings))]

mod args;
mod logging;
mod signal;

use std::process::{Command, exit};

use alterguard_core::{
	AlterRequest, LoadPolicy, LoadTier, OscOptions, Result, RunError, Target, build_command,
	render_shell,
};
use alterguard_db::{
	ConnectOptions, MysqlRunner, detect_foreign_keys, server_capacity, show_create_table,
};
use alterguard_notify::{Notifier, SlackNotifier};
use alterguard_osc::{
	CommandGuard, OSC_TOOL, Outcome, ReplicationGuard, SupervisedRun, Supervisor,
	dispatch_outcome, find_tool, format_elapsed, run_direct_alter,
};
use clap::{CommandFactory, Parser};
use tracing::{error, info, warn};

use crate::args::{Cli, Mode};

fn main() {
	match run() {
		Ok(code) => exit(code),
		Err(RunError::SubprocessInterrupted) => exit(130),
		Err(e) => {
			error!("{e}");
			eprintln!("alterguard: {e}");
			exit(1);
		}
	}
}

fn run() -> Result<i32> {
	if std::env::args().len() == 1 {
		Cli::command().print_help()?;
		println!();
		return Ok(1);
	}
	let cli = Cli::parse();

	let request = AlterRequest::parse(&cli.alter)?;
	let log_path = logging::init(&request.schema, &request.table, &cli.log_dir);
	info!(
		pid = std::process::id(),
		schema = %request.schema,
		table = %request.table,
		"alterguard starting"
	);
	if let Some(path) = log_path {
		info!(path = %path.display(), "run log file");
	}

	let mut runner = MysqlRunner::new(ConnectOptions {
		host: cli.host.clone(),
		port: cli.port,
		socket: cli.socket.clone(),
		user: cli.user.clone(),
		password: cli.password.clone(),
	});

	let notifier = build_notifier(&cli);
	let notifier_ref = notifier.as_ref().map(|n| n as &dyn Notifier);

	match cli.mode {
		Mode::Direct => {
			info!("using a direct ALTER TABLE statement as requested");
			run_direct_alter(&mut runner, &request.raw, notifier_ref)?;
			Ok(0)
		}
		Mode::Online => run_online(&cli, &request, &mut runner, notifier_ref),
	}
}

fn run_online(
	cli: &Cli,
	request: &AlterRequest,
	runner: &mut MysqlRunner,
	notifier: Option<&dyn Notifier>,
) -> Result<i32> {
	// Pre-flight. Any failure here aborts before the tool is spawned, so
	// nothing has mutated and no cleanup is needed.
	let capacity = server_capacity(runner)?;
	let tier: LoadTier = cli.load.into();
	let policy = LoadPolicy::for_tier(capacity, tier);
	info!(
		tier = %tier,
		max = policy.max_threshold,
		critical = policy.critical_threshold,
		"derived load thresholds"
	);

	let has_foreign_keys = if cli.do_not_check_fk {
		false
	} else {
		let count = detect_foreign_keys(runner, &request.schema, &request.table)?;
		if count == 0 {
			info!("no foreign keys found on the table");
		}
		count > 0
	};

	let target = Target { host: cli.host.clone(), port: cli.port };
	let opts = OscOptions {
		skip_binlog: cli.skip_binlog,
		set_rbr: cli.set_rbr,
		print_only: cli.print_only,
		do_not_check_fk: cli.do_not_check_fk,
		extra_args: cli.extra_args.clone(),
	};
	let argv = build_command(request, &policy, has_foreign_keys, &target, &opts);

	if cli.print_only {
		let tool = find_tool(OSC_TOOL)
			.map(|p| p.display().to_string())
			.unwrap_or_else(|_| OSC_TOOL.to_string());
		// Quoted so the printed command can be pasted back into a shell.
		println!("{}", render_shell(&tool, &argv));
		info!("not executing, --print-only was specified");
		return Ok(0);
	}

	let tool = find_tool(OSC_TOOL)?;
	log_snapshot(runner, request, "before");

	let interrupt = signal::install();
	let guard = cli.ftwrl_guard.then(|| CommandGuard {
		program: "ftwrl-guardian".to_string(),
		host: cli.host.clone(),
		port: cli.port,
	});
	let guard_ref = guard.as_ref().map(|g| g as &dyn ReplicationGuard);

	let supervisor = Supervisor::new(notifier, guard_ref, interrupt);
	let mut run = SupervisedRun::new();
	let mut command = Command::new(&tool);
	command.args(&argv);
	info!(tool = %tool.display(), "executing: {}", argv.join(" "));

	let outcome = supervisor.supervise(command, &mut run)?;

	info!(
		elapsed = %format_elapsed(run.started.elapsed()),
		"online schema change for {}.{} finished",
		request.schema,
		request.table
	);
	log_snapshot(runner, request, "after");

	let code = dispatch_outcome(outcome, &run, &request.schema, &request.table, notifier, runner);
	match outcome {
		Outcome::Killed => Err(RunError::SubprocessInterrupted),
		Outcome::Completed(_) => Ok(code),
	}
}

fn log_snapshot(runner: &mut MysqlRunner, request: &AlterRequest, stage: &str) {
	match show_create_table(runner, &request.schema, &request.table) {
		Ok(Some(ddl)) => info!("table DDL {stage} the change:\n{ddl}"),
		Ok(None) => warn!("no DDL snapshot available {stage} the change"),
		Err(e) => warn!(error = %e, "could not snapshot the table DDL {stage} the change"),
	}
}

fn build_notifier(cli: &Cli) -> Option<SlackNotifier> {
	let channel = cli.slack_room.as_ref()?;
	let Some(url) = cli.webhook_url.as_ref() else {
		warn!("a slack room was given but no webhook url is configured, not notifying");
		return None;
	};
	match SlackNotifier::new(url.clone(), channel.clone()) {
		Ok(notifier) => Some(notifier),
		Err(e) => {
			warn!(error = %e, "could not build the slack notifier, not notifying");
			None
		}
	}
}
