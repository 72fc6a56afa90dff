// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 alterguard maintainers

//! MySQL implementation of the [`SqlRunner`] boundary.

use mysql::{Conn, OptsBuilder, Row, Value, prelude::Queryable};

use crate::{DbError, SqlRunner};

/// Where and how to connect. A schema change can legitimately run for
/// hours, so connections are opened per operation instead of being held.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
	pub host: String,
	pub port: u16,
	pub socket: Option<String>,
	pub user: Option<String>,
	pub password: Option<String>,
}

pub struct MysqlRunner {
	opts: ConnectOptions,
}

impl MysqlRunner {
	pub fn new(opts: ConnectOptions) -> Self {
		Self { opts }
	}

	fn connect(&self) -> Result<Conn, DbError> {
		let builder = OptsBuilder::new()
			.ip_or_hostname(Some(self.opts.host.clone()))
			.tcp_port(self.opts.port)
			.socket(self.opts.socket.clone())
			.user(self.opts.user.clone())
			.pass(self.opts.password.clone());
		Conn::new(builder).map_err(|e| DbError::Connect(e.to_string()))
	}
}

impl SqlRunner for MysqlRunner {
	fn query_row(&mut self, sql: &str) -> Result<Option<Vec<String>>, DbError> {
		let mut conn = self.connect()?;
		let row: Option<Row> =
			conn.query_first(sql).map_err(|e| DbError::Query(e.to_string()))?;
		Ok(row.map(|r| r.unwrap().into_iter().map(value_to_string).collect()))
	}

	fn execute(&mut self, sql: &str) -> Result<(), DbError> {
		let mut conn = self.connect()?;
		conn.query_drop(sql).map_err(|e| DbError::Query(e.to_string()))
	}
}

fn value_to_string(value: Value) -> String {
	match value {
		Value::NULL => String::new(),
		Value::Bytes(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
		Value::Int(i) => i.to_string(),
		Value::UInt(u) => u.to_string(),
		Value::Float(f) => f.to_string(),
		Value::Double(d) => d.to_string(),
		other => format!("{other:?}"),
	}
}
