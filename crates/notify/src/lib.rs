// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 alterguard maintainers

//! Status notification channel.
//!
//! One outbound call per terminal or heartbeat event, carrying
//! `{channel, username, text, icon_emoji}` to a Slack incoming webhook.
//! Posting is fire-and-forget: a failed post is logged by the caller and
//! never aborts a run that is hours into copying a table.

#![cfg_attr(not(debug_assertions), deny(warnings))]

use std::time::Duration;

use serde::Serialize;
use tracing::warn;

/// Icon tag attached to a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
	/// Periodic progress heartbeat.
	Pencil,
	/// Terminal success.
	Check,
	/// Terminal failure the tool already rolled back.
	Cross,
	/// Unknown failure requiring cleanup.
	Interrobang,
}

impl Icon {
	pub fn emoji(&self) -> &'static str {
		match self {
			Icon::Pencil => ":pencil2:",
			Icon::Check => ":heavy_check_mark:",
			Icon::Cross => ":heavy_multiplication_x:",
			Icon::Interrobang => ":interrobang:",
		}
	}
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
	#[error("webhook post failed: {0}")]
	Post(String),
	#[error("webhook returned status {0}")]
	Status(u16),
}

/// The outbound notification sink.
pub trait Notifier {
	fn notify(&self, text: &str, icon: Icon) -> Result<(), NotifyError>;
}

/// Slack incoming-webhook notifier.
pub struct SlackNotifier {
	client: reqwest::blocking::Client,
	webhook_url: String,
	channel: String,
	username: String,
}

#[derive(Serialize)]
struct Payload<'a> {
	channel: &'a str,
	username: &'a str,
	text: &'a str,
	icon_emoji: &'a str,
}

impl SlackNotifier {
	pub fn new(webhook_url: String, channel: String) -> Result<Self, NotifyError> {
		let client = reqwest::blocking::Client::builder()
			.timeout(Duration::from_secs(10))
			.build()
			.map_err(|e| NotifyError::Post(e.to_string()))?;
		Ok(Self { client, webhook_url, channel, username: "alterguard".to_string() })
	}
}

impl Notifier for SlackNotifier {
	fn notify(&self, text: &str, icon: Icon) -> Result<(), NotifyError> {
		let payload = Payload {
			channel: &self.channel,
			username: &self.username,
			text,
			icon_emoji: icon.emoji(),
		};
		let response = self
			.client
			.post(&self.webhook_url)
			.json(&payload)
			.send()
			.map_err(|e| NotifyError::Post(e.to_string()))?;
		if !response.status().is_success() {
			return Err(NotifyError::Status(response.status().as_u16()));
		}
		Ok(())
	}
}

/// Post and log on failure, never propagate. Use for every status update
/// once the run outcome is already decided.
pub fn post_best_effort(notifier: &dyn Notifier, text: &str, icon: Icon) {
	if let Err(e) = notifier.notify(text, icon) {
		warn!(error = %e, "status notification failed");
	}
}
