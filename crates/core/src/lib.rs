// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 alterguard maintainers

//! Pure domain logic for alterguard: parsing the ALTER statement, deriving
//! load-throttling thresholds, assembling the pt-online-schema-change
//! argument vector and naming the shadow objects to clean up.
//!
//! Nothing in this crate performs I/O; the database, subprocess and webhook
//! collaborators live in the sibling crates.

#![cfg_attr(not(debug_assertions), deny(warnings))]

mod cleanup;
mod command;
mod error;
mod load;
mod statement;

pub use cleanup::CleanupPlan;
pub use command::{OscOptions, Target, build_command, render_shell};
pub use error::{Result, RunError};
pub use load::{LoadPolicy, LoadTier};
pub use statement::AlterRequest;
