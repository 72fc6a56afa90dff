// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 alterguard maintainers

//! Operator interruption. SIGINT/SIGTERM flip a flag the supervisor loop
//! observes between reads; the subprocess is then killed with no graceful
//! drain.

use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_signal(_signal: libc::c_int) {
	INTERRUPTED.store(true, Ordering::SeqCst);
}

pub fn install() -> &'static AtomicBool {
	let handler = on_signal as extern "C" fn(libc::c_int);
	unsafe {
		libc::signal(libc::SIGINT, handler as libc::sighandler_t);
		libc::signal(libc::SIGTERM, handler as libc::sighandler_t);
	}
	&INTERRUPTED
}
