//! Bring the modem's interface up, and attach the cellular bearer to it.
//!
//! This takes no arguments, and always uses the default modem configuration.
//! The only output is a single `[+]`, or `[!]` line on stdout, along with
//! the exit code.

use log::install_logging_handlers;
use tracing::debug;
use wwan::{enable, LinuxHost, ModemConfig, Procedure};

/// The single "error" exit code we use when `wwan-up` fails.
const ERROR_EXIT_CODE: i32 = 1;

#[tokio::main(flavor = "current_thread")]
async fn main() {
	if let Err(cause) = install_logging_handlers(false, "warn") {
		// Logging isn't setup, so we can only print.
		println!("[!] failed to install the logging handlers:\n{cause:?}");
		std::process::exit(ERROR_EXIT_CODE);
	}

	match enable(&LinuxHost::new(), &ModemConfig::default()).await {
		Ok(transcript) => {
			debug!(?transcript, "wwan-up finished");
			println!("{}", Procedure::Enable.success_line());
		}
		Err(failure) => {
			debug!(transcript = ?failure.transcript, step = %failure.step, "wwan-up failed");
			println!("{}", failure.status_line());
			std::process::exit(ERROR_EXIT_CODE);
		}
	}
}
