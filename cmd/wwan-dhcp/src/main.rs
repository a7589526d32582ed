//! Get a DHCP lease on the modem's interface, and install a default route through it.
//!
//! This takes no arguments, and always uses the default modem configuration.
//! The only output is a single `[+]`, or `[!]` line on stdout, along with
//! the exit code.

use log::install_logging_handlers;
use tracing::debug;
use wwan::{dhcp_bootstrap, LinuxHost, ModemConfig, Procedure};

/// The single "error" exit code we use when `wwan-dhcp` fails.
const ERROR_EXIT_CODE: i32 = 1;

#[tokio::main(flavor = "current_thread")]
async fn main() {
	if let Err(cause) = install_logging_handlers(false, "warn") {
		// Logging isn't setup, so we can only print.
		println!("[!] failed to install the logging handlers:\n{cause:?}");
		std::process::exit(ERROR_EXIT_CODE);
	}

	match dhcp_bootstrap(&LinuxHost::new(), &ModemConfig::default()).await {
		Ok(transcript) => {
			debug!(?transcript, "wwan-dhcp finished");
			println!("{}", Procedure::DhcpBootstrap.success_line());
		}
		Err(failure) => {
			debug!(transcript = ?failure.transcript, step = %failure.step, "wwan-dhcp failed");
			println!("{}", failure.status_line());
			std::process::exit(ERROR_EXIT_CODE);
		}
	}
}
