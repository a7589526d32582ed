//! The real host, talking to the Linux kernel and a handful of busybox-style
//! tools (`ifconfig`, `udhcpc`, `route`).

use crate::{
	errors::{CommandError, OperationError},
	host::{AdminState, Host},
};
use network_interface::{NetworkInterface, NetworkInterfaceConfig};
use std::path::{Path, PathBuf};
use tokio::{
	fs::{File, OpenOptions},
	io::Result as IoResult,
	process::Command,
};
use tracing::debug;

/// Where the kernel publishes the list of loaded modules (what `lsmod` reads).
const PROC_MODULES_PATH: &str = "/proc/modules";
/// Where the kernel publishes one directory per network interface.
const SYS_CLASS_NET_PATH: &str = "/sys/class/net";

/// A [`Host`] backed by the actual machine we're running on.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinuxHost;

impl LinuxHost {
	#[must_use]
	pub const fn new() -> Self {
		Self
	}
}

impl Host for LinuxHost {
	type Device = File;

	#[cfg(unix)]
	fn is_privileged(&self) -> bool {
		// SAFETY: `geteuid` has no preconditions, and can never fail.
		unsafe { libc::geteuid() == 0 }
	}

	#[cfg(not(unix))]
	fn is_privileged(&self) -> bool {
		false
	}

	async fn module_loaded(&self, module: &str) -> Result<bool, OperationError> {
		let listing = tokio::fs::read_to_string(PROC_MODULES_PATH)
			.await
			.map_err(OperationError::ListModules)?;
		Ok(module_is_listed(&listing, module))
	}

	async fn interface_exists(&self, interface: &str) -> Result<bool, OperationError> {
		if !is_interface_name(interface) {
			debug!(interface, "not a valid interface name");
			return Ok(false);
		}

		let interfaces = NetworkInterface::show().map_err(OperationError::ListInterfaces)?;
		if interfaces.iter().any(|iface| iface.name == interface) {
			return Ok(true);
		}

		// Interfaces that are down and have no addresses don't always come back
		// from `getifaddrs`.
		let mut sys_path = PathBuf::from(SYS_CLASS_NET_PATH);
		sys_path.push(interface);
		Ok(tokio::fs::try_exists(&sys_path).await.unwrap_or(false))
	}

	async fn set_admin_state(&self, interface: &str, state: AdminState) -> Result<(), CommandError> {
		let state_arg = state.to_string();
		run("ifconfig", &[interface, state_arg.as_str()]).await
	}

	async fn device_exists(&self, device: &Path) -> bool {
		tokio::fs::try_exists(device).await.unwrap_or(false)
	}

	async fn open_device(&self, device: &Path) -> IoResult<Self::Device> {
		let mut options = OpenOptions::new();
		options.write(true);
		// Never let the modem's tty become our controlling terminal.
		#[cfg(unix)]
		options.custom_flags(libc::O_NOCTTY);
		options.open(device).await
	}

	async fn request_lease(&self, interface: &str, retries: u32) -> Result<(), CommandError> {
		let retries_arg = retries.to_string();
		// `-n` exit when out of retries, `-q` exit as soon as we have a lease.
		run(
			"udhcpc",
			&["-i", interface, "-n", "-q", "-t", retries_arg.as_str()],
		)
		.await
	}

	async fn add_default_route(&self, interface: &str) -> Result<(), CommandError> {
		run("route", &["add", "default", "dev", interface]).await
	}
}

/// Run an external program to completion, turning a non-zero exit into an
/// error.
async fn run(program: &'static str, args: &[&str]) -> Result<(), CommandError> {
	debug!(program, ?args, "running external command");
	let output = Command::new(program)
		.args(args)
		.output()
		.await
		.map_err(|cause| CommandError::Spawn { program, cause })?;

	if output.status.success() {
		Ok(())
	} else {
		Err(CommandError::Status {
			program,
			status: output.status,
			stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
		})
	}
}

/// If a name could name an interface at all, i.e. it's a single non-empty
/// entry directly under `/sys/class/net`.
fn is_interface_name(interface: &str) -> bool {
	!interface.is_empty() && interface != "." && interface != ".." && !interface.contains('/')
}

/// If a module appears in the contents of `/proc/modules`.
///
/// The first whitespace separated column of every line is the module name, we
/// only accept exact matches so `simcom_wwan` doesn't match `simcom_wwan2`.
fn module_is_listed(listing: &str, module: &str) -> bool {
	listing
		.lines()
		.filter_map(|line| line.split_whitespace().next())
		.any(|name| name == module)
}

#[cfg(test)]
mod unit_tests {
	use super::*;

	const MODULE_LISTING: &str = "simcom_wwan 24576 0 - Live 0x0000000000000000\n\
		usbnet 53248 1 simcom_wwan, Live 0x0000000000000000\n\
		option 65536 1 - Live 0x0000000000000000\n";

	#[test]
	pub fn finds_exact_module_names() {
		assert!(module_is_listed(MODULE_LISTING, "simcom_wwan"));
		assert!(module_is_listed(MODULE_LISTING, "usbnet"));
		assert!(
			!module_is_listed(MODULE_LISTING, "simcom"),
			"A prefix of a module name should not count as loaded!",
		);
		assert!(
			!module_is_listed(MODULE_LISTING, "24576"),
			"Only the name column should be matched!",
		);
		assert!(!module_is_listed("", "simcom_wwan"));
	}

	#[tokio::test]
	pub async fn loopback_interface_exists() {
		assert!(
			LinuxHost::new()
				.interface_exists("lo")
				.await
				.expect("Failed to list network interfaces!"),
			"Could not find the loopback interface, does your machine not have one?",
		);
		assert!(
			!LinuxHost::new()
				.interface_exists("𩸽")
				.await
				.expect("Failed to list network interfaces!"),
			"Found an interface with a name that can't exist?",
		);
	}

	#[tokio::test]
	pub async fn path_like_names_are_not_interfaces() {
		for name in ["", ".", "..", "../net", "lo/"] {
			assert!(
				!LinuxHost::new()
					.interface_exists(name)
					.await
					.expect("Failed to check for an interface!"),
				"{name:?} was treated as an existing interface!",
			);
		}
	}

	#[tokio::test]
	pub async fn missing_device_does_not_exist() {
		assert!(
			!LinuxHost::new()
				.device_exists(Path::new("/dev/this-tty-does-not-exist"))
				.await
		);
	}

	#[tokio::test]
	pub async fn failing_program_reports_status() {
		match run("false", &[]).await {
			Err(CommandError::Status { program, .. }) => assert_eq!(program, "false"),
			other => panic!("Expected a status error from `false`, got: {other:?}"),
		}
		assert!(matches!(
			run("this-program-does-not-exist-anywhere", &[]).await,
			Err(CommandError::Spawn { .. }),
		));
	}
}
