//! A container for all the types of errors generated crate-wide.
//!
//! The top level error type is: [`WwanError`], which wraps all the other
//! types of errors. The `Display` text of each precondition/operation error is
//! exactly the message printed after `[!]` by the command line tools, so
//! callers that only read stdout can still tell failures apart.

use miette::Diagnostic;
use std::{path::PathBuf, process::ExitStatus, string::FromUtf8Error};
use thiserror::Error;
use tokio::io::Error as IoError;

/// The 'top-level' error type for this entire crate, all error types
/// wrap underneath this.
#[derive(Error, Diagnostic, Debug)]
pub enum WwanError {
	/// See [`ConfigError`] for details.
	#[error(transparent)]
	#[diagnostic(transparent)]
	Config(#[from] ConfigError),
	/// See [`PreconditionError`] for details.
	#[error(transparent)]
	#[diagnostic(transparent)]
	Precondition(#[from] PreconditionError),
	/// See [`OperationError`] for details.
	#[error(transparent)]
	#[diagnostic(transparent)]
	Operation(#[from] OperationError),
}

/// One of the things that has to already be true on the host before we touch
/// anything wasn't true.
///
/// None of these are ever created by us, only observed.
#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
pub enum PreconditionError {
	/// Toggling interfaces and writing to the modem's serial port needs an
	/// effective user id of 0.
	#[error("this must be run as root")]
	#[diagnostic(
		code(wwan::precondition::not_root),
		help("Re-run the command with `sudo`, or as the root user.")
	)]
	NotPrivileged,
	/// The kernel module for the modem driver isn't in the loaded module list.
	#[error("module not found")]
	#[diagnostic(
		code(wwan::precondition::module_not_found),
		help("The `{module}` kernel module must be loaded, try `modprobe {module}`.")
	)]
	ModuleNotFound { module: String },
	/// The network interface for the modem doesn't exist.
	#[error("interface not found")]
	#[diagnostic(
		code(wwan::precondition::interface_not_found),
		help("No network interface named `{interface}` is known to the OS, is the modem plugged in?")
	)]
	InterfaceNotFound { interface: String },
	/// The serial device node used to send AT commands doesn't exist.
	#[error("device not found")]
	#[diagnostic(
		code(wwan::precondition::device_not_found),
		help("No serial device exists at {device:?}, is the modem plugged in?")
	)]
	DeviceNotFound { device: PathBuf },
}

/// Something we asked the OS (or the modem) to do failed.
#[derive(Error, Diagnostic, Debug)]
pub enum OperationError {
	/// We could not set the interface administratively up.
	#[error("could not bring up interface")]
	#[diagnostic(code(wwan::op::interface_up))]
	InterfaceUp {
		interface: String,
		#[source]
		cause: CommandError,
	},
	/// We could not set the interface administratively down.
	#[error("could not bring down interface")]
	#[diagnostic(code(wwan::op::interface_down))]
	InterfaceDown {
		interface: String,
		#[source]
		cause: CommandError,
	},
	/// Opening, or writing the attach command to the serial device failed.
	#[error("failed to activate connection")]
	#[diagnostic(
		code(wwan::op::activate),
		help("The interface has been left up, but no bearer is attached.")
	)]
	Activate {
		device: PathBuf,
		#[source]
		cause: IoError,
	},
	/// Opening, or writing the detach command to the serial device failed.
	#[error("failed to deactivate connection")]
	#[diagnostic(code(wwan::op::deactivate))]
	Deactivate {
		device: PathBuf,
		#[source]
		cause: IoError,
	},
	/// The DHCP client ran out of attempts (or failed to run at all).
	#[error("failed to obtain a lease")]
	#[diagnostic(code(wwan::op::lease))]
	Lease {
		interface: String,
		#[source]
		cause: CommandError,
	},
	/// Installing the default route through the interface failed.
	#[error("failed to install default route")]
	#[diagnostic(code(wwan::op::default_route))]
	DefaultRoute {
		interface: String,
		#[source]
		cause: CommandError,
	},
	/// Reading the list of loaded kernel modules failed.
	#[error("could not read the loaded kernel module list")]
	#[diagnostic(code(wwan::op::list_modules))]
	ListModules(#[source] IoError),
	/// Asking the OS for its network interfaces failed.
	#[error("could not list the network interfaces on your device")]
	#[diagnostic(code(wwan::op::list_interfaces))]
	ListInterfaces(#[source] network_interface::Error),
}

/// An external program we run failed.
#[derive(Error, Diagnostic, Debug)]
pub enum CommandError {
	/// The program could not be started at all (e.g. not installed).
	#[error("could not run `{program}`")]
	#[diagnostic(code(wwan::command::spawn))]
	Spawn {
		program: &'static str,
		#[source]
		cause: IoError,
	},
	/// The program ran, but did not exit successfully.
	#[error("`{program}` exited with {status}: {stderr}")]
	#[diagnostic(code(wwan::command::status))]
	Status {
		program: &'static str,
		status: ExitStatus,
		stderr: String,
	},
}

/// Loading the configuration file has resulted in an error.
#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
	/// We expected to read UTF-8 data from the filesystem, but it wasn't UTF-8.
	#[error("Data read from the configuration file was expected to be UTF-8, but was not: {0}")]
	#[diagnostic(code(wwan::config::utf8_expected))]
	InvalidDataNeedsUTF8(#[from] FromUtf8Error),
	/// We expected to parse the file as INI data.
	#[error("The configuration file was expected to be a valid INI file: {0}")]
	#[diagnostic(code(wwan::config::expected_ini))]
	InvalidDataNeedsToBeINI(String),
	/// See [`tokio::io::Error`] for details.
	#[error("Error reading the configuration file: {0}")]
	#[diagnostic(code(wwan::config::io_failure))]
	IOError(#[from] IoError),
}
