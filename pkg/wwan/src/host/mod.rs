//! The capability the modem procedures need from the machine they run on.
//!
//! Every procedure is written against [`Host`] rather than the OS directly, so
//! the sequencing (and especially what happens on failure) can be checked
//! without a real modem plugged in.

mod linux;
pub use linux::*;

#[cfg(test)]
pub(crate) mod fake;

use crate::errors::{CommandError, OperationError};
use std::{
	fmt::{Display, Formatter, Result as FmtResult},
	path::Path,
};
use tokio::io::{AsyncWrite, Result as IoResult};

/// The administrative state of a network interface.
///
/// This is only the OS level enable/disable flag, and has nothing to do with
/// whether a link (or a bearer) is actually present.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum AdminState {
	Up,
	Down,
}

impl Display for AdminState {
	fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
		match *self {
			Self::Up => write!(fmt, "up"),
			Self::Down => write!(fmt, "down"),
		}
	}
}

/// Everything a modem procedure can observe, or change, about the host.
///
/// All queries re-read the live state of the OS, implementations must never
/// cache answers between calls.
#[allow(
	// Procedures are only ever driven from a single task, so we don't need to
	// promise `Send` futures.
	async_fn_in_trait,
)]
pub trait Host {
	/// A handle to the serial device, only ever written to.
	type Device: AsyncWrite + Unpin;

	/// If we are running with an effective user id of 0.
	fn is_privileged(&self) -> bool;

	/// If a kernel module with exactly this name is currently loaded.
	///
	/// ## Errors
	///
	/// If the list of loaded modules could not be read.
	async fn module_loaded(&self, module: &str) -> Result<bool, OperationError>;

	/// If a network interface with this name is known to the OS.
	///
	/// ## Errors
	///
	/// If the list of interfaces could not be read.
	async fn interface_exists(&self, interface: &str) -> Result<bool, OperationError>;

	/// Set the administrative state of an interface.
	///
	/// Setting an interface to the state it's already in is not an error.
	///
	/// ## Errors
	///
	/// If the OS refuses to change the state of the interface.
	async fn set_admin_state(&self, interface: &str, state: AdminState) -> Result<(), CommandError>;

	/// If the serial device node exists.
	async fn device_exists(&self, device: &Path) -> bool;

	/// Open the serial device for writing.
	///
	/// ## Errors
	///
	/// If the device could not be opened.
	async fn open_device(&self, device: &Path) -> IoResult<Self::Device>;

	/// Block until the DHCP client bound to `interface` gets a lease, or has
	/// tried `retries` times.
	///
	/// ## Errors
	///
	/// If no lease could be obtained.
	async fn request_lease(&self, interface: &str, retries: u32) -> Result<(), CommandError>;

	/// Install a default route through `interface`.
	///
	/// ## Errors
	///
	/// If the route could not be installed (including if it already exists).
	async fn add_default_route(&self, interface: &str) -> Result<(), CommandError>;
}
