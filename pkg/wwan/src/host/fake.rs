//! An in-memory [`Host`] that records everything done to it.

use crate::{
	errors::{CommandError, OperationError},
	host::{AdminState, Host},
};
use std::{
	collections::{HashMap, HashSet},
	io::{Error as IoError, ErrorKind as IoErrorKind},
	path::{Path, PathBuf},
	pin::Pin,
	sync::{Arc, Mutex},
	task::{Context, Poll},
};
use tokio::io::{AsyncWrite, Result as IoResult};

/// A single observable action taken against the fake host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
	CheckedModule(String),
	CheckedInterface(String),
	SetAdminState(String, AdminState),
	CheckedDevice(PathBuf),
	OpenedDevice(PathBuf),
	RequestedLease(String, u32),
	AddedDefaultRoute(String),
}

#[derive(Debug, Default)]
pub(crate) struct State {
	actions: Vec<Action>,
	interfaces: HashMap<String, AdminState>,
	written: Vec<u8>,
	default_route: Option<String>,
	leased: Option<String>,
}

/// A fake host, with a set of knobs for which operations should fail.
#[derive(Debug, Default)]
pub struct FakeHost {
	pub privileged: bool,
	pub modules: HashSet<String>,
	pub devices: HashSet<PathBuf>,
	pub fail_raise: bool,
	pub fail_lower: bool,
	pub fail_write: bool,
	pub fail_lease: bool,
	pub fail_route: bool,
	pub(crate) state: Arc<Mutex<State>>,
}

impl FakeHost {
	/// A host where every precondition for the default configuration holds,
	/// and the interface starts out down.
	pub fn ready() -> Self {
		let host = Self {
			privileged: true,
			modules: HashSet::from(["simcom_wwan".to_owned()]),
			devices: HashSet::from([PathBuf::from("/dev/ttyUSB2")]),
			..Default::default()
		};
		host.add_interface("wwan0", AdminState::Down);
		host
	}

	pub fn add_interface(&self, name: &str, state: AdminState) {
		self.lock().interfaces.insert(name.to_owned(), state);
	}

	pub fn admin_state(&self, name: &str) -> Option<AdminState> {
		self.lock().interfaces.get(name).copied()
	}

	pub fn actions(&self) -> Vec<Action> {
		self.lock().actions.clone()
	}

	pub fn written(&self) -> Vec<u8> {
		self.lock().written.clone()
	}

	pub fn default_route(&self) -> Option<String> {
		self.lock().default_route.clone()
	}

	pub fn leased(&self) -> Option<String> {
		self.lock().leased.clone()
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, State> {
		self.state
			.lock()
			.unwrap_or_else(std::sync::PoisonError::into_inner)
	}

	fn record(&self, action: Action) {
		self.lock().actions.push(action);
	}
}

fn refused(program: &'static str) -> CommandError {
	CommandError::Spawn {
		program,
		cause: IoError::new(IoErrorKind::PermissionDenied, "refused by fake host"),
	}
}

impl Host for FakeHost {
	type Device = FakeDevice;

	fn is_privileged(&self) -> bool {
		self.privileged
	}

	async fn module_loaded(&self, module: &str) -> Result<bool, OperationError> {
		self.record(Action::CheckedModule(module.to_owned()));
		Ok(self.modules.contains(module))
	}

	async fn interface_exists(&self, interface: &str) -> Result<bool, OperationError> {
		self.record(Action::CheckedInterface(interface.to_owned()));
		Ok(self.lock().interfaces.contains_key(interface))
	}

	async fn set_admin_state(&self, interface: &str, state: AdminState) -> Result<(), CommandError> {
		self.record(Action::SetAdminState(interface.to_owned(), state));
		let should_fail = match state {
			AdminState::Up => self.fail_raise,
			AdminState::Down => self.fail_lower,
		};
		if should_fail {
			return Err(refused("ifconfig"));
		}

		let mut locked = self.lock();
		let Some(current) = locked.interfaces.get_mut(interface) else {
			return Err(refused("ifconfig"));
		};
		*current = state;
		Ok(())
	}

	async fn device_exists(&self, device: &Path) -> bool {
		self.record(Action::CheckedDevice(device.to_path_buf()));
		self.devices.contains(device)
	}

	async fn open_device(&self, device: &Path) -> IoResult<Self::Device> {
		self.record(Action::OpenedDevice(device.to_path_buf()));
		if !self.devices.contains(device) {
			return Err(IoError::new(IoErrorKind::NotFound, "no such device"));
		}
		Ok(FakeDevice {
			fail_write: self.fail_write,
			state: self.state.clone(),
		})
	}

	async fn request_lease(&self, interface: &str, retries: u32) -> Result<(), CommandError> {
		self.record(Action::RequestedLease(interface.to_owned(), retries));
		if self.fail_lease {
			return Err(refused("udhcpc"));
		}
		self.lock().leased = Some(interface.to_owned());
		Ok(())
	}

	async fn add_default_route(&self, interface: &str) -> Result<(), CommandError> {
		self.record(Action::AddedDefaultRoute(interface.to_owned()));
		if self.fail_route {
			return Err(refused("route"));
		}
		self.lock().default_route = Some(interface.to_owned());
		Ok(())
	}
}

/// A serial device that appends everything written into the fake host.
#[derive(Debug)]
pub struct FakeDevice {
	fail_write: bool,
	state: Arc<Mutex<State>>,
}

impl AsyncWrite for FakeDevice {
	fn poll_write(
		self: Pin<&mut Self>,
		_cx: &mut Context<'_>,
		buf: &[u8],
	) -> Poll<Result<usize, IoError>> {
		if self.fail_write {
			return Poll::Ready(Err(IoError::new(IoErrorKind::BrokenPipe, "modem went away")));
		}
		self.state
			.lock()
			.unwrap_or_else(std::sync::PoisonError::into_inner)
			.written
			.extend_from_slice(buf);
		Poll::Ready(Ok(buf.len()))
	}

	fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), IoError>> {
		Poll::Ready(Ok(()))
	}

	fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), IoError>> {
		Poll::Ready(Ok(()))
	}
}
