//! The three modem procedures, each a fixed sequence of named steps.
//!
//! Every step either completes or fails, and the first failure ends the
//! procedure. Nothing is ever retried here (the DHCP client does it's own
//! retrying), and only one failure is ever cleaned up after: when enabling, if
//! the serial device is missing after we raised the interface, the interface
//! is lowered again. Every other failure leaves the host as it is.
//!
//! The ordering is deliberately asymmetric:
//!
//! - `enable`: raise the interface, *then* attach the bearer, then wait.
//! - `disable`: lower the interface, *then* detach the bearer.

use crate::{
	at::{send_at_command, AtCommand},
	config::ModemConfig,
	errors::{OperationError, PreconditionError, WwanError},
	host::{AdminState, Host},
};
use miette::Diagnostic;
use std::{
	fmt::{Display, Formatter, Result as FmtResult},
	path::Path,
};
use thiserror::Error;
use tokio::{io::Result as IoResult, time::sleep};
use tracing::{debug, warn};

/// Which of the procedures is being run.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Procedure {
	/// Raise the interface, and attach the bearer.
	Enable,
	/// Lower the interface, and detach the bearer.
	Disable,
	/// Get a lease on the interface, and route through it.
	DhcpBootstrap,
}

impl Procedure {
	/// The message reported when the procedure succeeds.
	#[must_use]
	pub const fn success_message(&self) -> &'static str {
		match *self {
			Self::Enable => "ready for an IP Address",
			Self::Disable => "connection deactivated",
			Self::DhcpBootstrap => "lease obtained, default route installed",
		}
	}

	/// The line printed to stdout when the procedure succeeds.
	#[must_use]
	pub fn success_line(&self) -> String {
		format!("[+] {}", self.success_message())
	}
}

impl Display for Procedure {
	fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
		match *self {
			Self::Enable => write!(fmt, "enable"),
			Self::Disable => write!(fmt, "disable"),
			Self::DhcpBootstrap => write!(fmt, "dhcp"),
		}
	}
}

/// Every step any procedure can take.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Step {
	CheckPrivilege,
	CheckModule,
	CheckInterface,
	RaiseInterface,
	LowerInterface,
	CheckDevice,
	AttachBearer,
	AwaitAttach,
	DetachBearer,
	AcquireLease,
	InstallDefaultRoute,
}

impl Display for Step {
	fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
		let text = match *self {
			Self::CheckPrivilege => "check privileges",
			Self::CheckModule => "check the kernel module",
			Self::CheckInterface => "check the interface",
			Self::RaiseInterface => "bring the interface up",
			Self::LowerInterface => "bring the interface down",
			Self::CheckDevice => "check the serial device",
			Self::AttachBearer => "attach the bearer",
			Self::AwaitAttach => "wait for the bearer",
			Self::DetachBearer => "detach the bearer",
			Self::AcquireLease => "acquire a lease",
			Self::InstallDefaultRoute => "install the default route",
		};
		write!(fmt, "{text}")
	}
}

/// The result of running a single step.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum StepResult {
	Completed,
	Failed,
}

/// A step that was run, and how it went.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepRecord {
	pub step: Step,
	pub result: StepResult,
	/// If this step was run to undo an earlier one after a failure.
	pub compensating: bool,
}

/// Every step run by a procedure, in the order they ran.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transcript {
	records: Vec<StepRecord>,
}

impl Transcript {
	#[must_use]
	pub fn records(&self) -> &[StepRecord] {
		&self.records
	}

	/// Just the steps, in order, regardless of how they went.
	#[must_use]
	pub fn steps(&self) -> Vec<Step> {
		self.records.iter().map(|record| record.step).collect()
	}

	/// If a compensating step was attempted.
	#[must_use]
	pub fn compensated(&self) -> bool {
		self.records.iter().any(|record| record.compensating)
	}

	fn push(&mut self, step: Step, result: StepResult, compensating: bool) {
		debug!(%step, ?result, compensating, "procedure step");
		self.records.push(StepRecord {
			step,
			result,
			compensating,
		});
	}
}

/// A procedure stopped early.
#[derive(Error, Diagnostic, Debug)]
#[error("could not {step} while running `{procedure}`")]
pub struct ProcedureFailure {
	pub procedure: Procedure,
	/// The step that failed.
	pub step: Step,
	#[source]
	#[diagnostic_source]
	pub cause: WwanError,
	/// Every step that ran, including the failed one, and any compensation.
	pub transcript: Transcript,
}

impl ProcedureFailure {
	/// The line printed to stdout for this failure.
	#[must_use]
	pub fn status_line(&self) -> String {
		format!("[!] {}", self.cause)
	}
}

/// Tracks the steps of a single procedure as it runs.
struct Run {
	procedure: Procedure,
	transcript: Transcript,
}

impl Run {
	const fn new(procedure: Procedure) -> Self {
		Self {
			procedure,
			transcript: Transcript {
				records: Vec::new(),
			},
		}
	}

	fn completed(&mut self, step: Step) {
		self.transcript.push(step, StepResult::Completed, false);
	}

	fn compensated(&mut self, step: Step, result: StepResult) {
		self.transcript.push(step, result, true);
	}

	fn fail(&mut self, step: Step, cause: impl Into<WwanError>) -> ProcedureFailure {
		self.transcript.push(step, StepResult::Failed, false);
		self.failure(step, cause)
	}

	/// End the run on a step that has already been recorded as failed.
	fn failure(&mut self, step: Step, cause: impl Into<WwanError>) -> ProcedureFailure {
		ProcedureFailure {
			procedure: self.procedure,
			step,
			cause: cause.into(),
			transcript: std::mem::take(&mut self.transcript),
		}
	}

	fn finish(self) -> Transcript {
		self.transcript
	}
}

/// Raise the interface, and attach the modem's bearer to it.
///
/// On success this has blocked for [`ModemConfig::attach_grace`] after the
/// attach command was written, so the caller can go straight to requesting a
/// lease.
///
/// ## Errors
///
/// - If we're not privileged, or the module/interface/device is missing.
/// - If the interface couldn't be raised.
/// - If the attach command couldn't be written. The interface is left up.
pub async fn enable<H: Host>(host: &H, config: &ModemConfig) -> Result<Transcript, ProcedureFailure> {
	let mut run = Run::new(Procedure::Enable);
	check_gates(host, config, &mut run).await?;

	if let Err(cause) = host
		.set_admin_state(&config.interface, AdminState::Up)
		.await
	{
		return Err(run.fail(
			Step::RaiseInterface,
			OperationError::InterfaceUp {
				interface: config.interface.clone(),
				cause,
			},
		));
	}
	run.completed(Step::RaiseInterface);

	if !host.device_exists(&config.device).await {
		run.transcript
			.push(Step::CheckDevice, StepResult::Failed, false);
		match host
			.set_admin_state(&config.interface, AdminState::Down)
			.await
		{
			Ok(()) => run.compensated(Step::LowerInterface, StepResult::Completed),
			Err(cause) => {
				warn!(
					interface = %config.interface,
					?cause,
					"could not lower interface again after the serial device was not found",
				);
				run.compensated(Step::LowerInterface, StepResult::Failed);
			}
		}
		return Err(run.failure(
			Step::CheckDevice,
			PreconditionError::DeviceNotFound {
				device: config.device.clone(),
			},
		));
	}
	run.completed(Step::CheckDevice);

	if let Err(cause) = write_command(host, &config.device, AtCommand::ActivateBearer).await {
		return Err(run.fail(
			Step::AttachBearer,
			OperationError::Activate {
				device: config.device.clone(),
				cause,
			},
		));
	}
	run.completed(Step::AttachBearer);

	sleep(config.attach_grace).await;
	run.completed(Step::AwaitAttach);

	Ok(run.finish())
}

/// Lower the interface, and detach the modem's bearer.
///
/// Lowering an interface that is already down is fine, so this can be run
/// repeatedly, and will always still attempt to write the detach command.
///
/// ## Errors
///
/// - If we're not privileged, or the module/interface/device is missing.
/// - If the interface couldn't be lowered.
/// - If the detach command couldn't be written.
pub async fn disable<H: Host>(host: &H, config: &ModemConfig) -> Result<Transcript, ProcedureFailure> {
	let mut run = Run::new(Procedure::Disable);
	check_gates(host, config, &mut run).await?;

	if let Err(cause) = host
		.set_admin_state(&config.interface, AdminState::Down)
		.await
	{
		return Err(run.fail(
			Step::LowerInterface,
			OperationError::InterfaceDown {
				interface: config.interface.clone(),
				cause,
			},
		));
	}
	run.completed(Step::LowerInterface);

	if !host.device_exists(&config.device).await {
		return Err(run.fail(
			Step::CheckDevice,
			PreconditionError::DeviceNotFound {
				device: config.device.clone(),
			},
		));
	}
	run.completed(Step::CheckDevice);

	if let Err(cause) = write_command(host, &config.device, AtCommand::DeactivateBearer).await {
		return Err(run.fail(
			Step::DetachBearer,
			OperationError::Deactivate {
				device: config.device.clone(),
				cause,
			},
		));
	}
	run.completed(Step::DetachBearer);

	Ok(run.finish())
}

/// Get a lease on the interface, and install a default route through it.
///
/// This checks nothing up front, it assumes [`enable`] has already succeeded.
///
/// ## Errors
///
/// - If the DHCP client could not get a lease within it's retry budget.
/// - If the default route could not be installed.
pub async fn dhcp_bootstrap<H: Host>(
	host: &H,
	config: &ModemConfig,
) -> Result<Transcript, ProcedureFailure> {
	let mut run = Run::new(Procedure::DhcpBootstrap);

	if let Err(cause) = host
		.request_lease(&config.interface, config.lease_retries)
		.await
	{
		return Err(run.fail(
			Step::AcquireLease,
			OperationError::Lease {
				interface: config.interface.clone(),
				cause,
			},
		));
	}
	run.completed(Step::AcquireLease);

	if let Err(cause) = host.add_default_route(&config.interface).await {
		return Err(run.fail(
			Step::InstallDefaultRoute,
			OperationError::DefaultRoute {
				interface: config.interface.clone(),
				cause,
			},
		));
	}
	run.completed(Step::InstallDefaultRoute);

	Ok(run.finish())
}

/// The gates shared by [`enable`], and [`disable`]: privilege, then module,
/// then interface.
async fn check_gates<H: Host>(
	host: &H,
	config: &ModemConfig,
	run: &mut Run,
) -> Result<(), ProcedureFailure> {
	if !host.is_privileged() {
		return Err(run.fail(Step::CheckPrivilege, PreconditionError::NotPrivileged));
	}
	run.completed(Step::CheckPrivilege);

	match host.module_loaded(&config.module).await {
		Ok(true) => run.completed(Step::CheckModule),
		Ok(false) => {
			return Err(run.fail(
				Step::CheckModule,
				PreconditionError::ModuleNotFound {
					module: config.module.clone(),
				},
			))
		}
		Err(cause) => return Err(run.fail(Step::CheckModule, cause)),
	}

	match host.interface_exists(&config.interface).await {
		Ok(true) => run.completed(Step::CheckInterface),
		Ok(false) => {
			return Err(run.fail(
				Step::CheckInterface,
				PreconditionError::InterfaceNotFound {
					interface: config.interface.clone(),
				},
			))
		}
		Err(cause) => return Err(run.fail(Step::CheckInterface, cause)),
	}

	Ok(())
}

/// Open the serial device, and send a single command down it.
async fn write_command<H: Host>(host: &H, device: &Path, command: AtCommand) -> IoResult<()> {
	let mut handle = host.open_device(device).await?;
	send_at_command(&mut handle, command).await
}
