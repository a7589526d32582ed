//! The (tiny) subset of AT commands we send to the modem.
//!
//! Commands are strictly one-way: we write the line to the serial device and
//! never read a response back. If the modem silently refuses a command there
//! is no way for us to notice.

use std::fmt::{Display, Formatter, Result as FmtResult};
use tokio::io::{AsyncWrite, AsyncWriteExt, Result as IoResult};
use tracing::debug;

/// A single AT command line understood by the modem.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum AtCommand {
	/// `AT$QCRMCALL=1,1` start a data call, attaching the bearer to the
	/// interface.
	ActivateBearer,
	/// `AT$QCRMCALL=0,1` stop the data call, detaching the bearer.
	DeactivateBearer,
}

impl AtCommand {
	/// The exact bytes written to the device, carriage return included.
	///
	/// Modems terminate a command line on `\r`, a `\n` is not substituted.
	#[must_use]
	pub const fn as_bytes(&self) -> &'static [u8] {
		match *self {
			Self::ActivateBearer => b"AT$QCRMCALL=1,1\r",
			Self::DeactivateBearer => b"AT$QCRMCALL=0,1\r",
		}
	}
}

impl Display for AtCommand {
	fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
		match *self {
			Self::ActivateBearer => write!(fmt, "AT$QCRMCALL=1,1"),
			Self::DeactivateBearer => write!(fmt, "AT$QCRMCALL=0,1"),
		}
	}
}

/// Send a command to a device, and don't wait for any answer.
///
/// ## Errors
///
/// If writing, or flushing the underlying device fails.
pub async fn send_at_command<Device>(device: &mut Device, command: AtCommand) -> IoResult<()>
where
	Device: AsyncWrite + Unpin,
{
	debug!(%command, "writing at command");
	device.write_all(command.as_bytes()).await?;
	device.flush().await
}

#[cfg(test)]
mod unit_tests {
	use super::*;

	#[test]
	pub fn commands_end_in_a_single_carriage_return() {
		for command in [AtCommand::ActivateBearer, AtCommand::DeactivateBearer] {
			let bytes = command.as_bytes();
			assert_eq!(
				bytes.last(),
				Some(&b'\r'),
				"Command {command} did not end with a carriage return!",
			);
			assert!(
				!bytes.contains(&b'\n'),
				"Command {command} somehow contains a newline?",
			);
		}
	}

	#[tokio::test]
	pub async fn writes_exact_bytes() {
		let mut device = Vec::new();
		send_at_command(&mut device, AtCommand::DeactivateBearer)
			.await
			.expect("Writing to an in memory buffer can't fail!");
		assert_eq!(device, b"AT$QCRMCALL=0,1\r".to_vec());

		send_at_command(&mut device, AtCommand::ActivateBearer)
			.await
			.expect("Writing to an in memory buffer can't fail!");
		assert_eq!(device, b"AT$QCRMCALL=0,1\rAT$QCRMCALL=1,1\r".to_vec());
	}
}
