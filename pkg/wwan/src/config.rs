//! Which interface, serial device, and kernel module make up "the modem".
//!
//! Everything has a default matching a SIMCom modem on a stock Linux box, and
//! the names can optionally be overridden from an INI file that looks like:
//!
//! ```ini
//! [MODEM]
//! INTERFACE=wwan0
//! DEVICE=/dev/ttyUSB2
//! MODULE=simcom_wwan
//! ```

use crate::errors::ConfigError;
use configparser::ini::Ini;
use std::{path::PathBuf, time::Duration};
use tracing::debug;

/// The section of the INI file we read the modem configuration from.
const MODEM_SECTION: &str = "MODEM";
/// The key for the network interface name.
const INTERFACE_KEY: &str = "INTERFACE";
/// The key for the serial device path.
const DEVICE_KEY: &str = "DEVICE";
/// The key for the kernel module name.
const MODULE_KEY: &str = "MODULE";

/// The network interface the modem exposes by default.
pub const DEFAULT_INTERFACE: &str = "wwan0";
/// The serial device the modem accepts AT commands on by default.
pub const DEFAULT_DEVICE: &str = "/dev/ttyUSB2";
/// The kernel module that drives the modem by default.
pub const DEFAULT_MODULE: &str = "simcom_wwan";
/// How long we wait after attaching the bearer before claiming success.
pub const ATTACH_GRACE_PERIOD: Duration = Duration::from_secs(5);
/// How many times the DHCP client tries to get a lease before giving up.
pub const LEASE_RETRIES: u32 = 5;

/// The full set of knobs used by the modem procedures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModemConfig {
	/// The name of the network interface, e.g. `wwan0`.
	pub interface: String,
	/// The path to the serial device we write AT commands to.
	pub device: PathBuf,
	/// The kernel module that must be loaded for the modem to work.
	pub module: String,
	/// How long to block after writing the attach command.
	///
	/// This is a fixed grace period, not a poll, nothing is checked after it.
	pub attach_grace: Duration,
	/// The retry budget handed to the DHCP client.
	pub lease_retries: u32,
}

impl ModemConfig {
	/// Attempt to load the modem configuration from an INI file.
	///
	/// A file that doesn't exist is not an error, it just means every value is
	/// the default. Likewise any key not present keeps it's default value.
	///
	/// ## Errors
	///
	/// - If we cannot read from the file on the file system.
	/// - If we cannot parse the data in the file as UTF8.
	/// - If we cannot parse the data as an INI file.
	pub async fn load_explicit_path(path: PathBuf) -> Result<Self, ConfigError> {
		if !path.exists() {
			debug!(path = %path.display(), "no modem configuration file, using defaults");
			return Ok(Self::default());
		}

		let as_bytes = tokio::fs::read(&path).await?;
		let as_string = String::from_utf8(as_bytes)?;
		let mut ini_contents = Ini::new_cs();
		ini_contents
			.read(as_string)
			.map_err(|ini_error| ConfigError::InvalidDataNeedsToBeINI(format!("{ini_error:?}")))?;

		Ok(Self::from_ini(&ini_contents))
	}

	/// Blank values (`INTERFACE=`) are treated the same as a missing key.
	fn from_ini(ini: &Ini) -> Self {
		let mut config = Self::default();
		if let Some(interface) = non_blank(ini, INTERFACE_KEY) {
			config.interface = interface;
		}
		if let Some(device) = non_blank(ini, DEVICE_KEY) {
			config.device = PathBuf::from(device);
		}
		if let Some(module) = non_blank(ini, MODULE_KEY) {
			config.module = module;
		}
		config
	}
}

fn non_blank(ini: &Ini, key: &str) -> Option<String> {
	ini.get(MODEM_SECTION, key)
		.map(|value| value.trim().to_owned())
		.filter(|value| !value.is_empty())
}

impl Default for ModemConfig {
	fn default() -> Self {
		Self {
			interface: DEFAULT_INTERFACE.to_owned(),
			device: PathBuf::from(DEFAULT_DEVICE),
			module: DEFAULT_MODULE.to_owned(),
			attach_grace: ATTACH_GRACE_PERIOD,
			lease_retries: LEASE_RETRIES,
		}
	}
}

#[cfg(test)]
mod unit_tests {
	use super::*;

	#[test]
	pub fn defaults_match_the_simcom_layout() {
		let config = ModemConfig::default();
		assert_eq!(config.interface, "wwan0");
		assert_eq!(config.device, PathBuf::from("/dev/ttyUSB2"));
		assert_eq!(config.module, "simcom_wwan");
		assert_eq!(config.attach_grace, Duration::from_secs(5));
		assert_eq!(config.lease_retries, 5);
	}

	#[tokio::test]
	pub async fn missing_file_is_defaults() {
		let dir = tempfile::tempdir().expect("Failed to create temporary directory!");
		let mut path = dir.path().to_path_buf();
		path.push("does-not-exist.ini");

		assert_eq!(
			ModemConfig::load_explicit_path(path)
				.await
				.expect("A missing configuration file should not be an error!"),
			ModemConfig::default(),
		);
	}

	#[tokio::test]
	pub async fn partial_file_keeps_other_defaults() {
		let dir = tempfile::tempdir().expect("Failed to create temporary directory!");
		let mut path = dir.path().to_path_buf();
		path.push("wwan.ini");
		tokio::fs::write(&path, "[MODEM]\nDEVICE=/dev/ttyUSB3\n")
			.await
			.expect("Failed to write test configuration file!");

		let config = ModemConfig::load_explicit_path(path)
			.await
			.expect("Failed to load a valid configuration file!");
		assert_eq!(config.device, PathBuf::from("/dev/ttyUSB3"));
		assert_eq!(config.interface, DEFAULT_INTERFACE);
		assert_eq!(config.module, DEFAULT_MODULE);
		assert_eq!(config.attach_grace, ATTACH_GRACE_PERIOD);
	}

	#[tokio::test]
	pub async fn blank_values_keep_defaults() {
		let dir = tempfile::tempdir().expect("Failed to create temporary directory!");
		let mut path = dir.path().to_path_buf();
		path.push("wwan.ini");
		tokio::fs::write(&path, "[MODEM]\nINTERFACE=\nMODULE=   \nDEVICE=/dev/ttyUSB3\n")
			.await
			.expect("Failed to write test configuration file!");

		let config = ModemConfig::load_explicit_path(path)
			.await
			.expect("Failed to load a valid configuration file!");
		assert_eq!(
			config.interface, DEFAULT_INTERFACE,
			"An empty INTERFACE replaced the default!"
		);
		assert_eq!(config.module, DEFAULT_MODULE);
		assert_eq!(config.device, PathBuf::from("/dev/ttyUSB3"));
	}

	#[tokio::test]
	pub async fn full_file_overrides_names() {
		let dir = tempfile::tempdir().expect("Failed to create temporary directory!");
		let mut path = dir.path().to_path_buf();
		path.push("wwan.ini");
		tokio::fs::write(
			&path,
			"[MODEM]\r\nINTERFACE=wwan1\r\nDEVICE=/dev/ttyACM0\r\nMODULE=qmi_wwan\r\n",
		)
		.await
		.expect("Failed to write test configuration file!");

		let config = ModemConfig::load_explicit_path(path)
			.await
			.expect("Failed to load a valid configuration file!");
		assert_eq!(config.interface, "wwan1");
		assert_eq!(config.device, PathBuf::from("/dev/ttyACM0"));
		assert_eq!(config.module, "qmi_wwan");
	}

	#[tokio::test]
	pub async fn non_utf8_file_is_an_error() {
		let dir = tempfile::tempdir().expect("Failed to create temporary directory!");
		let mut path = dir.path().to_path_buf();
		path.push("wwan.ini");
		tokio::fs::write(&path, [0xff_u8, 0xfe, 0x00, 0x5b])
			.await
			.expect("Failed to write test configuration file!");

		assert!(matches!(
			ModemConfig::load_explicit_path(path).await,
			Err(ConfigError::InvalidDataNeedsUTF8(_)),
		));
	}
}
