//! Defines the command line interface a.k.a. all the arguments & flags.

use clap::{builder::NonEmptyStringValueParser, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about, name = "wwanctl", propagate_version = true, version)]
pub struct CliArguments {
	#[arg(
		global = true,
		short = 'c',
		long = "config",
		env = "WWANCTL_CONFIG_PATH",
		help = "The path to the modem configuration file to use.",
		long_help = "The path to the INI file to read the `[MODEM]` section from. If not specified `/etc/wwan.ini` is used, a file that does not exist just means every value is the default."
	)]
	pub config_path: Option<PathBuf>,
	#[command(subcommand)]
	pub commands: Subcommands,
	#[arg(
		global = true,
		long = "device",
		env = "WWANCTL_DEVICE",
		help = "The serial device to write AT commands to.",
		long_help = "The path to the serial device the modem accepts AT commands on, overrides the configuration file (default: `/dev/ttyUSB2`)."
	)]
	pub device: Option<PathBuf>,
	#[arg(
		global = true,
		short = 'i',
		long = "interface",
		env = "WWANCTL_INTERFACE",
		value_parser = NonEmptyStringValueParser::new(),
		help = "The network interface of the modem.",
		long_help = "The name of the network interface the modem exposes, overrides the configuration file (default: `wwan0`)."
	)]
	pub interface: Option<String>,
	#[arg(
		global = true,
		short = 'j',
		long = "json",
		help = "Ensures all logging comes out in JSON instead of text.",
		long_help = "Switch all logging and output to JSON for machine parsable output. NOTE: there is no necissarily guaranteed structure, though we will not break it unnecissarily."
	)]
	pub json: bool,
	#[arg(
		global = true,
		short = 'm',
		long = "module",
		env = "WWANCTL_MODULE",
		value_parser = NonEmptyStringValueParser::new(),
		help = "The kernel module that drives the modem.",
		long_help = "The kernel module that has to be loaded before the modem can be used, overrides the configuration file (default: `simcom_wwan`)."
	)]
	pub module: Option<String>,
}

#[derive(Parser, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subcommands {
	/// Bring the interface up, attach the bearer, and wait for it to settle.
	#[command(name = "enable", visible_alias = "up")]
	Enable {},
	/// Bring the interface down, and detach the bearer.
	#[command(name = "disable", visible_alias = "down")]
	Disable {},
	/// Get a DHCP lease on the interface, and install a default route through it.
	#[command(name = "dhcp")]
	Dhcp {},
}
