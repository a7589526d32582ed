#![doc = include_str!("../README.md")]
#![allow(
	// I dislike this rule... We import things elsewhere, usually outside of
	// modules themselves.
	clippy::module_name_repetitions,
)]

pub mod at;
pub mod config;
pub mod errors;
pub mod host;
pub mod procedure;

pub use crate::{
	config::ModemConfig,
	host::{Host, LinuxHost},
	procedure::{disable, dhcp_bootstrap, enable, Procedure, ProcedureFailure, Transcript},
};
