#![doc = include_str!("../README.md")]

use miette::{miette, IntoDiagnostic, Result};
use once_cell::sync::Lazy;
use std::{env::var as env_var, io::stderr, sync::Mutex};
use tracing::debug;
use tracing_error::ErrorLayer;
use tracing_subscriber::{
	fmt::layer as tracing_fmt_layer, prelude::*, registry as subscriber_registry, EnvFilter,
};

/// Check if we have actually initialized logging before.
static HAS_INITIALIZED_LOGGING: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(false));

/// Determine if our logger will use ANSI escape codes.
///
/// This line is copied directly from tracing subscriber:
/// <https://github.com/tokio-rs/tracing/blob/07b490067c0e2af61f48a3d2afb85a20ab70ba95/tracing-subscriber/src/fmt/fmt_subscriber.rs#L697>
#[must_use]
pub fn will_ansi() -> bool {
	env_var("NO_COLOR").map_or(true, |v| v.is_empty())
}

/// Install all the logging configuration needed for an application.
///
/// This should only ever be called as the very first part of `main`, and
/// nowhere else. If you try to call it elsewhere, you'll just get am error.
///
/// `default_level` is only used when neither `RUST_LOG`, nor `WWAN_LOGGING`
/// are set.
///
/// See the tracing docs for logging for more information:
/// <https://docs.rs/tracing/latest/tracing/#shorthand-macros>
///
/// # Errors
///
/// - If logging has already been installed.
/// - If the requested filter is not a valid filter directive.
pub fn install_logging_handlers(use_json: bool, default_level: &str) -> Result<()> {
	{
		let mut locked_init = HAS_INITIALIZED_LOGGING
			.lock()
			.map_err(|_| miette!("Install logging handlers called with poisoned mutex?"))?;
		if *locked_init {
			return Err(miette!("Logging has already been initialized!"));
		}
		*locked_init = true;
	}
	let explicit_level = env_var("WWAN_LOGGING").ok();

	let filter_layer = EnvFilter::try_from_default_env().or_else(|_| {
		EnvFilter::try_new(explicit_level.as_deref().unwrap_or(default_level)).into_diagnostic()
	})?;
	let registry = subscriber_registry().with(filter_layer);

	if use_json {
		registry
			.with(tracing_fmt_layer().with_target(true).with_writer(stderr).json())
			.with(ErrorLayer::default())
			.init();
	} else {
		registry
			.with(
				tracing_fmt_layer()
					.with_target(true)
					.with_ansi(will_ansi())
					.with_writer(stderr),
			)
			.with(ErrorLayer::default())
			.init();
	}

	debug!(use_json, ?explicit_level, "installed-logging");
	Ok(())
}
