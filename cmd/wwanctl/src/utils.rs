//! Utility functions that don't have one place that they should live.

use crate::{exit_codes::CONFIG_LOAD_FAILURE, knobs::cli::CliArguments};
use miette::{miette, Report};
use std::path::PathBuf;
use tracing::error;
use wwan::ModemConfig;

/// Where we look for the modem configuration file when not told otherwise.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/wwan.ini";

/// Add context to a specific error, where you can have like a list of
/// suggestions.
///
/// NOTE: we cannot reassign a reports severity, so your last items severity
///       is where the real severity gets taken.
pub fn add_context_to(
	original_error: Report,
	suggestions: impl DoubleEndedIterator<Item = Report>,
) -> Report {
	let mut latest_error: Option<Report> = None;

	for suggestion in suggestions.rev() {
		if let Some(last_error) = latest_error {
			latest_error = Some(last_error.wrap_err(suggestion));
		} else {
			latest_error = Some(suggestion);
		}
	}

	if let Some(latest) = latest_error {
		latest.wrap_err(original_error)
	} else {
		original_error
	}
}

/// Load the modem configuration, and layer any command line/environment
/// overrides on top of it.
///
/// ## Panics
///
/// If the configuration file exists, but could not be loaded.
pub async fn load_modem_config(argv: &CliArguments, use_json: bool) -> ModemConfig {
	let config_path = argv
		.config_path
		.clone()
		.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

	let mut config = match ModemConfig::load_explicit_path(config_path.clone()).await {
		Ok(config) => config,
		Err(cause) => {
			if use_json {
				error!(
					id = "wwanctl::cli::cannot_load_config",
					?cause,
					config_path = %config_path.display(),
					"failed to load modem configuration file",
				);
			} else {
				error!(
					"\n{:?}",
					add_context_to(
						miette!("Cannot load the modem configuration file!"),
						[
							Report::new(cause),
							miette!(
								help = format!(
									"Configuration file is located at: {}",
									config_path.display()
								),
								"You can point at a different file with `--config`, or `WWANCTL_CONFIG_PATH`.",
							),
						]
						.into_iter(),
					),
				);
			}

			std::process::exit(CONFIG_LOAD_FAILURE);
		}
	};

	apply_overrides(&mut config, argv);
	config
}

/// Overwrite any names in the configuration that were passed as flags (or
/// through their environment variables).
fn apply_overrides(config: &mut ModemConfig, argv: &CliArguments) {
	if let Some(interface) = argv.interface.as_ref() {
		config.interface.clone_from(interface);
	}
	if let Some(device) = argv.device.as_ref() {
		config.device.clone_from(device);
	}
	if let Some(module) = argv.module.as_ref() {
		config.module.clone_from(module);
	}
}
