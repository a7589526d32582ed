#![allow(
	// I've always disliked this rule, most of the time imports are used WITHOUT
	// the module name, and the module name is only used in the top level import.
	//
	// Where this becomes significantly more helpful to read as it's out of
	// context.
	clippy::module_name_repetitions,
)]

pub mod commands;
pub mod exit_codes;
pub mod knobs;
pub mod utils;

use crate::{
	commands::handle_procedure,
	exit_codes::{ARGUMENT_PARSING_FAILURE, LOGGING_HANDLER_INSTALL_FAILURE},
	knobs::{
		cli::{CliArguments, Subcommands},
		env::USE_JSON_OUTPUT,
	},
	utils::load_modem_config,
};
use clap::{error::ErrorKind as ClapErrorKind, Parser};
use log::install_logging_handlers;
use miette::miette;
use tracing::error;
use wwan::Procedure;

#[tokio::main(flavor = "current_thread")]
async fn main() {
	let (argv, use_json) = bootstrap_cli();
	let config = load_modem_config(&argv, use_json).await;

	let procedure = match argv.commands {
		Subcommands::Enable {} => Procedure::Enable,
		Subcommands::Disable {} => Procedure::Disable,
		Subcommands::Dhcp {} => Procedure::DhcpBootstrap,
	};
	handle_procedure(use_json, procedure, config).await;
}

fn bootstrap_cli() -> (CliArguments, bool) {
	let args_opt = CliArguments::try_parse();
	if let Err(cause) = args_opt.as_ref() {
		// Not actually failures, let clap print them.
		if matches!(
			cause.kind(),
			ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion
		) {
			cause.exit();
		}
	}

	let use_json_cli = args_opt.as_ref().map_or_else(
		|_error| {
			// Try to identify if the user is wanting to use JSON.
			std::env::args().any(|arg| arg.as_str() == "-j" || arg.as_str() == "--json")
		},
		|args| args.json,
	);
	let use_json = *USE_JSON_OUTPUT || use_json_cli;

	if let Err(cause) = install_logging_handlers(use_json, "info") {
		// We have to use a custom panic script here, because logging isn't setup yet.
		if use_json {
			println!(
				r#"{{"id": "wwanctl::logging::install_failure", "inner_display_error": "{}", "message": "Failed to install the logging handlers!"}}"#,
				format!("{cause:?}").replace('"', "\\\"")
			);
		} else {
			println!("Failed to install the logging handler to setup logging:\n{cause:?}");
		}
		std::process::exit(LOGGING_HANDLER_INSTALL_FAILURE);
	}

	match args_opt {
		Ok(args) => (args, use_json),
		Err(cause) => {
			if use_json {
				error!(
					id = "wwanctl::cli::arg_parse_failure",
					error.kind = %cause.kind(),
					error.context = ?cause.context().map(|(kind, value)| format!("{kind}: {value}")).collect::<Vec<String>>(),
					error.rendered = %cause.render(),
					"Failed parsing CLI arguments"
				);
			} else {
				error!(
					"\n{:?}",
					miette!("Failed parsing CLI arguments!").wrap_err(cause),
				);
			}

			std::process::exit(ARGUMENT_PARSING_FAILURE);
		}
	}
}
