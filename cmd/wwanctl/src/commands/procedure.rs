//! Running one of the modem procedures, and reporting how it went.

use crate::exit_codes::PROCEDURE_FAILURE;
use miette::Report;
use tracing::{error, info};
use wwan::{
	disable, dhcp_bootstrap, enable, LinuxHost, ModemConfig, Procedure, ProcedureFailure, Transcript,
};

/// Run a procedure against the real host.
///
/// The `[+]`/`[!]` line always goes to stdout exactly like the flagless tools.
/// Everything else is logged to stderr: the full diagnostic on failure in text
/// mode, or a structured record of every step in JSON mode.
///
/// ## Panics
///
/// If the procedure fails, this exits the process.
pub async fn handle_procedure(use_json: bool, procedure: Procedure, config: ModemConfig) {
	let host = LinuxHost::new();
	info!(
		%procedure,
		interface = %config.interface,
		device = %config.device.display(),
		module = %config.module,
		"running procedure",
	);

	let result = match procedure {
		Procedure::Enable => enable(&host, &config).await,
		Procedure::Disable => disable(&host, &config).await,
		Procedure::DhcpBootstrap => dhcp_bootstrap(&host, &config).await,
	};

	println!("{}", status_line(procedure, &result));

	match result {
		Ok(transcript) => {
			if use_json {
				info!(
					id = %format!("wwanctl::{procedure}::success"),
					steps = ?transcript.steps(),
					message = procedure.success_message(),
					"procedure succeeded",
				);
			}
		}
		Err(failure) => {
			if use_json {
				error!(
					id = %format!("wwanctl::{procedure}::failure"),
					step = %failure.step,
					cause = %failure.cause,
					compensated = failure.transcript.compensated(),
					steps = ?failure.transcript.records(),
					"procedure failed",
				);
			} else {
				error!("\n{:?}", Report::new(failure));
			}

			std::process::exit(PROCEDURE_FAILURE);
		}
	}
}

/// The single line reported on stdout for how a procedure went.
fn status_line(procedure: Procedure, result: &Result<Transcript, ProcedureFailure>) -> String {
	match result {
		Ok(_) => procedure.success_line(),
		Err(failure) => failure.status_line(),
	}
}
