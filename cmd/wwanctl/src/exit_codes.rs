//! Every exit code `wwanctl` can exit with.
//!
//! A procedure failing is always `1`, no matter which step failed, so scripts
//! written against the flagless tools keep working. Everything else is a
//! problem with `wwanctl` itself, before any procedure was run.

/// A modem procedure ran, and failed.
pub const PROCEDURE_FAILURE: i32 = 1;
/// The command line arguments could not be parsed.
pub const ARGUMENT_PARSING_FAILURE: i32 = 2;
/// We could not set up logging.
pub const LOGGING_HANDLER_INSTALL_FAILURE: i32 = 3;
/// The configuration file exists, but could not be loaded.
pub const CONFIG_LOAD_FAILURE: i32 = 4;
