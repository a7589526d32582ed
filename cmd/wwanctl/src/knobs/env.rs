//! The list of environment variables that influence behavior for `wwanctl`.
//!
//! The modem names (`WWANCTL_INTERFACE`, `WWANCTL_DEVICE`, `WWANCTL_MODULE`),
//! and `WWANCTL_CONFIG_PATH` are read by the argument parser directly, see
//! [`crate::knobs::cli`].

use once_cell::sync::Lazy;
use std::env::var as env_var;

/// Another way of configuring `wwanctl` to output it's data in JSON.
///
/// Environment Variable Name: `WWANCTL_OUTPUT_JSON`
/// Expected Values: ("1" or "0"), and ("true" or "false")
/// Type: Boolean
pub static USE_JSON_OUTPUT: Lazy<bool> =
	Lazy::new(|| env_var("WWANCTL_OUTPUT_JSON").map_or(false, |var| var == "1" || var == "true"));
