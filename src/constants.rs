// src/constants.rs

/// Exit code returned when a token list cannot be resolved, the resolved
/// action is not invokable, or the action reports failure.
pub const DEFAULT_FAILURE_EXIT_CODE: i32 = -1;

/// Suffix dropped from a handler's type name when deriving its command name.
pub const COMMAND_TYPE_SUFFIX: &str = "Command";

/// Prefix placed in front of a hyphen-style long option to negate a switch.
pub const NEGATION_PREFIX: &str = "no-";

/// Environment variable that overrides the configured convention family.
pub const CONVENTIONS_ENV_VAR: &str = "CMDLET_CONVENTIONS";

/// Environment variable that disables coloured output when set.
pub const NO_COLOR_ENV_VAR: &str = "NO_COLOR";

/// Default filter used by [`crate::core::logger::init_env_logger`] when
/// `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "warn";
