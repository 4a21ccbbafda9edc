//! Stderr logging bootstrap.
//!
//! Level comes from `--log-level` when given, otherwise from `RUST_LOG`,
//! otherwise `info`. Stdout stays reserved for `--json` output.

use flexi_logger::{Logger, LoggerHandle};

const DEFAULT_LEVEL: &str = "info";

/// Start the logger. The returned handle must live until the process exits.
pub fn init_logging(level: Option<&str>) -> Result<LoggerHandle, String> {
    let logger = match level {
        Some(level) => Logger::try_with_str(normalize_level(level)?),
        None => Logger::try_with_env_or_str(DEFAULT_LEVEL),
    }
    .map_err(|err| format!("invalid log specification: {err}"))?;

    logger
        .log_to_stderr()
        .format(flexi_logger::default_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))
}

fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        "off" | "quiet" => Ok("off"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error|off"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_normalized() {
        assert_eq!(normalize_level(" WARNING ").unwrap(), "warn");
        assert_eq!(normalize_level("Debug").unwrap(), "debug");
        assert_eq!(normalize_level("quiet").unwrap(), "off");
    }

    #[test]
    fn unknown_level_is_rejected() {
        let err = normalize_level("loud").unwrap_err();
        assert!(err.contains("unsupported log level `loud`"));
    }
}
