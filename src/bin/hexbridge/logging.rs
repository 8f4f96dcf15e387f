use std::env;

const BRIDGE_LOG_ENV: &str = "HEXBRIDGE_LOG";

const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Installs a stderr subscriber when `RUST_LOG` or `HEXBRIDGE_LOG` asks for one.
///
/// Stdout carries `--json` events only.
pub fn init_tracing() {
    let Some(filter) = log_filter(env::var("RUST_LOG").ok(), env::var(BRIDGE_LOG_ENV).ok())
    else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

/// `RUST_LOG` wins when non-empty. Otherwise a set `HEXBRIDGE_LOG` enables the bridge's
/// own modules, at its value when that names a level and at `debug` otherwise.
fn log_filter(rust_log: Option<String>, bridge_log: Option<String>) -> Option<String> {
    if let Some(filter) = rust_log.filter(|s| !s.trim().is_empty()) {
        return Some(filter);
    }
    let level = bridge_log?.trim().to_ascii_lowercase();
    let level = if LEVELS.contains(&level.as_str()) {
        level
    } else {
        "debug".to_string()
    };
    Some(format!("hexbridge={level}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_logging_is_off_by_default() {
        assert_eq!(log_filter(None, None), None);
        assert_eq!(log_filter(some("  "), None), None);
    }

    #[test]
    fn test_rust_log_takes_precedence() {
        assert_eq!(log_filter(some("warn"), some("trace")), some("warn"));
    }

    #[test]
    fn test_bridge_log_scopes_to_bridge_modules() {
        assert_eq!(log_filter(None, some("TRACE")), some("hexbridge=trace"));
        assert_eq!(log_filter(None, some("")), some("hexbridge=debug"));
        assert_eq!(log_filter(None, some("1")), some("hexbridge=debug"));
        assert_eq!(log_filter(some(""), some("warn")), some("hexbridge=warn"));
    }
}
