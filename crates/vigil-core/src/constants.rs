//! Package-level constants and default tunables.

/// Current version of the vigil monitor (sourced from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name.
pub const NAME: &str = "vigil";

/// Capacity of the fan-in channel between connection readers and the reducer.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Number of entries retained by each bounded activity/violation log.
pub const DEFAULT_LOG_CAPACITY: usize = 50;

/// Interval between client-initiated Ping frames, in seconds.
pub const DEFAULT_HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// How long `close_all` waits for reader tasks to drain before aborting them,
/// in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_semver() {
        let parts: Vec<&str> = VERSION.split('.').collect();
        assert_eq!(parts.len(), 3, "VERSION must be semver (MAJOR.MINOR.PATCH)");
        for part in parts {
            let _: u32 = part.parse().expect("each semver segment must be a number");
        }
    }

    #[test]
    fn name_is_lowercase() {
        assert_eq!(NAME, NAME.to_lowercase());
    }

    #[test]
    fn log_capacity_matches_retention_contract() {
        assert_eq!(DEFAULT_LOG_CAPACITY, 50);
    }
}
