/// Binary-level configuration, read once at startup. Follows the same
/// `from_env()`-per-config-struct convention as
/// `martlock_scheduler::SchedulerConfig::from_env`.
#[derive(Debug, Clone)]
pub struct ReplicatorConfig {
    /// `MARTLOCK_LOG`: a `tracing_subscriber::EnvFilter` directive, default `info`.
    pub log_filter: String,
    /// `MARTLOCK_LOCK_WAIT_MS`: surfaced here only for the startup log line;
    /// the scheduler reads the same variable itself via
    /// `SchedulerConfig::from_env`.
    pub lock_wait_ms: Option<i64>,
}

impl ReplicatorConfig {
    pub fn from_env() -> Self {
        Self {
            log_filter: std::env::var("MARTLOCK_LOG").unwrap_or_else(|_| "info".to_string()),
            lock_wait_ms: std::env::var("MARTLOCK_LOCK_WAIT_MS")
                .ok()
                .and_then(|raw| raw.parse().ok()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_log_filter_is_info_when_env_var_absent() {
        std::env::remove_var("MARTLOCK_LOG");
        assert_eq!(ReplicatorConfig::from_env().log_filter, "info");
    }
}
