//! Worker configuration.

use std::time::Duration;

/// Worker configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development. The
/// database URL is read separately in `main` because it has no meaningful
/// default.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Time between sweep passes (default: one hour).
    pub sweep_interval: Duration,
    /// Budget for a single delivery attempt (default: 30 seconds).
    pub delivery_timeout: Duration,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default |
    /// |-------------------------|---------|
    /// | `SWEEP_INTERVAL_SECS`   | `3600`  |
    /// | `DELIVERY_TIMEOUT_SECS` | `30`    |
    pub fn from_env() -> Self {
        let sweep_interval_secs: u64 = std::env::var("SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .expect("SWEEP_INTERVAL_SECS must be a valid u64");

        let delivery_timeout_secs: u64 = std::env::var("DELIVERY_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("DELIVERY_TIMEOUT_SECS must be a valid u64");

        Self {
            sweep_interval: Duration::from_secs(sweep_interval_secs),
            delivery_timeout: Duration::from_secs(delivery_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_missing_env() {
        std::env::remove_var("SWEEP_INTERVAL_SECS");
        std::env::remove_var("DELIVERY_TIMEOUT_SECS");

        let config = WorkerConfig::from_env();
        assert_eq!(config.sweep_interval, Duration::from_secs(3600));
        assert_eq!(config.delivery_timeout, Duration::from_secs(30));
    }
}
