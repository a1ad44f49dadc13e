//! Central repository for configuration defaults and fixed protocol values
//!
//! Organized by collaborator so every timeout, port and limit has a single
//! source of truth.

use std::time::Duration;

/// HTTP helper constants
pub mod http {
    use super::Duration;

    /// Maximum number of redirects followed per request
    pub const REDIRECT_LIMIT: usize = 10;

    /// Timeout for establishing HTTP connections
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Timeout for a single request/response exchange
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
}

/// Virtualization control-plane constants
pub mod vcenter {
    /// Header carrying the session token after login
    pub const SESSION_HEADER: &str = "vmware-api-session-id";

    /// Default upper bound for a single task completion wait
    pub const WAIT_TIMEOUT_SECONDS: u64 = 3600;

    /// Default interval between task status polls
    pub const POLL_INTERVAL_MILLIS: u64 = 2000;

    /// Consecutive failed status polls tolerated before giving up on a task
    pub const MAX_CONSECUTIVE_POLL_FAILURES: u32 = 5;
}

/// Prometheus Alertmanager constants
pub mod prometheus {
    /// Default Alertmanager port
    pub const DEFAULT_PORT: u16 = 9093;

    /// Author recorded on every silence this tool creates
    pub const CREATED_BY: &str = "patching";

    /// Matcher label identifying the silenced host
    pub const MATCHER_LABEL: &str = "alias";

    /// Default silence length, in `DEFAULT_SILENCE_UNITS`
    pub const DEFAULT_SILENCE_DURATION: u64 = 2;

    pub const DEFAULT_SILENCE_UNITS: &str = "hours";
}

/// SolarWinds Orion constants
pub mod solarwinds {
    /// Default SWIS REST port
    pub const DEFAULT_PORT: u16 = 17_778;

    /// Node property compared against non-IP targets
    pub const DEFAULT_NAME_PROPERTY: &str = "DNS";

    /// Entity exposing the suppression verbs
    pub const SUPPRESSION_ENTITY: &str = "Orion.AlertSuppression";
}
