//! Error types for the patch-window coordinator
//!
//! Two classes of failure exist. Precondition failures abort a whole batch
//! before any target is touched and are returned to the caller as errors.
//! Target failures are scoped to one target; the orchestrators convert them
//! into report entries and keep going.

use std::fmt;
use std::time::Duration;

/// Main error type returned by batch entry points
#[derive(Debug)]
pub enum CoordinatorError {
    /// Configuration-related errors
    Config(ConfigError),

    /// The batch could not start
    Precondition(PreconditionError),

    /// Remote call failed outside of any per-target step
    Remote(RemoteError),

    /// Other errors with context
    Other(String),
}

/// Configuration error variants
#[derive(Debug)]
pub enum ConfigError {
    /// Missing required configuration
    MissingRequired { field: String },

    /// Invalid configuration value
    InvalidValue { field: String, reason: String },
}

/// Failures that abort a batch before any target-level work
#[derive(Debug, Clone, PartialEq)]
pub enum PreconditionError {
    /// Action string is not one of the accepted values
    InvalidAction { action: String, expected: &'static str },

    /// Silence duration unit is not recognized
    InvalidUnits { units: String },

    /// Silence window too long to express as an end timestamp
    InvalidDuration { duration: u64, units: String },

    /// Control plane rejected the credentials
    AuthenticationFailed { endpoint: String },

    /// Configured datacenter does not exist
    DatacenterNotFound { datacenter: String },

    /// VM inventory of the datacenter could not be fetched
    InventoryUnavailable { datacenter: String, reason: String },

    /// Existing silences could not be listed
    SilencesUnavailable { reason: String },
}

/// Per-target failures; `Display` output is the report's details text
#[derive(Debug, Clone, PartialEq)]
pub enum TargetError {
    /// Target is absent from the fetched inventory
    NotFound,

    /// More than one snapshot carries the requested name
    AmbiguousSnapshot { snapshot_name: String, count: usize },

    /// Control plane refused the mutation at submission time
    SubmissionFailed { operation: &'static str, reason: String },

    /// Accepted task finished in a failed state
    CompletionFailed { task_id: String, reason: String },

    /// Task did not reach a terminal state in time
    CompletionTimeout { task_id: String, timeout: Duration },

    /// Monitoring lookup for the target failed
    LookupFailed { reason: String },

    /// Monitoring lookup matched several nodes
    AmbiguousNode { count: usize, target: String },

    /// Monitoring mutation for the target was rejected
    ActionFailed { action: String, reason: String },
}

/// Errors raised by remote control-plane clients
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteError {
    /// Endpoint unreachable or transport failure
    ConnectionFailed { endpoint: String, reason: String },

    /// Credentials rejected
    AuthenticationFailed { endpoint: String },

    /// Requested scope (datacenter) does not exist
    ScopeNotFound { scope: String },

    /// Non-success HTTP status
    Rejected {
        url: String,
        status: u16,
        message: String,
    },

    /// Response body could not be interpreted
    InvalidResponse { endpoint: String, reason: String },

    /// Asynchronous task reported failure
    TaskFailed { task_id: String, message: String },
}

impl fmt::Display for CoordinatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinatorError::Config(e) => write!(f, "Configuration error: {}", e),
            CoordinatorError::Precondition(e) => write!(f, "Precondition failed: {}", e),
            CoordinatorError::Remote(e) => write!(f, "Remote error: {}", e),
            CoordinatorError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingRequired { field } => {
                write!(f, "Missing required field: {}", field)
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl fmt::Display for PreconditionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreconditionError::InvalidAction { action, expected } => {
                write!(
                    f,
                    "{} is an invalid action. Please choose from {}",
                    action, expected
                )
            }
            PreconditionError::InvalidUnits { units } => {
                write!(
                    f,
                    "{} is an invalid silence unit. Please choose from minutes, hours, days or weeks",
                    units
                )
            }
            PreconditionError::InvalidDuration { duration, units } => {
                write!(f, "A silence of {} {} does not fit in a timestamp", duration, units)
            }
            PreconditionError::AuthenticationFailed { endpoint } => {
                write!(f, "Authentication failed for {}", endpoint)
            }
            PreconditionError::DatacenterNotFound { datacenter } => {
                write!(f, "Could not find datacenter with name: {}", datacenter)
            }
            PreconditionError::InventoryUnavailable { datacenter, reason } => {
                write!(
                    f,
                    "Could not fetch inventory of datacenter {}: {}",
                    datacenter, reason
                )
            }
            PreconditionError::SilencesUnavailable { reason } => {
                write!(f, "Could not list existing silences: {}", reason)
            }
        }
    }
}

impl fmt::Display for TargetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetError::NotFound => write!(f, "could not find target"),
            TargetError::AmbiguousSnapshot {
                snapshot_name,
                count,
            } => {
                write!(
                    f,
                    "ambiguous snapshot name: there are {} snapshots with the name {}, remediate this or choose a different name before continuing",
                    count, snapshot_name
                )
            }
            TargetError::SubmissionFailed { operation, reason } => {
                write!(f, "{} snapshot failed with error: {}", operation, reason)
            }
            TargetError::CompletionFailed { task_id, reason } => {
                write!(f, "task {} failed: {}", task_id, reason)
            }
            TargetError::CompletionTimeout { task_id, timeout } => {
                write!(
                    f,
                    "timed out after {}s waiting for task {}",
                    timeout.as_secs(),
                    task_id
                )
            }
            TargetError::LookupFailed { reason } => write!(f, "lookup failed: {}", reason),
            TargetError::AmbiguousNode { count, target } => {
                write!(f, "found {} nodes matching '{}'", count, target)
            }
            TargetError::ActionFailed { action, reason } => {
                write!(f, "{} failed: {}", action, reason)
            }
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::ConnectionFailed { endpoint, reason } => {
                write!(f, "Connection to {} failed: {}", endpoint, reason)
            }
            RemoteError::AuthenticationFailed { endpoint } => {
                write!(f, "Authentication failed for {}", endpoint)
            }
            RemoteError::ScopeNotFound { scope } => write!(f, "Scope '{}' not found", scope),
            RemoteError::Rejected { url, message, .. } => {
                write!(f, "Request to {} rejected: {}", url, message)
            }
            RemoteError::InvalidResponse { endpoint, reason } => {
                write!(f, "Invalid response from {}: {}", endpoint, reason)
            }
            RemoteError::TaskFailed { task_id, message } => {
                write!(f, "Task {} failed: {}", task_id, message)
            }
        }
    }
}

impl std::error::Error for CoordinatorError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for PreconditionError {}
impl std::error::Error for TargetError {}
impl std::error::Error for RemoteError {}

impl From<anyhow::Error> for CoordinatorError {
    fn from(err: anyhow::Error) -> Self {
        CoordinatorError::Other(err.to_string())
    }
}

impl From<ConfigError> for CoordinatorError {
    fn from(err: ConfigError) -> Self {
        CoordinatorError::Config(err)
    }
}

impl From<PreconditionError> for CoordinatorError {
    fn from(err: PreconditionError) -> Self {
        CoordinatorError::Precondition(err)
    }
}

impl From<RemoteError> for CoordinatorError {
    fn from(err: RemoteError) -> Self {
        CoordinatorError::Remote(err)
    }
}

impl RemoteError {
    /// Text used when the error ends up in a report entry
    pub fn detail(&self) -> String {
        match self {
            RemoteError::TaskFailed { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
