pub mod config;
pub mod constants;
pub mod errors;
pub mod http;
pub mod monitoring;
pub mod report;
pub mod services;
pub mod snapshot;

// Re-export commonly used types
pub use config::{Config, ConfigManager};
pub use errors::{CoordinatorError, PreconditionError, RemoteError, TargetError};
pub use http::VcenterClient;
pub use report::{merge_outcomes, BatchReport, TargetOutcome};
pub use services::{SilenceService, SnapshotService, SuppressionService};
pub use snapshot::{SnapshotAction, SnapshotParams, VirtualizationClient};
