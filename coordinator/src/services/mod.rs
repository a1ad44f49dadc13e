pub mod silence_service;
pub mod snapshot_service;
pub mod suppression_service;

pub use silence_service::SilenceService;
pub use snapshot_service::SnapshotService;
pub use suppression_service::SuppressionService;
