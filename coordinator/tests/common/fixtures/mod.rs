//! This module provides reusable test utilities:
//! - In-memory virtualization control plane
//! - Mock HTTP servers (vCenter REST, Alertmanager, Orion)
//! - Test configuration builders
//! - Common test data

// Each test binary uses a different subset of the fixtures
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod mock_alertmanager;
pub mod mock_orion;
pub mod mock_vcenter;
pub mod test_config;
pub mod test_data;

// Re-export commonly used items
pub use fake_vcenter::{Call, FakeVcenter};
pub use mock_alertmanager::MockAlertmanagerServer;
pub use mock_orion::MockOrionServer;
pub use mock_vcenter::MockVcenterServer;
pub use test_config::TestConfigBuilder;
pub use test_data::*;
