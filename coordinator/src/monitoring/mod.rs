//! Alerting collaborators silenced during a patch window
//!
//! `disable` withholds notifications for the targets, `enable` restores
//! them. Prometheus Alertmanager is driven with time-boxed silences,
//! SolarWinds Orion with node alert suppression.

pub mod alertmanager;
pub mod orion;

use std::fmt;
use std::str::FromStr;

use crate::errors::PreconditionError;

pub use alertmanager::{AlertmanagerClient, SilenceUnits, SilenceWindow};
pub use orion::{OrionClient, OrionNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitoringAction {
    Enable,
    Disable,
}

impl FromStr for MonitoringAction {
    type Err = PreconditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enable" => Ok(MonitoringAction::Enable),
            "disable" => Ok(MonitoringAction::Disable),
            other => Err(PreconditionError::InvalidAction {
                action: other.to_string(),
                expected: "enable or disable",
            }),
        }
    }
}

impl fmt::Display for MonitoringAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitoringAction::Enable => f.write_str("enable"),
            MonitoringAction::Disable => f.write_str("disable"),
        }
    }
}
