use tracing::{info, instrument, warn};

use crate::config::SolarwindsConfig;
use crate::errors::{CoordinatorError, PreconditionError, RemoteError, TargetError};
use crate::http::TlsPolicy;
use crate::monitoring::{MonitoringAction, OrionClient};
use crate::report::{merge_outcomes, BatchReport, TargetOutcome};

/// SolarWinds side of a patch window: resolve every target to an Orion
/// node, then suppress or resume alerts for all resolved nodes at once.
pub struct SuppressionService {
    client: OrionClient,
    name_property: String,
}

impl SuppressionService {
    pub fn new(client: OrionClient, name_property: impl Into<String>) -> Self {
        Self {
            client,
            name_property: name_property.into(),
        }
    }

    pub fn from_config(config: &SolarwindsConfig) -> Result<Self, CoordinatorError> {
        let client = OrionClient::new(
            &config.host,
            config.port,
            &config.username,
            config.password.as_deref().unwrap_or_default(),
            config.ssl,
            TlsPolicy::from_settings(config.insecure, None),
        )?;
        Ok(Self::new(client, config.name_property.clone()))
    }

    #[instrument(skip(self, targets), fields(targets = targets.len()))]
    pub async fn run(&self, targets: &[String], action: &str) -> Result<BatchReport, CoordinatorError> {
        let action: MonitoringAction = action.parse()?;
        let mut failures = Vec::new();
        let mut resolved: Vec<(&str, String)> = Vec::new();

        for target in targets {
            match self.client.get_node(target, &self.name_property).await {
                Ok(nodes) if nodes.is_empty() => {
                    warn!("No SolarWinds node matches {}", target);
                    failures.push(TargetOutcome::failure(target.as_str(), TargetError::NotFound));
                }
                Ok(mut nodes) if nodes.len() == 1 => {
                    let node = nodes.remove(0);
                    resolved.push((target.as_str(), node.uri));
                }
                Ok(nodes) => {
                    failures.push(TargetOutcome::failure(
                        target.as_str(),
                        TargetError::AmbiguousNode {
                            count: nodes.len(),
                            target: target.clone(),
                        },
                    ));
                }
                Err(RemoteError::AuthenticationFailed { endpoint }) => {
                    return Err(PreconditionError::AuthenticationFailed { endpoint }.into());
                }
                Err(e) => {
                    failures.push(TargetOutcome::failure(
                        target.as_str(),
                        TargetError::LookupFailed {
                            reason: e.to_string(),
                        },
                    ));
                }
            }
        }

        if !resolved.is_empty() {
            let uris: Vec<String> = resolved.iter().map(|(_, uri)| uri.clone()).collect();
            let (verb, result) = match action {
                MonitoringAction::Disable => ("SuppressAlerts", self.client.suppress_alerts(&uris).await),
                MonitoringAction::Enable => ("ResumeAlerts", self.client.resume_alerts(&uris).await),
            };

            match result {
                Ok(_) => info!("{} applied to {} SolarWinds nodes", verb, uris.len()),
                Err(e) => {
                    warn!("{} failed: {}", verb, e);
                    for (target, _) in &resolved {
                        failures.push(TargetOutcome::failure(
                            *target,
                            TargetError::ActionFailed {
                                action: verb.to_string(),
                                reason: e.to_string(),
                            },
                        ));
                    }
                }
            }
        }

        Ok(merge_outcomes(failures))
    }
}
