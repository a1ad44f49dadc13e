use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::config::PrometheusConfig;
use crate::errors::{CoordinatorError, PreconditionError, TargetError};
use crate::monitoring::{AlertmanagerClient, MonitoringAction, SilenceUnits, SilenceWindow};
use crate::report::{merge_outcomes, BatchReport, TargetOutcome};

/// Prometheus side of a patch window: one silence per target on
/// `disable`, expiry of this tool's silences on `enable`.
pub struct SilenceService {
    client: AlertmanagerClient,
    window: SilenceWindow,
}

impl SilenceService {
    pub fn new(client: AlertmanagerClient, window: SilenceWindow) -> Self {
        Self { client, window }
    }

    pub fn from_config(
        config: &PrometheusConfig,
        duration: Option<u64>,
        units: Option<&str>,
    ) -> Result<Self, CoordinatorError> {
        let units: SilenceUnits = units.unwrap_or(&config.silence_units).parse()?;
        let window = SilenceWindow {
            duration: duration.unwrap_or(config.silence_duration),
            units,
        };
        window.ends_at(Utc::now())?;
        let client = AlertmanagerClient::new(&config.server, config.port)?;
        Ok(Self::new(client, window))
    }

    pub async fn run(&self, targets: &[String], action: &str) -> Result<BatchReport, CoordinatorError> {
        match action.parse::<MonitoringAction>()? {
            MonitoringAction::Disable => self.silence_targets(targets).await,
            MonitoringAction::Enable => self.remove_silences(targets).await,
        }
    }

    #[instrument(skip_all, fields(targets = targets.len()))]
    pub async fn silence_targets(&self, targets: &[String]) -> Result<BatchReport, CoordinatorError> {
        let starts_at = Utc::now();
        let ends_at = self.window.ends_at(starts_at)?;
        let mut failures = Vec::new();

        for target in targets {
            match self.client.create_silence(target, starts_at, ends_at).await {
                Ok(silence_id) => info!("Silenced {} until {} ({})", target, ends_at, silence_id),
                Err(e) => {
                    warn!("Failed to silence {}: {}", target, e);
                    failures.push(TargetOutcome::failure(
                        target.as_str(),
                        TargetError::ActionFailed {
                            action: "creating silence".to_string(),
                            reason: e.to_string(),
                        },
                    ));
                }
            }
        }

        Ok(merge_outcomes(failures))
    }

    /// Expire active silences created by this tool for any of `targets`.
    #[instrument(skip_all, fields(targets = targets.len()))]
    pub async fn remove_silences(&self, targets: &[String]) -> Result<BatchReport, CoordinatorError> {
        let silences = self
            .client
            .list_silences()
            .await
            .map_err(|e| PreconditionError::SilencesUnavailable {
                reason: e.to_string(),
            })?;
        let mut failures = Vec::new();
        let mut removed = 0;

        for silence in silences.iter().filter(|s| s.is_active_patching_silence()) {
            let Some(alias) = silence.silenced_alias() else {
                continue;
            };
            if !targets.iter().any(|t| t == alias) {
                continue;
            }

            match self.client.delete_silence(&silence.id).await {
                Ok(()) => removed += 1,
                Err(e) => {
                    warn!("Failed to remove silence {} for {}: {}", silence.id, alias, e);
                    failures.push(TargetOutcome::failure(
                        alias,
                        TargetError::ActionFailed {
                            action: format!("removing silence {}", silence.id),
                            reason: e.to_string(),
                        },
                    ));
                }
            }
        }

        info!("Removed {} patching silences", removed);
        Ok(merge_outcomes(failures))
    }
}
