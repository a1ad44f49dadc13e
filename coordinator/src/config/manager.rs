use super::{Config, Secrets, TargetGroup};
use anyhow::{anyhow, Result};
use glob::glob;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};

const MAIN_CONFIG_FILE: &str = "main.toml";
const SECRETS_FILE: &str = "secrets.toml";

pub struct ConfigManager {
    current_config: Arc<Config>,
}

impl ConfigManager {
    pub async fn new(config_dir: String) -> Result<Self> {
        let config = Self::load_configuration(&config_dir).await?;
        Ok(Self {
            current_config: Arc::new(config),
        })
    }

    pub fn get_current_config(&self) -> Arc<Config> {
        self.current_config.clone()
    }

    /// Combine the targets of `group` (if given) with `explicit` targets,
    /// group members first. Duplicates are kept.
    pub fn resolve_targets(&self, group: Option<&str>, explicit: &[String]) -> Result<Vec<String>> {
        let mut targets = Vec::new();

        if let Some(group_name) = group {
            let group = self
                .current_config
                .groups
                .get(group_name)
                .ok_or_else(|| anyhow!("Target group '{}' not found", group_name))?;
            targets.extend(group.targets.iter().cloned());
        }

        targets.extend(explicit.iter().cloned());

        if targets.is_empty() {
            return Err(anyhow!("No targets given"));
        }

        Ok(targets)
    }

    async fn load_configuration(config_dir: &str) -> Result<Config> {
        let main_config_path = format!("{}/{}", config_dir, MAIN_CONFIG_FILE);
        let main_config_content = fs::read_to_string(&main_config_path)
            .await
            .map_err(|e| anyhow!("Failed to read main config {}: {}", main_config_path, e))?;

        let mut config: Config = toml::from_str(&main_config_content)
            .map_err(|e| anyhow!("Failed to parse main config: {}", e))?;

        let secrets = Secrets::read(&Path::new(config_dir).join(SECRETS_FILE)).await?;
        let missing = secrets.fill_passwords(&mut config);
        if !missing.is_empty() {
            warn!("No password configured for: {}", missing.join(", "));
        }

        // Every other TOML file is a target group named after its stem
        let pattern = format!("{}/*.toml", config_dir);
        let mut groups = HashMap::new();

        for entry in glob(&pattern).map_err(|e| anyhow!("Glob pattern error: {}", e))? {
            let path = entry.map_err(|e| anyhow!("Glob entry error: {}", e))?;
            let filename = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| anyhow!("Invalid filename"))?;

            if filename == MAIN_CONFIG_FILE || filename == SECRETS_FILE {
                continue;
            }

            let group_name = filename
                .strip_suffix(".toml")
                .ok_or_else(|| anyhow!("Invalid config filename: {}", filename))?;

            debug!("Loading target group: {}", path.display());

            let content = fs::read_to_string(&path)
                .await
                .map_err(|e| anyhow!("Failed to read {}: {}", path.display(), e))?;

            let group: TargetGroup = toml::from_str(&content)
                .map_err(|e| anyhow!("Failed to parse {}: {}", path.display(), e))?;

            groups.insert(group_name.to_string(), group);
        }

        config.groups = groups;

        info!(
            "Loaded {} target groups (vcenter: {}, prometheus: {}, solarwinds: {})",
            config.groups.len(),
            config.vcenter.is_some(),
            config.prometheus.is_some(),
            config.solarwinds.is_some()
        );

        Ok(config)
    }
}
