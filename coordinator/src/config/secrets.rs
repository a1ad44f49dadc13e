//! Control-plane passwords kept out of `main.toml`.
//!
//! `secrets.toml` sits next to `main.toml` and holds one `[passwords]` table
//! keyed by config section:
//!
//! ```toml
//! [passwords]
//! vcenter = "vcenter-password"
//! solarwinds = "orion-password"
//! ```
//!
//! A password set inline in `main.toml` takes precedence. Sections that end
//! up with no password at all are reported back to the config manager.

use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

use super::Config;

const VCENTER: &str = "vcenter";
const SOLARWINDS: &str = "solarwinds";

#[derive(Debug, Default, Deserialize)]
struct PasswordTable {
    #[serde(default)]
    passwords: HashMap<String, String>,
}

/// Passwords keyed by the config section they belong to
#[derive(Debug, Default)]
pub struct Secrets {
    passwords: HashMap<String, String>,
}

impl Secrets {
    /// Read `path`; an absent file yields no secrets.
    pub async fn read(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No secrets file at {}", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(anyhow!("Failed to read {}: {}", path.display(), e)),
        };

        Self::parse(&content).map_err(|e| anyhow!("Failed to parse {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let table: PasswordTable = toml::from_str(content)?;

        for section in table.passwords.keys() {
            if section != VCENTER && section != SOLARWINDS {
                warn!("Ignoring password for unknown section '{}'", section);
            }
        }

        Ok(Self {
            passwords: table.passwords,
        })
    }

    /// Fill every configured section that has no inline password. Returns
    /// the sections still left without one.
    pub fn fill_passwords(&self, config: &mut Config) -> Vec<&'static str> {
        let mut missing = Vec::new();

        if let Some(vcenter) = config.vcenter.as_mut() {
            if !self.fill(VCENTER, &mut vcenter.password) {
                missing.push(VCENTER);
            }
        }
        if let Some(solarwinds) = config.solarwinds.as_mut() {
            if !self.fill(SOLARWINDS, &mut solarwinds.password) {
                missing.push(SOLARWINDS);
            }
        }

        missing
    }

    fn fill(&self, section: &str, password: &mut Option<String>) -> bool {
        if password.is_none() {
            *password = self.passwords.get(section).cloned();
            if password.is_some() {
                debug!("Using {} password from secrets file", section);
            }
        }
        password.is_some()
    }
}
