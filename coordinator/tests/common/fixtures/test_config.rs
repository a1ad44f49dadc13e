//! Test configuration builder for creating config directories on disk

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestConfigBuilder {
    temp_dir: TempDir,
    main_toml: String,
    secrets_toml: Option<String>,
    groups: BTreeMap<String, Vec<String>>,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self {
            temp_dir,
            main_toml: String::new(),
            secrets_toml: None,
            groups: BTreeMap::new(),
        }
    }

    pub fn with_vcenter(mut self, host: &str, datacenter: &str, password: Option<&str>) -> Self {
        self.main_toml.push_str(&format!(
            "[vcenter]\nhost = \"{}\"\nusername = \"administrator\"\ndatacenter = \"{}\"\n",
            host, datacenter
        ));
        if let Some(password) = password {
            self.main_toml.push_str(&format!("password = \"{}\"\n", password));
        }
        self.main_toml.push('\n');
        self
    }

    pub fn with_prometheus(mut self, server: &str) -> Self {
        self.main_toml
            .push_str(&format!("[prometheus]\nserver = \"{}\"\n\n", server));
        self
    }

    pub fn with_solarwinds(mut self, host: &str) -> Self {
        self.main_toml.push_str(&format!(
            "[solarwinds]\nhost = \"{}\"\nusername = \"orion-user\"\n\n",
            host
        ));
        self
    }

    /// Append raw TOML to main.toml
    pub fn with_raw_main(mut self, toml: &str) -> Self {
        self.main_toml.push_str(toml);
        self.main_toml.push('\n');
        self
    }

    pub fn with_secrets(mut self, toml: &str) -> Self {
        self.secrets_toml = Some(toml.to_string());
        self
    }

    pub fn with_group(mut self, name: &str, targets: &[&str]) -> Self {
        self.groups.insert(
            name.to_string(),
            targets.iter().map(|t| t.to_string()).collect(),
        );
        self
    }

    pub fn build(self) -> TestConfig {
        let config_dir = self.temp_dir.path().join("config");
        fs::create_dir_all(&config_dir).expect("Failed to create config dir");

        fs::write(config_dir.join("main.toml"), &self.main_toml).expect("Failed to write main.toml");

        if let Some(secrets) = &self.secrets_toml {
            fs::write(config_dir.join("secrets.toml"), secrets).expect("Failed to write secrets.toml");
        }

        for (name, targets) in &self.groups {
            let quoted: Vec<String> = targets.iter().map(|t| format!("\"{}\"", t)).collect();
            let content = format!("targets = [{}]\n", quoted.join(", "));
            fs::write(config_dir.join(format!("{}.toml", name)), content)
                .expect("Failed to write group config");
        }

        TestConfig {
            _temp_dir: self.temp_dir,
            config_dir,
        }
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Config directory that lives as long as this value
pub struct TestConfig {
    _temp_dir: TempDir,
    pub config_dir: PathBuf,
}

impl TestConfig {
    pub fn config_dir_string(&self) -> String {
        self.config_dir.to_string_lossy().to_string()
    }
}
