use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use coordinator::config::VcenterConfig;
use coordinator::errors::ConfigError;
use coordinator::{
    BatchReport, ConfigManager, SilenceService, SnapshotParams, SnapshotService,
    SuppressionService, VcenterClient,
};

#[derive(Parser)]
#[command(name = "coordinator")]
#[command(about = "Patch window side-effects: VM snapshots and alert silencing")]
#[command(version)]
struct Args {
    /// Directory holding main.toml, secrets.toml and target groups
    #[arg(long, default_value = "config", global = true)]
    config_dir: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create or delete a named snapshot on every target VM
    Snapshot {
        #[command(flatten)]
        targets: TargetArgs,
        /// create or delete
        #[arg(long, default_value = "create")]
        action: String,
        #[arg(long)]
        snapshot_name: String,
        #[arg(long)]
        description: Option<String>,
        /// Include VM memory in the snapshot
        #[arg(long)]
        memory: bool,
        /// Quiesce guest file systems before the snapshot
        #[arg(long)]
        quiesce: bool,
    },
    /// Enable or disable alerting for the targets
    Monitoring {
        #[command(subcommand)]
        backend: MonitoringBackend,
    },
}

#[derive(Subcommand)]
enum MonitoringBackend {
    /// Alertmanager silences
    Prometheus {
        #[command(flatten)]
        targets: TargetArgs,
        /// enable or disable
        #[arg(long)]
        action: String,
        #[arg(long)]
        duration: Option<u64>,
        /// minutes, hours, days or weeks
        #[arg(long)]
        units: Option<String>,
    },
    /// Orion alert suppression
    Solarwinds {
        #[command(flatten)]
        targets: TargetArgs,
        /// enable or disable
        #[arg(long)]
        action: String,
    },
}

#[derive(ClapArgs)]
struct TargetArgs {
    /// Target names
    targets: Vec<String>,
    /// Target group defined in the config directory
    #[arg(long)]
    group: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr; stdout carries only the report
    let env_filter = EnvFilter::from_default_env()
        .add_directive("coordinator=info".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config_manager = ConfigManager::new(args.config_dir.clone()).await?;
    let config = config_manager.get_current_config();

    let report = match args.command {
        Command::Snapshot {
            targets,
            action,
            snapshot_name,
            description,
            memory,
            quiesce,
        } => {
            let targets = config_manager.resolve_targets(targets.group.as_deref(), &targets.targets)?;
            let vcenter = require(config.vcenter.as_ref(), "vcenter")?;
            validate_vcenter(vcenter)?;

            let client = VcenterClient::from_config(vcenter)?;
            let service = SnapshotService::new(client, vcenter.datacenter.clone(), vcenter.wait_timeout());
            let params = SnapshotParams {
                name: snapshot_name,
                description,
                memory,
                quiesce,
            };
            service.run(&targets, &action, &params).await?
        }
        Command::Monitoring {
            backend:
                MonitoringBackend::Prometheus {
                    targets,
                    action,
                    duration,
                    units,
                },
        } => {
            let targets = config_manager.resolve_targets(targets.group.as_deref(), &targets.targets)?;
            let prometheus = require(config.prometheus.as_ref(), "prometheus")?;
            let service = SilenceService::from_config(prometheus, duration, units.as_deref())?;
            service.run(&targets, &action).await?
        }
        Command::Monitoring {
            backend: MonitoringBackend::Solarwinds { targets, action },
        } => {
            let targets = config_manager.resolve_targets(targets.group.as_deref(), &targets.targets)?;
            let solarwinds = require(config.solarwinds.as_ref(), "solarwinds")?;
            if solarwinds.password.is_none() {
                return Err(ConfigError::MissingRequired {
                    field: "solarwinds.password".to_string(),
                }
                .into());
            }
            let service = SuppressionService::from_config(solarwinds)?;
            service.run(&targets, &action).await?
        }
    };

    print_report(&report)
}

fn require<'a, T>(section: Option<&'a T>, name: &str) -> Result<&'a T, ConfigError> {
    section.ok_or_else(|| ConfigError::MissingRequired {
        field: format!("[{}] section in main.toml", name),
    })
}

fn validate_vcenter(config: &VcenterConfig) -> Result<(), ConfigError> {
    if config.password.is_none() {
        return Err(ConfigError::MissingRequired {
            field: "vcenter.password".to_string(),
        });
    }
    if config.wait_timeout_seconds == 0 {
        return Err(ConfigError::InvalidValue {
            field: "vcenter.wait_timeout_seconds".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(())
}

fn print_report(report: &BatchReport) -> Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(report)?);

    if report.is_empty() {
        info!("All targets succeeded");
        Ok(ExitCode::SUCCESS)
    } else {
        warn!("{} targets need attention", report.len());
        Ok(ExitCode::from(2))
    }
}
