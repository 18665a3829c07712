//! `spine` operator CLI
//!
//! Registers and releases hostnames against the configured database and
//! Cloudflare account, and lists reconciliation events that need manual cleanup.

mod cli;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use spine_app::AppState;
use spine_app::config::SpineConfig;
use spine_core::error::CoreError;
use spine_core::types::{Host, ReconciliationEvent};

use cli::{Cli, Command, ReconciliationCommand, RegisterArgs};

const DEFAULT_CONFIG_PATH: &str = "spine.toml";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = spine_app::telemetry::init(&config.telemetry) {
        eprintln!("Failed to initialise logging: {e}");
    }

    match run(cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<CoreError>() {
                Some(core) if core.is_expected() => tracing::warn!("{e:#}"),
                _ => tracing::error!("{e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SpineConfig> {
    let mut config = match path {
        Some(path) => SpineConfig::load(path)?,
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default.exists() {
                SpineConfig::load(&default)?
            } else {
                SpineConfig::default()
            }
        }
    };
    config.apply_env();
    config.validate()?;
    Ok(config)
}

async fn run(cli: Cli, config: &SpineConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(config)
        .await
        .context("Failed to initialise application state")?;
    state.run_startup().await;

    match cli.command {
        Command::Register(args) => {
            let host = register(&state, &args).await?;
            tracing::info!("Registered {} for {}", host.full(), host.user_id);
            print(cli.json, &host, |h| format!("{}\t{}", h.id, h.full()))?;
        }
        Command::Delete(args) => {
            let removed = state
                .registration_service
                .delete(&args.hostname, &args.user.user)
                .await?;
            if removed {
                println!("Released {}", args.hostname);
            } else {
                println!("{} holds no claim on {}", args.user.user, args.hostname);
            }
        }
        Command::List(args) => {
            let hosts = state.registration_service.list_hosts(&args.user).await?;
            print(cli.json, &hosts, |hosts: &Vec<Host>| {
                hosts
                    .iter()
                    .map(|h| format!("{}\t{}\t{}", h.id, h.full(), h.created_at.to_rfc3339()))
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }
        Command::Domains => {
            let domains = state.domain_service.list_available().await?;
            print(cli.json, &domains, |d: &Vec<String>| d.join("\n"))?;
        }
        Command::Reconciliation(ReconciliationCommand::List) => {
            let events = state.ctx.journal().list_pending().await?;
            print(cli.json, &events, |events: &Vec<ReconciliationEvent>| {
                events
                    .iter()
                    .map(|e| {
                        format!(
                            "{}\t{}\t{}/{}\t{}",
                            e.id, e.hostname, e.zone_id, e.record_id, e.detail
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }
        Command::Reconciliation(ReconciliationCommand::Resolve { id }) => {
            if state.ctx.journal().resolve(&id).await? {
                println!("Resolved {id}");
            } else {
                anyhow::bail!("No pending reconciliation event {id}");
            }
        }
    }

    Ok(())
}

async fn register(state: &AppState, args: &RegisterArgs) -> Result<Host, CoreError> {
    let service = &state.registration_service;
    match (&args.hostname, &args.root) {
        (Some(hostname), _) => service.register(hostname, &args.user.user).await,
        (None, Some(root)) => {
            let sub = args.sub.as_deref().unwrap_or_default();
            service.register_parts(sub, root, &args.user.user).await
        }
        (None, None) => Err(CoreError::ValidationError(
            "hostname or --root is required".to_string(),
        )),
    }
}

fn print<T: Serialize>(json: bool, value: &T, plain: impl Fn(&T) -> String) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        let text = plain(value);
        if !text.is_empty() {
            println!("{text}");
        }
    }
    Ok(())
}
