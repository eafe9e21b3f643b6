// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use consent_core::domain::engine_config::{
    EngineConfig, CONFIG_PATH_ENV, PROFILE_ENV, UNDEFINED_CONSENT_ENV,
};

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./consent-policy.yaml)
        #[arg(short, long, default_value = "./consent-policy.yaml")]
        output: PathBuf,

        /// Include examples and comments
        #[arg(long)]
        examples: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output, examples } => generate(output, examples).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = EngineConfig::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. {}: {}",
            CONFIG_PATH_ENV,
            std::env::var(CONFIG_PATH_ENV)
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./consent-policy.yaml");
        println!("  4. ~/.consent-policy/config.yaml");
        println!("  5. /etc/consent-policy/config.yaml");
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Engine:".bold());
    println!("  Profile: {:?}", config.profile);
    println!("  Undefined group consent: {}", config.undefined_group_consent);
    println!("  Failure policy: {:?}", config.failure_policy);
    println!("  Event bus capacity: {}", config.event_bus_capacity);
    println!();

    println!("{}", "Profile capabilities:".bold());
    let flag = |enabled: bool| if enabled { "yes".green() } else { "no".dimmed() };
    println!("  Default HMI reported: {}", flag(config.profile.reports_default_hmi()));
    println!("  Priority reported: {}", flag(config.profile.reports_priority()));
    println!(
        "  Preconsented groups honored: {}",
        flag(config.profile.honors_preconsented_groups())
    );
    println!(
        "  Device consent reset: {}",
        flag(config.profile.resets_device_consent())
    );
    println!();

    println!("{}", "Environment overrides:".bold());
    for var in [PROFILE_ENV, UNDEFINED_CONSENT_ENV] {
        println!(
            "  {}: {}",
            var,
            std::env::var(var)
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
    }

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = EngineConfig::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: PathBuf, with_examples: bool) -> Result<()> {
    let sample = if with_examples {
        include_str!("../../templates/config-with-examples.yaml")
    } else {
        include_str!("../../templates/config-minimal.yaml")
    };

    std::fs::write(&output, sample)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}
