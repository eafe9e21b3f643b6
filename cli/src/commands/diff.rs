// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Policy diff command
//!
//! Loads a snapshot and an update from disk, runs them through
//! [`PolicyUpdateService`] with file-backed consent records, and prints the
//! per-application outcomes, deltas and emitted notifications.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use parking_lot::Mutex;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use consent_core::application::{PolicyUpdateService, UpdateReport};
use consent_core::domain::app_policy::PolicyTableSnapshot;
use consent_core::domain::engine_config::EngineConfig;
use consent_core::infrastructure::{
    ConsentDocument, DomainEvent, EventBus, EventBusNotificationSink, InMemoryConsentStore,
    PolicyDocument, StaticIdentityResolver,
};

#[derive(Args)]
pub struct DiffArgs {
    /// Currently enforced policy table (JSON or YAML)
    #[arg(long, value_name = "FILE")]
    pub snapshot: PathBuf,

    /// Incoming policy table update (JSON or YAML)
    #[arg(long, value_name = "FILE")]
    pub update: PathBuf,

    /// Recorded consents and application identities
    #[arg(long, value_name = "FILE")]
    pub consents: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Write the updated snapshot back to the snapshot file
    #[arg(long)]
    pub write: bool,
}

/// Everything one diff run produced.
#[derive(Debug, Serialize)]
pub struct DiffOutput {
    pub report: UpdateReport,
    pub events: Vec<DomainEvent>,
    #[serde(skip)]
    pub snapshot: PolicyTableSnapshot,
}

pub fn handle_command(args: DiffArgs, config_override: Option<PathBuf>) -> Result<()> {
    let config = EngineConfig::load_or_default(config_override)
        .context("Failed to load configuration")?;

    let output = run_diff(&args, config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_summary(&output);
    }

    if args.write {
        PolicyDocument {
            policy_table: output.snapshot,
        }
        .to_path(&args.snapshot)?;
        info!("Updated snapshot written to {}", args.snapshot.display());
        if !args.json {
            println!(
                "{}",
                format!("✓ Snapshot written: {}", args.snapshot.display()).green()
            );
        }
    }

    Ok(())
}

/// Applies the update described by `args` and collects the result.
pub fn run_diff(args: &DiffArgs, config: EngineConfig) -> Result<DiffOutput> {
    let snapshot = PolicyDocument::from_path(&args.snapshot)?.policy_table;
    let update = PolicyDocument::from_path(&args.update)?.policy_table;
    let consents = match &args.consents {
        Some(path) => ConsentDocument::from_path(path)?,
        None => ConsentDocument::default(),
    };

    let event_bus = Arc::new(EventBus::new(config.event_bus_capacity));
    let mut receiver = event_bus.subscribe();

    let service = PolicyUpdateService::new(
        Arc::new(Mutex::new(snapshot)),
        Arc::new(InMemoryConsentStore::from_document(&consents)),
        Arc::new(StaticIdentityResolver::from_document(&consents)),
        Arc::new(EventBusNotificationSink::new(event_bus.clone())),
        event_bus,
        config,
    );

    let report = service.apply_update(&update);

    Ok(DiffOutput {
        report,
        events: receiver.drain(),
        snapshot: service.snapshot(),
    })
}

fn print_summary(output: &DiffOutput) {
    let report = &output.report;
    println!("{} {}", "Policy update".bold(), report.update_id);
    println!();

    println!("{}", "Applications:".bold());
    for (app_id, outcome) in &report.outcomes {
        println!("  {:<24} {}", app_id, outcome.as_str());
    }
    println!();

    println!("{}", "Deltas:".bold());
    if report.deltas.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for delta in report.deltas.values() {
        let mut flags = Vec::new();
        if delta.app_revoked {
            flags.push("revoked".red().to_string());
        }
        if delta.app_unauthorized {
            flags.push("unauthorized".red().to_string());
        }
        if delta.is_app_permissions_revoked {
            flags.push(format!(
                "groups revoked: {}",
                delta.app_revoked_permissions.join(", ")
            ));
        }
        if delta.app_permissions_consent_needed {
            flags.push("consent needed".yellow().to_string());
        }
        if let Some(priority) = delta.priority {
            flags.push(format!("priority {}", priority.as_str()));
        }
        println!("  {:<24} {}", delta.app_id, flags.join("; "));
    }
    println!();

    let notifications = output
        .events
        .iter()
        .filter(|e| matches!(e, DomainEvent::Consent(_)))
        .count();
    println!("Notifications emitted: {}", notifications);

    if let Some(app_id) = &report.aborted_at {
        println!(
            "{}",
            format!("✗ Update aborted at application: {}", app_id).red()
        );
    }

    if !report.failed_apps.is_empty() {
        println!(
            "{}",
            format!("⚠ Failed applications: {}", report.failed_apps.join(", ")).yellow()
        );
    }
}
