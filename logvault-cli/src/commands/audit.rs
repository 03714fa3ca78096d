//! `logvault audit` command handler

use std::io::Write;

use chrono::SecondsFormat;
use serde::Serialize;
use tracing::info;

use logvault_client::RestInterface;
use logvault_compliance::{AuditEventsSelection, ComplianceStore};
use logvault_core::resources::{AuditLog, ObjectReference};

use crate::cli::AuditArgs;
use crate::commands::logs::LogLine;
use crate::commands::{QueryContext, drain};
use crate::error::CliError;
use crate::output::{OutputWriter, Render, clip};

/// Execute the `audit` command.
pub async fn execute<C: RestInterface>(
    args: AuditArgs,
    ctx: &QueryContext<C>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let report = ctx.retry.run(&ctx.cancel, || fetch(&args, ctx)).await?;
    writer.render(&report)?;
    Ok(())
}

pub async fn fetch<C: RestInterface>(
    args: &AuditArgs,
    ctx: &QueryContext<C>,
) -> Result<AuditReport, CliError> {
    let selection = parse_selection(&args.resources)?;
    let store = ComplianceStore::new(&ctx.client, &args.window.cluster);
    let rx = store.search_audit_events(
        &ctx.cancel,
        selection.as_ref(),
        args.window.from,
        args.window.to,
    );
    let events = drain(rx).await?;
    ctx.check_cancelled()?;

    info!(cluster = %args.window.cluster, events = events.len(), "audit query complete");
    Ok(AuditReport {
        cluster: args.window.cluster.clone(),
        events,
    })
}

/// Parses `resource[/namespace[/name]]` selectors. No selectors means all resources.
pub fn parse_selection(specs: &[String]) -> Result<Option<AuditEventsSelection>, CliError> {
    if specs.is_empty() {
        return Ok(None);
    }
    let resources = specs
        .iter()
        .map(|spec| {
            let mut parts = spec.split('/');
            let resource = parts.next().unwrap_or_default();
            if resource.is_empty() {
                return Err(CliError::Command(format!(
                    "invalid resource selector '{spec}': expected resource[/namespace[/name]]"
                )));
            }
            let namespace = parts.next().unwrap_or_default();
            let name = parts.next().unwrap_or_default();
            if parts.next().is_some() {
                return Err(CliError::Command(format!(
                    "invalid resource selector '{spec}': too many segments"
                )));
            }
            Ok(ObjectReference {
                resource: resource.to_owned(),
                namespace: namespace.to_owned(),
                name: name.to_owned(),
                ..ObjectReference::default()
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(AuditEventsSelection { resources }))
}

/// Configuration-change audit events.
#[derive(Serialize)]
pub struct AuditReport {
    pub cluster: String,
    pub events: Vec<AuditLog>,
}

impl Render for AuditReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Audit events on {}: {}",
            self.cluster.bold(),
            self.events.len()
        )?;
        if self.events.is_empty() {
            return Ok(());
        }

        writeln!(w, "{:<22} {:<38} {}", "TIME", "AUDIT ID", "CHANGE")?;
        writeln!(w, "{}", "-".repeat(90))?;
        for event in &self.events {
            let time = event
                .time()
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
                .unwrap_or_else(|| "-".to_owned());
            writeln!(
                w,
                "{:<22} {:<38} {}",
                time,
                clip(&event.audit_id, 38),
                event.summary()
            )?;
        }
        Ok(())
    }
}
