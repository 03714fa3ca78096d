//! `logvault reports` command handler

use std::io::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::info;

use logvault_client::RestInterface;
use logvault_compliance::{ComplianceStore, ReportQuery, ReportSortBy, ReportTypeAndName};
use logvault_core::resources::ReportData;

use crate::cli::{ReportsAction, ReportsArgs, WindowArgs};
use crate::commands::QueryContext;
use crate::error::CliError;
use crate::output::{OutputWriter, Render, clip};

/// Execute the `reports` command.
pub async fn execute<C: RestInterface>(
    args: ReportsArgs,
    ctx: &QueryContext<C>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ReportsAction::List {
            names,
            types,
            page,
            max_items,
            sort,
            window,
        } => {
            let query = build_query(names, types, page, max_items, &sort, &window)?;
            let report = ctx
                .retry
                .run(&ctx.cancel, || list(&window.cluster, &query, ctx))
                .await?;
            writer.render(&report)?;
        }
        ReportsAction::Last { name, cluster } => {
            let store = &ComplianceStore::new(&ctx.client, &cluster);
            let name = name.as_str();
            let summary = ctx
                .retry
                .run(&ctx.cancel, move || async move {
                    Ok::<_, CliError>(store.retrieve_last_archived_report_summary(name).await?)
                })
                .await?;
            writer.render(&ReportDetail(summary))?;
        }
        ReportsAction::Get { id, cluster } => {
            let store = &ComplianceStore::new(&ctx.client, &cluster);
            let id = id.as_str();
            let report = ctx
                .retry
                .run(&ctx.cancel, move || async move {
                    Ok::<_, CliError>(store.retrieve_archived_report(id).await?)
                })
                .await?;
            writer.render(&ReportDetail(report))?;
        }
    }
    Ok(())
}

/// Turns command-line filters into a report query.
pub fn build_query(
    names: Vec<String>,
    types: Vec<String>,
    page: usize,
    max_items: Option<usize>,
    sort: &[String],
    window: &WindowArgs,
) -> Result<ReportQuery, CliError> {
    let reports = names
        .into_iter()
        .map(|report_name| ReportTypeAndName {
            report_name,
            report_type_name: String::new(),
        })
        .chain(types.into_iter().map(|report_type_name| ReportTypeAndName {
            report_name: String::new(),
            report_type_name,
        }))
        .collect();

    Ok(ReportQuery {
        reports,
        from_time: window.from.map(rfc3339).unwrap_or_default(),
        to_time: window.to.map(rfc3339).unwrap_or_default(),
        page,
        max_items,
        sort_by: sort.iter().map(|s| parse_sort(s)).collect::<Result<_, _>>()?,
    })
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parses `field`, `field:asc` or `field:desc`.
pub fn parse_sort(spec: &str) -> Result<ReportSortBy, CliError> {
    let (field, ascending) = match spec.split_once(':') {
        None => (spec, true),
        Some((field, "asc")) => (field, true),
        Some((field, "desc")) => (field, false),
        Some((_, other)) => {
            return Err(CliError::Command(format!(
                "invalid sort direction '{other}' in '{spec}' (expected asc or desc)"
            )));
        }
    };
    if field.is_empty() {
        return Err(CliError::Command(format!("empty sort field in '{spec}'")));
    }
    Ok(ReportSortBy::new(field, ascending))
}

/// One numbered page of report summaries.
pub async fn list<C: RestInterface>(
    cluster: &str,
    query: &ReportQuery,
    ctx: &QueryContext<C>,
) -> Result<ReportListReport, CliError> {
    let store = ComplianceStore::new(&ctx.client, cluster);
    let summaries = store
        .retrieve_archived_report_summaries(&ctx.cancel, query)
        .await?;
    ctx.check_cancelled()?;

    info!(
        cluster,
        page = query.page,
        total = summaries.count,
        returned = summaries.reports.len(),
        "report summaries retrieved"
    );
    Ok(ReportListReport {
        cluster: cluster.to_owned(),
        page: query.page,
        total: summaries.count,
        reports: summaries.reports.iter().map(ReportRow::from).collect(),
    })
}

#[derive(Debug, Serialize)]
pub struct ReportRow {
    pub id: String,
    pub report_name: String,
    pub report_type_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl From<&ReportData> for ReportRow {
    fn from(r: &ReportData) -> Self {
        Self {
            id: r.uid(),
            report_name: r.report_name.clone(),
            report_type_name: r.report_type_name.clone(),
            start_time: r.start_time,
            end_time: r.end_time,
        }
    }
}

#[derive(Serialize)]
pub struct ReportListReport {
    pub cluster: String,
    pub page: usize,
    pub total: i64,
    pub reports: Vec<ReportRow>,
}

impl Render for ReportListReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Archived reports on {} (page {}, {} shown, {} total)",
            self.cluster.bold(),
            self.page,
            self.reports.len(),
            self.total
        )?;
        if self.reports.is_empty() {
            return Ok(());
        }

        writeln!(
            w,
            "{:<24} {:<20} {:<22} {:<22}",
            "NAME", "TYPE", "START", "END"
        )?;
        writeln!(w, "{}", "-".repeat(90))?;
        for r in &self.reports {
            writeln!(
                w,
                "{:<24} {:<20} {:<22} {:<22}",
                clip(&r.report_name, 24),
                clip(&r.report_type_name, 20),
                rfc3339(r.start_time),
                rfc3339(r.end_time)
            )?;
        }
        Ok(())
    }
}

/// A single report, either a summary or the full archive.
#[derive(Serialize)]
#[serde(transparent)]
pub struct ReportDetail(pub ReportData);

impl Render for ReportDetail {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let r = &self.0;
        writeln!(w, "Report {}", r.uid().bold())?;
        writeln!(w, "  Name:       {}", r.report_name)?;
        writeln!(w, "  Type:       {}", r.report_type_name)?;
        writeln!(
            w,
            "  Window:     {} .. {}",
            rfc3339(r.start_time),
            rfc3339(r.end_time)
        )?;
        if let Some(generated) = r.generation_time {
            writeln!(w, "  Generated:  {}", rfc3339(generated))?;
        }
        writeln!(w, "  Endpoints:  {}", r.endpoints.len())?;
        writeln!(w, "  Namespaces: {}", r.namespaces.len())?;
        writeln!(w, "  Services:   {}", r.services.len())?;
        writeln!(w, "  Audit:      {}", r.audit_events.len())?;
        writeln!(w, "  Flows:      {}", r.flows.len())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn window() -> WindowArgs {
        WindowArgs {
            cluster: "cluster".to_owned(),
            from: Some(Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap()),
            to: None,
        }
    }

    #[test]
    fn parse_sort_directions() {
        assert_eq!(parse_sort("endTime").unwrap(), ReportSortBy::new("endTime", true));
        assert_eq!(
            parse_sort("endTime:desc").unwrap(),
            ReportSortBy::new("endTime", false)
        );
        assert_eq!(
            parse_sort("reportName:asc").unwrap(),
            ReportSortBy::new("reportName", true)
        );
    }

    #[test]
    fn parse_sort_rejects_bad_input() {
        assert!(parse_sort("endTime:sideways").is_err());
        assert!(parse_sort(":desc").is_err());
    }

    #[test]
    fn build_query_maps_names_types_and_window() {
        let query = build_query(
            vec!["weekly".to_owned()],
            vec!["inventory".to_owned()],
            2,
            Some(10),
            &["endTime:desc".to_owned()],
            &window(),
        )
        .unwrap();

        assert_eq!(query.reports.len(), 2);
        assert_eq!(query.reports[0].report_name, "weekly");
        assert!(query.reports[0].report_type_name.is_empty());
        assert_eq!(query.reports[1].report_type_name, "inventory");
        assert_eq!(query.from_time, "2026-05-01T00:00:00Z");
        assert!(query.to_time.is_empty());
        assert_eq!(query.page, 2);
        assert_eq!(query.max_items, Some(10));
        assert_eq!(query.sort_by, vec![ReportSortBy::new("endTime", false)]);
    }

    #[test]
    fn list_report_renders_rows() {
        colored::control::set_override(false);
        let report = ReportListReport {
            cluster: "cluster".to_owned(),
            page: 0,
            total: 7,
            reports: vec![ReportRow {
                id: "r1".to_owned(),
                report_name: "weekly".to_owned(),
                report_type_name: "inventory".to_owned(),
                start_time: Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap(),
                end_time: Utc.with_ymd_and_hms(2026, 5, 8, 0, 0, 0).unwrap(),
            }],
        };
        let mut buffer = Vec::new();
        report.render_text(&mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();

        assert!(output.contains("page 0, 1 shown, 7 total"));
        assert!(output.contains("weekly"));
        assert!(output.contains("2026-05-08T00:00:00Z"));
    }
}
