//! `logvault logs` command handler

use std::io::Write;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::{debug, info};

use logvault_client::resource::{Resource, ResourceClient};
use logvault_client::{ListPager, RestInterface};
use logvault_core::query::{ListParams, QueryParams};
use logvault_core::resources::{AuditLog, AuditLogParams, DnsLog, Event, FlowLog, WafLog};

use crate::cli::{LogKind, LogsArgs};
use crate::commands::{QueryContext, window_range};
use crate::error::CliError;
use crate::output::{OutputWriter, Render, clip};

/// Execute the `logs` command.
pub async fn execute<C: RestInterface>(
    args: LogsArgs,
    ctx: &QueryContext<C>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let report = ctx.retry.run(&ctx.cancel, || fetch(&args, ctx)).await?;
    writer.render(&report)?;
    Ok(())
}

/// Runs one complete paged query for the requested log kind.
pub async fn fetch<C: RestInterface>(
    args: &LogsArgs,
    ctx: &QueryContext<C>,
) -> Result<LogsReport, CliError> {
    let query = base_query(args, ctx);
    let max_results = args.max_results.unwrap_or(ctx.defaults.max_results);
    let cluster = args.window.cluster.as_str();
    let client = &ctx.client;

    let records = match args.kind {
        LogKind::Dns => collect(client.dns_logs(cluster), query, max_results, ctx).await?,
        LogKind::Waf => collect(client.waf_logs(cluster), query, max_results, ctx).await?,
        LogKind::Flow => collect(client.flow_logs(cluster), query, max_results, ctx).await?,
        LogKind::Events => collect(client.events(cluster), query, max_results, ctx).await?,
        LogKind::Audit => {
            let params = AuditLogParams {
                query,
                ..AuditLogParams::default()
            };
            collect(client.audit_logs(cluster), params, max_results, ctx).await?
        }
    };

    info!(kind = ?args.kind, cluster, count = records.len(), "log query complete");
    Ok(LogsReport {
        kind: format!("{:?}", args.kind).to_lowercase(),
        cluster: cluster.to_owned(),
        count: records.len(),
        records,
    })
}

fn base_query<C>(args: &LogsArgs, ctx: &QueryContext<C>) -> QueryParams {
    let mut query = QueryParams::new().with_max_page_size(
        args.page_size.unwrap_or(ctx.defaults.page_size),
    );
    query.time_range = window_range(&args.window);
    if ctx.defaults.timeout_secs > 0 {
        query = query.with_timeout(Duration::from_secs(ctx.defaults.timeout_secs));
    }
    if let Some(selector) = &args.selector {
        query = query.with_selector(selector.as_str());
    }
    query
}

/// Follows every page of one resource and flattens the records into rows.
async fn collect<K, C>(
    resource: ResourceClient<K, C>,
    params: K::Params,
    max_results: usize,
    ctx: &QueryContext<C>,
) -> Result<Vec<LogRecord>, CliError>
where
    K: Resource,
    K::Params: ListParams,
    K::Item: LogLine,
    C: RestInterface,
{
    let mut pages = ListPager::new(params)
        .with_max_results(max_results)
        .stream(&ctx.cancel, resource);

    let mut records = Vec::new();
    while let Some(event) = pages.next().await {
        let page = event?;
        debug!(resource = K::NAME, items = page.len(), "page received");
        for item in page.items {
            records.push(LogRecord {
                time: item.time(),
                summary: item.summary(),
                raw: serde_json::to_value(&item)?,
            });
        }
    }
    ctx.check_cancelled()?;
    Ok(records)
}

/// One-line view of a log record for text output.
pub trait LogLine {
    fn time(&self) -> Option<DateTime<Utc>>;
    fn summary(&self) -> String;
}

impl LogLine for DnsLog {
    fn time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    fn summary(&self) -> String {
        format!(
            "{}/{} {} {} {} x{}",
            self.client_namespace, self.client_name, self.qname, self.qtype, self.rcode, self.count
        )
    }
}

impl LogLine for WafLog {
    fn time(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    fn summary(&self) -> String {
        format!("{} {}{} {}", self.method, self.host, self.path, self.msg)
    }
}

impl LogLine for FlowLog {
    fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.start_time, 0)
    }

    fn summary(&self) -> String {
        let port = self.dest_port.map(|p| format!(":{p}")).unwrap_or_default();
        format!(
            "{}/{} -> {}/{}{} {} {}",
            self.source_namespace,
            self.source_name_aggr,
            self.dest_namespace,
            self.dest_name_aggr,
            port,
            self.proto,
            self.action
        )
    }
}

impl LogLine for AuditLog {
    fn time(&self) -> Option<DateTime<Utc>> {
        self.stage_timestamp.or(self.request_received_timestamp)
    }

    fn summary(&self) -> String {
        match &self.object_ref {
            Some(obj) if obj.namespace.is_empty() => {
                format!("{} {} {}", self.verb, obj.resource, obj.name)
            }
            Some(obj) => format!("{} {} {}/{}", self.verb, obj.resource, obj.namespace, obj.name),
            None => self.verb.clone(),
        }
    }
}

impl LogLine for Event {
    fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.time, 0)
    }

    fn summary(&self) -> String {
        format!("[{}] {} {}", self.severity, self.kind, self.description)
    }
}

/// One record: a text summary plus the record as returned by the store.
#[derive(Serialize)]
pub struct LogRecord {
    #[serde(skip)]
    pub time: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub summary: String,
    #[serde(flatten)]
    pub raw: serde_json::Value,
}

/// Result of a `logs` query.
#[derive(Serialize)]
pub struct LogsReport {
    pub kind: String,
    pub cluster: String,
    pub count: usize,
    pub records: Vec<LogRecord>,
}

impl Render for LogsReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "{} logs on {} ({} records)",
            self.kind.bold(),
            self.cluster.bold(),
            self.count
        )?;
        if self.records.is_empty() {
            return Ok(());
        }

        writeln!(w, "{:<22} {}", "TIME", "SUMMARY")?;
        writeln!(w, "{}", "-".repeat(80))?;
        for record in &self.records {
            let time = record
                .time
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
                .unwrap_or_else(|| "-".to_owned());
            writeln!(w, "{:<22} {}", time, clip(&record.summary, 100))?;
        }
        Ok(())
    }
}
