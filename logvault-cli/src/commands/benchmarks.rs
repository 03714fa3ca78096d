//! `logvault benchmarks` command handler

use std::io::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::info;

use logvault_client::RestInterface;
use logvault_compliance::ComplianceStore;
use logvault_core::resources::{BenchmarkType, Benchmarks, BenchmarksFilter};

use crate::cli::{BenchmarksAction, BenchmarksArgs, WindowArgs};
use crate::commands::{QueryContext, drain};
use crate::error::CliError;
use crate::output::{OutputWriter, Render, clip};

/// kube-bench status values counted in summaries.
const STATUS_PASS: &str = "PASS";
const STATUS_FAIL: &str = "FAIL";

/// Execute the `benchmarks` command.
pub async fn execute<C: RestInterface>(
    args: BenchmarksArgs,
    ctx: &QueryContext<C>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        BenchmarksAction::Latest {
            nodes,
            version,
            window,
        } => {
            let filters = filters(nodes, version);
            let report = ctx
                .retry
                .run(&ctx.cancel, || latest(&window, &filters, ctx))
                .await?;
            writer.render(&report)?;
        }
        BenchmarksAction::Get { id, cluster } => {
            let store = &ComplianceStore::new(&ctx.client, &cluster);
            let id = id.as_str();
            let bm = ctx
                .retry
                .run(&ctx.cancel, move || async move {
                    Ok::<_, CliError>(store.get_benchmarks(id).await?)
                })
                .await?;
            writer.render(&BenchmarkDetail(bm))?;
        }
    }
    Ok(())
}

fn filters(nodes: Vec<String>, version: Option<String>) -> Vec<BenchmarksFilter> {
    if nodes.is_empty() && version.is_none() {
        return Vec::new();
    }
    vec![BenchmarksFilter {
        version: version.unwrap_or_default(),
        node_names: nodes,
    }]
}

/// Latest result per node within the window.
pub async fn latest<C: RestInterface>(
    window: &WindowArgs,
    filters: &[BenchmarksFilter],
    ctx: &QueryContext<C>,
) -> Result<LatestBenchmarksReport, CliError> {
    let store = ComplianceStore::new(&ctx.client, &window.cluster);
    let rx = store.retrieve_latest_benchmarks(
        &ctx.cancel,
        BenchmarkType::Kubernetes,
        filters.to_vec(),
        window.from.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        window.to.unwrap_or_else(Utc::now),
    );
    let results = drain(rx).await?;
    ctx.check_cancelled()?;

    info!(cluster = %window.cluster, nodes = results.len(), "benchmark query complete");
    Ok(LatestBenchmarksReport {
        cluster: window.cluster.clone(),
        nodes: results.iter().map(NodeBenchmark::from).collect(),
    })
}

/// Per-node benchmark outcome.
#[derive(Debug, Serialize)]
pub struct NodeBenchmark {
    pub id: String,
    pub node_name: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error: String,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl From<&Benchmarks> for NodeBenchmark {
    fn from(bm: &Benchmarks) -> Self {
        let count = |status: &str| bm.tests.iter().filter(|t| t.status == status).count();
        Self {
            id: bm.uid(),
            node_name: bm.node_name.clone(),
            timestamp: bm.timestamp,
            version: bm.version.clone(),
            error: bm.error.clone(),
            passed: count(STATUS_PASS),
            failed: count(STATUS_FAIL),
            total: bm.tests.len(),
        }
    }
}

#[derive(Serialize)]
pub struct LatestBenchmarksReport {
    pub cluster: String,
    pub nodes: Vec<NodeBenchmark>,
}

impl Render for LatestBenchmarksReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Latest benchmarks on {}: {} nodes",
            self.cluster.bold(),
            self.nodes.len()
        )?;
        if self.nodes.is_empty() {
            return Ok(());
        }

        writeln!(
            w,
            "{:<30} {:<22} {:<8} {:>6} {:>6} {:>6}",
            "NODE", "TIMESTAMP", "RESULT", "PASS", "FAIL", "TOTAL"
        )?;
        writeln!(w, "{}", "-".repeat(84))?;
        for node in &self.nodes {
            let result = if node.error.is_empty() {
                format!("{:<8}", "ok").green()
            } else {
                format!("{:<8}", "error").red()
            };
            writeln!(
                w,
                "{:<30} {:<22} {} {:>6} {:>6} {:>6}",
                clip(&node.node_name, 30),
                node.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
                result,
                node.passed,
                node.failed,
                node.total
            )?;
            if !node.error.is_empty() {
                writeln!(w, "  {}", node.error.red())?;
            }
        }
        Ok(())
    }
}

/// Full benchmark set for `benchmarks get`.
#[derive(Serialize)]
#[serde(transparent)]
pub struct BenchmarkDetail(pub Benchmarks);

impl Render for BenchmarkDetail {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let bm = &self.0;
        writeln!(w, "Benchmark {}", bm.uid().bold())?;
        writeln!(w, "  Node:       {}", bm.node_name)?;
        writeln!(
            w,
            "  Timestamp:  {}",
            bm.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
        )?;
        writeln!(w, "  Version:    {} (kubernetes {})", bm.version, bm.kubernetes_version)?;
        if !bm.succeeded() {
            writeln!(w, "  Error:      {}", bm.error.red())?;
            return Ok(());
        }

        writeln!(w)?;
        for test in &bm.tests {
            let status = match test.status.as_str() {
                STATUS_PASS => test.status.green(),
                STATUS_FAIL => test.status.red(),
                _ => test.status.yellow(),
            };
            writeln!(
                w,
                "  {:<8} {:<6} {}",
                status,
                test.test_number,
                clip(&test.test_desc, 80)
            )?;
        }
        Ok(())
    }
}
