//! `logvault flows` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use logvault_client::RestInterface;
use logvault_compliance::{ComplianceStore, EndpointsReportFlow, FlowEndpoint};

use crate::cli::FlowsArgs;
use crate::commands::{QueryContext, drain};
use crate::error::CliError;
use crate::output::{OutputWriter, Render, clip};

/// Execute the `flows` command.
pub async fn execute<C: RestInterface>(
    args: FlowsArgs,
    ctx: &QueryContext<C>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let report = ctx.retry.run(&ctx.cancel, || fetch(&args, ctx)).await?;
    writer.render(&report)?;
    Ok(())
}

pub async fn fetch<C: RestInterface>(
    args: &FlowsArgs,
    ctx: &QueryContext<C>,
) -> Result<FlowsReport, CliError> {
    let store = ComplianceStore::new(&ctx.client, &args.window.cluster);
    let rx = store.search_flows(
        &ctx.cancel,
        &args.namespaces,
        args.window.from,
        args.window.to,
    );
    let flows = drain(rx).await?;
    ctx.check_cancelled()?;

    info!(
        cluster = %args.window.cluster,
        flows = flows.len(),
        "flow report complete"
    );
    Ok(FlowsReport {
        cluster: args.window.cluster.clone(),
        namespaces: args.namespaces.clone(),
        flows,
    })
}

/// Unique flows touching the requested namespaces.
#[derive(Serialize)]
pub struct FlowsReport {
    pub cluster: String,
    pub namespaces: Vec<String>,
    pub flows: Vec<EndpointsReportFlow>,
}

fn endpoint_label(ep: &FlowEndpoint) -> String {
    let name = if ep.name_is_aggregation_prefix {
        format!("{}*", ep.name.trim_end_matches('*'))
    } else {
        ep.name.clone()
    };
    if ep.namespace.is_empty() {
        format!("{} {}", ep.kind, name)
    } else {
        format!("{} {}/{}", ep.kind, ep.namespace, name)
    }
}

impl Render for FlowsReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Flows for {} on {}: {}",
            self.namespaces.join(",").bold(),
            self.cluster.bold(),
            self.flows.len()
        )?;
        if self.flows.is_empty() {
            return Ok(());
        }

        writeln!(w, "{:<40} {:<40} {:<8}", "SOURCE", "DESTINATION", "PROTO")?;
        writeln!(w, "{}", "-".repeat(90))?;
        for flow in &self.flows {
            writeln!(
                w,
                "{:<40} {:<40} {:<8}",
                clip(&endpoint_label(&flow.source), 40),
                clip(&endpoint_label(&flow.destination), 40),
                if flow.protocol.is_empty() { "-" } else { flow.protocol.as_str() }
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(kind: &str, ns: &str, name: &str, aggregated: bool) -> FlowEndpoint {
        FlowEndpoint {
            kind: kind.to_owned(),
            name: name.to_owned(),
            namespace: ns.to_owned(),
            name_is_aggregation_prefix: aggregated,
        }
    }

    #[test]
    fn aggregated_names_get_a_wildcard() {
        assert_eq!(
            endpoint_label(&endpoint("Pod", "shop", "web-", true)),
            "Pod shop/web-*"
        );
        assert_eq!(
            endpoint_label(&endpoint("Pod", "shop", "web-*", true)),
            "Pod shop/web-*"
        );
        assert_eq!(
            endpoint_label(&endpoint("FlowPublic", "", "pub", false)),
            "FlowPublic pub"
        );
    }

    #[test]
    fn render_text_shows_each_flow() {
        colored::control::set_override(false);
        let report = FlowsReport {
            cluster: "cluster".to_owned(),
            namespaces: vec!["shop".to_owned()],
            flows: vec![EndpointsReportFlow {
                source: endpoint("Pod", "shop", "web-", true),
                destination: endpoint("FlowPublic", "", "pub", false),
                protocol: "tcp".to_owned(),
            }],
        };
        let mut buffer = Vec::new();
        report.render_text(&mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();

        assert!(output.contains("Flows for shop on cluster: 1"));
        assert!(output.contains("Pod shop/web-*"));
        assert!(output.contains("FlowPublic pub"));
        assert!(output.contains("tcp"));
    }
}
