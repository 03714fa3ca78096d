//! `logvault threatfeeds` command handler

use std::io::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::info;

use logvault_client::resource::{Resource, ResourceClient};
use logvault_client::{ListPager, RestInterface};
use logvault_core::resources::{DomainNameSetThreatFeed, IpSetThreatFeed, ThreatFeedParams};

use crate::cli::{FeedKind, ThreatfeedsArgs};
use crate::commands::QueryContext;
use crate::error::CliError;
use crate::output::{OutputWriter, Render, clip};

/// Execute the `threatfeeds` command.
pub async fn execute<C: RestInterface>(
    args: ThreatfeedsArgs,
    ctx: &QueryContext<C>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let report = ctx.retry.run(&ctx.cancel, || fetch(&args, ctx)).await?;
    writer.render(&report)?;
    Ok(())
}

pub async fn fetch<C: RestInterface>(
    args: &ThreatfeedsArgs,
    ctx: &QueryContext<C>,
) -> Result<ThreatFeedReport, CliError> {
    let mut params = ThreatFeedParams {
        id: args.id.clone().unwrap_or_default(),
        ..ThreatFeedParams::default()
    };
    params.query.max_page_size = ctx.defaults.page_size;

    let feeds = ctx.client.threat_feeds(&args.cluster);
    let sets = match args.kind {
        FeedKind::Ip => collect(feeds.ip_set, params, ctx).await?,
        FeedKind::Domain => collect(feeds.domain_name_set, params, ctx).await?,
    };

    info!(cluster = %args.cluster, kind = ?args.kind, sets = sets.len(), "threat feeds listed");
    Ok(ThreatFeedReport {
        cluster: args.cluster.clone(),
        kind: args.kind,
        sets,
    })
}

async fn collect<K, C>(
    resource: ResourceClient<K, C>,
    params: ThreatFeedParams,
    ctx: &QueryContext<C>,
) -> Result<Vec<FeedSet>, CliError>
where
    K: Resource<Params = ThreatFeedParams>,
    K::Item: Into<FeedSet>,
    C: RestInterface,
{
    let mut pages = ListPager::new(params)
        .with_max_results(ctx.defaults.max_results)
        .stream(&ctx.cancel, resource);

    let mut sets = Vec::new();
    while let Some(event) = pages.next().await {
        sets.extend(event?.items.into_iter().map(Into::into));
    }
    ctx.check_cancelled()?;
    Ok(sets)
}

/// One feed set with its entries (IPs/CIDRs or domains).
#[derive(Debug, Serialize)]
pub struct FeedSet {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub entries: Vec<String>,
}

impl From<IpSetThreatFeed> for FeedSet {
    fn from(feed: IpSetThreatFeed) -> Self {
        Self {
            id: feed.id,
            created_at: feed.data.created_at,
            entries: feed.data.ips,
        }
    }
}

impl From<DomainNameSetThreatFeed> for FeedSet {
    fn from(feed: DomainNameSetThreatFeed) -> Self {
        Self {
            id: feed.id,
            created_at: feed.data.created_at,
            entries: feed.data.domains,
        }
    }
}

#[derive(Serialize)]
pub struct ThreatFeedReport {
    pub cluster: String,
    #[serde(serialize_with = "serialize_kind")]
    pub kind: FeedKind,
    pub sets: Vec<FeedSet>,
}

fn serialize_kind<S: serde::Serializer>(kind: &FeedKind, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(match kind {
        FeedKind::Ip => "ip",
        FeedKind::Domain => "domain",
    })
}

impl Render for ThreatFeedReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let label = match self.kind {
            FeedKind::Ip => "IP set",
            FeedKind::Domain => "Domain set",
        };
        writeln!(
            w,
            "{} feeds on {}: {}",
            label,
            self.cluster.bold(),
            self.sets.len()
        )?;
        if self.sets.is_empty() {
            return Ok(());
        }

        writeln!(w, "{:<32} {:<22} {:>8}  {}", "ID", "CREATED", "ENTRIES", "SAMPLE")?;
        writeln!(w, "{}", "-".repeat(90))?;
        for set in &self.sets {
            let sample = set
                .entries
                .iter()
                .take(3)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(
                w,
                "{:<32} {:<22} {:>8}  {}",
                clip(&set.id, 32),
                set.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                set.entries.len(),
                sample
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use logvault_core::resources::IpSetData;

    #[test]
    fn ip_set_converts_to_feed_set() {
        let feed = IpSetThreatFeed {
            id: "blocklist".to_owned(),
            data: IpSetData {
                created_at: Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap(),
                ips: vec!["10.0.0.0/8".to_owned(), "192.0.2.1/32".to_owned()],
            },
        };
        let set = FeedSet::from(feed);
        assert_eq!(set.id, "blocklist");
        assert_eq!(set.entries.len(), 2);
    }

    #[test]
    fn report_renders_sample_entries() {
        colored::control::set_override(false);
        let report = ThreatFeedReport {
            cluster: "cluster".to_owned(),
            kind: FeedKind::Domain,
            sets: vec![FeedSet {
                id: "phishing".to_owned(),
                created_at: Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap(),
                entries: vec![
                    "a.example".to_owned(),
                    "b.example".to_owned(),
                    "c.example".to_owned(),
                    "d.example".to_owned(),
                ],
            }],
        };
        let mut buffer = Vec::new();
        report.render_text(&mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();

        assert!(output.contains("Domain set feeds on cluster: 1"));
        assert!(output.contains("a.example, b.example, c.example"));
        assert!(!output.contains("d.example"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "domain");
    }
}
