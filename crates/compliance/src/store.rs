//! 컴플라이언스 스토어 -- 클러스터 단위 조회/저장 연산
//!
//! 스트림 연산은 페이저 위에 리듀서를 얹은 태스크를 생성하고, 결과를
//! 용량 [`STREAM_CAPACITY`]의 채널로 전달합니다. 에러가 있으면 채널의
//! 마지막 원소이며 그 전에 전달된 결과는 유효합니다.
//!
//! # 아키텍처
//!
//! ```text
//! ListPager --PageStream--> reducer task --mpsc(100)--> caller
//!                              (dedup / latest / passthrough)
//! ```

use chrono::{DateTime, Utc};
use logvault_client::resource::kinds::{AuditLogs, L3Flows};
use logvault_client::{
    CancellationToken, Client, ComplianceClients, HttpRestClient, ListPager, Lister,
    ResourceClient, RestInterface,
};
use logvault_core::page::{BulkResponse, Page};
use logvault_core::query::ListParams;
use logvault_core::resources::{
    AuditLog, BenchmarkType, Benchmarks, BenchmarksFilter, BenchmarksParams, ReportData,
    ReportDataParams, ReportMatch, ResourceList, Snapshot, SnapshotParams, TypeMeta,
};
use logvault_core::sort::SortBy;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::audit::{AuditEventsSelection, build_audit_query};
use crate::benchmarks::{LatestBenchmarks, build_benchmarks_query};
use crate::error::StoreError;
use crate::flows::{EndpointsReportFlow, FlowDeduplicator, build_flow_query, time_range};
use crate::reports::{ArchivedReportSummaries, ReportQuery, ReportTypeAndName};

/// 스트림 연산 결과 채널 용량
pub const STREAM_CAPACITY: usize = 100;

/// 스트림 연산의 결과 채널
pub type StoreStream<T> = mpsc::Receiver<Result<T, StoreError>>;

/// 스냅샷 정렬 필드
const SNAPSHOT_SORT_FIELD: &str = "requestCompletedTimestamp";

/// 리포트 최신순 정렬 필드
const REPORT_END_TIME_FIELD: &str = "endTime";

/// 클러스터 하나의 컴플라이언스 스토어
pub struct ComplianceStore<C = HttpRestClient> {
    cluster: String,
    compliance: ComplianceClients<C>,
    audit: ResourceClient<AuditLogs, C>,
    flows: ResourceClient<L3Flows, C>,
}

impl<C: RestInterface> ComplianceStore<C> {
    pub fn new(client: &Client<C>, cluster: &str) -> Self {
        Self {
            cluster: cluster.to_owned(),
            compliance: client.compliance(cluster),
            audit: client.audit_logs(cluster),
            flows: client.l3_flows(cluster),
        }
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    // --- 플로우 ---

    /// 지정한 네임스페이스가 소스 또는 목적지인 플로우를 중복 없이 스트리밍합니다.
    pub fn search_flows(
        &self,
        cancel: &CancellationToken,
        namespaces: &[String],
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> StoreStream<EndpointsReportFlow> {
        debug!(?namespaces, "searching flows");
        let params = build_flow_query(namespaces, start, end);
        let mut dedup = FlowDeduplicator::new();
        let namespaces = namespaces.to_vec();
        spawn_reducer(
            cancel,
            ListPager::new(params),
            self.flows.clone(),
            move |page| dedup.push_page(&page.items),
            move || info!(?namespaces, "completed flow query"),
        )
    }

    // --- 감사 이벤트 ---

    /// 기간 내 모든 설정 변경 감사 이벤트를 스트리밍합니다.
    pub fn get_audit_events(
        &self,
        cancel: &CancellationToken,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> StoreStream<AuditLog> {
        self.search_audit_events(cancel, None, start, end)
    }

    /// 선택한 리소스의 설정 변경 감사 이벤트를 스트리밍합니다.
    pub fn search_audit_events(
        &self,
        cancel: &CancellationToken,
        filter: Option<&AuditEventsSelection>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> StoreStream<AuditLog> {
        let params = build_audit_query(filter, start, end);
        spawn_reducer(
            cancel,
            ListPager::new(params),
            self.audit.clone(),
            |page| page.items,
            || info!("completed audit events query"),
        )
    }

    // --- 벤치마크 ---

    /// 노드별 최신 벤치마크를 스트리밍합니다 (성공 레코드 우선).
    pub fn retrieve_latest_benchmarks(
        &self,
        cancel: &CancellationToken,
        kind: BenchmarkType,
        filters: Vec<BenchmarksFilter>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreStream<Benchmarks> {
        let params = build_benchmarks_query(kind, filters, start, end);
        let mut reducer = LatestBenchmarks::new();
        spawn_reducer(
            cancel,
            ListPager::new(params),
            self.compliance.benchmarks.clone(),
            move |page| reducer.fold_page(page.items),
            || info!("completed benchmarks query"),
        )
    }

    /// ID로 벤치마크 하나를 조회합니다.
    pub async fn get_benchmarks(&self, id: &str) -> Result<Benchmarks, StoreError> {
        let params = BenchmarksParams {
            id: id.to_owned(),
            ..BenchmarksParams::default()
        };
        let page = self.compliance.benchmarks.list(&params).await?;
        first_of(page, "benchmarks", id)
    }

    /// 벤치마크를 저장합니다. 항목별 거부는 응답으로 확인합니다.
    pub async fn store_benchmarks(&self, bm: &Benchmarks) -> Result<BulkResponse, StoreError> {
        let resp = self
            .compliance
            .benchmarks
            .create(std::slice::from_ref(bm))
            .await?;
        info!(id = %bm.uid(), node = %bm.node_name, "stored benchmarks");
        Ok(resp)
    }

    // --- 리포트 ---

    /// 조건에 맞는 아카이브 리포트 요약을 모읍니다.
    pub async fn retrieve_archived_report_summaries(
        &self,
        cancel: &CancellationToken,
        query: &ReportQuery,
    ) -> Result<ArchivedReportSummaries, StoreError> {
        let (params, max_results) = query.to_params(Utc::now())?;
        let mut pages = ListPager::new(params)
            .with_max_results(max_results)
            .stream(cancel, self.compliance.report_data.clone());

        let mut summaries = ArchivedReportSummaries::default();
        while let Some(event) = pages.next().await {
            summaries.fold_page(&event?);
        }
        debug!(
            count = summaries.count,
            returned = summaries.reports.len(),
            "archived report summaries retrieved"
        );
        Ok(summaries)
    }

    /// 조건에 맞는 리포트의 이름/종류 목록
    pub async fn retrieve_archived_report_type_and_names(
        &self,
        cancel: &CancellationToken,
        query: &ReportQuery,
    ) -> Result<Vec<ReportTypeAndName>, StoreError> {
        let summaries = self.retrieve_archived_report_summaries(cancel, query).await?;
        Ok(summaries.type_and_names())
    }

    /// 이름이 일치하는 가장 최근 리포트의 요약
    pub async fn retrieve_last_archived_report_summary(
        &self,
        report_name: &str,
    ) -> Result<ReportData, StoreError> {
        let mut params = ReportDataParams {
            report_matches: vec![ReportMatch {
                report_name: report_name.to_owned(),
                report_type_name: String::new(),
            }],
            ..ReportDataParams::default()
        };
        params.query.max_page_size = 1;
        params.query.sort = vec![SortBy::desc(REPORT_END_TIME_FIELD)];

        let page = self.compliance.report_data.list(&params).await?;
        first_of(page, "report", report_name).map(|r| r.summary())
    }

    /// ID로 아카이브 리포트 전체를 조회합니다.
    pub async fn retrieve_archived_report(&self, id: &str) -> Result<ReportData, StoreError> {
        let params = ReportDataParams {
            id: id.to_owned(),
            ..ReportDataParams::default()
        };
        let page = self.compliance.report_data.list(&params).await?;
        first_of(page, "report archive", id)
    }

    pub async fn store_archived_report(
        &self,
        report: &ReportData,
    ) -> Result<BulkResponse, StoreError> {
        let resp = self
            .compliance
            .report_data
            .create(std::slice::from_ref(report))
            .await?;
        info!(id = %report.uid(), "stored report");
        Ok(resp)
    }

    // --- 스냅샷 ---

    /// 종류별 스냅샷 하나를 조회합니다.
    ///
    /// `ascending`이면 기간 내 가장 오래된, 아니면 가장 최근 스냅샷입니다.
    pub async fn retrieve_list(
        &self,
        kind: &TypeMeta,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        ascending: bool,
    ) -> Result<ResourceList, StoreError> {
        let mut params = SnapshotParams {
            type_match: Some(kind.clone()),
            ..SnapshotParams::default()
        };
        params.query.time_range = time_range(from, to);
        params.query.sort = vec![SortBy {
            field: SNAPSHOT_SORT_FIELD.to_owned(),
            descending: !ascending,
        }];
        params.query.max_page_size = 1;

        let page = self.compliance.snapshots.list(&params).await?;
        let count = page.items.len();
        let mut items = page.items.into_iter();
        match (items.next(), count) {
            (None, _) => Err(StoreError::NotFound {
                resource: "snapshot",
                identifier: kind.to_string(),
            }),
            (Some(snapshot), 1) => Ok(snapshot.resource_list),
            (Some(_), count) => Err(StoreError::UnexpectedCount {
                resource: "snapshot",
                count,
            }),
        }
    }

    /// 스냅샷을 저장합니다. 정확히 한 건이 성공하지 않으면 에러입니다.
    pub async fn store_list(&self, list: &ResourceList) -> Result<(), StoreError> {
        let snapshot = Snapshot::new(list.clone());
        let resp = self
            .compliance
            .snapshots
            .create(std::slice::from_ref(&snapshot))
            .await?;
        if resp.succeeded != 1 || resp.failed != 0 {
            warn!(id = %snapshot.id, ?resp, "snapshot rejected");
            return Err(StoreError::bulk_rejected(&resp));
        }
        info!(id = %snapshot.id, kind = %list.type_meta, "stored list");
        Ok(())
    }
}

/// 첫 번째 항목을 반환합니다. 비어 있으면 NotFound, 여러 건이면 경고만 남깁니다.
fn first_of<T>(page: Page<T>, resource: &'static str, identifier: &str) -> Result<T, StoreError> {
    let count = page.items.len();
    if count > 1 {
        warn!(resource, identifier, count, "more than one result for identifier");
    }
    page.items.into_iter().next().ok_or_else(|| StoreError::NotFound {
        resource,
        identifier: identifier.to_owned(),
    })
}

/// 페이저 + 리듀서 태스크를 생성하고 결과 채널을 반환합니다.
///
/// `fold`는 페이지마다 호출되어 방출할 결과를 반환하고, `on_complete`는
/// 태스크가 끝날 때 한 번 호출됩니다. 취소되면 남은 결과를 버리고 종료합니다.
fn spawn_reducer<P, T, O, L, F, D>(
    cancel: &CancellationToken,
    pager: ListPager<P>,
    lister: L,
    mut fold: F,
    on_complete: D,
) -> StoreStream<O>
where
    P: ListParams,
    T: Send + 'static,
    O: Send + 'static,
    L: Lister<P, T>,
    F: FnMut(Page<T>) -> Vec<O> + Send + 'static,
    D: FnOnce() + Send + 'static,
{
    let (tx, rx) = mpsc::channel(STREAM_CAPACITY);
    let cancel = cancel.clone();
    let mut pages = pager.stream(&cancel, lister);

    tokio::spawn(async move {
        'pages: while let Some(event) = pages.next().await {
            let outputs = match event {
                Ok(page) => fold(page).into_iter().map(Ok).collect::<Vec<_>>(),
                Err(e) => vec![Err(StoreError::from(e))],
            };
            for item in outputs {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break 'pages,
                    sent = tx.send(item) => {
                        if sent.is_err() {
                            debug!("store stream consumer went away");
                            break 'pages;
                        }
                    }
                }
            }
        }
        pages.finish().await;
        on_complete();
    });

    rx
}
