//! 노드별 최신 벤치마크 선택 리듀서
//!
//! 성공한 실행이 실패한 실행보다 우선합니다. 노드별로 가장 최근의 성공 레코드를
//! 유지하고, 성공이 한 번도 없는 노드만 가장 최근의 실패 레코드를 내보냅니다.
//!
//! 실패 후보는 페이지 단위로 보류되며 페이지가 끝날 때 방출됩니다. 이미 방출한
//! 실패 레코드는 이후 페이지에서 성공이 나와도 회수하지 않습니다.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use logvault_core::metrics::COMPLIANCE_BENCHMARKS_SUPPRESSED_TOTAL;
use logvault_core::resources::{BenchmarkType, Benchmarks, BenchmarksFilter, BenchmarksParams};
use tracing::debug;

use crate::flows::{DEFAULT_PAGE_SIZE, time_range};

/// 최신 벤치마크 리듀서 상태
#[derive(Debug, Default)]
pub struct LatestBenchmarks {
    /// 노드별 최신 성공 레코드 (스트림 전체에 걸쳐 유지)
    latest_success: HashMap<String, Benchmarks>,
    /// 이번 페이지에서 갱신된 성공 노드 (발견 순서)
    updated: Vec<String>,
    /// 이번 페이지의 실패 후보 (발견 순서, 노드별 최신값)
    pending_errors: Vec<Benchmarks>,
    /// 이미 방출한 실패 레코드의 시각
    flushed_errors: HashMap<String, DateTime<Utc>>,
    suppressed: u64,
}

impl LatestBenchmarks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 레코드 하나를 반영합니다. 방출은 [`end_page`](Self::end_page)에서 일어납니다.
    pub fn observe(&mut self, bm: Benchmarks) {
        if bm.succeeded() {
            self.observe_success(bm);
        } else {
            self.observe_error(bm);
        }
    }

    fn observe_success(&mut self, bm: Benchmarks) {
        if let Some(prev) = self.latest_success.get(&bm.node_name) {
            if prev.timestamp > bm.timestamp {
                debug!(node = %bm.node_name, "older successful benchmark ignored");
                return;
            }
        }

        let before = self.pending_errors.len();
        self.pending_errors.retain(|p| p.node_name != bm.node_name);
        self.record_suppressed((before - self.pending_errors.len()) as u64);

        if !self.updated.contains(&bm.node_name) {
            self.updated.push(bm.node_name.clone());
        }
        debug!(node = %bm.node_name, time = %bm.timestamp, "latest successful benchmark");
        self.latest_success.insert(bm.node_name.clone(), bm);
    }

    fn observe_error(&mut self, bm: Benchmarks) {
        if self.latest_success.contains_key(&bm.node_name) {
            self.record_suppressed(1);
            return;
        }
        if self
            .flushed_errors
            .get(&bm.node_name)
            .is_some_and(|t| *t >= bm.timestamp)
        {
            return;
        }

        match self
            .pending_errors
            .iter_mut()
            .find(|p| p.node_name == bm.node_name)
        {
            Some(existing) if existing.timestamp > bm.timestamp => {}
            Some(existing) => *existing = bm,
            None => self.pending_errors.push(bm),
        }
    }

    fn record_suppressed(&mut self, n: u64) {
        if n > 0 {
            self.suppressed += n;
            metrics::counter!(COMPLIANCE_BENCHMARKS_SUPPRESSED_TOTAL).increment(n);
        }
    }

    /// 페이지를 마감하고 이번 페이지에서 방출할 레코드를 반환합니다.
    ///
    /// 갱신된 성공 레코드가 먼저, 성공이 없는 노드의 실패 레코드가 뒤에 옵니다.
    pub fn end_page(&mut self) -> Vec<Benchmarks> {
        let mut out = Vec::with_capacity(self.updated.len() + self.pending_errors.len());
        for node in self.updated.drain(..) {
            if let Some(bm) = self.latest_success.get(&node) {
                out.push(bm.clone());
            }
        }
        for bm in self.pending_errors.drain(..) {
            debug!(node = %bm.node_name, time = %bm.timestamp, "sending errored benchmark");
            self.flushed_errors.insert(bm.node_name.clone(), bm.timestamp);
            out.push(bm);
        }
        out
    }

    /// 한 페이지를 반영하고 방출할 레코드를 반환합니다.
    pub fn fold_page(&mut self, items: impl IntoIterator<Item = Benchmarks>) -> Vec<Benchmarks> {
        for bm in items {
            self.observe(bm);
        }
        self.end_page()
    }

    /// 성공 레코드 때문에 버려진 실패 레코드 수
    pub fn suppressed(&self) -> u64 {
        self.suppressed
    }
}

/// 벤치마크 조회 조건을 만듭니다.
pub fn build_benchmarks_query(
    kind: BenchmarkType,
    filters: Vec<BenchmarksFilter>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> BenchmarksParams {
    let mut params = BenchmarksParams {
        kind: Some(kind),
        filters,
        ..BenchmarksParams::default()
    };
    params.query.time_range = time_range(Some(start), Some(end));
    params.query.max_page_size = DEFAULT_PAGE_SIZE;
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bm(node: &str, minute: u32, error: &str) -> Benchmarks {
        Benchmarks {
            id: String::new(),
            version: "1.6".to_owned(),
            kubernetes_version: "1.30".to_owned(),
            kind: BenchmarkType::Kubernetes,
            node_name: node.to_owned(),
            timestamp: Utc.with_ymd_and_hms(2026, 5, 1, 12, minute, 0).unwrap(),
            error: error.to_owned(),
            tests: Vec::new(),
        }
    }

    #[test]
    fn success_replaces_earlier_error_in_same_page() {
        let mut reducer = LatestBenchmarks::new();
        let out = reducer.fold_page([bm("n1", 1, "timeout"), bm("n1", 2, "")]);
        assert_eq!(out, vec![bm("n1", 2, "")]);
        assert_eq!(reducer.suppressed(), 1);
    }

    #[test]
    fn only_errors_keep_most_recent_error() {
        let mut reducer = LatestBenchmarks::new();
        let out = reducer.fold_page([
            bm("n1", 1, "e1"),
            bm("n1", 3, "e3"),
            bm("n1", 2, "e2"),
        ]);
        assert_eq!(out, vec![bm("n1", 3, "e3")]);
    }

    #[test]
    fn error_after_success_is_suppressed() {
        let mut reducer = LatestBenchmarks::new();
        let out = reducer.fold_page([bm("n1", 1, ""), bm("n1", 5, "late failure")]);
        assert_eq!(out, vec![bm("n1", 1, "")]);
    }

    #[test]
    fn latest_success_wins_and_ties_take_last_seen() {
        let mut reducer = LatestBenchmarks::new();
        let mut tied = bm("n1", 4, "");
        tied.version = "1.7".to_owned();
        let out = reducer.fold_page([bm("n1", 4, ""), bm("n1", 2, ""), tied.clone()]);
        assert_eq!(out, vec![tied]);
    }

    #[test]
    fn successes_precede_errors_in_page_output() {
        let mut reducer = LatestBenchmarks::new();
        let out = reducer.fold_page([bm("n2", 1, "boom"), bm("n1", 1, ""), bm("n3", 1, "")]);
        let nodes: Vec<_> = out.iter().map(|b| b.node_name.as_str()).collect();
        assert_eq!(nodes, vec!["n1", "n3", "n2"]);
    }

    #[test]
    fn flushed_error_is_not_retracted_by_later_success() {
        let mut reducer = LatestBenchmarks::new();
        let first = reducer.fold_page([bm("n1", 1, "boom")]);
        assert_eq!(first, vec![bm("n1", 1, "boom")]);

        let second = reducer.fold_page([bm("n1", 2, "")]);
        assert_eq!(second, vec![bm("n1", 2, "")]);
    }

    #[test]
    fn flushed_error_is_not_repeated() {
        let mut reducer = LatestBenchmarks::new();
        reducer.fold_page([bm("n1", 3, "boom")]);
        assert!(reducer.fold_page([bm("n1", 2, "older")]).is_empty());
        assert_eq!(reducer.fold_page([bm("n1", 4, "newer")]), vec![bm("n1", 4, "newer")]);
    }

    #[test]
    fn unchanged_success_is_not_reemitted() {
        let mut reducer = LatestBenchmarks::new();
        reducer.fold_page([bm("n1", 3, "")]);
        assert!(reducer.fold_page([bm("n1", 1, "")]).is_empty());
    }

    #[test]
    fn benchmarks_query_sets_type_filters_and_range() {
        let start = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 5, 2, 0, 0, 0).unwrap();
        let params = build_benchmarks_query(
            BenchmarkType::Kubernetes,
            vec![BenchmarksFilter {
                version: "1.6".to_owned(),
                node_names: vec!["n1".to_owned()],
            }],
            start,
            end,
        );
        let encoded = serde_json::to_value(&params).unwrap();
        assert_eq!(encoded["type"], "kube");
        assert_eq!(encoded["filters"][0]["node_names"][0], "n1");
        assert_eq!(encoded["max_page_size"], 100);
    }
}
