//! 컴플라이언스 리듀서 벤치마크
//!
//! 플로우 중복 제거와 최신 벤치마크 선택의 페이지 처리 성능을 측정합니다.

use chrono::{TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use logvault_compliance::{FlowDeduplicator, LatestBenchmarks};
use logvault_core::resources::{
    BenchmarkType, Benchmarks, Endpoint, EndpointType, L3Flow, L3FlowKey,
};

fn create_flow(i: usize, distinct: usize) -> L3Flow {
    let n = i % distinct;
    L3Flow {
        key: L3FlowKey {
            action: "allow".to_owned(),
            reporter: if i % 2 == 0 { "src" } else { "dst" }.to_owned(),
            protocol: "tcp".to_owned(),
            source: Endpoint {
                kind: EndpointType::Wep,
                name: "-".to_owned(),
                aggregated_name: format!("client-{n}-*"),
                namespace: "default".to_owned(),
                port: 0,
            },
            destination: Endpoint {
                kind: EndpointType::Wep,
                name: "-".to_owned(),
                aggregated_name: format!("server-{}-*", n % 7),
                namespace: "default".to_owned(),
                port: 443,
            },
        },
        ..L3Flow::default()
    }
}

fn create_benchmark(i: usize, nodes: usize) -> Benchmarks {
    Benchmarks {
        id: String::new(),
        version: "1.6".to_owned(),
        kubernetes_version: "1.30".to_owned(),
        kind: BenchmarkType::Kubernetes,
        node_name: format!("node-{}", i % nodes),
        timestamp: Utc
            .with_ymd_and_hms(2026, 5, 1, 0, 0, 0)
            .unwrap()
            + chrono::Duration::seconds(i as i64),
        error: if i % 3 == 0 { "timeout".to_owned() } else { String::new() },
        tests: Vec::new(),
    }
}

fn bench_flow_dedup(c: &mut Criterion) {
    let mut group = c.benchmark_group("flow_dedup");
    for size in [100usize, 1_000, 10_000] {
        let flows: Vec<L3Flow> = (0..size).map(|i| create_flow(i, size / 4)).collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("push_page", size), &flows, |b, flows| {
            b.iter(|| {
                let mut dedup = FlowDeduplicator::new();
                black_box(dedup.push_page(black_box(flows)))
            });
        });
    }
    group.finish();
}

fn bench_latest_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("latest_benchmarks");
    for nodes in [10usize, 100, 1_000] {
        let pages: Vec<Vec<Benchmarks>> = (0..10)
            .map(|p| (0..100).map(|i| create_benchmark(p * 100 + i, nodes)).collect())
            .collect();
        group.throughput(Throughput::Elements(1_000));
        group.bench_with_input(BenchmarkId::new("fold_10_pages", nodes), &pages, |b, pages| {
            b.iter(|| {
                let mut reducer = LatestBenchmarks::new();
                let mut emitted = 0;
                for page in pages {
                    emitted += reducer.fold_page(page.iter().cloned()).len();
                }
                black_box(emitted)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_flow_dedup, bench_latest_benchmarks);
criterion_main!(benches);
