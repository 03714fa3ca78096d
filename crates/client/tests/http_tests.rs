//! HTTPS transport behaviour against a local plain-HTTP server.

use std::io::Write;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use logvault_client::{Client, ClientError, HttpRestClient, RestConfig, TokenSource};
use logvault_core::query::QueryParams;
use logvault_core::resources::Event;
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
struct Seen {
    path: String,
    headers: HeaderMap,
    body: Bytes,
}

type Log = Arc<Mutex<Vec<Seen>>>;

async fn record(log: &Log, path: &str, headers: HeaderMap, body: Bytes) {
    log.lock().unwrap().push(Seen {
        path: path.to_owned(),
        headers,
        body,
    });
}

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn router(log: Log) -> Router {
    Router::new()
        .route(
            "/api/v1/dns/logs",
            post(|State(log): State<Log>, headers: HeaderMap, body: Bytes| async move {
                record(&log, "/api/v1/dns/logs", headers, body).await;
                (
                    StatusCode::OK,
                    r#"{"items":[{"qname":"a.example.com"}],"after_key":null,"total_hits":1}"#,
                )
            }),
        )
        .route(
            "/api/v1/waf/logs",
            post(|| async { (StatusCode::NOT_FOUND, "no such index") }),
        )
        .route(
            "/api/v1/flows/logs",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    r#"{"Msg":"invalid selector","Status":400}"#,
                )
            }),
        )
        .route(
            "/api/v1/events",
            post(|| async { (StatusCode::BAD_GATEWAY, "<html>upstream down</html>") }),
        )
        .route(
            "/api/v1/audit/logs/ee",
            post(|| async { (StatusCode::OK, "not json") }),
        )
        .route(
            "/api/v1/events/bulk",
            post(|State(log): State<Log>, headers: HeaderMap, body: Bytes| async move {
                record(&log, "/api/v1/events/bulk", headers, body).await;
                (StatusCode::OK, r#"{"total":2,"succeeded":2,"failed":0}"#)
            })
            .delete(
                |State(log): State<Log>, headers: HeaderMap, body: Bytes| async move {
                    record(&log, "/api/v1/events/bulk", headers, body).await;
                    (StatusCode::OK, r#"{"total":1,"succeeded":1,"failed":0}"#)
                },
            ),
        )
        .with_state(log)
}

async fn client_for(config: RestConfig) -> (Client, Log) {
    let log: Log = Arc::default();
    let base = serve(router(Arc::clone(&log))).await;
    let mut config = config;
    config.base_url = base;
    (Client::new(HttpRestClient::new(config).unwrap()), log)
}

#[tokio::test]
async fn list_sends_headers_and_json_params() {
    let config = RestConfig::new("placeholder")
        .with_tenant("tenant-a")
        .with_token(TokenSource::Static("secret".to_owned()));
    let (client, log) = client_for(config).await;

    let page = client
        .dns_logs("east")
        .list(&QueryParams::new().with_max_page_size(50))
        .await
        .unwrap();
    assert_eq!(page.items[0].qname, "a.example.com");

    let seen = log.lock().unwrap()[0].clone();
    assert_eq!(seen.path, "/api/v1/dns/logs");
    assert_eq!(seen.headers["x-cluster-id"], "east");
    assert_eq!(seen.headers["x-tenant-id"], "tenant-a");
    assert_eq!(seen.headers["authorization"], "Bearer secret");
    assert_eq!(seen.headers["content-type"], "application/json");
    assert_eq!(seen.headers["connection"], "close");
    let body: serde_json::Value = serde_json::from_slice(&seen.body).unwrap();
    assert_eq!(body["max_page_size"], 50);
}

#[tokio::test]
async fn empty_cluster_and_tenant_defaults() {
    let (client, log) = client_for(RestConfig::new("placeholder")).await;
    client.dns_logs("").list(&QueryParams::new()).await.unwrap();

    let seen = log.lock().unwrap()[0].clone();
    assert_eq!(seen.headers["x-cluster-id"], "cluster");
    assert!(seen.headers.get("x-tenant-id").is_none());
    assert!(seen.headers.get("authorization").is_none());
}

#[tokio::test]
async fn status_classification() {
    let (client, _log) = client_for(RestConfig::new("placeholder")).await;

    let err = client.waf_logs("").list(&QueryParams::new()).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound { .. }));

    let err = client.flow_logs("").list(&QueryParams::new()).await.unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "invalid selector");
        }
        other => panic!("expected api error, got {other:?}"),
    }

    let err = client.events("").list(&QueryParams::new()).await.unwrap_err();
    match err {
        ClientError::Unstructured { status, body } => {
            assert_eq!(status, 502);
            assert!(body.contains("upstream down"));
        }
        other => panic!("expected unstructured error, got {other:?}"),
    }

    let err = client
        .audit_logs("")
        .list(&Default::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Decode { .. }));
}

#[tokio::test]
async fn bulk_create_and_delete_use_ndjson() {
    let (client, log) = client_for(RestConfig::new("placeholder")).await;
    let events = [
        Event {
            id: "e1".to_owned(),
            ..Event::default()
        },
        Event {
            id: "e2".to_owned(),
            ..Event::default()
        },
    ];

    let created = client.events("").create(&events).await.unwrap();
    assert!(created.is_complete());
    let deleted = client.events("").delete(&["e1"]).await.unwrap();
    assert_eq!(deleted.succeeded, 1);

    let seen = log.lock().unwrap().clone();
    assert_eq!(seen[0].headers["content-type"], "application/x-ndjson");
    let text = std::str::from_utf8(&seen[0].body).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.ends_with('\n'));
    assert_eq!(&seen[1].body[..], b"{\"id\":\"e1\"}\n");
}

#[tokio::test]
async fn token_file_is_reread_per_request() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "first").unwrap();
    let config = RestConfig::new("placeholder")
        .with_token(TokenSource::File(file.path().to_path_buf()));
    let (client, log) = client_for(config).await;

    client.dns_logs("").list(&QueryParams::new()).await.unwrap();
    std::fs::write(file.path(), "second\n").unwrap();
    client.dns_logs("").list(&QueryParams::new()).await.unwrap();

    let seen = log.lock().unwrap().clone();
    assert_eq!(seen[0].headers["authorization"], "Bearer first");
    assert_eq!(seen[1].headers["authorization"], "Bearer second");
}

#[tokio::test]
async fn connection_refused_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = Client::new(HttpRestClient::new(RestConfig::new(format!("http://{addr}"))).unwrap());
    let err = client.dns_logs("").list(&QueryParams::new()).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport { .. }));
}
