//! Deterministic stand-in for the log store transport.
//!
//! `MockRestClient` replays an ordered list of canned results, one per call.
//! Calling it with no results configured, or more times than results were
//! supplied, panics: call-count mismatches fail the test instead of silently
//! returning an empty reply. Every executed request is recorded for
//! assertions on paths, headers and bodies.

use std::sync::{Mutex, PoisonError};

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

use crate::bulk;
use crate::error::ClientError;
use crate::rest::{CONTENT_TYPE_NDJSON, Method, RawResponse, Request, RestInterface};

/// One canned reply.
#[derive(Debug, Clone)]
pub struct MockResult {
    /// Transport-level failure returned instead of a reply.
    pub error: Option<ClientError>,
    pub body: Bytes,
    pub status: u16,
}

impl MockResult {
    /// A 200 reply with a JSON body.
    pub fn ok(body: Value) -> Self {
        Self::status(200, body)
    }

    /// A 200 reply carrying any serializable value (e.g. a `Page`).
    ///
    /// Panics if `value` cannot be serialized.
    pub fn json<T: Serialize>(value: &T) -> Self {
        let body = serde_json::to_vec(value).expect("mock reply must serialize to JSON");
        Self {
            error: None,
            body: Bytes::from(body),
            status: 200,
        }
    }

    /// A reply with the given status and JSON body.
    pub fn status(status: u16, body: Value) -> Self {
        Self {
            error: None,
            body: Bytes::from(body.to_string()),
            status,
        }
    }

    /// A reply with the given status and a raw, possibly non-JSON body.
    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            error: None,
            body: Bytes::from(body.to_owned()),
            status,
        }
    }

    /// A transport failure.
    pub fn error(error: ClientError) -> Self {
        Self {
            error: Some(error),
            body: Bytes::new(),
            status: 0,
        }
    }
}

/// A request observed by the mock.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub cluster: String,
    pub content_type: String,
    pub body: Option<Bytes>,
}

impl RecordedRequest {
    /// Body decoded as a single JSON document (`Null` when absent).
    pub fn json(&self) -> Value {
        self.body
            .as_ref()
            .and_then(|b| serde_json::from_slice(b).ok())
            .unwrap_or(Value::Null)
    }

    /// Body decoded as NDJSON lines.
    pub fn ndjson(&self) -> Vec<Value> {
        self.body
            .as_ref()
            .and_then(|b| bulk::decode_lines(b).ok())
            .unwrap_or_default()
    }

    pub fn is_bulk(&self) -> bool {
        self.content_type == CONTENT_TYPE_NDJSON
    }
}

#[derive(Default)]
struct MockState {
    results: Vec<MockResult>,
    next: usize,
    requests: Vec<RecordedRequest>,
}

/// Transport replaying canned results in order.
#[derive(Default)]
pub struct MockRestClient {
    state: Mutex<MockState>,
}

impl MockRestClient {
    pub fn new(results: Vec<MockResult>) -> Self {
        Self {
            state: Mutex::new(MockState {
                results,
                ..MockState::default()
            }),
        }
    }

    /// Requests executed so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Number of calls made so far.
    pub fn calls(&self) -> usize {
        self.lock().next
    }

    /// Canned results not yet consumed.
    pub fn remaining(&self) -> usize {
        let state = self.lock();
        state.results.len() - state.next
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RestInterface for MockRestClient {
    async fn execute(&self, request: Request) -> Result<RawResponse, ClientError> {
        let result = {
            let mut state = self.lock();
            if state.results.is_empty() {
                panic!(
                    "MockRestClient called with no results configured ({})",
                    request.url_path()
                );
            }
            let Some(result) = state.results.get(state.next).cloned() else {
                panic!(
                    "MockRestClient exhausted: call #{} to {} but only {} results configured",
                    state.next + 1,
                    request.url_path(),
                    state.results.len()
                );
            };
            state.next += 1;
            state.requests.push(RecordedRequest {
                method: request.method(),
                path: request.url_path(),
                cluster: request.cluster_header().to_owned(),
                content_type: request.content_type_header().to_owned(),
                body: request.payload().cloned(),
            });
            result
        };

        match result.error {
            Some(err) => Err(err),
            None => Ok(RawResponse {
                status: result.status,
                body: result.body,
            }),
        }
    }
}
