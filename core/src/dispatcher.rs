//! Generic JSON request dispatcher.
//!
//! # Design
//! `RequestDispatcher` is configured once and never mutated afterwards: the
//! base URL, the timeout and the base header set are fixed at construction.
//! A call is split into `build_request` (pure), the transport round-trip,
//! and `parse_response` (pure), so the URL, header and body rules can be
//! tested without a server.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::config::DispatcherConfig;
use crate::error::DispatchError;
use crate::http::{merge_headers, HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};

/// `user-agent` sent with every request.
pub const USER_AGENT: &str = concat!("apiclient-rs/", env!("CARGO_PKG_VERSION"));

/// Per-call parameters for [`RequestDispatcher::dispatch`].
#[derive(Debug, Clone, Default)]
pub struct Call {
    params: Vec<(String, String)>,
    body: Option<Value>,
    headers: Vec<(String, String)>,
}

impl Call {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a query parameter. Order of insertion is the order on the wire.
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize `body` into the call's JSON payload.
    pub fn json<B: Serialize + ?Sized>(self, body: &B) -> Result<Self, DispatchError> {
        let value = serde_json::to_value(body).map_err(|e| DispatchError::Other {
            detail: e.to_string(),
        })?;
        Ok(self.body(value))
    }

    /// Override (or add) a header for this call only.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Blocking JSON client bound to a single base URL.
#[derive(Clone)]
pub struct RequestDispatcher<T = UreqTransport> {
    base_url: String,
    timeout: Duration,
    headers: Vec<(String, String)>,
    transport: T,
}

impl<T> fmt::Debug for RequestDispatcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(k, v)| {
                if k == "authorization" {
                    (k.as_str(), "[REDACTED]")
                } else {
                    (k.as_str(), v.as_str())
                }
            })
            .collect();
        f.debug_struct("RequestDispatcher")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("headers", &headers)
            .finish()
    }
}

impl RequestDispatcher<UreqTransport> {
    /// Dispatcher with the default timeout and an optional bearer credential.
    pub fn new(base_url: &str, credential: Option<&str>) -> Self {
        let mut config = DispatcherConfig::new(base_url);
        if let Some(credential) = credential {
            config = config.credential(credential);
        }
        Self::from_config(config)
    }

    pub fn from_config(config: DispatcherConfig) -> Self {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> RequestDispatcher<T> {
    pub fn with_transport(config: DispatcherConfig, transport: T) -> Self {
        let mut headers = vec![
            ("content-type".to_string(), "application/json".to_string()),
            ("user-agent".to_string(), USER_AGENT.to_string()),
        ];
        if let Some(credential) = &config.credential {
            headers.push(("authorization".to_string(), format!("Bearer {credential}")));
        }
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
            headers,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Headers sent with every call before per-call overrides.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        call: &Call,
    ) -> Result<HttpRequest, DispatchError> {
        let mut url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        if !call.params.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(call.params.iter())
                .finish();
            url.push('?');
            url.push_str(&query);
        }

        let body = match &call.body {
            Some(value) if has_payload(value) => {
                Some(serde_json::to_string(value).map_err(|e| DispatchError::Other {
                    detail: e.to_string(),
                })?)
            }
            _ => None,
        };

        Ok(HttpRequest {
            method,
            url,
            headers: merge_headers(&self.headers, &call.headers),
            body,
        })
    }

    pub fn parse_response(&self, response: HttpResponse) -> Result<Value, DispatchError> {
        if !(200..300).contains(&response.status) {
            return Err(DispatchError::Status {
                status: response.status,
                reason: reason_phrase(response.status).to_string(),
                body: response.body,
            });
        }
        if response.body.is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        serde_json::from_str(&response.body).map_err(|e| DispatchError::Decode {
            detail: e.to_string(),
        })
    }

    /// Build, execute and parse a single call. Failures are returned as-is;
    /// nothing is retried.
    pub fn dispatch(&self, method: HttpMethod, path: &str, call: Call) -> Result<Value, DispatchError> {
        let request = self.build_request(method, path, &call)?;
        tracing::debug!(method = %request.method, url = %request.url, "dispatching request");

        let result = self
            .transport
            .execute(&request)
            .and_then(|response| self.parse_response(response));
        if let Err(e) = &result {
            tracing::warn!(method = %request.method, url = %request.url, kind = ?e.kind(), "request failed: {e}");
        }
        result
    }

    pub fn get(&self, path: &str, call: Call) -> Result<Value, DispatchError> {
        self.dispatch(HttpMethod::Get, path, call)
    }

    pub fn post(&self, path: &str, call: Call) -> Result<Value, DispatchError> {
        self.dispatch(HttpMethod::Post, path, call)
    }

    pub fn put(&self, path: &str, call: Call) -> Result<Value, DispatchError> {
        self.dispatch(HttpMethod::Put, path, call)
    }

    pub fn delete(&self, path: &str, call: Call) -> Result<Value, DispatchError> {
        self.dispatch(HttpMethod::Delete, path, call)
    }
}

/// `null` and `{}` are sent as no payload at all.
fn has_payload(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}

fn reason_phrase(status: u16) -> &'static str {
    ureq::http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown Status")
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::json;

    use super::*;

    /// Records requests and replays a canned response.
    struct StubTransport {
        response: HttpResponse,
        seen: RefCell<Vec<HttpRequest>>,
    }

    impl StubTransport {
        fn replying(status: u16, body: &str) -> Self {
            Self {
                response: HttpResponse {
                    status,
                    headers: Vec::new(),
                    body: body.to_string(),
                },
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for StubTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, DispatchError> {
            self.seen.borrow_mut().push(request.clone());
            Ok(self.response.clone())
        }
    }

    fn dispatcher(base: &str, credential: Option<&str>) -> RequestDispatcher<StubTransport> {
        let mut config = DispatcherConfig::new(base);
        if let Some(c) = credential {
            config = config.credential(c);
        }
        RequestDispatcher::with_transport(config, StubTransport::replying(200, ""))
    }

    #[test]
    fn trailing_slashes_are_stripped() {
        for base in ["http://localhost:3000/", "http://localhost:3000//", "http://localhost:3000"] {
            let d = dispatcher(base, None);
            assert_eq!(d.base_url(), "http://localhost:3000");
            for path in ["posts", "/posts", "//posts"] {
                let req = d.build_request(HttpMethod::Get, path, &Call::new()).unwrap();
                assert_eq!(req.url, "http://localhost:3000/posts", "{base} + {path}");
            }
        }
    }

    #[test]
    fn base_path_segments_are_kept() {
        let d = dispatcher("https://api.example.com/data/2.5/", None);
        let req = d.build_request(HttpMethod::Get, "/weather", &Call::new()).unwrap();
        assert_eq!(req.url, "https://api.example.com/data/2.5/weather");
    }

    #[test]
    fn credential_becomes_bearer_header() {
        let d = dispatcher("http://h", Some("abc123"));
        let req = d.build_request(HttpMethod::Get, "x", &Call::new()).unwrap();
        assert_eq!(req.header("authorization"), Some("Bearer abc123"));
    }

    #[test]
    fn no_credential_means_no_authorization() {
        let d = dispatcher("http://h", None);
        let req = d.build_request(HttpMethod::Get, "x", &Call::new()).unwrap();
        assert_eq!(req.header("authorization"), None);

        let call = Call::new().header("Authorization", "Bearer per-call");
        let req = d.build_request(HttpMethod::Get, "x", &call).unwrap();
        assert_eq!(req.header("authorization"), Some("Bearer per-call"));
    }

    #[test]
    fn default_headers() {
        let d = dispatcher("http://h", None);
        assert_eq!(
            d.headers(),
            &[
                ("content-type".to_string(), "application/json".to_string()),
                ("user-agent".to_string(), USER_AGENT.to_string()),
            ]
        );
    }

    #[test]
    fn query_string_follows_insertion_order() {
        let d = dispatcher("http://h", None);
        let req = d
            .build_request(HttpMethod::Get, "/posts", &Call::new().param("userId", 1))
            .unwrap();
        assert_eq!(req.url, "http://h/posts?userId=1");

        let call = Call::new().param("q", "New York").param("appid", "k&v").param("cnt", 24);
        let req = d.build_request(HttpMethod::Get, "/forecast", &call).unwrap();
        assert_eq!(req.url, "http://h/forecast?q=New+York&appid=k%26v&cnt=24");
    }

    #[test]
    fn query_uses_form_encoding_for_tilde_and_star() {
        let d = dispatcher("http://h", None);
        let call = Call::new().param("q", "a~b*c");
        let req = d.build_request(HttpMethod::Get, "/search", &call).unwrap();
        assert_eq!(req.url, "http://h/search?q=a%7Eb*c");
    }

    #[test]
    fn no_params_means_no_question_mark() {
        let d = dispatcher("http://h", None);
        let req = d.build_request(HttpMethod::Get, "/posts", &Call::new()).unwrap();
        assert!(!req.url.contains('?'));
    }

    #[test]
    fn per_call_headers_override_without_leaking() {
        let d = dispatcher("http://h", Some("abc123"));
        let call = Call::new().header("content-type", "text/plain");
        let req = d.build_request(HttpMethod::Post, "/x", &call).unwrap();
        assert_eq!(req.header("content-type"), Some("text/plain"));
        assert_eq!(req.header("authorization"), Some("Bearer abc123"));
        assert_eq!(req.headers.len(), 3);

        let req = d.build_request(HttpMethod::Post, "/x", &Call::new()).unwrap();
        assert_eq!(req.header("content-type"), Some("application/json"));
    }

    #[test]
    fn body_is_serialized_json() {
        let d = dispatcher("http://h", None);
        let call = Call::new().body(json!({"title": "foo", "userId": 1}));
        let req = d.build_request(HttpMethod::Post, "/posts", &call).unwrap();
        let sent: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, json!({"title": "foo", "userId": 1}));
    }

    #[test]
    fn empty_or_null_body_sends_nothing() {
        let d = dispatcher("http://h", None);
        for body in [json!({}), Value::Null] {
            let req = d
                .build_request(HttpMethod::Post, "/posts", &Call::new().body(body))
                .unwrap();
            assert!(req.body.is_none());
        }
        let req = d.build_request(HttpMethod::Delete, "/posts/1", &Call::new()).unwrap();
        assert!(req.body.is_none());
    }

    #[test]
    fn empty_response_is_empty_object() {
        let d = dispatcher("http://h", None);
        let value = d.dispatch(HttpMethod::Delete, "/posts/1", Call::new()).unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn json_response_is_decoded() {
        let d = RequestDispatcher::with_transport(
            DispatcherConfig::new("http://h"),
            StubTransport::replying(200, r#"{"id": 1, "title": "foo"}"#),
        );
        let value = d.get("/posts/1", Call::new()).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["title"], "foo");
    }

    #[test]
    fn not_found_is_status_error() {
        let d = RequestDispatcher::with_transport(
            DispatcherConfig::new("http://h"),
            StubTransport::replying(404, "{}"),
        );
        let err = d.get("/nope", Call::new()).unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "HTTP 404: Not Found. Body: {}");
    }

    #[test]
    fn malformed_json_is_decode_error() {
        let d = RequestDispatcher::with_transport(
            DispatcherConfig::new("http://h"),
            StubTransport::replying(200, "not json"),
        );
        let err = d.get("/x", Call::new()).unwrap_err();
        assert!(matches!(err, DispatchError::Decode { .. }));
    }

    #[test]
    fn dispatch_sends_built_request_to_transport() {
        let stub = StubTransport::replying(201, r#"{"id": 101}"#);
        let d = RequestDispatcher::with_transport(DispatcherConfig::new("http://h/"), &stub);
        let value = d
            .post("posts", Call::new().json(&json!({"title": "t"})).unwrap())
            .unwrap();
        assert_eq!(value["id"], 101);

        let seen = stub.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, HttpMethod::Post);
        assert_eq!(seen[0].url, "http://h/posts");
        assert_eq!(seen[0].body.as_deref(), Some(r#"{"title":"t"}"#));
    }

    #[test]
    fn debug_redacts_authorization() {
        let d = dispatcher("http://h", Some("abc123"));
        let rendered = format!("{d:?}");
        assert!(!rendered.contains("abc123"));
    }
}
