//! End-to-end client flows over a scripted transport: dispatch,
//! pagination, and shared-record token refresh through the in-memory
//! auth store.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;

use lms_application::ports::{AuthStore, HttpTransport, TransportError};
use lms_application::{Client, ClientError, PageMode};
use lms_domain::{
    ApiRequest, ApiResponse, Authentication, Endpoint, Headers, HttpMethod, ParamSpec, Params,
    RefreshConfig, Registry,
};
use lms_infrastructure::InMemoryAuthStore;

/// Scripted transport: answers from a pre-loaded queue and records every
/// request.
#[derive(Default)]
struct ScriptedTransport {
    responses: Mutex<VecDeque<ApiResponse>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    fn new() -> Self {
        Self::default()
    }

    fn push(&self, response: ApiResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportError::Other("no scripted response".to_string()))
    }
}

fn ok_json(body: &str) -> ApiResponse {
    let mut headers = Headers::new();
    headers.insert("Content-Type", "application/json");
    ApiResponse::new(200, headers, body)
}

fn page(body: &str, next: Option<&str>) -> ApiResponse {
    let mut headers = Headers::new();
    if let Some(next) = next {
        headers.insert("Link", format!("<{next}>; rel=\"next\""));
    }
    ApiResponse::new(200, headers, body)
}

fn expired_token_401() -> ApiResponse {
    let mut headers = Headers::new();
    headers.insert("WWW-Authenticate", "Bearer realm=\"canvas-lms\"");
    ApiResponse::new(401, headers, r#"{"errors":[{"message":"Invalid access token."}]}"#)
}

fn registry() -> Arc<Registry> {
    Arc::new(
        Registry::new()
            .with_endpoint(
                Endpoint::new("LIST_COURSES", HttpMethod::Get, "courses")
                    .with_param(ParamSpec::query("enrollment_type")),
            )
            .with_endpoint(
                Endpoint::new(
                    "CREATE_ASSIGNMENT",
                    HttpMethod::Post,
                    "courses/{course_id}/assignments",
                )
                .with_param(ParamSpec::path("course_id").required())
                .with_param(ParamSpec::form("assignment[name]").required()),
            ),
    )
}

fn refresh_config() -> RefreshConfig {
    RefreshConfig::new("client-id", "client-secret", "https://app.example.com/cb", "refresh")
}

#[tokio::test]
async fn missing_parameters_fail_before_any_network_traffic() {
    let transport = Arc::new(ScriptedTransport::new());
    let client = Client::new(
        "https://lms.example.com",
        Authentication::token("token"),
        registry(),
        Arc::clone(&transport) as Arc<dyn HttpTransport>,
    );

    let error = client
        .proxy("CREATE_ASSIGNMENT", Params::new(), None, PageMode::Single)
        .await
        .unwrap_err();
    assert!(matches!(error, ClientError::Domain(_)));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn collect_all_walks_every_cursor() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push(page(
        r#"[{"id":1}]"#,
        Some("https://lms.example.com/api/v1/courses?page=2&per_page=100"),
    ));
    transport.push(page(
        r#"[{"id":2}]"#,
        Some("https://lms.example.com/api/v1/courses?page=3&per_page=100"),
    ));
    transport.push(page(r#"[{"id":3}]"#, None));
    let client = Client::new(
        "https://lms.example.com",
        Authentication::token("token"),
        registry(),
        Arc::clone(&transport) as Arc<dyn HttpTransport>,
    );

    let output = client
        .proxy(
            "LIST_COURSES",
            Params::new().with("enrollment_type", "teacher"),
            None,
            PageMode::CollectAll,
        )
        .await
        .unwrap();
    assert_eq!(
        output.into_pages(),
        Some(vec![json!({"id":1}), json!({"id":2}), json!({"id":3})])
    );

    let requests = transport.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(
        requests[0].url,
        "https://lms.example.com/api/v1/courses?enrollment_type=teacher&per_page=100"
    );
    assert_eq!(
        requests[2].url,
        "https://lms.example.com/api/v1/courses?page=3&per_page=100"
    );
}

#[tokio::test]
async fn refresh_persists_the_new_token_to_the_store() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push(expired_token_401());
    transport.push(ok_json(r#"{"access_token":"fresh"}"#));
    transport.push(page("[]", None));

    let store = Arc::new(InMemoryAuthStore::new());
    store.insert("user-1", "stale");

    let client = Client::new(
        "https://lms.example.com",
        Authentication::record("user-1", "stale"),
        registry(),
        Arc::clone(&transport) as Arc<dyn HttpTransport>,
    )
    .with_refresh(refresh_config())
    .with_auth_store(Arc::clone(&store) as Arc<dyn AuthStore>);

    client
        .proxy("LIST_COURSES", Params::new(), None, PageMode::CollectAll)
        .await
        .unwrap();

    assert_eq!(store.token("user-1").await.as_deref(), Some("fresh"));
    assert_eq!(
        client.authentication().await,
        Authentication::record("user-1", "fresh")
    );

    let requests = transport.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[1].url, "https://lms.example.com/login/oauth2/token");
    assert_eq!(requests[2].header("authorization"), Some("Bearer fresh"));
}

#[tokio::test]
async fn second_holder_adopts_instead_of_exchanging_again() {
    let transport = Arc::new(ScriptedTransport::new());
    let store = Arc::new(InMemoryAuthStore::new());
    store.insert("user-1", "stale");

    let make_client = || {
        Client::new(
            "https://lms.example.com",
            Authentication::record("user-1", "stale"),
            registry(),
            Arc::clone(&transport) as Arc<dyn HttpTransport>,
        )
        .with_refresh(refresh_config())
        .with_auth_store(Arc::clone(&store) as Arc<dyn AuthStore>)
    };
    let first = make_client();
    let second = make_client();

    // First holder hits the expired-token challenge and exchanges.
    transport.push(expired_token_401());
    transport.push(ok_json(r#"{"access_token":"fresh"}"#));
    transport.push(page("[]", None));
    first
        .proxy("LIST_COURSES", Params::new(), None, PageMode::CollectAll)
        .await
        .unwrap();

    // Second holder still carries the stale token, gets challenged, and
    // finds the store already updated. No exchange is scripted; an
    // attempt would fail with an exhausted queue.
    transport.push(expired_token_401());
    transport.push(page("[]", None));
    second
        .proxy("LIST_COURSES", Params::new(), None, PageMode::CollectAll)
        .await
        .unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 5);
    let exchanges = requests
        .iter()
        .filter(|r| r.url.ends_with("/login/oauth2/token"))
        .count();
    assert_eq!(exchanges, 1);
    assert_eq!(requests[4].header("authorization"), Some("Bearer fresh"));
    assert_eq!(
        second.authentication().await,
        Authentication::record("user-1", "fresh")
    );
}

/// Routes responses by request content instead of queue order, so the
/// interleaving of concurrent callers does not matter: the token
/// endpoint always answers with a fresh token, a stale bearer gets the
/// expired-token challenge, and a fresh bearer gets an empty page.
#[derive(Default)]
struct RefreshRoutingTransport {
    requests: Mutex<Vec<ApiRequest>>,
}

impl RefreshRoutingTransport {
    fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for RefreshRoutingTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        if request.url.ends_with("/login/oauth2/token") {
            return Ok(ok_json(r#"{"access_token":"fresh"}"#));
        }
        if request.header("authorization") == Some("Bearer stale") {
            return Ok(expired_token_401());
        }
        Ok(page("[]", None))
    }
}

#[tokio::test]
async fn racing_holders_serialize_on_the_store_with_one_exchange() {
    let transport = Arc::new(RefreshRoutingTransport::default());
    let store = Arc::new(InMemoryAuthStore::new());
    store.insert("user-1", "stale");

    let make_client = || {
        Client::new(
            "https://lms.example.com",
            Authentication::record("user-1", "stale"),
            registry(),
            Arc::clone(&transport) as Arc<dyn HttpTransport>,
        )
        .with_refresh(refresh_config())
        .with_auth_store(Arc::clone(&store) as Arc<dyn AuthStore>)
    };
    let first = make_client();
    let second = make_client();

    // Both holders start from the stale snapshot and hit the challenge
    // at the same time. Whichever takes the record lock first exchanges;
    // the other reloads, sees the fresh token, and adopts it.
    let (a, b) = tokio::join!(
        first.proxy("LIST_COURSES", Params::new(), None, PageMode::CollectAll),
        second.proxy("LIST_COURSES", Params::new(), None, PageMode::CollectAll),
    );
    a.unwrap();
    b.unwrap();

    let requests = transport.requests();
    // Two stale attempts, one exchange, two fresh replays, in some order.
    assert_eq!(requests.len(), 5);
    let exchanges = requests
        .iter()
        .filter(|r| r.url.ends_with("/login/oauth2/token"))
        .count();
    assert_eq!(exchanges, 1);

    assert_eq!(store.token("user-1").await.as_deref(), Some("fresh"));
    assert_eq!(
        first.authentication().await,
        Authentication::record("user-1", "fresh")
    );
    assert_eq!(
        second.authentication().await,
        Authentication::record("user-1", "fresh")
    );
}

#[tokio::test]
async fn upstream_error_carries_the_request_context() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push(ApiResponse::new(
        403,
        Headers::new(),
        r#"{"status":"unauthorized"}"#,
    ));
    let client = Client::new(
        "https://lms.example.com",
        Authentication::token("token"),
        registry(),
        Arc::clone(&transport) as Arc<dyn HttpTransport>,
    );

    let params = Params::new().with("course_id", 7);
    let payload = lms_domain::Payload::from_value(json!({"assignment":{"name":"Essay"}}));
    let error = client
        .proxy("CREATE_ASSIGNMENT", params, Some(payload), PageMode::Single)
        .await
        .unwrap_err();

    let message = error.to_string();
    assert!(message.contains("CREATE_ASSIGNMENT"));
    assert!(message.contains("403"));
    assert!(matches!(error, ClientError::ApiRequestFailed { status: 403, .. }));
}
